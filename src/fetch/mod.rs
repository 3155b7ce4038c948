//! HTTP plumbing shared by every API client in the crate.
//!
//! [`HttpClient`] is the seam: concrete clients ([`BasicClient`]) and
//! wrappers ([`auth::ApiKey`]) compose by wrapping one another.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use reqwest::header::{ACCEPT, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FetchError;

/// Issues a GET for `url` through `client` and decodes the JSON body as `T`.
///
/// `context` names the endpoint in decode errors.
///
/// # Errors
///
/// - [`FetchError::Transport`] if the request cannot be sent or the body
///   cannot be read.
/// - [`FetchError::Status`] on a non-2xx response.
/// - [`FetchError::Decode`] if the body does not match `T`.
pub async fn fetch_json<C, T>(client: &C, url: reqwest::Url, context: &str) -> Result<T, FetchError>
where
    C: HttpClient + ?Sized,
    T: DeserializeOwned,
{
    let mut req = reqwest::Request::new(reqwest::Method::GET, url.clone());
    req.headers_mut()
        .insert(ACCEPT, HeaderValue::from_static("application/json"));

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        });
    }

    let bytes = resp.bytes().await?;
    debug!(url = %url, bytes = bytes.len(), "Response received");

    serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode {
        context: context.to_string(),
        source,
    })
}
