use crate::error::FetchError;
use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// Header OpenAQ reads the API key from.
pub const OPENAQ_KEY_HEADER: &str = "X-API-Key";

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header on
/// every request.
///
/// The header name and value are validated once at construction, so
/// `execute` never fails on a malformed key.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    key: HeaderValue,
}

impl<C> ApiKey<C> {
    /// Wraps `inner`, sending `key` in the header `header_name`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidHeader`] if either part is not a legal
    /// header name/value.
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self, FetchError> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .map_err(|e| FetchError::InvalidHeader(format!("{header_name}: {e}")))?;
        let mut key = HeaderValue::from_str(key)
            .map_err(|e| FetchError::InvalidHeader(format!("API key value: {e}")))?;
        key.set_sensitive(true);

        Ok(Self {
            inner,
            header_name,
            key,
        })
    }

    /// Convenience constructor for OpenAQ's `X-API-Key` header.
    pub fn openaq(inner: C, key: &str) -> Result<Self, FetchError> {
        Self::new(inner, OPENAQ_KEY_HEADER, key)
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.key.clone());
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::BasicClient;

    #[test]
    fn test_rejects_newline_in_key() {
        let result = ApiKey::openaq(BasicClient::new(), "abc\ndef");
        assert!(matches!(result, Err(FetchError::InvalidHeader(_))));
    }

    #[test]
    fn test_rejects_bad_header_name() {
        let result = ApiKey::new(BasicClient::new(), "bad header", "abc");
        assert!(matches!(result, Err(FetchError::InvalidHeader(_))));
    }

    #[test]
    fn test_key_is_marked_sensitive() {
        let client = ApiKey::openaq(BasicClient::new(), "secret").unwrap();
        assert!(client.key.is_sensitive());
        assert_eq!(client.header_name.as_str(), "x-api-key");
    }
}
