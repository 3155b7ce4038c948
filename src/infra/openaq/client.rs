use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::error::FetchError;
use crate::fetch::{HttpClient, fetch_json};
use crate::infra::openaq::types::{
    LatestRawResponse, LatestResponse, LocationsResponse, ParametersResponse, SensorsResponse,
};
use crate::services::air_api::{AirQualityApi, StationQuery};

pub const DEFAULT_BASE_URL: &str = "https://api.openaq.org/";

/// Page size requested from the latest-readings endpoints.
const LATEST_LIMIT: u32 = 100;

/// Which endpoint serves the container-shape latest readings.
///
/// `Path` is `/v3/locations/{id}/latest`; `Query` is
/// `/v3/latest?location_id={id}`. The raw-shape fetch always uses the path
/// endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LatestStyle {
    #[default]
    Path,
    Query,
}

impl FromStr for LatestStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "path" => Ok(LatestStyle::Path),
            "query" => Ok(LatestStyle::Query),
            other => Err(format!("unknown latest endpoint style '{other}' (expected path or query)")),
        }
    }
}

impl fmt::Display for LatestStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatestStyle::Path => write!(f, "path"),
            LatestStyle::Query => write!(f, "query"),
        }
    }
}

/// OpenAQ v3 client over any [`HttpClient`].
///
/// Authentication is the transport's job: wrap the client in
/// [`crate::fetch::auth::ApiKey`] before handing it over. Use
/// [`OpenAqClient::with_base_url`] to point at a mock server in tests.
pub struct OpenAqClient<C> {
    http: C,
    base_url: Url,
    latest_style: LatestStyle,
}

impl<C: HttpClient> OpenAqClient<C> {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Never in practice; shares the signature of
    /// [`OpenAqClient::with_base_url`].
    pub fn new(http: C) -> Result<Self, FetchError> {
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(http: C, base_url: &str) -> Result<Self, FetchError> {
        // exactly one trailing slash, so `join` appends instead of replacing
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| FetchError::InvalidUrl(format!("'{base_url}': {e}")))?;

        Ok(Self {
            http,
            base_url,
            latest_style: LatestStyle::default(),
        })
    }

    pub fn with_latest_style(mut self, style: LatestStyle) -> Self {
        self.latest_style = style;
        self
    }

    pub fn latest_style(&self) -> LatestStyle {
        self.latest_style
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::InvalidUrl(format!("'{path}': {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    fn latest_path_url(&self, location_id: i64) -> Result<Url, FetchError> {
        self.endpoint(
            &format!("v3/locations/{location_id}/latest"),
            &[("limit", LATEST_LIMIT.to_string())],
        )
    }
}

#[async_trait]
impl<C: HttpClient> AirQualityApi for OpenAqClient<C> {
    #[tracing::instrument(skip(self), fields(country = %query.country, page = query.page))]
    async fn locations(&self, query: &StationQuery) -> Result<LocationsResponse, FetchError> {
        let url = self.endpoint(
            "v3/locations",
            &[
                ("iso", query.country.clone()),
                ("limit", query.limit.to_string()),
                ("page", query.page.to_string()),
            ],
        )?;
        fetch_json(&self.http, url, "locations").await
    }

    #[tracing::instrument(skip(self), fields(style = %self.latest_style))]
    async fn latest_container(&self, location_id: i64) -> Result<LatestResponse, FetchError> {
        let url = match self.latest_style {
            LatestStyle::Path => self.latest_path_url(location_id)?,
            LatestStyle::Query => self.endpoint(
                "v3/latest",
                &[
                    ("location_id", location_id.to_string()),
                    ("limit", LATEST_LIMIT.to_string()),
                ],
            )?,
        };
        debug!(url = %url, "Fetching latest (container shape)");
        fetch_json(&self.http, url, "latest (container)").await
    }

    #[tracing::instrument(skip(self))]
    async fn latest_raw(&self, location_id: i64) -> Result<LatestRawResponse, FetchError> {
        let url = self.latest_path_url(location_id)?;
        fetch_json(&self.http, url, "latest (raw)").await
    }

    #[tracing::instrument(skip(self))]
    async fn sensors(&self, location_id: i64) -> Result<SensorsResponse, FetchError> {
        let url = self.endpoint(&format!("v3/locations/{location_id}/sensors"), &[])?;
        fetch_json(&self.http, url, "sensors").await
    }

    #[tracing::instrument(skip(self))]
    async fn parameters(&self) -> Result<ParametersResponse, FetchError> {
        let url = self.endpoint("v3/parameters", &[])?;
        fetch_json(&self.http, url, "parameters").await
    }
}
