//! Trait and query types for an air-quality data source.

use crate::error::FetchError;
use crate::infra::openaq::types::{
    LatestRawResponse, LatestResponse, LocationsResponse, ParametersResponse, SensorsResponse,
};

/// Filter and page selection for the station list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationQuery {
    /// ISO 3166 alpha-2 country code.
    pub country: String,
    /// Page size.
    pub limit: u32,
    /// 1-based page number.
    pub page: u32,
}

impl Default for StationQuery {
    fn default() -> Self {
        Self {
            country: "KE".to_string(),
            limit: 100,
            page: 1,
        }
    }
}

impl StationQuery {
    /// Default filter and page size, selecting `page`.
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }
}

/// Abstraction over the upstream API (e.g., OpenAQ v3).
///
/// Each method is one endpoint decoded into one schema. No method
/// interprets the data; joining and fallback live in
/// [`crate::resolver::ReadingResolver`].
#[async_trait::async_trait]
pub trait AirQualityApi: Send + Sync {
    /// Stations matching `query`, in upstream order.
    async fn locations(&self, query: &StationQuery) -> Result<LocationsResponse, FetchError>;

    /// Latest readings for a station, decoded as the container shape.
    async fn latest_container(&self, location_id: i64) -> Result<LatestResponse, FetchError>;

    /// Latest readings for a station, decoded as the raw shape.
    async fn latest_raw(&self, location_id: i64) -> Result<LatestRawResponse, FetchError>;

    /// Sensors installed at a station.
    async fn sensors(&self, location_id: i64) -> Result<SensorsResponse, FetchError>;

    /// The global parameter catalog.
    async fn parameters(&self) -> Result<ParametersResponse, FetchError>;
}
