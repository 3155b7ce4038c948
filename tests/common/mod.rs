//! In-memory [`AirQualityApi`] serving canned JSON bodies.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use kenya_air::FetchError;
use kenya_air::infra::openaq::types::{
    LatestRawResponse, LatestResponse, LocationsResponse, ParametersResponse, SensorsResponse,
};
use kenya_air::services::air_api::{AirQualityApi, StationQuery};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

#[derive(Default)]
pub struct FakeApi {
    pub locations: Option<Value>,
    pub container: HashMap<i64, Value>,
    pub raw: HashMap<i64, Value>,
    pub sensors: HashMap<i64, Value>,
    pub parameters: Option<Value>,
    /// Endpoints answering with a 503: "locations", "container", "raw",
    /// "sensors", "parameters".
    pub failing: HashSet<&'static str>,
    /// Delay applied to every call for a station.
    pub delays: HashMap<i64, Duration>,
    /// Delay applied to the station listing.
    pub locations_delay: Option<Duration>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn serve<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        location_id: Option<i64>,
        body: Option<&Value>,
    ) -> Result<T, FetchError> {
        let label = match location_id {
            Some(id) => format!("{endpoint}:{id}"),
            None => endpoint.to_string(),
        };
        self.calls.lock().unwrap().push(label.clone());

        let delay = match location_id {
            Some(id) => self.delays.get(&id).copied(),
            None if endpoint == "locations" => self.locations_delay,
            None => None,
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(endpoint) {
            return Err(FetchError::Status {
                status: 503,
                url: label,
                body: "unavailable".to_string(),
            });
        }

        let body = body.cloned().unwrap_or_else(|| json!({"results": []}));
        serde_json::from_value(body).map_err(|source| FetchError::Decode {
            context: endpoint.to_string(),
            source,
        })
    }
}

#[async_trait]
impl AirQualityApi for FakeApi {
    async fn locations(&self, _query: &StationQuery) -> Result<LocationsResponse, FetchError> {
        self.serve("locations", None, self.locations.as_ref()).await
    }

    async fn latest_container(&self, location_id: i64) -> Result<LatestResponse, FetchError> {
        self.serve("container", Some(location_id), self.container.get(&location_id))
            .await
    }

    async fn latest_raw(&self, location_id: i64) -> Result<LatestRawResponse, FetchError> {
        self.serve("raw", Some(location_id), self.raw.get(&location_id))
            .await
    }

    async fn sensors(&self, location_id: i64) -> Result<SensorsResponse, FetchError> {
        self.serve("sensors", Some(location_id), self.sensors.get(&location_id))
            .await
    }

    async fn parameters(&self) -> Result<ParametersResponse, FetchError> {
        self.serve("parameters", None, self.parameters.as_ref()).await
    }
}
