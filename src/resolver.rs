//! Normalizes the API's "latest readings" shapes into [`LatestResult`]s.
//!
//! Resolution order for one station:
//! 1. Container shape. If it yields any readings they are returned as-is.
//! 2. Raw shape, joined with the station's sensors and the parameter
//!    catalog to recover each reading's parameter identity.
//!
//! Transport or decode failures in step 1 end the call; the fallback only
//! compensates for empty results.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::FetchError;
use crate::infra::openaq::types::{
    DateTimePair, LatestRawItem, LatestResult, Location, ParameterDef, Sensor,
};
use crate::services::air_api::{AirQualityApi, StationQuery};

/// Returns the first `Some` among `candidates`, in order.
///
/// Every preference chain in the join goes through here so the order stays
/// readable in one place.
pub fn first_present<T, I>(candidates: I) -> Option<T>
where
    I: IntoIterator<Item = Option<T>>,
{
    candidates.into_iter().flatten().next()
}

/// Parameter identity recovered for one sensor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamInfo {
    pub code: Option<String>,
    pub display_name: Option<String>,
    pub unit: Option<String>,
}

impl ParamInfo {
    /// Resolves a sensor against the catalog entry its `parametersId` points at.
    ///
    /// Embedded sensor info beats the catalog; for the unit, the sensor's own
    /// `unit` field sits between the two. The display name falls back to the
    /// uppercased code.
    pub fn resolve(sensor: &Sensor, catalog_entry: Option<&ParameterDef>) -> Self {
        let embedded = sensor.parameter.as_ref();

        let code = first_present([
            embedded.and_then(|p| p.code.clone()),
            catalog_entry.and_then(|c| c.code.clone()),
        ]);
        let display_name = first_present([
            embedded.and_then(|p| p.name.clone()),
            catalog_entry.and_then(|c| c.name.clone()),
            code.as_ref().map(|c| c.to_uppercase()),
        ]);
        let unit = first_present([
            embedded.and_then(|p| p.units.clone()),
            sensor.unit.clone(),
            catalog_entry.and_then(|c| c.units.clone()),
        ]);

        Self {
            code,
            display_name,
            unit,
        }
    }
}

/// Builds the sensor id -> parameter info lookup.
///
/// Sensors without an id cannot be referenced and are skipped, so a raw item
/// with no `sensorsId` never joins, not even to an id-less sensor. On
/// duplicate ids the later sensor wins.
pub fn sensor_lookup(sensors: &[Sensor], catalog: &[ParameterDef]) -> HashMap<i64, ParamInfo> {
    let by_id: HashMap<i64, &ParameterDef> = catalog
        .iter()
        .filter_map(|def| def.id.map(|id| (id, def)))
        .collect();

    sensors
        .iter()
        .filter_map(|sensor| {
            let id = sensor.id?;
            let entry = sensor.parameters_id.and_then(|pid| by_id.get(&pid).copied());
            Some((id, ParamInfo::resolve(sensor, entry)))
        })
        .collect()
}

/// Maps one raw item into a canonical reading.
///
/// Parameter fields come from `info` and are all `None` when the sensor is
/// unknown; value and time always come from the item.
pub fn normalize_raw(item: &LatestRawItem, info: Option<&ParamInfo>) -> LatestResult {
    let current = item.datetime.as_ref();
    let legacy = item.date.as_ref();

    LatestResult {
        parameter: info.and_then(|i| i.code.clone()),
        unit: info.and_then(|i| i.unit.clone()),
        value: item.value,
        display_name: info.and_then(|i| i.display_name.clone()),
        datetime: Some(DateTimePair {
            utc: first_present([
                current.and_then(|d| d.utc.clone()),
                legacy.and_then(|d| d.utc.clone()),
            ]),
            local: first_present([
                current.and_then(|d| d.local.clone()),
                legacy.and_then(|d| d.local.clone()),
            ]),
        }),
        quality: None,
        entity: None,
        sensor_type: None,
        date: None,
        last_updated: None,
    }
}

/// Joins raw items with sensors and the catalog, preserving item order.
pub fn join_raw(
    raw: &[LatestRawItem],
    sensors: &[Sensor],
    catalog: &[ParameterDef],
) -> Vec<LatestResult> {
    let lookup = sensor_lookup(sensors, catalog);
    raw.iter()
        .map(|item| {
            let info = item.sensors_id.and_then(|id| lookup.get(&id));
            normalize_raw(item, info)
        })
        .collect()
}

/// Station listing and latest-reading resolution over an [`AirQualityApi`].
pub struct ReadingResolver<A> {
    api: A,
}

impl<A: AirQualityApi> ReadingResolver<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Stations for one page, in upstream order.
    ///
    /// # Errors
    ///
    /// Propagates any [`FetchError`] from the API unchanged.
    #[tracing::instrument(skip(self), fields(country = %query.country, page = query.page))]
    pub async fn list_stations(&self, query: &StationQuery) -> Result<Vec<Location>, FetchError> {
        let resp = self.api.locations(query).await?;
        info!(meta = ?resp.meta, count = resp.results.len(), "Locations fetched");
        Ok(resp.results)
    }

    /// Latest readings for a station, one per upstream data point.
    ///
    /// # Errors
    ///
    /// A failure of the container fetch is returned without attempting the
    /// fallback. A failure of any fallback fetch aborts the fallback.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_latest(&self, location_id: i64) -> Result<Vec<LatestResult>, FetchError> {
        let container = self.api.latest_container(location_id).await?;
        let flat: Vec<LatestResult> = container
            .results
            .into_iter()
            .flat_map(|c| c.into_readings())
            .collect();

        if !flat.is_empty() {
            info!(location_id, count = flat.len(), "Latest (container)");
            debug_preview(&flat);
            return Ok(flat);
        }

        debug!(location_id, "Container shape empty, falling back to raw + sensors + catalog");
        let (raw, sensors, catalog) = tokio::try_join!(
            self.api.latest_raw(location_id),
            self.api.sensors(location_id),
            self.api.parameters(),
        )?;

        let flat = join_raw(&raw.results, &sensors.results, &catalog.results);
        info!(
            location_id,
            count = flat.len(),
            sensors = sensors.results.len(),
            catalog = catalog.results.len(),
            "Latest (raw+sensors+catalog)"
        );
        debug_preview(&flat);
        Ok(flat)
    }
}

fn debug_preview(readings: &[LatestResult]) {
    for (i, r) in readings.iter().take(5).enumerate() {
        debug!(
            index = i,
            parameter = ?r.parameter,
            value = ?r.value,
            unit = ?r.unit,
            time = ?crate::present::reading_timestamp(r),
            "Reading"
        );
    }
}
