//! View-state holder sequencing station and reading loads.
//!
//! [`StationBrowser`] publishes its lists and a [`UiState`] through
//! `tokio::sync::watch` channels. Loads may overlap. Each list only takes
//! the result of the latest load of its kind, and the shared [`UiState`]
//! only takes the outcome of the latest load of either kind.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::infra::openaq::types::{LatestResult, Location};
use crate::resolver::ReadingResolver;
use crate::services::air_api::{AirQualityApi, StationQuery};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    Idle,
    Loading,
    Error(String),
}

pub struct StationBrowser<A> {
    resolver: ReadingResolver<A>,
    query: StationQuery,
    stations: watch::Sender<Vec<Location>>,
    latest: watch::Sender<Vec<LatestResult>>,
    state: watch::Sender<UiState>,
    selected: watch::Sender<Option<Location>>,
    stations_gen: AtomicU64,
    latest_gen: AtomicU64,
    // any load, guards the shared `state`
    state_gen: AtomicU64,
    // held across the generation check and the publish, never across an await
    publish: Mutex<()>,
}

impl<A: AirQualityApi> StationBrowser<A> {
    pub fn new(resolver: ReadingResolver<A>, query: StationQuery) -> Self {
        Self {
            resolver,
            query,
            stations: watch::Sender::new(Vec::new()),
            latest: watch::Sender::new(Vec::new()),
            state: watch::Sender::new(UiState::Idle),
            selected: watch::Sender::new(None),
            stations_gen: AtomicU64::new(0),
            latest_gen: AtomicU64::new(0),
            state_gen: AtomicU64::new(0),
            publish: Mutex::new(()),
        }
    }

    pub fn stations(&self) -> watch::Receiver<Vec<Location>> {
        self.stations.subscribe()
    }

    pub fn latest(&self) -> watch::Receiver<Vec<LatestResult>> {
        self.latest.subscribe()
    }

    pub fn state(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    /// The most recently opened station.
    pub fn selected(&self) -> Option<Location> {
        self.selected.borrow().clone()
    }

    pub async fn load_stations(&self) {
        let generation = self.stations_gen.fetch_add(1, Ordering::SeqCst) + 1;
        let state_generation = self.begin_loading();

        let result = self.resolver.list_stations(&self.query).await;

        let _guard = self.publish.lock().unwrap_or_else(PoisonError::into_inner);
        if self.stations_gen.load(Ordering::SeqCst) != generation {
            debug!(generation, "Station load superseded, dropping result");
            return;
        }
        let state = match result {
            Ok(list) => {
                self.stations.send_replace(list);
                UiState::Idle
            }
            Err(e) => {
                warn!(error = %e, "Failed to load stations");
                UiState::Error(message(&e, "Failed to load stations"))
            }
        };
        self.finish(state_generation, state);
    }

    /// Selects `location` and loads its latest readings.
    pub async fn open_station(&self, location: Location) {
        let id = location.id;
        self.selected.send_replace(Some(location));
        self.load_latest(id).await;
    }

    async fn load_latest(&self, location_id: i64) {
        let generation = self.latest_gen.fetch_add(1, Ordering::SeqCst) + 1;
        let state_generation = self.begin_loading();

        let result = self.resolver.resolve_latest(location_id).await;

        let _guard = self.publish.lock().unwrap_or_else(PoisonError::into_inner);
        if self.latest_gen.load(Ordering::SeqCst) != generation {
            debug!(location_id, generation, "Latest load superseded, dropping result");
            return;
        }
        let state = match result {
            Ok(readings) => {
                self.latest.send_replace(readings);
                UiState::Idle
            }
            Err(e) => {
                warn!(location_id, error = %e, "Failed to load latest");
                UiState::Error(message(&e, "Failed to load latest"))
            }
        };
        self.finish(state_generation, state);
    }

    fn begin_loading(&self) -> u64 {
        let _guard = self.publish.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = self.state_gen.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(UiState::Loading);
        generation
    }

    // caller holds `publish`
    fn finish(&self, state_generation: u64, state: UiState) {
        if self.state_gen.load(Ordering::SeqCst) == state_generation {
            self.state.send_replace(state);
        } else {
            debug!(state_generation, ?state, "Newer load in flight, state left untouched");
        }
    }
}

fn message(err: &FetchError, fallback: &str) -> String {
    let text = err.to_string();
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}
