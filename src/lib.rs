pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod present;
pub mod resolver;
pub mod services;
pub mod view;

pub use error::FetchError;
pub use infra::openaq::types::{LatestResult, Location};
pub use resolver::ReadingResolver;
pub use services::air_api::{AirQualityApi, StationQuery};
pub use view::{StationBrowser, UiState};
