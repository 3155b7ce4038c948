pub mod air_api;
