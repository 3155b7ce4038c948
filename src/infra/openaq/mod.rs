//! OpenAQ v3 client and response schemas.

pub mod client;
pub mod types;

pub use client::{DEFAULT_BASE_URL, LatestStyle, OpenAqClient};
