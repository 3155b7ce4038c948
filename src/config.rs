//! Runtime configuration read from the environment (and `.env`).
//!
//! | variable              | default                    |
//! |-----------------------|----------------------------|
//! | `OPENAQ_API_KEY`      | required                   |
//! | `OPENAQ_BASE_URL`     | `https://api.openaq.org/`  |
//! | `OPENAQ_TIMEOUT_SECS` | `30`                       |
//! | `OPENAQ_LATEST_STYLE` | `path` (or `query`)        |

use std::fmt;

use anyhow::{Context, Result, anyhow};

use crate::fetch::BasicClient;
use crate::fetch::auth::ApiKey;
use crate::infra::openaq::{DEFAULT_BASE_URL, LatestStyle, OpenAqClient};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub latest_style: LatestStyle,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("latest_style", &self.latest_style)
            .finish()
    }
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAQ_API_KEY").ok_or_else(|| anyhow!("OPENAQ_API_KEY must be set"))?;
        let base_url = get("OPENAQ_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = match get("OPENAQ_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("OPENAQ_TIMEOUT_SECS is not a number: '{raw}'"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let latest_style = match get("OPENAQ_LATEST_STYLE") {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| anyhow!(e))
                .context("invalid OPENAQ_LATEST_STYLE")?,
            None => LatestStyle::default(),
        };

        Ok(Self {
            api_key,
            base_url,
            timeout_secs,
            latest_style,
        })
    }

    /// Builds the authenticated OpenAQ client this configuration describes.
    pub fn build_client(&self) -> Result<OpenAqClient<ApiKey<BasicClient>>> {
        let http = BasicClient::with_timeout(self.timeout_secs).context("building HTTP client")?;
        let http = ApiKey::openaq(http, &self.api_key)?;
        let client = OpenAqClient::with_base_url(http, &self.base_url)?
            .with_latest_style(self.latest_style);
        Ok(client)
    }
}
