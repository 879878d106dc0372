use std::env;
use std::time::Duration;

use crate::error::{CarsxeError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.carsxe.com";
pub const DEFAULT_SOURCE: &str = "rust";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Trait for types that can retrieve their configuration key from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Find the API key by checking environment variables first, then .env file
    fn find_key() -> Option<String> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();

        env::var(Self::KEY_NAME).ok().filter(|k| !k.trim().is_empty())
    }
}

/// Settings shared by every request a client makes.
///
/// Built once and handed to [`crate::CarsxeClient::new`]; the client never
/// mutates it afterwards.
#[derive(Clone)]
pub struct CarsxeConfig {
    pub api_key: String,
    pub base_url: String,
    /// Value of the `source` query parameter identifying this client.
    pub source: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for CarsxeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarsxeConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("source", &self.source)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl KeyFromEnv for CarsxeConfig {
    const KEY_NAME: &'static str = "CARSXE_API_KEY";
}

impl Default for CarsxeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl CarsxeConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Read configuration from the process environment (and `.env`).
    ///
    /// `CARSXE_API_KEY` is required. `CARSXE_BASE_URL`, `CARSXE_SOURCE` and
    /// `CARSXE_TIMEOUT_SECS` override the defaults when set.
    pub fn from_env() -> Result<Self> {
        let api_key = Self::find_key()
            .ok_or_else(|| CarsxeError::Config(format!("{} is not set", Self::KEY_NAME)))?;
        let mut config = Self::new(api_key);

        if let Some(base_url) = non_empty_var("CARSXE_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Some(source) = non_empty_var("CARSXE_SOURCE") {
            config = config.with_source(source);
        }
        if let Some(raw) = non_empty_var("CARSXE_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                CarsxeError::Config(format!("CARSXE_TIMEOUT_SECS must be whole seconds, got {raw:?}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Override the API base URL. Trailing slashes are stripped.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
