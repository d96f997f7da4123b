//! Client configuration: where the backend is and where the token lives.

use std::path::PathBuf;
use std::time::Duration;

use crate::TradedeskError;

/// Backend host used when `TRADEDESK_API_HOST` is unset.
pub const DEFAULT_API_HOST: &str = "http://127.0.0.1:8000";

/// Path prefix of every API route.
pub const DEFAULT_API_BASE: &str = "/api";

/// Token file used when `TRADEDESK_TOKEN_PATH` is unset.
pub const DEFAULT_TOKEN_PATH: &str = ".tradedesk/session.json";

pub const ENV_API_HOST: &str = "TRADEDESK_API_HOST";
pub const ENV_API_BASE: &str = "TRADEDESK_API_BASE";
pub const ENV_TOKEN_PATH: &str = "TRADEDESK_TOKEN_PATH";
pub const ENV_HTTP_TIMEOUT: &str = "TRADEDESK_HTTP_TIMEOUT_SECS";

/// Everything the client needs to reach the backend.
///
/// Build it by hand, or from the environment with
/// [`from_env`](Self::from_env):
///
/// | field          | variable                      | default                    |
/// |----------------|-------------------------------|----------------------------|
/// | `api_host`     | `TRADEDESK_API_HOST`          | `http://127.0.0.1:8000`    |
/// | `api_base`     | `TRADEDESK_API_BASE`          | `/api`                     |
/// | `token_path`   | `TRADEDESK_TOKEN_PATH`        | `.tradedesk/session.json`  |
/// | `timeout_secs` | `TRADEDESK_HTTP_TIMEOUT_SECS` | `30`                       |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_host: String,
    pub api_base: String,
    pub token_path: PathBuf,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    /// [`TradedeskError::Config`] if a variable is set but malformed.
    pub fn from_env() -> Result<Self, TradedeskError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to the
    /// defaults for anything it returns `None` (or an empty string) for.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, TradedeskError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let timeout_secs = match get(ENV_HTTP_TIMEOUT) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                TradedeskError::Config(format!("{ENV_HTTP_TIMEOUT}={raw:?}: {e}"))
            })?,
            None => defaults.timeout_secs,
        };
        if timeout_secs == 0 {
            return Err(TradedeskError::Config(format!(
                "{ENV_HTTP_TIMEOUT} must be at least 1"
            )));
        }

        Ok(Self {
            api_host: get(ENV_API_HOST).unwrap_or(defaults.api_host),
            api_base: get(ENV_API_BASE).unwrap_or(defaults.api_base),
            token_path: get(ENV_TOKEN_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.token_path),
            timeout_secs,
        })
    }

    /// The API root: host and base joined with exactly one slash.
    pub fn api_url(&self) -> String {
        let host = self.api_host.trim_end_matches('/');
        let base = self.api_base.trim_matches('/');
        if base.is_empty() {
            host.to_string()
        } else {
            format!("{host}/{base}")
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
