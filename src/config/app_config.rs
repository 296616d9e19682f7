use std::env;
use std::time::Duration;

/// Production endpoint of the homework review API.
const DEFAULT_API_URL: &str =
    "https://praktikum.yandex.ru/api/user_api/homework_statuses/";

/// Poll interval between successful iterations (seconds).
const DEFAULT_POLL_INTERVAL_SECS: u64 = 1200;

/// First retry delay after a failed iteration (seconds).
const DEFAULT_RETRY_INITIAL_SECS: u64 = 5;

/// Retry delay ceiling (seconds).
const DEFAULT_RETRY_MAX_SECS: u64 = 300;

/// Application configuration, loaded once at startup and passed into the
/// components explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub praktikum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,

    pub api_url: String,
    pub poll_interval: Duration,
    pub retry_initial: Duration,
    pub retry_max: Duration,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// `PRAKTIKUM_TOKEN`, `TELEGRAM_TOKEN` and `TELEGRAM_CHAT_ID` are
    /// required; the endpoint and the intervals have defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let praktikum_token =
            env::var("PRAKTIKUM_TOKEN").map_err(|_| ConfigError::MissingVar("PRAKTIKUM_TOKEN"))?;
        let telegram_token =
            env::var("TELEGRAM_TOKEN").map_err(|_| ConfigError::MissingVar("TELEGRAM_TOKEN"))?;
        let telegram_chat_id = env::var("TELEGRAM_CHAT_ID")
            .map_err(|_| ConfigError::MissingVar("TELEGRAM_CHAT_ID"))?;

        let api_url = env::var("PRAKTIKUM_API_URL").unwrap_or_else(|_| {
            tracing::debug!("PRAKTIKUM_API_URL not set, using production endpoint");
            DEFAULT_API_URL.to_string()
        });

        let poll_interval = read_interval("POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;
        let retry_initial = read_interval("RETRY_INITIAL_SECS", DEFAULT_RETRY_INITIAL_SECS)?;
        let retry_max = read_interval("RETRY_MAX_SECS", DEFAULT_RETRY_MAX_SECS)?;

        if retry_initial > retry_max {
            return Err(ConfigError::InvalidInterval("RETRY_INITIAL_SECS"));
        }

        Ok(Self {
            praktikum_token,
            telegram_token,
            telegram_chat_id,
            api_url,
            poll_interval,
            retry_initial,
            retry_max,
        })
    }
}

/// Reads a seconds interval from the environment, falling back to `default`.
fn read_interval(var: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env::var(var) {
        Ok(raw) => {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidInterval(var))?;
            if secs == 0 {
                return Err(ConfigError::InvalidInterval(var));
            }
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
    #[error("{0} must be a positive number of seconds")]
    InvalidInterval(&'static str),
}
