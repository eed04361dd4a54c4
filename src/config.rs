use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "RxCheck";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sentinel user id for the demo account. History for this user never
/// leaves the local store.
pub const DEMO_USER_ID: &str = "demo-user";

const DEFAULT_BIND: &str = "127.0.0.1:8787";
const DEFAULT_LLM_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_LLM_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
const DEFAULT_RXNAV_BASE_URL: &str = "https://rxnav.nlm.nih.gov";
pub const DEFAULT_BATCH_CONCURRENCY: usize = 3;

/// Get the application data directory
/// ~/RxCheck/ on all platforms. Falls back to the working directory when
/// no home directory can be determined (containers, CI).
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the local history database
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("history.db")
}

/// Log filter used when `RUST_LOG` is not set
pub fn default_log_filter() -> &'static str {
    "rxcheck_lib=info,rxcheck=info,tower_http=warn"
}

/// Runtime configuration, read from `RXCHECK_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub llm_timeout_secs: u64,
    pub rxnav_base_url: String,
    /// Hosted document store. `None` keeps every user on the local store.
    pub remote_store_url: Option<String>,
    pub batch_concurrency: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8787))),
            db_path: default_db_path(),
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_api_key: None,
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            rxnav_base_url: DEFAULT_RXNAV_BASE_URL.to_string(),
            remote_store_url: None,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }
}

impl AppConfig {
    /// Build the config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Invalid values are
    /// logged and replaced by defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(bind) = get("RXCHECK_BIND") {
            match bind.parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(e) => tracing::warn!(value = %bind, error = %e, "Invalid RXCHECK_BIND, using default"),
            }
        }
        if let Some(path) = get("RXCHECK_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(url) = get("RXCHECK_LLM_BASE_URL") {
            config.llm_base_url = url;
        }
        if let Some(model) = get("RXCHECK_LLM_MODEL") {
            config.llm_model = model;
        }
        config.llm_api_key = get("RXCHECK_LLM_API_KEY");
        if let Some(secs) = get("RXCHECK_LLM_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(v) => config.llm_timeout_secs = v,
                Err(e) => tracing::warn!(value = %secs, error = %e, "Invalid RXCHECK_LLM_TIMEOUT_SECS, using default"),
            }
        }
        if let Some(url) = get("RXCHECK_RXNAV_BASE_URL") {
            config.rxnav_base_url = url;
        }
        config.remote_store_url = get("RXCHECK_REMOTE_STORE_URL");
        if let Some(n) = get("RXCHECK_BATCH_CONCURRENCY") {
            match n.parse::<usize>() {
                Ok(v) if v > 0 => config.batch_concurrency = v,
                _ => tracing::warn!(value = %n, "Invalid RXCHECK_BATCH_CONCURRENCY, using default"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("RxCheck"));
    }

    #[test]
    fn db_under_app_data() {
        assert!(default_db_path().starts_with(app_data_dir()));
    }

    #[test]
    fn defaults_without_env() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.bind_addr.port(), 8787);
        assert_eq!(config.llm_model, "gemini-1.5-flash");
        assert!(config.llm_api_key.is_none());
        assert!(config.remote_store_url.is_none());
        assert_eq!(config.batch_concurrency, 3);
    }

    #[test]
    fn env_overrides_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("RXCHECK_BIND", "0.0.0.0:9000"),
            ("RXCHECK_LLM_MODEL", "gemini-2.0-flash"),
            ("RXCHECK_LLM_API_KEY", "secret"),
            ("RXCHECK_REMOTE_STORE_URL", "https://store.example.com"),
            ("RXCHECK_BATCH_CONCURRENCY", "5"),
        ]));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.llm_model, "gemini-2.0-flash");
        assert_eq!(config.llm_api_key.as_deref(), Some("secret"));
        assert_eq!(
            config.remote_store_url.as_deref(),
            Some("https://store.example.com")
        );
        assert_eq!(config.batch_concurrency, 5);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("RXCHECK_BIND", "not-an-addr"),
            ("RXCHECK_BATCH_CONCURRENCY", "0"),
            ("RXCHECK_LLM_TIMEOUT_SECS", "soon"),
            ("RXCHECK_LLM_API_KEY", "   "),
        ]));
        assert_eq!(config.bind_addr.port(), 8787);
        assert_eq!(config.batch_concurrency, 3);
        assert_eq!(config.llm_timeout_secs, 120);
        assert!(config.llm_api_key.is_none());
    }

    #[test]
    fn app_name_is_rxcheck() {
        assert_eq!(APP_NAME, "RxCheck");
    }
}
