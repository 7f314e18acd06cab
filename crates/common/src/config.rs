use std::str::FromStr;

/// All configuration loaded from environment variables at startup.
/// Invalid values cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Dashboard
    pub dashboard_port: u16,

    // Scan defaults and parameter bounds (TOML)
    pub scan_config_path: String,

    // Market data
    pub yahoo_base_url: String,
    pub bar_cache_ttl_secs: u64,
    pub http_timeout_secs: u64,
}

impl Config {
    pub const DEFAULT_YAHOO_BASE_URL: &'static str = "https://query1.finance.yahoo.com";

    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Every variable has a default.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        Config {
            dashboard_port: parsed_env("DASHBOARD_PORT", 8080),
            scan_config_path: optional_env("SCAN_CONFIG_PATH")
                .unwrap_or_else(|| "config/scan.toml".to_string()),
            yahoo_base_url: optional_env("YAHOO_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| Self::DEFAULT_YAHOO_BASE_URL.to_string()),
            bar_cache_ttl_secs: parsed_env("BAR_CACHE_TTL_SECS", 3600),
            http_timeout_secs: parsed_env("HTTP_TIMEOUT_SECS", 15),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_env<T: FromStr>(key: &str, default: T) -> T {
    parse_or(key, optional_env(key).as_deref(), default)
}

fn parse_or<T: FromStr>(key: &str, raw: Option<&str>, default: T) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            panic!("Environment variable '{key}' has an invalid value: '{value}'")
        }),
        None => default,
    }
}
