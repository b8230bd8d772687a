use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub analyzer: AnalyzerConfig,
    pub host: HostConfig,
}

/// Remote analyzer (OCR + classification) settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    /// Log every decoded host request at debug level.
    pub trace_requests: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig {
                api_key: env::var("LUPE_ANALYZER_API_KEY").ok(),
                base_url: env::var("LUPE_ANALYZER_BASE_URL").ok(),
                timeout_secs: parse_env_or("LUPE_ANALYZER_TIMEOUT", 60),
                max_retries: parse_env_or("LUPE_ANALYZER_MAX_RETRIES", 3),
                enabled: parse_env_or("LUPE_ANALYZER_ENABLED", true),
            },
            host: HostConfig {
                trace_requests: parse_env_or("LUPE_TRACE_REQUESTS", false),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
