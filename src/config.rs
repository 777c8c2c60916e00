use std::env;
use std::time::Duration;

use crate::links::DEFAULT_LINK_ORIGIN;
use crate::window::PAST_WINDOW_DAYS;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub stats_region: String,
    pub stats_timespan: String,
    pub rankings_region: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub past_window_days: u32,
    pub link_origin: String,
    pub demo_feed: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    /// Load `.env.local` / `.env` first so both feed the process environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).and_then(|val| non_empty(&val));

        let base_url = get("API_URL")
            .or_else(|| get("REACT_APP_API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_secs = get("REQUEST_TIMEOUT_SECS")
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);
        let past_window_days = get("PAST_WINDOW_DAYS")
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(PAST_WINDOW_DAYS)
            .clamp(1, 365);
        let demo_feed = get("DEMO_FEED")
            .map(|val| matches!(val.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            api: ApiConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                timeout: Duration::from_secs(timeout_secs),
                stats_region: get("STATS_REGION").unwrap_or_else(|| "na".to_string()),
                stats_timespan: get("STATS_TIMESPAN").unwrap_or_else(|| "all".to_string()),
                rankings_region: get("RANKINGS_REGION").unwrap_or_else(|| "na".to_string()),
            },
            past_window_days,
            link_origin: get("LINK_ORIGIN").unwrap_or_else(|| DEFAULT_LINK_ORIGIN.to_string()),
            demo_feed,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
