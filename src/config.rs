//! Environment-backed configuration.

use anyhow::{anyhow, Result};
use std::env;

const DEFAULT_TIMEZONE_API_URL: &str = "https://www.timeapi.io";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the maps search provider.
    pub maps_search_url: String,
    /// API key for the maps search provider.
    pub maps_api_key: String,
    /// Base URL of the coordinate→timezone lookup API.
    pub timezone_api_url: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let maps_search_url = lookup("GEOTZ_MAPS_SEARCH_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("GEOTZ_MAPS_SEARCH_URL must be set"))?;

        let maps_api_key = lookup("GEOTZ_MAPS_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("GEOTZ_MAPS_API_KEY must be set"))?;

        let timezone_api_url = lookup("GEOTZ_TIMEZONE_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE_API_URL.to_string());

        let host = lookup("GEOTZ_HOST")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("GEOTZ_PORT").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow!("Invalid GEOTZ_PORT"))?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            maps_search_url,
            maps_api_key,
            timezone_api_url,
            host,
            port,
        })
    }
}
