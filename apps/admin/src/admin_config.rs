use std::env;
use std::time::Duration;

use leasedesk_core::{AppError, AppResult};
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000/api";
const DEFAULT_CACHE_TTL_SECONDS: u32 = 300;
const DEFAULT_CLOSE_DELAY_MS: u64 = 1500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub render_base_url: String,
    pub http_timeout: Option<Duration>,
    pub cache_ttl_seconds: u32,
    pub close_delay: Duration,
}

impl AdminConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let api_base_url = base_url(
            "LEASEDESK_API_BASE_URL",
            lookup("LEASEDESK_API_BASE_URL")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned()),
        )?;
        let render_base_url = match lookup("LEASEDESK_RENDER_BASE_URL")
            .filter(|value| !value.trim().is_empty())
        {
            Some(value) => base_url("LEASEDESK_RENDER_BASE_URL", value)?,
            None => api_base_url.clone(),
        };
        let api_token = lookup("LEASEDESK_API_TOKEN")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let http_timeout = match lookup("LEASEDESK_HTTP_TIMEOUT_SECONDS") {
            Some(value) => {
                let seconds = parse_u64("LEASEDESK_HTTP_TIMEOUT_SECONDS", &value)?;
                if seconds == 0 {
                    return Err(AppError::Validation(
                        "LEASEDESK_HTTP_TIMEOUT_SECONDS must be greater than zero".to_owned(),
                    ));
                }
                Some(Duration::from_secs(seconds))
            }
            None => None,
        };

        let cache_ttl_seconds = match lookup("LEASEDESK_CACHE_TTL_SECONDS") {
            Some(value) => parse_u32("LEASEDESK_CACHE_TTL_SECONDS", &value)?,
            None => DEFAULT_CACHE_TTL_SECONDS,
        };
        let close_delay_ms = match lookup("LEASEDESK_EDITOR_CLOSE_DELAY_MS") {
            Some(value) => parse_u64("LEASEDESK_EDITOR_CLOSE_DELAY_MS", &value)?,
            None => DEFAULT_CLOSE_DELAY_MS,
        };

        Ok(Self {
            api_base_url,
            api_token,
            render_base_url,
            http_timeout,
            cache_ttl_seconds,
            close_delay: Duration::from_millis(close_delay_ms),
        })
    }
}

fn base_url(name: &str, value: String) -> AppResult<String> {
    let trimmed = value.trim().trim_end_matches('/').to_owned();
    Url::parse(trimmed.as_str())
        .map_err(|error| AppError::Validation(format!("invalid {name} value '{value}': {error}")))?;
    Ok(trimmed)
}

fn parse_u32(name: &str, value: &str) -> AppResult<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|error| AppError::Validation(format!("invalid {name} value '{value}': {error}")))
}

fn parse_u64(name: &str, value: &str) -> AppResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|error| AppError::Validation(format!("invalid {name} value '{value}': {error}")))
}
