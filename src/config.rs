// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub video_source: VideoSourceConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL. When absent the service keeps its state in memory.
    pub url: Option<String>,
    pub max_connections: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSourceConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub page_size: u32,
    pub max_items: usize,
    pub default_duration_secs: u32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub capacity: usize,
}

impl Default for VideoSourceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            page_size: 50,
            max_items: 50,
            default_duration_secs: 300,
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenv::dotenv();

        let defaults = VideoSourceConfig::default();

        Ok(Config {
            database: DatabaseConfig {
                url: optional_var("DATABASE_URL"),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: parse_var("SERVER_PORT", 8080)?,
            },
            api: ApiConfig {
                enable_cors: parse_var("API_ENABLE_CORS", true)?,
            },
            video_source: VideoSourceConfig {
                api_key: optional_var("YOUTUBE_API_KEY"),
                base_url: optional_var("YOUTUBE_API_BASE_URL").unwrap_or(defaults.base_url),
                page_size: parse_var("VIDEO_PAGE_SIZE", defaults.page_size)?,
                max_items: parse_var("VIDEO_MAX_ITEMS", defaults.max_items)?,
                default_duration_secs: parse_var(
                    "VIDEO_DEFAULT_DURATION_SECS",
                    defaults.default_duration_secs,
                )?,
                request_timeout_secs: parse_var(
                    "VIDEO_REQUEST_TIMEOUT_SECS",
                    defaults.request_timeout_secs,
                )?,
            },
            notifications: NotificationConfig {
                capacity: parse_var("NOTIFICATION_CAPACITY", 256)?,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid value, got {:?}", name, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_falls_back_to_default_when_unset() {
        let value: u32 = parse_var("CHANNEL_BOOSTER_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn parse_var_rejects_malformed_numbers() {
        env::set_var("CHANNEL_BOOSTER_TEST_BAD_PORT", "eighty");
        let result: Result<u16> = parse_var("CHANNEL_BOOSTER_TEST_BAD_PORT", 8080);
        env::remove_var("CHANNEL_BOOSTER_TEST_BAD_PORT");
        assert!(result.is_err());
    }

    #[test]
    fn video_source_defaults_match_platform_limits() {
        let defaults = VideoSourceConfig::default();
        assert_eq!(defaults.page_size, 50);
        assert_eq!(defaults.max_items, 50);
        assert_eq!(defaults.default_duration_secs, 300);
    }
}
