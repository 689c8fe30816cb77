// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use std::{env, fmt::Display, str::FromStr, time::Duration};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_STORAGE_URL: &str = "sqlite://database/client.db";
const DEFAULT_LOG_FILE: &str = "database/client.log";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub api_url: String,
    pub storage_url: String,
    pub log_file: String,
    /// `None` leaves the HTTP client's default in place.
    pub http_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Reads the configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = load_or(&lookup, "TODO_API_URL", DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();
        let storage_url = load_or(&lookup, "TODO_STORAGE_URL", DEFAULT_STORAGE_URL);
        let log_file = load_or(&lookup, "TODO_LOG_FILE", DEFAULT_LOG_FILE);
        let http_timeout =
            try_parse::<u64, _>(&lookup, "TODO_HTTP_TIMEOUT_SECS")?.map(Duration::from_secs);

        Ok(Self {
            api_url,
            storage_url,
            log_file,
            http_timeout,
        })
    }
}

fn load_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn try_parse<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|value| !value.trim().is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid {key} value: {raw}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.api_url, "http://127.0.0.1:8000");
        assert_eq!(config.storage_url, "sqlite://database/client.db");
        assert_eq!(config.http_timeout, None);
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("TODO_API_URL", "https://todo.example.com/api/v1/"),
            ("TODO_HTTP_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://todo.example.com/api/v1");
        assert_eq!(config.http_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_invalid_timeout_is_an_error() {
        let result =
            ClientConfig::from_lookup(lookup_from(&[("TODO_HTTP_TIMEOUT_SECS", "soon")]));

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("TODO_HTTP_TIMEOUT_SECS"));
    }
}
