use crate::cache::DEFAULT_ID_FLOOR;
use std::time::Duration;
use todo_sync_core::models::{TaskId, DEFAULT_OWNER};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://tasks.db";
pub const DEFAULT_ENDPOINT: &str = "https://dummyjson.com/todos";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub database_url: String,
    /// Bootstrap endpoint, fetched only while the local store is empty.
    pub endpoint: String,
    /// Owner stamped on tasks created locally.
    pub default_owner: i64,
    /// First identifier handed out when no tasks are loaded.
    pub id_floor: TaskId,
    pub max_connections: u32,
    /// `None` leaves the transport's own timeout behaviour in place.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_owner: DEFAULT_OWNER,
            id_floor: DEFAULT_ID_FLOOR,
            max_connections: 5,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `TODO_SYNC_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("TODO_SYNC_DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(endpoint) = lookup("TODO_SYNC_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(owner) = parse_var(&lookup, "TODO_SYNC_DEFAULT_OWNER") {
            config.default_owner = owner;
        }
        if let Some(floor) = parse_var(&lookup, "TODO_SYNC_ID_FLOOR") {
            config.id_floor = floor;
        }
        if let Some(max) = parse_var(&lookup, "TODO_SYNC_MAX_CONNECTIONS") {
            config.max_connections = max;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "TODO_SYNC_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        config
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}: cannot parse {:?}", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_without_environment() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn test_environment_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("TODO_SYNC_DATABASE_URL", "sqlite::memory:"),
            ("TODO_SYNC_ENDPOINT", "http://127.0.0.1:9000/todos"),
            ("TODO_SYNC_DEFAULT_OWNER", "7"),
            ("TODO_SYNC_ID_FLOOR", "1000"),
            ("TODO_SYNC_REQUEST_TIMEOUT_SECS", "30"),
            ("TODO_SYNC_MAX_CONNECTIONS", "not-a-number"),
        ]);
        let config = ClientConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.endpoint, "http://127.0.0.1:9000/todos");
        assert_eq!(config.default_owner, 7);
        assert_eq!(config.id_floor, 1000);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.max_connections, 5);
    }
}
