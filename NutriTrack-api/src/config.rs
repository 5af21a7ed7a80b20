//! Server settings read from the environment.

use std::env;
use std::net::SocketAddr;

use tracing::warn;

use nutri_track_domain::services::background::DEFAULT_SYNC_QUEUE_CAPACITY;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Capacity of the background sync queue
    pub sync_queue_capacity: usize,
    /// Reported by the health endpoint
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            sync_queue_capacity: DEFAULT_SYNC_QUEUE_CAPACITY,
            environment: "development".to_string(),
        }
    }
}

impl ServerConfig {
    /// Unparseable values fall back to the defaults with a warning
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = parse_var("PORT").unwrap_or(defaults.port);
        let sync_queue_capacity = parse_var::<usize>("NUTRI_SYNC_QUEUE_CAPACITY")
            .filter(|capacity| *capacity > 0)
            .unwrap_or(defaults.sync_queue_capacity);
        let environment = env::var("APP_ENV").unwrap_or(defaults.environment);

        Self {
            port,
            sync_queue_capacity,
            environment,
        }
    }

    pub fn address(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.sync_queue_capacity, 32);
        assert_eq!(config.address().port(), 3000);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        env::set_var("NUTRI_TEST_PORT_VALUE", "not-a-port");
        assert_eq!(parse_var::<u16>("NUTRI_TEST_PORT_VALUE"), None);
        env::set_var("NUTRI_TEST_PORT_VALUE", " 8080 ");
        assert_eq!(parse_var::<u16>("NUTRI_TEST_PORT_VALUE"), Some(8080));
        env::remove_var("NUTRI_TEST_PORT_VALUE");
    }
}
