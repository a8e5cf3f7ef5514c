use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::Serialize;

use crate::maze::DungeonOptions;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Round summaries are only logged when no database is configured.
    pub database_url: Option<String>,
    pub server_host: IpAddr,
    pub server_port: u16,
    pub environment: Environment,
    pub log_level: String,
    /// Directory the browser client is served from.
    pub static_dir: PathBuf,
    pub dungeon: DungeonOptions,
}

/// Deployment environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

const DEFAULT_PORT: u16 = 8081;

impl Config {
    /// Load configuration from environment variables (and a `.env` file, if present).
    ///
    /// All variables are optional: `DATABASE_URL`, `SERVER_HOST`, `PORT` / `SERVER_PORT`,
    /// `ENVIRONMENT`, `LOG_LEVEL`, `STATIC_DIR`, `DUNGEON_WIDTH`, `DUNGEON_HEIGHT`,
    /// `DUNGEON_ROOMS`, `DUNGEON_ROOM_SIZE`.
    ///
    /// # Errors
    ///
    /// Returns an error if a host, port or dungeon dimension contains an invalid value.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a host, port or dungeon dimension contains an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let environment = match lookup("ENVIRONMENT").as_deref() {
            Some("production") => Environment::Production,
            Some("staging") => Environment::Staging,
            _ => Environment::Development,
        };

        // PORT wins over SERVER_PORT for container platforms
        let server_port = match lookup("PORT").or_else(|| lookup("SERVER_PORT")) {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT / PORT must be a valid u16"))?,
            None => DEFAULT_PORT,
        };

        let default_host = if environment == Environment::Production {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let server_host = lookup("SERVER_HOST")
            .unwrap_or_else(|| default_host.to_string())
            .parse::<IpAddr>()
            .map_err(|_| anyhow::anyhow!("SERVER_HOST must be a valid IP address"))?;

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let static_dir =
            lookup("STATIC_DIR").map_or_else(|| PathBuf::from("public"), PathBuf::from);

        let defaults = DungeonOptions::default();
        let dungeon = DungeonOptions {
            width: positive(&lookup, "DUNGEON_WIDTH", defaults.width)?,
            height: positive(&lookup, "DUNGEON_HEIGHT", defaults.height)?,
            room_count: positive(&lookup, "DUNGEON_ROOMS", defaults.room_count)?,
            average_room_size: positive(&lookup, "DUNGEON_ROOM_SIZE", defaults.average_room_size)?,
        };

        Ok(Self {
            database_url,
            server_host,
            server_port,
            environment,
            log_level,
            static_dir,
            dungeon,
        })
    }

    /// Build the socket address for the server to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }
}

fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u32,
) -> anyhow::Result<u32> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(anyhow::anyhow!("{key} must be a positive integer, got {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap_or_else(|_| unreachable!());
        assert!(config.database_url.is_none());
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8081");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.dungeon, DungeonOptions::default());
    }

    #[test]
    fn test_port_precedence() {
        let config = load(&[("PORT", "4000"), ("SERVER_PORT", "5000")]);
        assert_eq!(config.map(|c| c.server_port).ok(), Some(4000));
        let config = load(&[("SERVER_PORT", "5000")]);
        assert_eq!(config.map(|c| c.server_port).ok(), Some(5000));
    }

    #[test]
    fn test_production_binds_all_interfaces() {
        let config = load(&[("ENVIRONMENT", "production")]);
        assert_eq!(
            config.map(|c| c.server_host.to_string()).ok().as_deref(),
            Some("0.0.0.0")
        );
    }

    #[test]
    fn test_dungeon_overrides() {
        let config = load(&[
            ("DUNGEON_WIDTH", "30"),
            ("DUNGEON_ROOMS", "3"),
            ("DATABASE_URL", "sqlite::memory:"),
        ])
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.dungeon.width, 30);
        assert_eq!(config.dungeon.height, 20);
        assert_eq!(config.dungeon.room_count, 3);
        assert_eq!(config.database_url.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load(&[("PORT", "not_a_number")]).is_err());
        assert!(load(&[("SERVER_HOST", "localhost")]).is_err());
        assert!(load(&[("DUNGEON_HEIGHT", "0")]).is_err());
        assert!(load(&[("DUNGEON_ROOM_SIZE", "-2")]).is_err());
    }

    #[test]
    fn test_blank_database_url_is_ignored() {
        let config = load(&[("DATABASE_URL", "  ")]);
        assert!(config.map(|c| c.database_url.is_none()).unwrap_or(false));
    }
}
