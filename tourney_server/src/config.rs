//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::SocketAddr;
use tourney::{AdminList, db::DatabaseConfig};

/// Default HTTP bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration; `None` runs on the in-memory repository
    pub database: Option<DatabaseConfig>,
    /// Organizer handles allowed to run mutating commands
    pub admins: AdminList,
    /// Prometheus exporter address
    pub metrics_bind: Option<SocketAddr>,
    /// Team capacity applied when a create request names none
    pub default_max_teams: Option<usize>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr("SERVER_BIND")?.unwrap_or(default_bind()?),
        };

        let database = match database_url_override {
            Some(url) => Some(DatabaseConfig::with_url(url)),
            None => DatabaseConfig::from_env(),
        };

        let admins = AdminList::from_csv(&std::env::var("ADMINS").unwrap_or_default());
        let metrics_bind = parse_addr("METRICS_BIND")?;

        let default_max_teams = match std::env::var("DEFAULT_MAX_TEAMS") {
            Ok(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "DEFAULT_MAX_TEAMS".to_string(),
                reason: format!("'{raw}' is not a number"),
            })?),
            Err(_) => None,
        };

        Ok(ServerConfig {
            bind,
            database,
            admins,
            metrics_bind,
            default_max_teams,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admins.is_empty() {
            return Err(ConfigError::MissingRequired {
                var: "ADMINS".to_string(),
                hint: "Comma-separated organizer handles, e.g. ADMINS=@alice,@bob".to_string(),
            });
        }

        if let Some(max) = self.default_max_teams {
            if max < tourney::bracket::MIN_TEAMS {
                return Err(ConfigError::Invalid {
                    var: "DEFAULT_MAX_TEAMS".to_string(),
                    reason: format!("Must be at least {}", tourney::bracket::MIN_TEAMS),
                });
            }
        }

        if let Some(database) = &self.database {
            if database.min_connections > database.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed max connections ({})",
                        database.max_connections
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> Result<SocketAddr, ConfigError> {
    DEFAULT_BIND.parse().map_err(|_| ConfigError::Invalid {
        var: "SERVER_BIND".to_string(),
        reason: format!("default '{DEFAULT_BIND}' is not an address"),
    })
}

fn parse_addr(key: &str) -> Result<Option<SocketAddr>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("'{raw}' is not an IP:PORT address"),
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            database: None,
            admins: AdminList::from_csv("@alice"),
            metrics_bind: None,
            default_max_teams: Some(16),
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "ADMINS".to_string(),
            hint: "List organizers".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ADMINS"));
        assert!(msg.contains("List organizers"));
    }

    #[test]
    fn test_config_validation_accepts_defaults() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_requires_admins() {
        let config = ServerConfig {
            admins: AdminList::default(),
            ..config()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));
    }

    #[test]
    fn test_config_validation_max_teams_too_small() {
        let config = ServerConfig {
            default_max_teams: Some(1),
            ..config()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "DEFAULT_MAX_TEAMS"));
    }

    #[test]
    fn test_config_validation_pool_bounds() {
        let mut database = DatabaseConfig::development();
        database.min_connections = database.max_connections + 1;
        let config = ServerConfig {
            database: Some(database),
            ..config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_bind_parses() {
        assert_eq!(default_bind().unwrap().port(), 8080);
    }
}
