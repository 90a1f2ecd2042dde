/// Configuration for the session gateway.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum number of concurrently live rooms. Default: 1024.
    pub max_rooms: usize,
    /// Maximum accepted length for player names, in bytes. Default: 64.
    pub max_name_length: usize,
}

/// Error returned when a configuration value is invalid.
#[derive(Debug, thiserror::Error)]
#[error("invalid configuration: {reason}")]
pub struct ConfigError {
    /// What was wrong with the configuration.
    pub reason: String,
}

impl ServerConfig {
    /// Validate configuration values.
    ///
    /// Checks:
    /// - `max_rooms >= 1` (a gateway that can host no rooms accepts no joins)
    /// - `max_name_length >= 1`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rooms == 0 {
            return Err(ConfigError {
                reason: "max_rooms must be >= 1".to_string(),
            });
        }
        if self.max_name_length == 0 {
            return Err(ConfigError {
                reason: "max_name_length must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_rooms: 1024,
            max_name_length: 64,
        }
    }
}
