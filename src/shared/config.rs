use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub realtime: RealtimeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Buffered change events per subscriber before the bridge falls back to a
    /// full refetch.
    pub channel_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/comunidade.db".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            realtime: RealtimeConfig::default(),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("COMUNIDADE_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("COMUNIDADE_DB_MAX_CONNECTIONS") {
            if let Some(value) = parse_u32(&v) {
                cfg.database.max_connections = value;
            }
        }
        if let Ok(v) = std::env::var("COMUNIDADE_DB_CONNECTION_TIMEOUT") {
            if let Some(value) = parse_u64(&v) {
                cfg.database.connection_timeout = value;
            }
        }
        if let Ok(v) = std::env::var("COMUNIDADE_REALTIME_CAPACITY") {
            if let Some(value) = parse_usize(&v) {
                cfg.realtime.channel_capacity = value;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.realtime.channel_capacity == 0 {
            return Err("Realtime channel_capacity must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_usize(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_connections() {
        let mut cfg = AppConfig::default();
        cfg.database.max_connections = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let mut cfg = AppConfig::default();
        cfg.realtime.channel_capacity = 0;
        assert!(cfg.validate().is_err());
    }
}
