use super::{Config, ConfigError};
use url::Url;

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid server URL '{}': {}", self.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "Unsupported URL scheme '{}', expected http or https",
                url.scheme()
            )));
        }

        if self.api_key.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "API key must not be empty".to_string(),
            ));
        }

        if self.chunk_size == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "Chunk size must be greater than 0".to_string(),
            ));
        }

        if self.connect_timeout_secs == 0 || self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
