//! Configuration module
//!
//! Handles loading and layering configuration: defaults, then a config
//! file, then environment variables, then command-line flags.

mod env;
mod file;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::benchmark::{PairMode, DEFAULT_BATCH_SIZE};
use crate::http::DEFAULT_TIMEOUT_SECS;
use crate::models::{Endpoint, EndpointId, EndpointPair};

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;

/// Address and label of one endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Label shown in reports
    pub label: String,
    /// Base URL, without the `/process` route
    pub url: String,
}

impl EndpointConfig {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }

    /// Fallback used when nothing else is configured
    pub fn default_for(id: EndpointId) -> Self {
        match id {
            EndpointId::A => Self::new("Endpoint A", "http://localhost:8080"),
            EndpointId::B => Self::new("Endpoint B", "http://localhost:8081"),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// First endpoint; wins exact ties
    pub endpoint_a: EndpointConfig,

    /// Second endpoint
    pub endpoint_b: EndpointConfig,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Requests per load-test batch
    pub batch_size: usize,

    /// Run the two load-test batches one after the other
    pub sequential_load: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint_a: EndpointConfig::default_for(EndpointId::A),
            endpoint_b: EndpointConfig::default_for(EndpointId::B),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            batch_size: DEFAULT_BATCH_SIZE,
            sequential_load: false,
        }
    }
}

impl AppConfig {
    /// Apply environment overrides
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if !env.has_any() {
            return;
        }

        if let Some(url) = &env.a_url {
            self.endpoint_a.url = url.clone();
        }
        if let Some(url) = &env.b_url {
            self.endpoint_b.url = url.clone();
        }
        if let Some(label) = &env.a_label {
            self.endpoint_a.label = label.clone();
        }
        if let Some(label) = &env.b_label {
            self.endpoint_b.label = label.clone();
        }
        self.timeout_secs = env.timeout_or(self.timeout_secs);
        self.batch_size = env.batch_size_or(self.batch_size);
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, endpoint) in [("A", &self.endpoint_a), ("B", &self.endpoint_b)] {
            if !(endpoint.url.starts_with("http://") || endpoint.url.starts_with("https://")) {
                anyhow::bail!(
                    "Endpoint {name} URL must start with http:// or https://: {}",
                    endpoint.url
                );
            }
            if endpoint.label.trim().is_empty() {
                anyhow::bail!("Endpoint {name} label must not be empty");
            }
        }

        if self.endpoint_a.label == self.endpoint_b.label {
            anyhow::bail!(
                "Endpoint labels must differ (both are '{}')",
                self.endpoint_a.label
            );
        }
        if self.batch_size == 0 {
            anyhow::bail!("batch_size must be at least 1");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be at least 1");
        }

        Ok(())
    }

    /// Endpoints as benchmark targets
    pub fn endpoints(&self) -> EndpointPair<Endpoint> {
        EndpointPair::new(
            Endpoint::new(EndpointId::A, &self.endpoint_a.label, &self.endpoint_a.url),
            Endpoint::new(EndpointId::B, &self.endpoint_b.label, &self.endpoint_b.url),
        )
    }

    pub fn pair_mode(&self) -> PairMode {
        if self.sequential_load {
            PairMode::Sequential
        } else {
            PairMode::Concurrent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.endpoint_a.url, "http://localhost:8080");
        assert_eq!(config.endpoint_b.url, "http://localhost:8081");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.batch_size, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_env() {
        let mut config = AppConfig::default();
        let env = EnvConfig {
            b_url: Some("http://10.0.0.2:9000".to_string()),
            a_label: Some("Legacy".to_string()),
            batch_size: Some(50),
            ..Default::default()
        };

        config.apply_env(&env);

        assert_eq!(config.endpoint_a.label, "Legacy");
        assert_eq!(config.endpoint_a.url, "http://localhost:8080");
        assert_eq!(config.endpoint_b.url, "http://10.0.0.2:9000");
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_empty_env_keeps_file_values() {
        let mut config = ConfigFile::example().app;
        config.timeout_secs = 5;
        let before = config.clone();

        config.apply_env(&EnvConfig::default());

        assert_eq!(config, before);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.endpoint_b.url = "localhost:8081".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.endpoint_b.label = config.endpoint_a.label.clone();
        assert!(config.validate().is_err());

        let config = AppConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoints_and_mode() {
        let config = AppConfig {
            sequential_load: true,
            ..Default::default()
        };
        let endpoints = config.endpoints();

        assert_eq!(endpoints.a.id, EndpointId::A);
        assert_eq!(endpoints.b.label, "Endpoint B");
        assert_eq!(config.pair_mode(), PairMode::Sequential);
    }
}
