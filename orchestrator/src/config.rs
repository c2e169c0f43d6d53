//! Configuration for the orchestrator.

use serde::{Deserialize, Serialize};

/// Configuration for the workflow engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Catalog server base URL
    pub builder_url: String,
    /// Catalyst content node base URL
    pub catalyst_url: String,
    /// Page size for paginated fetches
    pub page_size: u64,
    /// Items per rescue transaction
    pub rescue_chunk_size: usize,
    /// Request timeout (ms)
    pub request_timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            builder_url: "http://localhost:5000/v1".to_string(),
            catalyst_url: "http://localhost:6000".to_string(),
            page_size: 50,
            rescue_chunk_size: 20,
            request_timeout_ms: 30_000,
        }
    }
}

impl OrchestratorConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.rescue_chunk_size, 20);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = OrchestratorConfig::default();
        config.rescue_chunk_size = 5;
        let yaml = config.to_yaml().unwrap();
        let parsed = OrchestratorConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.rescue_chunk_size, 5);
    }
}
