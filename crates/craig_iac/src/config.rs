//! Generator configuration.

use serde::{Deserialize, Serialize};

/// Settings that shape generated provider and version blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Version constraint of the `IBM-Cloud/ibm` provider.
    pub provider_version: String,
    /// Required Terraform version constraint.
    pub terraform_version: String,
    /// Provider API timeout in seconds.
    pub ibmcloud_timeout: i64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider_version: "1.60.0".to_string(),
            terraform_version: ">=1.5".to_string(),
            ibmcloud_timeout: 60,
        }
    }
}

impl GeneratorConfig {
    pub fn with_provider_version(mut self, version: impl Into<String>) -> Self {
        self.provider_version = version.into();
        self
    }

    pub fn with_terraform_version(mut self, version: impl Into<String>) -> Self {
        self.terraform_version = version.into();
        self
    }

    pub fn with_timeout(mut self, seconds: i64) -> Self {
        self.ibmcloud_timeout = seconds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.provider_version, "1.60.0");
        assert_eq!(config.terraform_version, ">=1.5");
        assert_eq!(config.ibmcloud_timeout, 60);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"provider_version": "1.62.0"}"#).unwrap();
        assert_eq!(config.provider_version, "1.62.0");
        assert_eq!(config.ibmcloud_timeout, 60);
    }
}
