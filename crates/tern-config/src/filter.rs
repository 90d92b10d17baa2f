//! Filtering configuration.

use super::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Filtering configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Enable filtering.
    pub enabled: bool,

    /// Lists of domains to refuse.
    pub blocklists: Vec<ListEntry>,

    /// Lists of domains to permit. Applied after the block lists, so an
    /// entry here overrides the same entry in a block list.
    pub allowlists: Vec<ListEntry>,

    /// Apply each entry to the names below it as well.
    pub include_subdomains: bool,

    /// Domains to always block.
    pub custom_block: Vec<String>,

    /// Domains to never block.
    pub custom_allow: Vec<String>,
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        for list in self.blocklists.iter().chain(&self.allowlists) {
            list.validate()?;
        }
        Ok(())
    }
}

/// A domain list file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEntry {
    /// List name, used in logs.
    pub name: String,

    /// Hosts file or plain domain list.
    pub path: PathBuf,

    /// Enable this list.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl ListEntry {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::Validation(
                "List name cannot be empty".to_string(),
            ));
        }
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!(
                "List '{}' has no path",
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_defaults_enabled() {
        let entry: ListEntry = serde_yaml::from_str("name: ads\npath: ads.txt\n").unwrap();
        assert!(entry.enabled);
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_empty_list_name() {
        let config = FilterConfig {
            allowlists: vec![ListEntry {
                name: String::new(),
                path: PathBuf::from("allow.txt"),
                enabled: true,
            }],
            ..FilterConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
