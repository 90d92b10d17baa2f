//! Zone configuration.

use super::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// A zone served for dynamic updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Zone apex, with or without the trailing dot.
    pub origin: String,

    /// TTL for records loaded without one. Defaults to the SOA minimum, or
    /// one hour without an SOA.
    #[serde(default)]
    pub default_ttl: Option<u32>,

    /// Start of authority for the zone.
    #[serde(default)]
    pub soa: Option<SoaConfig>,

    /// Host tables whose entries become address records.
    #[serde(default)]
    pub hosts: Vec<HostSource>,

    /// Address records listed inline.
    #[serde(default)]
    pub static_hosts: Vec<StaticHost>,
}

impl ZoneConfig {
    /// Creates a zone with only an origin.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            default_ttl: None,
            soa: None,
            hosts: Vec::new(),
            static_hosts: Vec::new(),
        }
    }

    /// Returns the origin in a form suitable for comparing zones.
    pub fn origin_key(&self) -> String {
        self.origin.trim_end_matches('.').to_ascii_lowercase()
    }

    pub fn validate(&self) -> Result<()> {
        validate_domain("zones.origin", &self.origin)?;

        if self.default_ttl == Some(0) {
            return Err(ConfigError::invalid(
                "zones.default_ttl",
                format!("zone {} has a zero default TTL", self.origin),
            ));
        }
        if let Some(soa) = &self.soa {
            validate_domain("zones.soa.mname", &soa.mname)?;
            validate_domain("zones.soa.rname", &soa.rname)?;
        }
        for source in &self.hosts {
            if source.path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "zone {} has a host source without a path",
                    self.origin
                )));
            }
        }
        for host in &self.static_hosts {
            validate_domain("zones.static_hosts.name", &host.name)?;
        }
        Ok(())
    }
}

fn validate_domain(field: &str, domain: &str) -> Result<()> {
    let trimmed = domain.strip_suffix('.').unwrap_or(domain);
    if trimmed.is_empty() {
        // The root zone.
        return Ok(());
    }
    if trimmed.len() > 253 {
        return Err(ConfigError::invalid(field, format!("{domain} is too long")));
    }
    for label in trimmed.split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(ConfigError::invalid(
                field,
                format!("{domain} has an invalid label"),
            ));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '*'))
        {
            return Err(ConfigError::invalid(
                field,
                format!("{domain} contains an invalid character"),
            ));
        }
    }
    Ok(())
}

/// Start of authority values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoaConfig {
    /// Primary name server.
    pub mname: String,

    /// Mailbox of the person responsible, as a domain name.
    pub rname: String,

    /// Initial serial.
    #[serde(default = "default_serial")]
    pub serial: u32,

    /// Refresh interval in seconds.
    #[serde(default = "default_refresh")]
    pub refresh: u32,

    /// Retry interval in seconds.
    #[serde(default = "default_retry")]
    pub retry: u32,

    /// Expiry in seconds.
    #[serde(default = "default_expire")]
    pub expire: u32,

    /// Negative caching TTL in seconds.
    #[serde(default = "default_minimum")]
    pub minimum: u32,
}

fn default_serial() -> u32 {
    1
}

fn default_refresh() -> u32 {
    7200
}

fn default_retry() -> u32 {
    900
}

fn default_expire() -> u32 {
    1_209_600
}

fn default_minimum() -> u32 {
    300
}

/// Format of a host table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostSourceKind {
    /// ISC dhcpd configuration, reading `host` blocks with a fixed address.
    Dhcpd,
    /// `/etc/hosts` style file.
    Hosts,
}

/// A host table file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSource {
    /// File format.
    pub kind: HostSourceKind,

    /// File path.
    pub path: PathBuf,

    /// Suffix appended to each host name read.
    #[serde(default)]
    pub suffix: Option<String>,
}

/// An inline address record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticHost {
    /// Host name, relative to the zone or fully qualified.
    pub name: String,

    /// Address.
    pub address: IpAddr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soa_defaults() {
        let soa: SoaConfig =
            serde_yaml::from_str("mname: ns1.example.com\nrname: hostmaster.example.com\n")
                .unwrap();
        assert_eq!(soa.serial, 1);
        assert_eq!(soa.minimum, 300);
        assert_eq!(soa.expire, 1_209_600);
    }

    #[test]
    fn test_validate_origin() {
        assert!(ZoneConfig::new("example.com.").validate().is_ok());
        assert!(ZoneConfig::new(".").validate().is_ok());
        assert!(ZoneConfig::new("bad..example").validate().is_err());
        assert!(ZoneConfig::new("sp ace.example").validate().is_err());
        assert!(ZoneConfig::new(format!("{}.com", "a".repeat(64))).validate().is_err());
    }

    #[test]
    fn test_validate_zero_ttl() {
        let mut zone = ZoneConfig::new("example.com");
        zone.default_ttl = Some(0);
        assert!(matches!(
            zone.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_origin_key() {
        assert_eq!(ZoneConfig::new("Example.COM.").origin_key(), "example.com");
    }
}
