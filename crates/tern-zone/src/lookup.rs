//! Static host tables that seed a zone.
//!
//! A [`LookupSource`] yields `(hostname, address)` pairs, which
//! [`host_records`] turns into A and AAAA records under a zone origin.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tern_proto::{Name, ResourceRecord};

use crate::error::{Result, ZoneError};

/// A hostname and the address it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostEntry {
    /// Host name, relative or fully qualified.
    pub hostname: String,
    /// Address of the host.
    pub address: IpAddr,
}

impl HostEntry {
    /// Creates a new entry.
    pub fn new(hostname: impl Into<String>, address: IpAddr) -> Self {
        Self {
            hostname: hostname.into(),
            address,
        }
    }
}

/// A source of host entries.
#[async_trait]
pub trait LookupSource: Send + Sync {
    /// Reads the current entries.
    async fn load(&self) -> Result<Vec<HostEntry>>;
}

/// Reads `host` declarations with a `fixed-address` from an ISC dhcpd
/// configuration file.
///
/// ```text
/// host printer {
///   hardware ethernet 00:11:22:33:44:55;
///   fixed-address 192.168.1.20;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DhcpdConfigSource {
    path: PathBuf,
    suffix: Option<String>,
}

impl DhcpdConfigSource {
    /// Creates a source for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            suffix: None,
        }
    }

    /// Appends `.suffix` to every hostname read.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses configuration text.
    pub fn parse(&self, content: &str) -> Result<Vec<HostEntry>> {
        let mut entries = Vec::new();
        let mut hostname: Option<&str> = None;

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("host") => {
                    let name = tokens
                        .next()
                        .map(|t| t.trim_end_matches('{'))
                        .filter(|t| !t.is_empty())
                        .ok_or_else(|| ZoneError::parse(&self.path, index + 1, "host without a name"))?;
                    hostname = Some(name);
                }
                Some("fixed-address") => {
                    let Some(host) = hostname else {
                        continue;
                    };
                    let value = tokens
                        .next()
                        .map(|t| t.trim_matches(|c| c == '"' || c == ';'))
                        .unwrap_or_default();
                    let address = IpAddr::from_str(value).map_err(|_| {
                        ZoneError::parse(&self.path, index + 1, format!("invalid address {value:?}"))
                    })?;
                    let hostname = match &self.suffix {
                        Some(suffix) => format!("{host}.{suffix}"),
                        None => host.to_string(),
                    };
                    entries.push(HostEntry::new(hostname, address));
                }
                Some("}") => hostname = None,
                _ => {}
            }
        }

        Ok(entries)
    }
}

#[async_trait]
impl LookupSource for DhcpdConfigSource {
    async fn load(&self) -> Result<Vec<HostEntry>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let entries = self.parse(&content)?;
        info!(path = %self.path.display(), hosts = entries.len(), "loaded dhcpd host declarations");
        Ok(entries)
    }
}

/// Reads a hosts file (`address name [alias...]` per line).
#[derive(Debug, Clone)]
pub struct HostsFileSource {
    path: PathBuf,
}

impl HostsFileSource {
    /// Creates a source for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parses hosts file text. Lines whose first field is not an address
    /// are skipped.
    pub fn parse(content: &str) -> Vec<HostEntry> {
        let mut entries = Vec::new();
        for line in content.lines() {
            let line = line.split('#').next().unwrap_or_default();
            let mut fields = line.split_whitespace();
            let Some(address) = fields.next().and_then(|a| IpAddr::from_str(a).ok()) else {
                continue;
            };
            entries.extend(fields.map(|name| HostEntry::new(name, address)));
        }
        entries
    }
}

#[async_trait]
impl LookupSource for HostsFileSource {
    async fn load(&self) -> Result<Vec<HostEntry>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let entries = Self::parse(&content);
        info!(path = %self.path.display(), hosts = entries.len(), "loaded hosts file");
        Ok(entries)
    }
}

/// Converts host entries to address records inside `origin`.
///
/// Names not already inside the zone are taken as relative to it. Entries
/// whose name is not a valid domain name are skipped.
pub fn host_records(entries: &[HostEntry], origin: &Name, ttl: u32) -> Vec<ResourceRecord> {
    entries
        .iter()
        .filter_map(|entry| {
            let name = match Name::from_str(&entry.hostname) {
                Ok(name) if name.is_subdomain_of(origin) => name,
                Ok(_) => Name::from_str(&format!("{}.{origin}", entry.hostname)).ok()?,
                Err(e) => {
                    debug!(hostname = %entry.hostname, error = %e, "skipping host entry");
                    return None;
                }
            };
            Some(match entry.address {
                IpAddr::V4(addr) => ResourceRecord::a(name, ttl, addr),
                IpAddr::V6(addr) => ResourceRecord::aaaa(name, ttl, addr),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::{Ipv4Addr, Ipv6Addr};

    const DHCPD_CONF: &str = r#"
# static leases
option domain-name "lan";

host printer {
  hardware ethernet 00:11:22:33:44:55;
  fixed-address 192.168.1.20;
}

host nas {
  fixed-address "192.168.1.21";
}

fixed-address 10.0.0.1;
"#;

    #[test]
    fn test_parse_dhcpd_config() {
        let source = DhcpdConfigSource::new("dhcpd.conf");
        let entries = source.parse(DHCPD_CONF).unwrap();

        assert_eq!(
            entries,
            vec![
                HostEntry::new("printer", IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20))),
                HostEntry::new("nas", IpAddr::V4(Ipv4Addr::new(192, 168, 1, 21))),
            ]
        );
    }

    #[test]
    fn test_parse_dhcpd_suffix() {
        let source = DhcpdConfigSource::new("dhcpd.conf").with_suffix("lan");
        let entries = source.parse(DHCPD_CONF).unwrap();
        assert_eq!(entries[0].hostname, "printer.lan");
    }

    #[test]
    fn test_parse_dhcpd_bad_address() {
        let source = DhcpdConfigSource::new("dhcpd.conf");
        let err = source
            .parse("host x {\n  fixed-address 300.1.1.1;\n}\n")
            .unwrap_err();
        assert!(matches!(err, ZoneError::ParseError { line: 2, .. }));
    }

    #[tokio::test]
    async fn test_load_dhcpd_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DHCPD_CONF.as_bytes()).unwrap();

        let entries = DhcpdConfigSource::new(file.path()).load().await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_parse_hosts_file() {
        let entries = HostsFileSource::parse(
            "127.0.0.1 localhost\n::1 localhost ip6-localhost # loopback\nnot-an-address foo\n",
        );
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].hostname, "ip6-localhost");
        assert_eq!(entries[2].address, IpAddr::V6(Ipv6Addr::LOCALHOST));
    }

    #[test]
    fn test_host_records() {
        let origin = Name::from_str("lan").unwrap();
        let entries = [
            HostEntry::new("printer", IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20))),
            HostEntry::new("nas.lan", IpAddr::V6(Ipv6Addr::LOCALHOST)),
            HostEntry::new("bad name", IpAddr::V4(Ipv4Addr::LOCALHOST)),
        ];

        let records = host_records(&entries, &origin, 60);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name(), &Name::from_str("printer.lan").unwrap());
        assert_eq!(records[1].to_string(), "nas.lan.\t60\tIN\tAAAA\t::1");
    }
}
