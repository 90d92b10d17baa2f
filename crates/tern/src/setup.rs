//! Building zones and filters from configuration.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use tern_config::{Config, FilterConfig, HostSourceKind, SoaConfig, ZoneConfig};
use tern_filter::{DomainSetFilter, Verdict};
use tern_proto::rdata::SOA;
use tern_proto::{Name, ResourceRecord};
use tern_zone::{
    DEFAULT_TTL, DhcpdConfigSource, DynamicUpdate, HostEntry, HostsFileSource, InMemoryZone,
    LookupSource, UpdateHandler, ZoneTree, host_records,
};

fn parse_name(field: &str, value: &str) -> Result<Name> {
    Name::from_str(value).with_context(|| format!("invalid {field} '{value}'"))
}

fn soa_rdata(config: &SoaConfig) -> Result<SOA> {
    Ok(SOA::new(
        parse_name("SOA mname", &config.mname)?,
        parse_name("SOA rname", &config.rname)?,
        config.serial,
        config.refresh,
        config.retry,
        config.expire,
        config.minimum,
    ))
}

/// Builds one zone, reading its host tables.
pub async fn build_zone(config: &ZoneConfig) -> Result<InMemoryZone> {
    let origin = parse_name("zone origin", &config.origin)?;

    let mut records = Vec::new();
    let mut ttl = DEFAULT_TTL;
    if let Some(soa) = &config.soa {
        let soa = soa_rdata(soa)?;
        ttl = soa.minimum().clamp(1, DEFAULT_TTL);
        records.push(ResourceRecord::soa(origin.clone(), DEFAULT_TTL, soa));
    }
    let ttl = config.default_ttl.unwrap_or(ttl);

    let mut entries: Vec<HostEntry> = config
        .static_hosts
        .iter()
        .map(|h| HostEntry::new(h.name.clone(), h.address))
        .collect();

    for source in &config.hosts {
        let loaded = match source.kind {
            HostSourceKind::Dhcpd => {
                let mut dhcpd = DhcpdConfigSource::new(&source.path);
                if let Some(suffix) = &source.suffix {
                    dhcpd = dhcpd.with_suffix(suffix.clone());
                }
                dhcpd.load().await
            }
            HostSourceKind::Hosts => HostsFileSource::new(&source.path).load().await,
        }
        .with_context(|| format!("failed to load hosts for zone {origin}"))?;
        entries.extend(loaded);
    }

    records.extend(host_records(&entries, &origin, ttl));

    let zone = InMemoryZone::new(origin, ttl, records);
    zone.validate()?;
    debug!(zone = ?zone, "zone built");
    Ok(zone)
}

/// Builds every configured zone.
pub async fn build_zones(config: &Config) -> Result<ZoneTree> {
    let tree = ZoneTree::new();
    for zone_config in &config.zones {
        let zone = build_zone(zone_config).await?;
        info!(zone = %zone_config.origin, records = zone.len(), "zone loaded");
        tree.insert(Arc::new(zone))?;
    }
    Ok(tree)
}

/// Builds the update handler for the configured zones.
pub async fn build_handler(config: &Config) -> Result<UpdateHandler> {
    let zones = build_zones(config).await?;
    let update = DynamicUpdate::new().bump_soa_serial(config.update.bump_soa_serial);
    Ok(UpdateHandler::new(Arc::new(zones)).with_update(update))
}

/// Builds the domain filter. Allow lists are added after block lists so
/// they take precedence, and the custom entries come last.
pub async fn build_filter(config: &FilterConfig) -> Result<DomainSetFilter> {
    let filter = DomainSetFilter::new().with_subdomains(config.include_subdomains);
    if !config.enabled {
        return Ok(filter);
    }

    for (lists, verdict) in [
        (&config.blocklists, Verdict::Block),
        (&config.allowlists, Verdict::Allow),
    ] {
        for list in lists.iter().filter(|l| l.enabled) {
            filter
                .add_list_file(&list.path, verdict)
                .await
                .with_context(|| format!("failed to load list '{}'", list.name))?;
        }
    }

    for (domains, verdict) in [
        (&config.custom_block, Verdict::Block),
        (&config.custom_allow, Verdict::Allow),
    ] {
        for domain in domains {
            filter.insert(parse_name("custom filter domain", domain)?, verdict);
        }
    }

    info!(domains = filter.len(), "filter ready");
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_config::{HostSource, ListEntry, StaticHost};
    use tern_proto::RecordType;
    use tern_zone::Zone;

    fn soa_config() -> SoaConfig {
        SoaConfig {
            mname: "ns1.home.arpa".to_string(),
            rname: "admin.home.arpa".to_string(),
            serial: 1,
            refresh: 7200,
            retry: 900,
            expire: 1_209_600,
            minimum: 120,
        }
    }

    #[tokio::test]
    async fn test_build_zone_with_hosts() {
        let dir = tempfile::tempdir().unwrap();
        let dhcpd = dir.path().join("dhcpd.conf");
        std::fs::write(&dhcpd, "host nas {\n  fixed-address 192.168.1.5;\n}\n").unwrap();

        let mut config = ZoneConfig::new("home.arpa");
        config.soa = Some(soa_config());
        config.hosts.push(HostSource {
            kind: HostSourceKind::Dhcpd,
            path: dhcpd,
            suffix: None,
        });
        config.static_hosts.push(StaticHost {
            name: "router".to_string(),
            address: "192.168.1.1".parse().unwrap(),
        });

        let zone = build_zone(&config).await.unwrap();
        assert_eq!(zone.default_ttl(), 120);

        let records = zone.records();
        assert_eq!(records.len(), 3);
        assert!(records[0].is_type(RecordType::SOA));
        assert_eq!(records[1].name().to_string(), "router.home.arpa.");
        assert_eq!(records[2].name().to_string(), "nas.home.arpa.");
        assert_eq!(records[2].ttl(), 120);
    }

    #[tokio::test]
    async fn test_build_zone_missing_source() {
        let mut config = ZoneConfig::new("home.arpa");
        config.hosts.push(HostSource {
            kind: HostSourceKind::Hosts,
            path: "/nonexistent/hosts".into(),
            suffix: None,
        });
        assert!(build_zone(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_build_zones_rejects_duplicates() {
        let config = tern_config::Config {
            zones: vec![ZoneConfig::new("example.com"), ZoneConfig::new("Example.COM.")],
            ..Default::default()
        };
        assert!(build_zones(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_build_filter() {
        let dir = tempfile::tempdir().unwrap();
        let block = dir.path().join("block.txt");
        std::fs::write(&block, "0.0.0.0 ads.example.com\n0.0.0.0 cdn.example.com\n").unwrap();

        let config = FilterConfig {
            enabled: true,
            blocklists: vec![ListEntry {
                name: "ads".to_string(),
                path: block,
                enabled: true,
            }],
            custom_allow: vec!["cdn.example.com".to_string()],
            custom_block: vec!["tracker.example.net".to_string()],
            ..FilterConfig::default()
        };

        let filter = build_filter(&config).await.unwrap();
        let check = |s: &str| filter.check(&Name::from_str(s).unwrap());
        assert_eq!(check("ads.example.com"), Some(Verdict::Block));
        assert_eq!(check("cdn.example.com"), Some(Verdict::Allow));
        assert_eq!(check("tracker.example.net"), Some(Verdict::Block));

        let disabled = build_filter(&FilterConfig::default()).await.unwrap();
        assert!(disabled.is_empty());
    }
}
