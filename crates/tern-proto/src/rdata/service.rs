//! Service binding payloads (SVCB, HTTPS) from RFC 9460.
//!
//! Parameters are kept as raw key/value pairs in wire order, so a decoded
//! payload encodes back to the same bytes. Typed accessors interpret the
//! common keys on demand.

use crate::error::{Error, Result};
use crate::name::Name;
use crate::wire::{WireReader, WireWriter};
use data_encoding::HEXLOWER;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Registered service parameter keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum SvcParamKey {
    /// Keys the client must understand.
    Mandatory = 0,
    /// Application protocols.
    Alpn = 1,
    /// No default ALPN.
    NoDefaultAlpn = 2,
    /// Alternative port.
    Port = 3,
    /// IPv4 address hints.
    Ipv4Hint = 4,
    /// Encrypted ClientHello config.
    Ech = 5,
    /// IPv6 address hints.
    Ipv6Hint = 6,
}

impl SvcParamKey {
    /// Returns the presentation name of the key.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mandatory => "mandatory",
            Self::Alpn => "alpn",
            Self::NoDefaultAlpn => "no-default-alpn",
            Self::Port => "port",
            Self::Ipv4Hint => "ipv4hint",
            Self::Ech => "ech",
            Self::Ipv6Hint => "ipv6hint",
        }
    }
}

/// One service parameter as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SvcParam {
    /// Numeric key.
    pub key: u16,
    /// Raw value bytes.
    pub value: Vec<u8>,
}

impl SvcParam {
    /// Creates a parameter from a key and its raw value.
    pub fn new(key: impl Into<u16>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a `port` parameter.
    pub fn port(port: u16) -> Self {
        Self::new(SvcParamKey::Port, port.to_be_bytes())
    }

    /// Creates an `alpn` parameter from protocol identifiers.
    pub fn alpn<'a>(protocols: impl IntoIterator<Item = &'a str>) -> Self {
        let mut value = Vec::new();
        for p in protocols {
            #[allow(clippy::cast_possible_truncation)]
            value.push(p.len().min(255) as u8);
            value.extend_from_slice(&p.as_bytes()[..p.len().min(255)]);
        }
        Self::new(SvcParamKey::Alpn, value)
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = SvcParamKey::try_from(self.key).ok();
        match key {
            Some(SvcParamKey::Port) if self.value.len() == 2 => {
                write!(f, "{}", u16::from_be_bytes([self.value[0], self.value[1]]))
            }
            Some(SvcParamKey::Alpn) => {
                let ids: Vec<String> = split_alpn(&self.value)
                    .iter()
                    .map(|id| String::from_utf8_lossy(id).into_owned())
                    .collect();
                f.write_str(&ids.join(","))
            }
            Some(SvcParamKey::Ipv4Hint) if self.value.len() % 4 == 0 => {
                let addrs: Vec<String> = self
                    .value
                    .chunks_exact(4)
                    .map(|c| Ipv4Addr::new(c[0], c[1], c[2], c[3]).to_string())
                    .collect();
                f.write_str(&addrs.join(","))
            }
            Some(SvcParamKey::Ipv6Hint) if self.value.len() % 16 == 0 => {
                let addrs: Vec<String> = self
                    .value
                    .chunks_exact(16)
                    .map(|c| {
                        let mut octets = [0u8; 16];
                        octets.copy_from_slice(c);
                        Ipv6Addr::from(octets).to_string()
                    })
                    .collect();
                f.write_str(&addrs.join(","))
            }
            _ => f.write_str(&HEXLOWER.encode(&self.value)),
        }
    }
}

impl fmt::Display for SvcParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match SvcParamKey::try_from(self.key) {
            Ok(key) => f.write_str(key.name())?,
            Err(_) => write!(f, "key{}", self.key)?,
        }
        if self.value.is_empty() {
            return Ok(());
        }
        f.write_str("=")?;
        self.fmt_value(f)
    }
}

fn split_alpn(mut value: &[u8]) -> Vec<&[u8]> {
    let mut ids = Vec::new();
    while let Some((&len, rest)) = value.split_first() {
        let len = usize::from(len).min(rest.len());
        ids.push(&rest[..len]);
        value = &rest[len..];
    }
    ids
}

/// SVCB record - General service binding (RFC 9460).
///
/// HTTPS records share this payload. Priority 0 is alias mode, in which
/// case `params` is normally empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SVCB {
    priority: u16,
    target: Name,
    params: Vec<SvcParam>,
}

impl SVCB {
    /// Creates a new service binding.
    pub fn new(priority: u16, target: Name, params: Vec<SvcParam>) -> Self {
        Self {
            priority,
            target,
            params,
        }
    }

    /// Returns the priority. Zero means alias mode.
    #[inline]
    pub const fn priority(&self) -> u16 {
        self.priority
    }

    /// Returns true in alias mode.
    #[inline]
    pub const fn is_alias(&self) -> bool {
        self.priority == 0
    }

    /// Returns the target name.
    #[inline]
    pub fn target(&self) -> &Name {
        &self.target
    }

    /// Returns the parameters in wire order.
    #[inline]
    pub fn params(&self) -> &[SvcParam] {
        &self.params
    }

    fn param(&self, key: SvcParamKey) -> Option<&[u8]> {
        let key = u16::from(key);
        self.params
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_slice())
    }

    /// Returns the `port` parameter, if present and well-formed.
    pub fn port(&self) -> Option<u16> {
        match self.param(SvcParamKey::Port)? {
            &[hi, lo] => Some(u16::from_be_bytes([hi, lo])),
            _ => None,
        }
    }

    /// Returns the `alpn` protocol identifiers.
    pub fn alpn(&self) -> Vec<String> {
        self.param(SvcParamKey::Alpn)
            .map(|v| {
                split_alpn(v)
                    .into_iter()
                    .map(|id| String::from_utf8_lossy(id).into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the `ipv4hint` addresses.
    pub fn ipv4_hints(&self) -> Vec<Ipv4Addr> {
        self.param(SvcParamKey::Ipv4Hint)
            .map(|v| {
                v.chunks_exact(4)
                    .map(|c| Ipv4Addr::new(c[0], c[1], c[2], c[3]))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reads priority, target and parameters up to the payload end.
    pub fn decode(reader: &mut WireReader<'_>, end: usize) -> Result<Self> {
        let priority = reader.read_u16()?;
        let target = reader.read_name()?;

        let mut params = Vec::new();
        while reader.position() < end {
            let key = reader.read_u16()?;
            let len = usize::from(reader.read_u16()?);
            params.push(SvcParam {
                key,
                value: reader.read_bytes(len)?.to_vec(),
            });
        }

        Ok(Self {
            priority,
            target,
            params,
        })
    }

    /// Writes priority, target and parameters.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        writer.write_u16(self.priority)?;
        writer.write_name(&self.target)?;
        for param in &self.params {
            let len = u16::try_from(param.value.len()).map_err(|_| {
                Error::invalid_rdata("SVCB", format!("parameter key{} value too long", param.key))
            })?;
            writer.write_u16(param.key)?;
            writer.write_u16(len)?;
            writer.write_bytes(&param.value)?;
        }
        Ok(())
    }
}

impl fmt::Display for SVCB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.priority, self.target)?;
        for param in &self.params {
            write!(f, " {param}")?;
        }
        Ok(())
    }
}
