//! Payloads that carry a domain name (NS, CNAME, PTR, MX).
//!
//! Embedded names may be compressed on the wire; they are decoded against
//! the whole message and always written uncompressed.

use crate::error::Result;
use crate::name::Name;
use crate::wire::{WireReader, WireWriter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// NS record - Authoritative name server (RFC 1035).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NS {
    nsdname: Name,
}

impl NS {
    /// Creates a new NS payload.
    #[inline]
    pub fn new(nsdname: Name) -> Self {
        Self { nsdname }
    }

    /// Returns the name server name.
    #[inline]
    pub fn nsdname(&self) -> &Name {
        &self.nsdname
    }

    /// Reads the name server name.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self::new(reader.read_name()?))
    }

    /// Writes the name server name.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        writer.write_name(&self.nsdname)
    }
}

impl fmt::Display for NS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nsdname)
    }
}

/// CNAME record - Canonical name (RFC 1035).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CNAME {
    target: Name,
}

impl CNAME {
    /// Creates a new CNAME payload.
    #[inline]
    pub fn new(target: Name) -> Self {
        Self { target }
    }

    /// Returns the canonical name.
    #[inline]
    pub fn target(&self) -> &Name {
        &self.target
    }

    /// Reads the canonical name.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self::new(reader.read_name()?))
    }

    /// Writes the canonical name.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        writer.write_name(&self.target)
    }
}

impl fmt::Display for CNAME {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)
    }
}

/// PTR record - Domain name pointer (RFC 1035).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PTR {
    ptrdname: Name,
}

impl PTR {
    /// Creates a new PTR payload.
    #[inline]
    pub fn new(ptrdname: Name) -> Self {
        Self { ptrdname }
    }

    /// Returns the pointed-to name.
    #[inline]
    pub fn ptrdname(&self) -> &Name {
        &self.ptrdname
    }

    /// Reads the pointed-to name.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self::new(reader.read_name()?))
    }

    /// Writes the pointed-to name.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        writer.write_name(&self.ptrdname)
    }
}

impl fmt::Display for PTR {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ptrdname)
    }
}

/// MX record - Mail exchange (RFC 1035).
///
/// Wire format: 16-bit preference followed by the exchange name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MX {
    preference: u16,
    exchange: Name,
}

impl MX {
    /// Creates a new MX payload.
    #[inline]
    pub fn new(preference: u16, exchange: Name) -> Self {
        Self {
            preference,
            exchange,
        }
    }

    /// Returns the preference. Lower values are tried first.
    #[inline]
    pub const fn preference(&self) -> u16 {
        self.preference
    }

    /// Returns the mail exchange host.
    #[inline]
    pub fn exchange(&self) -> &Name {
        &self.exchange
    }

    /// Reads preference and exchange.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let preference = reader.read_u16()?;
        let exchange = reader.read_name()?;
        Ok(Self::new(preference, exchange))
    }

    /// Writes preference and exchange.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        writer.write_u16(self.preference)?;
        writer.write_name(&self.exchange)
    }
}

impl fmt::Display for MX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ns_follows_pointer() {
        // "example.com" at 0, NS rdata at 13 is a bare pointer to it.
        let data = b"\x07example\x03com\x00\xc0\x00";
        let mut reader = WireReader::new(data);
        reader.read_bytes(13).unwrap();

        let ns = NS::decode(&mut reader).unwrap();
        assert_eq!(ns.nsdname(), &Name::from_str("example.com").unwrap());
        assert_eq!(reader.position(), 15);
    }

    #[test]
    fn test_mx_record() {
        let mx = MX::new(10, Name::from_str("mail.example.com").unwrap());
        let mut writer = WireWriter::new(32);
        mx.encode(&mut writer).unwrap();
        assert_eq!(&writer.as_bytes()[..2], &[0, 10]);

        let mut reader = WireReader::new(writer.as_bytes());
        assert_eq!(MX::decode(&mut reader).unwrap(), mx);
        assert_eq!(mx.to_string(), "10 mail.example.com.");
    }

    #[test]
    fn test_cname_display() {
        let cname = CNAME::new(Name::from_str("target.example.net").unwrap());
        assert_eq!(cname.to_string(), "target.example.net.");
    }
}
