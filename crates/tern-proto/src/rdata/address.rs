//! Address record payloads (A, AAAA).

use crate::error::Result;
use crate::wire::{WireReader, WireWriter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// A record - IPv4 address (RFC 1035).
///
/// The payload is the 4 address octets in network order. A declared
/// length other than 4 is caught by the record codec's consumption check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct A {
    address: Ipv4Addr,
}

impl A {
    /// Creates a new A payload.
    #[inline]
    pub const fn new(address: Ipv4Addr) -> Self {
        Self { address }
    }

    /// Returns the IPv4 address.
    #[inline]
    pub const fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Reads 4 address octets.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let b = reader.read_bytes(4)?;
        Ok(Self::new(Ipv4Addr::new(b[0], b[1], b[2], b[3])))
    }

    /// Writes the address octets.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        writer.write_bytes(&self.address.octets())
    }
}

impl From<Ipv4Addr> for A {
    fn from(address: Ipv4Addr) -> Self {
        Self::new(address)
    }
}

impl fmt::Display for A {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

/// AAAA record - IPv6 address (RFC 3596).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AAAA {
    address: Ipv6Addr,
}

impl AAAA {
    /// Creates a new AAAA payload.
    #[inline]
    pub const fn new(address: Ipv6Addr) -> Self {
        Self { address }
    }

    /// Returns the IPv6 address.
    #[inline]
    pub const fn address(&self) -> Ipv6Addr {
        self.address
    }

    /// Reads 16 address octets.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let mut octets = [0u8; 16];
        octets.copy_from_slice(reader.read_bytes(16)?);
        Ok(Self::new(Ipv6Addr::from(octets)))
    }

    /// Writes the address octets.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        writer.write_bytes(&self.address.octets())
    }
}

impl From<Ipv6Addr> for AAAA {
    fn from(address: Ipv6Addr) -> Self {
        Self::new(address)
    }
}

impl fmt::Display for AAAA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a_record() {
        let mut reader = WireReader::new(&[192, 0, 2, 1]);
        let a = A::decode(&mut reader).unwrap();
        assert_eq!(a.address(), Ipv4Addr::new(192, 0, 2, 1));
        assert_eq!(a.to_string(), "192.0.2.1");

        let mut writer = WireWriter::new(4);
        a.encode(&mut writer).unwrap();
        assert_eq!(writer.as_bytes(), &[192, 0, 2, 1]);
    }

    #[test]
    fn test_a_record_short() {
        let mut reader = WireReader::new(&[10, 0, 0]);
        assert!(A::decode(&mut reader).is_err());
    }

    #[test]
    fn test_aaaa_record() {
        let addr: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let mut writer = WireWriter::new(16);
        AAAA::new(addr).encode(&mut writer).unwrap();

        let mut reader = WireReader::new(writer.as_bytes());
        let aaaa = AAAA::decode(&mut reader).unwrap();
        assert_eq!(aaaa.address(), addr);
        assert_eq!(aaaa.to_string(), "2001:db8::1");
    }
}
