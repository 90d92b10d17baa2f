//! Start of authority payload (SOA).

use crate::error::Result;
use crate::name::Name;
use crate::wire::{WireReader, WireWriter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SOA record - Start of Authority (RFC 1035).
///
/// # Wire Format
///
/// ```text
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                     MNAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                     RNAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    SERIAL                     |
/// |                    REFRESH                    |
/// |                     RETRY                     |
/// |                    EXPIRE                     |
/// |                    MINIMUM                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// The five timers are 32-bit each.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SOA {
    mname: Name,
    rname: Name,
    serial: u32,
    refresh: u32,
    retry: u32,
    expire: u32,
    minimum: u32,
}

impl SOA {
    /// Creates a new SOA payload.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mname: Name,
        rname: Name,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    ) -> Self {
        Self {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        }
    }

    /// Returns the primary name server.
    #[inline]
    pub fn mname(&self) -> &Name {
        &self.mname
    }

    /// Returns the responsible mailbox, encoded as a name.
    #[inline]
    pub fn rname(&self) -> &Name {
        &self.rname
    }

    /// Returns the zone serial number.
    #[inline]
    pub const fn serial(&self) -> u32 {
        self.serial
    }

    /// Returns the refresh interval in seconds.
    #[inline]
    pub const fn refresh(&self) -> u32 {
        self.refresh
    }

    /// Returns the retry interval in seconds.
    #[inline]
    pub const fn retry(&self) -> u32 {
        self.retry
    }

    /// Returns the expire time in seconds.
    #[inline]
    pub const fn expire(&self) -> u32 {
        self.expire
    }

    /// Returns the minimum (negative caching) TTL in seconds.
    #[inline]
    pub const fn minimum(&self) -> u32 {
        self.minimum
    }

    /// Advances the serial by one, wrapping as RFC 1982 serial arithmetic
    /// allows.
    pub fn increment_serial(&mut self) {
        self.serial = self.serial.wrapping_add(1);
    }

    /// Reads both names and the five timers.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let mname = reader.read_name()?;
        let rname = reader.read_name()?;
        Ok(Self {
            mname,
            rname,
            serial: reader.read_u32()?,
            refresh: reader.read_u32()?,
            retry: reader.read_u32()?,
            expire: reader.read_u32()?,
            minimum: reader.read_u32()?,
        })
    }

    /// Writes both names and the five timers.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        writer.write_name(&self.mname)?;
        writer.write_name(&self.rname)?;
        for value in [
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.minimum,
        ] {
            writer.write_u32(value)?;
        }
        Ok(())
    }
}

impl fmt::Display for SOA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname,
            self.rname,
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.minimum
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample() -> SOA {
        SOA::new(
            Name::from_str("ns1.example.com").unwrap(),
            Name::from_str("hostmaster.example.com").unwrap(),
            2024010101,
            7200,
            3600,
            1209600,
            3600,
        )
    }

    #[test]
    fn test_soa_encode_decode() {
        let soa = sample();
        let mut writer = WireWriter::new(64);
        soa.encode(&mut writer).unwrap();
        assert_eq!(writer.len(), 17 + 24 + 20);

        let mut reader = WireReader::new(writer.as_bytes());
        assert_eq!(SOA::decode(&mut reader).unwrap(), soa);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_soa_truncated_timers() {
        let soa = sample();
        let mut writer = WireWriter::new(64);
        soa.encode(&mut writer).unwrap();
        let bytes = &writer.as_bytes()[..writer.len() - 2];

        assert!(SOA::decode(&mut WireReader::new(bytes)).is_err());
    }

    #[test]
    fn test_serial_wraps() {
        let mut soa = SOA::new(Name::root(), Name::root(), u32::MAX, 0, 0, 0, 0);
        soa.increment_serial();
        assert_eq!(soa.serial(), 0);
    }

    #[test]
    fn test_soa_display() {
        assert_eq!(
            sample().to_string(),
            "ns1.example.com. hostmaster.example.com. 2024010101 7200 3600 1209600 3600"
        );
    }
}
