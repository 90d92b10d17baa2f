//! DNS resource records.
//!
//! A resource record (RR) is the fundamental unit of DNS data: an owner
//! name, type, class, TTL and an optional payload. Dynamic updates use
//! records without a payload (RDLENGTH 0) to express "any value".

use crate::class::{Class, RecordClass};
use crate::error::{Error, Result};
use crate::name::Name;
use crate::rdata::{A, AAAA, RData, SOA, TXT};
use crate::rtype::{RecordType, Type};
use crate::wire::{WireReader, WireWriter};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// A DNS resource record.
///
/// # Wire Format
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                      NAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      TYPE                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     CLASS                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      TTL                      |
/// |                                               |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                   RDLENGTH                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                     RDATA                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// An RDLENGTH of zero decodes to a record with no payload, and a record
/// with no payload encodes with RDLENGTH zero. A payload that encodes to
/// zero bytes, such as an OPT without options, is stored as no payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRecord {
    name: Name,
    rtype: Type,
    rclass: Class,
    ttl: u32,
    rdata: Option<RData>,
}

impl ResourceRecord {
    /// Creates a new resource record.
    ///
    /// An empty payload (see [`RData::is_empty`]) is dropped.
    pub fn new(
        name: Name,
        rtype: impl Into<Type>,
        rclass: impl Into<Class>,
        ttl: u32,
        rdata: Option<RData>,
    ) -> Self {
        Self {
            name,
            rtype: rtype.into(),
            rclass: rclass.into(),
            ttl,
            rdata: rdata.filter(|d| !d.is_empty()),
        }
    }

    /// Creates an IN record whose type is taken from the payload.
    pub fn with_rdata(name: Name, ttl: u32, rdata: RData) -> Self {
        Self::new(name, rdata.record_type(), RecordClass::IN, ttl, Some(rdata))
    }

    /// Creates an A record.
    pub fn a(name: Name, ttl: u32, addr: Ipv4Addr) -> Self {
        Self::with_rdata(name, ttl, RData::A(A::new(addr)))
    }

    /// Creates an AAAA record.
    pub fn aaaa(name: Name, ttl: u32, addr: Ipv6Addr) -> Self {
        Self::with_rdata(name, ttl, RData::AAAA(AAAA::new(addr)))
    }

    /// Creates a TXT record with a single string.
    pub fn txt(name: Name, ttl: u32, text: impl Into<Vec<u8>>) -> Self {
        Self::with_rdata(name, ttl, RData::TXT(TXT::new([text])))
    }

    /// Creates an SOA record.
    pub fn soa(name: Name, ttl: u32, soa: SOA) -> Self {
        Self::with_rdata(name, ttl, RData::SOA(soa))
    }

    /// Returns the owner name.
    #[inline]
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the record type.
    #[inline]
    pub fn rtype(&self) -> Type {
        self.rtype
    }

    /// Returns the record class.
    #[inline]
    pub fn rclass(&self) -> Class {
        self.rclass
    }

    /// Returns the TTL in seconds.
    #[inline]
    pub const fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the payload, if any.
    #[inline]
    pub fn rdata(&self) -> Option<&RData> {
        self.rdata.as_ref()
    }

    /// Returns the payload for in-place changes.
    ///
    /// Emptying the payload through this reference leaves it in place, so
    /// the record no longer compares equal to its decoded form.
    #[inline]
    pub fn rdata_mut(&mut self) -> Option<&mut RData> {
        self.rdata.as_mut()
    }

    /// Replaces the TTL.
    #[inline]
    pub fn set_ttl(&mut self, ttl: u32) {
        self.ttl = ttl;
    }

    /// Replaces the payload. An empty payload is dropped.
    #[inline]
    pub fn set_rdata(&mut self, rdata: Option<RData>) {
        self.rdata = rdata.filter(|d| !d.is_empty());
    }

    /// Returns true if the owner name and type both match.
    #[inline]
    pub fn matches(&self, name: &Name, rtype: Type) -> bool {
        self.rtype == rtype && &self.name == name
    }

    /// Returns true if this record has the given known type.
    #[inline]
    pub fn is_type(&self, rtype: RecordType) -> bool {
        self.rtype.is(rtype)
    }

    /// Decodes a record at the reader's position.
    ///
    /// The payload decoder must end exactly `RDLENGTH` bytes after the
    /// length field, otherwise the record is rejected as truncated or
    /// overlong.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let name = reader.read_name()?;
        let rtype = Type::from_u16(reader.read_u16()?);
        let rclass = Class::from_u16(reader.read_u16()?);
        let ttl = reader.read_u32()?;
        let rdlength = reader.read_u16()?;

        let rdata = if rdlength == 0 {
            None
        } else {
            let expected_end = reader.position() + usize::from(rdlength);
            let rdata = RData::decode(rtype, reader, rdlength)?;
            let actual_end = reader.position();
            if actual_end != expected_end {
                return Err(Error::TruncatedOrOverlongResource {
                    expected_end,
                    actual_end,
                });
            }
            Some(rdata)
        };

        Ok(Self {
            name,
            rtype,
            rclass,
            ttl,
            rdata,
        })
    }

    /// Encodes the record.
    ///
    /// The length field is written as a placeholder and patched once the
    /// payload size is known.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        writer.write_name(&self.name)?;
        writer.write_u16(self.rtype.to_u16())?;
        writer.write_u16(self.rclass.to_u16())?;
        writer.write_u32(self.ttl)?;

        let length_at = writer.len();
        writer.write_u16(0)?;
        if let Some(rdata) = &self.rdata {
            rdata.encode(writer)?;
            let length = writer.len() - length_at - 2;
            let rdlength =
                u16::try_from(length).map_err(|_| Error::RDataTooLong { length })?;
            writer.write_u16_at(length_at, rdlength)?;
        }
        Ok(())
    }

    /// Encodes the record into a standalone buffer.
    pub fn to_wire(&self) -> Result<Bytes> {
        let mut writer = WireWriter::new(self.name.wire_len() + 32);
        self.encode(&mut writer)?;
        Ok(writer.freeze())
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.name, self.ttl, self.rclass, self.rtype
        )?;
        if let Some(rdata) = &self.rdata {
            write!(f, "\t{rdata}")?;
        }
        Ok(())
    }
}
