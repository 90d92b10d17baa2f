//! DNS record payloads (RDATA).
//!
//! - **Address**: A, AAAA
//! - **Name**: NS, CNAME, PTR, MX
//! - **Text**: TXT, SPF
//! - **Authority**: SOA
//! - **Options**: OPT
//! - **Service binding**: SVCB, HTTPS
//!
//! Every other type code is carried as [`Unknown`] raw bytes. Payload
//! decoders read through the message cursor; checking that exactly the
//! declared length was consumed is the record codec's job.

pub mod address;
pub mod authority;
pub mod name;
pub mod opt;
pub mod service;
pub mod text;
pub mod unknown;

pub use address::{A, AAAA};
pub use authority::SOA;
pub use name::{CNAME, MX, NS, PTR};
pub use opt::{EdnsOption, OPT};
pub use service::{SVCB, SvcParam, SvcParamKey};
pub use text::TXT;
pub use unknown::Unknown;

use crate::error::Result;
use crate::rtype::{RecordType, Type};
use crate::wire::{WireReader, WireWriter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// A decoded record payload.
///
/// Two payloads are equal when they have the same variant and content,
/// which is the comparison dynamic updates use to match records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RData {
    /// IPv4 address
    A(A),

    /// IPv6 address
    AAAA(AAAA),

    /// Authoritative name server
    NS(NS),

    /// Canonical name
    CNAME(CNAME),

    /// Domain name pointer
    PTR(PTR),

    /// Mail exchange
    MX(MX),

    /// Start of authority
    SOA(SOA),

    /// Text strings
    TXT(TXT),

    /// Sender policy, same layout as TXT
    SPF(TXT),

    /// EDNS options
    OPT(OPT),

    /// Service binding
    SVCB(SVCB),

    /// HTTPS service binding, same layout as SVCB
    HTTPS(SVCB),

    /// Any other type, kept as raw bytes
    Unknown(Unknown),
}

impl RData {
    /// Decodes a payload of `rdlength` bytes at the reader's position.
    ///
    /// Fixed-layout payloads read exactly what they need, so a mismatch
    /// with `rdlength` shows up as a consumption error in the record codec.
    /// List-shaped payloads (TXT, SPF, OPT, SVCB, HTTPS) read until the
    /// declared end.
    pub fn decode(rtype: Type, reader: &mut WireReader<'_>, rdlength: u16) -> Result<Self> {
        let len = usize::from(rdlength);
        let end = reader.position() + len;

        let Some(known) = rtype.as_known() else {
            return Ok(Self::Unknown(Unknown::decode(reader, rtype.to_u16(), len)?));
        };

        Ok(match known {
            RecordType::A => Self::A(A::decode(reader)?),
            RecordType::AAAA => Self::AAAA(AAAA::decode(reader)?),
            RecordType::NS => Self::NS(NS::decode(reader)?),
            RecordType::CNAME => Self::CNAME(CNAME::decode(reader)?),
            RecordType::PTR => Self::PTR(PTR::decode(reader)?),
            RecordType::MX => Self::MX(MX::decode(reader)?),
            RecordType::SOA => Self::SOA(SOA::decode(reader)?),
            RecordType::TXT => Self::TXT(TXT::decode(reader, end)?),
            RecordType::SPF => Self::SPF(TXT::decode(reader, end)?),
            RecordType::OPT => Self::OPT(OPT::decode(reader, end)?),
            RecordType::SVCB => Self::SVCB(SVCB::decode(reader, end)?),
            RecordType::HTTPS => Self::HTTPS(SVCB::decode(reader, end)?),
            RecordType::AXFR | RecordType::MAILB | RecordType::MAILA | RecordType::ANY => {
                Self::Unknown(Unknown::decode(reader, known.to_u16(), len)?)
            }
        })
    }

    /// Encodes the payload without its length prefix.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        match self {
            Self::A(r) => r.encode(writer),
            Self::AAAA(r) => r.encode(writer),
            Self::NS(r) => r.encode(writer),
            Self::CNAME(r) => r.encode(writer),
            Self::PTR(r) => r.encode(writer),
            Self::MX(r) => r.encode(writer),
            Self::SOA(r) => r.encode(writer),
            Self::TXT(r) | Self::SPF(r) => r.encode(writer),
            Self::OPT(r) => r.encode(writer),
            Self::SVCB(r) | Self::HTTPS(r) => r.encode(writer),
            Self::Unknown(r) => r.encode(writer),
        }
    }

    /// Returns the record type this payload belongs to.
    pub fn record_type(&self) -> Type {
        match self {
            Self::A(_) => RecordType::A.into(),
            Self::AAAA(_) => RecordType::AAAA.into(),
            Self::NS(_) => RecordType::NS.into(),
            Self::CNAME(_) => RecordType::CNAME.into(),
            Self::PTR(_) => RecordType::PTR.into(),
            Self::MX(_) => RecordType::MX.into(),
            Self::SOA(_) => RecordType::SOA.into(),
            Self::TXT(_) => RecordType::TXT.into(),
            Self::SPF(_) => RecordType::SPF.into(),
            Self::OPT(_) => RecordType::OPT.into(),
            Self::SVCB(_) => RecordType::SVCB.into(),
            Self::HTTPS(_) => RecordType::HTTPS.into(),
            Self::Unknown(u) => Type::from_u16(u.type_code()),
        }
    }

    /// Returns true if the payload encodes to zero bytes.
    ///
    /// Such a payload is indistinguishable on the wire from no payload.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::TXT(r) | Self::SPF(r) => r.strings().is_empty(),
            Self::OPT(r) => r.options().is_empty(),
            Self::Unknown(r) => r.data().is_empty(),
            _ => false,
        }
    }

    /// Returns the IPv4 address of an A payload.
    pub fn as_a(&self) -> Option<Ipv4Addr> {
        match self {
            Self::A(a) => Some(a.address()),
            _ => None,
        }
    }

    /// Returns the IPv6 address of an AAAA payload.
    pub fn as_aaaa(&self) -> Option<Ipv6Addr> {
        match self {
            Self::AAAA(aaaa) => Some(aaaa.address()),
            _ => None,
        }
    }

    /// Returns the SOA payload.
    pub fn as_soa(&self) -> Option<&SOA> {
        match self {
            Self::SOA(soa) => Some(soa),
            _ => None,
        }
    }

    /// Returns the SOA payload for in-place changes.
    pub fn as_soa_mut(&mut self) -> Option<&mut SOA> {
        match self {
            Self::SOA(soa) => Some(soa),
            _ => None,
        }
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A(r) => write!(f, "{r}"),
            Self::AAAA(r) => write!(f, "{r}"),
            Self::NS(r) => write!(f, "{r}"),
            Self::CNAME(r) => write!(f, "{r}"),
            Self::PTR(r) => write!(f, "{r}"),
            Self::MX(r) => write!(f, "{r}"),
            Self::SOA(r) => write!(f, "{r}"),
            Self::TXT(r) | Self::SPF(r) => write!(f, "{r}"),
            Self::OPT(r) => write!(f, "{r}"),
            Self::SVCB(r) | Self::HTTPS(r) => write!(f, "{r}"),
            Self::Unknown(r) => write!(f, "{r}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(rtype: impl Into<Type>, data: &[u8]) -> Result<RData> {
        let mut reader = WireReader::new(data);
        #[allow(clippy::cast_possible_truncation)]
        RData::decode(rtype.into(), &mut reader, data.len() as u16)
    }

    #[test]
    fn test_dispatch_by_type() {
        assert_eq!(
            decode(RecordType::A, &[10, 0, 0, 1]).unwrap().as_a(),
            Some(Ipv4Addr::new(10, 0, 0, 1))
        );
        assert!(matches!(
            decode(RecordType::SPF, b"\x06v=spf1").unwrap(),
            RData::SPF(_)
        ));
        assert!(matches!(
            decode(RecordType::HTTPS, b"\x00\x00\x00").unwrap(),
            RData::HTTPS(_)
        ));
    }

    #[test]
    fn test_unknown_type_keeps_code() {
        let rdata = decode(4242u16, &[1, 2, 3]).unwrap();
        assert_eq!(rdata.record_type(), Type::Unknown(4242));
        assert_eq!(rdata.to_string(), "\\# 3 010203");
    }

    #[test]
    fn test_record_type_of_shared_layouts() {
        let txt = TXT::new(["x"]);
        assert_eq!(RData::SPF(txt.clone()).record_type(), RecordType::SPF);
        assert_eq!(RData::TXT(txt).record_type(), RecordType::TXT);
    }

    #[test]
    fn test_payload_equality_by_variant() {
        let txt = TXT::new(["same"]);
        assert_ne!(RData::TXT(txt.clone()), RData::SPF(txt));
    }

    #[test]
    fn test_empty_payloads() {
        assert!(!RData::TXT(TXT::new(["x"])).is_empty());
        assert!(!RData::TXT(TXT::new([""])).is_empty());
        assert!(RData::TXT(TXT::new(Vec::<Vec<u8>>::new())).is_empty());
        assert!(RData::OPT(OPT::new(vec![])).is_empty());
        assert!(RData::Unknown(Unknown::new(4242, Vec::new())).is_empty());
        assert!(!RData::Unknown(Unknown::new(4242, vec![0])).is_empty());
    }
}
