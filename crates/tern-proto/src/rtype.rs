//! DNS record types.
//!
//! Only the types that have a structured payload codec, plus the query
//! meta-types that dynamic updates reason about, get a name here. Every
//! other type code survives as [`Type::Unknown`].

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// DNS record type.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
pub enum RecordType {
    // =========================================================================
    // Data Types
    // =========================================================================
    /// IPv4 address - RFC 1035
    A = 1,

    /// Authoritative name server - RFC 1035
    NS = 2,

    /// Canonical name (alias) - RFC 1035
    CNAME = 5,

    /// Start of authority - RFC 1035
    SOA = 6,

    /// Domain name pointer - RFC 1035
    PTR = 12,

    /// Mail exchange - RFC 1035
    MX = 15,

    /// Text strings - RFC 1035
    TXT = 16,

    /// IPv6 address - RFC 3596
    AAAA = 28,

    /// EDNS option pseudo-record - RFC 6891
    OPT = 41,

    /// Service binding - RFC 9460
    SVCB = 64,

    /// HTTPS service binding - RFC 9460
    HTTPS = 65,

    /// Sender policy framework - RFC 7208
    SPF = 99,

    // =========================================================================
    // Query Meta-Types
    // =========================================================================
    /// Zone transfer - RFC 1035
    AXFR = 252,

    /// Mailbox-related records - RFC 1035
    MAILB = 253,

    /// Mail agent records - RFC 1035
    MAILA = 254,

    /// All records - RFC 1035
    ANY = 255,
}

impl RecordType {
    /// Returns the numeric value of the type.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Creates a type from its numeric value.
    #[inline]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Returns true for types that only make sense in questions.
    #[inline]
    pub const fn is_query_type(self) -> bool {
        matches!(self, Self::AXFR | Self::MAILB | Self::MAILA | Self::ANY)
    }

    /// Returns the mnemonic of the type.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::NS => "NS",
            Self::CNAME => "CNAME",
            Self::SOA => "SOA",
            Self::PTR => "PTR",
            Self::MX => "MX",
            Self::TXT => "TXT",
            Self::AAAA => "AAAA",
            Self::OPT => "OPT",
            Self::SVCB => "SVCB",
            Self::HTTPS => "HTTPS",
            Self::SPF => "SPF",
            Self::AXFR => "AXFR",
            Self::MAILB => "MAILB",
            Self::MAILA => "MAILA",
            Self::ANY => "ANY",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for RecordType {
    fn default() -> Self {
        Self::A
    }
}

/// A type value that keeps unassigned codes intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// A known record type.
    Known(RecordType),
    /// Any other 16-bit type code.
    Unknown(u16),
}

impl Type {
    /// Creates a type from a u16 value.
    #[inline]
    pub fn from_u16(value: u16) -> Self {
        RecordType::from_u16(value).map_or(Self::Unknown(value), Self::Known)
    }

    /// Returns the numeric value.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::Known(t) => t.to_u16(),
            Self::Unknown(v) => v,
        }
    }

    /// Returns the known type, if any.
    #[inline]
    pub const fn as_known(self) -> Option<RecordType> {
        match self {
            Self::Known(t) => Some(t),
            Self::Unknown(_) => None,
        }
    }

    /// Returns true if this is the given known type.
    #[inline]
    pub fn is(self, rtype: RecordType) -> bool {
        self == Self::Known(rtype)
    }

    /// Returns true for AXFR, MAILB, MAILA and ANY.
    #[inline]
    pub fn is_query_type(self) -> bool {
        self.as_known().is_some_and(RecordType::is_query_type)
    }
}

impl From<RecordType> for Type {
    fn from(t: RecordType) -> Self {
        Self::Known(t)
    }
}

impl From<u16> for Type {
    fn from(value: u16) -> Self {
        Self::from_u16(value)
    }
}

impl PartialEq<RecordType> for Type {
    fn eq(&self, other: &RecordType) -> bool {
        self.is(*other)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(t) => write!(f, "{t}"),
            Self::Unknown(v) => write!(f, "TYPE{v}"),
        }
    }
}

impl FromStr for Type {
    type Err = Error;

    /// Parses a mnemonic such as `AAAA`, or the generic `TYPE65280` form.
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.to_ascii_uppercase();
        if let Some(code) = upper.strip_prefix("TYPE").and_then(|n| n.parse().ok()) {
            return Ok(Self::from_u16(code));
        }
        (1..=u16::from(u8::MAX))
            .filter_map(RecordType::from_u16)
            .find(|t| t.name() == upper)
            .map(Self::Known)
            .ok_or_else(|| Error::UnknownRecordType {
                mnemonic: s.to_string(),
            })
    }
}

impl Default for Type {
    fn default() -> Self {
        Self::Known(RecordType::A)
    }
}
