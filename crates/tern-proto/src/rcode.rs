//! DNS response codes (RCODEs).
//!
//! Only the 4-bit header codes are modelled. Dynamic updates report their
//! outcome through codes 6 to 10 (RFC 2136 Section 2.2).

use num_enum::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS response code.
///
/// Unassigned values decode to [`ResponseCode::Unknown`] and encode back
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResponseCode {
    /// No error condition - RFC 1035
    NoError = 0,

    /// Format error - RFC 1035
    ///
    /// The server was unable to interpret the request.
    FormErr = 1,

    /// Server failure - RFC 1035
    ServFail = 2,

    /// Name error - RFC 1035
    ///
    /// A name that ought to exist does not.
    NXDomain = 3,

    /// Not implemented - RFC 1035
    NotImp = 4,

    /// Refused for policy reasons - RFC 1035
    Refused = 5,

    /// Name exists when it should not - RFC 2136
    YXDomain = 6,

    /// RRset exists when it should not - RFC 2136
    YXRRSet = 7,

    /// RRset that should exist does not - RFC 2136
    NXRRSet = 8,

    /// Server not authoritative for the zone - RFC 2136
    NotAuth = 9,

    /// Name not contained in the zone - RFC 2136
    NotZone = 10,

    /// Any other 4-bit value.
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl ResponseCode {
    /// Returns the numeric value of the response code.
    #[inline]
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::NoError => 0,
            Self::FormErr => 1,
            Self::ServFail => 2,
            Self::NXDomain => 3,
            Self::NotImp => 4,
            Self::Refused => 5,
            Self::YXDomain => 6,
            Self::YXRRSet => 7,
            Self::NXRRSet => 8,
            Self::NotAuth => 9,
            Self::NotZone => 10,
            Self::Unknown(value) => value & 0x0f,
        }
    }

    /// Creates a response code from the 4-bit header field.
    #[inline]
    pub fn from_u8(value: u8) -> Self {
        Self::from_primitive(value & 0x0f)
    }

    /// Returns true if this code signals success.
    #[inline]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::NoError)
    }

    /// Returns the mnemonic of the response code, if it has one.
    #[inline]
    pub const fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::NoError => "NOERROR",
            Self::FormErr => "FORMERR",
            Self::ServFail => "SERVFAIL",
            Self::NXDomain => "NXDOMAIN",
            Self::NotImp => "NOTIMP",
            Self::Refused => "REFUSED",
            Self::YXDomain => "YXDOMAIN",
            Self::YXRRSet => "YXRRSET",
            Self::NXRRSet => "NXRRSET",
            Self::NotAuth => "NOTAUTH",
            Self::NotZone => "NOTZONE",
            Self::Unknown(_) => return None,
        })
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "RCODE{}", self.to_u8()),
        }
    }
}

impl Default for ResponseCode {
    fn default() -> Self {
        Self::NoError
    }
}
