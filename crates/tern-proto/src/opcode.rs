//! DNS operation codes (RFC 1035 Section 4.1.1, RFC 2136).

use num_enum::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS operation code.
///
/// Unassigned values decode to [`OpCode::Unknown`] and encode back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum OpCode {
    /// Standard query - RFC 1035
    Query = 0,

    /// Inverse query - RFC 1035, obsoleted by RFC 3425
    IQuery = 1,

    /// Server status request - RFC 1035
    Status = 2,

    /// Zone change notification - RFC 1996
    Notify = 4,

    /// Dynamic update - RFC 2136
    Update = 5,

    /// Any other 4-bit value.
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl OpCode {
    /// Returns the numeric value of the opcode.
    #[inline]
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Query => 0,
            Self::IQuery => 1,
            Self::Status => 2,
            Self::Notify => 4,
            Self::Update => 5,
            Self::Unknown(value) => value & 0x0f,
        }
    }

    /// Creates an opcode from the 4-bit header field.
    #[inline]
    pub fn from_u8(value: u8) -> Self {
        Self::from_primitive(value & 0x0f)
    }

    /// Returns the mnemonic used in dig-style output, if the opcode has one.
    #[inline]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::Query => Some("QUERY"),
            Self::IQuery => Some("IQUERY"),
            Self::Status => Some("STATUS"),
            Self::Notify => Some("NOTIFY"),
            Self::Update => Some("UPDATE"),
            Self::Unknown(_) => None,
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "OPCODE{}", self.to_u8()),
        }
    }
}

impl Default for OpCode {
    fn default() -> Self {
        Self::Query
    }
}
