//! DNS record classes.
//!
//! Besides the data classes, dynamic updates (RFC 2136) give two query
//! classes a meaning of their own: `ANY` and `NONE` select which kind of
//! prerequisite or update a record expresses.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS record class.
///
/// See RFC 1035 Section 3.2.4 and RFC 2136 Section 1.3.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
pub enum RecordClass {
    /// Internet - RFC 1035
    IN = 1,

    /// CHAOS - RFC 1035
    CH = 3,

    /// Hesiod - RFC 1035
    HS = 4,

    /// NONE - RFC 2136
    ///
    /// Marks "does not exist" prerequisites and exact-match deletions.
    NONE = 254,

    /// ANY - RFC 1035
    ///
    /// Marks "exists" prerequisites and RRset or name deletions.
    ANY = 255,
}

impl RecordClass {
    /// Returns the numeric value of the class.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Creates a class from its numeric value.
    #[inline]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Returns true for the update meta-classes (NONE or ANY).
    #[inline]
    pub const fn is_meta(self) -> bool {
        matches!(self, Self::NONE | Self::ANY)
    }

    /// Returns the mnemonic of the class.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::IN => "IN",
            Self::CH => "CH",
            Self::HS => "HS",
            Self::NONE => "NONE",
            Self::ANY => "ANY",
        }
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for RecordClass {
    fn default() -> Self {
        Self::IN
    }
}

/// A class value that keeps unassigned codes intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Class {
    /// A known class.
    Known(RecordClass),
    /// Any other 16-bit class code.
    Unknown(u16),
}

impl Class {
    /// Creates a class from a u16 value.
    #[inline]
    pub fn from_u16(value: u16) -> Self {
        RecordClass::from_u16(value).map_or(Self::Unknown(value), Self::Known)
    }

    /// Returns the numeric value.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::Known(c) => c.to_u16(),
            Self::Unknown(v) => v,
        }
    }

    /// Returns the known class, if any.
    #[inline]
    pub const fn as_known(self) -> Option<RecordClass> {
        match self {
            Self::Known(c) => Some(c),
            Self::Unknown(_) => None,
        }
    }

    /// Returns true if this is the given known class.
    #[inline]
    pub fn is(self, class: RecordClass) -> bool {
        self == Self::Known(class)
    }
}

impl From<RecordClass> for Class {
    fn from(c: RecordClass) -> Self {
        Self::Known(c)
    }
}

impl From<u16> for Class {
    fn from(value: u16) -> Self {
        Self::from_u16(value)
    }
}

impl PartialEq<RecordClass> for Class {
    fn eq(&self, other: &RecordClass) -> bool {
        self.is(*other)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(c) => write!(f, "{c}"),
            Self::Unknown(v) => write!(f, "CLASS{v}"),
        }
    }
}

impl Default for Class {
    fn default() -> Self {
        Self::Known(RecordClass::IN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_values() {
        assert_eq!(RecordClass::IN.to_u16(), 1);
        assert_eq!(RecordClass::NONE.to_u16(), 254);
        assert_eq!(RecordClass::ANY.to_u16(), 255);
        assert_eq!(RecordClass::from_u16(2), None);
    }

    #[test]
    fn test_meta_classes() {
        assert!(RecordClass::ANY.is_meta());
        assert!(RecordClass::NONE.is_meta());
        assert!(!RecordClass::IN.is_meta());
    }

    #[test]
    fn test_generic_class() {
        let c = Class::from_u16(254);
        assert_eq!(c, RecordClass::NONE);
        assert_eq!(c.to_string(), "NONE");

        let c = Class::from_u16(12345);
        assert_eq!(c.as_known(), None);
        assert_eq!(c.to_u16(), 12345);
        assert_eq!(c.to_string(), "CLASS12345");
    }
}
