//! DNS question.
//!
//! In an UPDATE message the question section is the zone section: its name
//! is the zone origin and its type is SOA (RFC 2136 Section 2.3).

use crate::class::{Class, RecordClass};
use crate::error::Result;
use crate::name::Name;
use crate::rtype::{RecordType, Type};
use crate::wire::{WireReader, WireWriter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A DNS question.
///
/// # Wire Format
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                     QNAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     QTYPE                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     QCLASS                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    /// The name being asked about.
    pub qname: Name,

    /// The requested type.
    pub qtype: Type,

    /// The requested class.
    pub qclass: Class,
}

impl Question {
    /// Creates a new question.
    #[inline]
    pub fn new(qname: Name, qtype: impl Into<Type>, qclass: impl Into<Class>) -> Self {
        Self {
            qname,
            qtype: qtype.into(),
            qclass: qclass.into(),
        }
    }

    /// Creates the zone section of an UPDATE message.
    #[inline]
    pub fn zone(origin: Name) -> Self {
        Self::new(origin, RecordType::SOA, RecordClass::IN)
    }

    /// Decodes a question at the reader's position.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let qname = reader.read_name()?;
        let qtype = Type::from_u16(reader.read_u16()?);
        let qclass = Class::from_u16(reader.read_u16()?);
        Ok(Self {
            qname,
            qtype,
            qclass,
        })
    }

    /// Encodes the question.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        writer.write_name(&self.qname)?;
        writer.write_u16(self.qtype.to_u16())?;
        writer.write_u16(self.qclass.to_u16())
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.qname, self.qclass, self.qtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_question_wire() {
        let q = Question::zone(Name::from_str("example.com").unwrap());
        let mut writer = WireWriter::new(32);
        q.encode(&mut writer).unwrap();
        assert_eq!(&writer.as_bytes()[13..], &[0, 6, 0, 1]);

        let decoded = Question::decode(&mut WireReader::new(writer.as_bytes())).unwrap();
        assert_eq!(decoded, q);
    }

    #[test]
    fn test_question_truncated() {
        let data = b"\x07example\x03com\x00\x00\x06\x00";
        assert!(Question::decode(&mut WireReader::new(data)).is_err());
    }

    #[test]
    fn test_question_display() {
        let q = Question::new(Name::from_str("example.com").unwrap(), RecordType::A, RecordClass::IN);
        assert_eq!(q.to_string(), "example.com.\tIN\tA");
    }
}
