//! DNS message header.
//!
//! The header is the fixed 12-byte structure at the start of every message.
//! This codec also owns the question section, which may hold at most one
//! question.

use crate::error::{Error, Result};
use crate::opcode::OpCode;
use crate::question::Question;
use crate::rcode::ResponseCode;
use crate::wire::{WireReader, WireWriter};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 12;

bitflags! {
    /// DNS header flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct HeaderFlags: u16 {
        /// Query/Response flag: 0 = query, 1 = response
        const QR = 0x8000;

        /// Authoritative Answer
        const AA = 0x0400;

        /// Truncation
        const TC = 0x0200;

        /// Recursion Desired
        const RD = 0x0100;

        /// Recursion Available
        const RA = 0x0080;

        /// Reserved, must be zero
        const Z = 0x0040;

        /// Authentic Data
        const AD = 0x0020;

        /// Checking Disabled
        const CD = 0x0010;
    }
}

impl Default for HeaderFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Mask of the opcode bits in the flags word.
const OPCODE_MASK: u16 = 0x7800;

/// Mask of the rcode bits in the flags word.
const RCODE_MASK: u16 = 0x000F;

/// DNS message header with its optional question.
///
/// # Wire Format
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      ID                       |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA| Z|AD|CD|   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    QDCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    ANCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    NSCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    ARCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// The counts are stored as given. A decoded header matches the bytes it
/// came from; keeping them in step with the message sections is checked
/// when a [`Message`](crate::Message) is encoded or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Message identifier.
    pub id: u16,

    /// Single-bit flags.
    pub flags: HeaderFlags,

    /// Operation code.
    pub opcode: OpCode,

    /// Response code.
    pub rcode: ResponseCode,

    /// Number of questions (0 or 1).
    pub qd_count: u16,

    /// Number of answer (prerequisite) records.
    pub an_count: u16,

    /// Number of nameserver (update) records.
    pub ns_count: u16,

    /// Number of additional records.
    pub ar_count: u16,

    /// The question, present exactly when `qd_count` is 1.
    pub question: Option<Question>,
}

impl Header {
    /// Creates an empty query header with the given ID.
    #[inline]
    pub const fn new(id: u16) -> Self {
        Self {
            id,
            flags: HeaderFlags::empty(),
            opcode: OpCode::Query,
            rcode: ResponseCode::NoError,
            qd_count: 0,
            an_count: 0,
            ns_count: 0,
            ar_count: 0,
            question: None,
        }
    }

    /// Creates a header with a random ID, carrying one question.
    pub fn with_question(opcode: OpCode, question: Question) -> Self {
        Self {
            opcode,
            qd_count: 1,
            question: Some(question),
            ..Self::new(rand::random())
        }
    }

    /// Creates a response header for a request.
    ///
    /// The ID, opcode, RD flag and question are copied; all other counts
    /// start at zero.
    pub fn response_from(request: &Header) -> Self {
        Self {
            id: request.id,
            flags: HeaderFlags::QR | (request.flags & HeaderFlags::RD),
            opcode: request.opcode,
            rcode: ResponseCode::NoError,
            qd_count: u16::from(request.question.is_some()),
            an_count: 0,
            ns_count: 0,
            ar_count: 0,
            question: request.question.clone(),
        }
    }

    /// Returns true if this is a response.
    #[inline]
    pub fn is_response(&self) -> bool {
        self.flags.contains(HeaderFlags::QR)
    }

    /// Returns true if the answer is authoritative.
    #[inline]
    pub fn is_authoritative(&self) -> bool {
        self.flags.contains(HeaderFlags::AA)
    }

    /// Returns true if the message was truncated.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.flags.contains(HeaderFlags::TC)
    }

    /// Sets or clears a flag.
    #[inline]
    pub fn set_flag(&mut self, flag: HeaderFlags, on: bool) {
        self.flags.set(flag, on);
    }

    /// Replaces the question and updates `qd_count` to match.
    pub fn set_question(&mut self, question: Option<Question>) {
        self.qd_count = u16::from(question.is_some());
        self.question = question;
    }

    fn flags_word(&self) -> u16 {
        self.flags.bits()
            | (u16::from(self.opcode.to_u8()) << 11)
            | u16::from(self.rcode.to_u8())
    }

    /// Decodes the fixed header and, if present, the question.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let id = reader.read_u16()?;
        let word = reader.read_u16()?;

        #[allow(clippy::cast_possible_truncation)]
        let opcode = OpCode::from_u8(((word & OPCODE_MASK) >> 11) as u8);
        #[allow(clippy::cast_possible_truncation)]
        let rcode = ResponseCode::from_u8((word & RCODE_MASK) as u8);

        let flags = HeaderFlags::from_bits_truncate(word);
        let qd_count = reader.read_u16()?;
        let an_count = reader.read_u16()?;
        let ns_count = reader.read_u16()?;
        let ar_count = reader.read_u16()?;

        let question = match qd_count {
            0 => None,
            1 => Some(Question::decode(reader)?),
            count => return Err(Error::UnsupportedQuestionCount { count }),
        };

        Ok(Self {
            id,
            flags,
            opcode,
            rcode,
            qd_count,
            an_count,
            ns_count,
            ar_count,
            question,
        })
    }

    /// Encodes the fixed header and the question, if any.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        writer.write_u16(self.id)?;
        writer.write_u16(self.flags_word())?;
        writer.write_u16(self.qd_count)?;
        writer.write_u16(self.an_count)?;
        writer.write_u16(self.ns_count)?;
        writer.write_u16(self.ar_count)?;
        if let Some(question) = &self.question {
            question.encode(writer)?;
        }
        Ok(())
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "opcode: {}, status: {}, id: {}",
            self.opcode, self.rcode, self.id
        )?;

        f.write_str("\nflags:")?;
        for (name, flag) in [
            ("qr", HeaderFlags::QR),
            ("aa", HeaderFlags::AA),
            ("tc", HeaderFlags::TC),
            ("rd", HeaderFlags::RD),
            ("ra", HeaderFlags::RA),
            ("ad", HeaderFlags::AD),
            ("cd", HeaderFlags::CD),
        ] {
            if self.flags.contains(flag) {
                write!(f, " {name}")?;
            }
        }

        write!(
            f,
            "; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
            self.qd_count, self.an_count, self.ns_count, self.ar_count
        )
    }
}
