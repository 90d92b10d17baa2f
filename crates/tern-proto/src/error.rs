//! DNS protocol error types.
//!
//! Every failure of the wire codec is reported through [`Error`]. Decoding
//! never panics on hostile input; it stops at the first problem and says
//! where it happened.

use crate::message::Section;
use thiserror::Error;

/// Result type alias for DNS protocol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// DNS protocol errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Wire Format Errors
    // =========================================================================
    /// Unexpected end of data while decoding.
    #[error("unexpected end of data at offset {offset}")]
    UnexpectedEof {
        /// Byte offset where the data ran out.
        offset: usize,
    },

    /// The output buffer cannot hold the encoded data.
    #[error("buffer too small: cannot write {needed} bytes with {available} available")]
    BufferTooSmall {
        /// Bytes needed to write.
        needed: usize,
        /// Space left in the buffer.
        available: usize,
    },

    /// Message exceeds the size a transport can carry.
    #[error("message too large: {size} bytes exceeds maximum of {max_size}")]
    MessageTooLarge {
        /// Actual message size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    // =========================================================================
    // Domain Name Errors
    // =========================================================================
    /// A name on the wire could not be decoded.
    #[error("malformed name at offset {offset}: {reason}")]
    MalformedName {
        /// Byte offset of the offending length octet or pointer.
        offset: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Label exceeds maximum length of 63 bytes.
    #[error("label too long: {length} bytes exceeds maximum of 63")]
    LabelTooLong {
        /// Actual label length.
        length: usize,
    },

    /// Domain name exceeds maximum length of 255 bytes.
    #[error("name too long: {length} bytes exceeds maximum of 255")]
    NameTooLong {
        /// Length of the name in wire format.
        length: usize,
    },

    /// Empty label inside a textual name.
    #[error("empty label at position {position}")]
    EmptyLabel {
        /// Index of the empty label.
        position: usize,
    },

    /// Invalid character in a textual label.
    #[error("invalid character '{character}' in label at position {position}")]
    InvalidLabelChar {
        /// The invalid character.
        character: char,
        /// Position in the label.
        position: usize,
    },

    // =========================================================================
    // Header Errors
    // =========================================================================
    /// More than one question in a message.
    #[error("unsupported question count: {count} (at most one question is allowed)")]
    UnsupportedQuestionCount {
        /// Question count from the header.
        count: u16,
    },

    // =========================================================================
    // Record Errors
    // =========================================================================
    /// A record type mnemonic that is not recognized.
    #[error("unknown record type: {mnemonic}")]
    UnknownRecordType {
        /// The text that failed to parse.
        mnemonic: String,
    },
    /// The payload decoder did not consume exactly the declared length.
    #[error(
        "truncated or overlong resource: rdata should end at offset {expected_end}, decoder stopped at {actual_end}"
    )]
    TruncatedOrOverlongResource {
        /// Offset where the declared payload ends.
        expected_end: usize,
        /// Offset where the payload decoder stopped.
        actual_end: usize,
    },

    /// Encoded payload does not fit a 16-bit length field.
    #[error("rdata too long: {length} bytes exceeds maximum of 65535")]
    RDataTooLong {
        /// Encoded payload length.
        length: usize,
    },

    /// Payload content that cannot be represented.
    #[error("invalid RDATA for {rtype}: {message}")]
    InvalidRData {
        /// Record type mnemonic.
        rtype: String,
        /// Error description.
        message: String,
    },

    // =========================================================================
    // Message Errors
    // =========================================================================
    /// A header count disagrees with the section it describes.
    #[error("inconsistent record count in {section} section: header says {header}, found {actual}")]
    InconsistentRecordCount {
        /// The section whose count is wrong.
        section: Section,
        /// Count stored in the header.
        header: u16,
        /// Number of entries actually present.
        actual: usize,
    },
}

impl Error {
    /// Creates a new `UnexpectedEof` error.
    #[inline]
    pub fn unexpected_eof(offset: usize) -> Self {
        Self::UnexpectedEof { offset }
    }

    /// Creates a new `BufferTooSmall` error.
    #[inline]
    pub fn buffer_too_small(needed: usize, available: usize) -> Self {
        Self::BufferTooSmall { needed, available }
    }

    /// Creates a new `MalformedName` error.
    #[inline]
    pub fn malformed_name(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedName {
            offset,
            reason: reason.into(),
        }
    }

    /// Creates a new `LabelTooLong` error.
    #[inline]
    pub fn label_too_long(length: usize) -> Self {
        Self::LabelTooLong { length }
    }

    /// Creates a new `NameTooLong` error.
    #[inline]
    pub fn name_too_long(length: usize) -> Self {
        Self::NameTooLong { length }
    }

    /// Creates a new `InvalidRData` error.
    #[inline]
    pub fn invalid_rdata(rtype: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRData {
            rtype: rtype.into(),
            message: message.into(),
        }
    }

    /// Returns true if the bytes were not a structurally valid message.
    ///
    /// Such input cannot be answered and should be dropped. The remaining
    /// decode errors come from a readable header and can be answered with
    /// FORMERR.
    #[inline]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEof { .. }
                | Self::MalformedName { .. }
                | Self::TruncatedOrOverlongResource { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed_name(12, "forward pointer");
        assert_eq!(err.to_string(), "malformed name at offset 12: forward pointer");

        let err = Error::InconsistentRecordCount {
            section: Section::Answer,
            header: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "inconsistent record count in answer section: header says 2, found 1"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::unexpected_eof(3).is_malformed());
        assert!(Error::malformed_name(0, "loop").is_malformed());
        assert!(
            Error::TruncatedOrOverlongResource {
                expected_end: 40,
                actual_end: 41
            }
            .is_malformed()
        );
        assert!(!Error::UnsupportedQuestionCount { count: 2 }.is_malformed());
    }
}
