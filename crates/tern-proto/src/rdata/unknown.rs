//! Opaque payloads of types without a structured codec.

use crate::error::Result;
use crate::wire::{WireReader, WireWriter};
use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw payload bytes tagged with their type code.
///
/// Rendered in the RFC 3597 generic form `\# <length> <hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unknown {
    type_code: u16,
    data: Vec<u8>,
}

impl Unknown {
    /// Creates an opaque payload.
    pub fn new(type_code: u16, data: impl Into<Vec<u8>>) -> Self {
        Self {
            type_code,
            data: data.into(),
        }
    }

    /// Returns the record type code.
    #[inline]
    pub const fn type_code(&self) -> u16 {
        self.type_code
    }

    /// Returns the raw bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Takes exactly `len` bytes as the payload.
    pub fn decode(reader: &mut WireReader<'_>, type_code: u16, len: usize) -> Result<Self> {
        Ok(Self::new(type_code, reader.read_bytes(len)?))
    }

    /// Writes the raw bytes.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        writer.write_bytes(&self.data)
    }
}

impl fmt::Display for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\# {} {}", self.data.len(), HEXLOWER.encode(&self.data))
    }
}
