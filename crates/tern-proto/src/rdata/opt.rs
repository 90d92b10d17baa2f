//! EDNS(0) option payload (OPT, RFC 6891).
//!
//! The OPT pseudo-record is treated like any other record in the
//! additional section: its class carries the UDP payload size and its TTL
//! the extended flags. Only the option list lives in the payload.

use crate::error::{Error, Result};
use crate::wire::{WireReader, WireWriter};
use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Option code for DNS cookies (RFC 7873).
pub const OPTION_COOKIE: u16 = 10;

/// Option code for padding (RFC 7830).
pub const OPTION_PADDING: u16 = 12;

/// A single EDNS option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdnsOption {
    /// Option code.
    pub code: u16,
    /// Raw option data.
    pub data: Vec<u8>,
}

impl EdnsOption {
    /// Creates an option.
    pub fn new(code: u16, data: impl Into<Vec<u8>>) -> Self {
        Self {
            code,
            data: data.into(),
        }
    }
}

/// OPT record payload: a list of options in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OPT {
    options: Vec<EdnsOption>,
}

impl OPT {
    /// Creates a payload from the given options.
    pub fn new(options: Vec<EdnsOption>) -> Self {
        Self { options }
    }

    /// Returns the options in wire order.
    pub fn options(&self) -> &[EdnsOption] {
        &self.options
    }

    /// Returns the first option with the given code.
    pub fn option(&self, code: u16) -> Option<&EdnsOption> {
        self.options.iter().find(|o| o.code == code)
    }

    /// Reads code/length/data triples until the payload end.
    pub fn decode(reader: &mut WireReader<'_>, end: usize) -> Result<Self> {
        let mut options = Vec::new();
        while reader.position() < end {
            let code = reader.read_u16()?;
            let len = usize::from(reader.read_u16()?);
            options.push(EdnsOption::new(code, reader.read_bytes(len)?));
        }
        Ok(Self { options })
    }

    /// Writes every option as a code/length/data triple.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        for option in &self.options {
            let len = u16::try_from(option.data.len()).map_err(|_| {
                Error::invalid_rdata("OPT", format!("option {} data too long", option.code))
            })?;
            writer.write_u16(option.code)?;
            writer.write_u16(len)?;
            writer.write_bytes(&option.data)?;
        }
        Ok(())
    }
}

impl fmt::Display for OPT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, option) in self.options.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}", option.code, HEXLOWER.encode(&option.data))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opt_options() {
        let data = [
            0x00, 0x0a, 0x00, 0x08, 1, 2, 3, 4, 5, 6, 7, 8, // cookie
            0x00, 0x0c, 0x00, 0x00, // empty padding
        ];
        let mut reader = WireReader::new(&data);
        let opt = OPT::decode(&mut reader, data.len()).unwrap();

        assert_eq!(opt.options().len(), 2);
        assert_eq!(opt.option(OPTION_COOKIE).unwrap().data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(opt.option(OPTION_PADDING).unwrap().data.is_empty());

        let mut writer = WireWriter::new(16);
        opt.encode(&mut writer).unwrap();
        assert_eq!(writer.as_bytes(), &data);
    }

    #[test]
    fn test_opt_truncated_option() {
        let data = [0x00, 0x0a, 0x00, 0x08, 1, 2];
        let mut reader = WireReader::new(&data);
        assert!(OPT::decode(&mut reader, data.len()).is_err());
    }

    #[test]
    fn test_opt_display() {
        let opt = OPT::new(vec![EdnsOption::new(OPTION_COOKIE, vec![0xab, 0xcd])]);
        assert_eq!(opt.to_string(), "10:abcd");
    }
}
