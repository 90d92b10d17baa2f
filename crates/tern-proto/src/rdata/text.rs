//! Character-string payloads (TXT, SPF).
//!
//! Both types share one layout: a run of length-prefixed strings filling
//! the whole payload (RFC 1035 Section 3.3.14, RFC 7208 Section 3.1).

use crate::error::{Error, Result};
use crate::wire::{WireReader, WireWriter};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Maximum length of a single character-string.
pub const MAX_STRING_LENGTH: usize = 255;

/// TXT record - Text strings (RFC 1035).
///
/// Also used for SPF payloads, which have the same layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TXT {
    strings: SmallVec<[Vec<u8>; 2]>,
}

impl TXT {
    /// Creates a payload from the given strings.
    pub fn new(strings: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> Self {
        Self {
            strings: strings.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the character-strings in order.
    pub fn strings(&self) -> &[Vec<u8>] {
        &self.strings
    }

    /// Returns all strings concatenated, lossily decoded as UTF-8.
    pub fn text(&self) -> String {
        let joined: Vec<u8> = self.strings.iter().flatten().copied().collect();
        String::from_utf8_lossy(&joined).into_owned()
    }

    /// Reads length-prefixed strings until the payload end.
    pub fn decode(reader: &mut WireReader<'_>, end: usize) -> Result<Self> {
        let mut strings = SmallVec::new();
        while reader.position() < end {
            let len = usize::from(reader.read_u8()?);
            strings.push(reader.read_bytes(len)?.to_vec());
        }
        Ok(Self { strings })
    }

    /// Writes each string with its length octet.
    ///
    /// Strings longer than 255 bytes cannot be represented.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        for s in &self.strings {
            let len = u8::try_from(s.len()).map_err(|_| {
                Error::invalid_rdata(
                    "TXT",
                    format!("string of {} bytes exceeds {MAX_STRING_LENGTH}", s.len()),
                )
            })?;
            writer.write_u8(len)?;
            writer.write_bytes(s)?;
        }
        Ok(())
    }
}

impl fmt::Display for TXT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.strings.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str("\"")?;
            for &byte in s {
                match byte {
                    b'"' | b'\\' => write!(f, "\\{}", byte as char)?,
                    b' ' => f.write_str(" ")?,
                    b if b.is_ascii_graphic() => write!(f, "{}", b as char)?,
                    b => write!(f, "\\{b:03}")?,
                }
            }
            f.write_str("\"")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_multiple_strings() {
        let data = b"\x05hello\x00\x05world";
        let mut reader = WireReader::new(data);
        let txt = TXT::decode(&mut reader, data.len()).unwrap();

        assert_eq!(txt.strings().len(), 3);
        assert_eq!(txt.strings()[1], b"");
        assert_eq!(txt.text(), "helloworld");
        assert_eq!(txt.to_string(), "\"hello\" \"\" \"world\"");
    }

    #[test]
    fn test_txt_string_past_payload() {
        let data = b"\x09short";
        let mut reader = WireReader::new(data);
        assert!(TXT::decode(&mut reader, data.len()).is_err());
    }

    #[test]
    fn test_txt_encode() {
        let txt = TXT::new(["v=spf1 -all"]);
        let mut writer = WireWriter::new(16);
        txt.encode(&mut writer).unwrap();
        assert_eq!(writer.as_bytes(), b"\x0bv=spf1 -all");
    }

    #[test]
    fn test_txt_string_too_long() {
        let txt = TXT::new([vec![b'x'; 256]]);
        let mut writer = WireWriter::new(300);
        assert!(matches!(
            txt.encode(&mut writer),
            Err(Error::InvalidRData { .. })
        ));
    }

    #[test]
    fn test_txt_display_escapes() {
        let txt = TXT::new([b"say \"hi\"\n".to_vec()]);
        assert_eq!(txt.to_string(), "\"say \\\"hi\\\"\\010\"");
    }
}
