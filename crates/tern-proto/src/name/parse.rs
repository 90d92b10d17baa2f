//! Decoding names from wire format, with compression (RFC 1035 Section 4.1.4).

use super::Name;
use crate::MAX_NAME_LENGTH;
use crate::error::{Error, Result};
use smallvec::SmallVec;

/// Reads domain names out of a complete DNS message.
///
/// Compression pointers must point strictly backwards: the first pointer
/// of a name targets an offset before the pointer itself, and every later
/// pointer targets an offset before the previous target. Pointer chains
/// therefore always terminate, and no name can be decoded from bytes that
/// follow it.
#[derive(Debug, Clone, Copy)]
pub struct NameParser<'a> {
    /// The complete message buffer.
    message: &'a [u8],
}

impl<'a> NameParser<'a> {
    /// Creates a new name parser over the given message.
    #[inline]
    pub const fn new(message: &'a [u8]) -> Self {
        Self { message }
    }

    /// Decodes the name starting at `offset`.
    ///
    /// Returns the name and the number of bytes it occupies at `offset`.
    /// When the name ends in a pointer that count stops after the pointer.
    pub fn parse_name(&self, offset: usize) -> Result<(Name, usize)> {
        let mut wire = SmallVec::<[u8; 64]>::new();
        let mut label_count = 0u8;
        let mut pos = offset;
        let mut consumed = None;
        let mut limit = None;

        loop {
            let Some(&len_byte) = self.message.get(pos) else {
                return Err(Error::malformed_name(pos, "name runs past end of message"));
            };

            match len_byte & 0xC0 {
                0xC0 => {
                    let Some(&low) = self.message.get(pos + 1) else {
                        return Err(Error::malformed_name(pos, "truncated compression pointer"));
                    };
                    let target = usize::from(u16::from_be_bytes([len_byte & 0x3F, low]));
                    let bound = limit.unwrap_or(pos);
                    if target >= bound {
                        return Err(Error::malformed_name(
                            pos,
                            format!("pointer target {target} is not before {bound}"),
                        ));
                    }
                    consumed.get_or_insert(pos + 2 - offset);
                    limit = Some(target);
                    pos = target;
                }
                0x00 => {
                    let len = usize::from(len_byte);
                    if len == 0 {
                        let consumed = *consumed.get_or_insert(pos + 1 - offset);
                        if label_count > 0 {
                            wire.push(0);
                        }
                        return Ok((Name { wire, label_count }, consumed));
                    }

                    let end = pos + 1 + len;
                    let Some(label) = self.message.get(pos + 1..end) else {
                        return Err(Error::malformed_name(pos, "label runs past end of message"));
                    };
                    if wire.len() + 1 + len + 1 > MAX_NAME_LENGTH {
                        return Err(Error::malformed_name(
                            pos,
                            format!("name exceeds {MAX_NAME_LENGTH} bytes"),
                        ));
                    }

                    #[allow(clippy::cast_possible_truncation)]
                    wire.push(len as u8);
                    wire.extend_from_slice(label);
                    label_count += 1;
                    pos = end;
                }
                _ => {
                    return Err(Error::malformed_name(
                        pos,
                        format!("reserved label type 0x{len_byte:02X}"),
                    ));
                }
            }
        }
    }

    /// Decodes the name at `offset`, discarding its length.
    #[inline]
    pub fn parse(&self, offset: usize) -> Result<Name> {
        self.parse_name(offset).map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_simple_name() {
        let data = b"\x03www\x07example\x03com\x00";
        let (name, consumed) = NameParser::new(data).parse_name(0).unwrap();

        assert_eq!(name, Name::from_str("www.example.com").unwrap());
        assert_eq!(consumed, data.len());
    }

    #[test]
    fn test_parse_root_name() {
        let (name, consumed) = NameParser::new(&[0]).parse_name(0).unwrap();
        assert!(name.is_root());
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_parse_compressed_name() {
        let mut data = Vec::new();
        data.extend_from_slice(b"\x07example\x03com\x00");
        // "www" + pointer to offset 0
        data.extend_from_slice(b"\x03www\xc0\x00");

        let parser = NameParser::new(&data);
        let (name, consumed) = parser.parse_name(13).unwrap();

        assert_eq!(name.to_string(), "www.example.com.");
        assert_eq!(consumed, 6);
    }

    #[test]
    fn test_pointer_chain_must_decrease() {
        // offset 0: "com", offset 5: "example" + ptr(0), offset 15: "www" + ptr(5)
        let mut data = Vec::new();
        data.extend_from_slice(b"\x03com\x00");
        data.extend_from_slice(b"\x07example\xc0\x00");
        data.extend_from_slice(b"\x03www\xc0\x05");

        let name = NameParser::new(&data).parse(15).unwrap();
        assert_eq!(name.to_string(), "www.example.com.");
    }

    #[test]
    fn test_reject_forward_pointer() {
        let data = b"\xc0\x02\x03www\x00";
        let err = NameParser::new(data).parse_name(0).unwrap_err();
        assert!(matches!(err, Error::MalformedName { offset: 0, .. }));
    }

    #[test]
    fn test_reject_self_pointer() {
        let data = b"\x00\x00\xc0\x02";
        assert!(matches!(
            NameParser::new(data).parse_name(2),
            Err(Error::MalformedName { offset: 2, .. })
        ));
    }

    #[test]
    fn test_reject_pointer_loop() {
        // offset 0: "a" + ptr(4); offset 4: "b" + ptr(0). Starting at 4 the
        // chain goes 4 -> 0 -> 4, which is not strictly decreasing.
        let data = b"\x01a\xc0\x04\x01b\xc0\x00";
        assert!(matches!(
            NameParser::new(data).parse_name(4),
            Err(Error::MalformedName { .. })
        ));
    }

    #[test]
    fn test_reject_non_decreasing_chain() {
        // offset 0: "x" + ptr(6); offset 4: root; offset 6: "y" + ptr(4).
        // Parsing at 10: ptr(0) is fine, then ptr(6) is not before 0.
        let data = b"\x01x\xc0\x06\x00\x00\x01y\xc0\x04\xc0\x00";
        assert!(matches!(
            NameParser::new(data).parse_name(10),
            Err(Error::MalformedName { offset: 2, .. })
        ));
    }

    #[test]
    fn test_reject_reserved_label_types() {
        assert!(NameParser::new(b"\x41abc\x00").parse(0).is_err());
        assert!(NameParser::new(b"\x81abc\x00").parse(0).is_err());
    }

    #[test]
    fn test_reject_truncated_name() {
        assert!(NameParser::new(b"\x03ww").parse(0).is_err());
        assert!(NameParser::new(b"\x03www").parse(0).is_err());
        assert!(NameParser::new(b"\xc0").parse(0).is_err());
    }

    #[test]
    fn test_reject_overlong_name() {
        let mut data = Vec::new();
        for _ in 0..5 {
            data.push(63);
            data.extend_from_slice(&[b'a'; 63]);
        }
        data.push(0);

        assert!(matches!(
            NameParser::new(&data).parse(0),
            Err(Error::MalformedName { .. })
        ));
    }
}
