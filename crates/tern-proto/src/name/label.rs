//! Single labels of a domain name.

use std::fmt;

/// One label of a domain name, borrowed from the name's wire bytes.
///
/// Labels compare ASCII case-insensitively.
#[derive(Clone, Copy)]
pub struct Label<'a> {
    bytes: &'a [u8],
}

impl<'a> Label<'a> {
    /// Wraps raw label bytes (without the length octet).
    #[inline]
    pub const fn from_bytes(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes of the label.
    #[inline]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns the label length in bytes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for a zero-length label.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the label as text if it is valid UTF-8.
    #[inline]
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.bytes).ok()
    }

    /// Case-insensitive comparison with another label.
    #[inline]
    pub fn eq_ignore_ascii_case(&self, other: &Label<'_>) -> bool {
        self.bytes.eq_ignore_ascii_case(other.bytes)
    }
}

impl fmt::Display for Label<'_> {
    /// Writes the label in presentation format.
    ///
    /// Dots and backslashes are backslash-escaped, other non-printable
    /// bytes become `\DDD`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in self.bytes {
            match byte {
                b'.' | b'\\' => write!(f, "\\{}", byte as char)?,
                b if b.is_ascii_graphic() => write!(f, "{}", b as char)?,
                b => write!(f, "\\{b:03}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label(\"{self}\")")
    }
}

impl PartialEq for Label<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.eq_ignore_ascii_case(other)
    }
}

impl Eq for Label<'_> {}

/// Iterator over the non-root labels of an uncompressed wire name.
pub struct LabelIter<'a> {
    wire: &'a [u8],
    pos: usize,
}

impl<'a> LabelIter<'a> {
    /// Creates an iterator over validated wire bytes.
    #[inline]
    pub(crate) const fn new(wire: &'a [u8]) -> Self {
        Self { wire, pos: 0 }
    }
}

impl<'a> Iterator for LabelIter<'a> {
    type Item = Label<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = usize::from(*self.wire.get(self.pos)?);
        if len == 0 {
            return None;
        }
        let start = self.pos + 1;
        let bytes = self.wire.get(start..start + len)?;
        self.pos = start + len;
        Some(Label::from_bytes(bytes))
    }
}

impl std::iter::FusedIterator for LabelIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_basics() {
        let label = Label::from_bytes(b"example");
        assert_eq!(label.len(), 7);
        assert_eq!(label.as_str(), Some("example"));
        assert_eq!(label.to_string(), "example");
        assert_eq!(label, Label::from_bytes(b"ExAmPlE"));
    }

    #[test]
    fn test_label_escaping() {
        assert_eq!(Label::from_bytes(b"a.b").to_string(), "a\\.b");
        assert_eq!(Label::from_bytes(b"a b\\").to_string(), "a\\032b\\\\");
        assert_eq!(Label::from_bytes(&[0x07]).to_string(), "\\007");
    }

    #[test]
    fn test_label_iter() {
        let wire = b"\x03www\x07example\x00";
        let labels: Vec<_> = LabelIter::new(wire).map(|l| l.to_string()).collect();
        assert_eq!(labels, vec!["www", "example"]);
        assert_eq!(LabelIter::new(&[]).count(), 0);
    }
}
