//! DNS domain names.
//!
//! A [`Name`] holds its labels in uncompressed wire format. Names are
//! compared and hashed ASCII case-insensitively, as RFC 1035 requires for
//! lookups, so `Host.Example.COM` and `host.example.com` are the same key.
//!
//! Decoding from a message, including compression pointers, lives in
//! [`NameParser`]. Names are always written uncompressed.

mod label;
mod parse;

pub use label::{Label, LabelIter};
pub use parse::NameParser;

use crate::error::{Error, Result};
use crate::{MAX_LABEL_LENGTH, MAX_NAME_LENGTH};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A DNS domain name.
///
/// # Wire Format
///
/// Each label is prefixed by its length and the name ends with a zero
/// octet. `www.example.com` is encoded as:
///
/// ```text
/// 03 'w' 'w' 'w' 07 'e' 'x' 'a' 'm' 'p' 'l' 'e' 03 'c' 'o' 'm' 00
/// ```
///
/// The encoding, terminator included, never exceeds 255 bytes.
///
/// # Example
///
/// ```rust
/// use tern_proto::name::Name;
/// use std::str::FromStr;
///
/// let name = Name::from_str("www.example.com").unwrap();
/// assert_eq!(name.label_count(), 3);
/// assert_eq!(name.to_string(), "www.example.com.");
/// assert_eq!(Name::from_str("WWW.Example.COM.").unwrap(), name);
/// ```
#[derive(Clone)]
pub struct Name {
    /// Uncompressed wire bytes. Empty for the root.
    wire: SmallVec<[u8; 64]>,
    /// Number of labels, not counting the root.
    label_count: u8,
}

impl Name {
    /// The root domain name.
    pub const ROOT: Self = Self::root();

    /// Returns the root domain name.
    #[inline]
    pub const fn root() -> Self {
        Self {
            wire: SmallVec::new_const(),
            label_count: 0,
        }
    }

    /// Creates a domain name from uncompressed wire bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let (label_count, len) = Self::validate_wire(slice)?;
        if label_count == 0 {
            return Ok(Self::root());
        }
        Ok(Self {
            wire: SmallVec::from_slice(&slice[..len]),
            label_count,
        })
    }

    /// Builds a name from label byte strings, leftmost first.
    pub fn from_labels<'a, I>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut wire = SmallVec::<[u8; 64]>::new();
        let mut label_count = 0u8;

        for (position, label) in labels.into_iter().enumerate() {
            if label.is_empty() {
                return Err(Error::EmptyLabel { position });
            }
            if label.len() > MAX_LABEL_LENGTH {
                return Err(Error::label_too_long(label.len()));
            }
            if wire.len() + 1 + label.len() + 1 > MAX_NAME_LENGTH {
                return Err(Error::name_too_long(wire.len() + 1 + label.len() + 1));
            }
            #[allow(clippy::cast_possible_truncation)]
            wire.push(label.len() as u8);
            wire.extend_from_slice(label);
            label_count += 1;
        }

        if label_count == 0 {
            return Ok(Self::root());
        }
        wire.push(0);
        Ok(Self { wire, label_count })
    }

    /// Checks uncompressed wire bytes.
    ///
    /// Returns the label count and the encoded length. Bytes after the
    /// terminating zero are ignored.
    fn validate_wire(bytes: &[u8]) -> Result<(u8, usize)> {
        let mut pos = 0;
        let mut labels = 0u8;

        loop {
            let Some(&len_byte) = bytes.get(pos) else {
                // An empty slice is the root; anything else needs a terminator.
                return if pos == 0 {
                    Ok((0, 0))
                } else {
                    Err(Error::unexpected_eof(pos))
                };
            };

            if len_byte == 0 {
                if pos + 1 > MAX_NAME_LENGTH {
                    return Err(Error::name_too_long(pos + 1));
                }
                return Ok((labels, pos + 1));
            }
            if len_byte >= 0x40 {
                return Err(Error::malformed_name(pos, "pointer or extended label type"));
            }

            pos += 1 + usize::from(len_byte);
            if pos >= MAX_NAME_LENGTH {
                return Err(Error::name_too_long(pos + 1));
            }
            labels += 1;
        }
    }

    /// Returns the uncompressed wire bytes. Empty for the root.
    #[inline]
    pub fn as_wire(&self) -> &[u8] {
        &self.wire
    }

    /// Returns the encoded length, including the terminating zero.
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.wire.len().max(1)
    }

    /// Returns the number of labels, not counting the root.
    #[inline]
    pub const fn label_count(&self) -> usize {
        self.label_count as usize
    }

    /// Returns true if this is the root domain.
    #[inline]
    pub const fn is_root(&self) -> bool {
        self.label_count == 0
    }

    /// Returns an iterator over the labels, leftmost first.
    #[inline]
    pub fn labels(&self) -> LabelIter<'_> {
        LabelIter::new(&self.wire)
    }

    /// Returns the parent domain, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let first = usize::from(*self.wire.first()?);
        if first == 0 {
            return None;
        }
        Self::from_slice(&self.wire[1 + first..]).ok()
    }

    /// Returns the subdomain formed by prepending one label.
    pub fn prepend_label(&self, label: &str) -> Result<Self> {
        if label.is_empty() {
            return Err(Error::EmptyLabel { position: 0 });
        }
        if label.len() > MAX_LABEL_LENGTH {
            return Err(Error::label_too_long(label.len()));
        }
        let new_len = 1 + label.len() + self.wire_len();
        if new_len > MAX_NAME_LENGTH {
            return Err(Error::name_too_long(new_len));
        }

        let mut wire = SmallVec::with_capacity(new_len);
        #[allow(clippy::cast_possible_truncation)]
        wire.push(label.len() as u8);
        wire.extend_from_slice(label.as_bytes());
        if self.is_root() {
            wire.push(0);
        } else {
            wire.extend_from_slice(&self.wire);
        }

        Ok(Self {
            wire,
            label_count: self.label_count + 1,
        })
    }

    /// Returns true if this name equals `other` or lies beneath it.
    ///
    /// Comparison is label-wise, so `badexample.com` is not inside
    /// `example.com`.
    pub fn is_subdomain_of(&self, other: &Name) -> bool {
        let Some(skip) = self.label_count().checked_sub(other.label_count()) else {
            return false;
        };
        self.labels()
            .skip(skip)
            .zip(other.labels())
            .all(|(a, b)| a.eq_ignore_ascii_case(&b))
    }

    /// Returns the presentation form with a trailing dot.
    pub fn to_string_representation(&self) -> CompactString {
        if self.is_root() {
            return CompactString::const_new(".");
        }

        let mut result = CompactString::with_capacity(self.wire.len());
        for label in self.labels() {
            use std::fmt::Write;
            // Writing into a CompactString cannot fail.
            let _ = write!(result, "{label}.");
        }
        result
    }

    fn lowercase_hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.label_count);
        for label in self.labels() {
            for byte in label.as_bytes() {
                state.write_u8(byte.to_ascii_lowercase());
            }
            state.write_u8(b'.');
        }
    }
}

impl FromStr for Name {
    type Err = Error;

    /// Parses a dotted name. A trailing dot is optional.
    ///
    /// Labels may contain letters, digits, `-`, `_` and `*`.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s == "." {
            return Ok(Self::root());
        }

        let s = s.strip_suffix('.').unwrap_or(s);
        for (position, part) in s.split('.').enumerate() {
            if part.is_empty() {
                return Err(Error::EmptyLabel { position });
            }
            if let Some((i, c)) = part
                .chars()
                .enumerate()
                .find(|&(_, c)| !c.is_ascii_alphanumeric() && !matches!(c, '-' | '_' | '*'))
            {
                return Err(Error::InvalidLabelChar {
                    character: c,
                    position: i,
                });
            }
        }

        Self::from_labels(s.split('.').map(str::as_bytes))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_representation())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name(\"{self}\")")
    }
}

impl PartialEq for Name {
    /// Case-insensitive comparison per DNS semantics.
    fn eq(&self, other: &Self) -> bool {
        self.label_count == other.label_count && self.wire.eq_ignore_ascii_case(&other.wire)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lowercase_hash(state);
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::root()
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string_representation())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn test_root_name() {
        let root = Name::root();
        assert!(root.is_root());
        assert_eq!(root.label_count(), 0);
        assert_eq!(root.wire_len(), 1);
        assert_eq!(root.to_string(), ".");
        assert_eq!(name("."), root);
    }

    #[test]
    fn test_name_parsing() {
        let n = name("www.example.com.");
        assert_eq!(n.label_count(), 3);
        assert_eq!(n.as_wire(), b"\x03www\x07example\x03com\x00");
        assert_eq!(n.to_string(), "www.example.com.");
        assert_eq!(n, name("www.example.com"));
    }

    #[test]
    fn test_invalid_names() {
        assert!(matches!(
            Name::from_str("a..com"),
            Err(Error::EmptyLabel { position: 1 })
        ));
        assert!(matches!(
            Name::from_str("bad host.com"),
            Err(Error::InvalidLabelChar { character: ' ', .. })
        ));
        assert!(matches!(
            Name::from_str(&"a".repeat(64)),
            Err(Error::LabelTooLong { length: 64 })
        ));
    }

    #[test]
    fn test_name_length_limit() {
        // 4 labels of 63 bytes encode to 4 * 64 + 1 = 257 bytes.
        let label = "a".repeat(63);
        let long = [label.as_str(); 4].join(".");
        assert!(matches!(
            Name::from_str(&long),
            Err(Error::NameTooLong { .. })
        ));

        // 3 * 64 + 62 + 1 = 255 bytes fits exactly.
        let fits = format!("{long3}.{last}", long3 = [label.as_str(); 3].join("."), last = "b".repeat(61));
        assert_eq!(name(&fits).wire_len(), 255);
    }

    #[test]
    fn test_case_insensitive_comparison() {
        let lower = name("www.example.com");
        let mixed = name("Www.ExAmPlE.CoM");
        assert_eq!(lower, mixed);

        let set: HashSet<Name> = [lower, mixed].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_parent() {
        let n = name("www.example.com");
        let parent = n.parent().unwrap();
        assert_eq!(parent, name("example.com"));
        assert_eq!(parent.label_count(), 2);
        assert!(name("com").parent().unwrap().is_root());
        assert!(Name::root().parent().is_none());
    }

    #[test]
    fn test_subdomain_check() {
        let zone = name("example.com");
        assert!(name("www.example.com").is_subdomain_of(&zone));
        assert!(name("A.B.EXAMPLE.COM").is_subdomain_of(&zone));
        assert!(zone.is_subdomain_of(&zone));
        assert!(!name("badexample.com").is_subdomain_of(&zone));
        assert!(!name("com").is_subdomain_of(&zone));
        assert!(zone.is_subdomain_of(&Name::root()));
    }

    #[test]
    fn test_prepend_label() {
        let zone = name("example.com");
        assert_eq!(zone.prepend_label("www").unwrap(), name("www.example.com"));
        assert_eq!(Name::root().prepend_label("com").unwrap(), name("com"));
        assert!(zone.prepend_label("").is_err());
    }

    #[test]
    fn test_from_slice_rejects_pointers() {
        assert!(Name::from_slice(b"\x03www\xc0\x0c").is_err());
        assert!(Name::from_slice(b"\x03www").is_err());
        assert_eq!(Name::from_slice(b"\x00").unwrap(), Name::root());
    }

    #[test]
    fn test_serde_as_string() {
        let n = name("host.example.com");
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, "\"host.example.com.\"");
        let back: Name = serde_json::from_str(&json).unwrap();
        assert_eq!(back, n);
    }
}
