//! Wire format cursors.
//!
//! [`WireReader`] walks a received message and [`WireWriter`] builds one,
//! optionally inside a hard size limit. Both report running past their
//! bounds as an error instead of panicking. The TCP framing helpers at the
//! bottom add and strip the 2-byte length prefix of RFC 1035 Section 4.2.2.

use crate::error::{Error, Result};
use crate::name::{Name, NameParser};
use bytes::{BufMut, Bytes, BytesMut};

/// Maximum size of a message carried over TCP.
pub const MAX_TCP_MESSAGE_SIZE: usize = 65535;

/// A cursor for reading DNS wire format data.
///
/// The reader keeps the whole message so that compressed names can follow
/// pointers back to earlier offsets.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    /// The whole message.
    data: &'a [u8],
    /// Current position.
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Creates a new wire reader positioned at the start of `data`.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the underlying data.
    #[inline]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the current position.
    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of unread bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns true if every byte has been read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(Error::unexpected_eof(self.pos));
        }
        Ok(())
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    /// Reads a big-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        let value = u16::from_be_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(value)
    }

    /// Reads a big-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        let b = &self.data[self.pos..self.pos + 4];
        let value = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
        self.pos += 4;
        Ok(value)
    }

    /// Reads a slice of bytes.
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Reads a possibly compressed domain name.
    ///
    /// The cursor ends up just past the name as it appears at the current
    /// position, not past any pointer target.
    pub fn read_name(&mut self) -> Result<Name> {
        let (name, consumed) = NameParser::new(self.data).parse_name(self.pos)?;
        self.pos += consumed;
        Ok(name)
    }
}

/// A writer for DNS wire format data.
///
/// With a size limit every write checks the remaining room first, so a
/// failed write leaves the buffer unchanged.
#[derive(Debug)]
pub struct WireWriter {
    /// The underlying buffer.
    buf: BytesMut,
    /// Hard size limit.
    max_size: Option<usize>,
}

impl WireWriter {
    /// Creates a growable writer with the given initial capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            max_size: None,
        }
    }

    /// Creates a writer that refuses to grow past `max_size` bytes.
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(max_size.min(crate::MAX_UDP_MESSAGE_SIZE)),
            max_size: Some(max_size),
        }
    }

    /// Returns the number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the room left before the size limit.
    pub fn remaining(&self) -> usize {
        self.max_size
            .map_or(usize::MAX, |max| max.saturating_sub(self.buf.len()))
    }

    fn reserve(&self, n: usize) -> Result<()> {
        let available = self.remaining();
        if n > available {
            return Err(Error::buffer_too_small(n, available));
        }
        Ok(())
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.reserve(1)?;
        self.buf.put_u8(value);
        Ok(())
    }

    /// Writes a big-endian u16.
    #[inline]
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.reserve(2)?;
        self.buf.put_u16(value);
        Ok(())
    }

    /// Writes a big-endian u32.
    #[inline]
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.reserve(4)?;
        self.buf.put_u32(value);
        Ok(())
    }

    /// Writes a slice of bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Writes a domain name, uncompressed.
    pub fn write_name(&mut self, name: &Name) -> Result<()> {
        if name.is_root() {
            return self.write_u8(0);
        }
        self.write_bytes(name.as_wire())
    }

    /// Overwrites a big-endian u16 that was written earlier.
    ///
    /// Used to back-patch length fields once the payload size is known.
    pub fn write_u16_at(&mut self, offset: usize, value: u16) -> Result<()> {
        if offset + 2 > self.buf.len() {
            return Err(Error::buffer_too_small(offset + 2, self.buf.len()));
        }
        self.buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Returns a reference to the bytes written so far.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the underlying buffer.
    #[inline]
    pub fn into_bytes(self) -> BytesMut {
        self.buf
    }

    /// Returns the data as frozen bytes.
    #[inline]
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

// =============================================================================
// TCP Framing
// =============================================================================

/// Prefixes an encoded message with its 2-byte length for TCP transport.
pub fn frame_tcp(message: &[u8]) -> Result<Bytes> {
    let len = u16::try_from(message.len()).map_err(|_| Error::MessageTooLarge {
        size: message.len(),
        max_size: MAX_TCP_MESSAGE_SIZE,
    })?;

    let mut buf = BytesMut::with_capacity(message.len() + 2);
    buf.put_u16(len);
    buf.extend_from_slice(message);
    Ok(buf.freeze())
}

/// Splits the first length-prefixed message off a TCP byte stream.
///
/// Returns the message and the total number of bytes it occupied including
/// the prefix, or `None` when the stream does not yet hold a full message.
pub fn next_tcp_frame(stream: &[u8]) -> Option<(&[u8], usize)> {
    if stream.len() < 2 {
        return None;
    }
    let len = usize::from(u16::from_be_bytes([stream[0], stream[1]]));
    let end = 2 + len;
    if stream.len() < end {
        return None;
    }
    Some((&stream[2..end], end))
}
