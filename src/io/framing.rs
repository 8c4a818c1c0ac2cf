//! Length-prefixed framing primitives

use std::io::{Read, Write};

use crate::error::{DictError, Result};

/// Width of every length/count field
pub const LEN_SIZE: u64 = 8;

// =============================================================================
// Writers
// =============================================================================

/// Write a little-endian u64
pub fn write_u64<W: Write>(out: &mut W, value: u64) -> Result<()> {
    out.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Write `[len][bytes]`
pub fn write_sized<W: Write>(out: &mut W, data: &[u8]) -> Result<()> {
    write_u64(out, data.len() as u64)?;
    out.write_all(data)?;
    Ok(())
}

/// Write `[count]` followed by each item as a sized string
pub fn write_vec<W, I, S>(out: &mut W, count: usize, items: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    write_u64(out, count as u64)?;
    let mut written = 0usize;
    for item in items {
        write_sized(out, item.as_ref())?;
        written += 1;
    }
    if written != count {
        return Err(DictError::Config(format!(
            "vector header declared {} items but {} were written",
            count, written
        )));
    }
    Ok(())
}

/// Size in bytes of a vector written by `write_vec`
pub fn vec_encoded_len<'a, I>(items: I) -> u64
where
    I: IntoIterator<Item = &'a [u8]>,
{
    items
        .into_iter()
        .fold(LEN_SIZE, |acc, item| acc + LEN_SIZE + item.len() as u64)
}

// =============================================================================
// Streaming Reader
// =============================================================================

/// Reader that knows how many bytes remain in its source.
///
/// Every declared length is checked against the remainder before anything is
/// allocated, so a corrupted length field fails with `Truncated` instead of
/// attempting a huge allocation.
pub struct FrameReader<R> {
    inner: R,
    offset: u64,
    remaining: u64,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R, len: u64) -> Self {
        Self {
            inner,
            offset: 0,
            remaining: len,
        }
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn reserve(&mut self, needed: u64) -> Result<()> {
        if needed > self.remaining {
            return Err(DictError::Truncated {
                offset: self.offset,
                needed,
                available: self.remaining,
            });
        }
        Ok(())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.reserve(LEN_SIZE)?;
        let mut buf = [0u8; LEN_SIZE as usize];
        self.inner.read_exact(&mut buf)?;
        self.advance(LEN_SIZE);
        Ok(u64::from_le_bytes(buf))
    }

    /// Read exactly `len` raw bytes
    pub fn read_bytes(&mut self, len: u64) -> Result<Vec<u8>> {
        self.reserve(len)?;
        let mut data = vec![0u8; len as usize];
        self.inner.read_exact(&mut data)?;
        self.advance(len);
        Ok(data)
    }

    /// Read `[len][bytes]`
    pub fn read_sized(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u64()?;
        self.read_bytes(len)
    }

    /// Read `[count][sized]*` as raw byte strings
    pub fn read_vec(&mut self) -> Result<Vec<Vec<u8>>> {
        let count = self.read_u64()?;
        // Each item needs at least its length field.
        self.reserve(count.saturating_mul(LEN_SIZE))?;
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            items.push(self.read_sized()?);
        }
        Ok(items)
    }

    fn advance(&mut self, n: u64) {
        self.offset += n;
        self.remaining -= n;
    }
}

// =============================================================================
// Slice Cursor (zero-copy)
// =============================================================================

/// Byte range inside a larger buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: u64,
    pub len: u64,
}

impl Span {
    pub fn new(offset: u64, len: u64) -> Self {
        Self { offset, len }
    }

    pub fn end(&self) -> u64 {
        self.offset + self.len
    }

    /// Resolve against the buffer the span was taken from
    pub fn slice<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        let start = usize::try_from(self.offset).ok()?;
        let end = usize::try_from(self.end()).ok()?;
        data.get(start..end)
    }
}

/// Bounds-checked forward cursor over a borrowed buffer
pub struct SliceCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> u64 {
        self.pos as u64
    }

    pub fn remaining(&self) -> u64 {
        (self.data.len() - self.pos) as u64
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.take(LEN_SIZE)?;
        let mut buf = [0u8; LEN_SIZE as usize];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    /// Skip `len` bytes and return where they lie
    pub fn skip(&mut self, len: u64) -> Result<Span> {
        let start = self.pos as u64;
        self.take(len)?;
        Ok(Span::new(start, len))
    }

    /// Locate a `[len][bytes]` item without copying it
    pub fn read_sized_span(&mut self) -> Result<Span> {
        let len = self.read_u64()?;
        self.skip(len)
    }

    /// Borrow the next `len` bytes
    pub fn take(&mut self, len: u64) -> Result<&'a [u8]> {
        let available = self.remaining();
        if len > available {
            return Err(DictError::Truncated {
                offset: self.pos as u64,
                needed: len,
                available,
            });
        }
        let start = self.pos;
        self.pos += len as usize;
        Ok(&self.data[start..self.pos])
    }
}
