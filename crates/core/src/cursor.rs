//! Bounds-checked byte cursors
//!
//! [`ByteCursor`] reads little-endian primitives from a borrowed buffer,
//! [`ByteWriter`] appends them to an owned, growable one.
//!
//! Every read checks the remaining length before touching the buffer. A failed
//! operation leaves the position where it was, so callers can report the
//! offset of the field that did not fit.

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Minimum growth step of a [`ByteWriter`] buffer
pub const WRITE_CHUNK_SIZE: usize = 8192;

/// Read cursor over a fixed-length byte slice
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, pos: 0 }
    }

    /// Current read position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying buffer
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the underlying buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the position and the end of the buffer
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True when every byte has been consumed
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Fail with `Eof` unless at least `n` bytes remain
    #[inline]
    pub fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::Eof {
                offset: self.pos,
                need: n,
                have: self.remaining(),
            });
        }
        Ok(())
    }

    /// Build a corruption error at the current position
    pub fn corrupt(&self, reason: impl Into<String>) -> Error {
        Error::corrupt(self.pos, reason)
    }

    /// Advance past `n` bytes
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Borrow the next `n` bytes without advancing
    pub fn peek(&self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        Ok(&self.data[self.pos..self.pos + n])
    }

    /// Borrow the next `n` bytes and advance past them
    pub fn consume(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = self.peek(n)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Copy `buf.len()` bytes into `buf` without advancing
    pub fn peek_into(&self, buf: &mut [u8]) -> Result<()> {
        buf.copy_from_slice(self.peek(buf.len())?);
        Ok(())
    }

    /// Copy `buf.len()` bytes into `buf` and advance past them
    pub fn consume_into(&mut self, buf: &mut [u8]) -> Result<()> {
        buf.copy_from_slice(self.consume(buf.len())?);
        Ok(())
    }

    /// Read a fixed-size byte array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.consume_into(&mut out)?;
        Ok(out)
    }

    /// Read a byte
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.consume(1)?[0])
    }

    /// Read a signed byte
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read a little-endian u16
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.consume(2)?))
    }

    /// Read a little-endian i16
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.consume(2)?))
    }

    /// Read a little-endian u32
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.consume(4)?))
    }

    /// Read a little-endian i32
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.consume(4)?))
    }

    /// Read a little-endian u64
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.consume(8)?))
    }

    /// Read a little-endian i64
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(LittleEndian::read_i64(self.consume(8)?))
    }

    /// Read a little-endian f32
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.consume(4)?))
    }

    /// Read `N` consecutive little-endian f32 values
    pub fn read_f32_array<const N: usize>(&mut self) -> Result<[f32; N]> {
        let bytes = self.consume(N * 4)?;
        let mut out = [0f32; N];
        LittleEndian::read_f32_into(bytes, &mut out);
        Ok(out)
    }
}

/// Append-only writer over a growable buffer
///
/// Growth is geometric: whenever the spare capacity is too small the buffer
/// reserves at least [`WRITE_CHUNK_SIZE`] bytes, the current length, or the
/// requested length, whichever is largest. Growth failure surfaces as
/// [`Error::Alloc`] instead of aborting the process.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        ByteWriter { buf: Vec::new() }
    }

    /// Current write position (equal to the number of bytes written)
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer, returning the written bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    fn grow_for(&mut self, n: usize) -> Result<()> {
        if self.buf.capacity() - self.buf.len() >= n {
            return Ok(());
        }
        let step = WRITE_CHUNK_SIZE.max(n).max(self.buf.len());
        self.buf.try_reserve(step)?;
        Ok(())
    }

    /// Append `bytes` at the current position
    pub fn push(&mut self, bytes: &[u8]) -> Result<()> {
        self.grow_for(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Write a byte
    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.push(&[v])
    }

    /// Write a signed byte
    pub fn write_i8(&mut self, v: i8) -> Result<()> {
        self.push(&v.to_le_bytes())
    }

    /// Write a little-endian u16
    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        self.push(&v.to_le_bytes())
    }

    /// Write a little-endian i16
    pub fn write_i16(&mut self, v: i16) -> Result<()> {
        self.push(&v.to_le_bytes())
    }

    /// Write a little-endian u32
    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        self.push(&v.to_le_bytes())
    }

    /// Write a little-endian i32
    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        self.push(&v.to_le_bytes())
    }

    /// Write a little-endian u64
    pub fn write_u64(&mut self, v: u64) -> Result<()> {
        self.push(&v.to_le_bytes())
    }

    /// Write a little-endian i64
    pub fn write_i64(&mut self, v: i64) -> Result<()> {
        self.push(&v.to_le_bytes())
    }

    /// Write a little-endian f32
    pub fn write_f32(&mut self, v: f32) -> Result<()> {
        self.push(&v.to_le_bytes())
    }

    /// Write each value of `vs` as a little-endian f32
    pub fn write_f32_slice(&mut self, vs: &[f32]) -> Result<()> {
        self.grow_for(vs.len() * 4)?;
        for v in vs {
            self.buf.extend_from_slice(&v.to_le_bytes());
        }
        Ok(())
    }

    /// Write a zeroed u32 placeholder and return its offset for [`patch_u32`]
    ///
    /// [`patch_u32`]: ByteWriter::patch_u32
    pub fn reserve_u32(&mut self) -> Result<usize> {
        let at = self.position();
        self.write_u32(0)?;
        Ok(at)
    }

    /// Overwrite a previously written u32 at `offset`
    pub fn patch_u32(&mut self, offset: usize, v: u32) -> Result<()> {
        match self.buf.get_mut(offset..offset + 4) {
            Some(slot) => {
                LittleEndian::write_u32(slot, v);
                Ok(())
            }
            None => Err(Error::corrupt(offset, "patch outside written range")),
        }
    }

    /// Patch the placeholder at `offset` with the byte count written since it
    pub fn patch_span(&mut self, offset: usize) -> Result<()> {
        let span = self.position() - (offset + 4);
        let span = u32::try_from(span)
            .map_err(|_| Error::corrupt(offset, format!("span of {span} bytes exceeds u32")))?;
        self.patch_u32(offset, span)
    }
}
