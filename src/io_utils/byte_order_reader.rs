/*
This tool is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: Unknown
Last Modified: 17/10/2026
License: MIT
*/
use crate::error::{Result, ShapefileError};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Reads a two's-complement 32-bit integer from `buffer` at `offset`.
pub fn read_i32(buffer: &[u8], offset: usize, byte_order: Endianness) -> Result<i32> {
    let buf = checked_slice(buffer, offset, 4)?;
    if byte_order == Endianness::LittleEndian {
        return Ok(LittleEndian::read_i32(buf));
    }
    Ok(BigEndian::read_i32(buf))
}

/// Reads an IEEE-754 double from `buffer` at `offset`.
pub fn read_f64(buffer: &[u8], offset: usize, byte_order: Endianness) -> Result<f64> {
    let buf = checked_slice(buffer, offset, 8)?;
    if byte_order == Endianness::LittleEndian {
        return Ok(LittleEndian::read_f64(buf));
    }
    Ok(BigEndian::read_f64(buf))
}

fn checked_slice(buffer: &[u8], offset: usize, width: usize) -> Result<&[u8]> {
    if buffer.is_empty() {
        return Err(ShapefileError::invalid_argument("buffer is empty"));
    }
    match offset.checked_add(width) {
        Some(end) if end <= buffer.len() => Ok(&buffer[offset..end]),
        _ => Err(ShapefileError::invalid_argument(format!(
            "buffer too short: {} bytes needed at offset {}, buffer holds {}",
            width,
            offset,
            buffer.len()
        ))),
    }
}

/// A cursor over a byte slice. The Shapefile format mixes byte orders, so
/// the order can be switched between reads.
pub struct ByteOrderReader<'a> {
    is_le: bool,
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> ByteOrderReader<'a> {
    pub fn new(buffer: &'a [u8], byte_order: Endianness) -> ByteOrderReader<'a> {
        ByteOrderReader {
            is_le: byte_order == Endianness::LittleEndian,
            buffer: buffer,
            pos: 0usize,
        }
    }

    pub fn set_byte_order(&mut self, byte_order: Endianness) {
        self.is_le = byte_order == Endianness::LittleEndian;
    }

    pub fn get_byte_order(&self) -> Endianness {
        if self.is_le {
            return Endianness::LittleEndian;
        }
        Endianness::BigEndian
    }

    pub fn seek(&mut self, position: usize) {
        self.pos = position;
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn inc_pos(&mut self, skip: usize) {
        self.pos += skip;
    }

    pub fn peek_u8(&self) -> Result<u8> {
        Ok(checked_slice(self.buffer, self.pos, 1)?[0])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        // There's really no need for endian issues when reading single bytes.
        let val = self.peek_u8()?;
        self.pos += 1;
        Ok(val)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let buf = checked_slice(self.buffer, self.pos, 2)?;
        self.pos += 2;
        if self.is_le {
            return Ok(LittleEndian::read_u16(buf));
        }
        Ok(BigEndian::read_u16(buf))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let buf = checked_slice(self.buffer, self.pos, 4)?;
        self.pos += 4;
        if self.is_le {
            return Ok(LittleEndian::read_u32(buf));
        }
        Ok(BigEndian::read_u32(buf))
    }

    /// Reads `length` bytes as text, replacing invalid UTF-8.
    pub fn read_utf8(&mut self, length: usize) -> Result<String> {
        let buf = checked_slice(self.buffer, self.pos, length)?;
        self.pos += length;
        Ok(String::from_utf8_lossy(buf).to_string())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let val = read_i32(self.buffer, self.pos, self.get_byte_order())?;
        self.pos += 4;
        Ok(val)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let val = read_f64(self.buffer, self.pos, self.get_byte_order())?;
        self.pos += 8;
        Ok(val)
    }

    /// Reads `count` consecutive doubles.
    pub fn read_f64_array(&mut self, count: usize) -> Result<Vec<f64>> {
        let mut ret = Vec::with_capacity(count);
        for _ in 0..count {
            ret.push(self.read_f64()?);
        }
        Ok(ret)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Endianness {
    LittleEndian,
    BigEndian,
}

impl Default for Endianness {
    fn default() -> Endianness {
        Endianness::LittleEndian
    }
}
