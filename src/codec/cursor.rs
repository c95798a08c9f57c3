//! Sequential byte cursor over an owned buffer (C1).
//!
//! Every multi-byte field is encoded little-endian via `to_le_bytes` /
//! `from_le_bytes`, which is a portable, host-endianness-independent
//! encoding in Rust — so there's no explicit byte-swap branch here, unlike
//! a host that stores structs directly and only swaps on big-endian
//! targets. The cursor still fails (rather than panics) on any read or
//! write that would overrun the buffer, per spec.md §4.1.

use crate::error::{NetError, NetResult};
use cgmath::Vector3;

/// A write cursor: appends encoded fields to an owned, growing buffer.
pub struct WriteCursor {
    buf: Vec<u8>,
}

impl WriteCursor {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity) }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_vec3(&mut self, value: Vector3<f32>) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
    }

    /// Null-terminated byte run. Rejects interior NULs (they'd truncate on
    /// the reading side) since a player name is never binary.
    pub fn write_str(&mut self, value: &str) {
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.push(0);
    }

    /// Overwrite 4 bytes already written at `offset`, used to patch in the
    /// envelope's `total_packet_size` once the payload length is known.
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        self.buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }
}

impl Default for WriteCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// A read cursor: parses encoded fields from a borrowed datagram buffer.
pub struct ReadCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> NetResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(NetError::CursorOverrun { wanted: n, available: self.remaining() });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> NetResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> NetResult<u16> {
        let bytes: [u8; 2] = self.take(2)?.try_into().unwrap();
        Ok(u16::from_le_bytes(bytes))
    }

    pub fn read_u32(&mut self) -> NetResult<u32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn read_u64(&mut self) -> NetResult<u64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(u64::from_le_bytes(bytes))
    }

    pub fn read_f32(&mut self) -> NetResult<f32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(f32::from_le_bytes(bytes))
    }

    pub fn read_vec3(&mut self) -> NetResult<Vector3<f32>> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        let z = self.read_f32()?;
        Ok(Vector3::new(x, y, z))
    }

    /// Read a null-terminated string, advancing past the terminator.
    pub fn read_str(&mut self) -> NetResult<String> {
        let start = self.pos;
        loop {
            let byte = self.read_u8()?;
            if byte == 0 {
                break;
            }
        }
        let slice = &self.buf[start..self.pos - 1];
        String::from_utf8(slice.to_vec()).map_err(|_| NetError::InvalidString)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_primitive_fields() {
        let mut w = WriteCursor::new();
        w.write_u8(7);
        w.write_u16(1000);
        w.write_u32(70000);
        w.write_u64(1 << 40);
        w.write_f32(1.5);
        w.write_vec3(Vector3::new(1.0, 2.0, 3.0));
        w.write_str("p1");

        let bytes = w.into_bytes();
        let mut r = ReadCursor::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 7);
        assert_eq!(r.read_u16().unwrap(), 1000);
        assert_eq!(r.read_u32().unwrap(), 70000);
        assert_eq!(r.read_u64().unwrap(), 1 << 40);
        assert_eq!(r.read_f32().unwrap(), 1.5);
        assert_eq!(r.read_vec3().unwrap(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(r.read_str().unwrap(), "p1");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn overrun_is_an_error_not_a_panic() {
        let bytes = [1u8, 2];
        let mut r = ReadCursor::new(&bytes);
        assert!(r.read_u32().is_err());
    }

    #[test]
    fn patch_u32_overwrites_in_place() {
        let mut w = WriteCursor::new();
        w.write_u32(0);
        w.write_u8(9);
        w.patch_u32(0, 0xDEADBEEF);
        let bytes = w.into_bytes();
        let mut r = ReadCursor::new(&bytes);
        assert_eq!(r.read_u32().unwrap(), 0xDEADBEEF);
    }
}
