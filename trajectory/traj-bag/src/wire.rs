//! ROS1 little-endian wire primitives.
//!
//! Strings and variable-length arrays carry a `u32` length prefix; `time`
//! and `duration` are two 32-bit words.

use crate::error::{BagError, Result};
use crate::value::{RosDuration, RosTime};

/// Cursor over a serialized payload.
pub(crate) struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
    msgtype: &'a str,
}

impl<'a> WireReader<'a> {
    /// Creates a reader; `msgtype` labels any decode error.
    pub(crate) const fn new(buf: &'a [u8], msgtype: &'a str) -> Self {
        Self {
            buf,
            pos: 0,
            msgtype,
        }
    }

    pub(crate) const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(BagError::decode(
                self.msgtype,
                format!(
                    "unexpected end of payload at byte {} (need {n}, have {})",
                    self.pos,
                    self.remaining()
                ),
            ));
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    pub(crate) fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    /// Reads a `u32` length prefix.
    pub(crate) fn read_len(&mut self) -> Result<usize> {
        let len = self.read_u32()?;
        usize::try_from(len)
            .map_err(|_| BagError::decode(self.msgtype, format!("length {len} overflows usize")))
    }

    pub(crate) fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        Ok(self.take(n)?.to_vec())
    }

    pub(crate) fn read_string(&mut self) -> Result<String> {
        let len = self.read_len()?;
        let bytes = self.take(len)?;
        // ROS1 does not enforce UTF-8; keep what we can.
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    pub(crate) fn read_time(&mut self) -> Result<RosTime> {
        Ok(RosTime {
            sec: self.read_u32()?,
            nsec: self.read_u32()?,
        })
    }

    pub(crate) fn read_duration(&mut self) -> Result<RosDuration> {
        Ok(RosDuration {
            sec: self.read_i32()?,
            nsec: self.read_i32()?,
        })
    }
}

/// Growable buffer for serialized payloads.
#[derive(Default)]
pub(crate) struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn put(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a `u32` length prefix.
    pub(crate) fn put_len(&mut self, len: usize, msgtype: &str) -> Result<()> {
        let len = u32::try_from(len)
            .map_err(|_| BagError::encode(msgtype, format!("length {len} exceeds u32")))?;
        self.put(&len.to_le_bytes());
        Ok(())
    }

    pub(crate) fn put_string(&mut self, value: &str, msgtype: &str) -> Result<()> {
        self.put_len(value.len(), msgtype)?;
        self.put(value.as_bytes());
        Ok(())
    }

    pub(crate) fn put_time(&mut self, time: RosTime) {
        self.put(&time.sec.to_le_bytes());
        self.put(&time.nsec.to_le_bytes());
    }

    pub(crate) fn put_duration(&mut self, duration: RosDuration) {
        self.put(&duration.sec.to_le_bytes());
        self.put(&duration.nsec.to_le_bytes());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn reader_primitives() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&7u32.to_le_bytes());
        buf.extend_from_slice(&(-2i16).to_le_bytes());
        buf.extend_from_slice(&1.5f64.to_le_bytes());
        buf.push(1);

        let mut reader = WireReader::new(&buf, "test/msg/T");
        assert_eq!(reader.read_u32().unwrap(), 7);
        assert_eq!(reader.read_i16().unwrap(), -2);
        assert_eq!(reader.read_f64().unwrap(), 1.5);
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn reader_string_and_time() {
        let mut writer = WireWriter::new();
        writer.put_string("base", "test/msg/T").unwrap();
        writer.put_time(RosTime { sec: 3, nsec: 4 });
        let buf = writer.into_inner();

        let mut reader = WireReader::new(&buf, "test/msg/T");
        assert_eq!(reader.read_string().unwrap(), "base");
        assert_eq!(reader.read_time().unwrap(), RosTime { sec: 3, nsec: 4 });
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn reader_truncated() {
        let buf = [1u8, 2];
        let mut reader = WireReader::new(&buf, "test/msg/T");
        let err = reader.read_u32().unwrap_err();
        assert!(matches!(err, BagError::Decode { .. }));
        assert!(err.to_string().contains("unexpected end"));
    }

    #[test]
    fn reader_string_length_past_end() {
        let mut buf = 100u32.to_le_bytes().to_vec();
        buf.extend_from_slice(b"abc");
        let mut reader = WireReader::new(&buf, "test/msg/T");
        assert!(reader.read_string().is_err());
    }
}
