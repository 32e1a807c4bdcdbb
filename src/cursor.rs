//! Module for cursors over a byte slice.
//!
//! Conditional fields are carried on the wire as one flag byte followed by
//! the payload when (and only when) the flag says so. Absent fields
//! contribute no payload bytes at all.

use crate::codec::{Decode, Encode, Error};

pub(crate) const FIELD_PRESENT: u8 = 0x01;
pub(crate) const FIELD_NOT_PRESENT: u8 = 0x00;

/// Not a byte writer. It is just a cursor to track where a byte slice is being written.
///
/// Capacity is checked before any byte is written, so a failed write leaves
/// the cursor where it was.
pub struct WriteCursor<'d> {
    pos: usize,
    data: &'d mut [u8],
}

impl<'d> WriteCursor<'d> {
    /// Creates a new write cursor at the beginning of the data.
    pub fn new(data: &'d mut [u8]) -> Self {
        Self { pos: 0, data }
    }

    /// Rewinds the cursor back to the beginning of the buffer.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Append byte slice
    pub fn append(&mut self, data: &[u8]) -> Result<(), Error> {
        if self.available() < data.len() {
            Err(Error::InsufficientSpace)
        } else {
            self.data[self.pos..self.pos + data.len()].copy_from_slice(data);
            self.pos += data.len();
            Ok(())
        }
    }

    /// Write fixed sized type
    pub fn write<E: Encode>(&mut self, data: E) -> Result<(), Error> {
        if self.available() < data.size() {
            Err(Error::InsufficientSpace)
        } else {
            data.encode(&mut self.data[self.pos..self.pos + data.size()])?;
            self.pos += data.size();
            Ok(())
        }
    }

    pub fn write_ref<E: Encode>(&mut self, data: &E) -> Result<(), Error> {
        if self.available() < data.size() {
            Err(Error::InsufficientSpace)
        } else {
            data.encode(&mut self.data[self.pos..self.pos + data.size()])?;
            self.pos += data.size();
            Ok(())
        }
    }

    /// Write a conditional field: the presence flag, then the payload when present.
    pub fn write_opt<E: Encode>(&mut self, field: Option<&E>) -> Result<(), Error> {
        match field {
            Some(value) => {
                self.write(FIELD_PRESENT)?;
                self.write_ref(value)
            }
            None => self.write(FIELD_NOT_PRESENT),
        }
    }

    /// Returns amount of bytes that remain available.
    pub fn available(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns the current length of the data written.
    pub fn len(&self) -> usize {
        self.pos
    }

    /// Returns true if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// Returns the byte slice that was written by this cursor.
    pub fn finish(self) -> &'d mut [u8] {
        &mut self.data[..self.pos]
    }
}

#[derive(Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug)]
pub struct ReadCursor<'d> {
    pos: usize,
    data: &'d [u8],
}

impl<'d> ReadCursor<'d> {
    pub fn new(data: &'d [u8]) -> Self {
        Self { pos: 0, data }
    }

    /// Read a value. The value's decoder bounds-checks the remaining bytes,
    /// so a failed read leaves the cursor where it was.
    pub fn read<T: Decode<'d>>(&mut self) -> Result<T, Error> {
        let src = &self.data[self.pos..];
        let val = T::decode(src)?;
        self.pos += val.size();
        Ok(val)
    }

    /// Read a conditional field: `None` when the flag byte says absent.
    pub fn read_opt<T: Decode<'d>>(&mut self) -> Result<Option<T>, Error> {
        let flag: u8 = self.read()?;
        match flag {
            FIELD_NOT_PRESENT => Ok(None),
            FIELD_PRESENT => Ok(Some(self.read()?)),
            other => {
                warn!("[cursor] invalid presence flag {:02x}", other);
                Err(Error::InvalidValue)
            }
        }
    }

    pub fn slice(&mut self, nbytes: usize) -> Result<&'d [u8], Error> {
        if self.available() < nbytes {
            Err(Error::InvalidLength)
        } else {
            let src = &self.data[self.pos..self.pos + nbytes];
            self.pos += nbytes;
            Ok(src)
        }
    }

    pub fn available(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    pub fn remaining(self) -> &'d [u8] {
        &self.data[self.pos..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_advances_only_on_success() {
        let mut buf = [0u8; 3];
        let mut w = WriteCursor::new(&mut buf);
        w.write(0xaau8).unwrap();
        assert_eq!(w.len(), 1);
        assert_eq!(w.write(0x1234_5678u32), Err(Error::InsufficientSpace));
        assert_eq!(w.len(), 1);
        w.write(0xbbccu16).unwrap();
        assert_eq!(w.available(), 0);
        assert_eq!(w.finish(), &[0xaa, 0xcc, 0xbb]);
    }

    #[test]
    fn read_advances_only_on_success() {
        let buf = [0x10, 0x32, 0x54];
        let mut r = ReadCursor::new(&buf);
        let v: u16 = r.read().unwrap();
        assert_eq!(v, 0x3210);
        assert_eq!(r.read::<u16>(), Err(Error::InvalidLength));
        assert_eq!(r.len(), 2);
        let v: u8 = r.read().unwrap();
        assert_eq!(v, 0x54);
        assert_eq!(r.available(), 0);
    }

    #[test]
    fn absent_field_is_one_byte() {
        let mut buf = [0xffu8; 4];
        let mut w = WriteCursor::new(&mut buf);
        w.write_opt::<u16>(None).unwrap();
        assert_eq!(w.len(), 1);
        assert_eq!(buf[0], FIELD_NOT_PRESENT);

        let mut r = ReadCursor::new(&buf[..1]);
        let v: Option<u16> = r.read_opt().unwrap();
        assert_eq!(v, None);
        assert_eq!(r.available(), 0);
    }

    #[test]
    fn present_field_roundtrip() {
        let mut buf = [0u8; 3];
        let mut w = WriteCursor::new(&mut buf);
        w.write_opt(Some(&0xbeefu16)).unwrap();
        assert_eq!(w.len(), 3);
        assert_eq!(buf, [FIELD_PRESENT, 0xef, 0xbe]);

        let mut r = ReadCursor::new(&buf);
        assert_eq!(r.read_opt::<u16>().unwrap(), Some(0xbeef));
    }

    #[test]
    fn invalid_presence_flag() {
        let buf = [0x02, 0x00, 0x00];
        let mut r = ReadCursor::new(&buf);
        assert_eq!(r.read_opt::<u16>(), Err(Error::InvalidValue));
    }

    #[test]
    fn slice_checks_bounds() {
        let buf = [1, 2, 3];
        let mut r = ReadCursor::new(&buf);
        assert_eq!(r.slice(2).unwrap(), &[1, 2]);
        assert_eq!(r.slice(2), Err(Error::InvalidLength));
        assert_eq!(r.remaining(), &[3]);
    }
}
