//! Plain data structs carried by the command family.

use crate::codec::{Decode, Encode, Error, FixedSize, Type};
use crate::cursor::{FIELD_NOT_PRESENT, FIELD_PRESENT, WriteCursor};

/// An inclusive range of attribute handles.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct HandleRange {
    pub start: u16,
    pub end: u16,
}

impl FixedSize for HandleRange {
    const SIZE: usize = 4;
}

impl Encode for HandleRange {
    fn encode(&self, dest: &mut [u8]) -> Result<(), Error> {
        dest[..2].copy_from_slice(&self.start.to_le_bytes());
        dest[2..4].copy_from_slice(&self.end.to_le_bytes());
        Ok(())
    }
}

impl Decode<'_> for HandleRange {
    fn decode(src: &[u8]) -> Result<Self, Error> {
        if src.len() < Self::SIZE {
            return Err(Error::InvalidLength);
        }
        Ok(Self {
            start: u16::from_le_bytes([src[0], src[1]]),
            end: u16::from_le_bytes([src[2], src[3]]),
        })
    }
}

/// GATT write operation discriminant.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum WriteOp {
    WriteRequest = 0x01,
    WriteCommand = 0x02,
    SignedWriteCommand = 0x03,
    PrepareWriteRequest = 0x04,
    ExecuteWriteRequest = 0x05,
}

/// Parameters of a GATT write.
///
/// The value length travels as an explicit u16 prefix so the peer never has
/// to derive it from the packet length.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct WriteParams<'d> {
    pub write_op: WriteOp,
    pub flags: u8,
    pub handle: u16,
    pub offset: u16,
    pub value: &'d [u8],
}

impl Type for WriteParams<'_> {
    fn size(&self) -> usize {
        8 + self.value.len()
    }
}

impl Encode for WriteParams<'_> {
    fn encode(&self, dest: &mut [u8]) -> Result<(), Error> {
        let mut w = WriteCursor::new(dest);
        w.write(self.write_op as u8)?;
        w.write(self.flags)?;
        w.write(self.handle)?;
        w.write(self.offset)?;
        w.write(self.value.len() as u16)?;
        w.append(self.value)?;
        Ok(())
    }
}

/// Authorization reply discriminant, read or write.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum AuthorizeKind {
    Read = 0x01,
    Write = 0x02,
}

/// Reply to a read/write authorization request raised by the peer.
///
/// `update` optionally replaces the attribute value as part of granting the
/// request, a conditional field nested inside a conditional field on the wire.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AuthorizeReply<'d> {
    pub kind: AuthorizeKind,
    pub status: u16,
    pub update: Option<&'d [u8]>,
}

impl Type for AuthorizeReply<'_> {
    fn size(&self) -> usize {
        4 + self.update.map(|value| 2 + value.len()).unwrap_or(0)
    }
}

impl Encode for AuthorizeReply<'_> {
    fn encode(&self, dest: &mut [u8]) -> Result<(), Error> {
        let mut w = WriteCursor::new(dest);
        w.write(self.kind as u8)?;
        w.write(self.status)?;
        match self.update {
            Some(value) => {
                w.write(FIELD_PRESENT)?;
                w.write(value.len() as u16)?;
                w.append(value)?;
            }
            None => w.write(FIELD_NOT_PRESENT)?,
        }
        Ok(())
    }
}

/// Version report of the remote controller stack.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct VersionInfo {
    pub version_number: u8,
    pub company_id: u16,
    pub subversion_number: u16,
}

impl FixedSize for VersionInfo {
    const SIZE: usize = 5;
}

impl Encode for VersionInfo {
    fn encode(&self, dest: &mut [u8]) -> Result<(), Error> {
        dest[0] = self.version_number;
        dest[1..3].copy_from_slice(&self.company_id.to_le_bytes());
        dest[3..5].copy_from_slice(&self.subversion_number.to_le_bytes());
        Ok(())
    }
}

impl Decode<'_> for VersionInfo {
    fn decode(src: &[u8]) -> Result<Self, Error> {
        if src.len() < Self::SIZE {
            return Err(Error::InvalidLength);
        }
        Ok(Self {
            version_number: src[0],
            company_id: u16::from_le_bytes([src[1], src[2]]),
            subversion_number: u16::from_le_bytes([src[3], src[4]]),
        })
    }
}

/// Bluetooth device address.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Address(pub [u8; 6]);

impl FixedSize for Address {
    const SIZE: usize = 6;
}

impl Encode for Address {
    fn encode(&self, dest: &mut [u8]) -> Result<(), Error> {
        self.0.encode(dest)
    }
}

impl Decode<'_> for Address {
    fn decode(src: &[u8]) -> Result<Self, Error> {
        <[u8; 6]>::decode(src).map(Address)
    }
}
