use crate::codec::{Decode, Encode, Error, FixedSize};

//
// Implementations for primitives
//
// Decoders are handed the remainder of the packet and must bounds-check it
// themselves, so that a short read fails without moving the cursor.
//
impl FixedSize for u8 {
    const SIZE: usize = 1;
}

impl FixedSize for u16 {
    const SIZE: usize = 2;
}

impl FixedSize for u32 {
    const SIZE: usize = 4;
}

impl<const N: usize> FixedSize for [u8; N] {
    const SIZE: usize = N;
}

impl Decode<'_> for u8 {
    fn decode(src: &[u8]) -> Result<Self, Error> {
        if src.is_empty() {
            return Err(Error::InvalidLength);
        }
        Ok(src[0])
    }
}

impl Decode<'_> for u16 {
    fn decode(src: &[u8]) -> Result<Self, Error> {
        if src.len() < Self::SIZE {
            return Err(Error::InvalidLength);
        }
        Ok(u16::from_le_bytes([src[0], src[1]]))
    }
}

impl Decode<'_> for u32 {
    fn decode(src: &[u8]) -> Result<Self, Error> {
        if src.len() < Self::SIZE {
            return Err(Error::InvalidLength);
        }
        Ok(u32::from_le_bytes([src[0], src[1], src[2], src[3]]))
    }
}

impl<const N: usize> Decode<'_> for [u8; N] {
    fn decode(src: &[u8]) -> Result<Self, Error> {
        if src.len() < N {
            return Err(Error::InvalidLength);
        }
        src[..N].try_into().map_err(|_| Error::InvalidLength)
    }
}

impl Encode for u8 {
    fn encode(&self, dest: &mut [u8]) -> Result<(), Error> {
        dest[0] = *self;
        Ok(())
    }
}

impl Encode for u16 {
    fn encode(&self, dest: &mut [u8]) -> Result<(), Error> {
        dest.copy_from_slice(&self.to_le_bytes()[..]);
        Ok(())
    }
}

impl Encode for u32 {
    fn encode(&self, dest: &mut [u8]) -> Result<(), Error> {
        dest.copy_from_slice(&self.to_le_bytes()[..]);
        Ok(())
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode(&self, dest: &mut [u8]) -> Result<(), Error> {
        dest.copy_from_slice(&self[..]);
        Ok(())
    }
}
