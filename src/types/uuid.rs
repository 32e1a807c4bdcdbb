//! UUID types.

use crate::codec::{Decode, Encode, Error, Type};

pub(crate) const UUID_KIND_16: u8 = 0x01;
pub(crate) const UUID_KIND_128: u8 = 0x02;

/// A 16-bit or 128-bit UUID.
///
/// On the wire the kind byte always precedes the payload, so the peer never
/// has to infer the width from the packet length.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Uuid {
    /// 16-bit UUID
    Uuid16([u8; 2]),
    /// 128-bit UUID
    Uuid128([u8; 16]),
}

impl From<u16> for Uuid {
    fn from(data: u16) -> Self {
        Uuid::Uuid16(data.to_le_bytes())
    }
}

impl From<u128> for Uuid {
    fn from(data: u128) -> Self {
        Uuid::Uuid128(data.to_le_bytes())
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(data: [u8; 16]) -> Self {
        Uuid::Uuid128(data)
    }
}

impl Uuid {
    /// Create a new 16-bit UUID.
    pub const fn new_short(val: u16) -> Self {
        Self::Uuid16(val.to_le_bytes())
    }

    /// Create a new 128-bit UUID.
    pub const fn new_long(val: [u8; 16]) -> Self {
        Self::Uuid128(val)
    }

    /// Get the UUID kind tag.
    pub fn kind(&self) -> u8 {
        match self {
            Uuid::Uuid16(_) => UUID_KIND_16,
            Uuid::Uuid128(_) => UUID_KIND_128,
        }
    }

    /// Get the 16-bit UUID value, if this is a 16-bit UUID.
    pub fn as_short(&self) -> Option<u16> {
        match self {
            Uuid::Uuid16(data) => Some(u16::from_le_bytes([data[0], data[1]])),
            Uuid::Uuid128(_) => None,
        }
    }

    /// Get the UUID payload bytes.
    pub fn as_raw(&self) -> &[u8] {
        match self {
            Uuid::Uuid16(uuid) => uuid,
            Uuid::Uuid128(uuid) => uuid,
        }
    }
}

impl Type for Uuid {
    fn size(&self) -> usize {
        1 + self.as_raw().len()
    }
}

impl Encode for Uuid {
    fn encode(&self, dest: &mut [u8]) -> Result<(), Error> {
        dest[0] = self.kind();
        dest[1..].copy_from_slice(self.as_raw());
        Ok(())
    }
}

impl Decode<'_> for Uuid {
    fn decode(src: &[u8]) -> Result<Self, Error> {
        let kind = *src.first().ok_or(Error::InvalidLength)?;
        match kind {
            UUID_KIND_16 => {
                if src.len() < 3 {
                    return Err(Error::InvalidLength);
                }
                Ok(Uuid::Uuid16([src[1], src[2]]))
            }
            UUID_KIND_128 => {
                if src.len() < 17 {
                    return Err(Error::InvalidLength);
                }
                Ok(Uuid::Uuid128(src[1..17].try_into().map_err(|_| Error::InvalidLength)?))
            }
            other => {
                warn!("[uuid] unknown kind {:02x}", other);
                Err(Error::InvalidValue)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{ReadCursor, WriteCursor};

    #[test]
    fn short_uuid_wire_form() {
        let uuid = Uuid::new_short(0x180f);
        let mut buf = [0u8; 3];
        let mut w = WriteCursor::new(&mut buf);
        w.write_ref(&uuid).unwrap();
        assert_eq!(buf, [UUID_KIND_16, 0x0f, 0x18]);

        let mut r = ReadCursor::new(&buf);
        assert_eq!(r.read::<Uuid>().unwrap(), uuid);
        assert_eq!(r.available(), 0);
    }

    #[test]
    fn long_uuid_roundtrip() {
        let uuid = Uuid::new_long([0x11; 16]);
        let mut buf = [0u8; 17];
        let mut w = WriteCursor::new(&mut buf);
        w.write_ref(&uuid).unwrap();
        assert_eq!(buf[0], UUID_KIND_128);

        let mut r = ReadCursor::new(&buf);
        assert_eq!(r.read::<Uuid>().unwrap(), uuid);
    }

    #[test]
    fn as_short_only_for_short_uuids() {
        assert_eq!(Uuid::new_short(0x2a19).as_short(), Some(0x2a19));
        assert_eq!(Uuid::new_long([0x11; 16]).as_short(), None);
    }

    #[test]
    fn unknown_kind_rejected() {
        let buf = [0x07, 0x0f, 0x18];
        let mut r = ReadCursor::new(&buf);
        assert_eq!(r.read::<Uuid>(), Err(Error::InvalidValue));
        assert_eq!(r.len(), 0);
    }

    #[test]
    fn truncated_payload_rejected() {
        let buf = [UUID_KIND_128, 0x11, 0x22];
        let mut r = ReadCursor::new(&buf);
        assert_eq!(r.read::<Uuid>(), Err(Error::InvalidLength));
    }
}
