//! Opinionated RPC codec
//!
//! Assumes little endian for all types

pub trait FixedSize: Sized {
    const SIZE: usize;
}

pub trait Type: Sized {
    fn size(&self) -> usize;
}

pub trait Encode: Type {
    fn encode(&self, dest: &mut [u8]) -> Result<(), Error>;
}

pub trait Decode<'d>: Type {
    fn decode(src: &'d [u8]) -> Result<Self, Error>;
}

impl<T: FixedSize> Type for T {
    fn size(&self) -> usize {
        Self::SIZE
    }
}

/// Errors reported by the codec itself, as opposed to a [`ResultCode`]
/// carried inside a well-formed response.
///
/// [`ResultCode`]: crate::command::ResultCode
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The destination buffer cannot hold the next field.
    InsufficientSpace,
    /// A field runs past the end of the packet, or a successful decode
    /// did not consume the packet exactly.
    InvalidLength,
    /// The packet is too short to hold the response envelope.
    TooShort,
    /// The response echoes a different opcode than the command awaiting it.
    OpcodeMismatch {
        /// Opcode of the command being decoded.
        expected: u8,
        /// Opcode found in the packet.
        actual: u8,
    },
    /// A discriminant byte with no defined meaning.
    InvalidValue,
}
