//! Common types.

pub(crate) mod primitives;

pub mod gatt;
pub mod uuid;
