#![no_std]
//! Typed codec for the byte-oriented RPC protocol that drives an external
//! BLE controller from a host MCU.
//!
//! Every remote call is a (request encoder, response decoder) pair sharing
//! one opcode. Requests encode into a caller-supplied buffer; responses
//! decode from a complete packet handed over by the transport. The codec
//! performs no I/O and keeps no state across calls, so moving the encoded
//! buffers over a physical link (and reassembling complete response packets)
//! is entirely the transport's job.

mod fmt;

mod codec;
mod cursor;

pub mod command;
pub mod types;

pub use codec::{Decode, Encode, Error, FixedSize, Type};
pub use cursor::{ReadCursor, WriteCursor};
