//! Request encoders and response decoders for the controller RPC protocol.
//!
//! Every command packet is the opcode byte followed by the call's fields in
//! declared order. Every response packet echoes the opcode, carries a 32-bit
//! result code, and only carries output fields when the result code is
//! success. A successful decode must consume the packet exactly.

use core::fmt::Display;

use crate::codec::{self, Decode, Encode, Error, FixedSize, Type};
use crate::cursor::{FIELD_PRESENT, ReadCursor, WriteCursor};
use crate::types::gatt::{Address, AuthorizeReply, HandleRange, VersionInfo, WriteParams};
use crate::types::uuid::Uuid;

pub const OP_VERSION_GET: u8 = 0x60;
pub const OP_GAP_ADDRESS_GET: u8 = 0x61;
pub const OP_GAP_APPEARANCE_GET: u8 = 0x62;
pub const OP_GATTC_PRIMARY_SERVICES_DISCOVER: u8 = 0x63;
pub const OP_GATTC_RELATIONSHIPS_DISCOVER: u8 = 0x64;
pub const OP_GATTC_CHARACTERISTICS_DISCOVER: u8 = 0x65;
pub const OP_GATTC_DESCRIPTORS_DISCOVER: u8 = 0x66;
pub const OP_GATTC_READ: u8 = 0x67;
pub const OP_GATTC_WRITE: u8 = 0x68;
pub const OP_GATTC_HV_CONFIRM: u8 = 0x69;
pub const OP_GATTC_CHAR_VALUE_BY_UUID_READ: u8 = 0x6a;
pub const OP_GATTS_RW_AUTHORIZE_REPLY: u8 = 0x6b;
pub const OP_GATTC_CHAR_VALUES_READ: u8 = 0x6c;

/// Opcode byte plus the 32-bit result code.
pub const ENVELOPE_SIZE: usize = 5;

/// Status reported by the remote stack for the call itself.
///
/// This is distinct from [`Error`]: a response carrying a failure result
/// code is still a well-formed packet.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ResultCode {
    value: u32,
}

impl ResultCode {
    /// The call completed.
    pub const SUCCESS: Self = Self { value: 0 };
    /// The remote stack is out of memory
    pub const NO_MEM: Self = Self { value: 4 };
    /// No entity found for the given parameters
    pub const NOT_FOUND: Self = Self { value: 5 };
    /// The call is not supported by the remote stack
    pub const NOT_SUPPORTED: Self = Self { value: 6 };
    /// A parameter was rejected
    pub const INVALID_PARAM: Self = Self { value: 7 };
    /// The call is not allowed in the current connection state
    pub const INVALID_STATE: Self = Self { value: 8 };
    /// A supplied length was rejected
    pub const INVALID_LENGTH: Self = Self { value: 9 };
    /// Supplied data was rejected
    pub const INVALID_DATA: Self = Self { value: 11 };
    /// A supplied size was rejected
    pub const DATA_SIZE: Self = Self { value: 12 };
    /// The call timed out on the remote side
    pub const TIMEOUT: Self = Self { value: 13 };
    /// The call is forbidden in the current security context
    pub const FORBIDDEN: Self = Self { value: 15 };
    /// A supplied address was rejected
    pub const INVALID_ADDR: Self = Self { value: 16 };
    /// The remote stack is busy with another procedure
    pub const BUSY: Self = Self { value: 17 };

    pub const fn new(value: u32) -> Self {
        Self { value }
    }

    pub fn raw(&self) -> u32 {
        self.value
    }

    pub fn is_success(&self) -> bool {
        *self == Self::SUCCESS
    }
}

impl Display for ResultCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            &Self::SUCCESS => f.write_str("success"),
            &Self::NO_MEM => f.write_str("no mem: the remote stack is out of memory"),
            &Self::NOT_FOUND => f.write_str("not found: no entity found for the given parameters"),
            &Self::NOT_SUPPORTED => f.write_str("not supported: the call is not supported by the remote stack"),
            &Self::INVALID_PARAM => f.write_str("invalid param: a parameter was rejected"),
            &Self::INVALID_STATE => {
                f.write_str("invalid state: the call is not allowed in the current connection state")
            }
            &Self::INVALID_LENGTH => f.write_str("invalid length: a supplied length was rejected"),
            &Self::INVALID_DATA => f.write_str("invalid data: supplied data was rejected"),
            &Self::DATA_SIZE => f.write_str("data size: a supplied size was rejected"),
            &Self::TIMEOUT => f.write_str("timeout: the call timed out on the remote side"),
            &Self::FORBIDDEN => f.write_str("forbidden: the call is forbidden in the current security context"),
            &Self::INVALID_ADDR => f.write_str("invalid addr: a supplied address was rejected"),
            &Self::BUSY => f.write_str("busy: the remote stack is busy with another procedure"),
            other => write!(f, "error code {}", other.value),
        }
    }
}

impl FixedSize for ResultCode {
    const SIZE: usize = 4;
}

impl Encode for ResultCode {
    fn encode(&self, dest: &mut [u8]) -> Result<(), codec::Error> {
        self.value.encode(dest)
    }
}

impl Decode<'_> for ResultCode {
    fn decode(src: &[u8]) -> Result<Self, codec::Error> {
        u32::decode(src).map(|value| Self { value })
    }
}

/// A remote call, one variant per opcode.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug)]
pub enum Request<'d> {
    VersionGet,
    AddressGet,
    AppearanceGet,
    PrimaryServicesDiscover {
        start_handle: u16,
        service_uuid: Option<Uuid>,
    },
    RelationshipsDiscover {
        range: HandleRange,
    },
    CharacteristicsDiscover {
        range: HandleRange,
    },
    DescriptorsDiscover {
        range: HandleRange,
    },
    Read {
        handle: u16,
        offset: u16,
    },
    Write {
        params: WriteParams<'d>,
    },
    HvConfirm {
        handle: u16,
    },
    CharValueByUuidRead {
        uuid: Uuid,
        range: HandleRange,
    },
    RwAuthorizeReply {
        reply: Option<AuthorizeReply<'d>>,
    },
    CharValuesRead {
        handles: &'d [u16],
    },
}

impl<'d> Request<'d> {
    pub fn opcode(&self) -> u8 {
        match self {
            Self::VersionGet => OP_VERSION_GET,
            Self::AddressGet => OP_GAP_ADDRESS_GET,
            Self::AppearanceGet => OP_GAP_APPEARANCE_GET,
            Self::PrimaryServicesDiscover { .. } => OP_GATTC_PRIMARY_SERVICES_DISCOVER,
            Self::RelationshipsDiscover { .. } => OP_GATTC_RELATIONSHIPS_DISCOVER,
            Self::CharacteristicsDiscover { .. } => OP_GATTC_CHARACTERISTICS_DISCOVER,
            Self::DescriptorsDiscover { .. } => OP_GATTC_DESCRIPTORS_DISCOVER,
            Self::Read { .. } => OP_GATTC_READ,
            Self::Write { .. } => OP_GATTC_WRITE,
            Self::HvConfirm { .. } => OP_GATTC_HV_CONFIRM,
            Self::CharValueByUuidRead { .. } => OP_GATTC_CHAR_VALUE_BY_UUID_READ,
            Self::RwAuthorizeReply { .. } => OP_GATTS_RW_AUTHORIZE_REPLY,
            Self::CharValuesRead { .. } => OP_GATTC_CHAR_VALUES_READ,
        }
    }

    pub fn size(&self) -> usize {
        1 + match self {
            Self::VersionGet | Self::AddressGet => 0,
            Self::AppearanceGet => 1,
            Self::PrimaryServicesDiscover { service_uuid, .. } => {
                3 + service_uuid.as_ref().map(|uuid| uuid.size()).unwrap_or(0)
            }
            Self::RelationshipsDiscover { .. }
            | Self::CharacteristicsDiscover { .. }
            | Self::DescriptorsDiscover { .. } => HandleRange::SIZE,
            Self::Read { .. } => 4,
            Self::Write { params } => params.size(),
            Self::HvConfirm { .. } => 2,
            Self::CharValueByUuidRead { uuid, .. } => uuid.size() + HandleRange::SIZE,
            Self::RwAuthorizeReply { reply } => 1 + reply.as_ref().map(|reply| reply.size()).unwrap_or(0),
            Self::CharValuesRead { handles } => 2 + 2 * handles.len(),
        }
    }

    /// Encode the command packet into `dest`, returning the number of bytes
    /// written.
    pub fn encode(&self, dest: &mut [u8]) -> Result<usize, Error> {
        let mut w = WriteCursor::new(dest);
        w.write(self.opcode())?;
        match self {
            Self::VersionGet | Self::AddressGet => {}
            Self::AppearanceGet => {
                // The wire reserves a presence flag for the caller's output
                // slot. This API always wants the value back.
                w.write(FIELD_PRESENT)?;
            }
            Self::PrimaryServicesDiscover {
                start_handle,
                service_uuid,
            } => {
                w.write(*start_handle)?;
                w.write_opt(service_uuid.as_ref())?;
            }
            Self::RelationshipsDiscover { range }
            | Self::CharacteristicsDiscover { range }
            | Self::DescriptorsDiscover { range } => {
                w.write(*range)?;
            }
            Self::Read { handle, offset } => {
                w.write(*handle)?;
                w.write(*offset)?;
            }
            Self::Write { params } => {
                w.write_ref(params)?;
            }
            Self::HvConfirm { handle } => {
                w.write(*handle)?;
            }
            Self::CharValueByUuidRead { uuid, range } => {
                w.write_ref(uuid)?;
                w.write(*range)?;
            }
            Self::RwAuthorizeReply { reply } => {
                w.write_opt(reply.as_ref())?;
            }
            Self::CharValuesRead { handles } => {
                w.write(handles.len() as u16)?;
                for handle in handles.iter() {
                    w.write(*handle)?;
                }
            }
        }
        Ok(w.len())
    }

    /// Encode into an owned fixed-capacity buffer, for transports that frame
    /// from one.
    pub fn encode_to_vec<const N: usize>(&self) -> Result<heapless::Vec<u8, N>, Error> {
        let mut buf = heapless::Vec::new();
        buf.resize_default(self.size()).map_err(|_| Error::InsufficientSpace)?;
        let len = self.encode(&mut buf)?;
        buf.truncate(len);
        Ok(buf)
    }
}

/// Decode the response preamble shared by every call: the opcode echo and
/// the result code.
///
/// On success, the returned cursor sits on the first byte after the
/// envelope, ready for the call-specific output fields.
pub fn decode_envelope(data: &[u8], expected_opcode: u8) -> Result<(ResultCode, ReadCursor<'_>), Error> {
    if data.len() < ENVELOPE_SIZE {
        return Err(Error::TooShort);
    }
    let mut r = ReadCursor::new(data);
    let opcode: u8 = r.read()?;
    if opcode != expected_opcode {
        return Err(Error::OpcodeMismatch {
            expected: expected_opcode,
            actual: opcode,
        });
    }
    let result: ResultCode = r.read()?;
    Ok((result, r))
}

/// Call-specific output fields of a response.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ReplyBody {
    /// The call produces no output fields.
    None,
    Version(VersionInfo),
    Address(Address),
    Appearance(u16),
}

/// A decoded response packet.
///
/// `body` is only populated when `result` is success; a failed call never
/// carries output fields.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Reply {
    pub result: ResultCode,
    pub body: ReplyBody,
}

impl Reply {
    /// Decode the response to the call identified by `expected_opcode`.
    ///
    /// The whole packet must be consumed: trailing bytes after the output
    /// fields, or after the envelope of a failed call, are an error.
    pub fn decode(expected_opcode: u8, data: &[u8]) -> Result<Reply, Error> {
        let (result, mut r) = decode_envelope(data, expected_opcode)?;
        if !result.is_success() {
            if r.available() != 0 {
                return Err(Error::InvalidLength);
            }
            return Ok(Reply {
                result,
                body: ReplyBody::None,
            });
        }
        let body = match expected_opcode {
            OP_VERSION_GET => ReplyBody::Version(r.read()?),
            OP_GAP_ADDRESS_GET => ReplyBody::Address(r.read()?),
            OP_GAP_APPEARANCE_GET => ReplyBody::Appearance(r.read()?),
            OP_GATTC_PRIMARY_SERVICES_DISCOVER
            | OP_GATTC_RELATIONSHIPS_DISCOVER
            | OP_GATTC_CHARACTERISTICS_DISCOVER
            | OP_GATTC_DESCRIPTORS_DISCOVER
            | OP_GATTC_READ
            | OP_GATTC_WRITE
            | OP_GATTC_HV_CONFIRM
            | OP_GATTC_CHAR_VALUE_BY_UUID_READ
            | OP_GATTS_RW_AUTHORIZE_REPLY
            | OP_GATTC_CHAR_VALUES_READ => ReplyBody::None,
            code => {
                warn!("[cmd] unknown opcode {:02x}", code);
                return Err(Error::InvalidValue);
            }
        };
        if r.available() != 0 {
            return Err(Error::InvalidLength);
        }
        Ok(Reply { result, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::FIELD_NOT_PRESENT;
    use crate::types::gatt::{AuthorizeKind, WriteOp};

    fn success_response(opcode: u8, body: &[u8]) -> heapless::Vec<u8, 32> {
        let mut rsp = heapless::Vec::new();
        rsp.push(opcode).unwrap();
        rsp.extend_from_slice(&ResultCode::SUCCESS.raw().to_le_bytes()).unwrap();
        rsp.extend_from_slice(body).unwrap();
        rsp
    }

    #[test]
    fn read_request_example() {
        let req = Request::Read {
            handle: 0x0010,
            offset: 0,
        };
        let mut buf = [0u8; 16];
        let len = req.encode(&mut buf).unwrap();
        assert_eq!(len, 5);
        assert_eq!(&buf[..len], &[OP_GATTC_READ, 0x10, 0x00, 0x00, 0x00]);

        let rsp = [OP_GATTC_READ, 0x00, 0x00, 0x00, 0x00];
        let reply = Reply::decode(OP_GATTC_READ, &rsp).unwrap();
        assert_eq!(reply.result, ResultCode::SUCCESS);
        assert_eq!(reply.body, ReplyBody::None);
    }

    #[test]
    fn capacity_boundary() {
        let req = Request::Write {
            params: WriteParams {
                write_op: WriteOp::WriteRequest,
                flags: 0,
                handle: 0x0021,
                offset: 0,
                value: &[1, 2, 3],
            },
        };
        let need = req.size();
        let mut buf = [0u8; 32];
        assert_eq!(req.encode(&mut buf[..need]).unwrap(), need);
        assert_eq!(req.encode(&mut buf[..need - 1]), Err(Error::InsufficientSpace));
    }

    #[test]
    fn every_request_fails_one_byte_short() {
        let uuid = Uuid::new_short(0x2a00);
        let range = HandleRange { start: 1, end: 8 };
        let requests = [
            Request::VersionGet,
            Request::AddressGet,
            Request::AppearanceGet,
            Request::PrimaryServicesDiscover {
                start_handle: 1,
                service_uuid: Some(uuid.clone()),
            },
            Request::RelationshipsDiscover { range },
            Request::CharacteristicsDiscover { range },
            Request::DescriptorsDiscover { range },
            Request::Read { handle: 3, offset: 0 },
            Request::HvConfirm { handle: 9 },
            Request::CharValueByUuidRead { uuid, range },
            Request::RwAuthorizeReply {
                reply: Some(AuthorizeReply {
                    kind: AuthorizeKind::Write,
                    status: 0,
                    update: Some(&[7, 7]),
                }),
            },
            Request::CharValuesRead {
                handles: &[0x0003, 0x0005],
            },
        ];
        let mut buf = [0u8; 64];
        for req in &requests {
            let need = req.size();
            assert_eq!(req.encode(&mut buf[..need]).unwrap(), need);
            assert_eq!(req.encode(&mut buf[..need - 1]), Err(Error::InsufficientSpace));
        }
    }

    #[test]
    fn appearance_roundtrip() {
        let rsp = success_response(OP_GAP_APPEARANCE_GET, &[0x41, 0x03]);
        let reply = Reply::decode(OP_GAP_APPEARANCE_GET, &rsp).unwrap();
        assert_eq!(reply.result, ResultCode::SUCCESS);
        assert_eq!(reply.body, ReplyBody::Appearance(0x0341));
    }

    #[test]
    fn version_roundtrip() {
        let version = VersionInfo {
            version_number: 0x08,
            company_id: 0x0059,
            subversion_number: 0x00a8,
        };
        let mut body = [0u8; 5];
        let mut w = WriteCursor::new(&mut body);
        w.write(version).unwrap();

        let rsp = success_response(OP_VERSION_GET, &body);
        let reply = Reply::decode(OP_VERSION_GET, &rsp).unwrap();
        assert_eq!(reply.body, ReplyBody::Version(version));
    }

    #[test]
    fn address_roundtrip() {
        let rsp = success_response(OP_GAP_ADDRESS_GET, &[0xc0, 0x01, 0x02, 0x03, 0x04, 0x05]);
        let reply = Reply::decode(OP_GAP_ADDRESS_GET, &rsp).unwrap();
        assert_eq!(reply.body, ReplyBody::Address(Address([0xc0, 0x01, 0x02, 0x03, 0x04, 0x05])));
    }

    #[test]
    fn truncated_response_rejected() {
        let rsp = success_response(OP_GAP_APPEARANCE_GET, &[0x41, 0x03]);
        assert_eq!(Reply::decode(OP_GAP_APPEARANCE_GET, &rsp[..6]), Err(Error::InvalidLength));
        assert_eq!(Reply::decode(OP_GAP_APPEARANCE_GET, &rsp[..4]), Err(Error::TooShort));
    }

    #[test]
    fn excess_response_rejected() {
        let mut rsp = success_response(OP_GAP_APPEARANCE_GET, &[0x41, 0x03]);
        rsp.push(0x00).unwrap();
        assert_eq!(Reply::decode(OP_GAP_APPEARANCE_GET, &rsp), Err(Error::InvalidLength));

        let mut rsp = success_response(OP_GATTC_WRITE, &[]);
        rsp.push(0x00).unwrap();
        assert_eq!(Reply::decode(OP_GATTC_WRITE, &rsp), Err(Error::InvalidLength));
    }

    #[test]
    fn opcode_mismatch_rejected() {
        let rsp = success_response(OP_GAP_APPEARANCE_GET, &[0x41, 0x03]);
        assert_eq!(
            Reply::decode(OP_GATTC_READ, &rsp),
            Err(Error::OpcodeMismatch {
                expected: OP_GATTC_READ,
                actual: OP_GAP_APPEARANCE_GET,
            })
        );
    }

    #[test]
    fn failed_call_carries_no_payload() {
        let mut rsp = [0u8; ENVELOPE_SIZE];
        let mut w = WriteCursor::new(&mut rsp);
        w.write(OP_GATTC_WRITE).unwrap();
        w.write(ResultCode::NO_MEM).unwrap();

        let reply = Reply::decode(OP_GATTC_WRITE, &rsp).unwrap();
        assert_eq!(reply.result, ResultCode::NO_MEM);
        assert_eq!(reply.body, ReplyBody::None);

        let mut with_trailing = [0u8; ENVELOPE_SIZE + 1];
        with_trailing[..ENVELOPE_SIZE].copy_from_slice(&rsp);
        assert_eq!(Reply::decode(OP_GATTC_WRITE, &with_trailing), Err(Error::InvalidLength));
    }

    #[test]
    fn absent_service_uuid_is_one_flag_byte() {
        let req = Request::PrimaryServicesDiscover {
            start_handle: 0x0001,
            service_uuid: None,
        };
        let mut buf = [0u8; 8];
        let len = req.encode(&mut buf).unwrap();
        assert_eq!(len, 4);
        assert_eq!(
            &buf[..len],
            &[OP_GATTC_PRIMARY_SERVICES_DISCOVER, 0x01, 0x00, FIELD_NOT_PRESENT]
        );
    }

    #[test]
    fn present_service_uuid_follows_flag() {
        let req = Request::PrimaryServicesDiscover {
            start_handle: 0x0001,
            service_uuid: Some(Uuid::new_short(0x180d)),
        };
        let mut buf = [0u8; 8];
        let len = req.encode(&mut buf).unwrap();
        assert_eq!(len, 7);
        assert_eq!(
            &buf[..len],
            &[OP_GATTC_PRIMARY_SERVICES_DISCOVER, 0x01, 0x00, FIELD_PRESENT, 0x01, 0x0d, 0x18]
        );
    }

    #[test]
    fn authorize_reply_nested_conditional() {
        let req = Request::RwAuthorizeReply {
            reply: Some(AuthorizeReply {
                kind: AuthorizeKind::Read,
                status: 0,
                update: None,
            }),
        };
        let mut buf = [0u8; 8];
        let len = req.encode(&mut buf).unwrap();
        assert_eq!(len, 6);
        assert_eq!(
            &buf[..len],
            &[OP_GATTS_RW_AUTHORIZE_REPLY, FIELD_PRESENT, 0x01, 0x00, 0x00, FIELD_NOT_PRESENT]
        );

        let req = Request::RwAuthorizeReply { reply: None };
        let len = req.encode(&mut buf).unwrap();
        assert_eq!(&buf[..len], &[OP_GATTS_RW_AUTHORIZE_REPLY, FIELD_NOT_PRESENT]);
    }

    #[test]
    fn char_values_read_wire_form() {
        let req = Request::CharValuesRead {
            handles: &[0x0010, 0x0201],
        };
        let mut buf = [0u8; 8];
        let len = req.encode(&mut buf).unwrap();
        assert_eq!(len, 7);
        assert_eq!(
            &buf[..len],
            &[OP_GATTC_CHAR_VALUES_READ, 0x02, 0x00, 0x10, 0x00, 0x01, 0x02]
        );

        let rsp = [OP_GATTC_CHAR_VALUES_READ, 0x00, 0x00, 0x00, 0x00];
        let reply = Reply::decode(OP_GATTC_CHAR_VALUES_READ, &rsp).unwrap();
        assert_eq!(reply.result, ResultCode::SUCCESS);
        assert_eq!(reply.body, ReplyBody::None);
    }

    #[test]
    fn char_value_by_uuid_read_wire_form() {
        let req = Request::CharValueByUuidRead {
            uuid: Uuid::new_short(0x2a19),
            range: HandleRange { start: 0x0001, end: 0x000f },
        };
        let mut buf = [0u8; 16];
        let len = req.encode(&mut buf).unwrap();
        assert_eq!(len, 8);
        assert_eq!(
            &buf[..len],
            &[
                OP_GATTC_CHAR_VALUE_BY_UUID_READ,
                0x01,
                0x19,
                0x2a,
                0x01,
                0x00,
                0x0f,
                0x00
            ]
        );
    }

    #[test]
    fn encode_to_vec_matches_encode() {
        let req = Request::HvConfirm { handle: 0x0042 };
        let vec: heapless::Vec<u8, 8> = req.encode_to_vec().unwrap();
        assert_eq!(&vec[..], &[OP_GATTC_HV_CONFIRM, 0x42, 0x00]);

        let req = Request::AppearanceGet;
        let vec: heapless::Vec<u8, 8> = req.encode_to_vec().unwrap();
        assert_eq!(&vec[..], &[OP_GAP_APPEARANCE_GET, FIELD_PRESENT]);

        assert_eq!(req.encode_to_vec::<1>(), Err(Error::InsufficientSpace));
    }

    #[test]
    fn result_code_display() {
        let mut s = heapless::String::<64>::new();
        core::fmt::write(&mut s, format_args!("{}", ResultCode::BUSY)).unwrap();
        assert!(s.as_str().starts_with("busy"));

        let mut s = heapless::String::<64>::new();
        core::fmt::write(&mut s, format_args!("{}", ResultCode::new(200))).unwrap();
        assert_eq!(s.as_str(), "error code 200");
    }
}
