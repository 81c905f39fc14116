//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use arbitrary::Arbitrary;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::neighbor::PeerType;
use crate::packet::consts::{ErrorCode, MessageType};
use crate::packet::error::UpdateMessageError;

//
// NOTIFICATION Message.
//
// Encoding format (message body):
//
// 0                   1                   2                   3
// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// | Error code    | Error subcode |   Data (variable)             |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct NotificationMsg {
    pub error_code: u8,
    pub error_subcode: u8,
    pub data: Vec<u8>,
}

// Path attributes decoding context.
#[derive(Clone, Copy, Debug)]
#[derive(new)]
#[derive(Arbitrary)]
pub struct DecodeCxt {
    pub peer_type: PeerType,
    pub default_local_pref: u32,
}

// ===== impl NotificationMsg =====

impl NotificationMsg {
    pub const MIN_LEN: u16 = 21;
    pub const MAX_LEN: u16 = 4096;
    // Largest data field that fits in a NOTIFICATION message.
    pub const MAX_DATA_LEN: usize = (Self::MAX_LEN - Self::MIN_LEN) as usize;

    // Encodes the NOTIFICATION as a complete BGP message, header included.
    //
    // The data field is truncated if necessary so that the message doesn't
    // exceed the maximum BGP message size.
    pub fn encode(&self) -> Bytes {
        let data = &self.data[..self.data.len().min(Self::MAX_DATA_LEN)];
        let mut buf =
            BytesMut::with_capacity(Self::MIN_LEN as usize + data.len());

        // Marker field.
        buf.put_u128(u128::MAX);
        // Message length.
        buf.put_u16(Self::MIN_LEN + data.len() as u16);
        // Message type and body.
        buf.put_u8(MessageType::Notification as u8);
        buf.put_u8(self.error_code);
        buf.put_u8(self.error_subcode);
        buf.put_slice(data);

        buf.freeze()
    }

    // Decodes the NOTIFICATION message body.
    pub fn decode(buf: &mut Bytes) -> Option<Self> {
        let error_code = buf.try_get_u8().ok()?;
        let error_subcode = buf.try_get_u8().ok()?;

        Some(NotificationMsg {
            error_code,
            error_subcode,
            data: buf.to_vec(),
        })
    }
}

impl From<&UpdateMessageError> for NotificationMsg {
    fn from(error: &UpdateMessageError) -> NotificationMsg {
        let mut data = error.data();
        data.truncate(NotificationMsg::MAX_DATA_LEN);

        NotificationMsg {
            error_code: ErrorCode::UpdateMessageError as u8,
            error_subcode: error.subcode() as u8,
            data,
        }
    }
}

impl std::fmt::Display for NotificationMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "error code {} subcode {} data {:02x?}",
            self.error_code, self.error_subcode, self.data
        )
    }
}
