//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::{Bytes, TryGetError};
use serde::{Deserialize, Serialize};

use crate::packet::consts::{AttrType, UpdateMessageErrorSubcode};

// UPDATE message errors.
//
// All of these are fatal to the message: the session layer is expected to
// send the corresponding NOTIFICATION and tear the session down.
//
// Errors about one specific attribute carry the erroneous attribute (type,
// length and value) so it can be returned in the NOTIFICATION data field.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum UpdateMessageError {
    MalformedAttributeList,
    UnrecognizedWellKnownAttribute(Bytes),
    MissingWellKnownAttribute(AttrType),
    AttributeFlagsError(Bytes),
    AttributeLengthError(Bytes),
    InvalidOriginAttribute(Bytes),
    InvalidNexthopAttribute(Bytes),
    MalformedAsPath,
}

// Attribute validation errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum AttrError {
    // Ignore the attribute and continue processing the message.
    Discard,
    InvalidOrigin,
    InvalidNexthop,
    MalformedAsPath,
}

// ===== impl UpdateMessageError =====

impl UpdateMessageError {
    pub fn subcode(&self) -> UpdateMessageErrorSubcode {
        match self {
            UpdateMessageError::MalformedAttributeList => {
                UpdateMessageErrorSubcode::MalformedAttributeList
            }
            UpdateMessageError::UnrecognizedWellKnownAttribute(..) => {
                UpdateMessageErrorSubcode::UnrecognizedWellKnownAttribute
            }
            UpdateMessageError::MissingWellKnownAttribute(..) => {
                UpdateMessageErrorSubcode::MissingWellKnownAttribute
            }
            UpdateMessageError::AttributeFlagsError(..) => {
                UpdateMessageErrorSubcode::AttributeFlagsError
            }
            UpdateMessageError::AttributeLengthError(..) => {
                UpdateMessageErrorSubcode::AttributeLengthError
            }
            UpdateMessageError::InvalidOriginAttribute(..) => {
                UpdateMessageErrorSubcode::InvalidOriginAttribute
            }
            UpdateMessageError::InvalidNexthopAttribute(..) => {
                UpdateMessageErrorSubcode::InvalidNexthopAttribute
            }
            UpdateMessageError::MalformedAsPath => {
                UpdateMessageErrorSubcode::MalformedAsPath
            }
        }
    }

    // Returns the data to be sent in the NOTIFICATION message.
    pub fn data(&self) -> Vec<u8> {
        match self {
            UpdateMessageError::UnrecognizedWellKnownAttribute(attr)
            | UpdateMessageError::AttributeFlagsError(attr)
            | UpdateMessageError::AttributeLengthError(attr)
            | UpdateMessageError::InvalidOriginAttribute(attr)
            | UpdateMessageError::InvalidNexthopAttribute(attr) => {
                attr.to_vec()
            }
            // RFC 4271 - Section 6.3:
            // "The Data field MUST contain the Attribute Type Code of the
            // missing, well-known attribute".
            UpdateMessageError::MissingWellKnownAttribute(attr_type) => {
                vec![*attr_type as u8]
            }
            UpdateMessageError::MalformedAttributeList
            | UpdateMessageError::MalformedAsPath => vec![],
        }
    }
}

impl std::fmt::Display for UpdateMessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UPDATE message error: ")?;

        match self {
            UpdateMessageError::MalformedAttributeList => {
                write!(f, "malformed attribute list")
            }
            UpdateMessageError::UnrecognizedWellKnownAttribute(..) => {
                write!(f, "unrecognized well-known attribute")
            }
            UpdateMessageError::MissingWellKnownAttribute(attr_type) => {
                write!(f, "missing well-known attribute: {attr_type:?}")
            }
            UpdateMessageError::AttributeFlagsError(..) => {
                write!(f, "attribute flags error")
            }
            UpdateMessageError::AttributeLengthError(..) => {
                write!(f, "attribute length error")
            }
            UpdateMessageError::InvalidOriginAttribute(..) => {
                write!(f, "invalid ORIGIN attribute")
            }
            UpdateMessageError::InvalidNexthopAttribute(..) => {
                write!(f, "invalid NEXT_HOP attribute")
            }
            UpdateMessageError::MalformedAsPath => {
                write!(f, "malformed AS_PATH")
            }
        }
    }
}

impl std::error::Error for UpdateMessageError {}

impl From<TryGetError> for UpdateMessageError {
    fn from(_error: TryGetError) -> UpdateMessageError {
        UpdateMessageError::MalformedAttributeList
    }
}

// ===== impl AttrError =====

impl AttrError {
    // Converts a validation error into the corresponding UPDATE message
    // error. Returns `None` for errors that don't abort the decoding.
    pub(crate) fn into_update_error(
        self,
        raw_attr: Bytes,
    ) -> Option<UpdateMessageError> {
        match self {
            AttrError::Discard => None,
            AttrError::InvalidOrigin => {
                Some(UpdateMessageError::InvalidOriginAttribute(raw_attr))
            }
            AttrError::InvalidNexthop => {
                Some(UpdateMessageError::InvalidNexthopAttribute(raw_attr))
            }
            AttrError::MalformedAsPath => {
                Some(UpdateMessageError::MalformedAsPath)
            }
        }
    }
}

impl std::fmt::Display for AttrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrError::Discard => write!(f, "attribute discarded"),
            AttrError::InvalidOrigin => write!(f, "invalid origin value"),
            AttrError::InvalidNexthop => write!(f, "invalid nexthop address"),
            AttrError::MalformedAsPath => write!(f, "malformed AS path"),
        }
    }
}
