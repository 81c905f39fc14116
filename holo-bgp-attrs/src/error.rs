//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use tracing::{warn, warn_span};

use crate::packet::consts::AttrType;
use crate::packet::error::UpdateMessageError;
use crate::packet::message::NotificationMsg;

// BGP attribute processing errors.
#[derive(Debug)]
pub enum Error {
    // Network input
    NbrRxError(Ipv4Addr, UpdateMessageError),
    // Route export
    NbrMissingAttr(Ipv4Addr, AttrType),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::NbrRxError(addr, error) => {
                warn_span!("neighbor", %addr).in_scope(|| {
                    warn!(error = %with_source(error), "{}", self);
                });
            }
            Error::NbrMissingAttr(addr, attr_type) => {
                warn_span!("neighbor", %addr).in_scope(|| {
                    warn!(?attr_type, "{}", self);
                });
            }
        }
    }

    // Returns the NOTIFICATION message that should be sent to the neighbor,
    // if any.
    pub fn notification(&self) -> Option<NotificationMsg> {
        match self {
            Error::NbrRxError(_, error) => Some(NotificationMsg::from(error)),
            Error::NbrMissingAttr(..) => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NbrRxError(..) => {
                write!(f, "failed to decode path attributes")
            }
            Error::NbrMissingAttr(..) => {
                write!(f, "mandatory attribute missing")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NbrRxError(_, error) => Some(error),
            _ => None,
        }
    }
}

// ===== global functions =====

fn with_source<E: std::error::Error>(error: E) -> String {
    if let Some(source) = error.source() {
        format!("{} ({})", error, with_source(source))
    } else {
        error.to_string()
    }
}
