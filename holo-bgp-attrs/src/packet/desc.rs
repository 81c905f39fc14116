//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use num_traits::FromPrimitive;

use crate::ip::Ipv4AddrExt;
use crate::neighbor::PeerType;
use crate::packet::aspath::{self, AsPathDisplay};
use crate::packet::attribute::{AttrKind, AttrValue};
use crate::packet::consts::{AttrFlags, AttrType, Origin};
use crate::packet::error::AttrError;
use crate::packet::message::DecodeCxt;

// Attribute value validator.
pub type Validator = fn(&DecodeCxt, &[u8]) -> Result<(), AttrError>;

// Attribute value formatter.
pub type Formatter =
    fn(&AttrValue, &mut std::fmt::Formatter<'_>) -> std::fmt::Result;

// Static description of a known BGP path attribute.
#[derive(Debug)]
pub struct AttrDesc {
    pub attr_type: AttrType,
    pub name: &'static str,
    // Expected value length, if fixed.
    pub length: Option<usize>,
    // Expected Optional and Transitive flags.
    pub flags: AttrFlags,
    pub kind: AttrKind,
    pub validate: Option<Validator>,
    pub format: Option<Formatter>,
}

// Descriptors of all known attributes, indexed by attribute code minus one.
static ATTR_DESCS: [AttrDesc; 7] = [
    AttrDesc {
        attr_type: AttrType::Origin,
        name: "ORIGIN",
        length: Some(1),
        flags: AttrFlags::TRANSITIVE,
        kind: AttrKind::Int,
        validate: Some(validate_origin),
        format: Some(format_origin),
    },
    AttrDesc {
        attr_type: AttrType::AsPath,
        name: "AS_PATH",
        length: None,
        flags: AttrFlags::TRANSITIVE,
        kind: AttrKind::AsPath,
        validate: Some(validate_as_path),
        format: Some(format_as_path),
    },
    AttrDesc {
        attr_type: AttrType::Nexthop,
        name: "NEXT_HOP",
        length: Some(4),
        flags: AttrFlags::TRANSITIVE,
        kind: AttrKind::IpAddress,
        validate: Some(validate_nexthop),
        format: None,
    },
    AttrDesc {
        attr_type: AttrType::Med,
        name: "MULTI_EXIT_DISC",
        length: Some(4),
        flags: AttrFlags::OPTIONAL,
        kind: AttrKind::Int,
        validate: None,
        format: None,
    },
    AttrDesc {
        attr_type: AttrType::LocalPref,
        name: "LOCAL_PREF",
        length: Some(4),
        flags: AttrFlags::OPTIONAL,
        kind: AttrKind::Int,
        validate: Some(validate_local_pref),
        format: None,
    },
    AttrDesc {
        attr_type: AttrType::AtomicAggregate,
        name: "ATOMIC_AGGREGATE",
        length: Some(0),
        flags: AttrFlags::OPTIONAL,
        kind: AttrKind::Opaque,
        validate: None,
        format: None,
    },
    AttrDesc {
        attr_type: AttrType::Aggregator,
        name: "AGGREGATOR",
        length: Some(6),
        flags: AttrFlags::OPTIONAL,
        kind: AttrKind::Opaque,
        validate: None,
        format: None,
    },
];

// ===== global functions =====

// Returns the descriptor of the given attribute code, if it's known.
pub fn lookup(code: u8) -> Option<&'static AttrDesc> {
    AttrType::from_u8(code).map(lookup_type)
}

pub fn lookup_type(attr_type: AttrType) -> &'static AttrDesc {
    &ATTR_DESCS[attr_type as usize - 1]
}

// ===== validators =====

fn validate_origin(_cxt: &DecodeCxt, data: &[u8]) -> Result<(), AttrError> {
    data.first()
        .copied()
        .and_then(Origin::from_u8)
        .map(|_| ())
        .ok_or(AttrError::InvalidOrigin)
}

fn validate_as_path(_cxt: &DecodeCxt, data: &[u8]) -> Result<(), AttrError> {
    aspath::validate(data)
}

fn validate_nexthop(_cxt: &DecodeCxt, data: &[u8]) -> Result<(), AttrError> {
    Ipv4Addr::from_slice(data)
        .filter(|addr| addr.is_usable())
        .map(|_| ())
        .ok_or(AttrError::InvalidNexthop)
}

fn validate_local_pref(
    cxt: &DecodeCxt,
    _data: &[u8],
) -> Result<(), AttrError> {
    // LOCAL_PREF is only meaningful within an AS.
    if cxt.peer_type == PeerType::External {
        return Err(AttrError::Discard);
    }

    Ok(())
}

// ===== formatters =====

fn format_origin(
    value: &AttrValue,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    match value.as_int().copied().and_then(Origin::from_u32) {
        Some(origin) => write!(f, "{origin}"),
        None => write!(f, "?"),
    }
}

fn format_as_path(
    value: &AttrValue,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    match value {
        AttrValue::AsPath(data) => write!(f, "{}", AsPathDisplay(data)),
        _ => write!(f, "?"),
    }
}
