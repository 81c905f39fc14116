//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use tracing::{debug, debug_span};

use crate::bucket::BucketId;
use crate::export::ExportRejectReason;
use crate::packet::attribute::AttrList;
use crate::packet::consts::AttrType;
use crate::packet::error::AttrError;
use crate::rib::RouteRejectReason;

// BGP attribute debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    NbrAttrsRx(&'a Ipv4Addr, &'a AttrList),
    AttrMalformed(AttrType, AttrError),
    RouteReject(&'a Ipv4Addr, RouteRejectReason),
    RouteExportReject(&'a Ipv4Addr, ExportRejectReason),
    BucketFound(BucketId, u32),
    BucketCreate(BucketId, u32),
    BucketTableRehash(u32, u32),
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub(crate) fn log(&self) {
        match self {
            Debug::NbrAttrsRx(addr, attrs) => {
                debug_span!("neighbor", %addr).in_scope(|| {
                    debug_span!("input").in_scope(|| {
                        let data =
                            serde_json::to_string(attrs).unwrap_or_default();
                        debug!(%data, "{}", self);
                    })
                });
            }
            Debug::AttrMalformed(attr_type, action) => {
                // Parent span(s): neighbor
                debug!(?attr_type, %action, "{}", self);
            }
            Debug::RouteReject(addr, reason) => {
                debug_span!("neighbor", %addr).in_scope(|| {
                    debug!(%reason, "{}", self);
                });
            }
            Debug::RouteExportReject(addr, reason) => {
                debug_span!("neighbor", %addr).in_scope(|| {
                    debug_span!("output").in_scope(|| {
                        debug!(%reason, "{}", self);
                    })
                });
            }
            Debug::BucketFound(id, hash) | Debug::BucketCreate(id, hash) => {
                // Parent span(s): neighbor
                debug!(?id, %hash, "{}", self);
            }
            Debug::BucketTableRehash(old_size, new_size) => {
                // Parent span(s): neighbor
                debug!(%old_size, %new_size, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::NbrAttrsRx(..) => {
                write!(f, "path attributes")
            }
            Debug::AttrMalformed(..) => {
                write!(f, "malformed attribute")
            }
            Debug::RouteReject(..) => {
                write!(f, "route not accepted")
            }
            Debug::RouteExportReject(..) => {
                write!(f, "route not exported")
            }
            Debug::BucketFound(..) => {
                write!(f, "found bucket")
            }
            Debug::BucketCreate(..) => {
                write!(f, "creating bucket")
            }
            Debug::BucketTableRehash(..) => {
                write!(f, "rehashing bucket table")
            }
        }
    }
}
