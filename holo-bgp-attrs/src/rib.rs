//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::neighbor::PeerType;
use crate::packet::attribute::AttrList;
use crate::packet::consts::{AttrType, Asn};

// Default values.
pub const DFLT_LOCAL_PREF: u32 = 100;

#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(new)]
pub struct Route {
    pub attrs: Arc<AttrSet<RouteAttrs>>,
}

// Route attributes shared by all routes with the same origin, forwarding
// information and path attributes.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct RouteAttrs {
    pub origin: RouteOrigin,
    pub dest: RouteDest,
    pub gateway: Option<Ipv4Addr>,
    pub ifindex: Option<u32>,
    pub attrs: AttrList,
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum RouteOrigin {
    // Route learned from a neighbor.
    Neighbor(PeerInfo),
    // Route was injected or redistributed from another protocol.
    Protocol(RouteSource),
}

// Neighbor session a route was learned from.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct PeerInfo {
    pub remote_addr: Ipv4Addr,
    pub peer_type: PeerType,
    pub local_as: Asn,
    pub identifier: Ipv4Addr,
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum RouteSource {
    Static,
    Device,
    Rip,
    RipExternal,
    Ospf,
    OspfExternal,
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum RouteDest {
    // Next hop is a neighboring router.
    Router,
    // Directly connected network.
    Device,
    Blackhole,
    Unreachable,
    Prohibit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum RouteRejectReason {
    AsLoop,
    SelfNexthop,
    NexthopUnreachable,
}

// Route attribute interning.
pub trait RouteAttrStore {
    type Handle;

    // Returns a shared handle to the given route attributes, creating one if
    // necessary.
    fn intern(&mut self, rta: RouteAttrs) -> Self::Handle;
}

#[derive(Debug, Eq, PartialEq)]
pub struct AttrSets<T> {
    pub tree: BTreeMap<T, Arc<AttrSet<T>>>,
    next_index: u64,
}

#[derive(Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct AttrSet<T> {
    pub index: u64,
    pub value: T,
}

// ===== impl Route =====

impl Route {
    pub fn local_pref(&self) -> Option<u32> {
        self.attrs
            .value
            .attrs
            .get(AttrType::LocalPref)
            .and_then(|attr| attr.value.as_int())
            .copied()
    }

    // Routes originated locally are handled as external routes.
    pub fn peer_type(&self) -> PeerType {
        match &self.attrs.value.origin {
            RouteOrigin::Neighbor(peer) => peer.peer_type,
            RouteOrigin::Protocol(..) => PeerType::External,
        }
    }

    pub fn identifier(&self) -> Ipv4Addr {
        match &self.attrs.value.origin {
            RouteOrigin::Neighbor(peer) => peer.identifier,
            RouteOrigin::Protocol(..) => Ipv4Addr::UNSPECIFIED,
        }
    }

    // Compares two routes. `Ordering::Greater` means `self` is preferred.
    pub fn compare(&self, other: &Route) -> Ordering {
        // Compare LOCAL_PREFERENCE attributes, when defined on both sides.
        if let (Some(a), Some(b)) = (self.local_pref(), other.local_pref()) {
            match a.cmp(&b) {
                Ordering::Equal => {
                    // Move to next tie-breaker.
                }
                ordering => return ordering,
            }
        }

        // Prefer eBGP routes.
        let a = self.peer_type();
        let b = other.peer_type();
        match (a, b) {
            (PeerType::External, PeerType::Internal) => {
                return Ordering::Greater;
            }
            (PeerType::Internal, PeerType::External) => {
                return Ordering::Less;
            }
            _ => {
                // Move to next tie-breaker.
            }
        }

        // Compare peer BGP identifiers (lowest wins).
        other.identifier().cmp(&self.identifier())
    }
}

// ===== impl RouteSource =====

impl RouteSource {
    // Returns whether this is a route redistributed into an IGP from
    // outside of it.
    pub fn is_external(&self) -> bool {
        matches!(self, RouteSource::RipExternal | RouteSource::OspfExternal)
    }
}

// ===== impl RouteRejectReason =====

impl std::fmt::Display for RouteRejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteRejectReason::AsLoop => write!(f, "AS path loop"),
            RouteRejectReason::SelfNexthop => {
                write!(f, "nexthop is a local address")
            }
            RouteRejectReason::NexthopUnreachable => {
                write!(f, "nexthop unreachable")
            }
        }
    }
}

// ===== impl AttrSets =====

impl<T> AttrSets<T>
where
    T: Clone + Eq + Ord + PartialEq + PartialOrd,
{
    pub fn get(&mut self, attr: T) -> Arc<AttrSet<T>> {
        if let Some(attr_set) = self.tree.get(&attr) {
            Arc::clone(attr_set)
        } else {
            self.next_index += 1;
            let attr_set = Arc::new(AttrSet {
                index: self.next_index,
                value: attr.clone(),
            });
            self.tree.insert(attr, Arc::clone(&attr_set));
            attr_set
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl<T> Default for AttrSets<T> {
    fn default() -> AttrSets<T> {
        AttrSets {
            tree: Default::default(),
            next_index: 0,
        }
    }
}

impl RouteAttrStore for AttrSets<RouteAttrs> {
    type Handle = Arc<AttrSet<RouteAttrs>>;

    fn intern(&mut self, rta: RouteAttrs) -> Self::Handle {
        self.get(rta)
    }
}

// ===== global functions =====

// Returns whether the new route is preferred over the old one.
pub fn better(new: &Route, old: &Route) -> bool {
    new.compare(old) == Ordering::Greater
}
