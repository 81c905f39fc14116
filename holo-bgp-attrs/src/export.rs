//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

use crate::neighbor::{Neighbor, PeerType};
use crate::packet::aspath;
use crate::packet::attribute::{Adata, Attr, AttrList, AttrValue};
use crate::packet::consts::{AttrType, Origin};
use crate::rib::{
    PeerInfo, Route, RouteAttrs, RouteDest, RouteOrigin, RouteSource,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum ExportRejectReason {
    // Route was learned from the same neighbor.
    Poison,
    // iBGP-learned route can't be advertised to another iBGP peer.
    IbgpToIbgp,
    // AS_PATH can't grow any further.
    AsPathOverflow,
}

// ===== impl ExportRejectReason =====

impl std::fmt::Display for ExportRejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportRejectReason::Poison => {
                write!(f, "route learned from the same neighbor")
            }
            ExportRejectReason::IbgpToIbgp => {
                write!(f, "iBGP route can't be sent to iBGP neighbor")
            }
            ExportRejectReason::AsPathOverflow => {
                write!(f, "AS_PATH too long")
            }
        }
    }
}

// ===== global functions =====

// Computes the attributes that must override the route's own attributes
// when advertising it to the given neighbor.
pub fn on_export(
    route: &Route,
    nbr: &Neighbor,
) -> Result<AttrList, ExportRejectReason> {
    let rta = &route.attrs.value;
    let mut attrs = match &rta.origin {
        RouteOrigin::Neighbor(peer) => {
            if peer.remote_addr == nbr.remote_addr {
                return Err(ExportRejectReason::Poison);
            }
            if is_ibgp_to_ibgp(peer, nbr) {
                return Err(ExportRejectReason::IbgpToIbgp);
            }
            update_attrs(rta, nbr)?
        }
        RouteOrigin::Protocol(source) => create_attrs(rta, *source, nbr)?,
    };

    attrs.sort();
    Ok(attrs)
}

// ===== helper functions =====

fn is_ibgp_to_ibgp(peer: &PeerInfo, nbr: &Neighbor) -> bool {
    peer.local_as == nbr.local_as
        && peer.peer_type == PeerType::Internal
        && nbr.peer_type == PeerType::Internal
}

// Rewrites the attributes of a route learned from another neighbor.
fn update_attrs(
    rta: &RouteAttrs,
    nbr: &Neighbor,
) -> Result<AttrList, ExportRejectReason> {
    let mut attrs = AttrList::default();

    // Prepend the local AS when crossing the AS boundary.
    if nbr.peer_type == PeerType::External {
        let as_path = rta
            .attrs
            .get(AttrType::AsPath)
            .and_then(|attr| attr.value.as_as_path())
            .map(|as_path| &as_path[..])
            .unwrap_or_default();
        let as_path = aspath::prepend(as_path, nbr.local_as)
            .ok_or(ExportRejectReason::AsPathOverflow)?;
        attrs.push(Attr::bgp(AttrType::AsPath, AttrValue::AsPath(as_path)));
    }

    // Keep the original nexthop when it's usable by the neighbor.
    let keep_nexthop = rta.attrs.get(AttrType::Nexthop).is_some()
        && !nbr.config.next_hop_self
        && (nbr.peer_type == PeerType::Internal
            || (rta.ifindex.is_some() && rta.ifindex == nbr.ifindex()));
    if !keep_nexthop {
        let nexthop = AttrValue::Ip(nbr.local_addr);
        attrs.push(Attr::bgp(AttrType::Nexthop, nexthop));
    }

    Ok(attrs)
}

// Creates the attributes of a locally originated route.
fn create_attrs(
    rta: &RouteAttrs,
    source: RouteSource,
    nbr: &Neighbor,
) -> Result<AttrList, ExportRejectReason> {
    let mut attrs = AttrList::default();

    let origin = if source.is_external() {
        Origin::Incomplete
    } else {
        Origin::Igp
    };
    attrs.push(Attr::bgp(AttrType::Origin, AttrValue::Int(origin as u32)));

    let as_path = match nbr.peer_type {
        PeerType::Internal => Adata::default(),
        PeerType::External => aspath::prepend(&[], nbr.local_as)
            .ok_or(ExportRejectReason::AsPathOverflow)?,
    };
    attrs.push(Attr::bgp(AttrType::AsPath, AttrValue::AsPath(as_path)));

    let nexthop = match rta.gateway {
        Some(gateway)
            if !nbr.config.next_hop_self
                && nbr.peer_type == PeerType::Internal
                && rta.dest == RouteDest::Router =>
        {
            gateway
        }
        _ => nbr.local_addr,
    };
    attrs.push(Attr::bgp(AttrType::Nexthop, AttrValue::Ip(nexthop)));

    Ok(attrs)
}
