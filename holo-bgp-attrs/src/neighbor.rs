//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use arbitrary::Arbitrary;
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::bucket::BucketTable;
use crate::config::{InstanceCfg, NeighborCfg};
use crate::packet::aspath;
use crate::packet::attribute::AttrList;
use crate::packet::consts::{Asn, AttrType};
use crate::packet::message::DecodeCxt;
use crate::rib::{
    PeerInfo, RouteAttrs, RouteDest, RouteOrigin, RouteRejectReason,
};

// BGP neighbor session.
#[derive(Debug)]
pub struct Neighbor {
    pub remote_addr: Ipv4Addr,
    pub config: NeighborCfg,
    pub peer_type: PeerType,
    pub local_as: Asn,
    pub local_addr: Ipv4Addr,
    pub default_local_pref: u32,
    // BGP identifier received in the OPEN message.
    pub identifier: Option<Ipv4Addr>,
    // Directly connected gateway used to reach the neighbor.
    pub gateway: Option<Gateway>,
    pub buckets: BucketTable,
    pub statistics: NeighborStatistics,
}

// BGP peer type.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Arbitrary, Deserialize, Serialize)]
pub enum PeerType {
    Internal,
    External,
}

// Directly connected gateway and its outgoing interface.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct Gateway {
    pub addr: Ipv4Addr,
    pub ifindex: u32,
}

// Neighbor statistics.
#[derive(Debug, Default)]
pub struct NeighborStatistics {
    pub updates_rcvd: u32,
    pub routes_accepted: u32,
    pub routes_rejected: u32,
    pub routes_exported: u32,
    pub routes_not_exported: u32,
}

// Neighbor and interface table.
pub trait NeighborTable {
    // Returns the directly connected gateway through which the given address
    // is reachable.
    fn resolve_gateway(&self, addr: Ipv4Addr) -> Option<Gateway>;
}

// ===== impl Neighbor =====

impl Neighbor {
    pub fn new(
        instance_cfg: &InstanceCfg,
        config: NeighborCfg,
        local_addr: Ipv4Addr,
    ) -> Neighbor {
        let peer_type = if config.remote_as == instance_cfg.asn {
            PeerType::Internal
        } else {
            PeerType::External
        };

        Neighbor {
            remote_addr: config.remote_addr,
            config,
            peer_type,
            local_as: instance_cfg.asn,
            local_addr,
            default_local_pref: instance_cfg.default_local_pref,
            identifier: None,
            gateway: None,
            buckets: BucketTable::with_size(instance_cfg.bucket_table_size),
            statistics: Default::default(),
        }
    }

    pub fn decode_cxt(&self) -> DecodeCxt {
        DecodeCxt {
            peer_type: self.peer_type,
            default_local_pref: self.default_local_pref,
        }
    }

    pub fn peer_info(&self) -> PeerInfo {
        PeerInfo {
            remote_addr: self.remote_addr,
            peer_type: self.peer_type,
            local_as: self.local_as,
            identifier: self.identifier.unwrap_or(Ipv4Addr::UNSPECIFIED),
        }
    }

    pub fn ifindex(&self) -> Option<u32> {
        self.gateway.map(|gateway| gateway.ifindex)
    }

    // Checks the path attributes received from this neighbor and builds the
    // corresponding route attributes.
    pub fn import_attrs(
        &self,
        nbr_table: &impl NeighborTable,
        attrs: AttrList,
    ) -> Result<RouteAttrs, RouteRejectReason> {
        // Reject routes whose AS_PATH contains the local AS.
        if let Some(as_path) = attrs
            .get(AttrType::AsPath)
            .and_then(|attr| attr.value.as_as_path())
            && aspath::contains(as_path, self.local_as)
        {
            return Err(RouteRejectReason::AsLoop);
        }

        let nexthop = attrs
            .get(AttrType::Nexthop)
            .and_then(|attr| attr.value.as_ip())
            .copied()
            .ok_or(RouteRejectReason::NexthopUnreachable)?;
        if nexthop == self.local_addr {
            return Err(RouteRejectReason::SelfNexthop);
        }

        // Fall back to the neighbor itself when the nexthop isn't directly
        // reachable.
        let gateway = nbr_table
            .resolve_gateway(nexthop)
            .or(self.gateway)
            .ok_or(RouteRejectReason::NexthopUnreachable)?;

        Ok(RouteAttrs {
            origin: RouteOrigin::Neighbor(self.peer_info()),
            dest: RouteDest::Router,
            gateway: Some(gateway.addr),
            ifindex: Some(gateway.ifindex),
            attrs,
        })
    }
}

// ===== impl PeerType =====

impl std::fmt::Display for PeerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeerType::Internal => write!(f, "internal"),
            PeerType::External => write!(f, "external"),
        }
    }
}
