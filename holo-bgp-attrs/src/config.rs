//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![allow(clippy::derivable_impls)]

use std::net::Ipv4Addr;

use serde::Deserialize;

use crate::bucket::DFLT_BUCKET_TABLE_SIZE;
use crate::packet::consts::Asn;
use crate::rib::DFLT_LOCAL_PREF;

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstanceCfg {
    pub asn: Asn,
    pub default_local_pref: u32,
    pub bucket_table_size: u32,
    pub neighbors: Vec<NeighborCfg>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NeighborCfg {
    pub remote_addr: Ipv4Addr,
    pub remote_as: Asn,
    pub next_hop_self: bool,
}

// ===== impl InstanceCfg =====

impl Default for InstanceCfg {
    fn default() -> InstanceCfg {
        InstanceCfg {
            asn: 0,
            default_local_pref: DFLT_LOCAL_PREF,
            bucket_table_size: DFLT_BUCKET_TABLE_SIZE,
            neighbors: Default::default(),
        }
    }
}

// ===== impl NeighborCfg =====

impl Default for NeighborCfg {
    fn default() -> NeighborCfg {
        NeighborCfg {
            remote_addr: Ipv4Addr::UNSPECIFIED,
            remote_as: 0,
            next_hop_self: false,
        }
    }
}
