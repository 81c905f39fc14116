//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::Bytes;

use crate::bucket::{BucketError, BucketId};
use crate::debug::Debug;
use crate::error::Error;
use crate::export;
use crate::neighbor::{Neighbor, NeighborTable};
use crate::packet::attribute::AttrList;
use crate::rib::{Route, RouteAttrStore};

// ===== neighbor UPDATE path attributes =====

pub fn process_nbr_update<S>(
    nbr: &mut Neighbor,
    nbr_table: &impl NeighborTable,
    store: &mut S,
    buf: &mut Bytes,
) -> Result<Option<S::Handle>, Error>
where
    S: RouteAttrStore,
{
    nbr.statistics.updates_rcvd += 1;

    // Decode path attributes.
    let attrs = AttrList::decode(buf, &nbr.decode_cxt())
        .map_err(|error| Error::NbrRxError(nbr.remote_addr, error))?;
    Debug::NbrAttrsRx(&nbr.remote_addr, &attrs).log();

    // Check whether the route can be accepted.
    let rta = match nbr.import_attrs(nbr_table, attrs) {
        Ok(rta) => rta,
        Err(reason) => {
            Debug::RouteReject(&nbr.remote_addr, reason).log();
            nbr.statistics.routes_rejected += 1;
            return Ok(None);
        }
    };
    nbr.statistics.routes_accepted += 1;

    Ok(Some(store.intern(rta)))
}

// ===== route export notification =====

pub fn process_rt_notify(
    nbr: &mut Neighbor,
    route: &Route,
) -> Result<Option<BucketId>, Error> {
    // Compute the attributes overriding the route's own attributes.
    let attrs = match export::on_export(route, nbr) {
        Ok(attrs) => attrs,
        Err(reason) => {
            Debug::RouteExportReject(&nbr.remote_addr, reason).log();
            nbr.statistics.routes_not_exported += 1;
            return Ok(None);
        }
    };

    // Find or create the bucket holding the final attributes.
    let bucket_id = nbr
        .buckets
        .get_or_create(&attrs, &route.attrs.value.attrs)
        .map_err(|error| match error {
            BucketError::MissingMandatory(attr_type) => {
                Error::NbrMissingAttr(nbr.remote_addr, attr_type)
            }
        })?;
    nbr.statistics.routes_exported += 1;

    Ok(Some(bucket_id))
}
