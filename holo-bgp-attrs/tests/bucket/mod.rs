//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use holo_bgp_attrs::bucket::{BucketError, BucketTable};
use holo_bgp_attrs::packet::attribute::{
    Attr, AttrId, AttrList, AttrValue,
};
use holo_bgp_attrs::packet::consts::{AttrFlags, AttrProto, AttrType};

use super::base_attrs;

fn nexthop(n: u32) -> Ipv4Addr {
    Ipv4Addr::from(0x0a00_0000 + n)
}

// Builds `count` distinct attribute sets.
fn attr_sets(count: u32) -> Vec<AttrList> {
    (1..=count)
        .map(|n| base_attrs(&[65001], nexthop(n)))
        .collect()
}

#[test]
fn test_get_or_create_idempotent() {
    let mut table = BucketTable::new();
    let empty = AttrList::default();

    let a = base_attrs(&[65001, 65002], nexthop(1));
    let b = base_attrs(&[65001, 65002], nexthop(1));
    let id_a = table.get_or_create(&empty, &a).unwrap();
    let id_b = table.get_or_create(&empty, &b).unwrap();
    assert_eq!(id_a, id_b);
    assert_eq!(table.len(), 1);

    // Same content split differently between the two lists.
    let high = AttrList::from(vec![Attr::bgp(
        AttrType::Nexthop,
        AttrValue::Ip(nexthop(1)),
    )]);
    let low = base_attrs(&[65001, 65002], nexthop(99));
    let id_c = table.get_or_create(&high, &low).unwrap();
    assert_eq!(id_a, id_c);
    assert_eq!(table.len(), 1);
}

#[test]
fn test_get_or_create_nexthop() {
    let mut table = BucketTable::new();
    let empty = AttrList::default();

    let a = base_attrs(&[65001], nexthop(1));
    let b = base_attrs(&[65001], nexthop(2));
    let id_a = table.get_or_create(&empty, &a).unwrap();
    let id_b = table.get_or_create(&empty, &b).unwrap();
    assert_ne!(id_a, id_b);
    assert_eq!(table.len(), 2);

    let bucket = table.get(id_b).unwrap();
    assert_eq!(
        bucket.attrs.get(AttrType::Nexthop).unwrap().value,
        AttrValue::Ip(nexthop(2))
    );
    assert_eq!(bucket.hash, bucket.attrs.hash());
}

#[test]
fn test_get_or_create_foreign_attrs() {
    let mut table = BucketTable::new();
    let empty = AttrList::default();

    let attrs = base_attrs(&[65001], nexthop(1));
    let id = table.get_or_create(&empty, &attrs).unwrap();

    // Attributes from other namespaces don't affect the bucket.
    let high = AttrList::from(vec![Attr::new(
        AttrId::new(AttrProto::Ospf, 1),
        AttrFlags::empty(),
        AttrValue::Int(10),
    )]);
    assert_eq!(table.get_or_create(&high, &attrs), Ok(id));
    assert_eq!(table.len(), 1);
    assert!(table.get(id).unwrap().attrs.iter().all(|attr| {
        attr.id.proto == AttrProto::Bgp
    }));
}

#[test]
fn test_get_or_create_missing_mandatory() {
    let mut table = BucketTable::new();
    let empty = AttrList::default();

    let attrs = AttrList::from(vec![
        Attr::bgp(AttrType::Origin, AttrValue::Int(0)),
        Attr::bgp(AttrType::Nexthop, AttrValue::Ip(nexthop(1))),
    ]);
    assert_eq!(
        table.get_or_create(&empty, &attrs),
        Err(BucketError::MissingMandatory(AttrType::AsPath))
    );
    assert!(table.is_empty());
    assert_eq!(table.lookup(&empty, &attrs), None);
}

#[test]
fn test_rehash() {
    let mut table = BucketTable::with_size(64);
    let empty = AttrList::default();
    assert_eq!(table.size(), 64);
    assert_eq!(table.limit(), 256);

    let sets = attr_sets(257);
    let mut ids = vec![];
    for (idx, attrs) in sets.iter().enumerate() {
        ids.push(table.get_or_create(&empty, attrs).unwrap());
        if idx < 256 {
            assert_eq!(table.size(), 64);
        }
    }

    // Exactly one rehash happened.
    assert_eq!(table.len(), 257);
    assert_eq!(table.size(), 256);
    assert_eq!(table.limit(), 1024);

    // All sets remain reachable by content.
    for (attrs, id) in sets.iter().zip(ids) {
        assert_eq!(table.lookup(&empty, attrs), Some(id));
        assert_eq!(table.get_or_create(&empty, attrs), Ok(id));
    }
    assert_eq!(table.len(), 257);
}

#[test]
fn test_rehash_default_size() {
    let mut table = BucketTable::new();
    let empty = AttrList::default();
    assert_eq!(table.size(), 256);
    assert_eq!(table.limit(), 1024);

    let sets = attr_sets(1025);
    for attrs in &sets[..1024] {
        table.get_or_create(&empty, attrs).unwrap();
    }
    assert_eq!(table.size(), 256);

    table.get_or_create(&empty, &sets[1024]).unwrap();
    assert_eq!(table.size(), 1024);
    assert_eq!(table.limit(), 4096);
    assert_eq!(table.iter().count(), 1025);
}

#[test]
fn test_with_size() {
    let table = BucketTable::with_size(100);
    assert_eq!(table.size(), 128);
    assert_eq!(table.limit(), 512);

    // The table stops growing once the limit gets too large.
    let table = BucketTable::with_size(16384);
    assert_eq!(table.size(), 16384);
    assert_eq!(table.limit(), u32::MAX);

    // Oversized tables are capped.
    let table = BucketTable::with_size(u32::MAX);
    assert_eq!(table.size(), 65536);
    assert_eq!(table.limit(), u32::MAX);
    let table = BucketTable::with_size(0);
    assert_eq!(table.size(), 1);
    assert_eq!(table.limit(), 4);
}
