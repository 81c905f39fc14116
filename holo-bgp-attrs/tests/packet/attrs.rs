//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;
use std::sync::LazyLock as Lazy;

use holo_bgp_attrs::neighbor::PeerType;
use holo_bgp_attrs::packet::attribute::{
    Adata, Attr, AttrId, AttrList, AttrValue,
};
use holo_bgp_attrs::packet::consts::{
    AttrFlags, AttrType, Origin, UpdateMessageErrorSubcode,
};
use holo_bgp_attrs::packet::error::UpdateMessageError;
use holo_bgp_attrs::packet::message::NotificationMsg;

use super::{decode_attrs, test_decode_attrs, test_encode_attrs};

fn sorted(attrs: Vec<Attr>) -> AttrList {
    let mut attrs = AttrList::from(attrs);
    attrs.sort();
    attrs
}

fn adata(data: &[u8]) -> Adata {
    Adata::new(data).unwrap()
}

// Mandatory attributes only.
static ATTRS1: Lazy<(Vec<u8>, AttrList)> = Lazy::new(|| {
    (
        vec![
            0x40, 0x01, 0x01, 0x00, 0x40, 0x02, 0x00, 0x40, 0x03, 0x04, 0x0a,
            0x00, 0x00, 0x02,
        ],
        sorted(vec![
            Attr::bgp(AttrType::Origin, AttrValue::Int(Origin::Igp as u32)),
            Attr::bgp(AttrType::AsPath, AttrValue::AsPath(Adata::default())),
            Attr::bgp(
                AttrType::Nexthop,
                AttrValue::Ip(Ipv4Addr::new(10, 0, 0, 2)),
            ),
            Attr::bgp(AttrType::LocalPref, AttrValue::Int(100)),
        ]),
    )
});

// All known attributes plus an unknown optional non-transitive one.
static ATTRS2: Lazy<(Vec<u8>, AttrList)> = Lazy::new(|| {
    (
        vec![
            0x40, 0x01, 0x01, 0x02, 0x40, 0x02, 0x06, 0x02, 0x02, 0xfd, 0xe9,
            0xfd, 0xea, 0x40, 0x03, 0x04, 0x0a, 0x00, 0x00, 0x02, 0x80, 0x04,
            0x04, 0x00, 0x00, 0x00, 0x0a, 0x80, 0x05, 0x04, 0x00, 0x00, 0x00,
            0xc8, 0x80, 0x06, 0x00, 0x80, 0x07, 0x06, 0xfd, 0xe9, 0x0a, 0x00,
            0x00, 0x01, 0x80, 0x0a, 0x04, 0x01, 0x02, 0x03, 0x04,
        ],
        sorted(vec![
            Attr::bgp(
                AttrType::Origin,
                AttrValue::Int(Origin::Incomplete as u32),
            ),
            Attr::bgp(
                AttrType::AsPath,
                AttrValue::AsPath(adata(&[0x02, 0x02, 0xfd, 0xe9, 0xfd, 0xea])),
            ),
            Attr::bgp(
                AttrType::Nexthop,
                AttrValue::Ip(Ipv4Addr::new(10, 0, 0, 2)),
            ),
            Attr::bgp(AttrType::Med, AttrValue::Int(10)),
            Attr::bgp(AttrType::LocalPref, AttrValue::Int(200)),
            Attr::bgp(
                AttrType::AtomicAggregate,
                AttrValue::Opaque(Adata::default()),
            ),
            Attr::bgp(
                AttrType::Aggregator,
                AttrValue::Opaque(adata(&[0xfd, 0xe9, 0x0a, 0x00, 0x00, 0x01])),
            ),
            Attr::new(
                AttrId::bgp(10),
                AttrFlags::OPTIONAL,
                AttrValue::Opaque(adata(&[0x01, 0x02, 0x03, 0x04])),
            ),
        ]),
    )
});

// AS_PATH using the extended length format.
static ATTRS3: Lazy<(Vec<u8>, AttrList)> = Lazy::new(|| {
    (
        vec![
            0x40, 0x01, 0x01, 0x00, 0x50, 0x02, 0x00, 0x04, 0x02, 0x01, 0xfd,
            0xe9, 0x40, 0x03, 0x04, 0x0a, 0x00, 0x00, 0x02, 0x80, 0x05, 0x04,
            0x00, 0x00, 0x00, 0x64,
        ],
        sorted(vec![
            Attr::bgp(AttrType::Origin, AttrValue::Int(Origin::Igp as u32)),
            Attr::new(
                AttrType::AsPath.into(),
                AttrFlags::TRANSITIVE | AttrFlags::EXTENDED,
                AttrValue::AsPath(adata(&[0x02, 0x01, 0xfd, 0xe9])),
            ),
            Attr::bgp(
                AttrType::Nexthop,
                AttrValue::Ip(Ipv4Addr::new(10, 0, 0, 2)),
            ),
            Attr::bgp(AttrType::LocalPref, AttrValue::Int(100)),
        ]),
    )
});

fn assert_error(
    bytes: &[u8],
    peer_type: PeerType,
    error_expected: UpdateMessageError,
    subcode: UpdateMessageErrorSubcode,
) {
    let error = decode_attrs(bytes, peer_type).unwrap_err();
    assert_eq!(error, error_expected);
    assert_eq!(error.subcode(), subcode);
}

#[test]
fn test_decode_attrs1() {
    let (ref bytes, ref attrs) = *ATTRS1;
    test_decode_attrs(bytes, attrs);
}

#[test]
fn test_decode_attrs2() {
    let (ref bytes, ref attrs) = *ATTRS2;
    test_decode_attrs(bytes, attrs);
}

#[test]
fn test_encode_attrs2() {
    let (ref bytes, ref attrs) = *ATTRS2;
    test_encode_attrs(bytes, attrs);
}

#[test]
fn test_decode_attrs3() {
    let (ref bytes, ref attrs) = *ATTRS3;
    test_decode_attrs(bytes, attrs);
}

#[test]
fn test_encode_attrs3() {
    let (ref bytes, ref attrs) = *ATTRS3;
    test_encode_attrs(bytes, attrs);
}

#[test]
fn test_decode_sorted() {
    let (ref bytes, _) = *ATTRS1;
    let attrs = decode_attrs(bytes, PeerType::Internal).unwrap();
    assert!(attrs.is_sorted());
    let ids = attrs.iter().map(|attr| attr.id).collect::<Vec<_>>();
    assert!(ids.windows(2).all(|ids| ids[0] < ids[1]));
}

#[test]
fn test_decode_default_local_pref() {
    let (ref bytes, _) = *ATTRS1;
    let mut buf = bytes::Bytes::copy_from_slice(bytes);
    let cxt = super::DecodeCxt::new(PeerType::Internal, 50);
    let attrs = AttrList::decode(&mut buf, &cxt).unwrap();
    let local_pref = attrs.get(AttrType::LocalPref).unwrap();
    assert_eq!(local_pref.value, AttrValue::Int(50));
    assert_eq!(local_pref.flags, AttrFlags::OPTIONAL);
}

#[test]
fn test_decode_local_pref_ebgp() {
    // LOCAL_PREF received over eBGP is ignored.
    let bytes = [
        0x40, 0x01, 0x01, 0x00, 0x40, 0x02, 0x00, 0x40, 0x03, 0x04, 0x0a,
        0x00, 0x00, 0x02, 0x80, 0x05, 0x04, 0x00, 0x00, 0x00, 0xc8,
    ];

    let attrs = decode_attrs(&bytes, PeerType::External).unwrap();
    let local_pref = attrs.get(AttrType::LocalPref).unwrap();
    assert_eq!(local_pref.value, AttrValue::Int(100));
    assert_eq!(attrs.len(), 4);

    let attrs = decode_attrs(&bytes, PeerType::Internal).unwrap();
    let local_pref = attrs.get(AttrType::LocalPref).unwrap();
    assert_eq!(local_pref.value, AttrValue::Int(200));
}

#[test]
fn test_decode_unknown_transitive() {
    let bytes = [
        0x40, 0x01, 0x01, 0x00, 0x40, 0x02, 0x00, 0x40, 0x03, 0x04, 0x0a,
        0x00, 0x00, 0x02, 0xc0, 0x09, 0x01, 0xff,
    ];

    let attrs = decode_attrs(&bytes, PeerType::Internal).unwrap();
    let attr = attrs.find(AttrId::bgp(9)).unwrap();
    assert_eq!(
        attr.flags,
        AttrFlags::OPTIONAL | AttrFlags::TRANSITIVE | AttrFlags::PARTIAL
    );
    assert_eq!(attr.value, AttrValue::Opaque(adata(&[0xff])));
}

#[test]
fn test_decode_flags_error() {
    // AS_PATH without the transitive flag.
    let bytes: [u8; 14] = [
        0x40, 0x01, 0x01, 0x00, 0x00, 0x02, 0x00, 0x40, 0x03, 0x04, 0x0a,
        0x00, 0x00, 0x02,
    ];
    assert_error(
        &bytes,
        PeerType::Internal,
        UpdateMessageError::AttributeFlagsError(bytes[4..7].to_vec().into()),
        UpdateMessageErrorSubcode::AttributeFlagsError,
    );

    let error = decode_attrs(&bytes, PeerType::Internal).unwrap_err();
    let msg = NotificationMsg::from(&error);
    assert_eq!(msg.error_code, 3);
    assert_eq!(msg.error_subcode, 4);
    assert_eq!(msg.data, vec![0x00, 0x02, 0x00]);
}

#[test]
fn test_decode_unrecognized_well_known() {
    let bytes: [u8; 8] = [0x40, 0x01, 0x01, 0x00, 0x40, 0x09, 0x01, 0xff];
    assert_error(
        &bytes,
        PeerType::Internal,
        UpdateMessageError::UnrecognizedWellKnownAttribute(
            bytes[4..].to_vec().into(),
        ),
        UpdateMessageErrorSubcode::UnrecognizedWellKnownAttribute,
    );
}

#[test]
fn test_decode_length_error() {
    let bytes: [u8; 5] = [0x40, 0x01, 0x02, 0x00, 0x00];
    assert_error(
        &bytes,
        PeerType::Internal,
        UpdateMessageError::AttributeLengthError(bytes.to_vec().into()),
        UpdateMessageErrorSubcode::AttributeLengthError,
    );

    // ATOMIC_AGGREGATE must be empty.
    let bytes: [u8; 4] = [0x80, 0x06, 0x01, 0x00];
    assert_error(
        &bytes,
        PeerType::Internal,
        UpdateMessageError::AttributeLengthError(bytes.to_vec().into()),
        UpdateMessageErrorSubcode::AttributeLengthError,
    );
}

#[test]
fn test_decode_invalid_origin() {
    let bytes: [u8; 4] = [0x40, 0x01, 0x01, 0x03];
    assert_error(
        &bytes,
        PeerType::Internal,
        UpdateMessageError::InvalidOriginAttribute(bytes.to_vec().into()),
        UpdateMessageErrorSubcode::InvalidOriginAttribute,
    );
}

#[test]
fn test_decode_invalid_nexthop() {
    for addr in [[0, 0, 0, 0], [127, 0, 0, 1], [224, 0, 0, 5], [255; 4]] {
        let mut bytes: Vec<u8> = vec![0x40, 0x03, 0x04];
        bytes.extend_from_slice(&addr);
        assert_error(
            &bytes,
            PeerType::Internal,
            UpdateMessageError::InvalidNexthopAttribute(bytes.clone().into()),
            UpdateMessageErrorSubcode::InvalidNexthopAttribute,
        );
    }
}

#[test]
fn test_decode_malformed_as_path() {
    // Invalid segment type.
    assert_error(
        &[0x40, 0x02, 0x02, 0x03, 0x00],
        PeerType::Internal,
        UpdateMessageError::MalformedAsPath,
        UpdateMessageErrorSubcode::MalformedAsPath,
    );

    // Segment longer than the attribute.
    assert_error(
        &[0x40, 0x02, 0x03, 0x02, 0x02, 0xfd],
        PeerType::Internal,
        UpdateMessageError::MalformedAsPath,
        UpdateMessageErrorSubcode::MalformedAsPath,
    );
}

#[test]
fn test_decode_duplicate() {
    let bytes = [0x40, 0x01, 0x01, 0x00, 0x40, 0x01, 0x01, 0x01];
    assert_error(
        &bytes,
        PeerType::Internal,
        UpdateMessageError::MalformedAttributeList,
        UpdateMessageErrorSubcode::MalformedAttributeList,
    );
}

#[test]
fn test_decode_truncated() {
    for bytes in [
        &[0x40][..],
        &[0x40, 0x01][..],
        &[0x50, 0x02, 0x00][..],
        &[0x40, 0x03, 0x04, 0x0a, 0x00][..],
    ] {
        assert_error(
            bytes,
            PeerType::Internal,
            UpdateMessageError::MalformedAttributeList,
            UpdateMessageErrorSubcode::MalformedAttributeList,
        );
    }
}

#[test]
fn test_decode_missing_mandatory() {
    let origin: [u8; 4] = [0x40, 0x01, 0x01, 0x00];
    let as_path: [u8; 3] = [0x40, 0x02, 0x00];
    let nexthop: [u8; 7] = [0x40, 0x03, 0x04, 0x0a, 0x00, 0x00, 0x02];

    for (bytes, attr_type) in [
        ([&as_path[..], &nexthop[..]].concat(), AttrType::Origin),
        ([&origin[..], &nexthop[..]].concat(), AttrType::AsPath),
        ([&origin[..], &as_path[..]].concat(), AttrType::Nexthop),
        (vec![], AttrType::Origin),
    ] {
        assert_error(
            &bytes,
            PeerType::Internal,
            UpdateMessageError::MissingWellKnownAttribute(attr_type),
            UpdateMessageErrorSubcode::MissingWellKnownAttribute,
        );

        let error = decode_attrs(&bytes, PeerType::Internal).unwrap_err();
        assert_eq!(error.data(), vec![attr_type as u8]);
    }
}

#[test]
fn test_encode_extended_length() {
    let asns = (1..=200u16).flat_map(u16::to_be_bytes);
    let mut data = vec![0x02, 200];
    data.extend(asns);
    let attrs = sorted(vec![Attr::bgp(
        AttrType::AsPath,
        AttrValue::AsPath(adata(&data)),
    )]);

    let mut buf = bytes::BytesMut::new();
    attrs.encode(&mut buf);
    assert_eq!(buf.len(), 4 + 402);
    assert_eq!(&buf[..4], &[0x50, 0x02, 0x01, 0x92]);
}

#[test]
fn test_display() {
    let (ref bytes, _) = *ATTRS2;
    let attrs = decode_attrs(bytes, PeerType::Internal).unwrap();

    let origin = attrs.get(AttrType::Origin).unwrap();
    assert_eq!(origin.to_string(), "ORIGIN: Incomplete");
    let as_path = attrs.get(AttrType::AsPath).unwrap();
    assert_eq!(as_path.to_string(), "AS_PATH: 65001 65002");
    let nexthop = attrs.get(AttrType::Nexthop).unwrap();
    assert_eq!(nexthop.to_string(), "NEXT_HOP");
    let unknown = attrs.find(AttrId::bgp(10)).unwrap();
    assert_eq!(unknown.to_string(), "0a");

    let unknown = Attr::new(
        AttrId::bgp(0x20),
        AttrFlags::OPTIONAL | AttrFlags::TRANSITIVE,
        AttrValue::Opaque(Adata::default()),
    );
    assert_eq!(unknown.to_string(), "20 [t]");
}
