//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use holo_bgp_attrs::packet::aspath::{self, AsPathDisplay};
use holo_bgp_attrs::packet::consts::AsPathSegmentType;
use holo_bgp_attrs::packet::error::AttrError;

#[test]
fn test_prepend_empty() {
    let path = aspath::prepend(&[], 65001).unwrap();
    assert_eq!(&path[..], &[0x02, 0x01, 0xfd, 0xe9]);
}

#[test]
fn test_prepend_growth() {
    let mut path = aspath::prepend(&[], 1).unwrap();
    for asn in 2..=255 {
        path = aspath::prepend(&path, asn).unwrap();
    }

    // Single AS_SEQUENCE holding all prepended ASes, most recent first.
    let segments = aspath::segments(&path)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].seg_type, AsPathSegmentType::Sequence);
    assert_eq!(segments[0].len(), 255);
    assert_eq!(segments[0].members().next(), Some(255));
    assert_eq!(segments[0].members().last(), Some(1));

    // The 256th AS doesn't fit in the first segment anymore.
    let path = aspath::prepend(&path, 256).unwrap();
    let segments = aspath::segments(&path)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].len(), 1);
    assert_eq!(segments[0].members().next(), Some(256));
    assert_eq!(segments[1].len(), 255);
    assert_eq!(aspath::path_length(&path), 256);
}

#[test]
fn test_prepend_before_set() {
    // AS_SET {65002 65003}
    let data = [0x01, 0x02, 0xfd, 0xea, 0xfd, 0xeb];
    let path = aspath::prepend(&data, 65001).unwrap();
    assert_eq!(
        &path[..],
        &[0x02, 0x01, 0xfd, 0xe9, 0x01, 0x02, 0xfd, 0xea, 0xfd, 0xeb]
    );
    assert_eq!(aspath::path_length(&path), 2);
}

#[test]
fn test_prepend_overflow() {
    // A path close to the maximum attribute length.
    let mut data = Vec::<u8>::new();
    while data.len() + 2 + 2 * 255 <= u16::MAX as usize {
        data.push(0x02);
        data.push(255);
        data.extend(std::iter::repeat_n(0xff, 2 * 255));
    }
    let fill = u16::MAX as usize - data.len();
    let count = (fill - 2) / 2;
    data.push(0x01);
    data.push(count as u8);
    data.extend(std::iter::repeat_n(0xff, 2 * count));
    assert!(aspath::validate(&data).is_ok());

    assert!(aspath::prepend(&data, 65001).is_none());
}

#[test]
fn test_contains() {
    // 65001 {65002 65003}
    let data = [0x02, 0x01, 0xfd, 0xe9, 0x01, 0x02, 0xfd, 0xea, 0xfd, 0xeb];
    assert!(aspath::contains(&data, 65001));
    assert!(aspath::contains(&data, 65003));
    assert!(!aspath::contains(&data, 65000));
    assert!(!aspath::contains(&[], 65000));
}

#[test]
fn test_validate() {
    assert_eq!(aspath::validate(&[]), Ok(()));
    assert_eq!(aspath::validate(&[0x02, 0x00]), Ok(()));
    assert_eq!(
        aspath::validate(&[0x00, 0x00]),
        Err(AttrError::MalformedAsPath)
    );
    assert_eq!(aspath::validate(&[0x02]), Err(AttrError::MalformedAsPath));
    assert_eq!(
        aspath::validate(&[0x02, 0x02, 0xfd, 0xe9]),
        Err(AttrError::MalformedAsPath)
    );
}

#[test]
fn test_segments_stop_after_error() {
    let data = [0x02, 0x01, 0xfd, 0xe9, 0x05, 0x01, 0xfd, 0xea];
    let mut segments = aspath::segments(&data);
    assert!(segments.next().unwrap().is_ok());
    assert!(segments.next().unwrap().is_err());
    assert!(segments.next().is_none());
}

#[test]
fn test_display() {
    let data = [0x02, 0x02, 0xfd, 0xe9, 0xfd, 0xea, 0x01, 0x01, 0xfd, 0xeb];
    assert_eq!(AsPathDisplay(&data).to_string(), "65001 65002 {65003}");
    assert_eq!(AsPathDisplay(&[]).to_string(), "");
}
