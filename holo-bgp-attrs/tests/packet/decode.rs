//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use arbitrary::{Arbitrary, Unstructured};
use bytes::Bytes;
use holo_bgp_attrs::packet::attribute::AttrList;
use holo_bgp_attrs::packet::message::DecodeCxt;

#[test]
fn arbitrary_input() {
    // Decoding arbitrary input must never panic.
    let seeds: [&[u8]; 6] = [
        &[],
        &[0x00],
        &[0x01, 0x10, 0x40, 0x02, 0xff],
        &[0x00, 0x00, 0x00, 0x00, 0x50, 0x02, 0xff, 0xff, 0x02],
        &[0x01, 0x00, 0x00, 0x00, 0x40, 0x02, 0x04, 0x02, 0x7f, 0x00],
        &[0xff; 64],
    ];

    for seed in seeds {
        let mut u = Unstructured::new(seed);
        if let Ok(cxt) = DecodeCxt::arbitrary(&mut u)
            && let Ok(bytes) = Vec::<u8>::arbitrary(&mut u)
        {
            let mut buf = Bytes::from(bytes);
            let _ = AttrList::decode(&mut buf, &cxt);
        }

        let mut buf = Bytes::copy_from_slice(seed);
        let cxt = DecodeCxt::new(
            holo_bgp_attrs::neighbor::PeerType::External,
            100,
        );
        let _ = AttrList::decode(&mut buf, &cxt);
    }
}
