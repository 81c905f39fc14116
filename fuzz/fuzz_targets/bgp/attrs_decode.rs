#![no_main]

use bytes::Bytes;
use holo_bgp_attrs::packet::attribute::AttrList;
use holo_bgp_attrs::packet::message::DecodeCxt;
use libfuzzer_sys::arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    if let Ok(cxt) = DecodeCxt::arbitrary(&mut u)
        && let Ok(bytes) = Vec::<u8>::arbitrary(&mut u)
    {
        let mut buf = Bytes::from(bytes);
        let _ = AttrList::decode(&mut buf, &cxt);
    }
});
