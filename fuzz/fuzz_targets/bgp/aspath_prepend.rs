#![no_main]

use holo_bgp_attrs::packet::aspath;
use libfuzzer_sys::arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    if let Ok(asn) = u16::arbitrary(&mut u)
        && let Ok(path) = Vec::<u8>::arbitrary(&mut u)
        && aspath::validate(&path).is_ok()
        && let Some(path) = aspath::prepend(&path, asn)
    {
        assert!(aspath::validate(&path).is_ok());
        assert!(aspath::contains(&path, asn));
    }
});
