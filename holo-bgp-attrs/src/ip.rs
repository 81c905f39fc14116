//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

// Extension methods for Ipv4Addr.
pub trait Ipv4AddrExt {
    const LENGTH: usize;

    // Returns true if this is an usable address.
    fn is_usable(&self) -> bool;

    // Decodes an address from the first four octets of the given slice.
    fn from_slice(data: &[u8]) -> Option<Ipv4Addr>;
}

// ===== impl Ipv4Addr =====

impl Ipv4AddrExt for Ipv4Addr {
    const LENGTH: usize = 4;

    fn is_usable(&self) -> bool {
        !(self.is_loopback()
            || self.is_broadcast()
            || self.is_multicast()
            || self.is_unspecified())
    }

    fn from_slice(data: &[u8]) -> Option<Ipv4Addr> {
        let octets: [u8; Self::LENGTH] =
            data.get(..Self::LENGTH)?.try_into().ok()?;
        Some(Ipv4Addr::from(octets))
    }
}
