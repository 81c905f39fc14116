//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod bucket;
pub mod config;
pub mod debug;
pub mod error;
pub mod events;
pub mod export;
pub mod ip;
pub mod neighbor;
pub mod packet;
pub mod rib;
