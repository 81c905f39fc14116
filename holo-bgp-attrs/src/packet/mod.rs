//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod aspath;
pub mod attribute;
pub mod consts;
pub mod desc;
pub mod error;
pub mod message;
