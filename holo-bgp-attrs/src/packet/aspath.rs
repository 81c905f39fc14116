//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! AS_PATH operations over the wire encoding.
//!
//! The AS_PATH value is kept in its wire format (a sequence of segments,
//! each one consisting of a type octet, a member count octet and 2-octet AS
//! numbers), so these helpers operate directly on the raw attribute data.

use itertools::Itertools;
use num_traits::FromPrimitive;

use crate::packet::attribute::Adata;
use crate::packet::consts::{AsPathSegmentType, Asn};
use crate::packet::error::AttrError;

// Maximum number of members a segment can hold (limited by its count octet).
pub const SEGMENT_MAX_MEMBERS: usize = 255;

const SEGMENT_HDR_LEN: usize = 2;
const ASN_LEN: usize = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AsPathSegment<'a> {
    pub seg_type: AsPathSegmentType,
    members: &'a [u8],
}

// Iterator over the segments of an AS_PATH value.
//
// Yields an error and stops when a truncated segment or an invalid segment
// type is found.
#[derive(Clone, Debug)]
pub struct Segments<'a> {
    data: &'a [u8],
}

// Displays an AS_PATH value, with AS_SET segments enclosed in braces.
#[derive(Clone, Copy, Debug)]
pub struct AsPathDisplay<'a>(pub &'a [u8]);

// ===== impl AsPathSegment =====

impl<'a> AsPathSegment<'a> {
    pub fn len(&self) -> usize {
        self.members.len() / ASN_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = Asn> + 'a {
        self.members
            .chunks_exact(ASN_LEN)
            .map(|asn| Asn::from_be_bytes([asn[0], asn[1]]))
    }

    fn contains(&self, asn: Asn) -> bool {
        self.members().any(|member| member == asn)
    }
}

// ===== impl Segments =====

impl<'a> Segments<'a> {
    fn decode_segment(&mut self) -> Result<AsPathSegment<'a>, AttrError> {
        let data = self.data;
        let [seg_type, count, rest @ ..] = data else {
            return Err(AttrError::MalformedAsPath);
        };
        let seg_type = AsPathSegmentType::from_u8(*seg_type)
            .ok_or(AttrError::MalformedAsPath)?;
        let members_len = *count as usize * ASN_LEN;
        if rest.len() < members_len {
            return Err(AttrError::MalformedAsPath);
        }

        let (members, rest) = rest.split_at(members_len);
        self.data = rest;
        Ok(AsPathSegment { seg_type, members })
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Result<AsPathSegment<'a>, AttrError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }

        let segment = self.decode_segment();
        if segment.is_err() {
            self.data = &[];
        }
        Some(segment)
    }
}

impl std::iter::FusedIterator for Segments<'_> {}

// ===== impl AsPathDisplay =====

impl std::fmt::Display for AsPathDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut segments = segments(self.0).map_while(Result::ok).peekable();
        while let Some(segment) = segments.next() {
            let members = segment.members().join(" ");
            match segment.seg_type {
                AsPathSegmentType::Set => write!(f, "{{{members}}}")?,
                AsPathSegmentType::Sequence => write!(f, "{members}")?,
            }
            if segments.peek().is_some() {
                write!(f, " ")?;
            }
        }

        Ok(())
    }
}

// ===== global functions =====

pub fn segments(data: &[u8]) -> Segments<'_> {
    Segments { data }
}

// Checks that every segment has a valid type and fits in the attribute.
pub fn validate(data: &[u8]) -> Result<(), AttrError> {
    segments(data).try_for_each(|segment| segment.map(|_| ()))
}

// Returns whether the given AS appears in any segment of the path.
pub fn contains(data: &[u8], asn: Asn) -> bool {
    segments(data)
        .map_while(Result::ok)
        .any(|segment| segment.contains(asn))
}

// Returns the number of ASes in the path, with each AS_SET counting as one.
pub fn path_length(data: &[u8]) -> usize {
    segments(data)
        .map_while(Result::ok)
        .map(|segment| match segment.seg_type {
            AsPathSegmentType::Set => 1,
            AsPathSegmentType::Sequence => segment.len(),
        })
        .sum()
}

// Prepends the given AS to the path.
//
// The first segment is extended when it's an AS_SEQUENCE with room for one
// more member. Otherwise a new single-member AS_SEQUENCE is placed in front
// of the existing path.
//
// Returns `None` when the resulting path wouldn't fit in an attribute.
pub fn prepend(data: &[u8], asn: Asn) -> Option<Adata> {
    let mut path = Vec::with_capacity(SEGMENT_HDR_LEN + ASN_LEN + data.len());
    match data {
        [seg_type, count, rest @ ..]
            if *seg_type == AsPathSegmentType::Sequence as u8
                && (*count as usize) < SEGMENT_MAX_MEMBERS =>
        {
            path.push(*seg_type);
            path.push(*count + 1);
            path.extend_from_slice(&asn.to_be_bytes());
            path.extend_from_slice(rest);
        }
        _ => {
            path.push(AsPathSegmentType::Sequence as u8);
            path.push(1);
            path.extend_from_slice(&asn.to_be_bytes());
            path.extend_from_slice(data);
        }
    }

    Adata::new(path)
}
