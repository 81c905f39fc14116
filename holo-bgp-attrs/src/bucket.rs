//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Interning of outgoing path attribute sets.
//!
//! Every route advertised to a neighbor has its final path attributes
//! stored in a bucket. Routes with identical attributes share the same
//! bucket, which makes it possible to group them in the same UPDATE message.
//!
//! The bucket table is a chained hash table indexed by the hash of the
//! canonical attribute list. It starts with 256 chains and grows whenever
//! the number of buckets exceeds four times the number of chains.

use serde::{Deserialize, Serialize};

use crate::debug::Debug;
use crate::packet::attribute::{AttrChain, AttrList};
use crate::packet::consts::{AttrProto, AttrType, MANDATORY_ATTRS};

// Default values.
pub const DFLT_BUCKET_TABLE_SIZE: u32 = 256;

// Maximum average chain length before the table is grown.
const LOAD_FACTOR: u32 = 4;
// Once the growth limit reaches this value the table stops growing.
const LIMIT_MAX: u32 = 65536;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct BucketId(usize);

#[derive(Debug)]
pub struct Bucket {
    pub attrs: AttrList,
    pub hash: u32,
    next: Option<BucketId>,
}

#[derive(Debug)]
pub struct BucketTable {
    heads: Vec<Option<BucketId>>,
    buckets: Vec<Bucket>,
    size: u32,
    limit: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BucketError {
    MissingMandatory(AttrType),
}

// ===== impl BucketTable =====

impl BucketTable {
    pub fn new() -> BucketTable {
        BucketTable::with_size(DFLT_BUCKET_TABLE_SIZE)
    }

    // Creates a table with the given number of hash chains (rounded up to a
    // power of two and capped to the size at which the table stops growing).
    pub fn with_size(size: u32) -> BucketTable {
        let size = size.clamp(1, LIMIT_MAX).next_power_of_two();
        BucketTable {
            heads: vec![None; size as usize],
            buckets: Vec::new(),
            size,
            limit: next_limit(size),
        }
    }

    // Returns the bucket holding the given attributes, creating a new one if
    // none exists.
    //
    // The `high` attributes take precedence over the `low` ones. Attributes
    // that don't belong to the BGP namespace are ignored.
    pub fn get_or_create(
        &mut self,
        high: &AttrList,
        low: &AttrList,
    ) -> Result<BucketId, BucketError> {
        let attrs = canonicalize(high, low);
        let hash = attrs.hash();

        if let Some(id) = self.find(&attrs, hash) {
            Debug::BucketFound(id, hash).log();
            return Ok(id);
        }

        // Ensure that all mandatory attributes are present.
        if let Some(attr_type) = MANDATORY_ATTRS
            .into_iter()
            .find(|attr_type| attrs.get(*attr_type).is_none())
        {
            return Err(BucketError::MissingMandatory(attr_type));
        }

        // Create new bucket.
        let id = BucketId(self.buckets.len());
        let index = self.index(hash);
        self.buckets.push(Bucket {
            attrs,
            hash,
            next: self.heads[index],
        });
        self.heads[index] = Some(id);
        Debug::BucketCreate(id, hash).log();

        // Grow the table if necessary.
        if self.buckets.len() > self.limit as usize {
            self.rehash();
        }

        Ok(id)
    }

    // Returns the bucket holding the given attributes, if any.
    pub fn lookup(&self, high: &AttrList, low: &AttrList) -> Option<BucketId> {
        let attrs = canonicalize(high, low);
        self.find(&attrs, attrs.hash())
    }

    pub fn get(&self, id: BucketId) -> Option<&Bucket> {
        self.buckets.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BucketId, &Bucket)> {
        self.buckets
            .iter()
            .enumerate()
            .map(|(idx, bucket)| (BucketId(idx), bucket))
    }

    // Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    // Number of hash chains.
    pub fn size(&self) -> u32 {
        self.size
    }

    // Number of buckets above which the table is grown.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn index(&self, hash: u32) -> usize {
        (hash & (self.size - 1)) as usize
    }

    fn chain(&self, hash: u32) -> impl Iterator<Item = (BucketId, &Bucket)> {
        std::iter::successors(self.heads[self.index(hash)], move |id| {
            self.buckets[id.0].next
        })
        .map(move |id| (id, &self.buckets[id.0]))
    }

    fn find(&self, attrs: &AttrList, hash: u32) -> Option<BucketId> {
        self.chain(hash)
            .find(|(_, bucket)| {
                bucket.hash == hash && bucket.attrs.same(attrs)
            })
            .map(|(id, _)| id)
    }

    fn rehash(&mut self) {
        let old_size = self.size;
        self.size = self.limit;
        self.limit = next_limit(self.size);

        // Relink all buckets using their stored hashes.
        let mask = self.size - 1;
        let mut heads = vec![None; self.size as usize];
        for (idx, bucket) in self.buckets.iter_mut().enumerate() {
            let index = (bucket.hash & mask) as usize;
            bucket.next = heads[index];
            heads[index] = Some(BucketId(idx));
        }
        self.heads = heads;

        Debug::BucketTableRehash(old_size, self.size).log();
    }
}

impl Default for BucketTable {
    fn default() -> BucketTable {
        BucketTable::new()
    }
}

// ===== impl BucketError =====

impl std::fmt::Display for BucketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BucketError::MissingMandatory(attr_type) => {
                write!(f, "mandatory attribute {attr_type:?} missing")
            }
        }
    }
}

impl std::error::Error for BucketError {}

// ===== helper functions =====

// Merges the attribute lists and puts the result in canonical form.
fn canonicalize(high: &AttrList, low: &AttrList) -> AttrList {
    let mut attrs = AttrChain::new(high).with(low).merge();
    attrs.retain_proto(AttrProto::Bgp);
    attrs.normalize();
    attrs
}

fn next_limit(size: u32) -> u32 {
    let limit = size.saturating_mul(LOAD_FACTOR);
    if limit >= LIMIT_MAX { u32::MAX } else { limit }
}
