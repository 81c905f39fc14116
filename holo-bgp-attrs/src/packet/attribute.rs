//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::hash::Hasher;
use std::net::Ipv4Addr;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use derive_new::new;
use enum_as_inner::EnumAsInner;
use itertools::Itertools;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use twox_hash::XxHash32;

use crate::debug::Debug;
use crate::packet::consts::{AttrFlags, AttrProto, AttrType, MANDATORY_ATTRS};
use crate::packet::desc::{self, AttrDesc};
use crate::packet::error::UpdateMessageError;
use crate::packet::message::DecodeCxt;

// Attribute identifier: namespace plus attribute code.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct AttrId {
    pub proto: AttrProto,
    pub code: u8,
}

// Semantic type of an attribute value.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum AttrKind {
    Int,
    RouterId,
    IpAddress,
    Opaque,
    AsPath,
    IntSet,
}

// Attribute value.
//
// Small fixed-size values are stored inline. Everything else is stored in
// an owned byte blob.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(EnumAsInner)]
#[derive(Deserialize, Serialize)]
pub enum AttrValue {
    Int(u32),
    RouterId(Ipv4Addr),
    Ip(Ipv4Addr),
    Opaque(Adata),
    AsPath(Adata),
    IntSet(Adata),
}

// Variable-length attribute data.
#[derive(Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct Adata(Box<[u8]>);

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct Attr {
    pub id: AttrId,
    pub flags: AttrFlags,
    pub value: AttrValue,
}

// Ordered list of attributes.
//
// Once sorted, attribute IDs are strictly increasing and unique.
#[derive(Clone, Debug, Default)]
#[derive(Deserialize, Serialize)]
pub struct AttrList {
    attrs: Vec<Attr>,
    sorted: bool,
}

// Chain of attribute lists, ordered from highest to lowest priority.
//
// Attributes from a list shadow attributes with the same ID from all lists
// that come after it.
#[derive(Clone, Debug, Default)]
pub struct AttrChain<'a> {
    lists: SmallVec<[&'a AttrList; 4]>,
}

// ===== impl AttrId =====

impl AttrId {
    pub const fn bgp(code: u8) -> AttrId {
        AttrId {
            proto: AttrProto::Bgp,
            code,
        }
    }

    // Returns the known BGP attribute type of this ID, if any.
    pub fn attr_type(&self) -> Option<AttrType> {
        if self.proto != AttrProto::Bgp {
            return None;
        }
        AttrType::from_u8(self.code)
    }
}

impl From<AttrType> for AttrId {
    fn from(attr_type: AttrType) -> AttrId {
        AttrId::bgp(attr_type as u8)
    }
}

impl std::fmt::Display for AttrId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}.{:02x}", self.proto, self.code)
    }
}

// ===== impl AttrKind =====

impl AttrKind {
    // Returns whether values of this type are stored inline.
    pub fn is_embedded(&self) -> bool {
        matches!(self, AttrKind::Int | AttrKind::RouterId | AttrKind::IpAddress)
    }
}

// ===== impl AttrValue =====

impl AttrValue {
    pub fn kind(&self) -> AttrKind {
        match self {
            AttrValue::Int(..) => AttrKind::Int,
            AttrValue::RouterId(..) => AttrKind::RouterId,
            AttrValue::Ip(..) => AttrKind::IpAddress,
            AttrValue::Opaque(..) => AttrKind::Opaque,
            AttrValue::AsPath(..) => AttrKind::AsPath,
            AttrValue::IntSet(..) => AttrKind::IntSet,
        }
    }

    // Returns the variable-length data of this value, if it isn't embedded.
    pub fn data(&self) -> Option<&Adata> {
        match self {
            AttrValue::Opaque(data)
            | AttrValue::AsPath(data)
            | AttrValue::IntSet(data) => Some(data),
            _ => None,
        }
    }

    fn decode(
        kind: AttrKind,
        mut buf: Bytes,
    ) -> Result<AttrValue, UpdateMessageError> {
        let value = match kind {
            AttrKind::Int if buf.len() == 1 => {
                AttrValue::Int(buf.try_get_u8()?.into())
            }
            AttrKind::Int => AttrValue::Int(buf.try_get_u32()?),
            AttrKind::RouterId => {
                AttrValue::RouterId(Ipv4Addr::from(buf.try_get_u32()?))
            }
            AttrKind::IpAddress => {
                AttrValue::Ip(Ipv4Addr::from(buf.try_get_u32()?))
            }
            AttrKind::Opaque => AttrValue::Opaque(Adata::decode(&buf)?),
            AttrKind::AsPath => AttrValue::AsPath(Adata::decode(&buf)?),
            AttrKind::IntSet => AttrValue::IntSet(Adata::decode(&buf)?),
        };

        Ok(value)
    }

    // Canonical byte representation used for hashing.
    fn hash_into(&self, hasher: &mut impl Hasher) {
        match self {
            AttrValue::Int(value) => hasher.write(&value.to_be_bytes()),
            AttrValue::RouterId(addr) | AttrValue::Ip(addr) => {
                hasher.write(&addr.octets())
            }
            AttrValue::Opaque(data)
            | AttrValue::AsPath(data)
            | AttrValue::IntSet(data) => {
                hasher.write(&data.len().to_be_bytes());
                hasher.write(data);
            }
        }
    }
}

// ===== impl Adata =====

impl Adata {
    // Largest value that can be carried in a path attribute.
    pub const MAX_LEN: usize = u16::MAX as usize;

    // Creates a new blob, failing if it's too large to fit in an attribute.
    pub fn new(data: impl Into<Box<[u8]>>) -> Option<Adata> {
        let data = data.into();
        (data.len() <= Self::MAX_LEN).then_some(Adata(data))
    }

    pub fn len(&self) -> u32 {
        self.0.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn decode(buf: &Bytes) -> Result<Adata, UpdateMessageError> {
        Adata::new(buf.as_ref())
            .ok_or(UpdateMessageError::MalformedAttributeList)
    }
}

impl std::ops::Deref for Adata {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Adata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Adata({:02x})", self.0.iter().format(""))
    }
}

// ===== impl Attr =====

impl Attr {
    // Creates a BGP attribute using the descriptor's flags.
    pub fn bgp(attr_type: AttrType, value: AttrValue) -> Attr {
        Attr {
            id: attr_type.into(),
            flags: desc::lookup_type(attr_type).flags,
            value,
        }
    }

    pub fn desc(&self) -> Option<&'static AttrDesc> {
        self.id.attr_type().map(desc::lookup_type)
    }

    fn value_len(&self) -> usize {
        match &self.value {
            AttrValue::Int(..) => match self.desc() {
                Some(desc) if desc.length == Some(1) => 1,
                _ => 4,
            },
            AttrValue::RouterId(..) | AttrValue::Ip(..) => 4,
            AttrValue::Opaque(data)
            | AttrValue::AsPath(data)
            | AttrValue::IntSet(data) => data.len() as usize,
        }
    }

    fn encode(&self, buf: &mut BytesMut) {
        let value_len = self.value_len();
        let mut flags = self.flags;
        if value_len > u8::MAX as usize {
            flags.insert(AttrFlags::EXTENDED);
        }

        buf.put_u8(flags.bits());
        buf.put_u8(self.id.code);
        if flags.contains(AttrFlags::EXTENDED) {
            buf.put_u16(value_len as u16);
        } else {
            buf.put_u8(value_len as u8);
        }

        match &self.value {
            AttrValue::Int(value) if value_len == 1 => buf.put_u8(*value as u8),
            AttrValue::Int(value) => buf.put_u32(*value),
            AttrValue::RouterId(addr) | AttrValue::Ip(addr) => {
                buf.put_u32((*addr).into())
            }
            AttrValue::Opaque(data)
            | AttrValue::AsPath(data)
            | AttrValue::IntSet(data) => buf.put_slice(data),
        }
    }
}

impl std::fmt::Display for Attr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.id.proto != AttrProto::Bgp {
            return write!(f, "{}", self.id);
        }

        match self.desc() {
            Some(desc) => {
                write!(f, "{}", desc.name)?;
                if let Some(format) = desc.format {
                    write!(f, ": ")?;
                    format(&self.value, f)?;
                }
            }
            None => {
                write!(f, "{:02x}", self.id.code)?;
                if self.flags.contains(AttrFlags::TRANSITIVE) {
                    write!(f, " [t]")?;
                }
            }
        }

        Ok(())
    }
}

// ===== impl AttrList =====

impl AttrList {
    //
    // Path attribute encoding format:
    //
    //  0                   1
    //  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |  Attr. Flags  |Attr. Type Code|
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |  Length (1 or 2 octets)       |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |  Value (variable)             |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    //
    // The 2-octet length is used when the Extended Length flag is set.
    //

    // Decodes the path attributes section of an UPDATE message.
    pub fn decode(
        buf: &mut Bytes,
        cxt: &DecodeCxt,
    ) -> Result<AttrList, UpdateMessageError> {
        let mut list = AttrList::default();

        // Codes of all attributes parsed so far.
        let mut seen = [false; 256];

        while buf.has_remaining() {
            let attr_start = buf.clone();

            // Parse attribute flags, type and length.
            let mut attr_flags =
                AttrFlags::from_bits_truncate(buf.try_get_u8()?);
            let attr_code = buf.try_get_u8()?;
            let attr_len = if attr_flags.contains(AttrFlags::EXTENDED) {
                buf.try_get_u16()? as usize
            } else {
                buf.try_get_u8()? as usize
            };
            if attr_len > buf.remaining() {
                return Err(UpdateMessageError::MalformedAttributeList);
            }
            let attr_value = buf.copy_to_bytes(attr_len);

            // The whole attribute (type, length and value), used as the
            // NOTIFICATION data of attribute-specific errors.
            let raw_attr =
                attr_start.slice(..attr_start.len() - buf.remaining());

            // RFC 4271 - Section 6.3:
            // "If any attribute appears more than once in the UPDATE message,
            // then the Error Subcode MUST be set to Malformed Attribute List".
            if seen[attr_code as usize] {
                return Err(UpdateMessageError::MalformedAttributeList);
            }

            let kind = match desc::lookup(attr_code) {
                // Known attribute.
                Some(desc) => {
                    if let Some(length) = desc.length
                        && length != attr_len
                    {
                        return Err(UpdateMessageError::AttributeLengthError(
                            raw_attr,
                        ));
                    }
                    let flags_mask =
                        AttrFlags::OPTIONAL | AttrFlags::TRANSITIVE;
                    if (attr_flags & flags_mask) != desc.flags {
                        return Err(UpdateMessageError::AttributeFlagsError(
                            raw_attr,
                        ));
                    }
                    if let Some(validate) = desc.validate
                        && let Err(error) = validate(cxt, &attr_value)
                    {
                        Debug::AttrMalformed(desc.attr_type, error)
                            .log();
                        match error.into_update_error(raw_attr) {
                            Some(error) => return Err(error),
                            None => continue,
                        }
                    }
                    desc.kind
                }
                // Unknown attribute.
                None => {
                    // RFC 4271 - Section 6.3:
                    // "If any of the well-known mandatory attributes are not
                    // recognized, then the Error Subcode MUST be set to
                    // Unrecognized Well-known Attribute. The Data field MUST
                    // contain the unrecognized attribute (type, length, and
                    // value)".
                    if !attr_flags.contains(AttrFlags::OPTIONAL) {
                        return Err(
                            UpdateMessageError::UnrecognizedWellKnownAttribute(
                                raw_attr,
                            ),
                        );
                    }

                    // RFC 4271 - Section 9:
                    // "If an optional transitive attribute is unrecognized,
                    // the Partial bit in the attribute flags octet is set to
                    // 1, and the attribute is retained for propagation to
                    // other BGP speakers".
                    if attr_flags.contains(AttrFlags::TRANSITIVE) {
                        attr_flags.insert(AttrFlags::PARTIAL);
                    }
                    AttrKind::Opaque
                }
            };
            seen[attr_code as usize] = true;

            let value = AttrValue::decode(kind, attr_value)?;
            list.push(Attr::new(AttrId::bgp(attr_code), attr_flags, value));
        }

        // Check for missing well-known attributes.
        if let Some(attr_type) = MANDATORY_ATTRS
            .into_iter()
            .find(|attr_type| !seen[*attr_type as usize])
        {
            return Err(UpdateMessageError::MissingWellKnownAttribute(
                attr_type,
            ));
        }

        // Use the default local preference when none was received.
        if !seen[AttrType::LocalPref as usize] {
            list.push(Attr::bgp(
                AttrType::LocalPref,
                AttrValue::Int(cxt.default_local_pref),
            ));
        }

        list.sort();
        Ok(list)
    }

    // Encodes all BGP attributes in list order.
    pub fn encode(&self, buf: &mut BytesMut) {
        for attr in self
            .attrs
            .iter()
            .filter(|attr| attr.id.proto == AttrProto::Bgp)
        {
            attr.encode(buf);
        }
    }

    pub fn push(&mut self, attr: Attr) {
        self.attrs.push(attr);
        self.sorted = false;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attr> {
        self.attrs.iter()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    // Returns the first attribute with the given ID.
    pub fn find(&self, id: AttrId) -> Option<&Attr> {
        if self.sorted {
            self.attrs
                .binary_search_by_key(&id, |attr| attr.id)
                .ok()
                .map(|pos| &self.attrs[pos])
        } else {
            self.attrs.iter().find(|attr| attr.id == id)
        }
    }

    // Returns the BGP attribute of the given type.
    pub fn get(&self, attr_type: AttrType) -> Option<&Attr> {
        self.find(attr_type.into())
    }

    // Sorts the list by attribute ID, keeping only the first occurrence of
    // each ID.
    pub fn sort(&mut self) {
        if self.sorted {
            return;
        }

        self.attrs.sort_by_key(|attr| attr.id);
        self.attrs.dedup_by_key(|attr| attr.id);
        self.sorted = true;
    }

    // Puts the list in canonical form.
    //
    // Integer sets are rewritten with their members sorted in ascending
    // order and without duplicates, so that permutations of the same set
    // compare equal.
    pub fn normalize(&mut self) {
        self.sort();

        for attr in &mut self.attrs {
            if let AttrValue::IntSet(data) = &mut attr.value
                && let Some(canonical) = canonical_int_set(data)
            {
                *data = canonical;
            }
        }
    }

    // Removes all attributes that don't belong to the given namespace.
    pub fn retain_proto(&mut self, proto: AttrProto) {
        self.attrs.retain(|attr| attr.id.proto == proto);
    }

    // Computes the hash of the list.
    //
    // Equal lists always hash to the same value. Only canonical lists are
    // guaranteed to hash equally when their contents are the same set.
    pub fn hash(&self) -> u32 {
        let mut hasher = XxHash32::with_seed(0);
        for attr in &self.attrs {
            hasher.write(&[
                attr.id.proto as u8,
                attr.id.code,
                attr.value.kind() as u8,
            ]);
            attr.value.hash_into(&mut hasher);
        }
        hasher.finish() as u32
    }

    // Deep comparison of two lists.
    pub fn same(&self, other: &AttrList) -> bool {
        self.attrs == other.attrs
    }
}

impl PartialEq for AttrList {
    fn eq(&self, other: &AttrList) -> bool {
        self.same(other)
    }
}

impl Eq for AttrList {}

impl PartialOrd for AttrList {
    fn partial_cmp(&self, other: &AttrList) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AttrList {
    fn cmp(&self, other: &AttrList) -> std::cmp::Ordering {
        self.attrs.cmp(&other.attrs)
    }
}

impl From<Vec<Attr>> for AttrList {
    fn from(attrs: Vec<Attr>) -> AttrList {
        AttrList {
            attrs,
            sorted: false,
        }
    }
}

impl FromIterator<Attr> for AttrList {
    fn from_iter<I: IntoIterator<Item = Attr>>(iter: I) -> AttrList {
        AttrList::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> IntoIterator for &'a AttrList {
    type Item = &'a Attr;
    type IntoIter = std::slice::Iter<'a, Attr>;

    fn into_iter(self) -> Self::IntoIter {
        self.attrs.iter()
    }
}

impl std::fmt::Display for AttrList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.attrs.iter().format(", "))
    }
}

// ===== impl AttrChain =====

impl<'a> AttrChain<'a> {
    pub fn new(high: &'a AttrList) -> AttrChain<'a> {
        let mut lists = SmallVec::new();
        lists.push(high);
        AttrChain { lists }
    }

    // Appends a list with lower priority than all lists already chained.
    pub fn push(&mut self, low: &'a AttrList) {
        self.lists.push(low);
    }

    #[must_use]
    pub fn with(mut self, low: &'a AttrList) -> AttrChain<'a> {
        self.push(low);
        self
    }

    // Returns the highest priority attribute with the given ID.
    pub fn find(&self, id: AttrId) -> Option<&'a Attr> {
        self.lists.iter().find_map(|list| list.find(id))
    }

    // Flattens the chain into a single sorted list.
    pub fn merge(&self) -> AttrList {
        let mut attrs = self
            .lists
            .iter()
            .flat_map(|list| list.attrs.iter())
            .collect::<Vec<_>>();

        // Stable sort: for equal IDs, higher priority attributes come first.
        attrs.sort_by_key(|attr| attr.id);
        attrs.dedup_by_key(|attr| attr.id);

        AttrList {
            attrs: attrs.into_iter().cloned().collect(),
            sorted: true,
        }
    }
}

impl<'a> FromIterator<&'a AttrList> for AttrChain<'a> {
    fn from_iter<I: IntoIterator<Item = &'a AttrList>>(iter: I) -> Self {
        AttrChain {
            lists: iter.into_iter().collect(),
        }
    }
}

// ===== helper functions =====

fn canonical_int_set(data: &Adata) -> Option<Adata> {
    if data.len() % 4 != 0 {
        return None;
    }

    let members = data
        .chunks_exact(4)
        .map(|member| {
            u32::from_be_bytes([member[0], member[1], member[2], member[3]])
        })
        .sorted()
        .dedup()
        .flat_map(u32::to_be_bytes)
        .collect::<Vec<_>>();
    Adata::new(members)
}
