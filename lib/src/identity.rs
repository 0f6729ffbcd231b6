// Copyright 2024 The Ledgertree Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Content addressing: deterministic digests over the canonical
//! serialization of any versioned entity (object, tree node, commit).

use std::fmt::{Debug, Error, Formatter};

use blake2::{Blake2b512, Digest};
pub use digest::Update as DigestUpdate;
pub use ledgertree_proc_macros::ContentHash;
use once_cell::sync::OnceCell;

/// Number of bytes an [`Address`] is truncated to. 32 bytes (256 bits) is
/// ample for collision resistance at this crate's scale while keeping hex
/// addresses short enough to log and key on.
pub const HASH_LENGTH: usize = 32;

/// Schema version tag available to store implementations that want to
/// stamp their serialized bytes. The in-memory model itself has no need of
/// it: field order is fixed by the struct declaration and maps are
/// `BTreeMap`s, so the canonical byte stream is already stable across
/// versions of this crate.
pub const SCHEMA_VERSION: u32 = 1;

/// Portable, stable hashing suitable for identifying values.
///
/// Variable-length sequences hash a 64-bit little-endian length prefix
/// followed by their elements in order. Maps hash their entries in `Ord`
/// order. Enums hash a 32-bit little-endian ordinal followed by the
/// variant's fields. Structs and enums normally derive this via
/// `#[derive(ContentHash)]`.
pub trait ContentHash {
    fn hash(&self, state: &mut impl DigestUpdate);
}

/// The content address of a versioned entity: a truncated BLAKE2b-512
/// digest of its canonical serialization.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(Vec<u8>);

impl Address {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(hex::decode(hex)?))
    }

    /// The fixed, well-known address of the canonical empty tree.
    pub fn empty_tree() -> Self {
        static EMPTY_TREE: OnceCell<Address> = OnceCell::new();
        EMPTY_TREE
            .get_or_init(|| hash(&crate::model::TreeNode::default()))
            .clone()
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        f.debug_tuple("Address").field(&self.hex()).finish()
    }
}

/// Computes the content address of any hashable entity.
pub fn hash(entity: &(impl ContentHash + ?Sized)) -> Address {
    let mut hasher = Blake2b512::default();
    entity.hash(&mut hasher);
    let digest = hasher.finalize();
    Address::from_bytes(&digest[..HASH_LENGTH])
}

impl ContentHash for () {
    fn hash(&self, _state: &mut impl DigestUpdate) {}
}

impl ContentHash for bool {
    fn hash(&self, state: &mut impl DigestUpdate) {
        u8::from(*self).hash(state);
    }
}

impl ContentHash for u8 {
    fn hash(&self, state: &mut impl DigestUpdate) {
        state.update(&[*self]);
    }
}

impl ContentHash for u32 {
    fn hash(&self, state: &mut impl DigestUpdate) {
        state.update(&self.to_le_bytes());
    }
}

impl ContentHash for u64 {
    fn hash(&self, state: &mut impl DigestUpdate) {
        state.update(&self.to_le_bytes());
    }
}

impl ContentHash for i64 {
    fn hash(&self, state: &mut impl DigestUpdate) {
        state.update(&self.to_le_bytes());
    }
}

impl ContentHash for str {
    fn hash(&self, state: &mut impl DigestUpdate) {
        self.as_bytes().hash(state);
    }
}

impl ContentHash for String {
    fn hash(&self, state: &mut impl DigestUpdate) {
        self.as_str().hash(state);
    }
}

impl<T: ContentHash> ContentHash for [T] {
    fn hash(&self, state: &mut impl DigestUpdate) {
        (self.len() as u64).hash(state);
        for item in self {
            item.hash(state);
        }
    }
}

impl<T: ContentHash> ContentHash for Vec<T> {
    fn hash(&self, state: &mut impl DigestUpdate) {
        self.as_slice().hash(state);
    }
}

impl<T: ContentHash> ContentHash for Option<T> {
    fn hash(&self, state: &mut impl DigestUpdate) {
        match self {
            None => 0u32.hash(state),
            Some(value) => {
                1u32.hash(state);
                value.hash(state);
            }
        }
    }
}

impl<K: ContentHash + Ord, V: ContentHash> ContentHash for std::collections::BTreeMap<K, V> {
    fn hash(&self, state: &mut impl DigestUpdate) {
        (self.len() as u64).hash(state);
        // BTreeMap already iterates in `Ord` order, giving a canonical,
        // implementation-independent byte stream.
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl ContentHash for Address {
    fn hash(&self, state: &mut impl DigestUpdate) {
        self.0.as_slice().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_hash_the_same() {
        let a = hash(&"hello".to_string());
        let b = hash(&"hello".to_string());
        assert_eq!(a, b);
    }

    #[test]
    fn different_bytes_hash_differently() {
        let a = hash(&"hello".to_string());
        let b = hash(&"world".to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn empty_tree_address_is_fixed() {
        let a = Address::empty_tree();
        let b = Address::empty_tree();
        assert_eq!(a, b);
    }

    #[test]
    fn map_ordering_does_not_affect_hash() {
        let mut m1 = std::collections::BTreeMap::new();
        m1.insert("a".to_string(), 1u64);
        m1.insert("b".to_string(), 2u64);
        let mut m2 = std::collections::BTreeMap::new();
        m2.insert("b".to_string(), 2u64);
        m2.insert("a".to_string(), 1u64);
        assert_eq!(hash(&m1), hash(&m2));
    }
}
