//! Dispatch indices owned by fused criteria.
//!
//! Both indices map a key to the positions of the member criteria interested
//! in it. Positions are `u32` offsets into the fused criterion's member list,
//! listed in registration order.
//!
//! ```text
//! BlockIndex
//!   block id ──► [Slot; 16]          (one slot per variant)
//!                  Empty             nothing registered
//!                  Single(m)         one member
//!                  Composite([m..])  several members, invoked in order
//!
//! KeyedIndex<K>
//!   key ──► [m..]
//! ```

use core::hash::Hash;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::BlockFilter;

/// Members registered for one (block id, variant) pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Slot {
    #[default]
    Empty,
    Single(u32),
    Composite(Box<[u32]>),
}

impl Slot {
    fn from_members(members: &[u32]) -> Self {
        match members {
            [] => Self::Empty,
            [single] => Self::Single(*single),
            many => Self::Composite(many.into()),
        }
    }

    /// Member positions, in registration order.
    #[inline]
    #[must_use]
    pub fn members(&self) -> &[u32] {
        match self {
            Self::Empty => &[],
            Self::Single(member) => core::slice::from_ref(member),
            Self::Composite(members) => members,
        }
    }
}

/// Two-level block id -> variant -> members index.
#[derive(Debug, Clone, Default)]
pub struct BlockIndex {
    by_id: FxHashMap<u16, Box<[Slot; 16]>>,
}

impl BlockIndex {
    /// Build from one filter per member, in member order.
    #[must_use]
    pub fn build(filters: impl IntoIterator<Item = BlockFilter>) -> Self {
        let mut staging: FxHashMap<u16, [SmallVec<[u32; 2]>; 16]> = FxHashMap::default();

        for (member, filter) in filters.into_iter().enumerate() {
            let member = member as u32;
            let slots = staging.entry(filter.id).or_default();
            match filter.meta {
                Some(meta) => slots[usize::from(meta & 0xF)].push(member),
                None => slots.iter_mut().for_each(|slot| slot.push(member)),
            }
        }

        let by_id = staging
            .into_iter()
            .map(|(id, slots)| {
                let compact: [Slot; 16] =
                    core::array::from_fn(|meta| Slot::from_members(&slots[meta]));
                (id, Box::new(compact))
            })
            .collect();

        Self { by_id }
    }

    /// Members matching a voxel. Empty when nothing is registered.
    #[inline]
    #[must_use]
    pub fn lookup(&self, id: u16, meta: u8) -> &[u32] {
        match self.by_id.get(&id) {
            Some(slots) => slots[usize::from(meta & 0xF)].members(),
            None => &[],
        }
    }

    /// Slot for a (block id, variant) pair, `None` if the id is not indexed.
    #[must_use]
    pub fn slot(&self, id: u16, meta: u8) -> Option<&Slot> {
        self.by_id
            .get(&id)
            .map(|slots| &slots[usize::from(meta & 0xF)])
    }

    /// Number of distinct block ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// One-level key -> members index.
#[derive(Debug, Clone)]
pub struct KeyedIndex<K> {
    by_key: FxHashMap<K, SmallVec<[u32; 4]>>,
}

impl<K: Hash + Eq> KeyedIndex<K> {
    /// Build from one key per member, in member order.
    #[must_use]
    pub fn build(keys: impl IntoIterator<Item = K>) -> Self {
        let mut by_key: FxHashMap<K, SmallVec<[u32; 4]>> = FxHashMap::default();
        for (member, key) in keys.into_iter().enumerate() {
            by_key.entry(key).or_default().push(member as u32);
        }
        Self { by_key }
    }

    /// Members registered for `key`, in registration order.
    #[inline]
    #[must_use]
    pub fn lookup<Q>(&self, key: &Q) -> &[u32]
    where
        K: core::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.by_key.get(key) {
            Some(members) => members,
            None => &[],
        }
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
