//! `ResourceSet` — the requirement set a behavior declares.
//!
//! A plain `u64` bitmask indexed by `ResourceId`.  Exclusivity checks are a
//! single AND, union is a single OR, and the set is `Copy`, so behaviors can
//! hand it around freely.

use std::fmt;

use arb_core::ResourceId;

/// Highest number of resources one table may hold.
pub const MAX_RESOURCES: usize = 64;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceSet {
    bits: u64,
}

impl ResourceSet {
    pub const EMPTY: ResourceSet = ResourceSet { bits: 0 };

    pub fn new() -> Self {
        Self::EMPTY
    }

    /// A set holding exactly `id`.
    pub fn single(id: ResourceId) -> Self {
        let mut set = Self::EMPTY;
        set.insert(id);
        set
    }

    /// Insert `id`.  Ids at or beyond [`MAX_RESOURCES`] are ignored; the
    /// table builder never hands those out.
    pub fn insert(&mut self, id: ResourceId) {
        if id.index() < MAX_RESOURCES {
            self.bits |= 1u64 << id.index();
        }
    }

    pub fn remove(&mut self, id: ResourceId) {
        if id.index() < MAX_RESOURCES {
            self.bits &= !(1u64 << id.index());
        }
    }

    #[inline]
    pub fn contains(self, id: ResourceId) -> bool {
        id.index() < MAX_RESOURCES && self.bits & (1u64 << id.index()) != 0
    }

    /// `true` if the two sets share at least one resource.
    #[inline]
    pub fn intersects(self, other: ResourceSet) -> bool {
        self.bits & other.bits != 0
    }

    #[inline]
    pub fn union(self, other: ResourceSet) -> ResourceSet {
        ResourceSet { bits: self.bits | other.bits }
    }

    #[inline]
    pub fn intersection(self, other: ResourceSet) -> ResourceSet {
        ResourceSet { bits: self.bits & other.bits }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[inline]
    pub fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Members in ascending id order.
    pub fn iter(self) -> impl Iterator<Item = ResourceId> {
        (0..MAX_RESOURCES as u16)
            .filter(move |&i| self.bits & (1u64 << i) != 0)
            .map(ResourceId)
    }
}

impl FromIterator<ResourceId> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = ResourceId>>(iter: I) -> Self {
        let mut set = ResourceSet::EMPTY;
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl From<ResourceId> for ResourceSet {
    fn from(id: ResourceId) -> Self {
        ResourceSet::single(id)
    }
}

impl<const N: usize> From<[ResourceId; N]> for ResourceSet {
    fn from(ids: [ResourceId; N]) -> Self {
        ids.into_iter().collect()
    }
}

impl fmt::Debug for ResourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|id| id.0)).finish()
    }
}
