//! Entity stores: insertion-ordered arenas of records indexed by id.
//!
//! Links between records are `Handle`s (slot indices) rather than owning
//! pointers, so parent/child back-links and cycles in the data never turn
//! into ownership cycles.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};
use thiserror::Error;

use crate::model::{EntityKind, FsRecord, KuRecord, OeRecord, Record};

/// Slot of a record inside its `EntityStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Handle(u32);

impl Handle {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Only for indices of stored records; `EntityStore::insert` keeps every
    /// store within `u32` range.
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    fn next(len: usize, kind: EntityKind) -> Result<Self, StoreError> {
        u32::try_from(len)
            .map(Self)
            .map_err(|_| StoreError::Full { kind })
    }
}

/// Input that violates the producer contract (non-empty, unique ids).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} record with empty id")]
    EmptyId { kind: EntityKind },
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: EntityKind, id: String },
    #[error("{kind} store is full")]
    Full { kind: EntityKind },
}

/// Records of one kind, addressable by `Handle` and by id.
#[derive(Debug, Clone)]
pub struct EntityStore<R> {
    records: Vec<R>,
    index: HashMap<String, Handle>,
}

impl<R> Default for EntityStore<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<R: Record> EntityStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = R>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Add a record, returning its handle.
    pub fn insert(&mut self, record: R) -> Result<Handle, StoreError> {
        let id = record.id();
        if id.is_empty() {
            return Err(StoreError::EmptyId { kind: R::KIND });
        }
        if self.index.contains_key(id) {
            return Err(StoreError::DuplicateId {
                kind: R::KIND,
                id: id.to_string(),
            });
        }

        let handle = Handle::next(self.records.len(), R::KIND)?;
        self.index.insert(id.to_string(), handle);
        self.records.push(record);
        Ok(handle)
    }

    pub fn get(&self, handle: Handle) -> Option<&R> {
        self.records.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut R> {
        self.records.get_mut(handle.index())
    }

    pub fn handle_of(&self, id: &str) -> Option<Handle> {
        self.index.get(id).copied()
    }

    pub fn by_id(&self, id: &str) -> Option<&R> {
        self.handle_of(id).and_then(|h| self.get(h))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, R> {
        self.records.iter_mut()
    }

    /// `(handle, record)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (Handle, &R)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (Handle::from_index(i), r))
    }

    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        (0..self.records.len()).map(Handle::from_index)
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [R] {
        &mut self.records
    }
}

impl<R> Index<Handle> for EntityStore<R> {
    type Output = R;

    fn index(&self, handle: Handle) -> &R {
        &self.records[handle.index()]
    }
}

impl<R> IndexMut<Handle> for EntityStore<R> {
    fn index_mut(&mut self, handle: Handle) -> &mut R {
        &mut self.records[handle.index()]
    }
}

/// The three stores analysed together.
#[derive(Debug, Clone, Default)]
pub struct Stores {
    pub ku: EntityStore<KuRecord>,
    pub fs: EntityStore<FsRecord>,
    pub oe: EntityStore<OeRecord>,
}

impl Stores {
    pub fn new(
        ku: EntityStore<KuRecord>,
        fs: EntityStore<FsRecord>,
        oe: EntityStore<OeRecord>,
    ) -> Self {
        Self { ku, fs, oe }
    }

    pub fn from_records(
        ku: impl IntoIterator<Item = KuRecord>,
        fs: impl IntoIterator<Item = FsRecord>,
        oe: impl IntoIterator<Item = OeRecord>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            ku: EntityStore::from_records(ku)?,
            fs: EntityStore::from_records(fs)?,
            oe: EntityStore::from_records(oe)?,
        })
    }

    /// Forget links and findings of a previous run.
    pub fn reset_analysis(&mut self) {
        self.ku.iter_mut().for_each(Record::reset_analysis);
        self.fs.iter_mut().for_each(Record::reset_analysis);
        self.oe.iter_mut().for_each(Record::reset_analysis);
    }
}
