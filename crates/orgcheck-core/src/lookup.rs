//! Point lookup for a single OE.
//!
//! Resolves the four reference fields of one (possibly not yet stored) OE
//! directly against the stores. Nothing is linked, validated or written, and
//! no cycle detection runs; this is for inspecting a record before or
//! without a full analysis.

use crate::model::{FsRecord, KuRecord, OeRecord, Record};
use crate::store::EntityStore;

/// Outcome of resolving one id field.
#[derive(Debug)]
pub struct ResolvedRef<'a, T> {
    /// The target record, if the id was given and found.
    pub record: Option<&'a T>,
    /// Whether the id field was populated at all.
    pub has_ref: bool,
}

impl<T> Clone for ResolvedRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ResolvedRef<'_, T> {}

impl<'a, T: Record> ResolvedRef<'a, T> {
    fn resolve(store: &'a EntityStore<T>, id: &str) -> Self {
        if id.is_empty() {
            Self {
                record: None,
                has_ref: false,
            }
        } else {
            Self {
                record: store.by_id(id),
                has_ref: true,
            }
        }
    }

    /// An id was given but does not exist.
    pub fn is_dangling(&self) -> bool {
        self.has_ref && self.record.is_none()
    }

    pub fn id(&self) -> Option<&'a str> {
        self.record.map(Record::id)
    }
}

/// Resolved references of one OE.
#[derive(Debug, Clone, Copy)]
pub struct OeLookup<'a> {
    pub parent_legal: ResolvedRef<'a, OeRecord>,
    pub parent_functional: ResolvedRef<'a, OeRecord>,
    pub fs: ResolvedRef<'a, FsRecord>,
    pub ku: ResolvedRef<'a, KuRecord>,
}

/// Resolve `oe`'s references against the three stores.
pub fn lookup_oe<'a>(
    oe: &OeRecord,
    ku: &'a EntityStore<KuRecord>,
    fs: &'a EntityStore<FsRecord>,
    oes: &'a EntityStore<OeRecord>,
) -> OeLookup<'a> {
    OeLookup {
        parent_legal: ResolvedRef::resolve(oes, &oe.parent_legal_id),
        parent_functional: ResolvedRef::resolve(oes, &oe.parent_functional_id),
        fs: ResolvedRef::resolve(fs, &oe.fs_id),
        ku: ResolvedRef::resolve(ku, &oe.ku_id),
    }
}

impl crate::store::Stores {
    /// `lookup_oe` against these stores.
    pub fn lookup_oe(&self, oe: &OeRecord) -> OeLookup<'_> {
        lookup_oe(oe, &self.ku, &self.fs, &self.oe)
    }
}
