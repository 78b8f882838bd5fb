//! Record types for the three hierarchies and the findings attached to them.
//!
//! Records are created once by a producer (see `orgcheck-ingest-xml`) and are
//! afterwards only touched by the analysis passes: the linker fills the
//! `Handle` fields, the validator and cycle detector append to `errors`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::Handle;

// ============================================================================
// Vocabulary
// ============================================================================

/// The three record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Management unit (Konzernunternehmen).
    #[serde(rename = "KU")]
    Ku,
    /// Functional structure (Führungsstruktur).
    #[serde(rename = "FS")]
    Fs,
    /// Organizational entity.
    #[serde(rename = "OE")]
    Oe,
}

impl EntityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::Ku => "KU",
            EntityKind::Fs => "FS",
            EntityKind::Oe => "OE",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a broken reference. Callers branch on this; the message
/// next to it is for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A required id field is empty.
    MissingReference,
    /// An id is given but no record with that id exists.
    NonExistingReference,
    /// The record lies on a cycle of its parent graph.
    CycleError,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MissingReference => "MissingReference",
            ErrorKind::NonExistingReference => "NonExistingReference",
            ErrorKind::CycleError => "CycleError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every reference field the validator checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceField {
    KuParent,
    FsParent,
    OeKu,
    OeFs,
    OeParentLegal,
    OeParentFunctional,
}

impl ReferenceField {
    /// Only the KU and FS links of an OE must be populated.
    pub const fn is_required(self) -> bool {
        matches!(self, ReferenceField::OeKu | ReferenceField::OeFs)
    }

    pub const fn label(self) -> &'static str {
        match self {
            ReferenceField::KuParent | ReferenceField::FsParent => "parent",
            ReferenceField::OeKu => "KU",
            ReferenceField::OeFs => "FS",
            ReferenceField::OeParentLegal => "parent (legal)",
            ReferenceField::OeParentFunctional => "parent (functional)",
        }
    }

    /// Kind of the record holding the field.
    pub const fn owner(self) -> EntityKind {
        match self {
            ReferenceField::KuParent => EntityKind::Ku,
            ReferenceField::FsParent => EntityKind::Fs,
            _ => EntityKind::Oe,
        }
    }

    /// Kind of the record the field points at.
    pub const fn target(self) -> EntityKind {
        match self {
            ReferenceField::KuParent | ReferenceField::OeKu => EntityKind::Ku,
            ReferenceField::FsParent | ReferenceField::OeFs => EntityKind::Fs,
            ReferenceField::OeParentLegal | ReferenceField::OeParentFunctional => EntityKind::Oe,
        }
    }
}

/// A finding attached to the record it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceError {
    pub kind: ErrorKind,
    /// `None` for cycle errors, which concern the record as a whole.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<ReferenceField>,
    pub message: String,
}

impl ReferenceError {
    pub fn missing(field: ReferenceField) -> Self {
        Self {
            kind: ErrorKind::MissingReference,
            field: Some(field),
            message: format!("missing {} reference", field.label()),
        }
    }

    pub fn non_existing(field: ReferenceField, id: &str) -> Self {
        Self {
            kind: ErrorKind::NonExistingReference,
            field: Some(field),
            message: format!("non-existing {} '{}'", field.label(), id),
        }
    }

    pub fn cycle(kind: EntityKind, id: &str) -> Self {
        Self {
            kind: ErrorKind::CycleError,
            field: None,
            message: format!("{kind} hierarchy cycle through '{id}'"),
        }
    }
}

impl fmt::Display for ReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

// ============================================================================
// Links
// ============================================================================

/// Parent pointer plus child collection along one hierarchy axis.
///
/// Both directions are non-owning handles into the same store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyLinks {
    pub parent: Option<Handle>,
    pub children: Vec<Handle>,
}

impl HierarchyLinks {
    pub fn clear(&mut self) {
        self.parent = None;
        self.children.clear();
    }
}

/// The two independent parent axes of an OE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Legal,
    Functional,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Legal, Axis::Functional];

    pub const fn field(self) -> ReferenceField {
        match self {
            Axis::Legal => ReferenceField::OeParentLegal,
            Axis::Functional => ReferenceField::OeParentFunctional,
        }
    }
}

/// Validity range of a record (`GAB`/`GBIS` in the exports).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validity {
    pub from: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
}

// ============================================================================
// Records
// ============================================================================

/// Common surface of KU, FS and OE records, used by the store and the
/// analysis passes.
pub trait Record {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Human-facing name used in reports.
    fn display_name(&self) -> &str;

    fn errors(&self) -> &[ReferenceError];

    fn errors_mut(&mut self) -> &mut Vec<ReferenceError>;

    /// Drop links and findings from a previous analysis run.
    fn reset_analysis(&mut self);
}

/// Records forming a single self-referential parent tree (KU and FS).
pub trait Hierarchical: Record {
    const PARENT_FIELD: ReferenceField;

    fn parent_id(&self) -> &str;

    fn links(&self) -> &HierarchyLinks;

    fn links_mut(&mut self) -> &mut HierarchyLinks;
}

/// Management unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KuRecord {
    pub id: String,
    pub parent_id: String,
    pub name: String,
    pub depth: i64,
    pub validity: Validity,
    pub links: HierarchyLinks,
    /// OE records whose KU id resolved to this unit.
    pub related_oe: Vec<Handle>,
    pub errors: Vec<ReferenceError>,
}

impl KuRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = parent_id.into();
        self
    }
}

impl Record for KuRecord {
    const KIND: EntityKind = EntityKind::Ku;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn errors(&self) -> &[ReferenceError] {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Vec<ReferenceError> {
        &mut self.errors
    }

    fn reset_analysis(&mut self) {
        self.links.clear();
        self.related_oe.clear();
        self.errors.clear();
    }
}

impl Hierarchical for KuRecord {
    const PARENT_FIELD: ReferenceField = ReferenceField::KuParent;

    fn parent_id(&self) -> &str {
        &self.parent_id
    }

    fn links(&self) -> &HierarchyLinks {
        &self.links
    }

    fn links_mut(&mut self) -> &mut HierarchyLinks {
        &mut self.links
    }
}

/// Functional structure node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FsRecord {
    pub id: String,
    pub parent_id: String,
    pub short_name: String,
    pub name: String,
    pub depth: i64,
    pub validity: Validity,
    pub links: HierarchyLinks,
    /// OE records whose FS id resolved to this node.
    pub related_oe: Vec<Handle>,
    pub errors: Vec<ReferenceError>,
}

impl FsRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = parent_id.into();
        self
    }
}

impl Record for FsRecord {
    const KIND: EntityKind = EntityKind::Fs;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn errors(&self) -> &[ReferenceError] {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Vec<ReferenceError> {
        &mut self.errors
    }

    fn reset_analysis(&mut self) {
        self.links.clear();
        self.related_oe.clear();
        self.errors.clear();
    }
}

impl Hierarchical for FsRecord {
    const PARENT_FIELD: ReferenceField = ReferenceField::FsParent;

    fn parent_id(&self) -> &str {
        &self.parent_id
    }

    fn links(&self) -> &HierarchyLinks {
        &self.links
    }

    fn links_mut(&mut self) -> &mut HierarchyLinks {
        &mut self.links
    }
}

/// Descriptive OE attributes carried through for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OeDetails {
    pub ps_id: i64,
    pub fs_start: i64,
    pub validity: Validity,
    /// `Typ`, e.g. "Regionalbereich".
    pub kind: String,
    pub ku_name: String,
    pub fs_name: String,
    /// `Org-Kz`, the short organisational code.
    pub org_code: String,
    pub org_names: [String; 3],
    pub location: String,
    pub company_names: [String; 2],
}

/// Organizational entity with a KU link, an FS link and two parent axes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OeRecord {
    pub id: String,
    pub ku_id: String,
    pub fs_id: String,
    pub parent_legal_id: String,
    pub parent_functional_id: String,
    pub details: OeDetails,
    pub ku: Option<Handle>,
    pub fs: Option<Handle>,
    pub legal: HierarchyLinks,
    pub functional: HierarchyLinks,
    pub errors: Vec<ReferenceError>,
}

impl OeRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_ku(mut self, ku_id: impl Into<String>) -> Self {
        self.ku_id = ku_id.into();
        self
    }

    pub fn with_fs(mut self, fs_id: impl Into<String>) -> Self {
        self.fs_id = fs_id.into();
        self
    }

    pub fn with_parent_legal(mut self, id: impl Into<String>) -> Self {
        self.parent_legal_id = id.into();
        self
    }

    pub fn with_parent_functional(mut self, id: impl Into<String>) -> Self {
        self.parent_functional_id = id.into();
        self
    }

    pub fn parent_id(&self, axis: Axis) -> &str {
        match axis {
            Axis::Legal => &self.parent_legal_id,
            Axis::Functional => &self.parent_functional_id,
        }
    }

    pub fn axis(&self, axis: Axis) -> &HierarchyLinks {
        match axis {
            Axis::Legal => &self.legal,
            Axis::Functional => &self.functional,
        }
    }

    pub fn axis_mut(&mut self, axis: Axis) -> &mut HierarchyLinks {
        match axis {
            Axis::Legal => &mut self.legal,
            Axis::Functional => &mut self.functional,
        }
    }
}

impl Record for OeRecord {
    const KIND: EntityKind = EntityKind::Oe;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.details.org_code
    }

    fn errors(&self) -> &[ReferenceError] {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Vec<ReferenceError> {
        &mut self.errors
    }

    fn reset_analysis(&mut self) {
        self.ku = None;
        self.fs = None;
        self.legal.clear();
        self.functional.clear();
        self.errors.clear();
    }
}
