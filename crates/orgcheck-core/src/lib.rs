//! orgcheck core: referential integrity of KU/FS/OE hierarchies
//!
//! Given flat stores of records that only carry string ids, this crate
//! reconstructs the implied graphs and classifies every reference:
//!
//! - **store**: id-indexed arenas (`EntityStore`, `Stores`)
//! - **link**: resolves id fields into parent handles and child lists
//! - **validate**: `MissingReference` / `NonExistingReference` per field
//! - **cycles**: `CycleError` for records on a parent-graph cycle (KU, FS,
//!   and OE over the union of its legal and functional axes)
//! - **lookup**: side-effect-free resolution of a single OE
//!
//! `analysis::analyze` runs the whole pipeline. Broken references are
//! findings attached to records, never `Err` values.

pub mod analysis;
pub mod cycles;
pub mod link;
pub mod lookup;
pub mod model;
pub mod store;
pub mod validate;

pub use analysis::{analyze, AnalysisOptions, AnalysisSummary, Finding, KindSummary};
pub use lookup::{lookup_oe, OeLookup, ResolvedRef};
pub use model::{
    Axis, EntityKind, ErrorKind, FsRecord, Hierarchical, HierarchyLinks, KuRecord, OeDetails,
    OeRecord, Record, ReferenceError, ReferenceField, Validity,
};
pub use store::{EntityStore, Handle, StoreError, Stores};
