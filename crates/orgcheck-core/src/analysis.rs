//! Full analysis: reset, link, validate, detect cycles.

use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::cycles::detect_cycles;
use crate::link::link;
use crate::model::{EntityKind, Record, ReferenceError};
use crate::store::{EntityStore, Stores};
use crate::validate::validate;

/// Knobs for `analyze`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Resolve, validate and detect cycles on the rayon pool. Results are
    /// identical to a sequential run.
    pub parallel: bool,
}

/// Per-kind outcome of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSummary {
    pub records: usize,
    pub records_with_errors: usize,
    pub cyclic: usize,
}

impl KindSummary {
    fn of<R: Record>(store: &EntityStore<R>, cyclic: usize) -> Self {
        Self {
            records: store.len(),
            records_with_errors: store.iter().filter(|r| !r.errors().is_empty()).count(),
            cyclic,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub ku: KindSummary,
    pub fs: KindSummary,
    pub oe: KindSummary,
}

impl AnalysisSummary {
    pub fn records_with_errors(&self) -> usize {
        self.ku.records_with_errors + self.fs.records_with_errors + self.oe.records_with_errors
    }

    pub fn is_clean(&self) -> bool {
        self.records_with_errors() == 0
    }
}

/// Run the whole pipeline over `stores`.
///
/// Links and findings from earlier runs are discarded first, so analysing
/// the same stores twice yields the same findings.
pub fn analyze(stores: &mut Stores, options: &AnalysisOptions) -> AnalysisSummary {
    let span = info_span!("analyze", parallel = options.parallel);
    let _enter = span.enter();

    stores.reset_analysis();
    link(stores, options.parallel);
    validate(stores, options.parallel);
    let cycles = detect_cycles(stores, options.parallel);

    let summary = AnalysisSummary {
        ku: KindSummary::of(&stores.ku, cycles.ku.len()),
        fs: KindSummary::of(&stores.fs, cycles.fs.len()),
        oe: KindSummary::of(&stores.oe, cycles.oe.len()),
    };
    info!(
        ku = summary.ku.records,
        fs = summary.fs.records,
        oe = summary.oe.records,
        with_errors = summary.records_with_errors(),
        "analysis finished"
    );
    summary
}

/// One error together with the record it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Finding<'a> {
    pub entity: EntityKind,
    pub id: &'a str,
    pub name: &'a str,
    pub error: &'a ReferenceError,
}

fn findings_of<R: Record>(store: &EntityStore<R>) -> impl Iterator<Item = Finding<'_>> + '_ {
    store.iter().flat_map(|record| {
        record.errors().iter().map(move |error| Finding {
            entity: R::KIND,
            id: record.id(),
            name: record.display_name(),
            error,
        })
    })
}

impl Stores {
    /// All findings, OE first, then KU, then FS; insertion order within a
    /// kind.
    pub fn findings(&self) -> impl Iterator<Item = Finding<'_>> + '_ {
        findings_of(&self.oe)
            .chain(findings_of(&self.ku))
            .chain(findings_of(&self.fs))
    }
}
