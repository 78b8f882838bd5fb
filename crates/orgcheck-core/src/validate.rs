//! Integrity validator: per-field classification of linked records.
//!
//! Each check only looks at one record's id field and the handle the linker
//! left next to it, so records are validated independently and, when asked
//! to, in parallel.

use rayon::prelude::*;
use tracing::debug;

use crate::model::{Axis, Hierarchical, OeRecord, Record, ReferenceError, ReferenceField};
use crate::store::{Handle, Stores};

/// Classify one reference field.
///
/// | id       | resolved | result                               |
/// |----------|----------|--------------------------------------|
/// | empty    | -        | `MissingReference` if required       |
/// | given    | no       | `NonExistingReference`               |
/// | given    | yes      | ok (cycles are checked separately)   |
pub fn classify(
    field: ReferenceField,
    id: &str,
    resolved: Option<Handle>,
) -> Option<ReferenceError> {
    if id.is_empty() {
        return field.is_required().then(|| ReferenceError::missing(field));
    }
    match resolved {
        Some(_) => None,
        None => Some(ReferenceError::non_existing(field, id)),
    }
}

fn validate_hierarchical<R: Hierarchical>(record: &mut R) {
    let finding = classify(R::PARENT_FIELD, record.parent_id(), record.links().parent);
    record.errors_mut().extend(finding);
}

fn validate_oe(record: &mut OeRecord) {
    let mut findings = Vec::new();
    findings.extend(classify(ReferenceField::OeKu, &record.ku_id, record.ku));
    findings.extend(classify(ReferenceField::OeFs, &record.fs_id, record.fs));
    for axis in Axis::ALL {
        findings.extend(classify(
            axis.field(),
            record.parent_id(axis),
            record.axis(axis).parent,
        ));
    }
    record.errors.extend(findings);
}

fn for_each_record<R, F>(records: &mut [R], parallel: bool, f: F)
where
    R: Send,
    F: Fn(&mut R) + Sync + Send,
{
    if parallel {
        records.par_iter_mut().for_each(f);
    } else {
        records.iter_mut().for_each(f);
    }
}

/// Append reference findings to every record. Expects linked stores.
pub fn validate(stores: &mut Stores, parallel: bool) {
    for_each_record(stores.ku.records_mut(), parallel, validate_hierarchical);
    for_each_record(stores.fs.records_mut(), parallel, validate_hierarchical);
    for_each_record(stores.oe.records_mut(), parallel, validate_oe);

    debug!(
        ku = with_errors(stores.ku.iter()),
        fs = with_errors(stores.fs.iter()),
        oe = with_errors(stores.oe.iter()),
        "validated references"
    );
}

fn with_errors<'a, R: Record + 'a>(records: impl Iterator<Item = &'a R>) -> usize {
    records.filter(|r| !r.errors().is_empty()).count()
}
