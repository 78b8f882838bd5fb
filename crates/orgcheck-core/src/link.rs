//! Reference linker.
//!
//! Linking runs in two phases. First every id field is resolved against its
//! target store; this phase only reads and can run on the rayon pool. The
//! resulting `LinkPlan` is then applied sequentially, which is the only place
//! where a record's handle fields and another record's child lists are
//! written.
//!
//! Unresolved ids simply leave the handle empty; classifying them is the
//! validator's job.

use rayon::prelude::*;
use tracing::debug;

use crate::model::{Axis, FsRecord, Hierarchical, KuRecord, OeRecord, Record};
use crate::store::{EntityStore, Handle, Stores};

/// Resolved target per record, in store order, for every linked field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPlan {
    pub ku_parent: Vec<Option<Handle>>,
    pub fs_parent: Vec<Option<Handle>>,
    pub oe_legal: Vec<Option<Handle>>,
    pub oe_functional: Vec<Option<Handle>>,
    pub oe_ku: Vec<Option<Handle>>,
    pub oe_fs: Vec<Option<Handle>>,
}

/// Look up `id` in `target`. Empty ids never resolve.
pub fn resolve<T: Record>(target: &EntityStore<T>, id: &str) -> Option<Handle> {
    if id.is_empty() {
        None
    } else {
        target.handle_of(id)
    }
}

fn resolve_field<R, T, F>(
    source: &EntityStore<R>,
    target: &EntityStore<T>,
    field: F,
    parallel: bool,
) -> Vec<Option<Handle>>
where
    R: Record + Sync,
    T: Record + Sync,
    F: Fn(&R) -> &str + Sync,
{
    if parallel {
        source
            .records()
            .par_iter()
            .map(|r| resolve(target, field(r)))
            .collect()
    } else {
        source.iter().map(|r| resolve(target, field(r))).collect()
    }
}

/// Resolve every reference field of every record without touching the stores.
pub fn plan(stores: &Stores, parallel: bool) -> LinkPlan {
    let Stores { ku, fs, oe } = stores;

    if !parallel {
        return LinkPlan {
            ku_parent: resolve_field(ku, ku, KuRecord::parent_id, false),
            fs_parent: resolve_field(fs, fs, FsRecord::parent_id, false),
            oe_legal: resolve_field(oe, oe, legal_parent_id, false),
            oe_functional: resolve_field(oe, oe, functional_parent_id, false),
            oe_ku: resolve_field(oe, ku, ku_id, false),
            oe_fs: resolve_field(oe, fs, fs_id, false),
        };
    }

    // KU, FS and OE passes read disjoint fields, so they can be resolved
    // side by side.
    let ((ku_parent, fs_parent), ((oe_legal, oe_functional), (oe_ku, oe_fs))) = rayon::join(
        || {
            rayon::join(
                || resolve_field(ku, ku, KuRecord::parent_id, true),
                || resolve_field(fs, fs, FsRecord::parent_id, true),
            )
        },
        || {
            rayon::join(
                || {
                    rayon::join(
                        || resolve_field(oe, oe, legal_parent_id, true),
                        || resolve_field(oe, oe, functional_parent_id, true),
                    )
                },
                || {
                    rayon::join(
                        || resolve_field(oe, ku, ku_id, true),
                        || resolve_field(oe, fs, fs_id, true),
                    )
                },
            )
        },
    );

    LinkPlan {
        ku_parent,
        fs_parent,
        oe_legal,
        oe_functional,
        oe_ku,
        oe_fs,
    }
}

/// Write a plan into the stores: set handles and append to child lists.
///
/// Child lists end up in store order of the children.
pub fn apply(stores: &mut Stores, plan: LinkPlan) {
    apply_hierarchy(&mut stores.ku, plan.ku_parent);
    apply_hierarchy(&mut stores.fs, plan.fs_parent);
    apply_axis(&mut stores.oe, Axis::Legal, plan.oe_legal);
    apply_axis(&mut stores.oe, Axis::Functional, plan.oe_functional);

    for (i, target) in plan.oe_ku.into_iter().enumerate() {
        let Some(ku) = target else { continue };
        let oe = Handle::from_index(i);
        stores.oe[oe].ku = Some(ku);
        stores.ku[ku].related_oe.push(oe);
    }

    for (i, target) in plan.oe_fs.into_iter().enumerate() {
        let Some(fs) = target else { continue };
        let oe = Handle::from_index(i);
        stores.oe[oe].fs = Some(fs);
        stores.fs[fs].related_oe.push(oe);
    }
}

fn apply_hierarchy<R: Hierarchical>(store: &mut EntityStore<R>, parents: Vec<Option<Handle>>) {
    for (i, target) in parents.into_iter().enumerate() {
        let Some(parent) = target else { continue };
        let child = Handle::from_index(i);
        store[child].links_mut().parent = Some(parent);
        store[parent].links_mut().children.push(child);
    }
}

fn apply_axis(store: &mut EntityStore<OeRecord>, axis: Axis, parents: Vec<Option<Handle>>) {
    for (i, target) in parents.into_iter().enumerate() {
        let Some(parent) = target else { continue };
        let child = Handle::from_index(i);
        store[child].axis_mut(axis).parent = Some(parent);
        store[parent].axis_mut(axis).children.push(child);
    }
}

/// Resolve and materialise all links. Expects reset records.
pub fn link(stores: &mut Stores, parallel: bool) {
    let plan = plan(stores, parallel);
    debug!(
        ku_parents = resolved(&plan.ku_parent),
        fs_parents = resolved(&plan.fs_parent),
        oe_legal = resolved(&plan.oe_legal),
        oe_functional = resolved(&plan.oe_functional),
        oe_ku = resolved(&plan.oe_ku),
        oe_fs = resolved(&plan.oe_fs),
        "resolved references"
    );
    apply(stores, plan);
}

fn resolved(targets: &[Option<Handle>]) -> usize {
    targets.iter().filter(|t| t.is_some()).count()
}

fn legal_parent_id(r: &OeRecord) -> &str {
    r.parent_id(Axis::Legal)
}

fn functional_parent_id(r: &OeRecord) -> &str {
    r.parent_id(Axis::Functional)
}

fn ku_id(r: &OeRecord) -> &str {
    &r.ku_id
}

fn fs_id(r: &OeRecord) -> &str {
    &r.fs_id
}
