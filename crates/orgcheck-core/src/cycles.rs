//! Cycle detection over the parent graphs.
//!
//! A parent graph has one node per record and one edge from each record to
//! every parent it resolved to. KU and FS contribute at most one edge per
//! node; OE contributes the union of its legal and functional edges, so a
//! cycle may switch axes along the way.
//!
//! A record is cyclic when it lies on a directed cycle, i.e. when its strongly
//! connected component has more than one node or the record is its own
//! parent. Marking only the open path at each back edge is not enough: a node
//! whose cycle is closed through an already finished node would be missed.
//!
//! Components come from petgraph's Kosaraju SCC, whose depth-first passes
//! keep an explicit stack. Parent chains can be as deep as the store is
//! large, so nothing here may recurse per level.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::model::{Hierarchical, OeRecord, Record, ReferenceError};
use crate::store::{EntityStore, Handle, Stores};

/// Directed graph whose node `i` is the record at `Handle(i)`.
pub type ParentGraph = DiGraph<(), ()>;

/// Build a parent graph from up to two resolved parents per record.
pub fn parent_graph<R, F>(records: &[R], parents: F) -> ParentGraph
where
    F: Fn(&R) -> [Option<Handle>; 2],
{
    let mut graph = ParentGraph::with_capacity(records.len(), records.len());
    for _ in records {
        graph.add_node(());
    }
    for (i, record) in records.iter().enumerate() {
        for parent in parents(record).into_iter().flatten() {
            graph.add_edge(NodeIndex::new(i), NodeIndex::new(parent.index()), ());
        }
    }
    graph
}

pub fn hierarchy_graph<R: Hierarchical>(store: &EntityStore<R>) -> ParentGraph {
    parent_graph(store.records(), |r| [r.links().parent, None])
}

pub fn oe_graph(store: &EntityStore<OeRecord>) -> ParentGraph {
    parent_graph(store.records(), |r| [r.legal.parent, r.functional.parent])
}

/// Every node lying on a directed cycle, in ascending handle order.
pub fn cyclic_nodes(graph: &ParentGraph) -> Vec<Handle> {
    let mut cyclic: Vec<Handle> = kosaraju_scc(graph)
        .into_iter()
        .filter(|component| match component.as_slice() {
            [node] => graph.contains_edge(*node, *node),
            _ => true,
        })
        .flatten()
        .map(|node| Handle::from_index(node.index()))
        .collect();
    cyclic.sort_unstable();
    cyclic
}

/// Cyclic records per kind, as found by `detect_cycles`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub ku: Vec<Handle>,
    pub fs: Vec<Handle>,
    pub oe: Vec<Handle>,
}

impl CycleReport {
    pub fn compute(stores: &Stores, parallel: bool) -> Self {
        if parallel {
            let (ku, (fs, oe)) = rayon::join(
                || cyclic_nodes(&hierarchy_graph(&stores.ku)),
                || {
                    rayon::join(
                        || cyclic_nodes(&hierarchy_graph(&stores.fs)),
                        || cyclic_nodes(&oe_graph(&stores.oe)),
                    )
                },
            );
            Self { ku, fs, oe }
        } else {
            Self {
                ku: cyclic_nodes(&hierarchy_graph(&stores.ku)),
                fs: cyclic_nodes(&hierarchy_graph(&stores.fs)),
                oe: cyclic_nodes(&oe_graph(&stores.oe)),
            }
        }
    }
}

fn mark<R: Record>(store: &mut EntityStore<R>, cyclic: &[Handle]) {
    for &handle in cyclic {
        let record = &mut store[handle];
        let error = ReferenceError::cycle(R::KIND, record.id());
        record.errors_mut().push(error);
    }
}

/// Find cycles in all three parent graphs and append one `CycleError` per
/// cyclic record. Expects linked stores.
pub fn detect_cycles(stores: &mut Stores, parallel: bool) -> CycleReport {
    let report = CycleReport::compute(stores, parallel);
    mark(&mut stores.ku, &report.ku);
    mark(&mut stores.fs, &report.fs);
    mark(&mut stores.oe, &report.oe);

    debug!(
        ku = report.ku.len(),
        fs = report.fs.len(),
        oe = report.oe.len(),
        "detected cyclic records"
    );
    report
}
