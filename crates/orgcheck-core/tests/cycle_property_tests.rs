use orgcheck_core::*;
use proptest::prelude::*;
use std::collections::BTreeSet;

const MAX_NODES: usize = 24;

/// Parent slot per node: `Some(i)` with `i < n` is an existing record,
/// `i >= n` a dangling id, `None` an empty field.
fn parents_strategy(n: usize) -> impl Strategy<Value = Vec<Option<usize>>> {
    prop::collection::vec(prop::option::of(0usize..n + 3), n)
}

fn id(prefix: &str, i: usize) -> String {
    format!("{prefix}{i}")
}

fn parent_id(prefix: &str, slot: Option<usize>) -> String {
    slot.map(|i| id(prefix, i)).unwrap_or_default()
}

/// Nodes from which following edges leads back to the node itself.
fn oracle(n: usize, edges: &[Vec<usize>]) -> BTreeSet<String> {
    let mut cyclic = BTreeSet::new();
    for start in 0..n {
        let mut seen = vec![false; n];
        let mut stack: Vec<usize> = edges[start].clone();
        while let Some(node) = stack.pop() {
            if node == start {
                cyclic.insert(id("oe", start));
                break;
            }
            if !seen[node] {
                seen[node] = true;
                stack.extend(edges[node].iter().copied());
            }
        }
    }
    cyclic
}

fn cyclic_ids<R: Record>(store: &EntityStore<R>) -> BTreeSet<String> {
    store
        .iter()
        .filter(|r| r.errors().iter().any(|e| e.kind == ErrorKind::CycleError))
        .map(|r| r.id().to_string())
        .collect()
}

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<Option<usize>>, Vec<Option<usize>>)> {
    (1usize..=MAX_NODES).prop_flat_map(|n| (Just(n), parents_strategy(n), parents_strategy(n)))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn oe_cycle_errors_match_reachability((n, legal, functional) in graph_strategy()) {
        let records = (0..n).map(|i| {
            OeRecord::new(id("oe", i))
                .with_ku("ku")
                .with_fs("fs")
                .with_parent_legal(parent_id("oe", legal[i]))
                .with_parent_functional(parent_id("oe", functional[i]))
        });
        let mut stores = Stores::from_records(
            [KuRecord::new("ku")],
            [FsRecord::new("fs")],
            records,
        ).unwrap();

        let parallel = n % 2 == 0;
        analyze(&mut stores, &AnalysisOptions { parallel });

        let edges: Vec<Vec<usize>> = (0..n)
            .map(|i| [legal[i], functional[i]].into_iter().flatten().filter(|&p| p < n).collect())
            .collect();
        prop_assert_eq!(cyclic_ids(&stores.oe), oracle(n, &edges));

        for record in stores.oe.iter() {
            let cycle_errors = record.errors.iter().filter(|e| e.kind == ErrorKind::CycleError).count();
            prop_assert!(cycle_errors <= 1);
        }
    }

    #[test]
    fn ku_findings_follow_field_contents((n, parents, _unused) in graph_strategy()) {
        let records = (0..n).map(|i| KuRecord::new(id("ku", i)).with_parent(parent_id("ku", parents[i])));
        let mut stores = Stores::from_records(records, [], []).unwrap();

        analyze(&mut stores, &AnalysisOptions::default());

        for (i, record) in stores.ku.iter().enumerate() {
            let dangling = record.errors.iter().filter(|e| e.kind == ErrorKind::NonExistingReference).count();
            let missing = record.errors.iter().filter(|e| e.kind == ErrorKind::MissingReference).count();
            prop_assert_eq!(missing, 0);
            prop_assert_eq!(dangling, usize::from(matches!(parents[i], Some(p) if p >= n)));
            prop_assert_eq!(record.links.parent.is_some(), matches!(parents[i], Some(p) if p < n));
        }

        // Every child list holds exactly the records pointing at its owner.
        for (handle, record) in stores.ku.entries() {
            for child in &record.links.children {
                prop_assert_eq!(stores.ku[*child].links.parent, Some(handle));
            }
        }
        let linked = stores.ku.iter().filter(|r| r.links.parent.is_some()).count();
        let children: usize = stores.ku.iter().map(|r| r.links.children.len()).sum();
        prop_assert_eq!(linked, children);
    }
}
