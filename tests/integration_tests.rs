//! Integration tests for the complete orgcheck pipeline
//!
//! XML exports on disk -> entity stores -> analysis -> findings / lookup.
//!
//! Run with: cargo test --test integration_tests

use std::fs;
use std::path::Path;
use tempfile::tempdir;

use orgcheck_core::*;
use orgcheck_ingest_xml::{load_stores, ExportPaths};

const KU_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<vw_KU>
    <KU s_NODE_KU_ID="ku-root" DEPTH="0" GAB="1900-01-01T00:00:00" GBIS="9999-12-31T00:00:00" KULANG="DB AG" />
    <KU s_NODE_KU_ID="ku-station" s_NODE_PARENT_ID="ku-root" DEPTH="1" KULANG="DB Station&amp;Service AG" />
    <KU s_NODE_KU_ID="ku-orphan" s_NODE_PARENT_ID="ku-gone" DEPTH="1" KULANG="Verwaist" />
</vw_KU>"#;

const FS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<vw_FS>
    <FS s_NODE_FS_ID="fs-a" s_NODE_PARENT_ID="fs-b" DEPTH="1" FS_KURZ="a" FSLANG="Bereich A" />
    <FS s_NODE_FS_ID="fs-b" s_NODE_PARENT_ID="fs-a" DEPTH="1" FS_KURZ="b" FSLANG="Bereich B" />
    <FS s_NODE_FS_ID="fs-root" DEPTH="0" FS_KURZ="root" FSLANG="Vorstand" />
</vw_FS>"#;

const OE_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<OETBL>
    <OE s_OE_ID="oe-head" s_KU_ID="ku-root" s_FS_ID="fs-root" Org-Kz="V" PS_OEID="1" />
    <OE s_OE_ID="oe-region" s_KU_ID="ku-station" s_FS_ID="fs-root"
        s_PARENTOE_L_ID="oe-head" s_PARENTOE_F_ID="oe-head" Org-Kz="I.SV-O" PS_OEID="7433" />
    <OE s_OE_ID="oe-broken" s_FS_ID="fs-nowhere" s_PARENTOE_L_ID="oe-lost" Org-Kz="X" />
</OETBL>"#;

fn write_exports(dir: &Path) -> ExportPaths {
    let paths = ExportPaths {
        ku: dir.join("XML_KU.xml"),
        fs: dir.join("XML_FS.xml"),
        oe: dir.join("XML_OE.xml"),
    };
    fs::write(&paths.ku, KU_XML).unwrap();
    fs::write(&paths.fs, FS_XML).unwrap();
    fs::write(&paths.oe, OE_XML).unwrap();
    paths
}

fn error_kinds<R: Record>(store: &EntityStore<R>, id: &str) -> Vec<ErrorKind> {
    store
        .by_id(id)
        .unwrap()
        .errors()
        .iter()
        .map(|e| e.kind)
        .collect()
}

// ============================================================================
// Load -> analyze
// ============================================================================

#[test]
fn test_pipeline_findings() {
    let dir = tempdir().unwrap();
    let mut stores = load_stores(&write_exports(dir.path())).unwrap();

    let summary = analyze(&mut stores, &AnalysisOptions::default());
    assert_eq!(summary.ku.records, 3);
    assert_eq!(summary.fs.cyclic, 2);
    assert_eq!(summary.oe.records_with_errors, 1);
    assert_eq!(summary.records_with_errors(), 4);

    assert!(error_kinds(&stores.ku, "ku-root").is_empty());
    assert!(error_kinds(&stores.ku, "ku-station").is_empty());
    assert_eq!(
        error_kinds(&stores.ku, "ku-orphan"),
        vec![ErrorKind::NonExistingReference]
    );
    assert_eq!(error_kinds(&stores.fs, "fs-a"), vec![ErrorKind::CycleError]);
    assert_eq!(error_kinds(&stores.fs, "fs-b"), vec![ErrorKind::CycleError]);
    assert_eq!(
        error_kinds(&stores.oe, "oe-broken"),
        vec![
            ErrorKind::MissingReference,
            ErrorKind::NonExistingReference,
            ErrorKind::NonExistingReference,
        ]
    );

    let order: Vec<_> = stores
        .findings()
        .map(|f| (f.entity, f.id.to_string()))
        .collect();
    assert_eq!(
        order,
        vec![
            (EntityKind::Oe, "oe-broken".to_string()),
            (EntityKind::Oe, "oe-broken".to_string()),
            (EntityKind::Oe, "oe-broken".to_string()),
            (EntityKind::Ku, "ku-orphan".to_string()),
            (EntityKind::Fs, "fs-a".to_string()),
            (EntityKind::Fs, "fs-b".to_string()),
        ]
    );
}

#[test]
fn test_pipeline_links() {
    let dir = tempdir().unwrap();
    let mut stores = load_stores(&write_exports(dir.path())).unwrap();
    analyze(&mut stores, &AnalysisOptions { parallel: true });

    let head = stores.oe.handle_of("oe-head").unwrap();
    let region = stores.oe.handle_of("oe-region").unwrap();
    assert_eq!(stores.oe[head].legal.children, vec![region]);
    assert_eq!(stores.oe[head].functional.children, vec![region]);

    let station = stores.ku.by_id("ku-station").unwrap();
    assert_eq!(station.related_oe, vec![region]);
    assert_eq!(station.name, "DB Station&Service AG");

    let root = stores.fs.by_id("fs-root").unwrap();
    assert_eq!(root.related_oe.len(), 2);
}

#[test]
fn test_sequential_and_parallel_agree() {
    let dir = tempdir().unwrap();
    let paths = write_exports(dir.path());

    let mut sequential = load_stores(&paths).unwrap();
    let mut parallel = load_stores(&paths).unwrap();
    let a = analyze(&mut sequential, &AnalysisOptions { parallel: false });
    let b = analyze(&mut parallel, &AnalysisOptions { parallel: true });

    assert_eq!(a, b);
    assert!(sequential.findings().eq(parallel.findings()));
}

#[test]
fn test_reanalysis_is_idempotent() {
    let dir = tempdir().unwrap();
    let mut stores = load_stores(&write_exports(dir.path())).unwrap();

    let first = analyze(&mut stores, &AnalysisOptions::default());
    let findings: Vec<ReferenceError> = stores.findings().map(|f| f.error.clone()).collect();
    let second = analyze(&mut stores, &AnalysisOptions::default());

    assert_eq!(first, second);
    let again: Vec<ReferenceError> = stores.findings().map(|f| f.error.clone()).collect();
    assert_eq!(findings, again);
}

// ============================================================================
// Point lookup
// ============================================================================

#[test]
fn test_lookup_on_loaded_stores() {
    let dir = tempdir().unwrap();
    let stores = load_stores(&write_exports(dir.path())).unwrap();

    let region = stores.oe.by_id("oe-region").unwrap();
    let result = stores.lookup_oe(region);
    assert_eq!(result.parent_legal.record.map(|r| r.id.as_str()), Some("oe-head"));
    assert_eq!(result.ku.record.map(|r| r.name.as_str()), Some("DB Station&Service AG"));
    assert!(!result.fs.is_dangling());

    let broken = stores.oe.by_id("oe-broken").unwrap();
    let result = stores.lookup_oe(broken);
    assert!(!result.ku.has_ref);
    assert!(result.fs.is_dangling());
    assert!(result.parent_legal.is_dangling());
    assert!(!result.parent_functional.has_ref);
}

#[test]
fn test_findings_serialize() {
    let dir = tempdir().unwrap();
    let mut stores = load_stores(&write_exports(dir.path())).unwrap();
    analyze(&mut stores, &AnalysisOptions::default());

    let findings: Vec<_> = stores.findings().collect();
    let json = serde_json::to_value(&findings).unwrap();
    assert_eq!(json[0]["entity"], "OE");
    assert_eq!(json[0]["name"], "X");
    assert_eq!(json[0]["error"]["kind"], "MissingReference");
    assert_eq!(json[0]["error"]["message"], "missing KU reference");
    assert_eq!(json[4]["error"]["message"], "FS hierarchy cycle through 'fs-a'");
}
