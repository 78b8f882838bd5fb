//! XML ingestion for orgcheck
//!
//! Reads the three attribute-only exports into core records:
//! - `vw_KU` / `KU` elements -> `KuRecord`
//! - `vw_FS` / `FS` elements -> `FsRecord`
//! - `OETBL` / `OE` elements -> `OeRecord`
//!
//! Records keep document order. Unknown elements and attributes are
//! ignored; the root element name is not checked.

pub mod attrs;
pub mod records;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use orgcheck_core::{EntityKind, FsRecord, KuRecord, OeRecord, StoreError, Stores};

pub use attrs::{Attributes, TIMESTAMP_FORMAT};
pub use records::XmlRecord;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed XML near byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },
    #[error("{kind} '{id}': invalid timestamp in {attribute}: '{value}'")]
    InvalidTimestamp {
        kind: EntityKind,
        id: String,
        attribute: &'static str,
        value: String,
    },
    #[error("{kind} '{id}': invalid integer in {attribute}: '{value}'")]
    InvalidInteger {
        kind: EntityKind,
        id: String,
        attribute: &'static str,
        value: String,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<IngestError>,
    },
}

/// Parse every `R::ELEMENT` element of `xml`, in document order.
pub fn parse_str<R: XmlRecord>(xml: &str) -> Result<Vec<R>, IngestError> {
    let mut reader = Reader::from_str(xml.trim_start_matches('\u{feff}'));
    reader.trim_text(true);

    let mut records = Vec::new();
    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|source| IngestError::Xml { position, source })?;
        match event {
            Event::Start(element) | Event::Empty(element)
                if element.name().as_ref() == R::ELEMENT.as_bytes() =>
            {
                let attrs = Attributes::read(R::KIND, &element)
                    .map_err(|source| IngestError::Xml { position, source })?;
                records.push(R::from_attributes(&attrs)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(records)
}

/// Read and parse one export file.
pub fn parse_file<R: XmlRecord>(path: impl AsRef<Path>) -> Result<Vec<R>, IngestError> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_str::<R>(&xml).map_err(|source| IngestError::InFile {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;
    info!(
        kind = %R::KIND,
        items = records.len(),
        path = %path.display(),
        "parsed {}: {} items",
        R::KIND,
        records.len()
    );
    Ok(records)
}

pub fn parse_ku_str(xml: &str) -> Result<Vec<KuRecord>, IngestError> {
    parse_str(xml)
}

pub fn parse_fs_str(xml: &str) -> Result<Vec<FsRecord>, IngestError> {
    parse_str(xml)
}

pub fn parse_oe_str(xml: &str) -> Result<Vec<OeRecord>, IngestError> {
    parse_str(xml)
}

pub fn parse_ku_file(path: impl AsRef<Path>) -> Result<Vec<KuRecord>, IngestError> {
    parse_file(path)
}

pub fn parse_fs_file(path: impl AsRef<Path>) -> Result<Vec<FsRecord>, IngestError> {
    parse_file(path)
}

pub fn parse_oe_file(path: impl AsRef<Path>) -> Result<Vec<OeRecord>, IngestError> {
    parse_file(path)
}

/// Paths of the three exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub ku: PathBuf,
    pub fs: PathBuf,
    pub oe: PathBuf,
}

/// Parse all three exports into stores ready for analysis.
///
/// Empty or duplicate ids are rejected here with `IngestError::Store`.
pub fn load_stores(paths: &ExportPaths) -> Result<Stores, IngestError> {
    let fs = parse_fs_file(&paths.fs)?;
    let ku = parse_ku_file(&paths.ku)?;
    let oe = parse_oe_file(&paths.oe)?;

    let stores = Stores::from_records(ku, fs, oe)?;
    debug!(
        ku = stores.ku.len(),
        fs = stores.fs.len(),
        oe = stores.oe.len(),
        "built entity stores"
    );
    Ok(stores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_record_elements_are_ignored() {
        let xml = r#"<?xml version="1.0"?>
            <vw_KU>
                <!-- export -->
                <Meta s_NODE_KU_ID="not-a-record" />
                <KU s_NODE_KU_ID="a"></KU>
                <KU s_NODE_KU_ID="b" s_NODE_PARENT_ID="a" />
            </vw_KU>"#;

        let records = parse_ku_str(xml).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(records[1].parent_id, "a");
    }

    #[test]
    fn byte_order_mark_is_skipped() {
        let xml = "\u{feff}<vw_FS><FS s_NODE_FS_ID=\"fs1\" /></vw_FS>";
        assert_eq!(parse_fs_str(xml).unwrap().len(), 1);
    }

    #[test]
    fn unbalanced_document_is_an_error() {
        let err = parse_oe_str("<OETBL><OE s_OE_ID=\"oe1\"></OETBL>").unwrap_err();
        assert!(matches!(err, IngestError::Xml { .. }), "{err}");
    }
}
