//! Attribute access for one export element.

use chrono::NaiveDateTime;
use quick_xml::events::BytesStart;
use std::collections::HashMap;

use crate::IngestError;
use orgcheck_core::EntityKind;

/// Timestamp layout used by all three exports, e.g. `2002-07-18T00:00:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Unescaped attributes of one element, keyed by attribute name.
#[derive(Debug, Clone)]
pub struct Attributes {
    kind: EntityKind,
    values: HashMap<String, String>,
}

impl Attributes {
    pub(crate) fn read(kind: EntityKind, element: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut values = HashMap::new();
        for attr in element.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            values.insert(key, value);
        }
        Ok(Self { kind, values })
    }

    /// Build from explicit pairs (used by tests and by callers that already
    /// hold decoded attributes).
    pub fn from_pairs<'a>(
        kind: EntityKind,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            kind,
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// String value; absent attributes read as empty.
    pub fn text(&self, name: &str) -> String {
        self.values.get(name).cloned().unwrap_or_default()
    }

    /// Integer value; absent or empty attributes read as 0.
    pub fn integer(&self, id: &str, name: &'static str) -> Result<i64, IngestError> {
        match self.non_empty(name) {
            None => Ok(0),
            Some(raw) => raw.trim().parse().map_err(|_| IngestError::InvalidInteger {
                kind: self.kind,
                id: id.to_string(),
                attribute: name,
                value: raw.to_string(),
            }),
        }
    }

    /// Timestamp value; absent or empty attributes read as `None`.
    pub fn timestamp(
        &self,
        id: &str,
        name: &'static str,
    ) -> Result<Option<NaiveDateTime>, IngestError> {
        match self.non_empty(name) {
            None => Ok(None),
            Some(raw) => NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
                .map(Some)
                .map_err(|_| IngestError::InvalidTimestamp {
                    kind: self.kind,
                    id: id.to_string(),
                    attribute: name,
                    value: raw.to_string(),
                }),
        }
    }

    fn non_empty(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}
