//! Mapping of export elements onto core records.

use orgcheck_core::{FsRecord, KuRecord, OeDetails, OeRecord, Record, Validity};

use crate::attrs::Attributes;
use crate::IngestError;

/// A core record that has an element in one of the XML exports.
pub trait XmlRecord: Record + Sized {
    /// Name of the record element (`KU`, `FS`, `OE`).
    const ELEMENT: &'static str;

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError>;
}

// `vw_KU` export
const KU_ID: &str = "s_NODE_KU_ID";
const KU_NAME: &str = "KULANG";

// `vw_FS` export
const FS_ID: &str = "s_NODE_FS_ID";
const FS_SHORT_NAME: &str = "FS_KURZ";
const FS_NAME: &str = "FSLANG";

// shared by KU and FS
const NODE_PARENT_ID: &str = "s_NODE_PARENT_ID";
const DEPTH: &str = "DEPTH";
const VALID_FROM: &str = "GAB";
const VALID_UNTIL: &str = "GBIS";

// `OETBL` export
const OE_ID: &str = "s_OE_ID";
const OE_KU_ID: &str = "s_KU_ID";
const OE_FS_ID: &str = "s_FS_ID";
const OE_PARENT_LEGAL_ID: &str = "s_PARENTOE_L_ID";
const OE_PARENT_FUNCTIONAL_ID: &str = "s_PARENTOE_F_ID";
const OE_PS_ID: &str = "PS_OEID";
const OE_FS_START: &str = "FS_START";
const OE_VALID_FROM: &str = "Gültig_x0020_ab";
const OE_VALID_UNTIL: &str = "Gültig_x0020_bis";
const OE_TYPE: &str = "Typ";
const OE_KU_NAME: &str = "Konzernunternehmen";
const OE_FS_NAME: &str = "Führungsstruktur";
const OE_ORG_CODE: &str = "Org-Kz";
const OE_ORG_NAMES: [&str; 3] = ["Org-Bez1", "Org-Bez2", "Org-Bez3"];
const OE_LOCATION: &str = "Standort";
const OE_COMPANY_NAMES: [&str; 2] = ["Firmierung1", "Firmierung2"];

fn validity(
    attrs: &Attributes,
    id: &str,
    from: &'static str,
    until: &'static str,
) -> Result<Validity, IngestError> {
    Ok(Validity {
        from: attrs.timestamp(id, from)?,
        until: attrs.timestamp(id, until)?,
    })
}

impl XmlRecord for KuRecord {
    const ELEMENT: &'static str = "KU";

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError> {
        let id = attrs.text(KU_ID);
        Ok(KuRecord {
            parent_id: attrs.text(NODE_PARENT_ID),
            name: attrs.text(KU_NAME),
            depth: attrs.integer(&id, DEPTH)?,
            validity: validity(attrs, &id, VALID_FROM, VALID_UNTIL)?,
            ..KuRecord::new(id)
        })
    }
}

impl XmlRecord for FsRecord {
    const ELEMENT: &'static str = "FS";

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError> {
        let id = attrs.text(FS_ID);
        Ok(FsRecord {
            parent_id: attrs.text(NODE_PARENT_ID),
            short_name: attrs.text(FS_SHORT_NAME),
            name: attrs.text(FS_NAME),
            depth: attrs.integer(&id, DEPTH)?,
            validity: validity(attrs, &id, VALID_FROM, VALID_UNTIL)?,
            ..FsRecord::new(id)
        })
    }
}

impl XmlRecord for OeRecord {
    const ELEMENT: &'static str = "OE";

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError> {
        let id = attrs.text(OE_ID);
        let details = OeDetails {
            ps_id: attrs.integer(&id, OE_PS_ID)?,
            fs_start: attrs.integer(&id, OE_FS_START)?,
            validity: validity(attrs, &id, OE_VALID_FROM, OE_VALID_UNTIL)?,
            kind: attrs.text(OE_TYPE),
            ku_name: attrs.text(OE_KU_NAME),
            fs_name: attrs.text(OE_FS_NAME),
            org_code: attrs.text(OE_ORG_CODE),
            org_names: OE_ORG_NAMES.map(|name| attrs.text(name)),
            location: attrs.text(OE_LOCATION),
            company_names: OE_COMPANY_NAMES.map(|name| attrs.text(name)),
        };
        Ok(OeRecord {
            details,
            ..OeRecord::new(id)
                .with_ku(attrs.text(OE_KU_ID))
                .with_fs(attrs.text(OE_FS_ID))
                .with_parent_legal(attrs.text(OE_PARENT_LEGAL_ID))
                .with_parent_functional(attrs.text(OE_PARENT_FUNCTIONAL_ID))
        })
    }
}
