use chrono::{DateTime, Utc};
use serde::Serialize;

use super::enums::{Classification, DocumentType};
use super::ocr::OcrData;

/// Parsed envelope metafile.
///
/// Built once from the archive's metadata and never modified afterwards;
/// list fields are always present (empty when the metafile omits them).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    /// Trimmed: scanning can pad the value with spaces.
    pub case_number: Option<String>,
    pub previous_service_case_reference: Option<String>,
    pub po_box: String,
    pub jurisdiction: String,
    pub delivery_date: DateTime<Utc>,
    pub opening_date: DateTime<Utc>,
    pub zip_file_created_date: DateTime<Utc>,
    pub zip_file_name: String,
    pub rescan_for: Option<String>,
    pub classification: Classification,
    pub scannable_items: Vec<ScannableItem>,
    pub payments: Vec<Payment>,
    pub non_scannable_items: Vec<NonScannableItem>,
}

impl Envelope {
    pub fn document_dcns(&self) -> Vec<&str> {
        self.scannable_items
            .iter()
            .map(|item| item.document_control_number.as_str())
            .collect()
    }

    pub fn payment_dcns(&self) -> Vec<&str> {
        self.payments
            .iter()
            .map(|p| p.document_control_number.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScannableItem {
    pub document_control_number: String,
    pub scanning_date: Option<DateTime<Utc>>,
    pub ocr_accuracy: Option<String>,
    pub manual_intervention: Option<String>,
    pub next_action: Option<String>,
    pub next_action_date: Option<DateTime<Utc>>,
    pub ocr_data: Option<OcrData>,
    pub file_name: String,
    pub notes: Option<String>,
    pub document_type: DocumentType,
    pub document_subtype: Option<String>,
}

impl ScannableItem {
    pub fn has_ocr(&self) -> bool {
        self.ocr_data.is_some()
    }

    /// True when OCR data is present and carries at least one field.
    pub fn has_ocr_fields(&self) -> bool {
        self.ocr_data.as_ref().is_some_and(|ocr| !ocr.is_empty())
    }

    pub fn subtype_or_none(&self) -> &str {
        self.document_subtype.as_deref().unwrap_or("none")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub document_control_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NonScannableItem {
    pub document_control_number: Option<String>,
    pub item_type: Option<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ocr::OcrDataField;
    use crate::test_support::{envelope, item};

    #[test]
    fn dcn_accessors_preserve_order() {
        let env = envelope(
            Classification::Exception,
            vec![item("a.pdf", "dcn-a"), item("b.pdf", "dcn-b")],
        );
        assert_eq!(env.document_dcns(), vec!["dcn-a", "dcn-b"]);
        assert!(env.payment_dcns().is_empty());
    }

    #[test]
    fn empty_ocr_is_present_but_has_no_fields() {
        let mut doc = item("a.pdf", "dcn");
        doc.ocr_data = Some(OcrData::default());
        assert!(doc.has_ocr());
        assert!(!doc.has_ocr_fields());

        doc.ocr_data = Some(OcrData::new(vec![OcrDataField::new("foo", "bar")]));
        assert!(doc.has_ocr_fields());
    }
}
