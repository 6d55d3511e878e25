//! Metafile bytes to `Envelope`.
//!
//! Parsing is two-phase: the raw document is checked against the compiled
//! schema, then deserialized into wire structs and converted. Nothing is
//! built until the schema accepts the document.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::dates::parse_timestamp;
use super::ocr_payload::decode_ocr_data;
use super::schema::MetafileSchema;
use super::MetafileError;
use crate::models::{
    Classification, DocumentType, Envelope, NonScannableItem, Payment, ScannableItem,
};
use crate::pipeline::error::RejectionError;

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    po_box: String,
    jurisdiction: String,
    delivery_date: String,
    opening_date: String,
    zip_file_createddate: String,
    zip_file_name: String,
    #[serde(default)]
    rescan_for: Option<String>,
    #[serde(default)]
    case_number: Option<String>,
    #[serde(default)]
    previous_service_case_reference: Option<String>,
    envelope_classification: Classification,
    #[serde(default)]
    scannable_items: Option<Vec<RawScannableItem>>,
    #[serde(default)]
    payments: Option<Vec<RawPayment>>,
    #[serde(default)]
    non_scannable_items: Option<Vec<RawNonScannableItem>>,
}

#[derive(Debug, Deserialize)]
struct RawScannableItem {
    document_control_number: String,
    #[serde(default)]
    scanning_date: Option<String>,
    #[serde(default)]
    ocr_accuracy: Option<String>,
    #[serde(default)]
    manual_intervention: Option<String>,
    #[serde(default)]
    next_action: Option<String>,
    #[serde(default)]
    next_action_date: Option<String>,
    #[serde(default)]
    ocr_data: Option<String>,
    file_name: String,
    #[serde(default)]
    notes: Option<String>,
    document_type: DocumentType,
    #[serde(default)]
    document_sub_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPayment {
    document_control_number: String,
}

#[derive(Debug, Deserialize)]
struct RawNonScannableItem {
    #[serde(default)]
    document_control_number: Option<String>,
    #[serde(default)]
    item_type: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

fn optional_timestamp(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, MetafileError> {
    raw.map(parse_timestamp).transpose()
}

impl RawScannableItem {
    fn into_item(self) -> Result<ScannableItem, MetafileError> {
        Ok(ScannableItem {
            scanning_date: optional_timestamp(self.scanning_date.as_deref())?,
            next_action_date: optional_timestamp(self.next_action_date.as_deref())?,
            ocr_data: self.ocr_data.as_deref().map(decode_ocr_data).transpose()?,
            document_control_number: self.document_control_number,
            ocr_accuracy: self.ocr_accuracy,
            manual_intervention: self.manual_intervention,
            next_action: self.next_action,
            file_name: self.file_name,
            notes: self.notes,
            document_type: self.document_type,
            document_subtype: self.document_sub_type,
        })
    }
}

impl RawEnvelope {
    fn into_envelope(self) -> Result<Envelope, MetafileError> {
        let scannable_items = self
            .scannable_items
            .unwrap_or_default()
            .into_iter()
            .map(RawScannableItem::into_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Envelope {
            case_number: self.case_number.map(|c| c.trim().to_string()),
            previous_service_case_reference: self.previous_service_case_reference,
            po_box: self.po_box,
            jurisdiction: self.jurisdiction,
            delivery_date: parse_timestamp(&self.delivery_date)?,
            opening_date: parse_timestamp(&self.opening_date)?,
            zip_file_created_date: parse_timestamp(&self.zip_file_createddate)?,
            zip_file_name: self.zip_file_name,
            rescan_for: self.rescan_for,
            classification: self.envelope_classification,
            scannable_items,
            payments: self
                .payments
                .unwrap_or_default()
                .into_iter()
                .map(|p| Payment {
                    document_control_number: p.document_control_number,
                })
                .collect(),
            non_scannable_items: self
                .non_scannable_items
                .unwrap_or_default()
                .into_iter()
                .map(|n| NonScannableItem {
                    document_control_number: n.document_control_number,
                    item_type: n.item_type,
                    notes: n.notes,
                })
                .collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Validate and parse the archive's metafile.
///
/// Absent bytes reject as `MetadataNotFound`. Schema violations reject with
/// the full report. Bytes that are not JSON, and malformed dates or OCR
/// payloads inside a schema-valid document, reject as the same
/// invalid-schema class with the decode failure attached as the source.
pub fn parse_envelope(
    schema: &MetafileSchema,
    metadata: Option<&[u8]>,
    zip_file_name: &str,
) -> Result<Envelope, RejectionError> {
    let bytes = metadata.ok_or(RejectionError::MetadataNotFound)?;

    let document: Value = serde_json::from_slice(bytes).map_err(|e| {
        RejectionError::unparseable_metafile(zip_file_name, MetafileError::Json(e))
    })?;

    schema.validate(&document, zip_file_name)?;

    let envelope = serde_json::from_value::<RawEnvelope>(document)
        .map_err(MetafileError::from)
        .and_then(RawEnvelope::into_envelope)
        .map_err(|e| RejectionError::unparseable_metafile(zip_file_name, e))?;

    tracing::debug!(
        zip_file_name = %zip_file_name,
        classification = %envelope.classification,
        scannable_items = envelope.scannable_items.len(),
        payments = envelope.payments.len(),
        "Metafile parsed"
    );

    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::metadata::encode_ocr_data;
    use crate::models::{OcrData, OcrDataField};
    use serde_json::json;

    fn schema() -> MetafileSchema {
        MetafileSchema::load().unwrap()
    }

    fn metafile() -> Value {
        json!({
            "po_box": "12625",
            "jurisdiction": "BULKSCAN",
            "delivery_date": "23-06-2018 12:34:56.123456",
            "opening_date": "23-06-2018 12:34:56.123456",
            "zip_file_createddate": "23-06-2018 12:34:56.123456",
            "zip_file_name": "1_24-06-2018-00-00-00.zip",
            "case_number": "  1111222233334446  ",
            "envelope_classification": "NEW_APPLICATION",
            "scannable_items": [{
                "document_control_number": "1111001",
                "scanning_date": "23-06-2018 12:34:56.123456",
                "file_name": "1111001.pdf",
                "document_type": "Form",
                "document_sub_type": "PERSONAL",
                "ocr_data": encode_ocr_data(&OcrData::new(vec![
                    OcrDataField::new("first_name", "John"),
                ])).unwrap()
            }]
        })
    }

    fn parse(doc: &Value) -> Result<Envelope, RejectionError> {
        let bytes = serde_json::to_vec(doc).unwrap();
        parse_envelope(&schema(), Some(&bytes), "1_24-06-2018-00-00-00.zip")
    }

    #[test]
    fn parses_full_envelope() {
        let env = parse(&metafile()).unwrap();
        assert_eq!(env.case_number.as_deref(), Some("1111222233334446"));
        assert_eq!(env.classification, Classification::NewApplication);
        assert_eq!(env.scannable_items.len(), 1);

        let item = &env.scannable_items[0];
        assert_eq!(item.document_type, DocumentType::Form);
        assert_eq!(item.document_subtype.as_deref(), Some("PERSONAL"));
        assert_eq!(
            item.ocr_data.as_ref().unwrap().fields,
            vec![OcrDataField::new("first_name", "John")]
        );
    }

    #[test]
    fn absent_lists_become_empty() {
        let env = parse(&metafile()).unwrap();
        assert!(env.payments.is_empty());
        assert!(env.non_scannable_items.is_empty());

        let mut doc = metafile();
        doc["payments"] = Value::Null;
        assert!(parse(&doc).unwrap().payments.is_empty());
    }

    #[test]
    fn missing_metadata_is_rejected() {
        let err = parse_envelope(&schema(), None, "a.zip").unwrap_err();
        assert!(matches!(err, RejectionError::MetadataNotFound));
    }

    #[test]
    fn non_json_bytes_are_invalid_schema() {
        let err = parse_envelope(&schema(), Some(b"not json"), "a.zip").unwrap_err();
        assert!(matches!(
            err,
            RejectionError::InvalidSchema { cause: Some(MetafileError::Json(_)), .. }
        ));
    }

    #[test]
    fn schema_failure_stops_before_construction() {
        let mut doc = metafile();
        doc.as_object_mut().unwrap().remove("scannable_items");
        let err = parse(&doc).unwrap_err();
        assert!(matches!(err, RejectionError::InvalidSchema { cause: None, .. }));
    }

    #[test]
    fn bad_date_is_reported_as_invalid_schema() {
        let mut doc = metafile();
        doc["delivery_date"] = json!("2018-06-23");
        let err = parse(&doc).unwrap_err();
        assert_eq!(err.kind(), "InvalidEnvelopeSchema");
        assert!(matches!(
            err,
            RejectionError::InvalidSchema { cause: Some(MetafileError::InvalidDateFormat { .. }), .. }
        ));
    }

    #[test]
    fn bad_ocr_payload_is_reported_as_invalid_schema() {
        let mut doc = metafile();
        doc["scannable_items"][0]["ocr_data"] = json!("%%%");
        let err = parse(&doc).unwrap_err();
        assert!(matches!(
            err,
            RejectionError::InvalidSchema { cause: Some(MetafileError::OcrDataParse(_)), .. }
        ));
        assert!(err.to_string().contains("1_24-06-2018-00-00-00.zip"));
    }

    #[test]
    fn unknown_document_type_is_invalid_schema() {
        let mut doc = metafile();
        doc["scannable_items"][0]["document_type"] = json!("passport");
        let err = parse(&doc).unwrap_err();
        assert!(matches!(
            err,
            RejectionError::InvalidSchema { cause: Some(MetafileError::Json(_)), .. }
        ));
    }
}
