//! Shared fixtures for unit tests.

use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::models::{
    Classification, DocumentType, Envelope, FeedEnvelope, FormField, OcrData, OcrDataField,
    OcrValidationResult, ScannableItem,
};
use crate::pipeline::metadata::encode_ocr_data;
use crate::pipeline::validation::{OcrServiceError, ServiceOcrValidator};

pub const ENVELOPE_ZIP: &str = "1_24-06-2018-00-00-00.zip";

pub fn envelope(classification: Classification, scannable_items: Vec<ScannableItem>) -> Envelope {
    let date = Utc.with_ymd_and_hms(2018, 6, 23, 12, 0, 0).unwrap();
    Envelope {
        case_number: None,
        previous_service_case_reference: None,
        po_box: "12625".into(),
        jurisdiction: "BULKSCAN".into(),
        delivery_date: date,
        opening_date: date,
        zip_file_created_date: date,
        zip_file_name: ENVELOPE_ZIP.into(),
        rescan_for: None,
        classification,
        scannable_items,
        payments: vec![],
        non_scannable_items: vec![],
    }
}

/// Plain `other` document without OCR.
pub fn item(file_name: &str, dcn: &str) -> ScannableItem {
    ScannableItem {
        document_control_number: dcn.into(),
        scanning_date: None,
        ocr_accuracy: None,
        manual_intervention: None,
        next_action: None,
        next_action_date: None,
        ocr_data: None,
        file_name: file_name.into(),
        notes: None,
        document_type: DocumentType::Other,
        document_subtype: None,
    }
}

pub fn feed_envelope(file_name: &str) -> FeedEnvelope {
    FeedEnvelope {
        etag: format!("etag-{file_name}"),
        file_name: file_name.into(),
        url: format!("https://storage.example/bulkscan/{file_name}"),
        created_at: None,
        content_length: 0,
        content_type: Some("application/zip".into()),
    }
}

// ---------------------------------------------------------------------------
// Archives
// ---------------------------------------------------------------------------

pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn zip_with_dir(dir: &str, entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.add_directory(dir, SimpleFileOptions::default()).unwrap();
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Archive laid out the way non-seeking writers (Java `ZipOutputStream`,
/// Python `zipfile` on a pipe) produce it: general purpose flag bit 3, zero
/// sizes in every local header, and a data descriptor after each entry.
pub fn streamed_zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    const DATA_DESCRIPTOR_FLAG: u16 = 0x0008;
    const DOS_DATE_1980_01_01: u16 = 0x0021;

    fn u16le(buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    fn u32le(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    let mut out = Vec::new();
    let mut central = Vec::new();

    for (name, content) in entries {
        let offset = out.len() as u32;
        let crc = crc32fast::hash(content);
        let size = content.len() as u32;

        // Local header without sizes
        u32le(&mut out, 0x0403_4b50);
        u16le(&mut out, 20);
        u16le(&mut out, DATA_DESCRIPTOR_FLAG);
        u16le(&mut out, 0); // stored
        u16le(&mut out, 0);
        u16le(&mut out, DOS_DATE_1980_01_01);
        u32le(&mut out, 0);
        u32le(&mut out, 0);
        u32le(&mut out, 0);
        u16le(&mut out, name.len() as u16);
        u16le(&mut out, 0);
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(content);

        // Data descriptor
        u32le(&mut out, 0x0807_4b50);
        u32le(&mut out, crc);
        u32le(&mut out, size);
        u32le(&mut out, size);

        // Central directory record
        u32le(&mut central, 0x0201_4b50);
        u16le(&mut central, 20);
        u16le(&mut central, 20);
        u16le(&mut central, DATA_DESCRIPTOR_FLAG);
        u16le(&mut central, 0);
        u16le(&mut central, 0);
        u16le(&mut central, DOS_DATE_1980_01_01);
        u32le(&mut central, crc);
        u32le(&mut central, size);
        u32le(&mut central, size);
        u16le(&mut central, name.len() as u16);
        u16le(&mut central, 0);
        u16le(&mut central, 0);
        u16le(&mut central, 0);
        u16le(&mut central, 0);
        u32le(&mut central, 0);
        u32le(&mut central, offset);
        central.extend_from_slice(name.as_bytes());
    }

    let central_offset = out.len() as u32;
    let central_size = central.len() as u32;
    out.extend_from_slice(&central);

    // End of central directory
    u32le(&mut out, 0x0605_4b50);
    u16le(&mut out, 0);
    u16le(&mut out, 0);
    u16le(&mut out, entries.len() as u16);
    u16le(&mut out, entries.len() as u16);
    u32le(&mut out, central_size);
    u32le(&mut out, central_offset);
    u16le(&mut out, 0);
    out
}

/// Archive bytes spooled to an anonymous temp file, positioned at the start,
/// the way the feed client hands over downloads.
pub fn archive_file(bytes: &[u8]) -> File {
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file.rewind().unwrap();
    file
}

// ---------------------------------------------------------------------------
// Metafiles
// ---------------------------------------------------------------------------

/// Builds metafile JSON in the supplier format.
pub struct MetafileBuilder {
    document: Value,
}

impl MetafileBuilder {
    pub fn new(zip_file_name: &str, classification: Classification) -> Self {
        Self {
            document: json!({
                "po_box": "12625",
                "jurisdiction": "BULKSCAN",
                "delivery_date": "23-06-2018 12:34:56.123456",
                "opening_date": "23-06-2018 12:34:56.123456",
                "zip_file_createddate": "23-06-2018 12:34:56.123456",
                "zip_file_name": zip_file_name,
                "envelope_classification": classification.as_str(),
                "scannable_items": [],
                "payments": [],
                "non_scannable_items": []
            }),
        }
    }

    pub fn item(mut self, file_name: &str, dcn: &str, document_type: &str) -> Self {
        self.push_item(json!({
            "document_control_number": dcn,
            "scanning_date": "23-06-2018 12:34:56.123456",
            "file_name": file_name,
            "document_type": document_type
        }));
        self
    }

    pub fn form_with_ocr(mut self, file_name: &str, dcn: &str, subtype: &str) -> Self {
        let ocr = OcrData::new(vec![
            OcrDataField::new("first_name", "John"),
            OcrDataField::new("last_name", "Smith"),
        ]);
        self.push_item(json!({
            "document_control_number": dcn,
            "scanning_date": "23-06-2018 12:34:56.123456",
            "file_name": file_name,
            "document_type": "form",
            "document_sub_type": subtype,
            "ocr_data": encode_ocr_data(&ocr).unwrap()
        }));
        self
    }

    pub fn build(self) -> Vec<u8> {
        serde_json::to_vec(&self.document).unwrap()
    }

    fn push_item(&mut self, item: Value) {
        if let Some(items) = self.document["scannable_items"].as_array_mut() {
            items.push(item);
        }
    }
}

// ---------------------------------------------------------------------------
// OCR validator
// ---------------------------------------------------------------------------

/// Records every call and answers with a canned result.
pub struct MockOcrValidator {
    response: Result<OcrValidationResult, String>,
    calls: Mutex<Vec<(String, Vec<FormField>)>>,
}

impl MockOcrValidator {
    pub fn returning(result: OcrValidationResult) -> Self {
        Self {
            response: Ok(result),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<FormField>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ServiceOcrValidator for MockOcrValidator {
    fn validate(
        &self,
        form_type: &str,
        fields: &[FormField],
    ) -> Result<OcrValidationResult, OcrServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push((form_type.to_string(), fields.to_vec()));
        self.response
            .clone()
            .map_err(OcrServiceError::Http)
    }
}
