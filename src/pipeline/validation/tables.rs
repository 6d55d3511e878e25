//! Fixed lookup tables driving envelope and OCR validation.

use crate::models::{Classification, DocumentType};

/// Document types that may (and must) carry OCR data.
pub const OCR_DOCUMENT_TYPES: &[DocumentType] = &[DocumentType::Form, DocumentType::Sscs1];

/// OCR document type required when no jurisdiction override applies.
pub const DEFAULT_OCR_DOCUMENT_TYPE: DocumentType = DocumentType::Form;

/// Form type sent to the OCR validator for SSCS1 documents, which carry no
/// subtype.
pub const SSCS1_FORM_TYPE: &str = "SSCS1";

const OCR_TYPE_PER_JURISDICTION: &[(&str, DocumentType)] = &[("SSCS", DocumentType::Sscs1)];

pub fn is_ocr_document_type(document_type: DocumentType) -> bool {
    OCR_DOCUMENT_TYPES.contains(&document_type)
}

/// Jurisdiction-specific OCR document type, if any.
pub fn ocr_document_type_for(jurisdiction: &str) -> Option<DocumentType> {
    OCR_TYPE_PER_JURISDICTION
        .iter()
        .find(|(name, _)| *name == jurisdiction)
        .map(|(_, doc_type)| *doc_type)
}

/// Document types an envelope of this classification must not contain.
pub fn disallowed_document_types(classification: Classification) -> &'static [DocumentType] {
    match classification {
        Classification::SupplementaryEvidence => &[DocumentType::Form, DocumentType::Sscs1],
        Classification::Exception
        | Classification::NewApplication
        | Classification::SupplementaryEvidenceWithOcr => &[],
    }
}

/// Whether envelopes of this classification must carry OCR data.
pub fn requires_ocr(classification: Classification) -> bool {
    matches!(
        classification,
        Classification::NewApplication | Classification::SupplementaryEvidenceWithOcr
    )
}
