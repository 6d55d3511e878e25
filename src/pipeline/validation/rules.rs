//! Consistency rules between an envelope's metafile and its archive.

use std::collections::{BTreeSet, HashMap};

use super::tables::{
    disallowed_document_types, ocr_document_type_for, requires_ocr, DEFAULT_OCR_DOCUMENT_TYPE,
};
use crate::models::{DocumentType, Envelope};
use crate::pipeline::archive::base_name;
use crate::pipeline::error::RejectionError;

/// Run every envelope rule in order, stopping at the first rejection.
pub fn validate_envelope(
    envelope: &Envelope,
    zip_file_name: &str,
    pdf_file_names: &[String],
) -> Result<(), RejectionError> {
    assert_zip_file_name_matches_metadata(envelope, zip_file_name)?;
    assert_contains_ocr_data_if_required(envelope)?;
    assert_has_pdfs(envelope, pdf_file_names)?;
    assert_document_control_numbers_are_unique(envelope)?;
    assert_contains_allowed_document_types_only(envelope)?;
    Ok(())
}

pub fn assert_zip_file_name_matches_metadata(
    envelope: &Envelope,
    zip_file_name: &str,
) -> Result<(), RejectionError> {
    if envelope.zip_file_name != zip_file_name {
        return Err(RejectionError::ZipNameMismatch {
            declared: envelope.zip_file_name.clone(),
            actual: zip_file_name.to_string(),
        });
    }
    Ok(())
}

/// New applications and OCR supplementary evidence need at least one
/// OCR-eligible document with non-empty OCR fields.
pub fn assert_contains_ocr_data_if_required(envelope: &Envelope) -> Result<(), RejectionError> {
    if !requires_ocr(envelope.classification) {
        return Ok(());
    }

    let mut eligible_types = vec![DEFAULT_OCR_DOCUMENT_TYPE];
    eligible_types.extend(ocr_document_type_for(&envelope.jurisdiction));

    let eligible_docs: Vec<_> = envelope
        .scannable_items
        .iter()
        .filter(|doc| eligible_types.contains(&doc.document_type))
        .collect();

    if eligible_docs.is_empty() {
        return Err(RejectionError::OcrDataNotFound(format!(
            "No documents of type {} found",
            join_labels(&eligible_types, ", ")
        )));
    }
    if eligible_docs.iter().all(|doc| !doc.has_ocr_fields()) {
        return Err(RejectionError::OcrDataNotFound("Missing OCR data".into()));
    }
    Ok(())
}

/// Declared file names must match the archive's PDFs one to one. Archive
/// entries are compared by base name.
pub fn assert_has_pdfs(envelope: &Envelope, pdf_file_names: &[String]) -> Result<(), RejectionError> {
    let declared: Vec<&str> = envelope
        .scannable_items
        .iter()
        .map(|item| item.file_name.as_str())
        .collect();

    let declared_set: BTreeSet<&str> = declared.iter().copied().collect();
    let present: Vec<&str> = pdf_file_names.iter().map(|n| base_name(n)).collect();
    let present_set: BTreeSet<&str> = present.iter().copied().collect();

    let mut duplicated = duplicates(&declared);
    duplicated.sort_unstable();
    // Staging flattens entries to base names, so these would overwrite each other.
    let mut duplicated_pdfs = duplicates(&present);
    duplicated_pdfs.sort_unstable();
    let not_declared: Vec<&str> = present_set.difference(&declared_set).copied().collect();
    let missing: Vec<&str> = declared_set.difference(&present_set).copied().collect();

    let mut problems = Vec::new();
    if !duplicated.is_empty() {
        problems.push(format!(
            "Duplicate scanned items file names: {}",
            duplicated.join(", ")
        ));
    }
    if !duplicated_pdfs.is_empty() {
        problems.push(format!(
            "Duplicate PDFs in archive: {}",
            duplicated_pdfs.join(", ")
        ));
    }
    if !not_declared.is_empty() {
        problems.push(format!("Not declared PDFs: {}", not_declared.join(", ")));
    }
    if !missing.is_empty() {
        problems.push(format!("Missing PDFs: {}", missing.join(", ")));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(RejectionError::FileNameIrregularities(problems.join(". ")))
    }
}

pub fn assert_document_control_numbers_are_unique(envelope: &Envelope) -> Result<(), RejectionError> {
    let duplicated = duplicates(&envelope.document_dcns());
    if duplicated.is_empty() {
        return Ok(());
    }
    Err(RejectionError::DuplicateDcns(format!(
        "Duplicate DCNs in envelope: {}",
        duplicated.join(", ")
    )))
}

pub fn assert_contains_allowed_document_types_only(envelope: &Envelope) -> Result<(), RejectionError> {
    let disallowed = disallowed_document_types(envelope.classification);

    let mut found: Vec<DocumentType> = Vec::new();
    for item in &envelope.scannable_items {
        if disallowed.contains(&item.document_type) && !found.contains(&item.document_type) {
            found.push(item.document_type);
        }
    }

    if found.is_empty() {
        return Ok(());
    }
    Err(RejectionError::DisallowedDocumentTypes(format!(
        "Envelope contains scannable item(s) of types that are not allowed for classification '{}': [{}]",
        envelope.classification,
        join_labels(&found, ", ")
    )))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Values occurring more than once, each listed once, in first-seen order.
fn duplicates<'a>(values: &[&'a str]) -> Vec<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(*value).or_default() += 1;
    }

    let mut seen = BTreeSet::new();
    values
        .iter()
        .copied()
        .filter(|v| counts.get(v).copied().unwrap_or(0) > 1 && seen.insert(*v))
        .collect()
}

fn join_labels(types: &[DocumentType], separator: &str) -> String {
    types
        .iter()
        .map(|t| t.label())
        .collect::<Vec<_>>()
        .join(separator)
}
