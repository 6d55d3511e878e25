use super::tables::is_ocr_document_type;
use crate::models::{DocumentType, ScannableItem};
use crate::pipeline::error::OcrPresenceViolation;

/// Check that OCR data sits on exactly the right document.
///
/// Checks run in a fixed order and the first failure wins. Returns the
/// OCR-bearing item, or `None` when no item carries OCR.
pub fn assert_has_properly_set_ocr(
    items: &[ScannableItem],
) -> Result<Option<&ScannableItem>, OcrPresenceViolation> {
    if items.iter().filter(|doc| doc.has_ocr()).count() > 1 {
        return Err(OcrPresenceViolation::MultipleDocuments);
    }
    if items
        .iter()
        .any(|doc| doc.has_ocr() && !is_ocr_document_type(doc.document_type))
    {
        return Err(OcrPresenceViolation::InvalidDocumentType);
    }
    if items
        .iter()
        .any(|doc| !doc.has_ocr() && is_ocr_document_type(doc.document_type))
    {
        return Err(OcrPresenceViolation::MissingOcr);
    }
    // SSCS1 documents follow a separate contract without subtypes.
    if items.iter().any(|doc| {
        doc.has_ocr()
            && doc.document_type != DocumentType::Sscs1
            && doc.document_subtype.is_none()
    }) {
        return Err(OcrPresenceViolation::MissingSubtype);
    }

    Ok(items.iter().find(|doc| doc.has_ocr()))
}
