use thiserror::Error;

use super::ocr_presence::assert_has_properly_set_ocr;
use super::tables::SSCS1_FORM_TYPE;
use crate::models::{
    Classification, DocumentType, Envelope, FormField, OcrValidationResult, OcrValidationStatus,
    OcrValidationWarnings, ScannableItem,
};
use crate::pipeline::error::{IntakeError, RejectionError};

/// The OCR validator call itself failed (transport, bad response).
#[derive(Error, Debug)]
pub enum OcrServiceError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("OCR validator responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid OCR validator response: {0}")]
    InvalidResponse(String),
}

/// Per-service OCR field validator.
pub trait ServiceOcrValidator {
    fn validate(
        &self,
        form_type: &str,
        fields: &[FormField],
    ) -> Result<OcrValidationResult, OcrServiceError>;
}

/// Form type the validator knows the document by.
pub fn form_type(doc: &ScannableItem) -> &str {
    if doc.document_type == DocumentType::Sscs1 {
        SSCS1_FORM_TYPE
    } else {
        doc.subtype_or_none()
    }
}

/// Validate the envelope's OCR document with the service validator, if
/// there is one to validate.
///
/// Exception envelopes and envelopes without OCR are skipped without a call.
/// Validator errors, and statuses this service does not recognise, reject
/// the envelope. Warnings are returned for the caseworker.
pub fn assert_ocr_data_is_valid(
    envelope: &Envelope,
    validator: &dyn ServiceOcrValidator,
) -> Result<Option<OcrValidationWarnings>, IntakeError> {
    if envelope.classification == Classification::Exception {
        return Ok(None);
    }

    let doc = match assert_has_properly_set_ocr(&envelope.scannable_items)
        .map_err(RejectionError::from)?
    {
        Some(doc) => doc,
        None => return Ok(None),
    };

    let fields = doc
        .ocr_data
        .as_ref()
        .map(|ocr| ocr.to_form_fields())
        .unwrap_or_default();
    let result = validator.validate(form_type(doc), &fields)?;

    match result.status {
        OcrValidationStatus::Success => {
            tracing::info!(
                dcn = %doc.document_control_number,
                document_type = %doc.document_type,
                document_subtype = %doc.subtype_or_none(),
                zip_file_name = %envelope.zip_file_name,
                "OCR validation succeeded"
            );
            Ok(None)
        }
        OcrValidationStatus::Warnings => {
            tracing::info!(
                zip_file_name = %envelope.zip_file_name,
                warnings = result.warnings.len(),
                "OCR validation ended with warnings"
            );
            Ok(Some(OcrValidationWarnings {
                document_control_number: doc.document_control_number.clone(),
                warnings: result.warnings,
            }))
        }
        OcrValidationStatus::Errors => {
            tracing::info!(
                zip_file_name = %envelope.zip_file_name,
                errors = result.errors.len(),
                "OCR validation returned errors"
            );
            Err(RejectionError::OcrValidation {
                message: format!(
                    "OCR validation service returned OCR-specific errors. Document control number: {}. Envelope: {}.",
                    doc.document_control_number, envelope.zip_file_name
                ),
                description: format!(
                    "OCR fields validation failed. Validation errors: [{}]",
                    result.errors.join(", ")
                ),
            }
            .into())
        }
        OcrValidationStatus::Unrecognized => {
            let message = format!(
                "Error validating DCN: {}, doc type: {}, doc subtype: {}, envelope: {}.",
                doc.document_control_number,
                doc.document_type,
                doc.subtype_or_none(),
                envelope.zip_file_name
            );
            tracing::error!(zip_file_name = %envelope.zip_file_name, "{message}");
            Err(RejectionError::OcrValidation {
                description: message.clone(),
                message,
            }
            .into())
        }
    }
}
