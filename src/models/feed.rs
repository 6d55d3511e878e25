//! Types exchanged with the envelope feed and the OCR validation service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ProcessStatus;

/// One pending envelope as listed by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEnvelope {
    pub etag: String,
    pub file_name: String,
    pub url: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub content_length: u64,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingEnvelopesResponse {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub data: Vec<FeedEnvelope>,
}

/// Outcome of one processing attempt, reported back to the feed exactly once
/// per envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeProcessAttempt {
    pub attempt_id: Uuid,
    pub envelope_id: String,
    pub service_name: String,
    pub timestamp: String,
    pub description: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub status: ProcessStatus,
}

impl EnvelopeProcessAttempt {
    pub fn new(
        envelope_id: impl Into<String>,
        service_name: impl Into<String>,
        description: impl Into<String>,
        warnings: Vec<String>,
        errors: Vec<String>,
        status: ProcessStatus,
    ) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            envelope_id: envelope_id.into(),
            service_name: service_name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            description: description.into(),
            warnings,
            errors,
            status,
        }
    }
}

/// What the downstream consumer reports after handling a valid envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingResponse {
    pub envelope_etag: String,
    pub description: String,
    pub status: ProcessStatus,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OcrValidationStatus {
    Success,
    Warnings,
    Errors,
    #[serde(other)]
    Unrecognized,
}

/// Response of the per-service OCR validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrValidationResult {
    pub status: OcrValidationStatus,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl OcrValidationResult {
    pub fn success() -> Self {
        Self {
            status: OcrValidationStatus::Success,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_warnings(warnings: Vec<String>) -> Self {
        Self {
            status: OcrValidationStatus::Warnings,
            warnings,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(errors: Vec<String>) -> Self {
        Self {
            status: OcrValidationStatus::Errors,
            warnings: Vec::new(),
            errors,
        }
    }
}

/// Warnings returned for the envelope's OCR document, surfaced to caseworkers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrValidationWarnings {
    pub document_control_number: String,
    pub warnings: Vec<String>,
}
