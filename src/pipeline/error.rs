//! Rejection taxonomy for the envelope intake pipeline.
//!
//! A rejection is terminal for the envelope and is reported to the feed as
//! `ERRORS`. Anything that is not a `RejectionError` is an infrastructure
//! failure and is reported as `FATAL`.

use thiserror::Error;

use crate::models::ErrorCode;
use crate::pipeline::archive::ArchiveError;
use crate::pipeline::metadata::MetafileError;
use crate::pipeline::validation::OcrServiceError;

/// Why the OCR presence check refused an envelope, in check order.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrPresenceViolation {
    #[error("Multiple docs with OCR")]
    MultipleDocuments,

    #[error("OCR on document of invalid type")]
    InvalidDocumentType,

    #[error("Empty OCR on 'form' document")]
    MissingOcr,

    #[error("Missing subtype on document with OCR")]
    MissingSubtype,
}

#[derive(Error, Debug)]
pub enum RejectionError {
    #[error("Zip '{zip_file_name}' contains non-pdf file: {entry_name}")]
    NonPdfFile {
        zip_file_name: String,
        entry_name: String,
    },

    #[error("Zip '{zip_file_name}' contains multiple metadata files: {first}, {second}")]
    MultipleMetadataFiles {
        zip_file_name: String,
        first: String,
        second: String,
    },

    #[error("Pdf {file_name} size={size} exceeds the max limit={max}")]
    FileSizeExceeded { file_name: String, size: u64, max: u64 },

    #[error("No metadata file found in the zip file")]
    MetadataNotFound,

    /// Schema violations and malformed embedded values share this variant so
    /// the feed sees one error class for every unusable metafile.
    #[error("{message}")]
    InvalidSchema {
        message: String,
        #[source]
        cause: Option<MetafileError>,
    },

    #[error("Name of the uploaded zip file does not match with field \"zip_file_name\" in the metadata")]
    ZipNameMismatch {
        declared: String,
        actual: String,
    },

    #[error("{0}")]
    OcrDataNotFound(String),

    #[error("{0}")]
    FileNameIrregularities(String),

    #[error("{0}")]
    DuplicateDcns(String),

    #[error("{0}")]
    DisallowedDocumentTypes(String),

    #[error("{0}")]
    OcrPresence(#[from] OcrPresenceViolation),

    /// `message` is caller-safe; `description` may quote OCR content.
    #[error("{message}")]
    OcrValidation {
        message: String,
        description: String,
    },
}

impl RejectionError {
    pub fn schema_violation(zip_file_name: &str, report: &str) -> Self {
        Self::InvalidSchema {
            message: format!(
                "Failed validation for file {zip_file_name} against schema. Errors: {report}"
            ),
            cause: None,
        }
    }

    pub fn unparseable_metafile(zip_file_name: &str, cause: MetafileError) -> Self {
        Self::InvalidSchema {
            message: format!("Error occurred while parsing metafile of {zip_file_name}: {cause}"),
            cause: Some(cause),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NonPdfFile { .. }
            | Self::MultipleMetadataFiles { .. }
            | Self::FileSizeExceeded { .. }
            | Self::MetadataNotFound => ErrorCode::ZipProcessingFailed,
            _ => ErrorCode::MetafileInvalid,
        }
    }

    /// Full description of the failure. May contain submission data and must
    /// not be shown where only the message is appropriate.
    pub fn description(&self) -> String {
        match self {
            Self::OcrValidation { description, .. } => description.clone(),
            Self::ZipNameMismatch { declared, actual } => format!(
                "{self} (declared: {declared}, actual: {actual})"
            ),
            other => other.to_string(),
        }
    }

    /// Short name of the rejection kind, used in attempt descriptions.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NonPdfFile { .. } => "NonPdfFileFound",
            Self::MultipleMetadataFiles { .. } => "MultipleMetadataFiles",
            Self::FileSizeExceeded { .. } => "FileSizeExceedMaxUploadLimit",
            Self::MetadataNotFound => "MetadataNotFound",
            Self::InvalidSchema { .. } => "InvalidEnvelopeSchema",
            Self::ZipNameMismatch { .. } => "ZipNameNotMatchingMetaData",
            Self::OcrDataNotFound(_) => "OcrDataNotFound",
            Self::FileNameIrregularities(_) => "FileNameIrregularities",
            Self::DuplicateDcns(_) => "DuplicateDocumentControlNumbersInEnvelope",
            Self::DisallowedDocumentTypes(_) => "DisallowedDocumentTypes",
            Self::OcrPresence(_) => "OcrPresence",
            Self::OcrValidation { .. } => "OcrValidation",
        }
    }
}

/// Failure of one pass through the intake pipeline.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error(transparent)]
    Rejected(#[from] RejectionError),

    #[error("Archive could not be read: {0}")]
    Archive(#[from] ArchiveError),

    #[error("OCR validation service failed: {0}")]
    OcrService(#[from] OcrServiceError),
}

impl IntakeError {
    pub fn as_rejection(&self) -> Option<&RejectionError> {
        match self {
            Self::Rejected(r) => Some(r),
            _ => None,
        }
    }
}
