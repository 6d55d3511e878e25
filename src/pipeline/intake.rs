//! Envelope intake orchestrator.
//!
//! Single entry point that drives one archive through the pipeline:
//! unpack → parse metafile → envelope rules → OCR outcome.
//!
//! The OCR validator is injected per call so the orchestrator stays testable
//! with mock implementations.

use std::io::{Read, Seek};

use crate::models::{Envelope, FeedEnvelope, OcrValidationWarnings};
use crate::pipeline::archive::{read_zip_content_detail, ZipContentDetail};
use crate::pipeline::error::IntakeError;
use crate::pipeline::metadata::{parse_envelope, MetafileSchema, SchemaLoadError};
use crate::pipeline::validation::{assert_ocr_data_is_valid, validate_envelope, ServiceOcrValidator};

/// Result of a successful pass: the parsed envelope and what the archive held.
#[derive(Debug, Clone)]
pub struct ProcessedEnvelope {
    pub feed_envelope: FeedEnvelope,
    pub content: ZipContentDetail,
    pub envelope: Envelope,
    pub ocr_warnings: Option<OcrValidationWarnings>,
}

impl ProcessedEnvelope {
    pub fn has_warnings(&self) -> bool {
        self.ocr_warnings
            .as_ref()
            .is_some_and(|w| !w.warnings.is_empty())
    }

    pub fn warnings(&self) -> Vec<String> {
        self.ocr_warnings
            .as_ref()
            .map(|w| w.warnings.clone())
            .unwrap_or_default()
    }
}

/// Orchestrates envelope intake. Holds the compiled metafile schema.
#[derive(Debug)]
pub struct EnvelopeIntake {
    schema: MetafileSchema,
}

impl EnvelopeIntake {
    pub fn new(schema: MetafileSchema) -> Self {
        Self { schema }
    }

    /// Intake with the embedded metafile schema.
    pub fn with_embedded_schema() -> Result<Self, SchemaLoadError> {
        Ok(Self::new(MetafileSchema::load()?))
    }

    /// Full pipeline for one archive stream.
    ///
    /// 1. Unpack (metafile bytes + PDF names)
    /// 2. Schema-validate and parse the metafile
    /// 3. Envelope rules against the archive contents
    /// 4. OCR presence and service validation
    ///
    /// Stops at the first rejection.
    pub fn process_archive<R: Read + Seek>(
        &self,
        reader: R,
        feed_envelope: &FeedEnvelope,
        service_name: &str,
        ocr_validator: &dyn ServiceOcrValidator,
    ) -> Result<ProcessedEnvelope, IntakeError> {
        let zip_file_name = feed_envelope.file_name.as_str();

        // Step 1: Unpack
        let content = read_zip_content_detail(reader, zip_file_name)?;

        // Step 2: Parse
        let metadata = content.metadata();
        let envelope = parse_envelope(&self.schema, metadata.as_deref(), zip_file_name)?;

        tracing::info!(
            zip_file_name = %zip_file_name,
            service = %service_name,
            payment_dcns = %envelope.payment_dcns().join(","),
            document_dcns = %envelope.document_dcns().join(","),
            case_number = ?envelope.case_number,
            "Parsed envelope"
        );

        // Step 3: Envelope rules
        validate_envelope(&envelope, zip_file_name, content.pdf_file_names())?;

        // Step 4: OCR
        let ocr_warnings = assert_ocr_data_is_valid(&envelope, ocr_validator)?;

        Ok(ProcessedEnvelope {
            feed_envelope: feed_envelope.clone(),
            content,
            envelope,
            ocr_warnings,
        })
    }
}
