//! Downstream consumers of valid envelopes.

use std::fs::File;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::{ProcessStatus, ProcessingResponse};
use crate::pipeline::archive::{display_size, PdfStaging};
use crate::pipeline::{IntakeError, ProcessedEnvelope};

#[derive(Error, Debug)]
pub enum ReceiverError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error("Envelope consumer failed: {0}")]
    Consumer(String),
}

impl ReceiverError {
    pub fn as_intake(&self) -> Option<&IntakeError> {
        match self {
            Self::Intake(e) => Some(e),
            Self::Consumer(_) => None,
        }
    }
}

/// Takes ownership of a validated envelope and reports what it did with it.
/// `archive` is the downloaded envelope the intake already read.
pub trait EnvelopeReceiver {
    fn on_envelope_received(
        &self,
        processed: &ProcessedEnvelope,
        archive: &mut File,
    ) -> Result<ProcessingResponse, ReceiverError>;
}

/// Handles the PDFs of a validated envelope while they are on disk.
pub trait PdfHandler {
    fn handle(
        &self,
        processed: &ProcessedEnvelope,
        pdfs: &[PathBuf],
    ) -> Result<ProcessingResponse, ReceiverError>;
}

/// Receiver that materialises the PDFs, hands them to a `PdfHandler`, and
/// cleans up afterwards.
pub struct StagingReceiver {
    staging: PdfStaging,
    handler: Box<dyn PdfHandler + Send + Sync>,
}

impl StagingReceiver {
    pub fn new(staging: PdfStaging, handler: Box<dyn PdfHandler + Send + Sync>) -> Self {
        Self { staging, handler }
    }
}

impl EnvelopeReceiver for StagingReceiver {
    fn on_envelope_received(
        &self,
        processed: &ProcessedEnvelope,
        archive: &mut File,
    ) -> Result<ProcessingResponse, ReceiverError> {
        let zip_file_name = processed.feed_envelope.file_name.as_str();
        self.staging
            .extract_pdf_files(archive, zip_file_name, |pdfs| {
                self.handler.handle(processed, pdfs)
            })
    }
}

/// Handler that only logs what it received. Used when no downstream system
/// is configured.
pub struct LoggingPdfHandler;

impl PdfHandler for LoggingPdfHandler {
    fn handle(
        &self,
        processed: &ProcessedEnvelope,
        pdfs: &[PathBuf],
    ) -> Result<ProcessingResponse, ReceiverError> {
        let total: u64 = pdfs
            .iter()
            .filter_map(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .sum();

        tracing::info!(
            zip_file_name = %processed.feed_envelope.file_name,
            classification = %processed.envelope.classification,
            pdf_count = pdfs.len(),
            total_size = %display_size(total),
            "Envelope received"
        );

        Ok(ProcessingResponse {
            envelope_etag: processed.feed_envelope.etag.clone(),
            description: format!(
                "Envelope {} received with {} document(s)",
                processed.feed_envelope.file_name,
                pdfs.len()
            ),
            status: ProcessStatus::Success,
            warnings: Vec::new(),
            errors: Vec::new(),
        })
    }
}
