//! Envelope processing loop.
//!
//! Drives every pending envelope through download → intake → receiver and
//! records exactly one processing attempt per envelope, whatever happened.
//!
//! All collaborators are injected as trait objects so the loop is testable
//! with mock implementations.

use reqwest::Url;
use thiserror::Error;

use super::feed::{EnvelopeFeed, FeedError};
use super::receiver::{EnvelopeReceiver, ReceiverError};
use crate::models::{EnvelopeProcessAttempt, FeedEnvelope, ProcessStatus};
use crate::pipeline::validation::ServiceOcrValidator;
use crate::pipeline::{EnvelopeIntake, IntakeError, RejectionError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why one envelope could not be processed.
#[derive(Debug, Error)]
pub enum EnvelopeFailure {
    #[error("Archive download failed: {0}")]
    Download(#[from] FeedError),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Receiver(#[from] ReceiverError),
}

impl EnvelopeFailure {
    pub fn as_rejection(&self) -> Option<&RejectionError> {
        match self {
            Self::Intake(e) => e.as_rejection(),
            Self::Receiver(e) => e.as_intake().and_then(IntakeError::as_rejection),
            Self::Download(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Counts of one polling run, by reported status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub success: usize,
    pub success_with_warnings: usize,
    pub errors: usize,
    pub fatal: usize,
    /// Attempts the feed failed to record.
    pub unrecorded: usize,
}

impl RunSummary {
    fn count(&mut self, status: ProcessStatus) {
        match status {
            ProcessStatus::Success => self.success += 1,
            ProcessStatus::SuccessWithWarnings => self.success_with_warnings += 1,
            ProcessStatus::Errors => self.errors += 1,
            ProcessStatus::Fatal => self.fatal += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.success_with_warnings + self.errors + self.fatal
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct EnvelopeService {
    service_name: String,
    feed: Box<dyn EnvelopeFeed + Send + Sync>,
    intake: EnvelopeIntake,
    ocr_validator: Box<dyn ServiceOcrValidator + Send + Sync>,
    receiver: Box<dyn EnvelopeReceiver + Send + Sync>,
}

impl EnvelopeService {
    pub fn new(
        service_name: impl Into<String>,
        feed: Box<dyn EnvelopeFeed + Send + Sync>,
        intake: EnvelopeIntake,
        ocr_validator: Box<dyn ServiceOcrValidator + Send + Sync>,
        receiver: Box<dyn EnvelopeReceiver + Send + Sync>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            feed,
            intake,
            ocr_validator,
            receiver,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// List pending envelopes and process them one at a time.
    ///
    /// Only a failure to list is returned as an error; per-envelope failures
    /// end up in the recorded attempt.
    pub fn process_pending(&self) -> Result<RunSummary, FeedError> {
        let envelopes = self.feed.pending_envelopes(&self.service_name)?;
        Ok(self.process_envelopes(&envelopes))
    }

    pub fn process_envelopes(&self, envelopes: &[FeedEnvelope]) -> RunSummary {
        let mut summary = RunSummary::default();

        for feed_envelope in envelopes {
            let attempt = self.process_envelope(feed_envelope);
            summary.count(attempt.status);

            if let Err(e) = self.feed.record_attempt(&attempt) {
                summary.unrecorded += 1;
                tracing::error!(
                    zip_file_name = %feed_envelope.file_name,
                    envelope_id = %attempt.envelope_id,
                    error = %e,
                    "Failed to record processing attempt"
                );
            }
        }

        summary
    }

    /// Process one envelope and build the attempt describing the outcome.
    pub fn process_envelope(&self, feed_envelope: &FeedEnvelope) -> EnvelopeProcessAttempt {
        tracing::info!(
            zip_file_name = %feed_envelope.file_name,
            url = %feed_envelope.url,
            "Processing file"
        );

        let url = match Url::parse(&feed_envelope.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(
                    zip_file_name = %feed_envelope.file_name,
                    url = %feed_envelope.url,
                    error = %e,
                    "Envelope url is malformed"
                );
                return self.attempt(
                    &feed_envelope.etag,
                    format!("Bad url for retrieving envelope {}", feed_envelope.url),
                    Vec::new(),
                    vec![e.to_string()],
                    ProcessStatus::Fatal,
                );
            }
        };

        match self.receive(feed_envelope, &url) {
            Ok(attempt) => attempt,
            Err(failure) => match failure.as_rejection() {
                Some(rejection) => {
                    tracing::warn!(
                        zip_file_name = %feed_envelope.file_name,
                        service = %self.service_name,
                        code = %rejection.code(),
                        reason = %rejection,
                        "Rejected envelope"
                    );
                    tracing::debug!(
                        zip_file_name = %feed_envelope.file_name,
                        description = %rejection.description(),
                        "Rejection details"
                    );
                    self.attempt(
                        &feed_envelope.etag,
                        format!("Rejected Envelope {}", rejection.kind()),
                        Vec::new(),
                        vec![rejection.to_string()],
                        ProcessStatus::Errors,
                    )
                }
                None => {
                    tracing::error!(
                        zip_file_name = %feed_envelope.file_name,
                        service = %self.service_name,
                        error = %failure,
                        "Failed to process file"
                    );
                    self.attempt(
                        &feed_envelope.etag,
                        "Error processing Envelope",
                        Vec::new(),
                        vec![failure.to_string()],
                        ProcessStatus::Fatal,
                    )
                }
            },
        }
    }

    fn receive(
        &self,
        feed_envelope: &FeedEnvelope,
        url: &Url,
    ) -> Result<EnvelopeProcessAttempt, EnvelopeFailure> {
        let mut archive = self.feed.download_archive(url)?;

        let processed = self.intake.process_archive(
            &mut archive,
            feed_envelope,
            &self.service_name,
            self.ocr_validator.as_ref(),
        )?;

        let response = self.receiver.on_envelope_received(&processed, &mut archive)?;

        let status = if processed.has_warnings() && response.status == ProcessStatus::Success {
            ProcessStatus::SuccessWithWarnings
        } else {
            response.status
        };
        let mut warnings = processed.warnings();
        warnings.extend(response.warnings);

        Ok(self.attempt(
            &response.envelope_etag,
            response.description,
            warnings,
            response.errors,
            status,
        ))
    }

    fn attempt(
        &self,
        envelope_id: &str,
        description: impl Into<String>,
        warnings: Vec<String>,
        errors: Vec<String>,
        status: ProcessStatus,
    ) -> EnvelopeProcessAttempt {
        EnvelopeProcessAttempt::new(
            envelope_id,
            self.service_name.as_str(),
            description,
            warnings,
            errors,
            status,
        )
    }
}
