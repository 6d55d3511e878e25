pub mod archive;
pub mod error;
pub mod intake; // Envelope intake orchestrator
pub mod metadata;
pub mod validation;

pub use error::{IntakeError, OcrPresenceViolation, RejectionError};
pub use intake::{EnvelopeIntake, ProcessedEnvelope};
