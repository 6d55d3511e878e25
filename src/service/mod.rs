pub mod auth;
pub mod feed;
pub mod ocr_client;
pub mod processor; // Per-envelope processing and attempt reporting
pub mod receiver;
pub mod scheduler;

pub use auth::{AuthTokenProvider, StaticTokenProvider, SERVICE_AUTHORIZATION};
pub use feed::{BulkScanApiClient, EnvelopeFeed, FeedError};
pub use ocr_client::HttpOcrValidator;
pub use processor::{EnvelopeFailure, EnvelopeService, RunSummary};
pub use receiver::{
    EnvelopeReceiver, LoggingPdfHandler, PdfHandler, ReceiverError, StagingReceiver,
};
pub use scheduler::{start_scan_scheduler, ScanSchedulerHandle, ScanTask};
