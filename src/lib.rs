pub mod config;
pub mod models;
pub mod pipeline; // Envelope intake: archive → metafile → rules → OCR
pub mod service; // Feed polling and attempt reporting

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use pipeline::archive::PdfStaging;
use pipeline::metadata::SchemaLoadError;
use pipeline::validation::OcrServiceError;
use pipeline::EnvelopeIntake;
use service::{
    start_scan_scheduler, BulkScanApiClient, EnvelopeService, FeedError, HttpOcrValidator,
    LoggingPdfHandler, ScanTask, StagingReceiver, StaticTokenProvider,
};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Metafile schema could not be loaded: {0}")]
    Schema(#[from] SchemaLoadError),

    #[error("Envelope feed client: {0}")]
    Feed(#[from] FeedError),

    #[error("OCR validation client: {0}")]
    OcrClient(#[from] OcrServiceError),

    #[error("Cannot prepare download directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Wire the service from configuration.
pub fn build_service(config: &config::AppConfig) -> Result<EnvelopeService, StartupError> {
    std::fs::create_dir_all(&config.download_path)?;

    let feed = BulkScanApiClient::new(
        &config.api_url,
        config.http_timeout,
        Box::new(StaticTokenProvider::new(config.s2s_token.as_str())),
    )?;
    let ocr_validator = HttpOcrValidator::new(
        &config.ocr_validation_url,
        config.http_timeout,
        Box::new(StaticTokenProvider::new(config.s2s_token.as_str())),
    )?;
    let receiver = StagingReceiver::new(
        PdfStaging::new(&config.download_path),
        Box::new(LoggingPdfHandler),
    );

    Ok(EnvelopeService::new(
        config.service_name.as_str(),
        Box::new(feed),
        EnvelopeIntake::with_embedded_schema()?,
        Box::new(ocr_validator),
        Box::new(receiver),
    ))
}

/// Run the polling service until Ctrl-C.
///
/// The HTTP clients are blocking, so polling runs on its own thread; the
/// tokio runtime only waits for the shutdown signal.
pub fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env()?;
    tracing::info!(
        service = %config.service_name,
        api_url = %config.api_url,
        download_path = %config.download_path.display(),
        "Configuration loaded"
    );

    let service = Arc::new(build_service(&config)?);
    let scheduler = start_scan_scheduler(ScanTask::new(service), config.poll_delay);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for shutdown signal");
        }
    });
    drop(runtime);

    tracing::info!("Shutdown requested");
    drop(scheduler);
    Ok(())
}
