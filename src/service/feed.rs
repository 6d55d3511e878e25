use std::fs::File;
use std::io::Seek;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use super::auth::{AuthTokenProvider, SERVICE_AUTHORIZATION};
use crate::models::{EnvelopeProcessAttempt, FeedEnvelope, PendingEnvelopesResponse};
use crate::pipeline::archive::display_size;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Cannot connect to envelope feed at {0}")]
    Connection(String),

    #[error("Envelope feed responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid feed response: {0}")]
    ResponseParsing(String),

    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("Download failed: {0}")]
    Download(#[from] std::io::Error),
}

/// The origin feed of envelopes.
pub trait EnvelopeFeed {
    /// Envelopes waiting to be processed for `service_name`.
    fn pending_envelopes(&self, service_name: &str) -> Result<Vec<FeedEnvelope>, FeedError>;

    /// Fetch the archive behind an envelope's URL into an anonymous temp
    /// file, positioned at the start.
    fn download_archive(&self, url: &Url) -> Result<File, FeedError>;

    /// Record the outcome of one processing attempt.
    fn record_attempt(&self, attempt: &EnvelopeProcessAttempt) -> Result<(), FeedError>;
}

/// Bulk scan API over blocking HTTP.
pub struct BulkScanApiClient {
    base_url: String,
    client: reqwest::blocking::Client,
    auth: Box<dyn AuthTokenProvider + Send + Sync>,
}

impl BulkScanApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        auth: Box<dyn AuthTokenProvider + Send + Sync>,
    ) -> Result<Self, FeedError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            auth,
        })
    }

    pub fn pending_url(&self, service_name: &str) -> String {
        format!("{}/envelopes/{}", self.base_url, service_name)
    }

    pub fn attempt_url(&self, attempt: &EnvelopeProcessAttempt) -> String {
        format!(
            "{}/envelopes/{}/{}/process-attempt/{}",
            self.base_url, attempt.service_name, attempt.envelope_id, attempt.attempt_id
        )
    }

    fn map_send_error(&self, e: reqwest::Error) -> FeedError {
        if e.is_connect() {
            FeedError::Connection(self.base_url.clone())
        } else {
            FeedError::HttpClient(e.to_string())
        }
    }
}

impl EnvelopeFeed for BulkScanApiClient {
    fn pending_envelopes(&self, service_name: &str) -> Result<Vec<FeedEnvelope>, FeedError> {
        tracing::info!(service = %service_name, "Checking for new scanned files");

        let response = self
            .client
            .get(self.pending_url(service_name))
            .header(SERVICE_AUTHORIZATION, self.auth.token()?)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().unwrap_or_default();
            return Err(FeedError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PendingEnvelopesResponse = response
            .json()
            .map_err(|e| FeedError::ResponseParsing(e.to_string()))?;

        Ok(parsed.data)
    }

    fn download_archive(&self, url: &Url) -> Result<File, FeedError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FeedError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut file = tempfile::tempfile()?;
        let written = response
            .copy_to(&mut file)
            .map_err(|e| FeedError::HttpClient(e.to_string()))?;
        file.rewind()?;

        tracing::info!(url = %url, size = %display_size(written), "Archive downloaded");
        Ok(file)
    }

    fn record_attempt(&self, attempt: &EnvelopeProcessAttempt) -> Result<(), FeedError> {
        tracing::info!(
            envelope_id = %attempt.envelope_id,
            status = %attempt.status,
            "Recording processing attempt"
        );

        let response = self
            .client
            .put(self.attempt_url(attempt))
            .header(SERVICE_AUTHORIZATION, self.auth.token()?)
            .json(attempt)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FeedError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            envelope_id = %attempt.envelope_id,
            attempt_id = %attempt.attempt_id,
            "Recorded processing attempt"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessStatus;
    use crate::service::auth::StaticTokenProvider;

    fn client(base: &str) -> BulkScanApiClient {
        BulkScanApiClient::new(
            base,
            Duration::from_secs(5),
            Box::new(StaticTokenProvider::new("token")),
        )
        .unwrap()
    }

    #[test]
    fn pending_url_trims_trailing_slash() {
        let api = client("http://bulk-scan:8080/");
        assert_eq!(api.pending_url("probate"), "http://bulk-scan:8080/envelopes/probate");
    }

    #[test]
    fn attempt_url_has_etag_and_attempt_id() {
        let api = client("http://bulk-scan:8080");
        let attempt = EnvelopeProcessAttempt::new(
            "0x8DA",
            "probate",
            "ok",
            vec![],
            vec![],
            ProcessStatus::Success,
        );
        assert_eq!(
            api.attempt_url(&attempt),
            format!(
                "http://bulk-scan:8080/envelopes/probate/0x8DA/process-attempt/{}",
                attempt.attempt_id
            )
        );
    }

    #[test]
    fn unreachable_feed_is_an_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let api = client("http://127.0.0.1:9");
        assert!(api.pending_envelopes("probate").is_err());
    }
}
