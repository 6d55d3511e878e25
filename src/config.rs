use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "bulkscan-intake";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum size of a single PDF attachment (300 MiB).
pub const MAX_PDF_SIZE: u64 = 314_572_800;

/// Fixed delay between two polling runs when `POLL_DELAY_MS` is unset.
pub const DEFAULT_POLL_DELAY_MS: u64 = 1000;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "bulkscan_intake=info,warn"
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration for the polling service.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub service_name: String,
    pub s2s_token: String,
    pub ocr_validation_url: String,
    /// Root under which per-archive PDF directories are created.
    pub download_path: PathBuf,
    pub poll_delay: Duration,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let number = |name: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(name) {
                None => Ok(default),
                Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    name,
                    value: raw,
                }),
            }
        };

        let download_path = lookup("TMP_FOLDER_PATH_FOR_DOWNLOAD")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        Ok(Self {
            api_url: required("BULK_SCAN_API_URL")?
                .trim_end_matches('/')
                .to_string(),
            service_name: required("BULK_SCAN_SERVICE_NAME")?,
            s2s_token: required("BULK_SCAN_S2S_TOKEN")?,
            ocr_validation_url: required("OCR_VALIDATION_URL")?
                .trim_end_matches('/')
                .to_string(),
            download_path,
            poll_delay: Duration::from_millis(number("POLL_DELAY_MS", DEFAULT_POLL_DELAY_MS)?),
            http_timeout: Duration::from_secs(number(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
        })
    }
}
