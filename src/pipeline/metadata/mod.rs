pub mod dates;
pub mod ocr_payload;
pub mod parser;
pub mod schema;

pub use dates::*;
pub use ocr_payload::*;
pub use parser::*;
pub use schema::*;

use thiserror::Error;

/// Malformed value inside an otherwise schema-valid metafile.
#[derive(Error, Debug)]
pub enum MetafileError {
    #[error("Date '{value}' does not match pattern {pattern}")]
    InvalidDateFormat {
        value: String,
        pattern: &'static str,
        #[source]
        source: Option<chrono::ParseError>,
    },

    #[error("Failed to parse OCR data: {0}")]
    OcrDataParse(String),

    #[error("Malformed metafile: {0}")]
    Json(#[from] serde_json::Error),
}
