use jsonschema::{Draft, Validator};
use serde_json::Value;
use thiserror::Error;

use crate::pipeline::error::RejectionError;

const METAFILE_SCHEMA: &str = include_str!("metafile-schema.json");

#[derive(Error, Debug)]
pub enum SchemaLoadError {
    #[error("Schema is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema could not be compiled: {0}")]
    Compile(String),
}

/// Compiled metafile schema. Build once and share across envelopes.
pub struct MetafileSchema {
    validator: Validator,
}

impl std::fmt::Debug for MetafileSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetafileSchema").finish_non_exhaustive()
    }
}

impl MetafileSchema {
    /// Compile the schema embedded in the binary.
    pub fn load() -> Result<Self, SchemaLoadError> {
        let schema: Value = serde_json::from_str(METAFILE_SCHEMA)?;
        Self::from_value(&schema)
    }

    pub fn from_value(schema: &Value) -> Result<Self, SchemaLoadError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(schema)
            .map_err(|e| SchemaLoadError::Compile(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Validate a metafile document. Every violation is reported, each
    /// prefixed with the dotted path of the offending value.
    pub fn validate(&self, document: &Value, zip_file_name: &str) -> Result<(), RejectionError> {
        let violations: Vec<String> = self
            .validator
            .iter_errors(document)
            .map(|err| format!("{}: {}", dotted_path(&err.instance_path.to_string()), err))
            .collect();

        if violations.is_empty() {
            return Ok(());
        }

        tracing::info!(
            zip_file_name = %zip_file_name,
            violations = violations.len(),
            "Metafile failed schema validation"
        );
        Err(RejectionError::schema_violation(
            zip_file_name,
            &violations.join("; "),
        ))
    }
}

/// Render a JSON pointer as a dotted path rooted at `$`
/// ("/scannable_items/0/file_name" -> "$.scannable_items.0.file_name").
pub fn dotted_path(pointer: &str) -> String {
    let mut path = String::from("$");
    for segment in pointer.split('/').filter(|s| !s.is_empty()) {
        path.push('.');
        path.push_str(&segment.replace("~1", "/").replace("~0", "~"));
    }
    path
}
