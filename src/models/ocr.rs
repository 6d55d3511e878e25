use serde::{Deserialize, Serialize};

/// Value of a single OCR field.
///
/// Scanning suppliers send heterogeneous JSON scalars; they are kept as-is
/// and only flattened to text at the OCR validation boundary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OcrValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl OcrValue {
    /// Text form sent to the OCR validation service. Null renders as "".
    pub fn render_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for OcrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrDataField {
    #[serde(rename = "metadata_field_name")]
    pub name: String,
    #[serde(rename = "metadata_field_value", default)]
    pub value: OcrValue,
}

impl OcrDataField {
    pub fn new(name: impl Into<String>, value: impl Into<OcrValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Decoded OCR payload of a scannable item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OcrData {
    #[serde(rename = "Metadata_file", default)]
    pub fields: Vec<OcrDataField>,
}

impl OcrData {
    pub fn new(fields: Vec<OcrDataField>) -> Self {
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_form_fields(&self) -> Vec<FormField> {
        self.fields
            .iter()
            .map(|f| FormField {
                name: f.name.clone(),
                value: f.value.render_text(),
            })
            .collect()
    }
}

/// Name/value pair as the OCR validation service expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
}
