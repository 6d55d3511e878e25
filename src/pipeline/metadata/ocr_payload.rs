use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::MetafileError;
use crate::models::OcrData;

/// Decode a base64 OCR payload into its field list.
pub fn decode_ocr_data(encoded: &str) -> Result<OcrData, MetafileError> {
    let json = STANDARD
        .decode(encoded.trim())
        .map_err(|e| MetafileError::OcrDataParse(format!("invalid base64: {e}")))?;

    serde_json::from_slice(&json)
        .map_err(|e| MetafileError::OcrDataParse(format!("invalid OCR json: {e}")))
}

/// Encode an OCR field list the way scanning suppliers send it.
pub fn encode_ocr_data(data: &OcrData) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(data)?;
    Ok(STANDARD.encode(json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OcrDataField, OcrValue};

    #[test]
    fn mixed_values_survive_encoding_as_text() {
        let data = OcrData::new(vec![
            OcrDataField::new("first_name", "John"),
            OcrDataField::new("age", OcrValue::Number(serde_json::Number::from(42u32))),
            OcrDataField::new("consent", OcrValue::Bool(false)),
            OcrDataField::new("middle_name", OcrValue::Null),
        ]);

        let decoded = decode_ocr_data(&encode_ocr_data(&data).unwrap()).unwrap();
        let pairs: Vec<(String, String)> = decoded
            .to_form_fields()
            .into_iter()
            .map(|f| (f.name, f.value))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("first_name".into(), "John".into()),
                ("age".into(), "42".into()),
                ("consent".into(), "false".into()),
                ("middle_name".into(), String::new()),
            ]
        );
    }

    #[test]
    fn decodes_supplier_payload() {
        let encoded = STANDARD.encode(
            r#"{"Metadata_file":[{"metadata_field_name":"key","metadata_field_value":"value"}]}"#,
        );
        let data = decode_ocr_data(&encoded).unwrap();
        assert_eq!(data.fields, vec![OcrDataField::new("key", "value")]);
    }

    #[test]
    fn bad_base64_is_an_ocr_parse_error() {
        let err = decode_ocr_data("not base64 !!").unwrap_err();
        assert!(matches!(err, MetafileError::OcrDataParse(_)));
    }

    #[test]
    fn base64_of_non_json_is_an_ocr_parse_error() {
        let err = decode_ocr_data(&STANDARD.encode("plain text")).unwrap_err();
        assert!(matches!(err, MetafileError::OcrDataParse(msg) if msg.contains("json")));
    }
}
