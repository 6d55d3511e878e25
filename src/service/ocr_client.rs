use std::time::Duration;

use serde::Serialize;

use super::auth::{AuthTokenProvider, SERVICE_AUTHORIZATION};
use crate::models::{FormField, OcrValidationResult};
use crate::pipeline::validation::{OcrServiceError, ServiceOcrValidator};

/// Request body for `POST /forms/{form_type}/validate-ocr`
#[derive(Serialize)]
struct ValidateOcrRequest<'a> {
    ocr_data_fields: &'a [FormField],
}

/// OCR validator of the receiving service, over blocking HTTP.
pub struct HttpOcrValidator {
    base_url: String,
    client: reqwest::blocking::Client,
    auth: Box<dyn AuthTokenProvider + Send + Sync>,
    timeout: Duration,
}

impl HttpOcrValidator {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        auth: Box<dyn AuthTokenProvider + Send + Sync>,
    ) -> Result<Self, OcrServiceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OcrServiceError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            auth,
            timeout,
        })
    }

    pub fn validate_url(&self, form_type: &str) -> String {
        format!("{}/forms/{}/validate-ocr", self.base_url, form_type)
    }
}

impl ServiceOcrValidator for HttpOcrValidator {
    fn validate(
        &self,
        form_type: &str,
        fields: &[FormField],
    ) -> Result<OcrValidationResult, OcrServiceError> {
        let token = self
            .auth
            .token()
            .map_err(|e| OcrServiceError::Http(e.to_string()))?;

        let response = self
            .client
            .post(self.validate_url(form_type))
            .header(SERVICE_AUTHORIZATION, token)
            .json(&ValidateOcrRequest {
                ocr_data_fields: fields,
            })
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    OcrServiceError::Http(format!(
                        "Request timed out after {}s",
                        self.timeout.as_secs()
                    ))
                } else {
                    OcrServiceError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OcrServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| OcrServiceError::InvalidResponse(e.to_string()))
    }
}
