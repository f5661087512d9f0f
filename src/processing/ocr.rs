// Thin client for an OCR.space-style text extraction service.
//
// The service itself is an external collaborator; verification only consumes
// the OcrResult contract. A well-formed error response from the service maps
// onto the soft-failure shape (success == false) so the caller still gets a
// decision with reasons; only transport problems surface as errors.
use crate::models::OcrResult;
use crate::utils::VerifyError;
use reqwest::blocking::multipart;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_OCR_ENDPOINT: &str = "https://api.ocr.space/parse/image";

const OCR_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OcrClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl OcrClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, VerifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(OCR_TIMEOUT)
            .build()?;
        Ok(OcrClient {
            client,
            endpoint: DEFAULT_OCR_ENDPOINT.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Send an image to the OCR service and map the response onto the
    /// OcrResult contract.
    pub fn parse_image(&self, path: &Path) -> Result<OcrResult, VerifyError> {
        let form = multipart::Form::new()
            .text("apikey", self.api_key.clone())
            .text("language", "eng")
            .text("isOverlayRequired", "false")
            .text("OCREngine", "2")
            .file("file", path)?;

        let response = self.client.post(&self.endpoint).multipart(form).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::Ocr(format!(
                "OCR service returned HTTP {}",
                status
            )));
        }
        let body: OcrSpaceResponse = response.json()?;
        Ok(body.into_result())
    }
}

#[derive(Debug, Deserialize)]
struct OcrSpaceResponse {
    #[serde(rename = "ParsedResults", default)]
    parsed_results: Option<Vec<OcrSpaceParsedResult>>,
    #[serde(rename = "IsErroredOnProcessing", default)]
    is_errored_on_processing: bool,
    #[serde(rename = "ErrorMessage", default)]
    error_message: Option<ErrorMessages>,
}

#[derive(Debug, Deserialize)]
struct OcrSpaceParsedResult {
    #[serde(rename = "ParsedText", default)]
    parsed_text: String,
}

// The service reports errors as either a string or a list of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessages {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessages {
    fn join(&self) -> String {
        match self {
            ErrorMessages::One(message) => message.clone(),
            ErrorMessages::Many(messages) => messages.join("; "),
        }
    }
}

impl OcrSpaceResponse {
    fn into_result(self) -> OcrResult {
        if self.is_errored_on_processing {
            let error = self
                .error_message
                .as_ref()
                .map(ErrorMessages::join)
                .unwrap_or_else(|| "unknown OCR processing error".to_string());
            return OcrResult {
                success: false,
                error: Some(error),
                ..Default::default()
            };
        }
        let extracted_text = self
            .parsed_results
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.parsed_text)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();
        // The service reports no mean confidence; an empty parse is treated
        // as zero-confidence success so verification can soft-fail on it.
        let confidence = if extracted_text.is_empty() { 0.0 } else { 1.0 };
        OcrResult {
            success: true,
            extracted_text,
            confidence,
            bounding_boxes: None,
            error: None,
        }
    }
}
