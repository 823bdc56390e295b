//! Remote text-recognition client
//!
//! Wraps the OCR service call with a caller-selected deadline and folds every
//! failure mode (timeout, transport, non-2xx, malformed payload) into a
//! structured result instead of an error, so the scan loop never has to
//! unwind. The caller picks the deadline tier; the client is tier-agnostic.

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use base64::Engine as _;
use serde::Deserialize;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::capture::frame::Frame;
use crate::config::RecognitionSettings;
use crate::error::ErrorKind;

/// Result of one recognition call
#[derive(Debug, Clone)]
pub struct RecognitionResult {
    /// Recognized text; empty unless `succeeded`
    pub text: String,
    /// Whether the service produced usable text
    pub succeeded: bool,
    /// Failure classification when `succeeded` is false
    pub error_kind: Option<ErrorKind>,
}

impl RecognitionResult {
    pub fn success(text: String) -> Self {
        Self {
            text,
            succeeded: true,
            error_kind: None,
        }
    }

    pub fn failure(kind: ErrorKind) -> Self {
        Self {
            text: String::new(),
            succeeded: false,
            error_kind: Some(kind),
        }
    }
}

/// Seam for the remote recognition call, so the capture controller can be
/// driven against fakes in tests.
pub trait Recognize: Send + Sync {
    /// Run recognition on one frame, bounded by `deadline`
    fn recognize(
        &self,
        frame: &Frame,
        deadline: Duration,
    ) -> impl Future<Output = RecognitionResult> + Send;
}

/// Response envelope from the OCR service
#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(rename = "ParsedResults")]
    parsed_results: Option<Vec<ParsedResult>>,
    #[serde(rename = "IsErroredOnProcessing", default)]
    is_errored: bool,
}

#[derive(Debug, Deserialize)]
struct ParsedResult {
    #[serde(rename = "ParsedText", default)]
    parsed_text: String,
}

/// Client for the remote text-recognition service
pub struct RecognitionClient {
    http: reqwest::Client,
    settings: RecognitionSettings,
}

impl RecognitionClient {
    /// Create a client for the configured endpoint.
    ///
    /// No timeout is set on the client itself; deadlines are enforced per
    /// call so the exploratory and final tiers can differ.
    pub fn new(settings: RecognitionSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { http, settings })
    }

    async fn call(&self, payload: String) -> RecognitionResult {
        let form = reqwest::multipart::Form::new()
            .text("base64Image", payload)
            .text("language", self.settings.language.clone())
            .text("isOverlayRequired", "false")
            .text("detectOrientation", "true")
            .text("scale", "true")
            .text("OCREngine", "2");

        let response = match self
            .http
            .post(&self.settings.endpoint)
            .header("apikey", &self.settings.api_key)
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("recognition request failed: {e}");
                return RecognitionResult::failure(ErrorKind::TransportFailure);
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "recognition service returned an error status");
            return RecognitionResult::failure(ErrorKind::TransportFailure);
        }

        match response.json::<OcrResponse>().await {
            Ok(envelope) => interpret_response(envelope),
            Err(e) => {
                warn!("malformed recognition response: {e}");
                RecognitionResult::failure(ErrorKind::TransportFailure)
            }
        }
    }
}

impl Recognize for RecognitionClient {
    fn recognize(
        &self,
        frame: &Frame,
        deadline: Duration,
    ) -> impl Future<Output = RecognitionResult> + Send {
        let payload = frame.to_jpeg().map(|jpeg| {
            format!(
                "data:image/jpeg;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(jpeg)
            )
        });

        async move {
            let payload = match payload {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("frame could not be encoded for recognition: {e}");
                    return RecognitionResult::failure(ErrorKind::DecodeFailure);
                }
            };

            match timeout(deadline, self.call(payload)).await {
                Ok(result) => result,
                Err(_) => {
                    debug!(?deadline, "recognition call timed out");
                    RecognitionResult::failure(ErrorKind::TransportTimeout)
                }
            }
        }
    }
}

/// Map the service envelope into a pipeline result
fn interpret_response(envelope: OcrResponse) -> RecognitionResult {
    if envelope.is_errored {
        return RecognitionResult::failure(ErrorKind::TransportFailure);
    }

    let text = envelope
        .parsed_results
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(|r| r.parsed_text)
        .unwrap_or_default();

    if text.trim().is_empty() {
        return RecognitionResult::failure(ErrorKind::NoTextFound);
    }

    RecognitionResult::success(text)
}
