use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::ImageRef;

mod http;
mod quick_action;
mod request;

pub(crate) use http::blocking_client;
pub use http::HttpImageGenerator;
pub use quick_action::*;
pub use request::*;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Service responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// `success: false`, message is shown to the user as is
    #[error("{0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Request was dropped before it completed")]
    Canceled,
}

impl From<futures::channel::oneshot::Canceled> for ServiceError {
    fn from(_: futures::channel::oneshot::Canceled) -> Self {
        Self::Canceled
    }
}

/// Successful generation and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditResult {
    pub source: ImageRef,
    pub images: Vec<ImageRef>,
    pub model: Option<String>,
    pub quality: QualityPreset,
}

pub trait ImageGenerator {
    fn generate(&self, request: &EditRequest) -> BoxFuture<'static, Result<EditResult, ServiceError>>;
}

/// Fetches generated images so they can be converted or bundled.
pub trait ImageDownloader {
    fn download(&self, image: &ImageRef) -> BoxFuture<'static, Result<Vec<u8>, ServiceError>>;
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GeneratedImage {
    pub url: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(default)]
    pub images: Vec<GeneratedImage>,
    #[serde(default)]
    pub error: Option<String>,
}

impl GenerationResponse {
    pub fn into_result(self, request: &EditRequest) -> Result<EditResult, ServiceError> {
        if !self.success {
            return Err(ServiceError::Rejected(
                self.error.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }
        if self.images.is_empty() {
            return Err(ServiceError::Malformed("no images in response".to_string()));
        }
        let source = request
            .source()
            .cloned()
            .ok_or_else(|| ServiceError::Malformed("request had no source".to_string()))?;
        let model = self.images.iter().find_map(|i| i.model.clone());
        Ok(EditResult {
            source,
            images: self.images.into_iter().map(|i| ImageRef::new(i.url)).collect(),
            model,
            quality: request.quality_preset(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_response_surfaces_error_verbatim() {
        let response: GenerationResponse =
            serde_json::from_str(r#"{"success":false,"error":"Prompt violates policy"}"#).unwrap();
        let err = response
            .into_result(&EditRequest::new("a.jpg", "x"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Prompt violates policy");
    }

    #[test]
    fn success_keeps_provenance() {
        let response: GenerationResponse = serde_json::from_str(
            r#"{"success":true,"images":[{"url":"https://cdn/1.png","model":"flux-pro"},{"url":"https://cdn/2.png"}]}"#,
        )
        .unwrap();
        let request = EditRequest::new("a.jpg", "x").with_quality(QualityPreset::Ultra);
        let result = response.into_result(&request).unwrap();
        assert_eq!(result.images.len(), 2);
        assert_eq!(result.model.as_deref(), Some("flux-pro"));
        assert_eq!(result.quality, QualityPreset::Ultra);
        assert_eq!(result.source.as_str(), "a.jpg");
    }

    #[test]
    fn success_without_images_is_malformed() {
        let response = GenerationResponse {
            success: true,
            images: vec![],
            error: None,
        };
        assert!(matches!(
            response.into_result(&EditRequest::new("a.jpg", "x")),
            Err(ServiceError::Malformed(_))
        ));
    }
}
