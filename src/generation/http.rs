use futures::{future::BoxFuture, FutureExt};
use log::{info, warn};

use super::{EditRequest, EditResult, GenerationResponse, ImageDownloader, ImageGenerator, ServiceError};
use crate::{async_task::spawn_blocking, ImageRef};

/// Client for the image generation endpoint. No retries, no timeout: a call
/// ends when the service answers or the connection fails.
#[derive(Clone)]
pub struct HttpImageGenerator {
    client: reqwest::blocking::Client,
    url: String,
}

/// Client shared by the HTTP adapters. Calls run until the service answers,
/// reqwest's default timeout is switched off.
pub(crate) fn blocking_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(None::<std::time::Duration>)
        .build()
        .unwrap_or_else(|e| {
            warn!("Falling back to default http client: {e}");
            reqwest::blocking::Client::new()
        })
}

impl HttpImageGenerator {
    pub fn new(url: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            client: blocking_client(),
            url: url.trim_end_matches('/').to_string(),
        }
    }

    fn generate_blocking(
        client: reqwest::blocking::Client,
        url: String,
        request: EditRequest,
    ) -> Result<EditResult, ServiceError> {
        let response = client
            .post(url)
            .json(&request)
            .send()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        // The service reports failures in the body, also on error statuses
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        match serde_json::from_str::<GenerationResponse>(&body) {
            Ok(parsed) => parsed.into_result(&request),
            Err(_) if !status.is_success() => Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(ServiceError::Malformed(e.to_string())),
        }
    }

    fn download_blocking(
        client: reqwest::blocking::Client,
        image: ImageRef,
    ) -> Result<Vec<u8>, ServiceError> {
        let response = client
            .get(image.as_str())
            .send()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| ServiceError::Transport(e.to_string()))
    }
}

impl ImageGenerator for HttpImageGenerator {
    fn generate(&self, request: &EditRequest) -> BoxFuture<'static, Result<EditResult, ServiceError>> {
        info!(
            "Submitting {:?} edit for {:?}",
            request.edit_type(),
            request.source()
        );
        let client = self.client.clone();
        let url = self.url.clone();
        let request = request.clone();
        let call = spawn_blocking(move || Self::generate_blocking(client, url, request));
        async move {
            let result = call.await.map_err(ServiceError::from).and_then(|r| r);
            if let Err(e) = &result {
                warn!("Generation failed: {e}");
            }
            result
        }
        .boxed()
    }
}

impl ImageDownloader for HttpImageGenerator {
    fn download(&self, image: &ImageRef) -> BoxFuture<'static, Result<Vec<u8>, ServiceError>> {
        let client = self.client.clone();
        let image = image.clone();
        let call = spawn_blocking(move || Self::download_blocking(client, image));
        async move { call.await.map_err(ServiceError::from).and_then(|r| r) }.boxed()
    }
}
