use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use futures::{future::BoxFuture, FutureExt};
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};

use super::{InferenceError, ProbabilityMap, SegmentationService};
use crate::{async_task::spawn_blocking, generation::blocking_client};

#[derive(Serialize)]
struct SegmentationRequest {
    image: String,
}

#[derive(Deserialize, Debug)]
struct SegmentationResponse {
    width: usize,
    height: usize,
    #[serde(default)]
    data: Vec<f32>,
    #[serde(default)]
    error: Option<String>,
}

impl SegmentationResponse {
    fn into_map(self) -> Result<ProbabilityMap, InferenceError> {
        if let Some(error) = self.error {
            return Err(InferenceError::Service(error));
        }
        let expected = self.width.checked_mul(self.height).ok_or_else(|| {
            InferenceError::UnexpectedOutput(format!(
                "{}x{} map is too large",
                self.width, self.height
            ))
        })?;
        if self.data.len() != expected {
            return Err(InferenceError::UnexpectedOutput(format!(
                "{} values for a {}x{} map",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        Ok(ProbabilityMap::from_shape_vec(
            (self.height, self.width),
            self.data,
        )?)
    }
}

/// Sends the whole image as PNG data url and expects one probability per pixel back.
#[derive(Clone)]
pub struct HttpSegmentationService {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpSegmentationService {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: blocking_client(),
            url: url.into(),
        }
    }

    fn segment_blocking(
        client: reqwest::blocking::Client,
        url: String,
        image: String,
    ) -> Result<ProbabilityMap, InferenceError> {
        let response = client
            .post(url)
            .json(&SegmentationRequest { image })
            .send()
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InferenceError::Service(format!("{status}: {body}")));
        }

        response
            .json::<SegmentationResponse>()
            .map_err(|e| InferenceError::UnexpectedOutput(e.to_string()))?
            .into_map()
    }
}

fn encode_data_url(image: &DynamicImage) -> Result<String, InferenceError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| InferenceError::Unsupported(e.to_string()))?;
    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(buf.get_ref())
    ))
}

impl SegmentationService for HttpSegmentationService {
    fn segment(
        &self,
        image: &DynamicImage,
    ) -> BoxFuture<'static, Result<ProbabilityMap, InferenceError>> {
        let payload = match encode_data_url(image) {
            Ok(p) => p,
            Err(e) => return futures::future::ready(Err(e)).boxed(),
        };
        let client = self.client.clone();
        let url = self.url.clone();
        let call = spawn_blocking(move || Self::segment_blocking(client, url, payload));
        async move {
            call.await
                .map_err(|e| InferenceError::Transport(e.to_string()))
                .and_then(|r| r)
        }
        .boxed()
    }
}
