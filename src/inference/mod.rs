use std::sync::Arc;

use futures::{future::BoxFuture, FutureExt};
use image::{DynamicImage, GrayAlphaImage, LumaA};
use log::{info, warn};
use ndarray::Array2;

use crate::{
    async_task::AsyncTask,
    mask::{MaskCanvas, Overlay},
};

mod http;

pub use http::HttpSegmentationService;

/// Per pixel foreground probability in `[0, 1]`, indexed `[row, column]`.
pub type ProbabilityMap = Array2<f32>;

#[derive(Debug, thiserror::Error, Clone)]
pub enum InferenceError {
    #[error("Segmentation service unreachable: {0}")]
    Transport(String),

    #[error("Segmentation failed: {0}")]
    Service(String),

    #[error("Unexpected segmentation output: {0}")]
    UnexpectedOutput(String),

    #[error("Auto mask is not available: {0}")]
    Unsupported(String),

    #[error("Other: {0:?}")]
    Other(Arc<dyn std::error::Error + Send + Sync>),
}

impl From<ndarray::ShapeError> for InferenceError {
    fn from(value: ndarray::ShapeError) -> Self {
        Self::UnexpectedOutput(value.to_string())
    }
}

pub trait SegmentationService {
    fn segment(&self, image: &DynamicImage)
        -> BoxFuture<'static, Result<ProbabilityMap, InferenceError>>;
}

/// Scales probabilities linearly to 0..=255 gray with full opacity.
pub fn probability_map_to_overlay(map: &ProbabilityMap) -> Result<Overlay, InferenceError> {
    let (rows, cols) = map.dim();
    if rows == 0 || cols == 0 {
        return Err(InferenceError::UnexpectedOutput(format!(
            "empty probability map ({cols}x{rows})"
        )));
    }
    let width = u32::try_from(cols).map_err(|e| InferenceError::Other(Arc::new(e)))?;
    let height = u32::try_from(rows).map_err(|e| InferenceError::Other(Arc::new(e)))?;

    let image = GrayAlphaImage::from_fn(width, height, |x, y| {
        let p = map[[y as usize, x as usize]];
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        LumaA([(p * 255.0).round() as u8, 255])
    });
    Ok(Overlay::new(image))
}

pub fn request_auto_mask(
    service: &dyn SegmentationService,
    image: &DynamicImage,
) -> BoxFuture<'static, Result<Overlay, InferenceError>> {
    let segmentation = service.segment(image);
    async move {
        let map = segmentation.await?;
        probability_map_to_overlay(&map)
    }
    .boxed()
}

/// Auto mask request owned by the editing view.
pub struct AutoMaskTask(AsyncTask<Result<Overlay, InferenceError>>);

impl AutoMaskTask {
    pub fn start(service: &dyn SegmentationService, image: &DynamicImage) -> Self {
        info!("Requesting auto mask for {}x{} image", image.width(), image.height());
        Self(AsyncTask::new(request_auto_mask(service, image)))
    }

    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }

    /// Installs the overlay once it arrived. A failure leaves the canvas untouched.
    pub fn poll_install(&mut self, canvas: &mut MaskCanvas) -> Option<Result<(), InferenceError>> {
        let result = self.0.poll_ready()?;
        Some(match result {
            Ok(overlay) => {
                canvas.set_overlay(overlay);
                Ok(())
            }
            Err(e) => {
                warn!("Auto mask failed: {e}");
                Err(e)
            }
        })
    }
}
