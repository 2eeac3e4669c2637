use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use futures::{future::BoxFuture, FutureExt};
use image::{
    codecs::jpeg::JpegEncoder,
    DynamicImage, ImageFormat,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    generation::{ImageDownloader, ServiceError},
    ImageRef,
};

mod archive;

pub use archive::ArchiveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Bytes are delivered exactly as the service produced them
    #[default]
    Original,
    Png,
    Jpeg,
    WebP,
}

impl ExportFormat {
    /// Whether the export quality applies to this format.
    pub fn is_lossy(self) -> bool {
        matches!(self, ExportFormat::Jpeg | ExportFormat::WebP)
    }
}

/// Encoder quality in `[10, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 10;
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

impl From<u8> for Quality {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(value: Quality) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    #[default]
    Individual,
    Archive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportJob {
    pub format: ExportFormat,
    pub quality: Option<Quality>,
    pub delivery: Delivery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub file_stem: String,
    pub archive_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            file_stem: "edited-image".to_string(),
            archive_name: "edited-images.zip".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Could not decode image: {0}")]
    Decode(image::ImageError),

    #[error("Could not encode image as {format:?}: {source}")]
    Encode {
        format: ExportFormat,
        source: image::ImageError,
    },

    #[error("Could not encode image as WebP: {0}")]
    WebP(String),

    #[error("Unknown image format")]
    UnknownFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportArtifact {
    Files(Vec<ExportedFile>),
    Archive(ExportedFile),
}

impl ExportArtifact {
    /// Writes every file into `dir` and returns the written paths.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> std::io::Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let files = match self {
            ExportArtifact::Files(files) => files.as_slice(),
            ExportArtifact::Archive(archive) => std::slice::from_ref(archive),
        };
        files
            .iter()
            .map(|file| {
                let path = dir.join(&file.name);
                std::fs::write(&path, &file.bytes)?;
                Ok(path)
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct ExportReport {
    pub artifact: ExportArtifact,
    /// Index into the input and why the image was left out
    pub skipped: Vec<(usize, ConversionError)>,
}

pub struct ResultExporter {
    settings: ExportSettings,
}

impl ResultExporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    /// Converts every image. An image that fails to convert is logged and
    /// skipped, numbering follows the input position so names stay stable.
    pub fn export_all(&self, images: &[Vec<u8>], job: ExportJob) -> Result<ExportReport, ArchiveError> {
        let quality = job.quality.unwrap_or_default();
        if job.quality.is_some() && !job.format.is_lossy() {
            debug!("Quality {} has no effect on {:?}", quality.get(), job.format);
        }
        let mut files = Vec::with_capacity(images.len());
        let mut skipped = Vec::new();

        for (i, bytes) in images.iter().enumerate() {
            match convert(bytes, job.format, quality) {
                Ok((bytes, extension)) => files.push(ExportedFile {
                    name: format!("{}-{}.{extension}", self.settings.file_stem, i + 1),
                    bytes,
                }),
                Err(e) => {
                    warn!("Skipping image {} in export: {e}", i + 1);
                    skipped.push((i, e));
                }
            }
        }
        info!(
            "Exported {} of {} images as {:?}",
            files.len(),
            images.len(),
            job.format
        );

        let artifact = match job.delivery {
            Delivery::Individual => ExportArtifact::Files(files),
            Delivery::Archive => ExportArtifact::Archive(ExportedFile {
                name: self.settings.archive_name.clone(),
                bytes: archive::build_archive(&files)?,
            }),
        };
        Ok(ExportReport { artifact, skipped })
    }
}

impl Default for ResultExporter {
    fn default() -> Self {
        Self::new(ExportSettings::default())
    }
}

/// Fetches every result image, outcomes keep the order of `images`.
pub fn download_results(
    downloader: &dyn ImageDownloader,
    images: &[ImageRef],
) -> BoxFuture<'static, Vec<Result<Vec<u8>, ServiceError>>> {
    let downloads = images.iter().map(|image| downloader.download(image)).collect::<Vec<_>>();
    futures::future::join_all(downloads).boxed()
}

/// Re-encodes one image and returns the bytes with their file extension.
pub fn convert(
    bytes: &[u8],
    format: ExportFormat,
    quality: Quality,
) -> Result<(Vec<u8>, &'static str), ConversionError> {
    let decode = || image::load_from_memory(bytes).map_err(ConversionError::Decode);
    let mut buf = Cursor::new(Vec::new());
    let (encoded, extension) = match format {
        ExportFormat::Original => {
            let extension = image::guess_format(bytes)
                .ok()
                .and_then(|f| f.extensions_str().first().copied())
                .ok_or(ConversionError::UnknownFormat)?;
            return Ok((bytes.to_vec(), extension));
        }
        ExportFormat::Png => (decode()?.write_to(&mut buf, ImageFormat::Png), "png"),
        ExportFormat::Jpeg => (
            // JPEG has no alpha channel
            DynamicImage::ImageRgb8(decode()?.to_rgb8())
                .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality.get())),
            "jpg",
        ),
        ExportFormat::WebP => {
            let rgba = decode()?.to_rgba8();
            let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
                .encode_simple(false, quality.get() as f32)
                .map_err(|e| ConversionError::WebP(format!("{e:?}")))?;
            return Ok((encoded.to_vec(), "webp"));
        }
    };
    encoded.map_err(|source| ConversionError::Encode { format, source })?;
    Ok((buf.into_inner(), extension))
}
