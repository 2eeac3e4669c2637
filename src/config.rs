use std::path::Path;

use crate::{
    export::ExportSettings, generation::HttpImageGenerator, inference::HttpSegmentationService,
    mask::CanvasSettings, session::ProgressSettings,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    pub generation_url: String,
    pub segmentation_url: String,
    pub canvas: CanvasSettings,
    pub progress: ProgressSettings,
    pub export: ExportSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generation_url: "http://localhost:8000/api/edit".into(),
            segmentation_url: "http://localhost:8000/api/segment".into(),
            canvas: Default::default(),
            progress: Default::default(),
            export: Default::default(),
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn generator(&self) -> HttpImageGenerator {
        HttpImageGenerator::new(self.generation_url.as_str())
    }

    pub fn segmentation(&self) -> HttpSegmentationService {
        HttpSegmentationService::new(self.segmentation_url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = Config::from_json_str(
            r#"{ "generation_url": "https://edit.example", "canvas": { "width": 1024 } }"#,
        )
        .unwrap();
        assert_eq!(config.generation_url, "https://edit.example");
        assert_eq!(config.canvas.width, 1024);
        assert_eq!(config.canvas.height, 600);
        assert_eq!(config.progress, ProgressSettings::default());
        assert_eq!(config.export.archive_name, "edited-images.zip");
    }

    #[test]
    fn brush_width_is_clamped_on_load() {
        let config = Config::from_json_str(r#"{ "canvas": { "default_brush_width": 200 } }"#).unwrap();
        assert_eq!(config.canvas.default_brush_width.get(), 50);
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "progress": {{ "step": 10 }} }}"#).unwrap();
        let config = Config::from_path(file.path()).unwrap();
        assert_eq!(config.progress.step, 10);
        assert_eq!(config.progress.interval_ms, 500);
    }

    #[test]
    fn broken_json_is_a_parse_error() {
        assert!(matches!(
            Config::from_json_str("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }
}
