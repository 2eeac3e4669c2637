use std::{fmt, sync::Arc};

mod async_task;
mod config;
mod export;
mod generation;
mod image_utils;
mod inference;
mod mask;
mod session;
mod storage;
mod tools;
mod viewer;

pub use async_task::*;
pub use config::{Config, ConfigError};
pub use export::*;
pub use generation::*;
pub use image_utils::*;
pub use inference::*;
pub use mask::*;
pub use session::*;
pub use storage::*;
pub use tools::*;
pub use viewer::*;

/// Reference to an image known to the host application (URL, data URL or path).
#[derive(PartialEq, Clone, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ImageRef(Arc<str>);

impl ImageRef {
    pub fn new(uri: impl Into<Arc<str>>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Data urls carry whole images, don't dump them into logs
        if self.0.len() > 64 {
            let end = (0..=48).rev().find(|i| self.0.is_char_boundary(*i)).unwrap_or(0);
            write!(f, "ImageRef({}..)", &self.0[..end])
        } else {
            write!(f, "ImageRef({})", self.0)
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ImageRef {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
