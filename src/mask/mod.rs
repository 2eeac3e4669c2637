use image::GrayImage;
use log::info;

use crate::ImageRef;

mod export;
mod history;
mod raster;
mod scene;

pub use export::*;
pub use history::*;
pub use scene::*;

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[non_exhaustive]
#[serde(default)]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,
    pub default_brush_width: BrushWidth,
    /// Where rectangle and circle tools drop their shape
    pub shape_anchor: [f32; 2],
    pub default_rect_size: [f32; 2],
    pub default_circle_radius: f32,
    /// Preview only, has no effect on the exported mask
    pub overlay_opacity: u8,
    pub overlay_threshold: u8,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            default_brush_width: BrushWidth::default(),
            shape_anchor: [100.0, 100.0],
            default_rect_size: [100.0, 100.0],
            default_circle_radius: 50.0,
            overlay_opacity: 128,
            overlay_threshold: 128,
        }
    }
}

impl CanvasSettings {
    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }
}

/// Scene plus history for one editing session.
/// Every structural mutation is recorded before the call returns.
pub struct MaskCanvas {
    size: [u32; 2],
    scene: Scene,
    history: HistoryStack,
    exporter: MaskExporter,
    revision: u64,
}

impl MaskCanvas {
    pub fn new(base: ImageRef, settings: &CanvasSettings) -> Self {
        let scene = Scene::new(base);
        Self {
            size: settings.size(),
            history: HistoryStack::new(scene.clone()),
            scene,
            exporter: MaskExporter::new(settings.overlay_threshold),
            revision: 0,
        }
    }

    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Increases whenever the live scene changes, including undo and redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.history.is_dirty()
    }

    pub fn mark_not_dirty(&mut self) {
        self.history.mark_not_dirty();
    }

    pub fn add_object(&mut self, object: MaskObject) {
        self.scene.push(object);
        self.commit();
    }

    pub fn remove_object(&mut self, index: usize) -> Option<MaskObject> {
        let removed = self.scene.remove(index)?;
        self.commit();
        Some(removed)
    }

    pub fn translate_object(&mut self, index: usize, dx: f32, dy: f32) -> bool {
        let Some(moved) = self.scene.objects().get(index).map(|o| o.translated(dx, dy)) else {
            return false;
        };
        self.scene.replace(index, moved);
        self.commit();
        true
    }

    pub fn set_overlay(&mut self, overlay: Overlay) {
        self.scene.set_overlay(Some(overlay));
        self.commit();
    }

    /// Removes all objects and the overlay. The base image stays.
    pub fn clear(&mut self) {
        self.scene.clear();
        self.commit();
    }

    /// Replaces the live scene without recording.
    pub fn load_snapshot(&mut self, entry: &HistoryEntry) {
        self.scene = entry.scene().clone();
        self.revision += 1;
    }

    pub fn undo(&mut self) -> bool {
        let scene = self.history.undo().map(|e| e.scene().clone());
        let moved = self.replay(scene);
        if moved {
            info!("Undo to entry {}", self.history.index());
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let scene = self.history.redo().map(|e| e.scene().clone());
        let moved = self.replay(scene);
        if moved {
            info!("Redo to entry {}", self.history.index());
        }
        moved
    }

    pub fn to_bitmap(&self) -> GrayImage {
        self.exporter.export(&self.scene, self.size)
    }

    /// Exports the mask as PNG data url for a request's mask reference.
    /// The current history position counts as saved afterwards.
    pub fn mask_ref(&mut self) -> Result<ImageRef, image::ImageError> {
        let url = mask_data_url(&self.to_bitmap())?;
        self.mark_not_dirty();
        info!("Exported {}x{} mask", self.size[0], self.size[1]);
        Ok(ImageRef::from(url))
    }

    fn replay(&mut self, scene: Option<Scene>) -> bool {
        match scene {
            Some(scene) => {
                self.scene = scene;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    fn commit(&mut self) {
        self.history.record(self.scene.clone());
        self.revision += 1;
    }
}
