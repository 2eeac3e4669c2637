use egui::{self, Color32, Key, Modifiers, Pos2, Rect, Sense, TextureHandle, TextureOptions, Vec2};
use image::DynamicImage;
use log::info;

use crate::{
    image_utils::{mask_preview, to_color_image},
    mask::{CanvasSettings, MaskCanvas, Point},
    tools::{ToolController, ToolState},
};

const MASK_TINT: [u8; 3] = [64, 160, 255];

/// Keyboard commands of the mask editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    Tool(ToolState),
    GrowBrush,
    ShrinkBrush,
    DeleteSelected,
}

impl Shortcut {
    /// Consumes the first shortcut found in this frame's input.
    /// Nothing is read while a text field has keyboard focus.
    pub fn read(ctx: &egui::Context) -> Option<Self> {
        if ctx.wants_keyboard_input() {
            return None;
        }
        ctx.input_mut(|i| {
            // Redo first, undo would match Cmd+Shift+Z as well
            if i.consume_key(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z) {
                return Some(Shortcut::Redo);
            }
            if i.consume_key(Modifiers::COMMAND, Key::Z) {
                return Some(Shortcut::Undo);
            }
            let tools = [
                (Key::B, ToolState::Brush),
                (Key::E, ToolState::Eraser),
                (Key::R, ToolState::Rectangle),
                (Key::C, ToolState::Circle),
                (Key::V, ToolState::Select),
            ];
            if let Some((_, tool)) = tools
                .into_iter()
                .find(|(key, _)| i.consume_key(Modifiers::NONE, *key))
            {
                return Some(Shortcut::Tool(tool));
            }
            if i.consume_key(Modifiers::NONE, Key::CloseBracket) {
                Some(Shortcut::GrowBrush)
            } else if i.consume_key(Modifiers::NONE, Key::OpenBracket) {
                Some(Shortcut::ShrinkBrush)
            } else if i.consume_key(Modifiers::NONE, Key::Delete)
                || i.consume_key(Modifiers::NONE, Key::Backspace)
            {
                Some(Shortcut::DeleteSelected)
            } else {
                None
            }
        })
    }

    /// Returns whether the canvas changed.
    pub fn apply(self, canvas: &mut MaskCanvas, tools: &mut ToolController) -> bool {
        match self {
            Shortcut::Undo => canvas.undo(),
            Shortcut::Redo => canvas.redo(),
            Shortcut::Tool(tool) => {
                let revision = canvas.revision();
                tools.select_tool(tool, canvas);
                revision != canvas.revision()
            }
            Shortcut::GrowBrush => {
                tools.grow_brush();
                false
            }
            Shortcut::ShrinkBrush => {
                tools.shrink_brush();
                false
            }
            Shortcut::DeleteSelected => tools.delete_selected(canvas),
        }
    }
}

/// Draws the base photo with the mask preview on top and feeds pointer
/// input to the tools.
pub struct CanvasViewer {
    base: Option<TextureHandle>,
    mask: Option<(u64, TextureHandle)>,
    opacity: u8,
}

impl CanvasViewer {
    pub fn new(settings: &CanvasSettings) -> Self {
        Self {
            base: None,
            mask: None,
            opacity: settings.overlay_opacity,
        }
    }

    pub fn set_base(&mut self, ctx: &egui::Context, image: &DynamicImage) {
        let color_image = to_color_image(image);
        match &mut self.base {
            Some(handle) => handle.set(color_image, TextureOptions::LINEAR),
            None => {
                self.base = Some(ctx.load_texture("base", color_image, TextureOptions::LINEAR))
            }
        }
    }

    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        canvas: &mut MaskCanvas,
        tools: &mut ToolController,
    ) -> egui::Response {
        if let Some(shortcut) = Shortcut::read(ui.ctx()) {
            info!("Shortcut {shortcut:?}");
            shortcut.apply(canvas, tools);
        }

        let size = canvas.size();
        let (viewport, response) =
            ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let image_rect = fit_rect(viewport, size);

        let pointer = |pos: Pos2| to_canvas_point(image_rect, size, pos);
        if response.drag_started() {
            if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
                tools.pointer_down(pointer(origin), canvas);
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                tools.pointer_move(pointer(pos));
            }
        }
        if response.drag_stopped() {
            tools.pointer_up(canvas);
        } else if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                tools.pointer_down(pointer(pos), canvas);
                tools.pointer_up(canvas);
            }
        }

        let mask = self.mask_texture(ui.ctx(), canvas);
        let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
        let painter = ui.painter().with_clip_rect(viewport);
        if let Some(base) = &self.base {
            painter.image(base.id(), image_rect, uv, Color32::WHITE);
        }
        painter.image(mask, image_rect, uv, Color32::WHITE);
        response
    }

    fn mask_texture(&mut self, ctx: &egui::Context, canvas: &MaskCanvas) -> egui::TextureId {
        let revision = canvas.revision();
        let (cached, handle) = match self.mask.take() {
            Some((cached, handle)) if cached == revision => (cached, handle),
            Some((_, mut handle)) => {
                handle.set(self.preview(canvas), TextureOptions::NEAREST);
                (revision, handle)
            }
            None => (
                revision,
                ctx.load_texture("mask", self.preview(canvas), TextureOptions::NEAREST),
            ),
        };
        let id = handle.id();
        self.mask = Some((cached, handle));
        id
    }

    fn preview(&self, canvas: &MaskCanvas) -> egui::ColorImage {
        mask_preview(&canvas.to_bitmap(), MASK_TINT, self.opacity)
    }
}

/// Largest rect with the canvas aspect ratio, centered in `viewport`.
pub fn fit_rect(viewport: Rect, [width, height]: [u32; 2]) -> Rect {
    let image = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    let scale = (viewport.width() / image.x).min(viewport.height() / image.y);
    Rect::from_center_size(viewport.center(), image * scale)
}

/// Maps a screen position inside `image_rect` to canvas pixels.
pub fn to_canvas_point(image_rect: Rect, [width, height]: [u32; 2], pos: Pos2) -> Point {
    let rel = (pos - image_rect.min) / image_rect.size();
    Point::new(rel.x * width as f32, rel.y * height as f32)
}
