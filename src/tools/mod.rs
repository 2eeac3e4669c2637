use log::debug;

use crate::mask::{
    BrushWidth, CanvasSettings, CircleShape, Intent, MaskCanvas, MaskObject, Point,
    RectangleShape,
};

mod freehand;
mod select;

use freehand::FreehandCapture;
use select::Selection;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolState {
    #[default]
    Brush,
    Eraser,
    Rectangle,
    Circle,
    Select,
}

impl ToolState {
    pub const ALL: [ToolState; 5] = [
        ToolState::Brush,
        ToolState::Eraser,
        ToolState::Rectangle,
        ToolState::Circle,
        ToolState::Select,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolState::Brush => "Brush",
            ToolState::Eraser => "Eraser",
            ToolState::Rectangle => "Rectangle",
            ToolState::Circle => "Circle",
            ToolState::Select => "Select",
        }
    }
}

/// Active tool and its parameters. Switching tools never records history by
/// itself, only the shape placed by the rectangle and circle tools does.
pub struct ToolController {
    active: ToolState,
    brush_width: BrushWidth,
    anchor: Point,
    rect_size: [f32; 2],
    circle_radius: f32,
    capture: Option<FreehandCapture>,
    selection: Selection,
    /// Canvas revision the selection refers to
    seen_revision: Option<u64>,
}

impl ToolController {
    pub fn new(settings: &CanvasSettings) -> Self {
        let [x, y] = settings.shape_anchor;
        Self {
            active: ToolState::default(),
            brush_width: settings.default_brush_width,
            anchor: Point::new(x, y),
            rect_size: settings.default_rect_size,
            circle_radius: settings.default_circle_radius,
            capture: None,
            selection: Selection::default(),
            seen_revision: None,
        }
    }

    pub fn active(&self) -> ToolState {
        self.active
    }

    pub fn brush_width(&self) -> BrushWidth {
        self.brush_width
    }

    pub fn set_brush_width(&mut self, width: u8) {
        self.brush_width = BrushWidth::new(width);
    }

    pub fn grow_brush(&mut self) {
        self.brush_width = self.brush_width.grow(1);
    }

    pub fn shrink_brush(&mut self) {
        self.brush_width = self.brush_width.shrink(1);
    }

    /// Ink of the freehand tools, `None` when the active tool doesn't draw.
    pub fn ink(&self) -> Option<Intent> {
        match self.active {
            ToolState::Brush => Some(Intent::Include),
            ToolState::Eraser => Some(Intent::Exclude),
            _ => None,
        }
    }

    pub fn is_drawing_enabled(&self) -> bool {
        self.ink().is_some()
    }

    pub fn is_manipulation_enabled(&self) -> bool {
        !self.is_drawing_enabled()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.index()
    }

    pub fn select_tool(&mut self, tool: ToolState, canvas: &mut MaskCanvas) {
        debug!("Tool {:?} -> {:?}", self.active, tool);
        self.capture = None;
        self.active = tool;
        match tool {
            ToolState::Brush | ToolState::Eraser => self.selection.select(None),
            ToolState::Rectangle => {
                let [width, height] = self.rect_size;
                self.place(
                    canvas,
                    MaskObject::Rectangle(RectangleShape {
                        origin: self.anchor,
                        width,
                        height,
                        intent: Intent::Include,
                    }),
                );
            }
            ToolState::Circle => {
                self.place(
                    canvas,
                    MaskObject::Circle(CircleShape {
                        center: self.anchor,
                        radius: self.circle_radius,
                        intent: Intent::Include,
                    }),
                );
            }
            ToolState::Select => {}
        }
    }

    pub fn pointer_down(&mut self, p: Point, canvas: &MaskCanvas) {
        match self.ink() {
            Some(intent) => self.capture = Some(FreehandCapture::start(p, self.brush_width, intent)),
            None => self.selection.press(canvas, p),
        }
        self.seen(canvas);
    }

    pub fn pointer_move(&mut self, p: Point) {
        match &mut self.capture {
            Some(capture) => capture.extend(p),
            None => self.selection.drag_to(p),
        }
    }

    pub fn pointer_up(&mut self, canvas: &mut MaskCanvas) {
        self.sync(canvas);
        if let Some(stroke) = self.capture.take().and_then(FreehandCapture::finish) {
            canvas.add_object(stroke);
        } else {
            self.selection.release(canvas);
        }
        self.seen(canvas);
    }

    /// Offset of the object being dragged, for previews.
    pub fn drag_offset(&self) -> Option<(f32, f32)> {
        self.selection.drag_offset()
    }

    pub fn delete_selected(&mut self, canvas: &mut MaskCanvas) -> bool {
        self.sync(canvas);
        let deleted = self.is_manipulation_enabled() && self.selection.delete(canvas);
        self.seen(canvas);
        deleted
    }

    fn place(&mut self, canvas: &mut MaskCanvas, object: MaskObject) {
        canvas.add_object(object);
        self.selection
            .select(canvas.scene().objects().len().checked_sub(1));
        self.seen(canvas);
    }

    /// Drops the selection if the canvas changed without this controller,
    /// e.g. by undo, redo or clear. The index may point at another object by now.
    fn sync(&mut self, canvas: &MaskCanvas) {
        if self.seen_revision != Some(canvas.revision()) && self.selection.index().is_some() {
            debug!("Canvas changed, dropping selection");
            self.selection.select(None);
        }
    }

    fn seen(&mut self, canvas: &MaskCanvas) {
        self.seen_revision = Some(canvas.revision());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (MaskCanvas, ToolController) {
        let settings = CanvasSettings {
            width: 200,
            height: 200,
            shape_anchor: [50., 50.],
            default_rect_size: [20., 10.],
            default_circle_radius: 5.,
            ..Default::default()
        };
        (
            MaskCanvas::new("kitchen.jpg".into(), &settings),
            ToolController::new(&settings),
        )
    }

    #[test]
    fn switching_tools_does_not_record() {
        let (mut canvas, mut tools) = setup();
        tools.select_tool(ToolState::Eraser, &mut canvas);
        tools.select_tool(ToolState::Select, &mut canvas);
        tools.select_tool(ToolState::Brush, &mut canvas);
        assert_eq!(canvas.history().len(), 1);
    }

    #[test]
    fn brush_and_eraser_set_ink() {
        let (mut canvas, mut tools) = setup();
        assert_eq!(tools.ink(), Some(Intent::Include));
        tools.select_tool(ToolState::Eraser, &mut canvas);
        assert_eq!(tools.ink(), Some(Intent::Exclude));
        tools.select_tool(ToolState::Select, &mut canvas);
        assert_eq!(tools.ink(), None);
        assert!(tools.is_manipulation_enabled());
    }

    #[test]
    fn stroke_is_recorded_on_release_only() {
        let (mut canvas, mut tools) = setup();
        tools.set_brush_width(12);
        tools.pointer_down(Point::new(1., 1.), &canvas);
        tools.pointer_move(Point::new(2., 2.));
        tools.pointer_move(Point::new(2., 2.));
        tools.pointer_move(Point::new(3., 3.));
        assert_eq!(canvas.history().len(), 1);
        tools.pointer_up(&mut canvas);
        assert_eq!(canvas.history().len(), 2);
        let MaskObject::Freehand(stroke) = &canvas.scene().objects()[0] else {
            panic!("expected freehand stroke");
        };
        assert_eq!(stroke.points.len(), 3);
        assert_eq!(stroke.width.get(), 12);
        assert_eq!(stroke.intent, Intent::Include);
    }

    #[test]
    fn rectangle_is_placed_at_anchor_once() {
        let (mut canvas, mut tools) = setup();
        tools.select_tool(ToolState::Rectangle, &mut canvas);
        assert_eq!(canvas.history().len(), 2);
        assert_eq!(
            canvas.scene().objects(),
            &[MaskObject::Rectangle(RectangleShape {
                origin: Point::new(50., 50.),
                width: 20.,
                height: 10.,
                intent: Intent::Include,
            })]
        );
        assert_eq!(tools.active(), ToolState::Rectangle);
        assert!(!tools.is_drawing_enabled());
        assert_eq!(tools.selected(), Some(0));
    }

    #[test]
    fn placed_shape_can_be_dragged() {
        let (mut canvas, mut tools) = setup();
        tools.select_tool(ToolState::Circle, &mut canvas);
        tools.pointer_down(Point::new(50., 50.), &canvas);
        tools.pointer_move(Point::new(60., 55.));
        assert_eq!(tools.drag_offset(), Some((10., 5.)));
        tools.pointer_up(&mut canvas);
        assert_eq!(
            canvas.scene().objects()[0],
            MaskObject::Circle(CircleShape {
                center: Point::new(60., 55.),
                radius: 5.,
                intent: Intent::Include,
            })
        );
        assert_eq!(canvas.history().len(), 3);
    }

    #[test]
    fn click_without_move_does_not_record() {
        let (mut canvas, mut tools) = setup();
        tools.select_tool(ToolState::Circle, &mut canvas);
        tools.select_tool(ToolState::Select, &mut canvas);
        tools.pointer_down(Point::new(50., 50.), &canvas);
        tools.pointer_up(&mut canvas);
        assert_eq!(canvas.history().len(), 2);
        assert_eq!(tools.selected(), Some(0));
    }

    #[test]
    fn delete_selected_removes_object() {
        let (mut canvas, mut tools) = setup();
        tools.select_tool(ToolState::Rectangle, &mut canvas);
        assert!(tools.delete_selected(&mut canvas));
        assert!(canvas.scene().objects().is_empty());
        assert!(!tools.delete_selected(&mut canvas));
        assert_eq!(canvas.history().len(), 3);
    }

    #[test]
    fn undo_drops_stale_selection() {
        let (mut canvas, mut tools) = setup();
        tools.select_tool(ToolState::Rectangle, &mut canvas);
        tools.select_tool(ToolState::Circle, &mut canvas);
        assert_eq!(tools.selected(), Some(1));

        // The circle is gone and another object takes its index
        canvas.undo();
        let replacement = MaskObject::Circle(CircleShape {
            center: Point::new(150., 150.),
            radius: 3.,
            intent: Intent::Exclude,
        });
        canvas.add_object(replacement.clone());

        assert!(!tools.delete_selected(&mut canvas));
        assert_eq!(canvas.scene().objects()[1], replacement);
        assert_eq!(tools.selected(), None);
    }

    #[test]
    fn eraser_cannot_delete() {
        let (mut canvas, mut tools) = setup();
        tools.select_tool(ToolState::Rectangle, &mut canvas);
        tools.select_tool(ToolState::Eraser, &mut canvas);
        assert!(!tools.delete_selected(&mut canvas));
        assert_eq!(canvas.scene().objects().len(), 1);
    }
}
