use futures::{
    future::{ready, BoxFuture},
    FutureExt,
};
use image::{DynamicImage, RgbImage};
use mask_studio::{
    AutoMaskTask, CanvasSettings, InferenceError, Intent, MaskCanvas, MaskObject, Point,
    ProbabilityMap, RectangleShape, SegmentationService, ToolController, ToolState,
};

fn settings() -> CanvasSettings {
    let mut settings = CanvasSettings::default();
    settings.width = 64;
    settings.height = 48;
    settings.shape_anchor = [10.0, 10.0];
    settings.default_rect_size = [8.0, 8.0];
    settings.default_circle_radius = 4.0;
    settings
}

fn rect(x: f32, intent: Intent) -> MaskObject {
    MaskObject::Rectangle(RectangleShape {
        origin: Point::new(x, 4.0),
        width: 6.0,
        height: 6.0,
        intent,
    })
}

struct FailingService;

impl SegmentationService for FailingService {
    fn segment(&self, _image: &DynamicImage) -> BoxFuture<'static, Result<ProbabilityMap, InferenceError>> {
        ready(Err(InferenceError::Transport("connection refused".into()))).boxed()
    }
}

struct HalfService;

impl SegmentationService for HalfService {
    fn segment(&self, image: &DynamicImage) -> BoxFuture<'static, Result<ProbabilityMap, InferenceError>> {
        let (w, h) = (image.width() as usize, image.height() as usize);
        ready(Ok(ProbabilityMap::from_shape_fn((h, w), |(_, x)| {
            if x < w / 2 {
                1.0
            } else {
                0.0
            }
        })))
        .boxed()
    }
}

fn photo() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::new(64, 48))
}

#[test]
fn undo_walks_back_every_mutation() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut canvas = MaskCanvas::new("living-room.jpg".into(), &settings());
    let initial = canvas.scene().clone();

    let mut snapshots = vec![initial.clone()];
    for i in 0..5 {
        canvas.add_object(rect(i as f32 * 8.0, Intent::Include));
        snapshots.push(canvas.scene().clone());
    }
    for expected in snapshots.iter().rev().skip(1) {
        assert!(canvas.undo());
        assert_eq!(canvas.scene(), expected);
    }
    assert_eq!(canvas.scene(), &initial);
    assert!(!canvas.undo());
    assert_eq!(canvas.scene(), &initial);

    while canvas.redo() {}
    assert_eq!(canvas.scene(), snapshots.last().unwrap());
    assert!(!canvas.redo());
}

#[test]
fn recording_after_undo_drops_redo_branch() {
    let mut canvas = MaskCanvas::new("living-room.jpg".into(), &settings());
    canvas.add_object(rect(0.0, Intent::Include));
    canvas.add_object(rect(10.0, Intent::Include));
    canvas.undo();
    canvas.add_object(rect(20.0, Intent::Exclude));
    assert!(!canvas.redo());
    assert_eq!(canvas.scene().objects().len(), 2);
    assert_eq!(canvas.scene().objects()[1], rect(20.0, Intent::Exclude));
}

#[test]
fn export_is_binary_and_repeatable() {
    let mut canvas = MaskCanvas::new("living-room.jpg".into(), &settings());
    assert!(canvas.to_bitmap().pixels().all(|p| p.0[0] == 0));

    canvas.add_object(rect(0.0, Intent::Include));
    canvas.add_object(rect(3.0, Intent::Exclude));
    let first = canvas.to_bitmap();
    assert_eq!(first, canvas.to_bitmap());
    assert_eq!(first.dimensions(), (64, 48));
    assert!(first.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    // Eraser wins where it was painted later
    assert_eq!(first.get_pixel(1, 6).0[0], 255);
    assert_eq!(first.get_pixel(5, 6).0[0], 0);
}

#[test]
fn failed_auto_mask_leaves_editor_usable() {
    let mut canvas = MaskCanvas::new("living-room.jpg".into(), &settings());
    let mut tools = ToolController::new(&settings());
    canvas.add_object(rect(0.0, Intent::Include));
    let before = canvas.scene().clone();

    let mut task = AutoMaskTask::start(&FailingService, &photo());
    let outcome = task.poll_install(&mut canvas);
    assert!(matches!(outcome, Some(Err(InferenceError::Transport(_)))));
    assert_eq!(canvas.scene(), &before);
    assert!(canvas.scene().overlay().is_none());

    tools.select_tool(ToolState::Brush, &mut canvas);
    tools.pointer_down(Point::new(30.0, 30.0), &canvas);
    tools.pointer_move(Point::new(40.0, 30.0));
    tools.pointer_up(&mut canvas);
    assert_eq!(canvas.scene().objects().len(), 2);
    assert!(matches!(canvas.scene().objects()[1], MaskObject::Freehand(_)));
}

#[test]
fn auto_mask_is_undoable_and_exported() {
    let mut canvas = MaskCanvas::new("living-room.jpg".into(), &settings());
    let mut task = AutoMaskTask::start(&HalfService, &photo());
    assert!(matches!(task.poll_install(&mut canvas), Some(Ok(()))));
    assert!(task.is_finished());

    let mask = canvas.to_bitmap();
    assert_eq!(mask.get_pixel(0, 0).0[0], 255);
    assert_eq!(mask.get_pixel(63, 0).0[0], 0);

    assert!(canvas.undo());
    assert!(canvas.scene().overlay().is_none());
}

#[test]
fn select_drag_moves_one_object() {
    let mut canvas = MaskCanvas::new("living-room.jpg".into(), &settings());
    let mut tools = ToolController::new(&settings());
    tools.select_tool(ToolState::Rectangle, &mut canvas);
    let entries = canvas.history().len();

    tools.pointer_down(Point::new(12.0, 12.0), &canvas);
    tools.pointer_move(Point::new(22.0, 17.0));
    tools.pointer_up(&mut canvas);

    assert_eq!(canvas.history().len(), entries + 1);
    let MaskObject::Rectangle(moved) = &canvas.scene().objects()[0] else {
        panic!("expected rectangle");
    };
    assert_eq!(moved.origin, Point::new(20.0, 15.0));

    assert!(tools.delete_selected(&mut canvas));
    assert!(canvas.scene().objects().is_empty());
}
