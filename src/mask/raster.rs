use image::{GrayImage, Luma};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_filled_rect_mut, BresenhamLineIter},
    rect::Rect,
};

use super::{CircleShape, FreehandStroke, MaskObject, RectangleShape};

/// Fills the geometry of `object` with `value`. Geometry outside the image is clipped.
pub(crate) fn paint_object(img: &mut GrayImage, object: &MaskObject, value: u8) {
    let color = Luma([value]);
    match object {
        MaskObject::Freehand(stroke) => paint_stroke(img, stroke, color),
        MaskObject::Rectangle(rect) => paint_rectangle(img, rect, color),
        MaskObject::Circle(circle) => paint_circle(img, circle, color),
    }
}

fn paint_stroke(img: &mut GrayImage, stroke: &FreehandStroke, color: Luma<u8>) {
    let radius = (stroke.width.get() / 2) as i32;
    let stamp = |img: &mut GrayImage, (x, y): (i32, i32)| {
        draw_filled_circle_mut(img, (x, y), radius, color);
    };

    let mut points = stroke.points.iter().map(|p| (p.x, p.y));
    let Some(first) = points.next() else {
        return;
    };
    stamp(img, round(first));
    points.fold(first, |last, next| {
        for pixel in BresenhamLineIter::new(last, next) {
            stamp(img, pixel);
        }
        stamp(img, round(next));
        next
    });
}

fn paint_rectangle(img: &mut GrayImage, rect: &RectangleShape, color: Luma<u8>) {
    let (x0, x1) = min_max(rect.origin.x, rect.origin.x + rect.width);
    let (y0, y1) = min_max(rect.origin.y, rect.origin.y + rect.height);
    let width = (x1 - x0).round().max(1.0) as u32;
    let height = (y1 - y0).round().max(1.0) as u32;
    draw_filled_rect_mut(
        img,
        Rect::at(x0.round() as i32, y0.round() as i32).of_size(width, height),
        color,
    );
}

fn paint_circle(img: &mut GrayImage, circle: &CircleShape, color: Luma<u8>) {
    draw_filled_circle_mut(
        img,
        round((circle.center.x, circle.center.y)),
        circle.radius.max(0.0).round() as i32,
        color,
    );
}

fn round((x, y): (f32, f32)) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

fn min_max(a: f32, b: f32) -> (f32, f32) {
    (a.min(b), a.max(b))
}
