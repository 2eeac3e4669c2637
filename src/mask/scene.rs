use std::sync::Arc;

use image::GrayAlphaImage;
use serde::{Deserialize, Serialize};

use crate::ImageRef;

pub const MIN_BRUSH_WIDTH: u8 = 1;
pub const MAX_BRUSH_WIDTH: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    fn distance_sq(self, other: Point) -> f32 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }
}

/// What a mask object means for the exported mask. The color on screen is derived from it, never the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Pixels may be modified (white in the mask)
    Include,
    /// Pixels stay untouched (black in the mask)
    Exclude,
}

impl Intent {
    pub fn mask_value(self) -> u8 {
        match self {
            Intent::Include => 255,
            Intent::Exclude => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct BrushWidth(u8);

impl BrushWidth {
    pub fn new(width: u8) -> Self {
        Self(width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn grow(self, by: u8) -> Self {
        Self::new(self.0.saturating_add(by))
    }

    pub fn shrink(self, by: u8) -> Self {
        Self::new(self.0.saturating_sub(by))
    }
}

impl Default for BrushWidth {
    fn default() -> Self {
        Self(20)
    }
}

impl From<u8> for BrushWidth {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<BrushWidth> for u8 {
    fn from(value: BrushWidth) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreehandStroke {
    pub points: Vec<Point>,
    pub width: BrushWidth,
    pub intent: Intent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangleShape {
    pub origin: Point,
    pub width: f32,
    pub height: f32,
    pub intent: Intent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleShape {
    pub center: Point,
    pub radius: f32,
    pub intent: Intent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaskObject {
    Freehand(FreehandStroke),
    Rectangle(RectangleShape),
    Circle(CircleShape),
}

impl MaskObject {
    pub fn intent(&self) -> Intent {
        match self {
            MaskObject::Freehand(s) => s.intent,
            MaskObject::Rectangle(r) => r.intent,
            MaskObject::Circle(c) => c.intent,
        }
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        match self {
            MaskObject::Freehand(s) => MaskObject::Freehand(FreehandStroke {
                points: s.points.iter().map(|p| p.offset(dx, dy)).collect(),
                ..s.clone()
            }),
            MaskObject::Rectangle(r) => MaskObject::Rectangle(RectangleShape {
                origin: r.origin.offset(dx, dy),
                ..*r
            }),
            MaskObject::Circle(c) => MaskObject::Circle(CircleShape {
                center: c.center.offset(dx, dy),
                ..*c
            }),
        }
    }

    /// Hit test used by the select tool.
    pub fn contains(&self, p: Point) -> bool {
        match self {
            MaskObject::Freehand(s) => {
                let r = (s.width.get() as f32 / 2.0).max(1.0);
                match s.points.as_slice() {
                    [] => false,
                    [single] => single.distance_sq(p) <= r * r,
                    points => points
                        .windows(2)
                        .any(|w| distance_to_segment_sq(p, w[0], w[1]) <= r * r),
                }
            }
            MaskObject::Rectangle(r) => {
                let (x0, x1) = ordered(r.origin.x, r.origin.x + r.width);
                let (y0, y1) = ordered(r.origin.y, r.origin.y + r.height);
                (x0..=x1).contains(&p.x) && (y0..=y1).contains(&p.y)
            }
            MaskObject::Circle(c) => c.center.distance_sq(p) <= c.radius * c.radius,
        }
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn distance_to_segment_sq(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_sq(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_sq(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Grayscale image proposed by the segmentation service. Shared between snapshots.
#[derive(Debug, Clone)]
pub struct Overlay(Arc<GrayAlphaImage>);

impl Overlay {
    pub fn new(image: GrayAlphaImage) -> Self {
        Self(Arc::new(image))
    }

    pub fn image(&self) -> &GrayAlphaImage {
        &self.0
    }
}

impl PartialEq for Overlay {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

/// Complete authorable state of the canvas. Cloning is how history snapshots are taken.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    base: ImageRef,
    objects: Vec<MaskObject>,
    overlay: Option<Overlay>,
}

impl Scene {
    pub fn new(base: ImageRef) -> Self {
        Self {
            base,
            objects: Vec::new(),
            overlay: None,
        }
    }

    pub fn base(&self) -> &ImageRef {
        &self.base
    }

    pub fn objects(&self) -> &[MaskObject] {
        &self.objects
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn is_blank(&self) -> bool {
        self.objects.is_empty() && self.overlay.is_none()
    }

    /// Index of the top-most object under `p`.
    pub fn object_at(&self, p: Point) -> Option<usize> {
        self.objects.iter().rposition(|o| o.contains(p))
    }

    pub(crate) fn push(&mut self, object: MaskObject) {
        self.objects.push(object);
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<MaskObject> {
        (index < self.objects.len()).then(|| self.objects.remove(index))
    }

    pub(crate) fn replace(&mut self, index: usize, object: MaskObject) -> Option<MaskObject> {
        self.objects
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, object))
    }

    pub(crate) fn set_overlay(&mut self, overlay: Option<Overlay>) {
        self.overlay = overlay;
    }

    pub(crate) fn clear(&mut self) {
        self.objects.clear();
        self.overlay = None;
    }
}
