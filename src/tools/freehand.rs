use crate::mask::{BrushWidth, FreehandStroke, Intent, MaskObject, Point};

/// Points collected between pointer down and pointer up.
#[derive(Debug)]
pub(super) struct FreehandCapture {
    points: Vec<Point>,
    width: BrushWidth,
    intent: Intent,
}

impl FreehandCapture {
    pub(super) fn start(p: Point, width: BrushWidth, intent: Intent) -> Self {
        Self {
            points: vec![p],
            width,
            intent,
        }
    }

    pub(super) fn extend(&mut self, p: Point) {
        if self.points.last() != Some(&p) {
            self.points.push(p);
        }
    }

    pub(super) fn finish(self) -> Option<MaskObject> {
        (!self.points.is_empty()).then(|| {
            MaskObject::Freehand(FreehandStroke {
                points: self.points,
                width: self.width,
                intent: self.intent,
            })
        })
    }
}
