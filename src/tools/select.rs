use log::debug;

use crate::mask::{MaskCanvas, Point};

/// Picked object and the drag in progress.
#[derive(Debug, Default)]
pub(super) struct Selection {
    index: Option<usize>,
    drag: Option<(Point, Point)>,
}

impl Selection {
    pub(super) fn index(&self) -> Option<usize> {
        self.index
    }

    pub(super) fn select(&mut self, index: Option<usize>) {
        self.index = index;
        self.drag = None;
    }

    pub(super) fn press(&mut self, canvas: &MaskCanvas, p: Point) {
        self.index = canvas.scene().object_at(p);
        self.drag = self.index.map(|_| (p, p));
        debug!("Picked object {:?}", self.index);
    }

    pub(super) fn drag_to(&mut self, p: Point) {
        if let Some((_, current)) = &mut self.drag {
            *current = p;
        }
    }

    /// Offset of the running drag, for previews.
    pub(super) fn drag_offset(&self) -> Option<(f32, f32)> {
        self.drag.map(|(from, to)| (to.x - from.x, to.y - from.y))
    }

    pub(super) fn release(&mut self, canvas: &mut MaskCanvas) {
        let (Some(index), Some((dx, dy))) = (self.index, self.drag_offset()) else {
            return;
        };
        self.drag = None;
        if dx != 0.0 || dy != 0.0 {
            canvas.translate_object(index, dx, dy);
        }
    }

    pub(super) fn delete(&mut self, canvas: &mut MaskCanvas) -> bool {
        let removed = self
            .index
            .take()
            .and_then(|index| canvas.remove_object(index))
            .is_some();
        self.drag = None;
        removed
    }
}
