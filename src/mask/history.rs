//! Linear undo/redo over complete scene snapshots.
//! Entries are never mutated after they were recorded, undo and redo only move the pointer.
//! Recording after an undo drops the redo branch.

use log::debug;

use super::Scene;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    position: usize,
    scene: Scene,
}

impl HistoryEntry {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

#[derive(Debug)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    index: usize,
    not_dirty_pos: Option<usize>,
}

impl HistoryStack {
    /// Starts with `initial` as the only entry, which is where undo stops.
    pub fn new(initial: Scene) -> Self {
        Self {
            entries: vec![HistoryEntry {
                position: 0,
                scene: initial,
            }],
            index: 0,
            not_dirty_pos: Some(0),
        }
    }

    /// Number of entries, the initial one included. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.not_dirty_pos != Some(self.index)
    }

    pub fn mark_not_dirty(&mut self) {
        self.not_dirty_pos = Some(self.index);
    }

    pub fn record(&mut self, snapshot: Scene) {
        if let Some(pos) = self.not_dirty_pos {
            if pos > self.index {
                self.not_dirty_pos = None;
            }
        }

        let position = self.index + 1;
        if self.entries.len() > position {
            debug!(
                "Dropping {} redo entries",
                self.entries.len() - position
            );
            self.entries.truncate(position);
        }
        self.entries.push(HistoryEntry {
            position,
            scene: snapshot,
        });
        self.index = position;
    }

    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        self.index = self.index.checked_sub(1)?;
        Some(&self.entries[self.index])
    }

    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index])
    }
}
