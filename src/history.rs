//! Undo/redo stack.
//!
//! Entries before the cursor have been applied; entries at or after it are the
//! redo tail. Executing a new command truncates the tail, so history never
//! branches. An optional limit evicts the oldest applied entry.
//!
//! Entries that leave the history (truncated, evicted or cleared) release
//! the detached nodes only they were keeping alive.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::HashSet;

use crate::command::{Command, Direction};
use crate::scene::{NodeId, Scene, SceneError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: Vec<Command>,
    cursor: usize,
    limit: Option<usize>,
}

impl History {
    /// Unbounded history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// History retaining at most `limit` entries (`None` for unbounded).
    #[must_use]
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self { limit, ..Self::default() }
    }

    /// Apply `command` and record it. On failure nothing is recorded and the
    /// redo tail is kept.
    pub fn execute(&mut self, command: Command, scene: &mut Scene) -> Result<(), SceneError> {
        command.execute(scene)?;
        let mut dropped: Vec<Command> = self.entries.drain(self.cursor..).collect();
        self.entries.push(command);
        self.cursor = self.entries.len();
        if let Some(limit) = self.limit {
            if self.entries.len() > limit {
                let excess = self.entries.len() - limit;
                dropped.extend(self.entries.drain(..excess));
                self.cursor -= excess;
            }
        }
        self.release(&dropped, scene);
        Ok(())
    }

    /// Reverse the most recent applied command. Returns it, or `None` when
    /// there is nothing to undo.
    pub fn undo(&mut self, scene: &mut Scene) -> Result<Option<&Command>, SceneError> {
        if self.cursor == 0 {
            return Ok(None);
        }
        let index = self.cursor - 1;
        self.entries[index].apply(scene, Direction::Backward)?;
        self.cursor = index;
        Ok(self.entries.get(index))
    }

    /// Reapply the next command in the redo tail. Returns it, or `None` when
    /// there is nothing to redo.
    pub fn redo(&mut self, scene: &mut Scene) -> Result<Option<&Command>, SceneError> {
        let index = self.cursor;
        let Some(command) = self.entries.get(index) else {
            return Ok(None);
        };
        command.apply(scene, Direction::Forward)?;
        self.cursor = index + 1;
        Ok(self.entries.get(index))
    }

    /// Drop every entry.
    pub fn clear(&mut self, scene: &mut Scene) {
        let dropped = std::mem::take(&mut self.entries);
        self.cursor = 0;
        self.release(&dropped, scene);
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Number of applied entries.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applied entries, oldest first.
    #[must_use]
    pub fn undo_entries(&self) -> &[Command] {
        &self.entries[..self.cursor]
    }

    /// Redo tail, next-to-redo first.
    #[must_use]
    pub fn redo_entries(&self) -> &[Command] {
        &self.entries[self.cursor..]
    }

    /// Free nodes that `dropped` kept alive and no remaining entry refers to.
    fn release(&self, dropped: &[Command], scene: &mut Scene) {
        let candidates: Vec<NodeId> = dropped.iter().flat_map(Command::referenced_nodes).collect();
        if candidates.is_empty() {
            return;
        }
        let retained: HashSet<NodeId> = self.entries.iter().flat_map(Command::referenced_nodes).collect();
        let freed = scene.purge_detached(&candidates, &retained);
        if freed > 0 {
            tracing::debug!(freed, "released nodes no longer reachable through history");
        }
    }
}
