use serde::{Deserialize, Serialize};

use crate::drawing::DrawingAction;

/// Ordered action log of one canvas. Replaying it in order reproduces the pixels.
///
/// The log holds at most one fill, and when present it sits at index 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    actions: Vec<DrawingAction>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an action, routing fills through [`Page::apply_fill`].
    pub fn apply(&mut self, action: DrawingAction) {
        if action.is_fill() {
            self.apply_fill(action);
        } else {
            self.actions.push(action);
        }
    }

    /// Replace any existing fill with `fill`, placed at the front of the log.
    pub fn apply_fill(&mut self, fill: DrawingAction) {
        debug_assert!(fill.is_fill());
        self.actions.retain(|a| !a.is_fill());
        self.actions.insert(0, fill);
    }

    /// Remove the last log entry.
    pub fn undo(&mut self) -> Option<DrawingAction> {
        self.actions.pop()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn actions(&self) -> &[DrawingAction] {
        &self.actions
    }

    pub fn fill(&self) -> Option<&DrawingAction> {
        self.actions.first().filter(|a| a.is_fill())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
