//! Drag-and-drop state for an upload drop zone.
//!
//! The tracker only decides whether the zone is highlighted and what a drop
//! yields. A drag-leave fired while the pointer is still inside the zone
//! (the pointer moved onto a nested child element) keeps the zone highlighted.

use serde::{Deserialize, Serialize};

use crate::source::{extract_files, DropEvent, FileSource};
use crate::validation::{validate_files, BatchValidation, ValidationRule};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding rectangle of the tracked element, in client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left/top edges are inside, right/bottom edges are outside.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        bounds: Rect,
    },
}

/// Files accepted by a drop plus the messages for rejected ones.
pub type DropOutcome = BatchValidation;

/// Drop-zone state machine: `Idle` <-> `Dragging`.
#[derive(Debug, Clone)]
pub struct DragTracker {
    state: DragState,
    rule: ValidationRule,
}

impl DragTracker {
    pub fn new(rule: ValidationRule) -> Self {
        Self {
            state: DragState::Idle,
            rule,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn rule(&self) -> &ValidationRule {
        &self.rule
    }

    pub fn drag_enter(&mut self, bounds: Rect) {
        self.state = DragState::Dragging { bounds };
    }

    /// Drag-over never changes state. Always returns `true`: the platform's
    /// default handling (opening the file) must be suppressed.
    pub fn drag_over(&self) -> bool {
        true
    }

    /// Leave the `Dragging` state only once the pointer is outside the bounds.
    pub fn drag_leave(&mut self, pointer: Point) {
        if let DragState::Dragging { bounds } = self.state {
            if !bounds.contains(pointer) {
                self.state = DragState::Idle;
            }
        }
    }

    /// Reset to `Idle`, then extract and validate the dropped files.
    pub fn drop_files(&mut self, event: DropEvent) -> DropOutcome {
        self.state = DragState::Idle;
        let candidates = extract_files(FileSource::Drop(event));
        let outcome = validate_files(candidates, &self.rule);
        tracing::debug!(
            accepted = outcome.valid.len(),
            rejected = outcome.errors.len(),
            "Files dropped"
        );
        outcome
    }
}
