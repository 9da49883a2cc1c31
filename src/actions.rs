//! The tagged action schema shared between the UI, the batch interpreter,
//! and the agent contract.
//!
//! Actions arrive as JSON with a `"type"` discriminator and camelCase
//! argument names (`{"type": "createStickyNote", "text": "hi"}`). Nearly
//! every argument is optional: the interpreter owns placement, sizing, and
//! content defaults, so a sparse action is always executable. Unrecognized
//! action types deserialize to [`Action::Unknown`] and are skipped rather
//! than failing the whole batch.

#[cfg(test)]
#[path = "actions_test.rs"]
mod actions_test;

use serde::{Deserialize, Serialize};

use crate::object::{ObjectId, ObjectKind};

/// One abstract board action, from the UI or one agent turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Create a basic shape (rectangle, circle, oval, line...).
    #[serde(rename_all = "camelCase")]
    CreateShape {
        /// Shape kind; defaults to a rectangle.
        #[serde(default)]
        shape: Option<ObjectKind>,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
        #[serde(default)]
        color: Option<String>,
    },
    /// Create a sticky note.
    #[serde(rename_all = "camelCase")]
    CreateStickyNote {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
        #[serde(default)]
        color: Option<String>,
    },
    /// Create a titled frame.
    #[serde(rename_all = "camelCase")]
    CreateFrame {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
    },
    /// Create a connector between two existing objects.
    #[serde(rename_all = "camelCase")]
    CreateConnector {
        from_id: ObjectId,
        to_id: ObjectId,
        /// `"line"`, `"arrow"`, or `"dashed"`; defaults to an arrow.
        #[serde(default)]
        style: Option<String>,
    },
    /// Move an object to an absolute position.
    #[serde(rename_all = "camelCase")]
    MoveObject { object_id: ObjectId, x: f64, y: f64 },
    /// Resize an object.
    #[serde(rename_all = "camelCase")]
    ResizeObject { object_id: ObjectId, width: f64, height: f64 },
    /// Replace an object's text content.
    #[serde(rename_all = "camelCase")]
    UpdateText { object_id: ObjectId, new_text: String },
    /// Change an object's color.
    #[serde(rename_all = "camelCase")]
    ChangeColor { object_id: ObjectId, color: String },
    /// Arrange objects in a grid. An empty id list means "every object
    /// created earlier in this batch".
    #[serde(rename_all = "camelCase")]
    ArrangeInGrid {
        #[serde(default)]
        object_ids: Vec<ObjectId>,
        #[serde(default)]
        columns: Option<usize>,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
    },
    /// Space objects evenly in a horizontal row. Empty id list is the same
    /// just-created sentinel as `arrangeInGrid`.
    #[serde(rename_all = "camelCase")]
    SpaceEvenly {
        #[serde(default)]
        object_ids: Vec<ObjectId>,
    },
    /// Create a grid of sticky notes in one step.
    #[serde(rename_all = "camelCase")]
    CreateStickyNoteGrid {
        #[serde(default)]
        texts: Vec<String>,
        #[serde(default)]
        count: Option<usize>,
        #[serde(default)]
        columns: Option<usize>,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
    },
    /// Create a four-quadrant SWOT template.
    #[serde(rename_all = "camelCase")]
    CreateSwotTemplate {
        #[serde(default)]
        strengths: Vec<String>,
        #[serde(default)]
        weaknesses: Vec<String>,
        #[serde(default)]
        opportunities: Vec<String>,
        #[serde(default)]
        threats: Vec<String>,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
    },
    /// Create a left-to-right user-journey row of connected stages.
    #[serde(rename_all = "camelCase")]
    CreateUserJourney {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        stages: Vec<String>,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
    },
    /// Create a three-column retrospective board.
    #[serde(rename_all = "camelCase")]
    CreateRetrospectiveBoard {
        #[serde(default)]
        went_well: Vec<String>,
        #[serde(default)]
        to_improve: Vec<String>,
        #[serde(default)]
        action_items: Vec<String>,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
    },
    /// Create a frame pre-populated with sticky notes.
    #[serde(rename_all = "camelCase")]
    CreateFrameWithNotes {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        notes: Vec<String>,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
    },
    /// Add a linear flowchart: one box per step, arrows between.
    #[serde(rename_all = "camelCase")]
    AddFlowchart {
        #[serde(default)]
        steps: Vec<String>,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
    },
    /// Delete one object.
    #[serde(rename_all = "camelCase")]
    DeleteObject { object_id: ObjectId },
    /// Delete every object on the board.
    #[serde(rename_all = "camelCase")]
    ClearBoard {},
    /// Any unrecognized action type — skipped by the interpreter.
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Whether this action creates objects. Template and flowchart actions
    /// count: their output participates in the just-created sentinel.
    #[must_use]
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            Self::CreateShape { .. }
                | Self::CreateStickyNote { .. }
                | Self::CreateFrame { .. }
                | Self::CreateConnector { .. }
                | Self::CreateStickyNoteGrid { .. }
                | Self::CreateSwotTemplate { .. }
                | Self::CreateUserJourney { .. }
                | Self::CreateRetrospectiveBoard { .. }
                | Self::CreateFrameWithNotes { .. }
                | Self::AddFlowchart { .. }
        )
    }

    /// Whether this action lays out existing objects.
    #[must_use]
    pub fn is_layout(&self) -> bool {
        matches!(self, Self::ArrangeInGrid { .. } | Self::SpaceEvenly { .. })
    }

    /// Human-readable label used when coalescing same-type successes into
    /// one summary notice.
    #[must_use]
    pub fn summary_label(&self) -> &'static str {
        match self {
            Self::CreateShape { .. } => "shape created",
            Self::CreateStickyNote { .. } => "sticky note created",
            Self::CreateFrame { .. } => "frame created",
            Self::CreateConnector { .. } => "connector created",
            Self::MoveObject { .. } => "object moved",
            Self::ResizeObject { .. } => "object resized",
            Self::UpdateText { .. } => "text updated",
            Self::ChangeColor { .. } => "color changed",
            Self::ArrangeInGrid { .. } => "grid arranged",
            Self::SpaceEvenly { .. } => "objects spaced",
            Self::CreateStickyNoteGrid { .. } => "sticky grid created",
            Self::CreateSwotTemplate { .. } => "SWOT template created",
            Self::CreateUserJourney { .. } => "user journey created",
            Self::CreateRetrospectiveBoard { .. } => "retrospective created",
            Self::CreateFrameWithNotes { .. } => "frame with notes created",
            Self::AddFlowchart { .. } => "flowchart added",
            Self::DeleteObject { .. } => "object deleted",
            Self::ClearBoard {} => "board cleared",
            Self::Unknown => "skipped",
        }
    }
}
