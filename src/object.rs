//! Board object types: the document record, its kind, sparse updates, and a
//! typed accessor for the open-ended `props` JSON bag.
//!
//! Data flows into this layer from the backing store (JSON deserialization)
//! and from the interpreter/gesture layers (mutations). Everything wire-facing
//! serializes camelCase to match the store schema.

#[cfg(test)]
#[path = "object_test.rs"]
mod object_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a board object.
pub type ObjectId = Uuid;

/// The kind of a board object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Square sticky note with text.
    Sticky,
    /// Axis-aligned rectangle.
    Rectangle,
    /// Circle inscribed within the bounding box.
    Circle,
    /// Straight line segment between two endpoints stored in `props`.
    Line,
    /// Ellipse inscribed within the bounding box.
    Oval,
    /// Titled rectangular region that groups content.
    Frame,
    /// Edge between two referenced objects; no geometry of its own.
    Connector,
    /// Directed connector with an arrowhead; no geometry of its own.
    Arrow,
    /// Free-standing text block.
    Textbox,
    /// Bitmap image tile.
    Image,
    /// Kanban board widget.
    Kanban,
    /// Data table widget.
    Table,
    /// Monospace code block.
    Code,
    /// Embedded external content tile.
    Embed,
    /// Mind-map node cluster.
    Mindmap,
}

impl ObjectKind {
    /// Whether this kind is an edge whose position derives from the two
    /// referenced objects rather than from its own bounding box.
    #[must_use]
    pub fn is_edge(self) -> bool {
        matches!(self, Self::Connector | Self::Arrow)
    }
}

/// A board object as stored in the document and on the wire.
///
/// Connectors and arrows carry `width`/`height` of `None` and meaningless
/// `x`/`y`; their endpoints live in `props` (`sourceId`/`targetId` references,
/// with the rendered position always recomputed from the referenced objects'
/// current geometry).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardObject {
    /// Unique identifier for this object.
    pub id: ObjectId,
    /// Shape or edge type.
    pub kind: ObjectKind,
    /// Left edge of the bounding box in world coordinates.
    pub x: f64,
    /// Top edge of the bounding box in world coordinates.
    pub y: f64,
    /// Width of the bounding box. `None` for edge kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Height of the bounding box. `None` for edge kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Open-ended per-kind properties (color, text, title, endpoints, etc.).
    pub props: serde_json::Value,
    /// Containing frame, if any. A non-owning reference: deleting the frame
    /// does not delete the child.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_frame_id: Option<ObjectId>,
    /// Milliseconds since the Unix epoch of the last write to this object.
    pub updated_at: i64,
}

impl BoardObject {
    /// Construct an object of `kind` at `(x, y)` with the given props.
    ///
    /// Edge kinds get no bounding box; everything else receives the supplied
    /// `width`/`height`.
    #[must_use]
    pub fn new(kind: ObjectKind, x: f64, y: f64, width: f64, height: f64, props: serde_json::Value, now_ms: i64) -> Self {
        let (width, height) = if kind.is_edge() { (None, None) } else { (Some(width), Some(height)) };
        Self {
            id: Uuid::new_v4(),
            kind,
            x,
            y,
            width,
            height,
            props,
            parent_frame_id: None,
            updated_at: now_ms,
        }
    }

    /// Center of the bounding box, using a default footprint when unsized.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            self.x + self.width.unwrap_or(0.0) * 0.5,
            self.y + self.height.unwrap_or(0.0) * 0.5,
        )
    }
}

/// Sparse update for a board object. Only present fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialBoardObject {
    /// New x position, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// New y position, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// New width, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// New height, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// New containing frame, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_frame_id: Option<ObjectId>,
    /// Props keys to merge or remove (null values delete keys).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<serde_json::Value>,
}

impl PartialBoardObject {
    /// A partial carrying only a new position.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    /// A partial carrying only new dimensions.
    #[must_use]
    pub fn size(width: f64, height: f64) -> Self {
        Self { width: Some(width), height: Some(height), ..Self::default() }
    }

    /// A partial carrying only a props merge.
    #[must_use]
    pub fn props(props: serde_json::Value) -> Self {
        Self { props: Some(props), ..Self::default() }
    }

    /// Apply this partial to `obj` in place. Props merge key-by-key, with
    /// `null` values deleting keys, matching the store's patch semantics.
    pub fn apply_to(&self, obj: &mut BoardObject) {
        if let Some(x) = self.x {
            obj.x = x;
        }
        if let Some(y) = self.y {
            obj.y = y;
        }
        if let Some(w) = self.width {
            obj.width = Some(w);
        }
        if let Some(h) = self.height {
            obj.height = Some(h);
        }
        if let Some(frame) = self.parent_frame_id {
            obj.parent_frame_id = Some(frame);
        }
        if let Some(ref props) = self.props {
            let Some(incoming) = props.as_object() else {
                return;
            };
            if !obj.props.is_object() {
                obj.props = serde_json::json!({});
            }
            if let Some(existing) = obj.props.as_object_mut() {
                for (k, v) in incoming {
                    if v.is_null() {
                        existing.remove(k);
                    } else {
                        existing.insert(k.clone(), v.clone());
                    }
                }
            }
        }
    }
}

/// Typed access to common props fields from a `BoardObject.props` JSON value.
pub struct Props<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Props<'a> {
    /// Wrap a reference to a `props` JSON value for typed access.
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    /// Fill color as a CSS color string. Defaults to `"#FFEB3B"` when absent.
    #[must_use]
    pub fn color(&self) -> &str {
        self.value
            .get("color")
            .and_then(|v| v.as_str())
            .unwrap_or("#FFEB3B")
    }

    /// Text content displayed on the object. Empty string when absent.
    #[must_use]
    pub fn text(&self) -> &str {
        self.value
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    /// Frame title. Empty string when absent.
    #[must_use]
    pub fn title(&self) -> &str {
        self.value
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    /// Font size in pixels. Defaults to `14.0` when absent.
    #[must_use]
    pub fn font_size(&self) -> f64 {
        self.value
            .get("fontSize")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(14.0)
    }

    /// Source object reference for edge kinds.
    #[must_use]
    pub fn source_id(&self) -> Option<ObjectId> {
        self.value
            .get("sourceId")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
    }

    /// Target object reference for edge kinds.
    #[must_use]
    pub fn target_id(&self) -> Option<ObjectId> {
        self.value
            .get("targetId")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
    }

    /// Free endpoints `(x1, y1, x2, y2)` for edges not anchored to objects.
    #[must_use]
    pub fn endpoints(&self) -> Option<(f64, f64, f64, f64)> {
        let get = |k: &str| self.value.get(k).and_then(serde_json::Value::as_f64);
        Some((get("x1")?, get("y1")?, get("x2")?, get("y2")?))
    }
}
