//! Shared tuning constants for the sync core.

// ── Publish cadences ────────────────────────────────────────────

/// Minimum interval between outbound cursor publishes (~30 Hz).
pub const CURSOR_PUBLISH_INTERVAL_MS: i64 = 33;

/// Minimum interval between outbound selection publishes (~1 Hz).
pub const SELECTION_PUBLISH_INTERVAL_MS: i64 = 1000;

// ── Presence visibility ─────────────────────────────────────────

/// A remote cursor hides after this long without movement.
pub const CURSOR_HIDE_TIMEOUT_MS: i64 = 20_000;

/// A roster entry is treated as offline after this long without a heartbeat.
pub const PRESENCE_OFFLINE_TIMEOUT_MS: i64 = 45_000;

// ── Write coalescing ────────────────────────────────────────────

/// Maximum rate of durable position writes during a drag, per object.
pub const DRAG_PERSIST_INTERVAL_MS: i64 = 50;

/// Idle window before a buffered text edit is flushed.
pub const TEXT_DEBOUNCE_MS: i64 = 300;

// ── Viewport ────────────────────────────────────────────────────

/// Minimum zoom produced by fit-to-view.
pub const FIT_ZOOM_MIN: f64 = 0.05;

/// Maximum zoom produced by fit-to-view.
pub const FIT_ZOOM_MAX: f64 = 2.0;

/// Padding around the content bounding box when fitting, in screen pixels.
pub const FIT_PADDING_PX: f64 = 64.0;

// ── Placement defaults ──────────────────────────────────────────

/// Default sticky note footprint in world units.
pub const DEFAULT_STICKY_SIZE: f64 = 180.0;

/// Default shape footprint in world units.
pub const DEFAULT_SHAPE_WIDTH: f64 = 160.0;
pub const DEFAULT_SHAPE_HEIGHT: f64 = 120.0;

/// Default frame footprint in world units.
pub const DEFAULT_FRAME_WIDTH: f64 = 400.0;
pub const DEFAULT_FRAME_HEIGHT: f64 = 300.0;

/// Gap between cells in derived grid/spacing layouts.
pub const DEFAULT_LAYOUT_GAP: f64 = 40.0;

/// Per-placement cascade offset so center-placed objects don't stack exactly.
pub const CASCADE_STEP: f64 = 28.0;

/// The cascade counter wraps after this many placements.
pub const CASCADE_WRAP: u32 = 10;

/// Lower clamp on the zoom-derived default-size multiplier.
pub const SIZE_MULTIPLIER_MIN: f64 = 0.5;

/// Upper clamp on the zoom-derived default-size multiplier.
pub const SIZE_MULTIPLIER_MAX: f64 = 3.0;

// ── Bounded collections ─────────────────────────────────────────

/// Maximum retained undo descriptors; oldest are evicted beyond this.
pub const UNDO_DEPTH: usize = 100;

/// Maximum retained history entries.
pub const HISTORY_CAP: usize = 500;
