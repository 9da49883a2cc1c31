//! Client-side synchronization core for the collaborative whiteboard.
//!
//! This crate owns everything between the UI layer and the backing store:
//! optimistic local mutation merged against a push-based remote snapshot,
//! presence and advisory edit locks, group-move delta coordination, linear
//! undo/redo, and a batch interpreter that turns an ordered list of tagged
//! actions (from the UI or from one agent turn) into concrete board
//! mutations. The host is responsible only for wiring events to the engine,
//! driving the clock (`now_ms` arguments), and forwarding [`persist::PersistOp`]s
//! to the durable store.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`object`] | Board object types and the typed props accessor |
//! | [`store`] | Remote + pending-local overlay and optimistic CRUD |
//! | [`persist`] | Persistence seam: ops, sink trait, save status |
//! | [`presence`] | Cursor/selection cadences, roster, follow, edit locks |
//! | [`layout`] | Pure geometry: camera, grids, spacing, fit-to-view |
//! | [`group_move`] | Start-snapshot drag context for multi-object moves |
//! | [`undo`] | Inverse-descriptor undo/redo stack |
//! | [`actions`] | Tagged action schema shared with the agent |
//! | [`interpreter`] | Ordered batch execution with defaults and fallbacks |
//! | [`agent`] | Agent HTTP contract types and fallback replies |
//! | [`notify`] | Injectable pub/sub for toasts and save status |
//! | [`history`] | Capped append-only activity log |
//! | [`consts`] | Shared tuning constants |

pub mod actions;
pub mod agent;
pub mod consts;
pub mod group_move;
pub mod history;
pub mod interpreter;
pub mod layout;
pub mod notify;
pub mod object;
pub mod persist;
pub mod presence;
pub mod store;
pub mod undo;
