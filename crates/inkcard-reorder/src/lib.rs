#![forbid(unsafe_code)]

//! Drag-reorder engine for inkcard's ordered trees.
//!
//! Everything a user can reorder by dragging — menu entries, template cards,
//! views, mind-map siblings — shares this engine. The UI layer decodes
//! pointer events and renders; this crate computes where a dragged node may
//! land, moves it (with its whole subtree), and produces the minimal set of
//! sparse order-key writes that persists the new order.
//!
//! # Design
//!
//! One drag gesture flows through four pure stages:
//!
//! 1. flatten (in `inkcard-tree`) — nested tree → visible display list,
//! 2. [`project_drop`] — pointer offset → legal `(depth, parent)` destination,
//! 3. [`relocate_subtree`] — full display list with the subtree moved,
//! 4. [`allocate_order_keys`] — the order-key plan for the new sibling order.
//!
//! [`DragSession`] sequences the stages across the gesture lifecycle and
//! hands the resulting [`OrderUpdate`] to the caller, which forwards it to an
//! [`OrderStore`] (the persistence adapter) fire-and-forget: the in-memory
//! view updates optimistically and never waits on the store.
//!
//! # Invariants
//!
//! 1. Stages 2–4 are pure and allocation-disciplined; stages 1–2 run on
//!    every pointer move, stages 3–4 exactly once per committed gesture.
//! 2. A projection never nests a node under itself or a descendant; rejected
//!    candidates keep the previous valid projection (the drag "sticks").
//! 3. Relocation preserves the id set exactly and keeps the moved subtree a
//!    contiguous, depth-rebased block.
//! 4. Applying a key plan leaves every affected sibling list strictly
//!    increasing; the plan has one entry unless adjacent keys had no integer
//!    room, in which case only trailing siblings are renumbered.
//!
//! # Failure modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | Active/over id missing from list | store update raced the drag | projection `None` / relocation no-op |
//! | Destination inside own subtree | pointer over a descendant | previous projection retained |
//! | Corrupt parent chain | inconsistent upstream data | bounded ancestor walk, no cycle |
//! | Store write fails | network/storage | surfaced by the UI layer, never retried here |

pub mod allocate;
pub mod projection;
pub mod relocate;
pub mod session;
pub mod store;

pub use allocate::{OrderKeyPlan, PlanEntry, SiblingKey, allocate_order_keys};
pub use projection::{DropProjection, is_descendant, project_drop, projection_creates_cycle};
pub use relocate::relocate_subtree;
pub use session::{DragSession, DragState, ReorderCommit, SessionError};
pub use store::{OrderStore, OrderUpdate, Reparent, StoreError};
