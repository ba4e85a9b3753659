//! Per-gesture drag session lifecycle.
//!
//! ```text
//! Idle -> Dragging (begin) -> Idle (commit | cancel)
//! ```
//!
//! The session owns no tree data: every step receives the current flattened
//! lists from the caller and returns new values. While dragging it holds
//! only the gesture inputs (active id, hovered id, lateral travel) and the
//! last valid projection — which is deliberately kept when a fresh candidate
//! would nest the node under its own subtree, so the indicator "sticks" at
//! the last legal spot instead of chasing an illegal one.
//!
//! Nothing survives the gesture: commit and cancel both return to `Idle`
//! and drop all of it.

use std::collections::HashSet;
use std::fmt;

use inkcard_tree::{FlatItem, NodeId};

use crate::allocate::{SiblingKey, allocate_order_keys};
use crate::projection::{DropProjection, project_drop, projection_creates_cycle};
use crate::relocate::relocate_subtree;
use crate::store::{OrderUpdate, Reparent};

/// Gesture lifecycle state.
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        /// The node being dragged.
        active: NodeId,
        /// The node currently under the pointer, if any.
        over: Option<NodeId>,
        /// Horizontal pointer travel since drag start.
        lateral_offset: f32,
        /// Last valid destination, refreshed by [`DragSession::reproject`].
        projection: Option<DropProjection>,
    },
}

/// Everything a committed gesture hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderCommit {
    /// The full flattened sequence after the move, order keys already
    /// updated — the caller's new optimistic view.
    pub items: Vec<FlatItem>,
    /// What the persistence adapter must write.
    pub update: OrderUpdate,
    /// New parent to expand so the dropped node stays visible, when that
    /// parent is currently collapsed.
    pub expand: Option<NodeId>,
}

/// Configuration failures for the drag session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Indent width must be a positive, finite number of pixels.
    InvalidIndentWidth { width: f32 },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIndentWidth { width } => {
                write!(f, "indent width must be positive and finite, got {width}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// One drag gesture over one ordered tree.
///
/// Create once per tree view and reuse across gestures; the session resets
/// itself to `Idle` at every commit or cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    state: DragState,
    indent_width: f32,
}

impl DragSession {
    /// Create a session with the view's indent width (the horizontal pixel
    /// distance that equals one nesting level).
    pub fn new(indent_width: f32) -> Result<Self, SessionError> {
        if !indent_width.is_finite() || indent_width <= 0.0 {
            return Err(SessionError::InvalidIndentWidth {
                width: indent_width,
            });
        }
        Ok(Self {
            state: DragState::Idle,
            indent_width,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The dragged node, while a gesture is active.
    #[must_use]
    pub fn active(&self) -> Option<&NodeId> {
        match &self.state {
            DragState::Dragging { active, .. } => Some(active),
            DragState::Idle => None,
        }
    }

    /// The last valid projection, while a gesture is active.
    #[must_use]
    pub fn projection(&self) -> Option<&DropProjection> {
        match &self.state {
            DragState::Dragging { projection, .. } => projection.as_ref(),
            DragState::Idle => None,
        }
    }

    /// Start a gesture. The pointer starts over the dragged node itself.
    pub fn begin(&mut self, active: NodeId) {
        #[cfg(feature = "tracing")]
        tracing::debug!(active = %active, "drag begin");
        self.state = DragState::Dragging {
            over: Some(active.clone()),
            active,
            lateral_offset: 0.0,
            projection: None,
        };
    }

    /// Record horizontal pointer travel. Ignored while idle.
    pub fn pointer_moved(&mut self, offset: f32) {
        if let DragState::Dragging { lateral_offset, .. } = &mut self.state {
            *lateral_offset = offset;
        }
    }

    /// Record the node currently under the pointer. Ignored while idle.
    pub fn hover_changed(&mut self, over_id: Option<NodeId>) {
        if let DragState::Dragging { over, .. } = &mut self.state {
            *over = over_id;
        }
    }

    /// Recompute the projection from the current gesture inputs.
    ///
    /// `visible` is the display list (collapsed subtrees and the dragged
    /// subtree excluded); `full` is the flatten of every node, used only for
    /// the ancestry check. A candidate that would nest the node under its
    /// own subtree is discarded and the previous valid projection kept.
    pub fn reproject(&mut self, visible: &[FlatItem], full: &[FlatItem]) -> Option<&DropProjection> {
        if let DragState::Dragging {
            active,
            over,
            lateral_offset,
            projection,
        } = &mut self.state
        {
            match over {
                Some(over_id) => {
                    let candidate =
                        project_drop(visible, active, over_id, *lateral_offset, self.indent_width);
                    let rejected = candidate
                        .as_ref()
                        .is_some_and(|p| projection_creates_cycle(full, active, p));
                    if rejected {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            active = %active,
                            "projection rejected: destination inside dragged subtree"
                        );
                    } else {
                        *projection = candidate;
                    }
                }
                None => *projection = None,
            }
        }
        self.projection()
    }

    /// Commit the gesture: relocate the subtree, allocate keys, and return
    /// the optimistic view plus the store update. `None` when nothing moved
    /// (no projection, unknown ids, or a same-place drop). Always resets to
    /// `Idle`.
    pub fn commit(
        &mut self,
        full: &[FlatItem],
        collapsed: &HashSet<NodeId>,
    ) -> Option<ReorderCommit> {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        let DragState::Dragging {
            active,
            over: Some(over),
            projection: Some(projection),
            ..
        } = state
        else {
            return None;
        };

        let active_item = full.iter().find(|it| it.id == active)?;
        if active == over && active_item.parent == projection.parent {
            // Dropped back where it started.
            return None;
        }

        let mut items = relocate_subtree(full, &active, &over, &projection, collapsed);

        // Target sibling list, excluding the moved node.
        let mut insert_index = 0;
        let mut siblings: Vec<SiblingKey> = Vec::new();
        for item in items.iter().filter(|it| it.parent == projection.parent) {
            if item.id == active {
                insert_index = siblings.len();
            } else {
                siblings.push(SiblingKey::new(item.id.clone(), item.order_key));
            }
        }

        let plan = allocate_order_keys(&siblings, &active, insert_index);
        for item in &mut items {
            if let Some(key) = plan.get(&item.id) {
                item.order_key = key;
            }
        }

        let reparent = (active_item.parent != projection.parent).then(|| Reparent {
            node: active.clone(),
            new_parent: projection.parent.clone(),
        });
        let expand = projection
            .parent
            .as_ref()
            .filter(|parent| collapsed.contains(parent))
            .cloned();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            active = %active,
            keys = plan.len(),
            reparented = reparent.is_some(),
            "drag commit"
        );

        Some(ReorderCommit {
            items,
            update: OrderUpdate { plan, reparent },
            expand,
        })
    }

    /// Abandon the gesture without touching anything.
    pub fn cancel(&mut self) {
        #[cfg(feature = "tracing")]
        if self.is_dragging() {
            tracing::debug!("drag cancel");
        }
        self.state = DragState::Idle;
    }
}
