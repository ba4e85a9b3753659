//! Outbound persistence contract.
//!
//! The engine never talks to storage directly; a committed gesture produces
//! one [`OrderUpdate`] and the caller forwards it to whatever implements
//! [`OrderStore`]. The call is fire-and-forget from the engine's side: the
//! in-memory view has already been updated optimistically, and a failed
//! write is the replication layer's problem to surface, not the engine's to
//! retry.
//!
//! Updates are idempotent: the same id always maps to the same key, so
//! at-least-once delivery is acceptable.

use std::fmt;

use inkcard_tree::{NodeId, root_as_empty};

use crate::allocate::OrderKeyPlan;

/// Move a single node under a new parent (`None` = root level). Rebalanced
/// siblings only change keys; the moved node is the only one that ever
/// changes parent.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reparent {
    pub node: NodeId,
    #[serde(rename = "newParentId", with = "root_as_empty")]
    pub new_parent: Option<NodeId>,
}

/// Everything one committed reorder asks the store to persist.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub plan: OrderKeyPlan,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reparent: Option<Reparent>,
}

/// Persistence adapter for order writes.
///
/// Implementations must durably store every key in the plan and apply the
/// reparent when present. Eventually consistent is fine; re-applying the
/// same update must be a no-op.
pub trait OrderStore {
    fn bulk_set_order(&mut self, update: &OrderUpdate) -> Result<(), StoreError>;
}

/// Failure surface of the persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No connection to the backing store.
    Disconnected,
    /// The store rejected or failed the write.
    Backend { message: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "order store is disconnected"),
            Self::Backend { message } => write!(f, "order store rejected the update: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}
