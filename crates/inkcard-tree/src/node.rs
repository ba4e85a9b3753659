//! Node identifiers, stored records, and canonical tree snapshots.
//!
//! The store keeps one flat record per node. A record's parent field is the
//! empty string for roots on the wire; in Rust it is `Option<NodeId>` and the
//! conversion happens at the serde boundary (see [`root_as_empty`]).
//!
//! Snapshots are schema-versioned so host adapters can reject payloads they
//! do not understand instead of silently misreading them.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// Current tree snapshot schema version.
pub const TREE_SNAPSHOT_SCHEMA_VERSION: u16 = 1;

/// Sparse sibling order key.
///
/// Keys are sparse on purpose: inserting between two siblings usually only
/// writes the moved node's key. `ORDER_KEY_BASE` is the gap left between
/// freshly assigned keys.
pub type OrderKey = i64;

/// Gap between freshly assigned order keys.
pub const ORDER_KEY_BASE: OrderKey = 10_000;

/// Stable identifier for a stored node (a document id in the card store).
///
/// Backed by a shared string: the display list clones every visible id on
/// each pointer move during a drag, so clones must not allocate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Create an id from any string-like value.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(Arc::from(raw.as_ref()))
    }

    /// The raw string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is the empty string (never valid for a stored node).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for NodeId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

// Manual serde impls keep the wire form a plain string without pulling in
// serde's shared-pointer machinery for `Arc<str>`.
impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

/// Serde adapter for parent references: the store encodes "no parent" as the
/// empty string, the model as `None`.
///
/// Use with `#[serde(with = "inkcard_tree::root_as_empty")]`.
pub mod root_as_empty {
    use super::NodeId;
    use serde::de::{Deserialize, Deserializer};
    use serde::ser::Serializer;

    pub fn serialize<S: Serializer>(
        parent: &Option<NodeId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match parent {
            Some(id) => serializer.serialize_str(id.as_str()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NodeId>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            Ok(None)
        } else {
            Ok(Some(NodeId::new(raw)))
        }
    }
}

/// One stored row: the flat on-disk form of a tree node.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: NodeId,
    /// Parent id; `None` for roots (empty string on the wire).
    #[serde(rename = "parentId", with = "root_as_empty")]
    pub parent: Option<NodeId>,
    pub order_key: OrderKey,
}

impl ItemRecord {
    /// Convenience constructor for a record.
    pub fn new(id: impl Into<NodeId>, parent: Option<NodeId>, order_key: OrderKey) -> Self {
        Self {
            id: id.into(),
            parent,
            order_key,
        }
    }
}

/// In-memory nested node, derived from records by [`build_tree`].
///
/// `parent` keeps the stored parent reference verbatim, even when that
/// reference dangles and the node was attached at the root; display-level
/// parent links are derived from the tree shape during flattening.
///
/// [`build_tree`]: crate::build::build_tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub order_key: OrderKey,
    pub children: Vec<TreeItem>,
}

/// Canonical, schema-versioned record set exchanged with the store layer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    pub schema_version: u16,
    pub records: Vec<ItemRecord>,
}

impl TreeSnapshot {
    /// Build a current-version snapshot from records.
    #[must_use]
    pub fn new(records: Vec<ItemRecord>) -> Self {
        Self {
            schema_version: TREE_SNAPSHOT_SCHEMA_VERSION,
            records,
        }
    }

    /// Validate snapshot invariants.
    ///
    /// Rejects unknown schema versions, empty ids, duplicate ids, and nodes
    /// that name themselves as parent. Dangling parent references and sibling
    /// order-key ties are *not* rejected: both occur transiently between a
    /// store write and the next re-read, and the tree builder degrades them
    /// safely (dangling parent ⇒ root; ties broken by record order).
    pub fn validate(&self) -> Result<(), TreeModelError> {
        if self.schema_version != TREE_SNAPSHOT_SCHEMA_VERSION {
            return Err(TreeModelError::UnsupportedSchemaVersion {
                version: self.schema_version,
                expected: TREE_SNAPSHOT_SCHEMA_VERSION,
            });
        }

        let mut seen: HashSet<&NodeId> = HashSet::with_capacity(self.records.len());
        for record in &self.records {
            if record.id.is_empty() {
                return Err(TreeModelError::EmptyNodeId);
            }
            if !seen.insert(&record.id) {
                return Err(TreeModelError::DuplicateNodeId {
                    id: record.id.clone(),
                });
            }
            if record.parent.as_ref() == Some(&record.id) {
                return Err(TreeModelError::SelfParent {
                    id: record.id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Validation failures for stored tree data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeModelError {
    UnsupportedSchemaVersion { version: u16, expected: u16 },
    EmptyNodeId,
    DuplicateNodeId { id: NodeId },
    SelfParent { id: NodeId },
}

impl fmt::Display for TreeModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedSchemaVersion { version, expected } => write!(
                f,
                "unsupported tree snapshot schema version {version} (expected {expected})"
            ),
            Self::EmptyNodeId => write!(f, "tree records require non-empty ids"),
            Self::DuplicateNodeId { id } => write!(f, "duplicate node id {id:?}"),
            Self::SelfParent { id } => write!(f, "node {id:?} names itself as parent"),
        }
    }
}

impl std::error::Error for TreeModelError {}
