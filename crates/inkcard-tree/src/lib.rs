#![forbid(unsafe_code)]

//! Tree/document model for inkcard's ordered collections.
//!
//! The card store persists every ordered collection (menu entries, templates,
//! views, mind-map nodes) as a flat set of records: `id`, parent id, and a
//! sparse integer order key. Nesting is derived in memory. This crate owns
//! that model:
//!
//! - [`NodeId`], [`ItemRecord`], and the schema-versioned [`TreeSnapshot`]
//!   with strict validation,
//! - [`build_tree`] to turn a record set into a nested [`TreeItem`] forest,
//! - [`flatten`] to turn the forest into the depth-annotated display list
//!   ([`FlatItem`]) the drag layer works on.
//!
//! All functions here are pure: they read their full input and return a new
//! structure. Nothing in this crate performs I/O or holds ambient state.

pub mod build;
pub mod flatten;
pub mod node;

pub use build::{build_tree, expansion_path, find_item, subtree_size};
pub use flatten::{FlatItem, flatten, flatten_tree};
pub use node::{
    ItemRecord, NodeId, ORDER_KEY_BASE, OrderKey, TREE_SNAPSHOT_SCHEMA_VERSION, TreeItem,
    TreeModelError, TreeSnapshot, root_as_empty,
};
