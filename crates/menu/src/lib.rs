//! Role-scoped navigation menus.
//!
//! A [`MenuTree`] is built from a flat snapshot of [`MenuItemRecord`]s (each
//! pointing at its parent by id) and answers the questions page rendering
//! needs: which entry is active, what the breadcrumb trail is, and which
//! entries to show at each navigation level.

pub mod node;
pub mod record;
pub mod tree;

pub use node::{MenuNode, TargetRef, TargetResolver};
pub use record::{
    ContentPageRef, ControllerActionRef, MenuItemId, MenuItemRecord, MenuTarget, PermissionId,
};
pub use tree::{MenuTree, MenuTreeBuilder, OrphanPolicy, SelectionState};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    #[error("Duplicate menu item name: {name}")]
    DuplicateName { name: String },

    #[error("Duplicate menu item id: {id}")]
    DuplicateId { id: MenuItemId },

    #[error("Menu item {id} references missing parent {parent_id}")]
    OrphanedNode { id: MenuItemId, parent_id: MenuItemId },

    #[error("Menu item {id} is part of a parent cycle")]
    Cycle { id: MenuItemId },
}
