use std::collections::HashSet;

use menu::{MenuNode, MenuTree};
use serde::Serialize;
use tracing::error;

use crate::auth::Principal;
use crate::{AppError, AppState};

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NavItemVm {
    pub id: i64,
    pub name: String,
    pub label: String,
    pub url: String,
    pub selected: bool,
}

#[derive(Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NavigationVm {
    pub selected: Option<String>,
    pub breadcrumbs: Vec<NavItemVm>,
    /// Menu entries per level, top level first, down to the selected item's children.
    pub levels: Vec<Vec<NavItemVm>>,
}

fn item(tree: &MenuTree, node: &MenuNode) -> NavItemVm {
    NavItemVm {
        id: node.id,
        name: node.name.clone(),
        label: node.label.clone(),
        url: node.url.clone(),
        selected: tree.is_selected(node.id),
    }
}

impl NavigationVm {
    pub fn from_tree(tree: &MenuTree) -> Self {
        let mut levels = Vec::new();
        while let Some(entries) = tree.children_at_depth(levels.len()) {
            if entries.is_empty() {
                break;
            }
            levels.push(entries.into_iter().map(|n| item(tree, n)).collect());
        }
        Self {
            selected: tree.current_selection_name().map(str::to_string),
            breadcrumbs: tree.breadcrumbs().into_iter().map(|n| item(tree, n)).collect(),
            levels,
        }
    }
}

/// Builds the caller's menu and selects `select` when it names a visible item.
/// Anonymous callers only see items that need no permission.
pub fn menu_for(
    state: &AppState,
    principal: Option<&Principal>,
    select: Option<&str>,
) -> Result<MenuTree, AppError> {
    let items = state.store.menu_items()?;
    let anonymous = HashSet::new();
    let permissions = principal.map_or(&anonymous, |p| &p.permissions);
    let mut tree = MenuTree::for_permissions(&items, Some(permissions)).map_err(|e| {
        error!("Failed to build menu: {}", e);
        AppError::from(e)
    })?;
    if let Some(name) = select {
        tree.select(name);
    }
    Ok(tree)
}
