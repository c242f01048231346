use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::node::MenuNode;
use crate::record::{MenuItemId, MenuItemRecord, PermissionId};
use crate::MenuError;

/// What to do with a record whose declared parent is not in the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrphanPolicy {
    /// Attach it directly under the root and clear its parent link.
    #[default]
    ReparentToRoot,
    /// Fail construction with [`MenuError::OrphanedNode`].
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Unselected,
    Selected,
}

/// Collects construction options and turns a record snapshot into a [`MenuTree`].
#[derive(Debug, Clone, Default)]
pub struct MenuTreeBuilder {
    orphan_policy: OrphanPolicy,
    permissions: Option<HashSet<PermissionId>>,
}

impl MenuTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }

    /// Only keep records whose target requires no permission or one of `permissions`.
    pub fn restrict_to(mut self, permissions: HashSet<PermissionId>) -> Self {
        self.permissions = Some(permissions);
        self
    }

    fn permits(&self, record: &MenuItemRecord) -> bool {
        match (&self.permissions, record.target.permission_id()) {
            (Some(allowed), Some(required)) => allowed.contains(&required),
            _ => true,
        }
    }

    pub fn build<'a, I>(self, items: I) -> Result<MenuTree, MenuError>
    where
        I: IntoIterator<Item = &'a MenuItemRecord>,
    {
        let mut nodes: Vec<MenuNode> = Vec::new();
        let mut by_id: HashMap<MenuItemId, usize> = HashMap::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for record in items.into_iter().filter(|r| self.permits(r)) {
            if by_id.contains_key(&record.id) {
                return Err(MenuError::DuplicateId { id: record.id });
            }
            if by_name.contains_key(&record.name) {
                return Err(MenuError::DuplicateName {
                    name: record.name.clone(),
                });
            }
            by_id.insert(record.id, nodes.len());
            by_name.insert(record.name.clone(), nodes.len());
            nodes.push(MenuNode::from_record(record));
        }

        let mut root_children = Vec::new();
        for idx in 0..nodes.len() {
            let id = nodes[idx].id;
            let Some(parent_id) = nodes[idx].parent_id else {
                root_children.push(id);
                continue;
            };
            match by_id.get(&parent_id) {
                Some(&parent) => nodes[parent].children.push(id),
                None => match self.orphan_policy {
                    OrphanPolicy::ReparentToRoot => {
                        warn!(
                            "Menu item {} references missing parent {}; attaching to root",
                            id, parent_id
                        );
                        nodes[idx].parent_id = None;
                        root_children.push(id);
                    }
                    OrphanPolicy::Reject => {
                        return Err(MenuError::OrphanedNode { id, parent_id });
                    }
                },
            }
        }

        check_acyclic(&nodes, &by_id, &root_children)?;

        let mut tree = MenuTree {
            nodes,
            by_id,
            by_name,
            root_children,
            path: Vec::new(),
            selected: HashSet::new(),
        };
        let landing = tree
            .root_children
            .first()
            .and_then(|id| tree.get(*id))
            .map(|node| node.name.clone());
        if let Some(name) = landing {
            tree.select(&name);
        }
        debug!(
            "Built menu tree with {} items ({} top-level)",
            tree.nodes.len(),
            tree.root_children.len()
        );
        Ok(tree)
    }
}

// Every node has exactly one parent link, so any node not reachable from
// the root sits on a cycle (or hangs below one).
fn check_acyclic(
    nodes: &[MenuNode],
    by_id: &HashMap<MenuItemId, usize>,
    root_children: &[MenuItemId],
) -> Result<(), MenuError> {
    let mut reached = vec![false; nodes.len()];
    let mut stack: Vec<usize> = root_children
        .iter()
        .filter_map(|id| by_id.get(id).copied())
        .collect();
    while let Some(idx) = stack.pop() {
        reached[idx] = true;
        stack.extend(
            nodes[idx]
                .children
                .iter()
                .filter_map(|id| by_id.get(id).copied()),
        );
    }
    match reached.iter().position(|r| !r) {
        Some(idx) => Err(MenuError::Cycle { id: nodes[idx].id }),
        None => Ok(()),
    }
}

/// Navigation hierarchy for one request. The structure is fixed once built;
/// only the current selection changes.
#[derive(Debug, Clone)]
pub struct MenuTree {
    nodes: Vec<MenuNode>,
    by_id: HashMap<MenuItemId, usize>,
    by_name: HashMap<String, usize>,
    root_children: Vec<MenuItemId>,
    // Root-to-selected indices into `nodes`; the synthetic root is implicit.
    path: Vec<usize>,
    selected: HashSet<MenuItemId>,
}

impl MenuTree {
    /// Builds with the default options: orphans reparented, no permission filter.
    pub fn build<'a, I>(items: I) -> Result<Self, MenuError>
    where
        I: IntoIterator<Item = &'a MenuItemRecord>,
    {
        MenuTreeBuilder::new().build(items)
    }

    /// Builds the menu visible to a permission set; `None` means every item.
    pub fn for_permissions<'a, I>(
        items: I,
        permissions: Option<&HashSet<PermissionId>>,
    ) -> Result<Self, MenuError>
    where
        I: IntoIterator<Item = &'a MenuItemRecord>,
    {
        let builder = match permissions {
            Some(set) => MenuTreeBuilder::new().restrict_to(set.clone()),
            None => MenuTreeBuilder::new(),
        };
        builder.build(items)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: MenuItemId) -> Option<&MenuNode> {
        self.by_id.get(&id).map(|&idx| &self.nodes[idx])
    }

    pub fn find(&self, name: &str) -> Option<&MenuNode> {
        self.by_name.get(name).map(|&idx| &self.nodes[idx])
    }

    pub fn root_children(&self) -> Vec<&MenuNode> {
        self.resolve(&self.root_children)
    }

    pub fn children_of(&self, node: &MenuNode) -> Vec<&MenuNode> {
        self.resolve(&node.children)
    }

    fn resolve(&self, ids: &[MenuItemId]) -> Vec<&MenuNode> {
        ids.iter().filter_map(|id| self.get(*id)).collect()
    }

    /// Makes `name` the active entry. Unknown names leave the selection as it was.
    pub fn select(&mut self, name: &str) -> Option<&MenuNode> {
        let Some(&target) = self.by_name.get(name) else {
            debug!("Menu selection ignored, no item named {}", name);
            return None;
        };

        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(idx) = cursor {
            path.push(idx);
            cursor = self.nodes[idx]
                .parent_id
                .and_then(|parent| self.by_id.get(&parent).copied());
        }
        path.reverse();

        self.selected = path.iter().map(|&idx| self.nodes[idx].id).collect();
        self.path = path;
        Some(&self.nodes[target])
    }

    pub fn selection_state(&self) -> SelectionState {
        if self.path.is_empty() {
            SelectionState::Unselected
        } else {
            SelectionState::Selected
        }
    }

    pub fn is_selected(&self, id: MenuItemId) -> bool {
        self.selected.contains(&id)
    }

    /// Entries to show at navigation `level`: level 0 is the top-level menu,
    /// level `n` lists the children of the `n`th entry on the selection path.
    pub fn children_at_depth(&self, level: usize) -> Option<Vec<&MenuNode>> {
        if self.path.is_empty() {
            return None;
        }
        if level == 0 {
            return Some(self.root_children());
        }
        let &idx = self.path.get(level - 1)?;
        Some(self.resolve(&self.nodes[idx].children))
    }

    pub fn breadcrumbs(&self) -> Vec<&MenuNode> {
        self.path.iter().map(|&idx| &self.nodes[idx]).collect()
    }

    pub fn selected_node(&self) -> Option<&MenuNode> {
        self.path.last().map(|&idx| &self.nodes[idx])
    }

    pub fn current_selection_name(&self) -> Option<&str> {
        self.selected_node().map(|node| node.name.as_str())
    }
}
