use serde::Serialize;

use crate::record::{MenuItemId, MenuItemRecord, MenuTarget};

/// Reference ids of whatever a node links to. Nothing is loaded eagerly;
/// callers resolve them through a [`TargetResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetRef {
    ControllerAction {
        site_controller_id: i64,
        controller_action_id: i64,
    },
    ContentPage {
        content_page_id: i64,
    },
}

/// Lookup collaborator for the entities a menu node points at.
pub trait TargetResolver {
    type SiteController;
    type ControllerAction;
    type ContentPage;

    fn site_controller(&self, id: i64) -> Option<Self::SiteController>;
    fn controller_action(&self, id: i64) -> Option<Self::ControllerAction>;
    fn content_page(&self, id: i64) -> Option<Self::ContentPage>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    pub id: MenuItemId,
    pub parent_id: Option<MenuItemId>,
    pub name: String,
    pub label: String,
    pub url: String,
    pub target: TargetRef,
    pub children: Vec<MenuItemId>,
}

impl MenuNode {
    pub(crate) fn from_record(record: &MenuItemRecord) -> Self {
        let target = match &record.target {
            MenuTarget::ControllerAction(action) => TargetRef::ControllerAction {
                site_controller_id: action.site_controller_id,
                controller_action_id: action.id,
            },
            MenuTarget::ContentPage(page) => TargetRef::ContentPage {
                content_page_id: page.id,
            },
        };
        Self {
            id: record.id,
            parent_id: record.parent_id,
            name: record.name.clone(),
            label: record.label.clone(),
            url: record.target.url(),
            target,
            children: Vec::new(),
        }
    }

    pub fn site_controller_id(&self) -> Option<i64> {
        match self.target {
            TargetRef::ControllerAction {
                site_controller_id, ..
            } => Some(site_controller_id),
            TargetRef::ContentPage { .. } => None,
        }
    }

    pub fn controller_action_id(&self) -> Option<i64> {
        match self.target {
            TargetRef::ControllerAction {
                controller_action_id,
                ..
            } => Some(controller_action_id),
            TargetRef::ContentPage { .. } => None,
        }
    }

    pub fn content_page_id(&self) -> Option<i64> {
        match self.target {
            TargetRef::ContentPage { content_page_id } => Some(content_page_id),
            TargetRef::ControllerAction { .. } => None,
        }
    }

    pub fn site_controller<R: TargetResolver>(&self, resolver: &R) -> Option<R::SiteController> {
        self.site_controller_id()
            .and_then(|id| resolver.site_controller(id))
    }

    pub fn controller_action<R: TargetResolver>(
        &self,
        resolver: &R,
    ) -> Option<R::ControllerAction> {
        self.controller_action_id()
            .and_then(|id| resolver.controller_action(id))
    }

    pub fn content_page<R: TargetResolver>(&self, resolver: &R) -> Option<R::ContentPage> {
        self.content_page_id().and_then(|id| resolver.content_page(id))
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ContentPageRef, ControllerActionRef};
    use std::cell::Cell;

    struct CountingResolver {
        lookups: Cell<usize>,
    }

    impl TargetResolver for CountingResolver {
        type SiteController = String;
        type ControllerAction = String;
        type ContentPage = String;

        fn site_controller(&self, id: i64) -> Option<String> {
            self.lookups.set(self.lookups.get() + 1);
            Some(format!("controller-{id}"))
        }

        fn controller_action(&self, id: i64) -> Option<String> {
            self.lookups.set(self.lookups.get() + 1);
            Some(format!("action-{id}"))
        }

        fn content_page(&self, id: i64) -> Option<String> {
            self.lookups.set(self.lookups.get() + 1);
            (id == 9).then(|| "page-9".to_string())
        }
    }

    fn record(target: MenuTarget) -> MenuItemRecord {
        MenuItemRecord {
            id: 1,
            parent_id: None,
            name: "item".into(),
            label: "Item".into(),
            seq: 0,
            target,
        }
    }

    #[test]
    fn controller_action_node_resolves_lazily() {
        let node = MenuNode::from_record(&record(MenuTarget::ControllerAction(
            ControllerActionRef {
                id: 12,
                site_controller_id: 4,
                controller_name: "late_policies".into(),
                action_name: "index".into(),
                url_to_use: None,
                permission_id: None,
            },
        )));
        let resolver = CountingResolver {
            lookups: Cell::new(0),
        };

        assert_eq!(node.url, "/late_policies/index");
        assert_eq!(resolver.lookups.get(), 0);
        assert_eq!(node.site_controller(&resolver).as_deref(), Some("controller-4"));
        assert_eq!(node.controller_action(&resolver).as_deref(), Some("action-12"));
        assert_eq!(node.content_page(&resolver), None);
        assert_eq!(resolver.lookups.get(), 2);
    }

    #[test]
    fn content_page_node_has_no_controller_refs() {
        let node = MenuNode::from_record(&record(MenuTarget::ContentPage(ContentPageRef {
            id: 9,
            name: "credits".into(),
            permission_id: None,
        })));
        let resolver = CountingResolver {
            lookups: Cell::new(0),
        };

        assert_eq!(node.url, "/credits");
        assert_eq!(node.site_controller_id(), None);
        assert_eq!(node.controller_action(&resolver), None);
        assert_eq!(node.content_page(&resolver).as_deref(), Some("page-9"));
        assert!(node.is_leaf());
    }
}
