use serde::{Deserialize, Serialize};

pub type MenuItemId = i64;
pub type PermissionId = i64;

/// One persisted menu entry as handed over by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemRecord {
    pub id: MenuItemId,
    #[serde(default)]
    pub parent_id: Option<MenuItemId>,
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub seq: i32,
    pub target: MenuTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MenuTarget {
    ControllerAction(ControllerActionRef),
    ContentPage(ContentPageRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerActionRef {
    pub id: i64,
    pub site_controller_id: i64,
    pub controller_name: String,
    pub action_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_to_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_id: Option<PermissionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPageRef {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_id: Option<PermissionId>,
}

impl ControllerActionRef {
    /// The explicit override when it has visible content, else `/{controller}/{action}`.
    pub fn url(&self) -> String {
        match self.url_to_use.as_deref() {
            Some(url) if !url.trim().is_empty() => url.to_string(),
            _ => format!("/{}/{}", self.controller_name, self.action_name),
        }
    }
}

impl MenuTarget {
    pub fn url(&self) -> String {
        match self {
            MenuTarget::ControllerAction(action) => action.url(),
            MenuTarget::ContentPage(page) => format!("/{}", page.name),
        }
    }

    /// Permission required to see an item pointing at this target, if any.
    pub fn permission_id(&self) -> Option<PermissionId> {
        match self {
            MenuTarget::ControllerAction(action) => action.permission_id,
            MenuTarget::ContentPage(page) => page.permission_id,
        }
    }
}
