//! Node Data Structures
//!
//! This module defines the `Node` struct stored in the navigation tree, together
//! with the payload types used to create and patch nodes.
//!
//! # Architecture
//!
//! - **Owned Hierarchy**: Every node owns its `children` outright; a subtree moves as one value
//! - **Textual Identity**: `NodeId` compares as text whether the document stored a string or a number
//! - **Dense Ordering**: `weight` is the 1-based position among siblings after every mutation
//! - **Opaque Metadata**: Display and audit fields are carried through untouched
//!
//! # Examples
//!
//! ```rust
//! use navtree_core::models::{NewNode, NodeKind};
//!
//! let payload = NewNode::new("Getting started")
//!     .with_kind(NodeKind::Page)
//!     .with_content("Welcome!")
//!     .with_weight(2);
//! assert_eq!(payload.weight, Some(2));
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Default display visibility code (visible)
fn default_show_type() -> i32 {
    ShowType::Visible.code()
}

/// Identifier of a node, compared as text.
///
/// Stored documents written by older tools contain numeric ids (`1700000000000123`)
/// and numeric parent references (`0`). Both deserialize into the same textual form
/// so lookups never depend on how a value was written.
///
/// The value `"0"` is reserved as the root sentinel. An empty string or JSON `null`
/// is read as the root sentinel as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Reserved parent id meaning "top level"
    pub const ROOT_SENTINEL: &'static str = "0";

    /// Create an id from any textual value (empty text becomes the root sentinel)
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.is_empty() {
            Self::root()
        } else {
            Self(id)
        }
    }

    /// The root sentinel
    pub fn root() -> Self {
        Self(Self::ROOT_SENTINEL.to_string())
    }

    /// Generate a fresh UUID v4 identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Whether this id is the root sentinel
    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT_SENTINEL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<&String> for NodeId {
    fn from(id: &String) -> Self {
        Self::new(id.as_str())
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Raw id shapes accepted from stored documents and request payloads
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<RawId>::deserialize(deserializer)? {
            None => NodeId::root(),
            Some(RawId::Text(text)) => NodeId::new(text),
            Some(RawId::Unsigned(n)) => NodeId(n.to_string()),
            Some(RawId::Signed(n)) => NodeId(n.to_string()),
        })
    }
}

/// Present key means `Some`, even for `null` (which reads as the root sentinel)
fn deserialize_present_id<'de, D>(deserializer: D) -> Result<Option<NodeId>, D::Error>
where
    D: Deserializer<'de>,
{
    NodeId::deserialize(deserializer).map(Some)
}

/// Kind of node: a container ("menu") or a leaf page ("button").
///
/// The kind only tells callers how `content` is populated; the tree itself
/// treats both kinds identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeKind {
    #[default]
    #[serde(rename = "menu", alias = "container")]
    Container,
    #[serde(rename = "button", alias = "page")]
    Page,
}

impl NodeKind {
    /// Wire code of this kind
    pub fn code(&self) -> &'static str {
        match self {
            NodeKind::Container => "menu",
            NodeKind::Page => "button",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Container => "Directory",
            NodeKind::Page => "Page",
        }
    }
}

/// Known display visibility codes carried in `Node::show_type`.
///
/// The tree never interprets the code; this only names the values clients use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowType {
    Hidden,
    Visible,
    SuperAdminOnly,
}

impl ShowType {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ShowType::Hidden),
            1 => Some(ShowType::Visible),
            9 => Some(ShowType::SuperAdminOnly),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ShowType::Hidden => 0,
            ShowType::Visible => 1,
            ShowType::SuperAdminOnly => 9,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShowType::Hidden => "Hidden",
            ShowType::Visible => "Visible",
            ShowType::SuperAdminOnly => "Super admin only",
        }
    }
}

/// A node of the navigation tree.
///
/// # Fields
///
/// - `id`: Unique identifier across the whole tree
/// - `parent_id`: Id of the owning node, or the root sentinel for top-level nodes
/// - `name`: Display label (never empty)
/// - `kind`: Container or page
/// - `weight`: 1-based position among siblings
/// - `content`: Opaque payload
/// - `children`: Owned, ordered child nodes (`subList` on the wire)
///
/// Remaining fields are passthrough metadata. Keys the store does not know are kept
/// in `extra` so a load/store cycle never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,

    #[serde(default)]
    pub parent_id: NodeId,

    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: NodeKind,

    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub icon: String,

    /// Display visibility code (0 hidden, 1 visible, 9 super admin only)
    #[serde(default = "default_show_type")]
    pub show_type: i32,

    #[serde(default)]
    pub weight: u32,

    #[serde(default)]
    pub create_user_id: i64,

    /// Creation time, epoch milliseconds
    #[serde(default)]
    pub create_time: i64,

    #[serde(default)]
    pub update_user_id: i64,

    /// Last modification time, epoch milliseconds
    #[serde(default)]
    pub update_time: i64,

    #[serde(default)]
    pub permission_list_json: Vec<Value>,

    #[serde(rename = "subList", default)]
    pub children: Vec<Node>,

    #[serde(default)]
    pub content: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// Create a top-level container node with the given id and name
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: id.into(),
            parent_id: NodeId::root(),
            name: name.into(),
            kind: NodeKind::default(),
            path: String::new(),
            icon: String::new(),
            show_type: default_show_type(),
            weight: 0,
            create_user_id: 0,
            create_time: now,
            update_user_id: 0,
            update_time: now,
            permission_list_json: Vec::new(),
            children: Vec::new(),
            content: String::new(),
            extra: Map::new(),
        }
    }

    /// Set the parent reference
    pub fn with_parent(mut self, parent_id: impl Into<NodeId>) -> Self {
        self.parent_id = parent_id.into();
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Append a child, pointing its `parent_id` at this node
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child.with_parent(self.id.clone()));
        self
    }

    /// Whether this node sits at the top level of the forest
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_root()
    }
}

/// Payload for creating a node.
///
/// Only `name` is required. Everything else falls back to the defaults applied by
/// `TreeService::add_node`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNode {
    /// Explicit id; generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,

    /// Parent taken when the caller passes no explicit parent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,

    #[serde(default, alias = "label")]
    pub name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,

    /// Requested sibling position; 0 or absent places the node first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_type: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_user_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_user_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_list_json: Option<Vec<Value>>,

    /// Creation time to keep, epoch milliseconds; stamped when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<i64>,

    /// Modification time to keep, epoch milliseconds; stamped when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<i64>,

    /// Initial subtree, inserted together with the node
    #[serde(rename = "subList", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl NewNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<NodeId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Build the stored node, applying defaults for every omitted field.
    ///
    /// Children are attached as given; relinking their `parent_id` is up to the caller.
    pub fn into_node(self, id: NodeId, parent_id: NodeId, now_millis: i64) -> Node {
        Node {
            id,
            parent_id,
            name: self.name,
            kind: self.kind.unwrap_or_default(),
            path: self.path.unwrap_or_default(),
            icon: self.icon.unwrap_or_default(),
            show_type: self.show_type.unwrap_or_else(default_show_type),
            weight: self.weight.unwrap_or(0),
            create_user_id: self.create_user_id.unwrap_or(0),
            create_time: self.create_time.unwrap_or(now_millis),
            update_user_id: self.update_user_id.unwrap_or(0),
            update_time: self.update_time.unwrap_or(now_millis),
            permission_list_json: self.permission_list_json.unwrap_or_default(),
            children: self.children,
            content: self.content.unwrap_or_default(),
            extra: Map::new(),
        }
    }
}

/// Partial node update.
///
/// All fields are optional; only provided fields change. Structural fields are
/// handled by the service rather than merged blindly:
///
/// - `parent_id`: a different value moves the node (with cycle checks); an explicit
///   JSON `null` means the root, while an absent key leaves the node in place
/// - `id`: a different value renames the node and relinks its direct children
/// - `weight`: the requested position is honored relative to the siblings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,

    #[serde(
        default,
        deserialize_with = "deserialize_present_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<NodeId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_type: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_user_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_list_json: Option<Vec<Value>>,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<NodeId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Check if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Shallow merge of the non-structural fields into `node`.
    ///
    /// `id`, `parent_id` and `weight` are left alone.
    pub fn apply_fields(&self, node: &mut Node) {
        if let Some(name) = &self.name {
            node.name = name.clone();
        }
        if let Some(kind) = self.kind {
            node.kind = kind;
        }
        if let Some(content) = &self.content {
            node.content = content.clone();
        }
        if let Some(path) = &self.path {
            node.path = path.clone();
        }
        if let Some(icon) = &self.icon {
            node.icon = icon.clone();
        }
        if let Some(show_type) = self.show_type {
            node.show_type = show_type;
        }
        if let Some(update_user_id) = self.update_user_id {
            node.update_user_id = update_user_id;
        }
        if let Some(permissions) = &self.permission_list_json {
            node.permission_list_json = permissions.clone();
        }
    }
}
