//! Tree Service - Weighted Hierarchy Editing
//!
//! This module provides the business logic layer over the tree snapshot:
//!
//! - Reads (whole tree, single node, content statistics) with ordering applied
//! - Insert under a parent with an optional requested position
//! - Update with reparenting, identifier rename and repositioning
//! - Delete of a node together with its subtree, bounded by a time budget
//!
//! # Read-Modify-Write
//!
//! Every call loads the full snapshot, edits a private copy and stores the full
//! snapshot back. Structural checks run before the store, so a rejected call never
//! writes. There is no locking: two concurrent mutations both start from the same
//! snapshot and the later store wins. Callers needing multi-writer safety must
//! serialize calls (one queue per store).

use crate::config::{StoreConfig, DEFAULT_DELETE_TIMEOUT_SECS, MAX_TREE_DEPTH};
use crate::db::{TreeEvent, TreeStore};
use crate::models::{NewNode, Node, NodeId, NodePatch, TreeStats};
use crate::operations::{navigator, ordering, rename, reparent};
use crate::services::content_cleanup::{ContentCleaner, NoopContentCleaner};
use crate::services::error::TreeServiceError;
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Broadcast channel capacity for tree events.
const TREE_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Honor a requested weight for `id`, then densify the list
fn place_node(siblings: &mut Vec<Node>, id: &NodeId, requested_weight: Option<u32>) {
    if let Some(desired) = requested_weight {
        let assigned = ordering::reorder_for_inserted_weight(siblings, desired, Some(id));
        if let Some(node) = siblings.iter_mut().find(|node| &node.id == id) {
            node.weight = assigned;
        }
    }
    ordering::normalize(siblings, None);
}

fn validate_name(name: &str) -> Result<(), TreeServiceError> {
    if name.trim().is_empty() {
        return Err(TreeServiceError::validation("Node name must not be empty"));
    }
    Ok(())
}

/// Make sure `id` may be given to a node of `forest`
fn validate_new_id(forest: &[Node], id: &NodeId) -> Result<(), TreeServiceError> {
    if id.is_root() {
        return Err(TreeServiceError::validation(format!(
            "Node ID '{}' is reserved for the root",
            id
        )));
    }
    if navigator::find_by_id(forest, id).is_some() {
        return Err(TreeServiceError::duplicate_id(id.clone()));
    }
    Ok(())
}

/// Reject placing `node` (with its subtree) under `parent_id` beyond the depth limit
fn check_depth(forest: &[Node], parent_id: &NodeId, node: &Node) -> Result<(), TreeServiceError> {
    let depth = navigator::depth_of(forest, parent_id).unwrap_or(0) + navigator::subtree_height(node);
    if depth > MAX_TREE_DEPTH {
        return Err(TreeServiceError::depth_limit_exceeded(node.id.clone(), depth));
    }
    Ok(())
}

/// Prepare a subtree supplied with a new node.
///
/// Descendants without an id get a generated one, names are checked, ids must be new
/// to both the forest and the subtree, parent links follow the nesting and every
/// sibling list is renumbered densely.
fn adopt_subtree(forest: &[Node], root: &mut Node) -> Result<(), TreeServiceError> {
    let existing: HashSet<&NodeId> = navigator::walk(forest).map(|node| &node.id).collect();
    let mut seen: HashSet<NodeId> = HashSet::from([root.id.clone()]);

    let mut stack: Vec<&mut Node> = vec![root];
    while let Some(node) = stack.pop() {
        ordering::normalize(&mut node.children, None);
        for child in node.children.iter_mut() {
            if child.id.is_root() {
                child.id = NodeId::generate();
            }
            validate_name(&child.name)?;
            if existing.contains(&child.id) || !seen.insert(child.id.clone()) {
                return Err(TreeServiceError::duplicate_id(child.id.clone()));
            }
            child.parent_id = node.id.clone();
        }
        stack.extend(node.children.iter_mut());
    }
    Ok(())
}

/// Editor for one persisted tree
///
/// Cheap to clone; clones share the store, the cleaner and the event channel.
#[derive(Clone)]
pub struct TreeService {
    store: Arc<dyn TreeStore>,
    cleaner: Arc<dyn ContentCleaner>,
    delete_timeout: Duration,
    /// Broadcast channel for committed changes
    event_tx: broadcast::Sender<TreeEvent>,
}

impl TreeService {
    /// Create a service over `store` with default settings
    ///
    /// # Examples
    ///
    /// ```rust
    /// use navtree_core::db::MemoryStore;
    /// use navtree_core::models::NewNode;
    /// use navtree_core::services::TreeService;
    /// use std::sync::Arc;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let service = TreeService::new(Arc::new(MemoryStore::new()));
    /// let docs = service.add_node(NewNode::new("Docs"), None).await?;
    /// service.add_node(NewNode::new("Install"), Some(docs.id.as_str())).await?;
    ///
    /// let tree = service.list_tree().await?;
    /// assert_eq!(tree[0].children[0].name, "Install");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(store: Arc<dyn TreeStore>) -> Self {
        let (event_tx, _) = broadcast::channel(TREE_EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            cleaner: Arc::new(NoopContentCleaner),
            delete_timeout: Duration::from_secs(DEFAULT_DELETE_TIMEOUT_SECS),
            event_tx,
        }
    }

    /// Create a service over `store` using the settings in `config`
    pub fn with_config(store: Arc<dyn TreeStore>, config: &StoreConfig) -> Self {
        Self::new(store).with_delete_timeout(config.delete_timeout)
    }

    /// Use `cleaner` for external per-node content during deletes
    pub fn with_content_cleaner(mut self, cleaner: Arc<dyn ContentCleaner>) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// Bound deletes by `budget`
    pub fn with_delete_timeout(mut self, budget: Duration) -> Self {
        self.delete_timeout = budget;
        self
    }

    /// Subscribe to committed changes
    ///
    /// Events are sent after the snapshot has been stored. Slow receivers may lag and
    /// miss events.
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<TreeEvent> {
        self.event_tx.subscribe()
    }

    /// Ignores errors if no subscribers (expected in most callers).
    fn emit_event(&self, event: TreeEvent) {
        let _ = self.event_tx.send(event);
    }

    async fn load_forest(&self) -> Result<Vec<Node>, TreeServiceError> {
        Ok(self.store.load().await?)
    }

    async fn commit(&self, forest: &[Node]) -> Result<(), TreeServiceError> {
        self.store.store(forest).await.map_err(|e| {
            tracing::error!(
                "Failed to store snapshot '{}': {}",
                self.store.resource_key(),
                e
            );
            TreeServiceError::from(e)
        })
    }

    /// Whole tree, every sibling list sorted by weight
    pub async fn list_tree(&self) -> Result<Vec<Node>, TreeServiceError> {
        let mut forest = self.load_forest().await?;
        ordering::sort_forest(&mut forest);
        Ok(forest)
    }

    /// Node by ID with its sorted subtree, or `None` if absent
    pub async fn find_node(&self, id: &str) -> Result<Option<Node>, TreeServiceError> {
        let mut forest = self.list_tree().await?;
        Ok(navigator::remove_by_id(&mut forest, &NodeId::from(id)))
    }

    /// Node by ID with its sorted subtree
    ///
    /// # Errors
    ///
    /// `NodeNotFound` if no node has this ID.
    pub async fn get_node(&self, id: &str) -> Result<Node, TreeServiceError> {
        self.find_node(id)
            .await?
            .ok_or_else(|| TreeServiceError::node_not_found(id))
    }

    /// Content statistics over the whole tree
    pub async fn tree_stats(&self) -> Result<TreeStats, TreeServiceError> {
        let forest = self.load_forest().await?;
        Ok(TreeStats::from_nodes(navigator::walk(&forest)))
    }

    /// Insert a node under a parent
    ///
    /// The parent is `parent_id` if given, else `payload.parent_id`, else the root.
    /// Without a requested weight the node is placed first among its siblings; with
    /// one, it takes that position and the siblings shift around it. The returned node
    /// carries the weight it actually received.
    ///
    /// An ID that is absent, empty or `0` is replaced by a generated one. A `subList`
    /// in the payload is inserted along with the node.
    ///
    /// # Errors
    ///
    /// - `ParentNotFound` if the parent does not exist
    /// - `Validation` if a name in the payload is empty
    /// - `DuplicateId` if an explicit ID is already in use
    /// - `DepthLimitExceeded` if the node or its subtree would nest too deep
    /// - `Persistence` if the snapshot cannot be loaded or stored
    pub async fn add_node(
        &self,
        payload: NewNode,
        parent_id: Option<&str>,
    ) -> Result<Node, TreeServiceError> {
        let mut forest = self.load_forest().await?;

        let parent_id = parent_id
            .map(NodeId::from)
            .or_else(|| payload.parent_id.clone())
            .unwrap_or_default();
        if !parent_id.is_root() && navigator::find_by_id(&forest, &parent_id).is_none() {
            return Err(TreeServiceError::parent_not_found(parent_id));
        }

        validate_name(&payload.name)?;
        let id = match payload.id.clone() {
            Some(id) if !id.is_root() => {
                validate_new_id(&forest, &id)?;
                id
            }
            _ => NodeId::generate(),
        };

        let requested_weight = payload.weight.filter(|weight| *weight > 0);
        let mut node =
            payload.into_node(id.clone(), parent_id.clone(), Utc::now().timestamp_millis());
        adopt_subtree(&forest, &mut node)?;
        check_depth(&forest, &parent_id, &node)?;

        let siblings = navigator::sibling_list_mut(&mut forest, &parent_id)
            .ok_or_else(|| TreeServiceError::parent_not_found(parent_id.clone()))?;
        siblings.push(node);
        place_node(siblings, &id, requested_weight);
        let created = siblings
            .iter()
            .find(|node| node.id == id)
            .cloned()
            .ok_or_else(|| TreeServiceError::node_not_found(id.clone()))?;

        self.commit(&forest).await?;

        tracing::info!(
            "Added node '{}' under '{}' at weight {}",
            created.id,
            parent_id,
            created.weight
        );
        self.emit_event(TreeEvent::NodeAdded(created.clone()));
        Ok(created)
    }

    /// Update a node from a partial patch
    ///
    /// Steps, in order:
    ///
    /// 1. A `parent_id` different from the current parent moves the node (and its
    ///    subtree) to the end of the new parent's children
    /// 2. Plain fields are merged and `update_time` is stamped
    /// 3. A different `id` renames the node and relinks its direct children
    /// 4. A `weight` repositions the node among its (possibly new) siblings
    /// 5. Both the old and the new sibling lists are renumbered densely
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the node does not exist
    /// - `ParentNotFound` if the new parent does not exist
    /// - `InvalidMove` if the new parent is the node itself or one of its descendants
    /// - `DepthLimitExceeded` if the moved subtree would nest too deep
    /// - `DuplicateId` if the new ID is already in use
    /// - `Validation` if the new name is empty or the new ID is the root sentinel
    /// - `Persistence` if the snapshot cannot be loaded or stored
    pub async fn update_node(&self, id: &str, patch: NodePatch) -> Result<Node, TreeServiceError> {
        let id = NodeId::from(id);
        let mut forest = self.load_forest().await?;

        let current_parent = navigator::find_parent_context(&forest, &id)
            .map(|slot| slot.parent_id)
            .ok_or_else(|| TreeServiceError::node_not_found(id.clone()))?;

        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        let new_id = patch.id.clone().filter(|new_id| new_id != &id);
        if let Some(new_id) = &new_id {
            validate_new_id(&forest, new_id)?;
        }

        let target_parent = match &patch.parent_id {
            Some(requested) if requested != &current_parent => {
                if !requested.is_root() && navigator::find_by_id(&forest, requested).is_none() {
                    return Err(TreeServiceError::parent_not_found(requested.clone()));
                }
                reparent::move_node(&mut forest, &id, requested)?;
                if let Some(node) = navigator::find_by_id(&forest, &id) {
                    check_depth(&forest, requested, node)?;
                }
                requested.clone()
            }
            _ => current_parent.clone(),
        };
        let moved = target_parent != current_parent;

        let node = navigator::update_in_place(&mut forest, &id, &patch)
            .ok_or_else(|| TreeServiceError::node_not_found(id.clone()))?;
        node.update_time = Utc::now().timestamp_millis();
        let final_id = match new_id {
            Some(new_id) => {
                rename::cascade_id_rename(node, new_id.clone());
                tracing::debug!("Renamed node '{}' to '{}'", id, new_id);
                new_id
            }
            None => id.clone(),
        };

        let siblings = navigator::sibling_list_mut(&mut forest, &target_parent)
            .ok_or_else(|| TreeServiceError::parent_not_found(target_parent.clone()))?;
        place_node(siblings, &final_id, patch.weight);
        let updated = siblings
            .iter()
            .find(|node| node.id == final_id)
            .cloned()
            .ok_or_else(|| TreeServiceError::node_not_found(final_id.clone()))?;

        if moved {
            if let Some(previous) = navigator::sibling_list_mut(&mut forest, &current_parent) {
                ordering::normalize(previous, None);
            }
        }

        self.commit(&forest).await?;

        tracing::info!("Updated node '{}' (weight {})", updated.id, updated.weight);
        if moved {
            self.emit_event(TreeEvent::NodeMoved {
                id: final_id,
                from: current_parent,
                to: target_parent,
            });
        }
        self.emit_event(TreeEvent::NodeUpdated(updated.clone()));
        Ok(updated)
    }

    /// Delete a node and its whole subtree
    ///
    /// The configured `ContentCleaner` runs for every node of the subtree first;
    /// its failures are logged and ignored. The load, cleanup and splice must finish
    /// within the delete budget. The snapshot is stored only afterwards, so a delete
    /// that times out writes nothing.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the node does not exist
    /// - `OperationTimeout` if the budget is exceeded
    /// - `Persistence` if the snapshot cannot be loaded or stored
    pub async fn delete_node(&self, id: &str) -> Result<bool, TreeServiceError> {
        let id = NodeId::from(id);
        let budget = self.delete_timeout;

        let (forest, removed) = tokio::time::timeout(budget, self.prepare_delete(&id))
            .await
            .map_err(|_| {
                tracing::warn!(
                    "Deleting node '{}' exceeded {:?}, nothing was written",
                    id,
                    budget
                );
                TreeServiceError::operation_timeout(id.clone(), budget)
            })??;

        self.commit(&forest).await?;

        tracing::info!("Deleted node '{}' ({} node(s) removed)", id, removed);
        self.emit_event(TreeEvent::NodeDeleted { id, removed });
        Ok(true)
    }

    /// Cancellable part of a delete: returns the edited forest and the removed count
    async fn prepare_delete(&self, id: &NodeId) -> Result<(Vec<Node>, usize), TreeServiceError> {
        let mut forest = self.load_forest().await?;

        let slot = navigator::find_parent_context(&forest, id)
            .ok_or_else(|| TreeServiceError::node_not_found(id.clone()))?;
        let removed = match navigator::find_by_id(&forest, id) {
            Some(target) => self.cleanup_subtree(target).await,
            None => return Err(TreeServiceError::node_not_found(id.clone())),
        };

        if !navigator::delete_subtree(&mut forest, id) {
            return Err(TreeServiceError::node_not_found(id.clone()));
        }
        if let Some(siblings) = navigator::siblings_mut(&mut forest, &slot) {
            ordering::normalize(siblings, None);
        }

        Ok((forest, removed))
    }

    /// Run the content cleaner over every node of `root`'s subtree, unordered.
    ///
    /// Returns the number of nodes in the subtree.
    async fn cleanup_subtree(&self, root: &Node) -> usize {
        let nodes: Vec<&Node> = navigator::walk(std::slice::from_ref(root)).collect();
        let count = nodes.len();

        let cleanups = nodes.into_iter().map(|node| async move {
            if let Err(e) = self.cleaner.cleanup(node).await {
                tracing::warn!("Content cleanup failed for node '{}': {}", node.id, e);
            }
        });
        join_all(cleanups).await;

        tracing::debug!("Cleaned up content for {} node(s) under '{}'", count, root.id);
        count
    }
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "tree_service_test.rs"]
mod tree_service_test;
