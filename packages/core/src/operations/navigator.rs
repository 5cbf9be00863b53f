//! Lookup and splice primitives over a forest
//!
//! Every primitive matches ids textually and walks the tree with an explicit stack,
//! so depth is bounded by memory rather than by the call stack. Mutable access goes
//! through an index path (`[root_index, child_index, ...]`) found by an immutable
//! search first.

use crate::models::{Node, NodeId, NodePatch};

/// Where a node sits: the list that owns it and its position in that list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingSlot {
    /// Index path of the owning node; empty when the node is top-level
    pub parent_path: Vec<usize>,
    /// Id of the owning node, or the root sentinel
    pub parent_id: NodeId,
    /// Position inside the owning list
    pub index: usize,
}

/// Pre-order iterator over a forest
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Iterate every node of the forest in depth-first pre-order
pub fn walk(forest: &[Node]) -> Walk<'_> {
    Walk {
        stack: forest.iter().rev().collect(),
    }
}

/// Index path of the first node (pre-order) whose id matches
fn locate(forest: &[Node], id: &NodeId) -> Option<Vec<usize>> {
    let mut stack: Vec<(Vec<usize>, &Node)> = forest
        .iter()
        .enumerate()
        .rev()
        .map(|(index, node)| (vec![index], node))
        .collect();

    while let Some((path, node)) = stack.pop() {
        if &node.id == id {
            return Some(path);
        }
        for (index, child) in node.children.iter().enumerate().rev() {
            let mut child_path = path.clone();
            child_path.push(index);
            stack.push((child_path, child));
        }
    }
    None
}

fn node_at<'a>(forest: &'a [Node], path: &[usize]) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let mut node = forest.get(*first)?;
    for &index in rest {
        node = node.children.get(index)?;
    }
    Some(node)
}

fn node_at_mut<'a>(forest: &'a mut [Node], path: &[usize]) -> Option<&'a mut Node> {
    let (first, rest) = path.split_first()?;
    let mut node = forest.get_mut(*first)?;
    for &index in rest {
        node = node.children.get_mut(index)?;
    }
    Some(node)
}

/// Find a node anywhere in the forest
pub fn find_by_id<'a>(forest: &'a [Node], id: &NodeId) -> Option<&'a Node> {
    walk(forest).find(|node| &node.id == id)
}

/// Find a node anywhere in the forest, mutably
pub fn find_by_id_mut<'a>(forest: &'a mut [Node], id: &NodeId) -> Option<&'a mut Node> {
    let path = locate(forest, id)?;
    node_at_mut(forest, &path)
}

/// Nesting level of a node: 1 for top-level nodes, 0 for the root sentinel
pub fn depth_of(forest: &[Node], id: &NodeId) -> Option<usize> {
    if id.is_root() {
        return Some(0);
    }
    locate(forest, id).map(|path| path.len())
}

/// Number of levels in `node`'s subtree, the node itself included
pub fn subtree_height(node: &Node) -> usize {
    let mut height = 0;
    let mut stack = vec![(node, 1usize)];
    while let Some((node, level)) = stack.pop() {
        height = height.max(level);
        stack.extend(node.children.iter().map(|child| (child, level + 1)));
    }
    height
}

/// Locate the list that owns `id` and the node's position in it
pub fn find_parent_context(forest: &[Node], id: &NodeId) -> Option<SiblingSlot> {
    let mut path = locate(forest, id)?;
    let index = path.pop()?;
    let parent_id = if path.is_empty() {
        NodeId::root()
    } else {
        node_at(forest, &path)?.id.clone()
    };

    Some(SiblingSlot {
        parent_path: path,
        parent_id,
        index,
    })
}

/// Resolve a slot to the list it points into
pub fn siblings_mut<'a>(forest: &'a mut Vec<Node>, slot: &SiblingSlot) -> Option<&'a mut Vec<Node>> {
    if slot.parent_path.is_empty() {
        return Some(forest);
    }
    node_at_mut(forest, &slot.parent_path).map(|parent| &mut parent.children)
}

/// Children list of `parent_id`, or the forest itself for the root sentinel
pub fn sibling_list_mut<'a>(
    forest: &'a mut Vec<Node>,
    parent_id: &NodeId,
) -> Option<&'a mut Vec<Node>> {
    if parent_id.is_root() {
        return Some(forest);
    }
    find_by_id_mut(forest, parent_id).map(|parent| &mut parent.children)
}

/// Merge the non-structural fields of `patch` into the matching node
pub fn update_in_place<'a>(
    forest: &'a mut [Node],
    id: &NodeId,
    patch: &NodePatch,
) -> Option<&'a mut Node> {
    let node = find_by_id_mut(forest, id)?;
    patch.apply_fields(node);
    Some(node)
}

/// Detach a node, with its subtree, from wherever it resides
pub fn remove_by_id(forest: &mut Vec<Node>, id: &NodeId) -> Option<Node> {
    let slot = find_parent_context(forest, id)?;
    let siblings = siblings_mut(forest, &slot)?;
    Some(siblings.remove(slot.index))
}

/// Append `node` to the children of `parent_id` (or to the forest for the root sentinel).
///
/// When the parent cannot be resolved the node is handed back unchanged.
pub fn insert_under_parent(forest: &mut Vec<Node>, parent_id: &NodeId, node: Node) -> Result<(), Node> {
    match sibling_list_mut(forest, parent_id) {
        Some(siblings) => {
            siblings.push(node);
            Ok(())
        }
        None => Err(node),
    }
}

/// Put a detached node back at its recorded slot
pub fn restore_at(forest: &mut Vec<Node>, slot: &SiblingSlot, node: Node) {
    match siblings_mut(forest, slot) {
        Some(siblings) => {
            let index = slot.index.min(siblings.len());
            siblings.insert(index, node);
        }
        None => {
            tracing::error!(
                "Slot for node '{}' under '{}' vanished, restoring at top level",
                node.id,
                slot.parent_id
            );
            forest.push(node);
        }
    }
}

/// Remove a node and everything beneath it in one splice
pub fn delete_subtree(forest: &mut Vec<Node>, id: &NodeId) -> bool {
    remove_by_id(forest, id).is_some()
}
