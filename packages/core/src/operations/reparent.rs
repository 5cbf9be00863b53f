//! Cycle checks for moving a node under a new parent

use super::error::TreeOperationError;
use super::navigator::{self, SiblingSlot};
use crate::models::{Node, NodeId};

/// Whether `target_id` appears anywhere below `candidate_ancestor`.
///
/// The node's own id does not count.
pub fn is_descendant(candidate_ancestor: &Node, target_id: &NodeId) -> bool {
    let mut stack: Vec<&Node> = candidate_ancestor.children.iter().collect();
    while let Some(node) = stack.pop() {
        if &node.id == target_id {
            return true;
        }
        stack.extend(node.children.iter());
    }
    false
}

/// Reject moving `node` under itself or under one of its descendants
pub fn check_move(node: &Node, new_parent_id: &NodeId) -> Result<(), TreeOperationError> {
    if &node.id == new_parent_id {
        return Err(TreeOperationError::invalid_move(
            node.id.clone(),
            new_parent_id.clone(),
            "a node cannot be its own parent",
        ));
    }
    if is_descendant(node, new_parent_id) {
        return Err(TreeOperationError::invalid_move(
            node.id.clone(),
            new_parent_id.clone(),
            "the target is one of its descendants",
        ));
    }
    Ok(())
}

/// Move a node, with its subtree, to the end of `new_parent_id`'s children.
///
/// Returns the slot the node was taken from. On any error the node is put back where
/// it was, so the forest is left exactly as it was passed in.
pub fn move_node(
    forest: &mut Vec<Node>,
    id: &NodeId,
    new_parent_id: &NodeId,
) -> Result<SiblingSlot, TreeOperationError> {
    let slot = navigator::find_parent_context(forest, id)
        .ok_or_else(|| TreeOperationError::node_not_found(id.clone()))?;
    let mut node = navigator::siblings_mut(forest, &slot)
        .map(|siblings| siblings.remove(slot.index))
        .ok_or_else(|| TreeOperationError::node_not_found(id.clone()))?;

    if let Err(e) = check_move(&node, new_parent_id) {
        navigator::restore_at(forest, &slot, node);
        return Err(e);
    }

    let previous_parent = std::mem::replace(&mut node.parent_id, new_parent_id.clone());
    if let Err(mut node) = navigator::insert_under_parent(forest, new_parent_id, node) {
        node.parent_id = previous_parent;
        navigator::restore_at(forest, &slot, node);
        return Err(TreeOperationError::parent_not_found(new_parent_id.clone()));
    }

    tracing::debug!(
        "Moved node '{}' from '{}' to '{}'",
        id,
        slot.parent_id,
        new_parent_id
    );
    Ok(slot)
}
