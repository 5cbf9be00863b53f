//! Sibling ordering by weight
//!
//! Weights are the 1-based display order of a sibling list. Callers that place a node
//! at a requested weight first call [`reorder_for_inserted_weight`] to open a slot and
//! then [`normalize`] to bring the list back to a dense `1..=N` sequence.

use crate::models::{Node, NodeId};

fn is_other(node: &Node, exclude_id: Option<&NodeId>) -> bool {
    exclude_id.map_or(true, |id| &node.id != id)
}

/// Sort `siblings` by weight and renumber them `1, 2, 3, ...`.
///
/// Ties keep their current relative order. An excluded node keeps its own weight and
/// is slotted back after every sibling whose new weight is not greater than it.
pub fn normalize(siblings: &mut Vec<Node>, exclude_id: Option<&NodeId>) {
    let excluded = exclude_id
        .and_then(|id| siblings.iter().position(|node| &node.id == id))
        .map(|index| siblings.remove(index));

    siblings.sort_by_key(|node| node.weight);
    for (index, node) in siblings.iter_mut().enumerate() {
        node.weight = index as u32 + 1;
    }

    if let Some(node) = excluded {
        let at = siblings.partition_point(|sibling| sibling.weight <= node.weight);
        siblings.insert(at, node);
    }
}

/// Open a slot for a node that asks for weight `desired`.
///
/// Returns the weight the in-flight node should take:
///
/// - `desired` equals the current maximum among the other siblings: every other
///   sibling with a positive weight moves down by one and the node takes the maximum,
///   landing after all of them
/// - otherwise: every other sibling at or above `desired` moves up by one and the
///   node takes `desired`
///
/// The list is not dense afterwards; call [`normalize`] once the node's weight is set.
pub fn reorder_for_inserted_weight(
    siblings: &mut [Node],
    desired: u32,
    exclude_id: Option<&NodeId>,
) -> u32 {
    let max_weight = siblings
        .iter()
        .filter(|node| is_other(node, exclude_id))
        .map(|node| node.weight)
        .max()
        .unwrap_or(0);

    if desired == max_weight {
        for node in siblings.iter_mut() {
            if is_other(node, exclude_id) && node.weight > 0 {
                node.weight -= 1;
            }
        }
        max_weight
    } else {
        for node in siblings.iter_mut() {
            if is_other(node, exclude_id) && node.weight >= desired {
                node.weight = node.weight.saturating_add(1);
            }
        }
        desired
    }
}

/// Normalize every sibling list of the forest, top-down.
pub fn sort_forest(forest: &mut Vec<Node>) {
    normalize(forest, None);

    let mut stack: Vec<&mut Node> = forest.iter_mut().collect();
    while let Some(node) = stack.pop() {
        normalize(&mut node.children, None);
        stack.extend(node.children.iter_mut());
    }
}
