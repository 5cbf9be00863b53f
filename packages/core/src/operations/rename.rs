//! Identifier rename with parent relinking

use crate::models::{Node, NodeId};

/// Give `node` a new id and relink its direct children to it.
///
/// Only children whose `parent_id` still names the old id are relinked. Deeper
/// descendants point at their own parent, whose id does not change, so they are
/// left untouched. Returns the old id.
pub fn cascade_id_rename(node: &mut Node, new_id: NodeId) -> NodeId {
    let old_id = std::mem::replace(&mut node.id, new_id);
    for child in node.children.iter_mut() {
        if child.parent_id == old_id {
            child.parent_id = node.id.clone();
        }
    }
    old_id
}
