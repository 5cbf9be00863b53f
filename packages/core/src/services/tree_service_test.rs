//! Tests for TreeService add/update/delete against an in-memory store

#[cfg(test)]
mod tests {
    use crate::config::MAX_TREE_DEPTH;
    use crate::db::{MemoryStore, StoreError, TreeEvent, TreeStore};
    use crate::models::{NewNode, Node, NodeId, NodePatch};
    use crate::services::{ContentCleaner, TreeService, TreeServiceError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Helper to create a service over a memory store seeded with `forest`
    fn create_test_service(forest: Vec<Node>) -> (TreeService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_forest(forest));
        let service = TreeService::new(store.clone());
        (service, store)
    }

    /// 1 ─┬─ 2 ─── 4
    ///    └─ 3
    /// 5
    fn seeded_forest() -> Vec<Node> {
        vec![
            Node::new("1", "Guide")
                .with_weight(1)
                .with_child(
                    Node::new("2", "Setup")
                        .with_weight(1)
                        .with_child(Node::new("4", "Linux").with_weight(1)),
                )
                .with_child(Node::new("3", "Usage").with_weight(2)),
            Node::new("5", "FAQ").with_weight(2),
        ]
    }

    fn flat_forest(ids: &[&str]) -> Vec<Node> {
        ids.iter()
            .enumerate()
            .map(|(index, id)| Node::new(*id, format!("Node {}", id)).with_weight(index as u32 + 1))
            .collect()
    }

    fn order(list: &[Node]) -> Vec<(&str, u32)> {
        list.iter().map(|n| (n.id.as_str(), n.weight)).collect()
    }

    fn bytes(forest: &[Node]) -> Vec<u8> {
        serde_json::to_vec(forest).unwrap()
    }

    struct SlowCleaner(Duration);

    #[async_trait]
    impl ContentCleaner for SlowCleaner {
        async fn cleanup(&self, _node: &Node) -> anyhow::Result<()> {
            tokio::time::sleep(self.0).await;
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingCleaner {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContentCleaner for CountingCleaner {
        async fn cleanup(&self, node: &Node) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if node.id == "4" {
                anyhow::bail!("attachment store offline");
            }
            Ok(())
        }
    }

    /// Loads fine, refuses every write
    struct ReadOnlyStore(MemoryStore);

    #[async_trait]
    impl TreeStore for ReadOnlyStore {
        async fn load(&self) -> Result<Vec<Node>, StoreError> {
            self.0.load().await
        }

        async fn store(&self, _forest: &[Node]) -> Result<(), StoreError> {
            Err(StoreError::unavailable("read-only volume"))
        }

        fn resource_key(&self) -> &str {
            "read-only"
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_list_tree_sorts_every_level() {
        let forest = vec![
            Node::new("b", "B").with_weight(5),
            Node::new("a", "A")
                .with_weight(2)
                .with_child(Node::new("a2", "A2").with_weight(9))
                .with_child(Node::new("a1", "A1").with_weight(0)),
        ];
        let (service, _store) = create_test_service(forest);

        let tree = service.list_tree().await.unwrap();
        assert_eq!(order(&tree), vec![("a", 1), ("b", 2)]);
        assert_eq!(order(&tree[0].children), vec![("a1", 1), ("a2", 2)]);
    }

    #[tokio::test]
    async fn test_get_and_find_node() {
        let (service, _store) = create_test_service(seeded_forest());

        let node = service.get_node("2").await.unwrap();
        assert_eq!(node.name, "Setup");
        assert_eq!(node.children[0].id, "4");

        assert!(service.find_node("404").await.unwrap().is_none());
        let err = service.get_node("404").await.unwrap_err();
        assert!(matches!(err, TreeServiceError::NodeNotFound { .. }));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_tree_stats() {
        let forest = vec![Node::new("1", "A")
            .with_content("héllo")
            .with_child(Node::new("2", "B"))];
        let (service, _store) = create_test_service(forest);

        let stats = service.tree_stats().await.unwrap();
        assert_eq!(stats.total_nodes, 2);
        assert_eq!(stats.content_nodes, 1);
        assert_eq!(stats.total_content_length, 5);
        assert_eq!(stats.content_coverage, 50);
    }

    // ------------------------------------------------------------------
    // Add
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_add_without_weight_lands_first() {
        let (service, store) = create_test_service(flat_forest(&["a", "b"]));

        let created = service
            .add_node(NewNode::new("New").with_id("n"), None)
            .await
            .unwrap();

        assert_eq!(created.weight, 1);
        assert!(created.parent_id.is_root());
        assert!(created.create_time > 0);
        assert_eq!(order(&store.snapshot().await), vec![("n", 1), ("a", 2), ("b", 3)]);
    }

    #[tokio::test]
    async fn test_add_with_weight_takes_position() {
        let (service, store) = create_test_service(flat_forest(&["a", "b", "c"]));

        let created = service
            .add_node(NewNode::new("New").with_id("n").with_weight(2), None)
            .await
            .unwrap();

        assert_eq!(created.weight, 2);
        assert_eq!(
            order(&store.snapshot().await),
            vec![("a", 1), ("n", 2), ("b", 3), ("c", 4)]
        );
    }

    #[tokio::test]
    async fn test_add_at_current_max_lands_last() {
        let (service, store) = create_test_service(flat_forest(&["a", "b", "c"]));

        let created = service
            .add_node(NewNode::new("New").with_id("n").with_weight(3), None)
            .await
            .unwrap();

        assert_eq!(created.weight, 4);
        assert_eq!(
            order(&store.snapshot().await),
            vec![("a", 1), ("b", 2), ("c", 3), ("n", 4)]
        );
    }

    #[tokio::test]
    async fn test_add_under_parent_and_generated_id() {
        let (service, store) = create_test_service(seeded_forest());

        let created = service
            .add_node(NewNode::new("Windows").with_weight(5), Some("2"))
            .await
            .unwrap();

        assert_eq!(created.parent_id, "2");
        assert_eq!(created.id.as_str().len(), 36);
        assert_eq!(created.weight, 2);

        let forest = store.snapshot().await;
        let setup = &forest[0].children[0];
        assert_eq!(setup.children.len(), 2);
        assert_eq!(setup.children[1].id, created.id);
    }

    #[tokio::test]
    async fn test_add_uses_payload_parent() {
        let (service, _store) = create_test_service(seeded_forest());

        let created = service
            .add_node(NewNode::new("Mac").with_parent("2"), None)
            .await
            .unwrap();
        assert_eq!(created.parent_id, "2");

        // Explicit argument wins over the payload
        let created = service
            .add_node(NewNode::new("Other").with_parent("2"), Some("5"))
            .await
            .unwrap();
        assert_eq!(created.parent_id, "5");
    }

    #[tokio::test]
    async fn test_add_under_missing_parent_writes_nothing() {
        let (service, store) = create_test_service(seeded_forest());
        let before = bytes(&store.snapshot().await);

        let err = service
            .add_node(NewNode::new("Lost"), Some("999"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TreeServiceError::ParentNotFound { ref parent_id } if parent_id == "999"
        ));
        assert_eq!(bytes(&store.snapshot().await), before);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_payloads() {
        let (service, store) = create_test_service(seeded_forest());
        let before = bytes(&store.snapshot().await);

        let err = service.add_node(NewNode::new("   "), None).await.unwrap_err();
        assert!(matches!(err, TreeServiceError::Validation(_)));

        let err = service
            .add_node(NewNode::new("Dup").with_id("4"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TreeServiceError::DuplicateId { ref id } if id == "4"));

        let err = service
            .add_node(
                NewNode::new("Parent").with_child(Node::new("4", "Clash")),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TreeServiceError::DuplicateId { ref id } if id == "4"));

        let err = service
            .add_node(NewNode::new("Parent").with_child(Node::new("c", " ")), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TreeServiceError::Validation(_)));

        assert_eq!(bytes(&store.snapshot().await), before);
    }

    #[tokio::test]
    async fn test_add_with_empty_or_zero_id_generates_one() {
        let (service, _store) = create_test_service(Vec::new());

        for raw in [json!({ "id": "", "name": "Empty" }), json!({ "id": 0, "name": "Zero" })] {
            let payload: NewNode = serde_json::from_value(raw).unwrap();
            let created = service.add_node(payload, None).await.unwrap();

            assert!(!created.id.is_root());
            assert_eq!(created.id.as_str().len(), 36);
        }
    }

    #[tokio::test]
    async fn test_add_inserts_sub_list() {
        let (service, store) = create_test_service(seeded_forest());
        let payload = NewNode::new("Reference")
            .with_id("ref")
            .with_child(
                Node::new("api", "API")
                    .with_weight(7)
                    .with_child(Node::new("", "Endpoints").with_parent("stale")),
            )
            .with_child(Node::new("cli", "CLI").with_weight(2));

        let created = service.add_node(payload, Some("5")).await.unwrap();

        assert_eq!(order(&created.children), vec![("cli", 1), ("api", 2)]);
        assert!(created.children.iter().all(|c| c.parent_id == "ref"));
        let endpoints = &created.children[1].children[0];
        assert_eq!(endpoints.parent_id, "api");
        assert!(!endpoints.id.is_root());

        let forest = store.snapshot().await;
        assert_eq!(forest[1].children[0], created);
    }

    #[tokio::test]
    async fn test_add_keeps_supplied_timestamps() {
        let (service, _store) = create_test_service(Vec::new());
        let payload: NewNode = serde_json::from_value(json!({
            "name": "Imported",
            "createTime": 1500000000000i64,
            "updateTime": 1500000000001i64
        }))
        .unwrap();

        let created = service.add_node(payload, None).await.unwrap();
        assert_eq!(created.create_time, 1500000000000);
        assert_eq!(created.update_time, 1500000000001);
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_update_weight_reorders_siblings() {
        let (service, store) = create_test_service(flat_forest(&["1", "2", "3"]));

        let updated = service
            .update_node("2", NodePatch::new().with_weight(1))
            .await
            .unwrap();

        assert_eq!(updated.weight, 1);
        assert_eq!(
            order(&store.snapshot().await),
            vec![("2", 1), ("1", 2), ("3", 3)]
        );
    }

    #[tokio::test]
    async fn test_update_weight_at_current_max_lands_last() {
        let (service, store) = create_test_service(flat_forest(&["1", "2", "3"]));

        let updated = service
            .update_node("1", NodePatch::new().with_weight(3))
            .await
            .unwrap();

        assert_eq!(updated.weight, 3);
        assert_eq!(
            order(&store.snapshot().await),
            vec![("2", 1), ("3", 2), ("1", 3)]
        );
    }

    #[tokio::test]
    async fn test_update_with_huge_stored_weight() {
        let forest = vec![
            Node::new("a", "A").with_weight(u32::MAX),
            Node::new("b", "B").with_weight(1),
        ];
        let (service, store) = create_test_service(forest);

        service
            .update_node("b", NodePatch::new().with_weight(2))
            .await
            .unwrap();

        assert_eq!(order(&store.snapshot().await), vec![("b", 1), ("a", 2)]);
    }

    #[tokio::test]
    async fn test_update_null_parent_moves_to_top_level() {
        let (service, store) = create_test_service(seeded_forest());
        let patch: NodePatch = serde_json::from_value(json!({ "parentId": null })).unwrap();

        let updated = service.update_node("4", patch).await.unwrap();

        assert!(updated.parent_id.is_root());
        let forest = store.snapshot().await;
        assert_eq!(forest.len(), 3);
        assert!(forest[0].children[0].children.is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_fields_and_stamps_time() {
        let (service, store) = create_test_service(seeded_forest());

        let updated = service
            .update_node("3", NodePatch::new().with_name("Everyday use").with_content("# Use"))
            .await
            .unwrap();

        assert_eq!(updated.name, "Everyday use");
        assert_eq!(updated.content, "# Use");
        assert!(updated.update_time > 0);

        let forest = store.snapshot().await;
        assert_eq!(forest[0].children[1].name, "Everyday use");
        assert_eq!(order(&forest[0].children), vec![("2", 1), ("3", 2)]);
    }

    #[tokio::test]
    async fn test_update_moves_node_and_normalizes_both_lists() {
        let (service, store) = create_test_service(seeded_forest());

        let updated = service
            .update_node("3", NodePatch::new().with_parent("5"))
            .await
            .unwrap();
        assert_eq!(updated.parent_id, "5");
        assert_eq!(updated.weight, 1);

        let forest = store.snapshot().await;
        assert_eq!(order(&forest[0].children), vec![("2", 1)]);
        assert_eq!(order(&forest[1].children), vec![("3", 1)]);
    }

    #[tokio::test]
    async fn test_update_move_to_top_level() {
        let (service, store) = create_test_service(seeded_forest());

        service
            .update_node("4", NodePatch::new().with_parent("0").with_weight(1))
            .await
            .unwrap();

        let forest = store.snapshot().await;
        assert_eq!(order(&forest), vec![("4", 1), ("1", 2), ("5", 3)]);
        assert!(forest[0].parent_id.is_root());
        assert!(forest[0].children.is_empty());
        assert!(forest[1].children[0].children.is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_cycles_without_writing() {
        let (service, store) = create_test_service(seeded_forest());
        let before = bytes(&store.snapshot().await);

        let err = service
            .update_node("1", NodePatch::new().with_parent("4"))
            .await
            .unwrap_err();
        assert!(matches!(err, TreeServiceError::InvalidMove { .. }));

        let err = service
            .update_node("2", NodePatch::new().with_parent("2"))
            .await
            .unwrap_err();
        assert!(matches!(err, TreeServiceError::InvalidMove { .. }));

        assert_eq!(bytes(&store.snapshot().await), before);
    }

    #[tokio::test]
    async fn test_update_missing_node_or_parent() {
        let (service, store) = create_test_service(seeded_forest());
        let before = bytes(&store.snapshot().await);

        let err = service
            .update_node("404", NodePatch::new().with_name("X"))
            .await
            .unwrap_err();
        assert!(matches!(err, TreeServiceError::NodeNotFound { .. }));

        let err = service
            .update_node("3", NodePatch::new().with_parent("999"))
            .await
            .unwrap_err();
        assert!(matches!(err, TreeServiceError::ParentNotFound { .. }));

        assert_eq!(bytes(&store.snapshot().await), before);
    }

    #[tokio::test]
    async fn test_update_rename_relinks_direct_children() {
        let (service, store) = create_test_service(seeded_forest());

        let updated = service
            .update_node("1", NodePatch::new().with_id("guide"))
            .await
            .unwrap();
        assert_eq!(updated.id, "guide");

        let forest = store.snapshot().await;
        assert!(forest[0].children.iter().all(|c| c.parent_id == "guide"));
        assert_eq!(forest[0].children[0].children[0].parent_id, "2");
        assert!(service.find_node("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_rename_to_used_id_is_rejected() {
        let (service, store) = create_test_service(seeded_forest());
        let before = bytes(&store.snapshot().await);

        let err = service
            .update_node("3", NodePatch::new().with_id("5"))
            .await
            .unwrap_err();
        assert!(matches!(err, TreeServiceError::DuplicateId { ref id } if id == "5"));

        let err = service
            .update_node("3", NodePatch::new().with_id("0"))
            .await
            .unwrap_err();
        assert!(matches!(err, TreeServiceError::Validation(_)));

        let err = service
            .update_node("3", NodePatch::new().with_name(""))
            .await
            .unwrap_err();
        assert!(matches!(err, TreeServiceError::Validation(_)));

        assert_eq!(bytes(&store.snapshot().await), before);
    }

    #[tokio::test]
    async fn test_update_to_current_id_is_not_a_rename() {
        let (service, store) = create_test_service(seeded_forest());

        let updated = service
            .update_node("3", NodePatch::new().with_id("3").with_name("Usage notes"))
            .await
            .unwrap();

        assert_eq!(updated.id, "3");
        assert_eq!(store.snapshot().await[0].children[1].name, "Usage notes");
    }

    // ------------------------------------------------------------------
    // Depth limit
    // ------------------------------------------------------------------

    /// `{prefix}0 -> {prefix}1 -> ...`, `len` levels
    fn chain(prefix: &str, len: usize) -> Node {
        let mut node = Node::new(format!("{}{}", prefix, len - 1), "Level");
        for level in (0..len - 1).rev() {
            node = Node::new(format!("{}{}", prefix, level), "Level").with_child(node);
        }
        node
    }

    #[tokio::test]
    async fn test_add_beyond_depth_limit_is_rejected() {
        let (service, store) = create_test_service(vec![chain("n", MAX_TREE_DEPTH - 1)]);
        let deepest = format!("n{}", MAX_TREE_DEPTH - 2);

        let leaf = service
            .add_node(NewNode::new("Leaf").with_id("leaf"), Some(deepest.as_str()))
            .await
            .unwrap();
        assert_eq!(leaf.parent_id, deepest.as_str());
        let before = bytes(&store.snapshot().await);

        let err = service
            .add_node(NewNode::new("Too deep"), Some("leaf"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TreeServiceError::DepthLimitExceeded { depth, limit, .. }
                if depth == MAX_TREE_DEPTH + 1 && limit == MAX_TREE_DEPTH
        ));

        // A supplied subtree counts too
        let err = service
            .add_node(
                NewNode::new("Branch").with_child(Node::new("twig", "Twig")),
                Some(deepest.as_str()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TreeServiceError::DepthLimitExceeded { .. }));

        assert_eq!(bytes(&store.snapshot().await), before);
    }

    #[tokio::test]
    async fn test_move_beyond_depth_limit_is_rejected() {
        let forest = vec![chain("n", MAX_TREE_DEPTH), chain("x", 2)];
        let (service, store) = create_test_service(forest);
        let before = bytes(&store.snapshot().await);

        let too_deep = format!("n{}", MAX_TREE_DEPTH - 2);
        let err = service
            .update_node("x0", NodePatch::new().with_parent(too_deep.as_str()))
            .await
            .unwrap_err();
        assert!(matches!(err, TreeServiceError::DepthLimitExceeded { .. }));
        assert_eq!(bytes(&store.snapshot().await), before);

        let fits = format!("n{}", MAX_TREE_DEPTH - 3);
        let moved = service
            .update_node("x0", NodePatch::new().with_parent(fits.as_str()))
            .await
            .unwrap();
        assert_eq!(moved.parent_id, fits.as_str());
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_delete_removes_subtree_and_renormalizes() {
        let forest = vec![Node::new("p", "Parent")
            .with_child(
                Node::new("c1", "C1")
                    .with_weight(1)
                    .with_child(
                        Node::new("g1", "G1")
                            .with_child(Node::new("gg1", "GG1").with_child(Node::new("ggg1", "GGG1"))),
                    ),
            )
            .with_child(Node::new("c2", "C2").with_weight(2))
            .with_child(Node::new("c3", "C3").with_weight(3))];
        let (service, store) = create_test_service(forest);

        assert!(service.delete_node("c1").await.unwrap());

        let forest = store.snapshot().await;
        assert_eq!(order(&forest[0].children), vec![("c2", 1), ("c3", 2)]);
        for gone in ["c1", "g1", "gg1", "ggg1"] {
            assert!(service.find_node(gone).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_delete_missing_node() {
        let (service, _store) = create_test_service(seeded_forest());

        let err = service.delete_node("404").await.unwrap_err();
        assert!(matches!(err, TreeServiceError::NodeNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_cleans_every_node_and_swallows_failures() {
        let cleaner = Arc::new(CountingCleaner::default());
        let (service, store) = create_test_service(seeded_forest());
        let service = service.with_content_cleaner(cleaner.clone());

        assert!(service.delete_node("1").await.unwrap());

        // 1, 2, 3, 4; node 4 fails but the delete still commits
        assert_eq!(cleaner.calls.load(Ordering::SeqCst), 4);
        assert_eq!(order(&store.snapshot().await), vec![("5", 1)]);
    }

    #[tokio::test]
    async fn test_delete_timeout_writes_nothing() {
        let (service, store) = create_test_service(seeded_forest());
        let service = service
            .with_content_cleaner(Arc::new(SlowCleaner(Duration::from_millis(500))))
            .with_delete_timeout(Duration::from_millis(20));
        let before = bytes(&store.snapshot().await);

        let err = service.delete_node("2").await.unwrap_err();

        assert!(matches!(
            err,
            TreeServiceError::OperationTimeout { ref id, budget }
                if id == "2" && budget == Duration::from_millis(20)
        ));
        assert_eq!(bytes(&store.snapshot().await), before);
    }

    // ------------------------------------------------------------------
    // Persistence failures and events
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let store = Arc::new(ReadOnlyStore(MemoryStore::with_forest(seeded_forest())));
        let service = TreeService::new(store.clone());
        let mut rx = service.subscribe_to_events();

        let err = service.add_node(NewNode::new("New"), None).await.unwrap_err();
        assert!(matches!(
            err,
            TreeServiceError::Persistence(StoreError::Unavailable(_))
        ));
        assert_eq!(store.0.snapshot().await.len(), 2);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_events_follow_committed_changes() {
        let (service, _store) = create_test_service(seeded_forest());
        let mut rx = service.subscribe_to_events();

        let created = service
            .add_node(NewNode::new("Tips").with_id("6"), Some("5"))
            .await
            .unwrap();
        match rx.recv().await.unwrap() {
            TreeEvent::NodeAdded(node) => assert_eq!(node, created),
            other => panic!("unexpected event {:?}", other),
        }

        service
            .update_node("6", NodePatch::new().with_parent("1"))
            .await
            .unwrap();
        match rx.recv().await.unwrap() {
            TreeEvent::NodeMoved { id, from, to } => {
                assert_eq!(id, "6");
                assert_eq!(from, "5");
                assert_eq!(to, "1");
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(rx.recv().await.unwrap().event_type(), "node:updated");

        service.delete_node("1").await.unwrap();
        match rx.recv().await.unwrap() {
            TreeEvent::NodeDeleted { id, removed } => {
                assert_eq!(id, NodeId::from("1"));
                assert_eq!(removed, 5);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
