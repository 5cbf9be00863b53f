//! Tree Dump Binary
//!
//! Prints the stored tree (or one subtree) as sorted, pretty-printed JSON and logs
//! content statistics.
//!
//! # Usage
//!
//! ```bash
//! # Whole tree from ./data/treeData.json
//! cargo run --bin tree-dump
//!
//! # One subtree from another snapshot
//! NAVTREE_DATA_DIR=/srv/help cargo run --bin tree-dump -- 42
//! ```
//!
//! # Environment Variables
//!
//! - `NAVTREE_DATA_DIR`: Directory holding the snapshot (default: `data`)
//! - `NAVTREE_RESOURCE_KEY`: Snapshot file name (default: `treeData.json`)
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::env;
use std::sync::Arc;

use navtree_core::{JsonFileStore, StoreConfig, TreeService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = StoreConfig::from_env();
    tracing::info!("Snapshot: {}", config.resource_path().display());

    let store = Arc::new(JsonFileStore::from_config(&config));
    let service = TreeService::with_config(store, &config);

    let output = match env::args().nth(1) {
        Some(id) => serde_json::to_string_pretty(&service.get_node(&id).await?)?,
        None => serde_json::to_string_pretty(&service.list_tree().await?)?,
    };
    println!("{}", output);

    let stats = service.tree_stats().await?;
    tracing::info!(
        "{} nodes, {} with content ({}%), {} characters of content",
        stats.total_nodes,
        stats.content_nodes,
        stats.content_coverage,
        stats.total_content_length
    );

    Ok(())
}
