//! Live tree, swapped whole on reload
//!
//! Readers take one snapshot per operation and keep it as long as they like;
//! a reload publishes a new snapshot and never touches the old one.

use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::LoadError;
use crate::model::ActionsTree;
use crate::parser;

#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    pub version: u64,
    pub tree: Arc<ActionsTree>,
}

pub struct TreeStore {
    source: PathBuf,
    snap: ArcSwap<TreeSnapshot>,
}

impl TreeStore {
    /// Empty store that loads from `source` on `reload`
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            snap: ArcSwap::from_pointee(TreeSnapshot {
                version: 0,
                tree: Arc::new(ActionsTree::default()),
            }),
        }
    }

    /// Store with the document at `source` already loaded
    pub fn open(source: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let store = Self::new(source);
        store.reload()?;
        Ok(store)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The current tree; take one per operation
    pub fn snapshot(&self) -> Arc<TreeSnapshot> {
        self.snap.load_full()
    }

    /// Re-parse the document and publish it; on failure the current tree stays
    pub fn reload(&self) -> Result<(), LoadError> {
        let roots = parser::parse_file(&self.source)?;
        self.replace(ActionsTree::new(roots));
        log::info!(
            "Loaded actions tree v{} from {}",
            self.snapshot().version,
            self.source.display()
        );
        Ok(())
    }

    /// Publish `tree` as the next version
    pub fn replace(&self, tree: ActionsTree) {
        let tree = Arc::new(tree);
        self.snap.rcu(|current| TreeSnapshot {
            version: current.version + 1,
            tree: Arc::clone(&tree),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("actions-tree-store-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("actions.json");
        fs::write(&path, content).unwrap();
        path
    }

    fn names(tree: &ActionsTree) -> Vec<String> {
        tree.nodes().map(|n| n.name().to_string()).collect()
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = TreeStore::new("/nonexistent/actions.json");
        assert_eq!(store.snapshot().version, 0);
        assert!(store.snapshot().tree.is_empty());
    }

    #[test]
    fn test_reload_publishes_new_version() {
        let path = temp_file("reload", r#"{"items":[{"name":"A"}]}"#);
        let store = TreeStore::open(&path).unwrap();
        assert_eq!(store.snapshot().version, 1);
        assert_eq!(names(&store.snapshot().tree), vec!["A"]);

        fs::write(&path, r#"{"items":[{"name":"B"},{"name":"C"}]}"#).unwrap();
        store.reload().unwrap();
        assert_eq!(store.snapshot().version, 2);
        assert_eq!(names(&store.snapshot().tree), vec!["B", "C"]);

        // idempotent apart from the version
        store.reload().unwrap();
        assert_eq!(names(&store.snapshot().tree), vec!["B", "C"]);
    }

    #[test]
    fn test_failed_reload_keeps_previous_tree() {
        let path = temp_file("failed", r#"{"items":[{"name":"A"}]}"#);
        let store = TreeStore::open(&path).unwrap();

        fs::write(&path, r#"{"items":[{"name":"A","foo":1}]}"#).unwrap();
        let err = store.reload().unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().contains("actions.json"));
        assert_eq!(store.snapshot().version, 1);
        assert_eq!(names(&store.snapshot().tree), vec!["A"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let store = TreeStore::new("/nonexistent/actions.json");
        assert!(matches!(store.reload(), Err(LoadError::Io { .. })));
        assert_eq!(store.snapshot().version, 0);
    }

    #[test]
    fn test_old_snapshot_survives_replace() {
        let store = TreeStore::new("unused");
        store.replace(ActionsTree::new(vec![crate::model::ActionNode::leaf("x", "X")]));
        let before = store.snapshot();

        store.replace(ActionsTree::new(Vec::new()));
        assert_eq!(before.version, 1);
        assert_eq!(names(&before.tree), vec!["X"]);
        assert_eq!(store.snapshot().version, 2);
    }
}
