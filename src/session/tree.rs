//! Lazily materialized container tree.

use crate::data::{ContainerBackend, Node};
use crate::error::{Result, StokesError};
use std::collections::{HashMap, HashSet};

/// Build the root group of an open container without enumerating it.
pub fn resolve_root(backend: &dyn ContainerBackend) -> Node {
    Node::root(backend.file_name())
}

/// A single visible row of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRow {
    /// The node on this row.
    pub node: Node,
    /// Nesting level (root is 0).
    pub depth: usize,
    /// Whether this group is expanded.
    pub expanded: bool,
    /// Whether an expansion of this group is queued.
    pub pending: bool,
    /// Enumeration error of the last expansion attempt.
    pub error: Option<String>,
}

/// Cache of enumerated groups.
///
/// Each group is listed through the backend at most once; collapsing only
/// clears the expanded flag.
#[derive(Debug, Clone)]
pub struct TreeCache {
    root: Node,
    children: HashMap<String, Vec<Node>>,
    index: HashMap<String, Node>,
    failures: HashMap<String, String>,
    expanded: HashSet<String>,
    pending: HashSet<String>,
}

impl TreeCache {
    /// Create an empty cache around `root`.
    pub fn new(root: Node) -> Self {
        Self {
            root,
            children: HashMap::new(),
            index: HashMap::new(),
            failures: HashMap::new(),
            expanded: HashSet::new(),
            pending: HashSet::new(),
        }
    }

    /// The root group.
    pub fn root(&self) -> &Node {
        &self.root
    }

    // The backend is called on a cache miss only. A failed enumeration is
    // remembered for display and the group stays retryable.
    fn load(&mut self, backend: &dyn ContainerBackend, node: &Node) -> Result<&[Node]> {
        if !node.is_group() {
            return Err(StokesError::NotAGroup {
                path: node.path.clone(),
            });
        }
        self.pending.remove(&node.path);

        if self.children.contains_key(&node.path) {
            tracing::debug!(path = %node.path, "children cache hit");
        } else {
            match backend.list_children(&node.path) {
                Ok(refs) => {
                    tracing::debug!(path = %node.path, count = refs.len(), "enumerated group");
                    let nodes: Vec<Node> = refs
                        .into_iter()
                        .map(|child| Node::from_path(child.path, child.kind))
                        .collect();
                    for child in &nodes {
                        self.index.insert(child.path.clone(), child.clone());
                    }
                    self.failures.remove(&node.path);
                    self.children.insert(node.path.clone(), nodes);
                },
                Err(e) => {
                    tracing::warn!(path = %node.path, "enumeration failed: {}", e);
                    self.failures.insert(node.path.clone(), e.to_string());
                    return Err(e);
                },
            }
        }

        Ok(self
            .children
            .get(&node.path)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// Expand a group, enumerating it on the first request only.
    pub fn expand(&mut self, backend: &dyn ContainerBackend, node: &Node) -> Result<&[Node]> {
        self.load(backend, node)?;
        self.expanded.insert(node.path.clone());
        Ok(self.cached_children(&node.path).unwrap_or_default())
    }

    /// Collapse a group; its children stay cached.
    pub fn collapse(&mut self, path: &str) {
        self.expanded.remove(path);
    }

    /// Mark a group as having a queued expansion.
    pub fn mark_pending(&mut self, path: &str) {
        self.pending.insert(path.to_string());
    }

    /// Check if a group is expanded.
    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    /// Children of a group, if it was enumerated.
    pub fn cached_children(&self, path: &str) -> Option<&[Node]> {
        self.children.get(path).map(Vec::as_slice)
    }

    /// Last enumeration error of a group.
    pub fn failure(&self, path: &str) -> Option<&str> {
        self.failures.get(path).map(String::as_str)
    }

    /// Find a materialized node by path.
    pub fn find(&self, path: &str) -> Option<&Node> {
        if path == self.root.path {
            return Some(&self.root);
        }
        self.index.get(path)
    }

    /// Rows currently visible, in display order.
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let mut stack = vec![(&self.root, 0usize)];

        while let Some((node, depth)) = stack.pop() {
            let expanded = self.expanded.contains(&node.path);
            rows.push(TreeRow {
                node: node.clone(),
                depth,
                expanded,
                pending: self.pending.contains(&node.path),
                error: self.failures.get(&node.path).cloned(),
            });

            if expanded {
                if let Some(children) = self.children.get(&node.path) {
                    for child in children.iter().rev() {
                        stack.push((child, depth + 1));
                    }
                }
            }
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MemoryContainer, ROOT_PATH};

    fn sample() -> MemoryContainer {
        MemoryContainer::new("scan.h5")
            .with_group(ROOT_PATH, "Data")
            .with_group("/Data", "Raw")
            .with_dataset("/Data", "PSD", &[2, 2], vec![1.0, 2.0, 3.0, 4.0])
            .with_dataset(ROOT_PATH, "Frequency", &[3], vec![1.0, 2.0, 3.0])
    }

    #[test]
    fn test_root_is_not_enumerated() {
        let backend = sample();
        let cache = TreeCache::new(resolve_root(&backend));
        assert_eq!(cache.root().name, "scan.h5");
        assert_eq!(backend.list_calls(ROOT_PATH), 0);
        assert_eq!(cache.visible_rows().len(), 1);
    }

    #[test]
    fn test_expand_caches_children() {
        let backend = sample();
        let mut cache = TreeCache::new(resolve_root(&backend));
        let root = cache.root().clone();

        let names: Vec<String> = cache
            .expand(&backend, &root)
            .unwrap()
            .iter()
            .map(|n| n.name.clone())
            .collect();
        assert_eq!(names, ["Data", "Frequency"]);

        cache.collapse(ROOT_PATH);
        assert_eq!(cache.visible_rows().len(), 1);
        cache.expand(&backend, &root).unwrap();
        assert_eq!(backend.list_calls(ROOT_PATH), 1);
    }

    #[test]
    fn test_visible_rows_depth_first() {
        let backend = sample();
        let mut cache = TreeCache::new(resolve_root(&backend));
        let root = cache.root().clone();
        cache.expand(&backend, &root).unwrap();
        let data = cache.find("/Data").unwrap().clone();
        cache.expand(&backend, &data).unwrap();

        let rows: Vec<(String, usize)> = cache
            .visible_rows()
            .into_iter()
            .map(|row| (row.node.path, row.depth))
            .collect();
        assert_eq!(
            rows,
            [
                ("/".to_string(), 0),
                ("/Data".to_string(), 1),
                ("/Data/Raw".to_string(), 2),
                ("/Data/PSD".to_string(), 2),
                ("/Frequency".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_find_materialized_only() {
        let backend = sample();
        let mut cache = TreeCache::new(resolve_root(&backend));
        assert_eq!(cache.find(ROOT_PATH).map(|n| n.name.as_str()), Some("scan.h5"));
        assert!(cache.find("/Data").is_none());

        let root = cache.root().clone();
        cache.expand(&backend, &root).unwrap();
        assert!(cache.find("/Data").is_some_and(Node::is_group));
        assert!(cache.find("/Data/PSD").is_none());

        let data = cache.find("/Data").unwrap().clone();
        cache.expand(&backend, &data).unwrap();
        assert!(cache.find("/Data/PSD").is_some_and(|n| n.dataset().is_some()));
    }

    #[test]
    fn test_expand_dataset_rejected() {
        let backend = sample();
        let mut cache = TreeCache::new(resolve_root(&backend));
        let root = cache.root().clone();
        cache.expand(&backend, &root).unwrap();
        let freq = cache.find("/Frequency").unwrap().clone();

        assert!(matches!(
            cache.expand(&backend, &freq),
            Err(StokesError::NotAGroup { .. })
        ));
    }

    #[test]
    fn test_failure_is_retryable() {
        let backend = sample();
        let mut cache = TreeCache::new(resolve_root(&backend));
        let root = cache.root().clone();
        cache.expand(&backend, &root).unwrap();
        let data = cache.find("/Data").unwrap().clone();

        backend.fail_listing("/Data");
        assert!(matches!(
            cache.expand(&backend, &data),
            Err(StokesError::Enumeration { .. })
        ));
        assert!(cache.failure("/Data").is_some());
        assert!(cache.failure(ROOT_PATH).is_none());

        backend.heal_listing("/Data");
        assert_eq!(cache.expand(&backend, &data).unwrap().len(), 2);
        assert!(cache.failure("/Data").is_none());
        assert_eq!(backend.list_calls("/Data"), 2);
    }
}
