//! Node types of the container hierarchy.

use std::collections::BTreeSet;

/// Path of the root group.
pub const ROOT_PATH: &str = "/";

/// Maximum extent of one dataset axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxDim {
    /// Axis cannot grow past this length.
    Fixed(usize),
    /// Axis is unlimited.
    Unbounded,
}

impl std::fmt::Display for MaxDim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaxDim::Fixed(len) => write!(f, "{}", len),
            MaxDim::Unbounded => f.write_str("None"),
        }
    }
}

/// Array metadata of a dataset node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DatasetMeta {
    /// Length of every axis; empty for scalars.
    pub shape: Vec<usize>,
    /// Element type tag as reported by the backend.
    pub dtype: String,
    /// Chunk shape, if the dataset is chunked.
    pub chunk_shape: Option<Vec<usize>>,
    /// Maximum shape per axis.
    pub max_shape: Vec<MaxDim>,
    /// Filter tags (compression and friends).
    pub filters: BTreeSet<String>,
}

impl DatasetMeta {
    /// Create metadata with a shape and dtype; max shape equals the shape.
    pub fn new(shape: Vec<usize>, dtype: impl Into<String>) -> Self {
        let max_shape = shape.iter().map(|&len| MaxDim::Fixed(len)).collect();
        Self {
            shape,
            dtype: dtype.into(),
            chunk_shape: None,
            max_shape,
            filters: BTreeSet::new(),
        }
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements (1 for scalars), saturating on overflow.
    pub fn total_elements(&self) -> usize {
        self.shape
            .iter()
            .fold(1usize, |acc, &len| acc.saturating_mul(len))
    }
}

/// Kind of node in the container hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A node owning named children.
    Group,
    /// A leaf holding an n-dimensional array.
    Dataset(DatasetMeta),
}

/// A node of the container tree, identified by its absolute path.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Full path to this node.
    pub path: String,
    /// Node name.
    pub name: String,
    /// Group or dataset.
    pub kind: NodeKind,
}

impl Node {
    /// Create the root group, named after the file it came from.
    pub fn root(file_name: impl Into<String>) -> Self {
        Self {
            path: ROOT_PATH.to_string(),
            name: file_name.into(),
            kind: NodeKind::Group,
        }
    }

    /// Create a non-root node; the name is derived from the path.
    pub fn from_path(path: impl Into<String>, kind: NodeKind) -> Self {
        let path = path.into();
        Self {
            name: name_from_path(&path).to_string(),
            path,
            kind,
        }
    }

    /// Check if this node is a group.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group)
    }

    /// Check if this node is the root group.
    pub fn is_root(&self) -> bool {
        self.path == ROOT_PATH
    }

    /// Dataset metadata, if this node is a dataset.
    pub fn dataset(&self) -> Option<&DatasetMeta> {
        match &self.kind {
            NodeKind::Dataset(meta) => Some(meta),
            NodeKind::Group => None,
        }
    }

    /// Kind label shown in property panels.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Group => "Group",
            NodeKind::Dataset(_) => "Dataset",
        }
    }

    /// Get display name with icon and shape.
    pub fn display_name(&self) -> String {
        match &self.kind {
            NodeKind::Group if self.is_root() => format!("🏠 {}", self.name),
            NodeKind::Group => format!("📂 {}", self.name),
            NodeKind::Dataset(meta) if meta.shape.is_empty() => {
                format!("📊 {} {}", self.name, meta.dtype)
            },
            NodeKind::Dataset(meta) => {
                format!("📊 {} ({}) {}", self.name, join_dims(&meta.shape), meta.dtype)
            },
        }
    }
}

/// Last path segment; an empty trailing segment names the root.
pub fn name_from_path(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some("") | None => ROOT_PATH,
        Some(segment) => segment,
    }
}

/// Path of a child called `name` under `parent`.
pub fn child_path(parent: &str, name: &str) -> String {
    if parent == ROOT_PATH {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Format a shape as `3, 4`.
pub fn join_dims(dims: &[usize]) -> String {
    dims.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_path() {
        assert_eq!(name_from_path("/"), "/");
        assert_eq!(name_from_path("/Data/Raw"), "Raw");
        assert_eq!(name_from_path("/Data/"), "/");
        assert_eq!(name_from_path("/weird name\u{1}"), "weird name\u{1}");
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("/", "Data"), "/Data");
        assert_eq!(child_path("/Data", "Raw"), "/Data/Raw");
    }

    #[test]
    fn test_total_elements() {
        assert_eq!(DatasetMeta::new(vec![], "f64").total_elements(), 1);
        assert_eq!(DatasetMeta::new(vec![3, 4], "f64").total_elements(), 12);
        assert_eq!(DatasetMeta::new(vec![7, 0], "f64").total_elements(), 0);
        assert_eq!(
            DatasetMeta::new(vec![usize::MAX, 2], "f64").total_elements(),
            usize::MAX
        );
    }

    #[test]
    fn test_display_name() {
        let ds = Node::from_path("/PSD", NodeKind::Dataset(DatasetMeta::new(vec![3, 4], "f32")));
        assert_eq!(ds.display_name(), "📊 PSD (3, 4) f32");
        assert_eq!(Node::root("scan.h5").display_name(), "🏠 scan.h5");
    }
}
