//! Per-selection inspection data and attribute panel state.

use crate::attributes::{classify, Bucket, Classified, RenderableValue};
use crate::data::{join_dims, ContainerBackend, Node};
use crate::preview::{preview, PreviewLimits, PreviewOutcome};
use crate::session::TreeCache;

/// Everything the details pane shows for one selected node.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    /// The selected node.
    pub node: Node,
    /// Classified attributes, or the read error.
    pub attributes: Result<Classified, String>,
    /// Number of members of a group, or its enumeration error.
    pub member_count: Option<Result<usize, String>>,
    /// Data preview of a dataset.
    pub preview: Option<PreviewOutcome>,
}

impl Inspection {
    /// Read attributes and, for datasets, the preview.
    ///
    /// Group member counts come from the tree cache only.
    pub fn gather(
        backend: &dyn ContainerBackend,
        node: &Node,
        tree: &TreeCache,
        limits: &PreviewLimits,
    ) -> Self {
        let attributes = backend
            .attributes(&node.path)
            .map(|attrs| classify(&attrs))
            .map_err(|e| {
                tracing::warn!(path = %node.path, "attribute read failed: {}", e);
                e.to_string()
            });

        let member_count = member_count(node, tree);

        let preview = node
            .dataset()
            .map(|meta| preview(backend, &node.path, meta, limits));

        Self {
            node: node.clone(),
            attributes,
            member_count,
            preview,
        }
    }

    /// Re-read the member count after the group was expanded.
    pub fn refresh_members(&mut self, tree: &TreeCache) {
        self.member_count = member_count(&self.node, tree);
    }

    /// Label/value pairs of the common property panel.
    pub fn common_properties(&self) -> Vec<(&'static str, String)> {
        let node = &self.node;
        let mut props = vec![
            ("Name", node.name.clone()),
            ("Path", node.path.clone()),
            ("Type", node.kind_name().to_string()),
        ];

        if let Ok(classified) = &self.attributes {
            if let Some(value) = classified.brillouin_type() {
                props.push(("Brillouin Type", value.to_string()));
            }
        }

        if let Some(meta) = node.dataset() {
            let shape = if meta.shape.is_empty() {
                "Scalar".to_string()
            } else {
                format!("({})", join_dims(&meta.shape))
            };
            let chunking = meta
                .chunk_shape
                .as_ref()
                .map(|chunks| format!("({})", join_dims(chunks)))
                .unwrap_or_else(|| "None".to_string());
            let max_shape = meta
                .max_shape
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let filters = if meta.filters.is_empty() {
                "None".to_string()
            } else {
                meta.filters.iter().cloned().collect::<Vec<_>>().join(", ")
            };

            props.push(("Shape", shape));
            props.push(("Data Type", meta.dtype.clone()));
            props.push(("Chunking", chunking));
            props.push(("Max Shape", format!("({})", max_shape)));
            props.push(("Filters", filters));
        }

        if let Some(preview) = &self.preview {
            let text = match preview {
                PreviewOutcome::Ready(payload) => {
                    format!("{} {}", payload.render(), payload.slice_description)
                },
                PreviewOutcome::Unavailable(message) => message.clone(),
            };
            props.push(("Data Preview", text));
        }

        if let Some(count) = &self.member_count {
            let text = match count {
                Ok(n) => n.to_string(),
                Err(e) => e.clone(),
            };
            props.push(("Number of Members", text));
        }

        props
    }

    /// Rows of one attribute bucket, with structured trees flattened.
    pub fn attribute_rows(&self, bucket: Bucket) -> Vec<AttributeRow> {
        let classified = match &self.attributes {
            Ok(classified) => classified,
            Err(e) => {
                return vec![AttributeRow::message(format!("Could not read attributes: {}", e))]
            },
        };
        if let Some(placeholder) = classified.placeholder(bucket) {
            return vec![AttributeRow::message(placeholder.to_string())];
        }

        let mut rows = Vec::new();
        for (entry_index, entry) in classified.bucket(bucket).iter().enumerate() {
            match &entry.display {
                RenderableValue::Text(text) => rows.push(AttributeRow {
                    entry: Some(entry_index),
                    node: None,
                    depth: 0,
                    label: entry.label.clone(),
                    text: text.clone(),
                    kind: RowKind::Plain,
                }),
                RenderableValue::Invalid(text) => rows.push(AttributeRow {
                    entry: Some(entry_index),
                    node: None,
                    depth: 0,
                    label: entry.label.clone(),
                    text: text.clone(),
                    kind: RowKind::Invalid,
                }),
                RenderableValue::Structured(tree) => {
                    for row in tree.visible() {
                        let Some(node) = tree.node(row.index) else {
                            continue;
                        };
                        rows.push(AttributeRow {
                            entry: Some(entry_index),
                            node: Some(row.index),
                            depth: row.depth,
                            label: if row.depth == 0 {
                                entry.label.clone()
                            } else {
                                String::new()
                            },
                            text: node.line(),
                            kind: if node.composite {
                                RowKind::Composite {
                                    expanded: node.expanded,
                                }
                            } else {
                                RowKind::Leaf
                            },
                        });
                    }
                },
            }
        }
        rows
    }

    /// Toggle the structured node shown on `row` of `bucket`.
    pub fn toggle(&mut self, bucket: Bucket, row: usize) -> bool {
        let Some(AttributeRow {
            entry: Some(entry),
            node: Some(node),
            ..
        }) = self.attribute_rows(bucket).into_iter().nth(row)
        else {
            return false;
        };
        let Ok(classified) = &mut self.attributes else {
            return false;
        };
        match classified.bucket_mut(bucket).get_mut(entry) {
            Some(crate::attributes::Entry {
                display: RenderableValue::Structured(tree),
                ..
            }) => {
                tree.toggle(node);
                true
            },
            _ => false,
        }
    }
}

/// Kind of an attribute row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Placeholder or error text.
    Message,
    /// Plain value.
    Plain,
    /// Structured payload that failed to parse.
    Invalid,
    /// Object or array node.
    Composite {
        /// Whether its children are shown.
        expanded: bool,
    },
    /// Primitive node of a structured payload.
    Leaf,
}

/// One line of the attribute panel.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRow {
    /// Entry index within the bucket.
    pub entry: Option<usize>,
    /// Structured node index within the entry.
    pub node: Option<usize>,
    /// Nesting level inside a structured payload.
    pub depth: usize,
    /// Attribute label (first row of an entry only).
    pub label: String,
    /// Value text.
    pub text: String,
    /// Row kind.
    pub kind: RowKind,
}

impl AttributeRow {
    fn message(text: String) -> Self {
        Self {
            entry: None,
            node: None,
            depth: 0,
            label: String::new(),
            text,
            kind: RowKind::Message,
        }
    }
}

/// Tab and cursor of the attribute panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributePanel {
    /// Selected bucket.
    pub tab: Bucket,
    /// Cursor row within the bucket.
    pub cursor: usize,
}

impl Default for AttributePanel {
    fn default() -> Self {
        Self {
            tab: Bucket::Measure,
            cursor: 0,
        }
    }
}

impl AttributePanel {
    /// Switch to `tab` and reset the cursor.
    pub fn set_tab(&mut self, tab: Bucket) {
        self.tab = tab;
        self.cursor = 0;
    }

    /// Move the cursor down within `rows` rows.
    pub fn cursor_down(&mut self, rows: usize) {
        if self.cursor + 1 < rows {
            self.cursor += 1;
        }
    }

    /// Move the cursor up.
    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }
}

fn member_count(node: &Node, tree: &TreeCache) -> Option<Result<usize, String>> {
    node.is_group().then(|| {
        match (tree.cached_children(&node.path), tree.failure(&node.path)) {
            (Some(children), _) => Ok(children.len()),
            (None, Some(err)) => Err(err.to_string()),
            (None, None) => Err("not loaded".to_string()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AttributeValue, DatasetMeta, MemoryContainer, NodeKind, ROOT_PATH};

    fn backend() -> MemoryContainer {
        MemoryContainer::new("scan.h5")
            .with_dataset(ROOT_PATH, "PSD", &[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .with_attribute("/PSD", "Brillouin_type", AttributeValue::text("PSD"))
            .with_attribute(
                "/PSD",
                "Process_Fit",
                AttributeValue::text(r#"{"function": "Lorentzian", "params": [1, 2]}"#),
            )
    }

    fn psd() -> Node {
        Node::from_path("/PSD", NodeKind::Dataset(DatasetMeta::new(vec![2, 3], "f64")))
    }

    #[test]
    fn test_common_properties() {
        let backend = backend();
        let tree = TreeCache::new(Node::root("scan.h5"));
        let inspection = Inspection::gather(&backend, &psd(), &tree, &PreviewLimits::default());

        let props = inspection.common_properties();
        let get = |label: &str| {
            props
                .iter()
                .find(|(l, _)| *l == label)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(get("Type").as_deref(), Some("Dataset"));
        assert_eq!(get("Shape").as_deref(), Some("(2, 3)"));
        assert_eq!(get("Max Shape").as_deref(), Some("(2, 3)"));
        assert_eq!(get("Chunking").as_deref(), Some("None"));
        assert_eq!(get("Brillouin Type").as_deref(), Some("PSD"));
        assert_eq!(get("Data Preview").as_deref(), Some("1, 2, 3, 4, 5, 6 full"));
        assert_eq!(get("Number of Members"), None);
    }

    #[test]
    fn test_toggle_structured_row() {
        let backend = backend();
        let tree = TreeCache::new(Node::root("scan.h5"));
        let mut inspection =
            Inspection::gather(&backend, &psd(), &tree, &PreviewLimits::default());

        let rows = inspection.attribute_rows(Bucket::Other);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Process_Fit");
        assert_eq!(rows[0].text, "Object (2 members) (Lorentzian)");

        assert!(inspection.toggle(Bucket::Other, 0));
        let rows = inspection.attribute_rows(Bucket::Other);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].text, "params: Array (2 members)");
        assert_eq!(rows[2].kind, RowKind::Composite { expanded: false });

        assert!(!inspection.toggle(Bucket::Measure, 0));
    }

    #[test]
    fn test_group_member_count_from_cache() {
        let backend = backend();
        let mut tree = TreeCache::new(Node::root("scan.h5"));
        let root = tree.root().clone();

        let mut inspection =
            Inspection::gather(&backend, &root, &tree, &PreviewLimits::default());
        assert_eq!(inspection.member_count, Some(Err("not loaded".to_string())));
        assert_eq!(backend.list_calls(ROOT_PATH), 0);

        tree.expand(&backend, &root).unwrap();
        inspection.refresh_members(&tree);
        assert_eq!(inspection.member_count, Some(Ok(1)));
        assert!(inspection.preview.is_none());
        assert_eq!(
            inspection.attribute_rows(Bucket::Measure)[0].text,
            crate::attributes::NO_ATTRIBUTES
        );
    }
}
