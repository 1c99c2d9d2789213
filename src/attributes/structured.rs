//! Collapsible tree over a parsed structured-text payload.

use serde_json::Value;

/// One visited value of the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredNode {
    /// Member key; `None` for the root and array items.
    pub key: Option<String>,
    /// `Object (N members)`, `Array (N members)` or the JSON text.
    pub summary: String,
    /// Inline label of an object (`function`, else `name`).
    pub label: Option<String>,
    /// Indices of child nodes, in document order.
    pub children: Vec<usize>,
    /// Whether this is an object or array.
    pub composite: bool,
    /// Whether the children are shown.
    pub expanded: bool,
}

impl StructuredNode {
    /// Text shown on the node's row.
    pub fn line(&self) -> String {
        let mut line = match &self.key {
            Some(key) => format!("{}: {}", key, self.summary),
            None => self.summary.clone(),
        };
        if let Some(label) = &self.label {
            line.push_str(&format!(" ({})", label));
        }
        line
    }
}

/// A visible row of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuredRow {
    /// Node index.
    pub index: usize,
    /// Nesting level (root is 0).
    pub depth: usize,
}

/// Node arena; index 0 is the root. Composites start collapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredTree {
    nodes: Vec<StructuredNode>,
}

impl StructuredTree {
    /// Build the tree with an explicit stack, preserving key order.
    pub fn build(value: &Value) -> Self {
        let mut nodes: Vec<StructuredNode> = Vec::new();
        let mut stack: Vec<(&Value, Option<String>, Option<usize>)> = vec![(value, None, None)];

        while let Some((value, key, parent)) = stack.pop() {
            let index = nodes.len();
            nodes.push(StructuredNode {
                key,
                summary: summarize(value),
                label: object_label(value),
                children: Vec::new(),
                composite: value.is_object() || value.is_array(),
                expanded: false,
            });
            if let Some(parent) = parent {
                nodes[parent].children.push(index);
            }

            match value {
                Value::Object(map) => {
                    for (k, v) in map.iter().rev() {
                        stack.push((v, Some(k.clone()), Some(index)));
                    }
                },
                Value::Array(items) => {
                    for v in items.iter().rev() {
                        stack.push((v, None, Some(index)));
                    }
                },
                _ => {},
            }
        }

        Self { nodes }
    }

    /// Root node.
    pub fn root(&self) -> &StructuredNode {
        &self.nodes[0]
    }

    /// Node by index.
    pub fn node(&self, index: usize) -> Option<&StructuredNode> {
        self.nodes.get(index)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a tree holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Flip a composite node; primitives are left alone.
    pub fn toggle(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            if node.composite {
                node.expanded = !node.expanded;
            }
        }
    }

    /// Rows currently visible, in display order.
    pub fn visible(&self) -> Vec<StructuredRow> {
        let mut rows = Vec::new();
        let mut stack = vec![StructuredRow { index: 0, depth: 0 }];

        while let Some(row) = stack.pop() {
            rows.push(row);
            let node = &self.nodes[row.index];
            if node.expanded {
                for &child in node.children.iter().rev() {
                    stack.push(StructuredRow {
                        index: child,
                        depth: row.depth + 1,
                    });
                }
            }
        }

        rows
    }
}

fn summarize(value: &Value) -> String {
    match value {
        Value::Object(map) => format!("Object ({} members)", map.len()),
        Value::Array(items) => format!("Array ({} members)", items.len()),
        primitive => primitive.to_string(),
    }
}

fn object_label(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    map.get("function")
        .and_then(Value::as_str)
        .or_else(|| map.get("name").and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_preserves_order() {
        let tree = StructuredTree::build(&json!({"z": 1, "a": [true, "x"], "m": null}));
        let keys: Vec<&str> = tree
            .root()
            .children
            .iter()
            .filter_map(|&i| tree.node(i)?.key.as_deref())
            .collect();
        assert_eq!(keys, ["z", "a", "m"]);
        assert_eq!(tree.root().summary, "Object (3 members)");
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_labels() {
        let tree = StructuredTree::build(&json!({"function": "Lorentzian", "name": "fit"}));
        assert_eq!(tree.root().label.as_deref(), Some("Lorentzian"));
        assert_eq!(tree.root().line(), "Object (2 members) (Lorentzian)");

        let tree = StructuredTree::build(&json!({"name": "fit", "function": 3}));
        assert_eq!(tree.root().label.as_deref(), Some("fit"));

        let tree = StructuredTree::build(&json!([{"name": "x"}]));
        assert_eq!(tree.root().label, None);
    }

    #[test]
    fn test_array_items_are_bare() {
        let mut tree = StructuredTree::build(&json!({"peaks": [7.5, {"name": "anti-Stokes"}]}));
        tree.toggle(0);
        let peaks = tree.visible()[1].index;
        tree.toggle(peaks);

        let lines: Vec<String> = tree
            .visible()
            .iter()
            .map(|r| tree.node(r.index).unwrap().line())
            .collect();
        assert_eq!(
            lines,
            [
                "Object (1 members)",
                "peaks: Array (2 members)",
                "7.5",
                "Object (1 members) (anti-Stokes)",
            ]
        );
    }

    #[test]
    fn test_toggle_and_visible() {
        let mut tree = StructuredTree::build(&json!({"a": {"b": 1}, "c": "s"}));
        assert_eq!(tree.visible().len(), 1);

        tree.toggle(0);
        let rows = tree.visible();
        let lines: Vec<String> = rows
            .iter()
            .map(|r| tree.node(r.index).unwrap().line())
            .collect();
        assert_eq!(lines, ["Object (2 members)", "a: Object (1 members)", "c: \"s\""]);

        tree.toggle(rows[1].index);
        assert_eq!(tree.visible().len(), 4);
        assert_eq!(tree.visible()[2].depth, 2);

        // primitives do not toggle
        let leaf = tree.visible()[2].index;
        tree.toggle(leaf);
        assert!(!tree.node(leaf).unwrap().expanded);
    }
}
