//! Attribute values attached to groups and datasets.

use std::fmt;

/// A flat attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Text value.
    Text(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            Scalar::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{:.0}", n)
            },
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Raw text of an attribute that encodes a nested value tree.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredText {
    /// Text as stored in the container.
    pub raw: String,
    /// Parsed tree, when parsing succeeded.
    pub parsed: Option<serde_json::Value>,
}

impl StructuredText {
    /// Parse `raw`, keeping it even when it is not valid JSON.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = serde_json::from_str(&raw).ok();
        Self { raw, parsed }
    }
}

/// Value of one attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Plain scalar.
    Scalar(Scalar),
    /// Text holding a nested value tree.
    StructuredText(StructuredText),
}

impl AttributeValue {
    /// Shorthand for a text scalar.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Text(value.into()))
    }

    /// Shorthand for a numeric scalar.
    pub fn number(value: f64) -> Self {
        Self::Scalar(Scalar::Number(value))
    }

    /// Shorthand for a structured-text value, parsed on construction.
    pub fn structured(raw: impl Into<String>) -> Self {
        Self::StructuredText(StructuredText::parse(raw))
    }

    /// Text form of the value as stored.
    pub fn as_text(&self) -> String {
        match self {
            AttributeValue::Scalar(scalar) => scalar.to_string(),
            AttributeValue::StructuredText(structured) => structured.raw.clone(),
        }
    }
}

impl From<Scalar> for AttributeValue {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

/// Attribute mapping that keeps the backend's iteration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeMap {
    entries: Vec<(String, AttributeValue)>,
}

impl AttributeMap {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; an existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: AttributeValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a value by exact key.
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, AttributeValue)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, AttributeValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
