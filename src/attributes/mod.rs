//! Attribute classification.
//!
//! Routes the free-form attributes of a node into the buckets of the
//! metadata panel. Keys are matched case-insensitively:
//!
//! - `Measure...` goes to [`Bucket::Measure`], labelled without the
//!   8-character prefix, every `_` turned into a space
//! - `Spectrometer...` goes to [`Bucket::Spectrometer`], same rule with a
//!   13-character prefix
//! - `Process...` goes to [`Bucket::Other`] with the key as label and the
//!   value parsed as structured text
//! - `brillouin_type` is promoted to the common properties
//! - everything else goes to [`Bucket::Other`], only the first `_` turned
//!   into a space

mod structured;

pub use structured::{StructuredNode, StructuredRow, StructuredTree};

use crate::data::{AttributeMap, AttributeValue, StructuredText};
use crate::error::StokesError;
use std::collections::BTreeMap;

/// Placeholder shown in every bucket when a node has no attributes.
pub const NO_ATTRIBUTES: &str = "No attributes found for this element.";

/// Key promoted to the common properties.
pub const BRILLOUIN_TYPE_KEY: &str = "brillouin_type";

const MEASURE_PREFIX: &str = "measure";
const SPECTROMETER_PREFIX: &str = "spectrometer";
const PROCESS_PREFIX: &str = "process";
const MEASURE_LABEL_OFFSET: usize = 8;
const SPECTROMETER_LABEL_OFFSET: usize = 13;

/// Semantic group of attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Measurement metadata.
    Measure,
    /// Instrument metadata.
    Spectrometer,
    /// Everything else.
    Other,
}

impl Bucket {
    /// All buckets in display order.
    pub const ALL: [Bucket; 3] = [Bucket::Measure, Bucket::Spectrometer, Bucket::Other];

    /// Tab title.
    pub fn title(self) -> &'static str {
        match self {
            Bucket::Measure => "Measure",
            Bucket::Spectrometer => "Spectrometer",
            Bucket::Other => "Other",
        }
    }

    /// Text shown when the bucket is empty.
    pub fn placeholder(self) -> &'static str {
        match self {
            Bucket::Measure => "No \"Measure\" attributes found.",
            Bucket::Spectrometer => "No \"Spectrometer\" attributes found.",
            Bucket::Other => "No other attributes found.",
        }
    }
}

/// Display form of a classified value.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderableValue {
    /// Plain text.
    Text(String),
    /// Parsed structured payload.
    Structured(StructuredTree),
    /// Structured payload that failed to parse, escaped for display.
    Invalid(String),
}

/// One row of a bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Original attribute key.
    pub key: String,
    /// Derived label.
    pub label: String,
    /// Value to render.
    pub display: RenderableValue,
}

/// Result of [`classify`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classified {
    /// Measure bucket.
    pub measure: Vec<Entry>,
    /// Spectrometer bucket.
    pub spectrometer: Vec<Entry>,
    /// Other bucket.
    pub other: Vec<Entry>,
    /// Attributes shown among the common properties, by original key.
    pub promoted: BTreeMap<String, String>,
}

impl Classified {
    /// Entries of one bucket.
    pub fn bucket(&self, bucket: Bucket) -> &[Entry] {
        match bucket {
            Bucket::Measure => &self.measure,
            Bucket::Spectrometer => &self.spectrometer,
            Bucket::Other => &self.other,
        }
    }

    /// Mutable entries of one bucket.
    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<Entry> {
        match bucket {
            Bucket::Measure => &mut self.measure,
            Bucket::Spectrometer => &mut self.spectrometer,
            Bucket::Other => &mut self.other,
        }
    }

    /// Placeholder for an empty bucket, `None` when it has entries.
    pub fn placeholder(&self, bucket: Bucket) -> Option<&'static str> {
        if !self.bucket(bucket).is_empty() {
            return None;
        }
        if self.is_empty() {
            Some(NO_ATTRIBUTES)
        } else {
            Some(bucket.placeholder())
        }
    }

    /// Check if the node had no attributes at all.
    pub fn is_empty(&self) -> bool {
        self.measure.is_empty()
            && self.spectrometer.is_empty()
            && self.other.is_empty()
            && self.promoted.is_empty()
    }

    /// Promoted Brillouin type, if any.
    pub fn brillouin_type(&self) -> Option<&str> {
        self.promoted
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(BRILLOUIN_TYPE_KEY))
            .map(|(_, value)| value.as_str())
    }
}

/// Partition `attrs` into buckets, keeping input order within each.
pub fn classify(attrs: &AttributeMap) -> Classified {
    let mut classified = Classified::default();

    for (key, value) in attrs.iter() {
        if has_prefix(key, MEASURE_PREFIX) {
            classified.measure.push(Entry {
                key: key.to_string(),
                label: strip_label(key, MEASURE_LABEL_OFFSET),
                display: plain(value),
            });
        } else if has_prefix(key, SPECTROMETER_PREFIX) {
            classified.spectrometer.push(Entry {
                key: key.to_string(),
                label: strip_label(key, SPECTROMETER_LABEL_OFFSET),
                display: plain(value),
            });
        } else if has_prefix(key, PROCESS_PREFIX) {
            classified.other.push(Entry {
                key: key.to_string(),
                label: key.to_string(),
                display: structured(key, value),
            });
        } else if key.eq_ignore_ascii_case(BRILLOUIN_TYPE_KEY) {
            classified
                .promoted
                .insert(key.to_string(), value.as_text());
        } else {
            classified.other.push(Entry {
                key: key.to_string(),
                label: key.replacen('_', " ", 1),
                display: plain(value),
            });
        }
    }

    classified
}

/// Check if values under `key` hold structured text.
pub fn is_structured_key(key: &str) -> bool {
    has_prefix(key, PROCESS_PREFIX)
}

fn has_prefix(key: &str, prefix: &str) -> bool {
    key.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Drop the first `offset` characters and turn every `_` into a space.
fn strip_label(key: &str, offset: usize) -> String {
    key.chars()
        .skip(offset)
        .map(|c| if c == '_' { ' ' } else { c })
        .collect()
}

fn plain(value: &AttributeValue) -> RenderableValue {
    RenderableValue::Text(value.as_text())
}

fn structured(key: &str, value: &AttributeValue) -> RenderableValue {
    if let AttributeValue::StructuredText(StructuredText {
        parsed: Some(parsed),
        ..
    }) = value
    {
        return RenderableValue::Structured(StructuredTree::build(parsed));
    }

    let raw = value.as_text();
    match serde_json::from_str(&raw) {
        Ok(parsed) => RenderableValue::Structured(StructuredTree::build(&parsed)),
        Err(source) => {
            let err = StokesError::StructuredPayload {
                key: key.to_string(),
                source,
            };
            tracing::warn!("{}", err);
            RenderableValue::Invalid(escape(&raw))
        },
    }
}

fn escape(raw: &str) -> String {
    raw.chars()
        .flat_map(|c| {
            let escaped: Vec<char> = if c.is_control() {
                c.escape_default().collect()
            } else {
                vec![c]
            };
            escaped
        })
        .collect()
}
