//! Detected form fields and the registry that owns them.
//!
//! A [`Field`] is one fillable region detected on an analyzed document. The
//! [`FieldRegistry`] holds the full detected set for a session and implements
//! the merge rules used by interview autofill.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Secondary field key used to match extraction results.
///
/// The analysis service assigns these sequentially and emits them as numbers,
/// but the extraction map returned by the assistant is keyed by their string
/// form, so lookups always go through [`SimpleId::to_string`]. Stringified
/// values are unique within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SimpleId {
    Number(i64),
    Text(String),
}

impl fmt::Display for SimpleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleId::Number(n) => write!(f, "{}", n),
            SimpleId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Percentage-based geometry of a field relative to the rendered document.
///
/// Values are in the 0-100 range by convention; the core does not validate
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// One detected fillable region of a document.
///
/// `id`, `simple_id`, `label`, `explanation`, and the bounding box are
/// immutable after detection. `value` and `is_auto_filled` are mutated only
/// by [`FieldRegistry::merge_extracted`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Stable identifier assigned by the analysis service; unique per session.
    pub id: String,
    /// Lookup key into extraction results.
    pub simple_id: SimpleId,
    /// Human-readable field name.
    pub label: String,
    /// Longer description of what the field expects.
    pub explanation: String,
    /// Geometry on the rendered document (flattened on the wire).
    #[serde(flatten)]
    pub bounds: BoundingBox,
    /// Current value, absent until filled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// True only for fields filled by the most recent autofill merge.
    #[serde(default, rename = "isAutoFilled")]
    pub is_auto_filled: bool,
}

impl Field {
    /// Returns true if the field holds a non-empty value.
    pub fn is_filled(&self) -> bool {
        self.value.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// The ordered set of fields detected for the current session.
///
/// Order is detection order and carries no meaning. Fields are never removed
/// individually; the whole set is replaced when a new document is analyzed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRegistry {
    fields: Vec<Field>,
}

impl FieldRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the entire field set.
    pub fn replace_all(&mut self, fields: Vec<Field>) {
        self.fields = fields;
    }

    /// Drops all fields.
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Returns the detected fields in detection order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a field by its stable identifier.
    pub fn get(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Returns true if a field with the given identifier exists.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Merges extraction results into matching fields.
    ///
    /// Every field whose stringified `simple_id` appears in `extracted` with
    /// a non-empty value receives that value and `is_auto_filled = true`.
    /// The flag is reset on all fields first, so after the call it marks
    /// exactly the fields filled by this merge. Unmatched extraction keys are
    /// ignored and unmatched fields keep their current value.
    ///
    /// Returns the number of fields changed by this call. An empty map
    /// changes nothing (not even the flags) and returns zero.
    pub fn merge_extracted(&mut self, extracted: &HashMap<String, String>) -> usize {
        if extracted.is_empty() {
            return 0;
        }

        for field in &mut self.fields {
            field.is_auto_filled = false;
        }

        let mut filled = 0;
        for field in &mut self.fields {
            let key = field.simple_id.to_string();
            if let Some(value) = extracted.get(&key) {
                if !value.is_empty() {
                    field.value = Some(value.clone());
                    field.is_auto_filled = true;
                    filled += 1;
                }
            }
        }
        filled
    }
}
