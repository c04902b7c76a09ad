use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::form::bound::BoundField;
use crate::form::class::FieldClass;
use crate::form::validators::Validator;

/// One entry of a choice list: the submitted value and its display label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub value: Value,
    pub label: String,
}

impl Choice {
    pub fn new(value: Value, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }

    /// A choice labelled with its own value.
    pub fn from_value(value: Value) -> Self {
        let label = match &value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self { value, label }
    }

    /// Submitted data matches when equal, when both are the same number
    /// (`1` for a choice of `1.0`), or when the text parses to the choice's
    /// number (`"1"` posted for a choice of `1`).
    pub fn matches(&self, data: &Value) -> bool {
        if &self.value == data {
            return true;
        }
        match (&self.value, data) {
            (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
            (Value::Number(a), Value::String(b)) | (Value::String(b), Value::Number(a)) => b
                .trim()
                .parse::<f64>()
                .is_ok_and(|parsed| a.as_f64() == Some(parsed)),
            _ => false,
        }
    }
}

/// Keyword options a field class is constructed with.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub validators: Vec<Validator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
    /// Extra rendering attributes, e.g. `accept` for file inputs.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub render_kw: IndexMap<String, Value>,
}

/// An unbound field: calling [`FieldFactory::bind`] produces a fresh
/// [`BoundField`] every time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldFactory {
    pub class: FieldClass,
    pub options: FieldOptions,
    /// Entry template of a `FieldList`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<Box<FieldFactory>>,
    /// Sub-fields of a `FormField`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<IndexMap<String, FieldFactory>>,
}

impl FieldFactory {
    pub fn new(class: FieldClass, options: FieldOptions) -> Self {
        Self {
            class,
            options,
            entry: None,
            fields: None,
        }
    }

    /// A repeating field built from `entry`.
    pub fn list(class: FieldClass, entry: FieldFactory, options: FieldOptions) -> Self {
        Self {
            class,
            options,
            entry: Some(Box::new(entry)),
            fields: None,
        }
    }

    /// A nested form built from `fields`.
    pub fn form(
        class: FieldClass,
        fields: IndexMap<String, FieldFactory>,
        options: FieldOptions,
    ) -> Self {
        Self {
            class,
            options,
            entry: None,
            fields: Some(fields),
        }
    }

    pub fn bind(&self, name: &str, prefix: &str) -> BoundField {
        BoundField::new(self, name, prefix)
    }
}
