pub mod analysis;
pub mod array;
pub mod boolean;
pub mod enumeration;
pub mod keywords;
pub mod number;
pub mod object;
pub mod parameters;
pub mod references;
pub mod registry;
pub mod state;
pub mod string;

pub use parameters::{Attributes, Children, Extracted, FieldParameters};
pub use registry::{Converter, TypeRegistry};
pub use state::{ConversionContext, ConversionOptions};

use indexmap::IndexMap;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::form::{FieldFactory, Form};
use crate::policy::FieldPolicy;

/// Converts JSON Schema documents into form fields.
///
/// Holds the type registry and options; every call builds its own
/// [`ConversionContext`], so one converter can serve any number of schemas.
#[derive(Debug, Clone)]
pub struct SchemaConverter {
    registry: TypeRegistry,
    policy: Arc<FieldPolicy>,
    options: ConversionOptions,
}

impl Default for SchemaConverter {
    fn default() -> Self {
        Self::new(ConversionOptions::default())
    }
}

impl SchemaConverter {
    pub fn new(options: ConversionOptions) -> Self {
        Self::with_registry(TypeRegistry::default(), options)
    }

    /// Use a custom registry, e.g. one with extra or replaced converters.
    pub fn with_registry(registry: TypeRegistry, options: ConversionOptions) -> Self {
        Self {
            registry,
            policy: Arc::new(options.policy.clone()),
            options,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert the root object schema into its field parameters.
    pub fn convert(&self, schema: &Value) -> Result<FieldParameters> {
        let mut ctx = ConversionContext::new(&self.registry, self.policy.clone(), &self.options);
        let params = object::convert_root(&mut ctx, schema)?;
        tracing::debug!(
            fields = params.fields().map_or(0, IndexMap::len),
            "converted schema"
        );
        Ok(params)
    }

    /// Field factories keyed by property name, in schema order.
    pub fn schema_fields(&self, schema: &Value) -> Result<IndexMap<String, FieldFactory>> {
        self.convert(schema)?.build_fields()
    }

    /// A form bound to the schema's fields, with defaults loaded.
    pub fn form_from_schema(&self, schema: &Value) -> Result<Form> {
        Ok(Form::from_fields(&self.schema_fields(schema)?))
    }

    /// Read a JSON Schema file and describe its fields as JSON.
    pub fn convert_schema_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let content = fs::read_to_string(path.as_ref())?;
        let schema: Value = serde_json::from_str(&content)?;
        let fields = self.schema_fields(&schema)?;
        Ok(json!({
            "title": schema.get("title").cloned().unwrap_or(Value::Null),
            "fields": serde_json::to_value(&fields)?,
        }))
    }
}

/// Field factories for `schema` with default options.
pub fn schema_fields(schema: &Value) -> Result<IndexMap<String, FieldFactory>> {
    SchemaConverter::default().schema_fields(schema)
}

/// A bound form for `schema` with default options.
pub fn form_from_schema(schema: &Value) -> Result<Form> {
    SchemaConverter::default().form_from_schema(schema)
}
