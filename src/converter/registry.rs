use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::converter::array::ArrayConverter;
use crate::converter::boolean::BooleanConverter;
use crate::converter::enumeration::EnumConverter;
use crate::converter::number::NumberConverter;
use crate::converter::object::ObjectConverter;
use crate::converter::parameters::{Extracted, FieldParameters};
use crate::converter::state::ConversionContext;
use crate::converter::string::StringConverter;
use crate::error::{ConversionError, Result};
use crate::form::{FieldClass, FieldFactory, Validator};
use crate::policy::FieldPolicy;

/// Conversion strategy for one family of schema types.
pub trait Converter: fmt::Debug + Send + Sync {
    /// Name used in error messages.
    fn name(&self) -> &'static str;

    /// Type tags this converter accepts.
    fn supported(&self) -> &'static [&'static str];

    /// Keywords allowed on top of the ignored ones.
    fn allowed(&self) -> &'static [&'static str];

    /// Whether `definitions` declared on the node are scoped for its children.
    fn needs_definitions(&self) -> bool {
        false
    }

    fn extract(
        &self,
        name: &str,
        node: &Map<String, Value>,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<Extracted>;

    /// Whether the field carries a validator chain at all.
    fn carries_validators(&self) -> bool {
        true
    }

    fn required_validator(&self, required: bool) -> Validator {
        if required {
            Validator::DataRequired
        } else {
            Validator::Optional
        }
    }

    fn resolve_factory(&self, params: &FieldParameters, policy: &FieldPolicy)
        -> Result<FieldClass>;

    fn build_field(&self, params: &FieldParameters) -> Result<FieldFactory> {
        let class = params.resolve_factory()?;
        Ok(FieldFactory::new(class, params.build_options()?))
    }
}

/// Maps schema type tags to converters.
///
/// Built once, then shared read-only by every conversion.
#[derive(Clone)]
pub struct TypeRegistry {
    converters: HashMap<String, Arc<dyn Converter>>,
}

impl TypeRegistry {
    /// A registry without any converter.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        converter: Arc<dyn Converter>,
    ) -> &mut Self {
        self.converters.insert(type_name.into(), converter);
        self
    }

    pub fn lookup(&self, type_name: &str) -> Result<Arc<dyn Converter>> {
        self.converters
            .get(type_name)
            .cloned()
            .ok_or_else(|| ConversionError::UnknownType(type_name.to_string()))
    }

    /// Registered type tags, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let number: Arc<dyn Converter> = Arc::new(NumberConverter);
        let mut registry = Self::empty();
        registry
            .register("string", Arc::new(StringConverter))
            .register("integer", number.clone())
            .register("number", number)
            .register("boolean", Arc::new(BooleanConverter))
            .register("enum", Arc::new(EnumConverter))
            .register("array", Arc::new(ArrayConverter))
            .register("object", Arc::new(ObjectConverter));
        registry
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_knows_builtin_types() {
        let registry = TypeRegistry::default();
        assert_eq!(
            registry.types(),
            vec!["array", "boolean", "enum", "integer", "number", "object", "string"]
        );
        assert_eq!(registry.lookup("integer").unwrap().name(), "number");
    }

    #[test]
    fn lookup_of_unregistered_type_fails() {
        let registry = TypeRegistry::empty();
        assert!(matches!(
            registry.lookup("string"),
            Err(ConversionError::UnknownType(t)) if t == "string"
        ));
    }

    #[test]
    fn register_replaces_existing_converter() {
        let mut registry = TypeRegistry::default();
        registry.register("number", Arc::new(StringConverter));
        assert_eq!(registry.lookup("number").unwrap().name(), "string");
    }
}
