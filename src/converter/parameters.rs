use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::converter::keywords::illegal_keywords;
use crate::converter::registry::Converter;
use crate::converter::state::ConversionContext;
use crate::error::{ConversionError, Result};
use crate::form::{Choice, FieldClass, FieldFactory, FieldOptions, Validator, ValidatorKind};
use crate::policy::FieldPolicy;

/// Rendering attributes extracted from a schema node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub render_kw: IndexMap<String, Value>,
}

/// Nested parameters of arrays and objects.
#[derive(Debug, Clone, Default)]
pub enum Children {
    #[default]
    None,
    Item(Box<FieldParameters>),
    Properties(IndexMap<String, FieldParameters>),
}

/// What a converter pulls out of a schema node.
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    pub validators: Vec<Validator>,
    pub attributes: Attributes,
    pub children: Children,
}

/// Descriptor of one schema property, prior to binding into a form field.
#[derive(Debug, Clone)]
pub struct FieldParameters {
    pub type_name: String,
    pub name: String,
    pub required: bool,
    pub validators: Vec<Validator>,
    pub attributes: Attributes,
    pub label: Option<String>,
    pub description: Option<String>,
    pub children: Children,
    converter: Arc<dyn Converter>,
    policy: Arc<FieldPolicy>,
}

impl FieldParameters {
    /// Fails when `type_name` is outside the converter's supported set.
    pub fn new(
        converter: Arc<dyn Converter>,
        policy: Arc<FieldPolicy>,
        type_name: &str,
        name: &str,
        required: bool,
        extracted: Extracted,
    ) -> Result<Self> {
        if !converter.supported().contains(&type_name) {
            return Err(ConversionError::UnsupportedType {
                converter: converter.name(),
                type_name: type_name.to_string(),
            });
        }
        Ok(Self {
            type_name: type_name.to_string(),
            name: name.to_string(),
            required,
            validators: extracted.validators,
            attributes: extracted.attributes,
            label: None,
            description: None,
            children: extracted.children,
            converter,
            policy,
        })
    }

    /// Check the keyword contract of `node`, then let the converter extract
    /// validators and attributes from it.
    pub fn from_schema_node(
        converter: Arc<dyn Converter>,
        type_name: &str,
        name: &str,
        required: bool,
        node: &Value,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<Self> {
        let node = node
            .as_object()
            .ok_or_else(|| ConversionError::NotAnObject(name.to_string()))?;

        if !converter.supported().contains(&type_name) {
            return Err(ConversionError::UnsupportedType {
                converter: converter.name(),
                type_name: type_name.to_string(),
            });
        }
        let illegal = illegal_keywords(node, converter.allowed());
        if !illegal.is_empty() {
            return Err(ConversionError::UnsupportedAttributes {
                type_name: type_name.to_string(),
                keys: illegal,
            });
        }

        let extracted = converter.extract(name, node, ctx)?;
        let mut params = Self::new(
            converter,
            ctx.policy.clone(),
            type_name,
            name,
            required,
            extracted,
        )?;
        params.label = text(node, "title");
        params.description = text(node, "description");
        Ok(params)
    }

    /// Options the field class is constructed with: the requiredness
    /// validator first, then the extracted ones.
    pub fn build_options(&self) -> Result<FieldOptions> {
        let validators = if self.converter.carries_validators() {
            let mut validators = vec![self.converter.required_validator(self.required)];
            validators.extend(self.validators.iter().cloned());
            validators
        } else if self.validators.is_empty() {
            Vec::new()
        } else {
            return Err(ConversionError::ValidatorsOnObject(self.name.clone()));
        };

        let label = self
            .label
            .clone()
            .or_else(|| (!self.name.is_empty()).then(|| self.name.clone()));

        Ok(FieldOptions {
            label,
            description: self.description.clone(),
            validators,
            default: self.attributes.default.clone(),
            choices: self.attributes.choices.clone(),
            min_entries: self.attributes.min_entries,
            max_entries: self.attributes.max_entries,
            render_kw: self.attributes.render_kw.clone(),
        })
    }

    pub fn resolve_factory(&self) -> Result<FieldClass> {
        self.converter.resolve_factory(self, &self.policy)
    }

    pub fn build_field(&self) -> Result<FieldFactory> {
        self.converter.build_field(self)
    }

    pub fn converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }

    /// Array item parameters.
    pub fn item(&self) -> Option<&FieldParameters> {
        match &self.children {
            Children::Item(item) => Some(item),
            _ => None,
        }
    }

    /// Object property parameters.
    pub fn fields(&self) -> Option<&IndexMap<String, FieldParameters>> {
        match &self.children {
            Children::Properties(fields) => Some(fields),
            _ => None,
        }
    }

    /// Kinds of the validators `build_options` would produce.
    pub fn validator_kinds(&self) -> Result<Vec<ValidatorKind>> {
        Ok(self
            .build_options()?
            .validators
            .iter()
            .map(Validator::kind)
            .collect())
    }

    /// Build factories for every property of an object.
    pub fn build_fields(&self) -> Result<IndexMap<String, FieldFactory>> {
        let fields = self
            .fields()
            .ok_or_else(|| ConversionError::UnsupportedType {
                converter: self.converter.name(),
                type_name: self.type_name.clone(),
            })?;
        fields
            .iter()
            .map(|(name, params)| Ok((name.clone(), params.build_field()?)))
            .collect()
    }
}

fn text(node: &Map<String, Value>, keyword: &str) -> Option<String> {
    node.get(keyword).and_then(Value::as_str).map(str::to_string)
}
