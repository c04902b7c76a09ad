use serde_json::{Map, Value};

use crate::converter::keywords;
use crate::converter::object::convert_property;
use crate::converter::parameters::{Attributes, Children, Extracted, FieldParameters};
use crate::converter::registry::Converter;
use crate::converter::state::ConversionContext;
use crate::error::{ConversionError, Result};
use crate::form::{FieldClass, FieldFactory};
use crate::policy::FieldPolicy;

/// `array` properties.
///
/// Items are converted like any other property, under the array's name. The
/// array then becomes a multi-file upload (binary string items), a set of
/// checkboxes (items with choices) or a repeating list of item fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayConverter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayShape {
    Files,
    Choices,
    Repeating,
}

fn shape(params: &FieldParameters) -> ArrayShape {
    match params.item() {
        Some(item) if is_binary_string(item) => ArrayShape::Files,
        _ if params.attributes.choices.is_some() => ArrayShape::Choices,
        _ => ArrayShape::Repeating,
    }
}

fn is_binary_string(params: &FieldParameters) -> bool {
    params.type_name == "string" && params.attributes.format.as_deref() == Some("binary")
}

impl Converter for ArrayConverter {
    fn name(&self) -> &'static str {
        "array"
    }

    fn supported(&self) -> &'static [&'static str] {
        &["array"]
    }

    fn allowed(&self) -> &'static [&'static str] {
        &[
            "items",
            "minItems",
            "maxItems",
            "default",
            "enum",
            "definitions",
            "$defs",
        ]
    }

    fn needs_definitions(&self) -> bool {
        true
    }

    fn extract(
        &self,
        name: &str,
        node: &Map<String, Value>,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<Extracted> {
        let items = node.get("items").ok_or(ConversionError::MissingKeyword {
            type_name: "array",
            keyword: "items",
        })?;
        let item = convert_property(ctx, name, true, items)?;

        let mut attributes = Attributes {
            default: node.get("default").cloned(),
            choices: keywords::enum_choices(node)?,
            min_entries: keywords::count(node, "minItems")?,
            max_entries: keywords::count(node, "maxItems")?,
            ..Default::default()
        };
        if attributes.choices.is_none() {
            attributes.choices = item.attributes.choices.clone();
        }
        if is_binary_string(&item) {
            attributes.render_kw = item.attributes.render_kw.clone();
        }

        Ok(Extracted {
            attributes,
            children: Children::Item(Box::new(item)),
            ..Default::default()
        })
    }

    fn resolve_factory(
        &self,
        params: &FieldParameters,
        policy: &FieldPolicy,
    ) -> Result<FieldClass> {
        Ok(match shape(params) {
            ArrayShape::Files => policy.generic.multi_file,
            ArrayShape::Choices => policy.generic.multi_choice,
            ArrayShape::Repeating => policy.generic.array,
        })
    }

    fn build_field(&self, params: &FieldParameters) -> Result<FieldFactory> {
        let class = params.resolve_factory()?;
        let options = params.build_options()?;
        match shape(params) {
            ArrayShape::Repeating => {
                let item = params.item().ok_or(ConversionError::MissingKeyword {
                    type_name: "array",
                    keyword: "items",
                })?;
                Ok(FieldFactory::list(class, item.build_field()?, options))
            }
            ArrayShape::Files | ArrayShape::Choices => Ok(FieldFactory::new(class, options)),
        }
    }
}
