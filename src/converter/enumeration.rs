use serde_json::{Map, Value};

use crate::converter::keywords;
use crate::converter::parameters::{Attributes, Extracted, FieldParameters};
use crate::converter::registry::Converter;
use crate::converter::state::ConversionContext;
use crate::error::{ConversionError, Result};
use crate::form::{FieldClass, Validator};
use crate::policy::FieldPolicy;

/// Properties that are a fixed set of values, declared with `enum` or with a
/// `oneOf` list of `{const, title}` pairs. Always rendered as a select.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumConverter;

impl Converter for EnumConverter {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn supported(&self) -> &'static [&'static str] {
        &["enum"]
    }

    fn allowed(&self) -> &'static [&'static str] {
        &["enum", "oneOf", "default"]
    }

    fn extract(
        &self,
        _name: &str,
        node: &Map<String, Value>,
        _ctx: &mut ConversionContext<'_>,
    ) -> Result<Extracted> {
        let choices = match keywords::enum_choices(node)? {
            Some(choices) => choices,
            None => keywords::one_of_choices(node)?.ok_or(ConversionError::MissingKeyword {
                type_name: "enum",
                keyword: "enum",
            })?,
        };
        Ok(Extracted {
            attributes: Attributes {
                default: node.get("default").cloned(),
                choices: Some(choices),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    /// `0`, `false` and `""` are legitimate choices.
    fn required_validator(&self, required: bool) -> Validator {
        if required {
            Validator::InputRequired
        } else {
            Validator::Optional
        }
    }

    fn resolve_factory(
        &self,
        _params: &FieldParameters,
        policy: &FieldPolicy,
    ) -> Result<FieldClass> {
        Ok(policy.generic.choice)
    }
}
