use serde_json::{Map, Value};

use crate::converter::parameters::{Attributes, Extracted, FieldParameters};
use crate::converter::registry::Converter;
use crate::converter::state::ConversionContext;
use crate::error::Result;
use crate::form::FieldClass;
use crate::policy::FieldPolicy;

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl Converter for BooleanConverter {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn supported(&self) -> &'static [&'static str] {
        &["boolean"]
    }

    fn allowed(&self) -> &'static [&'static str] {
        &["default"]
    }

    fn extract(
        &self,
        _name: &str,
        node: &Map<String, Value>,
        _ctx: &mut ConversionContext<'_>,
    ) -> Result<Extracted> {
        Ok(Extracted {
            attributes: Attributes {
                default: node.get("default").cloned(),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn resolve_factory(
        &self,
        _params: &FieldParameters,
        policy: &FieldPolicy,
    ) -> Result<FieldClass> {
        Ok(policy.generic.boolean)
    }
}
