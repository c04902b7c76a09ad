use serde_json::{Map, Value};

use crate::converter::keywords;
use crate::converter::parameters::{Attributes, Extracted, FieldParameters};
use crate::converter::registry::Converter;
use crate::converter::state::ConversionContext;
use crate::error::Result;
use crate::form::{FieldClass, Pattern, Validator};
use crate::policy::FieldPolicy;

/// `string` properties: length, pattern, choices and formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl Converter for StringConverter {
    fn name(&self) -> &'static str {
        "string"
    }

    fn supported(&self) -> &'static [&'static str] {
        &["string"]
    }

    fn allowed(&self) -> &'static [&'static str] {
        &[
            "minLength",
            "maxLength",
            "pattern",
            "enum",
            "format",
            "contentMediaType",
            "default",
        ]
    }

    fn extract(
        &self,
        _name: &str,
        node: &Map<String, Value>,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<Extracted> {
        let mut validators = Vec::new();
        let mut attributes = Attributes {
            default: node.get("default").cloned(),
            choices: keywords::enum_choices(node)?,
            ..Default::default()
        };

        let min = keywords::count(node, "minLength")?;
        let max = keywords::count(node, "maxLength")?;
        if min.is_some() || max.is_some() {
            validators.push(Validator::Length { min, max });
        }

        if let Some(source) = keywords::string(node, "pattern")? {
            let pattern =
                Pattern::new(source).map_err(|e| keywords::invalid("pattern", e.to_string()))?;
            validators.push(Validator::Regexp { pattern });
        }

        let format = keywords::string(node, "format")?;
        // Unknown formats fail here rather than when the field is built.
        ctx.policy.format(format)?;
        match format {
            Some("ipv4") => validators.push(Validator::IpAddress {
                ipv4: true,
                ipv6: false,
            }),
            Some("ipv6") => validators.push(Validator::IpAddress {
                ipv4: false,
                ipv6: true,
            }),
            Some("binary") => {
                if let Some(media_type) = keywords::string(node, "contentMediaType")? {
                    attributes
                        .render_kw
                        .insert("accept".to_string(), Value::String(media_type.to_string()));
                }
            }
            _ => {}
        }
        attributes.format = format.map(str::to_string);

        Ok(Extracted {
            validators,
            attributes,
            ..Default::default()
        })
    }

    fn resolve_factory(
        &self,
        params: &FieldParameters,
        policy: &FieldPolicy,
    ) -> Result<FieldClass> {
        if params.attributes.choices.is_some() {
            return Ok(policy.generic.choice);
        }
        policy.format(params.attributes.format.as_deref())
    }
}
