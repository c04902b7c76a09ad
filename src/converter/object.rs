use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::converter::analysis::{overlay, schema_type, unwrap_single_all_of};
use crate::converter::keywords;
use crate::converter::parameters::{Children, Extracted, FieldParameters};
use crate::converter::references::resolve_reference;
use crate::converter::registry::Converter;
use crate::converter::state::ConversionContext;
use crate::error::{ConversionError, Result};
use crate::form::{FieldClass, FieldFactory};
use crate::policy::FieldPolicy;

const ROOT: &str = "<root>";

/// `object` properties: one child per entry of `properties`, rendered as a
/// nested form. Objects validate through their children only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectConverter;

impl Converter for ObjectConverter {
    fn name(&self) -> &'static str {
        "object"
    }

    fn supported(&self) -> &'static [&'static str] {
        &["object"]
    }

    fn allowed(&self) -> &'static [&'static str] {
        &["required", "properties", "definitions", "$defs"]
    }

    fn needs_definitions(&self) -> bool {
        true
    }

    fn extract(
        &self,
        _name: &str,
        node: &Map<String, Value>,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<Extracted> {
        let properties = node
            .get("properties")
            .ok_or(ConversionError::MissingKeyword {
                type_name: "object",
                keyword: "properties",
            })?
            .as_object()
            .ok_or_else(|| keywords::invalid("properties", "expected an object"))?;
        let required = keywords::string_list(node, "required")?;
        let filter = ctx.take_filter();

        let mut fields = IndexMap::with_capacity(properties.len());
        for (property, schema) in properties {
            if !filter.accepts(property) {
                tracing::debug!(property = %property, "skipping filtered property");
                continue;
            }
            let is_required = required.contains(&property.as_str());
            let child = convert_property(ctx, property, is_required, schema)?;
            fields.insert(property.clone(), child);
        }

        Ok(Extracted {
            children: Children::Properties(fields),
            ..Default::default()
        })
    }

    fn carries_validators(&self) -> bool {
        false
    }

    fn resolve_factory(
        &self,
        _params: &FieldParameters,
        policy: &FieldPolicy,
    ) -> Result<FieldClass> {
        Ok(policy.generic.object)
    }

    fn build_field(&self, params: &FieldParameters) -> Result<FieldFactory> {
        let class = params.resolve_factory()?;
        let options = params.build_options()?;
        Ok(FieldFactory::form(class, params.build_fields()?, options))
    }
}

/// Convert the root schema, which must describe an object.
pub fn convert_root(ctx: &mut ConversionContext<'_>, schema: &Value) -> Result<FieldParameters> {
    let root = schema
        .as_object()
        .ok_or_else(|| ConversionError::NotAnObject(ROOT.to_string()))?;

    ctx.with_definitions(root, |ctx| {
        ctx.descend(|ctx| {
            let mut entered = 0;
            let result = resolve_node(ctx, ROOT, root, &mut entered).and_then(|node| {
                let type_name = match schema_type(&node) {
                    Some(tag) => tag.name,
                    None if node.get("type").is_none() => "object".to_string(),
                    None => return Err(ConversionError::UndeterminedType(ROOT.to_string())),
                };
                let converter = ctx.registry.lookup("object")?;
                let node = Value::Object(node);
                FieldParameters::from_schema_node(converter, &type_name, "", false, &node, ctx)
            });
            ctx.leave_references(entered);
            result
        })
    })
}

/// Convert one property schema: unwrap a single `allOf`, follow `$ref`s, pick
/// the converter by type and recurse.
pub fn convert_property(
    ctx: &mut ConversionContext<'_>,
    name: &str,
    required: bool,
    schema: &Value,
) -> Result<FieldParameters> {
    let node = schema
        .as_object()
        .ok_or_else(|| ConversionError::NotAnObject(name.to_string()))?;

    ctx.descend(|ctx| {
        let mut entered = 0;
        let result = resolve_node(ctx, name, node, &mut entered)
            .and_then(|node| dispatch(ctx, name, required, node));
        ctx.leave_references(entered);
        result
    })
}

fn dispatch(
    ctx: &mut ConversionContext<'_>,
    name: &str,
    required: bool,
    node: Map<String, Value>,
) -> Result<FieldParameters> {
    let tag = schema_type(&node).ok_or_else(|| ConversionError::UndeterminedType(name.to_string()))?;
    let converter = ctx.registry.lookup(&tag.name)?;
    let required = required && !tag.nullable;
    tracing::debug!(
        property = name,
        type_name = %tag.name,
        required,
        depth = ctx.depth(),
        "converting property"
    );

    let node = Value::Object(node);
    match node.as_object() {
        Some(map) if converter.needs_definitions() => ctx.with_definitions(map, |ctx| {
            FieldParameters::from_schema_node(converter, &tag.name, name, required, &node, ctx)
        }),
        _ => FieldParameters::from_schema_node(converter, &tag.name, name, required, &node, ctx),
    }
}

/// Expand wrappers until the node is neither a single `allOf` nor a `$ref`.
///
/// Every definition entered is counted in `entered` so the caller can leave
/// them once the subtree is converted.
fn resolve_node(
    ctx: &mut ConversionContext<'_>,
    name: &str,
    node: &Map<String, Value>,
    entered: &mut usize,
) -> Result<Map<String, Value>> {
    let mut node = node.clone();
    loop {
        if let Some(unwrapped) = unwrap_single_all_of(&node) {
            node = unwrapped;
            continue;
        }
        let Some(reference) = node.get("$ref") else {
            return Ok(node);
        };
        let reference = reference
            .as_str()
            .ok_or_else(|| keywords::invalid("$ref", "expected a string"))?;
        let (definition, target) = resolve_reference(reference, ctx.definitions())?;
        ctx.enter_reference(&definition)?;
        *entered += 1;

        let target = target
            .as_object()
            .ok_or_else(|| ConversionError::NotAnObject(format!("{name} ({definition})")))?;
        node = overlay(target, &node, "$ref");
    }
}
