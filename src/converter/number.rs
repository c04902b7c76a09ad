use serde_json::{Map, Value};

use crate::converter::keywords;
use crate::converter::parameters::{Attributes, Extracted, FieldParameters};
use crate::converter::registry::Converter;
use crate::converter::state::ConversionContext;
use crate::error::Result;
use crate::form::{FieldClass, Validator};
use crate::policy::FieldPolicy;

/// `integer` and `number` properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberConverter;

impl Converter for NumberConverter {
    fn name(&self) -> &'static str {
        "number"
    }

    fn supported(&self) -> &'static [&'static str] {
        &["integer", "number"]
    }

    fn allowed(&self) -> &'static [&'static str] {
        &[
            "minimum",
            "maximum",
            "exclusiveMinimum",
            "exclusiveMaximum",
            "enum",
            "default",
        ]
    }

    fn extract(
        &self,
        _name: &str,
        node: &Map<String, Value>,
        _ctx: &mut ConversionContext<'_>,
    ) -> Result<Extracted> {
        let (min, exclusive_min) = bound(node, "minimum", "exclusiveMinimum", Side::Lower)?;
        let (max, exclusive_max) = bound(node, "maximum", "exclusiveMaximum", Side::Upper)?;

        let mut validators = Vec::new();
        if min.is_some() || max.is_some() {
            validators.push(Validator::number_range(
                min,
                max,
                exclusive_min,
                exclusive_max,
            ));
        }

        Ok(Extracted {
            validators,
            attributes: Attributes {
                default: node.get("default").cloned(),
                choices: keywords::enum_choices(node)?,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    /// A `0` is valid input, so requiredness looks at the raw input.
    fn required_validator(&self, required: bool) -> Validator {
        if required {
            Validator::InputRequired
        } else {
            Validator::Optional
        }
    }

    fn resolve_factory(
        &self,
        params: &FieldParameters,
        policy: &FieldPolicy,
    ) -> Result<FieldClass> {
        Ok(if params.attributes.choices.is_some() {
            policy.generic.choice
        } else if params.type_name == "integer" {
            policy.generic.integer
        } else {
            policy.generic.float
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Lower,
    Upper,
}

/// One side of a numeric range as `(bound, exclusive)`.
///
/// The exclusive keyword is either a number (draft 6 onwards) or a flag that
/// makes the inclusive keyword exclusive (draft 4). When both are numbers the
/// tighter bound wins.
fn bound(
    node: &Map<String, Value>,
    inclusive: &'static str,
    exclusive: &'static str,
    side: Side,
) -> Result<(Option<f64>, bool)> {
    let inclusive_bound = keywords::number(node, inclusive)?;
    match node.get(exclusive) {
        None => Ok((inclusive_bound, false)),
        Some(Value::Bool(flag)) => Ok((inclusive_bound, *flag && inclusive_bound.is_some())),
        Some(value) => {
            let exclusive_bound = value
                .as_f64()
                .ok_or_else(|| keywords::invalid(exclusive, "expected a number or a boolean"))?;
            let inclusive_is_tighter = inclusive_bound.is_some_and(|b| match side {
                Side::Lower => b > exclusive_bound,
                Side::Upper => b < exclusive_bound,
            });
            if inclusive_is_tighter {
                Ok((inclusive_bound, false))
            } else {
                Ok((Some(exclusive_bound), true))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lower(value: Value) -> (Option<f64>, bool) {
        bound(
            value.as_object().unwrap(),
            "minimum",
            "exclusiveMinimum",
            Side::Lower,
        )
        .unwrap()
    }

    #[test]
    fn exclusive_number_bound() {
        assert_eq!(lower(json!({"exclusiveMinimum": 2})), (Some(2.0), true));
        assert_eq!(lower(json!({"minimum": 1})), (Some(1.0), false));
    }

    #[test]
    fn draft4_exclusive_flag() {
        assert_eq!(
            lower(json!({"minimum": 3, "exclusiveMinimum": true})),
            (Some(3.0), true)
        );
        assert_eq!(lower(json!({"exclusiveMinimum": true})), (None, false));
    }

    #[test]
    fn tighter_bound_wins() {
        assert_eq!(
            lower(json!({"minimum": 5, "exclusiveMinimum": 2})),
            (Some(5.0), false)
        );
        assert_eq!(
            lower(json!({"minimum": 2, "exclusiveMinimum": 2})),
            (Some(2.0), true)
        );
    }
}
