use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// A compiled `pattern` keyword that remembers its source text.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: source.to_string(),
            regex: Regex::new(source)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// JSON Schema patterns are unanchored: a match anywhere is enough.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// Validation rules attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// Data must be present and truthy.
    DataRequired,
    /// Raw input must be present; `0` counts as input.
    InputRequired,
    /// Empty input stops the chain and clears earlier errors.
    Optional,
    Length {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
    Regexp {
        pattern: Pattern,
    },
    NumberRange {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        exclusive_min: bool,
        exclusive_max: bool,
    },
    IpAddress {
        ipv4: bool,
        ipv6: bool,
    },
}

/// Discriminant of a [`Validator`], handy for comparing validator chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatorKind {
    DataRequired,
    InputRequired,
    Optional,
    Length,
    Regexp,
    NumberRange,
    IpAddress,
}

/// What a validator sees of a bound field.
#[derive(Debug, Clone, Copy)]
pub struct FieldInput<'a> {
    /// Value as submitted, `None` when nothing was submitted.
    pub raw: Option<&'a Value>,
    /// Value after coercion (or the default).
    pub data: &'a Value,
}

/// Outcome of running a single validator.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    Valid,
    Invalid(String),
    /// Stop the chain; `clear` drops errors collected so far.
    Stop {
        clear: bool,
        message: Option<String>,
    },
}

const REQUIRED_MESSAGE: &str = "This field is required.";

impl Validator {
    pub fn number_range(
        min: Option<f64>,
        max: Option<f64>,
        exclusive_min: bool,
        exclusive_max: bool,
    ) -> Self {
        Validator::NumberRange {
            min,
            max,
            exclusive_min,
            exclusive_max,
        }
    }

    pub fn kind(&self) -> ValidatorKind {
        match self {
            Validator::DataRequired => ValidatorKind::DataRequired,
            Validator::InputRequired => ValidatorKind::InputRequired,
            Validator::Optional => ValidatorKind::Optional,
            Validator::Length { .. } => ValidatorKind::Length,
            Validator::Regexp { .. } => ValidatorKind::Regexp,
            Validator::NumberRange { .. } => ValidatorKind::NumberRange,
            Validator::IpAddress { .. } => ValidatorKind::IpAddress,
        }
    }

    pub fn check(&self, input: FieldInput<'_>) -> Check {
        match self {
            Validator::DataRequired => {
                if is_truthy(input.data) {
                    Check::Valid
                } else {
                    Check::Stop {
                        clear: true,
                        message: Some(REQUIRED_MESSAGE.to_string()),
                    }
                }
            }
            Validator::InputRequired => {
                if is_blank(input.raw) {
                    Check::Stop {
                        clear: true,
                        message: Some(REQUIRED_MESSAGE.to_string()),
                    }
                } else {
                    Check::Valid
                }
            }
            Validator::Optional => {
                if is_blank(input.raw) {
                    Check::Stop {
                        clear: true,
                        message: None,
                    }
                } else {
                    Check::Valid
                }
            }
            Validator::Length { min, max } => check_length(input.data, *min, *max),
            Validator::Regexp { pattern } => {
                let text = as_text(input.data);
                if pattern.is_match(&text) {
                    Check::Valid
                } else {
                    Check::Invalid("Invalid input.".to_string())
                }
            }
            Validator::NumberRange {
                min,
                max,
                exclusive_min,
                exclusive_max,
            } => check_range(input.data, *min, *max, *exclusive_min, *exclusive_max),
            Validator::IpAddress { ipv4, ipv6 } => {
                let text = as_text(input.data);
                let valid = (*ipv4 && text.parse::<Ipv4Addr>().is_ok())
                    || (*ipv6 && text.parse::<Ipv6Addr>().is_ok());
                if valid {
                    Check::Valid
                } else {
                    Check::Invalid("Invalid IP address.".to_string())
                }
            }
        }
    }
}

fn check_length(data: &Value, min: Option<usize>, max: Option<usize>) -> Check {
    let length = as_text(data).chars().count();
    let too_short = min.is_some_and(|m| length < m);
    let too_long = max.is_some_and(|m| length > m);
    if !too_short && !too_long {
        return Check::Valid;
    }
    let message = match (min, max) {
        (Some(min), Some(max)) => {
            format!("Field must be between {min} and {max} characters long.")
        }
        (Some(min), None) => format!("Field must be at least {min} character(s) long."),
        (None, Some(max)) => format!("Field cannot be longer than {max} character(s)."),
        (None, None) => return Check::Valid,
    };
    Check::Invalid(message)
}

fn check_range(
    data: &Value,
    min: Option<f64>,
    max: Option<f64>,
    exclusive_min: bool,
    exclusive_max: bool,
) -> Check {
    let lower = |min: f64| {
        if exclusive_min {
            format!("Number must be over {min}.")
        } else {
            format!("Number must be at least {min}.")
        }
    };
    let upper = |max: f64| {
        if exclusive_max {
            format!("Number must be under {max}.")
        } else {
            format!("Number must be at most {max}.")
        }
    };

    let Some(number) = data.as_f64().filter(|n| !n.is_nan()) else {
        let message = match (min, max) {
            (Some(min), Some(max)) => format!("Number must be between {min} and {max}."),
            (Some(min), None) => lower(min),
            (None, Some(max)) => upper(max),
            (None, None) => "Not a valid number.".to_string(),
        };
        return Check::Invalid(message);
    };

    if let Some(min) = min {
        let ok = if exclusive_min { number > min } else { number >= min };
        if !ok {
            return Check::Invalid(lower(min));
        }
    }
    if let Some(max) = max {
        let ok = if exclusive_max { number < max } else { number <= max };
        if !ok {
            return Check::Invalid(upper(max));
        }
    }
    Check::Valid
}

/// Truthiness the way a form library judges submitted data.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn is_blank(raw: Option<&Value>) -> bool {
    match raw {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(validator: &Validator, data: Value) -> Check {
        validator.check(FieldInput {
            raw: Some(&data),
            data: &data,
        })
    }

    #[test]
    fn inclusive_range_reports_violated_bound() {
        let range = Validator::number_range(Some(2.0), Some(10.0), false, false);
        assert_eq!(run(&range, json!(5)), Check::Valid);
        assert_eq!(run(&range, json!(2)), Check::Valid);
        assert_eq!(
            run(&range, json!(1)),
            Check::Invalid("Number must be at least 2.".into())
        );
        assert_eq!(
            run(&range, json!(11)),
            Check::Invalid("Number must be at most 10.".into())
        );
    }

    #[test]
    fn exclusive_bounds_reject_the_bound_itself() {
        let range = Validator::number_range(Some(2.0), Some(15.0), true, true);
        assert_eq!(
            run(&range, json!(2)),
            Check::Invalid("Number must be over 2.".into())
        );
        assert_eq!(
            run(&range, json!(15)),
            Check::Invalid("Number must be under 15.".into())
        );
        assert_eq!(run(&range, json!(10)), Check::Valid);
    }

    #[test]
    fn mixed_bounds_are_independent() {
        let range = Validator::number_range(Some(0.0), Some(1.5), false, true);
        assert_eq!(run(&range, json!(0)), Check::Valid);
        assert_eq!(
            run(&range, json!(1.5)),
            Check::Invalid("Number must be under 1.5.".into())
        );
    }

    #[test]
    fn range_rejects_non_numbers() {
        let range = Validator::number_range(Some(2.99), None, false, false);
        assert_eq!(
            run(&range, Value::Null),
            Check::Invalid("Number must be at least 2.99.".into())
        );
    }

    #[test]
    fn length_bounds() {
        let length = Validator::Length {
            min: Some(2),
            max: Some(3),
        };
        assert_eq!(run(&length, json!("ab")), Check::Valid);
        assert_eq!(
            run(&length, json!("a")),
            Check::Invalid("Field must be between 2 and 3 characters long.".into())
        );
        assert_eq!(
            run(&length, json!("abcd")),
            Check::Invalid("Field must be between 2 and 3 characters long.".into())
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let length = Validator::Length {
            min: None,
            max: Some(3),
        };
        assert_eq!(run(&length, json!("äöü")), Check::Valid);
    }

    #[test]
    fn regexp_searches_unanchored() {
        let regexp = Validator::Regexp {
            pattern: Pattern::new("^The ").unwrap(),
        };
        assert_eq!(run(&regexp, json!("The end")), Check::Valid);
        assert_eq!(
            run(&regexp, json!("the end")),
            Check::Invalid("Invalid input.".into())
        );
    }

    #[test]
    fn required_validators() {
        assert!(matches!(
            run(&Validator::DataRequired, json!(0)),
            Check::Stop { clear: true, .. }
        ));
        assert_eq!(run(&Validator::InputRequired, json!(0)), Check::Valid);
        assert_eq!(
            Validator::Optional.check(FieldInput {
                raw: None,
                data: &Value::Null
            }),
            Check::Stop {
                clear: true,
                message: None
            }
        );
    }

    #[test]
    fn ip_address() {
        let v4 = Validator::IpAddress {
            ipv4: true,
            ipv6: false,
        };
        assert_eq!(run(&v4, json!("192.168.0.1")), Check::Valid);
        assert_eq!(
            run(&v4, json!("::1")),
            Check::Invalid("Invalid IP address.".into())
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let regexp = Validator::Regexp {
            pattern: Pattern::new(r"^\w+$").unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&regexp).unwrap(),
            json!({"kind": "regexp", "pattern": r"^\w+$"})
        );
        assert_eq!(
            serde_json::to_value(Validator::DataRequired).unwrap(),
            json!({"kind": "data_required"})
        );
    }
}
