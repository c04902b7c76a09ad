use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::form::class::FieldClass;
use crate::form::factory::{Choice, FieldFactory, FieldOptions};
use crate::form::validators::{Check, FieldInput};

/// A field bound to a name within a form, holding submitted data and errors.
#[derive(Debug, Clone)]
pub struct BoundField {
    name: String,
    id: String,
    class: FieldClass,
    options: FieldOptions,
    raw: Option<Value>,
    data: Value,
    process_errors: Vec<String>,
    errors: Vec<String>,
    inner: Inner,
}

#[derive(Debug, Clone)]
enum Inner {
    Leaf,
    List {
        entry: Box<FieldFactory>,
        entries: Vec<BoundField>,
    },
    Form(Box<Form>),
}

impl BoundField {
    pub(crate) fn new(factory: &FieldFactory, name: &str, prefix: &str) -> Self {
        let id = format!("{prefix}{name}");
        let inner = match (&factory.entry, &factory.fields) {
            (Some(entry), _) => Inner::List {
                entry: entry.clone(),
                entries: Vec::new(),
            },
            (None, Some(fields)) => Inner::Form(Box::new(Form::new(fields, &format!("{id}-")))),
            (None, None) => Inner::Leaf,
        };
        Self {
            name: name.to_string(),
            id,
            class: factory.class,
            options: factory.options.clone(),
            raw: None,
            data: Value::Null,
            process_errors: Vec::new(),
            errors: Vec::new(),
            inner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefixed name, unique within the root form.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn class(&self) -> FieldClass {
        self.class
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn raw_data(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    /// Messages from the last `validate` call on this field itself.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn entries(&self) -> &[BoundField] {
        match &self.inner {
            Inner::List { entries, .. } => entries,
            _ => &[],
        }
    }

    pub fn form(&self) -> Option<&Form> {
        match &self.inner {
            Inner::Form(form) => Some(form),
            _ => None,
        }
    }

    /// Coerced data; lists and nested forms are assembled from their children.
    pub fn data(&self) -> Value {
        match &self.inner {
            Inner::Leaf => self.data.clone(),
            Inner::List { entries, .. } => {
                Value::Array(entries.iter().map(BoundField::data).collect())
            }
            Inner::Form(form) => form.data(),
        }
    }

    /// Load `input` into the field, falling back to the default when absent.
    pub fn process(&mut self, input: Option<&Value>) {
        self.process_errors.clear();
        self.errors.clear();

        let input = input.filter(|value| !value.is_null());
        self.raw = input.cloned();
        let value = match input {
            Some(value) => value.clone(),
            None => self.options.default.clone().unwrap_or(Value::Null),
        };

        match &mut self.inner {
            Inner::Leaf => match coerce(self.class, &value) {
                Ok(data) if self.class.uses_choices() => {
                    self.data = choice_values(self.options.choices.as_deref(), data)
                }
                Ok(data) => self.data = data,
                Err(message) => {
                    self.data = Value::Null;
                    self.process_errors.push(message.to_string());
                }
            },
            Inner::List { entry, entries } => {
                entries.clear();
                let items = match value {
                    Value::Array(items) => items,
                    Value::Null => Vec::new(),
                    _ => {
                        self.process_errors.push("Not a valid list value.".to_string());
                        Vec::new()
                    }
                };
                let prefix = format!("{}-", self.id);
                for (index, item) in items.iter().enumerate() {
                    let mut field = entry.bind(&index.to_string(), &prefix);
                    field.process(Some(item));
                    entries.push(field);
                }
            }
            Inner::Form(form) => {
                if value.is_object() || value.is_null() {
                    form.process(&value);
                } else {
                    self.process_errors
                        .push("Not a valid mapping value.".to_string());
                    form.process(&Value::Null);
                }
            }
        }
    }

    /// Run pre-validation and the validator chain; `true` when this field and
    /// all of its children are valid.
    pub fn validate(&mut self) -> bool {
        let mut children_valid = true;
        match &mut self.inner {
            Inner::Leaf => {}
            Inner::List { entries, .. } => {
                for entry in entries.iter_mut() {
                    children_valid &= entry.validate();
                }
            }
            Inner::Form(form) => children_valid = form.validate(),
        }

        let data = self.data();
        let mut errors = self.process_errors.clone();
        errors.extend(self.pre_validate(&data));

        let input = FieldInput {
            raw: self.raw.as_ref(),
            data: &data,
        };
        for validator in &self.options.validators {
            match validator.check(input) {
                Check::Valid => {}
                Check::Invalid(message) => errors.push(message),
                Check::Stop { clear, message } => {
                    if clear {
                        errors.clear();
                    }
                    errors.extend(message);
                    break;
                }
            }
        }

        self.errors = errors;
        self.errors.is_empty() && children_valid
    }

    fn pre_validate(&self, data: &Value) -> Vec<String> {
        let mut errors = Vec::new();
        let choices = self
            .options
            .choices
            .as_ref()
            .filter(|_| self.class.uses_choices());
        if let Some(choices) = choices {
            if self.class.is_multi_valued() {
                for value in data.as_array().into_iter().flatten() {
                    if !choices.iter().any(|choice| choice.matches(value)) {
                        errors.push(format!(
                            "'{}' is not a valid choice for this field.",
                            display(value)
                        ));
                    }
                }
            } else if !choices.iter().any(|choice| choice.matches(data)) {
                errors.push("Not a valid choice.".to_string());
            }
        }

        if self.class.is_multi_valued() {
            let count = data.as_array().map_or(0, Vec::len);
            if let Some(min) = self.options.min_entries.filter(|min| count < *min) {
                errors.push(format!("Expected at least {min} entries."));
            }
            if let Some(max) = self.options.max_entries.filter(|max| count > *max) {
                errors.push(format!("Expected at most {max} entries."));
            }
        }
        errors
    }

    /// Errors of this field and its children as JSON, `None` when valid.
    pub fn error_value(&self) -> Option<Value> {
        let own = || Value::Array(self.errors.iter().cloned().map(Value::String).collect());
        match &self.inner {
            Inner::Leaf => (!self.errors.is_empty()).then(own),
            Inner::List { entries, .. } => {
                let entry_errors: Vec<Option<Value>> =
                    entries.iter().map(BoundField::error_value).collect();
                let mut items: Vec<Value> = if entry_errors.iter().any(Option::is_some) {
                    entry_errors
                        .into_iter()
                        .map(|e| e.unwrap_or_else(|| Value::Array(Vec::new())))
                        .collect()
                } else {
                    Vec::new()
                };
                items.extend(self.errors.iter().cloned().map(Value::String));
                (!items.is_empty()).then_some(Value::Array(items))
            }
            Inner::Form(form) => {
                if !self.errors.is_empty() {
                    return Some(own());
                }
                let errors = form.errors();
                errors
                    .as_object()
                    .is_some_and(|map| !map.is_empty())
                    .then_some(errors)
            }
        }
    }
}

/// An ordered group of bound fields.
#[derive(Debug, Clone, Default)]
pub struct Form {
    prefix: String,
    fields: IndexMap<String, BoundField>,
}

impl Form {
    /// Bind every factory under `prefix` and load their defaults.
    pub fn new(fields: &IndexMap<String, FieldFactory>, prefix: &str) -> Self {
        let fields = fields
            .iter()
            .map(|(name, factory)| {
                let mut field = factory.bind(name, prefix);
                field.process(None);
                (name.clone(), field)
            })
            .collect();
        Self {
            prefix: prefix.to_string(),
            fields,
        }
    }

    pub fn from_fields(fields: &IndexMap<String, FieldFactory>) -> Self {
        Self::new(fields, "")
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn get(&self, name: &str) -> Option<&BoundField> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &BoundField)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Load a JSON object into the fields; missing keys fall back to defaults.
    pub fn process(&mut self, data: &Value) {
        let map = data.as_object();
        for (name, field) in self.fields.iter_mut() {
            field.process(map.and_then(|m| m.get(name)));
        }
    }

    pub fn validate(&mut self) -> bool {
        let mut valid = true;
        for field in self.fields.values_mut() {
            valid &= field.validate();
        }
        valid
    }

    /// Field name to error messages, nested for sub-forms and lists.
    pub fn errors(&self) -> Value {
        let errors: Map<String, Value> = self
            .fields
            .iter()
            .filter_map(|(name, field)| field.error_value().map(|e| (name.clone(), e)))
            .collect();
        Value::Object(errors)
    }

    pub fn data(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, field)| (name.clone(), field.data()))
                .collect(),
        )
    }
}

fn coerce(class: FieldClass, value: &Value) -> Result<Value, &'static str> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    if class.is_textual() {
        return match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err("Not a valid string value."),
        };
    }
    match class {
        FieldClass::Integer => coerce_integer(value),
        FieldClass::Float => coerce_float(value),
        FieldClass::Boolean => Ok(Value::Bool(match value {
            Value::Bool(b) => *b,
            Value::String(s) => !matches!(s.trim().to_ascii_lowercase().as_str(), "" | "false"),
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            _ => true,
        })),
        FieldClass::Date => coerce_temporal(value, "Not a valid date value.", |text| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        }),
        FieldClass::Month => coerce_temporal(value, "Not a valid date value.", |text| {
            NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").is_ok()
        }),
        FieldClass::Time => coerce_temporal(value, "Not a valid time value.", |text| {
            ["%H:%M", "%H:%M:%S"]
                .iter()
                .any(|fmt| NaiveTime::parse_from_str(text, fmt).is_ok())
        }),
        FieldClass::DateTime => coerce_temporal(value, "Not a valid datetime value.", |text| {
            DateTime::parse_from_rfc3339(text).is_ok()
                || ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
                    .iter()
                    .any(|fmt| NaiveDateTime::parse_from_str(text, fmt).is_ok())
        }),
        FieldClass::MultipleFile | FieldClass::MultiCheckbox => match value {
            Value::Array(_) => Ok(value.clone()),
            other => Ok(Value::Array(vec![other.clone()])),
        },
        _ => Ok(value.clone()),
    }
}

/// Replace submitted values by the choice they match, so `"2"` posted for a
/// choice of `2` is stored as the number. Unmatched values are kept for
/// pre-validation to report.
fn choice_values(choices: Option<&[Choice]>, data: Value) -> Value {
    let Some(choices) = choices else {
        return data;
    };
    let canonical = |value: Value| {
        choices
            .iter()
            .find(|choice| choice.matches(&value))
            .map_or(value, |choice| choice.value.clone())
    };
    match data {
        Value::Null => Value::Null,
        Value::Array(items) => Value::Array(items.into_iter().map(canonical).collect()),
        other => canonical(other),
    }
}

fn coerce_integer(value: &Value) -> Result<Value, &'static str> {
    const INVALID: &str = "Not a valid integer value.";
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                // i64::MAX as f64 rounds up to 2^63, which is out of range
                n.as_f64()
                    .filter(|f| {
                        f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64
                    })
                    .map(|f| f as i64)
            })
            .map(Value::from)
            .ok_or(INVALID),
        Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
        Value::String(s) => s.trim().parse::<i64>().map(Value::from).map_err(|_| INVALID),
        _ => Err(INVALID),
    }
}

fn coerce_float(value: &Value) -> Result<Value, &'static str> {
    const INVALID: &str = "Not a valid float value.";
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => return Ok(Value::Null),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|n| n.is_finite())
        .map(Value::from)
        .ok_or(INVALID)
}

fn coerce_temporal(
    value: &Value,
    invalid: &'static str,
    parses: impl Fn(&str) -> bool,
) -> Result<Value, &'static str> {
    match value {
        Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
        Value::String(s) if parses(s.trim()) => Ok(Value::String(s.trim().to_string())),
        _ => Err(invalid),
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::validators::Validator;
    use serde_json::json;

    fn single(name: &str, factory: FieldFactory) -> Form {
        let mut fields = IndexMap::new();
        fields.insert(name.to_string(), factory);
        Form::from_fields(&fields)
    }

    #[test]
    fn integer_coercion_error_is_reported() {
        let mut form = single(
            "age",
            FieldFactory::new(
                FieldClass::Integer,
                FieldOptions {
                    validators: vec![Validator::Optional],
                    ..Default::default()
                },
            ),
        );
        form.process(&json!({"age": "twelve"}));
        assert!(!form.validate());
        assert_eq!(
            form.errors(),
            json!({"age": ["Not a valid integer value."]})
        );

        form.process(&json!({"age": "12"}));
        assert!(form.validate());
        assert_eq!(form.data(), json!({"age": 12}));
    }

    #[test]
    fn optional_clears_choice_error_on_empty_input() {
        let mut form = single(
            "colour",
            FieldFactory::new(
                FieldClass::Select,
                FieldOptions {
                    validators: vec![Validator::Optional],
                    choices: Some(vec![Choice::from_value(json!("red"))]),
                    ..Default::default()
                },
            ),
        );
        form.process(&json!({}));
        assert!(form.validate());
    }

    #[test]
    fn defaults_apply_when_input_missing() {
        let mut form = single(
            "flag",
            FieldFactory::new(
                FieldClass::Boolean,
                FieldOptions {
                    validators: vec![Validator::DataRequired],
                    default: Some(json!(true)),
                    ..Default::default()
                },
            ),
        );
        form.process(&json!({}));
        assert!(form.validate());
        assert_eq!(form.data(), json!({"flag": true}));
    }

    #[test]
    fn list_entries_are_prefixed_and_validated() {
        let entry = FieldFactory::new(
            FieldClass::Float,
            FieldOptions {
                validators: vec![
                    Validator::InputRequired,
                    Validator::number_range(None, Some(10.0), false, false),
                ],
                ..Default::default()
            },
        );
        let mut form = single(
            "scores",
            FieldFactory::list(
                FieldClass::FieldList,
                entry,
                FieldOptions {
                    validators: vec![Validator::DataRequired],
                    max_entries: Some(3),
                    ..Default::default()
                },
            ),
        );

        form.process(&json!({"scores": [1, 20]}));
        let scores = form.get("scores").unwrap();
        assert_eq!(scores.entries()[1].id(), "scores-1");
        assert!(!form.validate());
        assert_eq!(
            form.errors(),
            json!({"scores": [[], ["Number must be at most 10."]]})
        );

        form.process(&json!({"scores": [1, 2, 3, 4]}));
        assert!(!form.validate());
        assert_eq!(
            form.errors(),
            json!({"scores": ["Expected at most 3 entries."]})
        );
    }

    #[test]
    fn nested_form_errors_are_nested() {
        let mut inner = IndexMap::new();
        inner.insert(
            "street".to_string(),
            FieldFactory::new(
                FieldClass::String,
                FieldOptions {
                    validators: vec![Validator::DataRequired],
                    ..Default::default()
                },
            ),
        );
        let mut form = single(
            "address",
            FieldFactory::form(FieldClass::FormField, inner, FieldOptions::default()),
        );
        assert_eq!(
            form.get("address").unwrap().form().unwrap().get("street").unwrap().id(),
            "address-street"
        );

        form.process(&json!({"address": {"street": ""}}));
        assert!(!form.validate());
        assert_eq!(
            form.errors(),
            json!({"address": {"street": ["This field is required."]}})
        );

        form.process(&json!({"address": {"street": "Main St"}}));
        assert!(form.validate());
        assert_eq!(form.data(), json!({"address": {"street": "Main St"}}));
    }

    #[test]
    fn temporal_fields_parse_their_formats() {
        assert!(coerce(FieldClass::Date, &json!("2024-02-29")).is_ok());
        assert!(coerce(FieldClass::Date, &json!("2023-02-29")).is_err());
        assert!(coerce(FieldClass::Time, &json!("10:30")).is_ok());
        assert!(coerce(FieldClass::DateTime, &json!("2024-01-01T10:00:00Z")).is_ok());
        assert!(coerce(FieldClass::Month, &json!("2024-13")).is_err());
    }

    #[test]
    fn multi_checkbox_rejects_unknown_values() {
        let mut form = single(
            "tags",
            FieldFactory::new(
                FieldClass::MultiCheckbox,
                FieldOptions {
                    validators: vec![Validator::Optional],
                    choices: Some(vec![
                        Choice::from_value(json!("a")),
                        Choice::from_value(json!("b")),
                    ]),
                    ..Default::default()
                },
            ),
        );
        form.process(&json!({"tags": ["a", "z"]}));
        assert!(!form.validate());
        assert_eq!(
            form.errors(),
            json!({"tags": ["'z' is not a valid choice for this field."]})
        );
    }

    #[test]
    fn integers_beyond_i64_are_rejected() {
        let mut form = single(
            "n",
            FieldFactory::new(
                FieldClass::Integer,
                FieldOptions {
                    validators: vec![Validator::Optional],
                    ..Default::default()
                },
            ),
        );
        for input in [json!(1e20), json!(-1e20), json!(9223372036854775808u64)] {
            form.process(&json!({ "n": input }));
            assert!(!form.validate());
            assert_eq!(form.errors(), json!({"n": ["Not a valid integer value."]}));
        }

        form.process(&json!({"n": 4e3}));
        assert!(form.validate());
        assert_eq!(form.data(), json!({"n": 4000}));
    }

    #[test]
    fn selected_text_is_stored_as_the_choice_value() {
        let mut form = single(
            "level",
            FieldFactory::new(
                FieldClass::Select,
                FieldOptions {
                    validators: vec![
                        Validator::InputRequired,
                        Validator::number_range(Some(1.0), None, false, false),
                    ],
                    choices: Some(vec![
                        Choice::from_value(json!(1)),
                        Choice::from_value(json!(2)),
                    ]),
                    ..Default::default()
                },
            ),
        );
        form.process(&json!({"level": "2"}));
        assert!(form.validate());
        assert_eq!(form.data(), json!({"level": 2}));
        assert_eq!(form.get("level").unwrap().raw_data(), Some(&json!("2")));
    }

    #[test]
    fn checked_text_is_stored_as_choice_values() {
        let mut form = single(
            "sizes",
            FieldFactory::new(
                FieldClass::MultiCheckbox,
                FieldOptions {
                    validators: vec![Validator::Optional],
                    choices: Some(vec![
                        Choice::from_value(json!(1.5)),
                        Choice::from_value(json!(3)),
                    ]),
                    ..Default::default()
                },
            ),
        );
        form.process(&json!({"sizes": ["3", 1.5, "7"]}));
        assert!(!form.validate());
        assert_eq!(form.data(), json!({"sizes": [3, 1.5, "7"]}));
        assert_eq!(
            form.errors(),
            json!({"sizes": ["'7' is not a valid choice for this field."]})
        );
    }
}
