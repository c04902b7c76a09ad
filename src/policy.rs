use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConversionError, Result};
use crate::form::FieldClass;

/// Field classes used for each generic shape of property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericClasses {
    pub choice: FieldClass,
    pub integer: FieldClass,
    pub float: FieldClass,
    pub boolean: FieldClass,
    pub array: FieldClass,
    pub object: FieldClass,
    pub multi_file: FieldClass,
    pub multi_choice: FieldClass,
}

impl Default for GenericClasses {
    fn default() -> Self {
        Self {
            choice: FieldClass::Select,
            integer: FieldClass::Integer,
            float: FieldClass::Float,
            boolean: FieldClass::Boolean,
            array: FieldClass::FieldList,
            object: FieldClass::FormField,
            multi_file: FieldClass::MultipleFile,
            multi_choice: FieldClass::MultiCheckbox,
        }
    }
}

/// Which field class renders which kind of property.
///
/// String properties pick their class from `formats`, keyed by the schema
/// `format` keyword (`"default"` when absent). A format missing from the table
/// is rejected during conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPolicy {
    pub generic: GenericClasses,
    pub formats: IndexMap<String, FieldClass>,
}

pub const DEFAULT_FORMAT: &str = "default";

impl Default for FieldPolicy {
    fn default() -> Self {
        let formats = [
            (DEFAULT_FORMAT, FieldClass::String),
            ("password", FieldClass::Password),
            ("date", FieldClass::Date),
            ("time", FieldClass::Time),
            ("date-time", FieldClass::DateTime),
            ("month", FieldClass::Month),
            ("email", FieldClass::Email),
            ("ipv4", FieldClass::String),
            ("ipv6", FieldClass::String),
            ("binary", FieldClass::File),
            ("uri", FieldClass::Url),
        ]
        .into_iter()
        .map(|(format, class)| (format.to_string(), class))
        .collect();

        Self {
            generic: GenericClasses::default(),
            formats,
        }
    }
}

impl FieldPolicy {
    /// Field class for a string `format`, or for plain strings when `None`.
    pub fn format(&self, format: Option<&str>) -> Result<FieldClass> {
        let key = format.unwrap_or(DEFAULT_FORMAT);
        self.formats
            .get(key)
            .copied()
            .ok_or_else(|| ConversionError::UnsupportedFormat(key.to_string()))
    }

    pub fn with_format(mut self, format: impl Into<String>, class: FieldClass) -> Self {
        self.formats.insert(format.into(), class);
        self
    }

    pub fn without_format(mut self, format: &str) -> Self {
        self.formats.shift_remove(format);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_formats() {
        let policy = FieldPolicy::default();
        assert_eq!(policy.format(None).unwrap(), FieldClass::String);
        assert_eq!(policy.format(Some("date-time")).unwrap(), FieldClass::DateTime);
        assert_eq!(policy.format(Some("binary")).unwrap(), FieldClass::File);
        assert!(matches!(
            policy.format(Some("hostname")),
            Err(ConversionError::UnsupportedFormat(f)) if f == "hostname"
        ));
    }

    #[test]
    fn formats_can_be_overridden() {
        let policy = FieldPolicy::default()
            .with_format("hostname", FieldClass::Url)
            .without_format("password");
        assert_eq!(policy.format(Some("hostname")).unwrap(), FieldClass::Url);
        assert!(policy.format(Some("password")).is_err());
    }
}
