use serde::{Deserialize, Serialize};

/// Concrete field classes a factory can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    String,
    Password,
    Date,
    Time,
    DateTime,
    Month,
    Email,
    Url,
    File,
    MultipleFile,
    Integer,
    Float,
    Boolean,
    Select,
    MultiCheckbox,
    FieldList,
    FormField,
}

impl FieldClass {
    /// Classes whose data is a list of values.
    pub fn is_multi_valued(self) -> bool {
        matches!(
            self,
            FieldClass::MultipleFile | FieldClass::MultiCheckbox | FieldClass::FieldList
        )
    }

    /// Classes that validate their data against a choice list.
    pub fn uses_choices(self) -> bool {
        matches!(self, FieldClass::Select | FieldClass::MultiCheckbox)
    }

    /// Classes that hold free text.
    pub fn is_textual(self) -> bool {
        matches!(
            self,
            FieldClass::String | FieldClass::Password | FieldClass::Email | FieldClass::Url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_snake_case() {
        assert_eq!(
            serde_json::to_value(FieldClass::MultiCheckbox).unwrap(),
            serde_json::json!("multi_checkbox")
        );
        assert_eq!(
            serde_json::to_value(FieldClass::DateTime).unwrap(),
            serde_json::json!("date_time")
        );
    }

    #[test]
    fn multi_valued_classes() {
        assert!(FieldClass::FieldList.is_multi_valued());
        assert!(FieldClass::MultipleFile.is_multi_valued());
        assert!(!FieldClass::Select.is_multi_valued());
    }
}
