use std::collections::BTreeSet;

/// Errors raised while turning a JSON Schema into field parameters.
///
/// Conversion is fail-fast: the first error aborts the whole call and no
/// partial field mapping is returned.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The schema node uses keywords the converter for its type does not know.
    #[error("Unsupported attributes for {type_name} type: {}", join_keys(keys))]
    UnsupportedAttributes {
        type_name: String,
        keys: BTreeSet<String>,
    },

    /// The converter was handed a type tag outside its supported set.
    #[error("{converter} does not support the {type_name} type")]
    UnsupportedType {
        converter: &'static str,
        type_name: String,
    },

    /// A property schema is not a JSON object.
    #[error("Property '{0}': schema node must be an object")]
    NotAnObject(String),

    /// No converter is registered for the type tag.
    #[error("No converter registered for type '{0}'")]
    UnknownType(String),

    /// The type of a property could not be inferred from its schema node.
    #[error("Property '{0}': unable to determine type")]
    UndeterminedType(String),

    /// The string `format` is not in the field policy.
    #[error("Unsupported string format '{0}'")]
    UnsupportedFormat(String),

    /// A structurally required keyword is absent.
    #[error("Unsupported {type_name} type: '{keyword}' attribute required")]
    MissingKeyword {
        type_name: &'static str,
        keyword: &'static str,
    },

    /// A keyword is present but its value cannot be used.
    #[error("Invalid '{keyword}' keyword: {reason}")]
    InvalidKeyword {
        keyword: &'static str,
        reason: String,
    },

    /// A `$ref` does not point at a local definition.
    #[error("Unresolvable $ref '{0}'")]
    UnresolvedReference(String),

    /// A definition refers back to itself while being resolved.
    #[error("Circular reference detected: {0}")]
    CircularReference(String),

    /// Nesting went deeper than the configured limit.
    #[error("Maximum nesting depth {0} exceeded")]
    MaxDepthExceeded(usize),

    /// Object fields validate through their children only.
    #[error("Object field '{0}' cannot carry validators")]
    ValidatorsOnObject(String),

    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON schema: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = ConversionError> = std::result::Result<T, E>;

fn join_keys(keys: &BTreeSet<String>) -> String {
    keys.iter()
        .map(|k| format!("'{k}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_attributes_lists_keys_in_order() {
        let err = ConversionError::UnsupportedAttributes {
            type_name: "string".to_string(),
            keys: ["zeta", "alpha"].iter().map(|s| s.to_string()).collect(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported attributes for string type: 'alpha', 'zeta'"
        );
    }

    #[test]
    fn missing_keyword_message() {
        let err = ConversionError::MissingKeyword {
            type_name: "array",
            keyword: "items",
        };
        assert_eq!(
            err.to_string(),
            "Unsupported array type: 'items' attribute required"
        );
    }
}
