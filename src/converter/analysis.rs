use serde_json::{Map, Value};

/// Type tag of a schema node and whether `null` was allowed alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTag {
    pub name: String,
    pub nullable: bool,
}

/// Determine the type tag of a node.
///
/// - `"type": "string"` is used as is.
/// - `"type": ["string", "null"]` is a nullable string; other lists are ambiguous.
/// - a node without `type` but with `enum` is an `enum`.
pub fn schema_type(node: &Map<String, Value>) -> Option<TypeTag> {
    match node.get("type") {
        Some(Value::String(name)) => Some(TypeTag {
            name: name.clone(),
            nullable: false,
        }),
        Some(Value::Array(types)) => {
            let nullable = types.iter().any(|t| t == "null");
            let mut others = types.iter().filter(|t| *t != "null");
            match (others.next(), others.next()) {
                (Some(Value::String(name)), None) => Some(TypeTag {
                    name: name.clone(),
                    nullable,
                }),
                _ => None,
            }
        }
        None if has_enum_keyword(node) => Some(TypeTag {
            name: "enum".to_string(),
            nullable: false,
        }),
        _ => None,
    }
}

/// Check if a schema node declares `enum`.
pub fn has_enum_keyword(node: &Map<String, Value>) -> bool {
    node.contains_key("enum")
}

/// The single `allOf` member merged with the node's other keys, if the node
/// is such a wrapper.
pub fn unwrap_single_all_of(node: &Map<String, Value>) -> Option<Map<String, Value>> {
    match node.get("allOf") {
        Some(Value::Array(members)) if members.len() == 1 => {
            let inner = members[0].as_object()?;
            Some(overlay(inner, node, "allOf"))
        }
        _ => None,
    }
}

/// Copy of `base` with every key of `siblings` except `skip` laid over it.
pub fn overlay(
    base: &Map<String, Value>,
    siblings: &Map<String, Value>,
    skip: &str,
) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in siblings {
        if key != skip {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
