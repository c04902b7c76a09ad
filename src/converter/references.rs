use serde_json::{Map, Value};
use url::Url;

use crate::error::{ConversionError, Result};

/// Stand-in location of the document being converted; local references are
/// resolved against it so that anything pointing elsewhere can be told apart.
const DOCUMENT_BASE: &str = "file:///schema.json";

/// Name of the local definition a `$ref` points at.
///
/// Accepts `#/definitions/<name>` and `#/$defs/<name>`, and tolerates the
/// sloppy `#definitions/<name>`. Remote references are rejected.
pub fn definition_name(reference: &str) -> Result<String> {
    let unresolved = || ConversionError::UnresolvedReference(reference.to_string());

    let base = Url::parse(DOCUMENT_BASE).map_err(|_| unresolved())?;
    let parsed = Url::options()
        .base_url(Some(&base))
        .parse(reference)
        .map_err(|_| unresolved())?;
    if parsed.scheme() != base.scheme()
        || parsed.path() != base.path()
        || parsed.query().is_some()
    {
        return Err(unresolved());
    }

    let fragment = parsed.fragment().ok_or_else(unresolved)?;
    let pointer = fragment.strip_prefix('/').unwrap_or(fragment);
    let mut segments = pointer.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some("definitions" | "$defs"), Some(name), None) if !name.is_empty() => {
            Ok(name.replace("~1", "/").replace("~0", "~"))
        }
        _ => Err(unresolved()),
    }
}

/// Resolve a `$ref` string against the definitions in scope.
pub fn resolve_reference(
    reference: &str,
    definitions: &Map<String, Value>,
) -> Result<(String, Value)> {
    let name = definition_name(reference)?;
    tracing::trace!(reference, name = %name, "resolving reference");
    let schema = definitions
        .get(&name)
        .cloned()
        .ok_or_else(|| ConversionError::UnresolvedReference(reference.to_string()))?;
    Ok((name, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn local_definition_pointers() {
        assert_eq!(definition_name("#/definitions/Address").unwrap(), "Address");
        assert_eq!(definition_name("#/$defs/Geo").unwrap(), "Geo");
        assert_eq!(definition_name("#definitions/Address").unwrap(), "Address");
        assert_eq!(definition_name("#/definitions/a~1b").unwrap(), "a/b");
    }

    #[test]
    fn remote_and_non_definition_pointers_are_rejected() {
        for reference in [
            "https://example.com/schema.json#/definitions/Address",
            "other.json#/definitions/Address",
            "#/properties/name",
            "#",
            "#/definitions/A/properties",
        ] {
            assert!(
                matches!(
                    definition_name(reference),
                    Err(ConversionError::UnresolvedReference(_))
                ),
                "{reference} should not resolve"
            );
        }
    }

    #[test]
    fn resolves_against_definitions() {
        let defs = json!({"Address": {"type": "object", "properties": {}}});
        let (name, schema) =
            resolve_reference("#/definitions/Address", defs.as_object().unwrap()).unwrap();
        assert_eq!(name, "Address");
        assert_eq!(schema["type"], "object");

        assert!(resolve_reference("#/definitions/Missing", defs.as_object().unwrap()).is_err());
    }
}
