use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::converter::registry::TypeRegistry;
use crate::error::{ConversionError, Result};
use crate::policy::FieldPolicy;

/// Settings for converting a schema into form fields.
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Root properties to convert; all of them when `None`.
    pub include: Option<BTreeSet<String>>,
    /// Root properties to skip.
    pub exclude: BTreeSet<String>,
    /// Deepest nesting of properties, array items and references.
    pub max_depth: usize,
    pub policy: FieldPolicy,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionOptions {
    pub fn new() -> Self {
        Self {
            include: None,
            exclude: BTreeSet::new(),
            max_depth: 32,
            policy: FieldPolicy::default(),
        }
    }

    pub fn include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn policy(mut self, policy: FieldPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Include/exclude sets applied to the root object's properties.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    include: Option<BTreeSet<String>>,
    exclude: BTreeSet<String>,
}

impl PropertyFilter {
    pub fn accepts(&self, name: &str) -> bool {
        self.include.as_ref().map_or(true, |names| names.contains(name))
            && !self.exclude.contains(name)
    }
}

/// Per-call state threaded through the recursive conversion.
pub struct ConversionContext<'a> {
    pub registry: &'a TypeRegistry,
    pub policy: Arc<FieldPolicy>,
    definitions: Map<String, Value>,
    visiting: Vec<String>,
    depth: usize,
    max_depth: usize,
    filter: Option<PropertyFilter>,
}

impl<'a> ConversionContext<'a> {
    pub fn new(
        registry: &'a TypeRegistry,
        policy: Arc<FieldPolicy>,
        options: &ConversionOptions,
    ) -> Self {
        Self {
            registry,
            policy,
            definitions: Map::new(),
            visiting: Vec::new(),
            depth: 0,
            max_depth: options.max_depth,
            filter: Some(PropertyFilter {
                include: options.include.clone(),
                exclude: options.exclude.clone(),
            }),
        }
    }

    pub fn definitions(&self) -> &Map<String, Value> {
        &self.definitions
    }

    /// The root filter; only the first object to ask receives it.
    pub fn take_filter(&mut self) -> PropertyFilter {
        self.filter.take().unwrap_or_default()
    }

    /// Run `f` with the `definitions` (or `$defs`) of `node` in scope.
    /// Local names shadow outer ones until `f` returns.
    pub fn with_definitions<T>(
        &mut self,
        node: &Map<String, Value>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let local: Vec<(&String, &Value)> = ["definitions", "$defs"]
            .iter()
            .filter_map(|keyword| node.get(*keyword))
            .filter_map(Value::as_object)
            .flat_map(|defs| defs.iter())
            .collect();
        if local.is_empty() {
            return f(self);
        }

        let saved = self.definitions.clone();
        for (name, schema) in local {
            self.definitions.insert(name.clone(), schema.clone());
        }
        let result = f(self);
        self.definitions = saved;
        result
    }

    /// Run `f` one level deeper, failing past the configured limit.
    pub fn descend<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.max_depth {
            return Err(ConversionError::MaxDepthExceeded(self.max_depth));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Mark definition `name` as being expanded.
    pub fn enter_reference(&mut self, name: &str) -> Result<()> {
        if self.visiting.iter().any(|visiting| visiting == name) {
            let mut chain = self.visiting.clone();
            chain.push(name.to_string());
            return Err(ConversionError::CircularReference(chain.join(" -> ")));
        }
        self.visiting.push(name.to_string());
        Ok(())
    }

    pub fn leave_references(&mut self, count: usize) {
        let keep = self.visiting.len().saturating_sub(count);
        self.visiting.truncate(keep);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_combines_include_and_exclude() {
        let options = ConversionOptions::new()
            .include(["a", "b"])
            .exclude(["b"]);
        let registry = TypeRegistry::default();
        let mut ctx = ConversionContext::new(&registry, Arc::new(FieldPolicy::default()), &options);
        let filter = ctx.take_filter();
        assert!(filter.accepts("a"));
        assert!(!filter.accepts("b"));
        assert!(!filter.accepts("c"));
        assert!(ctx.take_filter().accepts("c"));
    }

    #[test]
    fn local_definitions_shadow_and_restore() {
        let registry = TypeRegistry::default();
        let mut ctx = ConversionContext::new(
            &registry,
            Arc::new(FieldPolicy::default()),
            &ConversionOptions::default(),
        );
        let outer = json!({"definitions": {"A": {"type": "string"}}});
        let inner = json!({"definitions": {"A": {"type": "integer"}, "B": {"type": "boolean"}}});

        ctx.with_definitions(outer.as_object().unwrap(), |ctx| {
            ctx.with_definitions(inner.as_object().unwrap(), |ctx| {
                assert_eq!(ctx.definitions()["A"], json!({"type": "integer"}));
                assert!(ctx.definitions().contains_key("B"));
                Ok(())
            })?;
            assert_eq!(ctx.definitions()["A"], json!({"type": "string"}));
            assert!(!ctx.definitions().contains_key("B"));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn reference_cycles_are_reported() {
        let registry = TypeRegistry::default();
        let mut ctx = ConversionContext::new(
            &registry,
            Arc::new(FieldPolicy::default()),
            &ConversionOptions::default(),
        );
        ctx.enter_reference("Node").unwrap();
        ctx.enter_reference("Leaf").unwrap();
        let err = ctx.enter_reference("Node").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Circular reference detected: Node -> Leaf -> Node"
        );
        ctx.leave_references(2);
        assert!(ctx.enter_reference("Node").is_ok());
    }

    #[test]
    fn descend_stops_at_max_depth() {
        let registry = TypeRegistry::default();
        let options = ConversionOptions::new().max_depth(1);
        let mut ctx = ConversionContext::new(&registry, Arc::new(FieldPolicy::default()), &options);
        let nested = ctx.descend(|ctx| ctx.descend(|_| Ok(())));
        assert!(matches!(nested, Err(ConversionError::MaxDepthExceeded(1))));
        assert_eq!(ctx.depth(), 0);
    }
}
