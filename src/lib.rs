//! # jsonschema-forms
//!
//! Convert [JSON Schema](https://json-schema.org/) documents into web-form
//! field descriptors: one field per schema property, with validators and
//! rendering options taken from the schema keywords.
//!
//! ## Features
//!
//! - Maps `string`, `integer`, `number`, `boolean`, `array`, `object` and
//!   `enum` properties to field classes
//! - Extracts length, pattern, range and choice constraints as validators
//! - Picks field classes for string formats (`date`, `email`, `binary`, ...)
//! - Nests objects as sub-forms and arrays as repeating fields, checkboxes or
//!   multi-file uploads
//! - Resolves local `$ref`s against `definitions` / `$defs`, with cycle detection
//! - CLI tool `jsonschema2form` describing the converted fields as JSON
//!
//! ## Example (Programmatic Usage)
//!
//! ```
//! use serde_json::json;
//! use jsonschema_forms::form_from_schema;
//!
//! let schema = json!({
//!     "title": "Person",
//!     "type": "object",
//!     "properties": {
//!         "name": { "type": "string", "maxLength": 20 },
//!         "age": { "type": "integer", "minimum": 0 }
//!     },
//!     "required": ["name"]
//! });
//!
//! let mut form = form_from_schema(&schema).unwrap();
//! form.process(&json!({ "name": "Ada", "age": -1 }));
//! assert!(!form.validate());
//! assert_eq!(form.errors(), json!({ "age": ["Number must be at least 0."] }));
//! ```
//!
//! ## Example (CLI)
//!
//! ```bash
//! jsonschema2form person.json person.fields.json
//! ```
//!
//! ## Crate Layout
//!
//! - [`converter`] — schema → field parameter conversion, type registry
//! - [`form`] — field classes, validators, factories, bound fields and forms
//! - [`policy`] — which field class renders which kind of property
//! - [`error`] — conversion errors
//!
//! The CLI binary is enabled with the `cli` feature.
pub mod converter;
pub mod error;
pub mod form;
pub mod policy;

pub use converter::{
    form_from_schema, schema_fields, ConversionOptions, Converter, FieldParameters,
    SchemaConverter, TypeRegistry,
};
pub use error::{ConversionError, Result};
pub use form::{FieldClass, FieldFactory, Form};
pub use policy::FieldPolicy;
