//! A small form-field model consumed by the converter output.
//!
//! Field factories are unbound descriptions (class plus options). Binding a
//! factory yields a [`BoundField`] that can `process` input data and
//! `validate` it, and a [`Form`] groups bound fields by name.

pub mod bound;
pub mod class;
pub mod factory;
pub mod validators;

pub use bound::{BoundField, Form};
pub use class::FieldClass;
pub use factory::{Choice, FieldFactory, FieldOptions};
pub use validators::{Pattern, Validator, ValidatorKind};
