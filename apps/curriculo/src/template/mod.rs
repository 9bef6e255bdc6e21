//! Résumé templating: schema model, form values and the merge engine that
//! turns a Markdown template with `{{token}}` placeholders into a finished
//! document. Everything here is pure and synchronous.

pub mod defaults;
pub mod example;
pub mod merge;
pub mod schema;
pub mod sections;
pub mod tokens;
pub mod values;

pub use defaults::DEFAULT_TEMPLATE;
pub use example::{blank_values, example_values};
pub use merge::{merge, MergeError, TEMPLATE_NOT_LOADED_MESSAGE};
pub use schema::{unused_placeholders, FieldSpec, Schema, SchemaError};
pub use values::FormValues;
