//! Contract extraction and validation.
//!
//! Turns an authored [`flat_ir::Contract`] into a [`FieldTable`]: the ordered,
//! fully typed fields plus every accessor binding, checked against each
//! other. Nothing downstream re-validates; a table that exists is sound.

mod error;
mod extract;
mod table;

pub use error::ValidationError;
pub use extract::{extract, extract_opt};
pub use table::{BoundMethod, Field, FieldTable, GetterBinding, SetterBinding};
