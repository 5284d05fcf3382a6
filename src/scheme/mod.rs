//! Declarative scheme types and their XML serialization.

mod argument;
#[allow(clippy::module_inception)]
mod scheme;

pub use argument::{Argument, DataType, ParseDataTypeError};
pub use scheme::Scheme;
