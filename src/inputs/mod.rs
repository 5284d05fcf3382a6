//! The input seam and the host payload model.

mod definition;
mod input;
mod input_fn;

pub use definition::{
    DefinitionError, HostMetadata, InputDefinition, InputSpecSet, Stanza, ValidationDefinition,
    ValidationRequest,
};
pub use input::Input;
pub use input_fn::{FnInput, FnInputBuilder};
