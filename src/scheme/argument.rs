//! # Scheme argument descriptors.
//!
//! Each [`Argument`] describes one configurable parameter of the input:
//! the host renders it in the configuration UI and enforces the declared
//! validation and requiredness. Descriptors are assembled with the builder
//! methods and emitted in declaration order.
//!
//! ## Example
//! ```
//! use modinput::{Argument, DataType};
//!
//! let arg = Argument::new("interval")
//!     .with_title("Polling interval")
//!     .with_description("Seconds between collection cycles")
//!     .with_validation("is_pos_int('interval')")
//!     .with_data_type(DataType::Number)
//!     .required_on_create(true);
//!
//! assert_eq!(arg.data_type, DataType::Number);
//! ```

use std::str::FromStr;

use thiserror::Error;

/// Value type the host enforces for an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    /// Boolean argument.
    Boolean,
    /// Numeric argument.
    Number,
    /// Free-form string argument (the default).
    #[default]
    String,
}

impl DataType {
    /// Stable lowercase form used in the serialized scheme.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::Number => "number",
            DataType::String => "string",
        }
    }
}

/// A serialized data type was not recognized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown argument data type: {0:?}")]
pub struct ParseDataTypeError(pub String);

impl FromStr for DataType {
    type Err = ParseDataTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boolean" => Ok(DataType::Boolean),
            "number" => Ok(DataType::Number),
            "string" => Ok(DataType::String),
            other => Err(ParseDataTypeError(other.to_string())),
        }
    }
}

/// One argument descriptor of the input scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Argument name as it appears in stanza configuration.
    pub name: String,
    /// Optional UI title.
    pub title: Option<String>,
    /// Optional UI description.
    pub description: Option<String>,
    /// Optional host-side validation expression.
    pub validation: Option<String>,
    /// Value type the host enforces.
    pub data_type: DataType,
    /// Whether the argument must be present when editing a stanza.
    pub required_on_edit: bool,
    /// Whether the argument must be present when creating a stanza.
    pub required_on_create: bool,
}

impl Argument {
    /// Creates a string-typed, optional argument with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            validation: None,
            data_type: DataType::String,
            required_on_edit: false,
            required_on_create: false,
        }
    }

    /// Attaches a UI title.
    #[inline]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attaches a UI description.
    #[inline]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches a host-side validation expression.
    #[inline]
    pub fn with_validation(mut self, validation: impl Into<String>) -> Self {
        self.validation = Some(validation.into());
        self
    }

    /// Sets the enforced value type.
    #[inline]
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Marks the argument required when editing a stanza.
    #[inline]
    pub fn required_on_edit(mut self, required: bool) -> Self {
        self.required_on_edit = required;
        self
    }

    /// Marks the argument required when creating a stanza.
    #[inline]
    pub fn required_on_create(mut self, required: bool) -> Self {
        self.required_on_create = required;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_round_trips_through_str() {
        for dt in [DataType::Boolean, DataType::Number, DataType::String] {
            assert_eq!(dt.as_str().parse::<DataType>().unwrap(), dt);
        }
        assert!("date".parse::<DataType>().is_err());
    }
}
