//! Error kinds for schema derivation, encoding and decoding

use std::fmt;

use arri_protocol::{RpcError, TypeKind, ValidationError};
use thiserror::Error;

/// Failure while deriving a [`TypeDef`](arri_protocol::TypeDef)
///
/// These surface at registration time, never per request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeDefError {
    #[error("Nullable<Option<T>> is not allowed at '{path}', use Option<Nullable<T>>")]
    NullableOption { path: String },

    #[error("Option<T> is only allowed as a struct field, found at '{path}'; use Nullable<T>")]
    OptionOutsideField { path: String },

    #[error("variant '{variant}' of discriminator '{name}' must be a named struct, found {found}")]
    VariantNotStruct {
        name: String,
        variant: String,
        found: &'static str,
    },

    #[error("variant '{variant}' of discriminator '{name}' has a field named after the discriminator key '{key}'")]
    DiscriminatorCollision {
        name: String,
        variant: String,
        key: String,
    },

    #[error("struct '{name}' has no fields")]
    EmptyStruct { name: String },

    #[error("type depth limit of {max} exceeded while deriving '{name}'")]
    MaxDepthExceeded { name: String, max: usize },

    #[error("{0}")]
    Custom(String),
}

/// What went wrong while encoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeErrorKind {
    #[error("maximum depth of {max} exceeded")]
    MaxDepthExceeded { max: usize },

    #[error("no variant of discriminator '{key}' was encoded")]
    AllVariantsEmpty { key: String },

    #[error("non-finite {kind} cannot be encoded")]
    NonFiniteNumber { kind: TypeKind },

    #[error("{0}")]
    Custom(String),
}

/// Encoding failure; encoders stop at the first one
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at '{instance_path}'")]
pub struct EncodeError {
    pub kind: EncodeErrorKind,
    pub instance_path: String,
    pub schema_path: String,
}

impl EncodeError {
    pub fn new(kind: EncodeErrorKind) -> Self {
        Self {
            kind,
            instance_path: String::new(),
            schema_path: String::new(),
        }
    }
}

impl From<EncodeError> for RpcError {
    fn from(error: EncodeError) -> Self {
        RpcError::internal(format!("Failed to encode response: {}", error))
    }
}

/// What went wrong while decoding a single location
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("Missing required field")]
    MissingRequiredField,

    #[error("Expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: &'static str },

    #[error("Expected {kind} within {bound}")]
    OutOfRange { kind: TypeKind, bound: String },

    #[error("Expected one of [{}]", permitted.join(", "))]
    EnumNotMember { permitted: Vec<String> },

    #[error("Expected RFC 3339 timestamp")]
    BadTimestamp,

    #[error("Expected {kind} encoded as a string of decimal digits")]
    BadLargeInteger { kind: TypeKind },

    #[error("Unknown value '{value}' for discriminator '{key}', expected one of [{}]", permitted.join(", "))]
    UnknownDiscriminator {
        key: String,
        value: String,
        permitted: Vec<String>,
    },

    #[error("Missing discriminator key '{key}' or its value is not a string")]
    MissingDiscriminatorKey { key: String },

    #[error("Query parameters cannot carry a nested {shape}")]
    NestedInQuery { shape: &'static str },

    #[error("Maximum depth of {max} exceeded")]
    MaxDepthExceeded { max: usize },

    #[error("Unknown property")]
    UnknownProperty,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("{0}")]
    Custom(String),
}

/// A decoding failure located in the value and in the schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at '{instance_path}'")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub instance_path: String,
    pub schema_path: String,
}

impl DecodeError {
    pub fn to_validation_error(&self) -> ValidationError {
        ValidationError::new(
            self.kind.to_string(),
            self.instance_path.clone(),
            self.schema_path.clone(),
        )
    }
}

/// Every problem found in one decode call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<DecodeError>);

impl ValidationErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DecodeError> {
        self.0.iter()
    }

    /// The instance paths of all errors, in the order they were found
    pub fn instance_paths(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.instance_path.as_str()).collect()
    }

    pub fn to_validation_errors(&self) -> Vec<ValidationError> {
        self.0.iter().map(DecodeError::to_validation_error).collect()
    }

    pub fn into_rpc_error(self) -> RpcError {
        RpcError::from(self)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = DecodeError;
    type IntoIter = std::vec::IntoIter<DecodeError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<ValidationErrors> for RpcError {
    fn from(errors: ValidationErrors) -> Self {
        RpcError::validation(&errors.to_validation_errors())
    }
}
