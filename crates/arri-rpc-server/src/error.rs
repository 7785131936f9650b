//! Registration errors

use arri_codec::TypeDefError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Problems found while assembling an [`App`](crate::App).
///
/// The builder keeps going after the first problem; `build()` reports all
/// of them inside [`ServerError::Registration`].
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid procedure name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("invalid rpc route prefix '{prefix}': {reason}")]
    InvalidPrefix { prefix: String, reason: String },

    #[error("procedure '{name}' is registered more than once")]
    DuplicateName { name: String },

    #[error("procedures '{first}' and '{second}' both map to path '{path}'")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },

    #[error("schema of procedure '{procedure}' could not be derived: {source}")]
    Schema {
        procedure: String,
        #[source]
        source: TypeDefError,
    },

    #[error("{role} of procedure '{procedure}' must be a struct, a discriminated union or (), found {shape}")]
    UnnamedType {
        procedure: String,
        role: &'static str,
        shape: &'static str,
    },

    #[error("GET procedure '{procedure}' takes params from the query string and needs a struct or (), found {shape}")]
    QueryInput {
        procedure: String,
        shape: &'static str,
    },

    #[error("two different schemas are registered under the id '{id}'")]
    DefinitionConflict { id: String },

    #[error("{} registration error(s):\n{}", .0.len(), join_lines(.0))]
    Registration(Vec<ServerError>),

    #[error("definition document could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServerError {
    /// The individual problems, flattening [`ServerError::Registration`]
    pub fn errors(&self) -> Vec<&ServerError> {
        match self {
            ServerError::Registration(errors) => errors.iter().collect(),
            other => vec![other],
        }
    }
}

fn join_lines(errors: &[ServerError]) -> String {
    errors
        .iter()
        .map(|error| format!("  - {error}"))
        .collect::<Vec<_>>()
        .join("\n")
}
