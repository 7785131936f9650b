//! # Arri Protocol Types
//!
//! The externally visible documents of the Arri RPC runtime, free of any
//! codec or transport logic:
//!
//! - [`TypeDef`] - the canonical, language-agnostic schema of a model type
//! - [`RpcDef`] / [`AppDefinition`] - the procedure registry document
//! - [`RpcError`] / [`ValidationError`] - the user-visible error shapes
//!
//! All maps in these documents are ordered, so serializing the same
//! definition twice yields byte-identical output.

pub mod definition;
pub mod error;
pub mod prelude;
pub mod schema;

pub use definition::{
    AppDefinition, AppInfo, DEFAULT_RPC_ROUTE_PREFIX, HttpMethod, KeyCasing, RpcDef,
    SCHEMA_VERSION, UnknownKeyCasing,
};
pub use error::{RpcError, ValidationError, codes};
pub use schema::{TypeDef, TypeDefMetadata, TypeKind};

/// Ordered map used throughout the schema documents
pub use indexmap::IndexMap;
