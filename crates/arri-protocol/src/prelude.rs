//! # Protocol Prelude
//!
//! ```rust
//! use arri_protocol::prelude::*;
//! ```

pub use crate::definition::{AppDefinition, AppInfo, HttpMethod, KeyCasing, RpcDef};
pub use crate::error::{RpcError, ValidationError};
pub use crate::schema::{TypeDef, TypeDefMetadata, TypeKind};
