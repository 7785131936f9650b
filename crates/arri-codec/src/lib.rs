//! # Arri Codec
//!
//! Type reflection and wire codecs for Arri RPC.
//!
//! Every wire type implements [`ArriModel`], usually through
//! `#[derive(ArriModel)]`. From that single description the crate produces:
//!
//! - the canonical [`TypeDef`](arri_protocol::TypeDef) schema document,
//! - an ArriJSON encoder (64-bit integers as strings, RFC 3339 timestamps,
//!   sorted map keys, discriminated unions as flat objects),
//! - a JSON decoder that accumulates every validation error with its
//!   instance and schema pointers,
//! - a URL-query decoder for flat structs.
//!
//! [`Validator`] packages both directions for one procedure.
//!
//! ## Optional and nullable
//!
//! `Option<T>` fields may be absent and are omitted when `None`.
//! [`Nullable<T>`] fields are always present and may be `null`.
//! `Option<Nullable<T>>` allows all three states; `Nullable<Option<T>>` is
//! rejected when the schema is derived.
//!
//! ```rust,ignore
//! use arri_codec::{ArriModel, CodecOptions, Nullable, Validator};
//!
//! #[derive(ArriModel)]
//! struct GetUserParams {
//!     user_id: String,
//! }
//!
//! #[derive(ArriModel)]
//! struct User {
//!     id: String,
//!     email: Option<String>,
//!     nickname: Nullable<String>,
//! }
//!
//! let validator = Validator::<GetUserParams, User>::new(CodecOptions::default())?;
//! let params = validator.decode_json(br#"{"userId":"1"}"#)?;
//! ```

extern crate self as arri_codec;

pub mod cache;
pub mod context;
pub mod enum_string;
pub mod error;
pub mod info;
pub mod model;
pub mod nullable;
pub mod options;
pub mod shape;
pub mod validator;
pub mod wire;

mod derive_support;
mod impls;

pub use cache::{DerivedSchema, TypeCache, derived_schema};
pub use context::{
    EncodingContext, MappingDefBuilder, ObjectDefBuilder, PathMark, QueryParams, ScopeMark,
    TypeDefContext, ValidationContext,
};
pub use error::{
    DecodeError, DecodeErrorKind, EncodeError, EncodeErrorKind, TypeDefError, ValidationErrors,
};
pub use info::{FieldInfo, ModelInfo, VariantInfo};
pub use model::{ArriModel, EnumString};
pub use nullable::Nullable;
pub use options::{CodecOptions, DEFAULT_MAX_DEPTH, TYPEDEF_MAX_DEPTH};
pub use shape::Shape;
pub use validator::{
    Validator, build_validator, decode_json_with, decode_value_with, derive_typedef,
    encode_json_with,
};

pub use arri_derive::ArriModel;

#[doc(hidden)]
pub mod __private {
    pub use crate::derive_support::*;
}

pub mod prelude {
    pub use crate::{
        ArriModel, CodecOptions, DecodeError, EncodeError, Nullable, Shape, TypeDefError,
        ValidationErrors, Validator,
    };
    pub use arri_protocol::{KeyCasing, TypeDef, TypeKind};
}
