//! # Arri Derive
//!
//! `#[derive(ArriModel)]` for structs, string enums and discriminated unions.
//! The generated code targets `arri_codec::__private`; depend on
//! `arri-codec`, which re-exports this macro.
//!
//! ## Attributes
//!
//! Container: `#[arri(id = "...", description = "...", deprecated, strict = false, discriminator = "...")]`
//!
//! Structs and unions reject unknown keys unless `strict = false` is given.
//!
//! Field: `#[arri(key = "...", description = "...", deprecated, enum_values = "A,B")]`
//!
//! Variant: `#[arri(rename = "...", description = "...", deprecated)]`
//!
//! ```rust,ignore
//! use arri_codec::ArriModel;
//!
//! #[derive(ArriModel)]
//! #[arri(description = "A registered user")]
//! struct User {
//!     id: String,
//!     #[arri(enum_values = "ADMIN,MEMBER")]
//!     role: String,
//! }
//!
//! #[derive(ArriModel)]
//! enum Status {
//!     Active,
//!     Inactive,
//! }
//!
//! #[derive(ArriModel)]
//! #[arri(discriminator = "kind")]
//! enum Shape {
//!     Circle { radius: f64 },
//!     Rect(RectShape),
//! }
//! ```

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod expand;
mod introspect;

#[cfg(test)]
mod tests;

/// Derive `arri_codec::ArriModel`
///
/// Generic types, tuple structs, unit structs, field-less structs and enums
/// mixing unit and data variants are rejected at compile time.
#[proc_macro_derive(ArriModel, attributes(arri))]
pub fn derive_arri_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand::derive_arri_model_impl(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
