//! The capability contract every wire type implements

use arri_protocol::TypeDef;
use serde_json::Value;

use crate::context::{EncodingContext, QueryParams, TypeDefContext, ValidationContext};
use crate::error::{DecodeErrorKind, EncodeError, TypeDefError};
use crate::shape::Shape;

/// A type that can be described as a [`TypeDef`] and carried as ArriJSON.
///
/// `#[derive(ArriModel)]` implements this for structs, unit enums and
/// discriminated unions. Implementing it by hand replaces the derived codec
/// for that type, e.g. for a custom date format or a binary payload carried
/// in a string; everything that embeds the type picks the override up.
///
/// Decoders never stop at the first problem: they record it in the
/// [`ValidationContext`], return `None` and let the caller carry on with
/// sibling values.
pub trait ArriModel: Sized {
    /// Structural kind, used for checks a derive cannot make from syntax
    fn shape() -> Shape;

    /// Schema of this type
    fn type_def(ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError>;

    /// Schema of this type when it is a struct field.
    ///
    /// Only `Option` differs: as a field it is expressed through
    /// `optionalProperties` rather than `nullable`.
    fn field_type_def(ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
        Self::type_def(ctx)
    }

    /// Schema of this type as the payload of a union variant
    fn variant_type_def(ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
        Self::type_def(ctx)
    }

    fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError>;

    fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self>;

    /// Decode a struct field that is present on the wire.
    ///
    /// Only `Option` differs: a present field always holds the inner value,
    /// so `null` is accepted only when the inner type is nullable.
    fn decode_field_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
        Self::decode_json(node, ctx)
    }

    /// Decode a flat struct from URL query parameters
    fn decode_query(query: &QueryParams, ctx: &mut ValidationContext) -> Option<Self> {
        let _ = query;
        ctx.push_error(DecodeErrorKind::NestedInQuery {
            shape: Self::shape().name(),
        });
        None
    }

    /// Decode one query parameter value
    fn decode_query_value(raw: &str, ctx: &mut ValidationContext) -> Option<Self> {
        let _ = raw;
        ctx.push_error(DecodeErrorKind::NestedInQuery {
            shape: Self::shape().name(),
        });
        None
    }

    /// Whether a struct field holding this value is left off the wire
    fn is_absent(&self) -> bool {
        false
    }

    /// Value of a struct field missing from the wire; `None` makes the
    /// field required
    fn absent() -> Option<Self> {
        None
    }
}

/// A string-like type that can be restricted to a fixed set of values with
/// `#[arri(enum_values = "...")]`
pub trait EnumString: ArriModel {
    fn enum_type_def(
        ctx: &mut TypeDefContext,
        values: &'static [&'static str],
    ) -> Result<TypeDef, TypeDefError>;

    /// Values outside the set are replaced by the first permitted value
    fn encode_enum(
        &self,
        ctx: &mut EncodingContext,
        values: &'static [&'static str],
    ) -> Result<(), EncodeError>;

    fn decode_enum(
        node: &Value,
        ctx: &mut ValidationContext,
        values: &'static [&'static str],
    ) -> Option<Self>;

    fn decode_enum_field(
        node: &Value,
        ctx: &mut ValidationContext,
        values: &'static [&'static str],
    ) -> Option<Self> {
        Self::decode_enum(node, ctx, values)
    }

    fn decode_enum_query(
        raw: &str,
        ctx: &mut ValidationContext,
        values: &'static [&'static str],
    ) -> Option<Self>;
}
