//! String fields restricted to a fixed set of values

use arri_protocol::TypeDef;
use serde_json::Value;

use crate::context::{EncodingContext, TypeDefContext, ValidationContext};
use crate::error::{DecodeErrorKind, EncodeError, TypeDefError};
use crate::impls::mismatch_at;
use crate::model::EnumString;
use crate::nullable::{Nullable, check_inner_shape, is_query_null};
use crate::wire::json_type_name;

/// Index of `raw` in `values`, recording `EnumNotMember` otherwise
pub(crate) fn enum_index(raw: &str, ctx: &mut ValidationContext, values: &[&str]) -> Option<usize> {
    let index = values.iter().position(|value| *value == raw);
    if index.is_none() {
        ctx.push_keyword_error(
            DecodeErrorKind::EnumNotMember {
                permitted: values.iter().map(|v| v.to_string()).collect(),
            },
            "enum",
        );
    }
    index
}

/// Index of a JSON string node in `values`
pub(crate) fn enum_node_index(
    node: &Value,
    ctx: &mut ValidationContext,
    values: &[&str],
) -> Option<usize> {
    match node {
        Value::String(raw) => enum_index(raw, ctx, values),
        _ => {
            mismatch_at(ctx, "string", json_type_name(node), "enum");
            None
        }
    }
}

impl EnumString for String {
    fn enum_type_def(
        _ctx: &mut TypeDefContext,
        values: &'static [&'static str],
    ) -> Result<TypeDef, TypeDefError> {
        Ok(TypeDef::string_enum(values.iter().copied()))
    }

    fn encode_enum(
        &self,
        ctx: &mut EncodingContext,
        values: &'static [&'static str],
    ) -> Result<(), EncodeError> {
        match values.first() {
            Some(fallback) if !values.contains(&self.as_str()) => {
                tracing::warn!(
                    value = %self,
                    fallback = *fallback,
                    instance_path = ctx.instance_path(),
                    "value is not a permitted enum member, encoding the first member instead"
                );
                ctx.write_string(fallback);
            }
            _ => ctx.write_string(self),
        }
        Ok(())
    }

    fn decode_enum(
        node: &Value,
        ctx: &mut ValidationContext,
        values: &'static [&'static str],
    ) -> Option<Self> {
        enum_node_index(node, ctx, values).map(|index| values[index].to_string())
    }

    fn decode_enum_query(
        raw: &str,
        ctx: &mut ValidationContext,
        values: &'static [&'static str],
    ) -> Option<Self> {
        enum_index(raw, ctx, values).map(|index| values[index].to_string())
    }
}

impl<T: EnumString> EnumString for Option<T> {
    fn enum_type_def(
        ctx: &mut TypeDefContext,
        values: &'static [&'static str],
    ) -> Result<TypeDef, TypeDefError> {
        T::enum_type_def(ctx, values)
    }

    fn encode_enum(
        &self,
        ctx: &mut EncodingContext,
        values: &'static [&'static str],
    ) -> Result<(), EncodeError> {
        match self {
            Some(value) => value.encode_enum(ctx, values),
            None => {
                ctx.write_null();
                Ok(())
            }
        }
    }

    fn decode_enum(
        node: &Value,
        ctx: &mut ValidationContext,
        values: &'static [&'static str],
    ) -> Option<Self> {
        match node {
            Value::Null => Some(None),
            _ => T::decode_enum(node, ctx, values).map(Some),
        }
    }

    fn decode_enum_field(
        node: &Value,
        ctx: &mut ValidationContext,
        values: &'static [&'static str],
    ) -> Option<Self> {
        T::decode_enum(node, ctx, values).map(Some)
    }

    fn decode_enum_query(
        raw: &str,
        ctx: &mut ValidationContext,
        values: &'static [&'static str],
    ) -> Option<Self> {
        T::decode_enum_query(raw, ctx, values).map(Some)
    }
}

impl<T: EnumString> EnumString for Nullable<T> {
    fn enum_type_def(
        ctx: &mut TypeDefContext,
        values: &'static [&'static str],
    ) -> Result<TypeDef, TypeDefError> {
        check_inner_shape::<T>(ctx)?;
        Ok(T::enum_type_def(ctx, values)?.with_nullable(true))
    }

    fn encode_enum(
        &self,
        ctx: &mut EncodingContext,
        values: &'static [&'static str],
    ) -> Result<(), EncodeError> {
        match self {
            Nullable::Value(value) => value.encode_enum(ctx, values),
            Nullable::Null => {
                ctx.write_null();
                Ok(())
            }
        }
    }

    fn decode_enum(
        node: &Value,
        ctx: &mut ValidationContext,
        values: &'static [&'static str],
    ) -> Option<Self> {
        match node {
            Value::Null => Some(Nullable::Null),
            _ => T::decode_enum(node, ctx, values).map(Nullable::Value),
        }
    }

    fn decode_enum_query(
        raw: &str,
        ctx: &mut ValidationContext,
        values: &'static [&'static str],
    ) -> Option<Self> {
        if is_query_null(raw) {
            return Some(Nullable::Null);
        }
        T::decode_enum_query(raw, ctx, values).map(Nullable::Value)
    }
}

impl<T: EnumString> EnumString for Box<T> {
    fn enum_type_def(
        ctx: &mut TypeDefContext,
        values: &'static [&'static str],
    ) -> Result<TypeDef, TypeDefError> {
        T::enum_type_def(ctx, values)
    }

    fn encode_enum(
        &self,
        ctx: &mut EncodingContext,
        values: &'static [&'static str],
    ) -> Result<(), EncodeError> {
        (**self).encode_enum(ctx, values)
    }

    fn decode_enum(
        node: &Value,
        ctx: &mut ValidationContext,
        values: &'static [&'static str],
    ) -> Option<Self> {
        T::decode_enum(node, ctx, values).map(Box::new)
    }

    fn decode_enum_field(
        node: &Value,
        ctx: &mut ValidationContext,
        values: &'static [&'static str],
    ) -> Option<Self> {
        T::decode_enum_field(node, ctx, values).map(Box::new)
    }

    fn decode_enum_query(
        raw: &str,
        ctx: &mut ValidationContext,
        values: &'static [&'static str],
    ) -> Option<Self> {
        T::decode_enum_query(raw, ctx, values).map(Box::new)
    }
}
