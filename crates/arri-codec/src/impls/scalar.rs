use std::num::IntErrorKind;

use arri_protocol::{TypeDef, TypeKind};
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{mismatch_at, type_mismatch};
use crate::context::{EncodingContext, TypeDefContext, ValidationContext};
use crate::error::{DecodeErrorKind, EncodeError, EncodeErrorKind, TypeDefError};
use crate::model::ArriModel;
use crate::shape::Shape;
use crate::wire::{self, number::integer_bounds, number::is_decimal_literal};

fn out_of_range(ctx: &mut ValidationContext, kind: TypeKind) {
    ctx.push_keyword_error(
        DecodeErrorKind::OutOfRange {
            kind,
            bound: integer_bounds(kind).to_string(),
        },
        "type",
    );
}

impl ArriModel for bool {
    fn shape() -> Shape {
        Shape::Leaf(TypeKind::Boolean)
    }

    fn type_def(_ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
        Ok(TypeDef::leaf(TypeKind::Boolean))
    }

    fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
        ctx.write_raw(if *self { b"true" } else { b"false" });
        Ok(())
    }

    fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
        match node {
            Value::Bool(value) => Some(*value),
            _ => {
                type_mismatch(ctx, "boolean", node);
                None
            }
        }
    }

    fn decode_query_value(raw: &str, ctx: &mut ValidationContext) -> Option<Self> {
        match raw {
            "true" | "TRUE" | "1" => Some(true),
            "false" | "FALSE" | "0" => Some(false),
            _ => {
                mismatch_at(ctx, "boolean", "string", "type");
                None
            }
        }
    }
}

impl ArriModel for String {
    fn shape() -> Shape {
        Shape::Leaf(TypeKind::String)
    }

    fn type_def(_ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
        Ok(TypeDef::leaf(TypeKind::String))
    }

    fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
        ctx.write_string(self);
        Ok(())
    }

    fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
        match node {
            Value::String(value) => Some(value.clone()),
            _ => {
                type_mismatch(ctx, "string", node);
                None
            }
        }
    }

    fn decode_query_value(raw: &str, _ctx: &mut ValidationContext) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl ArriModel for DateTime<Utc> {
    fn shape() -> Shape {
        Shape::Leaf(TypeKind::Timestamp)
    }

    fn type_def(_ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
        Ok(TypeDef::leaf(TypeKind::Timestamp))
    }

    fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
        wire::append_timestamp(ctx.buffer_mut(), self);
        Ok(())
    }

    fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
        match node {
            Value::String(raw) => Self::decode_query_value(raw, ctx),
            _ => {
                type_mismatch(ctx, "timestamp", node);
                None
            }
        }
    }

    fn decode_query_value(raw: &str, ctx: &mut ValidationContext) -> Option<Self> {
        let parsed = wire::parse_timestamp(raw);
        if parsed.is_none() {
            ctx.push_keyword_error(DecodeErrorKind::BadTimestamp, "type");
        }
        parsed
    }
}

macro_rules! float_model {
    ($ty:ty, $kind:ident, $append:path) => {
        impl ArriModel for $ty {
            fn shape() -> Shape {
                Shape::Leaf(TypeKind::$kind)
            }

            fn type_def(_ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
                Ok(TypeDef::leaf(TypeKind::$kind))
            }

            fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
                if $append(ctx.buffer_mut(), *self) {
                    Ok(())
                } else {
                    Err(ctx.error(EncodeErrorKind::NonFiniteNumber {
                        kind: TypeKind::$kind,
                    }))
                }
            }

            fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
                match node.as_f64() {
                    Some(value) => narrow_float::<$ty>(value, ctx),
                    None => {
                        type_mismatch(ctx, TypeKind::$kind.as_str(), node);
                        None
                    }
                }
            }

            fn decode_query_value(raw: &str, ctx: &mut ValidationContext) -> Option<Self> {
                match raw.parse::<f64>() {
                    Ok(value) if value.is_finite() => narrow_float::<$ty>(value, ctx),
                    _ => {
                        mismatch_at(ctx, TypeKind::$kind.as_str(), "string", "type");
                        None
                    }
                }
            }
        }
    };
}

trait FromF64: Sized {
    const KIND: TypeKind;
    fn from_f64(value: f64) -> Option<Self>;
}

impl FromF64 for f64 {
    const KIND: TypeKind = TypeKind::Float64;

    fn from_f64(value: f64) -> Option<Self> {
        Some(value)
    }
}

impl FromF64 for f32 {
    const KIND: TypeKind = TypeKind::Float32;

    fn from_f64(value: f64) -> Option<Self> {
        (value.abs() <= f32::MAX as f64).then_some(value as f32)
    }
}

fn narrow_float<T: FromF64>(value: f64, ctx: &mut ValidationContext) -> Option<T> {
    let narrowed = T::from_f64(value);
    if narrowed.is_none() {
        out_of_range(ctx, T::KIND);
    }
    narrowed
}

float_model!(f32, Float32, wire::append_float32);
float_model!(f64, Float64, wire::append_float64);

/// Integers of at most 32 bits travel as bare JSON numbers
macro_rules! small_int_model {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl ArriModel for $ty {
            fn shape() -> Shape {
                Shape::Leaf(TypeKind::$kind)
            }

            fn type_def(_ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
                Ok(TypeDef::leaf(TypeKind::$kind))
            }

            fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
                wire::append_integer(ctx.buffer_mut(), *self);
                Ok(())
            }

            fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
                let Value::Number(number) = node else {
                    type_mismatch(ctx, TypeKind::$kind.as_str(), node);
                    return None;
                };
                let narrowed = if let Some(value) = number.as_i64() {
                    <$ty>::try_from(value).ok()
                } else if let Some(value) = number.as_u64() {
                    <$ty>::try_from(value).ok()
                } else {
                    type_mismatch(ctx, TypeKind::$kind.as_str(), node);
                    return None;
                };
                if narrowed.is_none() {
                    out_of_range(ctx, TypeKind::$kind);
                }
                narrowed
            }

            fn decode_query_value(raw: &str, ctx: &mut ValidationContext) -> Option<Self> {
                parse_integer::<$ty>(raw, TypeKind::$kind, ctx)
            }
        }
    )*};
}

small_int_model! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
}

/// 64-bit integers travel as JSON strings of decimal digits
macro_rules! large_int_model {
    ($($ty:ty => $kind:ident, $signed:expr),* $(,)?) => {$(
        impl ArriModel for $ty {
            fn shape() -> Shape {
                Shape::Leaf(TypeKind::$kind)
            }

            fn type_def(_ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
                Ok(TypeDef::leaf(TypeKind::$kind))
            }

            fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
                wire::append_quoted_integer(ctx.buffer_mut(), *self);
                Ok(())
            }

            fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
                match node {
                    Value::String(raw) if is_decimal_literal(raw, $signed) => {
                        parse_integer::<$ty>(raw, TypeKind::$kind, ctx)
                    }
                    _ => {
                        ctx.push_keyword_error(
                            DecodeErrorKind::BadLargeInteger { kind: TypeKind::$kind },
                            "type",
                        );
                        None
                    }
                }
            }

            fn decode_query_value(raw: &str, ctx: &mut ValidationContext) -> Option<Self> {
                if !is_decimal_literal(raw, $signed) {
                    ctx.push_keyword_error(
                        DecodeErrorKind::BadLargeInteger { kind: TypeKind::$kind },
                        "type",
                    );
                    return None;
                }
                parse_integer::<$ty>(raw, TypeKind::$kind, ctx)
            }
        }
    )*};
}

large_int_model! {
    i64 => Int64, true,
    u64 => Uint64, false,
    isize => Int64, true,
    usize => Uint64, false,
}

fn parse_integer<T>(raw: &str, kind: TypeKind, ctx: &mut ValidationContext) -> Option<T>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(err) if matches!(err.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            out_of_range(ctx, kind);
            None
        }
        Err(_) => {
            mismatch_at(ctx, kind.as_str(), "string", "type");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CodecOptions;
    use chrono::TimeZone;
    use serde_json::json;

    fn encode<T: ArriModel>(value: &T) -> String {
        let mut ctx = EncodingContext::new(&CodecOptions::default());
        value.encode_json(&mut ctx).unwrap();
        String::from_utf8(ctx.into_bytes()).unwrap()
    }

    fn decode<T: ArriModel>(node: Value) -> (Option<T>, Vec<DecodeErrorKind>) {
        let mut ctx = ValidationContext::new(&CodecOptions::default());
        let value = T::decode_json(&node, &mut ctx);
        let kinds = ctx.into_errors().into_iter().map(|e| e.kind).collect();
        (value, kinds)
    }

    #[test]
    fn test_small_integers() {
        assert_eq!(encode(&42i32), "42");
        assert_eq!(decode::<i8>(json!(-128)).0, Some(-128));
        assert_eq!(decode::<u32>(json!(4294967295u64)).0, Some(u32::MAX));

        let (value, errors) = decode::<i8>(json!(300));
        assert_eq!(value, None);
        assert!(matches!(errors[0], DecodeErrorKind::OutOfRange { kind: TypeKind::Int8, .. }));

        let (_, errors) = decode::<u16>(json!(-1));
        assert!(matches!(errors[0], DecodeErrorKind::OutOfRange { .. }));

        let (_, errors) = decode::<i32>(json!(1.5));
        assert_eq!(
            errors[0],
            DecodeErrorKind::TypeMismatch { expected: "int32".to_string(), got: "float" }
        );
    }

    #[test]
    fn test_large_integers_are_strings() {
        assert_eq!(encode(&1000i64), r#""1000""#);
        assert_eq!(encode(&u64::MAX), r#""18446744073709551615""#);
        assert_eq!(decode::<i64>(json!("-9223372036854775808")).0, Some(i64::MIN));

        let (value, errors) = decode::<i64>(json!(1000));
        assert_eq!(value, None);
        assert_eq!(errors, vec![DecodeErrorKind::BadLargeInteger { kind: TypeKind::Int64 }]);

        let (_, errors) = decode::<u64>(json!("-1"));
        assert_eq!(errors, vec![DecodeErrorKind::BadLargeInteger { kind: TypeKind::Uint64 }]);

        let (_, errors) = decode::<u64>(json!("18446744073709551616"));
        assert!(matches!(errors[0], DecodeErrorKind::OutOfRange { kind: TypeKind::Uint64, .. }));
    }

    #[test]
    fn test_floats() {
        assert_eq!(encode(&2.5f64), "2.5");
        assert_eq!(encode(&10f32), "10");
        assert_eq!(decode::<f64>(json!(3)).0, Some(3.0));
        assert_eq!(decode::<f32>(json!(0.25)).0, Some(0.25));

        let (_, errors) = decode::<f32>(json!(1e300));
        assert!(matches!(errors[0], DecodeErrorKind::OutOfRange { kind: TypeKind::Float32, .. }));

        let mut ctx = EncodingContext::new(&CodecOptions::default());
        let err = f64::NAN.encode_json(&mut ctx).unwrap_err();
        assert_eq!(err.kind, EncodeErrorKind::NonFiniteNumber { kind: TypeKind::Float64 });
    }

    #[test]
    fn test_timestamps() {
        let value = Utc.with_ymd_and_hms(2001, 1, 1, 16, 0, 0).unwrap();
        assert_eq!(encode(&value), r#""2001-01-01T16:00:00.000Z""#);
        assert_eq!(decode::<DateTime<Utc>>(json!("2001-01-01T16:00:00Z")).0, Some(value));

        let (_, errors) = decode::<DateTime<Utc>>(json!("yesterday"));
        assert_eq!(errors, vec![DecodeErrorKind::BadTimestamp]);
    }

    #[test]
    fn test_query_values() {
        let mut ctx = ValidationContext::new(&CodecOptions::default());
        assert_eq!(bool::decode_query_value("TRUE", &mut ctx), Some(true));
        assert_eq!(bool::decode_query_value("0", &mut ctx), Some(false));
        assert_eq!(i64::decode_query_value("-5", &mut ctx), Some(-5));
        assert_eq!(f64::decode_query_value("1.25", &mut ctx), Some(1.25));
        assert!(!ctx.has_errors());

        assert_eq!(bool::decode_query_value("yes", &mut ctx), None);
        assert_eq!(u8::decode_query_value("256", &mut ctx), None);
        assert_eq!(f64::decode_query_value("NaN", &mut ctx), None);
        assert_eq!(ctx.errors().len(), 3);
    }
}
