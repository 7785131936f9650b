//! The nullable carrier

use arri_protocol::TypeDef;
use serde_json::Value;

use crate::context::{EncodingContext, TypeDefContext, ValidationContext};
use crate::error::{EncodeError, TypeDefError};
use crate::model::ArriModel;
use crate::shape::Shape;

/// A value that is always present on the wire but may be `null`.
///
/// Unlike `Option<T>`, which marks a field that may be absent, a
/// `Nullable<T>` field is always written. Wrap it in `Option` for a field
/// that may be absent, `null` or a value. `Nullable<Option<T>>` is rejected
/// when the schema is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Nullable<T> {
    #[default]
    Null,
    Value(T),
}

impl<T> Nullable<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Nullable::Null)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Nullable::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Nullable::Value(value) => Some(value),
            Nullable::Null => None,
        }
    }

    pub fn as_ref(&self) -> Nullable<&T> {
        match self {
            Nullable::Value(value) => Nullable::Value(value),
            Nullable::Null => Nullable::Null,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Nullable<U> {
        match self {
            Nullable::Value(value) => Nullable::Value(f(value)),
            Nullable::Null => Nullable::Null,
        }
    }

    pub fn into_option(self) -> Option<T> {
        self.into()
    }

    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Nullable::Value(value) => value,
            Nullable::Null => default,
        }
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Nullable::Value(value),
            None => Nullable::Null,
        }
    }
}

impl<T> From<Nullable<T>> for Option<T> {
    fn from(value: Nullable<T>) -> Self {
        match value {
            Nullable::Value(value) => Some(value),
            Nullable::Null => None,
        }
    }
}

/// `null`, `NULL` and `Null` select the null state in query strings
pub(crate) fn is_query_null(raw: &str) -> bool {
    matches!(raw, "null" | "NULL" | "Null")
}

pub(crate) fn check_inner_shape<T: ArriModel>(ctx: &TypeDefContext) -> Result<(), TypeDefError> {
    if T::shape().is_optional() {
        return Err(TypeDefError::NullableOption {
            path: ctx.schema_path().to_string(),
        });
    }
    Ok(())
}

impl<T: ArriModel> ArriModel for Nullable<T> {
    fn shape() -> Shape {
        Shape::Nullable
    }

    fn type_def(ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
        check_inner_shape::<T>(ctx)?;
        Ok(T::type_def(ctx)?.with_nullable(true))
    }

    fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
        match self {
            Nullable::Value(value) => value.encode_json(ctx),
            Nullable::Null => {
                ctx.write_null();
                Ok(())
            }
        }
    }

    fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
        match node {
            Value::Null => Some(Nullable::Null),
            _ => T::decode_json(node, ctx).map(Nullable::Value),
        }
    }

    fn decode_query_value(raw: &str, ctx: &mut ValidationContext) -> Option<Self> {
        if is_query_null(raw) {
            return Some(Nullable::Null);
        }
        T::decode_query_value(raw, ctx).map(Nullable::Value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CodecOptions;
    use arri_protocol::{KeyCasing, TypeKind};
    use serde_json::json;

    #[test]
    fn test_conversions() {
        assert_eq!(Nullable::from(Some(3)), Nullable::Value(3));
        assert_eq!(Option::<u8>::from(Nullable::Null), None);
        assert!(Nullable::<u8>::default().is_null());
        assert_eq!(Nullable::Value(2).map(|v| v * 2).unwrap_or(0), 4);
    }

    #[test]
    fn test_type_def_is_nullable() {
        let mut ctx = TypeDefContext::new(KeyCasing::Camel);
        let def = Nullable::<String>::type_def(&mut ctx).unwrap();
        assert_eq!(def, TypeDef::leaf(TypeKind::String).with_nullable(true));
    }

    #[test]
    fn test_nullable_option_rejected() {
        let mut ctx = TypeDefContext::new(KeyCasing::Camel);
        let err = Nullable::<Option<String>>::type_def(&mut ctx).unwrap_err();
        assert!(matches!(err, TypeDefError::NullableOption { .. }));

        // Option<Nullable<T>> is the legal spelling
        assert!(Option::<Nullable<String>>::field_type_def(&mut ctx).is_ok());
    }

    #[test]
    fn test_present_null_decodes_to_null_state() {
        let mut ctx = ValidationContext::new(&CodecOptions::default());
        assert_eq!(
            Nullable::<String>::decode_json(&json!(null), &mut ctx),
            Some(Nullable::Null)
        );
        assert_eq!(
            Option::<Nullable<String>>::decode_field_json(&json!(null), &mut ctx),
            Some(Some(Nullable::Null))
        );
        assert_eq!(
            Nullable::<u8>::decode_query_value("NULL", &mut ctx),
            Some(Nullable::Null)
        );
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_null_encodes_as_literal() {
        let mut ctx = EncodingContext::new(&CodecOptions::default());
        Nullable::<String>::Null.encode_json(&mut ctx).unwrap();
        assert_eq!(ctx.as_bytes(), b"null");
    }
}
