use std::rc::Rc;
use std::sync::Arc;

use arri_protocol::TypeDef;
use serde_json::Value;

use crate::context::{EncodingContext, QueryParams, TypeDefContext, ValidationContext};
use crate::error::{EncodeError, TypeDefError};
use crate::model::ArriModel;
use crate::shape::Shape;

/// `Option<T>` is the optional carrier: `None` fields are left off the wire
/// and a missing field decodes to `None`.
///
/// It only has a schema as a struct field. An array element, a map value or
/// the top level has nothing to omit, and writing `None` as `null` there would
/// make `Option<Nullable<T>>` lose a state, so those positions are rejected
/// when the schema is derived. Use [`Nullable`](crate::Nullable) instead.
impl<T: ArriModel> ArriModel for Option<T> {
    fn shape() -> Shape {
        Shape::Option
    }

    fn type_def(ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
        Err(TypeDefError::OptionOutsideField {
            path: ctx.schema_path().to_string(),
        })
    }

    fn field_type_def(ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
        T::type_def(ctx)
    }

    fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
        match self {
            Some(value) => value.encode_json(ctx),
            None => {
                ctx.write_null();
                Ok(())
            }
        }
    }

    fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
        match node {
            Value::Null => Some(None),
            _ => T::decode_json(node, ctx).map(Some),
        }
    }

    fn decode_field_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
        T::decode_json(node, ctx).map(Some)
    }

    fn decode_query_value(raw: &str, ctx: &mut ValidationContext) -> Option<Self> {
        T::decode_query_value(raw, ctx).map(Some)
    }

    fn is_absent(&self) -> bool {
        self.is_none()
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

/// Smart pointers are transparent on the wire; `Box` is how recursive
/// models hold their children
macro_rules! pointer_model {
    ($($ptr:ident),*) => {$(
        impl<T: ArriModel> ArriModel for $ptr<T> {
            fn shape() -> Shape {
                T::shape()
            }

            fn type_def(ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
                T::type_def(ctx)
            }

            fn field_type_def(ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
                T::field_type_def(ctx)
            }

            fn variant_type_def(ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
                T::variant_type_def(ctx)
            }

            fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
                (**self).encode_json(ctx)
            }

            fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
                T::decode_json(node, ctx).map($ptr::new)
            }

            fn decode_field_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
                T::decode_field_json(node, ctx).map($ptr::new)
            }

            fn decode_query(query: &QueryParams, ctx: &mut ValidationContext) -> Option<Self> {
                T::decode_query(query, ctx).map($ptr::new)
            }

            fn decode_query_value(raw: &str, ctx: &mut ValidationContext) -> Option<Self> {
                T::decode_query_value(raw, ctx).map($ptr::new)
            }

            fn is_absent(&self) -> bool {
                (**self).is_absent()
            }

            fn absent() -> Option<Self> {
                T::absent().map($ptr::new)
            }
        }
    )*};
}

pointer_model!(Box, Rc, Arc);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Nullable;
    use crate::error::DecodeErrorKind;
    use crate::options::CodecOptions;
    use arri_protocol::{KeyCasing, TypeKind};
    use serde_json::json;

    #[test]
    fn test_option_outside_field_is_rejected() {
        let mut ctx = TypeDefContext::new(KeyCasing::Camel);
        let err = Vec::<Option<Nullable<String>>>::type_def(&mut ctx).unwrap_err();
        assert_eq!(
            err,
            TypeDefError::OptionOutsideField {
                path: "/elements".to_string()
            }
        );
        assert!(Option::<String>::type_def(&mut ctx).is_err());

        // as a field it is the optional carrier
        let def = Option::<Nullable<String>>::field_type_def(&mut ctx).unwrap();
        assert_eq!(def, TypeDef::leaf(TypeKind::String).with_nullable(true));
        assert!(Box::<Option<u8>>::field_type_def(&mut ctx).is_ok());
    }

    #[test]
    fn test_option_field_rejects_null() {
        let mut ctx = ValidationContext::new(&CodecOptions::default());
        assert_eq!(Option::<String>::decode_field_json(&json!(null), &mut ctx), None);
        assert!(matches!(
            ctx.errors()[0].kind,
            DecodeErrorKind::TypeMismatch { got: "null", .. }
        ));
        assert_eq!(Option::<String>::absent(), Some(None));
        assert!(None::<String>.is_absent());
    }

    #[test]
    fn test_box_is_transparent() {
        assert_eq!(Box::<Option<u8>>::shape(), Shape::Option);
        let mut ctx = EncodingContext::new(&CodecOptions::default());
        Arc::new(7u8).encode_json(&mut ctx).unwrap();
        assert_eq!(ctx.as_bytes(), b"7");
    }
}
