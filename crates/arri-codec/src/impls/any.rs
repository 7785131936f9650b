use arri_protocol::{IndexMap, TypeDef};
use serde_json::Value;

use super::type_mismatch;
use crate::context::{EncodingContext, QueryParams, TypeDefContext, ValidationContext};
use crate::error::{EncodeError, TypeDefError};
use crate::model::ArriModel;
use crate::shape::Shape;
use crate::wire;

/// Untyped JSON, kept as-is
impl ArriModel for Value {
    fn shape() -> Shape {
        Shape::Any
    }

    fn type_def(_ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
        Ok(TypeDef::any())
    }

    fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
        encode_any(self, ctx)
    }

    fn decode_json(node: &Value, _ctx: &mut ValidationContext) -> Option<Self> {
        Some(node.clone())
    }

    fn decode_query_value(raw: &str, _ctx: &mut ValidationContext) -> Option<Self> {
        Some(Value::String(raw.to_string()))
    }
}

/// Object keys are written in bytewise order; every array and object counts
/// against the depth bound.
fn encode_any(value: &Value, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
    match value {
        Value::Array(items) => {
            let scope = ctx.begin_array()?;
            for (index, item) in items.iter().enumerate() {
                ctx.write_separator();
                let mark = ctx.enter_instance_index(index);
                let result = encode_any(item, ctx);
                ctx.restore_path(mark);
                result?;
            }
            ctx.end_array(scope);
            Ok(())
        }
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            let scope = ctx.begin_object()?;
            for (key, item) in entries {
                ctx.write_key(key);
                let mark = ctx.enter_instance_key(key);
                let result = encode_any(item, ctx);
                ctx.restore_path(mark);
                result?;
            }
            ctx.end_object(scope);
            Ok(())
        }
        scalar => {
            wire::append_scalar(ctx.buffer_mut(), scalar);
            Ok(())
        }
    }
}

/// No params or no response: `{}` on the wire
impl ArriModel for () {
    fn shape() -> Shape {
        Shape::Empty
    }

    fn type_def(_ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
        Ok(TypeDef::object(IndexMap::new(), IndexMap::new()))
    }

    fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
        let scope = ctx.begin_object()?;
        ctx.end_object(scope);
        Ok(())
    }

    fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
        match node {
            Value::Null | Value::Object(_) => Some(()),
            _ => {
                type_mismatch(ctx, "object", node);
                None
            }
        }
    }

    fn decode_query(_query: &QueryParams, _ctx: &mut ValidationContext) -> Option<Self> {
        Some(())
    }
}
