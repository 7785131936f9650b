//! Runtime half of `#[derive(ArriModel)]`. Not a stable API.

use serde_json::{Map, Value};

pub use crate::context::{
    EncodingContext, MappingDefBuilder, ObjectDefBuilder, QueryParams, TypeDefContext,
    ValidationContext,
};
pub use crate::error::{EncodeError, TypeDefError};
pub use crate::info::{FieldInfo, ModelInfo, VariantInfo};
pub use crate::model::{ArriModel, EnumString};
pub use crate::shape::Shape;
pub use arri_protocol::TypeDef;
pub use serde_json::Value as JsonValue;

use crate::enum_string::{enum_index, enum_node_index};
use crate::error::{DecodeErrorKind, EncodeErrorKind};
use crate::impls::mismatch_at;
use crate::wire::json_type_name;

pub type JsonObject = Map<String, Value>;

/// Write `"key":value` unless the value is absent
pub fn encode_field<T: ArriModel>(
    ctx: &mut EncodingContext,
    info: &FieldInfo,
    value: &T,
) -> Result<(), EncodeError> {
    if value.is_absent() {
        return Ok(());
    }
    let key = info.key(ctx.key_casing());
    ctx.write_key(key);
    let mark = ctx.enter_field(key, T::shape().is_optional());
    let result = value.encode_json(ctx);
    ctx.restore_path(mark);
    result
}

pub fn encode_enum_field<T: EnumString>(
    ctx: &mut EncodingContext,
    info: &FieldInfo,
    value: &T,
    values: &'static [&'static str],
) -> Result<(), EncodeError> {
    if value.is_absent() {
        return Ok(());
    }
    let key = info.key(ctx.key_casing());
    ctx.write_key(key);
    let mark = ctx.enter_field(key, T::shape().is_optional());
    let result = value.encode_enum(ctx, values);
    ctx.restore_path(mark);
    result
}

/// Check that `node` is an object and step into it.
///
/// Consumes the discriminator key set by an enclosing union; in strict mode
/// every other key must belong to a declared field.
pub fn begin_struct<'a>(
    node: &'a Value,
    ctx: &mut ValidationContext,
    model: &ModelInfo,
    fields: &[FieldInfo],
) -> Option<&'a JsonObject> {
    let discriminator = ctx.take_discriminator_key();
    let Value::Object(object) = node else {
        mismatch_at(ctx, "object", json_type_name(node), "properties");
        return None;
    };
    if !ctx.enter() {
        return None;
    }
    if model.strict {
        let casing = ctx.key_casing();
        for key in object.keys() {
            if Some(key.as_str()) == discriminator
                || fields.iter().any(|field| field.key(casing) == key)
            {
                continue;
            }
            let mark = ctx.enter_instance_key(key);
            ctx.push_keyword_error(DecodeErrorKind::UnknownProperty, "strict");
            ctx.restore_path(mark);
        }
    }
    Some(object)
}

pub fn end_struct(ctx: &mut ValidationContext) {
    ctx.leave();
}

/// Decode one declared field; a missing field is either absent or an error
pub fn decode_field<T: ArriModel>(
    object: &JsonObject,
    ctx: &mut ValidationContext,
    info: &FieldInfo,
) -> Option<T> {
    if ctx.is_halted() {
        return None;
    }
    let key = info.key(ctx.key_casing());
    let mark = ctx.enter_field(key, T::shape().is_optional());
    let value = match object.get(key) {
        Some(node) => T::decode_field_json(node, ctx),
        None => missing::<T>(ctx),
    };
    ctx.restore_path(mark);
    value
}

pub fn decode_enum_field<T: EnumString>(
    object: &JsonObject,
    ctx: &mut ValidationContext,
    info: &FieldInfo,
    values: &'static [&'static str],
) -> Option<T> {
    if ctx.is_halted() {
        return None;
    }
    let key = info.key(ctx.key_casing());
    let mark = ctx.enter_field(key, T::shape().is_optional());
    let value = match object.get(key) {
        Some(node) => T::decode_enum_field(node, ctx, values),
        None => missing::<T>(ctx),
    };
    ctx.restore_path(mark);
    value
}

fn missing<T: ArriModel>(ctx: &mut ValidationContext) -> Option<T> {
    let absent = T::absent();
    if absent.is_none() {
        ctx.push_error(DecodeErrorKind::MissingRequiredField);
    }
    absent
}

/// Strict structs reject query keys that name no field
pub fn begin_query_struct(
    query: &QueryParams,
    ctx: &mut ValidationContext,
    model: &ModelInfo,
    fields: &[FieldInfo],
) {
    if !model.strict {
        return;
    }
    let casing = ctx.key_casing();
    for key in query.keys() {
        if fields.iter().any(|field| field.key(casing) == key) {
            continue;
        }
        let mark = ctx.enter_instance_key(key);
        ctx.push_keyword_error(DecodeErrorKind::UnknownProperty, "strict");
        ctx.restore_path(mark);
    }
}

pub fn decode_query_field<T: ArriModel>(
    query: &QueryParams,
    ctx: &mut ValidationContext,
    info: &FieldInfo,
) -> Option<T> {
    let key = info.key(ctx.key_casing());
    let mark = ctx.enter_field(key, T::shape().is_optional());
    let value = match query.get(key) {
        Some(raw) => T::decode_query_value(raw, ctx),
        None => missing::<T>(ctx),
    };
    ctx.restore_path(mark);
    value
}

pub fn decode_query_enum_field<T: EnumString>(
    query: &QueryParams,
    ctx: &mut ValidationContext,
    info: &FieldInfo,
    values: &'static [&'static str],
) -> Option<T> {
    let key = info.key(ctx.key_casing());
    let mark = ctx.enter_field(key, T::shape().is_optional());
    let value = match query.get(key) {
        Some(raw) => T::decode_enum_query(raw, ctx, values),
        None => missing::<T>(ctx),
    };
    ctx.restore_path(mark);
    value
}

pub fn decode_enum_index(
    node: &Value,
    ctx: &mut ValidationContext,
    values: &[&str],
) -> Option<usize> {
    enum_node_index(node, ctx, values)
}

pub fn decode_enum_query_index(
    raw: &str,
    ctx: &mut ValidationContext,
    values: &[&str],
) -> Option<usize> {
    enum_index(raw, ctx, values)
}

/// Encode a variant whose payload is a named struct
pub fn encode_variant<P: ArriModel>(
    ctx: &mut EncodingContext,
    key: &'static str,
    tag: &'static str,
    payload: &P,
) -> Result<(), EncodeError> {
    let mark = ctx.enter_variant(tag);
    ctx.set_discriminator(key, tag);
    let result = payload.encode_json(ctx).and_then(|()| {
        if ctx.has_pending_discriminator() {
            Err(ctx.error(EncodeErrorKind::AllVariantsEmpty {
                key: key.to_string(),
            }))
        } else {
            Ok(())
        }
    });
    ctx.clear_discriminator();
    ctx.restore_path(mark);
    result
}

/// Encode a variant declared with named fields on the union itself
pub fn encode_inline_variant<F>(
    ctx: &mut EncodingContext,
    key: &'static str,
    tag: &'static str,
    fields: F,
) -> Result<(), EncodeError>
where
    F: FnOnce(&mut EncodingContext) -> Result<(), EncodeError>,
{
    let mark = ctx.enter_variant(tag);
    ctx.set_discriminator(key, tag);
    let result = encode_object(ctx, fields);
    ctx.clear_discriminator();
    ctx.restore_path(mark);
    result
}

fn encode_object<F>(ctx: &mut EncodingContext, fields: F) -> Result<(), EncodeError>
where
    F: FnOnce(&mut EncodingContext) -> Result<(), EncodeError>,
{
    let scope = ctx.begin_object()?;
    fields(ctx)?;
    ctx.end_object(scope);
    Ok(())
}

/// Read the discriminator value and return the index of its variant
pub fn discriminator_tag(
    node: &Value,
    ctx: &mut ValidationContext,
    key: &'static str,
    tags: &[&str],
) -> Option<usize> {
    let Value::Object(object) = node else {
        mismatch_at(ctx, "object", json_type_name(node), "discriminator");
        return None;
    };
    let mark = ctx.enter_instance_key(key);
    let index = match object.get(key) {
        Some(Value::String(tag)) => {
            let index = tags.iter().position(|candidate| *candidate == tag.as_str());
            if index.is_none() {
                ctx.push_keyword_error(
                    DecodeErrorKind::UnknownDiscriminator {
                        key: key.to_string(),
                        value: tag.clone(),
                        permitted: tags.iter().map(|t| t.to_string()).collect(),
                    },
                    "mapping",
                );
            }
            index
        }
        _ => {
            ctx.push_keyword_error(
                DecodeErrorKind::MissingDiscriminatorKey {
                    key: key.to_string(),
                },
                "discriminator",
            );
            None
        }
    };
    ctx.restore_path(mark);
    index
}

/// Decode the payload struct of the selected variant from the union's object
pub fn decode_variant<P: ArriModel>(
    node: &Value,
    ctx: &mut ValidationContext,
    key: &'static str,
    tag: &'static str,
) -> Option<P> {
    let mark = ctx.enter_variant(tag);
    ctx.set_discriminator_key(key);
    let value = P::decode_json(node, ctx);
    ctx.take_discriminator_key();
    ctx.restore_path(mark);
    value
}

/// Decode a variant declared with named fields on the union itself
pub fn decode_inline_variant<T, F>(
    node: &Value,
    ctx: &mut ValidationContext,
    model: &ModelInfo,
    key: &'static str,
    tag: &'static str,
    fields: &[FieldInfo],
    decode: F,
) -> Option<T>
where
    F: FnOnce(&JsonObject, &mut ValidationContext) -> Option<T>,
{
    let mark = ctx.enter_variant(tag);
    ctx.set_discriminator_key(key);
    let value = match begin_struct(node, ctx, model, fields) {
        Some(object) => {
            let value = decode(object, ctx);
            end_struct(ctx);
            value
        }
        None => None,
    };
    ctx.restore_path(mark);
    value
}
