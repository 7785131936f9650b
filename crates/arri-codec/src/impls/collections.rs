use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use arri_protocol::TypeDef;
use indexmap::IndexMap;
use serde_json::Value;

use super::mismatch_at;
use crate::context::{EncodingContext, TypeDefContext, ValidationContext};
use crate::error::{EncodeError, TypeDefError};
use crate::model::ArriModel;
use crate::shape::Shape;
use crate::wire::json_type_name;

impl<T: ArriModel> ArriModel for Vec<T> {
    fn shape() -> Shape {
        Shape::Array
    }

    fn type_def(ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
        let mark = ctx.paths.mark();
        ctx.paths.push_schema("elements");
        let element = T::type_def(ctx);
        ctx.paths.restore(mark);
        Ok(TypeDef::elements(element?))
    }

    fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
        let scope = ctx.begin_array()?;
        for (index, item) in self.iter().enumerate() {
            ctx.write_separator();
            let mark = ctx.enter_element(index);
            let result = item.encode_json(ctx);
            ctx.restore_path(mark);
            result?;
        }
        ctx.end_array(scope);
        Ok(())
    }

    fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
        let Value::Array(items) = node else {
            mismatch_at(ctx, "array", json_type_name(node), "elements");
            return None;
        };
        if !ctx.enter() {
            return None;
        }
        let mut decoded = Vec::with_capacity(items.len());
        let mut complete = true;
        for (index, item) in items.iter().enumerate() {
            if ctx.is_halted() {
                complete = false;
                break;
            }
            let mark = ctx.enter_element(index);
            match T::decode_json(item, ctx) {
                Some(value) => decoded.push(value),
                None => complete = false,
            }
            ctx.restore_path(mark);
        }
        ctx.leave();
        complete.then_some(decoded)
    }
}

fn map_type_def<T: ArriModel>(ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
    let mark = ctx.paths.mark();
    ctx.paths.push_schema("values");
    let value = T::type_def(ctx);
    ctx.paths.restore(mark);
    Ok(TypeDef::values(value?))
}

/// Keys are emitted in ascending byte order whatever the map's own order
fn encode_entries<'a, T, I>(entries: I, ctx: &mut EncodingContext) -> Result<(), EncodeError>
where
    T: ArriModel + 'a,
    I: Iterator<Item = (&'a String, &'a T)>,
{
    let mut entries: Vec<_> = entries.collect();
    entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let scope = ctx.begin_object()?;
    for (key, value) in entries {
        ctx.write_key(key);
        let mark = ctx.enter_value(key);
        let result = value.encode_json(ctx);
        ctx.restore_path(mark);
        result?;
    }
    ctx.end_object(scope);
    Ok(())
}

fn decode_entries<T, F>(node: &Value, ctx: &mut ValidationContext, mut insert: F) -> bool
where
    T: ArriModel,
    F: FnMut(String, T),
{
    let Value::Object(object) = node else {
        mismatch_at(ctx, "object", json_type_name(node), "values");
        return false;
    };
    if !ctx.enter() {
        return false;
    }
    let mut complete = true;
    for (key, item) in object {
        if ctx.is_halted() {
            complete = false;
            break;
        }
        let mark = ctx.enter_value(key);
        match T::decode_json(item, ctx) {
            Some(value) => insert(key.clone(), value),
            None => complete = false,
        }
        ctx.restore_path(mark);
    }
    ctx.leave();
    complete
}

impl<T: ArriModel> ArriModel for BTreeMap<String, T> {
    fn shape() -> Shape {
        Shape::Map
    }

    fn type_def(ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
        map_type_def::<T>(ctx)
    }

    fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
        encode_entries(self.iter(), ctx)
    }

    fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
        let mut decoded = BTreeMap::new();
        decode_entries(node, ctx, |key, value| {
            decoded.insert(key, value);
        })
        .then_some(decoded)
    }
}

impl<T: ArriModel, S: BuildHasher + Default> ArriModel for HashMap<String, T, S> {
    fn shape() -> Shape {
        Shape::Map
    }

    fn type_def(ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
        map_type_def::<T>(ctx)
    }

    fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
        encode_entries(self.iter(), ctx)
    }

    fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
        let mut decoded = HashMap::default();
        decode_entries(node, ctx, |key, value| {
            decoded.insert(key, value);
        })
        .then_some(decoded)
    }
}

impl<T: ArriModel, S: BuildHasher + Default> ArriModel for IndexMap<String, T, S> {
    fn shape() -> Shape {
        Shape::Map
    }

    fn type_def(ctx: &mut TypeDefContext) -> Result<TypeDef, TypeDefError> {
        map_type_def::<T>(ctx)
    }

    fn encode_json(&self, ctx: &mut EncodingContext) -> Result<(), EncodeError> {
        encode_entries(self.iter(), ctx)
    }

    fn decode_json(node: &Value, ctx: &mut ValidationContext) -> Option<Self> {
        let mut decoded = IndexMap::default();
        decode_entries(node, ctx, |key, value| {
            decoded.insert(key, value);
        })
        .then_some(decoded)
    }
}
