//! Per-procedure bundle of decoders and encoder

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use arri_protocol::{IndexMap, KeyCasing, TypeDef};
use serde_json::Value;

use crate::cache::{DerivedSchema, derived_schema};
use crate::context::{EncodingContext, QueryParams, ValidationContext};
use crate::error::{DecodeError, DecodeErrorKind, EncodeError, TypeDefError, ValidationErrors};
use crate::model::ArriModel;
use crate::options::CodecOptions;
use crate::shape::Shape;
use crate::wire::value_depth;

/// Decodes `I` from the wire and encodes `O` onto it.
///
/// Building a validator derives (or fetches from the cache) both schemas,
/// so schema errors surface at registration rather than per request.
pub struct Validator<I, O> {
    options: CodecOptions,
    input: Arc<DerivedSchema>,
    output: Arc<DerivedSchema>,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O> Clone for Validator<I, O> {
    fn clone(&self) -> Self {
        Self {
            options: self.options,
            input: Arc::clone(&self.input),
            output: Arc::clone(&self.output),
            _types: PhantomData,
        }
    }
}

impl<I, O> fmt::Debug for Validator<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("options", &self.options)
            .field("input", &self.input.id())
            .field("output", &self.output.id())
            .finish()
    }
}

impl<I, O> Validator<I, O>
where
    I: ArriModel + 'static,
    O: ArriModel + 'static,
{
    pub fn new(options: CodecOptions) -> Result<Self, TypeDefError> {
        Ok(Self {
            options,
            input: derived_schema::<I>(options.key_casing)?,
            output: derived_schema::<O>(options.key_casing)?,
            _types: PhantomData,
        })
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn input_shape(&self) -> Shape {
        self.input.shape
    }

    pub fn output_shape(&self) -> Shape {
        self.output.shape
    }

    pub fn input_def(&self) -> &TypeDef {
        &self.input.type_def
    }

    pub fn output_def(&self) -> &TypeDef {
        &self.output.type_def
    }

    /// Definitions of every recursively referenced type in either schema
    pub fn definitions(&self) -> IndexMap<String, TypeDef> {
        let mut definitions = self.input.definitions.clone();
        for (name, def) in &self.output.definitions {
            definitions
                .entry(name.clone())
                .or_insert_with(|| def.clone());
        }
        definitions
    }

    /// Parse and decode a JSON body
    pub fn decode_json(&self, bytes: &[u8]) -> Result<I, ValidationErrors> {
        decode_json_with::<I>(bytes, &self.options)
    }

    /// Decode an already parsed JSON value
    pub fn decode_value(&self, value: &Value) -> Result<I, ValidationErrors> {
        decode_value_with::<I>(value, &self.options)
    }

    /// Decode URL query parameters into a flat struct
    pub fn decode_query<Q, K, V>(&self, pairs: Q) -> Result<I, ValidationErrors>
    where
        Q: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let query = QueryParams::from_pairs(pairs);
        let mut ctx = ValidationContext::new(&self.options);
        let decoded = I::decode_query(&query, &mut ctx);
        finish(decoded, ctx)
    }

    pub fn encode_json(&self, value: &O) -> Result<Vec<u8>, EncodeError> {
        encode_json_with(value, &self.options)
    }

    pub fn encode_to_string(&self, value: &O) -> Result<String, EncodeError> {
        self.encode_json(value)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Build the validator for a procedure taking `I` and returning `O`
pub fn build_validator<I, O>(options: CodecOptions) -> Result<Validator<I, O>, TypeDefError>
where
    I: ArriModel + 'static,
    O: ArriModel + 'static,
{
    Validator::new(options)
}

/// The schema of `T`, plus the definitions its `ref`s point to
pub fn derive_typedef<T: ArriModel + 'static>(
    key_casing: KeyCasing,
) -> Result<Arc<DerivedSchema>, TypeDefError> {
    derived_schema::<T>(key_casing)
}

/// Encode a single value
pub fn encode_json_with<T: ArriModel>(
    value: &T,
    options: &CodecOptions,
) -> Result<Vec<u8>, EncodeError> {
    let mut ctx = EncodingContext::new(options);
    if let Err(error) = value.encode_json(&mut ctx) {
        tracing::debug!(
            instance_path = %error.instance_path,
            "encoding failed: {}",
            error.kind
        );
        return Err(error);
    }
    Ok(ctx.into_bytes())
}

/// Parse and decode a single value
pub fn decode_json_with<T: ArriModel>(
    bytes: &[u8],
    options: &CodecOptions,
) -> Result<T, ValidationErrors> {
    let value = match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => value,
        Err(_) if T::shape() == Shape::Empty && is_blank(bytes) => Value::Null,
        Err(err) => {
            // serde_json's own recursion guard trips before ours on very deep input
            let kind = if err.to_string().contains("recursion limit") {
                DecodeErrorKind::MaxDepthExceeded {
                    max: options.max_depth,
                }
            } else {
                DecodeErrorKind::InvalidJson(err.to_string())
            };
            return Err(root_error(kind));
        }
    };
    decode_value_with(&value, options)
}

/// Decode a single parsed value
pub fn decode_value_with<T: ArriModel>(
    value: &Value,
    options: &CodecOptions,
) -> Result<T, ValidationErrors> {
    if value_depth(value) > options.max_depth {
        return Err(root_error(DecodeErrorKind::MaxDepthExceeded {
            max: options.max_depth,
        }));
    }
    let mut ctx = ValidationContext::new(options);
    let decoded = T::decode_json(value, &mut ctx);
    finish(decoded, ctx)
}

fn finish<T>(decoded: Option<T>, ctx: ValidationContext) -> Result<T, ValidationErrors> {
    match decoded {
        Some(value) if !ctx.has_errors() => Ok(value),
        _ => {
            let mut errors = ctx.into_errors();
            if errors.is_empty() {
                errors.push(DecodeError {
                    kind: DecodeErrorKind::Custom("Invalid input".to_string()),
                    instance_path: String::new(),
                    schema_path: String::new(),
                });
            }
            Err(ValidationErrors(errors))
        }
    }
}

fn root_error(kind: DecodeErrorKind) -> ValidationErrors {
    ValidationErrors(vec![DecodeError {
        kind,
        instance_path: String::new(),
        schema_path: String::new(),
    }])
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}
