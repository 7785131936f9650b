//! Type-erased procedures

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use arri_codec::{ArriModel, CodecOptions, Shape, TypeDefError, Validator};
use arri_protocol::{HttpMethod, IndexMap, RpcError, TypeDef, codes};
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

/// Request body as delivered by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcPayload {
    /// Raw JSON body; an empty body is accepted for `()` params
    Json(Vec<u8>),
    /// Decoded URL query pairs, repeated keys kept in order
    Query(Vec<(String, String)>),
}

impl RpcPayload {
    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        RpcPayload::Json(body.into())
    }

    pub fn query<Q, K, V>(pairs: Q) -> Self
    where
        Q: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RpcPayload::Query(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn empty() -> Self {
        RpcPayload::Json(Vec::new())
    }
}

/// Per-request information handed to the procedure
#[derive(Debug, Clone, Default)]
pub struct RpcContext {
    /// Dotted name of the procedure being called; set by the dispatcher
    pub procedure: String,
    /// Transport headers, lower-cased names
    pub headers: HashMap<String, String>,
    /// Free-form values set by the host, e.g. an authenticated user id
    pub metadata: HashMap<String, Value>,
}

impl RpcContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// A procedure with its codecs, callable without knowing its types
#[async_trait]
pub trait RpcHandler: Send + Sync {
    /// Decode the payload, run the procedure and encode its result
    async fn handle(&self, payload: RpcPayload, ctx: RpcContext) -> Result<Vec<u8>, RpcError>;

    fn method(&self) -> HttpMethod;

    fn input_shape(&self) -> Shape;

    fn output_shape(&self) -> Shape;

    fn input_def(&self) -> &TypeDef;

    fn output_def(&self) -> &TypeDef;

    /// Definitions of types closed with a `ref` in either schema
    fn definitions(&self) -> IndexMap<String, TypeDef>;
}

pub type HandlerFuture<O> = BoxFuture<'static, Result<O, RpcError>>;

/// A user function bound to the validator of its params and result
pub struct Procedure<I, O, F> {
    validator: Validator<I, O>,
    method: HttpMethod,
    handler: F,
}

impl<I, O, F> Procedure<I, O, F>
where
    I: ArriModel + Send + 'static,
    O: ArriModel + Send + 'static,
    F: Fn(I, RpcContext) -> HandlerFuture<O> + Send + Sync + 'static,
{
    pub fn new(options: CodecOptions, method: HttpMethod, handler: F) -> Result<Self, TypeDefError> {
        Ok(Self {
            validator: Validator::new(options)?,
            method,
            handler,
        })
    }

    pub fn validator(&self) -> &Validator<I, O> {
        &self.validator
    }

    fn decode(&self, payload: RpcPayload, procedure: &str) -> Result<I, RpcError> {
        match payload {
            RpcPayload::Json(body) => Ok(self.validator.decode_json(&body)?),
            RpcPayload::Query(pairs) if self.method == HttpMethod::Get => {
                Ok(self.validator.decode_query(pairs)?)
            }
            RpcPayload::Query(_) => Err(RpcError::new(
                codes::METHOD_NOT_ALLOWED,
                format!(
                    "Procedure '{procedure}' expects a JSON body on {}",
                    self.method.as_str().to_ascii_uppercase()
                ),
            )),
        }
    }
}

impl<I, O, F> fmt::Debug for Procedure<I, O, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Procedure")
            .field("validator", &self.validator)
            .field("method", &self.method)
            .finish()
    }
}

#[async_trait]
impl<I, O, F> RpcHandler for Procedure<I, O, F>
where
    I: ArriModel + Send + 'static,
    O: ArriModel + Send + 'static,
    F: Fn(I, RpcContext) -> HandlerFuture<O> + Send + Sync + 'static,
{
    async fn handle(&self, payload: RpcPayload, ctx: RpcContext) -> Result<Vec<u8>, RpcError> {
        let input = self.decode(payload, &ctx.procedure)?;
        let procedure = ctx.procedure.clone();
        let output = (self.handler)(input, ctx).await?;
        self.validator.encode_json(&output).map_err(|error| {
            tracing::error!(
                procedure = %procedure,
                instance_path = %error.instance_path,
                "failed to encode response: {}",
                error.kind
            );
            RpcError::from(error)
        })
    }

    fn method(&self) -> HttpMethod {
        self.method
    }

    fn input_shape(&self) -> Shape {
        self.validator.input_shape()
    }

    fn output_shape(&self) -> Shape {
        self.validator.output_shape()
    }

    fn input_def(&self) -> &TypeDef {
        self.validator.input_def()
    }

    fn output_def(&self) -> &TypeDef {
        self.validator.output_def()
    }

    fn definitions(&self) -> IndexMap<String, TypeDef> {
        self.validator.definitions()
    }
}

/// Box any async function into the shape [`Procedure`] stores
pub fn boxed_handler<I, O, F, Fut>(
    handler: F,
) -> impl Fn(I, RpcContext) -> HandlerFuture<O> + Send + Sync + 'static
where
    F: Fn(I, RpcContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, RpcError>> + Send + 'static,
{
    move |input: I, ctx: RpcContext| -> HandlerFuture<O> { Box::pin(handler(input, ctx)) }
}

/// Options of one registered procedure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcOptions {
    pub method: HttpMethod,
    pub description: Option<String>,
    pub deprecated: bool,
    /// Transport adapters the procedure is exposed on
    pub transports: Vec<String>,
}

impl Default for RpcOptions {
    fn default() -> Self {
        Self {
            method: HttpMethod::Post,
            description: None,
            deprecated: false,
            transports: vec!["http".to_string()],
        }
    }
}

impl RpcOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::default()
    }

    pub fn get() -> Self {
        Self::default().method(HttpMethod::Get)
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn transports<I, S>(mut self, transports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transports = transports.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    type Counts = BTreeMap<String, u32>;

    fn counter() -> Procedure<
        Counts,
        Vec<String>,
        impl Fn(Counts, RpcContext) -> HandlerFuture<Vec<String>> + Send + Sync + 'static,
    > {
        Procedure::new(
            CodecOptions::default(),
            HttpMethod::Post,
            boxed_handler(|counts: Counts, _ctx: RpcContext| async move {
                Ok(counts
                    .into_iter()
                    .map(|(key, count)| format!("{key}={count}"))
                    .collect::<Vec<String>>())
            }),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_handle_json_payload() {
        let procedure = counter();
        let body = procedure
            .handle(RpcPayload::json(r#"{"b":2,"a":1}"#), RpcContext::new())
            .await
            .unwrap();
        assert_eq!(body, br#"["a=1","b=2"]"#);
    }

    #[tokio::test]
    async fn test_invalid_payload_is_bad_request() {
        let procedure = counter();
        let err = procedure
            .handle(RpcPayload::json(r#"{"a":-1}"#), RpcContext::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::BAD_REQUEST);
        assert_eq!(err.validation_errors()[0].instance_path, "/a");
    }

    #[tokio::test]
    async fn test_query_payload_needs_get() {
        let procedure = counter();
        let err = procedure
            .handle(RpcPayload::query([("a", "1")]), RpcContext::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_context_headers_are_case_insensitive() {
        let ctx = RpcContext::new().with_header("X-Request-Id", "42");
        assert_eq!(ctx.header("x-request-id"), Some("42"));
        assert_eq!(ctx.header("X-REQUEST-ID"), Some("42"));
    }

    #[test]
    fn test_options_builder() {
        let options = RpcOptions::get()
            .description("Fetch a user")
            .deprecated()
            .transports(["http", "ws"]);
        assert_eq!(options.method, HttpMethod::Get);
        assert_eq!(options.description.as_deref(), Some("Fetch a user"));
        assert!(options.deprecated);
        assert_eq!(options.transports, ["http", "ws"]);
        assert_eq!(RpcOptions::default().transports, ["http"]);
    }
}
