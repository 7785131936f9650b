use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Well-known status codes carried by [`RpcError`]
pub mod codes {
    pub const BAD_REQUEST: u32 = 400;
    pub const UNAUTHORIZED: u32 = 401;
    pub const FORBIDDEN: u32 = 403;
    pub const NOT_FOUND: u32 = 404;
    pub const METHOD_NOT_ALLOWED: u32 = 405;
    pub const INTERNAL_SERVER_ERROR: u32 = 500;
}

/// A single decoding problem, located in both the value and the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub message: String,
    /// JSON pointer into the decoded value
    pub instance_path: String,
    /// JSON pointer into the [`TypeDef`](crate::TypeDef)
    pub schema_path: String,
}

impl ValidationError {
    pub fn new(
        message: impl Into<String>,
        instance_path: impl Into<String>,
        schema_path: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            instance_path: instance_path.into(),
            schema_path: schema_path.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{} at {}", self.message, self.instance_path)
        }
    }
}

/// User-visible error object: `{code, message, data?, stack?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: u32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl RpcError {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            stack: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(codes::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(codes::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL_SERVER_ERROR, message)
    }

    /// A 400 error whose `data` is the validation error array
    pub fn validation(errors: &[ValidationError]) -> Self {
        let data = serde_json::to_value(errors).unwrap_or(Value::Array(Vec::new()));
        let message = match errors {
            [single] => format!("Invalid input: {}", single),
            _ => "Invalid input".to_string(),
        };
        Self::bad_request(message).with_data(data)
    }

    /// The validation errors carried in `data`, if any
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        self.data
            .as_ref()
            .and_then(|data| serde_json::from_value(data.clone()).ok())
            .unwrap_or_default()
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.code)
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPC Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}
