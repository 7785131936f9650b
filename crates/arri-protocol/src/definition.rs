//! Application definition document
//!
//! The document served at `${rpcRoutePrefix}/__definition`: app info, every
//! procedure in registration order and the ordered registry of named types.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::TypeDef;

/// Version of the definition document format
pub const SCHEMA_VERSION: &str = "0.0.7";

/// Default prefix for procedure paths
pub const DEFAULT_RPC_ROUTE_PREFIX: &str = "/procedures";

/// Casing rule applied to struct field names on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KeyCasing {
    #[default]
    #[serde(rename = "camelCase")]
    Camel,
    #[serde(rename = "PascalCase")]
    Pascal,
    #[serde(rename = "snake_case")]
    Snake,
}

impl KeyCasing {
    /// Position of this casing in a `[camel, pascal, snake]` key table
    pub fn index(&self) -> usize {
        match self {
            KeyCasing::Camel => 0,
            KeyCasing::Pascal => 1,
            KeyCasing::Snake => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyCasing::Camel => "camelCase",
            KeyCasing::Pascal => "PascalCase",
            KeyCasing::Snake => "snake_case",
        }
    }
}

impl fmt::Display for KeyCasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown key casing '{0}', expected camelCase, PascalCase or snake_case")]
pub struct UnknownKeyCasing(pub String);

impl FromStr for KeyCasing {
    type Err = UnknownKeyCasing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "camelCase" | "camel" => Ok(KeyCasing::Camel),
            "PascalCase" | "pascal" => Ok(KeyCasing::Pascal),
            "snake_case" | "snake" => Ok(KeyCasing::Snake),
            other => Err(UnknownKeyCasing(other.to_string())),
        }
    }
}

/// HTTP method a procedure is exposed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single procedure in the definition document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcDef {
    pub path: String,
    pub method: HttpMethod,
    /// `metadata.id` of the params type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// `metadata.id` of the response type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub is_event_stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deprecated: Option<bool>,
    pub transports: Vec<String>,
}

/// Application info block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The complete, deterministic application schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDefinition {
    pub schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<AppInfo>,
    pub procedures: IndexMap<String, RpcDef>,
    pub definitions: IndexMap<String, TypeDef>,
}

impl AppDefinition {
    pub fn new(info: Option<AppInfo>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            info,
            procedures: IndexMap::new(),
            definitions: IndexMap::new(),
        }
    }

    /// Names of `ref` targets that have no entry in `definitions`
    pub fn unresolved_refs(&self) -> Vec<String> {
        let mut refs = Vec::new();
        for def in self.definitions.values() {
            def.collect_refs(&mut refs);
        }
        let mut missing: Vec<String> = refs
            .into_iter()
            .filter(|name| !self.definitions.contains_key(*name))
            .map(str::to_string)
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}
