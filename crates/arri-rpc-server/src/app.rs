//! Assembled application: procedure registry and dispatcher

use std::collections::HashMap;
use std::sync::Arc;

use arri_codec::CodecOptions;
use arri_protocol::{AppDefinition, AppInfo, IndexMap, RpcDef, RpcError, TypeDef};

use crate::builder::AppBuilder;
use crate::error::Result;
use crate::handler::{RpcContext, RpcHandler, RpcPayload};
use crate::path::definition_path;

pub(crate) struct RegisteredProcedure {
    pub(crate) def: RpcDef,
    pub(crate) handler: Arc<dyn RpcHandler>,
}

/// Immutable set of procedures, safe to share across request tasks
pub struct App {
    info: AppInfo,
    rpc_route_prefix: String,
    codec_options: CodecOptions,
    procedures: IndexMap<String, RegisteredProcedure>,
    /// path -> procedure name
    paths: HashMap<String, String>,
    definitions: IndexMap<String, TypeDef>,
}

/// Status and body ready to hand to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl RpcResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub(crate) fn new(
        info: AppInfo,
        rpc_route_prefix: String,
        codec_options: CodecOptions,
        procedures: IndexMap<String, RegisteredProcedure>,
        paths: HashMap<String, String>,
        definitions: IndexMap<String, TypeDef>,
    ) -> Self {
        Self {
            info,
            rpc_route_prefix,
            codec_options,
            procedures,
            paths,
            definitions,
        }
    }

    pub fn info(&self) -> &AppInfo {
        &self.info
    }

    pub fn rpc_route_prefix(&self) -> &str {
        &self.rpc_route_prefix
    }

    pub fn codec_options(&self) -> CodecOptions {
        self.codec_options
    }

    pub fn procedure(&self, name: &str) -> Option<&RpcDef> {
        self.procedures.get(name).map(|registered| &registered.def)
    }

    /// Procedure names in registration order
    pub fn procedure_names(&self) -> impl Iterator<Item = &str> {
        self.procedures.keys().map(String::as_str)
    }

    pub fn definitions(&self) -> &IndexMap<String, TypeDef> {
        &self.definitions
    }

    /// The full definition document
    ///
    /// Procedures keep registration order and definitions keep first-seen
    /// order, so the same registrations always give the same document.
    pub fn definition(&self) -> AppDefinition {
        let info = (self.info != AppInfo::default()).then(|| self.info.clone());
        let mut definition = AppDefinition::new(info);
        definition.procedures = self
            .procedures
            .iter()
            .map(|(name, registered)| (name.clone(), registered.def.clone()))
            .collect();
        definition.definitions = self.definitions.clone();
        definition
    }

    pub fn definition_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.definition())?)
    }

    /// Path the definition document is served on
    pub fn definition_path(&self) -> String {
        definition_path(&self.rpc_route_prefix)
    }

    /// Look up a procedure by dotted name or by path
    fn resolve(&self, target: &str) -> Option<(&str, &RegisteredProcedure)> {
        let name = match self.procedures.get_key_value(target) {
            Some((name, _)) => name.as_str(),
            None => self.paths.get(target)?.as_str(),
        };
        self.procedures
            .get(name)
            .map(|registered| (name, registered))
    }

    /// Decode, run and encode one call.
    ///
    /// `target` is a procedure name (`users.getUser`), its path
    /// (`/procedures/users/get-user`) or the definition path.
    pub async fn dispatch(
        &self,
        target: &str,
        payload: RpcPayload,
        mut ctx: RpcContext,
    ) -> std::result::Result<Vec<u8>, RpcError> {
        if target == self.definition_path() {
            return self.definition_json().map(String::into_bytes).map_err(|error| {
                tracing::error!("failed to serialize app definition: {error}");
                RpcError::internal("Failed to serialize app definition")
            });
        }

        let Some((name, registered)) = self.resolve(target) else {
            tracing::debug!(target = %target, "unknown procedure");
            return Err(RpcError::not_found(format!("Procedure '{target}' not found")));
        };

        ctx.procedure = name.to_string();
        tracing::debug!(procedure = %name, "dispatching");
        let result = registered.handler.handle(payload, ctx).await;
        if let Err(error) = &result {
            if error.is_client_error() {
                tracing::debug!(procedure = %name, code = error.code, "{}", error.message);
            } else {
                tracing::warn!(procedure = %name, code = error.code, "{}", error.message);
            }
        }
        result
    }

    /// [`App::dispatch`] folded into a status and a JSON body
    pub async fn respond(&self, target: &str, payload: RpcPayload, ctx: RpcContext) -> RpcResponse {
        match self.dispatch(target, payload, ctx).await {
            Ok(body) => RpcResponse { status: 200, body },
            Err(error) => RpcResponse {
                status: error.code,
                body: serde_json::to_vec(&error).unwrap_or_default(),
            },
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("info", &self.info)
            .field("rpc_route_prefix", &self.rpc_route_prefix)
            .field("procedures", &self.procedures.keys().collect::<Vec<_>>())
            .field("definitions", &self.definitions.keys().collect::<Vec<_>>())
            .finish()
    }
}
