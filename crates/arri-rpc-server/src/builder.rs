//! App builder
//!
//! Procedures are collected first and compiled in `build()`, once the codec
//! options are final. Every registration problem is collected; `build()`
//! fails with all of them at once.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use arri_codec::{ArriModel, CodecOptions, Shape, TypeDefError};
use arri_protocol::{
    AppInfo, DEFAULT_RPC_ROUTE_PREFIX, HttpMethod, IndexMap, KeyCasing, RpcDef, RpcError, TypeDef,
};

use crate::app::{App, RegisteredProcedure};
use crate::error::{Result, ServerError};
use crate::handler::{Procedure, RpcContext, RpcHandler, RpcOptions, boxed_handler};
use crate::path::{normalize_prefix, procedure_path};

type HandlerFactory =
    Box<dyn FnOnce(CodecOptions) -> std::result::Result<Arc<dyn RpcHandler>, TypeDefError> + Send>;

struct Registration {
    name: String,
    options: RpcOptions,
    factory: HandlerFactory,
}

/// Builder for [`App`]
pub struct AppBuilder {
    info: AppInfo,
    rpc_route_prefix: String,
    codec_options: CodecOptions,
    registrations: Vec<Registration>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            info: AppInfo::default(),
            rpc_route_prefix: DEFAULT_RPC_ROUTE_PREFIX.to_string(),
            codec_options: CodecOptions::default(),
            registrations: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.info.name = Some(name.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.info.version = Some(version.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.info.description = Some(description.into());
        self
    }

    /// Prefix of every procedure path; defaults to `/procedures`
    pub fn rpc_route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.rpc_route_prefix = prefix.into();
        self
    }

    pub fn key_casing(mut self, key_casing: KeyCasing) -> Self {
        self.codec_options.key_casing = key_casing;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.codec_options.max_depth = max_depth;
        self
    }

    pub fn codec_options(mut self, options: CodecOptions) -> Self {
        self.codec_options = options;
        self
    }

    /// Register an async function as the procedure `name`.
    ///
    /// `name` is dot-separated (`users.getUser`); each segment becomes a
    /// kebab-case path segment.
    pub fn procedure<I, O, F, Fut>(
        mut self,
        name: impl Into<String>,
        options: RpcOptions,
        handler: F,
    ) -> Self
    where
        I: ArriModel + Send + 'static,
        O: ArriModel + Send + 'static,
        F: Fn(I, RpcContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<O, RpcError>> + Send + 'static,
    {
        let method = options.method;
        let factory: HandlerFactory = Box::new(move |codec_options| {
            let procedure = Procedure::new(codec_options, method, boxed_handler(handler))?;
            Ok(Arc::new(procedure) as Arc<dyn RpcHandler>)
        });
        self.registrations.push(Registration {
            name: name.into(),
            options,
            factory,
        });
        self
    }

    pub fn build(self) -> Result<App> {
        let mut errors = Vec::new();
        let prefix = match normalize_prefix(&self.rpc_route_prefix) {
            Ok(prefix) => prefix,
            Err(reason) => {
                errors.push(ServerError::InvalidPrefix {
                    prefix: self.rpc_route_prefix.clone(),
                    reason,
                });
                String::new()
            }
        };

        let mut procedures: IndexMap<String, RegisteredProcedure> = IndexMap::new();
        let mut paths: HashMap<String, String> = HashMap::new();
        let mut definitions = DefinitionSet::default();

        for Registration {
            name,
            options,
            factory,
        } in self.registrations
        {
            if procedures.contains_key(&name) {
                errors.push(ServerError::DuplicateName { name });
                continue;
            }
            let path = match procedure_path(&prefix, &name) {
                Ok(path) => path,
                Err(reason) => {
                    errors.push(ServerError::InvalidName { name, reason });
                    continue;
                }
            };
            if let Some(first) = paths.get(&path) {
                errors.push(ServerError::DuplicatePath {
                    path,
                    first: first.clone(),
                    second: name,
                });
                continue;
            }
            let handler = match factory(self.codec_options) {
                Ok(handler) => handler,
                Err(source) => {
                    errors.push(ServerError::Schema {
                        procedure: name,
                        source,
                    });
                    continue;
                }
            };

            let shape_errors = check_shapes(&name, options.method, handler.as_ref());
            if !shape_errors.is_empty() {
                errors.extend(shape_errors);
                continue;
            }

            let input = register_root(&mut definitions, handler.input_shape(), handler.input_def(), &mut errors);
            let output =
                register_root(&mut definitions, handler.output_shape(), handler.output_def(), &mut errors);
            for (id, def) in handler.definitions() {
                if let Err(error) = definitions.register(&id, &def) {
                    errors.push(error);
                }
            }

            tracing::debug!(
                procedure = %name,
                path = %path,
                method = %options.method,
                "registered procedure"
            );

            let def = RpcDef {
                path: path.clone(),
                method: options.method,
                input,
                output,
                is_event_stream: false,
                description: options.description,
                is_deprecated: options.deprecated.then_some(true),
                transports: options.transports,
            };
            paths.insert(path, name.clone());
            procedures.insert(name, RegisteredProcedure { def, handler });
        }

        if !errors.is_empty() {
            return Err(ServerError::Registration(errors));
        }

        Ok(App::new(
            self.info,
            prefix,
            self.codec_options,
            procedures,
            paths,
            definitions.definitions,
        ))
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn check_shapes(name: &str, method: HttpMethod, handler: &dyn RpcHandler) -> Vec<ServerError> {
    let mut errors = Vec::new();
    for (role, shape) in [
        ("params", handler.input_shape()),
        ("response", handler.output_shape()),
    ] {
        if !shape.is_procedure_type() {
            errors.push(ServerError::UnnamedType {
                procedure: name.to_string(),
                role,
                shape: shape.name(),
            });
        }
    }
    let input = handler.input_shape();
    if method == HttpMethod::Get && input == Shape::Discriminator {
        errors.push(ServerError::QueryInput {
            procedure: name.to_string(),
            shape: input.name(),
        });
    }
    errors
}

/// Register a procedure's params or response type; `()` has no id
fn register_root(
    definitions: &mut DefinitionSet,
    shape: Shape,
    def: &TypeDef,
    errors: &mut Vec<ServerError>,
) -> Option<String> {
    if shape == Shape::Empty {
        return None;
    }
    let id = def.id()?.to_string();
    if let Err(error) = definitions.register(&id, def) {
        errors.push(error);
    }
    Some(id)
}

/// Definitions merged across procedures, first-seen order
#[derive(Debug, Default)]
struct DefinitionSet {
    definitions: IndexMap<String, TypeDef>,
    /// Ids already reported as conflicting
    conflicts: HashSet<String>,
}

impl DefinitionSet {
    /// An id bound to two different schemas is reported the first time only
    fn register(&mut self, id: &str, def: &TypeDef) -> Result<()> {
        match self.definitions.get(id) {
            Some(existing) if existing != def => {
                if self.conflicts.insert(id.to_string()) {
                    Err(ServerError::DefinitionConflict { id: id.to_string() })
                } else {
                    Ok(())
                }
            }
            Some(_) => Ok(()),
            None => {
                self.definitions.insert(id.to_string(), def.clone());
                Ok(())
            }
        }
    }
}
