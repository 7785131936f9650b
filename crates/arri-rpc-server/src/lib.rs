//! # Arri RPC Server
//!
//! Transport-independent procedure registry. Register async functions whose
//! params and responses derive [`ArriModel`](arri_codec::ArriModel), build
//! an [`App`], then hand it requests from whatever transport you run.
//!
//! ```rust,ignore
//! use arri_rpc_server::prelude::*;
//!
//! #[derive(ArriModel)]
//! struct GetUserParams {
//!     user_id: String,
//! }
//!
//! #[derive(ArriModel)]
//! struct User {
//!     id: String,
//!     name: String,
//! }
//!
//! let app = App::builder()
//!     .name("Users")
//!     .procedure("users.getUser", RpcOptions::get(), |params: GetUserParams, _ctx| async move {
//!         Ok(User { id: params.user_id, name: "Ada".into() })
//!     })
//!     .build()?;
//!
//! let body = app
//!     .dispatch(
//!         "/procedures/users/get-user",
//!         RpcPayload::query([("userId", "1")]),
//!         RpcContext::new(),
//!     )
//!     .await?;
//! ```
//!
//! The definition document is served on `{prefix}/__definition`.

pub mod app;
pub mod builder;
pub mod error;
pub mod handler;
pub mod path;

pub use app::{App, RpcResponse};
pub use builder::AppBuilder;
pub use error::{Result, ServerError};
pub use handler::{
    HandlerFuture, Procedure, RpcContext, RpcHandler, RpcOptions, RpcPayload, boxed_handler,
};

pub mod prelude {
    pub use crate::{App, AppBuilder, RpcContext, RpcOptions, RpcPayload, RpcResponse, ServerError};
    pub use arri_codec::prelude::*;
    pub use arri_protocol::{HttpMethod, RpcError, codes};
}
