//! Server plugins: cross-cutting concerns bolted onto a running server
//!
//! A [`ServerPlugin`] has two capabilities with explicit input types:
//! `register` installs a one-time process-lifetime capability, `execute`
//! produces a router of additional routes. Request-time gates are plain
//! [`PluginFn`](crate::core::plugin::PluginFn) closures, so they compose with
//! the generated CRUD pipelines directly.

use axum::Router;

use crate::core::error::Result;

pub mod guard;
pub mod jwt_auth;

pub use guard::{GuardConfig, verify_permissions};
pub use jwt_auth::{ExecuteAuth, JwtAuthPlugin, RegisterAuth, SignInConfig, SignUpConfig};

/// The generic plugin contract
pub trait ServerPlugin {
    type RegisterInput;
    type ExecuteInput;

    fn name(&self) -> &str;

    /// One-time, process-lifetime installation
    fn register(&mut self, input: Self::RegisterInput) -> Result<()>;

    /// Produce the plugin's routes
    fn execute(&self, input: Self::ExecuteInput) -> Result<Router>;
}
