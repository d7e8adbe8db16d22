//! The plugin pipeline: ordered async transforms over a request context
//!
//! Plugins run strictly sequentially in list order, each awaited to
//! completion before the next starts, because later plugins may depend on
//! context mutations made by earlier ones (a verified principal attached by a
//! token gate is read by a permission gate). The first failure aborts the
//! remaining chain and propagates unchanged.

use axum::http::HeaderMap;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::query::QueryParams;
use crate::core::record::Record;

/// The shared mutable context a plugin pipeline operates on
#[derive(Debug, Default, Clone)]
pub struct RequestContext {
    /// Path parameters (`id` for single-resource routes)
    pub params: HashMap<String, String>,
    /// Parsed common query parameters
    pub query: QueryParams,
    /// Raw query parameters as a record, for GET schema validation
    pub query_raw: Record,
    /// Parsed request body, when one was sent
    pub body: Option<Record>,
    /// Request headers
    pub headers: HeaderMap,
    /// Verified principal attached by a credential gate
    pub principal: Option<Record>,
    /// Result slot filled before output plugins run
    pub response: Option<serde_json::Value>,
}

impl RequestContext {
    /// The bearer token from the `Authorization` header, if any
    pub fn bearer_token(&self) -> Option<String> {
        self.headers
            .get(axum::http::header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
            .map(str::to_string)
    }
}

/// One async context transform; side-effecting only
pub type PluginFn =
    Arc<dyn for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, Result<()>> + Send + Sync>;

/// Runs a plugin pipeline sequentially with fail-fast propagation
pub struct PluginConnector;

impl PluginConnector {
    /// Run every plugin in order against the same context
    ///
    /// No-op for an empty pipeline. The first error aborts the rest and is
    /// returned unchanged.
    pub async fn connect(ctx: &mut RequestContext, plugins: &[PluginFn]) -> Result<()> {
        for plugin in plugins {
            plugin(ctx).await?;
        }
        Ok(())
    }
}
