//! # crudgen
//!
//! Convention-driven REST CRUD route synthesis for axum.
//!
//! ## Features
//!
//! - **Descriptor-Driven Routes**: declare which of the five canonical CRUD
//!   actions an entity exposes; the generator binds the handlers
//! - **Auto-Pluralization**: route names derived from the entity name
//!   (company → companies)
//! - **Typed Records**: ordered field maps with explicit unknown-field errors
//!   instead of duck-typed access
//! - **Composable Plugins**: ordered, sequential, fail-fast async transforms
//!   over a shared request context
//! - **Credential Issuance**: JWT sign-up/sign-in plugin with a bearer-token
//!   request gate and a permission guard
//! - **Pagination & Search**: page clamping, field projection and OR'd
//!   case-insensitive search out of the box
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crudgen::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let widgets = Arc::new(
//!         InMemoryRepository::new("widget", &["name", "sku", "price"]).with_unique(&["sku"]),
//!     );
//!
//!     let descriptor = RouteDescriptor::new()
//!         .list_many(ActionConfig::new().with_pagination().findable_fields(&["name", "sku"]))
//!         .create(ActionConfig::new().findable_fields(&["sku"]));
//!
//!     ServerBuilder::new()
//!         .register_crud(widgets, descriptor)?
//!         .serve("127.0.0.1:3000")
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod plugins;
pub mod repository;
pub mod routes;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{Error, FieldIssue, Result},
        field::{FieldFormat, FieldValue, parse_fields},
        naming::{NameResolver, RouteName},
        plugin::{PluginConnector, PluginFn, RequestContext},
        query::{Paginated, PaginationMeta, QueryParams, SortOrder},
        record::Record,
        schema::Schema,
    };

    // === Repository ===
    pub use crate::repository::{
        Condition, Criteria, DeleteAck, FindQuery, MatchRule, Repository, UpdateAck,
        search_criteria,
    };

    // === Routes ===
    pub use crate::routes::{
        ActionConfig, CrudGenerator, RouteDescriptor, RouteEntry, RouteMethod,
    };

    // === Plugins ===
    pub use crate::plugins::{
        ExecuteAuth, GuardConfig, JwtAuthPlugin, RegisterAuth, ServerPlugin, SignInConfig,
        SignUpConfig, verify_permissions,
    };

    // === Storage ===
    pub use crate::storage::InMemoryRepository;

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{ServerBuilder, init_tracing};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;

    // === Axum ===
    pub use axum::{
        Router,
        http::HeaderMap,
        routing::{delete, get, post, put},
    };
}
