//! Core module containing fundamental types and helpers for the engine

pub mod error;
pub mod field;
pub mod naming;
pub mod plugin;
pub mod query;
pub mod record;
pub mod schema;

pub use error::{Error, FieldIssue, Result};
pub use field::{FieldFormat, FieldValue, parse_fields};
pub use naming::{NameResolver, RouteName};
pub use plugin::{PluginConnector, PluginFn, RequestContext};
pub use query::{Paginated, PaginationMeta, QueryParams, SortOrder, resolve_pagination};
pub use record::Record;
pub use schema::Schema;
