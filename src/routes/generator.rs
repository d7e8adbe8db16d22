//! The CRUD generator engine
//!
//! Registration expands a [`RouteDescriptor`] into route entries and binds
//! one axum handler per entry. Every handler runs the same fixed per-request
//! algorithm: parse the common query parameters, run the input plugin
//! pipeline, execute the read or write branch against the repository, then
//! run the output plugin pipeline over the produced response.

use axum::body::Bytes;
use axum::extract::{Query, RawPathParams};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{Error, Result};
use crate::core::field::FieldValue;
use crate::core::naming::NameResolver;
use crate::core::plugin::{PluginConnector, RequestContext};
use crate::core::query::{Paginated, QueryParams, resolve_pagination};
use crate::core::record::Record;
use crate::repository::{Condition, Criteria, FindQuery, MatchRule, Repository, search_criteria};
use crate::routes::descriptor::{RouteDescriptor, RouteEntry, RouteMethod};

/// Synthesizes REST CRUD routers from descriptors
pub struct CrudGenerator;

impl CrudGenerator {
    /// Expand the descriptor and bind one handler per route entry
    ///
    /// Names come from the descriptor when supplied, otherwise they are
    /// derived from the repository's entity name. Failing to resolve either
    /// name is a configuration error.
    pub fn generate(
        repository: Arc<dyn Repository>,
        descriptor: RouteDescriptor,
    ) -> Result<Router> {
        let names = match &descriptor.name {
            Some(names) => names.clone(),
            None => NameResolver::resolve(repository.entity_name()),
        };
        if names.singular.is_empty() || names.plural.is_empty() {
            return Err(Error::BadRequest(format!(
                "Cannot derive route names for entity '{}'",
                repository.entity_name()
            )));
        }

        let mut router = Router::new();
        for entry in descriptor.expand(&names) {
            let path = entry.axum_path();
            let method = entry.method;
            tracing::debug!(method = method.as_str(), path = %path, "registering route");

            let entry = Arc::new(entry);
            let repo = repository.clone();
            let handler = move |params: RawPathParams,
                                Query(raw_query): Query<HashMap<String, String>>,
                                headers: HeaderMap,
                                body: Bytes| {
                let repo = repo.clone();
                let entry = entry.clone();
                async move { handle_request(repo, entry, params, raw_query, headers, body).await }
            };
            let method_router = match method {
                RouteMethod::Get => get(handler),
                RouteMethod::Post => post(handler),
                RouteMethod::Put => put(handler),
                RouteMethod::Patch => patch(handler),
                RouteMethod::Delete => delete(handler),
            };
            router = router.route(&path, method_router);
        }
        Ok(router)
    }
}

async fn handle_request(
    repo: Arc<dyn Repository>,
    entry: Arc<RouteEntry>,
    params: RawPathParams,
    raw_query: HashMap<String, String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let mut ctx = RequestContext::default();
    for (name, value) in &params {
        ctx.params.insert(name.to_string(), value.to_string());
    }
    ctx.query = QueryParams::from_map(&raw_query)?;
    for (name, value) in &raw_query {
        ctx.query_raw.set(name, FieldValue::String(value.clone()));
    }
    // body parsing goes through the crate's own error envelope, never
    // an extractor rejection
    ctx.body = if body.is_empty() {
        None
    } else {
        Some(Record::from_json_bytes(&body)?)
    };
    ctx.headers = headers;

    PluginConnector::connect(&mut ctx, &entry.input_plugins).await?;

    let result = match entry.method {
        RouteMethod::Get => handle_read(repo.as_ref(), &entry, &ctx).await?,
        _ => handle_write(repo.as_ref(), &entry, &ctx).await?,
    };

    ctx.response = Some(result);
    PluginConnector::connect(&mut ctx, &entry.output_plugins).await?;
    Ok(Json(ctx.response.take().unwrap_or(Value::Null)).into_response())
}

async fn handle_read(
    repo: &dyn Repository,
    entry: &RouteEntry,
    ctx: &RequestContext,
) -> Result<Value> {
    if let Some(schema) = &entry.schema {
        schema.parse(&ctx.query_raw)?;
    }
    if entry.with_pagination {
        resolve_pagination(ctx.query.page, ctx.query.page_size)?;
    }

    if entry.has_id() {
        let id = path_id(ctx)?;
        let record = repo
            .find_one(&Criteria::by_id(id), &ctx.query.fields)
            .await?
            .ok_or_else(|| not_found(repo.entity_name()))?;
        return Ok(record.to_json());
    }

    let criteria = search_criteria(&entry.findable_fields, ctx.query.search_term.as_deref());
    let order = ctx
        .query
        .sort_by
        .clone()
        .map(|field| (field, ctx.query.sort_order));
    let (skip, take) = if entry.with_pagination {
        // page and pageSize are >= 1 here but otherwise unbounded; the
        // window arithmetic must not overflow on hostile values
        let skip = (ctx.query.page - 1).saturating_mul(ctx.query.page_size);
        (
            Some(usize::try_from(skip).unwrap_or(usize::MAX)),
            Some(usize::try_from(ctx.query.page_size).unwrap_or(usize::MAX)),
        )
    } else {
        (None, None)
    };
    let query = FindQuery {
        criteria,
        select: ctx.query.fields.clone(),
        order,
        take,
        skip,
    };
    let (records, count) = repo.find_and_count(&query).await?;
    let list: Vec<Value> = records.iter().map(Record::to_json).collect();

    if entry.with_pagination {
        let page = Paginated::build(list, count, ctx.query.page, ctx.query.page_size);
        serde_json::to_value(page).map_err(|e| Error::Internal(e.to_string()))
    } else {
        Ok(Value::Array(list))
    }
}

async fn handle_write(
    repo: &dyn Repository,
    entry: &RouteEntry,
    ctx: &RequestContext,
) -> Result<Value> {
    let body = ctx.body.clone().unwrap_or_default();
    if let Some(schema) = &entry.schema {
        schema.parse(&body)?;
    }
    let path_id = if entry.has_id() {
        Some(path_id(ctx)?)
    } else {
        None
    };

    // Existence lookup: any findable field equal to its body value, each
    // condition additionally pinned to the path id when one is present.
    let mut conditions = Vec::new();
    for field in &entry.findable_fields {
        let Some(value) = body.get(field) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let mut condition = Condition::new().with(field, MatchRule::Equals(value.clone()));
        if let Some(id) = path_id {
            condition = condition.with("id", MatchRule::Equals(FieldValue::Uuid(id)));
        }
        conditions.push(condition);
    }
    let existing = if !conditions.is_empty() {
        repo.find_one(&Criteria::any_of(conditions), &[]).await?
    } else if let Some(id) = path_id {
        repo.find_one(&Criteria::by_id(id), &[]).await?
    } else {
        None
    };

    match entry.method {
        RouteMethod::Post => {
            if existing.is_some() {
                return Err(Error::Conflict(format!(
                    "A {} with the same value already exists",
                    repo.entity_name()
                )));
            }
            let created = repo.create(body).await?;
            let saved = repo.save(created).await?;
            Ok(saved.to_json())
        }
        RouteMethod::Put | RouteMethod::Patch => {
            let existing = existing.ok_or_else(|| not_found(repo.entity_name()))?;
            let id = existing
                .id()
                .ok_or_else(|| Error::Internal("Stored record is missing its id".into()))?;
            let ack = repo.update(&id, body).await?;
            serde_json::to_value(ack).map_err(|e| Error::Internal(e.to_string()))
        }
        RouteMethod::Delete => {
            let existing = existing.ok_or_else(|| not_found(repo.entity_name()))?;
            let id = existing
                .id()
                .ok_or_else(|| Error::Internal("Stored record is missing its id".into()))?;
            let ack = repo.delete(&id).await?;
            serde_json::to_value(ack).map_err(|e| Error::Internal(e.to_string()))
        }
        RouteMethod::Get => Err(Error::Internal(
            "Read method dispatched to the write branch".into(),
        )),
    }
}

fn path_id(ctx: &RequestContext) -> Result<Uuid> {
    let raw = ctx
        .params
        .get("id")
        .ok_or_else(|| Error::BadRequest("Missing id path parameter".into()))?;
    Uuid::parse_str(raw).map_err(|_| Error::BadRequest(format!("Invalid id '{raw}'")))
}

fn not_found(entity: &str) -> Error {
    Error::NotFound(format!("No {entity} found"))
}
