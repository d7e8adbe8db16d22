//! Credential issuance over JWT: sign-up, sign-in and a request gate
//!
//! `register` installs the HS256 key material for the process lifetime;
//! `execute` produces a router with `POST /sign-up` and `POST /sign-in`
//! against a repository holding credential records. The stored secret only
//! ever exists as a one-way hash, and sign-in failures are indistinguishable
//! between an unknown identifier and a wrong secret.

use axum::body::Bytes;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::core::error::{Error, Result};
use crate::core::field::FieldValue;
use crate::core::plugin::PluginFn;
use crate::core::record::Record;
use crate::core::schema::Schema;
use crate::plugins::ServerPlugin;
use crate::repository::{Condition, Criteria, MatchRule, Repository};

const HASH_COST: u32 = 10;
const TOKEN_TTL_HOURS: i64 = 24;

/// Registration input: the signing secret
pub struct RegisterAuth {
    pub secret: String,
}

/// Sign-up route configuration
#[derive(Clone, Default)]
pub struct SignUpConfig {
    pub schema: Option<Schema>,
    /// Fields overlaid onto the request body before persisting; a configured
    /// default always wins over a body-supplied value
    pub default_values: Record,
}

/// Sign-in route configuration
#[derive(Clone, Default)]
pub struct SignInConfig {
    pub schema: Option<Schema>,
    /// Record fields copied into the token payload; all must be present
    pub fields_token: Vec<String>,
    /// Record fields echoed alongside the token, null when absent
    pub return_fields: Vec<String>,
}

/// Execution input: the credential entity and its route configuration
pub struct ExecuteAuth {
    pub repository: Arc<dyn Repository>,
    /// Field storing the one-way hash of the secret
    pub hashed_field: String,
    /// Lookup identifier field, unique across credential records
    pub findable_field: String,
    pub sign_up: SignUpConfig,
    pub sign_in: SignInConfig,
}

struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

struct AuthState {
    repository: Arc<dyn Repository>,
    hashed_field: String,
    findable_field: String,
    sign_up: SignUpConfig,
    sign_in: SignInConfig,
    keys: Arc<JwtKeys>,
}

/// The credential-issuance plugin
#[derive(Default)]
pub struct JwtAuthPlugin {
    keys: Option<Arc<JwtKeys>>,
}

impl JwtAuthPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(&self) -> Result<&Arc<JwtKeys>> {
        self.keys
            .as_ref()
            .ok_or_else(|| Error::BadRequest("JwtAuthPlugin used before register".into()))
    }

    /// Request gate verifying the bearer token and attaching the principal
    ///
    /// With `allow_all` a missing or invalid token passes silently and no
    /// principal is attached; otherwise it is Unauthorized.
    pub fn verify_token(&self, allow_all: bool) -> Result<PluginFn> {
        let keys = self.keys()?.clone();
        Ok(Arc::new(move |ctx| {
            let keys = keys.clone();
            Box::pin(async move {
                let verified = ctx
                    .bearer_token()
                    .ok_or_else(|| Error::Unauthorized("Missing bearer token".into()))
                    .and_then(|token| {
                        decode::<Value>(&token, &keys.decoding, &Validation::new(Algorithm::HS256))
                            .map_err(|e| {
                                tracing::debug!(error = %e, "token verification failed");
                                Error::Unauthorized("Invalid token".into())
                            })
                    })
                    .and_then(|data| Record::from_json(&data.claims));
                match verified {
                    Ok(mut principal) => {
                        principal.remove("exp");
                        ctx.principal = Some(principal);
                        Ok(())
                    }
                    Err(_) if allow_all => Ok(()),
                    Err(e) => Err(e),
                }
            })
        }))
    }
}

impl ServerPlugin for JwtAuthPlugin {
    type RegisterInput = RegisterAuth;
    type ExecuteInput = ExecuteAuth;

    fn name(&self) -> &str {
        "jwt-auth"
    }

    fn register(&mut self, input: Self::RegisterInput) -> Result<()> {
        let secret = input.secret.as_bytes();
        self.keys = Some(Arc::new(JwtKeys {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }));
        Ok(())
    }

    fn execute(&self, input: Self::ExecuteInput) -> Result<Router> {
        let state = Arc::new(AuthState {
            repository: input.repository,
            hashed_field: input.hashed_field,
            findable_field: input.findable_field,
            sign_up: input.sign_up,
            sign_in: input.sign_in,
            keys: self.keys()?.clone(),
        });

        let sign_up_state = state.clone();
        let sign_in_state = state;
        Ok(Router::new()
            .route(
                "/sign-up",
                post(move |body: Bytes| {
                    let state = sign_up_state.clone();
                    async move { handle_sign_up(state, body).await }
                }),
            )
            .route(
                "/sign-in",
                post(move |body: Bytes| {
                    let state = sign_in_state.clone();
                    async move { handle_sign_in(state, body).await }
                }),
            ))
    }
}

fn guard_column(state: &AuthState) -> Result<()> {
    if !state.repository.has_column(&state.findable_field) {
        return Err(Error::BadRequest(format!(
            "Entity '{}' has no column '{}'",
            state.repository.entity_name(),
            state.findable_field
        )));
    }
    Ok(())
}

fn findable_criteria(state: &AuthState, value: &FieldValue) -> Criteria {
    Criteria::any_of(vec![Condition::new().with(
        &state.findable_field,
        MatchRule::Equals(value.clone()),
    )])
}

async fn handle_sign_up(state: Arc<AuthState>, body: Bytes) -> Result<Response> {
    let body = Record::from_json_bytes(&body)?;
    if let Some(schema) = &state.sign_up.schema {
        schema.parse(&body)?;
    }
    guard_column(&state)?;

    let identifier = body.require(&state.findable_field)?.clone();
    let existing = state
        .repository
        .find_one(&findable_criteria(&state, &identifier), &[])
        .await?;
    if existing.is_some() {
        return Err(Error::Conflict(format!(
            "A {} with this {} already exists",
            state.repository.entity_name(),
            state.findable_field
        )));
    }

    let plaintext = body
        .require(&state.hashed_field)?
        .as_string()
        .ok_or_else(|| {
            Error::BadRequest(format!("Field '{}' must be a string", state.hashed_field))
        })?
        .to_string();
    let hash = bcrypt::hash(&plaintext, HASH_COST).map_err(|e| Error::Internal(e.to_string()))?;

    // defaults overlay the body: a caller cannot smuggle its own value into
    // a field the configuration pins (permissions being the obvious one)
    let mut record = body.clone();
    record.merge(&state.sign_up.default_values);
    record.set(&state.hashed_field, FieldValue::String(hash));

    let created = state.repository.create(record).await?;
    let mut saved = state.repository.save(created).await?;
    // the hash never leaves the process
    saved.remove(&state.hashed_field);
    Ok(Json(saved.to_json()).into_response())
}

async fn handle_sign_in(state: Arc<AuthState>, body: Bytes) -> Result<Response> {
    let body = Record::from_json_bytes(&body)?;
    if let Some(schema) = &state.sign_in.schema {
        schema.parse(&body)?;
    }
    guard_column(&state)?;

    let identifier = body.require(&state.findable_field)?.clone();
    let plaintext = body
        .require(&state.hashed_field)?
        .as_string()
        .ok_or_else(|| {
            Error::BadRequest(format!("Field '{}' must be a string", state.hashed_field))
        })?
        .to_string();

    // unknown identifier and wrong secret are indistinguishable to the caller
    let unauthorized = || Error::Unauthorized("Invalid credentials".into());
    let record = state
        .repository
        .find_one(&findable_criteria(&state, &identifier), &[])
        .await?
        .ok_or_else(unauthorized)?;
    let hash = record
        .get(&state.hashed_field)
        .and_then(|v| v.as_string())
        .ok_or_else(unauthorized)?;
    let valid = bcrypt::verify(&plaintext, hash).map_err(|e| Error::Internal(e.to_string()))?;
    if !valid {
        tracing::debug!(
            entity = state.repository.entity_name(),
            "sign-in secret mismatch"
        );
        return Err(unauthorized());
    }

    let mut claims = serde_json::Map::new();
    for field in &state.sign_in.fields_token {
        claims.insert(field.clone(), record.require(field)?.to_json());
    }
    let exp = (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp();
    claims.insert("exp".to_string(), json!(exp));

    let token = encode(&Header::default(), &Value::Object(claims), &state.keys.encoding)
        .map_err(|e| Error::Internal(e.to_string()))?;

    let mut payload = serde_json::Map::new();
    payload.insert("token".to_string(), json!(token));
    for field in &state.sign_in.return_fields {
        let value = record.get(field).map(|v| v.to_json()).unwrap_or(Value::Null);
        payload.insert(field.clone(), value);
    }
    Ok(Json(Value::Object(payload)).into_response())
}
