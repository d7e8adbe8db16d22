//! End-to-end tests for the JWT credential-issuance plugin
//!
//! Covers sign-up and sign-in flows, the bearer-token request gate, and the
//! permission guard layered onto generated CRUD routes.

use axum::http::StatusCode;
use axum_test::TestServer;
use crudgen::core::schema::{email, required, string};
use crudgen::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;

// =============================================================================
// Test Setup
// =============================================================================

fn user_repository() -> Arc<InMemoryRepository> {
    Arc::new(
        InMemoryRepository::new("user", &["email", "password", "name", "permissions"])
            .with_unique(&["email"]),
    )
}

fn registered_plugin() -> JwtAuthPlugin {
    let mut plugin = JwtAuthPlugin::new();
    plugin
        .register(RegisterAuth {
            secret: "integration-test-secret".into(),
        })
        .expect("Failed to register plugin");
    plugin
}

fn execute_input(repo: Arc<InMemoryRepository>) -> ExecuteAuth {
    ExecuteAuth {
        repository: repo,
        hashed_field: "password".into(),
        findable_field: "email".into(),
        sign_up: SignUpConfig {
            schema: Some(
                Schema::new()
                    .field("email", vec![required(), email()])
                    .field("password", vec![required(), string()]),
            ),
            default_values: Record::new().with_field(
                "permissions",
                FieldValue::List(vec![FieldValue::String("users:read".into())]),
            ),
        },
        sign_in: SignInConfig {
            schema: None,
            fields_token: vec!["email".into(), "permissions".into()],
            return_fields: vec!["name".into()],
        },
    }
}

async fn auth_server() -> (TestServer, JwtAuthPlugin, Arc<InMemoryRepository>) {
    let repo = user_repository();
    let plugin = registered_plugin();
    let auth_routes = plugin
        .execute(execute_input(repo.clone()))
        .expect("Failed to build auth routes");
    let app = ServerBuilder::new().register_routes(auth_routes).build();
    let server = TestServer::new(app);
    (server, plugin, repo)
}

async fn sign_up(server: &TestServer, email: &str, password: &str) -> Value {
    let response = server
        .post("/sign-up")
        .json(&json!({"email": email, "password": password, "name": "Alice"}))
        .await;
    response.assert_status_ok();
    response.json()
}

// =============================================================================
// Sign-Up
// =============================================================================

mod sign_up_tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_persists_and_strips_the_hash() {
        let (server, _, repo) = auth_server().await;
        let body = sign_up(&server, "alice@example.com", "hunter2").await;

        assert_eq!(body["email"], "alice@example.com");
        assert_eq!(body["name"], "Alice");
        assert!(body["id"].as_str().is_some());
        // the hashed secret never appears in the response
        assert!(body.get("password").is_none());

        // stored record carries the hash, not the plaintext
        let stored = repo
            .find_one(&Criteria::empty(), &[])
            .await
            .unwrap()
            .unwrap();
        let hash = stored.get("password").unwrap().as_string().unwrap();
        assert_ne!(hash, "hunter2");
        assert!(hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn test_sign_up_applies_default_values() {
        let (server, _, repo) = auth_server().await;
        sign_up(&server, "alice@example.com", "hunter2").await;

        let stored = repo
            .find_one(&Criteria::empty(), &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.get("permissions"),
            Some(&FieldValue::List(vec![FieldValue::String(
                "users:read".into()
            )]))
        );
    }

    #[tokio::test]
    async fn test_configured_defaults_override_body_supplied_fields() {
        let (server, _, repo) = auth_server().await;
        // a caller trying to grant itself wildcard permissions at sign-up
        let response = server
            .post("/sign-up")
            .json(&json!({
                "email": "mallory@example.com",
                "password": "hunter2",
                "permissions": ["*"]
            }))
            .await;
        response.assert_status_ok();

        let stored = repo
            .find_one(&Criteria::empty(), &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.get("permissions"),
            Some(&FieldValue::List(vec![FieldValue::String(
                "users:read".into()
            )]))
        );
    }

    #[tokio::test]
    async fn test_malformed_sign_up_body_uses_the_error_envelope() {
        let (server, _, _) = auth_server().await;
        let response = server.post("/sign-up").text("not json").await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], "Bad Request");
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_conflicts() {
        let (server, _, _) = auth_server().await;
        sign_up(&server, "alice@example.com", "hunter2").await;

        let response = server
            .post("/sign-up")
            .json(&json!({"email": "alice@example.com", "password": "other"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_sign_up_schema_rejects_bad_email() {
        let (server, _, _) = auth_server().await;
        let response = server
            .post("/sign-up")
            .json(&json!({"email": "not-an-email", "password": "hunter2"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["path"], "email");
    }

    #[tokio::test]
    async fn test_sign_up_guards_against_missing_column() {
        // a repository that has no `email` column at all
        let repo = Arc::new(InMemoryRepository::new("user", &["password"]));
        let plugin = registered_plugin();
        let mut input = execute_input(repo);
        input.sign_up.schema = None;
        let app = ServerBuilder::new()
            .register_routes(plugin.execute(input).unwrap())
            .build();
        let server = TestServer::new(app);

        let response = server
            .post("/sign-up")
            .json(&json!({"email": "alice@example.com", "password": "hunter2"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Sign-In
// =============================================================================

mod sign_in_tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_returns_token_and_return_fields() {
        let (server, _, _) = auth_server().await;
        sign_up(&server, "alice@example.com", "hunter2").await;

        let response = server
            .post("/sign-in")
            .json(&json!({"email": "alice@example.com", "password": "hunter2"}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["token"].as_str().is_some());
        assert_eq!(body["name"], "Alice");
    }

    #[tokio::test]
    async fn test_wrong_secret_and_unknown_identifier_are_indistinguishable() {
        let (server, _, _) = auth_server().await;
        sign_up(&server, "alice@example.com", "hunter2").await;

        let wrong_secret = server
            .post("/sign-in")
            .json(&json!({"email": "alice@example.com", "password": "wrong"}))
            .await;
        let unknown_user = server
            .post("/sign-in")
            .json(&json!({"email": "mallory@example.com", "password": "hunter2"}))
            .await;

        assert_eq!(wrong_secret.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_user.status_code(), StatusCode::UNAUTHORIZED);
        let a: Value = wrong_secret.json();
        let b: Value = unknown_user.json();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_missing_token_field_is_bad_request() {
        let repo = user_repository();
        let plugin = registered_plugin();
        let mut input = execute_input(repo);
        input.sign_in.fields_token = vec!["ghost".into()];
        let app = ServerBuilder::new()
            .register_routes(plugin.execute(input).unwrap())
            .build();
        let server = TestServer::new(app);

        sign_up(&server, "alice@example.com", "hunter2").await;
        let response = server
            .post("/sign-in")
            .json(&json!({"email": "alice@example.com", "password": "hunter2"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Token Gate + Permission Guard on Generated Routes
// =============================================================================

mod gate_tests {
    use super::*;

    /// Users CRUD where listing requires a verified token holding users:read
    async fn protected_server() -> TestServer {
        let repo = user_repository();
        let plugin = registered_plugin();
        let auth_routes = plugin.execute(execute_input(repo.clone())).unwrap();

        let descriptor = RouteDescriptor::new().list_many(
            ActionConfig::new()
                .input_plugin(plugin.verify_token(false).unwrap())
                .input_plugin(verify_permissions(GuardConfig::new(
                    &["users:read"],
                    "permissions",
                ))),
        );
        let app = ServerBuilder::new()
            .register_crud(repo, descriptor)
            .unwrap()
            .register_routes(auth_routes)
            .build();
        TestServer::new(app)
    }

    async fn token_for(server: &TestServer, email: &str, password: &str) -> String {
        let response = server
            .post("/sign-in")
            .json(&json!({"email": email, "password": password}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_issued_token_opens_the_protected_route() {
        let server = protected_server().await;
        sign_up(&server, "alice@example.com", "hunter2").await;
        let token = token_for(&server, "alice@example.com", "hunter2").await;

        let response = server
            .get("/users")
            .add_header("authorization", format!("Bearer {token}"))
            .await;
        response.assert_status_ok();
        let body: Vec<Value> = response.json();
        assert_eq!(body.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let server = protected_server().await;
        sign_up(&server, "alice@example.com", "hunter2").await;

        let response = server.get("/users").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_tampered_token_is_unauthorized() {
        let server = protected_server().await;
        sign_up(&server, "alice@example.com", "hunter2").await;
        let token = token_for(&server, "alice@example.com", "hunter2").await;

        let response = server
            .get("/users")
            .add_header("authorization", format!("Bearer {token}x"))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_without_required_permission_is_unauthorized() {
        let repo = user_repository();
        let plugin = registered_plugin();
        let mut input = execute_input(repo.clone());
        // sign-ups get no permissions at all
        input.sign_up.default_values = Record::new();
        input.sign_in.fields_token = vec!["email".into()];
        let auth_routes = plugin.execute(input).unwrap();

        let descriptor = RouteDescriptor::new().list_many(
            ActionConfig::new()
                .input_plugin(plugin.verify_token(false).unwrap())
                .input_plugin(verify_permissions(GuardConfig::new(
                    &["users:read"],
                    "permissions",
                ))),
        );
        let app = ServerBuilder::new()
            .register_crud(repo, descriptor)
            .unwrap()
            .register_routes(auth_routes)
            .build();
        let server = TestServer::new(app);

        sign_up(&server, "alice@example.com", "hunter2").await;
        let token = token_for(&server, "alice@example.com", "hunter2").await;
        let response = server
            .get("/users")
            .add_header("authorization", format!("Bearer {token}"))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }
}
