// GraphQL HTTP server
// Axum router that decodes request bodies, runs them through the schema and writes the envelope back

//! # GraphQL HTTP Server
//!
//! ## Endpoints
//!
//! - `/graphql` (any method): JSON body `{ "query": ..., "variables"?: ..., "operationName"?: ... }`
//! - `GET /`: GraphiQL page pointed at `/graphql`
//! - `GET /health`: liveness text
//!
//! ## Status Codes
//!
//! | Situation                          | Status | Body                   |
//! |------------------------------------|--------|------------------------|
//! | Body is not a JSON object          | 400    | plain text             |
//! | `query` missing, empty, not string | 400    | plain text             |
//! | Schema executed (errors or not)    | 200    | `application/json`     |
//! | Envelope could not be serialized   | 500    | plain text             |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use async_graphql::{http::GraphiQLSource, Variables};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{any, get},
    Router, Server,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info};

use crate::config::{self, ServerConfig};
use crate::engine::{
    graphql::{create_schema_with_storage, BookshelfSchema},
    storage::{BookStorage, InMemoryBookStorage},
};

/// Why an HTTP request was turned away before reaching the schema
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestDecodeError {
    #[error("Error decoding request body")]
    MalformedBody,

    #[error("Must provide a GraphQL query")]
    MissingQuery,
}

impl IntoResponse for RequestDecodeError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// Turn a raw request body into an executable GraphQL request
///
/// The body must be a JSON object with a non-empty string `query`.
/// `operationName` and `variables` are forwarded when present and well-formed.
pub fn decode_request(body: &[u8]) -> Result<async_graphql::Request, RequestDecodeError> {
    // Only the first JSON value is read; anything after it is ignored
    let object = match serde_json::Deserializer::from_slice(body)
        .into_iter::<Map<String, Value>>()
        .next()
    {
        Some(Ok(object)) => object,
        _ => return Err(RequestDecodeError::MalformedBody),
    };

    let query = match object.get("query") {
        Some(Value::String(query)) if !query.is_empty() => query.clone(),
        _ => return Err(RequestDecodeError::MissingQuery),
    };

    let mut request = async_graphql::Request::new(query);
    if let Some(Value::String(name)) = object.get("operationName") {
        request = request.operation_name(name.clone());
    }
    if let Some(variables @ Value::Object(_)) = object.get("variables") {
        request = request.variables(Variables::from_json(variables.clone()));
    }

    Ok(request)
}

/// Handle one GraphQL request
pub async fn graphql_handler(State(schema): State<BookshelfSchema>, body: Bytes) -> Response {
    let request = match decode_request(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejecting GraphQL request: {}", e);
            return e.into_response();
        }
    };

    let response = schema.execute(request).await;

    match serde_json::to_vec(&response) {
        Ok(json) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            json,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to serialize GraphQL response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error encoding GraphQL response",
            )
                .into_response()
        }
    }
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Bookshelf GraphQL Server is running!")
}

/// Build the application router around a schema
pub fn router(schema: BookshelfSchema) -> Router {
    Router::new()
        .route("/", get(graphiql))
        .route("/graphql", any(graphql_handler))
        .route("/health", get(health_check))
        .with_state(schema)
}

#[derive(Clone)]
pub struct GraphQLServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
}

impl Default for GraphQLServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8070,
            cors_enabled: true,
        }
    }
}

impl GraphQLServerConfig {
    pub fn bind_address(&self) -> String {
        config::bind_address(&self.host, self.port)
    }
}

impl From<&ServerConfig> for GraphQLServerConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            cors_enabled: config.cors_enabled,
        }
    }
}

pub struct GraphQLServer {
    config: GraphQLServerConfig,
    storage: Arc<dyn BookStorage>,
}

impl GraphQLServer {
    pub fn new() -> Self {
        Self {
            config: GraphQLServerConfig::default(),
            storage: Arc::new(InMemoryBookStorage::default()),
        }
    }

    pub fn with_config(mut self, config: GraphQLServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn BookStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Router with the configured middleware applied
    pub fn app(&self) -> Router {
        let schema = create_schema_with_storage(self.storage.clone());

        let mut app = router(schema).layer(TraceLayer::new_for_http());
        if self.config.cors_enabled {
            app = app.layer(CorsLayer::permissive());
        }
        app
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let app = self.app();

        let bind_address = self.config.bind_address();
        let addr: SocketAddr = bind_address
            .parse()
            .with_context(|| format!("invalid listen address {}", bind_address))?;

        info!(
            "GraphQL server running on http://localhost:{}/graphql",
            self.config.port
        );
        info!("GraphiQL interface: http://localhost:{}", self.config.port);

        Server::bind(&addr)
            .serve(app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        info!("GraphQL server stopped");
        Ok(())
    }
}

impl Default for GraphQLServer {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub struct GraphQLServerBuilder {
    server: GraphQLServer,
}

impl GraphQLServerBuilder {
    pub fn new() -> Self {
        Self {
            server: GraphQLServer::new(),
        }
    }

    pub fn with_config(mut self, config: &ServerConfig) -> Self {
        self.server = self.server.with_config(GraphQLServerConfig::from(config));
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn BookStorage>) -> Self {
        self.server = self.server.with_storage(storage);
        self
    }

    pub fn build(self) -> GraphQLServer {
        self.server
    }

    pub async fn build_and_run(self) -> anyhow::Result<()> {
        self.server.run().await
    }
}

impl Default for GraphQLServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, BookId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{body::Body, http::Request};
    use clap::Parser;
    use serde_json::json;
    use tower::ServiceExt;

    /// In-memory storage that counts how often it is called
    #[derive(Default)]
    struct CountingStorage {
        inner: InMemoryBookStorage,
        calls: AtomicUsize,
    }

    impl CountingStorage {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl BookStorage for CountingStorage {
        async fn get_book(&self, id: &BookId) -> crate::Result<Option<Book>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get_book(id).await
        }

        async fn list_books(&self) -> crate::Result<Vec<Book>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.list_books().await
        }

        async fn insert_book(&self, book: &Book) -> crate::Result<BookId> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.insert_book(book).await
        }
    }

    fn create_test_app() -> (Arc<CountingStorage>, Router) {
        let storage = Arc::new(CountingStorage::default());
        let app = GraphQLServerBuilder::new()
            .with_storage(storage.clone())
            .build()
            .app();
        (storage, app)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: impl Into<Body>,
    ) -> (StatusCode, String, Vec<u8>) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, content_type, body.to_vec())
    }

    async fn post_json(app: &Router, payload: Value) -> Value {
        let (status, content_type, body) =
            send(app, "POST", "/graphql", payload.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/json");
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_decode_request() {
        assert_eq!(
            decode_request(b"not json").err(),
            Some(RequestDecodeError::MalformedBody)
        );
        assert_eq!(
            decode_request(b"[1, 2]").err(),
            Some(RequestDecodeError::MalformedBody)
        );
        assert_eq!(
            decode_request(br#"{"variables": {}}"#).err(),
            Some(RequestDecodeError::MissingQuery)
        );
        assert_eq!(
            decode_request(br#"{"query": 42}"#).err(),
            Some(RequestDecodeError::MissingQuery)
        );

        let request = decode_request(
            br#"{"query": "{ books { id } }", "operationName": "All", "variables": null}"#,
        )
        .unwrap();
        assert_eq!(request.query, "{ books { id } }");
        assert_eq!(request.operation_name.as_deref(), Some("All"));
    }

    #[test]
    fn test_decode_request_ignores_trailing_bytes() {
        let request = decode_request(br#"{"query": "{ books { id } }"} trailing"#).unwrap();
        assert_eq!(request.query, "{ books { id } }");

        let request = decode_request(br#"{"query": "{ books { id } }"}{"query": 1}"#).unwrap();
        assert_eq!(request.query, "{ books { id } }");

        assert_eq!(
            decode_request(b"   ").err(),
            Some(RequestDecodeError::MalformedBody)
        );
    }

    #[test]
    fn test_listener_address_matches_config() {
        let config =
            ServerConfig::try_parse_from(["server", "--mongo-uri", "mongodb://db", "--port", "9001"])
                .unwrap();

        let server_config = GraphQLServerConfig::from(&config);
        assert_eq!(server_config.bind_address(), config.bind_address());
        assert_eq!(server_config.bind_address(), "0.0.0.0:9001");
        assert_eq!(GraphQLServerConfig::default().bind_address(), "0.0.0.0:8070");
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected_before_schema() {
        let (storage, app) = create_test_app();

        for body in ["", "not json", "[]", "\"{ books { id } }\""] {
            let (status, content_type, bytes) = send(&app, "POST", "/graphql", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{:?}", body);
            assert!(content_type.starts_with("text/plain"));
            assert_eq!(bytes, b"Error decoding request body");
        }

        assert_eq!(storage.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_query_is_rejected_before_schema() {
        let (storage, app) = create_test_app();

        for body in [json!({}), json!({ "query": "" }), json!({ "query": null })] {
            let (status, _, bytes) = send(&app, "POST", "/graphql", body.to_string()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(bytes, b"Must provide a GraphQL query");
        }

        assert_eq!(storage.calls(), 0);
    }

    #[tokio::test]
    async fn test_query_returns_json_envelope() {
        let (storage, app) = create_test_app();

        let envelope = post_json(&app, json!({ "query": "{ books { id title author } }" })).await;

        assert_eq!(envelope["data"], json!({ "books": [] }));
        assert_eq!(storage.calls(), 1);
    }

    #[tokio::test]
    async fn test_create_and_fetch_with_variables() {
        let (_storage, app) = create_test_app();

        let created = post_json(
            &app,
            json!({
                "query": "mutation Create($input: BookInput) { createBook(input: $input) { id title author } }",
                "operationName": "Create",
                "variables": { "input": { "title": "Dune", "author": "Frank Herbert" } }
            }),
        )
        .await;
        let id = created["data"]["createBook"]["id"].as_str().unwrap().to_string();

        let fetched = post_json(
            &app,
            json!({
                "query": "query Fetch($id: ID!) { book(id: $id) { id title author } }",
                "variables": { "id": id }
            }),
        )
        .await;

        assert_eq!(
            fetched["data"]["book"],
            json!({ "id": id, "title": "Dune", "author": "Frank Herbert" })
        );
    }

    #[tokio::test]
    async fn test_resolver_errors_keep_status_ok() {
        let (_storage, app) = create_test_app();

        let envelope = post_json(
            &app,
            json!({ "query": format!(r#"{{ book(id: "{}") {{ id }} }}"#, BookId::new()) }),
        )
        .await;

        assert_eq!(envelope["data"], json!({ "book": null }));
        assert_eq!(envelope["errors"][0]["extensions"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_syntax_error_keeps_status_ok() {
        let (storage, app) = create_test_app();

        let envelope = post_json(&app, json!({ "query": "{ books {" })).await;

        assert_eq!(envelope["data"], Value::Null);
        assert!(!envelope["errors"].as_array().unwrap().is_empty());
        assert_eq!(storage.calls(), 0);
    }

    #[tokio::test]
    async fn test_graphql_route_accepts_any_method() {
        let (_storage, app) = create_test_app();

        let (status, _, _) = send(
            &app,
            "PUT",
            "/graphql",
            json!({ "query": "{ books { id } }" }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_and_graphiql() {
        let (_storage, app) = create_test_app();

        let (status, _, body) = send(&app, "GET", "/health", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Bookshelf GraphQL Server is running!");

        let (status, content_type, _) = send(&app, "GET", "/", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/html"));
    }
}
