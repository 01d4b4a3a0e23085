//! HTTP surface of the record service.
//!
//! Exposes the four contract calls as
//! `POST /api/records/{resource}/{fetch|create|update|delete}` with JSON
//! bodies, backed by a shared [`RecordStore`]. When the server is configured
//! with a project id or public key, requests must carry matching headers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use taskflow_proto::Resource;
use taskflow_proto::record::{
    DeleteParams, FetchParams, PROJECT_ID_HEADER, PUBLIC_KEY_HEADER, RecordsParams,
};

use crate::store::RecordStore;

/// Shared server state: the record tables plus optional credentials.
#[derive(Debug, Default)]
pub struct ServerState {
    /// Backing record tables.
    pub store: RecordStore,
    project_id: Option<String>,
    public_key: Option<String>,
}

impl ServerState {
    /// Creates state around `store` with no credential checks.
    #[must_use]
    pub const fn new(store: RecordStore) -> Self {
        Self {
            store,
            project_id: None,
            public_key: None,
        }
    }

    /// Requires the given project id and/or public key on every request.
    #[must_use]
    pub fn with_credentials(
        mut self,
        project_id: Option<String>,
        public_key: Option<String>,
    ) -> Self {
        self.project_id = project_id;
        self.public_key = public_key;
        self
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let matches = |expected: Option<&String>, header: &str| {
            expected.is_none_or(|want| {
                headers
                    .get(header)
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|got| got == want.as_str())
            })
        };
        if matches(self.project_id.as_ref(), PROJECT_ID_HEADER)
            && matches(self.public_key.as_ref(), PUBLIC_KEY_HEADER)
        {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

/// Request-level failures, each mapped to an HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Credentials missing or wrong.
    #[error("missing or invalid credentials")]
    Unauthorized,
    /// The path names a resource that does not exist.
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    /// The path names an operation that does not exist.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
    /// The body does not match the operation's parameter shape.
    #[error("invalid request body: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::UnknownResource(_) | Self::UnknownOperation(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

fn parse_body<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

async fn records_handler(
    State(state): State<Arc<ServerState>>,
    Path((resource, operation)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
    state.authorize(&headers)?;
    let resource =
        Resource::parse(&resource).ok_or_else(|| ApiError::UnknownResource(resource.clone()))?;
    tracing::debug!(%resource, %operation, "record request");

    let response = match operation.as_str() {
        "fetch" => {
            let params: FetchParams = parse_body(body)?;
            Json(state.store.fetch(resource, &params).await).into_response()
        }
        "create" => {
            let params: RecordsParams = parse_body(body)?;
            Json(state.store.create(resource, params).await).into_response()
        }
        "update" => {
            let params: RecordsParams = parse_body(body)?;
            Json(state.store.update(resource, params).await).into_response()
        }
        "delete" => {
            let params: DeleteParams = parse_body(body)?;
            Json(state.store.delete(resource, &params).await).into_response()
        }
        _ => return Err(ApiError::UnknownOperation(operation)),
    };
    Ok(response)
}

/// Builds the router for the record API.
pub fn router(state: Arc<ServerState>) -> axum::Router {
    axum::Router::new()
        .route(
            "/api/records/{resource}/{operation}",
            axum::routing::post(records_handler),
        )
        .with_state(state)
}

/// Starts the record server on the given address with empty tables and
/// returns the bound address and a join handle.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(ServerState::default())).await
}

/// Starts the record server with a pre-configured [`ServerState`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<ServerState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "record server error");
        }
    });

    Ok((bound_addr, handle))
}
