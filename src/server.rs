//! Local HTTP transport.
//!
//! Turns axum requests into [`ApiRequest`]/[`Context`] pairs, runs the
//! wrapped handler bodies and writes their [`HandlerResponse`] back out. The
//! caller's identity comes from the `x-identity-id` header, standing in for
//! the managed identity provider's authorizer.

use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use axum::{
    extract::Path,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::{future::BoxFuture, FutureExt};
use serde_json::json;
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    api::{billing, notes},
    handler::{handler, ApiRequest, Context, HandlerResponse, HandlerResult},
    state::AppState,
    Error,
};

pub const IDENTITY_HEADER: &str = "x-identity-id";

type Wrapped = Arc<dyn Fn(ApiRequest, Context) -> BoxFuture<'static, HandlerResponse> + Send + Sync>;

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

/// Binds a handler body to the shared state and wraps it.
fn wrap<F, Fut>(state: &Arc<AppState>, body: F) -> Wrapped
where
    F: Fn(Arc<AppState>, ApiRequest, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    let state = Arc::clone(state);
    Arc::new(handler(move |request, context| {
        body(Arc::clone(&state), request, context)
    }))
}

async fn forward(
    wrapped: Wrapped,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    path_parameters: HashMap<String, String>,
    body: String,
) -> Response {
    let request = ApiRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        path_parameters,
        body: (!body.is_empty()).then_some(body),
    };

    let mut context = Context::new(Uuid::new_v4().to_string());
    context.identity_id = headers
        .get(HeaderName::from_static(IDENTITY_HEADER))
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned);

    wrapped(request, context).await.into_response()
}

fn collection_route(
    wrapped: Wrapped,
) -> impl Fn(Method, Uri, HeaderMap, String) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
{
    move |method: Method, uri: Uri, headers: HeaderMap, body: String| {
        forward(wrapped.clone(), method, uri, headers, HashMap::new(), body).boxed()
    }
}

fn item_route(
    wrapped: Wrapped,
) -> impl Fn(Method, Uri, HeaderMap, Path<String>, String) -> BoxFuture<'static, Response>
       + Clone
       + Send
       + Sync
       + 'static {
    move |method: Method, uri: Uri, headers: HeaderMap, Path(id): Path<String>, body: String| {
        let path_parameters = HashMap::from([("id".to_string(), id)]);
        forward(wrapped.clone(), method, uri, headers, path_parameters, body).boxed()
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(IDENTITY_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(
            "/notes",
            post(collection_route(wrap(&state, notes::create)))
                .get(collection_route(wrap(&state, notes::list))),
        )
        .route(
            "/notes/{id}",
            get(item_route(wrap(&state, notes::get)))
                .put(item_route(wrap(&state, notes::update)))
                .delete(item_route(wrap(&state, notes::delete))),
        )
        .route("/billing", post(collection_route(wrap(&state, billing::bill))))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn start_server(state: Arc<AppState>) -> Result<(), Error> {
    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                warn!("Failed to install Ctrl+C handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                warn!("Failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
