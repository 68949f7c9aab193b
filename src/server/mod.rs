//! HTTP surface for the query pipeline.

pub mod protocol;

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::QueryError;
use crate::server::protocol::{
    ErrorResponse, GenerateResponse, INTERNAL_ERROR_MESSAGE, NO_QUERY_MESSAGE, parse_query,
};
use crate::services::RagService;

/// Routes with permissive CORS and panics mapped to the generic 500 body.
pub fn router(rag: RagService) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .route("/health", get(health))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(rag))
}

/// Serve until `shutdown` resolves, then finish in-flight requests.
pub async fn run_server<F>(rag: RagService, bind: &str, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(rag))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn generate(State(rag): State<Arc<RagService>>, body: Bytes) -> Response {
    let Some(query) = parse_query(&body) else {
        return error_response(StatusCode::BAD_REQUEST, NO_QUERY_MESSAGE);
    };

    match rag.answer(&query).await {
        Ok(answer) => {
            tracing::info!(
                context = answer.context.len(),
                duration_ms = answer.duration_ms,
                "answered query"
            );
            (
                StatusCode::OK,
                Json(GenerateResponse {
                    response: answer.response,
                }),
            )
                .into_response()
        }
        Err(QueryError::EmptyQuery) => error_response(StatusCode::BAD_REQUEST, NO_QUERY_MESSAGE),
        Err(e) => {
            tracing::error!(error = %e, "query failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}
