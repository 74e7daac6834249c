use crate::auth::BasicAuth;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use sqlhttp_core::{Identity, Outcome, QueryResult, Service};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub(crate) const PING_ACHIEVED: &str = "ping achieved";

/// Routes of the gateway; every route only answers `POST`.
pub(crate) fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/query/{db}/{query}", post(query))
        .route("/exec/{db}/{query}", post(exec))
        .route("/ping/{db}", post(ping))
        .with_state(service)
}

/// Serve requests until `shutdown` completes, letting in-flight requests finish.
pub(crate) async fn serve<F>(
    listener: TcpListener,
    service: Arc<Service>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn query(
    State(service): State<Arc<Service>>,
    auth: BasicAuth,
    Path((database, sql)): Path<(String, String)>,
) -> Response {
    let identity = Identity::new(database, auth.username, auth.password);
    let outcome = service.query(&identity, &sql).await;
    outcome_response(&outcome)
}

async fn exec(
    State(service): State<Arc<Service>>,
    auth: BasicAuth,
    Path((database, sql)): Path<(String, String)>,
) -> Response {
    let identity = Identity::new(database, auth.username, auth.password);
    let outcome = service.exec(&identity, &sql).await;
    outcome_response(&outcome)
}

async fn ping(
    State(service): State<Arc<Service>>,
    auth: BasicAuth,
    Path(database): Path<String>,
) -> Response {
    let identity = Identity::new(database, auth.username, auth.password);
    let outcome = service.ping(&identity).await;
    if outcome.is_ok() {
        (StatusCode::OK, PING_ACHIEVED).into_response()
    } else {
        outcome_response(&outcome)
    }
}

fn outcome_response(outcome: &Outcome) -> Response {
    let status =
        StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    respond(status, &outcome.result)
}

/// Write `result` as the JSON body with `status`.
pub(crate) fn respond(status: StatusCode, result: &QueryResult) -> Response {
    match serde_json::to_vec(result) {
        Ok(body) => {
            debug!("{}", String::from_utf8_lossy(&body));
            (status, [(CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response()
        }
        Err(error) => {
            error!("unable to serialize response: {error}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
