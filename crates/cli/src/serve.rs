use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{debug, info};

use playground_engine::{summarize, CasePreview, CustomInputs, Session, SessionError, TestResult};

type SharedSession = Arc<Session>;

#[tokio::main]
pub async fn run_serve(session: Session, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(Arc::new(session));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!(%addr, "api listening");
    eprintln!("serving on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn router(session: SharedSession) -> Router {
    Router::new()
        .route("/api/cases", get(handle_cases))
        .route("/api/inputs", get(handle_get_inputs).put(handle_put_inputs))
        .route("/api/run", post(handle_run))
        .route("/api/results", get(handle_results))
        .route("/api/report", get(handle_report))
        .with_state(session)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(crate) async fn handle_cases(State(session): State<SharedSession>) -> Json<Vec<CasePreview>> {
    debug!("GET /api/cases");
    Json(session.pending_preview())
}

pub(crate) async fn handle_get_inputs(State(session): State<SharedSession>) -> Json<CustomInputs> {
    debug!("GET /api/inputs");
    Json(session.inputs())
}

pub(crate) async fn handle_put_inputs(
    State(session): State<SharedSession>,
    Json(inputs): Json<CustomInputs>,
) -> Json<CustomInputs> {
    debug!("PUT /api/inputs");
    session.set_inputs(inputs);
    Json(session.inputs())
}

pub(crate) async fn handle_run(State(session): State<SharedSession>) -> Response {
    debug!("POST /api/run");
    match session.run().await {
        Ok(results) => Json(serde_json::json!({
            "results": &*results,
            "summary": summarize(&results),
        }))
        .into_response(),
        Err(e @ SessionError::RunInFlight) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// `null` until the first run completes.
pub(crate) async fn handle_results(State(session): State<SharedSession>) -> Json<Option<Vec<TestResult>>> {
    debug!("GET /api/results");
    Json(session.results().map(|r| r.to_vec()))
}

/// Plain-text report, empty before the first run.
pub(crate) async fn handle_report(State(session): State<SharedSession>) -> String {
    debug!("GET /api/report");
    session.report()
}
