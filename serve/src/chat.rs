//! `/api/chat`: one conversational turn per request.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use saathi::{ReportSummary, TurnOutcome};

use crate::app::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct ChatRequest {
    /// Omitted on the first message; the response carries the id to send back on
    /// later turns.
    #[serde(default)]
    session_id: Option<String>,
    query: String,
}

/// Runs one turn against the session's transcript and answers with the flat summary.
///
/// An empty query is a 400; a model-call failure is a 500 with the error message.
/// A reply that is not a structured report still answers 200, with the raw text in
/// `response` and placeholder values elsewhere.
pub(crate) async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<Value>) {
    let query = request.query.trim();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Query cannot be empty"})),
        );
    }

    let session_id = request
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let handle = state.sessions.get_or_create(&session_id);
    let mut transcript = handle.lock().await;

    let (outcome, updated) = state.advisor.process_turn(query, transcript.clone()).await;
    *transcript = updated;
    drop(transcript);

    let summary = match outcome {
        TurnOutcome::Report(report) => ReportSummary::from_report(*report),
        TurnOutcome::Degraded { raw } => ReportSummary::degraded(raw),
        TurnOutcome::Failed { message } => {
            error!(session = %session_id, "turn failed: {message}");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": message})));
        }
    };

    info!(session = %session_id, emission = summary.carbon_emission, "turn complete");
    let mut body = serde_json::to_value(&summary).unwrap_or_else(|_| json!({}));
    body["session_id"] = json!(session_id);
    (StatusCode::OK, Json(body))
}
