//! JSON handler accepting commands.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use lampctl_app::ports::{LightTransport, SnapshotStore};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for running a command.
#[derive(Deserialize)]
pub struct CommandRequest {
    /// Whole command line, e.g. `"much darker kitchen"`.
    pub action: String,
}

/// Body of an accepted command.
#[derive(Debug, Serialize)]
pub struct CommandAccepted {
    pub status: &'static str,
    pub action: String,
}

/// Possible responses from the execute endpoint.
pub enum ExecuteResponse {
    Accepted(Json<CommandAccepted>),
}

impl IntoResponse for ExecuteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted(json) => (StatusCode::ACCEPTED, json).into_response(),
        }
    }
}

/// `POST /api/commands`
///
/// Compiles the command before answering; the run itself continues in the
/// background.
pub async fn execute<T, S>(
    State(state): State<AppState<T, S>>,
    Json(request): Json<CommandRequest>,
) -> Result<ExecuteResponse, ApiError>
where
    T: LightTransport + 'static,
    S: SnapshotStore + 'static,
{
    let action = request.action.to_lowercase();
    let tokens: Vec<&str> = action.split_whitespace().collect();
    let command = state.commands.compile(&tokens)?;
    let permit = state.commands.reserve()?;

    let commands = Arc::clone(&state.commands);
    tokio::spawn(async move {
        match commands.execute_with(permit, command).await {
            Ok(summary) => {
                tracing::info!(
                    verb = %summary.verb,
                    devices = summary.outcomes.len(),
                    failures = summary.failures(),
                    "command finished"
                );
                tracing::debug!("{summary}");
            }
            Err(err) => tracing::error!(error = ?err, "command failed"),
        }
    });

    Ok(ExecuteResponse::Accepted(Json(CommandAccepted {
        status: "executing",
        action,
    })))
}
