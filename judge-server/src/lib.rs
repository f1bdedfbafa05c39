use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use judge_core::{
    CaseResult, EngineConfig, JudgeService, Language, OutcomeStatus, Submission, TestCase,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid language: {0}")]
    InvalidLanguage(String),
    #[error("Compilation failed: {0}")]
    CompileFailed(String),
    #[error("Timeout after {0} seconds")]
    Timeout(u64),
    #[error(transparent)]
    Judge(#[from] judge_core::Error),
    #[error("Server error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::InvalidLanguage(_)
            | ServerError::CompileFailed(_)
            | ServerError::Timeout(_)
            | ServerError::Judge(judge_core::Error::UnsupportedLanguage(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ServerError::Judge(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            ServerError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

/// Custom run: execute once against ad-hoc input, no grading.
#[derive(Debug, Deserialize, Serialize)]
pub struct RunRequest {
    pub language: String,
    pub code: String,
    pub input: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub success: bool,
    pub output: String,
}

/// Judged submission: the ordered case list comes from the problem
/// collaborator; the server stores nothing.
#[derive(Debug, Deserialize, Serialize)]
pub struct SubmitRequest {
    pub language: String,
    pub code: String,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub passed_all: bool,
    pub results: Vec<CaseResult>,
}

#[derive(Clone)]
pub struct AppState {
    service: Arc<JudgeService>,
}

pub async fn create_app(
    max_concurrent: usize,
    config: EngineConfig,
) -> Result<Router, ServerError> {
    let service = JudgeService::new(max_concurrent, config)
        .await
        .map_err(ServerError::Judge)?;

    let state = AppState {
        service: Arc::new(service),
    };

    let cors = CorsLayer::permissive();

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/run", post(run))
        .route("/submit", post(submit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(app)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    info!("Starting judge server on {}", addr);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn run(
    State(state): State<AppState>,
    Json(payload): Json<RunRequest>,
) -> Result<(StatusCode, Json<RunResponse>), ServerError> {
    let language: Language = payload
        .language
        .parse()
        .map_err(|_| ServerError::InvalidLanguage(payload.language.clone()))?;

    let submission = Submission {
        language,
        code: payload.code,
    };
    let outcome = state.service.run_custom(&submission, &payload.input).await?;

    match outcome.status {
        OutcomeStatus::Succeeded | OutcomeStatus::RuntimeFailed => {
            let output = if outcome.stdout.trim().is_empty() {
                outcome.stderr.trim().to_string()
            } else {
                outcome.stdout.trim().to_string()
            };
            Ok((
                StatusCode::CREATED,
                Json(RunResponse {
                    success: true,
                    output,
                }),
            ))
        }
        OutcomeStatus::CompileFailed => {
            Err(ServerError::CompileFailed(outcome.stderr.trim().to_string()))
        }
        OutcomeStatus::Timeout => Err(ServerError::Timeout(outcome.duration.as_secs())),
    }
}

async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ServerError> {
    let language: Language = payload
        .language
        .parse()
        .map_err(|_| ServerError::InvalidLanguage(payload.language.clone()))?;

    let submission = Submission {
        language,
        code: payload.code,
    };
    let verdict = state.service.submit(&submission, &payload.cases).await?;

    Ok(Json(SubmitResponse {
        success: true,
        passed_all: verdict.passed_all,
        results: verdict.results,
    }))
}
