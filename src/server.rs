use crate::config::Config;
use crate::data::{GenerationInput, GenerationOptions, GenerationOutput, Seed, ValidationInput};
use crate::error::AssignmentError;
use crate::solver;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct AppState {
    pub max_attempts: u32,
}

impl From<&Config> for AppState {
    fn from(config: &Config) -> Self {
        Self {
            max_attempts: config.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, kind: &str, message: String) -> ApiError {
    (
        status,
        Json(ErrorBody {
            kind: kind.to_string(),
            message,
        }),
    )
}

fn status_for(err: &AssignmentError) -> StatusCode {
    match err {
        AssignmentError::InfeasibleConstraints(_) | AssignmentError::AttemptsExhausted { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AssignmentError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AssignmentError::InvariantViolation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Seed for requests that do not bring one: the current time in milliseconds.
fn clock_seed() -> Seed {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| Seed::try_from(d.as_millis()).unwrap_or_default())
        .unwrap_or_default()
}

async fn generate_handler(
    State(state): State<AppState>,
    Json(input): Json<GenerationInput>,
) -> Result<Json<GenerationOutput>, ApiError> {
    let fallback = GenerationOptions::new(clock_seed()).with_max_attempts(state.max_attempts);
    // the search is CPU-bound; keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || solver::solve(&input, fallback)).await;
    match outcome {
        Ok(Ok(output)) => Ok(Json(output)),
        Ok(Err(e)) => {
            error!("Assignment generation failed: {}", e);
            Err(api_error(status_for(&e), e.kind(), e.to_string()))
        }
        Err(e) => {
            error!("Assignment generation task failed: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "assignment generation did not complete".to_string(),
            ))
        }
    }
}

async fn validate_handler(Json(input): Json<ValidationInput>) -> Result<Json<ValidationReport>, ApiError> {
    match solver::check(&input) {
        Ok(()) => Ok(Json(ValidationReport { valid: true })),
        Err(e) => {
            info!("Submitted assignments rejected: {}", e);
            Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, e.kind(), e.to_string()))
        }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/assignments/generate", post(generate_handler))
        .route("/v1/assignments/validate", post(validate_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let app = router(AppState::from(&config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
