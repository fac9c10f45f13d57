//! microcheck REST API server.
//!
//! Provides HTTP endpoints for test selection via the microcheck engine.
//!
//! Run with: `cargo run --bin microcheck-server --features server`
//!
//! Environment variables:
//! - `MICROCHECK_PORT` - Port to listen on (default: 8080)
//! - `MICROCHECK_HOST` - Host to bind to (default: 0.0.0.0)
//! - `MICROCHECK_API_TOKEN` - Bearer token for authentication (optional, if set all requests require it)

use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tempfile::NamedTempFile;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use microcheck::cli::args::{Args, parse_coverage, parse_history_length};
use microcheck::cli::exit::Outcome;
use microcheck::config::{DEFAULT_HISTORY_LENGTH, DEFAULT_TEST_PREFIX};
use microcheck::orchestrator;

/// Server configuration from environment.
#[derive(Clone)]
struct Config {
    port: u16,
    host: String,
    api_token: Option<String>,
}

impl Config {
    fn from_env() -> Self {
        Self {
            port: std::env::var("MICROCHECK_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            host: std::env::var("MICROCHECK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_token: std::env::var("MICROCHECK_API_TOKEN")
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "microcheck_server=info,microcheck=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("invalid listen address {}:{}: {}", config.host, config.port, e);
            return;
        }
    };

    if config.api_token.is_some() {
        tracing::info!("API token authentication enabled");
    } else {
        tracing::warn!("No MICROCHECK_API_TOKEN set - API is unauthenticated");
    }

    let shared_config = Arc::new(config);

    let app = Router::new()
        .route("/health", get(health))
        .route("/select", post(select))
        .with_state(shared_config)
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024)) // 50MB max
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("microcheck-server listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {}: {}", addr, e);
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", e);
    }
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

fn form_coverage(text: &str) -> Result<u32, Response> {
    parse_coverage(text).map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            "coverage must be a whole number 1 <= x <= 100",
        )
    })
}

fn form_history_length(text: &str) -> Result<usize, Response> {
    parse_history_length(text).map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            "test_history_length must be a whole number >= 1",
        )
    })
}

/// Select the minimal covering tests for a team.
///
/// Accepts multipart form data with:
/// - `history`: The history CSV (test, team, status, branch)
/// - `team`: Oncall team (required)
/// - `coverage`: Percentage of failing PRs to cover, 1-100 (required)
/// - `test_history_length`: (optional) Results examined per test (default 100)
/// - `test_prefix`: (optional) Test name prefix (default linux:__python)
///
/// Requires `Authorization: Bearer <token>` header if `MICROCHECK_API_TOKEN` is set.
async fn select(
    State(config): State<Arc<Config>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Some(expected_token) = &config.api_token {
        let auth_header = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        let provided_token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .unwrap_or("");

        if provided_token != expected_token {
            return error_response(
                StatusCode::UNAUTHORIZED,
                "Invalid or missing bearer token",
            );
        }
    }

    let mut history_file: Option<NamedTempFile> = None;
    let mut team: Option<String> = None;
    let mut coverage: Option<u32> = None;
    let mut history_length: usize = DEFAULT_HISTORY_LENGTH;
    let mut test_prefix: String = DEFAULT_TEST_PREFIX.to_string();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "history" => {
                let data = match field.bytes().await {
                    Ok(data) => data,
                    Err(e) => {
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to read 'history' file: {}", e),
                        );
                    }
                };
                let mut temp = match NamedTempFile::new() {
                    Ok(t) => t,
                    Err(e) => {
                        return error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            format!("Failed to create temp file: {}", e),
                        );
                    }
                };
                if let Err(e) = temp.write_all(&data) {
                    return error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to write temp file: {}", e),
                    );
                }
                history_file = Some(temp);
            }
            "team" => {
                if let Ok(text) = field.text().await {
                    let text = text.trim();
                    if !text.is_empty() {
                        team = Some(text.to_string());
                    }
                }
            }
            "coverage" => match field.text().await {
                Ok(text) => match form_coverage(&text) {
                    Ok(val) => coverage = Some(val),
                    Err(response) => return response,
                },
                Err(e) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read 'coverage': {}", e),
                    );
                }
            },
            "test_history_length" => match field.text().await {
                Ok(text) => match form_history_length(&text) {
                    Ok(val) => history_length = val,
                    Err(response) => return response,
                },
                Err(e) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read 'test_history_length': {}", e),
                    );
                }
            },
            "test_prefix" => {
                if let Ok(text) = field.text().await {
                    test_prefix = text;
                }
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let Some(history_temp) = history_file else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required field: 'history' (CSV file)",
        );
    };
    let Some(team) = team else {
        return error_response(StatusCode::BAD_REQUEST, "Missing required field: 'team'");
    };
    let Some(coverage) = coverage else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required field: 'coverage'",
        );
    };

    let args = Args::new(
        team,
        coverage,
        PathBuf::from(history_temp.path()),
        history_length,
        test_prefix,
        true, // Always return JSON from API
    );

    match orchestrator::run(&args) {
        Ok(result) => {
            let status = match result.outcome {
                Outcome::Selected => StatusCode::OK,
                Outcome::Refusal => StatusCode::UNPROCESSABLE_ENTITY,
            };

            match serde_json::from_str::<serde_json::Value>(&result.output) {
                Ok(json) => (status, Json(json)).into_response(),
                Err(_) => (
                    status,
                    Json(serde_json::json!({
                        "raw_output": result.output
                    })),
                )
                    .into_response(),
            }
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Selection failed: {}", e),
        ),
    }
}
