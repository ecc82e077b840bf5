//! aidoc HTTP 服务
//!
//! 启动: cargo run
//! POST /api/ai/ask { "userId": "...", "question": "..." } -> { "response": "..." }

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aidoc::config::{load_config, AppConfig};
use aidoc::error::DoctorError;
use aidoc::orchestrator::HttpOrchestrator;
use aidoc::DoctorService;

struct AppState {
    doctor: DoctorService,
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    question: Option<String>,
}

#[derive(Debug, Serialize)]
struct AskResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateUserResponse {
    id: String,
}

/// 错误响应体：error 给调用方，details 给运维排查
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn error_response(err: DoctorError) -> (StatusCode, Json<ErrorBody>) {
    let (status, message, details) = match &err {
        DoctorError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
        DoctorError::UserNotFound(_) => {
            (StatusCode::NOT_FOUND, "User not found".to_string(), None)
        }
        DoctorError::EmptyReply => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "AI returned no reply".to_string(),
            None,
        ),
        DoctorError::ExecutionFailed { record } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "AI execution failed".to_string(),
            serde_json::to_string(record).ok(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "AI service error".to_string(),
            Some(err.to_string()),
        ),
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "ask failed");
    }
    (
        status,
        Json(ErrorBody {
            error: message,
            details,
        }),
    )
}

/// POST /api/ai/ask：问诊入口，字段校验在任何存储/网络调用之前
async fn api_ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, Json<ErrorBody>)> {
    let (user_id, question) = match (
        req.user_id.as_deref().map(str::trim),
        req.question.as_deref().map(str::trim),
    ) {
        (Some(u), Some(q)) if !u.is_empty() && !q.is_empty() => (u, q),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "userId and question are required".to_string(),
                    details: None,
                }),
            ))
        }
    };

    let reply = state
        .doctor
        .ask(user_id, question)
        .await
        .map_err(error_response)?;
    Ok(Json(AskResponse { response: reply }))
}

/// POST /api/users：创建用户（最小供给面，注册/登录不在本服务范围）
async fn api_create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), (StatusCode, Json<ErrorBody>)> {
    let name = match req.name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "name is required".to_string(),
                    details: None,
                }),
            ))
        }
    };
    let record = state.doctor.users().create(name).map_err(error_response)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse { id: record.id }),
    ))
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/ai/ask", post(api_ask))
        .route("/api/users", post(api_create_user))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with(fmt::layer())
        .init();

    let cfg: AppConfig = load_config(None).unwrap_or_default();
    std::fs::create_dir_all(&cfg.storage.data_dir)?;

    let orch = Arc::new(HttpOrchestrator::from_config(&cfg.orchestrator)?);
    let doctor = DoctorService::new(&cfg, orch);
    let state = Arc::new(AppState { doctor });

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.server.port));
    tracing::info!("aidoc listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
