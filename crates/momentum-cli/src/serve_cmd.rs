use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use momentum_core::token::{self, TokenConfig};
use momentum_core::{CoreError, Engine};
use momentum_db::models::{StepStatus, TaskStatus};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.into(),
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let status = match &err {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
            CoreError::GenerationEmpty(_) | CoreError::Generation(_) => StatusCode::BAD_GATEWAY,
            CoreError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %err, "request failed");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State and authentication
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
    pub tokens: TokenConfig,
}

/// The user bound to the request's bearer token.
pub struct AuthUser(pub Uuid);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("missing authorization header"))?;
        let bearer = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("expected a bearer token"))?;

        let user_id = token::validate_token(&state.tokens, bearer.trim()).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            AppError::unauthorized(e.to_string())
        })?;
        Ok(Self(user_id))
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub step_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct StepStatusRequest {
    pub status: StepStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    /// Date to finalize; today when omitted.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct TaskStatusRequest {
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
pub struct DeadlineRequest {
    pub deadline: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/goals", post(create_goal))
        .route("/api/goals/active", get(get_active_goal))
        .route("/api/goals/{goal_id}", put(update_goal))
        .route("/api/goals/{goal_id}/steps", get(list_steps).post(add_step))
        .route("/api/steps/order", put(reorder_steps))
        .route("/api/steps/{step_id}", put(update_step_title).delete(delete_step))
        .route("/api/steps/{step_id}/status", put(update_step_status))
        .route("/api/schedule/start", post(start_day))
        .route("/api/schedule/today", get(get_today))
        .route("/api/schedule/review", post(finalize_day))
        .route("/api/schedule/{date}", get(get_schedule))
        .route("/api/reviews/{date}", get(get_review))
        .route("/api/tasks", post(create_task))
        .route("/api/tasks/{task_id}", put(update_task_title).delete(delete_task))
        .route("/api/tasks/{task_id}/status", put(update_task_status))
        .route("/api/tasks/{task_id}/deadline", put(update_task_deadline))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("momentum serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("momentum serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers: goals and steps
// ---------------------------------------------------------------------------

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<GoalRequest>,
) -> Result<Response, AppError> {
    let goal = state
        .engine
        .roadmap()
        .create_goal(user_id, &body.description)
        .await?;
    Ok((StatusCode::CREATED, Json(goal)).into_response())
}

async fn get_active_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, AppError> {
    let goal = state
        .engine
        .roadmap()
        .get_active_goal(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("no active goal"))?;
    Ok(Json(goal).into_response())
}

async fn update_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(goal_id): Path<Uuid>,
    Json(body): Json<GoalRequest>,
) -> Result<Response, AppError> {
    let goal = state
        .engine
        .roadmap()
        .update_goal(user_id, goal_id, &body.description)
        .await?;
    Ok(Json(goal).into_response())
}

async fn list_steps(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(goal_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let steps = state.engine.roadmap().get_roadmap_steps(user_id, goal_id).await?;
    Ok(Json(steps).into_response())
}

async fn add_step(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(goal_id): Path<Uuid>,
    Json(body): Json<TitleRequest>,
) -> Result<Response, AppError> {
    let step = state
        .engine
        .roadmap()
        .add_step(user_id, goal_id, &body.title)
        .await?;
    Ok((StatusCode::CREATED, Json(step)).into_response())
}

async fn reorder_steps(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ReorderRequest>,
) -> Result<Response, AppError> {
    let steps = state
        .engine
        .roadmap()
        .reorder_steps(user_id, &body.step_ids)
        .await?;
    Ok(Json(steps).into_response())
}

async fn update_step_title(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(step_id): Path<Uuid>,
    Json(body): Json<TitleRequest>,
) -> Result<StatusCode, AppError> {
    state
        .engine
        .roadmap()
        .update_step_title(user_id, step_id, &body.title)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_step(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(step_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.engine.roadmap().delete_step(user_id, step_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_step_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(step_id): Path<Uuid>,
    Json(body): Json<StepStatusRequest>,
) -> Result<StatusCode, AppError> {
    state
        .engine
        .roadmap()
        .update_step_status(user_id, step_id, body.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Handlers: schedules and reviews
// ---------------------------------------------------------------------------

async fn start_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, AppError> {
    let tasks = state.engine.scheduler().start_day(user_id).await?;
    Ok(Json(tasks).into_response())
}

async fn get_today(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, AppError> {
    let today = state.engine.clock().today();
    let tasks = state.engine.scheduler().get_schedule(user_id, today).await?;
    Ok(Json(tasks).into_response())
}

async fn get_schedule(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<NaiveDate>,
) -> Result<Response, AppError> {
    let tasks = state.engine.scheduler().get_schedule(user_id, date).await?;
    Ok(Json(tasks).into_response())
}

async fn finalize_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Option<Json<ReviewRequest>>,
) -> Result<Response, AppError> {
    let date = body
        .and_then(|Json(b)| b.date)
        .unwrap_or_else(|| state.engine.clock().today());
    let review = state.engine.finalizer().finalize_day(user_id, date).await?;
    Ok(Json(review).into_response())
}

async fn get_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<NaiveDate>,
) -> Result<Response, AppError> {
    let review = state.engine.finalizer().get_review(user_id, date).await?;
    Ok(Json(review).into_response())
}

// ---------------------------------------------------------------------------
// Handlers: tasks
// ---------------------------------------------------------------------------

async fn create_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateTaskRequest>,
) -> Result<Response, AppError> {
    let task = state
        .engine
        .tasks()
        .create_manual_task(user_id, &body.title, body.deadline)
        .await?;
    Ok((StatusCode::CREATED, Json(task)).into_response())
}

async fn update_task_title(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<Uuid>,
    Json(body): Json<TitleRequest>,
) -> Result<StatusCode, AppError> {
    state
        .engine
        .tasks()
        .update_task_title(user_id, task_id, &body.title)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.engine.tasks().delete_task(user_id, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_task_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<Uuid>,
    Json(body): Json<TaskStatusRequest>,
) -> Result<StatusCode, AppError> {
    state
        .engine
        .tasks()
        .update_task_status(user_id, task_id, body.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_task_deadline(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<Uuid>,
    Json(body): Json<DeadlineRequest>,
) -> Result<StatusCode, AppError> {
    state
        .engine
        .tasks()
        .update_task_deadline(user_id, task_id, body.deadline)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use sqlx::PgPool;
    use tower::ServiceExt;
    use uuid::Uuid;

    use momentum_core::Engine;
    use momentum_core::clock::FixedClock;
    use momentum_core::testing::ScriptedGenerator;
    use momentum_core::token::{TokenConfig, generate_token};
    use momentum_test_utils::{create_test_db, drop_test_db};

    use super::AppState;

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    fn test_state(pool: &PgPool, generator: Arc<ScriptedGenerator>) -> AppState {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap(),
        ));
        AppState {
            engine: Engine::new(pool.clone(), generator, clock),
            tokens: TokenConfig::new(b"serve-test-secret".to_vec()),
        }
    }

    fn bearer(state: &AppState, user_id: Uuid) -> String {
        format!("Bearer {}", generate_token(&state.tokens, user_id))
    }

    async fn send_request(
        state: &AppState,
        method: &str,
        uri: &str,
        auth: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> axum::response::Response {
        let app = super::build_router(state.clone());
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.oneshot(request).await.unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn roadmap_generator() -> Arc<ScriptedGenerator> {
        Arc::new(
            ScriptedGenerator::new()
                .with_roadmap(["Learn the basics", "Build a project", "Ship it"])
                .with_daily_tasks(["Read chapter one", "Write notes"])
                .with_feedback("Nice work today."),
        )
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_health_needs_no_token() {
        let (pool, db_name) = create_test_db().await;
        let state = test_state(&pool, roadmap_generator());

        let resp = send_request(&state, "GET", "/api/health", None, None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!({ "status": "ok" }));

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_missing_or_bad_token_is_unauthorized() {
        let (pool, db_name) = create_test_db().await;
        let state = test_state(&pool, roadmap_generator());

        let resp = send_request(&state, "GET", "/api/goals/active", None, None).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = send_request(
            &state,
            "GET",
            "/api/goals/active",
            Some("Bearer momentum_ut_garbage"),
            None,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert!(json["error"].is_string());

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_create_goal_then_fetch_active() {
        let (pool, db_name) = create_test_db().await;
        let state = test_state(&pool, roadmap_generator());
        let auth = bearer(&state, Uuid::new_v4());

        let resp = send_request(
            &state,
            "POST",
            "/api/goals",
            Some(&auth),
            Some(serde_json::json!({ "description": "Learn Rust" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        assert_eq!(created["goal"]["description"], "Learn Rust");
        let steps = created["steps"].as_array().expect("steps should be an array");
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0]["step_order"], 1);
        assert_eq!(steps[0]["status"], "pending");

        let resp = send_request(&state, "GET", "/api/goals/active", Some(&auth), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let active = body_json(resp).await;
        assert_eq!(active["goal"]["id"], created["goal"]["id"]);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_no_active_goal_is_not_found() {
        let (pool, db_name) = create_test_db().await;
        let state = test_state(&pool, roadmap_generator());
        let auth = bearer(&state, Uuid::new_v4());

        let resp = send_request(&state, "GET", "/api/goals/active", Some(&auth), None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = send_request(&state, "GET", "/api/reviews/2026-03-01", Some(&auth), None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_blank_description_is_bad_request() {
        let (pool, db_name) = create_test_db().await;
        let state = test_state(&pool, roadmap_generator());
        let auth = bearer(&state, Uuid::new_v4());

        let resp = send_request(
            &state,
            "POST",
            "/api/goals",
            Some(&auth),
            Some(serde_json::json!({ "description": "   " })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_generator_failure_is_bad_gateway() {
        let (pool, db_name) = create_test_db().await;
        let generator = roadmap_generator();
        generator.fail_roadmap(true);
        let state = test_state(&pool, generator);
        let auth = bearer(&state, Uuid::new_v4());

        let resp = send_request(
            &state,
            "POST",
            "/api/goals",
            Some(&auth),
            Some(serde_json::json!({ "description": "Learn Rust" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_reorder_with_foreign_step_is_forbidden() {
        let (pool, db_name) = create_test_db().await;
        let state = test_state(&pool, roadmap_generator());
        let auth = bearer(&state, Uuid::new_v4());

        let resp = send_request(
            &state,
            "POST",
            "/api/goals",
            Some(&auth),
            Some(serde_json::json!({ "description": "Learn Rust" })),
        )
        .await;
        let created = body_json(resp).await;
        let mut ids: Vec<serde_json::Value> = created["steps"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].clone())
            .collect();

        ids.reverse();
        let resp = send_request(
            &state,
            "PUT",
            "/api/steps/order",
            Some(&auth),
            Some(serde_json::json!({ "step_ids": ids })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let reordered = body_json(resp).await;
        assert_eq!(reordered[0]["title"], "Ship it");

        ids[0] = serde_json::json!(Uuid::new_v4());
        let resp = send_request(
            &state,
            "PUT",
            "/api/steps/order",
            Some(&auth),
            Some(serde_json::json!({ "step_ids": ids })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_start_day_then_complete_task() {
        let (pool, db_name) = create_test_db().await;
        let state = test_state(&pool, roadmap_generator());
        let auth = bearer(&state, Uuid::new_v4());

        send_request(
            &state,
            "POST",
            "/api/goals",
            Some(&auth),
            Some(serde_json::json!({ "description": "Learn Rust" })),
        )
        .await;

        let resp = send_request(&state, "POST", "/api/schedule/start", Some(&auth), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let tasks = body_json(resp).await;
        let tasks = tasks.as_array().expect("schedule should be an array");
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0]["scheduled_date"], "2026-03-02");

        let task_id = tasks[0]["id"].as_str().unwrap().to_string();
        let resp = send_request(
            &state,
            "PUT",
            &format!("/api/tasks/{task_id}/status"),
            Some(&auth),
            Some(serde_json::json!({ "status": "completed" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = send_request(
            &state,
            "PUT",
            &format!("/api/tasks/{task_id}/status"),
            Some(&auth),
            Some(serde_json::json!({ "status": "completed" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = send_request(&state, "GET", "/api/schedule/2026-03-02", Some(&auth), None).await;
        let stored = body_json(resp).await;
        assert_eq!(stored.as_array().unwrap().len(), 2);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_finalize_then_read_review() {
        let (pool, db_name) = create_test_db().await;
        let state = test_state(&pool, roadmap_generator());
        let auth = bearer(&state, Uuid::new_v4());

        let resp = send_request(
            &state,
            "POST",
            "/api/tasks",
            Some(&auth),
            Some(serde_json::json!({ "title": "Stretch" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = send_request(&state, "POST", "/api/schedule/review", Some(&auth), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let review = body_json(resp).await;
        assert_eq!(review["review_date"], "2026-03-02");
        assert_eq!(review["feedback"], "Nice work today.");

        let resp = send_request(&state, "GET", "/api/reviews/2026-03-02", Some(&auth), None).await;
        assert_eq!(resp.status(), StatusCode::OK);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_other_users_task_is_not_found() {
        let (pool, db_name) = create_test_db().await;
        let state = test_state(&pool, roadmap_generator());
        let owner = bearer(&state, Uuid::new_v4());
        let intruder = bearer(&state, Uuid::new_v4());

        let resp = send_request(
            &state,
            "POST",
            "/api/tasks",
            Some(&owner),
            Some(serde_json::json!({ "title": "Private" })),
        )
        .await;
        let task = body_json(resp).await;
        let task_id = task["id"].as_str().unwrap().to_string();

        let resp = send_request(
            &state,
            "DELETE",
            &format!("/api/tasks/{task_id}"),
            Some(&intruder),
            None,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = send_request(
            &state,
            "DELETE",
            &format!("/api/tasks/{task_id}"),
            Some(&owner),
            None,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        pool.close().await;
        drop_test_db(&db_name).await;
    }
}
