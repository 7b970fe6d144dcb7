// SPDX-License-Identifier: MIT

//! HTTP service for compiling and evaluating conditions

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::condition::{Condition, EvalError, Record};
use crate::config::ServerConfig;
use crate::error::RulesError;
use crate::rules::RuleRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: RuleRegistry,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/compile", post(compile_expression))
        .route("/api/evaluate", post(evaluate_expression))
        .route("/api/rules", get(list_rules))
        .route("/api/rules/evaluate", post(evaluate_all_rules))
        .route("/api/rules/{name}", put(put_rule).delete(delete_rule))
        .route("/api/rules/{name}/evaluate", post(evaluate_rule))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(config: &ServerConfig, registry: RuleRegistry) -> Result<(), RulesError> {
    let app = router(AppState { registry });

    let addr = config.addr();
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Deserialize)]
struct CompileRequest {
    expression: String,
}

#[derive(Deserialize)]
struct EvaluateRequest {
    expression: String,
    #[serde(default)]
    record: Record,
}

#[derive(Deserialize)]
struct RecordRequest {
    #[serde(default)]
    record: Record,
}

type JsonResponse = (StatusCode, Json<Value>);

fn syntax_errors_body(err: &EvalError) -> Value {
    let errors: Vec<Value> = err
        .syntax_errors()
        .iter()
        .map(|e| json!({"line": e.line, "column": e.column, "message": e.message}))
        .collect();
    json!({ "valid": false, "errors": errors })
}

fn eval_error_body(err: &EvalError) -> Value {
    json!({
        "kind": err.kind().to_string(),
        "field": err.field(),
        "column": err.column(),
        "message": err.to_string(),
    })
}

fn outcome_json(result: &Result<bool, EvalError>) -> Value {
    match result {
        Ok(matched) => json!({ "result": matched }),
        Err(e) => json!({ "error": eval_error_body(e) }),
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn compile_expression(Json(payload): Json<CompileRequest>) -> JsonResponse {
    match Condition::compile(&payload.expression) {
        Ok(condition) => (
            StatusCode::OK,
            Json(json!({
                "valid": true,
                "normalized": condition.to_string(),
                "fields": condition.expression().fields(),
            })),
        ),
        Err(e) => (StatusCode::BAD_REQUEST, Json(syntax_errors_body(&e))),
    }
}

async fn evaluate_expression(Json(payload): Json<EvaluateRequest>) -> JsonResponse {
    let condition = match Condition::compile(&payload.expression) {
        Ok(condition) => condition,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(syntax_errors_body(&e))),
    };

    let result = condition.evaluate(&payload.record);
    let status = if result.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(outcome_json(&result)))
}

async fn list_rules(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.registry.names().await))
}

async fn put_rule(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<CompileRequest>,
) -> JsonResponse {
    match state
        .registry
        .compile_and_register(name.clone(), &payload.expression)
        .await
    {
        Ok(()) => {
            log::info!("Registered rule {}", name);
            (
                StatusCode::OK,
                Json(json!({ "name": name, "expression": payload.expression })),
            )
        }
        Err(e) => (StatusCode::BAD_REQUEST, Json(syntax_errors_body(&e))),
    }
}

async fn delete_rule(State(state): State<AppState>, Path(name): Path<String>) -> StatusCode {
    match state.registry.remove(&name).await {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

async fn evaluate_rule(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<RecordRequest>,
) -> JsonResponse {
    match state.registry.evaluate(&name, &payload.record).await {
        Ok(matched) => (StatusCode::OK, Json(json!({ "result": matched }))),
        Err(RulesError::UnknownRule(name)) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Rule '{}' not found", name) })),
        ),
        Err(RulesError::Eval(e)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": eval_error_body(&e) })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

async fn evaluate_all_rules(
    State(state): State<AppState>,
    Json(payload): Json<RecordRequest>,
) -> Json<Value> {
    let outcomes: serde_json::Map<String, Value> = state
        .registry
        .evaluate_all(&payload.record)
        .await
        .iter()
        .map(|(name, result)| (name.clone(), outcome_json(result)))
        .collect();
    Json(Value::Object(outcomes))
}
