//! HTTP request handlers for the Promotion Allocation Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    CycleParameters, evaluate_eligibility, resolve_step, run_promotion_cycle, run_step_increment,
    validate_candidate,
};
use crate::error::EngineError;
use crate::models::{CandidateIssue, CandidateRecord, CycleOutcome, IncrementOutcome, VacancyConfig};
use crate::ports::AuditSink;
use crate::ports::memory::{MemoryDisciplinaryRegistry, MemoryStaffDirectory};

use super::request::{
    AllocationRequest, EligibilityRequest, StepIncrementRequest, StepRecommendationRequest,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/allocate", post(allocate_handler))
        .route("/eligibility", post(eligibility_handler))
        .route("/step-recommendation", post(step_recommendation_handler))
        .route("/step-increment", post(step_increment_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(body: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn engine_error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    ApiErrorResponse::from(err).into_response()
}

/// Turns a JSON extraction failure into a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's description of the problem
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse {
        status: StatusCode::BAD_REQUEST,
        error,
    }
    .into_response()
}

/// Handler for POST /allocate.
///
/// Runs a promotion cycle over the candidates in the request and returns the
/// cycle outcome.
async fn allocate_handler(
    State(state): State<AppState>,
    payload: Result<Json<AllocationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing allocation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match perform_allocation(&state, request) {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                run_id = %outcome.run_id,
                cycle_id = %outcome.promotion_cycle_id,
                grades = outcome.grades.len(),
                promoted = outcome.summary.promoted,
                issues = outcome.issues.len(),
                duration_us = start_time.elapsed().as_micros() as u64,
                "Allocation completed successfully"
            );
            json_response(outcome)
        }
        Err(err) => err.into_response_for(correlation_id),
    }
}

/// Errors from the allocation path, which may already be API errors.
enum HandlerError {
    Engine(EngineError),
    Api(ApiErrorResponse),
}

impl From<EngineError> for HandlerError {
    fn from(err: EngineError) -> Self {
        HandlerError::Engine(err)
    }
}

impl HandlerError {
    fn into_response_for(self, correlation_id: Uuid) -> Response {
        match self {
            HandlerError::Engine(err) => engine_error_response(correlation_id, err),
            HandlerError::Api(api_error) => {
                warn!(
                    correlation_id = %correlation_id,
                    code = %api_error.error.code,
                    error = %api_error.error.message,
                    "Request rejected"
                );
                api_error.into_response()
            }
        }
    }
}

fn perform_allocation(
    state: &AppState,
    request: AllocationRequest,
) -> Result<CycleOutcome, HandlerError> {
    let config = state.config();
    let salary_table = config.salary_table(request.evaluation_date)?;

    let vacancies: Vec<VacancyConfig> = match &request.vacancies {
        Some(vacancies) => vacancies
            .iter()
            .map(|v| v.to_config(v.grade, &request.promotion_cycle_id))
            .collect::<Result<Vec<_>, EngineError>>()?,
        None => config
            .vacancies(&request.promotion_cycle_id)
            .map_err(|_| {
                HandlerError::Api(ApiErrorResponse::unprocessable(ApiError::unknown_cycle(
                    &request.promotion_cycle_id,
                )))
            })?
            .to_vec(),
    };

    // Goal-rated candidates get their performance score derived up front
    let mut records = Vec::with_capacity(request.candidates.len());
    let mut issues = Vec::new();
    let mut performance_steps = Vec::new();
    for candidate in request.candidates {
        let candidate_id = candidate.id.clone();
        match candidate.into_record(performance_steps.len() as u32 + 1) {
            Ok((record, audit_step)) => {
                records.push(record);
                performance_steps.extend(audit_step);
            }
            Err(err) => issues.push(CandidateIssue::from_error(&candidate_id, &err)),
        }
    }

    let params = CycleParameters {
        promotion_cycle_id: &request.promotion_cycle_id,
        evaluation_date: request.evaluation_date,
        vacancies: &vacancies,
        salary_table,
        bounds: config.bounds(),
    };
    let directory = MemoryStaffDirectory::new(records);
    let discipline = MemoryDisciplinaryRegistry::new(request.disciplinary_holds);
    let mut outcome = run_promotion_cycle(&params, &directory, &discipline)?;

    let offset = performance_steps.len() as u32;
    for step in outcome.audit_trace.steps.iter_mut() {
        step.step_number += offset;
    }
    performance_steps.append(&mut outcome.audit_trace.steps);
    outcome.audit_trace.steps = performance_steps;
    issues.append(&mut outcome.issues);
    outcome.issues = issues;

    state.audit()?.record_cycle(&outcome)?;
    Ok(outcome)
}

/// Handler for POST /eligibility.
///
/// Evaluates one candidate's eligibility for the cycle.
async fn eligibility_handler(
    State(state): State<AppState>,
    payload: Result<Json<EligibilityRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing eligibility request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let config = state.config();
    let evaluation_date = request.evaluation_date;
    let result = request.candidate.into_record(1).and_then(|(candidate, _)| {
        validate_candidate(&candidate, config.bounds(), evaluation_date)?;

        let vacancy = match &request.vacancy {
            Some(v) => Some(v.to_config(candidate.current_grade, &request.promotion_cycle_id)?),
            None => config
                .vacancies(&request.promotion_cycle_id)
                .ok()
                .and_then(|all| all.iter().find(|v| v.grade == candidate.current_grade))
                .cloned(),
        };

        evaluate_eligibility(
            &candidate,
            vacancy.as_ref(),
            request.disciplinary_hold,
            evaluation_date,
            1,
        )
    });

    match result {
        Ok(decision) => {
            info!(
                correlation_id = %correlation_id,
                candidate_id = %decision.candidate_id,
                grade = decision.grade,
                eligible = decision.is_eligible(),
                "Eligibility evaluated"
            );
            json_response(decision)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /step-recommendation.
///
/// Recommends the destination step for a promotion from a grade and step.
async fn step_recommendation_handler(
    State(state): State<AppState>,
    payload: Result<Json<StepRecommendationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing step recommendation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let config = state.config();
    let bounds = config.bounds();

    let max_step = match bounds.max_step(request.current_grade) {
        Ok(max_step) => max_step,
        Err(err) => return engine_error_response(correlation_id, err),
    };
    if request.current_step == 0 || request.current_step > max_step {
        return HandlerError::Api(ApiErrorResponse::unprocessable(ApiError::validation_error(
            format!(
                "step {} is outside 1-{} for grade {}",
                request.current_step, max_step, request.current_grade
            ),
        )))
        .into_response_for(correlation_id);
    }

    let next_grade = request
        .current_grade
        .checked_add(1)
        .filter(|_| !bounds.is_highest_grade(request.current_grade));
    let Some(destination_grade) = request.destination_grade.or(next_grade) else {
        return HandlerError::Api(ApiErrorResponse::unprocessable(ApiError::validation_error(
            format!(
                "grade {} is the highest grade and has no grade to promote to",
                request.current_grade
            ),
        )))
        .into_response_for(correlation_id);
    };
    if destination_grade <= request.current_grade {
        return HandlerError::Api(ApiErrorResponse::unprocessable(ApiError::validation_error(
            format!(
                "destination grade {} must be above the current grade {}",
                destination_grade, request.current_grade
            ),
        )))
        .into_response_for(correlation_id);
    }

    let effective_date = request
        .effective_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let result = config.salary_table(effective_date).and_then(|table| {
        resolve_step(
            table,
            bounds,
            request.current_grade,
            request.current_step,
            destination_grade,
            1,
        )
    });

    match result {
        Ok(transition) => {
            if transition.needs_review {
                warn!(
                    correlation_id = %correlation_id,
                    grade = transition.current_grade,
                    step = transition.current_step,
                    "Step recommendation needs manual review"
                );
            }
            info!(
                correlation_id = %correlation_id,
                destination_grade = transition.destination_grade,
                new_step = transition.new_step,
                salary_increment = %transition.salary_increment,
                "Step recommendation completed"
            );
            json_response(transition)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /step-increment.
///
/// Applies the periodic step increment to the staff snapshot. A period that
/// was already processed returns its existing records unchanged.
async fn step_increment_handler(
    State(state): State<AppState>,
    payload: Result<Json<StepIncrementRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing step increment request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match perform_step_increment(&state, request) {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                run_id = %outcome.run_id,
                period_id = %outcome.period_id,
                already_processed = outcome.already_processed,
                incremented = outcome.summary.incremented,
                "Step increment completed successfully"
            );
            json_response(outcome)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

fn perform_step_increment(
    state: &AppState,
    request: StepIncrementRequest,
) -> Result<IncrementOutcome, EngineError> {
    let staff: Vec<CandidateRecord> = request.staff.into_iter().map(Into::into).collect();
    let mut directory = MemoryStaffDirectory::new(staff);

    let outcome = {
        let mut ledger = state.ledger()?;
        run_step_increment(
            &request.period_id,
            request.effective_date,
            &mut directory,
            &mut *ledger,
            state.config().bounds(),
        )?
    };

    state.audit()?.record_increment(&outcome)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/conraiss").expect("Failed to load config");
        AppState::new(config)
    }

    fn candidate(id: &str, grade: u32, step: u32, exam: &str) -> Value {
        json!({
            "id": id,
            "current_grade": grade,
            "current_step": step,
            "confirmation_date": "2015-03-01",
            "date_of_birth": "1985-05-20",
            "file_number": format!("NB/{id}"),
            "date_of_last_promotion": "2020-01-01",
            "exam_score": exam,
            "periodic_performance_score": "70"
        })
    }

    async fn post(router: Router, uri: &str, body: String) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_allocate_with_configured_vacancies() {
        let state = create_test_state();
        let router = create_router(state.clone());

        let body = json!({
            "promotion_cycle_id": "2025",
            "evaluation_date": "2025-06-30",
            "candidates": [
                candidate("a", 6, 4, "90"),
                candidate("b", 6, 4, "80"),
                candidate("c", 6, 4, "70")
            ]
        });

        let (status, value) = post(router, "/allocate", body.to_string()).await;
        assert_eq!(status, StatusCode::OK);

        let outcome: CycleOutcome = serde_json::from_value(value).unwrap();
        // grade 6 has two promotion slots in the 2025 configuration
        assert_eq!(outcome.summary.promoted, 2);
        assert!(outcome.result_for("a").unwrap().is_promoted);
        assert!(!outcome.result_for("c").unwrap().is_promoted);
        assert_eq!(state.audit().unwrap().cycles.len(), 1);
    }

    #[tokio::test]
    async fn test_allocate_unknown_cycle_returns_422() {
        let router = create_router(create_test_state());
        let body = json!({
            "promotion_cycle_id": "1999",
            "evaluation_date": "2025-06-30",
            "candidates": []
        });

        let (status, value) = post(router, "/allocate", body.to_string()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(value["code"], "UNKNOWN_CYCLE");
    }

    #[tokio::test]
    async fn test_allocate_negative_vacancy_returns_422() {
        let router = create_router(create_test_state());
        let body = json!({
            "promotion_cycle_id": "2025",
            "evaluation_date": "2025-06-30",
            "candidates": [],
            "vacancies": [{ "grade": 6, "promotion_slots": -2 }]
        });

        let (status, value) = post(router, "/allocate", body.to_string()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(value["code"], "INVALID_VACANCY");
    }

    #[tokio::test]
    async fn test_allocate_malformed_json_returns_400() {
        let router = create_router(create_test_state());
        let (status, value) = post(router, "/allocate", "{invalid json".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_allocate_missing_field_returns_400() {
        let router = create_router(create_test_state());
        let body = json!({ "promotion_cycle_id": "2025", "candidates": [] });

        let (status, value) = post(router, "/allocate", body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_eligibility_cycle_not_elapsed() {
        let router = create_router(create_test_state());
        let mut staff = candidate("a", 6, 4, "80");
        staff["date_of_last_promotion"] = json!("2023-09-01");

        let body = json!({
            "candidate": staff,
            "promotion_cycle_id": "2025",
            "evaluation_date": "2025-06-30"
        });

        let (status, value) = post(router, "/eligibility", body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "not_eligible");
        assert_eq!(value["reason"], "cycle_not_elapsed");
    }

    #[tokio::test]
    async fn test_eligibility_invalid_score_returns_422() {
        let router = create_router(create_test_state());
        let body = json!({
            "candidate": candidate("a", 6, 4, "140"),
            "promotion_cycle_id": "2025",
            "evaluation_date": "2025-06-30"
        });

        let (status, value) = post(router, "/eligibility", body.to_string()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(value["code"], "SCORE_OUT_OF_RANGE");
    }

    #[tokio::test]
    async fn test_step_recommendation() {
        let router = create_router(create_test_state());
        let body = json!({
            "current_grade": 7,
            "current_step": 10,
            "effective_date": "2025-06-30"
        });

        let (status, value) = post(router, "/step-recommendation", body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["destination_grade"], 8);
        assert_eq!(value["new_step"], 5);
        assert_eq!(value["needs_review"], false);
    }

    #[tokio::test]
    async fn test_step_recommendation_step_out_of_range() {
        let router = create_router(create_test_state());
        let body = json!({ "current_grade": 13, "current_step": 12 });

        let (status, value) = post(router, "/step-recommendation", body.to_string()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(value["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_step_recommendation_grade_out_of_range() {
        let router = create_router(create_test_state());
        let body = json!({ "current_grade": u32::MAX, "current_step": 1 });

        let (status, value) = post(router, "/step-recommendation", body.to_string()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(value["code"], "UNKNOWN_GRADE");
    }

    #[tokio::test]
    async fn test_step_recommendation_from_highest_grade() {
        let router = create_router(create_test_state());
        let body = json!({ "current_grade": 15, "current_step": 2 });

        let (status, value) = post(router, "/step-recommendation", body.to_string()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(value["code"], "VALIDATION_ERROR");
        assert!(value["message"].as_str().unwrap().contains("highest grade"));
    }

    #[tokio::test]
    async fn test_step_increment_is_idempotent_per_period() {
        let state = create_test_state();
        let body = json!({
            "period_id": "2025",
            "effective_date": "2025-01-01",
            "staff": [
                { "id": "s1", "current_grade": 6, "current_step": 3 },
                { "id": "s2", "current_grade": 6, "current_step": 15 }
            ]
        })
        .to_string();

        let (status, first) = post(create_router(state.clone()), "/step-increment", body.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["already_processed"], false);
        assert_eq!(first["summary"]["incremented"], 1);

        let (status, second) = post(create_router(state.clone()), "/step-increment", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["already_processed"], true);
        assert_eq!(first["records"], second["records"]);
        assert_eq!(state.audit().unwrap().increments.len(), 2);
    }
}
