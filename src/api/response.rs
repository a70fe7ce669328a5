//! Response types for the Promotion Allocation Engine API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an unknown promotion cycle error response.
    pub fn unknown_cycle(cycle_id: &str) -> Self {
        Self::with_details(
            "UNKNOWN_CYCLE",
            format!("No vacancy configuration for promotion cycle '{}'", cycle_id),
            "Provide vacancies in the request or configure the cycle",
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 422 response for a request that parsed but cannot be processed.
    pub fn unprocessable(error: ApiError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        if error.is_configuration_error() {
            return match error {
                EngineError::SalaryTableNotEffective { date } => ApiErrorResponse::unprocessable(
                    ApiError::with_details(
                        "SALARY_TABLE_NOT_EFFECTIVE",
                        format!("No salary table is effective on {}", date),
                        "The date precedes every configured salary schedule",
                    ),
                ),
                EngineError::InvalidVacancy { .. } => {
                    ApiErrorResponse::unprocessable(ApiError::new("INVALID_VACANCY", error.to_string()))
                }
                EngineError::UnknownGrade { grade } => ApiErrorResponse::unprocessable(
                    ApiError::with_details(
                        "UNKNOWN_GRADE",
                        format!("Grade {} is not defined", grade),
                        "The grade is outside the configured grade step bounds",
                    ),
                ),
                _ => ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::with_details("CONFIG_ERROR", "Configuration error", error.to_string()),
                },
            };
        }

        match error {
            EngineError::ScoreOutOfRange { .. } => {
                ApiErrorResponse::unprocessable(ApiError::new("SCORE_OUT_OF_RANGE", error.to_string()))
            }
            EngineError::InvalidCandidate {
                candidate_id,
                field,
                message,
            } => ApiErrorResponse::unprocessable(ApiError::with_details(
                "INVALID_CANDIDATE",
                format!("Invalid candidate '{}' field '{}': {}", candidate_id, field, message),
                "The candidate data contains invalid information",
            )),
            EngineError::CollaboratorError { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::new("COLLABORATOR_ERROR", error.to_string()),
            },
            other => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::new("INTERNAL_ERROR", other.to_string()),
            },
        }
    }
}
