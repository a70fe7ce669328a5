//! HTTP API module for the Promotion Allocation Engine.
//!
//! This module provides the REST API endpoints for running promotion cycles,
//! checking eligibility, recommending promotion steps and applying the
//! periodic step increment.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AllocationRequest, CandidateRequest, EligibilityRequest, StaffRequest, StepIncrementRequest,
    StepRecommendationRequest, VacancyRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
