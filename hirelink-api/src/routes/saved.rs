use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use hirelink_shared::errors::AppResult;
use hirelink_shared::middleware::{EmployerUser, JobseekerUser};
use hirelink_shared::types::ApiResponse;

use crate::models::Job;
use crate::services::dashboard_service::{self, CandidateSummary};
use crate::services::profile_service;
use crate::AppState;

/// POST /saved/jobs/:id
/// Set semantics: saving twice is a no-op.
pub async fn save_job(
    State(state): State<Arc<AppState>>,
    JobseekerUser(user): JobseekerUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Uuid>>>> {
    let saved = profile_service::save_job(&state.db, user.id, id)?;
    Ok(Json(ApiResponse::ok(saved)))
}

/// DELETE /saved/jobs/:id
pub async fn unsave_job(
    State(state): State<Arc<AppState>>,
    JobseekerUser(user): JobseekerUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Uuid>>>> {
    let saved = profile_service::unsave_job(&state.db, user.id, id)?;
    Ok(Json(ApiResponse::ok(saved)))
}

/// GET /saved/jobs
pub async fn list_saved_jobs(
    State(state): State<Arc<AppState>>,
    JobseekerUser(user): JobseekerUser,
) -> AppResult<Json<ApiResponse<Vec<Job>>>> {
    let jobs = profile_service::list_saved_jobs(&state.db, user.id)?;
    Ok(Json(ApiResponse::ok(jobs)))
}

/// POST /saved/candidates/:id
pub async fn save_candidate(
    State(state): State<Arc<AppState>>,
    EmployerUser(user): EmployerUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Uuid>>>> {
    let saved = profile_service::save_candidate(&state.db, user.id, id)?;
    Ok(Json(ApiResponse::ok(saved)))
}

/// DELETE /saved/candidates/:id
pub async fn unsave_candidate(
    State(state): State<Arc<AppState>>,
    EmployerUser(user): EmployerUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Uuid>>>> {
    let saved = profile_service::unsave_candidate(&state.db, user.id, id)?;
    Ok(Json(ApiResponse::ok(saved)))
}

/// GET /saved/candidates
pub async fn list_saved_candidates(
    State(state): State<Arc<AppState>>,
    EmployerUser(user): EmployerUser,
) -> AppResult<Json<ApiResponse<Vec<CandidateSummary>>>> {
    let profile = profile_service::get_or_create_employer(&state.db, user.id)?;
    let candidates = dashboard_service::candidate_summaries(&state.db, &profile.saved_candidates)?;
    Ok(Json(ApiResponse::ok(candidates)))
}
