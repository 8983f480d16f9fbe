use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use hirelink_shared::errors::AppResult;
use hirelink_shared::middleware::{AdminUser, EmployerUser, OptionalAuthUser};
use hirelink_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::models::Job;
use crate::services::{dispatch, job_service};
use crate::AppState;

/// GET /jobs
/// Public listing of approved postings.
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Job>>> {
    let (items, total) = job_service::list_public(&state.db, &params)?;
    Ok(Json(Paginated::new(items, total as u64, &params)))
}

/// GET /jobs/:id
/// Pending postings are only visible to their owner and admins.
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Job>>> {
    let job = job_service::get_visible(&state.db, id, viewer.as_ref())?;
    Ok(Json(ApiResponse::ok(job)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[validate(length(min = 1, max = 100, message = "title must be 1-100 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, max = 50))]
    pub compensation: String,
    #[validate(length(min = 1, max = 20))]
    pub job_type: String,
    #[validate(length(min = 1, max = 20))]
    pub experience_level: String,
    #[validate(length(min = 1, message = "at least one required skill is needed"))]
    pub required_skills: Vec<String>,
    #[validate(length(min = 1, max = 100))]
    pub location: String,
}

/// POST /jobs
/// Creates a pending posting against the employer's quota. Nothing is
/// dispatched until an admin approves it.
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    EmployerUser(employer): EmployerUser,
    Json(req): Json<CreateJobRequest>,
) -> AppResult<Json<ApiResponse<Job>>> {
    req.validate()?;
    let job = job_service::create(
        &state.db,
        employer.id,
        job_service::JobDraft {
            title: req.title,
            description: req.description,
            compensation: req.compensation,
            job_type: req.job_type,
            experience_level: req.experience_level,
            required_skills: req.required_skills,
            location: req.location,
        },
    )?;
    Ok(Json(ApiResponse::ok_with_message(job, "job submitted for approval")))
}

/// GET /jobs/mine
/// Employer's own postings including pending ones.
pub async fn my_jobs(
    State(state): State<Arc<AppState>>,
    EmployerUser(employer): EmployerUser,
) -> AppResult<Json<ApiResponse<Vec<Job>>>> {
    let jobs = job_service::list_for_employer(&state.db, employer.id)?;
    Ok(Json(ApiResponse::ok(jobs)))
}

/// POST /jobs/:id/approve
/// Admin approval; the first transition to approved triggers the
/// job-recommendation fan-out.
pub async fn approve_job(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Job>>> {
    let (job, newly_approved) = job_service::approve(&state.db, id)?;
    if newly_approved {
        dispatch::job_posted(&state.db, &job);
    }
    Ok(Json(ApiResponse::ok(job)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(skills: Vec<&str>) -> CreateJobRequest {
        CreateJobRequest {
            title: "Backend Engineer".into(),
            description: "Build and run the API".into(),
            compensation: "70-90k".into(),
            job_type: "full_time".into(),
            experience_level: "mid".into(),
            required_skills: skills.into_iter().map(String::from).collect(),
            location: "Remote".into(),
        }
    }

    #[test]
    fn posting_requires_at_least_one_skill() {
        let errors = request(vec![]).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("required_skills"));
    }

    #[test]
    fn posting_with_skills_passes_validation() {
        assert!(request(vec!["rust"]).validate().is_ok());
    }
}
