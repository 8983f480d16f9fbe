use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use hirelink_shared::errors::{AppError, AppResult, ErrorCode};
use hirelink_shared::middleware::{EmployerUser, JobseekerUser};
use hirelink_shared::types::{ApiResponse, AuthUser, Paginated, PaginationParams, UserRole};

use crate::models::{Application, ApplicationStatus};
use crate::services::dashboard_service::ApplicationWithJob;
use crate::services::{application_service, dispatch};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub job_id: Uuid,
    pub notes: Option<String>,
}

/// POST /applications
/// Submits an application and notifies the posting employer.
pub async fn apply(
    State(state): State<Arc<AppState>>,
    JobseekerUser(jobseeker): JobseekerUser,
    Json(req): Json<ApplyRequest>,
) -> AppResult<Json<ApiResponse<Application>>> {
    let (application, job) =
        application_service::apply(&state.db, jobseeker.id, req.job_id, req.notes)?;
    dispatch::application_received(&state.db, &application, &job);
    Ok(Json(ApiResponse::ok_with_message(application, "application submitted")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// PUT /applications/:id/status
/// Employer/admin status transition. Every transition notifies the
/// applicant; `interview_scheduled` additionally records the interview and
/// sends the invitation with the slot details.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    EmployerUser(actor): EmployerUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Application>>> {
    let new_status = ApplicationStatus::from_str(&req.status)
        .map_err(|e| AppError::new(ErrorCode::InvalidApplicationStatus, e))?;

    let update =
        application_service::update_status(&state.db, id, &actor, new_status, req.scheduled_at)?;

    dispatch::application_status_changed(&state.db, &update.application, &update.job, new_status);
    if let Some(interview) = &update.interview {
        dispatch::interview_scheduled(
            &state.db,
            &update.application,
            &update.job,
            interview.scheduled_at,
        );
    }

    Ok(Json(ApiResponse::ok(update.application)))
}

/// GET /applications
/// Role-scoped listing: jobseekers see their submissions, employers the
/// applications to their postings.
pub async fn my_applications(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<ApplicationWithJob>>> {
    let (items, total) = match auth_user.role {
        UserRole::Jobseeker => {
            application_service::list_for_jobseeker(&state.db, auth_user.id, &params)?
        }
        UserRole::Employer | UserRole::Admin => {
            application_service::list_for_employer(&state.db, auth_user.id, &params)?
        }
    };
    Ok(Json(Paginated::new(items, total as u64, &params)))
}
