use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use hirelink_shared::errors::{AppError, AppResult};
use hirelink_shared::types::{ApiResponse, AuthUser, UserRole};

use crate::services::dashboard_service;
use crate::AppState;

/// GET /dashboard
/// One endpoint, payload branched on the caller's role.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let payload = match auth_user.role {
        UserRole::Jobseeker => {
            serde_json::to_value(dashboard_service::jobseeker_dashboard(&state.db, auth_user.id)?)
        }
        UserRole::Employer => {
            serde_json::to_value(dashboard_service::employer_dashboard(&state.db, auth_user.id)?)
        }
        UserRole::Admin => serde_json::to_value(dashboard_service::admin_dashboard(&state.db)?),
    }
    .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(ApiResponse::ok(payload)))
}
