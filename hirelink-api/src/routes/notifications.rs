use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use hirelink_shared::errors::{AppError, AppResult, ErrorCode};
use hirelink_shared::middleware::AdminUser;
use hirelink_shared::types::{ApiResponse, AuthUser, Paginated, PaginationParams, UserRole};

use crate::models::{Notification, NotificationPriority, NotificationStatus, NotificationType};
use crate::services::dispatch::{self, AnnouncementTarget, RecipientFilter};
use crate::services::notification_service::{self, NotificationDraft, NotificationFilter, NotificationStats};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListQuery {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub priority: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl NotificationListQuery {
    fn into_filter(self) -> AppResult<NotificationFilter> {
        let status = self
            .status
            .map(|s| NotificationStatus::from_str(&s).map_err(AppError::bad_request))
            .transpose()?;
        let notification_type = self
            .kind
            .map(|s| {
                NotificationType::from_str(&s)
                    .map_err(|e| AppError::new(ErrorCode::InvalidNotificationType, e))
            })
            .transpose()?;
        let priority = self
            .priority
            .map(|s| NotificationPriority::from_str(&s).map_err(AppError::bad_request))
            .transpose()?;
        Ok(NotificationFilter {
            status,
            notification_type,
            priority,
            created_after: self.start_date,
            created_before: self.end_date,
        })
    }
}

/// GET /notifications
/// Newest first; expired entries never appear.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Query(params): Query<PaginationParams>,
    Query(query): Query<NotificationListQuery>,
) -> AppResult<Json<Paginated<Notification>>> {
    let filter = query.into_filter()?;
    let (items, total) =
        notification_service::list(&state.db, auth_user.id, &filter, &params)?;
    Ok(Json(Paginated::new(items, total as u64, &params)))
}

/// GET /notifications/:id
pub async fn get_notification(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let notification = notification_service::get_by_id(&state.db, id, auth_user.id)?;
    Ok(Json(ApiResponse::ok(notification)))
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// GET /notifications/unread-count
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<UnreadCountResponse>>> {
    let count = notification_service::unread_count(&state.db, auth_user.id)?;
    Ok(Json(ApiResponse::ok(UnreadCountResponse { count })))
}

/// GET /notifications/stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<NotificationStats>>> {
    let stats = notification_service::stats(&state.db, auth_user.id)?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// POST /notifications/:id/read
/// Idempotent.
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let notification = notification_service::mark_read(&state.db, id, auth_user.id)?;
    Ok(Json(ApiResponse::ok(notification)))
}

#[derive(Debug, Serialize)]
pub struct MutatedCountResponse {
    pub count: usize,
}

/// POST /notifications/mark-all-read
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<MutatedCountResponse>>> {
    let count = notification_service::mark_all_read(&state.db, auth_user.id)?;
    Ok(Json(ApiResponse::ok(MutatedCountResponse { count })))
}

/// POST /notifications/:id/archive
pub async fn archive(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let notification = notification_service::archive(&state.db, id, auth_user.id)?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// DELETE /notifications/:id
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    notification_service::delete(&state.db, id, auth_user.id)?;
    Ok(Json(ApiResponse::ok_with_message((), "notification deleted")))
}

/// DELETE /notifications
pub async fn delete_all(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<MutatedCountResponse>>> {
    let count = notification_service::delete_all(&state.db, auth_user.id)?;
    Ok(Json(ApiResponse::ok(MutatedCountResponse { count })))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    pub recipient_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 1000, message = "message must be 1-1000 characters"))]
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub priority: Option<String>,
    pub action_url: Option<String>,
    pub action_text: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// POST /notifications (admin)
pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(req): Json<CreateNotificationRequest>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    req.validate()?;
    let kind = NotificationType::from_str(&req.kind)
        .map_err(|e| AppError::new(ErrorCode::InvalidNotificationType, e))?;

    let mut draft = NotificationDraft::new(req.recipient_id, kind, req.title, req.message)
        .sender(admin.id);
    if let Some(data) = req.data {
        draft = draft.data(data);
    }
    if let Some(priority) = req.priority {
        draft = draft.priority(
            NotificationPriority::from_str(&priority).map_err(AppError::bad_request)?,
        );
    }
    if let (Some(url), Some(text)) = (req.action_url, req.action_text) {
        draft = draft.action(url, text);
    }
    if let Some(at) = req.expires_at {
        draft = draft.expires_at(at);
    }
    if let Some(category) = req.category {
        draft = draft.category(category);
    }
    if let Some(tags) = req.tags {
        draft = draft.tags(tags);
    }

    let notification = notification_service::create(&state.db, draft)?;
    Ok(Json(ApiResponse::ok(notification)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkSendRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
    pub user_ids: Option<Vec<Uuid>>,
    pub role: Option<UserRole>,
    pub status: Option<String>,
    pub is_authorized: Option<bool>,
    pub priority: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct BulkSendResponse {
    pub recipients: usize,
}

/// POST /notifications/bulk (admin)
/// Recipients are resolved from the filter right before the insert.
pub async fn bulk_send(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(req): Json<BulkSendRequest>,
) -> AppResult<Json<ApiResponse<BulkSendResponse>>> {
    req.validate()?;
    let kind = NotificationType::from_str(&req.kind)
        .map_err(|e| AppError::new(ErrorCode::InvalidNotificationType, e))?;
    let priority = req
        .priority
        .map(|s| NotificationPriority::from_str(&s).map_err(AppError::bad_request))
        .transpose()?
        .unwrap_or(NotificationPriority::Medium);

    let recipients = match req.user_ids {
        Some(ids) => ids,
        None => dispatch::resolve_filter(
            &state.db,
            &RecipientFilter {
                role: req.role,
                status: req.status,
                is_authorized: req.is_authorized,
            },
        )?,
    };

    let drafts = recipients
        .into_iter()
        .map(|recipient_id| {
            let mut draft =
                NotificationDraft::new(recipient_id, kind, req.title.clone(), req.message.clone())
                    .sender(admin.id)
                    .priority(priority);
            if let Some(at) = req.expires_at {
                draft = draft.expires_at(at);
            }
            draft
        })
        .collect();

    let sent = notification_service::create_many(&state.db, drafts)?;
    Ok(Json(ApiResponse::ok(BulkSendResponse { recipients: sent })))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
    pub role: Option<UserRole>,
    pub user_ids: Option<Vec<Uuid>>,
    pub priority: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// POST /notifications/announce (admin)
pub async fn announce(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(req): Json<AnnouncementRequest>,
) -> AppResult<Json<ApiResponse<BulkSendResponse>>> {
    req.validate()?;
    let target = match (req.user_ids, req.role) {
        (Some(ids), _) => AnnouncementTarget::Users(ids),
        (None, Some(role)) => AnnouncementTarget::Role(role),
        (None, None) => AnnouncementTarget::All,
    };
    let priority = req
        .priority
        .map(|s| NotificationPriority::from_str(&s).map_err(AppError::bad_request))
        .transpose()?
        .unwrap_or(NotificationPriority::High);

    let sent = dispatch::system_announcement(
        &state.db,
        admin.id,
        &req.title,
        &req.message,
        &target,
        priority,
        req.expires_at,
    )?;
    Ok(Json(ApiResponse::ok(BulkSendResponse { recipients: sent })))
}

/// POST /notifications/cleanup (admin)
/// Runs the retention sweep on demand.
pub async fn cleanup(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<ApiResponse<MutatedCountResponse>>> {
    let count = notification_service::cleanup_old(
        &state.db,
        state.config.notification_retention_days,
    )?;
    Ok(Json(ApiResponse::ok(MutatedCountResponse { count })))
}
