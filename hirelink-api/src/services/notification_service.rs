use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use hirelink_shared::clients::db::DbPool;
use hirelink_shared::errors::{AppError, AppResult, ErrorCode};
use hirelink_shared::types::{FieldError, PaginationParams};

use crate::models::{
    NewNotification, Notification, NotificationChannel, NotificationPriority, NotificationStatus,
    NotificationType,
};
use crate::schema::notifications;

const MAX_TITLE_LEN: usize = 200;
const MAX_MESSAGE_LEN: usize = 1000;
const ANNOUNCEMENT_TTL_DAYS: i64 = 30;

fn get_conn(pool: &DbPool) -> AppResult<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>> {
    pool.get().map_err(|e| {
        tracing::error!(error = %e, "failed to get db connection");
        AppError::internal("database connection error")
    })
}

/// Everything needed to record one notification. Only recipient, type, title
/// and message are mandatory; the rest carries documented defaults.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub related_entity: Option<(String, Uuid)>,
    pub priority: NotificationPriority,
    pub action_url: Option<String>,
    pub action_text: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub channels: Vec<NotificationChannel>,
    pub source: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

impl NotificationDraft {
    pub fn new(
        recipient_id: Uuid,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_id,
            sender_id: None,
            notification_type,
            title: title.into(),
            message: message.into(),
            data: serde_json::json!({}),
            related_entity: None,
            priority: NotificationPriority::Medium,
            action_url: None,
            action_text: None,
            expires_at: None,
            channels: vec![NotificationChannel::InApp],
            source: "system".to_string(),
            category: None,
            tags: vec![],
        }
    }

    pub fn sender(mut self, sender_id: Uuid) -> Self {
        self.sender_id = Some(sender_id);
        self
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    pub fn related(mut self, entity_type: impl Into<String>, entity_id: Uuid) -> Self {
        self.related_entity = Some((entity_type.into(), entity_id));
        self
    }

    pub fn priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn action(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self.action_text = Some(text.into());
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Validates the draft and resolves defaults into an insertable row.
    /// System announcements with no explicit expiry get a 30-day one.
    pub fn into_row(self, now: DateTime<Utc>) -> AppResult<NewNotification> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError {
                field: "title".into(),
                message: "title is required".into(),
            });
        } else if self.title.chars().count() > MAX_TITLE_LEN {
            errors.push(FieldError {
                field: "title".into(),
                message: format!("title must be at most {MAX_TITLE_LEN} characters"),
            });
        }
        if self.message.trim().is_empty() {
            errors.push(FieldError {
                field: "message".into(),
                message: "message is required".into(),
            });
        } else if self.message.chars().count() > MAX_MESSAGE_LEN {
            errors.push(FieldError {
                field: "message".into(),
                message: format!("message must be at most {MAX_MESSAGE_LEN} characters"),
            });
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let expires_at = match self.expires_at {
            Some(at) => Some(at),
            None if self.notification_type == NotificationType::SystemAnnouncement => {
                Some(now + Duration::days(ANNOUNCEMENT_TTL_DAYS))
            }
            None => None,
        };

        let (related_entity_type, related_entity_id) = match self.related_entity {
            Some((t, id)) => (Some(t), Some(id)),
            None => (None, None),
        };

        let channels = if self.channels.is_empty() {
            vec![NotificationChannel::InApp]
        } else {
            self.channels
        };

        Ok(NewNotification {
            recipient_id: self.recipient_id,
            sender_id: self.sender_id,
            notification_type: self.notification_type.as_str().to_string(),
            title: self.title,
            message: self.message,
            data: self.data,
            related_entity_type,
            related_entity_id,
            priority: self.priority.as_str().to_string(),
            status: NotificationStatus::Unread.as_str().to_string(),
            action_url: self.action_url,
            action_text: self.action_text,
            expires_at,
            channels: channels.iter().map(|c| c.as_str().to_string()).collect(),
            source: self.source,
            category: self.category,
            tags: self.tags,
        })
    }
}

/// A notification is visible while it has no expiry or the expiry is in the
/// future. All default reads apply this predicate.
pub fn is_visible(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match expires_at {
        None => true,
        Some(at) => at > now,
    }
}

/// Retention only ever removes notifications the recipient has dealt with.
pub fn retention_eligible(status: &str, created_at: DateTime<Utc>, cutoff: DateTime<Utc>) -> bool {
    created_at < cutoff && status != NotificationStatus::Unread.as_str()
}

pub fn create(pool: &DbPool, draft: NotificationDraft) -> AppResult<Notification> {
    let row = draft.into_row(Utc::now())?;
    let mut conn = get_conn(pool)?;
    let notification = diesel::insert_into(notifications::table)
        .values(&row)
        .get_result::<Notification>(&mut conn)?;
    tracing::debug!(
        notification_id = %notification.id,
        recipient_id = %notification.recipient_id,
        kind = %notification.notification_type,
        "notification recorded"
    );
    Ok(notification)
}

/// Fan-out path: one INSERT for the whole batch.
pub fn create_many(pool: &DbPool, drafts: Vec<NotificationDraft>) -> AppResult<usize> {
    if drafts.is_empty() {
        return Ok(0);
    }
    let now = Utc::now();
    let rows = drafts
        .into_iter()
        .map(|d| d.into_row(now))
        .collect::<AppResult<Vec<NewNotification>>>()?;

    let mut conn = get_conn(pool)?;
    let inserted = diesel::insert_into(notifications::table)
        .values(&rows)
        .execute(&mut conn)?;
    tracing::info!(count = inserted, "notification batch recorded");
    Ok(inserted)
}

#[derive(Debug, Default, Clone)]
pub struct NotificationFilter {
    pub status: Option<NotificationStatus>,
    pub notification_type: Option<NotificationType>,
    pub priority: Option<NotificationPriority>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

type BoxedNotificationQuery<'a> = notifications::BoxedQuery<'a, Pg>;

/// The visibility predicate as a SQL expression, shared by every default
/// read path (listing, get-by-id, unread count, stats).
fn not_expired(
    now: DateTime<Utc>,
) -> Box<
    dyn BoxableExpression<
        notifications::table,
        Pg,
        SqlType = diesel::sql_types::Nullable<diesel::sql_types::Bool>,
    >,
> {
    Box::new(
        notifications::expires_at
            .is_null()
            .or(notifications::expires_at.gt(now)),
    )
}

fn scoped_query(
    recipient_id: Uuid,
    filter: &NotificationFilter,
    now: DateTime<Utc>,
) -> BoxedNotificationQuery<'static> {
    let mut query = notifications::table
        .filter(notifications::recipient_id.eq(recipient_id))
        .filter(not_expired(now))
        .into_boxed();

    if let Some(status) = filter.status {
        query = query.filter(notifications::status.eq(status.as_str()));
    }
    if let Some(kind) = filter.notification_type {
        query = query.filter(notifications::notification_type.eq(kind.as_str()));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(notifications::priority.eq(priority.as_str()));
    }
    if let Some(after) = filter.created_after {
        query = query.filter(notifications::created_at.ge(after));
    }
    if let Some(before) = filter.created_before {
        query = query.filter(notifications::created_at.le(before));
    }
    query
}

/// Newest first, expired rows excluded, with a total count for paging.
pub fn list(
    pool: &DbPool,
    recipient_id: Uuid,
    filter: &NotificationFilter,
    pagination: &PaginationParams,
) -> AppResult<(Vec<Notification>, i64)> {
    let mut conn = get_conn(pool)?;
    let now = Utc::now();

    let items = scoped_query(recipient_id, filter, now)
        .order(notifications::created_at.desc())
        .limit(pagination.limit() as i64)
        .offset(pagination.offset() as i64)
        .load::<Notification>(&mut conn)?;

    let total = scoped_query(recipient_id, filter, now)
        .count()
        .get_result::<i64>(&mut conn)?;

    Ok((items, total))
}

fn detail_query(
    id: Uuid,
    recipient_id: Uuid,
    now: DateTime<Utc>,
) -> BoxedNotificationQuery<'static> {
    notifications::table
        .filter(notifications::id.eq(id))
        .filter(notifications::recipient_id.eq(recipient_id))
        .filter(not_expired(now))
        .into_boxed()
}

/// Expired notifications read as not-found, same as the listing.
pub fn get_by_id(pool: &DbPool, id: Uuid, recipient_id: Uuid) -> AppResult<Notification> {
    let mut conn = get_conn(pool)?;
    detail_query(id, recipient_id, Utc::now())
        .first::<Notification>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::NotificationNotFound, "notification not found"))
}

pub fn unread_count(pool: &DbPool, recipient_id: Uuid) -> AppResult<i64> {
    let mut conn = get_conn(pool)?;
    let count = notifications::table
        .filter(notifications::recipient_id.eq(recipient_id))
        .filter(notifications::status.eq(NotificationStatus::Unread.as_str()))
        .filter(not_expired(Utc::now()))
        .count()
        .get_result::<i64>(&mut conn)?;
    Ok(count)
}

/// Idempotent: marking an already-read notification returns it unchanged.
pub fn mark_read(pool: &DbPool, id: Uuid, recipient_id: Uuid) -> AppResult<Notification> {
    let notification = get_by_id(pool, id, recipient_id)?;
    if notification.status != NotificationStatus::Unread.as_str() {
        return Ok(notification);
    }

    let mut conn = get_conn(pool)?;
    let updated = diesel::update(notifications::table.find(id))
        .set((
            notifications::status.eq(NotificationStatus::Read.as_str()),
            notifications::read_at.eq(Some(Utc::now())),
        ))
        .get_result::<Notification>(&mut conn)?;
    Ok(updated)
}

pub fn mark_all_read(pool: &DbPool, recipient_id: Uuid) -> AppResult<usize> {
    let mut conn = get_conn(pool)?;
    let updated = diesel::update(
        notifications::table
            .filter(notifications::recipient_id.eq(recipient_id))
            .filter(notifications::status.eq(NotificationStatus::Unread.as_str())),
    )
    .set((
        notifications::status.eq(NotificationStatus::Read.as_str()),
        notifications::read_at.eq(Some(Utc::now())),
    ))
    .execute(&mut conn)?;
    Ok(updated)
}

pub fn archive(pool: &DbPool, id: Uuid, recipient_id: Uuid) -> AppResult<Notification> {
    // Scope check first so a foreign id reads as not-found, not as a no-op.
    get_by_id(pool, id, recipient_id)?;
    let mut conn = get_conn(pool)?;
    let updated = diesel::update(notifications::table.find(id))
        .set(notifications::status.eq(NotificationStatus::Archived.as_str()))
        .get_result::<Notification>(&mut conn)?;
    Ok(updated)
}

pub fn delete(pool: &DbPool, id: Uuid, recipient_id: Uuid) -> AppResult<()> {
    let mut conn = get_conn(pool)?;
    let deleted = diesel::delete(
        notifications::table
            .find(id)
            .filter(notifications::recipient_id.eq(recipient_id)),
    )
    .execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::new(
            ErrorCode::NotificationNotFound,
            "notification not found",
        ));
    }
    Ok(())
}

pub fn delete_all(pool: &DbPool, recipient_id: Uuid) -> AppResult<usize> {
    let mut conn = get_conn(pool)?;
    let deleted =
        diesel::delete(notifications::table.filter(notifications::recipient_id.eq(recipient_id)))
            .execute(&mut conn)?;
    tracing::info!(recipient_id = %recipient_id, count = deleted, "notifications cleared");
    Ok(deleted)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStats {
    pub total: i64,
    pub unread: i64,
    pub by_status: HashMap<String, i64>,
    pub by_type: HashMap<String, i64>,
}

pub fn stats(pool: &DbPool, recipient_id: Uuid) -> AppResult<NotificationStats> {
    let mut conn = get_conn(pool)?;
    let now = Utc::now();

    let by_status: HashMap<String, i64> = notifications::table
        .filter(notifications::recipient_id.eq(recipient_id))
        .filter(not_expired(now))
        .group_by(notifications::status)
        .select((notifications::status, count_star()))
        .load::<(String, i64)>(&mut conn)?
        .into_iter()
        .collect();

    let by_type: HashMap<String, i64> = notifications::table
        .filter(notifications::recipient_id.eq(recipient_id))
        .filter(not_expired(now))
        .group_by(notifications::notification_type)
        .select((notifications::notification_type, count_star()))
        .load::<(String, i64)>(&mut conn)?
        .into_iter()
        .collect();

    let total = by_status.values().sum();
    let unread = by_status
        .get(NotificationStatus::Unread.as_str())
        .copied()
        .unwrap_or(0);

    Ok(NotificationStats {
        total,
        unread,
        by_status,
        by_type,
    })
}

/// Retention sweep: removes read and archived notifications older than the
/// cutoff. Unread ones are never touched regardless of age.
pub fn cleanup_old(pool: &DbPool, retention_days: i64) -> AppResult<usize> {
    let cutoff = Utc::now() - Duration::days(retention_days);
    let mut conn = get_conn(pool)?;
    let deleted = diesel::delete(
        notifications::table
            .filter(notifications::created_at.lt(cutoff))
            .filter(notifications::status.ne(NotificationStatus::Unread.as_str())),
    )
    .execute(&mut conn)?;
    if deleted > 0 {
        tracing::info!(count = deleted, retention_days, "old notifications removed");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NotificationDraft {
        NotificationDraft::new(
            Uuid::new_v4(),
            NotificationType::ApplicationReceived,
            "New application",
            "Someone applied to your posting",
        )
    }

    #[test]
    fn draft_defaults_resolve() {
        let row = draft().into_row(Utc::now()).unwrap();
        assert_eq!(row.priority, "medium");
        assert_eq!(row.status, "unread");
        assert_eq!(row.channels, vec!["in_app".to_string()]);
        assert_eq!(row.source, "system");
        assert!(row.expires_at.is_none());
    }

    #[test]
    fn announcement_gets_default_expiry() {
        let now = Utc::now();
        let row = NotificationDraft::new(
            Uuid::new_v4(),
            NotificationType::SystemAnnouncement,
            "Maintenance window",
            "Scheduled downtime on Saturday",
        )
        .into_row(now)
        .unwrap();
        assert_eq!(row.expires_at, Some(now + Duration::days(30)));
    }

    #[test]
    fn explicit_expiry_wins_over_announcement_default() {
        let now = Utc::now();
        let at = now + Duration::days(2);
        let row = NotificationDraft::new(
            Uuid::new_v4(),
            NotificationType::SystemAnnouncement,
            "Short notice",
            "Gone in two days",
        )
        .expires_at(at)
        .into_row(now)
        .unwrap();
        assert_eq!(row.expires_at, Some(at));
    }

    #[test]
    fn empty_title_rejected() {
        let mut d = draft();
        d.title = "  ".into();
        match d.into_row(Utc::now()) {
            Err(AppError::Validation(fields)) => {
                assert_eq!(fields[0].field, "title");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn oversized_message_rejected() {
        let mut d = draft();
        d.message = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert!(matches!(
            d.into_row(Utc::now()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn visibility_predicate() {
        let now = Utc::now();
        assert!(is_visible(None, now));
        assert!(is_visible(Some(now + Duration::minutes(1)), now));
        assert!(!is_visible(Some(now), now));
        assert!(!is_visible(Some(now - Duration::minutes(1)), now));
    }

    #[test]
    fn detail_lookup_excludes_expired_rows() {
        let sql = diesel::debug_query::<Pg, _>(&detail_query(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Utc::now(),
        ))
        .to_string();
        assert!(sql.contains(r#""notifications"."expires_at" IS NULL"#));
        assert!(sql.contains(r#""notifications"."expires_at" > "#));
    }

    #[test]
    fn retention_never_touches_unread() {
        let cutoff = Utc::now();
        let old = cutoff - Duration::days(60);
        assert!(retention_eligible("read", old, cutoff));
        assert!(retention_eligible("archived", old, cutoff));
        assert!(!retention_eligible("unread", old, cutoff));
        assert!(!retention_eligible("read", cutoff + Duration::days(1), cutoff));
    }
}
