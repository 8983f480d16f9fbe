//! Event-driven notification fan-out. Every entry point here is best-effort:
//! a failed dispatch is logged and swallowed so the triggering request
//! still succeeds.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use hirelink_shared::clients::db::DbPool;
use hirelink_shared::errors::{AppError, AppResult};
use hirelink_shared::types::UserRole;

use crate::models::{
    Application, ApplicationStatus, Article, Job, NotificationPriority, NotificationType,
};
use crate::schema::{applications, interviews, jobs, jobseeker_profiles, users};
use crate::services::notification_service::{self, NotificationDraft};

fn get_conn(pool: &DbPool) -> AppResult<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>> {
    pool.get().map_err(|e| {
        tracing::error!(error = %e, "failed to get db connection");
        AppError::internal("database connection error")
    })
}

fn swallow(event: &'static str, result: AppResult<()>) {
    if let Err(e) = result {
        tracing::error!(error = %e, event, "notification dispatch failed");
    }
}

/// Title, message and priority for an application status change.
pub fn status_change_copy(
    status: ApplicationStatus,
    job_title: &str,
) -> (String, String, NotificationPriority) {
    match status {
        ApplicationStatus::Pending => (
            "Application submitted".to_string(),
            format!("Your application for \"{job_title}\" has been submitted."),
            NotificationPriority::Low,
        ),
        ApplicationStatus::Review => (
            "Application under review".to_string(),
            format!("Your application for \"{job_title}\" is being reviewed."),
            NotificationPriority::Medium,
        ),
        ApplicationStatus::InterviewScheduled => (
            "Interview scheduled".to_string(),
            format!("An interview has been scheduled for \"{job_title}\"."),
            NotificationPriority::High,
        ),
        ApplicationStatus::InterviewCompleted => (
            "Interview completed".to_string(),
            format!("Your interview for \"{job_title}\" has been completed."),
            NotificationPriority::Medium,
        ),
        ApplicationStatus::Accepted => (
            "Application accepted".to_string(),
            format!("Congratulations! Your application for \"{job_title}\" has been accepted."),
            NotificationPriority::High,
        ),
        ApplicationStatus::Rejected => (
            "Application update".to_string(),
            format!("Your application for \"{job_title}\" was not selected this time."),
            NotificationPriority::Medium,
        ),
        ApplicationStatus::Hired => (
            "You're hired!".to_string(),
            format!("You have been hired for \"{job_title}\". Welcome aboard!"),
            NotificationPriority::Urgent,
        ),
    }
}

/// A jobseeker matches a job when any of their skills appears as a
/// case-insensitive substring of a required skill.
pub fn skills_match(jobseeker_skills: &[String], required_skills: &[String]) -> bool {
    jobseeker_skills.iter().any(|skill| {
        let skill = skill.to_lowercase();
        !skill.is_empty()
            && required_skills
                .iter()
                .any(|req| req.to_lowercase().contains(&skill))
    })
}

pub fn application_received(pool: &DbPool, application: &Application, job: &Job) {
    swallow("application_received", (|| -> AppResult<()> {
        let draft = NotificationDraft::new(
            job.employer_id,
            NotificationType::ApplicationReceived,
            "New application",
            format!("You received a new application for \"{}\".", job.title),
        )
        .sender(application.applicant_id)
        .related("application", application.id)
        .data(serde_json::json!({
            "jobId": job.id,
            "jobTitle": job.title,
            "applicationId": application.id,
        }))
        .action(format!("/employer/applications/{}", application.id), "Review application")
        .category("applications");
        notification_service::create(pool, draft)?;
        Ok(())
    })());
}

pub fn application_status_changed(
    pool: &DbPool,
    application: &Application,
    job: &Job,
    new_status: ApplicationStatus,
) {
    swallow("application_status_changed", (|| -> AppResult<()> {
        let (title, message, priority) = status_change_copy(new_status, &job.title);
        let draft = NotificationDraft::new(
            application.applicant_id,
            NotificationType::ApplicationStatusUpdate,
            title,
            message,
        )
        .sender(job.employer_id)
        .related("application", application.id)
        .priority(priority)
        .data(serde_json::json!({
            "jobId": job.id,
            "jobTitle": job.title,
            "applicationId": application.id,
            "status": new_status.as_str(),
        }))
        .action(format!("/applications/{}", application.id), "View application")
        .category("applications");
        notification_service::create(pool, draft)?;
        Ok(())
    })());
}

/// Recommends a newly approved job to every active jobseeker whose skills
/// overlap the job's requirements. One bulk insert for the whole cohort.
pub fn job_posted(pool: &DbPool, job: &Job) {
    swallow("job_posted", (|| -> AppResult<()> {
        let mut conn = get_conn(pool)?;
        let candidates: Vec<(Uuid, Vec<String>)> = users::table
            .inner_join(jobseeker_profiles::table)
            .filter(users::role.eq(UserRole::Jobseeker.as_str()))
            .filter(users::status.eq("active"))
            .select((users::id, jobseeker_profiles::skills))
            .load(&mut conn)?;
        drop(conn);

        let drafts: Vec<NotificationDraft> = candidates
            .into_iter()
            .filter(|(_, skills)| skills_match(skills, &job.required_skills))
            .map(|(user_id, _)| {
                NotificationDraft::new(
                    user_id,
                    NotificationType::JobRecommendation,
                    "A job matches your skills",
                    format!("\"{}\" at {} looks like a fit for your profile.", job.title, job.company),
                )
                .related("job", job.id)
                .data(serde_json::json!({
                    "jobId": job.id,
                    "jobTitle": job.title,
                    "company": job.company,
                }))
                .action(format!("/jobs/{}", job.id), "View job")
                .category("recommendations")
            })
            .collect();

        let sent = notification_service::create_many(pool, drafts)?;
        tracing::info!(job_id = %job.id, recipients = sent, "job recommendation fan-out");
        Ok(())
    })());
}

/// Announces a published article to every active user except its author.
pub fn article_published(pool: &DbPool, article: &Article) {
    swallow("article_published", (|| -> AppResult<()> {
        let mut conn = get_conn(pool)?;
        let recipients: Vec<Uuid> = users::table
            .filter(users::status.eq("active"))
            .filter(users::id.ne(article.author_id))
            .select(users::id)
            .load(&mut conn)?;
        drop(conn);

        let drafts = recipients
            .into_iter()
            .map(|user_id| {
                NotificationDraft::new(
                    user_id,
                    NotificationType::ArticlePublished,
                    "New article",
                    format!("\"{}\" was just published.", article.title),
                )
                .sender(article.author_id)
                .related("article", article.id)
                .priority(NotificationPriority::Low)
                .action(format!("/articles/{}", article.id), "Read article")
                .category("content")
            })
            .collect();

        let sent = notification_service::create_many(pool, drafts)?;
        tracing::info!(article_id = %article.id, recipients = sent, "article fan-out");
        Ok(())
    })());
}

pub fn interview_scheduled(
    pool: &DbPool,
    application: &Application,
    job: &Job,
    scheduled_at: DateTime<Utc>,
) {
    swallow("interview_scheduled", (|| -> AppResult<()> {
        let draft = NotificationDraft::new(
            application.applicant_id,
            NotificationType::InterviewScheduled,
            "Interview scheduled",
            format!(
                "Your interview for \"{}\" is scheduled for {}.",
                job.title,
                scheduled_at.format("%Y-%m-%d %H:%M UTC")
            ),
        )
        .sender(job.employer_id)
        .related("application", application.id)
        .priority(NotificationPriority::High)
        .data(serde_json::json!({
            "jobId": job.id,
            "applicationId": application.id,
            "scheduledAt": scheduled_at,
        }))
        .action(format!("/applications/{}", application.id), "View details")
        .category("interviews");
        notification_service::create(pool, draft)?;
        Ok(())
    })());
}

pub fn interview_reminder(
    pool: &DbPool,
    recipient_id: Uuid,
    job_title: &str,
    application_id: Uuid,
    scheduled_at: DateTime<Utc>,
) {
    swallow("interview_reminder", (|| -> AppResult<()> {
        let draft = NotificationDraft::new(
            recipient_id,
            NotificationType::InterviewReminder,
            "Interview reminder",
            format!(
                "Reminder: your interview for \"{}\" starts at {}.",
                job_title,
                scheduled_at.format("%Y-%m-%d %H:%M UTC")
            ),
        )
        .related("application", application_id)
        .priority(NotificationPriority::Urgent)
        .expires_at(scheduled_at)
        .category("interviews");
        notification_service::create(pool, draft)?;
        Ok(())
    })());
}

pub fn account_updated(pool: &DbPool, recipient_id: Uuid) {
    swallow("account_updated", (|| -> AppResult<()> {
        let draft = NotificationDraft::new(
            recipient_id,
            NotificationType::AccountUpdate,
            "Account updated",
            "Your account details were changed. If this wasn't you, contact support.",
        )
        .category("account");
        notification_service::create(pool, draft)?;
        Ok(())
    })());
}

pub fn document_uploaded(pool: &DbPool, recipient_id: Uuid, document_name: &str) {
    swallow("document_uploaded", (|| -> AppResult<()> {
        let draft = NotificationDraft::new(
            recipient_id,
            NotificationType::DocumentUploaded,
            "Document uploaded",
            format!("\"{document_name}\" was added to your profile."),
        )
        .priority(NotificationPriority::Low)
        .category("account");
        notification_service::create(pool, draft)?;
        Ok(())
    })());
}

/// Audience selector for announcements and admin bulk sends. The recipient
/// set is a snapshot taken immediately before dispatch.
#[derive(Debug, Clone)]
pub enum AnnouncementTarget {
    All,
    Role(UserRole),
    Users(Vec<Uuid>),
}

pub fn resolve_recipients(pool: &DbPool, target: &AnnouncementTarget) -> AppResult<Vec<Uuid>> {
    match target {
        AnnouncementTarget::Users(ids) => Ok(ids.clone()),
        AnnouncementTarget::All => resolve_filter(pool, &RecipientFilter::default()),
        AnnouncementTarget::Role(role) => resolve_filter(
            pool,
            &RecipientFilter {
                role: Some(*role),
                ..Default::default()
            },
        ),
    }
}

/// Attribute filter for admin bulk sends. Status defaults to active.
#[derive(Debug, Clone, Default)]
pub struct RecipientFilter {
    pub role: Option<UserRole>,
    pub status: Option<String>,
    pub is_authorized: Option<bool>,
}

pub fn resolve_filter(pool: &DbPool, filter: &RecipientFilter) -> AppResult<Vec<Uuid>> {
    let mut conn = get_conn(pool)?;
    let mut query = users::table.select(users::id).into_boxed();
    match &filter.status {
        Some(status) => query = query.filter(users::status.eq(status.clone())),
        None => query = query.filter(users::status.eq("active")),
    }
    if let Some(role) = filter.role {
        query = query.filter(users::role.eq(role.as_str()));
    }
    if let Some(authorized) = filter.is_authorized {
        query = query.filter(users::is_authorized.eq(authorized));
    }
    Ok(query.load(&mut conn)?)
}

/// Admin-triggered announcement. Unlike the event hooks this returns the
/// error so the admin sees whether the send happened.
pub fn system_announcement(
    pool: &DbPool,
    sender_id: Uuid,
    title: &str,
    message: &str,
    target: &AnnouncementTarget,
    priority: NotificationPriority,
    expires_at: Option<DateTime<Utc>>,
) -> AppResult<usize> {
    let recipients = resolve_recipients(pool, target)?;
    let drafts = recipients
        .into_iter()
        .map(|user_id| {
            let mut draft = NotificationDraft::new(
                user_id,
                NotificationType::SystemAnnouncement,
                title,
                message,
            )
            .sender(sender_id)
            .priority(priority)
            .category("announcements");
            if let Some(at) = expires_at {
                draft = draft.expires_at(at);
            }
            draft
        })
        .collect();
    let sent = notification_service::create_many(pool, drafts)?;
    tracing::info!(sender_id = %sender_id, recipients = sent, "system announcement sent");
    Ok(sent)
}

/// Called from the hourly maintenance tick. Reminds applicants about
/// interviews starting 23-24 hours out; with an hourly cadence each
/// interview falls in the window exactly once. Reminders expire at the
/// interview time.
pub fn send_interview_reminders(pool: &DbPool) {
    swallow("interview_reminder_sweep", (|| -> AppResult<()> {
        let now = Utc::now();
        let window_start = now + chrono::Duration::hours(23);
        let window_end = now + chrono::Duration::hours(24);

        let mut conn = get_conn(pool)?;
        let due: Vec<(Uuid, Uuid, DateTime<Utc>, String)> = interviews::table
            .inner_join(applications::table.inner_join(jobs::table))
            .filter(interviews::status.eq("scheduled"))
            .filter(interviews::scheduled_at.ge(window_start))
            .filter(interviews::scheduled_at.lt(window_end))
            .select((
                interviews::jobseeker_id,
                interviews::application_id,
                interviews::scheduled_at,
                jobs::title,
            ))
            .load(&mut conn)?;
        drop(conn);

        for (jobseeker_id, application_id, scheduled_at, job_title) in due {
            interview_reminder(pool, jobseeker_id, &job_title, application_id, scheduled_at);
        }
        Ok(())
    })());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_copy_mentions_job_title() {
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Review,
            ApplicationStatus::InterviewScheduled,
            ApplicationStatus::InterviewCompleted,
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Hired,
        ] {
            let (title, message, _) = status_change_copy(status, "Rust Engineer");
            assert!(!title.is_empty());
            assert!(message.contains("Rust Engineer"), "{status}: {message}");
        }
    }

    #[test]
    fn hired_is_urgent_rejected_is_medium() {
        let (_, _, p) = status_change_copy(ApplicationStatus::Hired, "x");
        assert_eq!(p, NotificationPriority::Urgent);
        let (_, _, p) = status_change_copy(ApplicationStatus::Rejected, "x");
        assert_eq!(p, NotificationPriority::Medium);
    }

    #[test]
    fn interview_scheduled_copy_is_high_priority() {
        let (title, message, priority) =
            status_change_copy(ApplicationStatus::InterviewScheduled, "Rust Engineer");
        assert_eq!(title, "Interview scheduled");
        assert!(message.contains("interview"));
        assert_eq!(priority, NotificationPriority::High);
    }

    #[test]
    fn skills_match_is_case_insensitive_substring() {
        let mine = vec!["rust".to_string()];
        let wanted = vec!["Rust (async)".to_string(), "Kubernetes".to_string()];
        assert!(skills_match(&mine, &wanted));

        let mine = vec!["python".to_string()];
        assert!(!skills_match(&mine, &wanted));
    }

    #[test]
    fn empty_skill_lists_never_match() {
        assert!(!skills_match(&[], &["Rust".to_string()]));
        assert!(!skills_match(&["rust".to_string()], &[]));
        assert!(!skills_match(&["".to_string()], &["Rust".to_string()]));
    }
}
