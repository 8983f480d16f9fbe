use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{
    applications, articles, employer_profiles, interviews, jobs, jobseeker_profiles,
    notifications, users,
};

// --- Domain enums ---
//
// The store keeps these as varchar columns; every call site goes through the
// enum so the allowed sets exist in exactly one place.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Approved,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Approved => "approved",
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "approved" => Ok(JobStatus::Approved),
            _ => Err(format!("unknown job status: {s}")),
        }
    }
}

/// Canonical application lifecycle. The default on apply is `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Review,
    InterviewScheduled,
    InterviewCompleted,
    Accepted,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Review => "review",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::InterviewCompleted => "interview_completed",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "review" => Ok(ApplicationStatus::Review),
            "interview_scheduled" => Ok(ApplicationStatus::InterviewScheduled),
            "interview_completed" => Ok(ApplicationStatus::InterviewCompleted),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "hired" => Ok(ApplicationStatus::Hired),
            _ => Err(format!("unknown application status: {s}")),
        }
    }
}

/// The single shared definition of every notification kind the system emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ApplicationReceived,
    ApplicationStatusUpdate,
    JobPosted,
    JobExpired,
    InterviewScheduled,
    InterviewReminder,
    ProfileViewed,
    MessageReceived,
    SystemAnnouncement,
    AccountUpdate,
    PasswordChanged,
    LoginAlert,
    SubscriptionUpdate,
    PaymentReminder,
    DocumentUploaded,
    DocumentVerified,
    ArticlePublished,
    CommentReceived,
    LikeReceived,
    FollowReceived,
    JobRecommendation,
    CandidateRecommendation,
    DeadlineReminder,
    MaintenanceNotice,
    FeatureAnnouncement,
    SecurityAlert,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::ApplicationReceived => "application_received",
            NotificationType::ApplicationStatusUpdate => "application_status_update",
            NotificationType::JobPosted => "job_posted",
            NotificationType::JobExpired => "job_expired",
            NotificationType::InterviewScheduled => "interview_scheduled",
            NotificationType::InterviewReminder => "interview_reminder",
            NotificationType::ProfileViewed => "profile_viewed",
            NotificationType::MessageReceived => "message_received",
            NotificationType::SystemAnnouncement => "system_announcement",
            NotificationType::AccountUpdate => "account_update",
            NotificationType::PasswordChanged => "password_changed",
            NotificationType::LoginAlert => "login_alert",
            NotificationType::SubscriptionUpdate => "subscription_update",
            NotificationType::PaymentReminder => "payment_reminder",
            NotificationType::DocumentUploaded => "document_uploaded",
            NotificationType::DocumentVerified => "document_verified",
            NotificationType::ArticlePublished => "article_published",
            NotificationType::CommentReceived => "comment_received",
            NotificationType::LikeReceived => "like_received",
            NotificationType::FollowReceived => "follow_received",
            NotificationType::JobRecommendation => "job_recommendation",
            NotificationType::CandidateRecommendation => "candidate_recommendation",
            NotificationType::DeadlineReminder => "deadline_reminder",
            NotificationType::MaintenanceNotice => "maintenance_notice",
            NotificationType::FeatureAnnouncement => "feature_announcement",
            NotificationType::SecurityAlert => "security_alert",
        }
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown notification type: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl NotificationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPriority::Low => "low",
            NotificationPriority::Medium => "medium",
            NotificationPriority::High => "high",
            NotificationPriority::Urgent => "urgent",
        }
    }
}

impl std::str::FromStr for NotificationPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown priority: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Unread,
    Read,
    Archived,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Unread => "unread",
            NotificationStatus::Read => "read",
            NotificationStatus::Archived => "archived",
        }
    }
}

impl std::str::FromStr for NotificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown notification status: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    InApp,
    Email,
    Sms,
    Push,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::InApp => "in_app",
            NotificationChannel::Email => "email",
            NotificationChannel::Sms => "sms",
            NotificationChannel::Push => "push",
        }
    }
}

// --- Jsonb value shapes ---

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
}

impl SocialLinks {
    pub fn any(&self) -> bool {
        self.linkedin.is_some() || self.github.is_some() || self.portfolio.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeInfo {
    pub url: String,
    pub storage_id: String,
    pub original_name: String,
    pub uploaded_at: DateTime<Utc>,
}

// --- User ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = users)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub is_authorized: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = users)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

// --- Jobseeker profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = jobseeker_profiles)]
#[serde(rename_all = "camelCase")]
pub struct JobseekerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub job_title: Option<String>,
    pub summary: Option<String>,
    pub skills: Vec<String>,
    pub experience: serde_json::Value,
    pub education: serde_json::Value,
    pub certifications: serde_json::Value,
    pub social_links: serde_json::Value,
    pub resume: Option<serde_json::Value>,
    pub saved_jobs: Vec<Uuid>,
    pub profile_completion: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobseekerProfile {
    pub fn social(&self) -> SocialLinks {
        serde_json::from_value(self.social_links.clone()).unwrap_or_default()
    }

    pub fn resume_info(&self) -> Option<ResumeInfo> {
        self.resume
            .clone()
            .and_then(|v| serde_json::from_value(v).ok())
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = jobseeker_profiles)]
pub struct NewJobseekerProfile {
    pub user_id: Uuid,
    pub skills: Vec<String>,
    pub experience: serde_json::Value,
    pub education: serde_json::Value,
    pub certifications: serde_json::Value,
    pub social_links: serde_json::Value,
    pub saved_jobs: Vec<Uuid>,
    pub profile_completion: i32,
}

impl NewJobseekerProfile {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            skills: vec![],
            experience: serde_json::json!([]),
            education: serde_json::json!([]),
            certifications: serde_json::json!([]),
            social_links: serde_json::json!({}),
            saved_jobs: vec![],
            profile_completion: 0,
        }
    }
}

#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = jobseeker_profiles)]
pub struct UpdateJobseekerProfile {
    pub phone: Option<String>,
    pub location: Option<String>,
    pub job_title: Option<String>,
    pub summary: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<serde_json::Value>,
    pub education: Option<serde_json::Value>,
    pub certifications: Option<serde_json::Value>,
    pub social_links: Option<serde_json::Value>,
    pub resume: Option<serde_json::Value>,
    pub profile_completion: Option<i32>,
}

// --- Employer profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = employer_profiles)]
#[serde(rename_all = "camelCase")]
pub struct EmployerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub company_description: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub website: Option<String>,
    pub headquarters_city: Option<String>,
    pub contact_phone: Option<String>,
    pub company_logo_url: Option<String>,
    pub is_verified: bool,
    pub subscription_plan: String,
    pub jobs_allowed: i32,
    pub jobs_used: i32,
    pub saved_candidates: Vec<Uuid>,
    pub profile_completion: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = employer_profiles)]
pub struct NewEmployerProfile {
    pub user_id: Uuid,
    pub company_name: String,
    pub subscription_plan: String,
    pub jobs_allowed: i32,
    pub jobs_used: i32,
    pub saved_candidates: Vec<Uuid>,
    pub profile_completion: i32,
}

impl NewEmployerProfile {
    /// Lazy-create default: company name derived from the owning user's name.
    pub fn with_default_company(user_id: Uuid, user_name: &str) -> Self {
        let company_name = if user_name.trim().is_empty() {
            "My Company".to_string()
        } else {
            format!("{user_name}'s Company")
        };
        Self {
            user_id,
            company_name,
            subscription_plan: "free".to_string(),
            jobs_allowed: 5,
            jobs_used: 0,
            saved_candidates: vec![],
            profile_completion: 13, // company name counts as 1 of 8 checks
        }
    }
}

#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = employer_profiles)]
pub struct UpdateEmployerProfile {
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub website: Option<String>,
    pub headquarters_city: Option<String>,
    pub contact_phone: Option<String>,
    pub company_logo_url: Option<String>,
    pub profile_completion: Option<i32>,
}

// --- Job ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = jobs)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
    pub description: String,
    pub compensation: String,
    pub job_type: String,
    pub experience_level: String,
    pub required_skills: Vec<String>,
    pub location: String,
    pub company: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = jobs)]
pub struct NewJob {
    pub employer_id: Uuid,
    pub title: String,
    pub description: String,
    pub compensation: String,
    pub job_type: String,
    pub experience_level: String,
    pub required_skills: Vec<String>,
    pub location: String,
    pub company: String,
    pub status: String,
}

// --- Application ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = applications)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub employer_id: Uuid,
    pub status: String,
    pub resume_url: String,
    pub resume_filename: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = applications)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub employer_id: Uuid,
    pub status: String,
    pub resume_url: String,
    pub resume_filename: String,
    pub notes: Option<String>,
}

// --- Interview ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = interviews)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: Uuid,
    pub jobseeker_id: Uuid,
    pub job_id: Uuid,
    pub employer_id: Uuid,
    pub application_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub modality: String,
    pub status: String,
    pub meeting_link: Option<String>,
    pub location: Option<String>,
    pub feedback: Option<serde_json::Value>,
    pub reschedule_history: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = interviews)]
pub struct NewInterview {
    pub jobseeker_id: Uuid,
    pub job_id: Uuid,
    pub employer_id: Uuid,
    pub application_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub modality: String,
    pub status: String,
    pub meeting_link: Option<String>,
    pub location: Option<String>,
    pub reschedule_history: serde_json::Value,
}

// --- Article ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = articles)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = articles)]
pub struct NewArticle {
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub published: bool,
}

// --- Notification ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = notifications)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<Uuid>,
    pub priority: String,
    pub status: String,
    pub read_at: Option<DateTime<Utc>>,
    pub action_url: Option<String>,
    pub action_text: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub channels: Vec<String>,
    pub email_sent: bool,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub push_sent: bool,
    pub push_sent_at: Option<DateTime<Utc>>,
    pub sms_sent: bool,
    pub sms_sent_at: Option<DateTime<Utc>>,
    pub source: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<Uuid>,
    pub priority: String,
    pub status: String,
    pub action_url: Option<String>,
    pub action_text: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub channels: Vec<String>,
    pub source: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn application_status_round_trip() {
        assert_eq!(
            ApplicationStatus::from_str("interview_scheduled").unwrap(),
            ApplicationStatus::InterviewScheduled
        );
        assert_eq!(ApplicationStatus::Hired.as_str(), "hired");
        assert!(ApplicationStatus::from_str("applied").is_err());
    }

    #[test]
    fn notification_type_parses_wire_names() {
        assert_eq!(
            NotificationType::from_str("application_status_update").unwrap(),
            NotificationType::ApplicationStatusUpdate
        );
        assert_eq!(NotificationType::SystemAnnouncement.as_str(), "system_announcement");
        assert!(NotificationType::from_str("spam").is_err());
    }

    #[test]
    fn social_links_any() {
        assert!(!SocialLinks::default().any());
        let links = SocialLinks {
            github: Some("https://github.com/someone".into()),
            ..Default::default()
        };
        assert!(links.any());
    }

    #[test]
    fn default_employer_company_name() {
        let p = NewEmployerProfile::with_default_company(Uuid::new_v4(), "Dana");
        assert_eq!(p.company_name, "Dana's Company");
        let p = NewEmployerProfile::with_default_company(Uuid::new_v4(), "  ");
        assert_eq!(p.company_name, "My Company");
    }
}
