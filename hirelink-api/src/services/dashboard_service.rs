//! Role-specific dashboard aggregation. Each dashboard is assembled from a
//! small constant number of queries; counters come from dedicated COUNT or
//! GROUP BY queries, never from the length of a capped preview list.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use hirelink_shared::clients::db::DbPool;
use hirelink_shared::errors::{AppError, AppResult};
use hirelink_shared::types::UserRole;

use crate::models::{
    Application, Article, EmployerProfile, Interview, Job, JobStatus, JobseekerProfile,
    Notification, NotificationStatus, User,
};
use crate::schema::{applications, articles, interviews, jobs, jobseeker_profiles, notifications, users};
use crate::services::{dispatch, notification_service, profile_service};

const PREVIEW_LIMIT: i64 = 5;
const APPLICATION_PREVIEW_LIMIT: i64 = 10;
const RECENT_WINDOW_DAYS: i64 = 7;

fn get_conn(pool: &DbPool) -> AppResult<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>> {
    pool.get().map_err(|e| {
        tracing::error!(error = %e, "failed to get db connection");
        AppError::internal("database connection error")
    })
}

/// An application joined with the job it targets.
#[derive(Debug, Serialize)]
pub struct ApplicationWithJob {
    #[serde(flatten)]
    pub application: Application,
    pub job: Job,
}

/// Per-status application counters derived from one GROUP BY result.
#[derive(Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationBreakdown {
    pub total: i64,
    pub pending: i64,
    pub review: i64,
    pub interviews: i64,
    pub accepted: i64,
    pub rejected: i64,
    pub hired: i64,
}

pub fn application_breakdown(counts: &HashMap<String, i64>) -> ApplicationBreakdown {
    let get = |key: &str| counts.get(key).copied().unwrap_or(0);
    ApplicationBreakdown {
        total: counts.values().sum(),
        pending: get("pending"),
        review: get("review"),
        interviews: get("interview_scheduled") + get("interview_completed"),
        accepted: get("accepted"),
        rejected: get("rejected"),
        hired: get("hired"),
    }
}

/// Job status counters derived from an already-fetched job list.
pub fn job_status_counts(jobs: &[Job]) -> (i64, i64) {
    let approved = jobs
        .iter()
        .filter(|j| j.status == JobStatus::Approved.as_str())
        .count() as i64;
    let pending = jobs
        .iter()
        .filter(|j| j.status == JobStatus::Pending.as_str())
        .count() as i64;
    (approved, pending)
}

// --- Jobseeker dashboard ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobseekerStats {
    #[serde(flatten)]
    pub applications: ApplicationBreakdown,
    pub recent_applications: i64,
    pub saved_jobs: i64,
    pub upcoming_interviews: i64,
    pub unread_notifications: i64,
    pub profile_completion: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobseekerDashboard {
    pub stats: JobseekerStats,
    pub recent_applications: Vec<ApplicationWithJob>,
    pub saved_jobs: Vec<Job>,
    pub recommended_jobs: Vec<Job>,
    pub upcoming_interviews: Vec<Interview>,
    pub notifications: Vec<Notification>,
    pub profile: JobseekerProfile,
}

pub fn jobseeker_dashboard(pool: &DbPool, user_id: Uuid) -> AppResult<JobseekerDashboard> {
    let profile = profile_service::get_or_create_jobseeker(pool, user_id)?;
    let mut conn = get_conn(pool)?;
    let now = Utc::now();

    let status_counts: HashMap<String, i64> = applications::table
        .filter(applications::applicant_id.eq(user_id))
        .group_by(applications::status)
        .select((applications::status, count_star()))
        .load::<(String, i64)>(&mut conn)?
        .into_iter()
        .collect();

    let recent_count: i64 = applications::table
        .filter(applications::applicant_id.eq(user_id))
        .filter(applications::created_at.gt(now - Duration::days(RECENT_WINDOW_DAYS)))
        .count()
        .get_result(&mut conn)?;

    let recent_applications: Vec<ApplicationWithJob> = applications::table
        .inner_join(jobs::table)
        .filter(applications::applicant_id.eq(user_id))
        .order(applications::created_at.desc())
        .limit(APPLICATION_PREVIEW_LIMIT)
        .select((applications::all_columns, jobs::all_columns))
        .load::<(Application, Job)>(&mut conn)?
        .into_iter()
        .map(|(application, job)| ApplicationWithJob { application, job })
        .collect();

    let saved_jobs: Vec<Job> = if profile.saved_jobs.is_empty() {
        vec![]
    } else {
        jobs::table
            .filter(jobs::id.eq_any(&profile.saved_jobs))
            .filter(jobs::status.eq(JobStatus::Approved.as_str()))
            .order(jobs::created_at.desc())
            .limit(PREVIEW_LIMIT)
            .load(&mut conn)?
    };

    // Recommendations reuse the same matching rule as the job-posted fan-out,
    // applied over a window of recent approved jobs.
    let recommended_jobs: Vec<Job> = jobs::table
        .filter(jobs::status.eq(JobStatus::Approved.as_str()))
        .order(jobs::created_at.desc())
        .limit(50)
        .load::<Job>(&mut conn)?
        .into_iter()
        .filter(|job| dispatch::skills_match(&profile.skills, &job.required_skills))
        .take(PREVIEW_LIMIT as usize)
        .collect();

    let upcoming_interviews: Vec<Interview> = interviews::table
        .filter(interviews::jobseeker_id.eq(user_id))
        .filter(interviews::scheduled_at.gt(now))
        .filter(interviews::status.eq("scheduled"))
        .order(interviews::scheduled_at.asc())
        .limit(PREVIEW_LIMIT)
        .load(&mut conn)?;

    let upcoming_count: i64 = interviews::table
        .filter(interviews::jobseeker_id.eq(user_id))
        .filter(interviews::scheduled_at.gt(now))
        .filter(interviews::status.eq("scheduled"))
        .count()
        .get_result(&mut conn)?;

    let latest_notifications: Vec<Notification> = notifications::table
        .filter(notifications::recipient_id.eq(user_id))
        .filter(notifications::status.eq(NotificationStatus::Unread.as_str()))
        .filter(
            notifications::expires_at
                .is_null()
                .or(notifications::expires_at.gt(now)),
        )
        .order(notifications::created_at.desc())
        .limit(PREVIEW_LIMIT)
        .load(&mut conn)?;
    drop(conn);

    let unread = notification_service::unread_count(pool, user_id)?;

    Ok(JobseekerDashboard {
        stats: JobseekerStats {
            applications: application_breakdown(&status_counts),
            recent_applications: recent_count,
            saved_jobs: profile.saved_jobs.len() as i64,
            upcoming_interviews: upcoming_count,
            unread_notifications: unread,
            profile_completion: profile.profile_completion,
        },
        recent_applications,
        saved_jobs,
        recommended_jobs,
        upcoming_interviews,
        notifications: latest_notifications,
        profile,
    })
}

// --- Employer dashboard ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub job_title: Option<String>,
    pub location: Option<String>,
    pub skills: Vec<String>,
}

/// Shared by the employer dashboard and the saved-candidates listing.
pub fn candidate_summaries(pool: &DbPool, ids: &[Uuid]) -> AppResult<Vec<CandidateSummary>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let mut conn = get_conn(pool)?;
    Ok(jobseeker_profiles::table
        .inner_join(users::table)
        .filter(jobseeker_profiles::id.eq_any(ids))
        .select((
            jobseeker_profiles::id,
            users::name,
            users::email,
            jobseeker_profiles::job_title,
            jobseeker_profiles::location,
            jobseeker_profiles::skills,
        ))
        .load::<(Uuid, String, String, Option<String>, Option<String>, Vec<String>)>(&mut conn)?
        .into_iter()
        .map(|(id, name, email, job_title, location, skills)| CandidateSummary {
            id,
            name,
            email,
            job_title,
            location,
            skills,
        })
        .collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerStats {
    pub total_jobs: i64,
    pub approved_jobs: i64,
    pub pending_jobs: i64,
    pub jobs_allowed: i32,
    pub jobs_used: i32,
    #[serde(flatten)]
    pub applications: ApplicationBreakdown,
    pub saved_candidates: i64,
    pub unread_notifications: i64,
    pub profile_completion: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerDashboard {
    pub stats: EmployerStats,
    pub jobs: Vec<Job>,
    pub recent_applications: Vec<ApplicationWithJob>,
    pub saved_candidates: Vec<CandidateSummary>,
    pub articles: Vec<Article>,
    pub profile: EmployerProfile,
}

pub fn employer_dashboard(pool: &DbPool, user_id: Uuid) -> AppResult<EmployerDashboard> {
    let profile = profile_service::get_or_create_employer(pool, user_id)?;
    let mut conn = get_conn(pool)?;

    // One list drives both the preview and the job status counters.
    let employer_jobs: Vec<Job> = jobs::table
        .filter(jobs::employer_id.eq(user_id))
        .order(jobs::created_at.desc())
        .load(&mut conn)?;
    let (approved_jobs, pending_jobs) = job_status_counts(&employer_jobs);

    let status_counts: HashMap<String, i64> = applications::table
        .filter(applications::employer_id.eq(user_id))
        .group_by(applications::status)
        .select((applications::status, count_star()))
        .load::<(String, i64)>(&mut conn)?
        .into_iter()
        .collect();

    let recent_applications: Vec<ApplicationWithJob> = applications::table
        .inner_join(jobs::table)
        .filter(applications::employer_id.eq(user_id))
        .order(applications::created_at.desc())
        .limit(APPLICATION_PREVIEW_LIMIT)
        .select((applications::all_columns, jobs::all_columns))
        .load::<(Application, Job)>(&mut conn)?
        .into_iter()
        .map(|(application, job)| ApplicationWithJob { application, job })
        .collect();

    let recent_articles: Vec<Article> = articles::table
        .filter(articles::author_id.eq(user_id))
        .order(articles::created_at.desc())
        .limit(PREVIEW_LIMIT)
        .load(&mut conn)?;
    drop(conn);

    let saved_candidates = candidate_summaries(pool, &profile.saved_candidates)?;
    let unread = notification_service::unread_count(pool, user_id)?;

    let preview: Vec<Job> = employer_jobs.into_iter().take(APPLICATION_PREVIEW_LIMIT as usize).collect();
    Ok(EmployerDashboard {
        stats: EmployerStats {
            total_jobs: approved_jobs + pending_jobs,
            approved_jobs,
            pending_jobs,
            jobs_allowed: profile.jobs_allowed,
            jobs_used: profile.jobs_used,
            applications: application_breakdown(&status_counts),
            saved_candidates: profile.saved_candidates.len() as i64,
            unread_notifications: unread,
            profile_completion: profile.profile_completion,
        },
        jobs: preview,
        recent_applications,
        saved_candidates,
        articles: recent_articles,
        profile,
    })
}

// --- Admin dashboard ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub active_users: i64,
    pub jobseekers: i64,
    pub employers: i64,
    pub admins: i64,
    pub total_jobs: i64,
    pub approved_jobs: i64,
    pub pending_jobs: i64,
    pub total_applications: i64,
    pub total_articles: i64,
}

/// One row of the merged recent-activity feed.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub kind: String,
    pub label: String,
    pub occurred_at: DateTime<Utc>,
}

/// Merges per-collection recent rows into one feed, newest first.
pub fn merge_activity(mut items: Vec<ActivityItem>, limit: usize) -> Vec<ActivityItem> {
    items.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    items.truncate(limit);
    items
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub stats: AdminStats,
    pub recent_activity: Vec<ActivityItem>,
    pub recent_notifications: Vec<Notification>,
}

pub fn admin_dashboard(pool: &DbPool) -> AppResult<AdminDashboard> {
    let mut conn = get_conn(pool)?;
    let now = Utc::now();

    let role_counts: HashMap<String, i64> = users::table
        .group_by(users::role)
        .select((users::role, count_star()))
        .load::<(String, i64)>(&mut conn)?
        .into_iter()
        .collect();
    let active_users: i64 = users::table
        .filter(users::status.eq("active"))
        .count()
        .get_result(&mut conn)?;

    let job_counts: HashMap<String, i64> = jobs::table
        .group_by(jobs::status)
        .select((jobs::status, count_star()))
        .load::<(String, i64)>(&mut conn)?
        .into_iter()
        .collect();

    let total_applications: i64 = applications::table.count().get_result(&mut conn)?;
    let total_articles: i64 = articles::table.count().get_result(&mut conn)?;

    let recent_users: Vec<User> = users::table
        .order(users::created_at.desc())
        .limit(PREVIEW_LIMIT)
        .load(&mut conn)?;
    let recent_jobs: Vec<Job> = jobs::table
        .order(jobs::created_at.desc())
        .limit(PREVIEW_LIMIT)
        .load(&mut conn)?;
    let recent_applications: Vec<Application> = applications::table
        .order(applications::created_at.desc())
        .limit(PREVIEW_LIMIT)
        .load(&mut conn)?;
    let recent_articles: Vec<Article> = articles::table
        .order(articles::created_at.desc())
        .limit(PREVIEW_LIMIT)
        .load(&mut conn)?;

    let recent_notifications: Vec<Notification> = notifications::table
        .filter(
            notifications::expires_at
                .is_null()
                .or(notifications::expires_at.gt(now)),
        )
        .order(notifications::created_at.desc())
        .limit(APPLICATION_PREVIEW_LIMIT)
        .load(&mut conn)?;

    let mut activity: Vec<ActivityItem> = Vec::new();
    activity.extend(recent_users.into_iter().map(|u| ActivityItem {
        kind: "user_registered".into(),
        label: format!("{} joined as {}", u.name, u.role),
        occurred_at: u.created_at,
    }));
    activity.extend(recent_jobs.into_iter().map(|j| ActivityItem {
        kind: "job_posted".into(),
        label: format!("{} posted \"{}\"", j.company, j.title),
        occurred_at: j.created_at,
    }));
    activity.extend(recent_applications.into_iter().map(|a| ActivityItem {
        kind: "application_submitted".into(),
        label: format!("application {}", a.status),
        occurred_at: a.created_at,
    }));
    activity.extend(recent_articles.into_iter().map(|a| ActivityItem {
        kind: "article_published".into(),
        label: format!("article \"{}\"", a.title),
        occurred_at: a.created_at,
    }));

    let get_role = |role: UserRole| role_counts.get(role.as_str()).copied().unwrap_or(0);
    Ok(AdminDashboard {
        stats: AdminStats {
            total_users: role_counts.values().sum(),
            active_users,
            jobseekers: get_role(UserRole::Jobseeker),
            employers: get_role(UserRole::Employer),
            admins: get_role(UserRole::Admin),
            total_jobs: job_counts.values().sum(),
            approved_jobs: job_counts.get("approved").copied().unwrap_or(0),
            pending_jobs: job_counts.get("pending").copied().unwrap_or(0),
            total_applications,
            total_articles,
        },
        recent_activity: merge_activity(activity, APPLICATION_PREVIEW_LIMIT as usize),
        recent_notifications,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_totals_all_statuses() {
        let mut counts = HashMap::new();
        counts.insert("pending".to_string(), 3);
        counts.insert("interview_scheduled".to_string(), 2);
        counts.insert("interview_completed".to_string(), 1);
        counts.insert("hired".to_string(), 1);

        let breakdown = application_breakdown(&counts);
        assert_eq!(breakdown.total, 7);
        assert_eq!(breakdown.pending, 3);
        assert_eq!(breakdown.interviews, 3);
        assert_eq!(breakdown.hired, 1);
        assert_eq!(breakdown.rejected, 0);
    }

    #[test]
    fn empty_breakdown_is_zeroes() {
        assert_eq!(application_breakdown(&HashMap::new()), ApplicationBreakdown::default());
    }

    #[test]
    fn job_counts_from_single_list() {
        let job = |status: &str| Job {
            id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            title: "t".into(),
            description: "d".into(),
            compensation: "c".into(),
            job_type: "full_time".into(),
            experience_level: "mid".into(),
            required_skills: vec![],
            location: "l".into(),
            company: "co".into(),
            status: status.into(),
            created_at: Utc::now(),
        };
        let jobs = vec![job("approved"), job("approved"), job("pending")];
        assert_eq!(job_status_counts(&jobs), (2, 1));
    }

    #[test]
    fn activity_feed_sorted_and_capped() {
        let now = Utc::now();
        let item = |kind: &str, minutes_ago: i64| ActivityItem {
            kind: kind.into(),
            label: kind.into(),
            occurred_at: now - Duration::minutes(minutes_ago),
        };
        let merged = merge_activity(
            vec![item("a", 30), item("b", 10), item("c", 20), item("d", 5)],
            3,
        );
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].kind, "d");
        assert_eq!(merged[1].kind, "b");
        assert_eq!(merged[2].kind, "c");
    }
}
