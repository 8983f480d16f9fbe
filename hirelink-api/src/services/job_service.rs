use diesel::prelude::*;
use uuid::Uuid;

use hirelink_shared::clients::db::DbPool;
use hirelink_shared::errors::{AppError, AppResult, ErrorCode};
use hirelink_shared::types::{AuthUser, PaginationParams, UserRole};

use crate::models::{EmployerProfile, Job, JobStatus, NewJob};
use crate::schema::{employer_profiles, jobs};
use crate::services::profile_service;

fn get_conn(pool: &DbPool) -> AppResult<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>> {
    pool.get().map_err(|e| {
        tracing::error!(error = %e, "failed to get db connection");
        AppError::internal("database connection error")
    })
}

/// Pending jobs are visible only to their owner and to admins.
pub fn job_visible_to(job: &Job, viewer: Option<&AuthUser>) -> bool {
    if job.status == JobStatus::Approved.as_str() {
        return true;
    }
    match viewer {
        Some(user) => user.role == UserRole::Admin || user.id == job.employer_id,
        None => false,
    }
}

pub fn list_public(pool: &DbPool, pagination: &PaginationParams) -> AppResult<(Vec<Job>, i64)> {
    let mut conn = get_conn(pool)?;
    let items = jobs::table
        .filter(jobs::status.eq(JobStatus::Approved.as_str()))
        .order(jobs::created_at.desc())
        .limit(pagination.limit() as i64)
        .offset(pagination.offset() as i64)
        .load::<Job>(&mut conn)?;
    let total = jobs::table
        .filter(jobs::status.eq(JobStatus::Approved.as_str()))
        .count()
        .get_result::<i64>(&mut conn)?;
    Ok((items, total))
}

pub fn get_visible(pool: &DbPool, id: Uuid, viewer: Option<&AuthUser>) -> AppResult<Job> {
    let mut conn = get_conn(pool)?;
    let job = jobs::table
        .find(id)
        .first::<Job>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::JobNotFound, "job not found"))?;
    if !job_visible_to(&job, viewer) {
        // Hide existence of unapproved postings from outsiders.
        return Err(AppError::new(ErrorCode::JobNotFound, "job not found"));
    }
    Ok(job)
}

pub fn list_for_employer(pool: &DbPool, employer_id: Uuid) -> AppResult<Vec<Job>> {
    let mut conn = get_conn(pool)?;
    Ok(jobs::table
        .filter(jobs::employer_id.eq(employer_id))
        .order(jobs::created_at.desc())
        .load::<Job>(&mut conn)?)
}

pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub compensation: String,
    pub job_type: String,
    pub experience_level: String,
    pub required_skills: Vec<String>,
    pub location: String,
}

/// Creates a pending posting inside one transaction: the quota check and the
/// usage increment see the same profile row.
pub fn create(pool: &DbPool, employer_id: Uuid, draft: JobDraft) -> AppResult<Job> {
    let profile = profile_service::get_or_create_employer(pool, employer_id)?;
    let mut conn = get_conn(pool)?;

    conn.transaction::<_, AppError, _>(|conn| {
        let profile = employer_profiles::table
            .find(profile.id)
            .first::<EmployerProfile>(conn)?;
        if profile.jobs_used >= profile.jobs_allowed {
            return Err(AppError::new(
                ErrorCode::PostingQuotaExceeded,
                format!("posting quota of {} reached", profile.jobs_allowed),
            ));
        }

        let job = diesel::insert_into(jobs::table)
            .values(&NewJob {
                employer_id,
                title: draft.title,
                description: draft.description,
                compensation: draft.compensation,
                job_type: draft.job_type,
                experience_level: draft.experience_level,
                required_skills: draft.required_skills,
                location: draft.location,
                company: profile.company_name.clone(),
                status: JobStatus::Pending.as_str().to_string(),
            })
            .get_result::<Job>(conn)?;

        diesel::update(employer_profiles::table.find(profile.id))
            .set(employer_profiles::jobs_used.eq(profile.jobs_used + 1))
            .execute(conn)?;

        tracing::info!(job_id = %job.id, employer_id = %employer_id, "job posted, awaiting approval");
        Ok(job)
    })
}

/// Returns the job and whether this call transitioned it to approved.
pub fn approve(pool: &DbPool, id: Uuid) -> AppResult<(Job, bool)> {
    let mut conn = get_conn(pool)?;
    let job = jobs::table
        .find(id)
        .first::<Job>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::JobNotFound, "job not found"))?;

    if job.status == JobStatus::Approved.as_str() {
        return Ok((job, false));
    }

    let approved = diesel::update(jobs::table.find(id))
        .set(jobs::status.eq(JobStatus::Approved.as_str()))
        .get_result::<Job>(&mut conn)?;
    tracing::info!(job_id = %id, "job approved");
    Ok((approved, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn job(status: &str, employer_id: Uuid) -> Job {
        Job {
            id: Uuid::new_v4(),
            employer_id,
            title: "Rust Engineer".into(),
            description: "build things".into(),
            compensation: "competitive".into(),
            job_type: "full_time".into(),
            experience_level: "senior".into(),
            required_skills: vec!["rust".into()],
            location: "remote".into(),
            company: "Acme".into(),
            status: status.into(),
            created_at: Utc::now(),
        }
    }

    fn auth(id: Uuid, role: UserRole) -> AuthUser {
        AuthUser { id, role, token_id: Uuid::new_v4() }
    }

    #[test]
    fn approved_jobs_visible_to_everyone() {
        let j = job("approved", Uuid::new_v4());
        assert!(job_visible_to(&j, None));
        assert!(job_visible_to(&j, Some(&auth(Uuid::new_v4(), UserRole::Jobseeker))));
    }

    #[test]
    fn pending_jobs_hidden_except_owner_and_admin() {
        let owner = Uuid::new_v4();
        let j = job("pending", owner);
        assert!(!job_visible_to(&j, None));
        assert!(!job_visible_to(&j, Some(&auth(Uuid::new_v4(), UserRole::Jobseeker))));
        assert!(!job_visible_to(&j, Some(&auth(Uuid::new_v4(), UserRole::Employer))));
        assert!(job_visible_to(&j, Some(&auth(owner, UserRole::Employer))));
        assert!(job_visible_to(&j, Some(&auth(Uuid::new_v4(), UserRole::Admin))));
    }
}
