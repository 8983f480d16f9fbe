use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use hirelink_shared::clients::db::DbPool;
use hirelink_shared::errors::{AppError, AppResult, ErrorCode};
use hirelink_shared::types::{AuthUser, PaginationParams, UserRole};

use crate::models::{
    Application, ApplicationStatus, Interview, Job, JobStatus, NewApplication, NewInterview,
};
use crate::schema::{applications, interviews, jobs};
use crate::services::dashboard_service::ApplicationWithJob;
use crate::services::profile_service;

fn get_conn(pool: &DbPool) -> AppResult<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>> {
    pool.get().map_err(|e| {
        tracing::error!(error = %e, "failed to get db connection");
        AppError::internal("database connection error")
    })
}

/// Submits an application with the jobseeker's current resume embedded as a
/// snapshot. One application per (job, applicant) pair.
pub fn apply(
    pool: &DbPool,
    applicant_id: Uuid,
    job_id: Uuid,
    notes: Option<String>,
) -> AppResult<(Application, Job)> {
    let profile = profile_service::get_or_create_jobseeker(pool, applicant_id)?;
    let resume = profile.resume_info().ok_or_else(|| {
        AppError::bad_request("a resume is required before applying")
    })?;

    let mut conn = get_conn(pool)?;
    let job = jobs::table
        .find(job_id)
        .first::<Job>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::JobNotFound, "job not found"))?;
    if job.status != JobStatus::Approved.as_str() {
        return Err(AppError::new(
            ErrorCode::JobNotApproved,
            "applications are only accepted for approved jobs",
        ));
    }

    let already_applied: i64 = applications::table
        .filter(applications::job_id.eq(job_id))
        .filter(applications::applicant_id.eq(applicant_id))
        .count()
        .get_result(&mut conn)?;
    if already_applied > 0 {
        return Err(AppError::new(
            ErrorCode::DuplicateApplication,
            "you have already applied to this job",
        ));
    }

    let application = diesel::insert_into(applications::table)
        .values(&NewApplication {
            job_id,
            applicant_id,
            employer_id: job.employer_id,
            status: ApplicationStatus::Pending.as_str().to_string(),
            resume_url: resume.url,
            resume_filename: resume.original_name,
            notes,
        })
        .get_result::<Application>(&mut conn)?;

    tracing::info!(
        application_id = %application.id,
        job_id = %job_id,
        "application submitted"
    );
    Ok((application, job))
}

pub struct StatusUpdate {
    pub application: Application,
    pub job: Job,
    pub interview: Option<Interview>,
}

/// Moves an application through its lifecycle. Only the posting employer or
/// an admin may do this; `interview_scheduled` also records the interview.
pub fn update_status(
    pool: &DbPool,
    application_id: Uuid,
    actor: &AuthUser,
    new_status: ApplicationStatus,
    scheduled_at: Option<DateTime<Utc>>,
) -> AppResult<StatusUpdate> {
    let mut conn = get_conn(pool)?;
    let (application, job) = applications::table
        .inner_join(jobs::table)
        .filter(applications::id.eq(application_id))
        .select((applications::all_columns, jobs::all_columns))
        .first::<(Application, Job)>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ApplicationNotFound, "application not found"))?;

    if actor.role != UserRole::Admin && application.employer_id != actor.id {
        return Err(AppError::forbidden("you do not own this application's posting"));
    }

    let interview = if new_status == ApplicationStatus::InterviewScheduled {
        let scheduled_at = scheduled_at.ok_or_else(|| {
            AppError::bad_request("scheduledAt is required when scheduling an interview")
        })?;
        let interview = diesel::insert_into(interviews::table)
            .values(&NewInterview {
                jobseeker_id: application.applicant_id,
                job_id: job.id,
                employer_id: application.employer_id,
                application_id: application.id,
                scheduled_at,
                duration_minutes: 60,
                modality: "video".to_string(),
                status: "scheduled".to_string(),
                meeting_link: None,
                location: None,
                reschedule_history: serde_json::json!([]),
            })
            .get_result::<Interview>(&mut conn)?;
        Some(interview)
    } else {
        None
    };

    let application = diesel::update(applications::table.find(application_id))
        .set((
            applications::status.eq(new_status.as_str()),
            applications::updated_at.eq(Utc::now()),
        ))
        .get_result::<Application>(&mut conn)?;

    tracing::info!(
        application_id = %application_id,
        status = new_status.as_str(),
        "application status updated"
    );
    Ok(StatusUpdate { application, job, interview })
}

pub fn list_for_jobseeker(
    pool: &DbPool,
    applicant_id: Uuid,
    pagination: &PaginationParams,
) -> AppResult<(Vec<ApplicationWithJob>, i64)> {
    let mut conn = get_conn(pool)?;
    let items = applications::table
        .inner_join(jobs::table)
        .filter(applications::applicant_id.eq(applicant_id))
        .order(applications::created_at.desc())
        .limit(pagination.limit() as i64)
        .offset(pagination.offset() as i64)
        .select((applications::all_columns, jobs::all_columns))
        .load::<(Application, Job)>(&mut conn)?
        .into_iter()
        .map(|(application, job)| ApplicationWithJob { application, job })
        .collect();
    let total = applications::table
        .filter(applications::applicant_id.eq(applicant_id))
        .count()
        .get_result::<i64>(&mut conn)?;
    Ok((items, total))
}

pub fn list_for_employer(
    pool: &DbPool,
    employer_id: Uuid,
    pagination: &PaginationParams,
) -> AppResult<(Vec<ApplicationWithJob>, i64)> {
    let mut conn = get_conn(pool)?;
    let items = applications::table
        .inner_join(jobs::table)
        .filter(applications::employer_id.eq(employer_id))
        .order(applications::created_at.desc())
        .limit(pagination.limit() as i64)
        .offset(pagination.offset() as i64)
        .select((applications::all_columns, jobs::all_columns))
        .load::<(Application, Job)>(&mut conn)?
        .into_iter()
        .map(|(application, job)| ApplicationWithJob { application, job })
        .collect();
    let total = applications::table
        .filter(applications::employer_id.eq(employer_id))
        .count()
        .get_result::<i64>(&mut conn)?;
    Ok((items, total))
}
