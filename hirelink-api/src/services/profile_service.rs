use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::Serialize;
use uuid::Uuid;

use hirelink_shared::clients::db::DbPool;
use hirelink_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{
    EmployerProfile, Job, JobStatus, JobseekerProfile, NewEmployerProfile, NewJobseekerProfile,
    ResumeInfo, SocialLinks, UpdateEmployerProfile, UpdateJobseekerProfile, UpdateUser, User,
};
use crate::schema::{employer_profiles, jobs, jobseeker_profiles, users};

fn get_conn(pool: &DbPool) -> AppResult<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>> {
    pool.get().map_err(|e| {
        tracing::error!(error = %e, "failed to get db connection");
        AppError::internal("database connection error")
    })
}

fn map_unique_email(e: diesel::result::Error) -> AppError {
    match e {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            AppError::new(ErrorCode::EmailAlreadyExists, "email already in use")
        }
        other => other.into(),
    }
}

pub fn find_user(pool: &DbPool, user_id: Uuid) -> AppResult<User> {
    let mut conn = get_conn(pool)?;
    users::table
        .find(user_id)
        .first::<User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))
}

/// Guaranteed-present jobseeker profile: creates an empty one on first access.
/// Legacy resume URLs are rewritten and persisted as part of the read.
pub fn get_or_create_jobseeker(pool: &DbPool, user_id: Uuid) -> AppResult<JobseekerProfile> {
    let mut conn = get_conn(pool)?;
    let existing = jobseeker_profiles::table
        .filter(jobseeker_profiles::user_id.eq(user_id))
        .first::<JobseekerProfile>(&mut conn)
        .optional()?;

    let mut profile = match existing {
        Some(p) => p,
        None => {
            let created = diesel::insert_into(jobseeker_profiles::table)
                .values(&NewJobseekerProfile::empty(user_id))
                .get_result::<JobseekerProfile>(&mut conn)?;
            tracing::info!(user_id = %user_id, profile_id = %created.id, "jobseeker profile lazily created");
            created
        }
    };

    if let Some(mut info) = profile.resume_info() {
        if let Some(new_url) = rewrite_legacy_resume_url(&info.url) {
            info.url = new_url;
            let value = serde_json::to_value(&info)
                .map_err(|e| AppError::internal(e.to_string()))?;
            profile = diesel::update(jobseeker_profiles::table.find(profile.id))
                .set(jobseeker_profiles::resume.eq(Some(value)))
                .get_result::<JobseekerProfile>(&mut conn)?;
            tracing::debug!(profile_id = %profile.id, "resume url migrated to image delivery path");
        }
    }

    Ok(profile)
}

/// Guaranteed-present employer profile with a default company name derived
/// from the user's name.
pub fn get_or_create_employer(pool: &DbPool, user_id: Uuid) -> AppResult<EmployerProfile> {
    let mut conn = get_conn(pool)?;
    let existing = employer_profiles::table
        .filter(employer_profiles::user_id.eq(user_id))
        .first::<EmployerProfile>(&mut conn)
        .optional()?;

    if let Some(p) = existing {
        return Ok(p);
    }

    let user = users::table
        .find(user_id)
        .first::<User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    let created = diesel::insert_into(employer_profiles::table)
        .values(&NewEmployerProfile::with_default_company(user_id, &user.name))
        .get_result::<EmployerProfile>(&mut conn)?;
    tracing::info!(user_id = %user_id, profile_id = %created.id, "employer profile lazily created");
    Ok(created)
}

/// Storage paths written before the delivery change used `/raw/upload/`;
/// reads rewrite them in place.
pub fn rewrite_legacy_resume_url(url: &str) -> Option<String> {
    if url.contains("/raw/upload/") {
        Some(url.replace("/raw/upload/", "/image/upload/"))
    } else {
        None
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

fn non_empty_array(value: &serde_json::Value) -> bool {
    value.as_array().map(|a| !a.is_empty()).unwrap_or(false)
}

/// 8-point completion checklist for jobseekers: phone, location, job title,
/// summary, skills, experience, education, any social link.
pub fn jobseeker_completion(profile: &JobseekerProfile) -> i32 {
    let checks = [
        present(&profile.phone),
        present(&profile.location),
        present(&profile.job_title),
        present(&profile.summary),
        !profile.skills.is_empty(),
        non_empty_array(&profile.experience),
        non_empty_array(&profile.education),
        profile.social().any(),
    ];
    completion_percent(&checks)
}

/// 8-point completion checklist for employers: company name, description,
/// industry, size, website, headquarters city, contact phone, logo.
pub fn employer_completion(profile: &EmployerProfile) -> i32 {
    let checks = [
        !profile.company_name.trim().is_empty(),
        present(&profile.company_description),
        present(&profile.industry),
        present(&profile.company_size),
        present(&profile.website),
        present(&profile.headquarters_city),
        present(&profile.contact_phone),
        present(&profile.company_logo_url),
    ];
    completion_percent(&checks)
}

fn completion_percent(checks: &[bool]) -> i32 {
    let completed = checks.iter().filter(|c| **c).count();
    ((completed as f64 / checks.len() as f64) * 100.0).round() as i32
}

fn apply_jobseeker_changes(profile: &mut JobseekerProfile, changes: &UpdateJobseekerProfile) {
    if let Some(v) = &changes.phone { profile.phone = Some(v.clone()); }
    if let Some(v) = &changes.location { profile.location = Some(v.clone()); }
    if let Some(v) = &changes.job_title { profile.job_title = Some(v.clone()); }
    if let Some(v) = &changes.summary { profile.summary = Some(v.clone()); }
    if let Some(v) = &changes.skills { profile.skills = v.clone(); }
    if let Some(v) = &changes.experience { profile.experience = v.clone(); }
    if let Some(v) = &changes.education { profile.education = v.clone(); }
    if let Some(v) = &changes.certifications { profile.certifications = v.clone(); }
    // Social links are replaced wholesale when any social field is supplied.
    if let Some(v) = &changes.social_links { profile.social_links = v.clone(); }
    if let Some(v) = &changes.resume { profile.resume = Some(v.clone()); }
}

fn apply_employer_changes(profile: &mut EmployerProfile, changes: &UpdateEmployerProfile) {
    if let Some(v) = &changes.company_name { profile.company_name = v.clone(); }
    if let Some(v) = &changes.company_description { profile.company_description = Some(v.clone()); }
    if let Some(v) = &changes.industry { profile.industry = Some(v.clone()); }
    if let Some(v) = &changes.company_size { profile.company_size = Some(v.clone()); }
    if let Some(v) = &changes.website { profile.website = Some(v.clone()); }
    if let Some(v) = &changes.headquarters_city { profile.headquarters_city = Some(v.clone()); }
    if let Some(v) = &changes.contact_phone { profile.contact_phone = Some(v.clone()); }
    if let Some(v) = &changes.company_logo_url { profile.company_logo_url = Some(v.clone()); }
}

/// Two-document profile write: identity fields on the user, everything else
/// on the jobseeker profile, in one transaction. Completion is recomputed
/// from the merged state on every save.
pub fn update_jobseeker(
    pool: &DbPool,
    user_id: Uuid,
    identity: UpdateUser,
    mut changes: UpdateJobseekerProfile,
) -> AppResult<(User, JobseekerProfile)> {
    let mut conn = get_conn(pool)?;

    conn.transaction::<_, AppError, _>(|conn| {
        let mut user = users::table
            .find(user_id)
            .first::<User>(conn)
            .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

        if !identity.is_empty() {
            user = diesel::update(users::table.find(user_id))
                .set((&identity, users::updated_at.eq(chrono::Utc::now())))
                .get_result::<User>(conn)
                .map_err(map_unique_email)?;
        }

        let existing = jobseeker_profiles::table
            .filter(jobseeker_profiles::user_id.eq(user_id))
            .first::<JobseekerProfile>(conn)
            .optional()?;
        let mut profile = match existing {
            Some(p) => p,
            None => diesel::insert_into(jobseeker_profiles::table)
                .values(&NewJobseekerProfile::empty(user_id))
                .get_result::<JobseekerProfile>(conn)?,
        };

        apply_jobseeker_changes(&mut profile, &changes);
        changes.profile_completion = Some(jobseeker_completion(&profile));

        let profile = diesel::update(jobseeker_profiles::table.find(profile.id))
            .set((&changes, jobseeker_profiles::updated_at.eq(chrono::Utc::now())))
            .get_result::<JobseekerProfile>(conn)?;

        Ok((user, profile))
    })
}

pub fn update_employer(
    pool: &DbPool,
    user_id: Uuid,
    identity: UpdateUser,
    mut changes: UpdateEmployerProfile,
) -> AppResult<(User, EmployerProfile)> {
    let mut conn = get_conn(pool)?;

    conn.transaction::<_, AppError, _>(|conn| {
        let mut user = users::table
            .find(user_id)
            .first::<User>(conn)
            .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

        if !identity.is_empty() {
            user = diesel::update(users::table.find(user_id))
                .set((&identity, users::updated_at.eq(chrono::Utc::now())))
                .get_result::<User>(conn)
                .map_err(map_unique_email)?;
        }

        let existing = employer_profiles::table
            .filter(employer_profiles::user_id.eq(user_id))
            .first::<EmployerProfile>(conn)
            .optional()?;
        let mut profile = match existing {
            Some(p) => p,
            None => diesel::insert_into(employer_profiles::table)
                .values(&NewEmployerProfile::with_default_company(user_id, &user.name))
                .get_result::<EmployerProfile>(conn)?,
        };

        apply_employer_changes(&mut profile, &changes);
        changes.profile_completion = Some(employer_completion(&profile));

        let profile = diesel::update(employer_profiles::table.find(profile.id))
            .set((&changes, employer_profiles::updated_at.eq(chrono::Utc::now())))
            .get_result::<EmployerProfile>(conn)?;

        Ok((user, profile))
    })
}

/// Identity-only update path, used when the caller has no role profile
/// (admins).
pub fn update_identity(pool: &DbPool, user_id: Uuid, identity: UpdateUser) -> AppResult<User> {
    let mut conn = get_conn(pool)?;
    let user = users::table
        .find(user_id)
        .first::<User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;
    if identity.is_empty() {
        return Ok(user);
    }
    diesel::update(users::table.find(user_id))
        .set((&identity, users::updated_at.eq(chrono::Utc::now())))
        .get_result::<User>(&mut conn)
        .map_err(map_unique_email)
}

// --- Saved items (set semantics: duplicate save and absent remove are no-ops) ---

pub fn save_job(pool: &DbPool, user_id: Uuid, job_id: Uuid) -> AppResult<Vec<Uuid>> {
    let profile = get_or_create_jobseeker(pool, user_id)?;
    let mut conn = get_conn(pool)?;

    let job = jobs::table
        .find(job_id)
        .first::<Job>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::JobNotFound, "job not found"))?;
    if job.status != JobStatus::Approved.as_str() {
        return Err(AppError::new(ErrorCode::JobNotFound, "job not found"));
    }

    if profile.saved_jobs.contains(&job_id) {
        return Ok(profile.saved_jobs);
    }
    let mut saved = profile.saved_jobs;
    saved.push(job_id);
    diesel::update(jobseeker_profiles::table.find(profile.id))
        .set(jobseeker_profiles::saved_jobs.eq(&saved))
        .execute(&mut conn)?;
    Ok(saved)
}

pub fn unsave_job(pool: &DbPool, user_id: Uuid, job_id: Uuid) -> AppResult<Vec<Uuid>> {
    let profile = get_or_create_jobseeker(pool, user_id)?;
    if !profile.saved_jobs.contains(&job_id) {
        return Ok(profile.saved_jobs);
    }
    let saved: Vec<Uuid> = profile
        .saved_jobs
        .into_iter()
        .filter(|id| *id != job_id)
        .collect();
    let mut conn = get_conn(pool)?;
    diesel::update(jobseeker_profiles::table.find(profile.id))
        .set(jobseeker_profiles::saved_jobs.eq(&saved))
        .execute(&mut conn)?;
    Ok(saved)
}

pub fn list_saved_jobs(pool: &DbPool, user_id: Uuid) -> AppResult<Vec<Job>> {
    let profile = get_or_create_jobseeker(pool, user_id)?;
    if profile.saved_jobs.is_empty() {
        return Ok(vec![]);
    }
    let mut conn = get_conn(pool)?;
    Ok(jobs::table
        .filter(jobs::id.eq_any(&profile.saved_jobs))
        .filter(jobs::status.eq(JobStatus::Approved.as_str()))
        .order(jobs::created_at.desc())
        .load::<Job>(&mut conn)?)
}

pub fn save_candidate(pool: &DbPool, employer_id: Uuid, candidate_id: Uuid) -> AppResult<Vec<Uuid>> {
    let profile = get_or_create_employer(pool, employer_id)?;
    let mut conn = get_conn(pool)?;

    let exists: i64 = jobseeker_profiles::table
        .filter(jobseeker_profiles::id.eq(candidate_id))
        .count()
        .get_result(&mut conn)?;
    if exists == 0 {
        return Err(AppError::new(ErrorCode::CandidateNotFound, "candidate not found"));
    }

    if profile.saved_candidates.contains(&candidate_id) {
        return Ok(profile.saved_candidates);
    }
    let mut saved = profile.saved_candidates;
    saved.push(candidate_id);
    diesel::update(employer_profiles::table.find(profile.id))
        .set(employer_profiles::saved_candidates.eq(&saved))
        .execute(&mut conn)?;
    Ok(saved)
}

pub fn unsave_candidate(
    pool: &DbPool,
    employer_id: Uuid,
    candidate_id: Uuid,
) -> AppResult<Vec<Uuid>> {
    let profile = get_or_create_employer(pool, employer_id)?;
    if !profile.saved_candidates.contains(&candidate_id) {
        return Ok(profile.saved_candidates);
    }
    let saved: Vec<Uuid> = profile
        .saved_candidates
        .into_iter()
        .filter(|id| *id != candidate_id)
        .collect();
    let mut conn = get_conn(pool)?;
    diesel::update(employer_profiles::table.find(profile.id))
        .set(employer_profiles::saved_candidates.eq(&saved))
        .execute(&mut conn)?;
    Ok(saved)
}

// --- Merged views ---

/// Identity and profile fields merged flat. Social links are stored once in
/// nested form; the view also carries flattened top-level duplicates for
/// API compatibility.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobseekerProfileView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub job_title: Option<String>,
    pub summary: Option<String>,
    pub skills: Vec<String>,
    pub experience: serde_json::Value,
    pub education: serde_json::Value,
    pub certifications: serde_json::Value,
    pub resume: Option<ResumeInfo>,
    pub saved_jobs: Vec<Uuid>,
    pub profile_completion: i32,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub social_links: SocialLinks,
}

impl JobseekerProfileView {
    pub fn assemble(user: &User, profile: &JobseekerProfile) -> Self {
        let social = profile.social();
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            status: user.status.clone(),
            phone: profile.phone.clone(),
            location: profile.location.clone(),
            job_title: profile.job_title.clone(),
            summary: profile.summary.clone(),
            skills: profile.skills.clone(),
            experience: profile.experience.clone(),
            education: profile.education.clone(),
            certifications: profile.certifications.clone(),
            resume: profile.resume_info(),
            saved_jobs: profile.saved_jobs.clone(),
            profile_completion: profile.profile_completion,
            linkedin: social.linkedin.clone(),
            github: social.github.clone(),
            portfolio: social.portfolio.clone(),
            social_links: social,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerProfileView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
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
}

impl EmployerProfileView {
    pub fn assemble(user: &User, profile: &EmployerProfile) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            status: user.status.clone(),
            company_name: profile.company_name.clone(),
            company_description: profile.company_description.clone(),
            industry: profile.industry.clone(),
            company_size: profile.company_size.clone(),
            website: profile.website.clone(),
            headquarters_city: profile.headquarters_city.clone(),
            contact_phone: profile.contact_phone.clone(),
            company_logo_url: profile.company_logo_url.clone(),
            is_verified: profile.is_verified,
            subscription_plan: profile.subscription_plan.clone(),
            jobs_allowed: profile.jobs_allowed,
            jobs_used: profile.jobs_used,
            saved_candidates: profile.saved_candidates.clone(),
            profile_completion: profile.profile_completion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn blank_profile() -> JobseekerProfile {
        JobseekerProfile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            phone: None,
            location: None,
            job_title: None,
            summary: None,
            skills: vec![],
            experience: serde_json::json!([]),
            education: serde_json::json!([]),
            certifications: serde_json::json!([]),
            social_links: serde_json::json!({}),
            resume: None,
            saved_jobs: vec![],
            profile_completion: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn completion_empty_profile_is_zero() {
        assert_eq!(jobseeker_completion(&blank_profile()), 0);
    }

    #[test]
    fn completion_single_check_rounds_to_13() {
        let mut profile = blank_profile();
        profile.phone = Some("+33 6 00 00 00 00".into());
        assert_eq!(jobseeker_completion(&profile), 13);
    }

    #[test]
    fn completion_full_profile_is_100() {
        let mut profile = blank_profile();
        profile.phone = Some("123".into());
        profile.location = Some("Lyon".into());
        profile.job_title = Some("Backend Engineer".into());
        profile.summary = Some("Ten years of Rust".into());
        profile.skills = vec!["rust".into()];
        profile.experience = serde_json::json!([{"title": "Engineer"}]);
        profile.education = serde_json::json!([{"degree": "MSc"}]);
        profile.social_links = serde_json::json!({"github": "https://github.com/x"});
        assert_eq!(jobseeker_completion(&profile), 100);
    }

    #[test]
    fn blank_strings_do_not_count() {
        let mut profile = blank_profile();
        profile.phone = Some("   ".into());
        assert_eq!(jobseeker_completion(&profile), 0);
    }

    #[test]
    fn legacy_resume_url_is_rewritten() {
        let url = "https://cdn.example.com/raw/upload/v12/resume.pdf";
        assert_eq!(
            rewrite_legacy_resume_url(url).as_deref(),
            Some("https://cdn.example.com/image/upload/v12/resume.pdf")
        );
        assert!(rewrite_legacy_resume_url("https://cdn.example.com/image/upload/v12/resume.pdf").is_none());
    }

    #[test]
    fn social_links_replaced_wholesale() {
        let mut profile = blank_profile();
        profile.social_links =
            serde_json::json!({"linkedin": "https://linkedin.com/in/x", "github": "https://github.com/x"});

        let changes = UpdateJobseekerProfile {
            social_links: Some(serde_json::json!({"portfolio": "https://example.com"})),
            ..Default::default()
        };
        apply_jobseeker_changes(&mut profile, &changes);

        let social = profile.social();
        assert_eq!(social.portfolio.as_deref(), Some("https://example.com"));
        assert!(social.linkedin.is_none());
        assert!(social.github.is_none());
    }

    #[test]
    fn view_carries_nested_and_flattened_social_links() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Sam".into(),
            email: "sam@example.com".into(),
            password_hash: "x".into(),
            role: "jobseeker".into(),
            status: "active".into(),
            is_authorized: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut profile = blank_profile();
        profile.social_links = serde_json::json!({"github": "https://github.com/sam"});

        let view = JobseekerProfileView::assemble(&user, &profile);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["github"], "https://github.com/sam");
        assert_eq!(json["socialLinks"]["github"], "https://github.com/sam");
        assert_eq!(json["skills"], serde_json::json!([]));
        assert_eq!(json["profileCompletion"], 0);
    }

    #[test]
    fn omitted_identity_fields_leave_user_untouched() {
        let identity = UpdateUser::default();
        assert!(identity.is_empty());
        let identity = UpdateUser { name: Some("New Name".into()), email: None };
        assert!(!identity.is_empty());
    }
}
