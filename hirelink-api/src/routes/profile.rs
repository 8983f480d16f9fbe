use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use hirelink_shared::errors::{AppError, AppResult};
use hirelink_shared::types::{ApiResponse, AuthUser, UserRole};

use crate::models::{ResumeInfo, SocialLinks, UpdateEmployerProfile, UpdateJobseekerProfile, UpdateUser};
use crate::services::{dispatch, profile_service};
use crate::AppState;

/// GET /profile
/// Merged identity + role-profile view; the profile row is created on first
/// access.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let user = profile_service::find_user(&state.db, auth_user.id)?;
    let view = match auth_user.role {
        UserRole::Jobseeker => {
            let profile = profile_service::get_or_create_jobseeker(&state.db, auth_user.id)?;
            serde_json::to_value(profile_service::JobseekerProfileView::assemble(&user, &profile))
        }
        UserRole::Employer => {
            let profile = profile_service::get_or_create_employer(&state.db, auth_user.id)?;
            serde_json::to_value(profile_service::EmployerProfileView::assemble(&user, &profile))
        }
        UserRole::Admin => serde_json::to_value(&user),
    }
    .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(ApiResponse::ok(view)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    // identity
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,

    // jobseeker
    #[validate(length(max = 30, message = "phone must be at most 30 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub location: Option<String>,
    #[validate(length(max = 100))]
    pub job_title: Option<String>,
    pub summary: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<serde_json::Value>,
    pub education: Option<serde_json::Value>,
    pub certifications: Option<serde_json::Value>,
    #[validate(url(message = "linkedin must be a valid url"))]
    pub linkedin: Option<String>,
    #[validate(url(message = "github must be a valid url"))]
    pub github: Option<String>,
    #[validate(url(message = "portfolio must be a valid url"))]
    pub portfolio: Option<String>,
    pub social_links: Option<SocialLinks>,
    pub resume: Option<ResumeInfo>,

    // employer
    #[validate(length(min = 1, max = 150))]
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    #[validate(length(max = 100))]
    pub industry: Option<String>,
    #[validate(length(max = 20))]
    pub company_size: Option<String>,
    #[validate(url(message = "website must be a valid url"))]
    pub website: Option<String>,
    #[validate(length(max = 100))]
    pub headquarters_city: Option<String>,
    #[validate(length(max = 30))]
    pub contact_phone: Option<String>,
    pub company_logo_url: Option<String>,
}

impl UpdateProfileRequest {
    fn identity(&self) -> UpdateUser {
        UpdateUser {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    /// Any supplied social field replaces the stored object wholesale; a
    /// nested `socialLinks` object takes precedence over the flattened keys.
    fn social_value(&self) -> AppResult<Option<serde_json::Value>> {
        let links = if let Some(nested) = &self.social_links {
            Some(nested.clone())
        } else if self.linkedin.is_some() || self.github.is_some() || self.portfolio.is_some() {
            Some(SocialLinks {
                linkedin: self.linkedin.clone(),
                github: self.github.clone(),
                portfolio: self.portfolio.clone(),
            })
        } else {
            None
        };
        links
            .map(|l| serde_json::to_value(l).map_err(|e| AppError::internal(e.to_string())))
            .transpose()
    }
}

/// PUT /profile
/// Splits the payload into identity and role-profile fields and writes both
/// in one transaction.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    req.validate()?;

    let identity = req.identity();
    let identity_changed = !identity.is_empty();

    let view = match auth_user.role {
        UserRole::Jobseeker => {
            let resume_value = req
                .resume
                .as_ref()
                .map(|r| serde_json::to_value(r).map_err(|e| AppError::internal(e.to_string())))
                .transpose()?;
            let resume_name = req.resume.as_ref().map(|r| r.original_name.clone());

            let changes = UpdateJobseekerProfile {
                phone: req.phone.clone(),
                location: req.location.clone(),
                job_title: req.job_title.clone(),
                summary: req.summary.clone(),
                skills: req.skills.clone(),
                experience: req.experience.clone(),
                education: req.education.clone(),
                certifications: req.certifications.clone(),
                social_links: req.social_value()?,
                resume: resume_value,
                profile_completion: None,
            };
            let (user, profile) =
                profile_service::update_jobseeker(&state.db, auth_user.id, identity, changes)?;

            if let Some(name) = resume_name {
                dispatch::document_uploaded(&state.db, auth_user.id, &name);
            }
            serde_json::to_value(profile_service::JobseekerProfileView::assemble(&user, &profile))
        }
        UserRole::Employer => {
            let changes = UpdateEmployerProfile {
                company_name: req.company_name.clone(),
                company_description: req.company_description.clone(),
                industry: req.industry.clone(),
                company_size: req.company_size.clone(),
                website: req.website.clone(),
                headquarters_city: req.headquarters_city.clone(),
                contact_phone: req.contact_phone.clone(),
                company_logo_url: req.company_logo_url.clone(),
                profile_completion: None,
            };
            let (user, profile) =
                profile_service::update_employer(&state.db, auth_user.id, identity, changes)?;
            serde_json::to_value(profile_service::EmployerProfileView::assemble(&user, &profile))
        }
        UserRole::Admin => {
            let user = profile_service::update_identity(&state.db, auth_user.id, identity)?;
            serde_json::to_value(&user)
        }
    }
    .map_err(|e| AppError::internal(e.to_string()))?;

    if identity_changed {
        dispatch::account_updated(&state.db, auth_user.id);
    }

    Ok(Json(ApiResponse::ok_with_message(view, "profile updated")))
}
