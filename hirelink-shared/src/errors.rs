use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::{ApiErrorResponse, FieldError};

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: User and profile errors
/// - E2xxx: Job errors
/// - E3xxx: Application errors
/// - E4xxx: Interview errors
/// - E5xxx: Notification errors
/// - E6xxx: Article errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    BadRequest,
    TokenExpired,
    TokenInvalid,

    // User / profile (E1xxx)
    UserNotFound,
    ProfileNotFound,
    EmailAlreadyExists,
    AccountDisabled,
    EmployerNotAuthorized,
    CandidateNotFound,

    // Job (E2xxx)
    JobNotFound,
    JobNotApproved,
    PostingQuotaExceeded,

    // Application (E3xxx)
    ApplicationNotFound,
    DuplicateApplication,
    InvalidApplicationStatus,

    // Interview (E4xxx)
    InterviewNotFound,

    // Notification (E5xxx)
    NotificationNotFound,
    InvalidNotificationType,

    // Article (E6xxx)
    ArticleNotFound,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::BadRequest => "E0006",
            Self::TokenExpired => "E0007",
            Self::TokenInvalid => "E0008",

            // User / profile
            Self::UserNotFound => "E1001",
            Self::ProfileNotFound => "E1002",
            Self::EmailAlreadyExists => "E1003",
            Self::AccountDisabled => "E1004",
            Self::EmployerNotAuthorized => "E1005",
            Self::CandidateNotFound => "E1006",

            // Job
            Self::JobNotFound => "E2001",
            Self::JobNotApproved => "E2002",
            Self::PostingQuotaExceeded => "E2003",

            // Application
            Self::ApplicationNotFound => "E3001",
            Self::DuplicateApplication => "E3002",
            Self::InvalidApplicationStatus => "E3003",

            // Interview
            Self::InterviewNotFound => "E4001",

            // Notification
            Self::NotificationNotFound => "E5001",
            Self::InvalidNotificationType => "E5002",

            // Article
            Self::ArticleNotFound => "E6001",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::InvalidApplicationStatus
            | Self::InvalidNotificationType => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::UserNotFound | Self::ProfileNotFound
            | Self::CandidateNotFound | Self::JobNotFound | Self::ApplicationNotFound
            | Self::InterviewNotFound | Self::NotificationNotFound
            | Self::ArticleNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden | Self::AccountDisabled | Self::EmployerNotAuthorized
            | Self::JobNotApproved | Self::PostingQuotaExceeded => StatusCode::FORBIDDEN,
            Self::EmailAlreadyExists | Self::DuplicateApplication => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
    },

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value for {field}")),
                })
            })
            .collect();
        Self::Validation(fields)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message } => {
                (code.status_code(), ApiErrorResponse::new(code.code(), message))
            }
            AppError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", "validation failed")
                    .with_field_errors(fields.clone()),
            ),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
