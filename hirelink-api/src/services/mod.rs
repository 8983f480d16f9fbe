pub mod application_service;
pub mod article_service;
pub mod dashboard_service;
pub mod dispatch;
pub mod job_service;
pub mod notification_service;
pub mod profile_service;
