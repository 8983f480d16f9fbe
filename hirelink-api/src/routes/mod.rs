pub mod applications;
pub mod articles;
pub mod dashboard;
pub mod health;
pub mod jobs;
pub mod notifications;
pub mod profile;
pub mod saved;
