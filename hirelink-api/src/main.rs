use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod models;
mod routes;
mod schema;
mod services;

use config::AppConfig;
use hirelink_shared::clients::db::{create_pool, DbPool};
use hirelink_shared::middleware::{init_metrics, metrics_middleware, PrometheusHandle};

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub metrics: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hirelink_shared::middleware::init_tracing("hirelink-api");

    let config = AppConfig::load()?;
    let port = config.port;

    // Set JWT_SECRET env var for the auth extractor middleware
    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let db = create_pool(&config.database_url)?;
    let metrics = init_metrics()?;

    let state = Arc::new(AppState { db, config, metrics });

    // Hourly maintenance: notification retention sweep + interview reminders.
    let maintenance_state = state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(3600));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let retention_days = maintenance_state.config.notification_retention_days;
            if let Err(e) =
                services::notification_service::cleanup_old(&maintenance_state.db, retention_days)
            {
                tracing::error!(error = %e, "notification retention sweep failed");
            }
            services::dispatch::send_interview_reminders(&maintenance_state.db);
        }
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(render_metrics))
        // profile
        .route("/profile", get(routes::profile::get_profile).put(routes::profile::update_profile))
        // jobs
        .route("/jobs", get(routes::jobs::list_jobs).post(routes::jobs::create_job))
        .route("/jobs/mine", get(routes::jobs::my_jobs))
        .route("/jobs/:id", get(routes::jobs::get_job))
        .route("/jobs/:id/approve", post(routes::jobs::approve_job))
        // applications
        .route("/applications", get(routes::applications::my_applications).post(routes::applications::apply))
        .route("/applications/:id/status", put(routes::applications::update_status))
        // saved jobs / candidates
        .route("/saved/jobs", get(routes::saved::list_saved_jobs))
        .route("/saved/jobs/:id", post(routes::saved::save_job).delete(routes::saved::unsave_job))
        .route("/saved/candidates", get(routes::saved::list_saved_candidates))
        .route("/saved/candidates/:id", post(routes::saved::save_candidate).delete(routes::saved::unsave_candidate))
        // articles
        .route("/articles", get(routes::articles::list_articles).post(routes::articles::publish_article))
        // notifications
        .route(
            "/notifications",
            get(routes::notifications::list_notifications)
                .post(routes::notifications::create_notification)
                .delete(routes::notifications::delete_all),
        )
        .route("/notifications/unread-count", get(routes::notifications::unread_count))
        .route("/notifications/stats", get(routes::notifications::stats))
        .route("/notifications/mark-all-read", post(routes::notifications::mark_all_read))
        .route("/notifications/bulk", post(routes::notifications::bulk_send))
        .route("/notifications/announce", post(routes::notifications::announce))
        .route("/notifications/cleanup", post(routes::notifications::cleanup))
        .route(
            "/notifications/:id",
            get(routes::notifications::get_notification)
                .delete(routes::notifications::delete_notification),
        )
        .route("/notifications/:id/read", post(routes::notifications::mark_read))
        .route("/notifications/:id/archive", post(routes::notifications::archive))
        // dashboard
        .route("/dashboard", get(routes::dashboard::get_dashboard))
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "hirelink-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn render_metrics(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> String {
    state.metrics.render()
}
