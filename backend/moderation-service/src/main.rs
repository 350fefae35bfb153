use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use chrono::Utc;
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use moderation_service::cache::AnalyticsCache;
use moderation_service::db::{AuditDb, CampaignsDb, DevicesDb, ReportsDb, SummariesDb, UsersDb};
use moderation_service::handlers;
use moderation_service::middleware::JwtAuthMiddleware;
use moderation_service::services::{
    AnalyticsService, ModerationService, Notifier, RateLimiter, RateLimiterConfig, ReportIngestion,
    Sweeper,
};
use moderation_service::Config;
use push_shared::FcmClient;
use redis::aio::ConnectionManager;
use serde::Serialize;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

struct HealthState {
    db_pool: sqlx::Pool<sqlx::Postgres>,
    redis_manager: Arc<Mutex<ConnectionManager>>,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

impl HealthState {
    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }

    async fn check_redis(&self) -> Result<(), redis::RedisError> {
        let mut conn = self.redis_manager.lock().await;
        let pong: String = redis::cmd("PING").query_async(&mut *conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "unexpected PING response",
            )))
        }
    }
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "moderation-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "moderation-service"
        })),
    }
}

async fn readiness_summary(state: web::Data<HealthState>) -> HttpResponse {
    let mut checks = HashMap::new();
    let mut ready = true;

    let start = Instant::now();
    let postgres_check = match state.check_postgres().await {
        Ok(_) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "PostgreSQL connection successful".to_string(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
        Err(e) => {
            ready = false;
            ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("PostgreSQL connection failed: {}", e),
                latency_ms: Some(start.elapsed().as_millis() as u64),
            }
        }
    };
    checks.insert("postgres".to_string(), postgres_check);

    let start = Instant::now();
    let redis_check = match state.check_redis().await {
        Ok(_) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "Redis connection successful".to_string(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
        // Redis only backs the analytics cache; a failure degrades but
        // does not make the service unready.
        Err(e) => ComponentCheck {
            status: ComponentStatus::Unhealthy,
            message: format!("Redis connection failed: {}", e),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
    };
    checks.insert("redis".to_string(), redis_check);

    let response = ReadinessResponse {
        ready,
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into());
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        port = config.port,
        "Starting moderation-service v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize JWT validation key (validation only; tokens are minted by
    // the identity service)
    if let Err(e) = auth_core::initialize_jwt_validation_only(&config.jwt_public_key_pem) {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to initialize JWT keys: {e}"),
        ));
    }

    // Initialize database connection pool
    let db_cfg = DbPoolConfig::for_service(&config.service_name);
    db_cfg.log_config();
    let db_pool = match create_pg_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| {
            tracing::error!("Migration failed: {}", e);
            io::Error::new(io::ErrorKind::Other, e)
        })?;
    tracing::info!("Migrations completed successfully");

    // Initialize Redis (analytics cache + health checks)
    let redis_client = redis::Client::open(config.redis_url.clone())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Invalid Redis URL: {e}")))?;
    let redis_manager = ConnectionManager::new(redis_client).await.map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to initialize Redis connection: {e}"),
        )
    })?;

    let pool = Arc::new(db_pool.clone());

    // Repositories
    let campaigns_db = Arc::new(CampaignsDb::new(pool.clone()));
    let users_db = Arc::new(UsersDb::new(pool.clone()));
    let reports_db = Arc::new(ReportsDb::new(pool.clone()));
    let summaries_db = Arc::new(SummariesDb::new(pool.clone()));
    let audit_db = Arc::new(AuditDb::new(pool.clone()));
    let devices_db = Arc::new(DevicesDb::new(pool.clone()));

    // Push delivery (best-effort; disabled without a server key)
    let fcm = config.fcm_server_key.as_ref().map(|key| {
        if let Some(endpoint) = &config.fcm_endpoint {
            FcmClient::with_endpoint(key.clone(), endpoint.clone())
        } else {
            FcmClient::new(key.clone())
        }
    });
    if fcm.is_none() {
        tracing::warn!("FCM_SERVER_KEY not set; push notifications disabled");
    }
    let notifier = Arc::new(Notifier::new(DevicesDb::new(pool.clone()), fcm));

    // Domain services
    let rate_limiter = Arc::new(RateLimiter::new(
        pool.clone(),
        RateLimiterConfig::from(&config),
    ));
    let ingestion = Arc::new(ReportIngestion::new(
        pool.clone(),
        notifier.clone(),
        config.campaign_auto_hide_threshold,
        config.profile_auto_hide_threshold,
    ));
    let moderation = Arc::new(ModerationService::new(
        pool.clone(),
        config.appeal_window_days,
    ));
    let sweeper = Arc::new(Sweeper::new(
        pool.clone(),
        notifier.clone(),
        rate_limiter.clone(),
    ));
    let analytics = Arc::new(AnalyticsService::new(
        pool.clone(),
        AnalyticsCache::new(redis_manager.clone(), config.analytics_cache_ttl_secs),
    ));

    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
        redis_manager: Arc::new(Mutex::new(redis_manager)),
    });

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.allowed_origins.clone();
    let app_config = config.clone();

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(web::Data::new(app_config.clone()))
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(campaigns_db.clone()))
            .app_data(web::Data::new(users_db.clone()))
            .app_data(web::Data::new(reports_db.clone()))
            .app_data(web::Data::new(summaries_db.clone()))
            .app_data(web::Data::new(audit_db.clone()))
            .app_data(web::Data::new(devices_db.clone()))
            .app_data(web::Data::new(rate_limiter.clone()))
            .app_data(web::Data::new(ingestion.clone()))
            .app_data(web::Data::new(moderation.clone()))
            .app_data(web::Data::new(sweeper.clone()))
            .app_data(web::Data::new(analytics.clone()))
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route(
                "/metrics",
                web::get().to(moderation_service::metrics::serve_metrics),
            )
            // Health check endpoints
            .route("/health", web::get().to(health_summary))
            .route("/health/ready", web::get().to(readiness_summary))
            .route("/health/live", web::get().to(liveness_check))
            // Public report submission
            .service(
                web::scope("/reports")
                    .route("/submit", web::post().to(handlers::reports::submit_campaign_report))
                    .route("/user", web::post().to(handlers::reports::submit_user_report)),
            )
            // Push token registration
            .service(
                web::scope("/notifications")
                    .route(
                        "/register-token",
                        web::post().to(handlers::devices::register_token),
                    )
                    .route(
                        "/remove-token",
                        web::delete().to(handlers::devices::remove_token),
                    ),
            )
            // Scheduler-triggered sweep (shared-secret auth, not user auth)
            .route(
                "/cron/cleanup-expired-appeals",
                web::get().to(handlers::cron::cleanup_expired_appeals),
            )
            // Admin surface
            .service(
                web::scope("/admin")
                    .wrap(JwtAuthMiddleware)
                    .route("/reports", web::get().to(handlers::admin::list_summaries))
                    .route("/reports/raw", web::get().to(handlers::admin::list_reports))
                    .route(
                        "/reports/{summary_id}/detail",
                        web::get().to(handlers::admin::summary_detail),
                    )
                    .route(
                        "/reports/{id}",
                        web::patch().to(handlers::admin::review_report),
                    )
                    .route(
                        "/summaries/{id}",
                        web::patch().to(handlers::admin::resolve_summary),
                    )
                    .route("/campaigns", web::get().to(handlers::admin::list_campaigns))
                    .service(
                        web::resource("/campaigns/{id}")
                            .route(web::patch().to(handlers::admin::set_campaign_status))
                            .route(web::delete().to(handlers::admin::delete_campaign)),
                    )
                    .route("/users", web::get().to(handlers::admin::list_users))
                    .route(
                        "/users/{id}",
                        web::patch().to(handlers::admin::set_account_status),
                    )
                    .route(
                        "/targets/{type}/{id}/audit",
                        web::get().to(handlers::admin::target_audit_log),
                    )
                    .route("/analytics", web::get().to(handlers::admin::analytics)),
            )
    })
    .bind(&bind_address)?
    .workers(4)
    .run()
    .await
}
