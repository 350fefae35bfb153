//! Prometheus metrics for the moderation service.
//!
//! Exposes collectors for report ingestion, auto-hide events, rate
//! limiting, and the appeal sweep, plus an HTTP handler for `/metrics`.

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};
use std::time::Duration;

/// Reports accepted, labeled by target type
static REPORTS_SUBMITTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "moderation_reports_submitted_total",
        "Reports accepted by the ingestion pipeline",
        &["target_type"]
    )
    .expect("failed to register moderation_reports_submitted_total")
});

/// Auto-hide transitions, labeled by target type
static AUTO_HIDE_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "moderation_auto_hide_total",
        "Targets auto-hidden after crossing the report threshold",
        &["target_type"]
    )
    .expect("failed to register moderation_auto_hide_total")
});

/// Rejected submissions, labeled by rejection reason
static REPORTS_REJECTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "moderation_reports_rejected_total",
        "Report submissions rejected by the rate limiter",
        &["reason"]
    )
    .expect("failed to register moderation_reports_rejected_total")
});

/// Appeal sweep cycles (success/error/timeout)
static SWEEP_RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "moderation_sweep_runs_total",
        "Appeal escalation sweep cycles",
        &["status"]
    )
    .expect("failed to register moderation_sweep_runs_total")
});

/// Items escalated to permanent, labeled by target kind
static SWEEP_PROCESSED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "moderation_sweep_processed_total",
        "Temporary removals and bans promoted to permanent",
        &["kind"]
    )
    .expect("failed to register moderation_sweep_processed_total")
});

/// Sweep duration
static SWEEP_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "moderation_sweep_duration_seconds",
        "Duration of appeal escalation sweeps",
        vec![0.01, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0]
    )
    .expect("failed to register moderation_sweep_duration_seconds")
});

pub fn record_report_submitted(target_type: &str) {
    REPORTS_SUBMITTED_TOTAL
        .with_label_values(&[target_type])
        .inc();
}

pub fn record_auto_hide(target_type: &str) {
    AUTO_HIDE_TOTAL.with_label_values(&[target_type]).inc();
}

pub fn record_report_rejected(reason: &str) {
    REPORTS_REJECTED_TOTAL.with_label_values(&[reason]).inc();
}

pub fn record_sweep_run(status: &str) {
    SWEEP_RUNS_TOTAL.with_label_values(&[status]).inc();
}

pub fn record_sweep_processed(kind: &str, count: u64) {
    SWEEP_PROCESSED_TOTAL
        .with_label_values(&[kind])
        .inc_by(count);
}

pub fn record_sweep_duration(duration: Duration) {
    SWEEP_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
