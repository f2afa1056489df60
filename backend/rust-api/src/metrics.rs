use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Score file
    pub static ref SCORE_STORE_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "score_store_operations_total",
        "Total number of high score file operations",
        &["operation", "status"]
    )
    .unwrap();

    // Game Metrics
    pub static ref GAMES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "games_total",
        "Total number of riddle games by lifecycle event",
        &["event"]
    )
    .unwrap();

    pub static ref SESSIONS_ACTIVE: IntGauge = register_int_gauge!(
        "sessions_active",
        "Number of web sessions currently holding a game"
    )
    .unwrap();

    pub static ref ANSWERS_SUBMITTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "answers_submitted_total",
        "Total number of answers submitted",
        &["correct"]
    )
    .unwrap();

    pub static ref HINTS_REVEALED_TOTAL: IntCounter = register_int_counter!(
        "hints_revealed_total",
        "Total number of riddles whose hint became visible"
    )
    .unwrap();

    pub static ref RIDDLES_SKIPPED_TOTAL: IntCounter = register_int_counter!(
        "riddles_skipped_total",
        "Total number of riddles skipped"
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Helper: count a score file operation by outcome
pub fn record_score_store_operation(operation: &str, success: bool) {
    let status = if success { "success" } else { "error" };
    SCORE_STORE_OPERATIONS_TOTAL
        .with_label_values(&[operation, status])
        .inc();
}

/// Helper: count a game lifecycle event (started, completed, restarted, quit)
pub fn record_game_event(event: &str) {
    GAMES_TOTAL.with_label_values(&[event]).inc();
}

/// Helper: count an answer and whether it revealed the hint
pub fn record_answer(correct: bool, hint_revealed: bool) {
    let correct_label = if correct { "true" } else { "false" };
    ANSWERS_SUBMITTED_TOTAL
        .with_label_values(&[correct_label])
        .inc();
    if hint_revealed {
        HINTS_REVEALED_TOTAL.inc();
    }
}
