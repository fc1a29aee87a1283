use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static STOCK_MOVEMENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "inventory_stock_movements_total",
        "Committed ledger mutations by kind (stock_in, stock_out) and action (apply, reverse)",
        &["kind", "action"]
    )
    .expect("register stock_movements_total")
});

pub static STOCK_OUT_REJECTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "inventory_stock_out_rejected_total",
        "Stock-out requests rejected for insufficient stock"
    )
    .expect("register stock_out_rejected_total")
});

pub static AUTH_EVENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "inventory_auth_events_total",
        "Auth events by outcome (register, login, login_denied, refresh, refresh_denied, logout)",
        &["event"]
    )
    .expect("register auth_events_total")
});

pub fn record_stock_movement(kind: &str, action: &str) {
    STOCK_MOVEMENTS_TOTAL.with_label_values(&[kind, action]).inc();
}

pub fn record_auth_event(event: &str) {
    AUTH_EVENTS_TOTAL.with_label_values(&[event]).inc();
}

/// Text exposition of the default registry.
pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
