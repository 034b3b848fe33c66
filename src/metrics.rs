// Metrics and observability module
// This file registers the node request metrics observed by the
// HTTP endpoint for every routed command
//
// Numan Thabit 2025 Nov

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

pub static NODE_REQ_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "tangle_node_request_latency_seconds",
        "latency of node commands",
        &["endpoint", "command"]
    )
    .unwrap()
});

pub static NODE_REQ_ERRORS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tangle_node_request_errors_total",
        "failed node commands",
        &["endpoint", "command"]
    )
    .unwrap()
});
