//! Prometheus metrics for the dispatch engine

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

lazy_static! {
    /// Total route dispatches
    pub static ref ROUTE_DISPATCH_TOTAL: CounterVec = register_counter_vec!(
        "conduit_route_dispatch_total",
        "Total route dispatches",
        &["protocol", "status"]
    )
    .unwrap();

    /// Route dispatch duration
    pub static ref ROUTE_DISPATCH_DURATION: HistogramVec = register_histogram_vec!(
        "conduit_route_dispatch_duration_seconds",
        "Route dispatch duration in seconds",
        &["protocol"]
    )
    .unwrap();

    /// Total orchestrated flow executions
    pub static ref PROCESS_FLOW_TOTAL: CounterVec = register_counter_vec!(
        "conduit_process_flow_total",
        "Total orchestrated flow executions",
        &["process", "status"]
    )
    .unwrap();

    /// Orchestrated flow duration
    pub static ref PROCESS_FLOW_DURATION: HistogramVec = register_histogram_vec!(
        "conduit_process_flow_duration_seconds",
        "Orchestrated flow duration in seconds",
        &["process"]
    )
    .unwrap();
}
