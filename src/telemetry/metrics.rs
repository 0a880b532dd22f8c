//! Metric definitions for mail dispatch
//!
//! The library only records through the `metrics` facade; installing a recorder
//! (Prometheus or otherwise) is left to the host application.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Register metric descriptions and emit initial zero values so exporters
/// include HELP/TYPE lines from startup (not just after first use).
pub fn describe_metrics() {
    describe_counter!(
        "auth9_mail_dispatch_total",
        "Total number of connector dispatches by message type and outcome"
    );
    describe_histogram!(
        "auth9_mail_send_duration_seconds",
        "Time spent in the mail transport per send, in seconds"
    );

    for outcome in ["success", "failure", "rejected"] {
        counter!("auth9_mail_dispatch_total", "type" => "reglog_mail", "outcome" => outcome)
            .absolute(0);
    }
}

/// Label used for message types with no registered handler
pub const UNKNOWN_TYPE: &str = "unknown";

/// Count a finished dispatch. `outcome` is `success`, `failure` or `rejected`.
pub fn record_dispatch(message_type: &str, outcome: &'static str) {
    counter!(
        "auth9_mail_dispatch_total",
        "type" => message_type.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_send_duration(backend: &'static str, elapsed: Duration) {
    histogram!("auth9_mail_send_duration_seconds", "backend" => backend)
        .record(elapsed.as_secs_f64());
}
