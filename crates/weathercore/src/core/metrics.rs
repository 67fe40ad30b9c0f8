//! Prometheus counters for the weather bot
//!
//! Every series carries an `instance` label (the host name) so several bot
//! replicas can be scraped into one Prometheus without clashing.
//!
//! - User-facing errors (unknown commands, bad input, instance failures)
//! - Database errors split by kind
//! - Weather provider errors by HTTP status
//! - Webhook traffic and rejected requests

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec};

use crate::core::config;

// ======================
// DIALOG METRICS
// ======================

lazy_static! {
    /// Texts that matched no command while nothing was pending
    pub static ref UNKNOWN_COMMANDS: CounterVec = register_counter_vec!(
        "unknown_commands",
        "Number of unknown commands received",
        &["instance"]
    )
    .unwrap();

    /// Unexpected failures while handling a message
    pub static ref INSTANCE_ERRORS: CounterVec = register_counter_vec!(
        "instance_errors",
        "Number of internal errors while handling updates",
        &["instance"]
    )
    .unwrap();

    /// Rejected user input (bad date, bad day count, unknown city)
    pub static ref USER_ERRORS: CounterVec = register_counter_vec!(
        "user_errors",
        "Number of invalid user inputs",
        &["instance"]
    )
    .unwrap();

    /// Recognized commands by name
    /// Labels: instance, command (start/help/prediction/...)
    pub static ref COMMANDS_TOTAL: CounterVec = register_counter_vec!(
        "commands_total",
        "Number of recognized commands by name",
        &["instance", "command"]
    )
    .unwrap();
}

// ======================
// DATABASE METRICS
// ======================

lazy_static! {
    pub static ref DATABASE_CONNECTION_ERRORS: CounterVec = register_counter_vec!(
        "database_connection_errors",
        "Number of failures to reach the database",
        &["instance"]
    )
    .unwrap();

    pub static ref DATABASE_QUERY_ERRORS: CounterVec = register_counter_vec!(
        "database_query_errors",
        "Number of failed database queries",
        &["instance"]
    )
    .unwrap();

    pub static ref DATABASE_OTHER_ERRORS: CounterVec = register_counter_vec!(
        "database_other_errors",
        "Number of other database errors",
        &["instance"]
    )
    .unwrap();
}

// ======================
// EXTERNAL API METRICS
// ======================

lazy_static! {
    /// Non-200 answers from the weather provider
    /// Labels: instance, status_code
    pub static ref EXTERNAL_API_ERROR: CounterVec = register_counter_vec!(
        "external_api_error",
        "Number of weather API errors by HTTP status",
        &["instance", "status_code"]
    )
    .unwrap();

    /// Weather provider payloads that did not match the expected schema
    pub static ref EXTERNAL_API_VALIDATION_ERRORS: CounterVec = register_counter_vec!(
        "external_api_validation_errors",
        "Number of weather API responses that failed to parse",
        &["instance"]
    )
    .unwrap();
}

// ======================
// HTTP METRICS
// ======================

lazy_static! {
    /// Webhook deliveries received
    pub static ref POST_REQUESTS: CounterVec = register_counter_vec!(
        "post_requests",
        "Number of webhook POST requests",
        &["instance"]
    )
    .unwrap();

    /// Requests rejected for a bad webhook secret or bad Basic credentials
    pub static ref UNAUTHORIZED_ACCESS: CounterVec = register_counter_vec!(
        "unauthorized_access",
        "Number of rejected unauthorized requests",
        &["instance"]
    )
    .unwrap();
}

/// Increments a counter that only carries the `instance` label.
pub fn inc(counter: &CounterVec) {
    counter.with_label_values(&[config::metrics::INSTANCE_ID.as_str()]).inc();
}

/// Records one weather provider error for the given HTTP status.
pub fn record_external_api_error(status_code: u16) {
    let status = status_code.to_string();
    EXTERNAL_API_ERROR
        .with_label_values(&[config::metrics::INSTANCE_ID.as_str(), status.as_str()])
        .inc();
}

/// Records one recognized command.
pub fn record_command(command: &str) {
    COMMANDS_TOTAL
        .with_label_values(&[config::metrics::INSTANCE_ID.as_str(), command])
        .inc();
}

/// Initialize all metrics so they appear in /metrics with zero values
pub fn init_metrics() {
    log::info!("Initializing metrics registry...");

    let instance = config::metrics::INSTANCE_ID.as_str();

    for counter in [
        &*UNKNOWN_COMMANDS,
        &*INSTANCE_ERRORS,
        &*USER_ERRORS,
        &*DATABASE_CONNECTION_ERRORS,
        &*DATABASE_QUERY_ERRORS,
        &*DATABASE_OTHER_ERRORS,
        &*EXTERNAL_API_VALIDATION_ERRORS,
        &*POST_REQUESTS,
        &*UNAUTHORIZED_ACCESS,
    ] {
        counter.with_label_values(&[instance]);
    }

    for status in ["400", "401", "403", "404", "500", "502"] {
        EXTERNAL_API_ERROR.with_label_values(&[instance, status]);
    }

    log::info!("Metrics registry initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inc_counts_under_instance_label() {
        let instance = config::metrics::INSTANCE_ID.as_str();
        let before = UNKNOWN_COMMANDS.with_label_values(&[instance]).get();
        inc(&UNKNOWN_COMMANDS);
        assert!(UNKNOWN_COMMANDS.with_label_values(&[instance]).get() >= before + 1.0);
    }

    #[test]
    fn test_external_api_error_by_status() {
        let instance = config::metrics::INSTANCE_ID.as_str();
        record_external_api_error(418);
        assert!(EXTERNAL_API_ERROR.with_label_values(&[instance, "418"]).get() >= 1.0);
    }

    #[test]
    fn test_init_metrics_exports_zero_series() {
        init_metrics();
        let text = prometheus::TextEncoder::new()
            .encode_to_string(&prometheus::gather())
            .unwrap();
        assert!(text.contains("post_requests"));
        assert!(text.contains("external_api_error"));
    }
}
