//! Metrics helpers
//!
//! Thin wrappers over the `metrics` facade with standardized naming.
//! An exporter is not wired in; whatever recorder the binary installs
//! picks these up.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

/// Metrics prefix for all WebLoom metrics
pub const METRICS_PREFIX: &str = "webloom";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_questions_total", METRICS_PREFIX),
        Unit::Count,
        "Total questions answered, labeled by answer mode"
    );

    describe_histogram!(
        format!("{}_question_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Question pipeline latency in seconds"
    );

    describe_gauge!(
        format!("{}_question_references_count", METRICS_PREFIX),
        Unit::Count,
        "Number of references returned with an answer"
    );

    describe_counter!(
        format!("{}_generation_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Remote model generation attempts"
    );

    describe_counter!(
        format!("{}_scrapes_total", METRICS_PREFIX),
        Unit::Count,
        "Total scraped pages stored"
    );

    tracing::info!("Metrics registered");
}

/// Record a completed question
pub fn record_question(duration_secs: f64, mode: &str, reference_count: usize) {
    counter!(
        format!("{}_questions_total", METRICS_PREFIX),
        "mode" => mode.to_string()
    )
    .increment(1);

    histogram!(format!("{}_question_duration_seconds", METRICS_PREFIX)).record(duration_secs);

    gauge!(format!("{}_question_references_count", METRICS_PREFIX)).set(reference_count as f64);
}

/// Record a remote generation attempt
pub fn record_generation(success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_generation_requests_total", METRICS_PREFIX),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a stored scrape
pub fn record_scrape() {
    counter!(format!("{}_scrapes_total", METRICS_PREFIX)).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_helpers_run() {
        record_question(0.012, "ai", 3);
        record_generation(true);
        record_generation(false);
        record_scrape();
        // Just verify they run without panic against the default recorder
    }
}
