//! Metrics collection.
//!
//! Prometheus-compatible counters and gauges for the phase scheduler and
//! the link decoder. Label values that come from configuration are
//! sanitized before use.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::KeepsakeError;
use crate::phase::Evaluation;

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Maximum length for phase name labels.
const MAX_PHASE_LABEL_LEN: usize = 64;

/// Initializes the global metrics recorder.
///
/// With `Some(port)` a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`; with `None` the recorder is installed without an
/// endpoint. Repeated calls are no-ops.
///
/// # Errors
///
/// Returns `KeepsakeError::Io` if the recorder or listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), KeepsakeError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| KeepsakeError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "keepsake_publications_total",
        "Evaluations published by the phase scheduler"
    );
    describe_counter!(
        "keepsake_phase_transitions_total",
        "Phase transitions observed by the scheduler"
    );
    describe_gauge!("keepsake_current_phase", "Index of the current phase");
    describe_gauge!(
        "keepsake_seconds_remaining",
        "Whole seconds until the next phase boundary"
    );
    describe_counter!(
        "keepsake_link_decode_failures_total",
        "Personalization tokens that failed to decode"
    );
}

/// Records one published evaluation.
#[allow(clippy::cast_precision_loss)]
pub fn record_publication(evaluation: &Evaluation) {
    counter!("keepsake_publications_total").increment(1);
    gauge!("keepsake_current_phase").set(evaluation.phase.index() as f64);
    gauge!("keepsake_seconds_remaining").set(evaluation.breakdown.total_seconds() as f64);
}

/// Records a phase transition between two labelled phases.
pub fn record_phase_transition(from: &str, to: &str) {
    counter!(
        "keepsake_phase_transitions_total",
        "from" => sanitize_phase_label(from),
        "to" => sanitize_phase_label(to)
    )
    .increment(1);
}

/// Records a token that could not be decoded.
pub fn record_decode_failure(kind: &'static str, reason: &'static str) {
    counter!(
        "keepsake_link_decode_failures_total",
        "kind" => kind,
        "reason" => reason
    )
    .increment(1);
}

/// Truncates to [`MAX_PHASE_LABEL_LEN`] characters and replaces anything
/// outside `[A-Za-z0-9_-]` with `_`.
fn sanitize_phase_label(name: &str) -> String {
    name.chars()
        .take(MAX_PHASE_LABEL_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
