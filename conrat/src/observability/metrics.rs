//! Session metrics.
//!
//! Prometheus-compatible counters. Every label value comes from a fixed
//! vocabulary (marker kinds, phase kinds, skip routes), so cardinality is
//! bounded no matter what the participant types.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::ConratError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without an
/// HTTP endpoint.
///
/// # Errors
///
/// Returns `ConratError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), ConratError> {
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
    .map_err(|e| ConratError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!("conrat_markers_total", "Markers emitted, by label kind");
    describe_counter!(
        "conrat_marker_failures_total",
        "Markers a sink failed to accept"
    );
    describe_counter!(
        "conrat_phase_transitions_total",
        "Phase transitions, by destination phase kind"
    );
    describe_gauge!("conrat_current_phase", "Currently active phase (1 = active)");
    describe_counter!(
        "conrat_master_skips_total",
        "Master skip interrupts, by route taken"
    );
    describe_counter!(
        "conrat_stale_timers_total",
        "Timer wakeups dropped because their phase had ended"
    );
    describe_counter!(
        "conrat_connections_guesses_total",
        "Evaluated four-tile selections, by outcome"
    );
}

/// Records an emitted marker.
pub fn record_marker(kind: &'static str) {
    counter!("conrat_markers_total", "kind" => kind).increment(1);
}

/// Records a marker the sink did not accept.
pub fn record_marker_failure() {
    counter!("conrat_marker_failures_total").increment(1);
}

/// Records a phase transition and moves the current-phase gauge.
pub fn record_phase_transition(from: &'static str, to: &'static str) {
    counter!("conrat_phase_transitions_total", "to" => to).increment(1);
    gauge!("conrat_current_phase", "phase" => from).set(0.0);
    gauge!("conrat_current_phase", "phase" => to).set(1.0);
}

/// Records a master skip and the route it took.
pub fn record_master_skip(route: &'static str) {
    counter!("conrat_master_skips_total", "route" => route).increment(1);
}

/// Records a timer wakeup that arrived after its phase ended.
pub fn record_stale_timer() {
    counter!("conrat_stale_timers_total").increment(1);
}

/// Records an evaluated Connections guess.
pub fn record_guess(correct: bool) {
    let outcome = if correct { "correct" } else { "incorrect" };
    counter!("conrat_connections_guesses_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_a_noop() {
        record_marker("session_start");
        record_marker_failure();
        record_phase_transition("intro", "connections_instructions");
        record_master_skip("advance_message");
        record_stale_timer();
        record_guess(true);
    }
}
