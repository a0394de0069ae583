//! Observer seams of the tick pipeline.
//!
//! The pipeline never talks to a transport. It hands telemetry payloads,
//! diagnostics, and phase notifications to caller-supplied sinks, in phase
//! order, on the calling thread.

use growsim_types::Diagnostic;

use crate::tick::TickPhase;

/// Receives telemetry events.
pub trait TelemetrySink {
    /// Handle one event published on `topic`.
    fn emit(&mut self, topic: &str, payload: &serde_json::Value);
}

/// Receives non-fatal diagnostics.
pub trait DiagnosticSink {
    /// Handle one diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic);
}

/// Notified after each pipeline phase completes.
pub trait StageHook {
    /// Called once per phase, in pipeline order.
    fn on_stage_complete(&mut self, phase: TickPhase);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSinks;

impl NoopSinks {
    /// Create a no-op sink.
    pub const fn new() -> Self {
        Self
    }
}

impl TelemetrySink for NoopSinks {
    fn emit(&mut self, _topic: &str, _payload: &serde_json::Value) {}
}

impl DiagnosticSink for NoopSinks {
    fn emit(&mut self, _diagnostic: &Diagnostic) {}
}

impl StageHook for NoopSinks {
    fn on_stage_complete(&mut self, _phase: TickPhase) {}
}

/// Keeps every telemetry event in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingTelemetry {
    /// `(topic, payload)` in emission order.
    pub events: Vec<(String, serde_json::Value)>,
}

impl RecordingTelemetry {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads published on `topic`, in order.
    pub fn on_topic(&self, topic: &str) -> Vec<&serde_json::Value> {
        self.events
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, payload)| payload)
            .collect()
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn emit(&mut self, topic: &str, payload: &serde_json::Value) {
        self.events.push((topic.to_owned(), payload.clone()));
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingDiagnostics {
    /// Diagnostics in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

impl RecordingDiagnostics {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a diagnostic with `code` was emitted.
    pub fn contains(&self, code: &str) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }
}

/// Keeps the sequence of completed phases.
#[derive(Debug, Clone, Default)]
pub struct RecordingStageHook {
    /// Completed phases in order.
    pub phases: Vec<TickPhase>,
}

impl RecordingStageHook {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StageHook for RecordingStageHook {
    fn on_stage_complete(&mut self, phase: TickPhase) {
        self.phases.push(phase);
    }
}

#[cfg(test)]
mod tests {
    use growsim_types::{codes, ZoneId};

    use super::*;

    #[test]
    fn recording_telemetry_filters_by_topic() {
        let mut sink = RecordingTelemetry::new();
        sink.emit("a", &serde_json::json!({"n": 1}));
        sink.emit("b", &serde_json::json!({"n": 2}));
        sink.emit("a", &serde_json::json!({"n": 3}));
        let on_a = sink.on_topic("a");
        assert_eq!(on_a.len(), 2);
        assert_eq!(on_a.last().and_then(|v| v.get("n")), Some(&serde_json::json!(3)));
    }

    #[test]
    fn recording_diagnostics_finds_codes() {
        let mut sink = RecordingDiagnostics::new();
        DiagnosticSink::emit(
            &mut sink,
            &Diagnostic::zone_warning(codes::NUTRIENT_RUNOFF, ZoneId::new(), "overflow"),
        );
        assert!(sink.contains(codes::NUTRIENT_RUNOFF));
        assert!(!sink.contains(codes::COVERAGE_LOW));
    }
}
