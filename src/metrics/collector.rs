//! Metrics collection and registry.

use crate::session::DecodingSession;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of session state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// LEDs registered so far.
    pub leds_registered: usize,
    /// LEDs expected on the ring.
    pub led_target: usize,
    /// Whether the registry reached its target.
    pub calibration_complete: bool,
    /// Frames read while calibrating.
    pub calibration_frames: u64,
    /// Frames read while decoding.
    pub decoding_frames: u64,
    /// Message frames accepted.
    pub message_frames: u64,
    /// Candidate patterns dropped as transition noise.
    pub transitions_discarded: u64,
    /// Blobs that matched several registered LEDs.
    pub duplicate_matches: u64,
    /// Warnings raised.
    pub warnings: usize,
}

impl MetricsSnapshot {
    /// Creates a snapshot from the current state of a session.
    pub fn from_session(session: &DecodingSession) -> Self {
        let registry = session.registry();
        Self {
            leds_registered: registry.len(),
            led_target: registry.target(),
            calibration_complete: registry.is_complete(),
            calibration_frames: session.calibration_frames(),
            decoding_frames: session.decoding_frames(),
            message_frames: session.message_frames().len() as u64,
            transitions_discarded: session.transitions_discarded(),
            duplicate_matches: session.duplicate_matches(),
            warnings: session.warnings().len(),
        }
    }
}

/// Prometheus metrics registry for decoding runs.
pub struct MetricsRegistry {
    registry: Registry,

    // Calibration metrics
    leds_registered: IntGauge,
    led_target: IntGauge,
    calibration_complete: IntGauge,
    calibration_frames_total: IntCounter,
    duplicate_matches_total: IntCounter,

    // Decoding metrics
    decoding_frames_total: IntCounter,
    message_frames_total: IntCounter,
    transitions_discarded_total: IntCounter,
    warnings: IntGauge,
}

impl MetricsRegistry {
    /// Creates a new registry with all decoding metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        // Calibration metrics
        let leds_registered =
            IntGauge::new("ledring_leds_registered", "Number of LEDs registered so far")?;
        let led_target = IntGauge::new("ledring_led_target", "Number of LEDs expected on the ring")?;
        let calibration_complete = IntGauge::new(
            "ledring_calibration_complete",
            "Calibration status (1=target reached, 0=incomplete)",
        )?;
        let calibration_frames_total = IntCounter::new(
            "ledring_calibration_frames_total",
            "Total frames read while calibrating",
        )?;
        let duplicate_matches_total = IntCounter::new(
            "ledring_duplicate_matches_total",
            "Total blobs that matched more than one registered LED",
        )?;

        // Decoding metrics
        let decoding_frames_total = IntCounter::new(
            "ledring_decoding_frames_total",
            "Total frames read while decoding",
        )?;
        let message_frames_total = IntCounter::new(
            "ledring_message_frames_total",
            "Total message frames accepted",
        )?;
        let transitions_discarded_total = IntCounter::new(
            "ledring_transitions_discarded_total",
            "Total candidate patterns dropped as transition noise",
        )?;
        let warnings = IntGauge::new("ledring_warnings", "Number of warnings raised by the run")?;

        // Register all metrics
        registry.register(Box::new(leds_registered.clone()))?;
        registry.register(Box::new(led_target.clone()))?;
        registry.register(Box::new(calibration_complete.clone()))?;
        registry.register(Box::new(calibration_frames_total.clone()))?;
        registry.register(Box::new(duplicate_matches_total.clone()))?;
        registry.register(Box::new(decoding_frames_total.clone()))?;
        registry.register(Box::new(message_frames_total.clone()))?;
        registry.register(Box::new(transitions_discarded_total.clone()))?;
        registry.register(Box::new(warnings.clone()))?;

        Ok(Self {
            registry,
            leds_registered,
            led_target,
            calibration_complete,
            calibration_frames_total,
            duplicate_matches_total,
            decoding_frames_total,
            message_frames_total,
            transitions_discarded_total,
            warnings,
        })
    }

    /// Updates all metrics from a snapshot of session state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.leds_registered.set(snapshot.leds_registered as i64);
        self.led_target.set(snapshot.led_target as i64);
        self.calibration_complete
            .set(if snapshot.calibration_complete { 1 } else { 0 });
        self.warnings.set(snapshot.warnings as i64);

        // Counters only move forward, so increment by the difference
        advance(&self.calibration_frames_total, snapshot.calibration_frames);
        advance(&self.duplicate_matches_total, snapshot.duplicate_matches);
        advance(&self.decoding_frames_total, snapshot.decoding_frames);
        advance(&self.message_frames_total, snapshot.message_frames);
        advance(
            &self.transitions_discarded_total,
            snapshot.transitions_discarded,
        );
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}
