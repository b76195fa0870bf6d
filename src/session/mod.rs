//! Decoding sessions.
//!
//! A [`DecodingSession`] owns every piece of state for one video: the
//! LED registry, the side layout once fixed, and the accepted message
//! frames. Work advances one frame per [`DecodingSession::step`], so a
//! host can interleave decoding with its own event loop; [`DecodingSession::run`]
//! drives the steps to completion.
//!
//! Phases run strictly in order:
//!
//! ```text
//! Calibrating ──▶ (side assignment) ──▶ Decoding ──▶ Finished
//! ```
//!
//! Each phase makes its own pass from the start of the source.

mod cancel;
mod report;
mod sink;

pub use cancel::CancelToken;
pub use report::DecodeReport;
pub use sink::{BitRendering, NullSink, ProgressSink, RecordingSink, TracingSink};

use crate::calibration::{HexagonLayout, LedPosition, LedRegistry};
use crate::capture::{FrameSource, SourceError};
use crate::config::{ConfigError, DecoderConfig, SIDE_COUNT};
use crate::decoding::{
    Candidate, FrameDecoder, MessageFrame, RotationResolver, SampleOutOfBounds,
    StabilityStateMachine,
};
use crate::detection::{BrightSpotDetector, Point2D};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that stop a decoding run.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    SampleOutOfBounds(#[from] SampleOutOfBounds),
    #[error("blob at ({x:.1}, {y:.1}) matches {count} registered LEDs")]
    DuplicateLedMatch { x: f64, y: f64, count: usize },
}

/// Non-fatal conditions reported during a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionWarning {
    #[error("calibration incomplete: found {found} of {target} LEDs")]
    IncompleteCalibration { found: usize, target: usize },
    #[error(
        "blob at ({:.1}, {:.1}) matches registered LEDs {matches:?}; kept existing entries",
        .blob.x,
        .blob.y
    )]
    DuplicateLedMatch { blob: Point2D, matches: Vec<usize> },
}

/// Where a session is in its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Registering LED positions.
    Calibrating,
    /// Sampling frames into message frames.
    Decoding,
    /// All passes completed.
    Finished,
    /// Stopped by a cancellation request.
    Cancelled,
    /// Stopped by a fatal error.
    Aborted,
}

impl Phase {
    /// True once no further step will do any work.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Finished | Phase::Cancelled | Phase::Aborted)
    }
}

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// More frames remain in the current phase or a later one.
    Continue,
    /// The session reached a terminal phase.
    Done,
}

/// All state of one decoding run over one video.
#[derive(Debug)]
pub struct DecodingSession {
    config: DecoderConfig,
    detector: BrightSpotDetector,
    registry: LedRegistry,
    layout: Option<HexagonLayout>,
    decoder: Option<FrameDecoder>,
    stability: StabilityStateMachine,
    messages: Vec<MessageFrame>,
    warnings: Vec<SessionWarning>,
    phase: Phase,
    pass_started: bool,
    calibration_frames: u64,
    decoding_frames: u64,
    duplicate_matches: u64,
}

impl DecodingSession {
    /// Creates a session in the calibrating phase.
    pub fn new(config: DecoderConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            detector: BrightSpotDetector::new(config.detection.clone()),
            registry: LedRegistry::new(&config.calibration),
            stability: StabilityStateMachine::new(&config.stability),
            config,
            layout: None,
            decoder: None,
            messages: Vec::new(),
            warnings: Vec::new(),
            phase: Phase::Calibrating,
            pass_started: false,
            calibration_frames: 0,
            decoding_frames: 0,
            duplicate_matches: 0,
        })
    }

    /// Processes at most one frame of the current phase.
    ///
    /// A fatal error moves the session to [`Phase::Aborted`]; whatever was
    /// accumulated before it stays available.
    pub fn step<S, P>(&mut self, source: &mut S, sink: &mut P) -> Result<Step, SessionError>
    where
        S: FrameSource + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let result = match self.phase {
            Phase::Calibrating => self.calibrate_step(source, sink),
            Phase::Decoding => self.decode_step(source, sink),
            _ => return Ok(Step::Done),
        };

        match result {
            Ok(()) if self.phase.is_terminal() => Ok(Step::Done),
            Ok(()) => Ok(Step::Continue),
            Err(e) => {
                tracing::error!(error = %e, phase = ?self.phase, "Decoding run aborted");
                self.phase = Phase::Aborted;
                Err(e)
            }
        }
    }

    /// Steps until the session finishes, fails, or `cancel` is set.
    ///
    /// Cancellation is checked before every frame; a cancelled run still
    /// returns a report of everything accepted so far.
    pub fn run<S, P>(
        &mut self,
        source: &mut S,
        sink: &mut P,
        cancel: &CancelToken,
    ) -> Result<DecodeReport, SessionError>
    where
        S: FrameSource + ?Sized,
        P: ProgressSink + ?Sized,
    {
        tracing::info!(info = ?source.info(), "Starting decoding run");
        loop {
            if cancel.is_cancelled() && !self.phase.is_terminal() {
                self.cancel();
            }
            if self.step(source, sink)? == Step::Done {
                break;
            }
        }
        Ok(self.report())
    }

    /// Stops the session at the current frame boundary.
    pub fn cancel(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        tracing::warn!(
            phase = ?self.phase,
            leds = self.registry.len(),
            message_frames = self.messages.len(),
            "Decoding cancelled"
        );
        self.phase = Phase::Cancelled;
    }

    fn begin_pass<S: FrameSource + ?Sized>(&mut self, source: &mut S) -> Result<(), SessionError> {
        if !self.pass_started {
            source.seek_to_start()?;
            self.pass_started = true;
        }
        Ok(())
    }

    fn calibrate_step<S, P>(&mut self, source: &mut S, sink: &mut P) -> Result<(), SessionError>
    where
        S: FrameSource + ?Sized,
        P: ProgressSink + ?Sized,
    {
        self.begin_pass(source)?;

        let Some(frame) = source.read()? else {
            self.finish_calibration(sink);
            return Ok(());
        };
        self.calibration_frames += 1;

        let outcome = self.registry.ingest(&frame, &self.detector);
        for duplicate in outcome.duplicates {
            self.duplicate_matches += 1;
            if self.config.calibration.fail_on_duplicate_match {
                return Err(SessionError::DuplicateLedMatch {
                    x: duplicate.blob.x,
                    y: duplicate.blob.y,
                    count: duplicate.matches.len(),
                });
            }
            self.warn(
                sink,
                SessionWarning::DuplicateLedMatch {
                    blob: duplicate.blob,
                    matches: duplicate.matches,
                },
            );
        }

        let (found, target) = self.registry.progress();
        sink.calibration_progress(found, target);

        if self.registry.is_complete() {
            self.finish_calibration(sink);
        }
        Ok(())
    }

    fn finish_calibration<P: ProgressSink + ?Sized>(&mut self, sink: &mut P) {
        let (found, target) = self.registry.progress();
        if found < target {
            self.warn(sink, SessionWarning::IncompleteCalibration { found, target });
        }

        let layout = HexagonLayout::assign(self.registry.leds());
        self.decoder = Some(FrameDecoder::new(&layout, self.config.detection.threshold));
        sink.sides_assigned(&layout);
        self.layout = Some(layout);

        tracing::info!(
            leds = found,
            frames = self.calibration_frames,
            "Calibration finished"
        );
        self.phase = Phase::Decoding;
        self.pass_started = false;
    }

    fn decode_step<S, P>(&mut self, source: &mut S, sink: &mut P) -> Result<(), SessionError>
    where
        S: FrameSource + ?Sized,
        P: ProgressSink + ?Sized,
    {
        self.begin_pass(source)?;

        let Some(frame) = source.read()? else {
            self.stability.finish();
            let candidates = self.candidates();
            sink.candidates(&candidates);
            tracing::info!(
                frames = self.decoding_frames,
                message_frames = self.messages.len(),
                discarded = self.stability.discarded(),
                "Decoding finished"
            );
            self.phase = Phase::Finished;
            return Ok(());
        };
        self.decoding_frames += 1;

        let Some(decoder) = self.decoder.as_ref() else {
            // Only reachable if calibration never assigned sides.
            self.finish_calibration(sink);
            return Ok(());
        };
        let vector = decoder.decode(&frame)?;
        if let Some(message) = self.stability.observe(frame.sequence(), vector) {
            sink.message_frame(&message, &message.bytes.bits());
            self.messages.push(message);
        }
        Ok(())
    }

    fn warn<P: ProgressSink + ?Sized>(&mut self, sink: &mut P, warning: SessionWarning) {
        tracing::warn!(%warning, "Decoding warning");
        sink.warning(&warning);
        self.warnings.push(warning);
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Configuration the session runs with.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Registered LED positions, in discovery order.
    pub fn leds(&self) -> &[LedPosition] {
        self.registry.leds()
    }

    /// LED registry, including its progress toward the target.
    pub fn registry(&self) -> &LedRegistry {
        &self.registry
    }

    /// Side layout, once calibration finished.
    pub fn layout(&self) -> Option<&HexagonLayout> {
        self.layout.as_ref()
    }

    /// Message frames accepted so far.
    pub fn message_frames(&self) -> &[MessageFrame] {
        &self.messages
    }

    /// Rotation candidates for the message frames accepted so far.
    pub fn candidates(&self) -> [Candidate; SIDE_COUNT] {
        RotationResolver::resolve(&self.messages)
    }

    /// Warnings raised so far.
    pub fn warnings(&self) -> &[SessionWarning] {
        &self.warnings
    }

    /// Frames read during calibration.
    pub fn calibration_frames(&self) -> u64 {
        self.calibration_frames
    }

    /// Frames read during decoding.
    pub fn decoding_frames(&self) -> u64 {
        self.decoding_frames
    }

    /// Blobs that matched several registered LEDs.
    pub fn duplicate_matches(&self) -> u64 {
        self.duplicate_matches
    }

    /// Candidate patterns dropped as transition noise.
    pub fn transitions_discarded(&self) -> u64 {
        self.stability.discarded()
    }

    /// Summarizes the session in its current state.
    pub fn report(&self) -> DecodeReport {
        DecodeReport::from_session(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Frame, MemorySource, MockSource, RingGeometry};
    use crate::config::CalibrationConfig;

    fn session() -> DecodingSession {
        DecodingSession::new(DecoderConfig::default()).unwrap()
    }

    #[test]
    fn test_full_run_recovers_message() {
        let mut source = MockSource::message(RingGeometry::default(), "Hello, LED ring!", 6);
        let mut sink = RecordingSink::default();
        let mut session = session();

        let report = session
            .run(&mut source, &mut sink, &CancelToken::new())
            .unwrap();

        assert_eq!(session.phase(), Phase::Finished);
        assert_eq!(session.leds().len(), 48);
        assert!(session.warnings().is_empty());
        assert_eq!(sink.side_sizes, Some([8; 6]));

        // Calibration stops at the first frame, which lights every LED.
        assert_eq!(session.calibration_frames(), 1);
        assert_eq!(sink.progress, vec![(48, 48)]);

        // Frame 0 is the all-on state, then three message chunks.
        assert_eq!(session.message_frames().len(), 4);
        assert_eq!(session.message_frames()[0].bytes.0, [0xff; 6]);
        assert_eq!(sink.frames, session.message_frames());

        let expected: String = std::iter::repeat('\u{ff}')
            .take(6)
            .chain("Hello, LED ring!  ".chars())
            .collect();
        assert_eq!(report.candidates[0].text, expected);
        assert_eq!(sink.candidates.len(), 6);
        assert!(report.calibration_complete);
    }

    #[test]
    fn test_steps_one_frame_at_a_time() {
        let mut source = MockSource::message(RingGeometry::default(), "abcdef", 4);
        let total = source.script().len() as u64;
        let mut session = session();

        let mut steps = 0;
        while session.step(&mut source, &mut NullSink).unwrap() == Step::Continue {
            steps += 1;
            assert!(steps < 1000);
        }

        assert_eq!(session.calibration_frames(), 1);
        assert_eq!(session.decoding_frames(), total);
        assert_eq!(session.candidates()[0].bytes[6..], *b"abcdef");
        assert_eq!(session.step(&mut source, &mut NullSink).unwrap(), Step::Done);
    }

    #[test]
    fn test_incomplete_calibration_still_decodes() {
        let mut source = MockSource::message(RingGeometry::default(), "abcdef", 4);
        let config = DecoderConfig {
            calibration: CalibrationConfig {
                target_leds: 60,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut session = DecodingSession::new(config).unwrap();
        let mut sink = RecordingSink::default();

        let report = session
            .run(&mut source, &mut sink, &CancelToken::new())
            .unwrap();

        assert_eq!(
            sink.warnings,
            vec![SessionWarning::IncompleteCalibration {
                found: 48,
                target: 60
            }]
        );
        assert!(!report.calibration_complete);
        assert_eq!(session.phase(), Phase::Finished);
        assert_eq!(session.candidates()[0].bytes[6..], *b"abcdef");
    }

    #[test]
    fn test_cancellation_keeps_partial_results() {
        let mut source = MockSource::message(RingGeometry::default(), "abcdefghijkl", 5);
        let mut session = session();
        let cancel = CancelToken::new();

        // Calibrate, then decode ten frames.
        for _ in 0..11 {
            session.step(&mut source, &mut NullSink).unwrap();
        }
        cancel.cancel();
        let report = session.run(&mut source, &mut NullSink, &cancel).unwrap();

        assert_eq!(session.phase(), Phase::Cancelled);
        assert_eq!(session.leds().len(), 48);
        assert_eq!(report.phase, Phase::Cancelled);
        assert_eq!(session.decoding_frames(), 10);
        assert_eq!(session.message_frames().len(), 2);
    }

    #[test]
    fn test_out_of_bounds_aborts_with_partial_state() {
        let geometry = RingGeometry::default();
        let mut frames = vec![geometry.render(&[0xff; 6], 0), geometry.render(&[1; 6], 1)];
        // A cropped frame in the middle of the video.
        frames.push(Frame::new(vec![0u8; 200 * 200], 200, 200, 2));
        let mut source = MemorySource::new(frames);
        let mut session = session();

        let err = session
            .run(&mut source, &mut NullSink, &CancelToken::new())
            .unwrap_err();

        assert!(matches!(err, SessionError::SampleOutOfBounds(_)));
        assert_eq!(session.phase(), Phase::Aborted);
        assert_eq!(session.leds().len(), 48);
        assert_eq!(session.message_frames().len(), 1);
    }

    fn disks(centers: &[(i64, i64)], sequence: u64) -> Frame {
        let (w, h) = (300i64, 200i64);
        let mut pixels = vec![0u8; (w * h) as usize];
        for &(cx, cy) in centers {
            for y in (cy - 12)..=(cy + 12) {
                for x in (cx - 12)..=(cx + 12) {
                    if (x - cx).pow(2) + (y - cy).pow(2) <= 144 {
                        pixels[(y * w + x) as usize] = 255;
                    }
                }
            }
        }
        Frame::new(pixels, w as u32, h as u32, sequence)
    }

    fn duplicate_config(fail: bool) -> DecoderConfig {
        DecoderConfig {
            calibration: CalibrationConfig {
                target_leds: 10,
                tolerance_px: 30.0,
                fail_on_duplicate_match: fail,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_match_warns_and_keeps_existing() {
        // The second frame's blob sits within tolerance of both LEDs.
        let mut source = MemorySource::new(vec![
            disks(&[(100, 100), (140, 100)], 0),
            disks(&[(120, 100)], 1),
        ]);
        let mut session = DecodingSession::new(duplicate_config(false)).unwrap();
        let mut sink = RecordingSink::default();

        session
            .run(&mut source, &mut sink, &CancelToken::new())
            .unwrap();

        assert_eq!(session.leds().len(), 2);
        assert_eq!(session.duplicate_matches(), 1);
        assert!(matches!(
            &sink.warnings[0],
            SessionWarning::DuplicateLedMatch { matches, .. } if matches == &vec![0, 1]
        ));
        assert_eq!(session.phase(), Phase::Finished);
    }

    #[test]
    fn test_duplicate_match_can_fail_loudly() {
        let mut source = MemorySource::new(vec![
            disks(&[(100, 100), (140, 100)], 0),
            disks(&[(120, 100)], 1),
        ]);
        let mut session = DecodingSession::new(duplicate_config(true)).unwrap();

        let err = session
            .run(&mut source, &mut NullSink, &CancelToken::new())
            .unwrap_err();

        assert!(matches!(err, SessionError::DuplicateLedMatch { count: 2, .. }));
        assert_eq!(session.phase(), Phase::Aborted);
        assert_eq!(session.leds().len(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = DecoderConfig::default();
        config.source.frame_skip = 0;
        assert!(matches!(
            DecodingSession::new(config),
            Err(SessionError::Config(ConfigError::InvalidFrameSkip))
        ));
    }
}
