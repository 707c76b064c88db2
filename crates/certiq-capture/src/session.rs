// SPDX-License-Identifier: MIT OR Apache-2.0
//
// The scan session state machine.
//
// Idle -> Acquiring -> Decoding -> Found | NotFound; NotFound loops back to
// Acquiring. A device failure is terminal for the session; cancellation from
// any non-terminal state returns to Idle. Whatever the exit path, the frame
// source is released exactly when the session stops using it.

use std::time::{Duration, Instant};

use certiq_codec::{DecodeOutcome, QrDecoder};
use certiq_core::config::AppConfig;
use certiq_core::error::{CertiqError, Result};
use tracing::{debug, info, instrument, warn};

use crate::source::{FrameEvent, FrameSource};

/// Observable states of a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// No capture in progress.
    Idle,
    /// Waiting on the frame source.
    Acquiring,
    /// A frame is being decoded.
    Decoding,
    /// A payload was extracted; the session is over.
    Found,
    /// The last frame held no code; the next pull acquires again.
    NotFound,
    /// The device failed; the session is over and cannot be resumed.
    Failed,
}

impl ScanState {
    /// Terminal states end the session; a new session must be created to
    /// scan again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Found | Self::Failed)
    }
}

/// Result of a single acquire-and-decode step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStep {
    /// A code was located and read.
    Found(String),
    /// This frame held no readable code; try another.
    NotFound,
    /// The source has no more frames.
    SourceClosed,
}

/// Result of driving a session to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A code was located and read.
    Found(String),
    /// The source ended (stream stopped or fixture exhausted).
    SourceClosed,
    /// The configured attempt bound was reached.
    AttemptsExhausted,
    /// The configured duration bound was reached.
    DurationExpired,
}

/// Optional bounds on a scan session.
///
/// By default a session retries indefinitely at the user's discretion; these
/// bounds exist so an embedder can avoid holding a camera forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanLimits {
    pub max_attempts: Option<u32>,
    pub max_duration: Option<Duration>,
}

impl ScanLimits {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.max_scan_attempts,
            max_duration: config.max_scan_duration,
        }
    }
}

/// One bounded verification scan over a frame source.
///
/// The session owns its source and releases it (via `FrameSource::close`) on
/// every exit path: success, source end, limit, device failure, cancel, and
/// drop.
pub struct ScanSession<S: FrameSource> {
    source: Option<S>,
    decoder: QrDecoder,
    limits: ScanLimits,
    state: ScanState,
    attempts: u32,
    started_at: Option<Instant>,
}

impl<S: FrameSource> ScanSession<S> {
    pub fn new(source: S) -> Self {
        Self::with_limits(source, ScanLimits::default())
    }

    pub fn with_limits(source: S, limits: ScanLimits) -> Self {
        Self {
            source: Some(source),
            decoder: QrDecoder::new(),
            limits,
            state: ScanState::Idle,
            attempts: 0,
            started_at: None,
        }
    }

    /// Current state of the session.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Frames decoded so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// One acquire-and-decode cycle.
    ///
    /// Device errors release the source before propagating and leave the
    /// session in `Failed`; a finished or cancelled session reports a
    /// validation error rather than touching a released source.
    #[instrument(skip(self), fields(attempt = self.attempts + 1))]
    pub fn scan_once(&mut self) -> Result<ScanStep> {
        if self.state.is_terminal() {
            return Err(CertiqError::Validation(
                "scan session is finished; start a new session".into(),
            ));
        }
        let Some(source) = self.source.as_mut() else {
            return Err(CertiqError::Validation(
                "scan session was cancelled; start a new session".into(),
            ));
        };

        self.state = ScanState::Acquiring;
        let frame = match source.next_frame() {
            Ok(FrameEvent::Frame(frame)) => frame,
            Ok(FrameEvent::Closed) => {
                debug!("frame source closed");
                self.release();
                self.state = ScanState::Idle;
                return Ok(ScanStep::SourceClosed);
            }
            Err(err) => {
                // Release before reporting — no error path may leave the
                // capture resource held.
                warn!(%err, "frame source failed");
                self.release();
                self.state = ScanState::Failed;
                return Err(err);
            }
        };

        self.state = ScanState::Decoding;
        self.attempts += 1;
        match self.decoder.decode(&frame) {
            DecodeOutcome::Found(payload) => {
                info!(attempts = self.attempts, "scan session found a code");
                self.release();
                self.state = ScanState::Found;
                Ok(ScanStep::Found(payload))
            }
            DecodeOutcome::NotFound => {
                debug!("no code in this frame");
                self.state = ScanState::NotFound;
                Ok(ScanStep::NotFound)
            }
        }
    }

    /// Drive the session until a code is found, the source ends, a limit is
    /// reached, or the device fails.
    #[instrument(skip(self))]
    pub fn run(&mut self) -> Result<ScanOutcome> {
        let started = *self.started_at.get_or_insert_with(Instant::now);

        loop {
            if let Some(max) = self.limits.max_attempts {
                if self.attempts >= max {
                    info!(max, "scan attempt bound reached");
                    self.release();
                    self.state = ScanState::Idle;
                    return Ok(ScanOutcome::AttemptsExhausted);
                }
            }
            if let Some(max) = self.limits.max_duration {
                if started.elapsed() >= max {
                    info!(?max, "scan duration bound reached");
                    self.release();
                    self.state = ScanState::Idle;
                    return Ok(ScanOutcome::DurationExpired);
                }
            }

            match self.scan_once()? {
                ScanStep::Found(payload) => return Ok(ScanOutcome::Found(payload)),
                ScanStep::SourceClosed => return Ok(ScanOutcome::SourceClosed),
                ScanStep::NotFound => continue,
            }
        }
    }

    /// Abandon the session from any non-terminal state, releasing the
    /// source immediately and returning to `Idle`.
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.release();
        self.state = ScanState::Idle;
    }

    fn release(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
        }
    }
}

impl<S: FrameSource> Drop for ScanSession<S> {
    fn drop(&mut self) {
        self.release();
    }
}
