// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Frame sources — the pull-based capability behind a scan session.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use certiq_codec::PixelBuffer;
use certiq_core::error::Result;

/// One pull from a frame source.
#[derive(Debug, Clone)]
pub enum FrameEvent {
    /// A captured frame.
    Frame(PixelBuffer),
    /// The source has no more frames (stream ended or user stopped it).
    Closed,
}

/// Pull-based pixel source: camera feed, uploaded raster, or test fixture.
///
/// The caller asks for the next frame when it is ready for one — that call
/// is the single blocking point of a scan session. `close` must release the
/// underlying capture resource and must be safe to call more than once.
pub trait FrameSource {
    /// Block until the next frame is available, the stream ends, or the
    /// device fails.
    fn next_frame(&mut self) -> Result<FrameEvent>;

    /// Release the underlying capture resource. Idempotent.
    fn close(&mut self);
}

/// Observable release flag for a frame source.
///
/// Lets tests (and diagnostics) confirm that a session really released its
/// source on a given exit path.
#[derive(Debug, Clone)]
pub struct CloseProbe(Arc<AtomicBool>);

impl CloseProbe {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub(crate) fn mark_closed(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the source has been closed.
    pub fn is_closed(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Frame source that replays a fixed sequence of frames, then reports
/// `Closed`. Stands in for a camera in tests and for file-derived rasters
/// ("upload a photo of the code") in production flows.
#[derive(Debug)]
pub struct ReplaySource {
    frames: VecDeque<PixelBuffer>,
    probe: CloseProbe,
}

impl ReplaySource {
    pub fn new(frames: impl IntoIterator<Item = PixelBuffer>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            probe: CloseProbe::new(),
        }
    }

    /// A source for a single static raster (an uploaded image).
    pub fn single(frame: PixelBuffer) -> Self {
        Self::new([frame])
    }

    /// Handle for observing when this source gets released.
    pub fn probe(&self) -> CloseProbe {
        self.probe.clone()
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Result<FrameEvent> {
        if self.probe.is_closed() {
            return Ok(FrameEvent::Closed);
        }
        Ok(match self.frames.pop_front() {
            Some(frame) => FrameEvent::Frame(frame),
            None => FrameEvent::Closed,
        })
    }

    fn close(&mut self) {
        self.frames.clear();
        self.probe.mark_closed();
    }
}
