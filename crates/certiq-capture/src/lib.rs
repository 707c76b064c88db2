// SPDX-License-Identifier: MIT OR Apache-2.0
//
// certiq-capture — Capture sessions for QR verification scans.
//
// A `FrameSource` abstracts wherever pixels come from (camera, file, test
// fixture); `ScanSession` drives the acquire/decode loop and guarantees the
// source is released on every exit path.

pub mod session;
pub mod source;
pub mod stub;

pub use session::{ScanLimits, ScanOutcome, ScanSession, ScanState, ScanStep};
pub use source::{CloseProbe, FrameEvent, FrameSource, ReplaySource};
pub use stub::UnavailableCamera;
