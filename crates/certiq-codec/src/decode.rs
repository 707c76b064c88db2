// SPDX-License-Identifier: MIT OR Apache-2.0
//
// QR decoding — locate and read a code in a captured pixel buffer.

use tracing::{debug, instrument};

use crate::pixel::PixelBuffer;

/// Result of one decode attempt.
///
/// `NotFound` is a normal, reportable outcome — the caller retries with a
/// fresh frame. It is distinct from `Found(String::new())`, which would mean
/// a located code that encodes the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A code was located and read; this is its exact payload.
    Found(String),
    /// No readable code in this frame.
    NotFound,
}

impl DecodeOutcome {
    /// The payload, if a code was found.
    pub fn found(&self) -> Option<&str> {
        match self {
            Self::Found(payload) => Some(payload),
            Self::NotFound => None,
        }
    }
}

/// Reads QR codes out of raw pixel buffers.
///
/// Detection and error correction are delegated to the `rqrr` detector over
/// a grayscale projection of the frame; partial, rotated, and low-contrast
/// codes are handled within the tolerance of the code's own error-correction
/// level. Decoding never panics and never returns an error — a frame either
/// yields a payload or it does not.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Attempt to decode one frame.
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn decode(&self, frame: &PixelBuffer) -> DecodeOutcome {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        if width == 0 || height == 0 {
            return DecodeOutcome::NotFound;
        }

        let gray = frame.to_grayscale();
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| gray[y * width + x]);

        // Several grids can be present; the first that survives error
        // correction wins.
        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_meta, payload)) => {
                    debug!(payload_len = payload.len(), "QR code decoded");
                    return DecodeOutcome::Found(payload);
                }
                Err(err) => {
                    debug!(%err, "detected grid failed to decode");
                }
            }
        }

        DecodeOutcome::NotFound
    }
}
