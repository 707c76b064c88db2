// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Stub sources for environments without a usable capture device.

use certiq_core::error::{CertiqError, Result};

use crate::source::{CloseProbe, FrameEvent, FrameSource};

/// Frame source for a missing or refused capture device.
///
/// Every pull fails with `CertiqError::Device` carrying the given reason, so
/// session error paths (and their resource-release guarantees) can be
/// exercised without hardware.
#[derive(Debug)]
pub struct UnavailableCamera {
    reason: String,
    probe: CloseProbe,
}

impl UnavailableCamera {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            probe: CloseProbe::new(),
        }
    }

    /// Handle for observing when this source gets released.
    pub fn probe(&self) -> CloseProbe {
        self.probe.clone()
    }
}

impl Default for UnavailableCamera {
    fn default() -> Self {
        Self::new("no capture device available")
    }
}

impl FrameSource for UnavailableCamera {
    fn next_frame(&mut self) -> Result<FrameEvent> {
        Err(CertiqError::Device(self.reason.clone()))
    }

    fn close(&mut self) {
        self.probe.mark_closed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pull_fails_with_device_error() {
        let mut source = UnavailableCamera::new("camera permission denied");
        for _ in 0..3 {
            assert!(matches!(
                source.next_frame(),
                Err(CertiqError::Device(reason)) if reason.contains("denied")
            ));
        }
    }

    #[test]
    fn close_is_observable() {
        let mut source = UnavailableCamera::default();
        let probe = source.probe();
        source.close();
        assert!(probe.is_closed());
    }
}
