// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Application configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Minimum error-correction tolerance for rendered QR codes.
///
/// Mirrors the four standard QR levels; higher tolerance survives more
/// damage at the cost of a denser code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EcTolerance {
    /// ~7% of codewords recoverable.
    Low,
    /// ~15% — the usual default for screen-rendered codes.
    #[default]
    Medium,
    /// ~25%.
    Quartile,
    /// ~30%.
    High,
}

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Target edge length in pixels for rendered QR rasters.
    pub qr_target_size: u32,
    /// Quiet-zone width in modules around the rendered code.
    pub qr_quiet_zone: u32,
    /// Minimum error-correction tolerance for rendered codes.
    pub qr_error_correction: EcTolerance,
    /// Verify fresh tokens against the record store before accepting them.
    pub collision_check: bool,
    /// Bounded token regeneration attempts when a collision is detected.
    pub max_generate_attempts: u32,
    /// Abort a scan session after this many frames (None = user-cancelled only).
    pub max_scan_attempts: Option<u32>,
    /// Abort a scan session after this wall-clock duration (None = unbounded).
    pub max_scan_duration: Option<Duration>,
    /// Record issuance/verification actions in the activity log.
    pub activity_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            qr_target_size: 160,
            qr_quiet_zone: 4,
            qr_error_correction: EcTolerance::Medium,
            collision_check: true,
            max_generate_attempts: 5,
            max_scan_attempts: None,
            max_scan_duration: None,
            activity_enabled: true,
        }
    }
}
