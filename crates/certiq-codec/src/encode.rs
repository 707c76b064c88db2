// SPDX-License-Identifier: MIT OR Apache-2.0
//
// QR encoding — render a token as a grayscale raster and an SVG document.

use certiq_core::config::{AppConfig, EcTolerance};
use certiq_core::error::{CertiqError, Result};
use certiq_core::token::Token;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use tracing::{debug, instrument};

use crate::pixel::PixelBuffer;

/// Byte-mode capacity of a version-40 code at each error-correction level —
/// payloads beyond this cannot be represented at all.
fn max_payload_bytes(tolerance: EcTolerance) -> usize {
    match tolerance {
        EcTolerance::Low => 2953,
        EcTolerance::Medium => 2331,
        EcTolerance::Quartile => 1663,
        EcTolerance::High => 1273,
    }
}

fn ec_level(tolerance: EcTolerance) -> EcLevel {
    match tolerance {
        EcTolerance::Low => EcLevel::L,
        EcTolerance::Medium => EcLevel::M,
        EcTolerance::Quartile => EcLevel::Q,
        EcTolerance::High => EcLevel::H,
    }
}

/// Renders tokens as scannable artifacts.
///
/// The encode is a pure transform: the same payload, size and tolerance
/// always produce the same artifact, and the artifact decodes back to the
/// exact input string.
pub struct QrEncoder {
    target_size: u32,
    quiet_zone: u32,
    tolerance: EcTolerance,
}

impl QrEncoder {
    pub fn new() -> Self {
        Self::from_config(&AppConfig::default())
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            target_size: config.qr_target_size.max(1),
            quiet_zone: config.qr_quiet_zone,
            tolerance: config.qr_error_correction,
        }
    }

    /// Encode a validated token.
    pub fn encode(&self, token: &Token) -> Result<QrArtifact> {
        self.encode_text(token.as_str())
    }

    /// Encode an arbitrary payload.
    ///
    /// Empty and oversized payloads are rejected with a specific reason
    /// before any rendering is attempted.
    #[instrument(skip(self), fields(payload_len = payload.len()))]
    pub fn encode_text(&self, payload: &str) -> Result<QrArtifact> {
        if payload.is_empty() {
            return Err(CertiqError::Validation(
                "QR payload is empty — nothing to encode".into(),
            ));
        }
        let max = max_payload_bytes(self.tolerance);
        if payload.len() > max {
            return Err(CertiqError::Validation(format!(
                "QR payload is {} bytes; at most {max} bytes fit at this error-correction level",
                payload.len()
            )));
        }

        let code = QrCode::with_error_correction_level(payload, ec_level(self.tolerance))
            .map_err(|err| CertiqError::Codec(err.to_string()))?;

        let pixels = self.paint(&code);
        let svg = code
            .render::<svg::Color>()
            .min_dimensions(self.target_size, self.target_size)
            .build();

        debug!(
            modules = code.width(),
            raster = pixels.width(),
            "QR artifact rendered"
        );
        Ok(QrArtifact {
            payload: payload.to_owned(),
            pixels,
            svg,
            module_count: code.width() as u32,
        })
    }

    /// Paint the module grid into a grayscale raster with a quiet zone,
    /// scaled up to at least the target size (whole pixels per module).
    fn paint(&self, code: &QrCode) -> PixelBuffer {
        let modules = code.width() as u32;
        let total = modules + 2 * self.quiet_zone;
        let scale = (self.target_size / total).max(1);
        let size = total * scale;

        let mut data = vec![255u8; size as usize * size as usize];
        for y in 0..modules {
            for x in 0..modules {
                if code[(x as usize, y as usize)] == qrcode::Color::Dark {
                    let px0 = (self.quiet_zone + x) * scale;
                    let py0 = (self.quiet_zone + y) * scale;
                    for dy in 0..scale {
                        let row = (py0 + dy) as usize * size as usize;
                        for dx in 0..scale {
                            data[row + (px0 + dx) as usize] = 0;
                        }
                    }
                }
            }
        }

        PixelBuffer::luma8_exact(size, size, data)
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// A rendered QR code: the payload it encodes, a grayscale raster, and an
/// SVG rendition for vector output.
#[derive(Debug, Clone)]
pub struct QrArtifact {
    payload: String,
    pixels: PixelBuffer,
    svg: String,
    module_count: u32,
}

impl QrArtifact {
    /// The exact string this artifact encodes.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The grayscale raster, quiet zone included.
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// SVG document for vector rendering.
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Edge length of the module grid (quiet zone excluded).
    pub fn module_count(&self) -> u32 {
        self.module_count
    }

    /// Losslessly serialize the raster as PNG bytes, ready to download.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let encoder = PngEncoder::new(&mut bytes);
        encoder
            .write_image(
                self.pixels.data(),
                self.pixels.width(),
                self.pixels.height(),
                image::ExtendedColorType::L8,
            )
            .map_err(|err| CertiqError::Codec(format!("PNG encoding failed: {err}")))?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_rejected_before_rendering() {
        let encoder = QrEncoder::new();
        assert!(matches!(
            encoder.encode_text(""),
            Err(CertiqError::Validation(_))
        ));
    }

    #[test]
    fn oversized_payload_is_rejected_with_reason() {
        let encoder = QrEncoder::new();
        let huge = "A".repeat(3000);
        match encoder.encode_text(&huge).unwrap_err() {
            CertiqError::Validation(msg) => assert!(msg.contains("3000")),
            other => panic!("unexpected error variant: {other}"),
        }
    }

    #[test]
    fn artifact_raster_has_quiet_zone_and_target_size() {
        let encoder = QrEncoder::new();
        let token = Token::mint(1_700_000_000_000, &[1, 2, 3, 4, 5, 6]);
        let artifact = encoder.encode(&token).unwrap();

        let total = artifact.module_count() + 2 * AppConfig::default().qr_quiet_zone;
        let pixels = artifact.pixels();
        assert_eq!(pixels.width() % total, 0, "whole pixels per module");
        assert_eq!(pixels.width(), pixels.height());

        // The quiet zone stays white on every edge.
        let scale = pixels.width() / total;
        let first_row = &pixels.data()[..pixels.width() as usize];
        assert!(first_row.iter().all(|&b| b == 255));
        assert!(scale >= 1);
    }

    #[test]
    fn same_input_paints_the_same_artifact() {
        let encoder = QrEncoder::new();
        let token = Token::mint(1_700_000_000_000, &[9, 8, 7, 6, 5, 4]);
        let a = encoder.encode(&token).unwrap();
        let b = encoder.encode(&token).unwrap();
        assert_eq!(a.pixels(), b.pixels());
        assert_eq!(a.svg(), b.svg());
    }

    #[test]
    fn png_bytes_carry_the_png_signature() {
        let encoder = QrEncoder::new();
        let token = Token::mint(1_700_000_000_000, &[1, 1, 2, 3, 5, 8]);
        let png = encoder.encode(&token).unwrap().to_png_bytes().unwrap();
        assert_eq!(png[..8], [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn svg_rendition_is_a_document() {
        let encoder = QrEncoder::new();
        let token = Token::mint(1_700_000_000_000, &[2, 4, 6, 8, 10, 12]);
        let artifact = encoder.encode(&token).unwrap();
        assert!(artifact.svg().contains("<svg"));
    }
}
