// SPDX-License-Identifier: MIT OR Apache-2.0
//
// certiq-codec — QR encode/decode bridge for certificate tokens.
//
// Two independent operations: encode a token into a scannable artifact
// (raster + SVG), and decode a captured pixel buffer back into its payload.
// A decode that locates no code is a normal outcome, never an error.

pub mod decode;
pub mod encode;
pub mod pixel;

pub use decode::{DecodeOutcome, QrDecoder};
pub use encode::{QrArtifact, QrEncoder};
pub use pixel::{ChannelOrder, PixelBuffer};
