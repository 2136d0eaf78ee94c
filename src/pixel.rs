// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/pixelvault-core

//! Pixel carrier codec glue.
//!
//! Decodes lossless raster formats (PNG, BMP) into a flat RGB sample
//! buffer and re-encodes the mutated buffer. Output is always PNG so the
//! LSB plane survives storage; alpha channels are dropped on the way in.

use image::{ImageFormat, RgbImage};
use std::io::Cursor;

use crate::stego::error::StegoError;

/// A decoded pixel carrier: dimensions plus row-major R,G,B samples.
pub struct PixelImage {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<u8>,
}

/// Decode carrier bytes into RGB samples.
pub fn decode(data: &[u8]) -> Result<PixelImage, StegoError> {
    let img = image::load_from_memory(data)
        .map_err(StegoError::UnsupportedCarrier)?
        .to_rgb8();
    let (width, height) = img.dimensions();
    Ok(PixelImage {
        width,
        height,
        samples: img.into_raw(),
    })
}

/// Re-encode mutated samples as PNG.
pub fn encode_png(carrier: PixelImage) -> Result<Vec<u8>, StegoError> {
    let img = RgbImage::from_raw(carrier.width, carrier.height, carrier.samples)
        .expect("sample buffer length matches the decoded dimensions");
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .map_err(StegoError::UnsupportedCarrier)?;
    Ok(out.into_inner())
}
