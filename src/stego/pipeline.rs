// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/pixelvault-core

//! The embedding pipeline: encode and decode end to end.
//!
//! Encode walks validate -> capacity check -> encrypt (optional) ->
//! frame -> pack to bits -> write units -> re-serialize carrier; decode
//! reverses it. Every stage either proceeds or fails terminally, and the
//! capacity check runs before the first unit is written, so no call ever
//! produces a partially-embedded carrier.
//!
//! The pipeline is written once against the [`Carrier`] trait; the only
//! kind-specific parts are carrier codec glue and the frame family
//! constants.

use crate::jpeg::JpegImage;
use crate::pixel;
use crate::stego::bits;
use crate::stego::capacity::{self, CapacityReport};
use crate::stego::carrier::{Carrier, CarrierKind, CoefficientCarrier, PixelCarrier};
use crate::stego::crypto;
use crate::stego::error::StegoError;
use crate::stego::frame::{self, Frame};

/// A decoded hidden payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A plain message (arbitrary bytes; typically UTF-8 text).
    Message(Vec<u8>),
    /// A file with its original name.
    File(FilePayload),
}

/// A file recovered from a carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Hide `message` in `carrier`, returning the new carrier bytes
/// (PNG for pixel carriers, JPEG for coefficient carriers).
///
/// With a password the message is encrypted (AES-256-CBC under a
/// PBKDF2-derived key) before framing; without one it is embedded as-is
/// and the frame is flagged plain.
pub fn encode(
    carrier: &[u8],
    kind: CarrierKind,
    message: &[u8],
    password: Option<&str>,
) -> Result<Vec<u8>, StegoError> {
    if message.is_empty() {
        return Err(StegoError::EmptyMessage);
    }
    let tag = frame::message_tag(kind, password.is_some());
    run_encode(carrier, kind, tag.into_bytes(), message, password)
}

/// Hide a whole file, keeping its name alongside the content.
pub fn encode_file(
    carrier: &[u8],
    kind: CarrierKind,
    filename: &str,
    content: &[u8],
    password: Option<&str>,
) -> Result<Vec<u8>, StegoError> {
    if content.is_empty() {
        return Err(StegoError::EmptyMessage);
    }
    frame::check_filename(filename)?;
    let tag = frame::file_tag(kind, password.is_some(), filename, content.len());
    run_encode(carrier, kind, tag.into_bytes(), content, password)
}

/// Extract a hidden payload from `carrier`.
///
/// Fails with [`StegoError::PasswordRequired`] when the frame is flagged
/// encrypted and no password was given; a password supplied for a plain
/// frame is ignored.
pub fn decode(
    carrier: &[u8],
    kind: CarrierKind,
    password: Option<&str>,
) -> Result<Payload, StegoError> {
    let extracted = match kind {
        CarrierKind::Pixel => {
            let decoded = pixel::decode(carrier)?;
            extract_all(&PixelCarrier::new(decoded.samples))
        }
        CarrierKind::Jpeg => {
            let mut img = JpegImage::from_bytes(carrier)?;
            extract_all(&CoefficientCarrier::new(img.coeff_grid_mut(0)))
        }
    };

    match frame::unframe(kind, &extracted)? {
        Frame::Message { encrypted, body } => {
            Ok(Payload::Message(open_body(encrypted, body, password)?))
        }
        Frame::File { encrypted, filename, body, .. } => Ok(Payload::File(FilePayload {
            filename,
            content: open_body(encrypted, body, password)?,
        })),
    }
}

/// Report how much payload fits in `carrier` without modifying it.
/// Idempotent: the same carrier bytes always produce the same report.
pub fn capacity(carrier: &[u8], kind: CarrierKind) -> Result<CapacityReport, StegoError> {
    let total_units = match kind {
        CarrierKind::Pixel => pixel::decode(carrier)?.samples.len(),
        CarrierKind::Jpeg => {
            let mut img = JpegImage::from_bytes(carrier)?;
            CoefficientCarrier::new(img.coeff_grid_mut(0)).len()
        }
    };
    Ok(capacity::report(kind, total_units))
}

fn run_encode(
    carrier: &[u8],
    kind: CarrierKind,
    tag: Vec<u8>,
    payload: &[u8],
    password: Option<&str>,
) -> Result<Vec<u8>, StegoError> {
    match kind {
        CarrierKind::Pixel => {
            let mut decoded = pixel::decode(carrier)?;
            let mut units = PixelCarrier::new(std::mem::take(&mut decoded.samples));
            embed_frame(&mut units, kind, &tag, payload, password)?;
            decoded.samples = units.into_samples();
            pixel::encode_png(decoded)
        }
        CarrierKind::Jpeg => {
            let mut img = JpegImage::from_bytes(carrier)?;
            let mut units = CoefficientCarrier::new(img.coeff_grid_mut(0));
            embed_frame(&mut units, kind, &tag, payload, password)?;

            // Prefer the carrier's own Huffman tables; fall back to the
            // standard tables only if an LSB flip crossed a size-category
            // boundary the original tables cannot express.
            match img.to_bytes() {
                Ok(bytes) => Ok(bytes),
                Err(crate::jpeg::error::JpegError::MissingHuffmanCode) => {
                    img.install_standard_tables();
                    Ok(img.to_bytes()?)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

/// Capacity-check, encrypt, frame and write. Generic over the carrier.
fn embed_frame<C: Carrier>(
    units: &mut C,
    kind: CarrierKind,
    tag: &[u8],
    payload: &[u8],
    password: Option<&str>,
) -> Result<(), StegoError> {
    let overhead = capacity::frame_overhead(kind, tag.len(), payload.len(), password.is_some());
    capacity::ensure_fits(payload.len(), units.len(), overhead)?;

    let body = match password {
        Some(pw) => crypto::encrypt(payload, pw),
        None => payload.to_vec(),
    };

    let mut framed = Vec::with_capacity(tag.len() + body.len() + frame::terminator(kind).len());
    framed.extend_from_slice(tag);
    framed.extend_from_slice(&body);
    framed.extend_from_slice(frame::terminator(kind));
    debug_assert!(framed.len() * 8 <= units.capacity_bits());

    for (index, bit) in bits::bits_of(&framed).enumerate() {
        units.set_unit_bit(index, bit);
    }
    Ok(())
}

/// Read every whole byte the carrier holds, in unit order.
fn extract_all<C: Carrier>(units: &C) -> Vec<u8> {
    let whole_bits = units.len() - units.len() % 8;
    bits::bytes_of((0..whole_bits).map(|i| units.read_bit(i)))
        .expect("whole_bits is a multiple of 8")
}

fn open_body(
    encrypted: bool,
    body: Vec<u8>,
    password: Option<&str>,
) -> Result<Vec<u8>, StegoError> {
    if !encrypted {
        return Ok(body);
    }
    let password = password.ok_or(StegoError::PasswordRequired)?;
    crypto::decrypt(&body, password)
}
