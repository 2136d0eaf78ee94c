// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/pixelvault-core

//! Frame codec: the tagged, terminator-delimited container around a
//! payload.
//!
//! Message frame layout (ASCII tag, then raw bytes):
//!
//! ```text
//! "PV:1.0:E|"  or "PV:1.0:P|"   (pixel family)
//! "JPG:1.0:E|" or "JPG:1.0:P|"  (coefficient family)
//! [body]                        ciphertext (salt||iv||ct) or raw message
//! "<<END>>" / "<<JPEG_END>>"    family terminator
//! ```
//!
//! File frame layout extends the tag with the filename and the
//! pre-encryption content length:
//!
//! ```text
//! "PVF:1.0:E|report.pdf|1420|" ... "<<END>>"
//! ```
//!
//! The flag is `E` for encrypted, `P` for plain. Marker plus version
//! identify exactly one framing rule; anything else is a hard
//! [`StegoError::UnknownFormat`]. Terminator scanning is inherently
//! ambiguous when the body can contain the terminator bytes (ciphertext
//! can, with probability about `body_len * 2^-56` for the shortest
//! terminator); such a collision truncates the body and surfaces as an
//! authentication failure. A length-prefixed frame would remove the
//! ambiguity but would no longer be wire-compatible with format 1.0.

use crate::stego::carrier::CarrierKind;
use crate::stego::error::StegoError;

/// Wire format version, both families.
pub const FORMAT_VERSION: &str = "1.0";

/// Family marker: `PV` for pixel carriers, `JPG` for coefficient carriers.
pub fn marker(kind: CarrierKind) -> &'static str {
    match kind {
        CarrierKind::Pixel => "PV",
        CarrierKind::Jpeg => "JPG",
    }
}

/// End-of-data terminator for the family.
pub fn terminator(kind: CarrierKind) -> &'static [u8] {
    match kind {
        CarrierKind::Pixel => b"<<END>>",
        CarrierKind::Jpeg => b"<<JPEG_END>>",
    }
}

fn flag(encrypted: bool) -> char {
    if encrypted {
        'E'
    } else {
        'P'
    }
}

/// The fixed message tag, e.g. `PV:1.0:E|`.
pub fn message_tag(kind: CarrierKind, encrypted: bool) -> String {
    format!("{}:{}:{}|", marker(kind), FORMAT_VERSION, flag(encrypted))
}

/// The file tag, e.g. `PVF:1.0:P|notes.txt|512|`. `content_len` is the
/// pre-encryption length of the file content.
pub fn file_tag(kind: CarrierKind, encrypted: bool, filename: &str, content_len: usize) -> String {
    format!(
        "{}F:{}:{}|{}|{}|",
        marker(kind),
        FORMAT_VERSION,
        flag(encrypted),
        filename,
        content_len
    )
}

/// Validate a filename for embedding in a file tag.
pub fn check_filename(filename: &str) -> Result<(), StegoError> {
    if filename.is_empty() || filename.len() > 255 || filename.contains('|') {
        return Err(StegoError::InvalidFilename);
    }
    Ok(())
}

/// Tag + body + terminator for a message payload.
pub fn frame_message(kind: CarrierKind, encrypted: bool, body: &[u8]) -> Vec<u8> {
    assemble(message_tag(kind, encrypted).as_bytes(), body, terminator(kind))
}

/// Tag + body + terminator for a file payload.
pub fn frame_file(
    kind: CarrierKind,
    encrypted: bool,
    filename: &str,
    content_len: usize,
    body: &[u8],
) -> Vec<u8> {
    assemble(
        file_tag(kind, encrypted, filename, content_len).as_bytes(),
        body,
        terminator(kind),
    )
}

fn assemble(tag: &[u8], body: &[u8], term: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tag.len() + body.len() + term.len());
    out.extend_from_slice(tag);
    out.extend_from_slice(body);
    out.extend_from_slice(term);
    out
}

/// A parsed frame. The body is still encrypted when `encrypted` is set.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    Message {
        encrypted: bool,
        body: Vec<u8>,
    },
    File {
        encrypted: bool,
        filename: String,
        /// Declared pre-encryption content length (informational).
        content_len: usize,
        body: Vec<u8>,
    },
}

/// Parse the byte stream extracted from a carrier.
///
/// The tag is matched first ([`StegoError::UnknownFormat`] if nothing
/// matches, which is the "no hidden data" case), then the body runs to the
/// first occurrence of the family terminator
/// ([`StegoError::TerminatorNotFound`] if the stream ends first).
pub fn unframe(kind: CarrierKind, extracted: &[u8]) -> Result<Frame, StegoError> {
    for encrypted in [true, false] {
        let tag = message_tag(kind, encrypted);
        if extracted.starts_with(tag.as_bytes()) {
            let body = body_until_terminator(kind, extracted, tag.len())?;
            return Ok(Frame::Message { encrypted, body });
        }
    }

    for encrypted in [true, false] {
        let prefix = format!("{}F:{}:{}|", marker(kind), FORMAT_VERSION, flag(encrypted));
        if extracted.starts_with(prefix.as_bytes()) {
            return unframe_file(kind, encrypted, extracted, prefix.len());
        }
    }

    Err(StegoError::UnknownFormat)
}

fn unframe_file(
    kind: CarrierKind,
    encrypted: bool,
    extracted: &[u8],
    header_start: usize,
) -> Result<Frame, StegoError> {
    let rest = &extracted[header_start..];

    // filename, at most 255 bytes, then '|'
    let name_end = rest
        .iter()
        .take(256)
        .position(|&b| b == b'|')
        .ok_or(StegoError::UnknownFormat)?;
    let filename = std::str::from_utf8(&rest[..name_end])
        .map_err(|_| StegoError::UnknownFormat)?
        .to_owned();
    if filename.is_empty() {
        return Err(StegoError::UnknownFormat);
    }

    // decimal content length, then '|'
    let rest = &rest[name_end + 1..];
    let len_end = rest
        .iter()
        .take(20)
        .position(|&b| b == b'|')
        .ok_or(StegoError::UnknownFormat)?;
    let content_len = std::str::from_utf8(&rest[..len_end])
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or(StegoError::UnknownFormat)?;

    let body_start = header_start + name_end + 1 + len_end + 1;
    let body = body_until_terminator(kind, extracted, body_start)?;
    Ok(Frame::File {
        encrypted,
        filename,
        content_len,
        body,
    })
}

fn body_until_terminator(
    kind: CarrierKind,
    extracted: &[u8],
    body_start: usize,
) -> Result<Vec<u8>, StegoError> {
    let term = terminator(kind);
    let tail = &extracted[body_start..];
    let at = tail
        .windows(term.len())
        .position(|w| w == term)
        .ok_or(StegoError::TerminatorNotFound)?;
    Ok(tail[..at].to_vec())
}
