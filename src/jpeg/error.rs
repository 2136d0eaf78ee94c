// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/pixelvault-core

//! Error types for JPEG parsing and serialization.

use std::fmt;

/// Errors that can occur while parsing or re-encoding a JPEG file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JpegError {
    /// Input data is too short or truncated.
    UnexpectedEof,
    /// Missing SOI (0xFFD8) at the start of the data.
    NotAJpeg,
    /// Progressive DCT (SOF2) is not supported; re-save as baseline first.
    ProgressiveUnsupported,
    /// Encountered an unsupported frame type (lossless, arithmetic, ...).
    UnsupportedMarker(u8),
    /// A marker segment has an invalid or inconsistent length/content.
    InvalidSegment(&'static str),
    /// Invalid Huffman code encountered in the entropy-coded scan data.
    HuffmanDecode,
    /// A scan references a Huffman table that was never defined.
    MissingHuffmanTable(u8),
    /// A coefficient value has no code in the active Huffman tables.
    /// Recoverable by installing the Annex K standard tables.
    MissingHuffmanCode,
    /// Component ID referenced in SOS not declared in SOF.
    UnknownComponent(u8),
    /// Image dimensions or sampling factors are invalid.
    InvalidDimensions,
    /// Only 8-bit sample precision is supported.
    UnsupportedPrecision(u8),
}

impl fmt::Display for JpegError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of JPEG data"),
            Self::NotAJpeg => write!(f, "missing SOI marker (not a JPEG)"),
            Self::ProgressiveUnsupported => write!(f, "progressive JPEG (SOF2) is not supported"),
            Self::UnsupportedMarker(m) => write!(f, "unsupported JPEG marker: 0xFF{m:02X}"),
            Self::InvalidSegment(msg) => write!(f, "invalid marker segment: {msg}"),
            Self::HuffmanDecode => write!(f, "Huffman decode error in scan data"),
            Self::MissingHuffmanTable(id) => write!(f, "scan references undefined Huffman table {id}"),
            Self::MissingHuffmanCode => write!(f, "Huffman table has no code for a coefficient symbol"),
            Self::UnknownComponent(id) => write!(f, "unknown component ID in SOS: {id}"),
            Self::InvalidDimensions => write!(f, "invalid image dimensions or sampling factors"),
            Self::UnsupportedPrecision(p) => write!(f, "unsupported sample precision: {p}-bit"),
        }
    }
}

impl std::error::Error for JpegError {}

pub type Result<T> = std::result::Result<T, JpegError>;
