// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/pixelvault-core

//! Error types for the embedding engine.
//!
//! [`StegoError`] covers all failure modes from carrier decoding through
//! frame extraction and decryption. Every variant is terminal for its
//! call; nothing is retried and nothing is downgraded to a success.

use core::fmt;

use crate::jpeg::error::JpegError;

/// Errors that can occur while encoding or decoding hidden payloads.
#[derive(Debug)]
pub enum StegoError {
    /// The carrier could not be parsed as a baseline JPEG.
    InvalidJpeg(JpegError),
    /// The carrier could not be decoded as a lossless raster image.
    UnsupportedCarrier(image::ImageError),
    /// The payload to hide is empty.
    EmptyMessage,
    /// The payload does not fit the carrier. Reported before any carrier
    /// mutation; encode is all-or-nothing.
    InsufficientCapacity {
        /// Payload bytes that were asked for.
        needed: usize,
        /// Payload bytes the carrier can hold after frame overhead.
        available: usize,
    },
    /// Extracted data carries no recognized format tag. The carrier most
    /// likely holds no hidden data.
    UnknownFormat,
    /// A recognized tag was found but the carrier was exhausted before the
    /// end-of-data terminator. Truncated or corrupted carrier.
    TerminatorNotFound,
    /// The frame says the payload is encrypted and no password was given.
    PasswordRequired,
    /// Decryption failed: wrong password or corrupted data. The scheme
    /// carries no MAC, so PKCS#7 padding validation is the only signal and
    /// the two causes cannot be told apart.
    Authentication,
    /// A bit stream whose length is not a multiple of 8 was handed to the
    /// bit packer.
    TruncatedData,
    /// File payloads need a non-empty filename of at most 255 bytes
    /// without `|`.
    InvalidFilename,
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJpeg(e) => write!(f, "invalid JPEG carrier: {e}"),
            Self::UnsupportedCarrier(e) => write!(f, "unsupported carrier image: {e}"),
            Self::EmptyMessage => write!(f, "nothing to hide: payload is empty"),
            Self::InsufficientCapacity { needed, available } => {
                write!(f, "payload too large: {needed} bytes, carrier holds {available}")
            }
            Self::UnknownFormat => write!(f, "no hidden data: unrecognized format tag"),
            Self::TerminatorNotFound => write!(f, "no terminator found: carrier truncated or empty"),
            Self::PasswordRequired => write!(f, "payload is encrypted: password required"),
            Self::Authentication => write!(f, "wrong password or corrupted data"),
            Self::TruncatedData => write!(f, "bit count is not a multiple of 8"),
            Self::InvalidFilename => write!(f, "invalid filename for file payload"),
        }
    }
}

impl std::error::Error for StegoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidJpeg(e) => Some(e),
            Self::UnsupportedCarrier(e) => Some(e),
            _ => None,
        }
    }
}

impl From<JpegError> for StegoError {
    fn from(e: JpegError) -> Self {
        Self::InvalidJpeg(e)
    }
}
