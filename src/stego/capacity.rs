// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/pixelvault-core

//! Capacity planning: how many payload bytes fit a given carrier.
//!
//! Each embeddable unit holds one bit, so the raw byte capacity is
//! `floor(units / 8)`; the frame tag, the terminator and (for encrypted
//! payloads) the embedded salt/IV plus PKCS#7 padding come off the top.
//! The check runs before any carrier mutation, so encode is
//! all-or-nothing.

use crate::stego::carrier::CarrierKind;
use crate::stego::crypto;
use crate::stego::error::StegoError;
use crate::stego::frame;

/// Capacity of one carrier as reported by the public query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReport {
    /// Embeddable units in the carrier (one bit each).
    pub total_units: usize,
    /// Frame overhead in bytes for an unencrypted message (tag +
    /// terminator). Encryption adds 32 bytes of salt/IV plus padding.
    pub overhead_bytes: usize,
    /// Message bytes that fit without encryption.
    pub usable_bytes: usize,
}

/// Usable payload bytes for a carrier of `total_units` units after
/// `overhead_bytes` of framing.
pub fn plan(total_units: usize, overhead_bytes: usize) -> usize {
    (total_units / 8).saturating_sub(overhead_bytes)
}

/// Exact frame overhead for a payload of `payload_len` bytes behind a tag
/// of `tag_len` bytes: everything in the frame that is not payload.
pub fn frame_overhead(
    kind: CarrierKind,
    tag_len: usize,
    payload_len: usize,
    encrypted: bool,
) -> usize {
    let body_growth = if encrypted {
        crypto::HEADER_OVERHEAD + (crypto::padded_len(payload_len) - payload_len)
    } else {
        0
    };
    tag_len + frame::terminator(kind).len() + body_growth
}

/// Reject payloads that cannot fit before anything is written.
pub fn ensure_fits(
    payload_len: usize,
    total_units: usize,
    overhead_bytes: usize,
) -> Result<(), StegoError> {
    let available = plan(total_units, overhead_bytes);
    if payload_len > available {
        return Err(StegoError::InsufficientCapacity {
            needed: payload_len,
            available,
        });
    }
    Ok(())
}

/// The report for the public capacity query. Overhead is quoted for an
/// unencrypted message; encryption costs 32 more bytes plus padding.
pub fn report(kind: CarrierKind, total_units: usize) -> CapacityReport {
    let overhead_bytes = frame::message_tag(kind, false).len() + frame::terminator(kind).len();
    CapacityReport {
        total_units,
        overhead_bytes,
        usable_bytes: plan(total_units, overhead_bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_floors_and_saturates() {
        assert_eq!(plan(30_000, 16), 3734);
        assert_eq!(plan(7, 0), 0);
        assert_eq!(plan(64, 100), 0);
    }

    #[test]
    fn pixel_100x100_scenario() {
        // 100x100 RGB: 30,000 units, about 3.75 KB raw.
        let report = report(CarrierKind::Pixel, 100 * 100 * 3);
        assert_eq!(report.total_units, 30_000);
        assert_eq!(report.overhead_bytes, "PV:1.0:P|".len() + "<<END>>".len());
        assert_eq!(report.usable_bytes, 3750 - 16);
    }

    #[test]
    fn encryption_adds_header_and_padding() {
        let kind = CarrierKind::Pixel;
        let tag_len = frame::message_tag(kind, true).len();
        let plain = frame_overhead(kind, tag_len, 5, false);
        let encrypted = frame_overhead(kind, tag_len, 5, true);
        // Salt + IV is 32 bytes; a 5-byte payload pads to 16, adding 11.
        assert_eq!(encrypted - plain, 32 + 11);
    }

    #[test]
    fn exact_fit_accepted_one_more_rejected() {
        let kind = CarrierKind::Pixel;
        let units = 1024 * 8;
        let overhead = frame_overhead(kind, frame::message_tag(kind, false).len(), 0, false);
        let usable = plan(units, overhead);
        assert!(ensure_fits(usable, units, overhead).is_ok());
        assert!(matches!(
            ensure_fits(usable + 1, units, overhead),
            Err(StegoError::InsufficientCapacity { needed, available })
                if needed == usable + 1 && available == usable
        ));
    }

    #[test]
    fn jpeg_overhead_uses_family_constants() {
        let report = report(CarrierKind::Jpeg, 8000);
        assert_eq!(report.overhead_bytes, "JPG:1.0:P|".len() + "<<JPEG_END>>".len());
        assert_eq!(report.usable_bytes, 1000 - 22);
    }
}
