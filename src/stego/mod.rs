// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/pixelvault-core

//! The embedding engine.
//!
//! Composition, leaves first: [`bits`] packs bytes to bit streams,
//! [`crypto`] is the optional confidentiality layer, [`frame`] wraps the
//! payload in the tagged wire format, [`carrier`] abstracts the two
//! embedding domains, [`capacity`] does the byte accounting, and
//! [`pipeline`] wires them into the public encode/decode/capacity calls.
//!
//! Every call is a synchronous, self-contained transformation: it owns its
//! carrier copy and crypto context and shares nothing with concurrent
//! calls, so callers may run any number of them in parallel.

pub mod bits;
pub mod capacity;
pub mod carrier;
pub mod crypto;
pub mod error;
pub mod frame;
pub mod pipeline;

pub use capacity::CapacityReport;
pub use carrier::{Carrier, CarrierKind};
pub use error::StegoError;
pub use pipeline::{capacity, decode, encode, encode_file, FilePayload, Payload};
