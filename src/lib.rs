// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/pixelvault-core

//! # pixelvault-core
//!
//! Steganography engine for hiding an arbitrary byte payload inside a
//! carrier image so that the image stays visually unchanged and the data
//! survives the carrier's native storage format. Two carrier domains:
//!
//! - **Pixel** (PNG/BMP): one payload bit per RGB channel sample,
//!   least-significant-bit embedding in raster order. Output is PNG.
//! - **JPEG**: one payload bit per usable non-zero luminance AC
//!   coefficient, written in the quantized DCT domain so it survives the
//!   (lossy) JPEG save cycle. The coefficient codec (`jpeg` module) is
//!   std-only and round-trips baseline files losslessly.
//!
//! Payloads are wrapped in a tagged, terminator-delimited frame
//! (`PV:1.0:E|...` / `JPG:1.0:P|...`) and optionally encrypted with
//! AES-256-CBC under a PBKDF2-derived key. Calls are synchronous and share
//! no state; distinct carriers can be processed fully in parallel.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use pixelvault_core::{encode, decode, CarrierKind, Payload};
//!
//! let cover = std::fs::read("photo.png").unwrap();
//! let stego = encode(&cover, CarrierKind::Pixel, b"meet at noon", Some("passphrase")).unwrap();
//! match decode(&stego, CarrierKind::Pixel, Some("passphrase")).unwrap() {
//!     Payload::Message(bytes) => assert_eq!(bytes, b"meet at noon"),
//!     _ => unreachable!(),
//! }
//! ```

pub mod jpeg;
pub mod pixel;
pub mod stego;

pub use jpeg::error::{JpegError, Result as JpegResult};
pub use jpeg::coeff::{CoeffGrid, QuantTable};
pub use jpeg::JpegImage;
pub use stego::{capacity, decode, encode, encode_file};
pub use stego::{CapacityReport, Carrier, CarrierKind, FilePayload, Payload, StegoError};
