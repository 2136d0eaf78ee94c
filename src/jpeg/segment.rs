// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/pixelvault-core

//! Marker segment walking and header parsing.
//!
//! Walks the marker stream from SOI to SOS, parsing the segments the codec
//! interprets (DQT, DHT, SOF0, SOS, DRI) and carrying everything else
//! (APPn, COM, ...) verbatim so serialization reproduces the header.

use super::coeff::{QuantTable, DEZIGZAG};
use super::error::{JpegError, Result};
use super::huffman::HuffmanSpec;

pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOF0: u8 = 0xC0;
pub const SOF2: u8 = 0xC2;
pub const DHT: u8 = 0xC4;
pub const DQT: u8 = 0xDB;
pub const DRI: u8 = 0xDD;
pub const SOS: u8 = 0xDA;
pub const APP0: u8 = 0xE0;
pub const COM: u8 = 0xFE;

/// A header segment kept for re-serialization.
/// `data` excludes the 0xFF/marker bytes and the 2-byte length field.
#[derive(Debug, Clone)]
pub struct MarkerSegment {
    pub marker: u8,
    pub data: Vec<u8>,
}

/// Walk markers from SOI until SOS.
///
/// Returns the segments in file order plus the byte offset of the first
/// entropy-coded scan byte. Frame types other than baseline SOF0 are
/// rejected here.
pub fn walk_header(data: &[u8]) -> Result<(Vec<MarkerSegment>, usize)> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != SOI {
        return Err(JpegError::NotAJpeg);
    }

    let mut segments = Vec::new();
    let mut pos = 2usize;

    loop {
        // Seek the next marker, tolerating fill 0xFF bytes.
        while pos < data.len() && data[pos] != 0xFF {
            pos += 1;
        }
        while pos + 1 < data.len() && data[pos + 1] == 0xFF {
            pos += 1;
        }
        if pos + 1 >= data.len() {
            return Err(JpegError::UnexpectedEof);
        }

        let marker = data[pos + 1];
        pos += 2;

        match marker {
            0x00 => continue, // stuffed byte outside scan data; skip
            EOI => return Err(JpegError::InvalidSegment("EOI before SOS")),
            m if (0xD0..=0xD7).contains(&m) => continue, // stray RST
            SOF2 => return Err(JpegError::ProgressiveUnsupported),
            m if is_unsupported_frame(m) => return Err(JpegError::UnsupportedMarker(m)),
            _ => {}
        }

        if pos + 2 > data.len() {
            return Err(JpegError::UnexpectedEof);
        }
        let length = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        if length < 2 || pos + length > data.len() {
            return Err(JpegError::InvalidSegment("segment length out of bounds"));
        }
        segments.push(MarkerSegment {
            marker,
            data: data[pos + 2..pos + length].to_vec(),
        });
        pos += length;

        if marker == SOS {
            return Ok((segments, pos));
        }
    }
}

fn is_unsupported_frame(marker: u8) -> bool {
    matches!(
        marker,
        0xC1 | 0xC3            // extended sequential, lossless
        | 0xC5..=0xC7          // differential
        | 0xC9..=0xCB          // arithmetic
        | 0xCD..=0xCF          // differential arithmetic
    )
}

/// One component declared in SOF0.
#[derive(Debug, Clone)]
pub struct Component {
    /// Component ID (conventionally 1=Y, 2=Cb, 3=Cr).
    pub id: u8,
    pub h_sampling: u8,
    pub v_sampling: u8,
    pub quant_table_id: u8,
}

/// Frame geometry parsed from SOF0.
#[derive(Debug, Clone)]
pub struct FrameInfo {
    pub width: u16,
    pub height: u16,
    pub components: Vec<Component>,
    pub max_h_sampling: u8,
    pub max_v_sampling: u8,
    pub mcus_wide: usize,
    pub mcus_tall: usize,
}

impl FrameInfo {
    pub fn blocks_wide(&self, comp_idx: usize) -> usize {
        self.mcus_wide * self.components[comp_idx].h_sampling as usize
    }

    pub fn blocks_tall(&self, comp_idx: usize) -> usize {
        self.mcus_tall * self.components[comp_idx].v_sampling as usize
    }
}

/// Parse an SOF0 segment body.
pub fn parse_sof(data: &[u8]) -> Result<FrameInfo> {
    if data.len() < 6 {
        return Err(JpegError::UnexpectedEof);
    }
    let precision = data[0];
    if precision != 8 {
        return Err(JpegError::UnsupportedPrecision(precision));
    }
    let height = u16::from_be_bytes([data[1], data[2]]);
    let width = u16::from_be_bytes([data[3], data[4]]);
    let num_components = data[5] as usize;

    if width == 0 || height == 0 || num_components == 0 || num_components > 4 {
        return Err(JpegError::InvalidDimensions);
    }
    if data.len() < 6 + num_components * 3 {
        return Err(JpegError::UnexpectedEof);
    }

    let mut components = Vec::with_capacity(num_components);
    let mut max_h = 0u8;
    let mut max_v = 0u8;
    for i in 0..num_components {
        let at = 6 + i * 3;
        let h_sampling = data[at + 1] >> 4;
        let v_sampling = data[at + 1] & 0x0F;
        let quant_table_id = data[at + 2];
        if h_sampling == 0 || v_sampling == 0 || h_sampling > 4 || v_sampling > 4 {
            return Err(JpegError::InvalidDimensions);
        }
        if quant_table_id > 3 {
            return Err(JpegError::InvalidSegment("quantization table ID out of range"));
        }
        max_h = max_h.max(h_sampling);
        max_v = max_v.max(v_sampling);
        components.push(Component {
            id: data[at],
            h_sampling,
            v_sampling,
            quant_table_id,
        });
    }

    let mcu_w = max_h as usize * 8;
    let mcu_h = max_v as usize * 8;
    Ok(FrameInfo {
        width,
        height,
        components,
        max_h_sampling: max_h,
        max_v_sampling: max_v,
        mcus_wide: (width as usize + mcu_w - 1) / mcu_w,
        mcus_tall: (height as usize + mcu_h - 1) / mcu_h,
    })
}

/// Build an SOF0 segment body.
pub fn sof_payload(frame: &FrameInfo) -> Vec<u8> {
    let mut out = Vec::with_capacity(6 + frame.components.len() * 3);
    out.push(8);
    out.extend_from_slice(&frame.height.to_be_bytes());
    out.extend_from_slice(&frame.width.to_be_bytes());
    out.push(frame.components.len() as u8);
    for comp in &frame.components {
        out.push(comp.id);
        out.push((comp.h_sampling << 4) | comp.v_sampling);
        out.push(comp.quant_table_id);
    }
    out
}

/// Parse a DQT segment body; one segment may define several tables.
pub fn parse_dqt(data: &[u8]) -> Result<Vec<(u8, QuantTable)>> {
    let mut tables = Vec::new();
    let mut pos = 0usize;

    while pos < data.len() {
        let precision = data[pos] >> 4;
        let id = data[pos] & 0x0F;
        pos += 1;
        if id > 3 {
            return Err(JpegError::InvalidSegment("quantization table ID out of range"));
        }

        let mut values = [0u16; 64];
        match precision {
            0 => {
                if pos + 64 > data.len() {
                    return Err(JpegError::UnexpectedEof);
                }
                for zi in 0..64 {
                    values[DEZIGZAG[zi]] = data[pos + zi] as u16;
                }
                pos += 64;
            }
            1 => {
                if pos + 128 > data.len() {
                    return Err(JpegError::UnexpectedEof);
                }
                for zi in 0..64 {
                    values[DEZIGZAG[zi]] =
                        u16::from_be_bytes([data[pos + zi * 2], data[pos + zi * 2 + 1]]);
                }
                pos += 128;
            }
            _ => return Err(JpegError::InvalidSegment("invalid DQT precision")),
        }
        tables.push((id, QuantTable::new(values)));
    }
    Ok(tables)
}

/// Build a DQT segment body for one 8-bit table.
pub fn dqt_payload(id: u8, qt: &QuantTable) -> Vec<u8> {
    debug_assert!(qt.values.iter().all(|&v| v <= 255), "8-bit DQT expected");
    let mut out = Vec::with_capacity(65);
    out.push(id & 0x0F);
    for zi in 0..64 {
        out.push(qt.values[DEZIGZAG[zi]] as u8);
    }
    out
}

/// Parse a DHT segment body; one segment may define several tables.
pub fn parse_dht(data: &[u8]) -> Result<Vec<HuffmanSpec>> {
    let mut specs = Vec::new();
    let mut pos = 0usize;

    while pos < data.len() {
        let class = data[pos] >> 4;
        let id = data[pos] & 0x0F;
        pos += 1;
        if class > 1 || id > 3 {
            return Err(JpegError::InvalidSegment("Huffman table class/ID out of range"));
        }
        if pos + 16 > data.len() {
            return Err(JpegError::UnexpectedEof);
        }
        let mut bits = [0u8; 16];
        bits.copy_from_slice(&data[pos..pos + 16]);
        pos += 16;

        let total: usize = bits.iter().map(|&n| n as usize).sum();
        if pos + total > data.len() {
            return Err(JpegError::UnexpectedEof);
        }
        specs.push(HuffmanSpec {
            class,
            id,
            bits,
            huffval: data[pos..pos + total].to_vec(),
        });
        pos += total;
    }
    Ok(specs)
}

/// Component selectors from an SOS header: (component_id, dc_table, ac_table).
pub fn parse_sos(data: &[u8]) -> Result<Vec<(u8, u8, u8)>> {
    if data.is_empty() {
        return Err(JpegError::InvalidSegment("empty SOS"));
    }
    let num = data[0] as usize;
    if num == 0 || num > 4 || data.len() < 1 + num * 2 + 3 {
        return Err(JpegError::InvalidSegment("malformed SOS header"));
    }
    Ok((0..num)
        .map(|i| {
            let at = 1 + i * 2;
            (data[at], data[at + 1] >> 4, data[at + 1] & 0x0F)
        })
        .collect())
}

/// Build an SOS segment body for a full baseline scan.
/// `selectors` are (component_id, dc_table, ac_table) triples.
pub fn sos_payload(selectors: &[(u8, u8, u8)]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + selectors.len() * 2 + 3);
    out.push(selectors.len() as u8);
    for &(id, dc, ac) in selectors {
        out.push(id);
        out.push((dc << 4) | ac);
    }
    out.extend_from_slice(&[0, 63, 0]); // Ss, Se, Ah/Al for baseline
    out
}

/// Parse a DRI segment body.
pub fn parse_dri(data: &[u8]) -> Result<u16> {
    if data.len() < 2 {
        return Err(JpegError::UnexpectedEof);
    }
    Ok(u16::from_be_bytes([data[0], data[1]]))
}

/// The minimal JFIF APP0 body (version 1.1, no thumbnail, 1:1 density).
pub fn jfif_app0_payload() -> Vec<u8> {
    vec![b'J', b'F', b'I', b'F', 0, 1, 1, 0, 0, 1, 0, 1, 0, 0]
}
