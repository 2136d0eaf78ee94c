// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/pixelvault-core

//! Canonical Huffman coding for JPEG entropy data.
//!
//! Decoding follows the ITU-T T.81 F.2.2.3 procedure (MINCODE / MAXCODE /
//! VALPTR walk), encoding uses a flat symbol table. The Annex K "typical"
//! tables are included: they contain a code for every symbol legal in a
//! baseline scan, which makes them a universal fallback when coefficient
//! edits introduce categories absent from a file's original tables.

use super::bitio::BitReader;
use super::error::{JpegError, Result};

/// A Huffman table as declared in a DHT segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanSpec {
    /// Table class: 0 = DC, 1 = AC.
    pub class: u8,
    /// Table ID (0-3).
    pub id: u8,
    /// bits[i] = number of codes of length i+1.
    pub bits: [u8; 16],
    /// Symbol values, in order of increasing code length.
    pub huffval: Vec<u8>,
}

impl HuffmanSpec {
    /// Serialize to the DHT payload form: Tc/Th byte, 16 counts, symbols.
    pub fn dht_payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + 16 + self.huffval.len());
        out.push((self.class << 4) | (self.id & 0x0F));
        out.extend_from_slice(&self.bits);
        out.extend_from_slice(&self.huffval);
        out
    }
}

/// Decoder state per T.81 F.2.2.3.
pub struct HuffmanDecoder {
    /// Smallest code of each length (index 1-16); meaningless where empty.
    mincode: [i32; 17],
    /// Largest code of each length, or -1 where the length has no codes.
    maxcode: [i32; 17],
    /// Index into `huffval` of the first symbol of each length.
    valptr: [usize; 17],
    huffval: Vec<u8>,
}

impl HuffmanDecoder {
    pub fn new(spec: &HuffmanSpec) -> Result<Self> {
        let total: usize = spec.bits.iter().map(|&n| n as usize).sum();
        if total != spec.huffval.len() || total == 0 || total > 256 {
            return Err(JpegError::InvalidSegment("DHT symbol count mismatch"));
        }

        let mut mincode = [0i32; 17];
        let mut maxcode = [-1i32; 17];
        let mut valptr = [0usize; 17];

        let mut code = 0i32;
        let mut k = 0usize;
        for len in 1..=16usize {
            let n = spec.bits[len - 1] as usize;
            if n > 0 {
                valptr[len] = k;
                mincode[len] = code;
                code += n as i32;
                maxcode[len] = code - 1;
                k += n;
            }
            code <<= 1;
        }

        Ok(Self {
            mincode,
            maxcode,
            valptr,
            huffval: spec.huffval.clone(),
        })
    }

    /// Decode one symbol from the bit stream.
    pub fn decode(&self, reader: &mut BitReader) -> Result<u8> {
        let mut code = reader.next_bit()? as i32;
        for len in 1..=16usize {
            if self.maxcode[len] >= 0 && code <= self.maxcode[len] {
                let idx = self.valptr[len] + (code - self.mincode[len]) as usize;
                return self.huffval.get(idx).copied().ok_or(JpegError::HuffmanDecode);
            }
            code = (code << 1) | reader.next_bit()? as i32;
        }
        Err(JpegError::HuffmanDecode)
    }
}

/// Encoder: symbol -> (code, length). Length 0 marks an absent symbol.
pub struct HuffmanEncoder {
    codes: [(u16, u8); 256],
}

impl HuffmanEncoder {
    pub fn new(spec: &HuffmanSpec) -> Self {
        let mut codes = [(0u16, 0u8); 256];
        let mut code = 0u32;
        let mut k = 0usize;
        for len in 1..=16u8 {
            for _ in 0..spec.bits[(len - 1) as usize] {
                if let Some(&sym) = spec.huffval.get(k) {
                    codes[sym as usize] = (code as u16, len);
                }
                k += 1;
                code += 1;
            }
            code <<= 1;
        }
        Self { codes }
    }

    /// Code for `symbol`, or [`JpegError::MissingHuffmanCode`] if the table
    /// cannot express it.
    pub fn encode(&self, symbol: u8) -> Result<(u16, u8)> {
        match self.codes[symbol as usize] {
            (_, 0) => Err(JpegError::MissingHuffmanCode),
            found => Ok(found),
        }
    }
}

/// Recover a signed value from its magnitude-category representation
/// (T.81 Table F.1 EXTEND).
pub fn extend(bits: u16, size: u8) -> i16 {
    if size == 0 {
        return 0;
    }
    if (bits as u32) < (1u32 << (size - 1)) {
        (bits as i32 - (1i32 << size) + 1) as i16
    } else {
        bits as i16
    }
}

/// Split a signed value into (magnitude bits, category size).
/// Negative values use the one's-complement form mandated by T.81.
pub fn magnitude(value: i16) -> (u16, u8) {
    if value == 0 {
        return (0, 0);
    }
    let size = (16 - value.unsigned_abs().leading_zeros()) as u8;
    let mask = ((1u32 << size) - 1) as u16;
    let bits = if value > 0 {
        value as u16
    } else {
        (value - 1) as u16
    };
    (bits & mask, size)
}

// Annex K "typical" tables. Together they cover every symbol a legal
// baseline scan can produce: DC categories 0-11, AC run/size pairs with
// size 1-10, EOB and ZRL.

/// Standard luminance DC table (Annex K.3).
pub fn std_dc_luma() -> HuffmanSpec {
    HuffmanSpec {
        class: 0,
        id: 0,
        bits: [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
        huffval: (0..=11).collect(),
    }
}

/// Standard chrominance DC table (Annex K.4).
pub fn std_dc_chroma() -> HuffmanSpec {
    HuffmanSpec {
        class: 0,
        id: 1,
        bits: [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0],
        huffval: (0..=11).collect(),
    }
}

/// Standard luminance AC table (Annex K.5).
pub fn std_ac_luma() -> HuffmanSpec {
    HuffmanSpec {
        class: 1,
        id: 0,
        bits: [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 0x7D],
        huffval: vec![
            0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12,
            0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07,
            0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xA1, 0x08,
            0x23, 0x42, 0xB1, 0xC1, 0x15, 0x52, 0xD1, 0xF0,
            0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0A, 0x16,
            0x17, 0x18, 0x19, 0x1A, 0x25, 0x26, 0x27, 0x28,
            0x29, 0x2A, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39,
            0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
            0x4A, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59,
            0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69,
            0x6A, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79,
            0x7A, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89,
            0x8A, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98,
            0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7,
            0xA8, 0xA9, 0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6,
            0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3, 0xC4, 0xC5,
            0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3, 0xD4,
            0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xE1, 0xE2,
            0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA,
            0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8,
            0xF9, 0xFA,
        ],
    }
}

/// Standard chrominance AC table (Annex K.6).
pub fn std_ac_chroma() -> HuffmanSpec {
    HuffmanSpec {
        class: 1,
        id: 1,
        bits: [0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 0x77],
        huffval: vec![
            0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21,
            0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61, 0x71,
            0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91,
            0xA1, 0xB1, 0xC1, 0x09, 0x23, 0x33, 0x52, 0xF0,
            0x15, 0x62, 0x72, 0xD1, 0x0A, 0x16, 0x24, 0x34,
            0xE1, 0x25, 0xF1, 0x17, 0x18, 0x19, 0x1A, 0x26,
            0x27, 0x28, 0x29, 0x2A, 0x35, 0x36, 0x37, 0x38,
            0x39, 0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48,
            0x49, 0x4A, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58,
            0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68,
            0x69, 0x6A, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78,
            0x79, 0x7A, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87,
            0x88, 0x89, 0x8A, 0x92, 0x93, 0x94, 0x95, 0x96,
            0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5,
            0xA6, 0xA7, 0xA8, 0xA9, 0xAA, 0xB2, 0xB3, 0xB4,
            0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3,
            0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xD2,
            0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA,
            0xE2, 0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9,
            0xEA, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8,
            0xF9, 0xFA,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jpeg::bitio::BitWriter;

    fn roundtrip_all_symbols(spec: &HuffmanSpec) {
        let enc = HuffmanEncoder::new(spec);
        let dec = HuffmanDecoder::new(spec).unwrap();

        for &sym in &spec.huffval {
            let (code, len) = enc.encode(sym).unwrap();
            let mut w = BitWriter::new();
            w.write_bits(code, len);
            // Trailing pad bits so a short code has bytes to read from.
            w.write_bits(0, 16);
            let bytes = w.finish();

            let mut r = BitReader::new(&bytes, 0);
            assert_eq!(dec.decode(&mut r).unwrap(), sym, "symbol 0x{sym:02X}");
        }
    }

    #[test]
    fn standard_tables_roundtrip() {
        roundtrip_all_symbols(&std_dc_luma());
        roundtrip_all_symbols(&std_dc_chroma());
        roundtrip_all_symbols(&std_ac_luma());
        roundtrip_all_symbols(&std_ac_chroma());
    }

    #[test]
    fn standard_table_symbol_counts() {
        assert_eq!(std_dc_luma().huffval.len(), 12);
        assert_eq!(std_dc_chroma().huffval.len(), 12);
        assert_eq!(std_ac_luma().huffval.len(), 162);
        assert_eq!(std_ac_chroma().huffval.len(), 162);
        // bits[] must agree with the symbol list.
        for spec in [std_dc_luma(), std_dc_chroma(), std_ac_luma(), std_ac_chroma()] {
            let total: usize = spec.bits.iter().map(|&n| n as usize).sum();
            assert_eq!(total, spec.huffval.len());
        }
    }

    #[test]
    fn std_ac_tables_cover_all_baseline_symbols() {
        // Every run (0-15) with size 1-10, plus EOB (0x00) and ZRL (0xF0).
        for spec in [std_ac_luma(), std_ac_chroma()] {
            let enc = HuffmanEncoder::new(&spec);
            assert!(enc.encode(0x00).is_ok(), "EOB");
            assert!(enc.encode(0xF0).is_ok(), "ZRL");
            for run in 0..16u8 {
                for size in 1..=10u8 {
                    let rs = (run << 4) | size;
                    assert!(enc.encode(rs).is_ok(), "run/size 0x{rs:02X}");
                }
            }
        }
    }

    #[test]
    fn missing_symbol_is_reported() {
        let enc = HuffmanEncoder::new(&std_dc_luma());
        assert_eq!(enc.encode(0x99), Err(JpegError::MissingHuffmanCode));
    }

    #[test]
    fn extend_magnitude_roundtrip() {
        for v in -1023i16..=1023 {
            let (bits, size) = magnitude(v);
            assert_eq!(extend(bits, size), v, "value {v}");
        }
    }

    #[test]
    fn magnitude_categories() {
        assert_eq!(magnitude(0), (0, 0));
        assert_eq!(magnitude(1), (1, 1));
        assert_eq!(magnitude(-1), (0, 1));
        assert_eq!(magnitude(3), (3, 2));
        assert_eq!(magnitude(-3), (0, 2));
        assert_eq!(magnitude(1023).1, 10);
        assert_eq!(magnitude(-1023).1, 10);
    }

    #[test]
    fn inconsistent_spec_rejected() {
        let spec = HuffmanSpec {
            class: 0,
            id: 0,
            bits: [0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            huffval: vec![1], // claims 2 codes, lists 1 symbol
        };
        assert!(HuffmanDecoder::new(&spec).is_err());
    }
}
