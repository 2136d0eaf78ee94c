// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/pixelvault-core

//! Baseline scan data decoding and re-encoding.
//!
//! Decodes the entropy-coded bytes of a single interleaved baseline scan
//! into one [`CoeffGrid`] per component, and encodes modified grids back.
//! DC prediction and restart markers are handled on both sides; the
//! decode/encode pair is lossless, which is what lets an LSB written into a
//! coefficient survive the save cycle.

use super::bitio::{BitReader, BitWriter};
use super::coeff::{CoeffGrid, DEZIGZAG, ZIGZAG};
use super::error::{JpegError, Result};
use super::huffman::{extend, magnitude, HuffmanDecoder, HuffmanEncoder};
use super::segment::FrameInfo;
use super::huffman::HuffmanSpec;

/// One component's role in the scan.
#[derive(Debug, Clone)]
pub struct ScanComponent {
    /// Index into `FrameInfo::components`.
    pub comp_idx: usize,
    /// DC Huffman table ID.
    pub dc_table: usize,
    /// AC Huffman table ID.
    pub ac_table: usize,
}

fn decoder_for(specs: &[Option<HuffmanSpec>; 4], id: usize) -> Result<HuffmanDecoder> {
    let spec = specs[id]
        .as_ref()
        .ok_or(JpegError::MissingHuffmanTable(id as u8))?;
    HuffmanDecoder::new(spec)
}

fn encoder_for(specs: &[Option<HuffmanSpec>; 4], id: usize) -> Result<HuffmanEncoder> {
    let spec = specs[id]
        .as_ref()
        .ok_or(JpegError::MissingHuffmanTable(id as u8))?;
    Ok(HuffmanEncoder::new(spec))
}

/// Decode one 8x8 block into natural order, updating the DC predictor.
fn decode_block(
    reader: &mut BitReader,
    dc: &HuffmanDecoder,
    ac: &HuffmanDecoder,
    dc_pred: &mut i32,
) -> Result<[i16; 64]> {
    let mut zz = [0i16; 64];

    let dc_size = dc.decode(reader)?;
    if dc_size > 0 {
        let bits = reader.read_bits(dc_size)?;
        *dc_pred += extend(bits, dc_size) as i32;
    }
    zz[0] = (*dc_pred).clamp(i16::MIN as i32, i16::MAX as i32) as i16;

    let mut k = 1usize;
    while k < 64 {
        let rs = ac.decode(reader)?;
        let run = (rs >> 4) as usize;
        let size = rs & 0x0F;
        if size == 0 {
            if run == 15 {
                k += 16; // ZRL
                continue;
            }
            break; // EOB
        }
        k += run;
        if k > 63 {
            return Err(JpegError::HuffmanDecode);
        }
        let bits = reader.read_bits(size)?;
        zz[k] = extend(bits, size);
        k += 1;
    }

    let mut block = [0i16; 64];
    for zi in 0..64 {
        block[DEZIGZAG[zi]] = zz[zi];
    }
    Ok(block)
}

/// Encode one 8x8 block from natural order, updating the DC predictor.
fn encode_block(
    writer: &mut BitWriter,
    dc: &HuffmanEncoder,
    ac: &HuffmanEncoder,
    dc_pred: &mut i32,
    block: &[i16],
) -> Result<()> {
    let mut zz = [0i16; 64];
    for ni in 0..64 {
        zz[ZIGZAG[ni]] = block[ni];
    }

    let diff = (zz[0] as i32 - *dc_pred) as i16;
    *dc_pred = zz[0] as i32;
    let (dc_bits, dc_size) = magnitude(diff);
    let (code, len) = dc.encode(dc_size)?;
    writer.write_bits(code, len);
    if dc_size > 0 {
        writer.write_bits(dc_bits, dc_size);
    }

    let mut k = 1usize;
    while k < 64 {
        let mut run = 0usize;
        while k + run < 64 && zz[k + run] == 0 {
            run += 1;
        }
        if k + run == 64 {
            let (code, len) = ac.encode(0x00)?; // EOB
            writer.write_bits(code, len);
            break;
        }
        while run >= 16 {
            let (code, len) = ac.encode(0xF0)?; // ZRL
            writer.write_bits(code, len);
            run -= 16;
            k += 16;
        }
        k += run;
        let (ac_bits, ac_size) = magnitude(zz[k]);
        let (code, len) = ac.encode(((run as u8) << 4) | ac_size)?;
        writer.write_bits(code, len);
        writer.write_bits(ac_bits, ac_size);
        k += 1;
    }
    Ok(())
}

/// Decode the full interleaved scan into one grid per scan component.
pub fn decode_scan(
    data: &[u8],
    scan_start: usize,
    frame: &FrameInfo,
    scan_components: &[ScanComponent],
    dc_specs: &[Option<HuffmanSpec>; 4],
    ac_specs: &[Option<HuffmanSpec>; 4],
    restart_interval: u16,
) -> Result<Vec<CoeffGrid>> {
    let mut dc_tables: Vec<HuffmanDecoder> = Vec::with_capacity(scan_components.len());
    let mut ac_tables: Vec<HuffmanDecoder> = Vec::with_capacity(scan_components.len());
    for sc in scan_components {
        dc_tables.push(decoder_for(dc_specs, sc.dc_table)?);
        ac_tables.push(decoder_for(ac_specs, sc.ac_table)?);
    }

    let mut grids: Vec<CoeffGrid> = scan_components
        .iter()
        .map(|sc| CoeffGrid::new(frame.blocks_wide(sc.comp_idx), frame.blocks_tall(sc.comp_idx)))
        .collect();

    let mut reader = BitReader::new(data, scan_start);
    let mut dc_pred = vec![0i32; scan_components.len()];
    let mut mcu_index = 0usize;

    for mcu_row in 0..frame.mcus_tall {
        for mcu_col in 0..frame.mcus_wide {
            if restart_interval > 0
                && mcu_index > 0
                && mcu_index % restart_interval as usize == 0
            {
                reader.sync_restart()?;
                dc_pred.iter_mut().for_each(|p| *p = 0);
            }

            for (sci, sc) in scan_components.iter().enumerate() {
                let comp = &frame.components[sc.comp_idx];
                for v in 0..comp.v_sampling as usize {
                    for h in 0..comp.h_sampling as usize {
                        let br = mcu_row * comp.v_sampling as usize + v;
                        let bc = mcu_col * comp.h_sampling as usize + h;
                        let block =
                            decode_block(&mut reader, &dc_tables[sci], &ac_tables[sci], &mut dc_pred[sci])?;
                        grids[sci].block_mut(br, bc).copy_from_slice(&block);
                    }
                }
            }
            mcu_index += 1;
        }
    }

    Ok(grids)
}

/// Re-encode grids to entropy-coded scan bytes (restart markers included).
pub fn encode_scan(
    frame: &FrameInfo,
    scan_components: &[ScanComponent],
    grids: &[CoeffGrid],
    dc_specs: &[Option<HuffmanSpec>; 4],
    ac_specs: &[Option<HuffmanSpec>; 4],
    restart_interval: u16,
) -> Result<Vec<u8>> {
    let mut dc_tables: Vec<HuffmanEncoder> = Vec::with_capacity(scan_components.len());
    let mut ac_tables: Vec<HuffmanEncoder> = Vec::with_capacity(scan_components.len());
    for sc in scan_components {
        dc_tables.push(encoder_for(dc_specs, sc.dc_table)?);
        ac_tables.push(encoder_for(ac_specs, sc.ac_table)?);
    }

    let mut writer = BitWriter::new();
    let mut dc_pred = vec![0i32; scan_components.len()];
    let mut mcu_index = 0usize;
    let mut restart_count = 0u8;

    for mcu_row in 0..frame.mcus_tall {
        for mcu_col in 0..frame.mcus_wide {
            if restart_interval > 0
                && mcu_index > 0
                && mcu_index % restart_interval as usize == 0
            {
                writer.emit_marker(0xD0 + (restart_count % 8));
                restart_count = restart_count.wrapping_add(1);
                dc_pred.iter_mut().for_each(|p| *p = 0);
            }

            for (sci, sc) in scan_components.iter().enumerate() {
                let comp = &frame.components[sc.comp_idx];
                for v in 0..comp.v_sampling as usize {
                    for h in 0..comp.h_sampling as usize {
                        let br = mcu_row * comp.v_sampling as usize + v;
                        let bc = mcu_col * comp.h_sampling as usize + h;
                        encode_block(
                            &mut writer,
                            &dc_tables[sci],
                            &ac_tables[sci],
                            &mut dc_pred[sci],
                            grids[sci].block(br, bc),
                        )?;
                    }
                }
            }
            mcu_index += 1;
        }
    }

    Ok(writer.finish())
}
