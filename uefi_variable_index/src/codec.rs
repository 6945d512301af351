/***************************************************************************************************
 * Copyright (c) 2022, Qualcomm Innovation Center, Inc. All rights reserved.
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the “Software”), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice (including the next
 * paragraph) shall be included in all copies or substantial portions of the
 * Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
//! On-disk encoding for a single [`VariableMetadata`] plus its optional
//! constraints, used by [`crate::VariableIndex::dump`] and `::restore`.
//!
//! This is a from-scratch little-endian layout, not a byte-for-byte mirror
//! of the original `struct variable_metadata` (which relied on C struct
//! padding this reimplementation has no reason to reproduce). Fixed header
//! (guid + timestamp + fingerprint + name length) is 66 bytes, followed by
//! the name itself, then attributes and uid.

use crate::guid::{EfiTime, Guid};
use crate::metadata::{VariableMetadata, FINGERPRINT_SIZE};
use uefi_variable_checker::VariableConstraints;

const FIXED_HEADER_SIZE: usize = 16 + 16 + FINGERPRINT_SIZE + 2;
const TRAILER_SIZE: usize = 4 + 8;
const CONSTRAINTS_SIZE: usize = 2 + 2 + 4 + 8 + 8;

pub fn encode_metadata(buf: &mut Vec<u8>, metadata: &VariableMetadata) {
    buf.extend_from_slice(&metadata.guid.0);
    encode_time(buf, &metadata.timestamp);
    buf.extend_from_slice(&metadata.fingerprint);
    buf.extend_from_slice(&(metadata.name_size_bytes() as u16).to_le_bytes());
    for unit in &metadata.name {
        buf.extend_from_slice(&unit.to_le_bytes());
    }
    buf.extend_from_slice(&metadata.attributes.to_le_bytes());
    buf.extend_from_slice(&metadata.uid.to_le_bytes());
}

/// Decodes one metadata record. Returns `None` if `data` doesn't hold a
/// complete record, mirroring the original's "not a whole number of
/// `variable_metadata` structs" early-exit from restore.
pub fn decode_metadata(data: &[u8]) -> Option<(VariableMetadata, usize)> {
    if data.len() < FIXED_HEADER_SIZE {
        return None;
    }
    let mut pos = 0;
    let mut guid_bytes = [0u8; 16];
    guid_bytes.copy_from_slice(&data[pos..pos + 16]);
    pos += 16;

    let timestamp = decode_time(&data[pos..pos + 16]);
    pos += 16;

    let mut fingerprint = [0u8; FINGERPRINT_SIZE];
    fingerprint.copy_from_slice(&data[pos..pos + FINGERPRINT_SIZE]);
    pos += FINGERPRINT_SIZE;

    let name_size_bytes = u16::from_le_bytes([data[pos], data[pos + 1]]) as usize;
    pos += 2;

    if data.len() < pos + name_size_bytes + TRAILER_SIZE {
        return None;
    }
    let name_units = name_size_bytes / 2;
    let mut name = Vec::with_capacity(name_units);
    for i in 0..name_units {
        let off = pos + i * 2;
        name.push(u16::from_le_bytes([data[off], data[off + 1]]));
    }
    pos += name_size_bytes;

    let attributes = u32::from_le_bytes(data[pos..pos + 4].try_into().unwrap());
    pos += 4;
    let uid = u64::from_le_bytes(data[pos..pos + 8].try_into().unwrap());
    pos += 8;

    Some((
        VariableMetadata {
            guid: Guid::new(guid_bytes),
            timestamp,
            fingerprint,
            name,
            attributes,
            uid,
        },
        pos,
    ))
}

fn encode_time(buf: &mut Vec<u8>, t: &EfiTime) {
    buf.extend_from_slice(&t.year.to_le_bytes());
    buf.push(t.month);
    buf.push(t.day);
    buf.push(t.hour);
    buf.push(t.minute);
    buf.push(t.second);
    buf.push(t.pad1);
    buf.extend_from_slice(&t.nanosecond.to_le_bytes());
    buf.extend_from_slice(&t.time_zone.to_le_bytes());
    buf.push(t.daylight);
    buf.push(t.pad2);
}

fn decode_time(data: &[u8]) -> EfiTime {
    EfiTime {
        year: u16::from_le_bytes([data[0], data[1]]),
        month: data[2],
        day: data[3],
        hour: data[4],
        minute: data[5],
        second: data[6],
        pad1: data[7],
        nanosecond: u32::from_le_bytes(data[8..12].try_into().unwrap()),
        time_zone: i16::from_le_bytes([data[12], data[13]]),
        daylight: data[14],
        pad2: data[15],
    }
}

pub fn encode_constraints(buf: &mut Vec<u8>, c: &VariableConstraints) {
    buf.extend_from_slice(&c.revision.to_le_bytes());
    buf.extend_from_slice(&c.property.to_le_bytes());
    buf.extend_from_slice(&c.attributes.to_le_bytes());
    buf.extend_from_slice(&(c.min_size as u64).to_le_bytes());
    buf.extend_from_slice(&(c.max_size as u64).to_le_bytes());
}

pub fn decode_constraints(data: &[u8]) -> Option<(VariableConstraints, usize)> {
    if data.len() < CONSTRAINTS_SIZE {
        return None;
    }
    let revision = u16::from_le_bytes([data[0], data[1]]);
    let property = u16::from_le_bytes([data[2], data[3]]);
    let attributes = u32::from_le_bytes(data[4..8].try_into().unwrap());
    let min_size = u64::from_le_bytes(data[8..16].try_into().unwrap()) as usize;
    let max_size = u64::from_le_bytes(data[16..24].try_into().unwrap()) as usize;
    Some((
        VariableConstraints {
            revision,
            property,
            attributes,
            min_size,
            max_size,
        },
        CONSTRAINTS_SIZE,
    ))
}
