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
//! Packed little-endian request/response layouts for the SMM variable
//! protocol messages (§6). Each message is a fixed-size header, carried
//! inline in the shared request/response buffer, immediately followed by a
//! variable-length UTF-16 name and (for `SetVariable`) the variable payload
//! itself — the same inline layout `smm_variable_provider.c`'s
//! `SMM_VARIABLE_COMMUNICATE_*` structures use. The upstream protocol header
//! that defines the exact byte offsets was not available to model this on
//! directly; the field sets below are inferred from that provider's access
//! patterns (`sanitize_access_variable_param`, the individual `*_handler`
//! functions) rather than copied from a header.
//!
//! Every decode bounds-checks against the supplied slice before reading a
//! single field, mirroring `sanitize_access_variable_param`'s
//! `data_length >= ...NAME_OFFSET` check.

use uefi_variable_index::Guid;

fn get_u16(buf: &[u8], off: usize) -> Option<u16> {
    buf.get(off..off + 2).map(|s| u16::from_le_bytes(s.try_into().unwrap()))
}

fn get_u32(buf: &[u8], off: usize) -> Option<u32> {
    buf.get(off..off + 4).map(|s| u32::from_le_bytes(s.try_into().unwrap()))
}

fn get_u64(buf: &[u8], off: usize) -> Option<u64> {
    buf.get(off..off + 8).map(|s| u64::from_le_bytes(s.try_into().unwrap()))
}

fn get_guid(buf: &[u8], off: usize) -> Option<Guid> {
    buf.get(off..off + 16).map(|s| Guid::new(s.try_into().unwrap()))
}

fn put_u16(buf: &mut [u8], off: usize, v: u16) -> Option<()> {
    buf.get_mut(off..off + 2)?.copy_from_slice(&v.to_le_bytes());
    Some(())
}

fn put_u32(buf: &mut [u8], off: usize, v: u32) -> Option<()> {
    buf.get_mut(off..off + 4)?.copy_from_slice(&v.to_le_bytes());
    Some(())
}

fn put_u64(buf: &mut [u8], off: usize, v: u64) -> Option<()> {
    buf.get_mut(off..off + 8)?.copy_from_slice(&v.to_le_bytes());
    Some(())
}

fn put_guid(buf: &mut [u8], off: usize, guid: &Guid) -> Option<()> {
    buf.get_mut(off..off + 16)?.copy_from_slice(&guid.0);
    Some(())
}

/// Decodes `byte_len` bytes starting at `off` as a UTF-16LE code-unit
/// sequence, including whatever trailing NUL the caller placed in it.
fn decode_name(buf: &[u8], off: usize, byte_len: usize) -> Option<Vec<u16>> {
    let bytes = buf.get(off..off + byte_len)?;
    if bytes.len() % 2 != 0 {
        return None;
    }
    Some(bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect())
}

fn encode_name(name: &[u16], buf: &mut [u8], off: usize) -> Option<()> {
    let byte_len = name.len() * 2;
    let dest = buf.get_mut(off..off + byte_len)?;
    for (unit, chunk) in name.iter().zip(dest.chunks_exact_mut(2)) {
        chunk.copy_from_slice(&unit.to_le_bytes());
    }
    Some(())
}

// --- GetVariable / SetVariable (opcodes 1, 3) ---

pub const ACCESS_VARIABLE_HEADER_LEN: usize = 40;

pub struct AccessVariableRequest {
    pub guid: Guid,
    pub data_size: u64,
    pub attributes: u32,
    pub name: Vec<u16>,
}

/// `GetVariable` request: header + name only. `data_size` carries the
/// caller's response buffer capacity, not a trailing payload.
pub fn decode_get_variable_request(buf: &[u8]) -> Option<AccessVariableRequest> {
    if buf.len() < ACCESS_VARIABLE_HEADER_LEN {
        return None;
    }
    let guid = get_guid(buf, 0)?;
    let data_size = get_u64(buf, 16)?;
    let name_size = get_u64(buf, 24)? as usize;
    let attributes = get_u32(buf, 32)?;
    let name = decode_name(buf, ACCESS_VARIABLE_HEADER_LEN, name_size)?;
    Some(AccessVariableRequest { guid, data_size, attributes, name })
}

/// `SetVariable` request: header + name + inline payload.
pub fn decode_set_variable_request(buf: &[u8]) -> Option<(AccessVariableRequest, Vec<u8>)> {
    let req = decode_get_variable_request(buf)?;
    let name_off = ACCESS_VARIABLE_HEADER_LEN + req.name.len() * 2;
    let data = buf.get(name_off..name_off + req.data_size as usize)?.to_vec();
    Some((req, data))
}

/// Writes a successful `GetVariable` response: header + echoed name + data.
pub fn encode_get_variable_response(guid: &Guid, attributes: u32, name: &[u16], data: &[u8], out: &mut [u8]) -> Option<usize> {
    let name_off = ACCESS_VARIABLE_HEADER_LEN;
    let data_off = name_off + name.len() * 2;
    let total = data_off + data.len();
    if out.len() < total {
        return None;
    }
    put_guid(out, 0, guid)?;
    put_u64(out, 16, data.len() as u64)?;
    put_u64(out, 24, name.len() as u64 * 2)?;
    put_u32(out, 32, attributes)?;
    put_u32(out, 36, 0)?;
    encode_name(name, out, name_off)?;
    out.get_mut(data_off..total)?.copy_from_slice(data);
    Some(total)
}

/// Writes the header-only "buffer too small" shape: `data_size` carries the
/// size the caller must retry with.
pub fn encode_access_variable_size_only(guid: &Guid, attributes: u32, required_size: u64, out: &mut [u8]) -> Option<usize> {
    if out.len() < ACCESS_VARIABLE_HEADER_LEN {
        return None;
    }
    put_guid(out, 0, guid)?;
    put_u64(out, 16, required_size)?;
    put_u64(out, 24, 0)?;
    put_u32(out, 32, attributes)?;
    put_u32(out, 36, 0)?;
    Some(ACCESS_VARIABLE_HEADER_LEN)
}

// --- GetNextVariableName (opcode 2) ---

pub const NEXT_NAME_HEADER_LEN: usize = 32;

pub struct NextNameRequest {
    pub guid: Guid,
    pub max_name_size: u64,
    pub name: Vec<u16>,
}

pub fn decode_next_name_request(buf: &[u8]) -> Option<NextNameRequest> {
    if buf.len() < NEXT_NAME_HEADER_LEN {
        return None;
    }
    let guid = get_guid(buf, 0)?;
    let name_size = get_u64(buf, 16)? as usize;
    let max_name_size = get_u64(buf, 24)?;
    let name = decode_name(buf, NEXT_NAME_HEADER_LEN, name_size)?;
    Some(NextNameRequest { guid, max_name_size, name })
}

pub fn encode_next_name_response(guid: &Guid, name: &[u16], out: &mut [u8]) -> Option<usize> {
    let total = NEXT_NAME_HEADER_LEN + name.len() * 2;
    if out.len() < total {
        return None;
    }
    put_guid(out, 0, guid)?;
    put_u64(out, 16, name.len() as u64 * 2)?;
    put_u64(out, 24, 0)?;
    encode_name(name, out, NEXT_NAME_HEADER_LEN)?;
    Some(total)
}

/// Header-only "buffer too small" shape: `name_size` carries the required
/// byte length of the next name.
pub fn encode_next_name_size_only(guid: &Guid, required_name_size: u64, out: &mut [u8]) -> Option<usize> {
    if out.len() < NEXT_NAME_HEADER_LEN {
        return None;
    }
    put_guid(out, 0, guid)?;
    put_u64(out, 16, required_name_size)?;
    put_u64(out, 24, 0)?;
    Some(NEXT_NAME_HEADER_LEN)
}

// --- QueryVariableInfo (opcode 4) ---

pub const QUERY_INFO_REQUEST_LEN: usize = 8;
pub const QUERY_INFO_RESPONSE_LEN: usize = 32;

pub fn decode_query_info_request(buf: &[u8]) -> Option<u32> {
    get_u32(buf, 0)
}

pub fn encode_query_info_response(
    attributes: u32,
    max_variable_storage_size: u64,
    remaining_variable_storage_size: u64,
    max_variable_size: u64,
    out: &mut [u8],
) -> Option<usize> {
    if out.len() < QUERY_INFO_RESPONSE_LEN {
        return None;
    }
    put_u32(out, 0, attributes)?;
    put_u32(out, 4, 0)?;
    put_u64(out, 8, max_variable_storage_size)?;
    put_u64(out, 16, remaining_variable_storage_size)?;
    put_u64(out, 24, max_variable_size)?;
    Some(QUERY_INFO_RESPONSE_LEN)
}

// --- LockVariable (opcode 8) ---

pub const LOCK_VARIABLE_HEADER_LEN: usize = 24;

pub fn decode_lock_variable_request(buf: &[u8]) -> Option<(Guid, Vec<u16>)> {
    if buf.len() < LOCK_VARIABLE_HEADER_LEN {
        return None;
    }
    let guid = get_guid(buf, 0)?;
    let name_size = get_u64(buf, 16)? as usize;
    let name = decode_name(buf, LOCK_VARIABLE_HEADER_LEN, name_size)?;
    Some((guid, name))
}

// --- VarCheckVariablePropertySet (opcode 9) ---

pub const VAR_CHECK_SET_HEADER_LEN: usize = 48;

pub struct VarCheckSetRequest {
    pub guid: Guid,
    pub revision: u16,
    pub property: u16,
    pub attributes: u32,
    pub min_size: u64,
    pub max_size: u64,
    pub name: Vec<u16>,
}

pub fn decode_var_check_set_request(buf: &[u8]) -> Option<VarCheckSetRequest> {
    if buf.len() < VAR_CHECK_SET_HEADER_LEN {
        return None;
    }
    let guid = get_guid(buf, 0)?;
    let name_size = get_u64(buf, 16)? as usize;
    let revision = get_u16(buf, 24)?;
    let property = get_u16(buf, 26)?;
    let attributes = get_u32(buf, 28)?;
    let min_size = get_u64(buf, 32)?;
    let max_size = get_u64(buf, 40)?;
    let name = decode_name(buf, VAR_CHECK_SET_HEADER_LEN, name_size)?;
    Some(VarCheckSetRequest { guid, revision, property, attributes, min_size, max_size, name })
}

// --- VarCheckVariablePropertyGet (opcode 10) ---

pub const VAR_CHECK_GET_REQUEST_HEADER_LEN: usize = 24;
pub const VAR_CHECK_GET_RESPONSE_LEN: usize = 24;

pub fn decode_var_check_get_request(buf: &[u8]) -> Option<(Guid, Vec<u16>)> {
    if buf.len() < VAR_CHECK_GET_REQUEST_HEADER_LEN {
        return None;
    }
    let guid = get_guid(buf, 0)?;
    let name_size = get_u64(buf, 16)? as usize;
    let name = decode_name(buf, VAR_CHECK_GET_REQUEST_HEADER_LEN, name_size)?;
    Some((guid, name))
}

pub fn encode_var_check_get_response(revision: u16, property: u16, attributes: u32, min_size: u64, max_size: u64, out: &mut [u8]) -> Option<usize> {
    if out.len() < VAR_CHECK_GET_RESPONSE_LEN {
        return None;
    }
    put_u16(out, 0, revision)?;
    put_u16(out, 2, property)?;
    put_u32(out, 4, attributes)?;
    put_u64(out, 8, min_size)?;
    put_u64(out, 16, max_size)?;
    Some(VAR_CHECK_GET_RESPONSE_LEN)
}

// --- GetPayloadSize (opcode 11) ---

pub const PAYLOAD_SIZE_RESPONSE_LEN: usize = 8;

pub fn encode_payload_size_response(size: u64, out: &mut [u8]) -> Option<usize> {
    if out.len() < PAYLOAD_SIZE_RESPONSE_LEN {
        return None;
    }
    put_u64(out, 0, size)?;
    Some(PAYLOAD_SIZE_RESPONSE_LEN)
}

// --- GetStatistics (opcode 7) ---

pub const STATISTICS_RESPONSE_LEN: usize = 8;

pub fn encode_statistics_response(out: &mut [u8]) -> Option<usize> {
    if out.len() < STATISTICS_RESPONSE_LEN {
        return None;
    }
    out[..STATISTICS_RESPONSE_LEN].fill(0);
    Some(STATISTICS_RESPONSE_LEN)
}
