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
//! Wire codec (C1): packs and unpacks the five 32-bit argument registers of
//! an FF-A direct message, per §4.1. The codec only ever exposes field
//! accessors and a "copy control reg" helper — it never interprets the
//! payload itself, that is left to C6/C7 and the concrete service.

/// Reserved interface id meaning "the management interface" rather than a
/// registered service.
pub const MANAGEMENT_INTERFACE_ID: u8 = 0xFF;

/// Protocol version negotiated by the management interface's `VERSION`
/// opcode.
pub const PROTOCOL_VERSION: u32 = 1;

/// Management interface opcodes.
pub mod management_opcode {
    pub const VERSION: u16 = 0;
    pub const MEMORY_RETRIEVE: u16 = 1;
    pub const MEMORY_RELINQUISH: u16 = 2;
    pub const INTERFACE_ID_QUERY: u16 = 3;
}

/// Bit 0 of the flags field: fast-call (the endpoint need not suspend
/// waiting on a blocking collaborator to answer it).
pub const FLAG_FAST_CALL: u8 = 0x01;

const OPCODE_MASK: u32 = 0x0000_FFFF;
const INTERFACE_ID_SHIFT: u32 = 16;
const INTERFACE_ID_MASK: u32 = 0x00FF_0000;
const FLAGS_SHIFT: u32 = 24;
const FLAGS_MASK: u32 = 0x3F00_0000;

/// The five-register FF-A direct-message payload, decoded incrementally by
/// role-specific accessors. Which accessors are meaningful depends on
/// whether `regs` holds a management message or a data-path message and
/// whether it is a request or a response — the same way the five registers
/// are reused for different purposes on the wire.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct WireMessage {
    pub regs: [u32; 5],
}

impl WireMessage {
    pub const fn new() -> Self {
        WireMessage { regs: [0; 5] }
    }

    pub const fn from_regs(regs: [u32; 5]) -> Self {
        WireMessage { regs }
    }

    // --- regs[0] control word ---

    pub fn opcode(&self) -> u16 {
        (self.regs[0] & OPCODE_MASK) as u16
    }

    pub fn set_opcode(&mut self, opcode: u16) {
        self.regs[0] = (self.regs[0] & !OPCODE_MASK) | (opcode as u32);
    }

    pub fn interface_id(&self) -> u8 {
        ((self.regs[0] & INTERFACE_ID_MASK) >> INTERFACE_ID_SHIFT) as u8
    }

    pub fn set_interface_id(&mut self, interface_id: u8) {
        self.regs[0] =
            (self.regs[0] & !INTERFACE_ID_MASK) | ((interface_id as u32) << INTERFACE_ID_SHIFT);
    }

    pub fn is_management(&self) -> bool {
        self.interface_id() == MANAGEMENT_INTERFACE_ID
    }

    pub fn flags(&self) -> u8 {
        ((self.regs[0] & FLAGS_MASK) >> FLAGS_SHIFT) as u8
    }

    pub fn set_flags(&mut self, flags: u8) {
        self.regs[0] = (self.regs[0] & !FLAGS_MASK) | (((flags & 0x3F) as u32) << FLAGS_SHIFT);
    }

    pub fn is_fast_call(&self) -> bool {
        self.flags() & FLAG_FAST_CALL != 0
    }

    /// Echo `regs[0]` of a request into the corresponding response, so the
    /// reply carries back the same opcode/interface-id/flags the request
    /// arrived with.
    pub fn copy_control_reg(request: &WireMessage, response: &mut WireMessage) {
        response.regs[0] = request.regs[0];
    }

    // --- version response ---

    pub fn version(&self) -> u32 {
        self.regs[1]
    }

    pub fn set_version(&mut self, version: u32) {
        self.regs[1] = version;
    }

    // --- memory handle / tag (retrieve, relinquish) ---

    pub fn memory_handle(&self) -> u64 {
        (self.regs[1] as u64) | ((self.regs[2] as u64) << 32)
    }

    pub fn set_memory_handle(&mut self, handle: u64) {
        self.regs[1] = (handle & 0xFFFF_FFFF) as u32;
        self.regs[2] = (handle >> 32) as u32;
    }

    pub fn tag(&self) -> u64 {
        (self.regs[3] as u64) | ((self.regs[4] as u64) << 32)
    }

    pub fn set_tag(&mut self, tag: u64) {
        self.regs[3] = (tag & 0xFFFF_FFFF) as u32;
        self.regs[4] = (tag >> 32) as u32;
    }

    // --- interface-id query request: regs[1..5] = 16-byte service UUID ---

    pub fn uuid_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        for i in 0..4 {
            out[i * 4..i * 4 + 4].copy_from_slice(&self.regs[i + 1].to_le_bytes());
        }
        out
    }

    pub fn set_uuid_bytes(&mut self, bytes: &[u8; 16]) {
        for i in 0..4 {
            let mut word = [0u8; 4];
            word.copy_from_slice(&bytes[i * 4..i * 4 + 4]);
            self.regs[i + 1] = u32::from_le_bytes(word);
        }
    }

    // --- interface-id query response ---

    pub fn rpc_status(&self) -> i32 {
        self.regs[1] as i32
    }

    pub fn set_rpc_status(&mut self, status: i32) {
        self.regs[1] = status as u32;
    }

    pub fn queried_interface_id(&self) -> u8 {
        (self.regs[2] & 0xFF) as u8
    }

    pub fn set_queried_interface_id(&mut self, interface_id: u8) {
        self.regs[2] = (self.regs[2] & !0xFFu32) | (interface_id as u32);
    }

    // --- data-path request ---

    pub fn request_length(&self) -> u32 {
        self.regs[3]
    }

    pub fn set_request_length(&mut self, len: u32) {
        self.regs[3] = len;
    }

    pub fn client_id(&self) -> u32 {
        self.regs[4]
    }

    pub fn set_client_id(&mut self, client_id: u32) {
        self.regs[4] = client_id;
    }

    // --- data-path response ---

    pub fn service_status_low32(&self) -> u32 {
        self.regs[2]
    }

    pub fn set_service_status_low32(&mut self, status: u32) {
        self.regs[2] = status;
    }

    pub fn response_length(&self) -> u32 {
        self.regs[3]
    }

    pub fn set_response_length(&mut self, len: u32) {
        self.regs[3] = len;
    }
}
