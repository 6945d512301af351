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
//! SMM variable protocol opcode assignment (§6), matching the upstream
//! `SMM_VARIABLE_FUNCTION_*` enumeration.

pub const GET_VARIABLE: u32 = 1;
pub const GET_NEXT_VARIABLE_NAME: u32 = 2;
pub const SET_VARIABLE: u32 = 3;
pub const QUERY_VARIABLE_INFO: u32 = 4;
pub const READY_TO_BOOT: u32 = 5;
pub const EXIT_BOOT_SERVICE: u32 = 6;
pub const GET_STATISTICS: u32 = 7;
pub const LOCK_VARIABLE: u32 = 8;
pub const VAR_CHECK_VARIABLE_PROPERTY_SET: u32 = 9;
pub const VAR_CHECK_VARIABLE_PROPERTY_GET: u32 = 10;
pub const GET_PAYLOAD_SIZE: u32 = 11;

/// 16-byte service identity this provider answers under (`ed32d533-99e6-4209-9cc0-2d72cdd998a7`).
pub const SERVICE_UUID_BYTES: [u8; 16] = [
    0xed, 0x32, 0xd5, 0x33, 0x99, 0xe6, 0x42, 0x09, 0x9c, 0xc0, 0x2d, 0x72, 0xcd, 0xd9, 0x98, 0xa7,
];
