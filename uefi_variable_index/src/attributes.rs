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
//! `EFI_VARIABLE_*` attribute bits relevant to index bookkeeping and access
//! control. Defined here (not in `uefi_variable_store`) because
//! `NON_VOLATILE` gates the index's own dirty-tracking and dump/restore
//! behaviour.

pub const NON_VOLATILE: u32 = 0x0000_0001;
pub const BOOTSERVICE_ACCESS: u32 = 0x0000_0002;
pub const RUNTIME_ACCESS: u32 = 0x0000_0004;
pub const HARDWARE_ERROR_RECORD: u32 = 0x0000_0008;
pub const AUTHENTICATED_WRITE_ACCESS: u32 = 0x0000_0010;
pub const TIME_BASED_AUTHENTICATED_WRITE_ACCESS: u32 = 0x0000_0020;
pub const APPEND_WRITE: u32 = 0x0000_0040;
pub const ENHANCED_AUTHENTICATED_ACCESS: u32 = 0x0000_0080;

/// All attribute bits this store understands. Anything outside this mask is
/// rejected as unsupported (§4.7 attribute capability check).
pub const KNOWN_MASK: u32 = NON_VOLATILE
    | BOOTSERVICE_ACCESS
    | RUNTIME_ACCESS
    | HARDWARE_ERROR_RECORD
    | AUTHENTICATED_WRITE_ACCESS
    | TIME_BASED_AUTHENTICATED_WRITE_ACCESS
    | APPEND_WRITE
    | ENHANCED_AUTHENTICATED_ACCESS;

pub fn is_non_volatile(attributes: u32) -> bool {
    attributes & NON_VOLATILE != 0
}
