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
//! Variable metadata (§3 "Variable metadata").

use crate::guid::{EfiTime, Guid};

/// Length of the private-authenticated-variable fingerprint (a SHA-256
/// digest, §4.8).
pub const FINGERPRINT_SIZE: usize = 32;

/// Maximum variable name length in UTF-16 code units, including the
/// mandatory trailing NUL (128 bytes / 2).
pub const MAX_VARIABLE_NAME_UNITS: usize = 64;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariableMetadata {
    pub guid: Guid,
    pub timestamp: EfiTime,
    pub fingerprint: [u8; FINGERPRINT_SIZE],
    /// UTF-16 code units, including the trailing NUL.
    pub name: Vec<u16>,
    pub attributes: u32,
    /// Small dense integer, unique across live entries, assigned at entry
    /// creation. `0` is reserved and never assigned.
    pub uid: u64,
}

impl VariableMetadata {
    pub fn new(guid: Guid, name: Vec<u16>) -> Self {
        VariableMetadata {
            guid,
            timestamp: EfiTime::default(),
            fingerprint: [0u8; FINGERPRINT_SIZE],
            name,
            attributes: 0,
            uid: 0,
        }
    }

    pub fn name_size_bytes(&self) -> usize {
        self.name.len() * 2
    }
}
