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
//! In-memory index of UEFI variable metadata: UID assignment, per-entry
//! check constraints, dirty-bit tracking for non-volatile entries, and
//! dump/restore for crash-consistent persistence.
//!
//! This crate holds no storage backend and performs no authentication; it
//! is the bookkeeping table the store (`uefi_variable_store`) drives.

pub mod attributes;
mod codec;
mod entry;
mod guid;
mod metadata;
#[allow(clippy::module_inception)]
mod index;

pub use entry::{VariableEntry, VariableHandle, VariableInfo};
pub use guid::{EfiTime, Guid};
pub use index::VariableIndex;
pub use metadata::{VariableMetadata, FINGERPRINT_SIZE, MAX_VARIABLE_NAME_UNITS};
