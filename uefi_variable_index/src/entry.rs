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
//! Variable entry / info (§3) and the slot-index handle that replaces the
//! original `containing_entry` pointer-arithmetic recovery (§4.5
//! [SUPPLEMENT]).

use crate::metadata::VariableMetadata;
use uefi_variable_checker::VariableConstraints;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VariableInfo {
    pub metadata: Option<VariableMetadata>,
    pub check_constraints: VariableConstraints,
    pub is_variable_set: bool,
    pub is_constraints_set: bool,
}

#[derive(Clone, Debug, Default)]
pub struct VariableEntry {
    pub info: VariableInfo,
    pub in_use: bool,
    pub dirty: bool,
}

/// A stable reference to a slot in a [`crate::VariableIndex`]'s entry
/// table. The original C implementation recovers a `variable_entry*` from a
/// `variable_info*` via `offsetof` pointer arithmetic; this is the safe
/// replacement described in §4.5 — an opaque index re-resolved against
/// `&mut self` on every mutating call.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VariableHandle(pub(crate) usize);
