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
//! Variable check policy (C9), §4.6.
//!
//! `VariableConstraints` is installed per-variable by `SetVarCheckProperty`
//! and consulted by the store on every subsequent `SetVariable`. This crate
//! only ever holds policy, never variable data or metadata — that stays in
//! `uefi_variable_index`.

use rpc_status::EfiStatus;

/// Required revision for `SetVarCheckProperty` calls, matching the
/// `VAR_CHECK_VARIABLE_PROPERTY_REVISION` constant of the UEFI variable
/// check protocol.
pub const VAR_CHECK_VARIABLE_PROPERTY_REVISION: u16 = 0x0001;

/// Bit 0 of `property`: the variable may not be written once this
/// constraint is installed.
pub const VAR_CHECK_VARIABLE_PROPERTY_READ_ONLY: u16 = 0x0001;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct VariableConstraints {
    pub revision: u16,
    pub property: u16,
    pub attributes: u32,
    pub min_size: usize,
    pub max_size: usize,
}

impl VariableConstraints {
    pub fn is_read_only(&self) -> bool {
        self.property & VAR_CHECK_VARIABLE_PROPERTY_READ_ONLY != 0
    }
}

/// Validate and accept a new set of constraints for a variable.
///
/// `existing` is `Some` when constraints have already been installed for
/// this variable (an update); `is_update` mirrors that, letting the caller
/// apply a different policy to first install vs. override if it ever needs
/// to (the upstream checker currently treats both the same way).
pub fn set_constraints(
    _existing: Option<&VariableConstraints>,
    _is_update: bool,
    new: &VariableConstraints,
) -> Result<VariableConstraints, EfiStatus> {
    if new.revision != VAR_CHECK_VARIABLE_PROPERTY_REVISION {
        return Err(EfiStatus::InvalidParameter);
    }
    if new.min_size > new.max_size {
        return Err(EfiStatus::InvalidParameter);
    }
    Ok(*new)
}

/// Enforce `constraints` against a pending `SetVariable` of `data_size`
/// bytes under `attributes`.
pub fn check_on_set(
    constraints: &VariableConstraints,
    _attributes: u32,
    data_size: usize,
) -> Result<(), EfiStatus> {
    if constraints.is_read_only() {
        return Err(EfiStatus::WriteProtected);
    }
    if data_size < constraints.min_size || data_size > constraints.max_size {
        return Err(EfiStatus::InvalidParameter);
    }
    Ok(())
}
