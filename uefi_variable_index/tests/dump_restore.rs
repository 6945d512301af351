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
//! End-to-end dump/restore coverage across a table with a mix of volatile,
//! non-volatile, and constrained entries.

use uefi_variable_index::attributes::{BOOTSERVICE_ACCESS, NON_VOLATILE, RUNTIME_ACCESS};
use uefi_variable_index::{Guid, VariableIndex};
use uefi_variable_checker::VariableConstraints;

fn utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

#[test]
fn mixed_table_round_trips_only_non_volatile_set_entries() {
    let mut idx = VariableIndex::new(8);

    let nv1 = idx.add_entry(Guid::new([1; 16]), utf16("BootOrder")).unwrap();
    idx.set_variable(nv1, NON_VOLATILE | BOOTSERVICE_ACCESS | RUNTIME_ACCESS);
    idx.set_constraints(
        nv1,
        VariableConstraints {
            revision: 1,
            property: 0,
            attributes: NON_VOLATILE | BOOTSERVICE_ACCESS | RUNTIME_ACCESS,
            min_size: 2,
            max_size: 1024,
        },
    );

    let nv2 = idx.add_entry(Guid::new([2; 16]), utf16("PlatformLang")).unwrap();
    idx.set_variable(nv2, NON_VOLATILE | BOOTSERVICE_ACCESS | RUNTIME_ACCESS);

    let volatile = idx.add_entry(Guid::new([3; 16]), utf16("Scratch")).unwrap();
    idx.set_variable(volatile, BOOTSERVICE_ACCESS);

    let unset = idx.add_entry(Guid::new([4; 16]), utf16("Pending")).unwrap();
    let _ = unset;

    idx.confirm_write();
    let (buf, dirty) = idx.dump();
    assert!(dirty);
    idx.confirm_write();

    let mut restored = VariableIndex::new(8);
    let consumed = restored.restore(&buf);
    assert_eq!(consumed, buf.len());
    assert_eq!(restored.counter(), idx.counter());

    let boot_order = restored
        .find(&Guid::new([1; 16]), &utf16("BootOrder"))
        .expect("non-volatile set entry survives restore");
    assert!(restored.info(boot_order).is_constraints_set);
    assert_eq!(restored.info(boot_order).check_constraints.max_size, 1024);

    let platform_lang = restored
        .find(&Guid::new([2; 16]), &utf16("PlatformLang"))
        .expect("second non-volatile entry survives restore");
    assert!(restored.info(platform_lang).is_variable_set);

    assert!(
        restored.find(&Guid::new([3; 16]), &utf16("Scratch")).is_none(),
        "volatile entries are never dumped"
    );
    assert!(
        restored.find(&Guid::new([4; 16]), &utf16("Pending")).is_none(),
        "unset entries are never dumped"
    );
}

#[test]
fn restoring_discards_prior_table_contents() {
    let mut idx = VariableIndex::new(4);
    let h = idx.add_entry(Guid::new([1; 16]), utf16("Keep")).unwrap();
    idx.set_variable(h, NON_VOLATILE);
    let (buf, _) = idx.dump();

    let mut target = VariableIndex::new(4);
    let stale = target.add_entry(Guid::new([9; 16]), utf16("Stale")).unwrap();
    target.set_variable(stale, NON_VOLATILE);

    target.restore(&buf);

    assert!(target.find(&Guid::new([9; 16]), &utf16("Stale")).is_none());
    assert!(target.find(&Guid::new([1; 16]), &utf16("Keep")).is_some());
}
