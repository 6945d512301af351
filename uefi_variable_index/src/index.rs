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
//! The variable index itself: a fixed-capacity table of [`VariableEntry`]
//! slots, UID assignment, dirty tracking and dump/restore (§4.5).

use crate::attributes::is_non_volatile;
use crate::codec::{decode_constraints, decode_metadata, encode_constraints, encode_metadata};
use crate::entry::{VariableEntry, VariableHandle, VariableInfo};
use crate::guid::Guid;
use crate::metadata::VariableMetadata;
use rpc_status::EfiStatus;
use uefi_variable_checker::VariableConstraints;

pub struct VariableIndex {
    counter: u32,
    entries: Vec<VariableEntry>,
}

impl VariableIndex {
    pub fn new(max_variables: usize) -> Self {
        VariableIndex {
            counter: 0,
            entries: vec![VariableEntry::default(); max_variables],
        }
    }

    pub fn max_variables(&self) -> usize {
        self.entries.len()
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Smallest UID in `1..=max_variables` not currently held by a live
    /// entry. Returns `0` if the table has no free UID, which cannot happen
    /// unless every slot is in use (mirrors `generate_uid`'s exhaustive
    /// linear scan).
    fn generate_uid(&self) -> u64 {
        for candidate in 1..=self.entries.len() as u64 {
            let taken = self
                .entries
                .iter()
                .any(|e| e.in_use && e.info.metadata.as_ref().map(|m| m.uid) == Some(candidate));
            if !taken {
                return candidate;
            }
        }
        0
    }

    fn matches(entry: &VariableEntry, guid: &Guid, name: &[u16]) -> bool {
        entry.in_use
            && entry
                .info
                .metadata
                .as_ref()
                .map_or(false, |m| &m.guid == guid && m.name == name)
    }

    pub fn find(&self, guid: &Guid, name: &[u16]) -> Option<VariableHandle> {
        self.entries
            .iter()
            .position(|e| Self::matches(e, guid, name))
            .map(VariableHandle)
    }

    fn first_set_from(&self, start: usize) -> Option<VariableHandle> {
        self.entries[start..]
            .iter()
            .position(|e| e.in_use && e.info.is_variable_set)
            .map(|i| VariableHandle(start + i))
    }

    /// Enumeration step behind `GetNextVariableName`. `name` must include at
    /// least the trailing NUL; an empty `name[0] == 0` restarts enumeration
    /// from the first in-use, set entry. A non-empty `name` not present in
    /// the table is `InvalidParameter`; walking off the end of the table is
    /// `NotFound`.
    pub fn find_next(&self, guid: &Guid, name: &[u16]) -> Result<VariableHandle, EfiStatus> {
        if name.is_empty() {
            return Err(EfiStatus::NotFound);
        }
        if name[0] == 0 {
            return self.first_set_from(0).ok_or(EfiStatus::NotFound);
        }
        match self.find(guid, name) {
            Some(VariableHandle(pos)) => self.first_set_from(pos + 1).ok_or(EfiStatus::NotFound),
            None => Err(EfiStatus::InvalidParameter),
        }
    }

    pub fn info(&self, handle: VariableHandle) -> &VariableInfo {
        &self.entries[handle.0].info
    }

    pub fn metadata(&self, handle: VariableHandle) -> &VariableMetadata {
        self.entries[handle.0]
            .info
            .metadata
            .as_ref()
            .expect("handle always refers to an entry with metadata assigned at add_entry")
    }

    pub fn metadata_mut(&mut self, handle: VariableHandle) -> &mut VariableMetadata {
        self.entries[handle.0]
            .info
            .metadata
            .as_mut()
            .expect("handle always refers to an entry with metadata assigned at add_entry")
    }

    /// Iterates in-use entries in slot order (used by statistics and by the
    /// store's orphan-purge reconciliation).
    pub fn iter(&self) -> impl Iterator<Item = (VariableHandle, &VariableInfo)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.in_use)
            .map(|(i, e)| (VariableHandle(i), &e.info))
    }

    /// Claims a free slot for `(guid, name)` and assigns it a fresh UID.
    /// Does not mark the variable set — callers do that via
    /// [`Self::set_variable`] once the backing store write succeeds.
    pub fn add_entry(&mut self, guid: Guid, name: Vec<u16>) -> Result<VariableHandle, EfiStatus> {
        let pos = self
            .entries
            .iter()
            .position(|e| !e.in_use)
            .ok_or(EfiStatus::OutOfResources)?;
        let uid = self.generate_uid();
        if uid == 0 {
            return Err(EfiStatus::OutOfResources);
        }
        let mut metadata = VariableMetadata::new(guid, name);
        metadata.uid = uid;
        self.entries[pos] = VariableEntry {
            info: VariableInfo {
                metadata: Some(metadata),
                check_constraints: VariableConstraints::default(),
                is_variable_set: false,
                is_constraints_set: false,
            },
            in_use: true,
            dirty: false,
        };
        Ok(VariableHandle(pos))
    }

    /// Frees a slot if it holds neither a set variable nor pinned
    /// constraints — used to reclaim an entry created in anticipation of a
    /// write that never completed.
    pub fn remove_unused_entry(&mut self, handle: VariableHandle) {
        let entry = &mut self.entries[handle.0];
        if !entry.info.is_variable_set && !entry.info.is_constraints_set {
            *entry = VariableEntry::default();
        }
    }

    fn mark_dirty_if_nv(&mut self, handle: VariableHandle) {
        let entry = &mut self.entries[handle.0];
        if entry
            .info
            .metadata
            .as_ref()
            .map_or(false, |m| is_non_volatile(m.attributes))
        {
            entry.dirty = true;
        }
    }

    pub fn set_variable(&mut self, handle: VariableHandle, attributes: u32) {
        {
            let entry = &mut self.entries[handle.0];
            if let Some(m) = entry.info.metadata.as_mut() {
                m.attributes = attributes;
            }
            entry.info.is_variable_set = true;
        }
        self.mark_dirty_if_nv(handle);
    }

    pub fn clear_variable(&mut self, handle: VariableHandle) {
        self.mark_dirty_if_nv(handle);
        self.entries[handle.0].info.is_variable_set = false;
    }

    pub fn set_constraints(
        &mut self,
        handle: VariableHandle,
        constraints: VariableConstraints,
    ) {
        {
            let entry = &mut self.entries[handle.0];
            entry.info.check_constraints = constraints;
            entry.info.is_constraints_set = true;
        }
        self.mark_dirty_if_nv(handle);
    }

    /// Serializes every non-volatile, set entry plus a pre-incremented
    /// counter. The counter written here is `self.counter + 1`, i.e. the
    /// value a following [`Self::confirm_write`] would commit — the backend
    /// write is expected to carry this buffer, and `confirm_write` only
    /// then advances `self.counter` to match. Returns the buffer and
    /// whether any entry (NV or not) was dirty; dirty bits are always
    /// cleared as a side effect.
    pub fn dump(&mut self) -> (Vec<u8>, bool) {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.counter.wrapping_add(1).to_le_bytes());

        let mut any_dirty = false;
        for entry in self.entries.iter_mut() {
            if entry.in_use && entry.info.is_variable_set {
                if let Some(metadata) = &entry.info.metadata {
                    if is_non_volatile(metadata.attributes) {
                        encode_metadata(&mut buf, metadata);
                        buf.push(entry.info.is_constraints_set as u8);
                        if entry.info.is_constraints_set {
                            encode_constraints(&mut buf, &entry.info.check_constraints);
                        }
                    }
                }
            }
            any_dirty |= entry.dirty;
            entry.dirty = false;
        }
        (buf, any_dirty)
    }

    /// Advances the live counter after a dump's buffer has been durably
    /// written by the backend. Deliberately separate from `dump`: the
    /// buffer's counter value and the in-memory counter only converge once
    /// the write is known to have landed.
    pub fn confirm_write(&mut self) {
        self.counter = self.counter.wrapping_add(1);
    }

    /// Rebuilds the table from a `dump`-produced buffer, writing entries
    /// sequentially starting at slot 0 regardless of which slot they
    /// originally occupied — restore always matches by (guid, name), never
    /// by position. Returns the number of bytes consumed; a prefix
    /// mismatch (too few bytes for a whole record) stops the restore early
    /// rather than erroring, since a partially-written dump region is
    /// expected at the tail of storage.
    pub fn restore(&mut self, data: &[u8]) -> usize {
        if data.len() < 4 {
            return 0;
        }
        self.counter = u32::from_le_bytes(data[0..4].try_into().unwrap());
        let mut pos = 4;

        for entry in self.entries.iter_mut() {
            *entry = VariableEntry::default();
        }

        let mut slot = 0;
        while slot < self.entries.len() {
            let (metadata, consumed) = match decode_metadata(&data[pos..]) {
                Some(v) => v,
                None => break,
            };
            let mut cursor = pos + consumed;
            if cursor >= data.len() {
                break;
            }
            let is_constraints_set = data[cursor] != 0;
            cursor += 1;

            let check_constraints = if is_constraints_set {
                match decode_constraints(&data[cursor..]) {
                    Some((c, used)) => {
                        cursor += used;
                        c
                    }
                    None => break,
                }
            } else {
                VariableConstraints::default()
            };

            self.entries[slot] = VariableEntry {
                info: VariableInfo {
                    metadata: Some(metadata),
                    check_constraints,
                    is_variable_set: true,
                    is_constraints_set,
                },
                in_use: true,
                dirty: false,
            };
            slot += 1;
            pos = cursor;
        }
        pos
    }
}
