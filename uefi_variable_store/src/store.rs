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
//! The UEFI variable store itself (C10), §4.7: variable lifecycle, access
//! control, the two-slot crash-consistent index commit, and delegation to
//! storage collaborators. Time-based authenticated writes are handed to
//! [`crate::auth`].

use crate::crypto::{CryptoBackend, FingerprintProvider, KeyVariableSource};
use crate::delegate::DelegateStore;
use crate::names;
use crate::{auth, names::GLOBAL_VARIABLE_GUID};
use rpc_status::EfiStatus;
use uefi_variable_index::{attributes as attrs, Guid, VariableHandle, VariableIndex};
use uefi_variable_checker::VariableConstraints;

#[cfg(feature = "trace")]
use func_trace::trace;
#[cfg(feature = "trace")]
func_trace::init_depth_var!();

#[derive(Copy, Clone, Eq, PartialEq)]
enum IndexSlot {
    A,
    B,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct VariableInfoStats {
    pub max_variable_storage_size: u64,
    pub remaining_variable_storage_size: u64,
    pub max_variable_size: u64,
}

fn check_name_terminator(name: &[u16]) -> Result<(), EfiStatus> {
    match name.last() {
        Some(0) => Ok(()),
        _ => Err(EfiStatus::InvalidParameter),
    }
}

/// Attribute capability gate applied on every `set_variable`, in the order
/// the upstream store checks them (§4.7 "Attribute capability check").
fn check_attribute_capabilities(attributes: u32) -> Result<(), EfiStatus> {
    if attributes & attrs::RUNTIME_ACCESS != 0 && attributes & attrs::BOOTSERVICE_ACCESS == 0 {
        return Err(EfiStatus::InvalidParameter);
    }
    if attributes & attrs::AUTHENTICATED_WRITE_ACCESS != 0 {
        return Err(EfiStatus::Unsupported);
    }
    if attributes & attrs::TIME_BASED_AUTHENTICATED_WRITE_ACCESS != 0
        && attributes & attrs::ENHANCED_AUTHENTICATED_ACCESS != 0
    {
        return Err(EfiStatus::InvalidParameter);
    }
    if attributes & attrs::ENHANCED_AUTHENTICATED_ACCESS != 0 || attributes & attrs::HARDWARE_ERROR_RECORD != 0 {
        return Err(EfiStatus::Unsupported);
    }
    if attributes & !attrs::KNOWN_MASK != 0 {
        return Err(EfiStatus::Unsupported);
    }
    Ok(())
}

pub struct UefiVariableStore {
    is_boot_service: bool,
    owner_id: u32,
    index: VariableIndex,
    persistent: DelegateStore,
    volatile: DelegateStore,
    index_slot_a_uid: u64,
    index_slot_b_uid: u64,
    active_index_uid: IndexSlot,
    crypto: Box<dyn CryptoBackend>,
    fingerprints: Box<dyn FingerprintProvider>,
}

impl UefiVariableStore {
    /// Loads the persisted index from whichever of the two reserved slots
    /// is valid (§4.7 "Two-slot crash-consistent index commit"), or starts
    /// a fresh empty index if neither slot holds data.
    pub fn new(
        max_variables: usize,
        owner_id: u32,
        persistent: DelegateStore,
        volatile: DelegateStore,
        index_slot_a_uid: u64,
        index_slot_b_uid: u64,
        crypto: Box<dyn CryptoBackend>,
        fingerprints: Box<dyn FingerprintProvider>,
    ) -> Result<Self, EfiStatus> {
        let slot_a = read_slot(&persistent, owner_id, index_slot_a_uid);
        let slot_b = read_slot(&persistent, owner_id, index_slot_b_uid);

        let mut index = VariableIndex::new(max_variables);
        let active_index_uid = match (
            slot_a.as_deref().and_then(slot_counter),
            slot_b.as_deref().and_then(slot_counter),
        ) {
            (None, None) => IndexSlot::B,
            (Some(_), None) => {
                index.restore(slot_a.as_ref().unwrap());
                IndexSlot::A
            }
            (None, Some(_)) => {
                index.restore(slot_b.as_ref().unwrap());
                IndexSlot::B
            }
            (Some(ca), Some(cb)) => {
                if cb == ca.wrapping_add(1) {
                    index.restore(slot_b.as_ref().unwrap());
                    IndexSlot::B
                } else if ca == cb.wrapping_add(1) {
                    index.restore(slot_a.as_ref().unwrap());
                    IndexSlot::A
                } else {
                    // Counters should never be equal or diverge by more than
                    // one write; either indicates storage corruption. Fail
                    // load rather than trust a partially-consistent index.
                    return Err(EfiStatus::DeviceError);
                }
            }
        };

        let mut store = UefiVariableStore {
            is_boot_service: true,
            owner_id,
            index,
            persistent,
            volatile,
            index_slot_a_uid,
            index_slot_b_uid,
            active_index_uid,
            crypto,
            fingerprints,
        };
        // A crash between committing the index and writing the backing
        // object it describes can leave a set entry with no storage object
        // behind it; reconcile that away before the store is used.
        store.purge_orphan_index_entries()?;
        Ok(store)
    }

    fn inactive_slot(&self) -> IndexSlot {
        match self.active_index_uid {
            IndexSlot::A => IndexSlot::B,
            IndexSlot::B => IndexSlot::A,
        }
    }

    fn inactive_slot_uid(&self) -> u64 {
        match self.inactive_slot() {
            IndexSlot::A => self.index_slot_a_uid,
            IndexSlot::B => self.index_slot_b_uid,
        }
    }

    /// Writes the index to the currently-inactive slot if it is dirty,
    /// then flips which slot is active. A clean index is never written.
    fn sync_index(&mut self) -> Result<(), EfiStatus> {
        let (buf, dirty) = self.index.dump();
        if !dirty {
            return Ok(());
        }
        let target = self.inactive_slot_uid();
        self.persistent.overwrite(self.owner_id, target, &buf)?;
        self.index.confirm_write();
        self.active_index_uid = self.inactive_slot();
        Ok(())
    }

    fn is_access_permitted(&self, attributes: u32) -> bool {
        if self.is_boot_service {
            attributes & attrs::BOOTSERVICE_ACCESS != 0
        } else {
            attributes & attrs::RUNTIME_ACCESS != 0
        }
    }

    fn select_delegate_store(&self, nv: bool) -> &DelegateStore {
        if nv {
            &self.persistent
        } else {
            &self.volatile
        }
    }

    fn select_delegate_store_mut(&mut self, nv: bool) -> &mut DelegateStore {
        if nv {
            &mut self.persistent
        } else {
            &mut self.volatile
        }
    }

    #[cfg_attr(feature = "trace", trace)]
    pub fn set_variable(&mut self, guid: Guid, name: Vec<u16>, attributes: u32, data: Vec<u8>) -> Result<(), EfiStatus> {
        check_name_terminator(&name)?;
        check_attribute_capabilities(attributes)?;

        let owner_id = self.owner_id;
        let existing_handle = self.index.find(&guid, &name);
        let (existing_timestamp, existing_fingerprint) = existing_handle
            .map(|h| {
                let m = self.index.metadata(h);
                (Some(m.timestamp), if m.fingerprint == [0u8; 32] { None } else { Some(m.fingerprint) })
            })
            .unwrap_or((None, None));

        let is_append = attributes & attrs::APPEND_WRITE != 0;
        let is_auth = attributes & attrs::TIME_BASED_AUTHENTICATED_WRITE_ACCESS != 0;

        let (payload, new_timestamp, new_fingerprint) = if is_auth {
            let outcome = auth::authenticate_variable(
                &guid,
                &name,
                attributes,
                is_append,
                existing_timestamp,
                existing_fingerprint,
                &data,
                &*self,
                self.crypto.as_ref(),
                self.fingerprints.as_ref(),
            )?;
            (outcome.payload, Some(outcome.stored_timestamp), outcome.fingerprint)
        } else {
            (data, None, None)
        };

        let is_delete = payload.is_empty()
            && attributes & (attrs::APPEND_WRITE | attrs::ENHANCED_AUTHENTICATED_ACCESS) == 0
            && attributes & (attrs::BOOTSERVICE_ACCESS | attrs::RUNTIME_ACCESS) == 0;

        if is_delete {
            let handle = existing_handle.ok_or(EfiStatus::NotFound)?;
            if !self.index.info(handle).is_variable_set {
                return Err(EfiStatus::NotFound);
            }
            let metadata = self.index.metadata(handle).clone();
            let nv = attrs::is_non_volatile(metadata.attributes);
            self.select_delegate_store_mut(nv).remove(owner_id, metadata.uid)?;
            self.index.clear_variable(handle);
            self.index.remove_unused_entry(handle);
            if nv {
                self.sync_index()?;
            }
            return Ok(());
        }

        if let Some(handle) = existing_handle {
            let info = self.index.info(handle);
            if info.is_variable_set {
                let existing_attrs = info.metadata.as_ref().unwrap().attributes;
                if (existing_attrs & !attrs::APPEND_WRITE) != (attributes & !attrs::APPEND_WRITE) {
                    return Err(EfiStatus::InvalidParameter);
                }
            }
            if info.is_constraints_set {
                let constraints = info.check_constraints;
                uefi_variable_checker::check_on_set(&constraints, attributes, payload.len())?;
            }
        }

        let nv = attrs::is_non_volatile(attributes);
        let handle = match existing_handle {
            Some(h) => h,
            None => self.index.add_entry(guid, name.clone())?,
        };

        {
            let metadata = self.index.metadata_mut(handle);
            metadata.attributes = attributes;
            if let Some(ts) = new_timestamp {
                metadata.timestamp = ts;
            }
            if let Some(fp) = new_fingerprint {
                metadata.fingerprint = fp;
            }
        }

        let already_set = existing_handle.map_or(false, |h| self.index.info(h).is_variable_set);
        let uid = self.index.metadata(handle).uid;

        if !already_set {
            self.index.set_variable(handle, attributes);
            if nv {
                if let Err(e) = self.sync_index() {
                    self.index.remove_unused_entry(handle);
                    return Err(e);
                }
            }
            if let Err(e) = self.select_delegate_store_mut(nv).create(owner_id, uid, payload.len().max(1), 0) {
                self.recover_from_store_failure(handle, nv);
                return Err(e);
            }
            if let Err(e) = self.select_delegate_store_mut(nv).overwrite(owner_id, uid, &payload) {
                self.recover_from_store_failure(handle, nv);
                return Err(e);
            }
        } else {
            let result = if is_append {
                self.select_delegate_store_mut(nv).append_write(owner_id, uid, &payload)
            } else {
                self.select_delegate_store_mut(nv).overwrite(owner_id, uid, &payload)
            };
            if let Err(e) = result {
                if nv {
                    let _ = self.purge_orphan_index_entries();
                }
                return Err(e);
            }
            self.index.set_variable(handle, attributes);
            if nv {
                self.sync_index()?;
            }
        }

        Ok(())
    }

    /// A freshly-indexed entry whose backing store write failed. For NV
    /// entries the index already committed the (now dangling) entry, so
    /// reconciliation goes through `purge_orphan_index_entries`; volatile
    /// entries are never synced, so the index can simply be rolled back.
    fn recover_from_store_failure(&mut self, handle: VariableHandle, nv: bool) {
        if nv {
            let _ = self.purge_orphan_index_entries();
        } else {
            self.index.clear_variable(handle);
            self.index.remove_unused_entry(handle);
        }
    }

    #[cfg_attr(feature = "trace", trace)]
    pub fn get_variable(&self, guid: &Guid, name: &[u16], buf: &mut [u8]) -> Result<(usize, u32), EfiStatus> {
        check_name_terminator(name)?;
        let handle = self.index.find(guid, name).ok_or(EfiStatus::NotFound)?;
        let info = self.index.info(handle);
        if !info.is_variable_set {
            return Err(EfiStatus::NotFound);
        }
        let metadata = info.metadata.as_ref().unwrap();
        if !self.is_access_permitted(metadata.attributes) {
            return Err(EfiStatus::NotFound);
        }
        let nv = attrs::is_non_volatile(metadata.attributes);
        let (uid, attributes) = (metadata.uid, metadata.attributes);
        match self.select_delegate_store(nv).load(self.owner_id, uid, buf) {
            Ok(len) => Ok((len, attributes)),
            Err((status, _required)) => Err(status),
        }
    }

    pub fn get_next_variable_name(&self, guid: &Guid, name: &[u16]) -> Result<(Guid, Vec<u16>), EfiStatus> {
        let mut handle = self.index.find_next(guid, name)?;
        loop {
            let info = self.index.info(handle);
            let metadata = info.metadata.as_ref().unwrap();
            if self.is_access_permitted(metadata.attributes) {
                return Ok((metadata.guid, metadata.name.clone()));
            }
            let next_guid = metadata.guid;
            let next_name = metadata.name.clone();
            handle = self.index.find_next(&next_guid, &next_name)?;
        }
    }

    pub fn query_variable_info(&self, attributes: u32) -> Result<VariableInfoStats, EfiStatus> {
        check_attribute_capabilities(attributes)?;
        let nv = attrs::is_non_volatile(attributes);
        let used = self.space_used(nv) as u64;
        let store = self.select_delegate_store(nv);
        Ok(VariableInfoStats {
            max_variable_storage_size: store.total_capacity as u64,
            remaining_variable_storage_size: (store.total_capacity as u64).saturating_sub(used),
            max_variable_size: store.max_variable_size as u64,
        })
    }

    fn space_used(&self, nv: bool) -> usize {
        let store = self.select_delegate_store(nv);
        self.index
            .iter()
            .filter(|(_, info)| info.is_variable_set)
            .filter_map(|(_, info)| info.metadata.as_ref())
            .filter(|m| attrs::is_non_volatile(m.attributes) == nv)
            .filter_map(|m| store.object_size(self.owner_id, m.uid))
            .sum()
    }

    #[cfg_attr(feature = "trace", trace)]
    pub fn exit_boot_service(&mut self) {
        self.is_boot_service = false;
    }

    pub fn set_var_check_property(&mut self, guid: Guid, name: Vec<u16>, constraints: VariableConstraints) -> Result<(), EfiStatus> {
        check_name_terminator(&name)?;
        let handle = match self.index.find(&guid, &name) {
            Some(h) => h,
            None => self.index.add_entry(guid, name)?,
        };
        let info = self.index.info(handle);
        let existing = if info.is_constraints_set {
            Some(info.check_constraints)
        } else {
            None
        };
        let accepted = uefi_variable_checker::set_constraints(existing.as_ref(), existing.is_some(), &constraints)?;
        self.index.set_constraints(handle, accepted);
        if attrs::is_non_volatile(constraints.attributes) {
            self.sync_index()?;
        }
        Ok(())
    }

    pub fn get_var_check_property(&self, guid: &Guid, name: &[u16]) -> Result<VariableConstraints, EfiStatus> {
        let handle = self.index.find(guid, name).ok_or(EfiStatus::NotFound)?;
        let info = self.index.info(handle);
        if !info.is_constraints_set {
            return Err(EfiStatus::NotFound);
        }
        Ok(info.check_constraints)
    }

    /// Scans every non-volatile, set index entry for a backend object
    /// that no longer exists and clears the dangling entry, re-syncing
    /// the index if anything was purged (§4.7 "Orphan recovery").
    pub fn purge_orphan_index_entries(&mut self) -> Result<(), EfiStatus> {
        let candidates: Vec<(VariableHandle, u64)> = self
            .index
            .iter()
            .filter(|(_, info)| info.is_variable_set)
            .filter_map(|(h, info)| {
                info.metadata
                    .as_ref()
                    .filter(|m| attrs::is_non_volatile(m.attributes))
                    .map(|m| (h, m.uid))
            })
            .collect();

        let mut found_orphan = false;
        for (handle, uid) in candidates {
            if !self.persistent.exists(self.owner_id, uid) {
                self.index.clear_variable(handle);
                self.index.remove_unused_entry(handle);
                found_orphan = true;
            }
        }
        if found_orphan {
            self.sync_index()?;
        }
        Ok(())
    }
}

impl KeyVariableSource for UefiVariableStore {
    fn key_variable_payload(&self, key_name: &str) -> Option<Vec<u8>> {
        let guid = GLOBAL_VARIABLE_GUID;
        let name = names::utf16_name(key_name);
        let handle = self.index.find(&guid, &name)?;
        let info = self.index.info(handle);
        if !info.is_variable_set {
            return None;
        }
        let metadata = info.metadata.as_ref()?;
        let nv = attrs::is_non_volatile(metadata.attributes);
        let store = self.select_delegate_store(nv);
        let size = store.object_size(self.owner_id, metadata.uid)?;
        let mut buf = vec![0u8; size];
        store.load(self.owner_id, metadata.uid, &mut buf).ok()?;
        Some(buf)
    }
}

fn read_slot(store: &DelegateStore, owner_id: u32, uid: u64) -> Option<Vec<u8>> {
    let size = store.object_size(owner_id, uid)?;
    if size == 0 {
        return None;
    }
    let mut buf = vec![0u8; size];
    store.load(owner_id, uid, &mut buf).ok()?;
    Some(buf)
}

fn slot_counter(buf: &[u8]) -> Option<u32> {
    if buf.len() < 4 {
        return None;
    }
    Some(u32::from_le_bytes(buf[0..4].try_into().unwrap()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StorageInfo;
    use rpc_status::PsaStatus;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryBackend {
        objects: HashMap<(u32, u64), Vec<u8>>,
    }

    impl StorageBackend for MemoryBackend {
        fn create(&mut self, client_id: u32, uid: u64, _capacity: usize, _flags: u32) -> Result<(), PsaStatus> {
            self.objects.entry((client_id, uid)).or_default();
            Ok(())
        }
        fn set(&mut self, client_id: u32, uid: u64, data: &[u8]) -> Result<(), PsaStatus> {
            self.objects.insert((client_id, uid), data.to_vec());
            Ok(())
        }
        fn set_extended(&mut self, client_id: u32, uid: u64, offset: usize, data: &[u8]) -> Result<(), PsaStatus> {
            let obj = self.objects.entry((client_id, uid)).or_default();
            obj.truncate(offset);
            obj.extend_from_slice(data);
            Ok(())
        }
        fn get(&self, client_id: u32, uid: u64, offset: usize, buf: &mut [u8]) -> Result<usize, PsaStatus> {
            let obj = self.objects.get(&(client_id, uid)).ok_or(PsaStatus::DoesNotExist)?;
            let end = (offset + buf.len()).min(obj.len());
            let n = end.saturating_sub(offset);
            buf[..n].copy_from_slice(&obj[offset..end]);
            Ok(n)
        }
        fn get_info(&self, client_id: u32, uid: u64) -> Result<StorageInfo, PsaStatus> {
            let obj = self.objects.get(&(client_id, uid)).ok_or(PsaStatus::DoesNotExist)?;
            Ok(StorageInfo { size: obj.len(), capacity: obj.len(), flags: 0 })
        }
        fn remove(&mut self, client_id: u32, uid: u64) -> Result<(), PsaStatus> {
            self.objects.remove(&(client_id, uid)).map(|_| ()).ok_or(PsaStatus::DoesNotExist)
        }
        fn get_support(&self, _client_id: u32) -> u32 {
            0
        }
    }

    struct NoCrypto;
    impl CryptoBackend for NoCrypto {
        fn verify_pkcs7_signature(&self, _blob: &[u8], _digest: &[u8; 32], _cert: &[u8]) -> bool {
            false
        }
    }
    impl FingerprintProvider for NoCrypto {
        fn get_uefi_priv_auth_var_fingerprint(&self, _blob: &[u8]) -> Option<[u8; 32]> {
            None
        }
    }

    fn name(s: &str) -> Vec<u16> {
        names::utf16_name(s)
    }

    // Index-slot uids reserved well outside the 1..=max_variables range
    // `generate_uid` hands out, so a variable's own uid can never collide
    // with the index's storage object.
    const SLOT_A: u64 = 1000;
    const SLOT_B: u64 = 1001;

    fn new_store() -> UefiVariableStore {
        let persistent = DelegateStore::new(true, 4096, 1024, Box::new(MemoryBackend::default()));
        let volatile = DelegateStore::new(false, 4096, 1024, Box::new(MemoryBackend::default()));
        UefiVariableStore::new(16, 7, persistent, volatile, SLOT_A, SLOT_B, Box::new(NoCrypto), Box::new(NoCrypto)).unwrap()
    }

    // S1 — plain set/get/append/remove.
    #[test]
    fn set_then_get_round_trips_volatile_variable() {
        let mut store = new_store();
        let guid = Guid::new([1; 16]);
        store
            .set_variable(guid, name("Foo"), attrs::BOOTSERVICE_ACCESS, b"hello".to_vec())
            .unwrap();

        let mut buf = [0u8; 16];
        let (len, attributes) = store.get_variable(&guid, &name("Foo"), &mut buf).unwrap();
        assert_eq!(&buf[..len], b"hello");
        assert_eq!(attributes, attrs::BOOTSERVICE_ACCESS);
    }

    #[test]
    fn append_write_extends_existing_value() {
        let mut store = new_store();
        let guid = Guid::new([1; 16]);
        let attributes = attrs::BOOTSERVICE_ACCESS;
        store.set_variable(guid, name("Foo"), attributes, b"ab".to_vec()).unwrap();
        store
            .set_variable(guid, name("Foo"), attributes | attrs::APPEND_WRITE, b"cd".to_vec())
            .unwrap();

        let mut buf = [0u8; 16];
        let (len, _) = store.get_variable(&guid, &name("Foo"), &mut buf).unwrap();
        assert_eq!(&buf[..len], b"abcd");
    }

    #[test]
    fn zero_size_set_deletes_existing_variable() {
        let mut store = new_store();
        let guid = Guid::new([1; 16]);
        store.set_variable(guid, name("Foo"), attrs::BOOTSERVICE_ACCESS, b"v".to_vec()).unwrap();
        store.set_variable(guid, name("Foo"), 0, Vec::new()).unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(store.get_variable(&guid, &name("Foo"), &mut buf).unwrap_err(), EfiStatus::NotFound);
    }

    #[test]
    fn delete_of_missing_variable_is_not_found() {
        let mut store = new_store();
        let guid = Guid::new([1; 16]);
        assert_eq!(store.set_variable(guid, name("Ghost"), 0, Vec::new()).unwrap_err(), EfiStatus::NotFound);
    }

    #[test]
    fn non_volatile_write_persists_across_an_index_reload() {
        let persistent_backend = Box::new(MemoryBackend::default());
        let guid = Guid::new([3; 16]);

        // Build the store on a backend we can hand to a second store
        // instance, since the fake `MemoryBackend` has no on-disk image.
        let mut persistent = DelegateStore::new(true, 4096, 1024, persistent_backend);
        {
            let mut index = VariableIndex::new(16);
            let handle = index.add_entry(guid, name("NvVar")).unwrap();
            index.set_variable(handle, attrs::NON_VOLATILE | attrs::BOOTSERVICE_ACCESS);
            let (buf, _) = index.dump();
            persistent.overwrite(7, SLOT_A, &buf).unwrap();
            persistent.create(7, index.metadata(handle).uid, 5, 0).unwrap();
            persistent.overwrite(7, index.metadata(handle).uid, b"value").unwrap();
        }

        let volatile = DelegateStore::new(false, 4096, 1024, Box::new(MemoryBackend::default()));
        let store = UefiVariableStore::new(16, 7, persistent, volatile, SLOT_A, SLOT_B, Box::new(NoCrypto), Box::new(NoCrypto)).unwrap();

        let mut buf = [0u8; 16];
        let (len, _) = store.get_variable(&guid, &name("NvVar"), &mut buf).unwrap();
        assert_eq!(&buf[..len], b"value");
    }

    #[test]
    fn two_slot_load_prefers_successor_counter() {
        let backend = Box::new(MemoryBackend::default());
        let mut persistent = DelegateStore::new(true, 4096, 1024, backend);

        let mut stale = VariableIndex::new(16);
        let h1 = stale.add_entry(Guid::new([1; 16]), name("Stale")).unwrap();
        stale.set_variable(h1, attrs::NON_VOLATILE);
        let (stale_buf, _) = stale.dump();
        persistent.overwrite(7, SLOT_A, &stale_buf).unwrap(); // slot A, counter 1
        stale.confirm_write();

        let mut fresh = VariableIndex::new(16);
        let h2 = fresh.add_entry(Guid::new([2; 16]), name("Fresh")).unwrap();
        fresh.set_variable(h2, attrs::NON_VOLATILE);
        fresh.confirm_write(); // fresh.counter() == 1 already, dump writes 2
        let (fresh_buf, _) = fresh.dump();
        persistent.overwrite(7, SLOT_B, &fresh_buf).unwrap(); // slot B, counter 2

        let volatile = DelegateStore::new(false, 4096, 1024, Box::new(MemoryBackend::default()));
        let store = UefiVariableStore::new(16, 7, persistent, volatile, SLOT_A, SLOT_B, Box::new(NoCrypto), Box::new(NoCrypto)).unwrap();

        assert!(store.index.find(&Guid::new([2; 16]), &name("Fresh")).is_some());
        assert!(store.index.find(&Guid::new([1; 16]), &name("Stale")).is_none());
    }

    #[test]
    fn divergent_counters_fail_the_load() {
        let backend = Box::new(MemoryBackend::default());
        let mut persistent = DelegateStore::new(true, 4096, 1024, backend);

        let mut a = VariableIndex::new(16);
        a.add_entry(Guid::new([1; 16]), name("A")).unwrap();
        let (buf_a, _) = a.dump();
        persistent.overwrite(7, SLOT_A, &buf_a).unwrap(); // counter 1

        let mut b = VariableIndex::new(16);
        b.add_entry(Guid::new([2; 16]), name("B")).unwrap();
        b.confirm_write();
        b.confirm_write();
        b.confirm_write();
        let (buf_b, _) = b.dump();
        persistent.overwrite(7, SLOT_B, &buf_b).unwrap(); // counter 4, diverges by 3

        let volatile = DelegateStore::new(false, 4096, 1024, Box::new(MemoryBackend::default()));
        let result = UefiVariableStore::new(16, 7, persistent, volatile, SLOT_A, SLOT_B, Box::new(NoCrypto), Box::new(NoCrypto));
        assert_eq!(result.err(), Some(EfiStatus::DeviceError));
    }

    // S3 — runtime gating.
    #[test]
    fn boot_service_only_variable_is_hidden_after_exit() {
        let mut store = new_store();
        let guid = Guid::new([1; 16]);
        store.set_variable(guid, name("Boot"), attrs::BOOTSERVICE_ACCESS, b"v".to_vec()).unwrap();
        store.exit_boot_service();

        let mut buf = [0u8; 8];
        assert_eq!(store.get_variable(&guid, &name("Boot"), &mut buf).unwrap_err(), EfiStatus::NotFound);
    }

    #[test]
    fn runtime_without_bootservice_is_rejected() {
        let mut store = new_store();
        let guid = Guid::new([1; 16]);
        assert_eq!(
            store.set_variable(guid, name("Foo"), attrs::RUNTIME_ACCESS, b"v".to_vec()).unwrap_err(),
            EfiStatus::InvalidParameter
        );
    }

    #[test]
    fn changing_attributes_on_update_is_rejected() {
        let mut store = new_store();
        let guid = Guid::new([1; 16]);
        store.set_variable(guid, name("Foo"), attrs::BOOTSERVICE_ACCESS, b"v".to_vec()).unwrap();
        assert_eq!(
            store
                .set_variable(guid, name("Foo"), attrs::BOOTSERVICE_ACCESS | attrs::RUNTIME_ACCESS, b"w".to_vec())
                .unwrap_err(),
            EfiStatus::InvalidParameter
        );
    }

    // S4 — enumeration.
    #[test]
    fn get_next_variable_name_enumerates_in_slot_order() {
        let mut store = new_store();
        let guid = Guid::new([1; 16]);
        store.set_variable(guid, name("A"), attrs::BOOTSERVICE_ACCESS, b"1".to_vec()).unwrap();
        store.set_variable(guid, name("B"), attrs::BOOTSERVICE_ACCESS, b"2".to_vec()).unwrap();

        let (g1, n1) = store.get_next_variable_name(&Guid::new([0; 16]), &[0]).unwrap();
        assert_eq!((g1, n1), (guid, name("A")));
        let (g2, n2) = store.get_next_variable_name(&g1, &n1).unwrap();
        assert_eq!((g2, n2), (guid, name("B")));
        assert_eq!(store.get_next_variable_name(&g2, &n2).unwrap_err(), EfiStatus::NotFound);
    }

    #[test]
    fn query_variable_info_reports_remaining_persistent_space() {
        let mut store = new_store();
        let guid = Guid::new([1; 16]);
        store
            .set_variable(guid, name("NvVar"), attrs::NON_VOLATILE | attrs::BOOTSERVICE_ACCESS, b"1234".to_vec())
            .unwrap();

        let info = store.query_variable_info(attrs::NON_VOLATILE).unwrap();
        assert_eq!(info.max_variable_storage_size, 4096);
        assert_eq!(info.remaining_variable_storage_size, 4096 - 4);
    }

    #[test]
    fn set_var_check_property_round_trips() {
        let mut store = new_store();
        let guid = Guid::new([1; 16]);
        let constraints = VariableConstraints {
            revision: uefi_variable_checker::VAR_CHECK_VARIABLE_PROPERTY_REVISION,
            property: 0,
            attributes: attrs::BOOTSERVICE_ACCESS,
            min_size: 1,
            max_size: 8,
        };
        store.set_var_check_property(guid, name("Foo"), constraints).unwrap();
        assert_eq!(store.get_var_check_property(&guid, &name("Foo")).unwrap(), constraints);

        assert_eq!(
            store.set_variable(guid, name("Foo"), attrs::BOOTSERVICE_ACCESS, Vec::new()).unwrap_err(),
            EfiStatus::InvalidParameter // zero-size write violates min_size, not treated as delete here since attrs carry BS
        );
    }
}
