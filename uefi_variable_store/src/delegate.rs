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
//! One delegate storage space (persistent or volatile) and the
//! overwrite/append/remove/load primitives §4.7 builds on. Grounded on
//! `store_variable_data`, `store_overwrite`, `store_append_write`,
//! `remove_variable_data` and `load_variable_data` in the original
//! `uefi_variable_store.c`.

use crate::backend::{StorageBackend, SUPPORT_SET_EXTENDED};
use rpc_status::EfiStatus;

pub struct DelegateStore {
    pub is_nv: bool,
    pub total_capacity: usize,
    pub max_variable_size: usize,
    pub backend: Box<dyn StorageBackend>,
}

impl DelegateStore {
    pub fn new(is_nv: bool, total_capacity: usize, max_variable_size: usize, backend: Box<dyn StorageBackend>) -> Self {
        DelegateStore {
            is_nv,
            total_capacity,
            max_variable_size,
            backend,
        }
    }

    pub fn overwrite(&mut self, client_id: u32, uid: u64, data: &[u8]) -> Result<(), EfiStatus> {
        if data.len() > self.max_variable_size {
            return Err(EfiStatus::InvalidParameter);
        }
        self.backend.set(client_id, uid, data).map_err(EfiStatus::from)
    }

    /// Appends `data` to the object at `uid`, using the backend's native
    /// extend capability when available, otherwise falling back to a
    /// read-modify-write. Enforces `max_variable_size` on the resulting
    /// total length.
    pub fn append_write(&mut self, client_id: u32, uid: u64, data: &[u8]) -> Result<(), EfiStatus> {
        let info = self.backend.get_info(client_id, uid).map_err(EfiStatus::from)?;
        let new_size = info.size.checked_add(data.len()).ok_or(EfiStatus::InvalidParameter)?;
        if new_size > self.max_variable_size {
            return Err(EfiStatus::InvalidParameter);
        }

        if self.backend.get_support(client_id) & SUPPORT_SET_EXTENDED != 0 {
            self.backend
                .set_extended(client_id, uid, info.size, data)
                .map_err(EfiStatus::from)
        } else {
            let mut combined = vec![0u8; info.size];
            self.backend
                .get(client_id, uid, 0, &mut combined)
                .map_err(EfiStatus::from)?;
            combined.extend_from_slice(data);
            self.backend.set(client_id, uid, &combined).map_err(EfiStatus::from)
        }
    }

    pub fn create(&mut self, client_id: u32, uid: u64, capacity: usize, flags: u32) -> Result<(), EfiStatus> {
        self.backend.create(client_id, uid, capacity, flags).map_err(EfiStatus::from)
    }

    pub fn remove(&mut self, client_id: u32, uid: u64) -> Result<(), EfiStatus> {
        self.backend.remove(client_id, uid).map_err(EfiStatus::from)
    }

    /// Loads the full object at `uid` into `buf`. If `buf` is smaller than
    /// the stored object, returns the required size as the error payload
    /// (`Err((EfiStatus::BufferTooSmall, required_size))`), matching
    /// `load_variable_data`'s `storage_info.size` path.
    pub fn load(&self, client_id: u32, uid: u64, buf: &mut [u8]) -> Result<usize, (EfiStatus, usize)> {
        let info = self
            .backend
            .get_info(client_id, uid)
            .map_err(|e| (EfiStatus::from(e), 0))?;
        if buf.len() < info.size {
            return Err((EfiStatus::BufferTooSmall, info.size));
        }
        self.backend
            .get(client_id, uid, 0, &mut buf[..info.size])
            .map_err(|e| (EfiStatus::from(e), info.size))
    }

    pub fn exists(&self, client_id: u32, uid: u64) -> bool {
        self.backend.get_info(client_id, uid).is_ok()
    }

    pub fn object_size(&self, client_id: u32, uid: u64) -> Option<usize> {
        self.backend.get_info(client_id, uid).ok().map(|i| i.size)
    }
}
