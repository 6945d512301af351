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
//! The secure-storage collaborator contract the store delegates object
//! bytes to (§6 "Secure-storage backend (consumed)"). Concrete backends
//! (internal-trusted-storage, protected-storage) are out of scope; this
//! crate only needs the trait.

use rpc_status::PsaStatus;

pub const FLAG_WRITE_ONCE: u32 = 0x0000_0001;
pub const FLAG_NO_CONFIDENTIALITY: u32 = 0x0000_0002;
pub const FLAG_NO_REPLAY_PROTECTION: u32 = 0x0000_0004;

/// Capability bit returned by `get_support`: the backend can extend an
/// existing object in place instead of requiring read-modify-write.
pub const SUPPORT_SET_EXTENDED: u32 = 0x0000_0001;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StorageInfo {
    pub size: usize,
    pub capacity: usize,
    pub flags: u32,
}

/// A PSA-style secure storage collaborator, addressed by a 64-bit uid
/// scoped to `client_id`.
pub trait StorageBackend {
    fn create(&mut self, client_id: u32, uid: u64, capacity: usize, flags: u32) -> Result<(), PsaStatus>;
    fn set(&mut self, client_id: u32, uid: u64, data: &[u8]) -> Result<(), PsaStatus>;
    /// Extends the object at `offset` with `data`, growing it if the
    /// backend supports native append (`SUPPORT_SET_EXTENDED`).
    fn set_extended(&mut self, client_id: u32, uid: u64, offset: usize, data: &[u8]) -> Result<(), PsaStatus>;
    fn get(&self, client_id: u32, uid: u64, offset: usize, buf: &mut [u8]) -> Result<usize, PsaStatus>;
    fn get_info(&self, client_id: u32, uid: u64) -> Result<StorageInfo, PsaStatus>;
    fn remove(&mut self, client_id: u32, uid: u64) -> Result<(), PsaStatus>;
    fn get_support(&self, client_id: u32) -> u32;
}
