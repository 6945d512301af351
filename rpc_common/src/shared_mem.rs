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
//! Shared-memory descriptor (C3): the handle/pointer/size triple exchanged
//! between a caller and the partition manager for bulk request/response
//! payloads.

/// A `SharedMem` is a caller-owned mapping. `id` is opaque to everything but
/// the partition manager that issued it: it may be a real memory-management
/// handle, the zero sentinel meaning "no memory attached", or a synthetic
/// value used by an in-process caller that never leaves the address space.
///
/// The raw pointer is intentionally not exposed as a long-lived reference;
/// [`SharedMem::as_slice`]/[`SharedMem::as_mut_slice`] construct a
/// length-checked slice on demand and must only be called while the mapping
/// is known to be live (between `create_shared_memory` and
/// `release_shared_memory`, or for the duration of a single dispatch inside
/// an endpoint). Nothing in this crate stores the resulting slice.
#[derive(Debug)]
pub struct SharedMem {
    id: u64,
    virt: *mut u8,
    size: usize,
}

/// Sentinel `id` meaning "no shared memory attached to this session".
pub const NO_MEMORY: u64 = 0;

impl SharedMem {
    /// An empty descriptor: no memory attached.
    pub const fn empty() -> Self {
        SharedMem {
            id: NO_MEMORY,
            virt: core::ptr::null_mut(),
            size: 0,
        }
    }

    /// Construct a descriptor for a caller-owned mapping. `virt` must remain
    /// valid for `size` bytes until the descriptor is released.
    pub const fn new(id: u64, virt: *mut u8, size: usize) -> Self {
        SharedMem { id, virt, size }
    }

    pub const fn id(&self) -> u64 {
        self.id
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    pub const fn is_empty(&self) -> bool {
        self.id == NO_MEMORY || self.virt.is_null() || self.size == 0
    }

    /// Borrow the mapping as a read-only slice no longer than `len`.
    ///
    /// # Safety
    /// The caller must ensure the mapping described by `self` is still live
    /// and that no other code is concurrently writing through the same
    /// pointer.
    pub unsafe fn as_slice(&self, len: usize) -> Option<&[u8]> {
        if self.is_empty() || len > self.size {
            return None;
        }
        Some(core::slice::from_raw_parts(self.virt, len))
    }

    /// Borrow the mapping as a mutable slice no longer than `len`.
    ///
    /// # Safety
    /// Same requirements as [`SharedMem::as_slice`], plus exclusive access
    /// for the lifetime of the returned slice.
    pub unsafe fn as_mut_slice(&mut self, len: usize) -> Option<&mut [u8]> {
        if self.is_empty() || len > self.size {
            return None;
        }
        Some(core::slice::from_raw_parts_mut(self.virt, len))
    }
}

// SharedMem is handed across session/provider boundaries that are
// themselves serialized by the transaction state machine (C5) or by the
// endpoint's single-threaded dispatch loop; it is never mutated from two
// threads at once in practice. The raw pointer otherwise makes it
// !Send/!Sync by default, which would make it unusable as session state.
unsafe impl Send for SharedMem {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_descriptor_has_no_memory() {
        let mem = SharedMem::empty();
        assert!(mem.is_empty());
        assert_eq!(mem.id(), NO_MEMORY);
    }

    #[test]
    fn slice_rejects_oversized_request() {
        let mut buf = [0u8; 8];
        let mem = SharedMem::new(1, buf.as_mut_ptr(), buf.len());
        unsafe {
            assert!(mem.as_slice(9).is_none());
            assert!(mem.as_slice(8).is_some());
        }
    }
}
