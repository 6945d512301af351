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
//! Caller interface (C4) and caller session (C5), §4.3.
//!
//! [`Caller`] is the per-transport dispatch table — one implementation per
//! transport (direct in-process, a TEE driver ioctl, FF-A from a client
//! secure partition, HTTP, a null/dummy caller, ...), the same role
//! `tps_connector::Connector` plays for the TA client stack this framework
//! was generalized from. [`CallerSession`] is the stateful wrapper every
//! client actually programs against.

mod session;

pub use session::{CallerSession, SharedMemPolicy};

use rpc_common::{SharedMem, Uuid};
use rpc_status::RpcStatus;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Result of a completed `call` invocation.
#[derive(Copy, Clone, Debug)]
pub struct CallResponse {
    pub response_length: usize,
    pub service_status: i64,
}

/// Abstract caller operations available once a transport has located an
/// endpoint. Implementations are expected to be small adapters around a
/// concrete transport; all policy (shared-memory allocation strategy,
/// transaction discipline) lives in [`CallerSession`], not here.
pub trait Caller {
    fn open_session(&mut self, uuid: &Uuid, endpoint_id: u16) -> Result<(), RpcStatus>;

    fn find_and_open_session(&mut self, uuid: &Uuid) -> Result<(), RpcStatus>;

    fn close_session(&mut self) -> Result<(), RpcStatus>;

    fn create_shared_memory(&mut self, size: usize) -> Result<SharedMem, RpcStatus>;

    fn release_shared_memory(&mut self, mem: &mut SharedMem) -> Result<(), RpcStatus>;

    /// Send `request_length` bytes currently staged in `mem` to the open
    /// session under `opcode`, and report how many response bytes were
    /// written back into `mem` plus the service-specific status.
    fn call(
        &mut self,
        opcode: u32,
        mem: &mut SharedMem,
        request_length: usize,
    ) -> Result<CallResponse, RpcStatus>;
}
