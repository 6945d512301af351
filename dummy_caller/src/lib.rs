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
//! An in-process [`Caller`] that dispatches directly into a
//! [`ServiceEndpoint`], the same role `rot13_connector` plays for the TA
//! client stack this framework was generalized from: no real transport, no
//! real partition manager, just the session bookkeeping and shared-memory
//! ownership a transport would otherwise own, so [`rpc_caller::CallerSession`]
//! and a service endpoint can be exercised end to end within one process.
//!
//! Where `rot13_connector` keeps its single-connection state in statics
//! (forced by its C-ABI vtable), `DummyCaller` keeps the same single-session
//! invariant as plain owned fields: the `Caller` trait already hands out
//! `&mut self`, so there is no C boundary here to work around.

use rpc_abi::{management_opcode, WireMessage, MANAGEMENT_INTERFACE_ID};
use rpc_caller::{CallResponse, Caller};
use rpc_common::uuid::uuid_equal;
use rpc_common::{SharedMem, Uuid};
use rpc_provider::ServiceEndpoint;
use rpc_status::RpcStatus;

#[cfg(feature = "trace")]
use func_trace::trace;

/// Wraps a single [`ServiceEndpoint`] and answers [`Caller`] against it
/// in-process. One session open at a time, matching the endpoint's own
/// single-interface addressing.
pub struct DummyCaller<Ctx> {
    service_uuid: Uuid,
    endpoint: ServiceEndpoint<Ctx>,
    source_id: u16,
    client_id: u32,
    wire_interface_id: Option<u8>,
    next_mem_id: u64,
}

impl<Ctx> DummyCaller<Ctx> {
    /// `service_uuid` must be the identity `endpoint` itself answers
    /// `INTERFACE_ID_QUERY` under. `source_id`/`client_id` are stamped on
    /// every request this caller issues, standing in for the originating
    /// partition/client the real transport would supply.
    pub fn new(service_uuid: Uuid, endpoint: ServiceEndpoint<Ctx>, source_id: u16, client_id: u32) -> Self {
        DummyCaller {
            service_uuid,
            endpoint,
            source_id,
            client_id,
            wire_interface_id: None,
            next_mem_id: 1,
        }
    }

    pub fn ctx(&self) -> &Ctx {
        self.endpoint.ctx()
    }

    pub fn ctx_mut(&mut self) -> &mut Ctx {
        self.endpoint.ctx_mut()
    }

    fn query_interface_id(&mut self) -> Result<u8, RpcStatus> {
        let mut req = WireMessage::new();
        req.set_interface_id(MANAGEMENT_INTERFACE_ID);
        req.set_opcode(management_opcode::INTERFACE_ID_QUERY);
        req.set_uuid_bytes(&self.service_uuid.bytes);
        let resp = self.endpoint.handle(self.source_id, &req, &[], &mut []);
        if RpcStatus::from_wire(resp.rpc_status()) != RpcStatus::Success {
            return Err(RpcStatus::ErrorNotFound);
        }
        Ok(resp.queried_interface_id())
    }
}

impl<Ctx> Caller for DummyCaller<Ctx> {
    #[cfg_attr(feature = "trace", trace)]
    fn open_session(&mut self, uuid: &Uuid, _endpoint_id: u16) -> Result<(), RpcStatus> {
        if self.wire_interface_id.is_some() {
            return Err(RpcStatus::ErrorInvalidState);
        }
        if !uuid_equal(uuid, &self.service_uuid) {
            return Err(RpcStatus::ErrorNotFound);
        }
        let interface_id = self.query_interface_id()?;
        self.wire_interface_id = Some(interface_id);
        Ok(())
    }

    #[cfg_attr(feature = "trace", trace)]
    fn find_and_open_session(&mut self, uuid: &Uuid) -> Result<(), RpcStatus> {
        // There is only ever the one endpoint this caller was built around;
        // "finding" it is the same interface-id query `open_session` does.
        self.open_session(uuid, 0)
    }

    #[cfg_attr(feature = "trace", trace)]
    fn close_session(&mut self) -> Result<(), RpcStatus> {
        match self.wire_interface_id.take() {
            Some(_) => Ok(()),
            None => Err(RpcStatus::ErrorInvalidState),
        }
    }

    #[cfg_attr(feature = "trace", trace)]
    fn create_shared_memory(&mut self, size: usize) -> Result<SharedMem, RpcStatus> {
        if size == 0 {
            return Ok(SharedMem::empty());
        }
        let boxed: Box<[u8]> = vec![0u8; size].into_boxed_slice();
        let ptr = Box::into_raw(boxed) as *mut u8;
        let id = self.next_mem_id;
        self.next_mem_id += 1;
        Ok(SharedMem::new(id, ptr, size))
    }

    #[cfg_attr(feature = "trace", trace)]
    fn release_shared_memory(&mut self, mem: &mut SharedMem) -> Result<(), RpcStatus> {
        if mem.is_empty() {
            return Ok(());
        }
        let size = mem.size();
        // SAFETY: `mem` was produced by `create_shared_memory` above, which
        // allocated exactly `size` bytes via `Box<[u8]>::into_raw` and handed
        // the resulting pointer to `SharedMem::new`; reconstructing the box
        // from the same pointer/length and dropping it is the matching free.
        unsafe {
            let slice = mem.as_mut_slice(size).ok_or(RpcStatus::ErrorInvalidState)?;
            drop(Box::from_raw(slice as *mut [u8]));
        }
        *mem = SharedMem::empty();
        Ok(())
    }

    #[cfg_attr(feature = "trace", trace)]
    fn call(&mut self, opcode: u32, mem: &mut SharedMem, request_length: usize) -> Result<CallResponse, RpcStatus> {
        let interface_id = self.wire_interface_id.ok_or(RpcStatus::ErrorInvalidState)?;

        // SAFETY: `mem` is a live mapping owned by this caller for the
        // duration of this call; the length check happens inside `as_slice`.
        let request_bytes = unsafe { mem.as_slice(request_length) }
            .ok_or(RpcStatus::ErrorInvalidRequestBody)?
            .to_vec();
        let mut response_bytes = vec![0u8; mem.size()];

        let mut req = WireMessage::new();
        req.set_interface_id(interface_id);
        req.set_opcode(opcode as u16);
        req.set_request_length(request_length as u32);
        req.set_client_id(self.client_id);

        let resp = self.endpoint.handle(self.source_id, &req, &request_bytes, &mut response_bytes);
        let status = RpcStatus::from_wire(resp.rpc_status());
        if status != RpcStatus::Success {
            return Err(status);
        }

        let response_length = resp.response_length() as usize;
        if response_length > response_bytes.len() {
            return Err(RpcStatus::ErrorInvalidResponseBody);
        }

        // SAFETY: same live-mapping contract as the read above.
        let dest = unsafe { mem.as_mut_slice(response_length) }.ok_or(RpcStatus::ErrorInvalidResponseBody)?;
        dest.copy_from_slice(&response_bytes[..response_length]);

        // The wire carries only the low 32 bits of the service status
        // (regs[2], §4.1); a caller this far from the service has no way to
        // recover the high bits of a 64-bit EfiStatus from that alone, so
        // this is the raw low32 value zero-extended, not a reconstructed
        // EfiStatus. Every EfiStatus variant's low 32 bits are already
        // distinct, so comparing against `i64::from(EfiStatus::X) as u32 as
        // i64` still identifies the status unambiguously.
        Ok(CallResponse {
            response_length,
            service_status: resp.service_status_low32() as i64,
        })
    }
}
