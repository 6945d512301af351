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
//! Service endpoint (C7), §4.4.
//!
//! A `ServiceEndpoint` is the UUID-addressable server side of a session: it
//! answers the four management-interface opcodes itself and routes anything
//! else to the one service provider it was built with, using the interface
//! id the management interface assigned at session open.
//!
//! Shared-memory retrieve/relinquish are modelled as bookkeeping
//! acknowledgements rather than real `FFA_MEM_RETRIEVE_REQ`/`RELINQUISH`
//! exchanges with a partition manager — that exchange is explicitly out of
//! scope (no hardware-specific mailbox drivers, §1) and is owned by the
//! collaborator the endpoint would run inside, not by this framework.

use rpc_abi::{management_opcode, WireMessage, MANAGEMENT_INTERFACE_ID, PROTOCOL_VERSION};
use rpc_common::Uuid;
use rpc_status::RpcStatus;

use crate::provider::ServiceProvider;
use crate::request::RpcRequest;

#[cfg(feature = "trace")]
use func_trace::trace;

/// Server-side view of one registered service interface.
pub struct ServiceEndpoint<Ctx> {
    service_uuid: Uuid,
    interface_id: u8,
    provider: Box<dyn ServiceProvider<Ctx>>,
    ctx: Ctx,
    retrieved_handles: alloc_free_set::HandleSet,
}

mod alloc_free_set {
    //! A minimal "is this handle currently retrieved" set, just large enough
    //! to make relinquish-without-retrieve observable in tests without
    //! pulling in a real memory-management collaborator.
    pub struct HandleSet(Vec<u64>);

    impl HandleSet {
        pub fn new() -> Self {
            HandleSet(Vec::new())
        }

        pub fn insert(&mut self, handle: u64) {
            if !self.0.contains(&handle) {
                self.0.push(handle);
            }
        }

        pub fn remove(&mut self, handle: u64) -> bool {
            if let Some(pos) = self.0.iter().position(|h| *h == handle) {
                self.0.remove(pos);
                true
            } else {
                false
            }
        }
    }
}

impl<Ctx> ServiceEndpoint<Ctx> {
    pub fn new(service_uuid: Uuid, interface_id: u8, provider: Box<dyn ServiceProvider<Ctx>>, ctx: Ctx) -> Self {
        ServiceEndpoint {
            service_uuid,
            interface_id,
            provider,
            ctx,
            retrieved_handles: alloc_free_set::HandleSet::new(),
        }
    }

    pub fn ctx(&self) -> &Ctx {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut Ctx {
        &mut self.ctx
    }

    /// Handle one FF-A direct message addressed to this endpoint.
    ///
    /// `request_body`/`response_body` are the shared-memory-backed buffers
    /// referenced by the data-path request/response; they are unused for
    /// management messages.
    #[cfg_attr(feature = "trace", trace)]
    pub fn handle(
        &mut self,
        source_id: u16,
        req_msg: &WireMessage,
        request_body: &[u8],
        response_body: &mut [u8],
    ) -> WireMessage {
        if req_msg.is_management() {
            self.handle_management(req_msg)
        } else if req_msg.interface_id() == self.interface_id {
            self.handle_data(source_id, req_msg, request_body, response_body)
        } else {
            let mut resp = WireMessage::new();
            WireMessage::copy_control_reg(req_msg, &mut resp);
            resp.set_rpc_status(RpcStatus::ErrorInvalidValue.into());
            resp
        }
    }

    fn handle_management(&mut self, req_msg: &WireMessage) -> WireMessage {
        let mut resp = WireMessage::new();
        WireMessage::copy_control_reg(req_msg, &mut resp);

        match req_msg.opcode() {
            management_opcode::VERSION => {
                resp.set_version(PROTOCOL_VERSION);
            }
            management_opcode::INTERFACE_ID_QUERY => {
                let queried = req_msg.uuid_bytes();
                if queried == self.service_uuid.bytes {
                    resp.set_rpc_status(RpcStatus::Success.into());
                    resp.set_queried_interface_id(self.interface_id);
                } else {
                    resp.set_rpc_status(RpcStatus::ErrorInvalidValue.into());
                }
            }
            management_opcode::MEMORY_RETRIEVE => {
                let handle = req_msg.memory_handle();
                self.retrieved_handles.insert(handle);
                resp.set_rpc_status(RpcStatus::Success.into());
                resp.set_memory_handle(handle);
                resp.set_tag(req_msg.tag());
            }
            management_opcode::MEMORY_RELINQUISH => {
                let handle = req_msg.memory_handle();
                let status = if self.retrieved_handles.remove(handle) {
                    RpcStatus::Success
                } else {
                    RpcStatus::ErrorInvalidValue
                };
                resp.set_rpc_status(status.into());
            }
            _ => {
                resp.set_rpc_status(RpcStatus::ErrorInvalidValue.into());
            }
        }
        resp
    }

    fn handle_data(
        &mut self,
        source_id: u16,
        req_msg: &WireMessage,
        request_body: &[u8],
        response_body: &mut [u8],
    ) -> WireMessage {
        let mut resp = WireMessage::new();
        WireMessage::copy_control_reg(req_msg, &mut resp);

        let request_length = req_msg.request_length() as usize;
        if request_length > request_body.len() {
            resp.set_rpc_status(RpcStatus::ErrorInvalidRequestBody.into());
            return resp;
        }

        let mut rpc_req = RpcRequest::new(
            source_id,
            req_msg.interface_id(),
            req_msg.opcode(),
            req_msg.client_id(),
            &request_body[..request_length],
            response_body,
        );

        let status = self.provider.dispatch(&mut self.ctx, &mut rpc_req);
        let response_length = rpc_req.response_length;
        let service_status = rpc_req.service_status;

        resp.set_rpc_status(status.into());
        if status == RpcStatus::Success {
            resp.set_service_status_low32(service_status as u32);
            resp.set_response_length(response_length as u32);
        }
        resp
    }
}
