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
//! Server-side request context (§3 "RPC request (server side)").
//!
//! Where the original framework hands a handler a raw pointer pair for the
//! request/response buffers, `RpcRequest` borrows them as slices: the
//! endpoint owns the shared-memory-backed byte range for the duration of one
//! `dispatch` call and no handler ever needs to retain a pointer past it.

/// One in-flight request as seen by a handler.
pub struct RpcRequest<'a> {
    pub source_id: u16,
    pub interface_id: u8,
    pub opcode: u16,
    pub client_id: u32,
    /// Service-specific status, set by the handler. Distinct from the
    /// [`rpc_status::RpcStatus`] a handler returns: the latter reports
    /// whether the framework itself could dispatch the call, the former
    /// reports what the service did with it.
    pub service_status: i64,
    pub request: &'a [u8],
    pub response: &'a mut [u8],
    /// Bytes of `response` actually written by the handler.
    pub response_length: usize,
}

impl<'a> RpcRequest<'a> {
    pub fn new(
        source_id: u16,
        interface_id: u8,
        opcode: u16,
        client_id: u32,
        request: &'a [u8],
        response: &'a mut [u8],
    ) -> Self {
        RpcRequest {
            source_id,
            interface_id,
            opcode,
            client_id,
            service_status: 0,
            request,
            response,
            response_length: 0,
        }
    }
}
