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
//! Opcode dispatch (C6), §4.4.
//!
//! The original framework links providers with an intrusive successor
//! pointer and recovers the extending provider's handler table through the
//! same linked-list traversal used everywhere else in that codebase. Here
//! the chain is an ordinary `Option<Box<dyn ServiceProvider<Ctx>>>` held by
//! whichever provider is currently the chain's tail; `extend` splices a new
//! link in directly after the provider it is called on, pushing whatever
//! was already linked further down the chain.

use rpc_status::RpcStatus;

use crate::request::RpcRequest;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// One opcode's handler function.
pub struct Handler<Ctx> {
    pub opcode: u32,
    pub invoke: fn(&mut Ctx, &mut RpcRequest) -> RpcStatus,
}

impl<Ctx> Handler<Ctx> {
    pub const fn new(opcode: u32, invoke: fn(&mut Ctx, &mut RpcRequest) -> RpcStatus) -> Self {
        Handler { opcode, invoke }
    }
}

/// A provider dispatches opcodes addressed to one service interface.
/// Providers compose into a chain: a provider that cannot handle an opcode
/// offers it to its successor.
pub trait ServiceProvider<Ctx> {
    fn dispatch(&mut self, ctx: &mut Ctx, req: &mut RpcRequest) -> RpcStatus;

    /// Replace this provider's successor, returning whatever was linked
    /// there before. Used by [`OpcodeDispatcher::extend`] to splice itself
    /// into an existing chain without the caller needing to walk it.
    fn set_successor(&mut self, successor: Option<Box<dyn ServiceProvider<Ctx>>>);
}

/// An opcode-range-then-linear-scan handler table, the base building block
/// every concrete service provider is built from (§4.4 steps 1-3).
pub struct OpcodeDispatcher<Ctx> {
    handlers: Vec<Handler<Ctx>>,
    opcode_lo: u32,
    opcode_hi: u32,
    successor: Option<Box<dyn ServiceProvider<Ctx>>>,
}

impl<Ctx> OpcodeDispatcher<Ctx> {
    /// Build a dispatcher whose opcode range is the min/max of the supplied
    /// handler table. An empty table covers no opcodes and always forwards.
    pub fn new(handlers: Vec<Handler<Ctx>>) -> Self {
        let opcode_lo = handlers.iter().map(|h| h.opcode).min().unwrap_or(1);
        let opcode_hi = handlers.iter().map(|h| h.opcode).max().unwrap_or(0);
        OpcodeDispatcher {
            handlers,
            opcode_lo,
            opcode_hi,
            successor: None,
        }
    }

    /// Register `sub_provider` as this dispatcher's immediate successor,
    /// linking whatever successor was already present after it. Repeated
    /// calls build a chain searched in reverse registration order, as
    /// described in §4.4.
    pub fn extend(&mut self, mut sub_provider: Box<dyn ServiceProvider<Ctx>>) {
        sub_provider.set_successor(self.successor.take());
        self.successor = Some(sub_provider);
    }
}

impl<Ctx> ServiceProvider<Ctx> for OpcodeDispatcher<Ctx> {
    #[cfg_attr(feature = "trace", trace)]
    fn dispatch(&mut self, ctx: &mut Ctx, req: &mut RpcRequest) -> RpcStatus {
        let opcode = req.opcode as u32;
        if opcode >= self.opcode_lo && opcode <= self.opcode_hi {
            if let Some(handler) = self.handlers.iter().find(|h| h.opcode == opcode) {
                return (handler.invoke)(ctx, req);
            }
        }
        match self.successor.as_mut() {
            Some(successor) => successor.dispatch(ctx, req),
            None => RpcStatus::ErrorInvalidValue,
        }
    }

    fn set_successor(&mut self, successor: Option<Box<dyn ServiceProvider<Ctx>>>) {
        self.successor = successor;
    }
}
