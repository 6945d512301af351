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
use crate::{CallResponse, Caller};
use rpc_common::{SharedMem, Uuid};
use rpc_status::RpcStatus;

/// Shared-memory allocation policy for a session, §4.3.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SharedMemPolicy {
    /// Shared memory is created once at `open` with a caller-supplied
    /// capacity and reused for every transaction on the session.
    AllocForSession { capacity: usize },
    /// Shared memory is created fresh for each transaction, sized to the
    /// transaction's own request/response needs, and released at `end`.
    AllocForEachCall,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum State {
    Closed,
    Idle,
    InTxn { request_length: usize, response_max: usize },
    InTxnComplete { response_length: usize },
}

/// A stateful wrapper over a [`Caller`] implementing the session transaction
/// machine from §4.3:
///
/// ```text
/// Closed --open--> Idle
/// Idle --begin(req_len, resp_max)--> InTxn
/// InTxn --invoke(op)--> InTxn'   (response buffer filled)
/// InTxn' --end--> Idle
/// Idle --close--> Closed
/// ```
///
/// Illegal transitions fail with [`RpcStatus::ErrorInvalidState`] and leave
/// the session's state unchanged.
pub struct CallerSession<'a> {
    caller: &'a mut dyn Caller,
    shared_mem: SharedMem,
    policy: SharedMemPolicy,
    state: State,
    last_service_status: i64,
}

impl<'a> CallerSession<'a> {
    pub fn new(caller: &'a mut dyn Caller, policy: SharedMemPolicy) -> Self {
        CallerSession {
            caller,
            shared_mem: SharedMem::empty(),
            policy,
            state: State::Closed,
            last_service_status: 0,
        }
    }

    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn open(&mut self, uuid: &Uuid, endpoint_id: u16) -> Result<(), RpcStatus> {
        if self.state != State::Closed {
            return Err(RpcStatus::ErrorInvalidState);
        }
        self.caller.open_session(uuid, endpoint_id)?;
        self.after_open()
    }

    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn find_and_open(&mut self, uuid: &Uuid) -> Result<(), RpcStatus> {
        if self.state != State::Closed {
            return Err(RpcStatus::ErrorInvalidState);
        }
        self.caller.find_and_open_session(uuid)?;
        self.after_open()
    }

    fn after_open(&mut self) -> Result<(), RpcStatus> {
        if let SharedMemPolicy::AllocForSession { capacity } = self.policy {
            match self.caller.create_shared_memory(capacity) {
                Ok(mem) => self.shared_mem = mem,
                Err(status) => {
                    let _ = self.caller.close_session();
                    return Err(status);
                }
            }
        }
        self.state = State::Idle;
        Ok(())
    }

    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn close(&mut self) -> Result<(), RpcStatus> {
        if self.state != State::Idle {
            return Err(RpcStatus::ErrorInvalidState);
        }
        if matches!(self.policy, SharedMemPolicy::AllocForSession { .. }) && !self.shared_mem.is_empty()
        {
            self.caller.release_shared_memory(&mut self.shared_mem)?;
            self.shared_mem = SharedMem::empty();
        }
        self.caller.close_session()?;
        self.state = State::Closed;
        Ok(())
    }

    /// Begin a transaction, sizing/validating shared memory for a request of
    /// `request_length` bytes and a response of up to `response_max` bytes.
    /// Returns a mutable view over the request portion of shared memory for
    /// the caller to fill in before `invoke`.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn begin(
        &mut self,
        request_length: usize,
        response_max: usize,
    ) -> Result<&mut [u8], RpcStatus> {
        if self.state != State::Idle {
            return Err(RpcStatus::ErrorInvalidState);
        }

        let needed = request_length.max(response_max);

        match self.policy {
            SharedMemPolicy::AllocForSession { capacity } => {
                if needed > capacity {
                    // Reject before touching allocation state, per the
                    // session-discipline scenario in §8 (S9): an oversized
                    // request never allocates.
                    return Err(RpcStatus::ErrorInvalidState);
                }
            }
            SharedMemPolicy::AllocForEachCall => {
                let mem = self.caller.create_shared_memory(needed)?;
                self.shared_mem = mem;
            }
        }

        self.state = State::InTxn {
            request_length,
            response_max,
        };

        unsafe { self.shared_mem.as_mut_slice(request_length) }
            .ok_or(RpcStatus::ErrorInvalidRequestBody)
    }

    /// Send the staged request under `opcode` and record the response.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn invoke(&mut self, opcode: u32) -> Result<(), RpcStatus> {
        let (request_length, response_max) = match self.state {
            State::InTxn {
                request_length,
                response_max,
            } => (request_length, response_max),
            _ => return Err(RpcStatus::ErrorInvalidState),
        };

        let CallResponse {
            response_length,
            service_status,
        } = self.caller.call(opcode, &mut self.shared_mem, request_length)?;

        // Response lengths exceeding the shared-memory size, or the
        // transaction's declared response_max, are transport errors and are
        // reported to the caller as a zero-length response (§4.3).
        let response_length = if response_length > response_max || response_length > self.shared_mem.size()
        {
            0
        } else {
            response_length
        };

        self.last_service_status = service_status;
        self.state = State::InTxnComplete { response_length };
        Ok(())
    }

    /// Borrow the response bytes written by the most recent `invoke`.
    pub fn response(&self) -> Result<&[u8], RpcStatus> {
        match self.state {
            State::InTxnComplete { response_length } => {
                unsafe { self.shared_mem.as_slice(response_length) }
                    .ok_or(RpcStatus::ErrorInvalidResponseBody)
            }
            _ => Err(RpcStatus::ErrorInvalidState),
        }
    }

    pub fn service_status(&self) -> Result<i64, RpcStatus> {
        match self.state {
            State::InTxnComplete { .. } => Ok(self.last_service_status),
            _ => Err(RpcStatus::ErrorInvalidState),
        }
    }

    /// End the transaction, returning to `Idle`.
    #[cfg_attr(feature = "trace", func_trace::trace)]
    pub fn end(&mut self) -> Result<(), RpcStatus> {
        if !matches!(self.state, State::InTxnComplete { .. }) {
            return Err(RpcStatus::ErrorInvalidState);
        }
        if matches!(self.policy, SharedMemPolicy::AllocForEachCall) {
            self.caller.release_shared_memory(&mut self.shared_mem)?;
            self.shared_mem = SharedMem::empty();
        }
        self.state = State::Idle;
        Ok(())
    }
}
