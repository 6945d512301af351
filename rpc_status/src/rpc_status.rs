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
use thiserror::Error;

/// RPC-layer status: transport and dispatch errors only. Never carries
/// service-specific meaning — see [`crate::PsaStatus`]/[`crate::EfiStatus`]
/// for that.
#[repr(i32)]
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum RpcStatus {
    #[error("success")]
    Success = 0,
    #[error("internal error")]
    ErrorInternal = -1,
    #[error("invalid value")]
    ErrorInvalidValue = -2,
    #[error("not found")]
    ErrorNotFound = -3,
    #[error("invalid state")]
    ErrorInvalidState = -4,
    #[error("transport layer failure")]
    ErrorTransportLayer = -5,
    #[error("invalid request body")]
    ErrorInvalidRequestBody = -6,
    #[error("invalid response body")]
    ErrorInvalidResponseBody = -7,
    #[error("resource failure")]
    ErrorResourceFailure = -8,
}

impl RpcStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, RpcStatus::Success)
    }

    /// Reconstruct a status from the raw wire integer carried in `regs[1]`
    /// of a data-path response (§4.1). Unrecognised negative codes collapse
    /// to [`RpcStatus::ErrorInternal`] rather than panicking: a malformed or
    /// future wire value must never crash the endpoint.
    pub fn from_wire(value: i32) -> Self {
        match value {
            0 => RpcStatus::Success,
            -1 => RpcStatus::ErrorInternal,
            -2 => RpcStatus::ErrorInvalidValue,
            -3 => RpcStatus::ErrorNotFound,
            -4 => RpcStatus::ErrorInvalidState,
            -5 => RpcStatus::ErrorTransportLayer,
            -6 => RpcStatus::ErrorInvalidRequestBody,
            -7 => RpcStatus::ErrorInvalidResponseBody,
            -8 => RpcStatus::ErrorResourceFailure,
            _ => RpcStatus::ErrorInternal,
        }
    }
}

impl From<RpcStatus> for i32 {
    fn from(status: RpcStatus) -> i32 {
        status as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_wire_integer() {
        for status in [
            RpcStatus::Success,
            RpcStatus::ErrorInternal,
            RpcStatus::ErrorInvalidValue,
            RpcStatus::ErrorNotFound,
            RpcStatus::ErrorInvalidState,
            RpcStatus::ErrorTransportLayer,
            RpcStatus::ErrorInvalidRequestBody,
            RpcStatus::ErrorInvalidResponseBody,
            RpcStatus::ErrorResourceFailure,
        ] {
            let wire: i32 = status.into();
            assert_eq!(RpcStatus::from_wire(wire), status);
        }
    }

    #[test]
    fn unknown_wire_value_collapses_to_internal_error() {
        assert_eq!(RpcStatus::from_wire(-99), RpcStatus::ErrorInternal);
    }
}
