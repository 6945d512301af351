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
//! The two orthogonal error channels described in §7: transport/dispatch
//! status produced by the RPC substrate itself ([`RpcStatus`]), and the
//! service-specific status returned by a concrete service
//! ([`PsaStatus`] for PSA-style services, [`EfiStatus`] for the UEFI
//! variable store). Each is a `thiserror`-derived enum with `From`/`Into`
//! conversions to its raw wire integer, the same shape `tps_error::TPSError`
//! uses for the TA client stack it was adapted from.

mod efi_status;
mod psa_status;
mod rpc_status;

pub use efi_status::EfiStatus;
pub use psa_status::PsaStatus;
pub use rpc_status::RpcStatus;
