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
//! UEFI authenticated variable store (C10, C11): lifecycle, access control,
//! the two-slot crash-consistent index commit and the time-based
//! authentication engine, delegating object bytes and signature
//! verification to the collaborators in [`backend`] and [`crypto`].

mod auth;
pub mod backend;
pub mod crypto;
mod delegate;
pub mod names;
mod store;

pub use backend::{StorageBackend, StorageInfo, FLAG_NO_CONFIDENTIALITY, FLAG_NO_REPLAY_PROTECTION, FLAG_WRITE_ONCE, SUPPORT_SET_EXTENDED};
pub use crypto::{CryptoBackend, FingerprintProvider, KeyVariableSource};
pub use delegate::DelegateStore;
pub use store::{UefiVariableStore, VariableInfoStats};
