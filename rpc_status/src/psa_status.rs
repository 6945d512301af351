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

/// PSA status codes as returned by the secure-storage backend and other
/// PSA-style collaborators (`psa/error.h`). Values match the published PSA
/// Functional API so they can be exchanged with real backends unmodified.
#[repr(i32)]
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum PsaStatus {
    #[error("success")]
    Success = 0,
    #[error("not permitted")]
    NotPermitted = -1,
    #[error("not supported")]
    NotSupported = -2,
    #[error("invalid argument")]
    InvalidArgument = -3,
    #[error("invalid handle")]
    InvalidHandle = -4,
    #[error("bad state")]
    BadState = -5,
    #[error("buffer too small")]
    BufferTooSmall = -6,
    #[error("already exists")]
    AlreadyExists = -7,
    #[error("does not exist")]
    DoesNotExist = -8,
    #[error("insufficient memory")]
    InsufficientMemory = -9,
    #[error("insufficient storage")]
    InsufficientStorage = -10,
    #[error("generic error")]
    GenericError = -132,
    #[error("storage failure")]
    StorageFailure = -138,
    #[error("invalid signature")]
    InvalidSignature = -149,
    #[error("data corrupt")]
    DataCorrupt = -152,
}

impl PsaStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, PsaStatus::Success)
    }

    pub fn from_wire(value: i32) -> Self {
        match value {
            0 => PsaStatus::Success,
            -1 => PsaStatus::NotPermitted,
            -2 => PsaStatus::NotSupported,
            -3 => PsaStatus::InvalidArgument,
            -4 => PsaStatus::InvalidHandle,
            -5 => PsaStatus::BadState,
            -6 => PsaStatus::BufferTooSmall,
            -7 => PsaStatus::AlreadyExists,
            -8 => PsaStatus::DoesNotExist,
            -9 => PsaStatus::InsufficientMemory,
            -10 => PsaStatus::InsufficientStorage,
            -138 => PsaStatus::StorageFailure,
            -149 => PsaStatus::InvalidSignature,
            -152 => PsaStatus::DataCorrupt,
            _ => PsaStatus::GenericError,
        }
    }
}

impl From<PsaStatus> for i32 {
    fn from(status: PsaStatus) -> i32 {
        status as i32
    }
}
