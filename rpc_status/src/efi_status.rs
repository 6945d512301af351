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
use crate::psa_status::PsaStatus;
use thiserror::Error;

/// EFI status codes as used by the UEFI variable store (`EFI_STATUS`).
/// Error codes carry the high bit of the native width set; we model that
/// here as the literal 64-bit values defined by the UEFI specification so
/// the wire representation needs no further translation.
#[repr(i64)]
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum EfiStatus {
    #[error("success")]
    Success = 0,
    #[error("invalid parameter")]
    InvalidParameter = -0x7FFF_FFFF_FFFF_FFFE, // 0x8000000000000002
    #[error("unsupported")]
    Unsupported = -0x7FFF_FFFF_FFFF_FFFD, // 0x8000000000000003
    #[error("bad buffer size")]
    BadBufferSize = -0x7FFF_FFFF_FFFF_FFFC, // 0x8000000000000004
    #[error("buffer too small")]
    BufferTooSmall = -0x7FFF_FFFF_FFFF_FFFB, // 0x8000000000000005
    #[error("not ready")]
    NotReady = -0x7FFF_FFFF_FFFF_FFFA, // 0x8000000000000006
    #[error("device error")]
    DeviceError = -0x7FFF_FFFF_FFFF_FFF9, // 0x8000000000000007
    #[error("write protected")]
    WriteProtected = -0x7FFF_FFFF_FFFF_FFF8, // 0x8000000000000008
    #[error("out of resources")]
    OutOfResources = -0x7FFF_FFFF_FFFF_FFF7, // 0x8000000000000009
    #[error("not found")]
    NotFound = -0x7FFF_FFFF_FFFF_FFF2, // 0x800000000000000E
    #[error("access denied")]
    AccessDenied = -0x7FFF_FFFF_FFFF_FFF1, // 0x800000000000000F
    #[error("security violation")]
    SecurityViolation = -0x7FFF_FFFF_FFFF_FFE6, // 0x800000000000001A
}

impl EfiStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, EfiStatus::Success)
    }
}

impl From<EfiStatus> for i64 {
    fn from(status: EfiStatus) -> i64 {
        status as i64
    }
}

/// Maps internal PSA statuses from a storage/crypto backend onto the EFI
/// status returned to the variable store's caller (§7). Any PSA status with
/// no direct EFI counterpart collapses to `EFI_DEVICE_ERROR`, the same
/// fallback the upstream `psa_to_efi_storage_status` table uses.
impl From<PsaStatus> for EfiStatus {
    fn from(status: PsaStatus) -> EfiStatus {
        match status {
            PsaStatus::Success => EfiStatus::Success,
            PsaStatus::NotPermitted => EfiStatus::AccessDenied,
            PsaStatus::InvalidArgument => EfiStatus::InvalidParameter,
            PsaStatus::BadState => EfiStatus::NotReady,
            PsaStatus::BufferTooSmall => EfiStatus::BufferTooSmall,
            PsaStatus::DoesNotExist => EfiStatus::NotFound,
            PsaStatus::InsufficientMemory | PsaStatus::InsufficientStorage => {
                EfiStatus::OutOfResources
            }
            PsaStatus::StorageFailure => EfiStatus::DeviceError,
            PsaStatus::NotSupported
            | PsaStatus::InvalidHandle
            | PsaStatus::AlreadyExists
            | PsaStatus::InvalidSignature
            | PsaStatus::DataCorrupt
            | PsaStatus::GenericError => EfiStatus::DeviceError,
        }
    }
}
