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
//! Time-based authenticated variable verification (C11), §4.8. Only ever
//! invoked from the store's `set_variable` path when the incoming write
//! carries `EFI_VARIABLE_TIME_BASED_AUTHENTICATED_WRITE_ACCESS`.

use crate::crypto::{CryptoBackend, FingerprintProvider, KeyVariableSource};
use crate::names;
use rpc_status::EfiStatus;
use sha2::{Digest, Sha256};
use uefi_variable_index::{EfiTime, Guid};

const TIMESTAMP_SIZE: usize = 16;
const WIN_CERTIFICATE_HDR_SIZE: usize = 8; // dwLength(4) + wRevision(2) + wCertificateType(2)
const GUID_SIZE: usize = 16;
const WIN_CERTIFICATE_UEFI_GUID_SIZE: usize = WIN_CERTIFICATE_HDR_SIZE + GUID_SIZE;
const WIN_CERT_REVISION: u16 = 0x0200;
const WIN_CERT_TYPE_EFI_GUID: u16 = 0x0EF1;

const PKCS7_GUID: [u8; 16] = [
    0x9d, 0xd2, 0xaf, 0x4a, 0xdf, 0x68, 0xee, 0x49, 0x8a, 0xa9, 0x34, 0x7d, 0x37, 0x56, 0x65, 0xa7,
];
const CERT_X509_GUID: [u8; 16] = [
    0xa1, 0x59, 0xc0, 0xa5, 0xe4, 0x94, 0xa7, 0x4a, 0x87, 0xb5, 0xab, 0x15, 0x5c, 0x2b, 0xf0, 0x72,
];

/// Result of a successful authentication: the timestamp to persist in
/// metadata, the payload with the auth header stripped, and — for
/// private-authenticated variables only — the fingerprint to pin/compare.
pub struct AuthOutcome {
    pub stored_timestamp: EfiTime,
    pub payload: Vec<u8>,
    pub fingerprint: Option<[u8; 32]>,
}

struct AuthHeader<'a> {
    timestamp: EfiTime,
    raw_timestamp: [u8; TIMESTAMP_SIZE],
    signed_data: &'a [u8],
    new_payload: &'a [u8],
}

fn decode_efi_time(data: &[u8; TIMESTAMP_SIZE]) -> EfiTime {
    EfiTime {
        year: u16::from_le_bytes([data[0], data[1]]),
        month: data[2],
        day: data[3],
        hour: data[4],
        minute: data[5],
        second: data[6],
        pad1: data[7],
        nanosecond: u32::from_le_bytes(data[8..12].try_into().unwrap()),
        time_zone: i16::from_le_bytes([data[12], data[13]]),
        daylight: data[14],
        pad2: data[15],
    }
}

fn parse_auth_header(payload: &[u8]) -> Result<AuthHeader<'_>, EfiStatus> {
    if payload.len() < TIMESTAMP_SIZE + WIN_CERTIFICATE_UEFI_GUID_SIZE {
        return Err(EfiStatus::InvalidParameter);
    }
    let mut raw_timestamp = [0u8; TIMESTAMP_SIZE];
    raw_timestamp.copy_from_slice(&payload[0..TIMESTAMP_SIZE]);
    let timestamp = decode_efi_time(&raw_timestamp);
    if !timestamp.is_padding_zeroed() {
        return Err(EfiStatus::InvalidParameter);
    }

    let cert_base = TIMESTAMP_SIZE;
    let dw_length = u32::from_le_bytes(payload[cert_base..cert_base + 4].try_into().unwrap()) as usize;
    let w_revision = u16::from_le_bytes(payload[cert_base + 4..cert_base + 6].try_into().unwrap());
    let w_certificate_type = u16::from_le_bytes(payload[cert_base + 6..cert_base + 8].try_into().unwrap());
    let cert_type_guid: [u8; 16] = payload[cert_base + 8..cert_base + 24].try_into().unwrap();

    if w_revision != WIN_CERT_REVISION || w_certificate_type != WIN_CERT_TYPE_EFI_GUID {
        return Err(EfiStatus::InvalidParameter);
    }
    if cert_type_guid != PKCS7_GUID {
        return Err(EfiStatus::InvalidParameter);
    }
    if dw_length < WIN_CERTIFICATE_UEFI_GUID_SIZE {
        return Err(EfiStatus::InvalidParameter);
    }
    let auth_info_end = cert_base.checked_add(dw_length).ok_or(EfiStatus::InvalidParameter)?;
    if auth_info_end > payload.len() {
        return Err(EfiStatus::InvalidParameter);
    }

    Ok(AuthHeader {
        timestamp,
        raw_timestamp,
        signed_data: &payload[cert_base + WIN_CERTIFICATE_UEFI_GUID_SIZE..auth_info_end],
        new_payload: &payload[auth_info_end..],
    })
}

fn compute_digest(name: &[u16], guid: &Guid, attributes: u32, raw_timestamp: &[u8; TIMESTAMP_SIZE], new_payload: &[u8]) -> [u8; 32] {
    let name_no_nul = match name.split_last() {
        Some((0, rest)) => rest,
        _ => name,
    };
    let mut hasher = Sha256::new();
    for unit in name_no_nul {
        hasher.update(unit.to_le_bytes());
    }
    hasher.update(guid.0);
    hasher.update(attributes.to_le_bytes());
    hasher.update(raw_timestamp);
    hasher.update(new_payload);
    hasher.finalize().into()
}

/// Walks an `EFI_SIGNATURE_LIST` chain, collecting the certificate bytes
/// of every X.509-typed signature (only X.509 lists are supported, per
/// §4.8). Malformed trailing bytes are silently ignored past the last
/// fully-parseable list, matching the original's tolerance for a
/// zero-padded key variable tail.
fn certificates_in_signature_list(data: &[u8]) -> Vec<&[u8]> {
    const LIST_HEADER_SIZE: usize = GUID_SIZE + 4 + 4 + 4;
    let mut certs = Vec::new();
    let mut pos = 0;
    while pos + LIST_HEADER_SIZE <= data.len() {
        let signature_type: [u8; 16] = data[pos..pos + 16].try_into().unwrap();
        let list_size = u32::from_le_bytes(data[pos + 16..pos + 20].try_into().unwrap()) as usize;
        let header_size = u32::from_le_bytes(data[pos + 20..pos + 24].try_into().unwrap()) as usize;
        let sig_size = u32::from_le_bytes(data[pos + 24..pos + 28].try_into().unwrap()) as usize;

        if list_size < LIST_HEADER_SIZE + header_size || pos + list_size > data.len() || sig_size <= GUID_SIZE {
            break;
        }
        if signature_type == CERT_X509_GUID {
            let sigs_start = pos + LIST_HEADER_SIZE + header_size;
            let sigs_end = pos + list_size;
            let mut sig_pos = sigs_start;
            while sig_pos + sig_size <= sigs_end {
                certs.push(&data[sig_pos + GUID_SIZE..sig_pos + sig_size]);
                sig_pos += sig_size;
            }
        }
        pos += list_size;
    }
    certs
}

/// Verifies `payload` as an `EFI_VARIABLE_AUTHENTICATION_2`-framed write
/// to `(guid, name)` and returns the stripped payload plus the metadata
/// update to apply on success.
#[allow(clippy::too_many_arguments)]
pub fn authenticate_variable(
    guid: &Guid,
    name: &[u16],
    attributes: u32,
    is_append: bool,
    existing_timestamp: Option<EfiTime>,
    existing_fingerprint: Option<[u8; 32]>,
    payload: &[u8],
    keys: &dyn KeyVariableSource,
    crypto: &dyn CryptoBackend,
    fingerprints: &dyn FingerprintProvider,
) -> Result<AuthOutcome, EfiStatus> {
    let header = parse_auth_header(payload)?;

    if !is_append {
        if let Some(existing) = existing_timestamp {
            if header.timestamp <= existing {
                return Err(EfiStatus::SecurityViolation);
            }
        }
    }
    let stored_timestamp = if is_append {
        existing_timestamp.unwrap_or(header.timestamp)
    } else {
        header.timestamp
    };

    let digest = compute_digest(name, guid, attributes, &header.raw_timestamp, header.new_payload);

    let fingerprint = if names::is_secure_boot_variable(guid, name) {
        authenticate_secure_boot_variable(guid, name, header.signed_data, &digest, keys, crypto)?;
        None
    } else {
        Some(authenticate_private_variable(
            header.signed_data,
            &digest,
            existing_fingerprint,
            crypto,
            fingerprints,
        )?)
    };

    Ok(AuthOutcome {
        stored_timestamp,
        payload: header.new_payload.to_vec(),
        fingerprint,
    })
}

fn authenticate_secure_boot_variable(
    guid: &Guid,
    name: &[u16],
    signed_data: &[u8],
    digest: &[u8; 32],
    keys: &dyn KeyVariableSource,
    crypto: &dyn CryptoBackend,
) -> Result<(), EfiStatus> {
    let pk_disabled = match keys.key_variable_payload("PK") {
        None => true,
        Some(pk) => pk.is_empty(),
    };
    if pk_disabled {
        return Ok(());
    }

    for key_name in names::select_verification_keys(guid, name) {
        let Some(key_payload) = keys.key_variable_payload(key_name) else {
            continue;
        };
        for cert in certificates_in_signature_list(&key_payload) {
            if crypto.verify_pkcs7_signature(signed_data, digest, cert) {
                return Ok(());
            }
        }
    }
    Err(EfiStatus::SecurityViolation)
}

fn authenticate_private_variable(
    signed_data: &[u8],
    digest: &[u8; 32],
    existing_fingerprint: Option<[u8; 32]>,
    crypto: &dyn CryptoBackend,
    fingerprints: &dyn FingerprintProvider,
) -> Result<[u8; 32], EfiStatus> {
    if !crypto.verify_pkcs7_signature(signed_data, digest, &[]) {
        return Err(EfiStatus::SecurityViolation);
    }
    let fingerprint = fingerprints
        .get_uefi_priv_auth_var_fingerprint(signed_data)
        .ok_or(EfiStatus::SecurityViolation)?;
    if let Some(existing) = existing_fingerprint {
        if existing != fingerprint {
            return Err(EfiStatus::SecurityViolation);
        }
    }
    Ok(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysVerify;
    impl CryptoBackend for AlwaysVerify {
        fn verify_pkcs7_signature(&self, _blob: &[u8], _digest: &[u8; 32], _cert: &[u8]) -> bool {
            true
        }
    }
    impl FingerprintProvider for AlwaysVerify {
        fn get_uefi_priv_auth_var_fingerprint(&self, _blob: &[u8]) -> Option<[u8; 32]> {
            Some([7u8; 32])
        }
    }

    struct NoKeys;
    impl KeyVariableSource for NoKeys {
        fn key_variable_payload(&self, _key_name: &str) -> Option<Vec<u8>> {
            None
        }
    }

    fn auth_payload(year: u16, body: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&year.to_le_bytes());
        buf.extend_from_slice(&[0u8; 14]); // remaining EFI_TIME fields, all zero
        let cert_data = b"fake-pkcs7-blob";
        let dw_length = (WIN_CERTIFICATE_UEFI_GUID_SIZE + cert_data.len()) as u32;
        buf.extend_from_slice(&dw_length.to_le_bytes());
        buf.extend_from_slice(&WIN_CERT_REVISION.to_le_bytes());
        buf.extend_from_slice(&WIN_CERT_TYPE_EFI_GUID.to_le_bytes());
        buf.extend_from_slice(&PKCS7_GUID);
        buf.extend_from_slice(cert_data);
        buf.extend_from_slice(body);
        buf
    }

    #[test]
    fn pk_absent_disables_secure_boot_auth() {
        let guid = names::GLOBAL_VARIABLE_GUID;
        let name = names::utf16_name("KEK");
        let payload = auth_payload(2023, b"new kek contents");
        let outcome = authenticate_variable(
            &guid,
            &name,
            0,
            false,
            None,
            None,
            &payload,
            &NoKeys,
            &AlwaysVerify,
            &AlwaysVerify,
        )
        .expect("auth disabled while PK is absent");
        assert_eq!(outcome.payload, b"new kek contents");
        assert!(outcome.fingerprint.is_none());
    }

    #[test]
    fn non_increasing_timestamp_is_rejected_unless_append() {
        let guid = Guid::new([9; 16]);
        let name = names::utf16_name("MyVar");
        let t1 = auth_payload(2023, b"v1");
        let outcome = authenticate_variable(&guid, &name, 0, false, None, None, &t1, &NoKeys, &AlwaysVerify, &AlwaysVerify)
            .expect("first write has no prior timestamp to compare");

        let replay = authenticate_variable(
            &guid,
            &name,
            0,
            false,
            Some(outcome.stored_timestamp),
            outcome.fingerprint,
            &t1,
            &NoKeys,
            &AlwaysVerify,
            &AlwaysVerify,
        );
        assert_eq!(replay.unwrap_err(), EfiStatus::SecurityViolation);

        let appended = authenticate_variable(
            &guid,
            &name,
            0,
            true,
            Some(outcome.stored_timestamp),
            outcome.fingerprint,
            &t1,
            &NoKeys,
            &AlwaysVerify,
            &AlwaysVerify,
        )
        .expect("append with equal timestamp succeeds");
        assert_eq!(appended.stored_timestamp, outcome.stored_timestamp);
    }

    #[test]
    fn private_variable_fingerprint_mismatch_is_rejected() {
        let guid = Guid::new([9; 16]);
        let name = names::utf16_name("MyVar");
        let payload = auth_payload(2024, b"v2");
        let result = authenticate_variable(
            &guid,
            &name,
            0,
            false,
            None,
            Some([1u8; 32]),
            &payload,
            &NoKeys,
            &AlwaysVerify,
            &AlwaysVerify,
        );
        assert_eq!(result.unwrap_err(), EfiStatus::SecurityViolation);
    }

    #[test]
    fn truncated_auth_header_is_invalid_parameter() {
        let guid = Guid::new([1; 16]);
        let name = names::utf16_name("MyVar");
        let short = vec![0u8; 10];
        let result = authenticate_variable(&guid, &name, 0, false, None, None, &short, &NoKeys, &AlwaysVerify, &AlwaysVerify);
        assert_eq!(result.unwrap_err(), EfiStatus::InvalidParameter);
    }
}
