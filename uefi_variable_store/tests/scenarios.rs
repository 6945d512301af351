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
//! End-to-end scenario coverage driven entirely through `UefiVariableStore`'s
//! public API: the checker-backed constraints (S2, S5) and the secure-boot
//! and private-variable authentication chains (S6, S7), none of which are
//! exercised above the unit level anywhere else in this crate.

use std::collections::HashMap;

use rpc_status::{EfiStatus, PsaStatus};
use uefi_variable_checker::{VariableConstraints, VAR_CHECK_VARIABLE_PROPERTY_READ_ONLY, VAR_CHECK_VARIABLE_PROPERTY_REVISION};
use uefi_variable_index::{attributes as attrs, Guid};
use uefi_variable_store::backend::{StorageBackend, StorageInfo};
use uefi_variable_store::crypto::{CryptoBackend, FingerprintProvider};
use uefi_variable_store::names::{self, GLOBAL_VARIABLE_GUID, SECURITY_DATABASE_GUID};
use uefi_variable_store::{DelegateStore, UefiVariableStore};

#[derive(Default)]
struct MemoryBackend {
    objects: HashMap<(u32, u64), Vec<u8>>,
}

impl StorageBackend for MemoryBackend {
    fn create(&mut self, client_id: u32, uid: u64, _capacity: usize, _flags: u32) -> Result<(), PsaStatus> {
        self.objects.entry((client_id, uid)).or_default();
        Ok(())
    }
    fn set(&mut self, client_id: u32, uid: u64, data: &[u8]) -> Result<(), PsaStatus> {
        self.objects.insert((client_id, uid), data.to_vec());
        Ok(())
    }
    fn set_extended(&mut self, client_id: u32, uid: u64, offset: usize, data: &[u8]) -> Result<(), PsaStatus> {
        let obj = self.objects.entry((client_id, uid)).or_default();
        obj.truncate(offset);
        obj.extend_from_slice(data);
        Ok(())
    }
    fn get(&self, client_id: u32, uid: u64, offset: usize, buf: &mut [u8]) -> Result<usize, PsaStatus> {
        let obj = self.objects.get(&(client_id, uid)).ok_or(PsaStatus::DoesNotExist)?;
        let end = (offset + buf.len()).min(obj.len());
        let n = end.saturating_sub(offset);
        buf[..n].copy_from_slice(&obj[offset..end]);
        Ok(n)
    }
    fn get_info(&self, client_id: u32, uid: u64) -> Result<StorageInfo, PsaStatus> {
        let obj = self.objects.get(&(client_id, uid)).ok_or(PsaStatus::DoesNotExist)?;
        Ok(StorageInfo { size: obj.len(), capacity: obj.len(), flags: 0 })
    }
    fn remove(&mut self, client_id: u32, uid: u64) -> Result<(), PsaStatus> {
        self.objects.remove(&(client_id, uid)).map(|_| ()).ok_or(PsaStatus::DoesNotExist)
    }
    fn get_support(&self, _client_id: u32) -> u32 {
        0
    }
}

/// A crypto backend whose verdict is entirely determined by byte equality
/// between the claimed signer (the blob `signature_list`/`auth_payload`
/// below stash in place of a real PKCS#7 signature) and the certificate
/// bytes pulled from the key variable's signature list. An empty `cert`
/// is the private-variable path's "no external trust root" call, accepted
/// as long as something was signed. No PKCS#7 parsing happens anywhere in
/// this crate or in this harness; the contract under test is the trust
/// chain the store walks, not cryptography.
struct MarkerCrypto;
impl CryptoBackend for MarkerCrypto {
    fn verify_pkcs7_signature(&self, blob: &[u8], _digest: &[u8; 32], cert: &[u8]) -> bool {
        if cert.is_empty() {
            !blob.is_empty()
        } else {
            blob == cert
        }
    }
}
impl FingerprintProvider for MarkerCrypto {
    fn get_uefi_priv_auth_var_fingerprint(&self, blob: &[u8]) -> Option<[u8; 32]> {
        if blob.is_empty() {
            return None;
        }
        let mut out = [0u8; 32];
        for (i, b) in blob.iter().enumerate() {
            out[i % 32] ^= *b;
        }
        Some(out)
    }
}

const SLOT_A: u64 = 1000;
const SLOT_B: u64 = 1001;

fn new_store() -> UefiVariableStore {
    let persistent = DelegateStore::new(true, 4096, 1024, Box::new(MemoryBackend::default()));
    let volatile = DelegateStore::new(false, 4096, 1024, Box::new(MemoryBackend::default()));
    UefiVariableStore::new(16, 7, persistent, volatile, SLOT_A, SLOT_B, Box::new(MarkerCrypto), Box::new(MarkerCrypto)).unwrap()
}

fn name(s: &str) -> Vec<u16> {
    names::utf16_name(s)
}

// -- EFI_SIGNATURE_LIST / EFI_VARIABLE_AUTHENTICATION_2 framing --------------
//
// `uefi_variable_store::auth` keeps its own copies of these GUIDs private;
// their byte values come straight from the UEFI specification, the same
// source that module's own constants were taken from.

const PKCS7_GUID: [u8; 16] = [0x9d, 0xd2, 0xaf, 0x4a, 0xdf, 0x68, 0xee, 0x49, 0x8a, 0xa9, 0x34, 0x7d, 0x37, 0x56, 0x65, 0xa7];
const CERT_X509_GUID: [u8; 16] = [0xa1, 0x59, 0xc0, 0xa5, 0xe4, 0x94, 0xa7, 0x4a, 0x87, 0xb5, 0xab, 0x15, 0x5c, 0x2b, 0xf0, 0x72];
const WIN_CERT_REVISION: u16 = 0x0200;
const WIN_CERT_TYPE_EFI_GUID: u16 = 0x0EF1;
const WIN_CERTIFICATE_UEFI_GUID_SIZE: usize = 4 + 2 + 2 + 16;

/// A one-certificate `EFI_SIGNATURE_LIST` of type X.509, the shape
/// `key_variable_payload` hands to `certificates_in_signature_list`.
fn signature_list(cert: &[u8]) -> Vec<u8> {
    let sig_size = (16 + cert.len()) as u32;
    let list_size = (16 + 4 + 4 + 4) + sig_size;
    let mut buf = Vec::new();
    buf.extend_from_slice(&CERT_X509_GUID);
    buf.extend_from_slice(&list_size.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // header_size
    buf.extend_from_slice(&sig_size.to_le_bytes());
    buf.extend_from_slice(&[0u8; 16]); // SignatureOwner, unused by the store
    buf.extend_from_slice(cert);
    buf
}

/// Wraps `body` in an `EFI_VARIABLE_AUTHENTICATION_2` header stamped with
/// `year` and carrying `signer` as the PKCS#7 blob stand-in.
fn auth_payload(year: u16, signer: &[u8], body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&year.to_le_bytes());
    buf.extend_from_slice(&[0u8; 14]); // remaining EFI_TIME fields, all zero
    let dw_length = (WIN_CERTIFICATE_UEFI_GUID_SIZE + signer.len()) as u32;
    buf.extend_from_slice(&dw_length.to_le_bytes());
    buf.extend_from_slice(&WIN_CERT_REVISION.to_le_bytes());
    buf.extend_from_slice(&WIN_CERT_TYPE_EFI_GUID.to_le_bytes());
    buf.extend_from_slice(&PKCS7_GUID);
    buf.extend_from_slice(signer);
    buf.extend_from_slice(body);
    buf
}

const AUTH: u32 = attrs::BOOTSERVICE_ACCESS | attrs::RUNTIME_ACCESS | attrs::TIME_BASED_AUTHENTICATED_WRITE_ACCESS;

// S2 — read-only constraint enforced end to end through `set_variable`.
#[test]
fn read_only_constraint_blocks_a_subsequent_set() {
    let mut store = new_store();
    let guid = Guid::new([1; 16]);
    store.set_variable(guid, name("Foo"), attrs::BOOTSERVICE_ACCESS, b"v1".to_vec()).unwrap();

    store
        .set_var_check_property(
            guid,
            name("Foo"),
            VariableConstraints {
                revision: VAR_CHECK_VARIABLE_PROPERTY_REVISION,
                property: VAR_CHECK_VARIABLE_PROPERTY_READ_ONLY,
                attributes: attrs::BOOTSERVICE_ACCESS,
                min_size: 0,
                max_size: 64,
            },
        )
        .unwrap();

    let result = store.set_variable(guid, name("Foo"), attrs::BOOTSERVICE_ACCESS, b"v2".to_vec());
    assert_eq!(result.unwrap_err(), EfiStatus::WriteProtected);

    let mut buf = [0u8; 16];
    let (len, _) = store.get_variable(&guid, &name("Foo"), &mut buf).unwrap();
    assert_eq!(&buf[..len], b"v1", "read-only write must not have touched the stored value");
}

// S5 — size constraint enforced end to end through `set_variable`.
#[test]
fn size_constraint_rejects_oversized_write_accepts_undersized() {
    let mut store = new_store();
    let guid = Guid::new([2; 16]);
    store.set_variable(guid, name("Bar"), attrs::BOOTSERVICE_ACCESS, b"v1".to_vec()).unwrap();

    store
        .set_var_check_property(
            guid,
            name("Bar"),
            VariableConstraints {
                revision: VAR_CHECK_VARIABLE_PROPERTY_REVISION,
                property: 0,
                attributes: attrs::BOOTSERVICE_ACCESS,
                min_size: 1,
                max_size: 4,
            },
        )
        .unwrap();

    assert_eq!(
        store.set_variable(guid, name("Bar"), attrs::BOOTSERVICE_ACCESS, b"too long".to_vec()).unwrap_err(),
        EfiStatus::InvalidParameter
    );
    store.set_variable(guid, name("Bar"), attrs::BOOTSERVICE_ACCESS, b"ok".to_vec()).unwrap();

    let mut buf = [0u8; 16];
    let (len, _) = store.get_variable(&guid, &name("Bar"), &mut buf).unwrap();
    assert_eq!(&buf[..len], b"ok");
}

// S6 — with PK absent, installing KEK (or PK itself) is unauthenticated.
#[test]
fn secure_boot_writes_are_unauthenticated_while_pk_is_absent() {
    let mut store = new_store();
    let payload = auth_payload(2023, b"anything-goes", b"kek-v1");
    store.set_variable(GLOBAL_VARIABLE_GUID, name("KEK"), AUTH, payload).unwrap();

    let mut buf = [0u8; 32];
    let (len, _) = store.get_variable(&GLOBAL_VARIABLE_GUID, &name("KEK"), &mut buf).unwrap();
    assert_eq!(&buf[..len], b"kek-v1");
}

// S6 — once PK is installed, KEK must be signed by a certificate in PK's list.
#[test]
fn kek_write_requires_a_signature_verifiable_against_pk() {
    let mut store = new_store();
    let pk_cert = b"pk-cert".as_slice();
    store
        .set_variable(GLOBAL_VARIABLE_GUID, name("PK"), AUTH, auth_payload(2023, b"bootstrap", &signature_list(pk_cert)))
        .unwrap();

    // Wrong signer: nothing in PK's list matches.
    let bad = store.set_variable(GLOBAL_VARIABLE_GUID, name("KEK"), AUTH, auth_payload(2024, b"not-pk-cert", b"kek-v1"));
    assert_eq!(bad.unwrap_err(), EfiStatus::SecurityViolation);

    // Signed by PK's own certificate: accepted.
    store
        .set_variable(GLOBAL_VARIABLE_GUID, name("KEK"), AUTH, auth_payload(2024, pk_cert, b"kek-v1"))
        .unwrap();
    let mut buf = [0u8; 32];
    let (len, _) = store.get_variable(&GLOBAL_VARIABLE_GUID, &name("KEK"), &mut buf).unwrap();
    assert_eq!(&buf[..len], b"kek-v1");
}

// S6 — db falls back from PK to KEK, and only succeeds once the signing key
// it actually needs is present.
#[test]
fn db_write_falls_back_from_pk_to_kek() {
    let mut store = new_store();
    let pk_cert = b"pk-cert".as_slice();
    let kek_cert = b"kek-cert".as_slice();
    store
        .set_variable(GLOBAL_VARIABLE_GUID, name("PK"), AUTH, auth_payload(2023, b"bootstrap", &signature_list(pk_cert)))
        .unwrap();

    // KEK not installed yet: a db write signed by the (future) KEK cert has
    // nothing to verify against but PK, and PK's cert doesn't match.
    let too_early = store.set_variable(SECURITY_DATABASE_GUID, name("db"), AUTH, auth_payload(2024, kek_cert, b"db-v1"));
    assert_eq!(too_early.unwrap_err(), EfiStatus::SecurityViolation);

    store
        .set_variable(GLOBAL_VARIABLE_GUID, name("KEK"), AUTH, auth_payload(2024, pk_cert, &signature_list(kek_cert)))
        .unwrap();

    // Now db signed by KEK succeeds, and db signed by PK still would too.
    store
        .set_variable(SECURITY_DATABASE_GUID, name("db"), AUTH, auth_payload(2025, kek_cert, b"db-v1"))
        .unwrap();
    let mut buf = [0u8; 32];
    let (len, _) = store.get_variable(&SECURITY_DATABASE_GUID, &name("db"), &mut buf).unwrap();
    assert_eq!(&buf[..len], b"db-v1");
}

// S6 — deleting PK (an authenticated, zero-payload write) re-disables
// secure-boot auth for subsequent writes, same as a store that never had a
// PK installed.
#[test]
fn deleting_pk_re_disables_secure_boot_authentication() {
    let mut store = new_store();
    let pk_cert = b"pk-cert".as_slice();
    store
        .set_variable(GLOBAL_VARIABLE_GUID, name("PK"), AUTH, auth_payload(2023, b"bootstrap", &signature_list(pk_cert)))
        .unwrap();

    // Delete PK: authenticated (so it goes through the auth engine, which
    // lets it through because PK is still present and self-verifies), empty
    // payload, and no BS/RT bits so the store treats it as a delete.
    let delete_attrs = attrs::TIME_BASED_AUTHENTICATED_WRITE_ACCESS;
    store
        .set_variable(GLOBAL_VARIABLE_GUID, name("PK"), delete_attrs, auth_payload(2024, pk_cert, b""))
        .unwrap();

    let mut buf = [0u8; 16];
    assert_eq!(store.get_variable(&GLOBAL_VARIABLE_GUID, &name("PK"), &mut buf).unwrap_err(), EfiStatus::NotFound);

    // With PK gone, KEK is unauthenticated again.
    store
        .set_variable(GLOBAL_VARIABLE_GUID, name("KEK"), AUTH, auth_payload(2025, b"whatever", b"kek-v2"))
        .unwrap();
    let (len, _) = store.get_variable(&GLOBAL_VARIABLE_GUID, &name("KEK"), &mut buf).unwrap();
    assert_eq!(&buf[..len], b"kek-v2");
}

// S7 — a private authenticated variable pins the fingerprint of whoever
// signed its first write; a later write from a different signer is rejected
// even though the timestamp strictly increases.
#[test]
fn private_variable_rejects_a_write_from_a_different_signer() {
    let mut store = new_store();
    let guid = Guid::new([9; 16]);
    store.set_variable(guid, name("PrivVar"), AUTH, auth_payload(2023, b"signer-a", b"v1")).unwrap();

    let result = store.set_variable(guid, name("PrivVar"), AUTH, auth_payload(2024, b"signer-b", b"v2"));
    assert_eq!(result.unwrap_err(), EfiStatus::SecurityViolation);

    let mut buf = [0u8; 16];
    let (len, _) = store.get_variable(&guid, &name("PrivVar"), &mut buf).unwrap();
    assert_eq!(&buf[..len], b"v1", "rejected write must not have replaced the stored value");
}

// S7 — the same signer, strictly increasing timestamps, keeps succeeding;
// replaying an old timestamp is rejected even from the legitimate signer.
#[test]
fn private_variable_accepts_same_signer_rejects_timestamp_replay() {
    let mut store = new_store();
    let guid = Guid::new([10; 16]);
    store.set_variable(guid, name("PrivVar"), AUTH, auth_payload(2023, b"signer-a", b"v1")).unwrap();
    store.set_variable(guid, name("PrivVar"), AUTH, auth_payload(2024, b"signer-a", b"v2")).unwrap();

    let replay = store.set_variable(guid, name("PrivVar"), AUTH, auth_payload(2024, b"signer-a", b"v3"));
    assert_eq!(replay.unwrap_err(), EfiStatus::SecurityViolation);

    let mut buf = [0u8; 16];
    let (len, _) = store.get_variable(&guid, &name("PrivVar"), &mut buf).unwrap();
    assert_eq!(&buf[..len], b"v2");
}
