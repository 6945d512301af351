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
//! The eleven SMM variable opcode handlers (§6). Each one decodes its
//! request out of `req.request`, drives `UefiVariableStore`, and encodes a
//! response into `req.response`.
//!
//! A handler returns [`RpcStatus::ErrorInvalidRequestBody`] /
//! [`RpcStatus::ErrorInvalidResponseBody`] only when the wire buffers
//! themselves are malformed or too small for the framework to even attempt
//! the call (§7 "two error channels"). Once decoding succeeds, whatever the
//! store reports — including every `EfiStatus` failure — is carried back as
//! `req.service_status` under `RpcStatus::Success`: the RPC dispatch itself
//! did its job.

use rpc_provider::RpcRequest;
use rpc_status::{EfiStatus, RpcStatus};
use uefi_variable_checker::VariableConstraints;
use uefi_variable_index::attributes;
use uefi_variable_store::UefiVariableStore;

use crate::wire;

fn ok(req: &mut RpcRequest, response_length: usize) -> RpcStatus {
    req.response_length = response_length;
    req.service_status = i64::from(EfiStatus::Success);
    RpcStatus::Success
}

fn service_error(req: &mut RpcRequest, status: EfiStatus) -> RpcStatus {
    req.response_length = 0;
    req.service_status = i64::from(status);
    RpcStatus::Success
}

/// Largest payload the store accepts for any variable, used to size the
/// scratch buffer `get_variable` probes into — `UefiVariableStore` enforces
/// this same ceiling on every `SetVariable` (`delegate::DelegateStore::max_variable_size`).
fn max_variable_size(store: &UefiVariableStore) -> usize {
    let nv = store.query_variable_info(attributes::NON_VOLATILE).map(|s| s.max_variable_size).unwrap_or(0);
    let volatile = store.query_variable_info(0).map(|s| s.max_variable_size).unwrap_or(0);
    nv.max(volatile) as usize
}

pub fn get_variable(store: &mut UefiVariableStore, req: &mut RpcRequest) -> RpcStatus {
    let parsed = match wire::decode_get_variable_request(req.request) {
        Some(p) => p,
        None => return RpcStatus::ErrorInvalidRequestBody,
    };

    let mut probe = vec![0u8; max_variable_size(store)];
    match store.get_variable(&parsed.guid, &parsed.name, &mut probe) {
        Ok((len, attrs)) => {
            if (len as u64) > parsed.data_size {
                match wire::encode_access_variable_size_only(&parsed.guid, attrs, len as u64, req.response) {
                    Some(n) => {
                        req.response_length = n;
                        req.service_status = i64::from(EfiStatus::BufferTooSmall);
                        RpcStatus::Success
                    }
                    None => RpcStatus::ErrorInvalidResponseBody,
                }
            } else {
                match wire::encode_get_variable_response(&parsed.guid, attrs, &parsed.name, &probe[..len], req.response) {
                    Some(n) => ok(req, n),
                    None => RpcStatus::ErrorInvalidResponseBody,
                }
            }
        }
        Err(status) => service_error(req, status),
    }
}

pub fn set_variable(store: &mut UefiVariableStore, req: &mut RpcRequest) -> RpcStatus {
    let (parsed, data) = match wire::decode_set_variable_request(req.request) {
        Some(p) => p,
        None => return RpcStatus::ErrorInvalidRequestBody,
    };

    match store.set_variable(parsed.guid, parsed.name, parsed.attributes, data) {
        Ok(()) => ok(req, 0),
        Err(status) => service_error(req, status),
    }
}

pub fn get_next_variable_name(store: &mut UefiVariableStore, req: &mut RpcRequest) -> RpcStatus {
    let parsed = match wire::decode_next_name_request(req.request) {
        Some(p) => p,
        None => return RpcStatus::ErrorInvalidRequestBody,
    };

    match store.get_next_variable_name(&parsed.guid, &parsed.name) {
        Ok((next_guid, next_name)) => {
            if (next_name.len() as u64) * 2 > parsed.max_name_size {
                match wire::encode_next_name_size_only(&next_guid, next_name.len() as u64 * 2, req.response) {
                    Some(n) => {
                        req.response_length = n;
                        req.service_status = i64::from(EfiStatus::BufferTooSmall);
                        RpcStatus::Success
                    }
                    None => RpcStatus::ErrorInvalidResponseBody,
                }
            } else {
                match wire::encode_next_name_response(&next_guid, &next_name, req.response) {
                    Some(n) => ok(req, n),
                    None => RpcStatus::ErrorInvalidResponseBody,
                }
            }
        }
        Err(status) => service_error(req, status),
    }
}

pub fn query_variable_info(store: &mut UefiVariableStore, req: &mut RpcRequest) -> RpcStatus {
    let attributes = match wire::decode_query_info_request(req.request) {
        Some(a) => a,
        None => return RpcStatus::ErrorInvalidRequestBody,
    };

    match store.query_variable_info(attributes) {
        Ok(stats) => {
            match wire::encode_query_info_response(
                attributes,
                stats.max_variable_storage_size,
                stats.remaining_variable_storage_size,
                stats.max_variable_size,
                req.response,
            ) {
                Some(n) => ok(req, n),
                None => RpcStatus::ErrorInvalidResponseBody,
            }
        }
        Err(status) => service_error(req, status),
    }
}

/// Wired but inert (§6): UEFI firmware signals the ready-to-boot transition
/// this way, but no ready-to-boot-gated behaviour exists in this store.
pub fn ready_to_boot(_store: &mut UefiVariableStore, req: &mut RpcRequest) -> RpcStatus {
    service_error(req, EfiStatus::Unsupported)
}

pub fn exit_boot_service(store: &mut UefiVariableStore, req: &mut RpcRequest) -> RpcStatus {
    store.exit_boot_service();
    ok(req, 0)
}

/// Wired but inert (§6): no statistics are tracked, so this always reports
/// a zeroed-out response under a successful status.
pub fn get_statistics(_store: &mut UefiVariableStore, req: &mut RpcRequest) -> RpcStatus {
    match wire::encode_statistics_response(req.response) {
        Some(n) => ok(req, n),
        None => RpcStatus::ErrorInvalidResponseBody,
    }
}

pub fn lock_variable(store: &mut UefiVariableStore, req: &mut RpcRequest) -> RpcStatus {
    let (guid, name) = match wire::decode_lock_variable_request(req.request) {
        Some(v) => v,
        None => return RpcStatus::ErrorInvalidRequestBody,
    };

    let current_attributes = {
        let mut probe = vec![0u8; max_variable_size(store)];
        match store.get_variable(&guid, &name, &mut probe) {
            Ok((_, attrs)) => attrs,
            Err(status) => return service_error(req, status),
        }
    };

    let constraints = VariableConstraints {
        revision: uefi_variable_checker::VAR_CHECK_VARIABLE_PROPERTY_REVISION,
        property: uefi_variable_checker::VAR_CHECK_VARIABLE_PROPERTY_READ_ONLY,
        attributes: current_attributes,
        min_size: 0,
        max_size: usize::MAX,
    };

    match store.set_var_check_property(guid, name, constraints) {
        Ok(()) => ok(req, 0),
        Err(status) => service_error(req, status),
    }
}

pub fn var_check_variable_property_set(store: &mut UefiVariableStore, req: &mut RpcRequest) -> RpcStatus {
    let parsed = match wire::decode_var_check_set_request(req.request) {
        Some(p) => p,
        None => return RpcStatus::ErrorInvalidRequestBody,
    };

    let constraints = VariableConstraints {
        revision: parsed.revision,
        property: parsed.property,
        attributes: parsed.attributes,
        min_size: parsed.min_size as usize,
        max_size: parsed.max_size as usize,
    };

    match store.set_var_check_property(parsed.guid, parsed.name, constraints) {
        Ok(()) => ok(req, 0),
        Err(status) => service_error(req, status),
    }
}

pub fn var_check_variable_property_get(store: &mut UefiVariableStore, req: &mut RpcRequest) -> RpcStatus {
    let (guid, name) = match wire::decode_var_check_get_request(req.request) {
        Some(v) => v,
        None => return RpcStatus::ErrorInvalidRequestBody,
    };

    match store.get_var_check_property(&guid, &name) {
        Ok(constraints) => {
            match wire::encode_var_check_get_response(
                constraints.revision,
                constraints.property,
                constraints.attributes,
                constraints.min_size as u64,
                constraints.max_size as u64,
                req.response,
            ) {
                Some(n) => ok(req, n),
                None => RpcStatus::ErrorInvalidResponseBody,
            }
        }
        Err(status) => service_error(req, status),
    }
}

pub fn get_payload_size(store: &mut UefiVariableStore, req: &mut RpcRequest) -> RpcStatus {
    let size = max_variable_size(store) as u64;
    match wire::encode_payload_size_response(size, req.response) {
        Some(n) => ok(req, n),
        None => RpcStatus::ErrorInvalidResponseBody,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpc_status::PsaStatus;
    use std::collections::HashMap;
    use uefi_variable_index::Guid;
    use uefi_variable_store::backend::{StorageBackend, StorageInfo};
    use uefi_variable_store::crypto::{CryptoBackend, FingerprintProvider};
    use uefi_variable_store::names;
    use uefi_variable_store::DelegateStore;

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

    struct NoCrypto;
    impl CryptoBackend for NoCrypto {
        fn verify_pkcs7_signature(&self, _blob: &[u8], _digest: &[u8; 32], _cert: &[u8]) -> bool {
            false
        }
    }
    impl FingerprintProvider for NoCrypto {
        fn get_uefi_priv_auth_var_fingerprint(&self, _blob: &[u8]) -> Option<[u8; 32]> {
            None
        }
    }

    fn new_store() -> UefiVariableStore {
        let persistent = DelegateStore::new(true, 4096, 1024, Box::new(MemoryBackend::default()));
        let volatile = DelegateStore::new(false, 4096, 1024, Box::new(MemoryBackend::default()));
        UefiVariableStore::new(16, 7, persistent, volatile, 1000, 1001, Box::new(NoCrypto), Box::new(NoCrypto)).unwrap()
    }

    #[test]
    fn set_then_get_round_trips_through_the_wire_handlers() {
        let mut store = new_store();
        let guid = Guid::new([1; 16]);
        let name = names::utf16_name("Foo");

        let mut set_req_buf = vec![0u8; wire::ACCESS_VARIABLE_HEADER_LEN + name.len() * 2 + 5];
        wire::encode_get_variable_response(&guid, attributes::BOOTSERVICE_ACCESS, &name, b"hello", &mut set_req_buf).unwrap();
        let mut set_resp = [0u8; 0];
        let mut req = RpcRequest::new(0, 0, 3, 7, &set_req_buf, &mut set_resp);
        assert_eq!(set_variable(&mut store, &mut req), RpcStatus::Success);
        assert_eq!(req.service_status, i64::from(EfiStatus::Success));

        let mut get_req_buf = vec![0u8; wire::ACCESS_VARIABLE_HEADER_LEN + name.len() * 2];
        wire::encode_access_variable_size_only(&guid, 0, 16, &mut get_req_buf).unwrap();
        get_req_buf[wire::ACCESS_VARIABLE_HEADER_LEN..].copy_from_slice(&name.iter().flat_map(|u| u.to_le_bytes()).collect::<Vec<u8>>());
        let mut get_resp = vec![0u8; 64];
        let mut req = RpcRequest::new(0, 0, 1, 7, &get_req_buf, &mut get_resp);
        assert_eq!(get_variable(&mut store, &mut req), RpcStatus::Success);
        assert_eq!(req.service_status, i64::from(EfiStatus::Success));
        let parsed = wire::decode_get_variable_request(&get_resp[..req.response_length]).unwrap();
        assert_eq!(parsed.data_size, 5);
    }

    #[test]
    fn get_variable_reports_not_found() {
        let mut store = new_store();
        let guid = Guid::new([9; 16]);
        let name = names::utf16_name("Ghost");
        let mut req_buf = vec![0u8; wire::ACCESS_VARIABLE_HEADER_LEN + name.len() * 2];
        wire::encode_access_variable_size_only(&guid, 0, 16, &mut req_buf).unwrap();
        req_buf[wire::ACCESS_VARIABLE_HEADER_LEN..].copy_from_slice(&name.iter().flat_map(|u| u.to_le_bytes()).collect::<Vec<u8>>());
        let mut resp = vec![0u8; 64];
        let mut req = RpcRequest::new(0, 0, 1, 7, &req_buf, &mut resp);
        assert_eq!(get_variable(&mut store, &mut req), RpcStatus::Success);
        assert_eq!(req.service_status, i64::from(EfiStatus::NotFound));
        assert_eq!(req.response_length, 0);
    }

    #[test]
    fn malformed_request_is_a_dispatch_error() {
        let mut store = new_store();
        let req_buf = [0u8; 4];
        let mut resp = vec![0u8; 64];
        let mut req = RpcRequest::new(0, 0, 1, 7, &req_buf, &mut resp);
        assert_eq!(get_variable(&mut store, &mut req), RpcStatus::ErrorInvalidRequestBody);
    }

    #[test]
    fn ready_to_boot_is_inert() {
        let mut store = new_store();
        let req_buf = [0u8; 0];
        let mut resp = [0u8; 0];
        let mut req = RpcRequest::new(0, 0, 5, 7, &req_buf, &mut resp);
        assert_eq!(ready_to_boot(&mut store, &mut req), RpcStatus::Success);
        assert_eq!(req.service_status, i64::from(EfiStatus::Unsupported));
    }

    #[test]
    fn get_statistics_reports_zeroed_success() {
        let mut store = new_store();
        let req_buf = [0u8; 0];
        let mut resp = vec![0u8; 8];
        let mut req = RpcRequest::new(0, 0, 7, 7, &req_buf, &mut resp);
        assert_eq!(get_statistics(&mut store, &mut req), RpcStatus::Success);
        assert_eq!(req.service_status, i64::from(EfiStatus::Success));
        assert_eq!(&resp[..req.response_length], &[0u8; 8]);
    }
}
