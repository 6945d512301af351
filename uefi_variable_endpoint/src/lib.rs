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
//! Binds [`uefi_variable_store::UefiVariableStore`] to the RPC substrate as
//! the SMM variable service (§6): an [`rpc_provider::OpcodeDispatcher`]
//! covering the eleven `SMM_VARIABLE_FUNCTION_*` opcodes, ready to be handed
//! to an [`rpc_provider::ServiceEndpoint`] under [`SERVICE_UUID`].

pub mod handlers;
pub mod opcode;
pub mod wire;

use rpc_common::Uuid;
use rpc_provider::{Handler, OpcodeDispatcher, ServiceEndpoint};
use uefi_variable_store::UefiVariableStore;

/// The SMM variable service's registered interface identity.
pub const SERVICE_UUID: Uuid = Uuid::new(opcode::SERVICE_UUID_BYTES);

/// Builds the opcode dispatch table for the SMM variable service. Callers
/// that extend the service (§4.4's chain-of-responsibility) can
/// `extend()` this with their own `OpcodeDispatcher` before wrapping it in
/// a [`ServiceEndpoint`].
pub fn new_provider() -> OpcodeDispatcher<UefiVariableStore> {
    OpcodeDispatcher::new(vec![
        Handler::new(opcode::GET_VARIABLE, handlers::get_variable),
        Handler::new(opcode::GET_NEXT_VARIABLE_NAME, handlers::get_next_variable_name),
        Handler::new(opcode::SET_VARIABLE, handlers::set_variable),
        Handler::new(opcode::QUERY_VARIABLE_INFO, handlers::query_variable_info),
        Handler::new(opcode::READY_TO_BOOT, handlers::ready_to_boot),
        Handler::new(opcode::EXIT_BOOT_SERVICE, handlers::exit_boot_service),
        Handler::new(opcode::GET_STATISTICS, handlers::get_statistics),
        Handler::new(opcode::LOCK_VARIABLE, handlers::lock_variable),
        Handler::new(opcode::VAR_CHECK_VARIABLE_PROPERTY_SET, handlers::var_check_variable_property_set),
        Handler::new(opcode::VAR_CHECK_VARIABLE_PROPERTY_GET, handlers::var_check_variable_property_get),
        Handler::new(opcode::GET_PAYLOAD_SIZE, handlers::get_payload_size),
    ])
}

/// Builds a ready-to-use [`ServiceEndpoint`] at `interface_id`, owning
/// `store` as its dispatch context.
pub fn new_endpoint(interface_id: u8, store: UefiVariableStore) -> ServiceEndpoint<UefiVariableStore> {
    ServiceEndpoint::new(SERVICE_UUID, interface_id, Box::new(new_provider()), store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpc_abi::{management_opcode, WireMessage, MANAGEMENT_INTERFACE_ID};
    use rpc_status::RpcStatus;
    use std::collections::HashMap;
    use uefi_variable_index::{attributes, Guid};
    use uefi_variable_store::backend::{StorageBackend, StorageInfo};
    use uefi_variable_store::crypto::{CryptoBackend, FingerprintProvider};
    use uefi_variable_store::{names, DelegateStore};

    #[derive(Default)]
    struct MemoryBackend {
        objects: HashMap<(u32, u64), Vec<u8>>,
    }

    impl StorageBackend for MemoryBackend {
        fn create(&mut self, client_id: u32, uid: u64, _capacity: usize, _flags: u32) -> Result<(), rpc_status::PsaStatus> {
            self.objects.entry((client_id, uid)).or_default();
            Ok(())
        }
        fn set(&mut self, client_id: u32, uid: u64, data: &[u8]) -> Result<(), rpc_status::PsaStatus> {
            self.objects.insert((client_id, uid), data.to_vec());
            Ok(())
        }
        fn set_extended(&mut self, client_id: u32, uid: u64, offset: usize, data: &[u8]) -> Result<(), rpc_status::PsaStatus> {
            let obj = self.objects.entry((client_id, uid)).or_default();
            obj.truncate(offset);
            obj.extend_from_slice(data);
            Ok(())
        }
        fn get(&self, client_id: u32, uid: u64, offset: usize, buf: &mut [u8]) -> Result<usize, rpc_status::PsaStatus> {
            let obj = self.objects.get(&(client_id, uid)).ok_or(rpc_status::PsaStatus::DoesNotExist)?;
            let end = (offset + buf.len()).min(obj.len());
            let n = end.saturating_sub(offset);
            buf[..n].copy_from_slice(&obj[offset..end]);
            Ok(n)
        }
        fn get_info(&self, client_id: u32, uid: u64) -> Result<StorageInfo, rpc_status::PsaStatus> {
            let obj = self.objects.get(&(client_id, uid)).ok_or(rpc_status::PsaStatus::DoesNotExist)?;
            Ok(StorageInfo { size: obj.len(), capacity: obj.len(), flags: 0 })
        }
        fn remove(&mut self, client_id: u32, uid: u64) -> Result<(), rpc_status::PsaStatus> {
            self.objects.remove(&(client_id, uid)).map(|_| ()).ok_or(rpc_status::PsaStatus::DoesNotExist)
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

    // S8 — a management INTERFACE_ID_QUERY followed by a data-path SetVariable/GetVariable
    // pair dispatched through the real endpoint, exactly as a caller would drive it.
    #[test]
    fn endpoint_answers_interface_id_query_and_round_trips_a_variable() {
        let mut ep = new_endpoint(9, new_store());

        let mut query = WireMessage::new();
        query.set_interface_id(MANAGEMENT_INTERFACE_ID);
        query.set_opcode(management_opcode::INTERFACE_ID_QUERY);
        query.set_uuid_bytes(&opcode::SERVICE_UUID_BYTES);
        let resp = ep.handle(1, &query, &[], &mut []);
        assert_eq!(resp.rpc_status(), RpcStatus::Success.into());
        assert_eq!(resp.queried_interface_id(), 9);

        let guid = Guid::new([4; 16]);
        let name = names::utf16_name("Foo");
        let mut set_req = vec![0u8; wire::ACCESS_VARIABLE_HEADER_LEN + name.len() * 2 + 3];
        wire::encode_get_variable_response(&guid, attributes::BOOTSERVICE_ACCESS, &name, b"abc", &mut set_req).unwrap();
        let mut set_resp_body = [0u8; 0];
        let mut set_msg = WireMessage::new();
        set_msg.set_interface_id(9);
        set_msg.set_opcode(opcode::SET_VARIABLE as u16);
        set_msg.set_request_length(set_req.len() as u32);
        let resp = ep.handle(1, &set_msg, &set_req, &mut set_resp_body);
        assert_eq!(resp.rpc_status(), RpcStatus::Success.into());
        assert_eq!(resp.service_status_low32(), 0);

        let mut get_req = vec![0u8; wire::ACCESS_VARIABLE_HEADER_LEN + name.len() * 2];
        wire::encode_access_variable_size_only(&guid, 0, 16, &mut get_req).unwrap();
        get_req[wire::ACCESS_VARIABLE_HEADER_LEN..].copy_from_slice(&name.iter().flat_map(|u| u.to_le_bytes()).collect::<Vec<u8>>());
        let mut get_resp_body = vec![0u8; 64];
        let mut get_msg = WireMessage::new();
        get_msg.set_interface_id(9);
        get_msg.set_opcode(opcode::GET_VARIABLE as u16);
        get_msg.set_request_length(get_req.len() as u32);
        let resp = ep.handle(1, &get_msg, &get_req, &mut get_resp_body);
        assert_eq!(resp.rpc_status(), RpcStatus::Success.into());
        let parsed = wire::decode_get_variable_request(&get_resp_body[..resp.response_length() as usize]).unwrap();
        assert_eq!(parsed.data_size, 3);
    }
}
