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
//! Well-known key-variable identity: the two GUID namespaces and the
//! classification rule (§4.8 "Key variables") that decides whether a
//! variable is secure-boot or private-authenticated.

use uefi_variable_index::Guid;

/// `EFI_GLOBAL_VARIABLE`.
pub const GLOBAL_VARIABLE_GUID: Guid = Guid::new([
    0x61, 0xdf, 0xe4, 0x8b, 0xca, 0x93, 0xd2, 0x11, 0xaa, 0x0d, 0x00, 0xe0, 0x98, 0x03, 0x2b, 0x8c,
]);

/// `EFI_IMAGE_SECURITY_DATABASE_GUID`.
pub const SECURITY_DATABASE_GUID: Guid = Guid::new([
    0xcb, 0xb2, 0x19, 0xd7, 0x3a, 0x3d, 0x96, 0x45, 0xa3, 0xbc, 0xda, 0xd0, 0x0e, 0x67, 0x65, 0x6f,
]);

pub fn utf16_name(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn name_eq(name: &[u16], s: &str) -> bool {
    let want = utf16_name(s);
    name == want.as_slice()
}

pub fn is_pk(guid: &Guid, name: &[u16]) -> bool {
    *guid == GLOBAL_VARIABLE_GUID && name_eq(name, "PK")
}

pub fn is_kek(guid: &Guid, name: &[u16]) -> bool {
    *guid == GLOBAL_VARIABLE_GUID && name_eq(name, "KEK")
}

/// `db`, `dbx`, `dbt` or `dbr` under the security database GUID.
pub fn is_db_family(guid: &Guid, name: &[u16]) -> bool {
    *guid == SECURITY_DATABASE_GUID
        && (name_eq(name, "db") || name_eq(name, "dbx") || name_eq(name, "dbt") || name_eq(name, "dbr"))
}

pub fn is_secure_boot_variable(guid: &Guid, name: &[u16]) -> bool {
    is_pk(guid, name) || is_kek(guid, name) || is_db_family(guid, name)
}

/// The key variables eligible to verify a write to `(guid, name)`, tried in
/// order. Empty for a non-secure-boot variable (caller should not reach
/// here in that case).
pub fn select_verification_keys(guid: &Guid, name: &[u16]) -> &'static [&'static str] {
    if is_pk(guid, name) {
        &["PK"]
    } else if is_kek(guid, name) {
        &["PK"]
    } else if is_db_family(guid, name) {
        &["PK", "KEK"]
    } else {
        &[]
    }
}
