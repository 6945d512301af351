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
//! Crypto collaborator contracts consumed by the authentication engine
//! (§6 "Crypto backend (consumed by authenticator)"). No PKCS#7 parsing or
//! X.509 handling lives in this crate; both are delegated.

pub trait CryptoBackend {
    /// Verifies that `signed_blob` is a PKCS#7 detached signature over
    /// `digest`, trusting `cert` as the signer (secure-boot path: `cert`
    /// comes from a parsed `EFI_SIGNATURE_LIST` entry in a key variable).
    /// An empty `cert` means no external trust root: the signature is
    /// verified against the certificate chain embedded in the PKCS#7
    /// structure itself (private-authenticated-variable path — §4.8).
    fn verify_pkcs7_signature(&self, signed_blob: &[u8], digest: &[u8; 32], cert: &[u8]) -> bool;
}

/// Computes the private-authenticated-variable fingerprint: a 32-byte
/// value derived from the signer certificate's Subject CN and the hash of
/// the top-level issuer's `tbsCertificate`, both extracted from the PKCS#7
/// structure by the collaborator. `None` signals the collaborator could
/// not extract a signer/issuer pair (malformed chain). Implementations
/// that derive the value from a digest shorter than 32 bytes are
/// responsible for zero-padding the result themselves — callers treat the
/// returned array as already padded and perform a plain byte-equality
/// check against it.
pub trait FingerprintProvider {
    fn get_uefi_priv_auth_var_fingerprint(&self, signed_blob: &[u8]) -> Option<[u8; 32]>;
}

/// Lets the authentication engine read the current PK/KEK payloads (raw
/// `EFI_SIGNATURE_LIST` bytes) without depending on the store's full
/// public API. Implemented by `UefiVariableStore` itself.
pub trait KeyVariableSource {
    /// `None` if the key variable does not exist or is zero-length — both
    /// mean "authentication disabled" for `PK`.
    fn key_variable_payload(&self, key_name: &str) -> Option<Vec<u8>>;
}
