// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Signature algorithms.

use httpsig_core::hash::HashAlgorithm;
use httpsig_core::{Error, Result};
use std::fmt::Debug;

mod ecdsa;
pub use ecdsa::EcdsaSignatureAlgorithm;
mod hmac;
pub use hmac::HmacSignatureAlgorithm;
mod rsa;
pub use rsa::RsaSignatureAlgorithm;

/// SignatureAlgorithm turns a signing string into raw signature bytes.
///
/// Implementations hold their own key material. The signer only relies on
/// `name`, `hash_algorithm` and `sign`, so new algorithms plug in without
/// touching the resolver or the composers.
///
/// `sign` may be called concurrently from many signing calls sharing one
/// configuration.
pub trait SignatureAlgorithm: Debug + Send + Sync + 'static {
    /// Name token of this algorithm, like `RSA` or `HMAC`.
    ///
    /// It decides which recommended headers are added, and lowercased it is
    /// the first half of the `algorithm` field.
    fn name(&self) -> &str;

    /// Hash algorithm used while signing.
    fn hash_algorithm(&self) -> HashAlgorithm;

    /// Sign content and return the raw signature.
    fn sign(&self, content: &[u8]) -> Result<Vec<u8>>;
}

/// Returns true if `algorithm` should sign the `Date` header rather than
/// `(created)`.
///
/// That's the case for names starting with `rsa`, `hmac` or `ecdsa`, ignoring
/// case.
pub fn prefers_date_header(algorithm: &dyn SignatureAlgorithm) -> bool {
    let name = algorithm.name();
    ["rsa", "hmac", "ecdsa"]
        .iter()
        .any(|prefix| starts_with_ignore_ascii_case(name, prefix))
}

/// The `algorithm` field of the signature header: `<name>-<hash>` in lowercase.
pub fn algorithm_field(algorithm: &dyn SignatureAlgorithm) -> String {
    format!(
        "{}-{}",
        algorithm.name().to_lowercase(),
        algorithm.hash_algorithm().name().to_lowercase()
    )
}

fn starts_with_ignore_ascii_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Hash content before it's signed by an asymmetric key.
///
/// Only the SHA-2 family can be used for signatures.
pub(crate) fn hash_for_signing(hash: HashAlgorithm, content: &[u8]) -> Result<Vec<u8>> {
    ensure_signature_hash(hash)?;
    Ok(hash.digest(content))
}

pub(crate) fn ensure_signature_hash(hash: HashAlgorithm) -> Result<()> {
    match hash {
        HashAlgorithm::Sha256 | HashAlgorithm::Sha384 | HashAlgorithm::Sha512 => Ok(()),
        HashAlgorithm::Sha1 => Err(Error::algorithm_unsupported(format!(
            "hash algorithm '{hash}' is not supported for signatures"
        ))),
    }
}
