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

use crate::algorithm::{EcdsaSignatureAlgorithm, RsaSignatureAlgorithm, SignatureAlgorithm};
use httpsig_core::hash::HashAlgorithm;
use httpsig_core::{Error, ErrorKind, Result};
use rsa::pkcs8::der::pem;
use std::sync::Arc;

/// Number of trailing certificate hash bytes that make up a key id.
const KEY_ID_LENGTH: usize = 6;

/// Key id of a DER encoded certificate: the lowercase hex of the last six
/// bytes of its SHA-256 hash.
pub fn certificate_key_id(der: &[u8]) -> String {
    let hash = HashAlgorithm::Sha256.digest(der);
    hex::encode(&hash[hash.len() - KEY_ID_LENGTH..])
}

/// Key id of the first certificate in a PEM document.
pub fn certificate_key_id_from_pem(certificate_pem: &str) -> Result<String> {
    let (label, der) = pem::decode_vec(certificate_pem.as_bytes())
        .map_err(|e| Error::key_invalid(format!("certificate is not valid pem: {e}")))?;
    if label != "CERTIFICATE" {
        return Err(Error::key_invalid(format!(
            "expected a CERTIFICATE pem block, got {label}"
        )));
    }

    Ok(certificate_key_id(&der))
}

/// Signature algorithm matching the kind of `private_key_pem`, RSA first and
/// ECDSA otherwise.
pub fn signature_algorithm_from_pem(
    private_key_pem: &str,
    hash: HashAlgorithm,
) -> Result<Arc<dyn SignatureAlgorithm>> {
    match RsaSignatureAlgorithm::from_pem(private_key_pem, hash) {
        Ok(algorithm) => return Ok(Arc::new(algorithm)),
        Err(e) if e.kind() != ErrorKind::KeyInvalid => return Err(e),
        Err(_) => {}
    }

    EcdsaSignatureAlgorithm::from_pem(private_key_pem, hash)
        .map(|algorithm| Arc::new(algorithm) as Arc<dyn SignatureAlgorithm>)
        .map_err(|e| {
            Error::key_invalid("private key is neither an RSA nor an ECDSA key").with_source(e)
        })
}
