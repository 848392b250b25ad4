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

use super::{hash_for_signing, SignatureAlgorithm};
use httpsig_core::hash::HashAlgorithm;
use httpsig_core::{Error, Result};
use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::pkcs8::DecodePrivateKey;
use std::fmt::{Debug, Formatter};

#[derive(Clone)]
enum SigningKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

/// ECDSA signatures over NIST P-256 or P-384.
///
/// The signing string is hashed with the configured hash, and the raw
/// `r || s` pair is returned.
#[derive(Clone)]
pub struct EcdsaSignatureAlgorithm {
    key: SigningKey,
    hash: HashAlgorithm,
}

impl EcdsaSignatureAlgorithm {
    /// Create a new algorithm from a P-256 key.
    pub fn new_p256(key: p256::ecdsa::SigningKey, hash: HashAlgorithm) -> Self {
        Self {
            key: SigningKey::P256(key),
            hash,
        }
    }

    /// Create a new algorithm from a P-384 key.
    pub fn new_p384(key: p384::ecdsa::SigningKey, hash: HashAlgorithm) -> Self {
        Self {
            key: SigningKey::P384(key),
            hash,
        }
    }

    /// Load the private key from a PKCS#8 PEM (`BEGIN PRIVATE KEY`).
    ///
    /// The curve is detected from the key.
    pub fn from_pkcs8_pem(pem: &str, hash: HashAlgorithm) -> Result<Self> {
        if let Ok(key) = p256::ecdsa::SigningKey::from_pkcs8_pem(pem) {
            return Ok(Self::new_p256(key, hash));
        }

        let key = p384::ecdsa::SigningKey::from_pkcs8_pem(pem).map_err(|e| {
            Error::key_invalid("failed to read pkcs8 ecdsa private key").with_source(e)
        })?;
        Ok(Self::new_p384(key, hash))
    }

    /// Load the private key from a SEC1 PEM (`BEGIN EC PRIVATE KEY`).
    pub fn from_sec1_pem(pem: &str, hash: HashAlgorithm) -> Result<Self> {
        if let Ok(key) = p256::SecretKey::from_sec1_pem(pem) {
            return Ok(Self::new_p256(key.into(), hash));
        }

        let key = p384::SecretKey::from_sec1_pem(pem).map_err(|e| {
            Error::key_invalid("failed to read sec1 ecdsa private key").with_source(e)
        })?;
        Ok(Self::new_p384(key.into(), hash))
    }

    /// Load the private key from either PEM flavor.
    pub fn from_pem(pem: &str, hash: HashAlgorithm) -> Result<Self> {
        if pem.contains("BEGIN EC PRIVATE KEY") {
            Self::from_sec1_pem(pem, hash)
        } else {
            Self::from_pkcs8_pem(pem, hash)
        }
    }

    fn curve(&self) -> &'static str {
        match self.key {
            SigningKey::P256(_) => "P-256",
            SigningKey::P384(_) => "P-384",
        }
    }
}

impl Debug for EcdsaSignatureAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaSignatureAlgorithm")
            .field("curve", &self.curve())
            .field("hash", &self.hash)
            .finish()
    }
}

impl SignatureAlgorithm for EcdsaSignatureAlgorithm {
    fn name(&self) -> &str {
        "ECDsa"
    }

    fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    fn sign(&self, content: &[u8]) -> Result<Vec<u8>> {
        let hashed = hash_for_signing(self.hash, content)?;

        let signature = match &self.key {
            SigningKey::P256(key) => {
                let signature: p256::ecdsa::Signature = key
                    .sign_prehash(&hashed)
                    .map_err(|e| Error::unexpected("failed to sign with ecdsa key").with_source(e))?;
                signature.to_bytes().to_vec()
            }
            SigningKey::P384(key) => {
                let signature: p384::ecdsa::Signature = key
                    .sign_prehash(&hashed)
                    .map_err(|e| Error::unexpected("failed to sign with ecdsa key").with_source(e))?;
                signature.to_bytes().to_vec()
            }
        };
        Ok(signature)
    }
}
