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
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::{Sha256, Sha384, Sha512};
use std::fmt::{Debug, Formatter};

/// RSA signatures with PKCS#1 v1.5 padding.
///
/// The signing string is hashed first, then the hash is signed.
#[derive(Clone)]
pub struct RsaSignatureAlgorithm {
    key: RsaPrivateKey,
    hash: HashAlgorithm,
}

impl RsaSignatureAlgorithm {
    /// Create a new RSA algorithm from a private key.
    pub fn new(key: RsaPrivateKey, hash: HashAlgorithm) -> Self {
        Self { key, hash }
    }

    /// Load the private key from a PKCS#8 PEM (`BEGIN PRIVATE KEY`).
    pub fn from_pkcs8_pem(pem: &str, hash: HashAlgorithm) -> Result<Self> {
        let key = RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| {
            Error::key_invalid("failed to read pkcs8 rsa private key").with_source(e)
        })?;
        Ok(Self::new(key, hash))
    }

    /// Load the private key from a PKCS#1 PEM (`BEGIN RSA PRIVATE KEY`).
    pub fn from_pkcs1_pem(pem: &str, hash: HashAlgorithm) -> Result<Self> {
        let key = RsaPrivateKey::from_pkcs1_pem(pem).map_err(|e| {
            Error::key_invalid("failed to read pkcs1 rsa private key").with_source(e)
        })?;
        Ok(Self::new(key, hash))
    }

    /// Load the private key from either PEM flavor.
    pub fn from_pem(pem: &str, hash: HashAlgorithm) -> Result<Self> {
        if pem.contains("BEGIN RSA PRIVATE KEY") {
            Self::from_pkcs1_pem(pem, hash)
        } else {
            Self::from_pkcs8_pem(pem, hash)
        }
    }
}

impl Debug for RsaSignatureAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaSignatureAlgorithm")
            .field("bits", &(self.key.size() * 8))
            .field("hash", &self.hash)
            .finish()
    }
}

impl SignatureAlgorithm for RsaSignatureAlgorithm {
    fn name(&self) -> &str {
        "RSA"
    }

    fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    fn sign(&self, content: &[u8]) -> Result<Vec<u8>> {
        let hashed = hash_for_signing(self.hash, content)?;
        let padding = match self.hash {
            HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
            HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
            // Rejected by hash_for_signing already.
            HashAlgorithm::Sha1 => {
                return Err(Error::algorithm_unsupported(
                    "hash algorithm 'SHA1' is not supported for signatures",
                ))
            }
        };

        self.key
            .sign(padding, &hashed)
            .map_err(|e| Error::unexpected("failed to sign with rsa key").with_source(e))
    }
}
