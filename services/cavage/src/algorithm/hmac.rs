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

use super::{ensure_signature_hash, SignatureAlgorithm};
use httpsig_core::hash::HashAlgorithm;
use httpsig_core::utils::Redact;
use httpsig_core::Result;
use std::fmt::{Debug, Formatter};

/// HMAC signatures keyed by a shared secret.
#[derive(Clone)]
pub struct HmacSignatureAlgorithm {
    key: Vec<u8>,
    hash: HashAlgorithm,
}

impl HmacSignatureAlgorithm {
    /// Create a new HMAC algorithm.
    pub fn new(key: impl Into<Vec<u8>>, hash: HashAlgorithm) -> Self {
        Self {
            key: key.into(),
            hash,
        }
    }
}

impl Debug for HmacSignatureAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSignatureAlgorithm")
            .field("key", &Redact::from(&self.key))
            .field("hash", &self.hash)
            .finish()
    }
}

impl SignatureAlgorithm for HmacSignatureAlgorithm {
    fn name(&self) -> &str {
        "HMAC"
    }

    fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    fn sign(&self, content: &[u8]) -> Result<Vec<u8>> {
        ensure_signature_hash(self.hash)?;
        self.hash.hmac(&self.key, content)
    }
}
