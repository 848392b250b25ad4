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

use crate::algorithm::algorithm_field;
use crate::constants::*;
use crate::resolve::ResolvedConfiguration;
use httpsig_core::hash::base64_encode;
use httpsig_core::time::{unix_seconds, DateTime};
use httpsig_core::Result;
use std::fmt::Write;

/// Compose the value of the `Signature` header.
///
/// Fields always come in the order `keyId`, `algorithm`, `created`,
/// `expires`, `headers`, `signature`. `created` is only written when
/// `(created)` was signed, `expires` when an expiry is configured and
/// `headers` when something was signed.
pub fn compose_signature_header(
    resolved: &ResolvedConfiguration<'_>,
    now: DateTime,
    signature: &[u8],
) -> Result<String> {
    let mut f = String::new();
    write!(f, "keyId=\"{}\"", resolved.key_id())?;
    write!(f, ",algorithm=\"{}\"", algorithm_field(resolved.algorithm()))?;
    if resolved.headers().contains(CREATED) {
        write!(f, ",created={}", unix_seconds(now))?;
    }
    if let Some(expires_at) = resolved.expires_at(now)? {
        write!(f, ",expires={}", unix_seconds(expires_at))?;
    }
    if !resolved.headers().is_empty() {
        write!(f, ",headers=\"{}\"", resolved.headers())?;
    }
    write!(f, ",signature=\"{}\"", base64_encode(signature))?;
    Ok(f)
}
