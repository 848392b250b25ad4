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

use crate::configuration::SigningConfiguration;
use crate::constants::*;
use crate::digest::compute_digest;
use crate::resolve::resolve;
use crate::signature_header::compose_signature_header;
use crate::signing_string::compose_signing_string;
use http::Uri;
use httpsig_core::time::format_http_date;
use httpsig_core::{Error, HttpMessage, Result};
use log::debug;
use std::net::IpAddr;

/// Signer signs HTTP messages with Cavage HTTP signatures.
///
/// - [Signing HTTP Messages](https://datatracker.ietf.org/doc/html/draft-cavage-http-signatures-12)
///
/// A signer is cheap to clone and can sign many messages concurrently. Every
/// call resolves its own headers, nothing is cached between messages.
#[derive(Debug, Clone)]
pub struct Signer {
    config: SigningConfiguration,
}

impl Signer {
    /// Create a new signer from a configuration.
    pub fn new(config: SigningConfiguration) -> Self {
        Self { config }
    }

    /// The configuration of this signer.
    pub fn config(&self) -> &SigningConfiguration {
        &self.config
    }

    /// Sign `message` in place.
    ///
    /// `Date`, `Host`, `Digest` and registered header values are set when
    /// they are signed and the message doesn't carry them yet. A `Signature`
    /// from an earlier attempt is removed first and the new one is written
    /// last, so a failed call never leaves a signature on the message.
    ///
    /// Reading the body for `Digest` is the only await point.
    pub async fn sign(&self, message: &mut dyn HttpMessage) -> Result<()> {
        message.remove_header(SIGNATURE);
        let resolved = resolve(&self.config, &*message)?;
        let now = self.config.now();

        debug!("signing with headers: {}", resolved.headers());

        if resolved.should_include(DATE, &*message) {
            message.set_header(DATE, &format_http_date(now))?;
        }

        if resolved.should_include(HOST, &*message) {
            let host = host(message.uri())?;
            message.set_header(HOST, &host)?;
        }

        if let Some(hash) = resolved.digest_algorithm() {
            if resolved.should_include(DIGEST, &*message) {
                if let Some(body) = message.read_body().await? {
                    message.set_header(DIGEST, &compute_digest(&body, hash))?;
                }
            }
        }

        for (name, source) in resolved.header_values() {
            if resolved.should_include(name, &*message) {
                let value = source.value(&*message);
                message.set_header(name, &value)?;
            }
        }

        let signing_string = compose_signing_string(&resolved, &*message, now)?;
        message.set_property(SIGNING_STRING_PROPERTY, &signing_string);
        debug!("string to sign: {}", &signing_string);

        let signature = resolved.algorithm().sign(signing_string.as_bytes())?;
        let value = compose_signature_header(&resolved, now, &signature)?;
        message.set_header(SIGNATURE, &value)
    }
}

/// Host of `uri` in Unicode, without the port.
fn host(uri: &Uri) -> Result<String> {
    let host = uri
        .host()
        .ok_or_else(|| Error::request_invalid(format!("uri {uri} has no host")))?;

    // IP literals pass through, only domain names are decoded.
    let trimmed = host.trim_start_matches('[').trim_end_matches(']');
    if trimmed.parse::<IpAddr>().is_ok() {
        return Ok(host.to_string());
    }

    let (unicode, result) = idna::domain_to_unicode(host);
    result.map_err(|e| {
        Error::request_invalid(format!("host {host} is not a valid domain: {e:?}"))
    })?;

    Ok(unicode)
}
