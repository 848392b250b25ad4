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

use crate::algorithm::prefers_date_header;
use crate::configuration::{check_headers, SigningConfiguration};
use crate::constants::*;
use crate::headers::SignedHeaders;
use httpsig_core::time::{add_duration, DateTime};
use httpsig_core::{HttpMessage, Result};
use std::ops::Deref;

/// The configuration of a single signing call.
///
/// It pairs the base configuration with the final set of headers to sign for
/// one message. Build it with [`resolve`] for every message and drop it once
/// the message is signed.
#[derive(Debug)]
pub struct ResolvedConfiguration<'a> {
    config: &'a SigningConfiguration,
    headers: SignedHeaders,
}

impl ResolvedConfiguration<'_> {
    /// Headers to sign, in signing order.
    pub fn headers(&self) -> &SignedHeaders {
        &self.headers
    }

    /// Whether `name` must be present on the message before it's signed,
    /// and isn't yet.
    pub fn should_include(&self, name: &str, message: &dyn HttpMessage) -> bool {
        self.headers.contains(name) && !message.has_header(name)
    }

    /// Time the signature created at `now` expires, if it does.
    pub fn expires_at(&self, now: DateTime) -> Result<Option<DateTime>> {
        self.config
            .expires()
            .map(|d| add_duration(now, d))
            .transpose()
    }
}

impl Deref for ResolvedConfiguration<'_> {
    type Target = SigningConfiguration;

    fn deref(&self) -> &Self::Target {
        self.config
    }
}

/// Resolve the headers to sign for `message`.
///
/// Recommended headers are added first when enabled, then `Digest` follows
/// the body: it's dropped without one and added with one if a digest
/// algorithm is configured.
pub fn resolve<'a>(
    config: &'a SigningConfiguration,
    message: &dyn HttpMessage,
) -> Result<ResolvedConfiguration<'a>> {
    let mut headers = config.headers().clone();

    if config.add_recommended_headers() {
        headers.insert(REQUEST_TARGET);
        if prefers_date_header(config.algorithm()) {
            headers.insert(DATE);
        } else {
            headers.insert(CREATED);
        }
        if config.expires().is_some() {
            headers.insert(EXPIRES);
        }
    }

    if !message.has_body() {
        headers.remove(DIGEST);
    } else if config.digest_algorithm().is_some() {
        headers.insert(DIGEST);
    }

    check_headers(&headers, config.digest_algorithm(), config.expires())?;

    Ok(ResolvedConfiguration { config, headers })
}
