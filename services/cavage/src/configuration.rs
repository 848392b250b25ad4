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

use crate::algorithm::SignatureAlgorithm;
use crate::certificate::{certificate_key_id_from_pem, signature_algorithm_from_pem};
use crate::constants::*;
use crate::headers::SignedHeaders;
use httpsig_core::hash::HashAlgorithm;
use httpsig_core::time::{now, DateTime};
use httpsig_core::{Error, HttpMessage, Result};
use std::fmt::{Debug, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// How the path and query of `(request-target)` are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UriFormat {
    /// Percent-encoded, as sent on the wire.
    Escaped,
    /// Percent-decoded.
    #[default]
    Unescaped,
}

impl FromStr for UriFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "escaped" => Ok(UriFormat::Escaped),
            "unescaped" => Ok(UriFormat::Unescaped),
            _ => Err(Error::config_invalid(format!(
                "unknown request target uri format: {s}"
            ))),
        }
    }
}

/// Clock returns the time a message is signed at.
pub type Clock = Arc<dyn Fn() -> DateTime + Send + Sync>;

/// HeaderValueProvider computes a header value from the message being signed.
pub type HeaderValueProvider = Arc<dyn Fn(&dyn HttpMessage) -> String + Send + Sync>;

/// Where the value of a registered header comes from.
#[derive(Clone)]
pub enum HeaderValueSource {
    /// A fixed value.
    Literal(String),
    /// A value computed at signing time.
    Provider(HeaderValueProvider),
}

impl HeaderValueSource {
    /// Produce the value for `message`.
    pub fn value(&self, message: &dyn HttpMessage) -> String {
        match self {
            HeaderValueSource::Literal(v) => v.clone(),
            HeaderValueSource::Provider(f) => f(message),
        }
    }
}

impl Debug for HeaderValueSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderValueSource::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            HeaderValueSource::Provider(_) => f.write_str("Provider"),
        }
    }
}

/// SigningConfiguration is everything needed to sign messages for one key.
///
/// It's built once through [`SigningConfigurationBuilder`] and can't be
/// changed afterwards. Clones share the same configuration, so it can be used
/// from many concurrent signing calls.
#[derive(Clone)]
pub struct SigningConfiguration(Arc<Inner>);

struct Inner {
    key_id: String,
    algorithm: Arc<dyn SignatureAlgorithm>,
    digest_algorithm: Option<HashAlgorithm>,
    headers: SignedHeaders,
    header_values: Vec<(String, HeaderValueSource)>,
    expires: Option<Duration>,
    add_recommended_headers: bool,
    request_target_uri_format: UriFormat,
    clock: Clock,
}

impl SigningConfiguration {
    /// Start building a configuration for `key_id` signed by `algorithm`.
    pub fn builder(
        key_id: impl Into<String>,
        algorithm: impl SignatureAlgorithm,
    ) -> SigningConfigurationBuilder {
        SigningConfigurationBuilder::new(key_id, Arc::new(algorithm))
    }

    /// Identifier of the signing key.
    pub fn key_id(&self) -> &str {
        &self.0.key_id
    }

    /// Algorithm that computes signatures.
    pub fn algorithm(&self) -> &dyn SignatureAlgorithm {
        self.0.algorithm.as_ref()
    }

    /// Hash used for the `Digest` header, if any.
    pub fn digest_algorithm(&self) -> Option<HashAlgorithm> {
        self.0.digest_algorithm
    }

    /// Headers explicitly requested for signing.
    pub fn headers(&self) -> &SignedHeaders {
        &self.0.headers
    }

    /// Registered header values in registration order.
    pub fn header_values(&self) -> impl Iterator<Item = (&str, &HeaderValueSource)> {
        self.0.header_values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// How long a signature stays valid, if it expires.
    pub fn expires(&self) -> Option<Duration> {
        self.0.expires
    }

    /// Whether recommended headers are added to every signature.
    pub fn add_recommended_headers(&self) -> bool {
        self.0.add_recommended_headers
    }

    /// Rendering of the `(request-target)` path.
    pub fn request_target_uri_format(&self) -> UriFormat {
        self.0.request_target_uri_format
    }

    /// Current time according to the configured clock.
    pub fn now(&self) -> DateTime {
        (self.0.clock)()
    }
}

impl Debug for SigningConfiguration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfiguration")
            .field("key_id", &self.0.key_id)
            .field("algorithm", &self.0.algorithm)
            .field("digest_algorithm", &self.0.digest_algorithm)
            .field("headers", &self.0.headers)
            .field("header_values", &self.0.header_values)
            .field("expires", &self.0.expires)
            .field("add_recommended_headers", &self.0.add_recommended_headers)
            .field("request_target_uri_format", &self.0.request_target_uri_format)
            .finish_non_exhaustive()
    }
}

/// Builder for [`SigningConfiguration`].
pub struct SigningConfigurationBuilder {
    key_id: String,
    algorithm: Arc<dyn SignatureAlgorithm>,
    digest_algorithm: Option<HashAlgorithm>,
    headers: SignedHeaders,
    header_values: Vec<(String, HeaderValueSource)>,
    expires: Option<Duration>,
    add_recommended_headers: bool,
    request_target_uri_format: UriFormat,
    clock: Clock,
}

impl SigningConfigurationBuilder {
    /// Create a new builder with default settings.
    ///
    /// Recommended headers are added by default, the request target is
    /// unescaped and the clock is the system clock.
    pub fn new(key_id: impl Into<String>, algorithm: Arc<dyn SignatureAlgorithm>) -> Self {
        Self {
            key_id: key_id.into(),
            algorithm,
            digest_algorithm: None,
            headers: SignedHeaders::new(),
            header_values: Vec::new(),
            expires: None,
            add_recommended_headers: true,
            request_target_uri_format: UriFormat::default(),
            clock: Arc::new(now),
        }
    }

    /// Create a builder for a certificate and its private key.
    ///
    /// The key id is derived from the certificate and the algorithm, RSA or
    /// ECDSA, follows the kind of the private key.
    pub fn from_certificate_pem(
        certificate_pem: &str,
        private_key_pem: &str,
        hash: HashAlgorithm,
    ) -> Result<Self> {
        let key_id = certificate_key_id_from_pem(certificate_pem)?;
        let algorithm = signature_algorithm_from_pem(private_key_pem, hash)?;
        Ok(Self::new(key_id, algorithm))
    }

    /// Add a `Digest` of the body computed with `hash` when there is a body.
    pub fn digest_algorithm(mut self, hash: HashAlgorithm) -> Self {
        self.digest_algorithm = Some(hash);
        self
    }

    /// Sign the header `name`.
    pub fn header(mut self, name: &str) -> Self {
        self.headers.insert(name);
        self
    }

    /// Sign all headers in `names`.
    pub fn headers_to_include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.headers.extend(names);
        self
    }

    /// Sign the header `name`, setting it to `value` when the message
    /// doesn't carry it.
    pub fn header_value(self, name: &str, value: impl Into<String>) -> Self {
        self.register(name, HeaderValueSource::Literal(value.into()))
    }

    /// Sign the header `name`, computing it with `provider` when the message
    /// doesn't carry it.
    pub fn header_value_with<F>(self, name: &str, provider: F) -> Self
    where
        F: Fn(&dyn HttpMessage) -> String + Send + Sync + 'static,
    {
        self.register(name, HeaderValueSource::Provider(Arc::new(provider)))
    }

    /// Register many literal header values at once.
    pub fn header_values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in values {
            self = self.header_value(name.as_ref(), value);
        }
        self
    }

    fn register(mut self, name: &str, source: HeaderValueSource) -> Self {
        self.headers.insert(name);
        match self
            .header_values
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = source,
            None => self.header_values.push((name.to_string(), source)),
        }
        self
    }

    /// Let signatures expire `duration` after they are created.
    pub fn expires(mut self, duration: Duration) -> Self {
        self.expires = Some(duration);
        self
    }

    /// Whether to add `(request-target)`, `Date` or `(created)`, and
    /// `(expires)` to every signature.
    pub fn add_recommended_headers(mut self, enabled: bool) -> Self {
        self.add_recommended_headers = enabled;
        self
    }

    /// Set how the `(request-target)` path is rendered.
    pub fn request_target_uri_format(mut self, format: UriFormat) -> Self {
        self.request_target_uri_format = format;
        self
    }

    /// Replace the clock used to timestamp signatures.
    pub fn clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Sign every message as if it was `time`.
    pub fn with_time(self, time: DateTime) -> Self {
        self.clock(move || time)
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<SigningConfiguration> {
        if self.key_id.is_empty() {
            return Err(Error::config_invalid("key id must not be empty"));
        }
        check_headers(&self.headers, self.digest_algorithm, self.expires)?;

        Ok(SigningConfiguration(Arc::new(Inner {
            key_id: self.key_id,
            algorithm: self.algorithm,
            digest_algorithm: self.digest_algorithm,
            headers: self.headers,
            header_values: self.header_values,
            expires: self.expires,
            add_recommended_headers: self.add_recommended_headers,
            request_target_uri_format: self.request_target_uri_format,
            clock: self.clock,
        })))
    }
}

/// Check that every header in `headers` can be produced.
pub(crate) fn check_headers(
    headers: &SignedHeaders,
    digest_algorithm: Option<HashAlgorithm>,
    expires: Option<Duration>,
) -> Result<()> {
    if headers.contains(DIGEST) && digest_algorithm.is_none() {
        return Err(Error::config_invalid(
            "Digest header requested but no digest algorithm is set",
        ));
    }
    for name in [EXPIRES_HEADER, EXPIRES] {
        if headers.contains(name) && expires.is_none() {
            return Err(Error::config_invalid(format!(
                "{name} header requested but no expiry is set"
            )));
        }
    }
    Ok(())
}
