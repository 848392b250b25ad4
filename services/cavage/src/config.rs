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

use crate::algorithm::{
    EcdsaSignatureAlgorithm, HmacSignatureAlgorithm, RsaSignatureAlgorithm, SignatureAlgorithm,
};
use crate::certificate::{certificate_key_id_from_pem, signature_algorithm_from_pem};
use crate::configuration::{SigningConfiguration, SigningConfigurationBuilder, UriFormat};
use crate::constants::*;
use httpsig_core::hash::{base64_decode, HashAlgorithm};
use httpsig_core::utils::Redact;
use httpsig_core::{Context, Error, Result};
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

/// Config is the declarative form of a [`SigningConfiguration`].
///
/// It can be loaded from environment variables or a TOML document, and
/// turned into a signing configuration once the key material is read.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Identifier of the signing key, derived from `certificate_path` if unset.
    pub key_id: Option<String>,
    /// Signature algorithm: `rsa`, `ecdsa` or `hmac`. With a certificate it
    /// follows the kind of the private key if unset.
    pub algorithm: Option<String>,
    /// Hash used by the signature algorithm, SHA-512 if unset.
    pub hash_algorithm: Option<String>,
    /// Path of the PEM private key for `rsa` and `ecdsa`.
    pub private_key_path: Option<String>,
    /// Path of the PEM certificate of the private key.
    pub certificate_path: Option<String>,
    /// Base64 encoded secret for `hmac`.
    pub secret_key: Option<String>,
    /// Hash used for the `Digest` header.
    pub digest_algorithm: Option<String>,
    /// Headers to sign.
    pub headers: Option<Vec<String>>,
    /// Literal values of headers to set and sign.
    pub header_values: Option<BTreeMap<String, String>>,
    /// Seconds until a signature expires.
    pub expires: Option<u64>,
    /// Whether recommended headers are added.
    pub add_recommended_headers: Option<bool>,
    /// `escaped` or `unescaped`.
    pub request_target_uri_format: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .field("hash_algorithm", &self.hash_algorithm)
            .field("private_key_path", &Redact::from(&self.private_key_path))
            .field("certificate_path", &self.certificate_path)
            .field("secret_key", &Redact::from(&self.secret_key))
            .field("digest_algorithm", &self.digest_algorithm)
            .field("headers", &self.headers)
            .field("header_values", &self.header_values)
            .field("expires", &self.expires)
            .field("add_recommended_headers", &self.add_recommended_headers)
            .field("request_target_uri_format", &self.request_target_uri_format)
            .finish()
    }
}

impl Config {
    /// Load config from environment variables.
    pub fn from_env(ctx: &Context) -> Result<Self> {
        let expires = ctx
            .env_var(HTTPSIG_EXPIRES)
            .map(|v| {
                v.trim().parse::<u64>().map_err(|e| {
                    Error::config_invalid(format!("{HTTPSIG_EXPIRES} must be seconds: {v}"))
                        .with_source(e)
                })
            })
            .transpose()?;
        let add_recommended_headers = ctx
            .env_var(HTTPSIG_ADD_RECOMMENDED_HEADERS)
            .map(|v| {
                v.trim().to_lowercase().parse::<bool>().map_err(|e| {
                    Error::config_invalid(format!(
                        "{HTTPSIG_ADD_RECOMMENDED_HEADERS} must be true or false: {v}"
                    ))
                    .with_source(e)
                })
            })
            .transpose()?;

        Ok(Self {
            key_id: ctx.env_var(HTTPSIG_KEY_ID),
            algorithm: ctx.env_var(HTTPSIG_ALGORITHM),
            hash_algorithm: ctx.env_var(HTTPSIG_HASH_ALGORITHM),
            private_key_path: ctx.env_var(HTTPSIG_PRIVATE_KEY_PATH),
            certificate_path: ctx.env_var(HTTPSIG_CERTIFICATE_PATH),
            secret_key: ctx.env_var(HTTPSIG_SECRET_KEY),
            digest_algorithm: ctx.env_var(HTTPSIG_DIGEST_ALGORITHM),
            headers: ctx.env_var(HTTPSIG_HEADERS).map(|v| {
                v.split([',', ' '])
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            }),
            header_values: None,
            expires,
            add_recommended_headers,
            request_target_uri_format: ctx.env_var(HTTPSIG_REQUEST_TARGET_URI_FORMAT),
        })
    }

    /// Load config from a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::config_invalid("failed to parse toml config").with_source(e))
    }

    /// Fill every unset field from `other`.
    pub fn merge(self, other: Config) -> Self {
        Self {
            key_id: self.key_id.or(other.key_id),
            algorithm: self.algorithm.or(other.algorithm),
            hash_algorithm: self.hash_algorithm.or(other.hash_algorithm),
            private_key_path: self.private_key_path.or(other.private_key_path),
            certificate_path: self.certificate_path.or(other.certificate_path),
            secret_key: self.secret_key.or(other.secret_key),
            digest_algorithm: self.digest_algorithm.or(other.digest_algorithm),
            headers: self.headers.or(other.headers),
            header_values: self.header_values.or(other.header_values),
            expires: self.expires.or(other.expires),
            add_recommended_headers: self.add_recommended_headers.or(other.add_recommended_headers),
            request_target_uri_format: self
                .request_target_uri_format
                .or(other.request_target_uri_format),
        }
    }

    /// Build the signature algorithm, reading the private key through `ctx`.
    pub async fn load_signature_algorithm(
        &self,
        ctx: &Context,
    ) -> Result<Arc<dyn SignatureAlgorithm>> {
        let hash = match &self.hash_algorithm {
            Some(v) => v.parse::<HashAlgorithm>()?,
            None => DEFAULT_HASH_ALGORITHM,
        };
        let algorithm = match self.algorithm.as_deref() {
            Some(v) => v,
            None if self.certificate_path.is_some() => {
                let pem = self.read_private_key(ctx).await?;
                return signature_algorithm_from_pem(&pem, hash);
            }
            None => return Err(Error::config_invalid("signature algorithm is not set")),
        };

        match algorithm.to_lowercase().as_str() {
            "rsa" => {
                let pem = self.read_private_key(ctx).await?;
                Ok(Arc::new(RsaSignatureAlgorithm::from_pem(&pem, hash)?))
            }
            "ecdsa" => {
                let pem = self.read_private_key(ctx).await?;
                Ok(Arc::new(EcdsaSignatureAlgorithm::from_pem(&pem, hash)?))
            }
            "hmac" => {
                let secret = self
                    .secret_key
                    .as_deref()
                    .ok_or_else(|| Error::config_invalid("secret key is required for hmac"))?;
                let key = base64_decode(secret.trim())
                    .map_err(|e| Error::key_invalid("secret key is not valid base64").with_source(e))?;
                Ok(Arc::new(HmacSignatureAlgorithm::new(key, hash)))
            }
            _ => Err(Error::algorithm_unsupported(format!(
                "signature algorithm '{algorithm}' is not supported"
            ))),
        }
    }

    /// The key id, or the one derived from the certificate if unset.
    pub async fn load_key_id(&self, ctx: &Context) -> Result<String> {
        if let Some(key_id) = &self.key_id {
            return Ok(key_id.clone());
        }

        let path = self
            .certificate_path
            .as_deref()
            .ok_or_else(|| Error::config_invalid("key id is not set"))?;
        let path = ctx
            .expand_home_dir(path)
            .ok_or_else(|| Error::config_invalid("home dir of certificate path not found"))?;

        debug!("deriving key id from certificate {path}");
        let pem = ctx.file_read_as_string(&path).await?;
        certificate_key_id_from_pem(&pem)
    }

    async fn read_private_key(&self, ctx: &Context) -> Result<String> {
        let path = self
            .private_key_path
            .as_deref()
            .ok_or_else(|| Error::config_invalid("private key path is required"))?;
        let path = ctx
            .expand_home_dir(path)
            .ok_or_else(|| Error::config_invalid("home dir of private key path not found"))?;

        debug!("loading private key from {:?}", Redact::from(&path));
        ctx.file_read_as_string(&path).await
    }

    /// Apply this config to a builder signing with `algorithm`.
    pub fn into_builder(
        self,
        algorithm: Arc<dyn SignatureAlgorithm>,
    ) -> Result<SigningConfigurationBuilder> {
        let key_id = self
            .key_id
            .ok_or_else(|| Error::config_invalid("key id is not set"))?;
        let mut builder = SigningConfigurationBuilder::new(key_id, algorithm);

        if let Some(v) = self.digest_algorithm {
            builder = builder.digest_algorithm(v.parse()?);
        }
        if let Some(v) = self.headers {
            builder = builder.headers_to_include(v);
        }
        if let Some(v) = self.header_values {
            builder = builder.header_values(v);
        }
        if let Some(v) = self.expires {
            builder = builder.expires(Duration::from_secs(v));
        }
        if let Some(v) = self.add_recommended_headers {
            builder = builder.add_recommended_headers(v);
        }
        if let Some(v) = self.request_target_uri_format {
            builder = builder.request_target_uri_format(v.parse::<UriFormat>()?);
        }
        Ok(builder)
    }

    /// Load the key material and build a signing configuration.
    pub async fn build(self, ctx: &Context) -> Result<SigningConfiguration> {
        let key_id = self.load_key_id(ctx).await?;
        let algorithm = self.load_signature_algorithm(ctx).await?;
        Self {
            key_id: Some(key_id),
            ..self
        }
        .into_builder(algorithm)?
        .build()
    }
}
