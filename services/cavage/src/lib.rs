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

//! Cavage HTTP signatures signer
//!
//! ## Example
//!
//! ```
//! use bytes::Bytes;
//! use httpsig_cavage::{HmacSignatureAlgorithm, SigningConfiguration, Signer};
//! use httpsig_core::hash::HashAlgorithm;
//! use httpsig_core::HttpMessage;
//!
//! # async fn example() -> httpsig_core::Result<()> {
//! let config = SigningConfiguration::builder(
//!     "my-key",
//!     HmacSignatureAlgorithm::new("secret", HashAlgorithm::Sha256),
//! )
//! .digest_algorithm(HashAlgorithm::Sha256)
//! .build()?;
//! let signer = Signer::new(config);
//!
//! let mut req = http::Request::post("https://example.com/hello")
//!     .body(Bytes::from_static(b"hello"))
//!     .unwrap();
//! signer.sign(&mut req).await?;
//!
//! assert!(req.has_header("Signature"));
//! # Ok(())
//! # }
//! ```

mod constants;
pub use constants::{DEFAULT_HASH_ALGORITHM, SIGNING_STRING_PROPERTY};

pub mod algorithm;
pub use algorithm::{
    EcdsaSignatureAlgorithm, HmacSignatureAlgorithm, RsaSignatureAlgorithm, SignatureAlgorithm,
};

mod certificate;
pub use certificate::{
    certificate_key_id, certificate_key_id_from_pem, signature_algorithm_from_pem,
};

mod headers;
pub use headers::SignedHeaders;

mod configuration;
pub use configuration::{
    Clock, HeaderValueProvider, HeaderValueSource, SigningConfiguration,
    SigningConfigurationBuilder, UriFormat,
};

mod config;
pub use config::Config;

mod resolve;
pub use resolve::{resolve, ResolvedConfiguration};

mod digest;
pub use digest::compute_digest;

mod signing_string;
pub use signing_string::compose_signing_string;

mod signature_header;
pub use signature_header::compose_signature_header;

mod sign_request;
pub use sign_request::Signer;
