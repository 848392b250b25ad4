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

use crate::*;
use anyhow::Result;
use http::Method;
use httpsig_cavage::{
    EcdsaSignatureAlgorithm, RsaSignatureAlgorithm, Signer, SigningConfiguration,
    SIGNING_STRING_PROPERTY,
};
use httpsig_core::hash::{base64_decode, HashAlgorithm};
use httpsig_core::ErrorKind;
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::pkcs8::DecodePublicKey;
use pretty_assertions::assert_eq;
use tokio::fs;

/// Pull the `signature` field out of a Signature header.
fn signature_field(header: &str) -> Vec<u8> {
    let value = header
        .split(',')
        .find_map(|field| field.strip_prefix("signature=\""))
        .and_then(|v| v.strip_suffix('"'))
        .expect("signature field must exist");
    base64_decode(value).expect("signature must be base64")
}

#[tokio::test]
async fn test_rsa_signature() -> Result<()> {
    init_logger();

    let pem = fs::read_to_string(testdata("rsa_private_key.pem")).await?;
    let signer = Signer::new(
        SigningConfiguration::builder(
            "rsa-key",
            RsaSignatureAlgorithm::from_pkcs8_pem(&pem, HashAlgorithm::Sha512)?,
        )
        .header("Host")
        .with_time(fixed_time())
        .build()?,
    );
    let mut msg = TestMessage::new(Method::GET, "https://example.com/hello?x=1");
    signer.sign(&mut msg).await?;

    assert_eq!(
        msg.properties[SIGNING_STRING_PROPERTY],
        format!("(request-target): get /hello?x=1\ndate: {DATE_VALUE}\nhost: example.com")
    );
    // openssl dgst -sha512 -sign rsa_private_key.pem
    assert_eq!(
        msg.header("Signature").expect("signature must be set"),
        "keyId=\"rsa-key\",algorithm=\"rsa-sha512\",headers=\"(request-target) date host\",\
         signature=\"XxF1YJfVjXAKrA33lwLJ485eI6lEcfnHby75wE1c24+z768iGhlbU+j0RRgkIVhajJ5dSdaeQry61\
         IaYcIqK0FcxIjcfJlRs82aqlmfB0/kFRftRHZ9TC4fAeyfH+9pugLay5ppTLIiQlbFdU9j+bdJt6yiC56YvvDIFE3s\
         jRm4z+JvFTgttpxRPFf3JQBkQE/ReEDWPmEp0M7xhXexLzBBuPc6gCeS0Zn2d+OvAEy+DRYEg2jfm8T8tP9gi988N\
         TVhZjB+PggIjOFltFr1/xN7RSQZ4L5tqTwmba+Bi7jbEEGAiaOvuvU4rherS435uDO9WJYDQVMYRUBqLGlymHA==\""
    );
    Ok(())
}

#[tokio::test]
async fn test_ecdsa_signature_verifies() -> Result<()> {
    init_logger();

    let pem = fs::read_to_string(testdata("ecdsa_p256_private_key.pem")).await?;
    let signer = Signer::new(
        SigningConfiguration::builder(
            "ecdsa-key",
            EcdsaSignatureAlgorithm::from_pkcs8_pem(&pem, HashAlgorithm::Sha256)?,
        )
        .digest_algorithm(HashAlgorithm::Sha256)
        .with_time(fixed_time())
        .build()?,
    );
    let mut msg = TestMessage::new(Method::PUT, "https://example.com/items/1").with_body("hello");
    signer.sign(&mut msg).await?;

    let header = msg.header("Signature").expect("signature must be set");
    assert!(header.starts_with(
        "keyId=\"ecdsa-key\",algorithm=\"ecdsa-sha256\",headers=\"(request-target) date digest\","
    ));

    let public_pem = fs::read_to_string(testdata("ecdsa_p256_public_key.pem")).await?;
    let public = p256::ecdsa::VerifyingKey::from_public_key_pem(&public_pem)?;
    let signature = p256::ecdsa::Signature::from_slice(&signature_field(&header))?;
    let hashed = HashAlgorithm::Sha256.digest(msg.properties[SIGNING_STRING_PROPERTY].as_bytes());
    public.verify_prehash(&hashed, &signature)?;
    Ok(())
}

#[tokio::test]
async fn test_unsupported_hash_leaves_no_signature() -> Result<()> {
    let pem = fs::read_to_string(testdata("rsa_private_key.pem")).await?;
    let signer = Signer::new(
        SigningConfiguration::builder(
            "rsa-key",
            RsaSignatureAlgorithm::from_pkcs8_pem(&pem, HashAlgorithm::Sha1)?,
        )
        .build()?,
    );
    let mut msg = TestMessage::new(Method::GET, "https://example.com/");

    let err = signer.sign(&mut msg).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlgorithmUnsupported);
    assert_eq!(msg.header("Signature"), None);
    Ok(())
}
