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
use httpsig_cavage::{Config, SignatureAlgorithm, Signer, SIGNING_STRING_PROPERTY};
use httpsig_core::{Context, ErrorKind, StaticEnv};
use httpsig_file_read_tokio::TokioFileRead;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn context(envs: &[(&str, String)]) -> Context {
    Context::new()
        .with_file_read(TokioFileRead)
        .with_env(StaticEnv {
            home_dir: Some(env!("CARGO_MANIFEST_DIR").into()),
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<HashMap<_, _>>(),
        })
}

#[tokio::test]
async fn test_config_from_env_signs() -> Result<()> {
    init_logger();

    let ctx = context(&[
        ("HTTPSIG_KEY_ID", "rsa-key".to_string()),
        ("HTTPSIG_ALGORITHM", "RSA".to_string()),
        ("HTTPSIG_PRIVATE_KEY_PATH", "~/testdata/rsa_private_key_pkcs1.pem".to_string()),
        ("HTTPSIG_HEADERS", "host".to_string()),
    ]);
    let config = Config::from_env(&ctx)?;
    let algorithm = config.load_signature_algorithm(&ctx).await?;
    let signer = Signer::new(config.into_builder(algorithm)?.with_time(fixed_time()).build()?);

    let mut msg = TestMessage::new(Method::GET, "https://example.com/hello?x=1");
    signer.sign(&mut msg).await?;

    // Same key as the PKCS#8 one, so the same signature.
    assert_eq!(
        msg.properties[SIGNING_STRING_PROPERTY],
        format!("(request-target): get /hello?x=1\ndate: {DATE_VALUE}\nhost: example.com")
    );
    let header = msg.header("Signature").expect("signature must be set");
    assert!(header.starts_with("keyId=\"rsa-key\",algorithm=\"rsa-sha512\","));
    assert!(header.ends_with("RSQZ4L5tqTwmba+Bi7jbEEGAiaOvuvU4rherS435uDO9WJYDQVMYRUBqLGlymHA==\""));
    Ok(())
}

#[tokio::test]
async fn test_config_from_toml_merged_with_env() -> Result<()> {
    let ctx = context(&[
        ("HTTPSIG_KEY_ID", "from-env".to_string()),
        ("HTTPSIG_EXPIRES", "600".to_string()),
    ]);
    let file = Config::from_toml(&format!(
        r#"
key_id = "from-file"
algorithm = "ecdsa"
hash_algorithm = "SHA-384"
private_key_path = "{}"
digest_algorithm = "sha256"
add_recommended_headers = true

[header_values]
X-Tenant = "acme"
"#,
        testdata("ecdsa_p384_private_key.pem")
    ))?;

    let config = Config::from_env(&ctx)?.merge(file);
    let signing = config.clone().build(&ctx).await?;
    assert_eq!(signing.key_id(), "from-env");
    assert_eq!(signing.algorithm().name(), "ECDsa");
    assert_eq!(
        signing.expires(),
        Some(std::time::Duration::from_secs(600))
    );

    let algorithm = config.load_signature_algorithm(&ctx).await?;
    let signer = Signer::new(config.into_builder(algorithm)?.with_time(fixed_time()).build()?);
    let mut msg = TestMessage::new(Method::POST, "https://example.com/hello").with_body("hello");
    signer.sign(&mut msg).await?;

    assert_eq!(msg.header("X-Tenant").as_deref(), Some("acme"));
    assert_eq!(
        msg.properties[SIGNING_STRING_PROPERTY],
        format!(
            "(expires): {EXPIRES}\n(request-target): post /hello\ndate: {DATE_VALUE}\n\
             digest: {HELLO_DIGEST}\nx-tenant: acme"
        )
    );
    let header = msg.header("Signature").expect("signature must be set");
    assert!(header.starts_with(&format!(
        "keyId=\"from-env\",algorithm=\"ecdsa-sha384\",expires={EXPIRES},\
         headers=\"(expires) (request-target) date digest x-tenant\",signature=\""
    )));
    Ok(())
}

#[tokio::test]
async fn test_config_invalid_headers() -> Result<()> {
    let ctx = context(&[
        ("HTTPSIG_KEY_ID", "hmac-key".to_string()),
        ("HTTPSIG_ALGORITHM", "hmac".to_string()),
        ("HTTPSIG_SECRET_KEY", "c2VjcmV0".to_string()),
        ("HTTPSIG_HEADERS", "Digest".to_string()),
    ]);

    let err = Config::from_env(&ctx)?.build(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    Ok(())
}

#[tokio::test]
async fn test_config_missing_key_file() -> Result<()> {
    let ctx = context(&[
        ("HTTPSIG_KEY_ID", "rsa-key".to_string()),
        ("HTTPSIG_ALGORITHM", "rsa".to_string()),
        ("HTTPSIG_PRIVATE_KEY_PATH", "~/testdata/missing.pem".to_string()),
    ]);

    let err = Config::from_env(&ctx)?.build(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unexpected);
    Ok(())
}

#[tokio::test]
async fn test_config_from_certificate() -> Result<()> {
    let ctx = context(&[
        ("HTTPSIG_PRIVATE_KEY_PATH", "~/testdata/ecdsa_p256_private_key.pem".to_string()),
        ("HTTPSIG_CERTIFICATE_PATH", "~/testdata/ecdsa_p256_certificate.pem".to_string()),
        ("HTTPSIG_HASH_ALGORITHM", "SHA-256".to_string()),
    ]);
    let signer = Signer::new(Config::from_env(&ctx)?.build(&ctx).await?);

    let mut msg = TestMessage::new(Method::GET, "https://example.com/hello");
    signer.sign(&mut msg).await?;

    let header = msg.header("Signature").expect("signature must be set");
    assert!(header.starts_with("keyId=\"13ef636a1f56\",algorithm=\"ecdsa-sha256\","));
    Ok(())
}
