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
use httpsig_cavage::{SigningConfiguration, SigningConfigurationBuilder, Signer, UriFormat};
use httpsig_cavage::SIGNING_STRING_PROPERTY;
use httpsig_core::hash::{base64_encode, HashAlgorithm};
use httpsig_core::{ErrorKind, HttpMessage};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn builder() -> SigningConfigurationBuilder {
    SigningConfiguration::builder(KEY_ID, TestSignatureAlgorithm::new()).with_time(fixed_time())
}

fn post_hello() -> TestMessage {
    TestMessage::new(Method::POST, "https://example.com/hello")
}

fn expected_signature(signing_string: &str) -> String {
    base64_encode(format!("signed({signing_string})").as_bytes())
}

#[tokio::test]
async fn test_sign_without_body() -> Result<()> {
    init_logger();

    let signer = Signer::new(builder().header("Date").build()?);
    let mut msg = post_hello();
    signer.sign(&mut msg).await?;

    let signing_string =
        format!("(created): {CREATED}\n(request-target): post /hello\ndate: {DATE_VALUE}");
    assert_eq!(
        msg.properties.get(SIGNING_STRING_PROPERTY),
        Some(&signing_string)
    );
    assert_eq!(msg.header("Date").as_deref(), Some(DATE_VALUE));
    assert_eq!(msg.header("Digest"), None);
    assert_eq!(msg.body_reads, 0);
    assert_eq!(
        msg.header("Signature"),
        Some(format!(
            "keyId=\"{KEY_ID}\",algorithm=\"test-sha512\",created={CREATED},\
             headers=\"(created) (request-target) date\",signature=\"{}\"",
            expected_signature(&signing_string)
        ))
    );
    Ok(())
}

#[tokio::test]
async fn test_sign_with_body_digest() -> Result<()> {
    init_logger();

    let signer = Signer::new(builder().digest_algorithm(HashAlgorithm::Sha256).build()?);
    let mut msg = post_hello().with_body("hello");
    signer.sign(&mut msg).await?;

    assert_eq!(msg.header("Digest").as_deref(), Some(HELLO_DIGEST));
    assert_eq!(msg.body_reads, 1);
    assert_eq!(
        msg.properties.get(SIGNING_STRING_PROPERTY).map(String::as_str),
        Some(
            format!(
                "(created): {CREATED}\n(request-target): post /hello\ndigest: {HELLO_DIGEST}"
            )
            .as_str()
        )
    );
    let signature = msg.header("Signature").expect("signature must be set");
    assert!(signature.contains("headers=\"(created) (request-target) digest\""));
    Ok(())
}

#[tokio::test]
async fn test_sign_with_expiry() -> Result<()> {
    init_logger();

    let signer = Signer::new(builder().expires(Duration::from_secs(600)).build()?);
    let mut msg = post_hello();
    signer.sign(&mut msg).await?;

    let signing_string = msg.properties[SIGNING_STRING_PROPERTY].clone();
    assert!(signing_string
        .lines()
        .any(|line| line == format!("(expires): {EXPIRES}")));

    let signature = msg.header("Signature").expect("signature must be set");
    assert_eq!(
        signature,
        format!(
            "keyId=\"{KEY_ID}\",algorithm=\"test-sha512\",created={CREATED},expires={EXPIRES},\
             headers=\"(created) (expires) (request-target)\",signature=\"{}\"",
            expected_signature(&signing_string)
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_sign_is_deterministic() -> Result<()> {
    let signer = Signer::new(
        builder()
            .headers_to_include(["Host", "X-Request-Id"])
            .digest_algorithm(HashAlgorithm::Sha512)
            .build()?,
    );

    let mut signatures = Vec::new();
    for _ in 0..3 {
        let mut msg = post_hello()
            .with_body("hello")
            .with_header("X-Request-Id", "42");
        signer.sign(&mut msg).await?;
        signatures.push(msg.header("Signature"));
    }

    assert!(signatures[0].is_some());
    assert_eq!(signatures[0], signatures[1]);
    assert_eq!(signatures[1], signatures[2]);
    Ok(())
}

#[tokio::test]
async fn test_header_order_invariance() -> Result<()> {
    let a = Signer::new(builder().headers_to_include(["X-B", "host", "X-A"]).build()?);
    let b = Signer::new(builder().headers_to_include(["x-a", "X-B", "Host"]).build()?);

    let msg = || {
        post_hello()
            .with_header("x-b", "b")
            .with_header("X-A", "a")
    };
    let (mut ma, mut mb) = (msg(), msg());
    a.sign(&mut ma).await?;
    b.sign(&mut mb).await?;

    assert_eq!(ma.header("Signature"), mb.header("Signature"));
    assert_eq!(
        ma.properties[SIGNING_STRING_PROPERTY],
        format!("(created): {CREATED}\n(request-target): post /hello\nhost: example.com\nx-a: a\nx-b: b")
    );
    Ok(())
}

#[tokio::test]
async fn test_recommended_headers_follow_algorithm() -> Result<()> {
    for (name, date, created) in [
        ("rsa", true, false),
        ("Hmac", true, false),
        ("ECDSA", true, false),
        ("TEST", false, true),
        ("hs2019", false, true),
    ] {
        let config = SigningConfiguration::builder(KEY_ID, TestSignatureAlgorithm::named(name))
            .with_time(fixed_time())
            .build()?;
        let mut msg = post_hello();
        Signer::new(config).sign(&mut msg).await?;

        let signing_string = &msg.properties[SIGNING_STRING_PROPERTY];
        assert!(signing_string.contains("(request-target): post /hello"), "{name}");
        assert_eq!(signing_string.contains("date: "), date, "{name}");
        assert_eq!(signing_string.contains("(created): "), created, "{name}");
        assert_eq!(msg.has_header("Date"), date, "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn test_missing_header_leaves_no_signature() -> Result<()> {
    let signer = Signer::new(builder().header("X-Missing").build()?);
    let mut msg = post_hello();

    let err = signer.sign(&mut msg).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HeaderMissing);
    assert_eq!(msg.header("Signature"), None);
    assert!(!msg.properties.contains_key(SIGNING_STRING_PROPERTY));
    Ok(())
}

#[tokio::test]
async fn test_failed_resign_drops_previous_signature() -> Result<()> {
    let mut msg = post_hello();
    Signer::new(builder().build()?).sign(&mut msg).await?;
    assert!(msg.has_header("Signature"));

    let signer = Signer::new(builder().header("X-Missing").build()?);
    let err = signer.sign(&mut msg).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HeaderMissing);
    assert_eq!(msg.header("Signature"), None);
    Ok(())
}

#[tokio::test]
async fn test_request_target_line_breaks_stay_escaped() -> Result<()> {
    let signer = Signer::new(builder().header("Date").build()?);
    let mut msg = TestMessage::new(Method::GET, "https://example.com/a%0Adate:%20forged");
    signer.sign(&mut msg).await?;

    assert_eq!(
        msg.properties[SIGNING_STRING_PROPERTY],
        format!(
            "(created): {CREATED}\n(request-target): get /a%0Adate: forged\ndate: {DATE_VALUE}"
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_caller_headers_are_kept() -> Result<()> {
    let signer = Signer::new(
        builder()
            .headers_to_include(["Date", "Host"])
            .digest_algorithm(HashAlgorithm::Sha256)
            .header_value("X-Tenant", "configured")
            .build()?,
    );
    let mut msg = post_hello()
        .with_body("hello")
        .with_header("date", "Wed, 26 May 2021 00:00:00 GMT")
        .with_header("HOST", "api.example.com")
        .with_header("digest", "SHA-256=precomputed")
        .with_header("x-tenant", "caller");
    signer.sign(&mut msg).await?;

    assert_eq!(msg.body_reads, 0);
    assert_eq!(
        msg.properties[SIGNING_STRING_PROPERTY],
        format!(
            "(created): {CREATED}\n(request-target): post /hello\n\
             date: Wed, 26 May 2021 00:00:00 GMT\ndigest: SHA-256=precomputed\n\
             host: api.example.com\nx-tenant: caller"
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_header_value_providers() -> Result<()> {
    let signer = Signer::new(
        builder()
            .add_recommended_headers(false)
            .header_value("X-Tenant", "acme")
            .header_value_with("X-Target", |msg| {
                format!("{} {}", msg.method(), msg.uri().path())
            })
            .build()?,
    );
    let mut msg = post_hello();
    signer.sign(&mut msg).await?;

    assert_eq!(msg.header("X-Tenant").as_deref(), Some("acme"));
    assert_eq!(msg.header("X-Target").as_deref(), Some("POST /hello"));
    assert_eq!(
        msg.properties[SIGNING_STRING_PROPERTY],
        "x-target: POST /hello\nx-tenant: acme"
    );
    Ok(())
}

#[tokio::test]
async fn test_unicode_host_and_request_target() -> Result<()> {
    let signer = Signer::new(builder().header("Host").build()?);
    let mut msg = TestMessage::new(
        Method::GET,
        "https://xn--bcher-kva.example:8443/b%C3%BCcher/caf%C3%A9?q=a%20b",
    );
    signer.sign(&mut msg).await?;

    assert_eq!(msg.header("Host").as_deref(), Some("bücher.example"));
    assert_eq!(
        msg.properties[SIGNING_STRING_PROPERTY],
        format!(
            "(created): {CREATED}\n(request-target): get /bücher/café?q=a b\nhost: bücher.example"
        )
    );

    let signer = Signer::new(
        builder()
            .request_target_uri_format(UriFormat::Escaped)
            .build()?,
    );
    let mut msg = TestMessage::new(Method::GET, "https://example.com/b%C3%BCcher?q=a%20b");
    signer.sign(&mut msg).await?;
    assert_eq!(
        msg.properties[SIGNING_STRING_PROPERTY],
        format!("(created): {CREATED}\n(request-target): get /b%C3%BCcher?q=a%20b")
    );
    Ok(())
}

#[tokio::test]
async fn test_multi_line_and_multi_value_headers() -> Result<()> {
    let signer = Signer::new(
        builder()
            .add_recommended_headers(false)
            .headers_to_include(["X-Folded", "X-Multi"])
            .build()?,
    );
    let mut msg = post_hello()
        .with_header("X-Folded", "first line\r\n   second line\n\n  \n third ")
        .with_header("X-Multi", "a")
        .with_header("x-multi", "b");
    signer.sign(&mut msg).await?;

    assert_eq!(
        msg.properties[SIGNING_STRING_PROPERTY],
        "x-folded: first line second line third\nx-multi: a, b"
    );
    Ok(())
}

#[tokio::test]
async fn test_sign_http_request() -> Result<()> {
    init_logger();

    let signer = Signer::new(
        SigningConfiguration::builder(
            "hmac-key",
            httpsig_cavage::HmacSignatureAlgorithm::new("secret", HashAlgorithm::Sha256),
        )
        .digest_algorithm(HashAlgorithm::Sha256)
        .with_time(fixed_time())
        .build()?,
    );
    let mut req = http::Request::post("https://example.com/hello")
        .body(bytes::Bytes::from_static(b"hello"))?;
    signer.sign(&mut req).await?;

    assert_eq!(req.headers()["date"], DATE_VALUE);
    assert_eq!(req.headers()["digest"], HELLO_DIGEST);
    assert_eq!(
        req.headers()["signature"],
        "keyId=\"hmac-key\",algorithm=\"hmac-sha256\",\
         headers=\"(request-target) date digest\",\
         signature=\"Kay0sX7N66fz6a9zAD/6MGyweJ4Exixb6LM51hPOu9Y=\""
    );

    let properties = req
        .extensions()
        .get::<httpsig_core::MessageProperties>()
        .expect("properties must be set");
    assert_eq!(
        properties.get(SIGNING_STRING_PROPERTY),
        Some(
            "(request-target): post /hello\n\
             date: Thu, 27 May 2021 10:23:00 GMT\n\
             digest: SHA-256=LPJNul+wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ="
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_concurrent_signing_shares_configuration() -> Result<()> {
    let signer = Signer::new(builder().header("X-Id").build()?);

    let mut handles = Vec::new();
    for id in 0..8 {
        let signer = signer.clone();
        handles.push(tokio::spawn(async move {
            let mut msg = post_hello().with_header("X-Id", &id.to_string());
            signer.sign(&mut msg).await.map(|_| msg)
        }));
    }

    for (id, handle) in handles.into_iter().enumerate() {
        let msg = handle.await??;
        assert!(msg.properties[SIGNING_STRING_PROPERTY].ends_with(&format!("x-id: {id}")));
    }
    Ok(())
}
