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

use crate::configuration::UriFormat;
use crate::constants::*;
use crate::resolve::ResolvedConfiguration;
use http::Uri;
use httpsig_core::time::{unix_seconds, DateTime};
use httpsig_core::{Error, HttpMessage, Result};
use percent_encoding::{
    percent_decode_str, percent_encode_byte, utf8_percent_encode, AsciiSet, CONTROLS,
};

/// Characters that are escaped in an escaped request target, `%` is kept so
/// existing escapes survive.
static REQUEST_TARGET_ENCODE_SET: AsciiSet = CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^');

/// Compose the string to sign for `message` at `now`.
///
/// Every resolved header contributes one line `<name>: <value>` in signing
/// order. Fails with a missing header error if a non pseudo header isn't on
/// the message, no partial string is returned.
pub fn compose_signing_string(
    resolved: &ResolvedConfiguration<'_>,
    message: &dyn HttpMessage,
    now: DateTime,
) -> Result<String> {
    let mut lines = Vec::with_capacity(resolved.headers().len());

    for name in resolved.headers().iter() {
        let value = match name {
            REQUEST_TARGET => format!(
                "{} {}",
                message.method().as_str().to_lowercase(),
                request_target(message.uri(), resolved.request_target_uri_format())
            ),
            CREATED => unix_seconds(now).to_string(),
            EXPIRES => {
                let expires_at = resolved.expires_at(now)?.ok_or_else(|| {
                    Error::config_invalid("(expires) header requested but no expiry is set")
                })?;
                unix_seconds(expires_at).to_string()
            }
            _ => {
                let values = message.header_values(name).ok_or_else(|| {
                    Error::header_missing(format!("header {name} is not present on the message"))
                })?;
                header_value(&values)
            }
        };
        lines.push(format!("{name}: {value}"));
    }

    Ok(lines.join("\n").trim_end().to_string())
}

/// Path and query of `uri`, `/` if it has no path.
fn request_target(uri: &Uri, format: UriFormat) -> String {
    let path = match uri.path() {
        "" => "/",
        p => p,
    };
    let target = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    match format {
        UriFormat::Escaped => utf8_percent_encode(&target, &REQUEST_TARGET_ENCODE_SET).to_string(),
        UriFormat::Unescaped => unescape(&target),
    }
}

/// Percent-decode `target`, keeping control characters and bytes that are
/// not valid UTF-8 escaped so the target stays on one line.
fn unescape(target: &str) -> String {
    let bytes: Vec<u8> = percent_decode_str(target).collect();
    let mut decoded = String::with_capacity(bytes.len());

    for chunk in bytes.utf8_chunks() {
        for c in chunk.valid().chars() {
            if c.is_control() {
                let mut buf = [0; 4];
                for b in c.encode_utf8(&mut buf).bytes() {
                    decoded.push_str(percent_encode_byte(b));
                }
            } else {
                decoded.push(c);
            }
        }
        for &b in chunk.invalid() {
            decoded.push_str(percent_encode_byte(b));
        }
    }

    decoded
}

/// Join header values into a single line.
fn header_value(values: &[String]) -> String {
    values
        .iter()
        .map(|v| fold_lines(v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fold a value into one trimmed line: blank lines are dropped and the rest
/// trimmed and joined by a single space.
fn fold_lines(value: &str) -> String {
    value
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
