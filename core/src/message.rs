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

use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::HeaderName;
use http::HeaderValue;
use http::Method;
use http::Uri;
use std::collections::BTreeMap;

/// HttpMessage is the view of an outgoing request that a signer needs.
///
/// Transport integrations implement this for their own request types. The
/// signer reads the method, URI and headers, buffers the body once to compute
/// a digest, and writes the headers it computes back through `set_header`.
///
/// Header lookups must be case-insensitive.
#[async_trait]
pub trait HttpMessage: Send {
    /// HTTP method of this message.
    fn method(&self) -> &Method;

    /// Absolute URI of this message.
    fn uri(&self) -> &Uri;

    /// Whether this message carries a body.
    fn has_body(&self) -> bool;

    /// Read the whole body into memory.
    ///
    /// This is the only place where signing may suspend. Implementations
    /// backed by a stream should buffer it so the body can still be sent
    /// afterwards. Returns `None` if there is no body.
    async fn read_body(&mut self) -> Result<Option<Bytes>>;

    /// All values of the header `name`, or `None` if the header is absent.
    fn header_values(&self, name: &str) -> Option<Vec<String>>;

    /// Set header `name` to `value`, replacing any existing values.
    fn set_header(&mut self, name: &str, value: &str) -> Result<()>;

    /// Remove all values of the header `name`, if any.
    fn remove_header(&mut self, name: &str);

    /// Attach a diagnostic property to this message.
    ///
    /// Properties are never transmitted. The default implementation drops them.
    fn set_property(&mut self, name: &str, value: &str) {
        let _ = (name, value);
    }

    /// Whether the header `name` is present.
    fn has_header(&self, name: &str) -> bool {
        self.header_values(name).is_some()
    }
}

/// Diagnostic properties attached to an `http::Request` while signing.
///
/// Stored in the request's extensions, so they stay local to the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageProperties(BTreeMap<String, String>);

impl MessageProperties {
    /// Get the property `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Set the property `name`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

/// An `http::Request` with a fully buffered body.
///
/// An empty body counts as no body.
#[async_trait]
impl HttpMessage for http::Request<Bytes> {
    fn method(&self) -> &Method {
        http::Request::method(self)
    }

    fn uri(&self) -> &Uri {
        http::Request::uri(self)
    }

    fn has_body(&self) -> bool {
        !self.body().is_empty()
    }

    async fn read_body(&mut self) -> Result<Option<Bytes>> {
        if self.body().is_empty() {
            return Ok(None);
        }
        // Bytes is reference counted, cloning doesn't copy the content.
        Ok(Some(self.body().clone()))
    }

    fn header_values(&self, name: &str) -> Option<Vec<String>> {
        // Names that can't be header names can't be present either.
        let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
        let values = self
            .headers()
            .get_all(&name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>();

        if values.is_empty() {
            None
        } else {
            Some(values)
        }
    }

    fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        // from_bytes keeps non-ascii values like unicode host names.
        let value = HeaderValue::from_bytes(value.as_bytes())?;
        self.headers_mut().insert(name, value);
        Ok(())
    }

    fn remove_header(&mut self, name: &str) {
        if let Ok(name) = HeaderName::from_bytes(name.as_bytes()) {
            self.headers_mut().remove(name);
        }
    }

    fn set_property(&mut self, name: &str, value: &str) {
        match self.extensions_mut().get_mut::<MessageProperties>() {
            Some(props) => props.insert(name, value),
            None => {
                let mut props = MessageProperties::default();
                props.insert(name, value);
                self.extensions_mut().insert(props);
            }
        }
    }
}
