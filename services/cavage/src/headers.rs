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

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// A set of header names to sign.
///
/// Names are compared case-insensitively and iterate lowercased in sorted
/// order, which is the order of lines in the signing string. Insertion order
/// never matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedHeaders(BTreeSet<String>);

impl SignedHeaders {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name`, returns false if it was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        self.0.insert(name.to_lowercase())
    }

    /// Remove `name`, returns false if it wasn't present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.0.remove(&name.to_lowercase())
    }

    /// Whether `name` is in this set.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(&name.to_lowercase())
    }

    /// Lowercased names in signing order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SignedHeaders {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut headers = SignedHeaders::new();
        headers.extend(iter);
        headers
    }
}

impl<S: AsRef<str>> Extend<S> for SignedHeaders {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name.as_ref());
        }
    }
}

/// Space separated, as used by the `headers` field.
impl Display for SignedHeaders {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, name) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}
