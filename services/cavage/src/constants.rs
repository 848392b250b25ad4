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

use httpsig_core::hash::HashAlgorithm;

// Pseudo headers, they contribute a line to the signing string but are never sent.
pub const REQUEST_TARGET: &str = "(request-target)";
pub const CREATED: &str = "(created)";
pub const EXPIRES: &str = "(expires)";

// Headers
pub const SIGNATURE: &str = "Signature";
pub const DIGEST: &str = "Digest";
pub const DATE: &str = "Date";
pub const HOST: &str = "Host";
/// The plain `Expires` header, which also requires an expiry duration.
pub const EXPIRES_HEADER: &str = "Expires";

/// Property name under which the signing string is attached to the message.
pub const SIGNING_STRING_PROPERTY: &str = "SigningString";

/// Hash used by signature algorithms when none is given.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha512;

// Env values used in httpsig
pub const HTTPSIG_KEY_ID: &str = "HTTPSIG_KEY_ID";
pub const HTTPSIG_ALGORITHM: &str = "HTTPSIG_ALGORITHM";
pub const HTTPSIG_HASH_ALGORITHM: &str = "HTTPSIG_HASH_ALGORITHM";
pub const HTTPSIG_PRIVATE_KEY_PATH: &str = "HTTPSIG_PRIVATE_KEY_PATH";
pub const HTTPSIG_CERTIFICATE_PATH: &str = "HTTPSIG_CERTIFICATE_PATH";
pub const HTTPSIG_SECRET_KEY: &str = "HTTPSIG_SECRET_KEY";
pub const HTTPSIG_DIGEST_ALGORITHM: &str = "HTTPSIG_DIGEST_ALGORITHM";
pub const HTTPSIG_HEADERS: &str = "HTTPSIG_HEADERS";
pub const HTTPSIG_EXPIRES: &str = "HTTPSIG_EXPIRES";
pub const HTTPSIG_ADD_RECOMMENDED_HEADERS: &str = "HTTPSIG_ADD_RECOMMENDED_HEADERS";
pub const HTTPSIG_REQUEST_TARGET_URI_FORMAT: &str = "HTTPSIG_REQUEST_TARGET_URI_FORMAT";
