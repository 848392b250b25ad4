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

//! Core components for signing HTTP messages.
//!
//! This crate provides the foundational types shared by the httpsig signing
//! schemes. It does not sign anything by itself.
//!
//! ## Overview
//!
//! - [`HttpMessage`]: the capabilities a signer needs from an outgoing
//!   request. It is implemented for `http::Request<bytes::Bytes>`; other
//!   transports implement it for their own request types.
//! - [`Error`] / [`ErrorKind`]: the error taxonomy used across httpsig.
//! - [`Context`]: injectable file reading and environment access, used when
//!   loading signing configuration.
//!
//! ## Example
//!
//! ```
//! use bytes::Bytes;
//! use httpsig_core::HttpMessage;
//!
//! let mut req = http::Request::post("https://example.com/hello")
//!     .body(Bytes::from_static(b"hello"))
//!     .unwrap();
//!
//! req.set_header("X-Request-Id", "42").unwrap();
//! assert_eq!(req.header_values("x-request-id"), Some(vec!["42".to_string()]));
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Hash algorithms, digests, HMAC and base64 helpers
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, FileRead, NoopEnv, NoopFileRead, OsEnv, StaticEnv};
mod error;
pub use error::{Error, ErrorKind, Result};
mod message;
pub use message::{HttpMessage, MessageProperties};
