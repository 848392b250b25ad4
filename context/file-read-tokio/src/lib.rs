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

//! Tokio backed file reading for httpsig.
//!
//! `httpsig-core` ships without a file reader. Plug [`TokioFileRead`] into a
//! [`Context`](httpsig_core::Context) to let configuration loading read PEM
//! private keys from disk.
//!
//! ```no_run
//! use httpsig_core::{Context, OsEnv};
//! use httpsig_file_read_tokio::TokioFileRead;
//!
//! # async fn example() -> httpsig_core::Result<()> {
//! let ctx = Context::new()
//!     .with_file_read(TokioFileRead)
//!     .with_env(OsEnv);
//!
//! let pem = ctx.file_read_as_string("~/.httpsig/key.pem").await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use httpsig_core::{Error, FileRead, Result};

/// FileRead implemented with `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| Error::unexpected(format!("failed to read file {path}")).with_source(e))
    }
}
