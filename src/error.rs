// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

/// Errors raised by the store, the recurrence engine and the ledger API.
///
/// The CLI layer wraps these in `anyhow` with extra context; library callers
/// can match on the variants directly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The SQLite file could not be opened or initialised.
    #[error("could not open the store at {}: {source}", path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A recurring template cannot produce a valid occurrence date.
    ///
    /// The materializer logs these and moves on to the next template.
    #[error("recurring template {id} cannot be materialized: {reason}")]
    InvalidTemplate { id: i64, reason: String },

    /// A field was rejected before it reached the store.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A stored row could not be decoded.
    #[error("corrupt row in store: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sql(#[from] rusqlite::Error),
}

impl Error {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
