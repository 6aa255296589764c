// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors surfaced by external collaborators (device registry, geography store,
//! provider state store, metrics sink).

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backing service could not be reached.
    #[error("Store '{store}' is unavailable: {reason}")]
    Unavailable { store: String, reason: String },

    /// The call did not complete in time.
    #[error("Store '{store}' timed out after {elapsed:?}")]
    Timeout { store: String, elapsed: Duration },

    /// The backing service rejected or failed the operation.
    #[error("Store '{store}' failed: {reason}")]
    Backend { store: String, reason: String },
}

impl StoreError {
    pub fn backend(store: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Backend {
            store: store.into(),
            reason: reason.into(),
        }
    }

    pub fn unavailable(store: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Unavailable {
            store: store.into(),
            reason: reason.into(),
        }
    }
}
