// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::{LabelError, StoreError};

/// Errors crossing the stream processor boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StreamError {
    /// A labeler in the transform failed; the message never reaches the sink.
    #[error("Labeler '{labeler}' failed: {source}")]
    Label {
        labeler: &'static str,
        #[source]
        source: LabelError,
    },

    /// The consumer or producer failed.
    #[error("Transport '{transport}' failed: {reason}")]
    Transport { transport: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The transport was used after shutdown.
    #[error("Transport '{0}' is shut down")]
    AlreadyStopped(String),
}

impl StreamError {
    pub fn transport(transport: impl Into<String>, reason: impl Into<String>) -> Self {
        StreamError::Transport {
            transport: transport.into(),
            reason: reason.into(),
        }
    }
}
