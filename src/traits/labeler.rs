// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::{LabelError, StreamError};
use crate::model::{Labels, Message};

/// Derives one category of label fields from a message.
///
/// A labeler receives a read view of the message and returns only the fields it
/// adds. It never mutates the message and knows nothing about the transport.
#[async_trait]
pub trait Labeler: Send + Sync {
    async fn label(&self, message: &Message) -> Result<Labels, LabelError>;

    fn name(&self) -> &'static str;
}

/// Maps an input message to an optional output message.
///
/// `Ok(None)` drops the message without error.
#[async_trait]
pub trait Transform: Send + Sync {
    async fn transform(&self, message: Message) -> Result<Option<Message>, StreamError>;
}
