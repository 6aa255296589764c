// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::StreamError;
use crate::model::Message;

/// Per-message callback a source invokes for every delivered message.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: Message) -> Result<(), StreamError>;
}

/// Wraps a transport consumer.
pub trait StreamSource: Send + Sync {
    /// Bind `handler` to the consumer. Nothing is delivered until the returned
    /// consumer is initialized.
    fn subscribe(&self, handler: Arc<dyn MessageHandler>) -> Arc<dyn StreamConsumer>;
}

#[async_trait]
pub trait StreamConsumer: Send + Sync {
    /// Begin delivering messages to the subscribed handler.
    async fn initialize(&self) -> Result<(), StreamError>;

    /// Stop delivering. A message already handed to the handler is allowed to finish.
    async fn shutdown(&self) -> Result<(), StreamError>;
}

/// Wraps a transport producer.
#[async_trait]
pub trait StreamSink: Send + Sync {
    async fn initialize(&self) -> Result<(), StreamError>;

    async fn write(&self, message: Message) -> Result<(), StreamError>;

    /// Flush pending writes and close.
    async fn shutdown(&self) -> Result<(), StreamError>;
}
