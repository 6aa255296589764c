// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Source → transform → sink controller.
//!
//! A [`StreamProcessor`] binds a per-message handler to a source. The handler
//! runs the transform and writes any output to the sink. Errors from the
//! transform or the sink are returned to the source, which owns the
//! acknowledge/retry/dead-letter decision; the processor only counts them.
//!
//! # Lifecycle
//!
//! ```text
//! start():  sink.initialize()  ->  source.subscribe(handler).initialize()
//! stop():   join(consumer.shutdown(), drain in-flight -> sink.shutdown())
//! ```
//!
//! The sink is ready before the first message can arrive. `start` is meant to
//! be called once; a second call subscribes a second consumer.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::errors::StreamError;
use crate::model::Message;
use crate::observability::messages::stream::{
    MessageDropped, StreamProcessorStarted, StreamProcessorStopped,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{MessageHandler, StreamConsumer, StreamSink, StreamSource, Transform};

/// Snapshot of a processor's message counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub received: u64,
    pub written: u64,
    pub dropped: u64,
    pub failed: u64,
}

#[derive(Default)]
struct StreamCounters {
    received: AtomicU64,
    written: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
}

impl StreamCounters {
    fn snapshot(&self) -> StreamStats {
        StreamStats {
            received: self.received.load(Ordering::SeqCst),
            written: self.written.load(Ordering::SeqCst),
            dropped: self.dropped.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }
}

struct ProcessingHandler {
    name: String,
    transform: Arc<dyn Transform>,
    sink: Arc<dyn StreamSink>,
    counters: StreamCounters,
    // Held shared by every handle call; the sink is closed only under the
    // exclusive guard, after in-flight writes have finished.
    in_flight: RwLock<()>,
}

impl ProcessingHandler {
    async fn shutdown_sink(&self) -> Result<(), StreamError> {
        let _drained = self.in_flight.write().await;
        self.sink.shutdown().await
    }
}

#[async_trait]
impl MessageHandler for ProcessingHandler {
    async fn handle(&self, message: Message) -> Result<(), StreamError> {
        let _in_flight = self.in_flight.read().await;
        self.counters.received.fetch_add(1, Ordering::SeqCst);

        let result = match self.transform.transform(message).await {
            Ok(Some(output)) => self.sink.write(output).await.map(|()| true),
            Ok(None) => Ok(false),
            Err(error) => Err(error),
        };

        match result {
            Ok(true) => {
                self.counters.written.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Ok(false) => {
                self.counters.dropped.fetch_add(1, Ordering::SeqCst);
                MessageDropped { name: &self.name }.log();
                Ok(())
            }
            Err(error) => {
                self.counters.failed.fetch_add(1, Ordering::SeqCst);
                Err(error)
            }
        }
    }
}

pub struct StreamProcessor {
    source: Arc<dyn StreamSource>,
    handler: Arc<ProcessingHandler>,
    consumer: Mutex<Option<Arc<dyn StreamConsumer>>>,
}

impl StreamProcessor {
    pub fn new(
        name: impl Into<String>,
        source: Arc<dyn StreamSource>,
        transform: Arc<dyn Transform>,
        sink: Arc<dyn StreamSink>,
    ) -> Self {
        Self {
            source,
            handler: Arc::new(ProcessingHandler {
                name: name.into(),
                transform,
                sink,
                counters: StreamCounters::default(),
                in_flight: RwLock::new(()),
            }),
            consumer: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.handler.name
    }

    pub fn stats(&self) -> StreamStats {
        self.handler.counters.snapshot()
    }

    /// Initialize the sink, then subscribe and initialize the source.
    pub async fn start(&self) -> Result<(), StreamError> {
        self.handler.sink.initialize().await?;

        let consumer = self.source.subscribe(self.handler.clone());
        consumer.initialize().await?;
        *self.consumer.lock().await = Some(consumer);

        StreamProcessorStarted { name: self.name() }.log();
        Ok(())
    }

    /// Shut down consumer and sink concurrently and wait for both.
    ///
    /// The sink is closed only once every message already handed to the
    /// handler has been written or failed. Both shutdowns always run; if
    /// either fails, the consumer's error is returned first.
    pub async fn stop(&self) -> Result<(), StreamError> {
        let consumer = self
            .consumer
            .lock()
            .await
            .take()
            .ok_or_else(|| StreamError::AlreadyStopped(self.name().to_string()))?;

        let (consumer_result, sink_result) =
            tokio::join!(consumer.shutdown(), self.handler.shutdown_sink());

        StreamProcessorStopped {
            name: self.name(),
            stats: self.stats(),
        }
        .log();

        consumer_result?;
        sink_result
    }
}
