// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process transport: an `mpsc` channel as the source, and sinks that
//! collect messages in memory or write them as JSON lines.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::errors::StreamError;
use crate::model::Message;
use crate::observability::messages::stream::MessageFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::{MessageHandler, StreamConsumer, StreamSink, StreamSource};

#[derive(Default)]
struct DeliveryCounters {
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Source backed by a bounded `mpsc` channel.
///
/// One task drains the channel and awaits the handler for each message before
/// receiving the next, so delivery order is channel order. A handler error is
/// logged and counted; the task moves on to the next message.
pub struct ChannelSource {
    name: String,
    receiver: Arc<Mutex<Option<mpsc::Receiver<Message>>>>,
    counters: Arc<DeliveryCounters>,
    finished: CancellationToken,
}

impl ChannelSource {
    /// Create the source and the sender that feeds it.
    pub fn new(name: impl Into<String>, capacity: usize) -> (mpsc::Sender<Message>, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let source = Self {
            name: name.into(),
            receiver: Arc::new(Mutex::new(Some(receiver))),
            counters: Arc::new(DeliveryCounters::default()),
            finished: CancellationToken::new(),
        };
        (sender, source)
    }

    /// Resolves once the consumer task has exited, either because every sender
    /// was dropped and the channel is empty, or because it was shut down.
    pub async fn finished(&self) {
        self.finished.cancelled().await
    }

    pub fn delivered(&self) -> u64 {
        self.counters.delivered.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> u64 {
        self.counters.failed.load(Ordering::SeqCst)
    }
}

impl StreamSource for ChannelSource {
    fn subscribe(&self, handler: Arc<dyn MessageHandler>) -> Arc<dyn StreamConsumer> {
        Arc::new(ChannelConsumer {
            name: self.name.clone(),
            receiver: self.receiver.clone(),
            handler,
            counters: self.counters.clone(),
            finished: self.finished.clone(),
            shutdown: CancellationToken::new(),
            task: Mutex::new(None),
        })
    }
}

struct ChannelConsumer {
    name: String,
    receiver: Arc<Mutex<Option<mpsc::Receiver<Message>>>>,
    handler: Arc<dyn MessageHandler>,
    counters: Arc<DeliveryCounters>,
    finished: CancellationToken,
    shutdown: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

#[async_trait]
impl StreamConsumer for ChannelConsumer {
    async fn initialize(&self) -> Result<(), StreamError> {
        if self.shutdown.is_cancelled() {
            return Err(StreamError::AlreadyStopped(self.name.clone()));
        }
        let mut receiver = self
            .receiver
            .lock()
            .await
            .take()
            .ok_or_else(|| StreamError::transport(&self.name, "receiver already consumed"))?;

        let name = self.name.clone();
        let handler = self.handler.clone();
        let counters = self.counters.clone();
        let finished = self.finished.clone();
        let shutdown = self.shutdown.clone();

        let task = tokio::spawn(async move {
            loop {
                let message = tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    message = receiver.recv() => match message {
                        Some(message) => message,
                        None => break,
                    },
                };

                // Not raced against shutdown: the handler call, including its write, completes.
                counters.delivered.fetch_add(1, Ordering::SeqCst);
                if let Err(error) = handler.handle(message).await {
                    counters.failed.fetch_add(1, Ordering::SeqCst);
                    MessageFailed {
                        source: &name,
                        error: &error,
                    }
                    .log();
                }
            }
            finished.cancel();
        });

        *self.task.lock().await = Some(task);
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), StreamError> {
        self.shutdown.cancel();
        let task = self.task.lock().await.take();
        match task {
            Some(task) => task
                .await
                .map_err(|error| StreamError::transport(&self.name, error.to_string())),
            None => {
                self.finished.cancel();
                Ok(())
            }
        }
    }
}

/// Sink that keeps every written message in memory.
#[derive(Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<Message>>,
    closed: AtomicBool,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.messages.lock().await.clone()
    }
}

#[async_trait]
impl StreamSink for CollectingSink {
    async fn initialize(&self) -> Result<(), StreamError> {
        self.closed.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn write(&self, message: Message) -> Result<(), StreamError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StreamError::AlreadyStopped("collecting".to_string()));
        }
        self.messages.lock().await.push(message);
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), StreamError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Sink writing one compact JSON object per line to any async writer.
pub struct JsonLinesSink<W> {
    name: String,
    writer: Mutex<W>,
    closed: AtomicBool,
}

impl<W> JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer: Mutex::new(writer),
            closed: AtomicBool::new(false),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> StreamSink for JsonLinesSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn initialize(&self) -> Result<(), StreamError> {
        self.closed.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn write(&self, message: Message) -> Result<(), StreamError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StreamError::AlreadyStopped(self.name.clone()));
        }
        let mut line = serde_json::to_vec(&message)
            .map_err(|error| StreamError::transport(&self.name, error.to_string()))?;
        line.push(b'\n');

        self.writer
            .lock()
            .await
            .write_all(&line)
            .await
            .map_err(|error| StreamError::transport(&self.name, error.to_string()))
    }

    async fn shutdown(&self) -> Result<(), StreamError> {
        self.closed.store(true, Ordering::SeqCst);
        self.writer
            .lock()
            .await
            .flush()
            .await
            .map_err(|error| StreamError::transport(&self.name, error.to_string()))
    }
}
