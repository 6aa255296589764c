// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::StreamError;
use crate::model::Message;
use crate::traits::{Labeler, Transform};

type MessageFilter = dyn Fn(&Message) -> bool + Send + Sync;

/// Transform that applies labelers one after another in a fixed order.
///
/// Each labeler sees the message enriched by every labeler before it, and its
/// labels are merged into a new message. The first failing labeler aborts the
/// chain and its error is returned; nothing partial is emitted.
///
/// An optional filter runs before any labeler; messages it rejects are dropped
/// (`Ok(None)`).
#[derive(Default)]
pub struct LabelChain {
    labelers: Vec<Arc<dyn Labeler>>,
    filter: Option<Box<MessageFilter>>,
}

impl LabelChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, labeler: Arc<dyn Labeler>) -> Self {
        self.labelers.push(labeler);
        self
    }

    pub fn with_filter(mut self, filter: impl Fn(&Message) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn labeler_names(&self) -> Vec<&'static str> {
        self.labelers.iter().map(|labeler| labeler.name()).collect()
    }
}

impl std::fmt::Debug for LabelChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelChain")
            .field("labelers", &self.labeler_names())
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

#[async_trait]
impl Transform for LabelChain {
    async fn transform(&self, message: Message) -> Result<Option<Message>, StreamError> {
        if let Some(filter) = &self.filter {
            if !filter(&message) {
                return Ok(None);
            }
        }

        let mut enriched = message;
        for labeler in &self.labelers {
            let labels = labeler
                .label(&enriched)
                .await
                .map_err(|source| StreamError::Label {
                    labeler: labeler.name(),
                    source,
                })?;
            enriched = enriched.with_labels(labels);
        }
        Ok(Some(enriched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LabelError;
    use crate::model::Labels;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Writes a fixed field and records how many times it ran.
    struct FieldLabeler {
        field: &'static str,
        value: serde_json::Value,
        calls: AtomicUsize,
    }

    impl FieldLabeler {
        fn new(field: &'static str, value: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                field,
                value,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Labeler for FieldLabeler {
        async fn label(&self, _message: &Message) -> Result<Labels, LabelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut labels = Labels::new();
            labels.insert(self.field.to_string(), self.value.clone());
            Ok(labels)
        }

        fn name(&self) -> &'static str {
            self.field
        }
    }

    /// Copies `first` into `copied`, so the test can see earlier labels.
    struct CopyLabeler;

    #[async_trait]
    impl Labeler for CopyLabeler {
        async fn label(&self, message: &Message) -> Result<Labels, LabelError> {
            let mut labels = Labels::new();
            labels.insert(
                "copied".to_string(),
                message.get("first").cloned().unwrap_or_default(),
            );
            Ok(labels)
        }

        fn name(&self) -> &'static str {
            "copy"
        }
    }

    struct FailingLabeler;

    #[async_trait]
    impl Labeler for FailingLabeler {
        async fn label(&self, message: &Message) -> Result<Labels, LabelError> {
            Err(LabelError::NotFound {
                device_id: message
                    .device_id()?
                    .map(|id| id.0)
                    .unwrap_or_default(),
            })
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn message() -> Message {
        Message::from_value(json!({ "device_id": "d1" })).unwrap()
    }

    #[tokio::test]
    async fn test_labels_merge_in_order() {
        let chain = LabelChain::new()
            .with(FieldLabeler::new("first", json!(1)))
            .with(Arc::new(CopyLabeler))
            .with(FieldLabeler::new("first", json!(2)));

        let out = chain.transform(message()).await.unwrap().unwrap();

        assert_eq!(out.get("device_id"), Some(&json!("d1")));
        assert_eq!(out.get("copied"), Some(&json!(1)));
        assert_eq!(out.get("first"), Some(&json!(2)));
        assert_eq!(chain.labeler_names(), vec!["first", "copy", "first"]);
    }

    #[tokio::test]
    async fn test_failure_short_circuits() {
        let after = FieldLabeler::new("after", json!(true));
        let chain = LabelChain::new()
            .with(FieldLabeler::new("before", json!(true)))
            .with(Arc::new(FailingLabeler))
            .with(after.clone());

        let err = chain.transform(message()).await.unwrap_err();

        assert_eq!(
            err,
            StreamError::Label {
                labeler: "failing",
                source: LabelError::NotFound {
                    device_id: "d1".to_string()
                },
            }
        );
        assert_eq!(after.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_filter_drops_before_labeling() {
        let labeler = FieldLabeler::new("seen", json!(true));
        let chain = LabelChain::new()
            .with_filter(|message| message.get("device_id").is_some())
            .with(labeler.clone());

        let dropped = chain
            .transform(Message::from_value(json!({ "other": 1 })).unwrap())
            .await
            .unwrap();
        assert!(dropped.is_none());
        assert_eq!(labeler.calls.load(Ordering::SeqCst), 0);

        assert!(chain.transform(message()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_empty_chain_passes_message_through() {
        let out = LabelChain::new().transform(message()).await.unwrap();
        assert_eq!(out, Some(message()));
    }
}
