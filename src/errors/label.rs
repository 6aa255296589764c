// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors produced while labeling a single message.
//!
//! A labeler failure is terminal for the message being labeled. Nothing in this
//! crate retries it; the transport adapter decides whether to acknowledge, retry
//! or dead-letter.

use thiserror::Error;

use super::StoreError;

/// A message field is present but has the wrong shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MessageError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Field '{field}' is malformed: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Malformed polygon or point input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Geography '{geography_id}' has an invalid ring: {reason}")]
    InvalidRing { geography_id: String, reason: String },

    #[error("Geography '{geography_id}' has no polygons")]
    EmptyGeometry { geography_id: String },

    #[error("Invalid point ({lat}, {lng}): {reason}")]
    InvalidPoint { lat: f64, lng: f64, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LabelError {
    /// A required device lookup found nothing in any layer.
    #[error("Device '{device_id}' not found")]
    NotFound { device_id: String },

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Message(#[from] MessageError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
