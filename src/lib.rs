// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod cache;        // bounded LRU memo cache
pub mod config;       // YAML config + defaults
pub mod engine;       // stream processor + provider aggregation
pub mod errors;       // error handling
pub mod geo;          // bbox + polygon containment
pub mod labelers;     // message enrichment
pub mod model;        // messages, devices, geographies, provider state
pub mod observability;
pub mod stores;       // in-memory collaborators
pub mod traits;       // async seams
