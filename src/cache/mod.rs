// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod memo_cache;

pub use memo_cache::{CacheLoader, CacheStats, MemoCache};
