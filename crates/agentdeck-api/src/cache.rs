// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::HashMap;
use std::time::{Duration, Instant};

use agentdeck_app::query::QueryParams;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    body: String,
}

/// Short-lived memo of successful GET bodies keyed by request signature.
/// Expired entries are evicted when looked up.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl ResponseCache {
    /// A zero `ttl` disables caching.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// `METHOD path?sorted-query`.
    pub fn signature(method: &str, path: &str, params: &QueryParams) -> String {
        if params.is_empty() {
            format!("{method} {path}")
        } else {
            format!("{method} {path}?{}", params.sorted_query_string())
        }
    }

    pub fn get(&mut self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<String> {
        let entry = self.entries.get(key)?;
        if now.saturating_duration_since(entry.stored_at) >= self.ttl {
            self.entries.remove(key);
            return None;
        }
        Some(entry.body.clone())
    }

    pub fn insert(&mut self, key: String, body: String) {
        self.insert_at(key, body, Instant::now());
    }

    pub fn insert_at(&mut self, key: String, body: String, now: Instant) {
        if !self.is_enabled() {
            return;
        }
        self.entries.insert(
            key,
            CacheEntry {
                stored_at: now,
                body,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
