// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const KEY_PAGE: &str = "page";
pub const KEY_LIMIT: &str = "limit";
pub const KEY_ID: &str = "id";
pub const KEY_SKIP: &str = "skip";
pub const KEY_VERTICAL: &str = "vertical";
pub const KEY_STAGE: &str = "stage";
pub const KEY_TECH_STACK: &str = "techStack";
pub const KEY_SEARCH: &str = "search";

/// Client-owned list query, in the order keys first appeared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlQuery(Vec<(String, String)>);

impl UrlQuery {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut query = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            query.set(&key, Some(value.into_owned()));
        }
        query
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// `None` or an empty value removes the key; other keys keep their place.
    pub fn set(&mut self, key: &str, value: Option<String>) {
        match value.filter(|value| !value.is_empty()) {
            Some(value) => {
                if let Some(slot) = self.0.iter_mut().find(|(name, _)| name == key) {
                    slot.1 = value;
                } else {
                    self.0.push((key.to_owned(), value));
                }
            }
            None => self.0.retain(|(name, _)| name != key),
        }
    }

    /// Applies only the keys named by the patch.
    pub fn merge(&mut self, patch: &QueryPatch) {
        for (key, value) in &patch.0 {
            self.set(key, value.clone());
        }
    }

    pub fn merged(&self, patch: &QueryPatch) -> Self {
        let mut next = self.clone();
        next.merge(patch);
        next
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

/// A set of key updates; `None` clears a key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryPatch(Vec<(&'static str, Option<String>)>);

impl QueryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &'static str, value: impl ToString) -> Self {
        self.0.push((key, Some(value.to_string())));
        self
    }

    pub fn set_opt(mut self, key: &'static str, value: Option<String>) -> Self {
        self.0.push((key, value));
        self
    }

    pub fn clear(mut self, key: &'static str) -> Self {
        self.0.push((key, None));
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(key, _)| *key)
    }
}
