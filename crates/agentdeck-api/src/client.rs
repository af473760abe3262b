// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use agentdeck_app::query::QueryParams;

use crate::cache::ResponseCache;
use crate::error::{ApiError, server_message};

/// Blocking HTTP transport for the catalog backend: bearer auth, JSON bodies,
/// and a response cache in front of GET requests.
#[derive(Debug)]
pub struct Client {
    base_url: String,
    timeout: Option<Duration>,
    token: Option<String>,
    http: HttpClient,
    cache: ResponseCache,
}

impl Client {
    /// `timeout: None` leaves requests unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>, cache_ttl: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            token: None,
            http,
            cache: ResponseCache::new(cache_ttl),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|token| !token.trim().is_empty());
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// GETs `path` and decodes the JSON body, serving from cache when a
    /// fresh entry exists. Only successfully decoded bodies are cached.
    pub fn get_json<T: DeserializeOwned>(
        &mut self,
        path: &str,
        params: &QueryParams,
    ) -> Result<T, ApiError> {
        let key = ResponseCache::signature("GET", path, params);
        if let Some(body) = self.cache.get(&key) {
            tracing::debug!(%key, "cache hit");
            return decode(path, &body);
        }
        tracing::debug!(%key, "cache miss");

        let mut url = format!("{}{}", self.base_url, path);
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.to_query_string());
        }

        let body = self.send(self.http.get(url))?;
        let value = decode(path, &body)?;
        self.cache.insert(key, body);
        Ok(value)
    }

    pub fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%path, "POST");
        let body = self.send(self.http.post(url).json(payload))?;
        decode(path, &body)
    }

    fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let request = match self.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().map_err(|source| ApiError::Transport {
            base_url: self.base_url.clone(),
            source,
        })?;

        let status = response.status();
        let body = response.text().map_err(|source| ApiError::Transport {
            base_url: self.base_url.clone(),
            source,
        })?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }
        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|error| ApiError::Malformed {
        endpoint: endpoint.to_owned(),
        detail: error.to_string(),
    })
}
