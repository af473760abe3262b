// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;

use agentdeck_app::login::{Credentials, LoginOutcome};
use agentdeck_app::model::{FilterOption, FilterOptions, UsecaseListItem};
use agentdeck_app::query::{PageRequest, PageResponse, QueryParams};
use agentdeck_app::AgentId;

use crate::client::Client;
use crate::error::ApiError;

pub const LIST_PATH: &str = "/usecase/list";
pub const OPTIONS_PATH: &str = "/usecase/options";
pub const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    data: Option<ListData>,
}

#[derive(Debug, Default, Deserialize)]
struct ListData {
    #[serde(default)]
    items: Vec<UsecaseListItem>,
    total: Option<u64>,
    page: Option<i64>,
    limit: Option<i64>,
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OneEnvelope {
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct OptionsEnvelope {
    data: Option<OptionsData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsData {
    #[serde(default)]
    vertical: Vec<FilterOption>,
    #[serde(default)]
    stage: Vec<FilterOption>,
    #[serde(default)]
    tech_stack: Vec<FilterOption>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub data: Option<LoginData>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<Value>,
}

impl LoginData {
    /// Token lifetime in seconds. Accepts a number, a digit string, or a
    /// string with an `s`, `m`, `h` or `d` suffix.
    pub fn expires_in_secs(&self) -> Option<u64> {
        match self.expires_in.as_ref()? {
            Value::Number(number) => number.as_u64(),
            Value::String(raw) => parse_lifetime(raw),
            _ => None,
        }
    }
}

fn parse_lifetime(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let split = raw
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value = digits.parse::<u64>().ok()?;
    let scale = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return None,
    };
    value.checked_mul(scale)
}

impl LoginResponse {
    /// The token counts only when the server also reported `ok`.
    pub fn token(&self) -> Option<&str> {
        if !self.ok {
            return None;
        }
        self.data
            .as_ref()
            .and_then(|data| data.access_token.as_deref())
            .filter(|token| !token.trim().is_empty())
    }
}

/// Folds a login call into what the login form understands.
pub fn login_outcome(result: Result<LoginResponse, ApiError>) -> LoginOutcome {
    match result {
        Ok(response) => match response.token() {
            Some(token) => LoginOutcome::Success {
                token: token.to_owned(),
                expires_in: response.data.as_ref().and_then(LoginData::expires_in_secs),
            },
            None => LoginOutcome::Rejected {
                message: response.message,
            },
        },
        Err(error) => {
            tracing::warn!(error = %error, "login request failed");
            LoginOutcome::Rejected {
                message: error.server_message().map(str::to_owned),
            }
        }
    }
}

/// Typed catalog endpoints on top of [`Client`].
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.client.set_token(token);
    }

    /// Forgets the token and every cached response.
    pub fn logout(&mut self) {
        self.client.set_token(None);
        self.client.clear_cache();
    }

    pub fn fetch_page(&mut self, request: &PageRequest) -> Result<PageResponse, ApiError> {
        let envelope: ListEnvelope = self.client.get_json(LIST_PATH, &request.query())?;
        let data = envelope.data.ok_or_else(|| ApiError::Malformed {
            endpoint: LIST_PATH.to_owned(),
            detail: "missing data".to_owned(),
        })?;
        tracing::debug!(
            items = data.items.len(),
            total = ?data.total,
            "fetched agent page"
        );
        Ok(PageResponse {
            items: data.items,
            total: data.total,
            page: data.page,
            limit: data.limit,
            cursor_id: data.id,
        })
    }

    /// A 404, a `null` body, or a page without the id all mean
    /// [`ApiError::NotFound`].
    pub fn fetch_agent(&mut self, id: &AgentId) -> Result<UsecaseListItem, ApiError> {
        let raw = id.as_str().trim();
        if raw.is_empty() {
            return Err(ApiError::InvalidId(id.as_str().to_owned()));
        }
        let not_found = || ApiError::NotFound(raw.to_owned());

        let mut params = QueryParams::default();
        params.push("id", raw);
        params.push("limit", "1");

        let envelope: OneEnvelope = match self.client.get_json(LIST_PATH, &params) {
            Ok(envelope) => envelope,
            Err(ApiError::Status { status: 404, .. }) => return Err(not_found()),
            Err(error) => return Err(error),
        };
        single_item(envelope.data, raw)?.ok_or_else(not_found)
    }

    pub fn filter_options(&mut self) -> Result<FilterOptions, ApiError> {
        let envelope: OptionsEnvelope =
            self.client.get_json(OPTIONS_PATH, &QueryParams::default())?;
        let data = envelope.data.unwrap_or_default();
        Ok(FilterOptions::from_server(
            data.vertical,
            data.stage,
            data.tech_stack,
        ))
    }

    pub fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        tracing::info!(email = %credentials.email, "logging in");
        self.client.post_json(
            LOGIN_PATH,
            &LoginRequest {
                email: &credentials.email,
                password: &credentials.password,
            },
        )
    }
}

/// `data` is either the record itself, `null`, or a list page; a page yields
/// the entry whose id matches.
fn single_item(data: Value, id: &str) -> Result<Option<UsecaseListItem>, ApiError> {
    let malformed = |error: serde_json::Error| ApiError::Malformed {
        endpoint: LIST_PATH.to_owned(),
        detail: error.to_string(),
    };

    match data {
        Value::Null => Ok(None),
        Value::Object(ref object) if object.contains_key("items") => {
            let page: ListData = serde_json::from_value(data).map_err(malformed)?;
            Ok(page.items.into_iter().find(|item| item.id.as_str() == id))
        }
        other => serde_json::from_value(other).map(Some).map_err(malformed),
    }
}
