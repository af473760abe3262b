// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;
use url::Url;

use crate::ids::AgentId;
use crate::session::Session;
use crate::url_state::UrlQuery;

pub const LOGIN_PATH: &str = "/";
pub const AGENTS_PATH: &str = "/agents";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Agents(UrlQuery),
    /// `id` is `None` when the path segment was blank.
    AgentDetail(Option<AgentId>),
}

impl Route {
    /// Parses an app path such as `/agents?stage=Prod`. Unknown paths land on
    /// the agent list.
    pub fn parse(raw: &str) -> Self {
        let Ok(base) = Url::parse("app://agentdeck/") else {
            return Self::Login;
        };
        let Ok(parsed) = base.join(raw.trim()) else {
            return Self::Agents(UrlQuery::default());
        };

        let segments: Vec<String> = parsed
            .path_segments()
            .map(|segments| segments.map(decode_segment).collect())
            .unwrap_or_default();
        let query = UrlQuery::parse(parsed.query().unwrap_or_default());

        match segments.as_slice() {
            [] => Self::Login,
            [only] if only.is_empty() => Self::Login,
            [agents] if agents == "agents" => Self::Agents(query),
            [agents, id] if agents == "agents" => Self::AgentDetail(AgentId::parse(id)),
            _ => Self::Agents(UrlQuery::default()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Login => LOGIN_PATH.to_owned(),
            Self::Agents(query) if query.is_empty() => AGENTS_PATH.to_owned(),
            Self::Agents(query) => format!("{AGENTS_PATH}?{}", query.to_query_string()),
            Self::AgentDetail(Some(id)) => format!(
                "{AGENTS_PATH}/{}",
                url::form_urlencoded::byte_serialize(id.as_str().as_bytes()).collect::<String>()
            ),
            Self::AgentDetail(None) => format!("{AGENTS_PATH}/"),
        }
    }

    pub const fn is_protected(&self) -> bool {
        !matches!(self, Self::Login)
    }
}

fn decode_segment(segment: &str) -> String {
    // Segments arrive percent-encoded.
    url::form_urlencoded::parse(format!("s={segment}").as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin,
}

pub fn guard(route: &Route, session: &Session, now: OffsetDateTime) -> GuardDecision {
    if !route.is_protected() || session.is_logged_in_at(now) {
        GuardDecision::Allow
    } else {
        GuardDecision::RedirectToLogin
    }
}
