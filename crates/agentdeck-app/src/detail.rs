// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

use crate::ids::AgentId;
use crate::mapper::map_usecase_item;
use crate::model::{Agent, ResourceKind, ResourceLink, UsecaseListItem};
use crate::route::Route;
use crate::url_state::UrlQuery;

pub const INVALID_ID_MESSAGE: &str = "Invalid agent id.";
pub const NOT_FOUND_MESSAGE: &str = "Agent not found.";
pub const LOAD_FAILED_MESSAGE: &str = "Could not load agent details.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailStatus {
    Idle,
    Loading,
    Loaded(Box<Agent>),
    /// Terminal until the next `open`.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTicket {
    pub generation: u64,
    pub id: AgentId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailState {
    pub status: DetailStatus,
    id: Option<AgentId>,
    back_query: UrlQuery,
    generation: u64,
}

impl Default for DetailState {
    fn default() -> Self {
        Self {
            status: DetailStatus::Idle,
            id: None,
            back_query: UrlQuery::default(),
            generation: 0,
        }
    }
}

impl DetailState {
    /// Starts loading `id`. `back_query` is the list query the back action
    /// returns to. A missing id fails immediately without a ticket.
    pub fn open(&mut self, id: Option<AgentId>, back_query: UrlQuery) -> Option<DetailTicket> {
        self.generation += 1;
        self.back_query = back_query;
        self.id = id.clone();

        let Some(id) = id else {
            self.status = DetailStatus::Failed(INVALID_ID_MESSAGE.to_owned());
            return None;
        };
        self.status = DetailStatus::Loading;
        Some(DetailTicket {
            generation: self.generation,
            id,
        })
    }

    /// `Ok(None)` means the backend had no record for the id.
    pub fn apply<E: fmt::Display>(
        &mut self,
        generation: u64,
        result: Result<Option<UsecaseListItem>, E>,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, "dropping stale agent detail response");
            return false;
        }
        self.status = match result {
            Ok(Some(item)) => DetailStatus::Loaded(Box::new(map_usecase_item(&item))),
            Ok(None) => DetailStatus::Failed(NOT_FOUND_MESSAGE.to_owned()),
            Err(error) => {
                tracing::warn!(
                    id = self.id.as_ref().map(AgentId::as_str).unwrap_or_default(),
                    error = %error,
                    "agent detail fetch failed"
                );
                DetailStatus::Failed(LOAD_FAILED_MESSAGE.to_owned())
            }
        };
        true
    }

    pub fn id(&self) -> Option<&AgentId> {
        self.id.as_ref()
    }

    pub fn agent(&self) -> Option<&Agent> {
        match &self.status {
            DetailStatus::Loaded(agent) => Some(agent.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            DetailStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn back_route(&self) -> Route {
        Route::Agents(self.back_query.clone())
    }
}

/// Resources split into playable videos and everything else.
pub fn partition_resources(resources: &[ResourceLink]) -> (Vec<&ResourceLink>, Vec<&ResourceLink>) {
    resources
        .iter()
        .filter(|resource| !resource.url.trim().is_empty())
        .partition(|resource| resource.kind() == ResourceKind::Video)
}
