// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

use crate::mapper::map_usecase_items;
use crate::model::{Agent, FilterField, to_api_stage, to_ui_stage};
use crate::pagination::{PagePill, page_pills, total_pages};
use crate::query::{
    DEFAULT_PAGE_SIZE, FilterSet, PageRequest, PageResponse, TechFilter, normalize_skip,
};
use crate::url_state::{
    KEY_ID, KEY_LIMIT, KEY_PAGE, KEY_SEARCH, KEY_SKIP, KEY_STAGE, KEY_TECH_STACK, KEY_VERTICAL,
    QueryPatch, UrlQuery,
};

pub const LOAD_ERROR_MESSAGE: &str = "Could not load agents. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorState {
    /// The anchor named by the URL; reloads always start here.
    pub id: Option<String>,
    /// Always -1 or +1.
    pub skip: i64,
    /// Derived from the last response and used by the next page move.
    pub next: Option<String>,
}

impl CursorState {
    /// Anchor for moving forward or back from the loaded page.
    pub fn step_anchor(&self) -> Option<String> {
        self.next.clone().or_else(|| self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    pub page_index: u64,
    pub page_size: u64,
    pub total: u64,
    /// Present exactly when the URL carries an `id`.
    pub cursor: Option<CursorState>,
}

impl PaginationState {
    pub fn total_pages(&self) -> u64 {
        total_pages(self.total, self.page_size)
    }

    pub fn current_page(&self) -> u64 {
        self.page_index + 1
    }

    pub fn pills(&self) -> Vec<PagePill> {
        page_pills(self.total_pages(), self.current_page())
    }

    pub const fn is_cursor(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.is_cursor() || self.page_index + 1 < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.is_cursor() || self.page_index > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// A fetch the runtime should perform; its result must come back with the
/// same generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub request: PageRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    Navigate(UrlQuery),
    SetIndustry(Option<String>),
    /// Takes the display label ("Production"); the URL stores the wire code.
    SetStage(Option<String>),
    SetTechnology(Option<String>),
    SetSearch(Option<String>),
    ClearFilters,
    GoToPage(u64),
    NextPage,
    PrevPage,
    SetPageSize(u64),
    /// Continue with cursor paging after the last visible record.
    UseCursorPaging,
    UseOffsetPaging,
    Reload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    UrlChanged(UrlQuery),
    FetchRequested(FetchTicket),
    Loaded { count: usize, total: u64 },
    Failed(String),
    StaleResponseIgnored { generation: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    url: UrlQuery,
    default_page_size: u64,
    pub filters: FilterSet,
    pub pagination: PaginationState,
    pub status: ListStatus,
    pub agents: Vec<Agent>,
    pub error: Option<String>,
    generation: u64,
}

impl Default for ListState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE as u64)
    }
}

impl ListState {
    pub fn new(default_page_size: u64) -> Self {
        let default_page_size = default_page_size.max(1);
        let mut state = Self {
            url: UrlQuery::default(),
            default_page_size,
            filters: FilterSet::default(),
            pagination: PaginationState {
                page_index: 0,
                page_size: default_page_size,
                total: 0,
                cursor: None,
            },
            status: ListStatus::Idle,
            agents: Vec::new(),
            error: None,
            generation: 0,
        };
        state.sync_from_url();
        state
    }

    pub fn url(&self) -> &UrlQuery {
        &self.url
    }

    pub const fn default_page_size(&self) -> u64 {
        self.default_page_size
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.status == ListStatus::Loading
    }

    pub fn has_data(&self) -> bool {
        !self.agents.is_empty()
    }

    /// Currently selected value for a filter, as the UI shows it.
    pub fn selected(&self, field: FilterField) -> String {
        match field {
            FilterField::Industry => self.filters.vertical.clone().unwrap_or_default(),
            FilterField::Stage => self
                .filters
                .stage
                .as_deref()
                .map(to_ui_stage)
                .unwrap_or_default(),
            FilterField::Technology => self.filters.tech_entries().join(","),
        }
    }

    pub fn search(&self) -> &str {
        self.filters.search.as_deref().unwrap_or_default()
    }

    pub fn dispatch(&mut self, command: ListCommand) -> Vec<ListEvent> {
        match command {
            ListCommand::Navigate(query) => {
                self.url = query;
                self.sync_from_url();
                vec![
                    ListEvent::UrlChanged(self.url.clone()),
                    self.start_fetch(),
                ]
            }
            ListCommand::SetIndustry(value) => self.apply_filter(KEY_VERTICAL, value),
            ListCommand::SetStage(label) => {
                let code = label.map(|label| to_api_stage(label.trim()));
                self.apply_filter(KEY_STAGE, code)
            }
            ListCommand::SetTechnology(csv) => {
                let csv = csv.and_then(|csv| TechFilter::Csv(csv).to_csv());
                self.apply_filter(KEY_TECH_STACK, csv)
            }
            ListCommand::SetSearch(value) => self.apply_filter(KEY_SEARCH, value),
            ListCommand::ClearFilters => {
                let patch = self
                    .reset_position()
                    .clear(KEY_VERTICAL)
                    .clear(KEY_STAGE)
                    .clear(KEY_TECH_STACK)
                    .clear(KEY_SEARCH);
                self.navigate(patch)
            }
            ListCommand::GoToPage(page) => {
                if self.pagination.is_cursor() {
                    return Vec::new();
                }
                let page = page.clamp(1, self.pagination.total_pages());
                self.navigate(QueryPatch::new().set(KEY_PAGE, page))
            }
            ListCommand::NextPage => match &self.pagination.cursor {
                Some(cursor) => {
                    let patch = QueryPatch::new()
                        .set_opt(KEY_ID, cursor.step_anchor())
                        .set(KEY_SKIP, 1)
                        .set(KEY_LIMIT, self.pagination.page_size);
                    self.navigate(patch)
                }
                None if self.pagination.has_next() => self.navigate(
                    QueryPatch::new().set(KEY_PAGE, self.pagination.page_index + 2),
                ),
                None => Vec::new(),
            },
            ListCommand::PrevPage => match &self.pagination.cursor {
                Some(cursor) => {
                    let patch = QueryPatch::new()
                        .set_opt(KEY_ID, cursor.step_anchor())
                        .set(KEY_SKIP, -1)
                        .set(KEY_LIMIT, self.pagination.page_size);
                    self.navigate(patch)
                }
                None if self.pagination.has_prev() => {
                    self.navigate(QueryPatch::new().set(KEY_PAGE, self.pagination.page_index))
                }
                None => Vec::new(),
            },
            ListCommand::SetPageSize(size) => {
                let patch = self.reset_position().set(KEY_LIMIT, size.max(1));
                self.navigate(patch)
            }
            ListCommand::UseCursorPaging => {
                if self.pagination.is_cursor() {
                    return Vec::new();
                }
                let Some(last) = self.agents.last() else {
                    return Vec::new();
                };
                let patch = QueryPatch::new()
                    .set(KEY_ID, last.id.as_str())
                    .set(KEY_SKIP, 1)
                    .clear(KEY_PAGE);
                self.navigate(patch)
            }
            ListCommand::UseOffsetPaging => {
                if !self.pagination.is_cursor() {
                    return Vec::new();
                }
                let patch = QueryPatch::new()
                    .clear(KEY_ID)
                    .clear(KEY_SKIP)
                    .set(KEY_PAGE, 1);
                self.navigate(patch)
            }
            ListCommand::Reload => vec![self.start_fetch()],
        }
    }

    /// Applies a fetch result. Results for superseded generations are dropped
    /// so a slow response never overwrites fresher state.
    pub fn apply_page<E: fmt::Display>(
        &mut self,
        generation: u64,
        result: Result<PageResponse, E>,
    ) -> Vec<ListEvent> {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "dropping stale agent list response"
            );
            return vec![ListEvent::StaleResponseIgnored { generation }];
        }

        match result {
            Ok(response) => {
                let count = response.items.len();
                self.agents = map_usecase_items(&response.items);
                let fallback_total = count as u64;

                match self.pagination.cursor.as_mut() {
                    Some(cursor) => {
                        self.pagination.total = response.total.unwrap_or(
                            if self.pagination.total > 0 {
                                self.pagination.total
                            } else {
                                fallback_total
                            },
                        );
                        if let Some(next) = response.next_cursor() {
                            cursor.next = Some(next);
                        }
                    }
                    None => {
                        self.pagination.total = response.total.unwrap_or(fallback_total);
                        let page = response
                            .page
                            .unwrap_or(self.pagination.current_page() as i64);
                        self.pagination.page_index = page.saturating_sub(1).max(0) as u64;
                        if let Some(limit) = response.limit.filter(|limit| *limit >= 1) {
                            self.pagination.page_size = limit as u64;
                        }
                    }
                }

                self.error = None;
                self.status = ListStatus::Loaded;
                tracing::debug!(
                    generation,
                    count,
                    total = self.pagination.total,
                    "agent list loaded"
                );
                vec![ListEvent::Loaded {
                    count,
                    total: self.pagination.total,
                }]
            }
            Err(error) => {
                tracing::warn!(generation, error = %error, "agent list fetch failed");
                self.error = Some(LOAD_ERROR_MESSAGE.to_owned());
                self.status = ListStatus::Failed;
                vec![ListEvent::Failed(LOAD_ERROR_MESSAGE.to_owned())]
            }
        }
    }

    fn apply_filter(&mut self, key: &'static str, value: Option<String>) -> Vec<ListEvent> {
        let value = value
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let patch = self.reset_position().set_opt(key, value);
        self.navigate(patch)
    }

    /// Filter and page-size changes restart the listing without leaving the
    /// current paging mode.
    fn reset_position(&self) -> QueryPatch {
        if self.pagination.is_cursor() {
            QueryPatch::new().set(KEY_SKIP, 1)
        } else {
            QueryPatch::new().set(KEY_PAGE, 1)
        }
    }

    fn navigate(&mut self, patch: QueryPatch) -> Vec<ListEvent> {
        self.url.merge(&patch);
        self.sync_from_url();
        vec![
            ListEvent::UrlChanged(self.url.clone()),
            self.start_fetch(),
        ]
    }

    fn sync_from_url(&mut self) {
        let page = parse_int(self.url.get(KEY_PAGE)).unwrap_or(1);
        let limit = parse_int(self.url.get(KEY_LIMIT))
            .filter(|limit| *limit >= 1)
            .map(|limit| limit as u64)
            .unwrap_or(self.default_page_size);
        let skip = parse_int(self.url.get(KEY_SKIP))
            .map(normalize_skip)
            .unwrap_or(1);

        self.pagination.page_index = page.saturating_sub(1).max(0) as u64;
        self.pagination.page_size = limit;
        self.pagination.cursor = self.url.get(KEY_ID).map(|id| CursorState {
            id: Some(id.to_owned()),
            skip,
            next: None,
        });

        self.filters = FilterSet {
            vertical: self.url.get(KEY_VERTICAL).map(str::to_owned),
            stage: self.url.get(KEY_STAGE).map(str::to_owned),
            tech_stack: self.url.get(KEY_TECH_STACK).map(|csv| {
                TechFilter::List(csv.split(',').map(str::to_owned).collect())
            }),
            search: self.url.get(KEY_SEARCH).map(str::to_owned),
        };
    }

    fn start_fetch(&mut self) -> ListEvent {
        self.generation += 1;
        self.status = ListStatus::Loading;

        let limit = self.pagination.page_size as i64;
        let request = match &self.pagination.cursor {
            Some(cursor) => {
                PageRequest::cursor(cursor.id.clone(), cursor.skip, limit, self.filters.clone())
            }
            None => PageRequest::offset(
                self.pagination.current_page() as i64,
                limit,
                self.filters.clone(),
            ),
        };

        ListEvent::FetchRequested(FetchTicket {
            generation: self.generation,
            request,
        })
    }
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
}
