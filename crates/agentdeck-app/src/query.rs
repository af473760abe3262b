// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::UsecaseListItem;

pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Technology filter as the UI hands it over: a raw csv string or a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TechFilter {
    Csv(String),
    List(Vec<String>),
}

impl TechFilter {
    pub fn to_csv(&self) -> Option<String> {
        to_csv(self)
    }
}

pub fn to_csv(input: &TechFilter) -> Option<String> {
    match input {
        TechFilter::Csv(raw) => non_empty(raw),
        TechFilter::List(entries) => {
            let kept: Vec<&str> = entries
                .iter()
                .map(|entry| entry.trim())
                .filter(|entry| !entry.is_empty())
                .collect();
            if kept.is_empty() {
                None
            } else {
                Some(kept.join(","))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSet {
    pub vertical: Option<String>,
    /// Wire stage code (`Prod`, `Solution`, `POC`).
    pub stage: Option<String>,
    pub tech_stack: Option<TechFilter>,
    pub search: Option<String>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.params().is_empty()
    }

    /// Normalized filter parameters in wire order; blank values are dropped.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::with_capacity(4);
        if let Some(vertical) = self.vertical.as_deref().and_then(non_empty) {
            out.push(("vertical", vertical));
        }
        if let Some(stage) = self.stage.as_deref().and_then(non_empty) {
            out.push(("stage", stage));
        }
        if let Some(csv) = self.tech_stack.as_ref().and_then(to_csv) {
            out.push(("techStack", csv));
        }
        if let Some(search) = self.search.as_deref().and_then(non_empty) {
            out.push(("search", search));
        }
        out
    }

    pub fn tech_entries(&self) -> Vec<String> {
        self.tech_stack
            .as_ref()
            .and_then(to_csv)
            .map(|csv| csv.split(',').map(str::to_owned).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMode {
    /// 1-based page number.
    Offset { page: i64 },
    /// Seek from `id` in direction `skip`.
    Cursor { id: Option<String>, skip: i64 },
}

impl PageMode {
    pub const fn is_cursor(&self) -> bool {
        matches!(self, Self::Cursor { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub mode: PageMode,
    pub limit: i64,
    pub filters: FilterSet,
}

impl PageRequest {
    pub fn offset(page: i64, limit: i64, filters: FilterSet) -> Self {
        Self {
            mode: PageMode::Offset { page },
            limit,
            filters,
        }
    }

    pub fn cursor(id: Option<String>, skip: i64, limit: i64, filters: FilterSet) -> Self {
        Self {
            mode: PageMode::Cursor { id, skip },
            limit,
            filters,
        }
    }

    pub fn query(&self) -> QueryParams {
        build_query(&self.mode, self.limit, &self.filters)
    }
}

pub const fn normalize_skip(skip: i64) -> i64 {
    if skip < 0 { -1 } else { 1 }
}

/// Ordered wire parameters. Never holds an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.0.push((key.to_owned(), value));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }

    /// Query string with keys sorted; used as a cache signature.
    pub fn sorted_query_string(&self) -> String {
        let mut pairs: Vec<(&str, &str)> = self.iter().collect();
        pairs.sort();
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }
}

pub fn build_query(mode: &PageMode, limit: i64, filters: &FilterSet) -> QueryParams {
    let limit = limit.max(1);
    let mut params = QueryParams::default();
    match mode {
        PageMode::Offset { page } => {
            params.push("page", (*page).max(1).to_string());
            params.push("limit", limit.to_string());
        }
        PageMode::Cursor { id, skip } => {
            if let Some(id) = id.as_deref().and_then(non_empty) {
                params.push("id", id);
            }
            params.push("skip", normalize_skip(*skip).to_string());
            params.push("limit", limit.to_string());
        }
    }
    for (key, value) in filters.params() {
        params.push(key, value);
    }
    params
}

/// One page as the backend reported it. `None` fields were absent on the wire.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageResponse {
    pub items: Vec<UsecaseListItem>,
    pub total: Option<u64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub cursor_id: Option<String>,
}

impl PageResponse {
    /// Last item's id, else the server-provided cursor id.
    pub fn next_cursor(&self) -> Option<String> {
        self.items
            .last()
            .map(|item| item.id.as_str().to_owned())
            .filter(|id| !id.is_empty())
            .or_else(|| self.cursor_id.clone().filter(|id| !id.is_empty()))
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FilterSet, PageMode, PageRequest, PageResponse, TechFilter, build_query, normalize_skip,
        to_csv,
    };
    use crate::model::UsecaseListItem;

    fn list(entries: &[&str]) -> TechFilter {
        TechFilter::List(entries.iter().map(|entry| (*entry).to_owned()).collect())
    }

    #[test]
    fn to_csv_matches_documented_cases() {
        assert_eq!(to_csv(&list(&["a", "b"])), Some("a,b".to_owned()));
        assert_eq!(to_csv(&list(&[])), None);
        assert_eq!(to_csv(&TechFilter::Csv("  ".to_owned())), None);
        assert_eq!(to_csv(&list(&[" a ", "", "  ", "b"])), Some("a,b".to_owned()));
        assert_eq!(
            to_csv(&TechFilter::Csv(" UiPath Agentic,Copilot ".to_owned())),
            Some("UiPath Agentic,Copilot".to_owned())
        );
    }

    #[test]
    fn offset_query_clamps_page_and_limit() {
        let params = build_query(&PageMode::Offset { page: 0 }, -4, &FilterSet::default());
        assert_eq!(params.to_query_string(), "page=1&limit=1");
    }

    #[test]
    fn cursor_query_normalizes_skip() {
        assert_eq!(normalize_skip(0), 1);
        assert_eq!(normalize_skip(7), 1);
        assert_eq!(normalize_skip(-3), -1);

        let params = build_query(
            &PageMode::Cursor {
                id: Some("64f0".to_owned()),
                skip: 0,
            },
            10,
            &FilterSet::default(),
        );
        assert_eq!(params.to_query_string(), "id=64f0&skip=1&limit=10");
    }

    #[test]
    fn cursor_query_without_id_omits_it() {
        let params = build_query(
            &PageMode::Cursor { id: None, skip: -1 },
            5,
            &FilterSet::default(),
        );
        assert_eq!(params.get("id"), None);
        assert_eq!(params.get("skip"), Some("-1"));
    }

    #[test]
    fn filters_are_trimmed_and_blank_ones_dropped() {
        let filters = FilterSet {
            vertical: Some(" INS ".to_owned()),
            stage: Some("   ".to_owned()),
            tech_stack: Some(list(&["", " "])),
            search: Some(" claims".to_owned()),
        };
        let params = build_query(&PageMode::Offset { page: 2 }, 10, &filters);
        assert_eq!(
            params.to_query_string(),
            "page=2&limit=10&vertical=INS&search=claims"
        );
    }

    #[test]
    fn query_never_contains_empty_values() {
        let inputs = [
            FilterSet::default(),
            FilterSet {
                vertical: Some(String::new()),
                stage: Some(String::new()),
                tech_stack: Some(TechFilter::Csv(String::new())),
                search: Some(String::new()),
            },
            FilterSet {
                vertical: Some("BFS".to_owned()),
                stage: None,
                tech_stack: Some(list(&["Azure", ""])),
                search: Some("\t".to_owned()),
            },
        ];
        let modes = [
            PageMode::Offset { page: -1 },
            PageMode::Cursor {
                id: Some(" ".to_owned()),
                skip: 0,
            },
        ];
        for filters in &inputs {
            for mode in &modes {
                let params = build_query(mode, 0, filters);
                assert!(params.iter().all(|(_, value)| !value.is_empty()));
            }
        }
    }

    #[test]
    fn sorted_query_string_is_order_independent() {
        let filters = FilterSet {
            stage: Some("Prod".to_owned()),
            vertical: Some("INS".to_owned()),
            ..FilterSet::default()
        };
        let request = PageRequest::offset(1, 10, filters);
        assert_eq!(
            request.query().sorted_query_string(),
            "limit=10&page=1&stage=Prod&vertical=INS"
        );
    }

    #[test]
    fn next_cursor_prefers_last_item_then_server_id() {
        let mut response = PageResponse {
            items: vec![UsecaseListItem::new("a"), UsecaseListItem::new("b")],
            cursor_id: Some("server".to_owned()),
            ..PageResponse::default()
        };
        assert_eq!(response.next_cursor().as_deref(), Some("b"));

        response.items.clear();
        assert_eq!(response.next_cursor().as_deref(), Some("server"));

        response.cursor_id = None;
        assert_eq!(response.next_cursor(), None);
    }
}
