// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Production,
    Solution,
    Poc,
}

impl Stage {
    pub const ALL: [Self; 3] = [Self::Production, Self::Solution, Self::Poc];

    /// Code the backend stores and filters on.
    pub const fn api_code(self) -> &'static str {
        match self {
            Self::Production => "Prod",
            Self::Solution => "Solution",
            Self::Poc => "POC",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Production => "Production",
            Self::Solution => "Solution",
            Self::Poc => "POC",
        }
    }

    pub fn from_api_code(value: &str) -> Option<Self> {
        match value {
            "Prod" => Some(Self::Production),
            "Solution" => Some(Self::Solution),
            "POC" => Some(Self::Poc),
            _ => None,
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "Production" => Some(Self::Production),
            "Solution" => Some(Self::Solution),
            "POC" => Some(Self::Poc),
            _ => None,
        }
    }
}

/// Wire stage code to display label. Unknown codes pass through unchanged.
pub fn to_ui_stage(api: &str) -> String {
    Stage::from_api_code(api)
        .map(Stage::label)
        .unwrap_or(api)
        .to_owned()
}

/// Display label to wire stage code. Unknown labels pass through unchanged.
pub fn to_api_stage(ui: &str) -> String {
    Stage::from_label(ui)
        .map(Stage::api_code)
        .unwrap_or(ui)
        .to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Video,
    Document,
}

impl ResourceLink {
    pub fn kind(&self) -> ResourceKind {
        let path = self
            .url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if path.ends_with(".mp4") || path.ends_with(".webm") {
            ResourceKind::Video
        } else {
            ResourceKind::Document
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WirePoint {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSection {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sub_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub points: Option<Vec<WirePoint>>,
}

/// Server-shaped catalog record as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsecaseListItem {
    #[serde(rename = "_id")]
    pub id: AgentId,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub agent_names: Option<Vec<String>>,
    #[serde(default)]
    pub total_agents: Option<i64>,
    #[serde(default)]
    pub tech_stack: Option<Vec<String>>,
    #[serde(default)]
    pub usecase_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vertical: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_type: Option<String>,
    #[serde(default)]
    pub poc_name: Option<String>,
    #[serde(default)]
    pub poc_email: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub resources: Option<Vec<ResourceLink>>,
    // The backend spells this key with a double "s".
    #[serde(default, rename = "bussinessChallenge")]
    pub business_challenge: Option<WireSection>,
    #[serde(default)]
    pub solution_overview: Option<WireSection>,
    #[serde(default)]
    pub benefits: Option<WireSection>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, rename = "__v")]
    pub revision: Option<i64>,
}

impl UsecaseListItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: AgentId::new(id),
            stage: None,
            agent_names: None,
            total_agents: None,
            tech_stack: None,
            usecase_name: None,
            description: None,
            vertical: None,
            client_name: None,
            client_type: None,
            poc_name: None,
            poc_email: None,
            thumbnail_url: None,
            video_url: None,
            resources: None,
            business_challenge: None,
            solution_overview: None,
            benefits: None,
            created_at: None,
            updated_at: None,
            revision: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPoint {
    pub heading: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSection {
    pub title: String,
    pub sub_title: String,
    pub description: Option<String>,
    pub points: Vec<DetailPoint>,
}

/// UI-facing catalog record. Replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub agent_count: Option<i64>,
    pub technology: Option<String>,
    /// Raw wire stage code; see [`Agent::stage_label`].
    pub stage: Option<String>,
    pub agent_names: Vec<String>,
    pub client_name: Option<String>,
    pub client_type: Option<String>,
    pub poc_name: Option<String>,
    pub poc_email: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub resources: Vec<ResourceLink>,
    pub business_challenge: Option<DetailSection>,
    pub solution_overview: Option<DetailSection>,
    pub benefits: Option<DetailSection>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Agent {
    pub fn stage_label(&self) -> String {
        self.stage.as_deref().map(to_ui_stage).unwrap_or_default()
    }

    /// Splits the display technology string back into entries. Accepts the
    /// middot the mapper joins with as well as commas and pipes.
    pub fn tech_list(&self) -> Vec<String> {
        self.technology
            .as_deref()
            .unwrap_or_default()
            .split(['·', ',', '|'])
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

impl FilterOption {
    pub fn all() -> Self {
        Self {
            label: "All".to_owned(),
            value: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Industry,
    Stage,
    Technology,
}

impl FilterField {
    pub const ALL: [Self; 3] = [Self::Industry, Self::Stage, Self::Technology];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Industry => "industry",
            Self::Stage => "stage",
            Self::Technology => "technology",
        }
    }
}

/// Dropdown choices per filter. Each list starts with the "All" sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub vertical: Vec<FilterOption>,
    pub stage: Vec<FilterOption>,
    pub tech_stack: Vec<FilterOption>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            vertical: vec![FilterOption::all()],
            stage: std::iter::once(FilterOption::all())
                .chain(Stage::ALL.into_iter().map(|stage| FilterOption {
                    label: stage.label().to_owned(),
                    value: stage.api_code().to_owned(),
                }))
                .collect(),
            tech_stack: vec![FilterOption::all()],
        }
    }
}

impl FilterOptions {
    pub fn from_server(
        vertical: Vec<FilterOption>,
        stage: Vec<FilterOption>,
        tech_stack: Vec<FilterOption>,
    ) -> Self {
        fn with_all(options: Vec<FilterOption>) -> Vec<FilterOption> {
            std::iter::once(FilterOption::all())
                .chain(options.into_iter().filter(|option| !option.value.is_empty()))
                .collect()
        }

        Self {
            vertical: with_all(vertical),
            stage: with_all(stage),
            tech_stack: with_all(tech_stack),
        }
    }

    pub fn for_field(&self, field: FilterField) -> &[FilterOption] {
        match field {
            FilterField::Industry => &self.vertical,
            FilterField::Stage => &self.stage,
            FilterField::Technology => &self.tech_stack,
        }
    }
}
