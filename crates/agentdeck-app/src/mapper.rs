// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{Agent, DetailPoint, DetailSection, UsecaseListItem, WireSection};

pub const TECH_SEPARATOR: &str = " · ";

pub fn map_usecase_item(item: &UsecaseListItem) -> Agent {
    let technology = item.tech_stack.as_ref().map(|stack| {
        stack
            .iter()
            .map(String::as_str)
            .filter(|entry| !entry.is_empty())
            .collect::<Vec<&str>>()
            .join(TECH_SEPARATOR)
    });

    let agent_count = item
        .total_agents
        .or_else(|| item.agent_names.as_ref().map(|names| names.len() as i64));

    Agent {
        id: item.id.clone(),
        name: trimmed(&item.usecase_name).unwrap_or_default(),
        description: trimmed(&item.description),
        industry: trimmed(&item.vertical),
        agent_count,
        technology,
        stage: item.stage.clone(),
        agent_names: item.agent_names.clone().unwrap_or_default(),
        client_name: trimmed(&item.client_name),
        client_type: item.client_type.clone(),
        poc_name: trimmed(&item.poc_name),
        poc_email: trimmed(&item.poc_email),
        thumbnail_url: item.thumbnail_url.clone(),
        video_url: item.video_url.clone(),
        resources: item.resources.clone().unwrap_or_default(),
        business_challenge: item.business_challenge.as_ref().map(map_section),
        solution_overview: item.solution_overview.as_ref().map(map_section),
        benefits: item.benefits.as_ref().map(map_section),
        created_at: item.created_at.clone(),
        updated_at: item.updated_at.clone(),
    }
}

pub fn map_usecase_items(items: &[UsecaseListItem]) -> Vec<Agent> {
    items.iter().map(map_usecase_item).collect()
}

fn map_section(section: &WireSection) -> DetailSection {
    DetailSection {
        title: section.title.clone().unwrap_or_default(),
        sub_title: section.sub_title.clone().unwrap_or_default(),
        description: section.description.clone(),
        points: section
            .points
            .iter()
            .flatten()
            .map(|point| DetailPoint {
                heading: point.heading.clone().unwrap_or_default(),
                description: point.description.clone().unwrap_or_default(),
            })
            .collect(),
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().map(|text| text.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::{TECH_SEPARATOR, map_usecase_item};
    use crate::model::{UsecaseListItem, WirePoint, WireSection};

    #[test]
    fn maps_renamed_fields_and_trims_text() {
        let item = UsecaseListItem {
            usecase_name: Some("  Claims triage ".to_owned()),
            vertical: Some(" Insurance".to_owned()),
            description: Some("Routes claims ".to_owned()),
            stage: Some("Prod".to_owned()),
            ..UsecaseListItem::new("64f0")
        };

        let agent = map_usecase_item(&item);
        assert_eq!(agent.id.as_str(), "64f0");
        assert_eq!(agent.name, "Claims triage");
        assert_eq!(agent.industry.as_deref(), Some("Insurance"));
        assert_eq!(agent.description.as_deref(), Some("Routes claims"));
        assert_eq!(agent.stage.as_deref(), Some("Prod"));
        assert_eq!(agent.stage_label(), "Production");
    }

    #[test]
    fn technology_joins_non_empty_entries() {
        let item = UsecaseListItem {
            tech_stack: Some(vec![
                "UiPath Agentic".to_owned(),
                String::new(),
                "Copilot".to_owned(),
            ]),
            ..UsecaseListItem::new("a")
        };
        let agent = map_usecase_item(&item);
        assert_eq!(
            agent.technology,
            Some(format!("UiPath Agentic{TECH_SEPARATOR}Copilot"))
        );
    }

    #[test]
    fn missing_tech_stack_leaves_technology_unset() {
        let agent = map_usecase_item(&UsecaseListItem::new("a"));
        assert_eq!(agent.technology, None);
        assert!(agent.agent_names.is_empty());
        assert!(agent.resources.is_empty());
    }

    #[test]
    fn agent_count_prefers_total_then_names() {
        let counted = UsecaseListItem {
            total_agents: Some(7),
            agent_names: Some(vec!["one".to_owned()]),
            ..UsecaseListItem::new("a")
        };
        assert_eq!(map_usecase_item(&counted).agent_count, Some(7));

        let named = UsecaseListItem {
            agent_names: Some(vec!["one".to_owned(), "two".to_owned()]),
            ..UsecaseListItem::new("b")
        };
        assert_eq!(map_usecase_item(&named).agent_count, Some(2));

        assert_eq!(
            map_usecase_item(&UsecaseListItem::new("c")).agent_count,
            None
        );
    }

    #[test]
    fn detail_sections_are_copied_only_when_present() {
        let item = UsecaseListItem {
            solution_overview: Some(WireSection {
                title: Some("Overview".to_owned()),
                sub_title: Some("How it works".to_owned()),
                description: Some("Agents route work".to_owned()),
                points: Some(vec![WirePoint {
                    heading: Some("Intake".to_owned()),
                    description: None,
                }]),
            }),
            ..UsecaseListItem::new("a")
        };

        let agent = map_usecase_item(&item);
        assert!(agent.business_challenge.is_none());
        assert!(agent.benefits.is_none());

        let overview = agent.solution_overview.expect("overview should map");
        assert_eq!(overview.title, "Overview");
        assert_eq!(overview.description.as_deref(), Some("Agents route work"));
        assert_eq!(overview.points.len(), 1);
        assert_eq!(overview.points[0].heading, "Intake");
        assert_eq!(overview.points[0].description, "");
    }
}
