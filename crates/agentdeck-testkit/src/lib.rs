// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use agentdeck_app::model::{ResourceLink, UsecaseListItem, WirePoint, WireSection};
use anyhow::{Context, Result, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use std::io::Read as _;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Response, Server};

const VERTICALS: [&str; 6] = ["BFS", "INS", "HLS", "MFG", "RCG", "TMT"];
const STAGES: [&str; 3] = ["Prod", "Solution", "POC"];
const TECHNOLOGIES: [&str; 8] = [
    "UiPath Agentic",
    "Copilot Studio",
    "Azure OpenAI",
    "LangGraph",
    "Bedrock",
    "Vertex AI",
    "Power Automate",
    "Semantic Kernel",
];
const USECASE_VERBS: [&str; 8] = [
    "Claims",
    "Invoice",
    "Onboarding",
    "Underwriting",
    "Dispute",
    "Procurement",
    "Triage",
    "Reconciliation",
];
const USECASE_NOUNS: [&str; 6] = [
    "assistant",
    "copilot",
    "automation",
    "workbench",
    "agent",
    "orchestrator",
];
const CLIENTS: [&str; 8] = [
    "Northwind",
    "Contoso",
    "Fabrikam",
    "Tailspin",
    "Litware",
    "Adatum",
    "Proseware",
    "Woodgrove",
];
const FIRST_NAMES: [&str; 10] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Quinn", "Parker", "Rowan", "Kai",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of realistic catalog records.
#[derive(Debug, Clone)]
pub struct CatalogFaker {
    rng: DeterministicRng,
    counter: u64,
}

impl CatalogFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            counter: 0,
        }
    }

    /// A record with every list field populated and no detail sections.
    pub fn usecase(&mut self) -> UsecaseListItem {
        self.counter += 1;
        let id = format!("{:024x}", 0x64f0_0000_u64 + self.counter);
        let verb = self.pick(&USECASE_VERBS);
        let noun = self.pick(&USECASE_NOUNS);
        let client = self.pick(&CLIENTS);
        let first = self.pick(&FIRST_NAMES);

        let tech_count = 1 + self.rng.int_n(3);
        let mut tech_stack: Vec<String> = Vec::with_capacity(tech_count);
        while tech_stack.len() < tech_count {
            let tech = self.pick(&TECHNOLOGIES).to_owned();
            if !tech_stack.contains(&tech) {
                tech_stack.push(tech);
            }
        }
        let agent_names: Vec<String> = (1..=1 + self.rng.int_n(4))
            .map(|index| format!("{verb} agent {index}"))
            .collect();

        let mut item = UsecaseListItem::new(id);
        item.usecase_name = Some(format!("{verb} {noun}"));
        item.description = Some(format!("{verb} {noun} built for {client}."));
        item.stage = Some(self.pick(&STAGES).to_owned());
        item.vertical = Some(self.pick(&VERTICALS).to_owned());
        item.tech_stack = Some(tech_stack);
        item.agent_names = Some(agent_names);
        item.client_name = Some(client.to_owned());
        item.client_type = Some("Enterprise".to_owned());
        item.poc_name = Some(first.to_owned());
        item.poc_email = Some(format!(
            "{}@{}.example",
            first.to_ascii_lowercase(),
            client.to_ascii_lowercase()
        ));
        item.created_at = Some(fixture_datetime().to_owned());
        item.updated_at = Some(fixture_datetime().to_owned());
        item
    }

    /// Like [`CatalogFaker::usecase`] plus detail sections and resources.
    pub fn detailed_usecase(&mut self) -> UsecaseListItem {
        let mut item = self.usecase();
        let name = item.usecase_name.clone().unwrap_or_default();
        item.business_challenge = Some(self.section("Business challenge", None));
        item.solution_overview = Some(self.section(
            "Solution overview",
            Some(format!("How {name} works end to end.")),
        ));
        item.benefits = Some(self.section("Benefits", None));
        item.resources = Some(vec![
            ResourceLink {
                url: format!("https://cdn.example/{}.mp4", item.id),
                description: "Walkthrough".to_owned(),
            },
            ResourceLink {
                url: format!("https://cdn.example/{}.pdf", item.id),
                description: "Solution brief".to_owned(),
            },
        ]);
        item
    }

    pub fn usecases(&mut self, count: usize) -> Vec<UsecaseListItem> {
        (0..count).map(|_| self.usecase()).collect()
    }

    fn section(&mut self, title: &str, description: Option<String>) -> WireSection {
        let points = (1..=2 + self.rng.int_n(2))
            .map(|index| WirePoint {
                heading: Some(format!("{title} point {index}")),
                description: Some(format!("{} detail.", self.pick(&USECASE_VERBS))),
            })
            .collect();
        WireSection {
            title: Some(title.to_owned()),
            sub_title: Some(format!("{title} at a glance")),
            description,
            points: Some(points),
        }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19T12:34:56Z"
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("agentdeck.db");
    Ok((dir, db_path))
}

/// Unsigned three-part token carrying the given `exp` claim.
pub fn jwt_with_exp(exp: i64) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(json!({ "sub": "user-1", "exp": exp }).to_string())
    )
}

/// Offset-mode list body.
pub fn list_body(items: &[UsecaseListItem], total: u64, page: i64, limit: i64) -> String {
    json!({
        "ok": true,
        "data": { "items": items, "total": total, "page": page, "limit": limit },
    })
    .to_string()
}

/// Cursor-mode list body. `id` is the server's cursor hint.
pub fn cursor_list_body(items: &[UsecaseListItem], total: Option<u64>, id: Option<&str>) -> String {
    let mut data = json!({ "items": items });
    if let Some(total) = total {
        data["total"] = json!(total);
    }
    if let Some(id) = id {
        data["id"] = json!(id);
    }
    json!({ "ok": true, "data": data }).to_string()
}

pub fn item_body(item: Option<&UsecaseListItem>) -> String {
    json!({ "data": item }).to_string()
}

pub fn options_body() -> String {
    let options = |values: &[&str]| -> Value {
        values
            .iter()
            .map(|value| json!({ "label": value, "value": value }))
            .collect()
    };
    json!({
        "data": {
            "vertical": options(&VERTICALS),
            "stage": [
                { "label": "Production", "value": "Prod" },
                { "label": "Solution", "value": "Solution" },
                { "label": "POC", "value": "POC" },
            ],
            "techStack": options(&TECHNOLOGIES),
        }
    })
    .to_string()
}

pub fn login_ok_body(token: &str) -> String {
    json!({ "ok": true, "data": { "accessToken": token, "expiresIn": 3600 } }).to_string()
}

pub fn message_body(message: &str) -> String {
    json!({ "message": message }).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query, as sent.
    pub url: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }

    pub fn query(&self) -> &str {
        self.url.split_once('?').map(|(_, query)| query).unwrap_or_default()
    }

    pub fn param(&self, key: &str) -> Option<String> {
        url::form_urlencoded::parse(self.query().as_bytes())
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.into_owned())
    }

    pub fn param_keys(&self) -> Vec<String> {
        url::form_urlencoded::parse(self.query().as_bytes())
            .map(|(name, _)| name.into_owned())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

type Handler = dyn Fn(&RecordedRequest) -> MockResponse + Send + Sync + 'static;

/// Catalog backend stand-in on a local `tiny_http` server. Every request is
/// recorded before the handler answers it. The server stops on drop.
pub struct MockBackend {
    addr: String,
    server: Arc<Server>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    worker: Option<JoinHandle<()>>,
}

impl MockBackend {
    pub fn start<F>(handler: F) -> Result<Self>
    where
        F: Fn(&RecordedRequest) -> MockResponse + Send + Sync + 'static,
    {
        let server = Server::http("127.0.0.1:0")
            .map_err(|error| anyhow!("start mock server: {error}"))?;
        let server = Arc::new(server);
        let addr = server.server_addr().to_string();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Box<Handler> = Box::new(handler);

        let worker = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            thread::spawn(move || {
                for mut request in server.incoming_requests() {
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);
                    let recorded = RecordedRequest {
                        method: request.method().to_string(),
                        url: request.url().to_owned(),
                        authorization: request
                            .headers()
                            .iter()
                            .find(|header| header.field.equiv("Authorization"))
                            .map(|header| header.value.as_str().to_owned()),
                        body,
                    };

                    let reply = handler(&recorded);
                    if let Ok(mut log) = requests.lock() {
                        log.push(recorded);
                    }

                    let mut response =
                        Response::from_string(reply.body).with_status_code(reply.status);
                    if let Ok(header) = Header::from_bytes("Content-Type", "application/json") {
                        response = response.with_header(header);
                    }
                    let _ = request.respond(response);
                }
            })
        };

        Ok(Self {
            addr,
            server,
            requests,
            worker: Some(worker),
        })
    }

    /// Base URL in the shape `api.base_url` expects.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|log| log.len()).unwrap_or_default()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
