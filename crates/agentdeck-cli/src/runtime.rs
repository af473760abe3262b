// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use agentdeck_api::{Fetcher, login_outcome};
use agentdeck_app::login::{Credentials, LoginOutcome};
use agentdeck_app::query::{PageRequest, PageResponse};
use agentdeck_app::url_state::UrlQuery;
use agentdeck_app::{AgentId, FilterOptions, UsecaseListItem};
use agentdeck_store::Store;
use anyhow::Result;

/// Backs the UI with the HTTP fetcher and the local store.
pub struct ApiRuntime<'a> {
    store: &'a Store,
    fetcher: Fetcher,
}

impl<'a> ApiRuntime<'a> {
    pub fn new(store: &'a Store, fetcher: Fetcher) -> Self {
        Self { store, fetcher }
    }
}

impl agentdeck_tui::AppRuntime for ApiRuntime<'_> {
    fn login(&mut self, credentials: &Credentials) -> LoginOutcome {
        tracing::info!(?credentials, "submitting login");
        login_outcome(self.fetcher.login(credentials))
    }

    fn fetch_page(&mut self, request: &PageRequest) -> Result<PageResponse> {
        Ok(self.fetcher.fetch_page(request)?)
    }

    fn fetch_agent(&mut self, id: &AgentId) -> Result<Option<UsecaseListItem>> {
        match self.fetcher.fetch_agent(id) {
            Ok(item) => Ok(Some(item)),
            Err(error) if error.is_not_found() => {
                tracing::debug!(id = id.as_str(), "agent not found");
                Ok(None)
            }
            Err(error) => Err(error.into()),
        }
    }

    fn load_filter_options(&mut self) -> Result<FilterOptions> {
        Ok(self.fetcher.filter_options()?)
    }

    fn session_started(&mut self, token: &str, expires_at: Option<i64>) -> Result<()> {
        self.fetcher.set_token(Some(token.to_owned()));
        self.store.save_token(token)?;
        self.store.save_token_expiry(expires_at)
    }

    fn logout(&mut self) -> Result<()> {
        self.fetcher.logout();
        self.store.clear_token()?;
        Ok(())
    }

    fn save_list_query(&mut self, query: &UrlQuery) -> Result<()> {
        self.store.save_last_list_query(query)
    }
}

#[cfg(test)]
mod tests {
    use super::ApiRuntime;
    use agentdeck_api::{Client, Fetcher};
    use agentdeck_app::login::{Credentials, LoginOutcome};
    use agentdeck_app::query::{FilterSet, PageRequest};
    use agentdeck_app::url_state::UrlQuery;
    use agentdeck_store::Store;
    use agentdeck_app::AgentId;
    use agentdeck_testkit::{
        CatalogFaker, MockBackend, MockResponse, item_body, list_body, login_ok_body,
        message_body,
    };
    use agentdeck_tui::AppRuntime;
    use anyhow::Result;
    use std::time::Duration;

    fn fetcher(backend: &MockBackend) -> Result<Fetcher> {
        let client = Client::new(
            &backend.base_url(),
            Some(Duration::from_secs(2)),
            Duration::from_secs(60),
        )?;
        Ok(Fetcher::new(client))
    }

    fn store() -> Result<Store> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        Ok(store)
    }

    #[test]
    fn session_lifecycle_persists_and_clears_token() -> Result<()> {
        let body = list_body(&CatalogFaker::new(3).usecases(2), 2, 1, 10);
        let backend = MockBackend::start(move |request| {
            if request.path().ends_with("/auth/login") {
                MockResponse::ok(login_ok_body("tok-1"))
            } else {
                MockResponse::ok(body.clone())
            }
        })?;
        let store = store()?;
        let mut runtime = ApiRuntime::new(&store, fetcher(&backend)?);

        let outcome = runtime.login(&Credentials {
            email: "ana@example.com".to_owned(),
            password: "pw".to_owned(),
        });
        let LoginOutcome::Success { token, expires_in } = outcome else {
            panic!("login should succeed, got {outcome:?}");
        };
        assert_eq!(expires_in, Some(3600));
        runtime.session_started(&token, Some(1_900_000_000))?;
        assert_eq!(store.load_token()?.as_deref(), Some("tok-1"));
        assert_eq!(store.load_token_expiry()?, Some(1_900_000_000));

        let page = runtime.fetch_page(&PageRequest::offset(1, 10, FilterSet::default()))?;
        assert_eq!(page.items.len(), 2);
        let sent = backend.requests();
        assert_eq!(sent[1].authorization.as_deref(), Some("Bearer tok-1"));

        runtime.logout()?;
        assert_eq!(store.load_token()?, None);
        assert_eq!(store.load_token_expiry()?, None);
        runtime.fetch_page(&PageRequest::offset(1, 10, FilterSet::default()))?;
        let sent = backend.requests();
        assert_eq!(sent.len(), 3, "logout should drop cached pages");
        assert_eq!(sent[2].authorization, None);
        Ok(())
    }

    #[test]
    fn api_errors_surface_through_anyhow() -> Result<()> {
        let backend =
            MockBackend::start(|_| MockResponse::status(503, message_body("maintenance")))?;
        let store = store()?;
        let mut runtime = ApiRuntime::new(&store, fetcher(&backend)?);

        let error = runtime
            .fetch_page(&PageRequest::offset(1, 10, FilterSet::default()))
            .expect_err("503 should fail");
        assert!(format!("{error:#}").contains("server error (503): maintenance"));
        assert!(runtime.load_filter_options().is_err());
        Ok(())
    }

    #[test]
    fn missing_agent_becomes_none_and_other_errors_propagate() -> Result<()> {
        let backend = MockBackend::start(|request| match request.param("id").as_deref() {
            Some("gone") => MockResponse::status(404, message_body("not found")),
            Some("broken") => MockResponse::status(500, message_body("boom")),
            _ => MockResponse::ok(item_body(None)),
        })?;
        let store = store()?;
        let mut runtime = ApiRuntime::new(&store, fetcher(&backend)?);

        assert_eq!(runtime.fetch_agent(&AgentId::new("gone"))?, None);
        assert_eq!(runtime.fetch_agent(&AgentId::new("missing"))?, None);
        let error = runtime
            .fetch_agent(&AgentId::new("broken"))
            .expect_err("500 should fail");
        assert!(format!("{error:#}").contains("boom"));
        Ok(())
    }

    #[test]
    fn list_query_is_saved_to_store() -> Result<()> {
        let backend = MockBackend::start(|_| MockResponse::ok("{}"))?;
        let store = store()?;
        let mut runtime = ApiRuntime::new(&store, fetcher(&backend)?);

        let query = UrlQuery::parse("stage=Prod&page=3");
        runtime.save_list_query(&query)?;
        assert_eq!(store.load_last_list_query()?, query);
        assert_eq!(backend.request_count(), 0);
        Ok(())
    }
}
