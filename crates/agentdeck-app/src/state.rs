// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

use crate::detail::{DetailState, DetailTicket};
use crate::ids::AgentId;
use crate::list::{ListCommand, ListEvent, ListState};
use crate::login::{Credentials, LoginForm, LoginOutcome, UNVERIFIED_TOKEN_MESSAGE};
use crate::route::{GuardDecision, Route, guard};
use crate::session::{ExpiryDecode, Session};
use crate::url_state::UrlQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub route: Route,
    pub session: Session,
    pub list: ListState,
    pub detail: DetailState,
    pub login: LoginForm,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Session::new(ExpiryDecode::default()), ListState::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Navigate(Route),
    List(ListCommand),
    OpenAgent(AgentId),
    BackToList,
    SubmitLogin,
    LoginFinished(LoginOutcome),
    Logout,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    RouteChanged(Route),
    RedirectedToLogin,
    List(ListEvent),
    DetailRequested(DetailTicket),
    LoginRequested(Credentials),
    /// `expires_at` is the server-reported expiry in unix seconds.
    LoggedIn {
        token: String,
        expires_at: Option<i64>,
    },
    LoggedOut,
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn new(session: Session, list: ListState) -> Self {
        Self {
            route: Route::Login,
            session,
            list,
            detail: DetailState::default(),
            login: LoginForm::default(),
            status_line: None,
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        self.dispatch_at(command, OffsetDateTime::now_utc())
    }

    /// Like [`AppState::dispatch`] with an explicit clock for the route guard.
    pub fn dispatch_at(&mut self, command: AppCommand, now: OffsetDateTime) -> Vec<AppEvent> {
        match command {
            AppCommand::Navigate(route) => self.navigate(route, now),
            AppCommand::List(command) => {
                let route = Route::Agents(self.list.url().clone());
                if guard(&route, &self.session, now) == GuardDecision::RedirectToLogin {
                    return self.redirect_to_login();
                }
                let mut events = vec![];
                let list_events = self.list.dispatch(command);
                if list_events
                    .iter()
                    .any(|event| matches!(event, ListEvent::UrlChanged(_)))
                {
                    self.route = Route::Agents(self.list.url().clone());
                    events.push(AppEvent::RouteChanged(self.route.clone()));
                }
                events.extend(list_events.into_iter().map(AppEvent::List));
                events
            }
            AppCommand::OpenAgent(id) => self.navigate(Route::AgentDetail(Some(id)), now),
            AppCommand::BackToList => self.navigate(self.detail.back_route(), now),
            AppCommand::SubmitLogin => self
                .login
                .submit()
                .map(AppEvent::LoginRequested)
                .into_iter()
                .collect(),
            AppCommand::LoginFinished(outcome) => {
                let Some((token, expires_in)) = self.login.finish(outcome) else {
                    return Vec::new();
                };
                let expires_at = expires_in.map(|seconds| {
                    now.unix_timestamp()
                        .saturating_add(i64::try_from(seconds).unwrap_or(i64::MAX))
                });
                let mut session = self.session.clone();
                session.set_token(Some(token.clone()));
                let session = session.with_expires_at(expires_at);
                if !session.is_logged_in_at(now) {
                    tracing::warn!(
                        policy = self.session.expiry_decode().as_str(),
                        "login returned a token the route guard would reject"
                    );
                    self.login.error = Some(UNVERIFIED_TOKEN_MESSAGE.to_owned());
                    return Vec::new();
                }

                self.session = session;
                tracing::info!(?expires_at, "signed in");
                let mut events = vec![
                    AppEvent::LoggedIn { token, expires_at },
                    self.set_status("signed in"),
                ];
                events.extend(self.navigate(Route::Agents(self.list.url().clone()), now));
                events
            }
            AppCommand::Logout => {
                self.session.clear();
                self.list = ListState::new(self.list.default_page_size());
                self.detail = DetailState::default();
                self.login = LoginForm::default();
                self.route = Route::Login;
                tracing::info!("signed out");
                vec![
                    AppEvent::LoggedOut,
                    AppEvent::RouteChanged(Route::Login),
                    self.set_status("signed out"),
                ]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    pub fn last_list_query(&self) -> &UrlQuery {
        self.list.url()
    }

    fn navigate(&mut self, route: Route, now: OffsetDateTime) -> Vec<AppEvent> {
        if guard(&route, &self.session, now) == GuardDecision::RedirectToLogin {
            return self.redirect_to_login();
        }

        tracing::info!(path = %route.path(), "navigating");
        self.route = route.clone();
        let mut events = vec![AppEvent::RouteChanged(route.clone())];
        match route {
            Route::Login => {}
            Route::Agents(query) => {
                events.extend(
                    self.list
                        .dispatch(ListCommand::Navigate(query))
                        .into_iter()
                        .filter(|event| !matches!(event, ListEvent::UrlChanged(_)))
                        .map(AppEvent::List),
                );
            }
            Route::AgentDetail(id) => {
                let back = self.list.url().clone();
                events.extend(
                    self.detail
                        .open(id, back)
                        .map(AppEvent::DetailRequested),
                );
            }
        }
        events
    }

    fn redirect_to_login(&mut self) -> Vec<AppEvent> {
        self.session.clear();
        self.route = Route::Login;
        tracing::info!("session missing or expired; redirecting to login");
        vec![
            AppEvent::RedirectedToLogin,
            AppEvent::RouteChanged(Route::Login),
        ]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
