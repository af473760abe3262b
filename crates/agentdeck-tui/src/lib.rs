// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use agentdeck_app::detail::{DetailStatus, DetailTicket, partition_resources};
use agentdeck_app::list::{FetchTicket, ListCommand, ListEvent, ListState, ListStatus};
use agentdeck_app::login::{Credentials, LoginField, LoginForm, LoginOutcome};
use agentdeck_app::pagination::PagePill;
use agentdeck_app::query::{PageRequest, PageResponse};
use agentdeck_app::route::Route;
use agentdeck_app::url_state::UrlQuery;
use agentdeck_app::{
    Agent, AgentId, AppCommand, AppEvent, AppState, DetailSection, FilterField, FilterOptions,
    UsecaseListItem, to_ui_stage,
};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::collections::{BTreeSet, VecDeque};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const PAGE_SIZES: [u64; 4] = [6, 10, 20, 50];
const LIST_HEADERS: [&str; 5] = ["Name", "Industry", "Stage", "Technology", "Agents"];
const EMPTY_CELL: &str = "-";

/// Backend and persistence operations the UI needs. The UI thread is the only
/// caller.
pub trait AppRuntime {
    fn login(&mut self, credentials: &Credentials) -> LoginOutcome;
    fn fetch_page(&mut self, request: &PageRequest) -> Result<PageResponse>;
    fn fetch_agent(&mut self, id: &AgentId) -> Result<Option<UsecaseListItem>>;
    fn load_filter_options(&mut self) -> Result<FilterOptions>;
    /// `expires_at` is the server-reported expiry in unix seconds.
    fn session_started(&mut self, token: &str, expires_at: Option<i64>) -> Result<()>;
    fn logout(&mut self) -> Result<()>;
    fn save_list_query(&mut self, query: &UrlQuery) -> Result<()>;

    /// Runs the fetch for `ticket` and reports back on `tx`. The result must
    /// carry the ticket's generation.
    fn spawn_page_fetch(&mut self, ticket: FetchTicket, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self
            .fetch_page(&ticket.request)
            .map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::PageLoaded {
            generation: ticket.generation,
            result,
        })
        .map_err(|_| anyhow::anyhow!("page event channel closed"))?;
        Ok(())
    }

    fn spawn_agent_fetch(&mut self, ticket: DetailTicket, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self
            .fetch_agent(&ticket.id)
            .map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::AgentLoaded {
            generation: ticket.generation,
            result,
        })
        .map_err(|_| anyhow::anyhow!("detail event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    PageLoaded {
        generation: u64,
        result: std::result::Result<PageResponse, String>,
    },
    AgentLoaded {
        generation: u64,
        result: std::result::Result<Option<UsecaseListItem>, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Login,
    List,
    Detail,
}

impl Screen {
    const fn of(route: &Route) -> Self {
        match route {
            Route::Login => Self::Login,
            Route::Agents(_) => Self::List,
            Route::AgentDetail(_) => Self::Detail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterPicker {
    field: FilterField,
    cursor: usize,
    /// Technology is multi-select; the other fields apply the cursor row.
    checked: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    selected_row: usize,
    filter_picker: Option<FilterPicker>,
    search_input: Option<String>,
    options: FilterOptions,
    options_loaded: bool,
    detail_scroll: u16,
    help_visible: bool,
    status_token: u64,
    pending: VecDeque<AppEvent>,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R, initial: Route) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    dispatch(state, &mut view_data, AppCommand::Navigate(initial));

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        // Effects run after the draw so the loading state is on screen while
        // a blocking request is in flight.
        if !view_data.pending.is_empty() {
            drain_effects(state, runtime, &mut view_data, &internal_tx);
            continue;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn dispatch(state: &mut AppState, view_data: &mut ViewData, command: AppCommand) {
    let events = state.dispatch(command);
    view_data.pending.extend(events);
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::PageLoaded { generation, result } => {
                let events = state.list.apply_page(generation, result);
                if events
                    .iter()
                    .any(|event| matches!(event, ListEvent::Loaded { .. }))
                {
                    view_data.selected_row = view_data
                        .selected_row
                        .min(state.list.agents.len().saturating_sub(1));
                }
            }
            InternalEvent::AgentLoaded { generation, result } => {
                state.detail.apply(generation, result);
            }
        }
    }
}

/// Carries out the side effects queued by dispatched commands.
fn drain_effects<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    while let Some(event) = view_data.pending.pop_front() {
        match event {
            AppEvent::List(ListEvent::FetchRequested(ticket)) => {
                if let Err(error) = runtime.spawn_page_fetch(ticket, internal_tx.clone()) {
                    emit_status(state, view_data, internal_tx, format!("fetch failed: {error}"));
                }
            }
            AppEvent::DetailRequested(ticket) => {
                if let Err(error) = runtime.spawn_agent_fetch(ticket, internal_tx.clone()) {
                    emit_status(state, view_data, internal_tx, format!("fetch failed: {error}"));
                }
            }
            AppEvent::LoginRequested(credentials) => {
                let outcome = runtime.login(&credentials);
                dispatch(state, view_data, AppCommand::LoginFinished(outcome));
            }
            AppEvent::LoggedIn { token, expires_at } => {
                if let Err(error) = runtime.session_started(&token, expires_at) {
                    tracing::warn!(error = %format!("{error:#}"), "session not persisted");
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("session not saved: {error}"),
                    );
                }
            }
            AppEvent::LoggedOut | AppEvent::RedirectedToLogin => {
                view_data.filter_picker = None;
                view_data.search_input = None;
                if let Err(error) = runtime.logout() {
                    emit_status(state, view_data, internal_tx, format!("logout failed: {error}"));
                }
            }
            AppEvent::RouteChanged(Route::Agents(query)) => {
                if let Err(error) = runtime.save_list_query(&query) {
                    tracing::warn!(error = %format!("{error:#}"), "list query not persisted");
                }
                ensure_filter_options(runtime, view_data);
            }
            AppEvent::RouteChanged(Route::AgentDetail(_)) => {
                view_data.detail_scroll = 0;
            }
            AppEvent::StatusUpdated(_) => {
                bump_status_token(view_data, internal_tx);
            }
            AppEvent::RouteChanged(Route::Login)
            | AppEvent::List(_)
            | AppEvent::StatusCleared => {}
        }
    }
}

fn ensure_filter_options<R: AppRuntime>(runtime: &mut R, view_data: &mut ViewData) {
    if view_data.options_loaded {
        return;
    }
    match runtime.load_filter_options() {
        Ok(options) => {
            view_data.options = options;
            view_data.options_loaded = true;
        }
        Err(error) => {
            tracing::warn!(error = %format!("{error:#}"), "filter options unavailable");
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn bump_status_token(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    bump_status_token(view_data, internal_tx);
}

/// Returns true when the app should quit.
fn handle_key_event(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    match Screen::of(&state.route) {
        Screen::Login => {
            handle_login_key(state, view_data, key);
            false
        }
        Screen::List => handle_list_key(state, view_data, internal_tx, key),
        Screen::Detail => handle_detail_key(state, view_data, key),
    }
}

fn handle_login_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
            state.login.focus_next();
        }
        KeyCode::Enter => dispatch(state, view_data, AppCommand::SubmitLogin),
        KeyCode::Backspace => state.login.pop_char(),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.login.push_char(ch);
        }
        _ => {}
    }
}

fn handle_list_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if view_data.search_input.is_some() {
        handle_search_key(state, view_data, key);
        return false;
    }
    if view_data.filter_picker.is_some() {
        handle_filter_picker_key(state, view_data, key);
        return false;
    }

    let list = |command: ListCommand| AppCommand::List(command);
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => {
            let last = state.list.agents.len().saturating_sub(1);
            view_data.selected_row = (view_data.selected_row + 1).min(last);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.selected_row = view_data.selected_row.saturating_sub(1);
        }
        KeyCode::Enter => {
            if let Some(agent) = state.list.agents.get(view_data.selected_row) {
                let id = agent.id.clone();
                dispatch(state, view_data, AppCommand::OpenAgent(id));
            }
        }
        KeyCode::Char('n') | KeyCode::Right => {
            dispatch(state, view_data, list(ListCommand::NextPage));
        }
        KeyCode::Char('p') | KeyCode::Left => {
            dispatch(state, view_data, list(ListCommand::PrevPage));
        }
        KeyCode::Char(digit @ '1'..='9') => {
            let page = u64::from(digit.to_digit(10).unwrap_or(1));
            dispatch(state, view_data, list(ListCommand::GoToPage(page)));
        }
        KeyCode::Char('i') => open_filter_picker(state, view_data, FilterField::Industry),
        KeyCode::Char('s') => open_filter_picker(state, view_data, FilterField::Stage),
        KeyCode::Char('t') => open_filter_picker(state, view_data, FilterField::Technology),
        KeyCode::Char('/') => {
            view_data.search_input = Some(state.list.search().to_owned());
        }
        KeyCode::Char('c') => dispatch(state, view_data, list(ListCommand::ClearFilters)),
        KeyCode::Char('r') => dispatch(state, view_data, list(ListCommand::Reload)),
        KeyCode::Char('+') => {
            let size = next_page_size(state.list.pagination.page_size, true);
            dispatch(state, view_data, list(ListCommand::SetPageSize(size)));
        }
        KeyCode::Char('-') => {
            let size = next_page_size(state.list.pagination.page_size, false);
            dispatch(state, view_data, list(ListCommand::SetPageSize(size)));
        }
        KeyCode::Char('m') => {
            if state.list.pagination.is_cursor() {
                dispatch(state, view_data, list(ListCommand::UseOffsetPaging));
            } else if state.list.has_data() {
                dispatch(state, view_data, list(ListCommand::UseCursorPaging));
            } else {
                emit_status(state, view_data, internal_tx, "nothing loaded to page from");
            }
        }
        KeyCode::Char('O') => dispatch(state, view_data, AppCommand::Logout),
        KeyCode::Char('?') => view_data.help_visible = true,
        _ => {}
    }
    false
}

fn handle_search_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    let Some(input) = view_data.search_input.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => view_data.search_input = None,
        KeyCode::Enter => {
            let value = input.trim().to_owned();
            view_data.search_input = None;
            let value = (!value.is_empty()).then_some(value);
            dispatch(
                state,
                view_data,
                AppCommand::List(ListCommand::SetSearch(value)),
            );
        }
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.push(ch),
        _ => {}
    }
}

fn open_filter_picker(state: &AppState, view_data: &mut ViewData, field: FilterField) {
    let options = view_data.options.for_field(field);
    let current = match field {
        FilterField::Industry => state.list.filters.vertical.clone(),
        FilterField::Stage => state.list.filters.stage.clone(),
        FilterField::Technology => None,
    };
    let cursor = current
        .and_then(|value| options.iter().position(|option| option.value == value))
        .unwrap_or(0);
    let checked = match field {
        FilterField::Technology => state.list.filters.tech_entries().into_iter().collect(),
        FilterField::Industry | FilterField::Stage => BTreeSet::new(),
    };
    view_data.filter_picker = Some(FilterPicker {
        field,
        cursor,
        checked,
    });
}

fn handle_filter_picker_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    let Some(picker) = view_data.filter_picker.as_mut() else {
        return;
    };
    let options = view_data.options.for_field(picker.field);
    match key.code {
        KeyCode::Esc => view_data.filter_picker = None,
        KeyCode::Char('j') | KeyCode::Down => {
            picker.cursor = (picker.cursor + 1).min(options.len().saturating_sub(1));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            picker.cursor = picker.cursor.saturating_sub(1);
        }
        KeyCode::Char(' ') if picker.field == FilterField::Technology => {
            let Some(option) = options.get(picker.cursor) else {
                return;
            };
            if option.value.is_empty() {
                picker.checked.clear();
            } else if !picker.checked.remove(&option.value) {
                picker.checked.insert(option.value.clone());
            }
        }
        KeyCode::Enter => {
            let command = picker_command(picker, &view_data.options);
            view_data.filter_picker = None;
            dispatch(state, view_data, AppCommand::List(command));
        }
        _ => {}
    }
}

fn picker_command(picker: &FilterPicker, options: &FilterOptions) -> ListCommand {
    let options = options.for_field(picker.field);
    let highlighted = options
        .get(picker.cursor)
        .map(|option| option.value.clone())
        .filter(|value| !value.is_empty());
    match picker.field {
        FilterField::Industry => ListCommand::SetIndustry(highlighted),
        FilterField::Stage => ListCommand::SetStage(highlighted.map(|code| to_ui_stage(&code))),
        FilterField::Technology if picker.checked.is_empty() => {
            ListCommand::SetTechnology(highlighted)
        }
        FilterField::Technology => {
            // Options order, so the URL does not depend on toggle order.
            let csv = options
                .iter()
                .filter(|option| picker.checked.contains(&option.value))
                .map(|option| option.value.as_str())
                .collect::<Vec<_>>()
                .join(",");
            ListCommand::SetTechnology(Some(csv))
        }
    }
}

fn next_page_size(current: u64, larger: bool) -> u64 {
    if larger {
        PAGE_SIZES
            .iter()
            .copied()
            .find(|size| *size > current)
            .unwrap_or(PAGE_SIZES[0])
    } else {
        PAGE_SIZES
            .iter()
            .rev()
            .copied()
            .find(|size| *size < current)
            .unwrap_or(PAGE_SIZES[PAGE_SIZES.len() - 1])
    }
}

fn handle_detail_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('b' | 'h') => {
            dispatch(state, view_data, AppCommand::BackToList);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.detail_scroll = view_data.detail_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.detail_scroll = view_data.detail_scroll.saturating_sub(1);
        }
        KeyCode::Char('O') => dispatch(state, view_data, AppCommand::Logout),
        KeyCode::Char('?') => view_data.help_visible = true,
        _ => {}
    }
    false
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(state)).block(
        Block::default()
            .title("agentdeck")
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(header, layout[0]);

    match Screen::of(&state.route) {
        Screen::Login => {
            let area = centered_rect(60, 60, layout[1]);
            let login = Paragraph::new(login_text(&state.login))
                .block(Block::default().title("sign in").borders(Borders::ALL));
            frame.render_widget(login, area);
        }
        Screen::List => render_list(frame, layout[1], &state.list, view_data),
        Screen::Detail => {
            let detail = Paragraph::new(detail_text(&state.detail.status))
                .scroll((view_data.detail_scroll, 0))
                .block(Block::default().title("agent").borders(Borders::ALL));
            frame.render_widget(detail, layout[1]);
        }
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(picker) = &view_data.filter_picker {
        let area = centered_rect(50, 60, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(filter_picker_text(picker, &view_data.options)).block(
            Block::default()
                .title(picker.field.label())
                .borders(Borders::ALL),
        );
        frame.render_widget(overlay, area);
    }

    if let Some(input) = &view_data.search_input {
        let area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(format!("{input}_\n\nenter apply | esc cancel"))
            .block(Block::default().title("search").borders(Borders::ALL));
        frame.render_widget(overlay, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_list(frame: &mut ratatui::Frame<'_>, area: Rect, list: &ListState, view_data: &ViewData) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let title = if list.is_loading() {
        "agents (loading)"
    } else {
        "agents"
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    if !list.has_data() {
        let empty = Paragraph::new(empty_list_text(list)).block(block);
        frame.render_widget(empty, parts[0]);
    } else {
        let header = Row::new(LIST_HEADERS.iter().map(|label| {
            Cell::from(*label).style(Style::default().add_modifier(Modifier::BOLD))
        }));
        let rows = list_rows(&list.agents)
            .into_iter()
            .enumerate()
            .map(|(index, cells)| {
                let row = Row::new(cells.into_iter().map(Cell::from));
                if index == view_data.selected_row {
                    row.style(Style::default().fg(Color::Black).bg(Color::Cyan))
                } else {
                    row
                }
            });
        let widths = [
            Constraint::Percentage(30),
            Constraint::Percentage(18),
            Constraint::Percentage(12),
            Constraint::Percentage(30),
            Constraint::Percentage(10),
        ];
        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, parts[0]);
    }

    let pager = Paragraph::new(pager_text(list)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(pager, parts[1]);
}

fn header_text(state: &AppState) -> String {
    match Screen::of(&state.route) {
        Screen::Login => "sign in to browse the agent catalog".to_owned(),
        Screen::List => format!("{} | {}", state.route.path(), filter_summary_text(&state.list)),
        Screen::Detail => state.route.path(),
    }
}

fn list_rows(agents: &[Agent]) -> Vec<[String; 5]> {
    agents
        .iter()
        .map(|agent| {
            [
                agent.name.clone(),
                or_dash(agent.industry.as_deref()),
                or_dash(Some(agent.stage_label().as_str())),
                or_dash(agent.technology.as_deref()),
                agent
                    .agent_count
                    .map(|count| count.to_string())
                    .unwrap_or_else(|| EMPTY_CELL.to_owned()),
            ]
        })
        .collect()
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.trim().is_empty() => value.to_owned(),
        _ => EMPTY_CELL.to_owned(),
    }
}

fn empty_list_text(list: &ListState) -> String {
    match list.status {
        ListStatus::Idle | ListStatus::Loading => "Loading agents...".to_owned(),
        ListStatus::Failed => list.error.clone().unwrap_or_default(),
        ListStatus::Loaded => "No agents match these filters.".to_owned(),
    }
}

fn filter_summary_text(list: &ListState) -> String {
    let mut parts = FilterField::ALL
        .iter()
        .map(|field| {
            let value = list.selected(*field);
            let value = if value.is_empty() { "All" } else { &value };
            format!("{}: {value}", field.label())
        })
        .collect::<Vec<_>>();
    if !list.search().is_empty() {
        parts.push(format!("search: {}", list.search()));
    }
    parts.join(" | ")
}

fn pager_text(list: &ListState) -> String {
    let pagination = &list.pagination;
    let mut text = match &pagination.cursor {
        Some(cursor) => {
            let anchor = cursor.id.as_deref().unwrap_or("start");
            let direction = if cursor.skip < 0 { "before" } else { "after" };
            format!(
                "cursor: {direction} {anchor} | {} per page | n/p move | m offset paging",
                pagination.page_size
            )
        }
        None => {
            let current = pagination.current_page();
            let pills = pagination
                .pills()
                .into_iter()
                .map(|pill| match pill {
                    PagePill::Page(page) if page == current => format!("[{page}]"),
                    pill => pill.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" ");
            format!(
                "{pills} | page {current}/{} | {} total | {} per page",
                pagination.total_pages(),
                pagination.total,
                pagination.page_size
            )
        }
    };
    if let Some(error) = &list.error {
        text = format!("{error} | {text}");
    }
    text
}

fn login_text(form: &LoginForm) -> String {
    let marker = |field: LoginField| if form.focus == field { ">" } else { " " };
    let mut lines = vec![
        format!("{} email:    {}", marker(LoginField::Email), form.email),
        format!(
            "{} password: {}",
            marker(LoginField::Password),
            form.masked_password()
        ),
        String::new(),
    ];
    if form.submitting {
        lines.push("signing in...".to_owned());
    }
    if let Some(error) = &form.error {
        lines.push(error.clone());
    }
    lines.push("tab switch field | enter sign in | ctrl+q quit".to_owned());
    lines.join("\n")
}

fn detail_text(status: &DetailStatus) -> String {
    let agent = match status {
        DetailStatus::Idle => return String::new(),
        DetailStatus::Loading => return "Loading agent...".to_owned(),
        DetailStatus::Failed(message) => return format!("{message}\n\nesc back to list"),
        DetailStatus::Loaded(agent) => agent,
    };

    let mut lines = vec![agent.name.clone()];
    if let Some(description) = &agent.description {
        lines.push(description.clone());
    }
    lines.push(String::new());
    lines.push(format!("industry:   {}", or_dash(agent.industry.as_deref())));
    lines.push(format!(
        "stage:      {}",
        or_dash(Some(agent.stage_label().as_str()))
    ));
    lines.push(format!("technology: {}", or_dash(agent.technology.as_deref())));
    let agents = match agent.agent_count {
        Some(count) if agent.agent_names.is_empty() => count.to_string(),
        Some(count) => format!("{count} ({})", agent.agent_names.join(", ")),
        None => EMPTY_CELL.to_owned(),
    };
    lines.push(format!("agents:     {agents}"));
    if let Some(client) = &agent.client_name {
        match &agent.client_type {
            Some(kind) => lines.push(format!("client:     {client} ({kind})")),
            None => lines.push(format!("client:     {client}")),
        }
    }
    if let Some(poc) = &agent.poc_name {
        match &agent.poc_email {
            Some(email) => lines.push(format!("contact:    {poc} <{email}>")),
            None => lines.push(format!("contact:    {poc}")),
        }
    }

    for (fallback, section) in [
        ("Business challenge", &agent.business_challenge),
        ("Solution overview", &agent.solution_overview),
        ("Benefits", &agent.benefits),
    ] {
        if let Some(section) = section {
            push_section(&mut lines, fallback, section);
        }
    }

    let (videos, documents) = partition_resources(&agent.resources);
    let primary_video = agent
        .video_url
        .as_deref()
        .filter(|url| !url.trim().is_empty());
    if primary_video.is_some() || !videos.is_empty() {
        lines.push(String::new());
        lines.push("Videos".to_owned());
        if let Some(url) = primary_video {
            lines.push(format!("  {url}"));
        }
        for video in videos {
            lines.push(resource_line(&video.description, &video.url));
        }
    }
    if !documents.is_empty() {
        lines.push(String::new());
        lines.push("Documents".to_owned());
        for document in documents {
            lines.push(resource_line(&document.description, &document.url));
        }
    }

    if let Some(updated) = agent.updated_at.as_ref().or(agent.created_at.as_ref()) {
        lines.push(String::new());
        lines.push(format!("updated {updated}"));
    }
    lines.join("\n")
}

fn push_section(lines: &mut Vec<String>, fallback: &str, section: &DetailSection) {
    lines.push(String::new());
    if section.title.is_empty() {
        lines.push(fallback.to_owned());
    } else {
        lines.push(section.title.clone());
    }
    if !section.sub_title.is_empty() {
        lines.push(section.sub_title.clone());
    }
    if let Some(description) = &section.description {
        lines.push(description.clone());
    }
    for point in &section.points {
        match (point.heading.is_empty(), point.description.is_empty()) {
            (false, false) => lines.push(format!("  - {}: {}", point.heading, point.description)),
            (false, true) => lines.push(format!("  - {}", point.heading)),
            (true, false) => lines.push(format!("  - {}", point.description)),
            (true, true) => {}
        }
    }
}

fn resource_line(description: &str, url: &str) -> String {
    if description.trim().is_empty() {
        format!("  {url}")
    } else {
        format!("  {description}: {url}")
    }
}

fn filter_picker_text(picker: &FilterPicker, options: &FilterOptions) -> String {
    let multi = picker.field == FilterField::Technology;
    let mut lines = options
        .for_field(picker.field)
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let cursor = if index == picker.cursor { ">" } else { " " };
            if multi && !option.value.is_empty() {
                let mark = if picker.checked.contains(&option.value) {
                    "x"
                } else {
                    " "
                };
                format!("{cursor} [{mark}] {}", option.label)
            } else {
                format!("{cursor} {}", option.label)
            }
        })
        .collect::<Vec<_>>();
    lines.push(String::new());
    if multi {
        lines.push("space toggle | enter apply | esc cancel".to_owned());
    } else {
        lines.push("enter apply | esc cancel".to_owned());
    }
    lines.join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help | O sign out\n\
sign in: tab switch field | enter submit\n\
list: j/k select | enter open | n/p next/prev page | 1-9 go to page\n\
list: i industry | s stage | t technology | / search | c clear filters\n\
list: +/- page size | m cursor/offset paging | r reload | q quit\n\
picker: j/k move | space toggle (technology) | enter apply | esc cancel\n\
detail: j/k scroll | esc/b back to list"
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible
        || view_data.filter_picker.is_some()
        || view_data.search_input.is_some()
    {
        return String::new();
    }

    let hints = match Screen::of(&state.route) {
        Screen::Login => "tab field | enter sign in | ctrl+q",
        Screen::List => "j/k enter | n/p 1-9 | i/s/t / c | +/- m r | O ? q",
        Screen::Detail => "j/k scroll | esc back | O ? q",
    };
    match &state.status_line {
        Some(status) => format!("{status} | {hints}"),
        None => hints.to_owned(),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, ViewData, detail_text, drain_effects, filter_summary_text,
        handle_key_event, help_overlay_text, list_rows, login_text, next_page_size, pager_text,
        process_internal_events, status_text,
    };
    use agentdeck_app::detail::DetailStatus;
    use agentdeck_app::list::{ListCommand, ListState};
    use agentdeck_app::login::{Credentials, LoginOutcome};
    use agentdeck_app::mapper::map_usecase_item;
    use agentdeck_app::query::{PageRequest, PageResponse};
    use agentdeck_app::route::Route;
    use agentdeck_app::session::{ExpiryDecode, Session};
    use agentdeck_app::url_state::UrlQuery;
    use agentdeck_app::{
        AgentId, AppCommand, AppState, FilterOption, FilterOptions, ResourceLink, UsecaseListItem,
        WirePoint, WireSection,
    };
    use agentdeck_testkit::{CatalogFaker, jwt_with_exp};
    use anyhow::{Result, anyhow};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::collections::VecDeque;
    use std::sync::mpsc::{self, Receiver, Sender};

    const FAR_FUTURE: i64 = 4_102_444_800;

    #[derive(Debug, Default)]
    struct TestRuntime {
        login_result: Option<(String, Option<u64>)>,
        login_calls: Vec<Credentials>,
        pages: VecDeque<std::result::Result<PageResponse, String>>,
        page_requests: Vec<PageRequest>,
        agent: Option<UsecaseListItem>,
        agent_requests: Vec<AgentId>,
        options: Option<FilterOptions>,
        option_loads: usize,
        sessions: Vec<(String, Option<i64>)>,
        logouts: usize,
        saved_queries: Vec<UrlQuery>,
    }

    impl AppRuntime for TestRuntime {
        fn login(&mut self, credentials: &Credentials) -> LoginOutcome {
            self.login_calls.push(credentials.clone());
            match &self.login_result {
                Some((token, expires_in)) => LoginOutcome::Success {
                    token: token.clone(),
                    expires_in: *expires_in,
                },
                None => LoginOutcome::Rejected {
                    message: Some("Invalid credentials".to_owned()),
                },
            }
        }

        fn fetch_page(&mut self, request: &PageRequest) -> Result<PageResponse> {
            self.page_requests.push(request.clone());
            match self.pages.pop_front() {
                Some(Ok(page)) => Ok(page),
                Some(Err(message)) => Err(anyhow!(message)),
                None => Ok(PageResponse::default()),
            }
        }

        fn fetch_agent(&mut self, id: &AgentId) -> Result<Option<UsecaseListItem>> {
            self.agent_requests.push(id.clone());
            Ok(self.agent.clone())
        }

        fn load_filter_options(&mut self) -> Result<FilterOptions> {
            self.option_loads += 1;
            self.options
                .clone()
                .ok_or_else(|| anyhow!("options endpoint down"))
        }

        fn session_started(&mut self, token: &str, expires_at: Option<i64>) -> Result<()> {
            self.sessions.push((token.to_owned(), expires_at));
            Ok(())
        }

        fn logout(&mut self) -> Result<()> {
            self.logouts += 1;
            Ok(())
        }

        fn save_list_query(&mut self, query: &UrlQuery) -> Result<()> {
            self.saved_queries.push(query.clone());
            Ok(())
        }
    }

    struct Harness {
        state: AppState,
        runtime: TestRuntime,
        view_data: ViewData,
        tx: Sender<InternalEvent>,
        rx: Receiver<InternalEvent>,
    }

    impl Harness {
        fn new(state: AppState, runtime: TestRuntime) -> Self {
            let (tx, rx) = mpsc::channel();
            Self {
                state,
                runtime,
                view_data: ViewData::default(),
                tx,
                rx,
            }
        }

        fn signed_in(runtime: TestRuntime) -> Self {
            let session =
                Session::new(ExpiryDecode::FailClosed).with_token(Some(jwt_with_exp(FAR_FUTURE)));
            Self::new(AppState::new(session, ListState::default()), runtime)
        }

        fn command(&mut self, command: AppCommand) {
            let events = self.state.dispatch(command);
            self.view_data.pending.extend(events);
            self.settle();
        }

        fn key(&mut self, code: KeyCode) -> bool {
            let quit = handle_key_event(
                &mut self.state,
                &mut self.view_data,
                &self.tx,
                KeyEvent::new(code, KeyModifiers::NONE),
            );
            self.settle();
            quit
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.key(KeyCode::Char(ch));
            }
        }

        fn settle(&mut self) {
            drain_effects(
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
            );
            process_internal_events(&mut self.state, &mut self.view_data, &self.rx);
        }
    }

    fn page(count: usize, total: u64) -> PageResponse {
        PageResponse {
            items: CatalogFaker::new(7).usecases(count),
            total: Some(total),
            page: Some(1),
            limit: Some(10),
            cursor_id: None,
        }
    }

    fn options() -> FilterOptions {
        let option = |value: &str| FilterOption {
            label: value.to_owned(),
            value: value.to_owned(),
        };
        FilterOptions::from_server(
            vec![option("INS"), option("BFSI")],
            vec![option("Prod"), option("POC")],
            vec![option("Azure OpenAI"), option("LangGraph"), option("UiPath")],
        )
    }

    #[test]
    fn login_round_trip_persists_token_and_loads_list() {
        let token = jwt_with_exp(FAR_FUTURE);
        let runtime = TestRuntime {
            login_result: Some((token.clone(), None)),
            pages: VecDeque::from([Ok(page(3, 3))]),
            options: Some(options()),
            ..TestRuntime::default()
        };
        let mut harness = Harness::new(AppState::default(), runtime);

        harness.type_text("ana@example.com");
        harness.key(KeyCode::Tab);
        harness.type_text("secret");
        harness.key(KeyCode::Enter);

        assert_eq!(harness.runtime.login_calls.len(), 1);
        assert_eq!(harness.runtime.login_calls[0].email, "ana@example.com");
        assert_eq!(harness.runtime.sessions, vec![(token, None)]);
        assert!(matches!(harness.state.route, Route::Agents(_)));
        assert_eq!(harness.state.list.agents.len(), 3);
        assert_eq!(harness.runtime.option_loads, 1);
        assert_eq!(harness.state.status_line.as_deref(), Some("signed in"));
    }

    #[test]
    fn unverifiable_login_token_shows_error_and_is_not_saved() {
        let runtime = TestRuntime {
            login_result: Some(("tok-abc".to_owned(), None)),
            ..TestRuntime::default()
        };
        let mut harness = Harness::new(AppState::default(), runtime);

        harness.type_text("ana@example.com");
        harness.key(KeyCode::Tab);
        harness.type_text("secret");
        harness.key(KeyCode::Enter);

        assert_eq!(harness.runtime.login_calls.len(), 1);
        assert!(harness.runtime.sessions.is_empty());
        assert_eq!(harness.state.route, Route::Login);
        assert_eq!(harness.state.status_line, None);
        assert!(login_text(&harness.state.login).contains("Session token could not be verified."));
    }

    #[test]
    fn opaque_login_token_with_lifetime_is_saved_with_expiry() {
        let runtime = TestRuntime {
            login_result: Some(("tok-abc".to_owned(), Some(3600))),
            ..TestRuntime::default()
        };
        let mut harness = Harness::new(AppState::default(), runtime);

        harness.type_text("ana@example.com");
        harness.key(KeyCode::Tab);
        harness.type_text("secret");
        harness.key(KeyCode::Enter);

        let [(token, expires_at)] = harness.runtime.sessions.as_slice() else {
            panic!("expected one session, got {:?}", harness.runtime.sessions);
        };
        assert_eq!(token, "tok-abc");
        assert!(expires_at.is_some());
        assert!(matches!(harness.state.route, Route::Agents(_)));
    }

    #[test]
    fn blank_login_never_reaches_runtime() {
        let mut harness = Harness::new(AppState::default(), TestRuntime::default());
        harness.key(KeyCode::Enter);
        assert!(harness.runtime.login_calls.is_empty());
        assert!(login_text(&harness.state.login).contains("Email and password are required."));
    }

    #[test]
    fn rejected_login_shows_server_message_and_clears_password() {
        let mut harness = Harness::new(AppState::default(), TestRuntime::default());
        harness.type_text("ana@example.com");
        harness.key(KeyCode::Tab);
        harness.type_text("wrong");
        harness.key(KeyCode::Enter);

        assert_eq!(harness.state.route, Route::Login);
        assert!(harness.state.login.password.is_empty());
        assert!(login_text(&harness.state.login).contains("Invalid credentials"));
        assert!(harness.runtime.sessions.is_empty());
    }

    #[test]
    fn password_is_masked_on_screen() {
        let mut harness = Harness::new(AppState::default(), TestRuntime::default());
        harness.key(KeyCode::Tab);
        harness.type_text("hunter2");
        let text = login_text(&harness.state.login);
        assert!(!text.contains("hunter2"));
        assert!(text.contains("•••••••"));
    }

    #[test]
    fn next_page_key_fetches_second_page_and_saves_query() {
        let runtime = TestRuntime {
            pages: VecDeque::from([Ok(page(10, 25)), Ok(page(10, 25))]),
            ..TestRuntime::default()
        };
        let mut harness = Harness::signed_in(runtime);
        harness.command(AppCommand::Navigate(Route::parse("/agents")));

        harness.key(KeyCode::Char('n'));
        assert_eq!(harness.state.route.path(), "/agents?page=2");
        assert_eq!(harness.runtime.page_requests.len(), 2);
        assert_eq!(
            harness.runtime.saved_queries.last().map(UrlQuery::to_query_string),
            Some("page=2".to_owned())
        );
    }

    #[test]
    fn stale_page_results_do_not_overwrite_newer_ones() {
        let mut harness = Harness::signed_in(TestRuntime::default());
        harness.command(AppCommand::Navigate(Route::parse("/agents")));
        let stale = harness.state.list.generation();
        harness.command(AppCommand::List(ListCommand::Reload));

        harness
            .tx
            .send(InternalEvent::PageLoaded {
                generation: stale,
                result: Ok(page(4, 4)),
            })
            .expect("send page event");
        process_internal_events(&mut harness.state, &mut harness.view_data, &harness.rx);
        assert!(harness.state.list.agents.is_empty());
    }

    #[test]
    fn fetch_failure_keeps_rows_and_reports_error() {
        let runtime = TestRuntime {
            pages: VecDeque::from([Ok(page(2, 2)), Err("connection refused".to_owned())]),
            ..TestRuntime::default()
        };
        let mut harness = Harness::signed_in(runtime);
        harness.command(AppCommand::Navigate(Route::parse("/agents")));
        harness.key(KeyCode::Char('r'));

        assert_eq!(harness.state.list.agents.len(), 2);
        assert!(pager_text(&harness.state.list).starts_with("Could not load agents."));
    }

    #[test]
    fn industry_picker_applies_highlighted_option() {
        let runtime = TestRuntime {
            options: Some(options()),
            ..TestRuntime::default()
        };
        let mut harness = Harness::signed_in(runtime);
        harness.command(AppCommand::Navigate(Route::parse("/agents?search=claims")));

        harness.key(KeyCode::Char('i'));
        harness.key(KeyCode::Down);
        harness.key(KeyCode::Enter);

        assert!(harness.view_data.filter_picker.is_none());
        assert_eq!(harness.state.list.url().get("vertical"), Some("INS"));
        assert_eq!(harness.state.list.url().get("search"), Some("claims"));
    }

    #[test]
    fn stage_picker_stores_wire_code() {
        let runtime = TestRuntime {
            options: Some(options()),
            ..TestRuntime::default()
        };
        let mut harness = Harness::signed_in(runtime);
        harness.command(AppCommand::Navigate(Route::parse("/agents")));

        harness.key(KeyCode::Char('s'));
        harness.key(KeyCode::Down);
        harness.key(KeyCode::Enter);
        assert_eq!(harness.state.list.url().get("stage"), Some("Prod"));
        assert!(filter_summary_text(&harness.state.list).contains("stage: Production"));
    }

    #[test]
    fn technology_picker_joins_checked_options_in_order() {
        let runtime = TestRuntime {
            options: Some(options()),
            ..TestRuntime::default()
        };
        let mut harness = Harness::signed_in(runtime);
        harness.command(AppCommand::Navigate(Route::parse("/agents")));

        harness.key(KeyCode::Char('t'));
        harness.key(KeyCode::Down);
        harness.key(KeyCode::Down);
        harness.key(KeyCode::Down);
        harness.key(KeyCode::Char(' '));
        harness.key(KeyCode::Up);
        harness.key(KeyCode::Up);
        harness.key(KeyCode::Char(' '));
        harness.key(KeyCode::Enter);

        assert_eq!(
            harness.state.list.url().get("techStack"),
            Some("Azure OpenAI,UiPath")
        );
    }

    #[test]
    fn escape_closes_picker_without_fetching() {
        let mut harness = Harness::signed_in(TestRuntime::default());
        harness.command(AppCommand::Navigate(Route::parse("/agents")));
        let fetches = harness.runtime.page_requests.len();

        harness.key(KeyCode::Char('i'));
        assert!(status_text(&harness.state, &harness.view_data).is_empty());
        harness.key(KeyCode::Esc);
        assert!(harness.view_data.filter_picker.is_none());
        assert_eq!(harness.runtime.page_requests.len(), fetches);
    }

    #[test]
    fn missing_filter_options_fall_back_to_stage_table() {
        let mut harness = Harness::signed_in(TestRuntime::default());
        harness.command(AppCommand::Navigate(Route::parse("/agents")));
        assert!(!harness.view_data.options_loaded);
        assert_eq!(harness.view_data.options, FilterOptions::default());

        harness.command(AppCommand::Navigate(Route::parse("/agents?page=1")));
        assert_eq!(harness.runtime.option_loads, 2);
    }

    #[test]
    fn search_input_sets_and_clears_search() {
        let mut harness = Harness::signed_in(TestRuntime::default());
        harness.command(AppCommand::Navigate(Route::parse("/agents")));

        harness.key(KeyCode::Char('/'));
        harness.type_text("claims");
        harness.key(KeyCode::Enter);
        assert_eq!(harness.state.list.url().get("search"), Some("claims"));

        harness.key(KeyCode::Char('/'));
        for _ in 0..6 {
            harness.key(KeyCode::Backspace);
        }
        harness.key(KeyCode::Enter);
        assert_eq!(harness.state.list.url().get("search"), None);
    }

    #[test]
    fn enter_opens_detail_and_escape_restores_list_query() {
        let listed = page(3, 3);
        let target = listed.items[1].clone();
        let runtime = TestRuntime {
            pages: VecDeque::from([Ok(listed.clone()), Ok(listed)]),
            agent: Some(target.clone()),
            ..TestRuntime::default()
        };
        let mut harness = Harness::signed_in(runtime);
        harness.command(AppCommand::Navigate(Route::parse("/agents?vertical=INS")));

        harness.key(KeyCode::Down);
        harness.key(KeyCode::Enter);
        assert_eq!(harness.runtime.agent_requests, vec![target.id.clone()]);
        assert!(matches!(
            harness.state.detail.status,
            DetailStatus::Loaded(_)
        ));

        harness.key(KeyCode::Esc);
        assert_eq!(harness.state.route.path(), "/agents?vertical=INS");
    }

    #[test]
    fn cursor_toggle_continues_after_last_row() {
        let listed = page(3, 30);
        let last = listed.items[2].id.as_str().to_owned();
        let runtime = TestRuntime {
            pages: VecDeque::from([Ok(listed)]),
            ..TestRuntime::default()
        };
        let mut harness = Harness::signed_in(runtime);
        harness.command(AppCommand::Navigate(Route::parse("/agents")));

        harness.key(KeyCode::Char('m'));
        assert_eq!(harness.state.list.url().get("id"), Some(last.as_str()));
        assert!(pager_text(&harness.state.list).starts_with("cursor: after"));

        harness.key(KeyCode::Char('m'));
        assert_eq!(harness.state.list.url().get("id"), None);
    }

    #[test]
    fn logout_key_clears_runtime_session() {
        let mut harness = Harness::signed_in(TestRuntime::default());
        harness.command(AppCommand::Navigate(Route::parse("/agents")));
        harness.key(KeyCode::Char('O'));
        assert_eq!(harness.runtime.logouts, 1);
        assert_eq!(harness.state.route, Route::Login);
    }

    #[test]
    fn quit_keys_stop_the_loop() {
        let mut harness = Harness::signed_in(TestRuntime::default());
        harness.command(AppCommand::Navigate(Route::parse("/agents")));
        assert!(harness.key(KeyCode::Char('q')));

        let mut login = Harness::new(AppState::default(), TestRuntime::default());
        assert!(!login.key(KeyCode::Char('q')));
        assert_eq!(login.state.login.email, "q");
        assert!(handle_key_event(
            &mut login.state,
            &mut login.view_data,
            &login.tx,
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        ));
    }

    #[test]
    fn stale_status_clear_is_ignored() {
        let mut harness = Harness::signed_in(TestRuntime::default());
        harness.command(AppCommand::SetStatus("first".to_owned()));
        harness.command(AppCommand::SetStatus("second".to_owned()));

        harness
            .tx
            .send(InternalEvent::ClearStatus { token: 1 })
            .expect("send clear");
        process_internal_events(&mut harness.state, &mut harness.view_data, &harness.rx);
        assert_eq!(harness.state.status_line.as_deref(), Some("second"));

        harness
            .tx
            .send(InternalEvent::ClearStatus { token: 2 })
            .expect("send clear");
        process_internal_events(&mut harness.state, &mut harness.view_data, &harness.rx);
        assert_eq!(harness.state.status_line, None);
    }

    #[test]
    fn page_size_cycles_through_presets() {
        assert_eq!(next_page_size(10, true), 20);
        assert_eq!(next_page_size(50, true), 6);
        assert_eq!(next_page_size(10, false), 6);
        assert_eq!(next_page_size(6, false), 50);
        assert_eq!(next_page_size(12, false), 10);
    }

    #[test]
    fn pager_brackets_current_page() {
        let mut list = ListState::default();
        list.dispatch(ListCommand::Navigate(UrlQuery::parse("page=5")));
        let generation = list.generation();
        let mut response = page(10, 100);
        response.page = Some(5);
        list.apply_page(generation, Ok::<_, String>(response));

        assert_eq!(
            pager_text(&list),
            "1 … 4 [5] 6 … 10 | page 5/10 | 100 total | 10 per page"
        );
    }

    #[test]
    fn list_rows_fill_blank_cells() {
        let mut item = UsecaseListItem::new("a1");
        item.usecase_name = Some("Claims triage".to_owned());
        item.stage = Some("Prod".to_owned());
        let rows = list_rows(&[map_usecase_item(&item)]);
        assert_eq!(rows[0][0], "Claims triage");
        assert_eq!(rows[0][1], "-");
        assert_eq!(rows[0][2], "Production");
    }

    #[test]
    fn detail_text_renders_sections_and_resources() {
        let mut item = UsecaseListItem::new("a1");
        item.usecase_name = Some("Claims triage".to_owned());
        item.tech_stack = Some(vec!["Azure OpenAI".to_owned(), "LangGraph".to_owned()]);
        item.agent_names = Some(vec!["intake".to_owned(), "review".to_owned()]);
        item.business_challenge = Some(WireSection {
            title: Some("The problem".to_owned()),
            points: Some(vec![WirePoint {
                heading: Some("Backlog".to_owned()),
                description: Some("Weeks of manual review".to_owned()),
            }]),
            ..WireSection::default()
        });
        item.resources = Some(vec![
            ResourceLink {
                url: "https://cdn.example/demo.mp4".to_owned(),
                description: "Demo".to_owned(),
            },
            ResourceLink {
                url: "https://docs.example/brief.pdf".to_owned(),
                description: "Brief".to_owned(),
            },
        ]);
        let agent = map_usecase_item(&item);
        let text = detail_text(&DetailStatus::Loaded(Box::new(agent)));

        assert!(text.starts_with("Claims triage"));
        assert!(text.contains("technology: Azure OpenAI · LangGraph"));
        assert!(text.contains("agents:     2 (intake, review)"));
        assert!(text.contains("The problem\n  - Backlog: Weeks of manual review"));
        assert!(text.contains("Videos\n  Demo: https://cdn.example/demo.mp4"));
        assert!(text.contains("Documents\n  Brief: https://docs.example/brief.pdf"));
    }

    #[test]
    fn detail_failure_offers_back_action() {
        let text = detail_text(&DetailStatus::Failed("Agent not found.".to_owned()));
        assert!(text.starts_with("Agent not found."));
        assert!(text.contains("esc back"));
    }

    #[test]
    fn help_overlay_hides_status_hints() {
        let mut harness = Harness::signed_in(TestRuntime::default());
        harness.command(AppCommand::Navigate(Route::parse("/agents")));
        assert!(status_text(&harness.state, &harness.view_data).contains("n/p"));

        harness.key(KeyCode::Char('?'));
        assert!(status_text(&harness.state, &harness.view_data).is_empty());
        assert!(help_overlay_text().contains("m cursor/offset paging"));

        harness.key(KeyCode::Char('n'));
        assert!(harness.view_data.help_visible);
        harness.key(KeyCode::Esc);
        assert!(!harness.view_data.help_visible);
    }
}
