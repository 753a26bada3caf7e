use crate::app::{update, AppMsg, Effect};
use crate::browser::RemoteCollectionBrowser;
use crate::error::ApiError;
use crate::model::{validate_console_config, ConsoleConfig};
use crate::nav::keys::{detail_key, listing_key, remove_key, LOGIN_KEY, UPDATE_USER_KEY};
use crate::services::http::{ApiClient, Fetched};
use crate::services::loader::{self, spawn_call, Call};
use crate::session::{AccountFields, SessionContext};
use crate::theme::Theme;
use crate::widgets::detail_viewer::DetailViewer;
use crate::widgets::form::{self, FormAction, FormState};
use crate::widgets::header::draw_header;
use crate::widgets::search::{handle_search_key, SearchOutcome};
use crate::widgets::status_bar::draw_footer;
use crate::widgets::Widget;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};
use tui_textarea::TextArea;

const CONFIG_FILE: &str = "console.yaml";
const CONFIG_DIR: &str = ".csle";
const TICK_RATE: Duration = Duration::from_millis(200);

#[derive(Default)]
pub(crate) struct AppState {
    pub(crate) config: ConsoleConfig,
    // One browser per configured collection, in tab order
    pub(crate) browsers: Vec<RemoteCollectionBrowser>,
    pub(crate) tab: usize,
    // Tabs whose listing was loaded at least once
    pub(crate) mounted: HashSet<usize>,
    pub(crate) view: View,
    pub(crate) focus: Focus,
    pub(crate) session: SessionContext,
    pub(crate) client: Option<ApiClient>,
    pub(crate) search: TextArea<'static>,
    pub(crate) login_form: FormState,
    pub(crate) account_form: FormState,
    pub(crate) confirm: Option<PendingConfirm>,
    pub(crate) option_cursor: usize,
    pub(crate) key_cursor: usize,
    pub(crate) detail_viewer: DetailViewer,
    // (tab, detail revision) the viewer was built from
    viewer_source: Option<(usize, u64)>,
    pub(crate) toast: Option<Toast>,
    pub(crate) tick: u64,
    pub(crate) loading: HashSet<String>,
    pub(crate) debug_log: VecDeque<String>,
    pub(crate) theme: Theme,
    tx: Option<Sender<LoadMsg>>,
    rx: Option<Receiver<LoadMsg>>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum View {
    #[default]
    Browse,
    Login,
    Account,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    #[default]
    Listing,
    Search,
    Options,
    Detail,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Listing | Focus::Search => Focus::Options,
            Focus::Options => Focus::Detail,
            Focus::Detail => Focus::Listing,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Listing | Focus::Search => Focus::Detail,
            Focus::Options => Focus::Listing,
            Focus::Detail => Focus::Options,
        }
    }
}

/// A destructive action waiting for y/n.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingConfirm {
    Remove { tab: usize, id: String },
    RemoveAll { tab: usize },
}

impl AppState {
    pub(crate) fn with_config(config: ConsoleConfig) -> Self {
        let debounce = Duration::from_millis(config.search_debounce_ms);
        let browsers = config
            .collections
            .iter()
            .cloned()
            .map(|spec| RemoteCollectionBrowser::new(spec, debounce))
            .collect();
        Self {
            browsers,
            config,
            login_form: form::login_form(),
            theme: Theme::console(),
            ..Default::default()
        }
    }

    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg.into());
    }

    fn active(&self) -> Option<&RemoteCollectionBrowser> {
        self.browsers.get(self.tab)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

/// What a finished request was for; carried back with its result.
#[derive(Debug, Clone)]
pub(crate) enum LoadKind {
    Listing { tab: usize, generation: u64 },
    Detail { tab: usize, id: String, generation: u64 },
    Removed { tab: usize },
    Login,
    UserUpdated(AccountFields),
}

pub(crate) struct LoadMsg {
    pub(crate) key: String,
    pub(crate) epoch: u64,
    pub(crate) outcome: Result<Fetched, ApiError>,
    pub(crate) kind: LoadKind,
}

fn loaded_msg(msg: LoadMsg) -> AppMsg {
    let LoadMsg {
        epoch,
        outcome,
        kind,
        ..
    } = msg;
    match kind {
        LoadKind::Listing { tab, generation } => AppMsg::LoadedListing {
            tab,
            generation,
            epoch,
            outcome,
        },
        LoadKind::Detail { tab, id, generation } => AppMsg::LoadedDetail {
            tab,
            id,
            generation,
            epoch,
            outcome,
        },
        LoadKind::Removed { tab } => AppMsg::LoadedRemove {
            tab,
            epoch,
            outcome,
        },
        LoadKind::Login => AppMsg::LoadedLogin { epoch, outcome },
        LoadKind::UserUpdated(fields) => AppMsg::LoadedUserUpdate {
            fields,
            epoch,
            outcome,
        },
    }
}

fn show_toast(state: &mut AppState, text: String, level: ToastLevel, seconds: u64) {
    let ticks = seconds.saturating_mul(5); // ~200ms tick
    let exp = state.tick.saturating_add(ticks);
    state.toast = Some(Toast {
        text,
        level,
        expires_at_tick: exp,
    });
}

/// Start `call` on a worker, tagged with the current session epoch.
fn dispatch(state: &mut AppState, call: Call, key: String, kind: LoadKind) {
    let (Some(client), Some(tx)) = (state.client.clone(), state.tx.clone()) else {
        state.dbg(format!("no client, dropped {key}"));
        return;
    };
    state.dbg(format!("{:?} {} [{key}]", call.method, call.path));
    tracing::debug!(%key, path = %call.path, "dispatch");
    state.loading.insert(key.clone());
    let token = state.session.token().map(str::to_string);
    spawn_call(client, call, token, key, state.session.epoch(), kind, tx);
}

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::FetchListing { tab, generation } => {
                let Some(b) = state.browsers.get(tab) else {
                    continue;
                };
                let key = listing_key(&b.spec().id, generation);
                let call = loader::listing_call(b.spec());
                dispatch(state, call, key, LoadKind::Listing { tab, generation });
            }
            Effect::FetchDetail { tab, id, generation } => {
                let Some(b) = state.browsers.get(tab) else {
                    continue;
                };
                let Some(call) = loader::detail_call(b.spec(), &id) else {
                    continue;
                };
                let key = detail_key(&b.spec().id, &id, generation);
                dispatch(state, call, key, LoadKind::Detail { tab, id, generation });
            }
            Effect::Remove { tab, id } => {
                let Some(b) = state.browsers.get(tab) else {
                    continue;
                };
                let Some(call) = loader::remove_call(b.spec(), &id) else {
                    continue;
                };
                let key = remove_key(&b.spec().id, Some(&id));
                dispatch(state, call, key, LoadKind::Removed { tab });
            }
            Effect::RemoveAll { tab } => {
                let Some(b) = state.browsers.get(tab) else {
                    continue;
                };
                let Some(call) = loader::remove_all_call(b.spec()) else {
                    continue;
                };
                let key = remove_key(&b.spec().id, None);
                dispatch(state, call, key, LoadKind::Removed { tab });
            }
            Effect::Login { username, password } => {
                let call = loader::login_call(&state.config.account, &username, &password);
                dispatch(state, call, LOGIN_KEY.to_string(), LoadKind::Login);
            }
            Effect::UpdateUser { fields } => {
                let Some(data) = state.session.data() else {
                    continue;
                };
                let call = loader::update_user_call(&state.config.account, data, &fields);
                dispatch(
                    state,
                    call,
                    UPDATE_USER_KEY.to_string(),
                    LoadKind::UserUpdated(fields),
                );
            }
            Effect::Export { tab } => {
                let dir = crate::export::export_dir(state.config.export_dir.as_deref());
                let Some(detail) = state.browsers.get(tab).and_then(|b| b.detail()) else {
                    continue;
                };
                match crate::export::export_detail(detail, &dir) {
                    Ok(path) => {
                        state.dbg(format!("exported {}", path.display()));
                        show_toast(
                            state,
                            format!("Exported to {}", path.display()),
                            ToastLevel::Success,
                            3,
                        );
                    }
                    Err(e) => {
                        tracing::warn!(error = %format!("{e:#}"), "export failed");
                        state.dbg(format!("export failed: {e:#}"));
                        show_toast(state, "Export failed".into(), ToastLevel::Error, 3);
                    }
                }
            }
            Effect::CopyDetail { tab } => {
                let Some(detail) = state.browsers.get(tab).and_then(|b| b.detail()) else {
                    continue;
                };
                match crate::export::copy_detail(detail) {
                    Ok(()) => show_toast(
                        state,
                        "Copied detail to clipboard".into(),
                        ToastLevel::Success,
                        2,
                    ),
                    Err(e) => {
                        state.dbg(format!("clipboard: {e:#}"));
                        show_toast(state, "Clipboard unavailable".into(), ToastLevel::Error, 2);
                    }
                }
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => show_toast(state, text, level, seconds),
        }
    }
}

fn pump_loads(state: &mut AppState) {
    let mut drained: Vec<LoadMsg> = Vec::new();
    if let Some(rx) = &state.rx {
        while let Ok(msg) = rx.try_recv() {
            drained.push(msg);
        }
    }
    for msg in drained {
        state.loading.remove(&msg.key);
        let effects = update(state, loaded_msg(msg));
        run_effects(state, effects);
    }
}

fn send(state: &mut AppState, msg: AppMsg) {
    let effects = update(state, msg);
    run_effects(state, effects);
}

pub fn run() -> Result<()> {
    let log_file = crate::logging::init()?;
    let (cfg, source) = load_config()?;
    let client = ApiClient::new(&cfg.server, Duration::from_secs(cfg.timeout_secs))
        .context("building HTTP client")?;
    tracing::info!(server = %client.base_url(), collections = cfg.collections.len(), "starting console");
    let mut state = AppState::with_config(cfg);
    state.client = Some(client);
    match &source {
        Some(p) => state.dbg(format!("config: {}", p.display())),
        None => state.dbg("config: built-in defaults"),
    }
    state.dbg(format!("log: {}", log_file.display()));
    let (tx, rx) = mpsc::channel::<LoadMsg>();
    state.tx = Some(tx);
    state.rx = Some(rx);

    let headless = std::env::var("CSLE_CONSOLE_HEADLESS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false);
    if headless {
        return run_headless(state);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = event_loop(&mut terminal, &mut state);
    // Restore
    disable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

/// Drive the app against an in-memory terminal for a fixed number of ticks.
fn run_headless(mut state: AppState) -> Result<()> {
    let ticks: u64 = std::env::var("CSLE_CONSOLE_TICKS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);
    let summary = std::env::var("CSLE_CONSOLE_SMOKE_SUMMARY")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false);
    let backend = ratatui::backend::TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend)?;
    send(&mut state, AppMsg::Mount);
    for _ in 0..ticks {
        terminal.draw(|f| ui(f, &mut state))?;
        pump_loads(&mut state);
        send(&mut state, AppMsg::Tick(Instant::now()));
        state.tick = state.tick.wrapping_add(1);
        std::thread::sleep(TICK_RATE);
    }
    if summary {
        let view = match state.view {
            View::Browse => "Browse",
            View::Login => "Login",
            View::Account => "Account",
        };
        let active = state.active();
        let out = serde_json::json!({
            "view": view,
            "collection": active.map(|b| b.spec().id.clone()),
            "entries": active.map(|b| b.entries().len()),
            "selected": active.and_then(|b| b.selected_id().map(str::to_string)),
            "detail_loaded": active.is_some_and(|b| b.detail().is_some()),
            "logged_in": state.session.is_active(),
            "pending": state.loading.len(),
        });
        println!("{out}");
    }
    Ok(())
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, state: &mut AppState) -> Result<()> {
    send(state, AppMsg::Mount);
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui(f, state))?;
        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(state, key) {
                    return Ok(());
                }
            }
        }
        pump_loads(state);
        send(state, AppMsg::Tick(Instant::now()));
        if last_tick.elapsed() >= TICK_RATE {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    }
}

/// Route a key press. Returns true when the app should quit.
pub(crate) fn handle_key(state: &mut AppState, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    match state.view {
        View::Login => {
            match form::handle_form_key(&mut state.login_form, key.code) {
                FormAction::Submit => {
                    let username = form::value(&state.login_form, "username").trim().to_string();
                    let password = form::value(&state.login_form, "password").to_string();
                    send(state, AppMsg::SubmitLogin { username, password });
                }
                FormAction::Cancel => send(state, AppMsg::CloseForm),
                FormAction::None => {}
            }
            return false;
        }
        View::Account => {
            match form::handle_form_key(&mut state.account_form, key.code) {
                FormAction::Submit => {
                    let fields = form::account_fields(&state.account_form);
                    send(state, AppMsg::SubmitAccount(fields));
                }
                FormAction::Cancel => send(state, AppMsg::CloseForm),
                FormAction::None => {}
            }
            return false;
        }
        View::Browse => {}
    }

    if state.confirm.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => send(state, AppMsg::Confirm),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                send(state, AppMsg::CancelConfirm)
            }
            _ => {}
        }
        return false;
    }

    if state.focus == Focus::Search {
        match handle_search_key(&mut state.search, key.code, key.modifiers) {
            SearchOutcome::Edited(text) => send(
                state,
                AppMsg::SearchInput {
                    text,
                    now: Instant::now(),
                },
            ),
            SearchOutcome::Submit(text) => {
                state.focus = Focus::Listing;
                send(state, AppMsg::SearchFire(text));
            }
            SearchOutcome::Close => state.focus = Focus::Listing,
            SearchOutcome::Ignored => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::F(n) if n >= 1 && (n as usize) <= state.browsers.len() => {
            send(state, AppMsg::SwitchTab(n as usize - 1));
        }
        KeyCode::Char(']') => {
            let n = state.browsers.len().max(1);
            let tab = (state.tab + 1) % n;
            send(state, AppMsg::SwitchTab(tab));
        }
        KeyCode::Char('[') => {
            let n = state.browsers.len().max(1);
            let tab = (state.tab + n - 1) % n;
            send(state, AppMsg::SwitchTab(tab));
        }
        KeyCode::Tab => state.focus = state.focus.next(),
        KeyCode::BackTab => state.focus = state.focus.prev(),
        KeyCode::Char('/') => state.focus = Focus::Search,
        KeyCode::Char('r') => send(state, AppMsg::Refresh),
        KeyCode::Char('d') => send(state, AppMsg::RequestRemove),
        KeyCode::Char('D') => send(state, AppMsg::RequestRemoveAll),
        KeyCode::Char('e') => send(state, AppMsg::Export),
        KeyCode::Char('c') => send(state, AppMsg::CopyDetail),
        KeyCode::Char('a') => send(state, AppMsg::OpenAccount),
        KeyCode::Char('l') => send(state, AppMsg::OpenLogin),
        KeyCode::Char('L') => send(state, AppMsg::Logout),
        code => match state.focus {
            Focus::Listing => listing_key_press(state, code),
            Focus::Options => options_key_press(state, code),
            Focus::Detail => {
                let effects = state.detail_viewer.on_key(code);
                run_effects(state, effects);
            }
            Focus::Search => {}
        },
    }
    false
}

fn listing_key_press(state: &mut AppState, code: KeyCode) {
    let len = state.active().map(|b| b.visible_entries().len()).unwrap_or(0) as isize;
    let delta = match code {
        KeyCode::Up | KeyCode::Char('k') => -1,
        KeyCode::Down | KeyCode::Char('j') => 1,
        KeyCode::PageUp => -10,
        KeyCode::PageDown => 10,
        KeyCode::Home => -len,
        KeyCode::End => len,
        KeyCode::Enter | KeyCode::Right => {
            state.focus = Focus::Detail;
            return;
        }
        _ => return,
    };
    send(state, AppMsg::MoveSelection(delta));
}

fn options_key_press(state: &mut AppState, code: KeyCode) {
    let Some(b) = state.active() else {
        return;
    };
    let options = &b.derivation().options;
    if options.is_empty() {
        return;
    }
    let row = state.option_cursor.min(options.len() - 1);
    let opt = &options[row];
    let (name, multi, count) = (opt.name.clone(), opt.multi, opt.options.len());
    let key_at_cursor = opt.options.get(state.key_cursor).cloned();
    let rows = options.len();
    match code {
        KeyCode::Up | KeyCode::Char('k') => {
            state.option_cursor = row.saturating_sub(1);
            state.key_cursor = 0;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.option_cursor = (row + 1).min(rows - 1);
            state.key_cursor = 0;
        }
        KeyCode::Left if multi => {
            state.key_cursor = state.key_cursor.saturating_sub(1);
        }
        KeyCode::Right if multi => {
            state.key_cursor = (state.key_cursor + 1).min(count.saturating_sub(1));
        }
        KeyCode::Left => {
            send(state, AppMsg::CycleOption { name, delta: -1 });
        }
        KeyCode::Right => {
            send(state, AppMsg::CycleOption { name, delta: 1 });
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(key) = key_at_cursor {
                send(state, AppMsg::ToggleOptionKey { name, key });
            }
        }
        _ => {}
    }
}

/// First `console.yaml` found from `cwd`: the directory itself, its `.csle`,
/// every ancestor's `.csle`, then `~/.csle`.
pub(crate) fn discover_config(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    let candidates = [
        cwd.join(CONFIG_FILE),
        cwd.join(CONFIG_DIR).join(CONFIG_FILE),
    ];
    if let Some(p) = candidates.into_iter().find(|p| p.exists()) {
        return Some(p);
    }
    let mut cur = cwd;
    while let Some(parent) = cur.parent() {
        let p = parent.join(CONFIG_DIR).join(CONFIG_FILE);
        if p.exists() {
            return Some(p);
        }
        cur = parent;
    }
    let p = home?.join(CONFIG_DIR).join(CONFIG_FILE);
    p.exists().then_some(p)
}

pub(crate) fn read_config(path: &Path) -> Result<ConsoleConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    let cfg: ConsoleConfig =
        serde_yaml::from_str(&s).with_context(|| format!("parsing {path:?}"))?;
    Ok(cfg)
}

fn load_config() -> Result<(ConsoleConfig, Option<PathBuf>)> {
    let source = match std::env::var("CSLE_CONSOLE_CONFIG_DIR") {
        Ok(base) => Some(PathBuf::from(base).join(CONFIG_FILE)),
        Err(_) => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            let home = std::env::var("HOME")
                .ok()
                .or_else(|| std::env::var("USERPROFILE").ok())
                .map(PathBuf::from);
            discover_config(&cwd, home.as_deref())
        }
    };
    let mut cfg = match &source {
        Some(p) => read_config(p)?,
        None => ConsoleConfig::default(),
    };
    if let Ok(server) = std::env::var("CSLE_CONSOLE_SERVER") {
        if !server.trim().is_empty() {
            cfg.server = server;
        }
    }
    validate_console_config(&cfg).map_err(|e| anyhow::anyhow!("invalid config: {e}"))?;
    Ok((cfg, source))
}

/// Rebuild the detail viewer when the active detail changed.
fn sync_detail_viewer(state: &mut AppState) {
    let Some(b) = state.browsers.get(state.tab) else {
        return;
    };
    let source = (state.tab, b.revision());
    if state.viewer_source == Some(source) {
        return;
    }
    state.detail_viewer = match b.detail() {
        Some(d) => DetailViewer::for_detail(d, &b.derivation().warnings, &state.theme),
        None => DetailViewer::empty(&state.theme),
    };
    state.viewer_source = Some(source);
}

fn help_text(state: &AppState) -> &'static str {
    match (state.view, state.focus) {
        (View::Login, _) | (View::Account, _) => {
            "↑/↓ field  Enter edit/submit  Esc cancel  Ctrl+C quit"
        }
        (_, Focus::Search) => "type to filter  Enter apply  Esc close",
        (_, Focus::Options) => "↑/↓ option  ←/→ key  Space toggle  Tab focus  q quit",
        (_, Focus::Detail) => "↑/↓ PgUp/PgDn scroll  w wrap  Tab focus  q quit",
        _ => "↑/↓ select  / search  r refresh  d remove  D remove all  e export  c copy  a account  L logout  q quit",
    }
}

pub(crate) fn ui(f: &mut Frame, state: &mut AppState) {
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }
    sync_detail_viewer(state);

    let screen = f.area();
    let bg = Block::default().style(Style::default().bg(state.theme.background));
    f.render_widget(bg, screen);

    const DEBUG_H: u16 = 4;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(DEBUG_H),
            Constraint::Length(1),
        ])
        .split(screen);

    draw_header(f, chunks[0], state);
    crate::widgets::horizontal_menu::draw_collection_tabs(f, chunks[1], state);
    match state.view {
        View::Browse => draw_browse(f, chunks[2], state),
        View::Login => draw_centered_form(f, chunks[2], &state.login_form, state.tick, &state.theme),
        View::Account => draw_centered_form(f, chunks[2], &state.account_form, state.tick, &state.theme),
    }
    draw_debug(f, chunks[3], state);
    draw_footer(f, chunks[4], state, help_text(state));
}

fn draw_browse(f: &mut Frame, area: Rect, state: &mut AppState) {
    let Some(b) = state.browsers.get(state.tab) else {
        let p = Paragraph::new("No collections configured")
            .block(crate::widgets::chrome::panel("Console", true, &state.theme));
        f.render_widget(p, area);
        return;
    };
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(cols[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(crate::widgets::options_bar::options_height(b)),
            Constraint::Min(0),
        ])
        .split(cols[1]);

    crate::widgets::listing::draw_listing(
        f,
        left[1],
        b,
        state.focus == Focus::Listing,
        &state.theme,
        state.tick,
    );
    crate::widgets::options_bar::draw_options_bar(
        f,
        right[0],
        b,
        state.option_cursor,
        state.key_cursor,
        state.focus == Focus::Options,
        &state.theme,
    );
    let focused = state.focus == Focus::Search;
    crate::widgets::search::draw_search(f, left[0], &mut state.search, focused, &state.theme);
    let focused = state.focus == Focus::Detail;
    state.detail_viewer.render(f, right[1], focused, state.tick);
}

fn draw_centered_form(f: &mut Frame, area: Rect, form: &FormState, tick: u64, theme: &Theme) {
    let w = area.width.min(60);
    let h = area.height.min((form.fields.len() as u16) * 2 + 6);
    let rect = Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    };
    f.render_widget(Clear, rect);
    form::draw_form(f, rect, form, (tick / 3) % 2 == 0, theme);
}

fn draw_debug(f: &mut Frame, area: Rect, state: &AppState) {
    let b = Block::default()
        .borders(Borders::TOP)
        .border_style(state.theme.border(false))
        .title(Span::styled("Debug", state.theme.muted().add_modifier(Modifier::BOLD)));
    // Take last `area.height` lines
    let h = area.height.saturating_sub(1) as usize;
    let total = state.debug_log.len();
    let start = total.saturating_sub(h);
    let lines: Vec<Line> = state
        .debug_log
        .iter()
        .skip(start)
        .map(|s| Line::raw(s.clone()))
        .collect();
    let p = Paragraph::new(lines)
        .style(state.theme.muted())
        .block(b)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}
