use crate::browser::Request;
use crate::error::ApiError;
use crate::model::DetailObject;
use crate::services::http::Fetched;
use crate::session::{AccountFields, SessionData};
use crate::ui::{AppState, PendingConfirm, ToastLevel, View};
use crate::widgets::search::search_box;
use std::time::Instant;

pub enum AppMsg {
    Mount,
    SwitchTab(usize),
    Refresh,
    MoveSelection(isize),
    Select(String),
    SearchInput {
        text: String,
        now: Instant,
    },
    SearchFire(String),
    Tick(Instant),
    RequestRemove,
    RequestRemoveAll,
    Confirm,
    CancelConfirm,
    CycleOption {
        name: String,
        delta: isize,
    },
    ToggleOptionKey {
        name: String,
        key: String,
    },
    Export,
    CopyDetail,
    OpenLogin,
    OpenAccount,
    CloseForm,
    SubmitLogin {
        username: String,
        password: String,
    },
    SubmitAccount(AccountFields),
    Logout,
    LoadedListing {
        tab: usize,
        generation: u64,
        epoch: u64,
        outcome: Result<Fetched, ApiError>,
    },
    LoadedDetail {
        tab: usize,
        id: String,
        generation: u64,
        epoch: u64,
        outcome: Result<Fetched, ApiError>,
    },
    LoadedRemove {
        tab: usize,
        epoch: u64,
        outcome: Result<Fetched, ApiError>,
    },
    LoadedLogin {
        epoch: u64,
        outcome: Result<Fetched, ApiError>,
    },
    LoadedUserUpdate {
        fields: AccountFields,
        epoch: u64,
        outcome: Result<Fetched, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchListing {
        tab: usize,
        generation: u64,
    },
    FetchDetail {
        tab: usize,
        id: String,
        generation: u64,
    },
    Remove {
        tab: usize,
        id: String,
    },
    RemoveAll {
        tab: usize,
    },
    Login {
        username: String,
        password: String,
    },
    UpdateUser {
        fields: AccountFields,
    },
    Export {
        tab: usize,
    },
    CopyDetail {
        tab: usize,
    },
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
}

fn toast(text: impl Into<String>, level: ToastLevel, seconds: u64) -> Effect {
    Effect::ShowToast {
        text: text.into(),
        level,
        seconds,
    }
}

pub(crate) fn request_effects(tab: usize, reqs: impl IntoIterator<Item = Request>) -> Vec<Effect> {
    reqs.into_iter()
        .map(|r| match r {
            Request::Listing { generation } => Effect::FetchListing { tab, generation },
            Request::Detail { id, generation } => Effect::FetchDetail { tab, id, generation },
            Request::Remove { id } => Effect::Remove { tab, id },
            Request::RemoveAll => Effect::RemoveAll { tab },
        })
        .collect()
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        Mount => {
            let tab = state.tab;
            effects.extend(switch_tab(state, tab));
        }
        SwitchTab(tab) => {
            effects.extend(switch_tab(state, tab));
        }
        Refresh => {
            let tab = state.tab;
            if let Some(b) = state.browsers.get_mut(tab) {
                let req = b.refresh();
                effects.extend(request_effects(tab, [req]));
                state.search = Default::default();
                state.confirm = None;
                state.dbg(format!("refresh {}", state.browsers[tab].spec().id));
            }
        }
        MoveSelection(delta) => {
            let tab = state.tab;
            if let Some(b) = state.browsers.get_mut(tab) {
                effects.extend(request_effects(tab, b.move_selection(delta)));
            }
        }
        Select(id) => {
            let tab = state.tab;
            if let Some(b) = state.browsers.get_mut(tab) {
                effects.extend(request_effects(tab, b.select(&id)));
            }
        }
        SearchInput { text, now } => {
            if let Some(b) = state.browsers.get_mut(state.tab) {
                if let Some(ticket) = b.debouncer.schedule(text, now) {
                    state.dbg(format!("search #{ticket} superseded"));
                }
            }
        }
        SearchFire(text) => {
            let tab = state.tab;
            if let Some(b) = state.browsers.get_mut(tab) {
                b.debouncer.cancel();
                effects.extend(request_effects(tab, b.filter(&text)));
            }
        }
        Tick(now) => {
            for (tab, b) in state.browsers.iter_mut().enumerate() {
                if let Some(due) = b.debouncer.poll(now) {
                    effects.extend(request_effects(tab, b.filter(&due.text)));
                }
            }
        }
        RequestRemove => {
            let tab = state.tab;
            let target = state.browsers.get(tab).and_then(|b| {
                b.spec().remove.as_ref()?;
                b.selected_id().map(str::to_string)
            });
            match target {
                Some(id) => {
                    effects.push(toast(
                        format!("Remove {id}? Press y to confirm, n to cancel"),
                        ToastLevel::Info,
                        10,
                    ));
                    state.confirm = Some(PendingConfirm::Remove { tab, id });
                }
                None => effects.push(toast("Nothing to remove", ToastLevel::Info, 2)),
            }
        }
        RequestRemoveAll => {
            let tab = state.tab;
            let supported = state
                .browsers
                .get(tab)
                .is_some_and(|b| b.spec().remove_all.is_some());
            if supported {
                let title = state.browsers[tab].spec().title.clone();
                effects.push(toast(
                    format!("Remove ALL {title}? Press y to confirm, n to cancel"),
                    ToastLevel::Info,
                    10,
                ));
                state.confirm = Some(PendingConfirm::RemoveAll { tab });
            } else {
                effects.push(toast("Remove all is not supported here", ToastLevel::Info, 2));
            }
        }
        Confirm => match state.confirm.take() {
            Some(PendingConfirm::Remove { tab, id }) => {
                if let Some(b) = state.browsers.get_mut(tab) {
                    effects.extend(request_effects(tab, b.remove(&id)));
                    state.search = Default::default();
                }
            }
            Some(PendingConfirm::RemoveAll { tab }) => {
                if let Some(b) = state.browsers.get_mut(tab) {
                    effects.extend(request_effects(tab, b.remove_all()));
                    state.search = Default::default();
                }
            }
            None => {}
        },
        CancelConfirm => {
            if state.confirm.take().is_some() {
                effects.push(toast("Cancelled", ToastLevel::Info, 2));
            }
        }
        CycleOption { name, delta } => {
            if let Some(b) = state.browsers.get_mut(state.tab) {
                if let Err(e) = b.cycle_option(&name, delta) {
                    state.dbg(format!("option {name}: {e}"));
                }
            }
        }
        ToggleOptionKey { name, key } => {
            if let Some(b) = state.browsers.get_mut(state.tab) {
                match b.toggle_option_key(&name, &key) {
                    Ok(()) => {
                        let sel = b
                            .option(&name)
                            .map(|o| o.selected.join(", "))
                            .unwrap_or_default();
                        state.dbg(format!("{name} = [{sel}]"));
                    }
                    Err(e) => state.dbg(format!("option {name}: {e}")),
                }
            }
        }
        Export => {
            let tab = state.tab;
            if active_detail(state).is_some() {
                effects.push(Effect::Export { tab });
            } else {
                effects.push(toast("Nothing to export", ToastLevel::Info, 2));
            }
        }
        CopyDetail => {
            let tab = state.tab;
            if active_detail(state).is_some() {
                effects.push(Effect::CopyDetail { tab });
            }
        }
        OpenLogin => {
            state.login_form = crate::widgets::form::login_form();
            state.view = View::Login;
        }
        OpenAccount => match state.session.data() {
            Some(data) => {
                state.account_form = crate::widgets::form::account_form(data);
                state.view = View::Account;
            }
            None => {
                state.login_form = crate::widgets::form::login_form();
                state.view = View::Login;
            }
        },
        CloseForm => {
            state.view = View::Browse;
        }
        SubmitLogin { username, password } => {
            if username.trim().is_empty() || password.is_empty() {
                state.login_form.message = Some("Username or password cannot be empty".into());
                effects.push(toast(
                    "Username or password cannot be empty",
                    ToastLevel::Error,
                    3,
                ));
            } else {
                state.login_form.message = Some("Logging in...".into());
                state.login_form.disabled = true;
                effects.push(Effect::Login { username, password });
            }
        }
        SubmitAccount(fields) => {
            if let Err(e) = fields.validate() {
                state.account_form.message = Some(e.clone());
                effects.push(toast(e, ToastLevel::Error, 3));
            } else if !state.session.is_active() {
                effects.extend(force_login(state));
            } else {
                state.account_form.message = Some("Saving...".into());
                state.account_form.disabled = true;
                effects.push(Effect::UpdateUser { fields });
            }
        }
        Logout => {
            let user = state
                .session
                .data()
                .map(|d| d.username.clone())
                .unwrap_or_default();
            state.session.invalidate();
            tracing::info!(%user, "logged out");
            state.dbg(format!("logout {user}"));
            state.login_form = crate::widgets::form::login_form();
            state.view = View::Login;
            effects.push(toast("Logged out", ToastLevel::Info, 2));
        }
        LoadedListing {
            tab,
            generation,
            epoch,
            outcome,
        } => {
            let Some(b) = state.browsers.get_mut(tab) else {
                return effects;
            };
            match outcome {
                Ok(fetched) => {
                    if let Some(reqs) = b.apply_listing(generation, &fetched.value) {
                        let n = b.entries().len();
                        let id = b.spec().id.clone();
                        effects.extend(request_effects(tab, reqs));
                        state.dbg(format!("listing {id}: {n} entries"));
                    }
                }
                Err(e) => {
                    b.fail_listing(generation);
                    effects.extend(on_api_error(state, epoch, &e, "listing"));
                }
            }
        }
        LoadedDetail {
            tab,
            id,
            generation,
            epoch,
            outcome,
        } => {
            let Some(b) = state.browsers.get_mut(tab) else {
                return effects;
            };
            match outcome {
                Ok(fetched) => {
                    let detail = DetailObject {
                        id: id.clone(),
                        value: fetched.value,
                        raw: fetched.raw,
                    };
                    if b.apply_detail(generation, detail) {
                        let warnings = b.derivation().warnings.clone();
                        state.dbg(format!("detail {id} loaded"));
                        for w in warnings {
                            state.dbg(format!("schema: {w}"));
                        }
                    }
                }
                Err(e) => {
                    b.fail_detail(generation);
                    effects.extend(on_api_error(state, epoch, &e, "detail"));
                }
            }
        }
        LoadedRemove {
            tab,
            epoch,
            outcome,
        } => {
            let unauthorized = matches!(&outcome, Err(e) if e.is_unauthorized());
            match &outcome {
                Ok(_) => effects.push(toast("Removed", ToastLevel::Success, 2)),
                Err(e) => effects.extend(on_api_error(state, epoch, e, "remove")),
            }
            if let Some(b) = state.browsers.get_mut(tab) {
                if unauthorized {
                    b.loading_listing = false;
                } else {
                    let req = b.after_remove();
                    effects.extend(request_effects(tab, [req]));
                }
            }
        }
        LoadedLogin { epoch, outcome } => {
            state.login_form.disabled = false;
            if epoch != state.session.epoch() {
                state.dbg("login result from a replaced session ignored");
                return effects;
            }
            match outcome.and_then(|f| {
                serde_json::from_value::<SessionData>(f.value)
                    .map_err(|e| ApiError::Parse(e.to_string()))
            }) {
                Ok(data) => {
                    tracing::info!(user = %data.username, "logged in");
                    state.dbg(format!("login {}", data.username));
                    effects.push(toast(
                        format!("Logged in as {}", data.username),
                        ToastLevel::Success,
                        2,
                    ));
                    state.session.install(data);
                    state.login_form = crate::widgets::form::login_form();
                    state.view = View::Browse;
                    effects.extend(reload_all(state));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "login failed");
                    state.dbg(format!("login failed: {e}"));
                    let text = if e.is_unauthorized() {
                        "Invalid username or password".to_string()
                    } else {
                        format!("Login failed: {}", e.notice())
                    };
                    state.login_form.message = Some(text.clone());
                    effects.push(toast(text, ToastLevel::Error, 3));
                }
            }
        }
        LoadedUserUpdate {
            fields,
            epoch,
            outcome,
        } => {
            state.account_form.disabled = false;
            match outcome {
                Ok(_) => {
                    if epoch == state.session.epoch() && state.session.merge_profile(&fields) {
                        if let Some(data) = state.session.data() {
                            state.account_form = crate::widgets::form::account_form(data);
                        }
                        state.account_form.message = Some("User updated".into());
                        effects.push(toast("User updated", ToastLevel::Success, 2));
                    }
                }
                Err(e) if e.is_bad_request() => {
                    state.dbg(format!("user update rejected: {e}"));
                    state.account_form.message =
                        Some("Invalid request, could not update user".into());
                    effects.push(toast(
                        "Invalid request, could not update user",
                        ToastLevel::Error,
                        3,
                    ));
                }
                Err(e) => {
                    state.account_form.message = Some(e.notice());
                    effects.extend(on_api_error(state, epoch, &e, "user update"));
                }
            }
        }
    }
    effects
}

fn active_detail(state: &AppState) -> Option<&DetailObject> {
    state.browsers.get(state.tab).and_then(|b| b.detail())
}

fn switch_tab(state: &mut AppState, tab: usize) -> Vec<Effect> {
    let Some(b) = state.browsers.get_mut(tab) else {
        return Vec::new();
    };
    // The box shows what this tab filters by, or what it is about to
    let text = b
        .debouncer
        .pending()
        .map(|p| p.text.clone())
        .unwrap_or_else(|| b.search_text().to_string());
    state.search = search_box(&text);
    state.tab = tab;
    state.option_cursor = 0;
    state.key_cursor = 0;
    state.confirm = None;
    if !state.mounted.insert(tab) {
        return Vec::new();
    }
    let req = b.load_listing();
    let id = b.spec().id.clone();
    state.dbg(format!("mount {id}"));
    request_effects(tab, [req])
}

/// Reset every collection and reload the visible one; others reload when shown.
fn reload_all(state: &mut AppState) -> Vec<Effect> {
    for b in &mut state.browsers {
        b.reset();
    }
    state.mounted.clear();
    let tab = state.tab;
    switch_tab(state, tab)
}

/// Drop the session and show the login form.
fn force_login(state: &mut AppState) -> Vec<Effect> {
    state.session.invalidate();
    state.confirm = None;
    state.login_form = crate::widgets::form::login_form();
    state.view = View::Login;
    vec![toast(ApiError::Unauthorized.notice(), ToastLevel::Error, 4)]
}

/// Uniform reaction to a failed request.
///
/// 401 forces a new login unless the session changed since the request went
/// out; 400 surfaces a toast; anything else is only logged.
fn on_api_error(state: &mut AppState, epoch: u64, err: &ApiError, what: &str) -> Vec<Effect> {
    tracing::warn!(what, error = %err, "request failed");
    state.dbg(format!("{what} failed: {err}"));
    if err.is_unauthorized() {
        if epoch != state.session.epoch() {
            state.dbg("401 from a replaced session ignored");
            return Vec::new();
        }
        return force_login(state);
    }
    if err.is_bad_request() {
        return vec![toast(err.notice(), ToastLevel::Error, 3)];
    }
    Vec::new()
}
