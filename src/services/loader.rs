use crate::model::{AccountEndpoints, CollectionSpec, HttpMethod};
use crate::services::http::{expand_endpoint, ApiClient};
use crate::session::{AccountFields, SessionData};
use crate::ui::{LoadKind, LoadMsg};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::mpsc::Sender;
use std::thread;

pub fn get_by_path<'a>(v: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let mut cur = v;
    for seg in path.split('.') {
        cur = cur.get(seg)?;
    }
    Some(cur)
}

/// One REST call, fully resolved except for the session token.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<JsonValue>,
}

impl Call {
    fn new(method: HttpMethod, path: String) -> Self {
        Self {
            method,
            path,
            body: None,
        }
    }
}

pub fn listing_call(spec: &CollectionSpec) -> Call {
    Call::new(
        HttpMethod::Get,
        expand_endpoint(&spec.listing, None, &spec.params),
    )
}

/// `None` when the collection has no detail endpoint (details are inline).
pub fn detail_call(spec: &CollectionSpec, id: &str) -> Option<Call> {
    let tpl = spec.detail.as_deref()?;
    Some(Call::new(
        HttpMethod::Get,
        expand_endpoint(tpl, Some(id), &spec.params),
    ))
}

pub fn remove_call(spec: &CollectionSpec, id: &str) -> Option<Call> {
    let tpl = spec.remove.as_deref()?;
    Some(Call::new(
        spec.remove_method(),
        expand_endpoint(tpl, Some(id), &spec.params),
    ))
}

pub fn remove_all_call(spec: &CollectionSpec) -> Option<Call> {
    let tpl = spec.remove_all.as_deref()?;
    Some(Call::new(
        spec.remove_method(),
        expand_endpoint(tpl, None, &spec.params),
    ))
}

pub fn login_call(account: &AccountEndpoints, username: &str, password: &str) -> Call {
    Call {
        method: HttpMethod::Post,
        path: account.login.clone(),
        body: Some(serde_json::json!({"username": username, "password": password})),
    }
}

pub fn update_user_call(account: &AccountEndpoints, current: &SessionData, fields: &AccountFields) -> Call {
    Call {
        method: HttpMethod::Put,
        path: expand_endpoint(&account.update_user, Some(&current.id), &HashMap::new()),
        body: Some(fields.to_update_body(current)),
    }
}

/// Run `call` on a worker thread and report the result on `tx`.
///
/// `epoch` is the session epoch the call was issued under; the update loop
/// uses it to ignore 401s that belong to a session already replaced.
pub fn spawn_call(
    client: ApiClient,
    call: Call,
    token: Option<String>,
    key: String,
    epoch: u64,
    kind: LoadKind,
    tx: Sender<LoadMsg>,
) {
    thread::spawn(move || {
        let outcome = client.send(call.method, &call.path, token.as_deref(), call.body.as_ref());
        if let Err(e) = &outcome {
            tracing::debug!(%key, error = %e, "load failed");
        }
        let _ = tx.send(LoadMsg {
            key,
            epoch,
            outcome,
            kind,
        });
    });
}

#[cfg(test)]
mod loader_tests;
