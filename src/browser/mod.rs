//! Remote collection browser: listing -> selection -> detail -> derived options.
//!
//! The browser owns all view state for one collection and never performs I/O.
//! Operations return `Request`s for the caller to execute; results come back
//! through `apply_*`/`fail_*` together with the generation they were issued
//! under, and anything not matching the latest generation is dropped.

pub mod debounce;
pub mod derive;
pub mod generation;


use crate::model::{CollectionSpec, DetailObject, ListingEntry};
use debounce::Debouncer;
use derive::{default_specs, derive_options, Derivation, DerivedOption};
use generation::Generation;
use serde_json::Value as JsonValue;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

/// I/O the browser wants performed on its behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Listing { generation: u64 },
    Detail { id: String, generation: u64 },
    Remove { id: String },
    RemoveAll,
}

pub struct RemoteCollectionBrowser {
    spec: CollectionSpec,
    entries: Vec<ListingEntry>,
    // Listing elements by id; used as the detail when no detail endpoint exists
    inline: HashMap<String, JsonValue>,
    visible: Vec<usize>,
    search: String,
    selected_id: Option<String>,
    detail: Option<DetailObject>,
    derivation: Derivation,
    listing_gen: Generation,
    detail_gen: Generation,
    // Bumped whenever the detail is replaced or cleared
    revision: u64,
    pub loading_listing: bool,
    pub loading_detail: bool,
    pub debouncer: Debouncer,
}

impl RemoteCollectionBrowser {
    pub fn new(spec: CollectionSpec, debounce: Duration) -> Self {
        Self {
            spec,
            entries: Vec::new(),
            inline: HashMap::new(),
            visible: Vec::new(),
            search: String::new(),
            selected_id: None,
            detail: None,
            derivation: Derivation::default(),
            listing_gen: Generation::default(),
            detail_gen: Generation::default(),
            revision: 0,
            loading_listing: false,
            loading_detail: false,
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn spec(&self) -> &CollectionSpec {
        &self.spec
    }

    pub fn entries(&self) -> &[ListingEntry] {
        &self.entries
    }

    pub fn visible_entries(&self) -> Vec<&ListingEntry> {
        self.visible.iter().filter_map(|&i| self.entries.get(i)).collect()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    /// Position of the selected entry within the visible subset.
    pub fn selected_visible_index(&self) -> Option<usize> {
        let id = self.selected_id.as_deref()?;
        self.visible
            .iter()
            .position(|&i| self.entries.get(i).map(|e| e.id.as_str()) == Some(id))
    }

    pub fn detail(&self) -> Option<&DetailObject> {
        self.detail.as_ref()
    }

    pub fn derivation(&self) -> &Derivation {
        &self.derivation
    }

    pub fn option(&self, name: &str) -> Option<&DerivedOption> {
        self.derivation.get(name)
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    /// Nothing listed (or nothing matching the search): no detail to render.
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_loading(&self) -> bool {
        self.loading_listing || self.loading_detail
    }

    fn option_specs(&self) -> Vec<crate::model::OptionSpec> {
        if self.spec.options.is_empty() {
            default_specs()
        } else {
            self.spec.options.clone()
        }
    }

    // ---------------- listing ------------------------------------------------

    pub fn load_listing(&mut self) -> Request {
        self.loading_listing = true;
        Request::Listing {
            generation: self.listing_gen.issue(),
        }
    }

    /// Apply a listing response. Returns `None` when the response is stale.
    pub fn apply_listing(&mut self, generation: u64, body: &JsonValue) -> Option<Vec<Request>> {
        if !self.listing_gen.is_current(generation) {
            tracing::debug!(collection = %self.spec.id, generation, "dropping stale listing");
            return None;
        }
        self.loading_listing = false;
        let (entries, inline) = parse_listing(&self.spec, body);
        self.entries = entries;
        self.inline = inline;
        self.selected_id = None;
        self.recompute_visible();
        Some(self.sync_selection_with_visible())
    }

    pub fn fail_listing(&mut self, generation: u64) {
        if self.listing_gen.is_current(generation) {
            self.loading_listing = false;
        }
    }

    // ---------------- detail -------------------------------------------------

    /// Select an entry and load its detail.
    pub fn select(&mut self, id: &str) -> Vec<Request> {
        if !self.entries.iter().any(|e| e.id == id) {
            return Vec::new();
        }
        self.selected_id = Some(id.to_string());
        let generation = self.detail_gen.issue();
        if self.spec.detail.is_none() {
            let value = self.inline.get(id).cloned().unwrap_or(JsonValue::Null);
            self.install_detail(DetailObject::from_value(id, value));
            return Vec::new();
        }
        self.loading_detail = true;
        vec![Request::Detail {
            id: id.to_string(),
            generation,
        }]
    }

    /// Move the selection within the visible subset.
    pub fn move_selection(&mut self, delta: isize) -> Vec<Request> {
        if self.visible.is_empty() {
            return Vec::new();
        }
        let cur = self.selected_visible_index().unwrap_or(0) as isize;
        let max = self.visible.len() as isize - 1;
        let next = (cur + delta).clamp(0, max) as usize;
        if Some(next) == self.selected_visible_index() {
            return Vec::new();
        }
        let id = self.entries[self.visible[next]].id.clone();
        self.select(&id)
    }

    /// Apply a detail response. Returns false when the response is stale.
    pub fn apply_detail(&mut self, generation: u64, detail: DetailObject) -> bool {
        if !self.detail_gen.is_current(generation) {
            tracing::debug!(collection = %self.spec.id, generation, id = %detail.id, "dropping stale detail");
            return false;
        }
        self.loading_detail = false;
        self.install_detail(detail);
        true
    }

    pub fn fail_detail(&mut self, generation: u64) {
        if self.detail_gen.is_current(generation) {
            self.loading_detail = false;
        }
    }

    fn install_detail(&mut self, detail: DetailObject) {
        self.derivation = if detail.is_empty() {
            Derivation::default()
        } else {
            derive_options(&detail.value, &self.option_specs(), None)
        };
        for w in &self.derivation.warnings {
            tracing::warn!(collection = %self.spec.id, id = %detail.id, warning = %w, "option schema mismatch");
        }
        self.detail = Some(detail);
        self.revision += 1;
    }

    fn clear_detail(&mut self) {
        self.detail_gen.invalidate();
        self.loading_detail = false;
        self.selected_id = None;
        self.detail = None;
        self.derivation = Derivation::default();
        self.revision += 1;
    }

    // ---------------- search -------------------------------------------------

    /// Filter the listing by case-insensitive substring match on labels.
    pub fn filter(&mut self, text: &str) -> Vec<Request> {
        self.search = text.to_string();
        self.recompute_visible();
        self.sync_selection_with_visible()
    }

    fn recompute_visible(&mut self) {
        let needle = self.search.to_lowercase();
        self.visible = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| needle.is_empty() || e.label.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
    }

    fn sync_selection_with_visible(&mut self) -> Vec<Request> {
        if self.visible.is_empty() {
            self.clear_detail();
            return Vec::new();
        }
        if self.selected_visible_index().is_some() {
            return Vec::new();
        }
        let id = self.entries[self.visible[0]].id.clone();
        self.select(&id)
    }

    // ---------------- mutations ----------------------------------------------

    /// Drop everything; in-flight responses become stale.
    pub fn reset(&mut self) {
        self.listing_gen.invalidate();
        self.loading_listing = false;
        self.entries.clear();
        self.inline.clear();
        self.visible.clear();
        self.search.clear();
        self.debouncer.cancel();
        self.clear_detail();
    }

    pub fn refresh(&mut self) -> Request {
        self.reset();
        self.load_listing()
    }

    /// Reset and ask for deletion; the listing is reloaded once the server acks.
    pub fn remove(&mut self, id: &str) -> Option<Request> {
        self.spec.remove.as_ref()?;
        let id = id.to_string();
        self.reset();
        self.loading_listing = true;
        Some(Request::Remove { id })
    }

    pub fn remove_all(&mut self) -> Option<Request> {
        self.spec.remove_all.as_ref()?;
        self.reset();
        self.loading_listing = true;
        Some(Request::RemoveAll)
    }

    /// Called after a remove request finished, successfully or not.
    pub fn after_remove(&mut self) -> Request {
        self.load_listing()
    }

    // ---------------- derived options ----------------------------------------

    /// Replace the selection of option `name`; keys must be offered options.
    pub fn set_option(&mut self, name: &str, selection: Vec<String>) -> Result<(), String> {
        let Some(detail) = self.detail.as_ref() else {
            return Err("no detail loaded".to_string());
        };
        let opt = self
            .derivation
            .get(name)
            .ok_or_else(|| format!("unknown option '{name}'"))?;
        if let Some(bad) = selection.iter().find(|k| !opt.options.contains(k)) {
            return Err(format!("'{bad}' is not a key of '{name}'"));
        }
        if !opt.multi && selection.len() > 1 {
            return Err(format!("'{name}' accepts a single key"));
        }
        let mut previous = self.derivation.options.clone();
        if let Some(p) = previous.iter_mut().find(|p| p.name == name) {
            p.selected = selection;
        }
        self.derivation = derive_options(&detail.value, &self.option_specs(), Some(&previous));
        Ok(())
    }

    /// Toggle one key of a multi-select option, or pick it for a single one.
    pub fn toggle_option_key(&mut self, name: &str, key: &str) -> Result<(), String> {
        let opt = self
            .derivation
            .get(name)
            .ok_or_else(|| format!("unknown option '{name}'"))?;
        let selection = if opt.multi {
            let mut sel: Vec<String> = opt.selected.clone();
            if let Some(pos) = sel.iter().position(|s| s == key) {
                sel.remove(pos);
            } else {
                sel.push(key.to_string());
            }
            // Keep server key order
            opt.options
                .iter()
                .filter(|k| sel.contains(k))
                .cloned()
                .collect()
        } else {
            vec![key.to_string()]
        };
        self.set_option(name, selection)
    }

    /// Step a single-select option forward or backward through its keys.
    pub fn cycle_option(&mut self, name: &str, delta: isize) -> Result<(), String> {
        let opt = self
            .derivation
            .get(name)
            .ok_or_else(|| format!("unknown option '{name}'"))?;
        if opt.options.is_empty() {
            return Ok(());
        }
        let cur = opt
            .first_selected()
            .and_then(|s| opt.options.iter().position(|k| k == s))
            .unwrap_or(0) as isize;
        let n = opt.options.len() as isize;
        let next = (cur + delta).rem_euclid(n) as usize;
        let key = opt.options[next].clone();
        self.set_option(name, vec![key])
    }

    /// Total sample count of the loaded statistic, when configured.
    pub fn num_samples(&self) -> Option<f64> {
        let path = self.spec.samples_path.as_deref()?;
        let detail = self.detail.as_ref()?;
        let table = crate::services::loader::get_by_path(&detail.value, path)?;
        Some(crate::stats::num_samples(table))
    }
}

/// Turn a listing body into entries. Elements without an id are skipped.
pub(crate) fn parse_listing(
    spec: &CollectionSpec,
    body: &JsonValue,
) -> (Vec<ListingEntry>, HashMap<String, JsonValue>) {
    let mut entries = Vec::new();
    let mut inline = HashMap::new();
    let Some(arr) = body.as_array() else {
        if !body.is_null() {
            tracing::warn!(collection = %spec.id, "listing response is not an array");
        }
        return (entries, inline);
    };
    for (idx, item) in arr.iter().enumerate() {
        let Some(id) = item.get(spec.id_field.as_str()).and_then(scalar_text) else {
            tracing::warn!(collection = %spec.id, index = idx, field = %spec.id_field, "listing element without id");
            continue;
        };
        let label = match &spec.label {
            Some(tpl) => render_label(tpl, item),
            None => format!("ID: {id}"),
        };
        if spec.detail.is_none() {
            inline.insert(id.clone(), item.clone());
        }
        entries.push(ListingEntry { id, label });
    }
    (entries, inline)
}

fn scalar_text(v: &JsonValue) -> Option<String> {
    match v {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Fill `{field}` placeholders from the listing element.
pub(crate) fn render_label(template: &str, item: &JsonValue) -> String {
    static LABEL_RE: OnceLock<Regex> = OnceLock::new();
    let re = LABEL_RE.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_.]+)\}").expect("static regex"));
    re.replace_all(template, |caps: &regex::Captures| {
        crate::services::loader::get_by_path(item, &caps[1])
            .and_then(scalar_text)
            .unwrap_or_default()
    })
    .to_string()
}
