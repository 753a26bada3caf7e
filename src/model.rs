use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// One selectable remote resource: an id plus a synthesized label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub id: String,
    pub label: String,
}

/// Full server document for the selected entry.
///
/// `raw` keeps the response text exactly as received so exports are
/// byte-identical to what the server sent.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailObject {
    pub id: String,
    pub value: JsonValue,
    pub raw: String,
}

impl DetailObject {
    #[cfg(test)]
    pub fn from_raw(id: impl Into<String>, raw: impl Into<String>) -> Result<Self, serde_json::Error> {
        let raw = raw.into();
        let value: JsonValue = serde_json::from_str(&raw)?;
        Ok(Self {
            id: id.into(),
            value,
            raw,
        })
    }

    /// Build a detail from an already-parsed listing element (inline detail).
    pub fn from_value(id: impl Into<String>, value: JsonValue) -> Self {
        let raw = value.to_string();
        Self {
            id: id.into(),
            value,
            raw,
        }
    }

    /// Null, `{}` and `[]` responses carry nothing to render.
    pub fn is_empty(&self) -> bool {
        match &self.value {
            JsonValue::Null => true,
            JsonValue::Object(m) => m.is_empty(),
            JsonValue::Array(a) => a.is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// Dropdown derived from the detail object's keys.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: String,
    // Dot path into the detail; "{other}" segments expand to that option's selection
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub multi: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CollectionSpec {
    pub id: String,
    pub title: String,
    pub listing: String,
    // No detail endpoint: the listing element itself is the detail object
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub remove: Option<String>,
    #[serde(default)]
    pub remove_method: Option<HttpMethod>,
    #[serde(default)]
    pub remove_all: Option<String>,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    // Label template, e.g. "ID: {id}, emulation: {emulation}"
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    // Path to a conditional -> metric -> value -> count table for the sample total
    #[serde(default)]
    pub samples_path: Option<String>,
    // Values substituted into endpoint templates besides {id}
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl CollectionSpec {
    pub fn remove_method(&self) -> HttpMethod {
        self.remove_method.unwrap_or(HttpMethod::Delete)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AccountEndpoints {
    #[serde(default = "default_login")]
    pub login: String,
    #[serde(default = "default_update_user")]
    pub update_user: String,
}

impl Default for AccountEndpoints {
    fn default() -> Self {
        Self {
            login: default_login(),
            update_user: default_update_user(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default)]
    pub export_dir: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default)]
    pub account: AccountEndpoints,
    pub collections: Vec<CollectionSpec>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            header: Some("CSLE Console".to_string()),
            server: default_server(),
            export_dir: None,
            timeout_secs: default_timeout_secs(),
            search_debounce_ms: default_debounce_ms(),
            account: AccountEndpoints::default(),
            collections: default_collections(),
        }
    }
}

fn default_server() -> String {
    "http://localhost:7777".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_debounce_ms() -> u64 {
    350
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_login() -> String {
    "/login".to_string()
}

fn default_update_user() -> String {
    "/users/{id}".to_string()
}

pub(crate) fn default_collections() -> Vec<CollectionSpec> {
    vec![
        CollectionSpec {
            id: "statistics".into(),
            title: "Statistics".into(),
            listing: "/emulationstatisticsdataids".into(),
            detail: Some("/emulationstatisticsdata/get/{id}".into()),
            remove: Some("/emulationstatisticsdata/remove/{id}".into()),
            remove_method: Some(HttpMethod::Post),
            id_field: default_id_field(),
            label: Some("ID: {id}, emulation: {emulation}".into()),
            options: vec![
                OptionSpec {
                    name: "conditional".into(),
                    path: "conditionals_counts".into(),
                    multi: true,
                },
                OptionSpec {
                    name: "metric".into(),
                    path: "conditionals_counts.{conditional}".into(),
                    multi: false,
                },
            ],
            samples_path: Some("conditionals_counts".into()),
            ..Default::default()
        },
        CollectionSpec {
            id: "experiments".into(),
            title: "Experiments".into(),
            listing: "/experiments?ids=true".into(),
            detail: Some("/experiments/{id}".into()),
            remove: Some("/experiments/{id}".into()),
            remove_method: Some(HttpMethod::Delete),
            remove_all: Some("/experiments".into()),
            id_field: default_id_field(),
            label: Some("ID: {id}, simulation: {simulation}, emulation: {emulation}".into()),
            ..Default::default()
        },
    ]
}

/// Matches `{name}` placeholders in endpoint templates and option paths.
pub(crate) fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("static regex"))
}

/// Placeholders of the form `{name}` in a template, in order of appearance.
pub(crate) fn template_placeholders(template: &str) -> Vec<String> {
    placeholder_re()
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .collect()
}

pub(crate) fn validate_console_config(cfg: &ConsoleConfig) -> Result<(), String> {
    use std::collections::HashSet;
    if cfg.collections.is_empty() {
        return Err("config must declare at least one collection".to_string());
    }
    let mut ids = HashSet::new();
    for (i, c) in cfg.collections.iter().enumerate() {
        if !ids.insert(&c.id) {
            return Err(format!("duplicate collection id: '{}' at index {}", c.id, i));
        }
        if c.listing.trim().is_empty() {
            return Err(format!("collection '{}' requires a 'listing' endpoint", c.id));
        }
        if c.id_field.trim().is_empty() {
            return Err(format!("collection '{}' has an empty 'id_field'", c.id));
        }
        for (which, tpl) in [
            ("listing", Some(&c.listing)),
            ("detail", c.detail.as_ref()),
            ("remove", c.remove.as_ref()),
            ("remove_all", c.remove_all.as_ref()),
        ] {
            let Some(tpl) = tpl else { continue };
            for ph in template_placeholders(tpl) {
                let allowed = (ph == "id" && which != "listing" && which != "remove_all")
                    || c.params.contains_key(&ph);
                if !allowed {
                    return Err(format!(
                        "collection '{}' {} endpoint uses unknown placeholder {{{}}}",
                        c.id, which, ph
                    ));
                }
            }
        }
        if let Some(m) = c.remove_method {
            if matches!(m, HttpMethod::Get) {
                return Err(format!("collection '{}' remove_method cannot be GET", c.id));
            }
        }
        let mut seen: Vec<&str> = Vec::new();
        for o in &c.options {
            if o.name.trim().is_empty() {
                return Err(format!("collection '{}' has an option without a name", c.id));
            }
            for ph in template_placeholders(&o.path) {
                if !seen.contains(&ph.as_str()) {
                    return Err(format!(
                        "collection '{}' option '{}' refers to '{{{}}}' which is not an earlier option",
                        c.id, o.name, ph
                    ));
                }
            }
            if seen.contains(&o.name.as_str()) {
                return Err(format!("collection '{}' duplicate option '{}'", c.id, o.name));
            }
            seen.push(&o.name);
        }
    }
    if cfg.timeout_secs == 0 {
        return Err("timeout_secs must be greater than zero".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        validate_console_config(&ConsoleConfig::default()).unwrap();
    }

    #[test]
    fn validate_detects_duplicate_ids() {
        let cfg = ConsoleConfig {
            collections: vec![
                CollectionSpec {
                    id: "a".into(),
                    title: "A".into(),
                    listing: "/a".into(),
                    id_field: "id".into(),
                    ..Default::default()
                },
                CollectionSpec {
                    id: "a".into(),
                    title: "B".into(),
                    listing: "/b".into(),
                    id_field: "id".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let err = validate_console_config(&cfg).unwrap_err();
        assert!(err.contains("duplicate collection id"));
    }

    #[test]
    fn validate_rejects_unknown_endpoint_placeholders() {
        let cfg = ConsoleConfig {
            collections: vec![CollectionSpec {
                id: "switches".into(),
                title: "Switches".into(),
                listing: "/emulations/{emulation}/executions/{execution}/switches".into(),
                id_field: "dpid".into(),
                params: HashMap::from([("emulation".to_string(), "e1".to_string())]),
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = validate_console_config(&cfg).unwrap_err();
        assert!(err.contains("{execution}"));
    }

    #[test]
    fn validate_requires_options_to_reference_earlier_options() {
        let cfg = ConsoleConfig {
            collections: vec![CollectionSpec {
                id: "s".into(),
                title: "S".into(),
                listing: "/s".into(),
                id_field: "id".into(),
                options: vec![OptionSpec {
                    name: "metric".into(),
                    path: "counts.{conditional}".into(),
                    multi: false,
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = validate_console_config(&cfg).unwrap_err();
        assert!(err.contains("not an earlier option"));
    }

    #[test]
    fn config_parses_from_yaml_with_defaults() {
        let yaml = r#"
server: http://10.0.0.5:7777
collections:
  - id: switches
    title: Switches
    listing: /emulations/{emulation}/executions/{execution}/switches
    id_field: dpid
    label: "dpid: {dpid}"
    remove_method: POST
    params:
      emulation: csle-level9-010
      execution: "15"
"#;
        let cfg: ConsoleConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.search_debounce_ms, 350);
        assert_eq!(cfg.account.login, "/login");
        assert_eq!(cfg.collections[0].remove_method(), HttpMethod::Post);
        assert!(cfg.collections[0].detail.is_none());
        validate_console_config(&cfg).unwrap();
    }

    #[test]
    fn detail_keeps_raw_text_and_detects_empty() {
        let d = DetailObject::from_raw("1", "{ \"a\" : 1 }").unwrap();
        assert_eq!(d.raw, "{ \"a\" : 1 }");
        assert!(!d.is_empty());
        assert!(DetailObject::from_raw("2", "{}").unwrap().is_empty());
        assert!(DetailObject::from_raw("3", "null").unwrap().is_empty());
    }
}
