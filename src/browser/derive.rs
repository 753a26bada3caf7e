//! Dropdown options derived from a detail object's keys.
//!
//! Options are declared per collection as `OptionSpec { name, path, multi }`.
//! A `{name}` segment in a path fans out over the current selection of an
//! earlier option; the options offered are the keys shared by every object
//! reached that way. Shapes are checked, not assumed: anything that is not an
//! object, or keys that differ between fan-out targets, produce a warning.

use crate::model::OptionSpec;
use serde_json::{Map, Value as JsonValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedOption {
    pub name: String,
    pub multi: bool,
    pub options: Vec<String>,
    pub selected: Vec<String>,
}

impl DerivedOption {
    pub fn first_selected(&self) -> Option<&str> {
        self.selected.first().map(String::as_str)
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.iter().any(|s| s == key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Derivation {
    pub options: Vec<DerivedOption>,
    pub warnings: Vec<String>,
}

impl Derivation {
    pub fn get(&self, name: &str) -> Option<&DerivedOption> {
        self.options.iter().find(|o| o.name == name)
    }
}

/// Used when a collection declares no options: one dropdown over top-level keys.
pub fn default_specs() -> Vec<OptionSpec> {
    vec![OptionSpec {
        name: "key".to_string(),
        path: String::new(),
        multi: false,
    }]
}

/// Derive every option from `detail`.
///
/// `previous` carries selections to keep where still valid; pass `None` for a
/// freshly loaded detail so nothing carries over.
pub fn derive_options(
    detail: &JsonValue,
    specs: &[OptionSpec],
    previous: Option<&[DerivedOption]>,
) -> Derivation {
    let mut out = Derivation::default();
    for spec in specs {
        let (options, warning) = match resolve_targets(detail, &spec.path, &out.options) {
            Ok(targets) => common_keys(&targets, &spec.path),
            Err(w) => (Vec::new(), Some(w)),
        };
        if let Some(w) = warning {
            out.warnings.push(format!("{}: {}", spec.name, w));
        }
        let prev = previous.and_then(|prev| prev.iter().find(|p| p.name == spec.name));
        let kept: Vec<String> = prev
            .map(|p| {
                p.selected
                    .iter()
                    .filter(|s| options.contains(s))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // A multi-select the user cleared stays cleared
        let cleared = spec.multi && prev.is_some_and(|p| p.selected.is_empty());
        let selected = if cleared {
            Vec::new()
        } else if !kept.is_empty() {
            if spec.multi {
                kept
            } else {
                kept.into_iter().take(1).collect()
            }
        } else {
            options.first().cloned().into_iter().collect()
        };
        out.options.push(DerivedOption {
            name: spec.name.clone(),
            multi: spec.multi,
            options,
            selected,
        });
    }
    out
}

fn resolve_targets<'a>(
    root: &'a JsonValue,
    path: &str,
    earlier: &[DerivedOption],
) -> Result<Vec<&'a JsonValue>, String> {
    let mut cur: Vec<&JsonValue> = vec![root];
    for seg in path.split('.').filter(|s| !s.is_empty()) {
        let keys: Vec<String> = match placeholder(seg) {
            Some(name) => {
                let opt = earlier
                    .iter()
                    .find(|o| o.name == name)
                    .ok_or_else(|| format!("unknown option '{{{name}}}' in path '{path}'"))?;
                if opt.selected.is_empty() {
                    return Ok(Vec::new());
                }
                opt.selected.clone()
            }
            None => vec![seg.to_string()],
        };
        let mut next = Vec::new();
        for v in cur {
            for k in &keys {
                let child = v
                    .get(k.as_str())
                    .ok_or_else(|| format!("path '{path}' has no key '{k}'"))?;
                next.push(child);
            }
        }
        cur = next;
    }
    Ok(cur)
}

fn placeholder(seg: &str) -> Option<&str> {
    seg.strip_prefix('{').and_then(|s| s.strip_suffix('}'))
}

fn common_keys(targets: &[&JsonValue], path: &str) -> (Vec<String>, Option<String>) {
    let objects: Vec<&Map<String, JsonValue>> = targets.iter().filter_map(|v| v.as_object()).collect();
    if objects.len() != targets.len() {
        let shown = if path.is_empty() { "<root>" } else { path };
        return (Vec::new(), Some(format!("'{shown}' is not an object")));
    }
    let Some((first, rest)) = objects.split_first() else {
        return (Vec::new(), None);
    };
    let keys: Vec<String> = first
        .keys()
        .filter(|k| rest.iter().all(|o| o.contains_key(k.as_str())))
        .cloned()
        .collect();
    let uniform = rest.iter().all(|o| o.len() == keys.len()) && first.len() == keys.len();
    let warning = if uniform {
        None
    } else {
        Some(format!(
            "keys under '{path}' differ between selections; showing {} common key(s)",
            keys.len()
        ))
    };
    (keys, warning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stats_specs() -> Vec<OptionSpec> {
        vec![
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
        ]
    }

    #[test]
    fn top_level_keys_become_options_in_server_order() {
        let d = json!({"B": 1, "A": 2});
        let der = derive_options(&d, &default_specs(), None);
        assert_eq!(der.options[0].options, vec!["B", "A"]);
        assert_eq!(der.options[0].selected, vec!["B"]);
        assert!(der.warnings.is_empty());
    }

    #[test]
    fn dependent_option_uses_selected_parent() {
        let d = json!({"conditionals_counts": {
            "no_intrusion": {"alerts": {"0": 3}, "logins": {"1": 2}},
            "intrusion": {"alerts": {"5": 1}, "logins": {"0": 4}}
        }});
        let der = derive_options(&d, &stats_specs(), None);
        assert_eq!(der.get("conditional").unwrap().selected, vec!["no_intrusion"]);
        assert_eq!(der.get("metric").unwrap().options, vec!["alerts", "logins"]);
        assert_eq!(der.get("metric").unwrap().first_selected(), Some("alerts"));
    }

    #[test]
    fn non_uniform_shapes_are_reported_not_assumed() {
        let d = json!({"conditionals_counts": {
            "a": {"m1": {}, "m2": {}},
            "b": {"m2": {}}
        }});
        let prev = vec![DerivedOption {
            name: "conditional".into(),
            multi: true,
            options: vec!["a".into(), "b".into()],
            selected: vec!["a".into(), "b".into()],
        }];
        let der = derive_options(&d, &stats_specs(), Some(&prev));
        assert_eq!(der.get("metric").unwrap().options, vec!["m2"]);
        assert_eq!(der.warnings.len(), 1);
        assert!(der.warnings[0].starts_with("metric:"));
    }

    #[test]
    fn non_object_path_yields_no_options_and_a_warning() {
        let d = json!({"conditionals_counts": [1, 2]});
        let der = derive_options(&d, &stats_specs(), None);
        assert!(der.get("conditional").unwrap().options.is_empty());
        assert!(der.get("metric").unwrap().options.is_empty());
        assert!(!der.warnings.is_empty());
    }

    #[test]
    fn stale_previous_selection_is_replaced_by_first_key() {
        let d = json!({"x": 1, "y": 2});
        let prev = vec![DerivedOption {
            name: "key".into(),
            multi: false,
            options: vec!["gone".into()],
            selected: vec!["gone".into()],
        }];
        let der = derive_options(&d, &default_specs(), Some(&prev));
        assert_eq!(der.options[0].selected, vec!["x"]);
    }
}
