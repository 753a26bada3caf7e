//! Aggregates over an emulation statistic's `conditional -> metric -> value -> count` table.

use serde_json::Value as JsonValue;

/// Sum of counts of the first metric of every conditional.
///
/// Every metric of a conditional is recorded over the same samples, so any one
/// of them gives the sample count; the first is used.
pub fn num_samples(table: &JsonValue) -> f64 {
    let Some(conditionals) = table.as_object() else {
        return 0.0;
    };
    conditionals
        .values()
        .filter_map(|metrics| metrics.as_object()?.values().next())
        .filter_map(|counts| counts.as_object())
        .flat_map(|counts| counts.values())
        .filter_map(JsonValue::as_f64)
        .sum()
}

/// Render a count without a trailing `.0` when it is integral.
pub fn format_count(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

pub fn first_two_conditionals(selected: &[String]) -> &[String] {
    &selected[..selected.len().min(2)]
}

/// Ordered pairs of distinct selected conditionals, for pairwise comparisons.
pub fn conditional_pairs(selected: &[String]) -> Vec<(String, String)> {
    if selected.len() < 2 {
        return Vec::new();
    }
    let mut out = Vec::new();
    for a in selected {
        for b in selected {
            if a != b {
                out.push((a.clone(), b.clone()));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn num_samples_uses_first_metric_per_conditional() {
        let t = json!({
            "no_intrusion": {"alerts": {"0": 3, "1": 2}, "logins": {"0": 100}},
            "intrusion": {"alerts": {"4": 1}}
        });
        assert_eq!(num_samples(&t), 6.0);
        assert_eq!(format_count(num_samples(&t)), "6");
        assert_eq!(num_samples(&json!([])), 0.0);
        assert_eq!(num_samples(&json!({"c": {}})), 0.0);
    }

    #[test]
    fn pairs_are_ordered_and_distinct() {
        let sel: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let pairs = conditional_pairs(&sel);
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], ("a".to_string(), "b".to_string()));
        assert!(pairs.iter().all(|(x, y)| x != y));
        assert!(conditional_pairs(&sel[..1]).is_empty());
        assert_eq!(first_two_conditionals(&sel), &sel[..2]);
        assert_eq!(first_two_conditionals(&sel[..1]).len(), 1);
    }
}
