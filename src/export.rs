use crate::model::DetailObject;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// File name for an exported detail: the id with path-hostile characters replaced.
pub fn export_file_name(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        "detail.json".to_string()
    } else {
        format!("{stem}.json")
    }
}

/// Write the detail's raw response text to `<dir>/<id>.json`.
pub fn export_detail(detail: &DetailObject, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating export dir {dir:?}"))?;
    let path = dir.join(export_file_name(&detail.id));
    std::fs::write(&path, detail.raw.as_bytes())
        .with_context(|| format!("writing export {path:?}"))?;
    tracing::info!(id = %detail.id, path = %path.display(), bytes = detail.raw.len(), "exported detail");
    Ok(path)
}

/// Resolve the export directory: explicit setting, else the current directory.
pub fn export_dir(configured: Option<&str>) -> PathBuf {
    if let Ok(dir) = std::env::var("CSLE_CONSOLE_EXPORT_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    match configured {
        Some(d) if !d.trim().is_empty() => PathBuf::from(d),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Copy pretty-printed detail JSON to the system clipboard.
pub fn copy_detail(detail: &DetailObject) -> Result<()> {
    let text = serde_json::to_string_pretty(&detail.value).context("formatting detail")?;
    let mut clipboard = arboard::Clipboard::new().context("opening clipboard")?;
    clipboard.set_text(text).context("setting clipboard text")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exported_file_parses_back_to_the_same_document() {
        let dir = tempfile::tempdir().unwrap();
        let raw = r#"{"conditionals_counts": {"b": {"m": {"0": 1}}, "a": {}}, "id": 3}"#;
        let d = DetailObject::from_raw("3", raw).unwrap();
        let path = export_detail(&d, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "3.json");
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, raw);
        let back: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, d.value);
    }

    #[test]
    fn export_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let d = DetailObject::from_raw("x", "[]").unwrap();
        assert!(export_detail(&d, &nested).unwrap().exists());
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(export_file_name("00:00:00:01"), "00_00_00_01.json");
        assert_eq!(export_file_name("../etc"), "_etc.json");
        assert_eq!(export_file_name(""), "detail.json");
    }
}
