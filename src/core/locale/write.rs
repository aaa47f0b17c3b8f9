//! Sentinel write-back into locale catalog files.
//!
//! Every missing key classified as new is written into that locale's file
//! with the untranslated placeholder, so translators see the full key set.
//! Existing content keeps its on-disk shape (the file is re-read and only
//! extended); new keys are inserted as a nested path using the configured
//! separator. Files that do not exist yet are created.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use super::read::locale_file_path;
use super::Format;
use crate::core::reconcile::UNTRANSLATED_PLACEHOLDER;
use crate::issues::MissingKeyIssue;

/// What a write-back pass changed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub files_written: usize,
    pub keys_added: usize,
}

/// Insert the placeholder for every new missing key into its locale file.
///
/// Keys already tracked (`is_new` false) are left alone. With `sort`, the
/// whole mapping is rewritten with recursively sorted keys; otherwise the
/// existing order is preserved and new keys append.
pub fn write_missing(
    messages_root: &Path,
    format: Format,
    separator: &str,
    missing: &[MissingKeyIssue],
    sort: bool,
) -> Result<WriteSummary> {
    let mut by_locale: HashMap<&str, Vec<&MissingKeyIssue>> = HashMap::new();
    for issue in missing.iter().filter(|m| m.is_new) {
        by_locale.entry(issue.locale.as_str()).or_default().push(issue);
    }

    let mut summary = WriteSummary::default();
    let mut locales: Vec<&str> = by_locale.keys().copied().collect();
    locales.sort();

    for locale in locales {
        let issues = &by_locale[locale];
        let path = locale_file_path(messages_root, locale, format);

        let mut root = read_existing(&path, format)?;
        for issue in issues {
            insert_nested(
                &mut root,
                &issue.key,
                Value::String(UNTRANSLATED_PLACEHOLDER.to_string()),
                separator,
            );
            summary.keys_added += 1;
        }

        let value = if sort {
            sorted(&Value::Object(root))
        } else {
            Value::Object(root)
        };
        fs::write(&path, render(&value, format)?)
            .with_context(|| format!("Failed to write language file '{}'", path.display()))?;
        summary.files_written += 1;
    }
    Ok(summary)
}

fn read_existing(path: &Path, format: Format) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read language file '{}'", path.display()))?;
    let value = match format {
        Format::Json => serde_json::from_str(&content)
            .with_context(|| format!("Language file '{}' is corrupted", path.display()))?,
        Format::Yaml => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
                .with_context(|| format!("Language file '{}' is corrupted", path.display()))?;
            serde_json::to_value(yaml)
                .with_context(|| format!("Language file '{}' is corrupted", path.display()))?
        }
        // ES modules round-trip through the reader's object conversion;
        // comments and code around the exported object are not preserved.
        Format::Js => super::read::parse_js_module(&content, path)?,
    };
    match value {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Insert `value` at a separator-delimited path, creating intermediate
/// objects. A scalar in the way is replaced by an object so the new key is
/// never silently dropped.
fn insert_nested(map: &mut Map<String, Value>, key: &str, value: Value, separator: &str) {
    match key.split_once(separator) {
        Some((head, rest)) if !rest.is_empty() => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(child_map) = child {
                insert_nested(child_map, rest, value, separator);
            }
        }
        _ => {
            map.insert(key.to_string(), value);
        }
    }
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), sorted(&map[key]));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

fn render(value: &Value, format: Format) -> Result<String> {
    Ok(match format {
        Format::Json => format!("{}\n", serde_json::to_string_pretty(value)?),
        Format::Yaml => serde_yaml::to_string(value)?,
        Format::Js => format!(
            "export default {};\n",
            serde_json::to_string_pretty(value)?
        ),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn missing(key: &str, locale: &str, is_new: bool) -> MissingKeyIssue {
        MissingKeyIssue {
            key: key.to_string(),
            file_path: "a.vue".to_string(),
            line: 1,
            locale: locale.to_string(),
            is_new,
        }
    }

    #[test]
    fn test_write_creates_missing_file() {
        let dir = tempdir().unwrap();
        let summary = write_missing(
            dir.path(),
            Format::Json,
            ".",
            &[missing("greeting.hello", "en", true)],
            true,
        )
        .unwrap();

        assert_eq!(
            summary,
            WriteSummary {
                files_written: 1,
                keys_added: 1
            }
        );
        let content = fs::read_to_string(dir.path().join("en.json")).unwrap();
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(
            value["greeting"]["hello"],
            Value::String(UNTRANSLATED_PLACEHOLDER.to_string())
        );
    }

    #[test]
    fn test_write_extends_existing_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("en.json"),
            r#"{"existing": {"key": "Kept"}}"#,
        )
        .unwrap();

        write_missing(
            dir.path(),
            Format::Json,
            ".",
            &[missing("existing.added", "en", true)],
            false,
        )
        .unwrap();

        let value: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("en.json")).unwrap()).unwrap();
        assert_eq!(value["existing"]["key"], Value::String("Kept".to_string()));
        assert_eq!(
            value["existing"]["added"],
            Value::String(UNTRANSLATED_PLACEHOLDER.to_string())
        );
    }

    #[test]
    fn test_tracked_keys_are_not_rewritten() {
        let dir = tempdir().unwrap();
        let summary = write_missing(
            dir.path(),
            Format::Json,
            ".",
            &[missing("already.tracked", "en", false)],
            true,
        )
        .unwrap();

        assert_eq!(summary, WriteSummary::default());
        assert!(!dir.path().join("en.json").exists());
    }

    #[test]
    fn test_write_sorted_keys() {
        let dir = tempdir().unwrap();
        write_missing(
            dir.path(),
            Format::Json,
            ".",
            &[missing("zebra", "en", true), missing("apple", "en", true)],
            true,
        )
        .unwrap();

        let content = fs::read_to_string(dir.path().join("en.json")).unwrap();
        let apple = content.find("apple").unwrap();
        let zebra = content.find("zebra").unwrap();
        assert!(apple < zebra);
    }

    #[test]
    fn test_write_yaml_format() {
        let dir = tempdir().unwrap();
        write_missing(
            dir.path(),
            Format::Yaml,
            ".",
            &[missing("a.b", "fr", true)],
            true,
        )
        .unwrap();

        let content = fs::read_to_string(dir.path().join("fr.yaml")).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&content).unwrap();
        assert_eq!(
            value["a"]["b"],
            serde_yaml::Value::String(UNTRANSLATED_PLACEHOLDER.to_string())
        );
    }

    #[test]
    fn test_write_js_format() {
        let dir = tempdir().unwrap();
        write_missing(
            dir.path(),
            Format::Js,
            ".",
            &[missing("a.b", "de", true)],
            true,
        )
        .unwrap();

        let content = fs::read_to_string(dir.path().join("de.js")).unwrap();
        assert!(content.starts_with("export default {"));
        assert!(content.contains(UNTRANSLATED_PLACEHOLDER));
        assert!(content.trim_end().ends_with("};"));
    }

    #[test]
    fn test_insert_nested_replaces_scalar_in_path() {
        let mut map = Map::new();
        map.insert("a".to_string(), Value::String("scalar".to_string()));
        insert_nested(&mut map, "a.b", Value::String("leaf".to_string()), ".");
        assert_eq!(map["a"]["b"], Value::String("leaf".to_string()));
    }

    #[test]
    fn test_per_locale_files() {
        let dir = tempdir().unwrap();
        let summary = write_missing(
            dir.path(),
            Format::Json,
            ".",
            &[missing("k.en", "en", true), missing("k.fr", "fr", true)],
            true,
        )
        .unwrap();

        assert_eq!(summary.files_written, 2);
        assert!(dir.path().join("en.json").exists());
        assert!(dir.path().join("fr.json").exists());
    }
}
