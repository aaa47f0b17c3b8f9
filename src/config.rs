use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::extract::{Grammar, Marker, RuleSet};
use crate::core::locale::Format;

pub const CONFIG_FILE_NAME: &str = ".vintlrc.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Glob patterns (or literal paths) excluded from the source scan.
    #[serde(default)]
    pub ignores: Vec<String>,
    /// Directories (or glob patterns) to scan under `sourceRoot`.
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default = "default_source_root")]
    pub source_root: String,
    #[serde(default = "default_languages_root", alias = "languagesDir")]
    pub languages_root: String,
    /// Locales with a catalog file under `languagesRoot`.
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,
    #[serde(default = "default_language_format")]
    pub language_format: Format,
    /// Separator between nested catalog levels in flat key space.
    #[serde(default = "default_key_separator")]
    pub key_separator: String,
    /// Sort catalog keys when writing placeholders back.
    #[serde(default = "default_sort")]
    pub sort: bool,

    /// Translation call names, optionally with an argument position
    /// (`"$t"`, `"this.$tc:0"`).
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    /// Tags whose content or `path` attribute is a key.
    #[serde(default = "default_tag_names")]
    pub tag_names: Vec<String>,
    /// Attributes marking an element's content as a key.
    #[serde(default = "default_attr_names")]
    pub attr_names: Vec<String>,
    /// Object-valued directives mapped to the property paths to try.
    #[serde(default = "default_object_attrs")]
    pub object_attrs: BTreeMap<String, Vec<String>>,
    /// Attribute name patterns whose whole value is a key expression.
    #[serde(default = "default_value_attrs")]
    pub value_attrs: Vec<String>,
    /// Attribute name patterns scanned for keyword calls.
    #[serde(default = "default_expr_attrs")]
    pub expr_attrs: Vec<String>,
    /// Interpolation delimiter pairs.
    #[serde(default = "default_markers")]
    pub markers: Vec<Marker>,
    /// File extension to grammar adapter mapping.
    #[serde(default = "default_extensions")]
    pub extensions: HashMap<String, Grammar>,
}

fn default_source_root() -> String {
    "./src".to_string()
}

fn default_languages_root() -> String {
    "./locales".to_string()
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_language_format() -> Format {
    Format::Json
}

fn default_key_separator() -> String {
    ".".to_string()
}

fn default_sort() -> bool {
    true
}

fn default_keywords() -> Vec<String> {
    [
        "$t", "vm.$t", "this.$t", "app.i18n.t", "$tc", "vm.$tc", "this.$tc", "app.i18n.tc",
    ]
    .map(String::from)
    .to_vec()
}

fn default_tag_names() -> Vec<String> {
    ["i18n", "translate"].map(String::from).to_vec()
}

fn default_attr_names() -> Vec<String> {
    vec!["v-translate".to_string()]
}

fn default_object_attrs() -> BTreeMap<String, Vec<String>> {
    let mut attrs = BTreeMap::new();
    attrs.insert(
        "v-t".to_string(),
        vec![String::new(), "path".to_string()],
    );
    attrs
}

fn default_value_attrs() -> Vec<String> {
    vec!["^v-bind:".to_string()]
}

fn default_expr_attrs() -> Vec<String> {
    ["^:", "^v-"].map(String::from).to_vec()
}

fn default_markers() -> Vec<Marker> {
    vec![Marker {
        start: "{{".to_string(),
        end: "}}".to_string(),
    }]
}

fn default_extensions() -> HashMap<String, Grammar> {
    [
        ("vue", Grammar::Component),
        ("js", Grammar::Script),
        ("mjs", Grammar::Script),
        ("cjs", Grammar::Script),
        ("ts", Grammar::Typescript),
        ("mts", Grammar::Typescript),
        ("cts", Grammar::Typescript),
    ]
    .into_iter()
    .map(|(ext, grammar)| (ext.to_string(), grammar))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignores: Vec::new(),
            includes: Vec::new(),
            source_root: default_source_root(),
            languages_root: default_languages_root(),
            locales: default_locales(),
            language_format: default_language_format(),
            key_separator: default_key_separator(),
            sort: default_sort(),
            keywords: default_keywords(),
            tag_names: default_tag_names(),
            attr_names: default_attr_names(),
            object_attrs: default_object_attrs(),
            value_attrs: default_value_attrs(),
            expr_attrs: default_expr_attrs(),
            markers: default_markers(),
            extensions: default_extensions(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Glob patterns in `ignores`/`includes` and the attribute regexes must
    /// compile; everything is checked before any extraction work starts.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }
        self.rule_set().map(|_| ())
    }

    /// Materialize the declarative extraction rules.
    pub fn rule_set(&self) -> Result<RuleSet> {
        RuleSet::new(
            &self.keywords,
            self.tag_names.clone(),
            self.attr_names.clone(),
            self.object_attrs
                .iter()
                .map(|(attr, paths)| (attr.clone(), paths.clone()))
                .collect(),
            &self.value_attrs,
            &self.expr_attrs,
            self.markers.clone(),
        )
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::config::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.ignores.is_empty());
        assert!(config.keywords.contains(&"this.$t".to_string()));
        assert_eq!(config.extensions.get("vue"), Some(&Grammar::Component));
        assert_eq!(config.key_separator, ".");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "ignores": ["**/dist/**"],
            "includes": ["components"],
            "locales": ["en", "fr"],
            "languageFormat": "yaml",
            "keywords": ["$gettext"]
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.ignores, vec!["**/dist/**"]);
        assert_eq!(config.locales, vec!["en", "fr"]);
        assert_eq!(config.language_format, Format::Yaml);
        assert_eq!(config.keywords, vec!["$gettext"]);
        // Unspecified fields keep their defaults.
        assert_eq!(config.tag_names, default_tag_names());
    }

    #[test]
    fn test_yml_alias_for_yaml() {
        let json = r#"{ "languageFormat": "yml" }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.language_format, Format::Yaml);
    }

    #[test]
    fn test_languages_dir_alias() {
        let json = r#"{ "languagesDir": "./lang" }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.languages_root, "./lang");
    }

    #[test]
    fn test_custom_extension_mapping() {
        let json = r#"{ "extensions": { "view": "component" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.extensions.get("view"), Some(&Grammar::Component));
    }

    #[test]
    fn test_validate_invalid_ignore_pattern() {
        let config = Config {
            ignores: vec!["[invalid".to_string()],
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("ignores"));
    }

    #[test]
    fn test_validate_invalid_attr_regex() {
        let config = Config {
            expr_attrs: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("src").join("components");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        let found = find_config_file(&sub_dir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_stops_at_git_boundary() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        assert!(find_config_file(dir.path()).is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "locales": ["de"] }"#,
        )
        .unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.from_file);
        assert_eq!(result.config.locales, vec!["de"]);
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(!result.from_file);
        assert_eq!(result.config.locales, default_locales());
    }

    #[test]
    fn test_load_config_with_invalid_pattern_fails() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "ignores": ["[invalid"] }"#,
        )
        .unwrap();

        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn test_default_config_json_round_trips() {
        let json = default_config_json().unwrap();
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.keywords, default_keywords());
        assert!(json.contains("languagesRoot"));
    }
}
