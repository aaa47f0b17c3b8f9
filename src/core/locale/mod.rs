//! Per-language translation catalogs.
//!
//! A locale catalog is an ordered sequence of flat key → value pairs read
//! from `<messages_root>/<locale>.<format>`. Nested on-disk structures are
//! flattened with the configured key separator; order is preserved because
//! the unused-key report follows catalog order.

pub mod read;
pub mod write;

use serde::{Deserialize, Serialize};

/// On-disk format of the per-locale catalog files. The JSON, YAML, and
/// ES-module forms are structurally equivalent: a flat or nested
/// key → string mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    #[serde(alias = "yml")]
    Yaml,
    Js,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Js => "js",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "js" => Some(Format::Js),
            _ => None,
        }
    }
}

/// One key from a locale file. A missing value (or the untranslated
/// placeholder, see [`crate::core::reconcile`]) marks the key as
/// present-but-untranslated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleEntry {
    pub key: String,
    pub value: Option<String>,
    pub locale: String,
    pub file_path: String,
}

/// All entries for one locale, in on-disk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleMessages {
    pub locale: String,
    pub file_path: String,
    pub entries: Vec<LocaleEntry>,
}

impl LocaleMessages {
    pub fn new(locale: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            file_path: file_path.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        self.entries.push(LocaleEntry {
            key,
            value,
            locale: self.locale.clone(),
            file_path: self.file_path.clone(),
        });
    }

    pub fn get(&self, key: &str) -> Option<&LocaleEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
