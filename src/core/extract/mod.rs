//! Key extraction: grammar adapters and the file-dispatch orchestrator.
//!
//! One [`Extractor`] owns the catalog for an extraction pass. Files are
//! dispatched to a grammar adapter by extension; every adapter funnels the
//! keys it finds through [`Extractor::add_message`], which records a
//! [`KeyUsage`] (the flat, ordered provenance list) and merges a catalog
//! entry. Adapters report recoverable problems to the diagnostics sink and
//! only surface fatal catalog errors.

mod component;
mod script;
mod template;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::diagnostics::Diagnostics;
use crate::core::po::{CatalogError, PoCatalog, PoEntryBuilder};

/// One located reference to a translation key. Immutable once produced;
/// several usages may share a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyUsage {
    pub key: String,
    pub file_path: String,
    pub line: usize,
    pub plural: Option<String>,
    pub comment: Option<String>,
    pub context: Option<String>,
}

/// Optional metadata carried by structural extraction surfaces
/// (`translate-plural`, `translate-comment`, `translate-context`).
#[derive(Debug, Clone, Default)]
pub struct UsageMeta {
    pub plural: Option<String>,
    pub comment: Option<String>,
    pub context: Option<String>,
}

/// The grammar a file extension maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grammar {
    /// Vue single-file component: top-level template/script blocks.
    Component,
    /// Standalone markup (template HTML).
    Template,
    /// JavaScript module.
    Script,
    /// TypeScript module: same walker as `Script` behind the TypeScript
    /// parser configuration.
    Typescript,
}

/// A keyword like `"this.$t:0"`: dotted callee name plus the argument
/// position holding the key (defaults to 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordDef {
    pub name: String,
    pub position: usize,
}

/// A delimiter pair scanned over raw template text, e.g. `{{` / `}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub start: String,
    pub end: String,
}

/// The declarative extraction configuration: which call names, tag names,
/// attribute patterns, and markers are significant for a project.
#[derive(Debug)]
pub struct RuleSet {
    keywords: Vec<KeywordDef>,
    pub tag_names: Vec<String>,
    pub attr_names: Vec<String>,
    /// Attribute name → property paths to try, in order. An empty path
    /// means "evaluate the attribute expression itself".
    pub object_attrs: Vec<(String, Vec<String>)>,
    /// Attributes whose whole value is a key expression.
    pub value_attrs: Vec<Regex>,
    /// Attributes whose value is scanned for keyword calls.
    pub expr_attrs: Vec<Regex>,
    pub markers: Vec<Marker>,
}

impl RuleSet {
    pub fn new(
        keywords: &[String],
        tag_names: Vec<String>,
        attr_names: Vec<String>,
        object_attrs: Vec<(String, Vec<String>)>,
        value_attrs: &[String],
        expr_attrs: &[String],
        markers: Vec<Marker>,
    ) -> Result<Self> {
        let compile = |patterns: &[String], what: &str| -> Result<Vec<Regex>> {
            patterns
                .iter()
                .map(|p| {
                    Regex::new(p).with_context(|| format!("Invalid pattern in '{}': \"{}\"", what, p))
                })
                .collect()
        };
        Ok(Self {
            keywords: keywords.iter().map(|k| parse_keyword(k)).collect(),
            tag_names,
            attr_names,
            object_attrs,
            value_attrs: compile(value_attrs, "valueAttrs")?,
            expr_attrs: compile(expr_attrs, "exprAttrs")?,
            markers,
        })
    }

    /// Argument position for a resolved dotted callee name, if the name is
    /// a configured keyword.
    pub fn keyword_position(&self, callee: &str) -> Option<usize> {
        self.keywords
            .iter()
            .find(|k| k.name == callee)
            .map(|k| k.position)
    }
}

/// Parse `"name"` or `"name:position"` into a [`KeywordDef`].
fn parse_keyword(keyword: &str) -> KeywordDef {
    match keyword.split_once(':') {
        Some((name, pos)) => KeywordDef {
            name: name.to_string(),
            position: pos.parse().unwrap_or(0),
        },
        None => KeywordDef {
            name: keyword.to_string(),
            position: 0,
        },
    }
}

/// Everything one extraction pass produced.
#[derive(Debug)]
pub struct Extraction {
    /// Flat ordered sequence of located references.
    pub usages: Vec<KeyUsage>,
    /// The accumulated PO catalog.
    pub catalog: PoCatalog,
    /// Recoverable problems encountered along the way.
    pub diagnostics: Diagnostics,
}

/// Dispatches source files to grammar adapters and accumulates the result.
///
/// Owns the catalog for the duration of the pass; [`finish`] hands
/// everything over read-only.
///
/// [`finish`]: Extractor::finish
pub struct Extractor<'a> {
    rules: &'a RuleSet,
    extensions: &'a HashMap<String, Grammar>,
    usages: Vec<KeyUsage>,
    catalog: PoCatalog,
    diagnostics: Diagnostics,
}

impl<'a> Extractor<'a> {
    pub fn new(rules: &'a RuleSet, extensions: &'a HashMap<String, Grammar>) -> Self {
        Self {
            rules,
            extensions,
            usages: Vec::new(),
            catalog: PoCatalog::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// The rule set outlives the extractor borrow, so adapters can hold it
    /// while pushing messages.
    pub fn rules(&self) -> &'a RuleSet {
        self.rules
    }

    /// Extract one file, choosing the adapter from the extension map.
    /// Unmapped extensions are skipped with a warning.
    pub fn extract_file(&mut self, file_path: &str, source: &str) -> Result<(), CatalogError> {
        let extension = Path::new(file_path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        match self.extensions.get(extension) {
            Some(grammar) => self.extract_source(*grammar, file_path, source, 1),
            None => {
                self.diagnostics
                    .warn(file_path, None, "skipping file with unmapped extension");
                Ok(())
            }
        }
    }

    /// Extract a source region with a known grammar. `start_line` is the
    /// absolute line the region starts at in the outermost file.
    pub fn extract_source(
        &mut self,
        grammar: Grammar,
        file_path: &str,
        source: &str,
        start_line: usize,
    ) -> Result<(), CatalogError> {
        match grammar {
            Grammar::Component => component::extract_component(self, file_path, source, start_line),
            Grammar::Template => template::extract_template(self, file_path, source, start_line),
            Grammar::Script => {
                script::extract_module(self, file_path, source, start_line, script::Dialect::Es)
            }
            Grammar::Typescript => {
                script::extract_module(self, file_path, source, start_line, script::Dialect::Ts)
            }
        }
    }

    /// Record one extracted key: append a usage and merge a catalog entry.
    /// Empty identifiers (after trimming) are dropped.
    pub(crate) fn add_message(
        &mut self,
        file_path: &str,
        line: usize,
        id: &str,
        meta: UsageMeta,
    ) -> Result<(), CatalogError> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(());
        }

        self.usages.push(KeyUsage {
            key: id.to_string(),
            file_path: file_path.to_string(),
            line,
            plural: meta.plural.clone(),
            comment: meta.comment.clone(),
            context: meta.context.clone(),
        });

        let existing = self.catalog.find(meta.context.as_deref(), id)?.cloned();
        let mut builder = match &existing {
            Some(entry) => PoEntryBuilder::from_entry(entry),
            None => PoEntryBuilder::new(meta.context.as_deref(), id),
        };
        builder.add_reference(file_path, line);
        if let Some(plural) = &meta.plural {
            builder.set_plural(plural)?;
        }
        if let Some(comment) = &meta.comment {
            builder.add_comment(comment);
        }
        self.catalog.upsert(builder.build())
    }

    pub(crate) fn warn(&mut self, file_path: &str, line: Option<usize>, message: impl Into<String>) {
        self.diagnostics.warn(file_path, line, message);
    }

    pub fn finish(self) -> Extraction {
        Extraction {
            usages: self.usages,
            catalog: self.catalog,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn default_extensions() -> HashMap<String, Grammar> {
        [
            ("vue".to_string(), Grammar::Component),
            ("js".to_string(), Grammar::Script),
            ("ts".to_string(), Grammar::Typescript),
        ]
        .into_iter()
        .collect()
    }

    fn vue_rules() -> RuleSet {
        RuleSet::new(
            &[
                "$t".to_string(),
                "vm.$t".to_string(),
                "this.$t".to_string(),
                "app.i18n.t".to_string(),
                "$tc".to_string(),
                "this.$tc".to_string(),
            ],
            vec!["translate".to_string(), "i18n".to_string()],
            vec!["v-translate".to_string()],
            vec![("v-t".to_string(), vec![String::new(), "path".to_string()])],
            &["^v-bind:".to_string()],
            &["^:".to_string(), "^v-".to_string()],
            vec![Marker {
                start: "{{".to_string(),
                end: "}}".to_string(),
            }],
        )
        .unwrap()
    }

    #[test]
    fn test_parse_keyword() {
        assert_eq!(
            parse_keyword("$t"),
            KeywordDef {
                name: "$t".to_string(),
                position: 0
            }
        );
        assert_eq!(
            parse_keyword("this.$tc:1"),
            KeywordDef {
                name: "this.$tc".to_string(),
                position: 1
            }
        );
    }

    #[test]
    fn test_keyword_position() {
        let rules = vue_rules();
        assert_eq!(rules.keyword_position("$t"), Some(0));
        assert_eq!(rules.keyword_position("app.i18n.t"), Some(0));
        assert_eq!(rules.keyword_position("other"), None);
    }

    #[test]
    fn test_invalid_attr_pattern_is_rejected() {
        let result = RuleSet::new(&[], vec![], vec![], vec![], &["[".to_string()], &[], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unmapped_extension_warns_and_continues() {
        let rules = vue_rules();
        let extensions = default_extensions();
        let mut extractor = Extractor::new(&rules, &extensions);
        extractor.extract_file("style.css", "body {}").unwrap();

        let extraction = extractor.finish();
        assert!(extraction.usages.is_empty());
        assert_eq!(extraction.diagnostics.len(), 1);
        assert_eq!(extraction.diagnostics.warnings()[0].file_path, "style.css");
    }

    #[test]
    fn test_add_message_trims_and_drops_empty() {
        let rules = vue_rules();
        let extensions = default_extensions();
        let mut extractor = Extractor::new(&rules, &extensions);
        extractor
            .add_message("a.vue", 1, "  key.one  ", UsageMeta::default())
            .unwrap();
        extractor
            .add_message("a.vue", 2, "   ", UsageMeta::default())
            .unwrap();

        let extraction = extractor.finish();
        assert_eq!(extraction.usages.len(), 1);
        assert_eq!(extraction.usages[0].key, "key.one");
        assert_eq!(extraction.catalog.len(), 1);
    }

    #[test]
    fn test_add_message_merges_catalog_entries() {
        let rules = vue_rules();
        let extensions = default_extensions();
        let mut extractor = Extractor::new(&rules, &extensions);
        extractor
            .add_message("a.vue", 1, "shared", UsageMeta::default())
            .unwrap();
        extractor
            .add_message("b.vue", 9, "shared", UsageMeta::default())
            .unwrap();

        let extraction = extractor.finish();
        assert_eq!(extraction.usages.len(), 2);
        assert_eq!(extraction.catalog.len(), 1);
        let entry = extraction.catalog.find(None, "shared").unwrap().unwrap();
        assert_eq!(entry.references.len(), 2);
    }
}
