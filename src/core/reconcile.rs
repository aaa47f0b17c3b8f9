//! Reconciliation: classify every key as missing or unused, per locale.
//!
//! Missing and unused are exact symmetric-difference set operations over
//! identifiers: a usage matches a catalog entry only when the keys are
//! equal. For one locale, `missing ∪ matched` covers all distinct extracted
//! keys and `unused ∪ matched` covers all catalog keys.

use std::collections::{HashMap, HashSet};

use crate::core::extract::KeyUsage;
use crate::core::locale::{LocaleEntry, LocaleMessages};
use crate::issues::{Issue, MissingKeyIssue, UnusedKeyIssue};

/// Placeholder written into locale files for keys that are known but not
/// yet translated. The reconciler and the locale writers must agree on
/// this literal; both sides read it from here.
pub const UNTRANSLATED_PLACEHOLDER: &str = "__MISSING_TRANSLATION__";

/// The reconciliation report: ordered missing and unused classifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub missing: Vec<MissingKeyIssue>,
    pub unused: Vec<UnusedKeyIssue>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unused.is_empty()
    }

    /// The combined classification list for summary display.
    pub fn issues(&self) -> Vec<Issue> {
        self.missing
            .iter()
            .cloned()
            .map(Issue::MissingKey)
            .chain(self.unused.iter().cloned().map(Issue::UnusedKey))
            .collect()
    }
}

/// Compare extracted usages against each locale catalog independently.
///
/// Missing keys are emitted in first-seen usage order; a key whose catalog
/// value is absent or equals the placeholder is missing-but-tracked
/// (`is_new` false), anything not in the catalog at all is new. Unused keys
/// follow catalog order.
pub fn reconcile(usages: &[KeyUsage], locales: &[LocaleMessages]) -> Reconciliation {
    let mut report = Reconciliation::default();
    let used: HashSet<&str> = usages.iter().map(|u| u.key.as_str()).collect();

    for locale in locales {
        let index: HashMap<&str, &LocaleEntry> = locale
            .entries
            .iter()
            .map(|entry| (entry.key.as_str(), entry))
            .collect();

        let mut seen: HashSet<&str> = HashSet::new();
        for usage in usages {
            if !seen.insert(usage.key.as_str()) {
                continue;
            }
            match index.get(usage.key.as_str()) {
                None => report.missing.push(MissingKeyIssue {
                    key: usage.key.clone(),
                    file_path: usage.file_path.clone(),
                    line: usage.line,
                    locale: locale.locale.clone(),
                    is_new: true,
                }),
                Some(entry) => {
                    let untranslated = match &entry.value {
                        None => true,
                        Some(value) => value == UNTRANSLATED_PLACEHOLDER,
                    };
                    if untranslated {
                        report.missing.push(MissingKeyIssue {
                            key: usage.key.clone(),
                            file_path: usage.file_path.clone(),
                            line: usage.line,
                            locale: locale.locale.clone(),
                            is_new: false,
                        });
                    }
                }
            }
        }

        for entry in &locale.entries {
            if !used.contains(entry.key.as_str()) {
                report.unused.push(UnusedKeyIssue {
                    key: entry.key.clone(),
                    value: entry.value.clone().unwrap_or_default(),
                    locale: locale.locale.clone(),
                    file_path: entry.file_path.clone(),
                });
            }
        }
    }

    report
}
