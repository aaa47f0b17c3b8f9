//! Classification records produced by reconciliation.
//!
//! Each issue is self-contained: everything the reporter needs to display
//! it and the write-back action needs to fix it.

use enum_dispatch::enum_dispatch;

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    MissingKey,
    UnusedKey,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::MissingKey => write!(f, "missing-key"),
            Rule::UnusedKey => write!(f, "unused-key"),
        }
    }
}

/// A key referenced in source with no translation in one locale.
///
/// `is_new` distinguishes a key the catalog has never seen from one that is
/// already tracked with the untranslated placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKeyIssue {
    pub key: String,
    pub file_path: String,
    pub line: usize,
    pub locale: String,
    pub is_new: bool,
}

impl MissingKeyIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::MissingKey
    }
}

/// A catalog key no source reference uses, in one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedKeyIssue {
    pub key: String,
    pub value: String,
    pub locale: String,
    pub file_path: String,
}

impl UnusedKeyIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::UnusedKey
    }
}

/// A reconciliation issue.
#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    MissingKey(MissingKeyIssue),
    UnusedKey(UnusedKeyIssue),
}

/// Consistent reporting interface over all issue types; `enum_dispatch`
/// generates the dispatch on [`Issue`].
#[enum_dispatch]
pub trait Report {
    /// Primary message to display.
    fn message(&self) -> String;

    /// "file" or "file:line" the issue points at.
    fn location(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    /// The locale the issue belongs to.
    fn locale(&self) -> &str;
}

impl Report for MissingKeyIssue {
    fn message(&self) -> String {
        if self.is_new {
            format!("'{}' has no entry in locale '{}'", self.key, self.locale)
        } else {
            format!("'{}' is still untranslated in locale '{}'", self.key, self.locale)
        }
    }

    fn location(&self) -> String {
        format!("{}:{}", self.file_path, self.line)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn locale(&self) -> &str {
        &self.locale
    }
}

impl Report for UnusedKeyIssue {
    fn message(&self) -> String {
        format!("'{}' is never referenced from source", self.key)
    }

    fn location(&self) -> String {
        self.file_path.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn locale(&self) -> &str {
        &self.locale
    }
}
