//! PO-style message catalog.
//!
//! Extraction accumulates every discovered key into a gettext-shaped
//! catalog: entries are unique by (context, id), repeated references merge
//! into one entry, and the whole catalog round-trips through the canonical
//! PO text form. Reference, comment, and flag sets are `BTreeSet`s so the
//! serialized output is identical no matter what order the source tree was
//! walked in.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

/// Fatal catalog errors. These indicate corrupt data and abort catalog
/// construction rather than being papered over.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("multiple message ids under context '{context}', unqualified lookup is ambiguous")]
    AmbiguousContext { context: String },

    #[error("conflicting plural form for '{id}': have '{existing}', got '{incoming}'")]
    PluralConflict {
        id: String,
        existing: String,
        incoming: String,
    },

    #[error("malformed reference '{reference}' at line {line}")]
    MalformedReference { reference: String, line: usize },

    #[error("malformed catalog entry at line {line}: {detail}")]
    MalformedEntry { line: usize, detail: String },
}

/// One message entry: a key plus everything learned about it across all
/// call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoEntry {
    /// Disambiguation context; `None` is the default bucket.
    pub context: Option<String>,
    /// The message identifier (msgid).
    pub id: String,
    /// Plural form, if any call site declared one.
    pub plural: Option<String>,
    /// "file:line" provenance, deduplicated and sorted.
    pub references: BTreeSet<String>,
    /// Extracted translator comments.
    pub comments: BTreeSet<String>,
    /// gettext flags.
    pub flags: BTreeSet<String>,
}

impl PoEntry {
    /// Merge another entry for the same key into this one.
    ///
    /// Reference/comment/flag sets union; plural forms must agree across
    /// call sites.
    fn merge(&mut self, other: PoEntry) -> Result<(), CatalogError> {
        match (&self.plural, other.plural) {
            (Some(existing), Some(incoming)) if *existing != incoming => {
                return Err(CatalogError::PluralConflict {
                    id: self.id.clone(),
                    existing: existing.clone(),
                    incoming,
                });
            }
            (None, Some(incoming)) => self.plural = Some(incoming),
            _ => {}
        }
        self.references.extend(other.references);
        self.comments.extend(other.comments);
        self.flags.extend(other.flags);
        Ok(())
    }
}

/// Accumulating builder for a [`PoEntry`]; finalized with [`build`] and
/// never shared across catalog entries.
///
/// [`build`]: PoEntryBuilder::build
#[derive(Debug, Clone)]
pub struct PoEntryBuilder {
    context: Option<String>,
    id: String,
    plural: Option<String>,
    references: BTreeSet<String>,
    comments: BTreeSet<String>,
    flags: BTreeSet<String>,
}

impl PoEntryBuilder {
    pub fn new(context: Option<&str>, id: &str) -> Self {
        Self {
            context: context.filter(|c| !c.is_empty()).map(String::from),
            id: id.trim().to_string(),
            plural: None,
            references: BTreeSet::new(),
            comments: BTreeSet::new(),
            flags: BTreeSet::new(),
        }
    }

    pub fn from_entry(entry: &PoEntry) -> Self {
        Self {
            context: entry.context.clone(),
            id: entry.id.clone(),
            plural: entry.plural.clone(),
            references: entry.references.clone(),
            comments: entry.comments.clone(),
            flags: entry.flags.clone(),
        }
    }

    pub fn add_reference(&mut self, file: &str, line: usize) -> &mut Self {
        self.references.insert(format!("{}:{}", file, line));
        self
    }

    pub fn set_plural(&mut self, plural: &str) -> Result<&mut Self, CatalogError> {
        if let Some(existing) = &self.plural
            && existing != plural
        {
            return Err(CatalogError::PluralConflict {
                id: self.id.clone(),
                existing: existing.clone(),
                incoming: plural.to_string(),
            });
        }
        self.plural = Some(plural.to_string());
        Ok(self)
    }

    pub fn add_comment(&mut self, comment: &str) -> &mut Self {
        self.comments.insert(comment.to_string());
        self
    }

    pub fn add_flag(&mut self, flag: &str) -> &mut Self {
        self.flags.insert(flag.to_string());
        self
    }

    pub fn build(self) -> PoEntry {
        PoEntry {
            context: self.context,
            id: self.id,
            plural: self.plural,
            references: self.references,
            comments: self.comments,
            flags: self.flags,
        }
    }
}

/// The full message catalog for one extraction pass: context bucket →
/// message id → entry. The empty context is the default bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoCatalog {
    buckets: BTreeMap<String, BTreeMap<String, PoEntry>>,
}

impl PoCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry by (context, id).
    ///
    /// In a non-empty context with no exact id match, the sole entry under
    /// that context is returned as a best-effort match. This mirrors how
    /// context-tagged catalogs are commonly authored (one message per
    /// context), but it is a heuristic: it can alias a genuinely new id
    /// onto the existing entry. Two or more candidates are never resolved
    /// silently; that is a fatal ambiguity.
    pub fn find(&self, context: Option<&str>, id: &str) -> Result<Option<&PoEntry>, CatalogError> {
        let ctx = context.unwrap_or("");
        let Some(bucket) = self.buckets.get(ctx) else {
            return Ok(None);
        };
        if ctx.is_empty() {
            return Ok(bucket.get(id));
        }
        if let Some(entry) = bucket.get(id) {
            return Ok(Some(entry));
        }
        match bucket.len() {
            0 => Ok(None),
            1 => Ok(bucket.values().next()),
            _ => Err(CatalogError::AmbiguousContext {
                context: ctx.to_string(),
            }),
        }
    }

    /// Insert or merge an entry.
    ///
    /// The target is resolved through [`find`], so in a named context an
    /// incoming entry merges onto the sole existing entry even when the ids
    /// differ (see the lookup heuristic above). Merging unions the
    /// reference/comment/flag sets and rejects conflicting plural forms.
    ///
    /// [`find`]: PoCatalog::find
    pub fn upsert(&mut self, entry: PoEntry) -> Result<(), CatalogError> {
        let ctx_key = entry.context.clone().unwrap_or_default();
        let target_id = match self.find(entry.context.as_deref(), &entry.id)? {
            Some(existing) => existing.id.clone(),
            None => entry.id.clone(),
        };
        let bucket = self.buckets.entry(ctx_key).or_default();
        match bucket.get_mut(&target_id) {
            Some(existing) => existing.merge(entry)?,
            None => {
                bucket.insert(target_id, entry);
            }
        }
        Ok(())
    }

    /// All entries, ordered by (context, id). The default bucket sorts
    /// first because it is keyed by the empty string.
    pub fn entries(&self) -> impl Iterator<Item = &PoEntry> {
        self.buckets.values().flat_map(|bucket| bucket.values())
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(|b| b.is_empty())
    }

    /// Serialize to the canonical PO text form.
    ///
    /// Entries are sorted by (context, id); reference, flag, and comment
    /// lines are sorted within each entry. The output is byte-identical for
    /// equal catalogs regardless of construction order.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        out.push_str("msgid \"\"\n");
        out.push_str("msgstr \"\"\n");
        out.push_str("\"Project-Id-Version: vintl\\n\"\n");
        out.push_str("\"MIME-Version: 1.0\\n\"\n");
        out.push_str("\"Content-Type: text/plain; charset=utf-8\\n\"\n");
        out.push_str("\"Content-Transfer-Encoding: 8bit\\n\"\n");

        for entry in self.entries() {
            out.push('\n');
            for comment in &entry.comments {
                out.push_str("#. ");
                out.push_str(comment);
                out.push('\n');
            }
            for reference in &entry.references {
                out.push_str("#: ");
                out.push_str(reference);
                out.push('\n');
            }
            for flag in &entry.flags {
                out.push_str("#, ");
                out.push_str(flag);
                out.push('\n');
            }
            if let Some(context) = &entry.context {
                out.push_str(&format!("msgctxt \"{}\"\n", escape(context)));
            }
            out.push_str(&format!("msgid \"{}\"\n", escape(&entry.id)));
            match &entry.plural {
                Some(plural) => {
                    out.push_str(&format!("msgid_plural \"{}\"\n", escape(plural)));
                    out.push_str("msgstr[0] \"\"\n");
                    out.push_str("msgstr[1] \"\"\n");
                }
                None => out.push_str("msgstr \"\"\n"),
            }
        }
        out
    }

    /// Parse the canonical PO text form back into a catalog.
    ///
    /// Reconstructs an equivalent catalog for anything produced by
    /// [`serialize`]. Entries are inserted directly (no merge heuristics);
    /// malformed references or entries abort with a [`CatalogError`].
    ///
    /// [`serialize`]: PoCatalog::serialize
    pub fn deserialize(text: &str) -> Result<Self, CatalogError> {
        let mut catalog = PoCatalog::new();

        for block in blocks(text) {
            let entry = parse_block(&block)?;
            // Header carries no key; authored catalogs are unique by
            // (context, id) so a plain insert suffices.
            if entry.id.is_empty() && entry.context.is_none() {
                continue;
            }
            let ctx_key = entry.context.clone().unwrap_or_default();
            catalog
                .buckets
                .entry(ctx_key)
                .or_default()
                .insert(entry.id.clone(), entry);
        }
        Ok(catalog)
    }
}

/// Split PO text into blank-line-separated blocks, keeping each line's
/// 1-based number for error reporting.
fn blocks(text: &str) -> Vec<Vec<(usize, String)>> {
    let mut result = Vec::new();
    let mut current: Vec<(usize, String)> = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                result.push(std::mem::take(&mut current));
            }
        } else {
            current.push((i + 1, line.to_string()));
        }
    }
    if !current.is_empty() {
        result.push(current);
    }
    result
}

/// Which string-valued field a bare `"..."` continuation line extends.
enum Field {
    None,
    Context,
    Id,
    Plural,
    Str,
}

fn parse_block(block: &[(usize, String)]) -> Result<PoEntry, CatalogError> {
    let mut context: Option<String> = None;
    let mut id: Option<String> = None;
    let mut plural: Option<String> = None;
    let mut references = BTreeSet::new();
    let mut comments = BTreeSet::new();
    let mut flags = BTreeSet::new();
    let mut field = Field::None;

    for (line_no, line) in block {
        let line_no = *line_no;
        if let Some(rest) = line.strip_prefix("#:") {
            for reference in rest.split_whitespace() {
                validate_reference(reference, line_no)?;
                references.insert(reference.to_string());
            }
            field = Field::None;
        } else if let Some(rest) = line.strip_prefix("#.") {
            comments.insert(rest.trim().to_string());
            field = Field::None;
        } else if let Some(rest) = line.strip_prefix("#,") {
            for flag in rest.split(',') {
                let flag = flag.trim();
                if !flag.is_empty() {
                    flags.insert(flag.to_string());
                }
            }
            field = Field::None;
        } else if line.starts_with('#') {
            // Translator comments and other markers are tolerated.
            field = Field::None;
        } else if let Some(rest) = line.strip_prefix("msgctxt ") {
            context = Some(quoted(rest, line_no)?);
            field = Field::Context;
        } else if let Some(rest) = line.strip_prefix("msgid_plural ") {
            plural = Some(quoted(rest, line_no)?);
            field = Field::Plural;
        } else if let Some(rest) = line.strip_prefix("msgid ") {
            id = Some(quoted(rest, line_no)?);
            field = Field::Id;
        } else if line.starts_with("msgstr") {
            let rest = line
                .splitn(2, ' ')
                .nth(1)
                .ok_or_else(|| CatalogError::MalformedEntry {
                    line: line_no,
                    detail: "msgstr without a value".to_string(),
                })?;
            quoted(rest, line_no)?;
            field = Field::Str;
        } else if line.starts_with('"') {
            let continued = quoted(line, line_no)?;
            match field {
                Field::Context => append(&mut context, &continued),
                Field::Id => append(&mut id, &continued),
                Field::Plural => append(&mut plural, &continued),
                Field::Str => {}
                Field::None => {
                    return Err(CatalogError::MalformedEntry {
                        line: line_no,
                        detail: "continuation line outside any field".to_string(),
                    });
                }
            }
        } else {
            return Err(CatalogError::MalformedEntry {
                line: line_no,
                detail: format!("unrecognized line '{}'", line),
            });
        }
    }

    let Some(id) = id else {
        let line = block.first().map(|(n, _)| *n).unwrap_or(0);
        return Err(CatalogError::MalformedEntry {
            line,
            detail: "entry without msgid".to_string(),
        });
    };

    Ok(PoEntry {
        context: context.filter(|c| !c.is_empty()),
        id,
        plural,
        references,
        comments,
        flags,
    })
}

fn append(target: &mut Option<String>, continued: &str) {
    if let Some(value) = target {
        value.push_str(continued);
    }
}

/// References must be "file:line" with a numeric line part.
fn validate_reference(reference: &str, line: usize) -> Result<(), CatalogError> {
    let malformed = || CatalogError::MalformedReference {
        reference: reference.to_string(),
        line,
    };
    let (_, line_part) = reference.rsplit_once(':').ok_or_else(malformed)?;
    if line_part.is_empty() || !line_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    Ok(())
}

fn quoted(raw: &str, line: usize) -> Result<String, CatalogError> {
    let raw = raw.trim();
    let inner = raw
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .ok_or_else(|| CatalogError::MalformedEntry {
            line,
            detail: format!("expected quoted string, got '{}'", raw),
        })?;
    Ok(unescape(inner))
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
