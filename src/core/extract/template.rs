//! Template adapter: structured markup.
//!
//! Walks template markup with quick-xml in permissive mode and applies the
//! three extraction surfaces from the rule set:
//!
//! - structural: configured tag names (`<translate>`, `<i18n path="..">`)
//!   and marker attributes whose element text is the key itself;
//! - attributes: object-valued directives, value expressions, and bound
//!   expressions scanned for keyword calls;
//! - markers: `{{ ... }}` pairs scanned over the raw text.
//!
//! Embedded `<script>` regions re-enter the script adapter (and
//! `text/ng-template` re-enters this one) with line offsets kept absolute
//! to the outermost file.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::script::{self, Dialect};
use super::{Extractor, Marker, UsageMeta};
use crate::core::po::CatalogError;
use crate::utils::line_to;

pub(crate) fn extract_template(
    ex: &mut Extractor,
    file_path: &str,
    src: &str,
    start_line: usize,
) -> Result<(), CatalogError> {
    scan_elements(ex, file_path, src, start_line)?;
    scan_markers(ex, file_path, src, start_line)?;
    Ok(())
}

fn scan_elements(
    ex: &mut Extractor,
    file_path: &str,
    src: &str,
    start_line: usize,
) -> Result<(), CatalogError> {
    let mut reader = Reader::from_str(src);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    loop {
        let event_start = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Start(tag)) => {
                handle_element(ex, &mut reader, file_path, src, start_line, &tag, event_start, false)?;
            }
            Ok(Event::Empty(tag)) => {
                handle_element(ex, &mut reader, file_path, src, start_line, &tag, event_start, true)?;
            }
            Ok(_) => {}
            Err(err) => {
                let line = line_to(src, event_start, start_line);
                ex.warn(
                    file_path,
                    Some(line),
                    format!("failed to parse template markup: {}", err),
                );
                // The element scan cannot recover mid-tag; markers are
                // still scanned over the raw text by the caller.
                break;
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_element(
    ex: &mut Extractor,
    reader: &mut Reader<&[u8]>,
    file_path: &str,
    src: &str,
    start_line: usize,
    tag: &BytesStart,
    elem_start: usize,
    is_empty: bool,
) -> Result<(), CatalogError> {
    let rules = ex.rules();
    let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
    let attrs = collect_attrs(tag);

    // Embedded script region: hand off to the matching adapter with an
    // absolute line offset.
    if name == "script" {
        if is_empty {
            return Ok(());
        }
        let content_start = reader.buffer_position() as usize;
        let content = match reader.read_text(tag.name()) {
            Ok(content) => content,
            Err(err) => {
                ex.warn(
                    file_path,
                    Some(line_to(src, elem_start, start_line)),
                    format!("unterminated script block: {}", err),
                );
                return Ok(());
            }
        };
        let line = line_to(src, content_start, start_line);
        match attr_value(&attrs, "type") {
            None | Some("text/javascript") => {
                script::extract_module(ex, file_path, &content, line, Dialect::Es)?;
            }
            Some("text/ng-template") => {
                extract_template(ex, file_path, &content, line)?;
            }
            Some(_) => {}
        }
        return Ok(());
    }

    let tag_matched = rules.tag_names.contains(&name);
    let attr_matched = attrs
        .iter()
        .any(|(attr, _)| rules.attr_names.contains(attr));

    let meta = UsageMeta {
        plural: attr_value(&attrs, "translate-plural").map(String::from),
        comment: attr_value(&attrs, "translate-comment").map(String::from),
        context: attr_value(&attrs, "translate-context").map(String::from),
    };

    if tag_matched && let Some(path) = attr_value(&attrs, "path") {
        // <i18n path="key">: the attribute is the identifier.
        let line = line_to(src, elem_start, start_line);
        ex.add_message(file_path, line, path, meta.clone())?;
    } else if tag_matched && let Some(expr) = attr_value(&attrs, ":path") {
        // <i18n :path="expr">: a bound identifier expression.
        let line = attr_value_line(src, elem_start, ":path", start_line);
        script::extract_value_expression(ex, file_path, expr, line)?;
    } else if (tag_matched || attr_matched) && !is_empty {
        // The element's text content is the identifier.
        let content_start = reader.buffer_position() as usize;
        if let Ok(content) = reader.read_text(tag.name()) {
            let line = line_to(src, content_start, start_line);
            ex.add_message(file_path, line, content.trim(), meta)?;
        }
    }

    // Attribute surfaces, in precedence order: object-valued directives,
    // whole-value expressions, then expressions scanned for keyword calls.
    for (attr, value) in &attrs {
        if value.is_empty() {
            continue;
        }
        let line = attr_value_line(src, elem_start, attr, start_line);
        if let Some((_, paths)) = rules.object_attrs.iter().find(|(name, _)| name == attr) {
            script::extract_object_expression(ex, file_path, value, paths, line)?;
        } else if rules.value_attrs.iter().any(|p| p.is_match(attr)) {
            script::extract_value_expression(ex, file_path, value, line)?;
        } else if rules.expr_attrs.iter().any(|p| p.is_match(attr)) {
            script::extract_expression(ex, file_path, value, line)?;
        }
    }

    Ok(())
}

fn collect_attrs(tag: &BytesStart) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    // HTML-style parsing: templates use valueless attributes (`v-translate`)
    // that strict XML attribute parsing would reject.
    for attr in tag.html_attributes().with_checks(false) {
        let Ok(attr) = attr else { continue };
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        attrs.push((key, value));
    }
    attrs
}

fn attr_value<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(attr, _)| attr == name)
        .map(|(_, value)| value.as_str())
}

/// Line of an attribute's value, located by scanning the raw element text
/// the way the value appears on disk (attribute values may sit on their own
/// line in formatted templates).
fn attr_value_line(src: &str, elem_start: usize, attr: &str, start_line: usize) -> usize {
    let region = &src[elem_start..];
    let mut offset = 0;
    if let Some(attr_idx) = region.find(attr) {
        offset = attr_idx + attr.len();
        let bytes = region.as_bytes();
        while offset < bytes.len() && (bytes[offset] == b'=' || bytes[offset].is_ascii_whitespace())
        {
            offset += 1;
        }
        if offset < bytes.len() && (bytes[offset] == b'"' || bytes[offset] == b'\'') {
            offset += 1;
        }
    }
    line_to(src, elem_start + offset, start_line)
}

fn scan_markers(
    ex: &mut Extractor,
    file_path: &str,
    src: &str,
    start_line: usize,
) -> Result<(), CatalogError> {
    let rules = ex.rules();
    for marker in &rules.markers {
        for (offset, content) in MarkerMatches::new(src, marker) {
            let line = line_to(src, offset, start_line);
            script::extract_expression(ex, file_path, content, line)?;
        }
    }
    Ok(())
}

/// Lazy sequence of delimited marker contents; callers can take the first
/// match or exhaust the scan.
struct MarkerMatches<'s, 'm> {
    src: &'s str,
    marker: &'m Marker,
    pos: usize,
}

impl<'s, 'm> MarkerMatches<'s, 'm> {
    fn new(src: &'s str, marker: &'m Marker) -> Self {
        Self { src, marker, pos: 0 }
    }
}

impl<'s> Iterator for MarkerMatches<'s, '_> {
    /// (byte offset of the content, the content itself)
    type Item = (usize, &'s str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let start = self.src[self.pos..].find(&self.marker.start)?
                + self.pos
                + self.marker.start.len();
            match self.src[start..].find(&self.marker.end) {
                Some(end) => {
                    let content = &self.src[start..start + end];
                    self.pos = start + end + self.marker.end.len();
                    return Some((start, content));
                }
                // Unterminated marker: resume the scan after the opener.
                None => self.pos = start,
            }
        }
    }
}
