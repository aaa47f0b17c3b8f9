//! Component adapter: Vue single-file components.
//!
//! An SFC is a sequence of top-level blocks (`<template>`, `<script>`,
//! `<style>`, custom blocks). Script bodies are raw text (`if (a < b)` is
//! not markup), so the blocks are located with a small scanner instead of
//! an XML reader, the same way SFC tooling splits them. Template and script
//! blocks are handed to their adapters with line offsets absolute to the
//! component file; everything else is skipped whole.

use super::script::{self, Dialect};
use super::{Extractor, template};
use crate::core::po::CatalogError;
use crate::utils::line_to;

pub(crate) fn extract_component(
    ex: &mut Extractor,
    file_path: &str,
    src: &str,
    start_line: usize,
) -> Result<(), CatalogError> {
    for block in SfcBlocks::new(src) {
        if block.content.trim().is_empty() {
            continue;
        }
        let line = line_to(src, block.content_offset, start_line);
        match block.name {
            "template" => template::extract_template(ex, file_path, block.content, line)?,
            "script" => {
                if !matches!(block.attr("type"), None | Some("text/javascript")) {
                    continue;
                }
                let dialect = match block.attr("lang") {
                    Some("ts") | Some("typescript") => Dialect::Ts,
                    _ => Dialect::Es,
                };
                script::extract_module(ex, file_path, block.content, line, dialect)?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// A top-level SFC block with its raw content and byte offset.
struct SfcBlock<'s> {
    name: &'s str,
    attrs: Vec<(String, Option<String>)>,
    content: &'s str,
    content_offset: usize,
}

impl SfcBlock<'_> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .and_then(|(_, value)| value.as_deref())
    }
}

/// Lazy sequence of top-level blocks; callers can stop at the first match
/// or exhaust the component.
struct SfcBlocks<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> SfcBlocks<'s> {
    fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }
}

impl<'s> Iterator for SfcBlocks<'s> {
    type Item = SfcBlock<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        let src = self.src;
        while self.pos < src.len() {
            let lt = src[self.pos..].find('<')? + self.pos;
            let rest = &src[lt..];

            if rest.starts_with("<!--") {
                match rest.find("-->") {
                    Some(end) => {
                        self.pos = lt + end + 3;
                        continue;
                    }
                    None => return None,
                }
            }
            if rest.starts_with("</") {
                // Stray closing tag at top level.
                self.pos = lt + 2;
                continue;
            }

            let name_start = lt + 1;
            let name_len = src[name_start..]
                .bytes()
                .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-')
                .count();
            if name_len == 0 {
                self.pos = lt + 1;
                continue;
            }
            let name = &src[name_start..name_start + name_len];

            let Some((open_end, self_closing)) = find_tag_end(src, name_start + name_len) else {
                return None;
            };
            if self_closing {
                self.pos = open_end;
                continue;
            }

            let Some((content_end, after_close)) = find_block_end(src, open_end, name) else {
                // No matching close; skip past the open tag.
                self.pos = open_end;
                continue;
            };
            self.pos = after_close;

            if name == "template" || name == "script" {
                return Some(SfcBlock {
                    name,
                    attrs: parse_block_attrs(&src[name_start + name_len..open_end - 1]),
                    content: &src[open_end..content_end],
                    content_offset: open_end,
                });
            }
        }
        None
    }
}

/// Find the end of an open tag, honoring quoted attribute values.
/// Returns the index just past `>` and whether the tag was self-closing.
fn find_tag_end(src: &str, from: usize) -> Option<(usize, bool)> {
    let bytes = src.as_bytes();
    let mut quote: Option<u8> = None;
    for i in from..bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Some((i + 1, i > from && bytes[i - 1] == b'/')),
                _ => {}
            },
        }
    }
    None
}

/// Find the matching close tag for a block opened at `from`, tracking
/// nesting of same-named tags (templates may nest `<template>` elements).
/// Returns (content end, index just past the close tag).
fn find_block_end(src: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let open_pat = format!("<{}", name);
    let close_pat = format!("</{}", name);
    let mut depth = 1usize;
    let mut pos = from;
    loop {
        let close_abs = pos + src[pos..].find(&close_pat)?;
        if !is_name_boundary(src, close_abs + close_pat.len()) {
            pos = close_abs + close_pat.len();
            continue;
        }

        let mut scan = pos;
        while let Some(open_rel) = src[scan..close_abs].find(&open_pat) {
            let after = scan + open_rel + open_pat.len();
            if is_name_boundary(src, after) {
                depth += 1;
            }
            scan = after;
        }

        depth -= 1;
        if depth == 0 {
            let after_close = src[close_abs..]
                .find('>')
                .map(|gt| close_abs + gt + 1)
                .unwrap_or(src.len());
            return Some((close_abs, after_close));
        }
        pos = close_abs + close_pat.len();
    }
}

fn is_name_boundary(src: &str, idx: usize) -> bool {
    match src.as_bytes().get(idx) {
        None => true,
        Some(b) => b.is_ascii_whitespace() || *b == b'>' || *b == b'/',
    }
}

/// Parse the attribute text of a block's open tag. Valueless attributes
/// (`<script setup>`) carry `None`.
fn parse_block_attrs(s: &str) -> Vec<(String, Option<String>)> {
    let mut attrs = Vec::new();
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        let name_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
            i += 1;
        }
        let name = s[name_start..i].to_string();
        if name.is_empty() {
            i += 1;
            continue;
        }
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let value = if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let q = bytes[i];
                i += 1;
                let value_start = i;
                while i < bytes.len() && bytes[i] != q {
                    i += 1;
                }
                let value = s[value_start..i].to_string();
                i = (i + 1).min(bytes.len());
                value
            } else {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                s[value_start..i].to_string()
            };
            attrs.push((name, Some(value)));
        } else {
            attrs.push((name, None));
        }
    }
    attrs
}
