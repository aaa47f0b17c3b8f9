//! Locale catalog readers.
//!
//! Each configured locale is read from `<messages_root>/<locale>.<ext>`.
//! JSON and YAML files deserialize into a value tree; ES-module catalogs
//! (`export default {...}`) are parsed with the same swc stack used for
//! extraction. Nested mappings flatten into the internal flat key space
//! with the configured separator.
//!
//! An unreadable root or a corrupt file is fatal; a locale file that does
//! not exist yet only warns (it will be created by sentinel write-back).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::Value;
use swc_common::{FileName, GLOBALS, Globals, SourceMap, sync::Lrc};
use swc_ecma_ast::{
    Expr, Lit, ModuleDecl, ModuleItem, ObjectLit, Prop, PropName, PropOrSpread,
};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax};

use super::{Format, LocaleMessages};
use crate::core::diagnostics::Diagnostics;

pub fn locale_file_path(messages_root: &Path, locale: &str, format: Format) -> PathBuf {
    messages_root.join(format!("{}.{}", locale, format.extension()))
}

/// Read every configured locale catalog under `messages_root`.
pub fn read_locales(
    messages_root: &Path,
    locales: &[String],
    format: Format,
    separator: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<LocaleMessages>> {
    if !messages_root.is_dir() {
        bail!(
            "languages directory '{}' is not a readable directory",
            messages_root.display()
        );
    }

    let mut result = Vec::with_capacity(locales.len());
    for locale in locales {
        let path = locale_file_path(messages_root, locale, format);
        let path_str = path.to_string_lossy().into_owned();
        let mut messages = LocaleMessages::new(locale.clone(), path_str.clone());

        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read language file '{}'", path.display()))?;
            let value = parse_content(&content, format, &path)?;
            flatten_into(&value, String::new(), separator, &mut messages);
        } else {
            diagnostics.warn(
                &path_str,
                None,
                format!("no catalog for locale '{}' yet, it will be created", locale),
            );
        }
        result.push(messages);
    }
    Ok(result)
}

fn parse_content(content: &str, format: Format, path: &Path) -> Result<Value> {
    match format {
        Format::Json => serde_json::from_str(content)
            .with_context(|| format!("Language file '{}' is corrupted", path.display())),
        Format::Yaml => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(content)
                .with_context(|| format!("Language file '{}' is corrupted", path.display()))?;
            serde_json::to_value(yaml)
                .with_context(|| format!("Language file '{}' is corrupted", path.display()))
        }
        Format::Js => parse_js_module(content, path),
    }
}

/// Parse an ES-module catalog: the default export must be an object
/// literal of (possibly nested) string values.
pub(crate) fn parse_js_module(content: &str, path: &Path) -> Result<Value> {
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file = source_map.new_source_file(
        FileName::Real(path.to_path_buf()).into(),
        content.to_string(),
    );
    let module = GLOBALS
        .set(&Globals::new(), || {
            let mut parser = Parser::new(
                Syntax::Es(EsSyntax::default()),
                StringInput::from(&*source_file),
                None,
            );
            parser.parse_module()
        })
        .map_err(|err| {
            anyhow::anyhow!(
                "Language file '{}' is corrupted: {}",
                path.display(),
                err.into_kind().msg()
            )
        })?;

    for item in &module.body {
        if let ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) = item {
            let mut expr = &*export.expr;
            while let Expr::Paren(paren) = expr {
                expr = &paren.expr;
            }
            if let Expr::Object(object) = expr {
                return Ok(object_to_value(object));
            }
        }
    }
    bail!(
        "Language file '{}' has no default-exported object",
        path.display()
    )
}

fn object_to_value(object: &ObjectLit) -> Value {
    let mut map = serde_json::Map::new();
    for prop in &object.props {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        let Prop::KeyValue(kv) = prop.as_ref() else {
            continue;
        };
        let Some(key) = prop_name(&kv.key) else {
            continue;
        };
        let value = match &*kv.value {
            Expr::Lit(Lit::Str(s)) => match s.value.as_str() {
                Some(value) => Value::String(value.to_string()),
                None => continue,
            },
            Expr::Lit(Lit::Null(_)) => Value::Null,
            Expr::Lit(Lit::Bool(b)) => Value::Bool(b.value),
            Expr::Lit(Lit::Num(n)) => serde_json::Number::from_f64(n.value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Expr::Object(nested) => object_to_value(nested),
            _ => continue,
        };
        map.insert(key, value);
    }
    Value::Object(map)
}

fn prop_name(name: &PropName) -> Option<String> {
    match name {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => s.value.as_str().map(str::to_string),
        _ => None,
    }
}

/// Flatten a value tree into dotted keys (separator-configurable),
/// preserving document order. Scalar leaves become entry values; explicit
/// nulls mark present-but-untranslated keys.
pub(crate) fn flatten_into(
    value: &Value,
    prefix: String,
    separator: &str,
    messages: &mut LocaleMessages,
) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}{}{}", prefix, separator, key)
                };
                flatten_into(child, child_prefix, separator, messages);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let child_prefix = if prefix.is_empty() {
                    index.to_string()
                } else {
                    format!("{}{}{}", prefix, separator, index)
                };
                flatten_into(child, child_prefix, separator, messages);
            }
        }
        Value::String(s) => messages.push(prefix, Some(s.clone())),
        Value::Null => messages.push(prefix, None),
        Value::Bool(b) => messages.push(prefix, Some(b.to_string())),
        Value::Number(n) => messages.push(prefix, Some(n.to_string())),
    }
}
