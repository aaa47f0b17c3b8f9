//! Script adapter: JavaScript and TypeScript sources.
//!
//! Modules are parsed with swc and walked for call expressions whose dotted
//! callee name (`$t`, `this.$t`, `app.i18n.t`, ...) is a configured keyword;
//! the configured argument is lowered into the literal algebra and
//! evaluated. TypeScript is the same walker behind a different parser
//! configuration; swc produces one AST for both dialects.
//!
//! The adapter also evaluates standalone expressions for the template
//! surfaces: bound attribute values, object-valued directives, and
//! interpolation markers.

use swc_common::{
    FileName, GLOBALS, Globals, SourceMap, SourceMapper, Span, Spanned, sync::Lrc,
};
use swc_ecma_ast::{
    BinaryOp, CallExpr, Callee, Expr, Lit, MemberProp, ObjectLit, Prop, PropName, PropOrSpread,
};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};

use super::{Extractor, UsageMeta};
use crate::core::evaluate::{LitExpr, evaluate, evaluate_property};
use crate::core::po::CatalogError;

/// Parser configuration for the two script grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Es,
    Ts,
}

impl Dialect {
    fn syntax(self) -> Syntax {
        match self {
            Dialect::Es => Syntax::Es(EsSyntax::default()),
            Dialect::Ts => Syntax::Typescript(TsSyntax::default()),
        }
    }
}

/// Extract keyword calls from a whole module. Parse failure is a warning;
/// the rest of the scan continues with other files.
pub(crate) fn extract_module(
    ex: &mut Extractor,
    file_path: &str,
    source: &str,
    start_line: usize,
    dialect: Dialect,
) -> Result<(), CatalogError> {
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file =
        source_map.new_source_file(FileName::Real(file_path.into()).into(), source.to_string());

    let parsed = GLOBALS.set(&Globals::new(), || {
        let mut parser = Parser::new(dialect.syntax(), StringInput::from(&*source_file), None);
        parser.parse_module()
    });

    match parsed {
        Ok(module) => {
            let mut visitor = CallVisitor::new(ex, file_path, &source_map, start_line);
            module.visit_with(&mut visitor);
            visitor.into_result()
        }
        Err(err) => {
            // Dummy spans (lo == 0) have no position in the source map.
            let err_line = if err.span().lo.0 == 0 {
                1
            } else {
                source_map.lookup_char_pos(err.span().lo).line
            };
            ex.warn(
                file_path,
                Some(start_line - 1 + err_line),
                format!("failed to parse module: {}", err.into_kind().msg()),
            );
            Ok(())
        }
    }
}

/// Scan a standalone expression (attribute value, marker content) for
/// keyword calls.
pub(crate) fn extract_expression(
    ex: &mut Extractor,
    file_path: &str,
    source: &str,
    start_line: usize,
) -> Result<(), CatalogError> {
    match parse_expression(file_path, source) {
        Ok((expr, source_map)) => {
            let mut visitor = CallVisitor::new(ex, file_path, &source_map, start_line);
            expr.visit_with(&mut visitor);
            visitor.into_result()
        }
        Err(message) => {
            ex.warn(
                file_path,
                Some(start_line),
                format!("failed to parse expression '{}': {}", source.trim(), message),
            );
            Ok(())
        }
    }
}

/// Evaluate a standalone expression directly as key value(s), the
/// value-attribute surface (`v-bind:title="flag ? 'x.a' : 'x.b'"`).
pub(crate) fn extract_value_expression(
    ex: &mut Extractor,
    file_path: &str,
    source: &str,
    start_line: usize,
) -> Result<(), CatalogError> {
    let lowered = match parse_expression(file_path, source) {
        Ok((expr, _)) => lower(&expr),
        Err(message) => {
            ex.warn(
                file_path,
                Some(start_line),
                format!("failed to parse expression '{}': {}", source.trim(), message),
            );
            return Ok(());
        }
    };
    match evaluate(&lowered) {
        Ok(ids) => {
            for id in ids {
                ex.add_message(file_path, start_line, &id, UsageMeta::default())?;
            }
        }
        Err(err) => ex.warn(
            file_path,
            Some(start_line),
            format!("{}: '{}'", err, source.trim()),
        ),
    }
    Ok(())
}

/// Evaluate an object-valued directive argument under the configured
/// property paths, first success wins (`v-t="'k'"` via the empty path,
/// `v-t="{ path: 'k' }"` via `path`).
pub(crate) fn extract_object_expression(
    ex: &mut Extractor,
    file_path: &str,
    source: &str,
    paths: &[String],
    start_line: usize,
) -> Result<(), CatalogError> {
    let lowered = match parse_expression(file_path, source) {
        Ok((expr, _)) => lower(&expr),
        Err(message) => {
            ex.warn(
                file_path,
                Some(start_line),
                format!("failed to parse expression '{}': {}", source.trim(), message),
            );
            return Ok(());
        }
    };

    let mut failures = Vec::new();
    for path in paths {
        match evaluate_property(&lowered, path) {
            Ok(ids) => {
                for id in ids {
                    ex.add_message(file_path, start_line, &id, UsageMeta::default())?;
                }
                return Ok(());
            }
            Err(err) => failures.push(err),
        }
    }
    for err in failures {
        ex.warn(
            file_path,
            Some(start_line),
            format!("{}: '{}'", err, source.trim()),
        );
    }
    Ok(())
}

/// Parse a snippet in expression position. The snippet is wrapped in
/// parentheses so object literals parse as expressions; the wrapper adds no
/// newline, so line numbers are unaffected.
fn parse_expression(file_path: &str, source: &str) -> Result<(Box<Expr>, Lrc<SourceMap>), String> {
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file = source_map.new_source_file(
        FileName::Real(file_path.into()).into(),
        format!("({})", source),
    );
    GLOBALS.set(&Globals::new(), || {
        let mut parser = Parser::new(
            Syntax::Es(EsSyntax::default()),
            StringInput::from(&*source_file),
            None,
        );
        parser
            .parse_expr()
            .map(|expr| (expr, source_map.clone()))
            .map_err(|err| err.into_kind().msg().to_string())
    })
}

/// Walks every call expression and extracts configured keyword calls.
/// A fatal catalog error stops the walk; evaluation failures only warn.
struct CallVisitor<'a, 'b> {
    ex: &'a mut Extractor<'b>,
    file_path: &'a str,
    source_map: &'a SourceMap,
    start_line: usize,
    error: Option<CatalogError>,
}

impl<'a, 'b> CallVisitor<'a, 'b> {
    fn new(
        ex: &'a mut Extractor<'b>,
        file_path: &'a str,
        source_map: &'a SourceMap,
        start_line: usize,
    ) -> Self {
        Self {
            ex,
            file_path,
            source_map,
            start_line,
            error: None,
        }
    }

    fn into_result(self) -> Result<(), CatalogError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn line_of(&self, span: Span) -> usize {
        self.start_line - 1 + self.source_map.lookup_char_pos(span.lo).line
    }

    fn snippet(&self, span: Span) -> String {
        self.source_map.span_to_snippet(span).unwrap_or_default()
    }

    fn handle_call(&mut self, node: &CallExpr) {
        let Callee::Expr(callee) = &node.callee else {
            return;
        };
        let Some(name) = callee_name(callee) else {
            return;
        };
        let Some(position) = self.ex.rules().keyword_position(&name) else {
            return;
        };

        let line = self.line_of(node.span);
        let Some(arg) = node.args.get(position) else {
            self.ex.warn(
                self.file_path,
                Some(line),
                format!("call to '{}' is missing argument {}", name, position),
            );
            return;
        };
        if arg.spread.is_some() {
            self.ex.warn(
                self.file_path,
                Some(line),
                format!("cannot extract key from spread argument: '{}'", self.snippet(node.span)),
            );
            return;
        }

        match evaluate(&lower(&arg.expr)) {
            Ok(ids) => {
                for id in ids {
                    if let Err(err) = self.ex.add_message(self.file_path, line, &id, UsageMeta::default())
                    {
                        self.error = Some(err);
                        return;
                    }
                }
            }
            Err(err) => {
                self.ex.warn(
                    self.file_path,
                    Some(line),
                    format!("{}: '{}'", err, self.snippet(node.span)),
                );
            }
        }
    }
}

impl Visit for CallVisitor<'_, '_> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if self.error.is_some() {
            return;
        }
        self.handle_call(node);
        node.visit_children_with(self);
    }
}

/// Resolve a callee to its dotted name: `$t`, `this.$t`, `app.i18n.t`.
/// Computed properties and anything beyond identifier chains resolve to
/// nothing and the call is simply not a keyword match.
fn callee_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::This(_) => Some("this".to_string()),
        Expr::Member(member) => {
            let object = callee_name(&member.obj)?;
            let MemberProp::Ident(prop) = &member.prop else {
                return None;
            };
            Some(format!("{}.{}", object, prop.sym))
        }
        Expr::Paren(paren) => callee_name(&paren.expr),
        _ => None,
    }
}

/// Lower a swc expression into the closed literal algebra. Total match:
/// node kinds without a literal interpretation become `Opaque` with a label
/// for the warning message.
fn lower(expr: &Expr) -> LitExpr {
    match expr {
        Expr::Lit(Lit::Str(s)) => match s.value.as_str() {
            Some(value) => LitExpr::Str(value.to_string()),
            None => LitExpr::Opaque("string literal"),
        },
        Expr::Paren(paren) => lower(&paren.expr),
        Expr::Bin(bin) if bin.op == BinaryOp::Add => LitExpr::concat(lower(&bin.left), lower(&bin.right)),
        Expr::Cond(cond) => LitExpr::either(lower(&cond.cons), lower(&cond.alt)),
        Expr::Object(object) => lower_object(object),
        Expr::Ident(_) => LitExpr::Opaque("identifier"),
        Expr::Member(_) => LitExpr::Opaque("member expression"),
        Expr::Tpl(_) => LitExpr::Opaque("template literal"),
        Expr::Bin(_) => LitExpr::Opaque("binary expression"),
        Expr::Call(_) => LitExpr::Opaque("call expression"),
        _ => LitExpr::Opaque("expression"),
    }
}

fn lower_object(object: &ObjectLit) -> LitExpr {
    let mut props = Vec::new();
    for prop in &object.props {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        let Prop::KeyValue(kv) = prop.as_ref() else {
            continue;
        };
        let name = match &kv.key {
            PropName::Ident(ident) => ident.sym.to_string(),
            PropName::Str(s) => match s.value.as_str() {
                Some(value) => value.to_string(),
                None => continue,
            },
            _ => continue,
        };
        props.push((name, lower(&kv.value)));
    }
    LitExpr::Object(props)
}
