//! Canonicalization of Python type annotations.
//!
//! Maps a raw annotation (AST expression or its string form) to a short
//! canonical type name plus optional "extras": the literal arguments of a
//! parameterized annotation, most importantly the allowed values of a
//! `Literal[...]` choice type.

use regex::Regex;
use rustpython_parser::ast;
use serde_json::Value;
use std::sync::OnceLock;

use crate::parser::pyexpr::{literal_value, literal_value_from_text, unparse};

/// Canonical name used when no type can be determined.
pub const TYPENAME_ANY: &str = "any";
/// Sentinel outer names kept for special-case handling downstream.
pub const TYPENAME_LITERAL: &str = "Literal";
pub const TYPENAME_UNION: &str = "Union";
pub const TYPENAME_OPTIONAL: &str = "Optional";

/// Concrete built-in types mapped straight through.
const BASIC_TYPES: &[&str] = &["int", "float", "str", "bool", "list", "tuple", "dict"];

/// `Outer[Inner, ...]` shape: dotted outer name plus bracketed arguments.
fn parameterized_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)^([A-Za-z_][A-Za-z0-9_.]*)\s*\[(.*)\]$").unwrap())
}

/// Resolve an outer type name (with an optional `typing.` prefix) against the
/// alias table. `None` means the name is not a known generic alias.
fn resolve_outer_name(name: &str) -> Option<&'static str> {
    let bare = name.strip_prefix("typing.").unwrap_or(name);
    match bare {
        "int" => Some("int"),
        "float" => Some("float"),
        "str" => Some("str"),
        "bool" => Some("bool"),
        "list" => Some("list"),
        "tuple" => Some("tuple"),
        "dict" => Some("dict"),
        "Any" => Some(TYPENAME_ANY),
        "AnyStr" => Some("str"),
        "Dict" | "OrderedDict" | "MutableMapping" => Some("dict"),
        "Iterable" | "List" | "Sequence" | "MutableSequence" => Some("list"),
        "Tuple" => Some("tuple"),
        "Union" => Some(TYPENAME_UNION),
        "Optional" => Some(TYPENAME_OPTIONAL),
        "Literal" => Some(TYPENAME_LITERAL),
        _ => None,
    }
}

/// Canonicalize the string form of an annotation.
///
/// Pure and deterministic. Resolution order: exact built-in match,
/// `Outer[...]` split plus alias lookup, bare alias lookup, dotted name's
/// final segment, raw string fallback.
pub fn normalize_typename_str(annotation: &str) -> (String, Option<Vec<Value>>) {
    let annotation = annotation.trim();
    if BASIC_TYPES.contains(&annotation) {
        return (annotation.to_string(), None);
    }
    if let Some(captures) = parameterized_pattern().captures(annotation) {
        let outer = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        if let Some(canonical) = resolve_outer_name(outer) {
            let extras = split_type_args(captures.get(2).map(|m| m.as_str()).unwrap_or_default())
                .into_iter()
                .map(|arg| literal_value_from_text(&arg).unwrap_or(Value::String(arg)))
                .collect::<Vec<_>>();
            let extras = if extras.is_empty() { None } else { Some(extras) };
            return (canonical.to_string(), extras);
        }
        // unknown generic, keep the raw form
        return (annotation.to_string(), None);
    }
    if let Some(canonical) = resolve_outer_name(annotation) {
        return (canonical.to_string(), None);
    }
    // a dotted reference resolves to the class name it ends with
    if let Some((_, last)) = annotation.rsplit_once('.') {
        if !last.is_empty() && last.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return (last.to_string(), None);
        }
    }
    (annotation.to_string(), None)
}

/// Canonicalize an annotation AST expression.
///
/// String annotations recurse through the string form; PEP 604 unions
/// (`int | None`) map to the `Union` sentinel with the operand texts as
/// extras; parameterized annotations take their extras straight from the AST
/// so declaration order and literal values are preserved exactly.
pub fn normalize_annotation(expr: &ast::Expr) -> (String, Option<Vec<Value>>) {
    match expr {
        ast::Expr::Constant(constant) => {
            if let ast::Constant::Str(text) = &constant.value {
                normalize_typename_str(text)
            } else {
                normalize_typename_str(&unparse(expr))
            }
        }
        ast::Expr::BinOp(binop) if matches!(binop.op, ast::Operator::BitOr) => {
            let mut operands = Vec::new();
            flatten_union(expr, &mut operands);
            (TYPENAME_UNION.to_string(), Some(operands))
        }
        ast::Expr::Subscript(subscript) => {
            let outer = unparse(&subscript.value);
            match resolve_outer_name(&outer) {
                Some(canonical) => {
                    let args: Vec<&ast::Expr> = match subscript.slice.as_ref() {
                        ast::Expr::Tuple(tuple) => tuple.elts.iter().collect(),
                        other => vec![other],
                    };
                    let extras = args
                        .into_iter()
                        .map(|arg| literal_value(arg).unwrap_or_else(|| Value::String(unparse(arg))))
                        .collect::<Vec<_>>();
                    let extras = if extras.is_empty() { None } else { Some(extras) };
                    (canonical.to_string(), extras)
                }
                None => (unparse(expr), None),
            }
        }
        _ => normalize_typename_str(&unparse(expr)),
    }
}

fn flatten_union(expr: &ast::Expr, out: &mut Vec<Value>) {
    match expr {
        ast::Expr::BinOp(binop) if matches!(binop.op, ast::Operator::BitOr) => {
            flatten_union(&binop.left, out);
            flatten_union(&binop.right, out);
        }
        other => {
            out.push(literal_value(other).unwrap_or_else(|| Value::String(unparse(other))));
        }
    }
}

/// Split a bracketed argument list on top-level commas, respecting nested
/// brackets and quoted strings.
fn split_type_args(args: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for c in args.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                '[' | '(' | '{' => {
                    depth += 1;
                    current.push(c);
                }
                ']' | ')' | '}' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                ',' if depth == 0 => {
                    let part = current.trim().to_string();
                    if !part.is_empty() {
                        parts.push(part);
                    }
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }
    let part = current.trim().to_string();
    if !part.is_empty() {
        parts.push(part);
    }
    parts
}
