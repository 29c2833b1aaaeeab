//! Helpers over `rustpython-parser` expressions: evaluating literal
//! expressions into JSON values and rendering expressions back to source-like
//! text for fallbacks.

use rustpython_parser::ast;
use rustpython_parser::Mode;
use serde_json::{Map, Number, Value};

/// Evaluate a literal expression into a JSON value.
///
/// Covers the shapes Python's `ast.literal_eval` accepts: constants, unary
/// plus/minus on numbers, lists, tuples, sets and dicts. Returns `None` for
/// anything else (calls, names, comprehensions).
pub fn literal_value(expr: &ast::Expr) -> Option<Value> {
    match expr {
        ast::Expr::Constant(constant) => constant_value(&constant.value),
        ast::Expr::List(list) => collect_values(&list.elts),
        ast::Expr::Tuple(tuple) => collect_values(&tuple.elts),
        ast::Expr::Set(set) => collect_values(&set.elts),
        ast::Expr::Dict(dict) => {
            let mut map = Map::new();
            for (key, value) in dict.keys.iter().zip(&dict.values) {
                // `{**other}` spreads have no key expression; not a literal
                let key = key.as_ref()?;
                let key = match literal_value(key)? {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                map.insert(key, literal_value(value)?);
            }
            Some(Value::Object(map))
        }
        ast::Expr::UnaryOp(unary) => {
            let operand = literal_value(&unary.operand)?;
            match unary.op {
                ast::UnaryOp::UAdd => Some(operand),
                ast::UnaryOp::USub => negate(operand),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Parse free-standing text as a Python expression and literal-evaluate it.
pub fn literal_value_from_text(text: &str) -> Option<Value> {
    let parsed = rustpython_parser::parse(text.trim(), Mode::Expression, "<literal>").ok()?;
    match parsed {
        ast::Mod::Expression(module) => literal_value(&module.body),
        _ => None,
    }
}

fn collect_values(elts: &[ast::Expr]) -> Option<Value> {
    elts.iter().map(literal_value).collect::<Option<Vec<_>>>().map(Value::Array)
}

fn negate(value: Value) -> Option<Value> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Value::Number(Number::from(-i)))
            } else {
                n.as_f64().and_then(|f| Number::from_f64(-f)).map(Value::Number)
            }
        }
        _ => None,
    }
}

fn constant_value(constant: &ast::Constant) -> Option<Value> {
    match constant {
        ast::Constant::None => Some(Value::Null),
        ast::Constant::Bool(b) => Some(Value::Bool(*b)),
        ast::Constant::Str(s) => Some(Value::String(s.clone())),
        ast::Constant::Int(i) => {
            let digits = i.to_string();
            match digits.parse::<i64>() {
                Ok(n) => Some(Value::Number(Number::from(n))),
                // out of i64 range, keep the digits
                Err(_) => Some(Value::String(digits)),
            }
        }
        ast::Constant::Float(f) => Number::from_f64(*f).map(Value::Number),
        ast::Constant::Tuple(items) => items
            .iter()
            .map(constant_value)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        _ => None,
    }
}

/// Render an expression back to source-like text.
///
/// Used for annotation canonicalization and as the fallback representation of
/// non-literal defaults. Mirrors how Python would display the expression, not
/// a faithful unparser.
pub fn unparse(expr: &ast::Expr) -> String {
    match expr {
        ast::Expr::Name(name) => name.id.to_string(),
        ast::Expr::Attribute(attr) => format!("{}.{}", unparse(&attr.value), attr.attr),
        ast::Expr::Constant(constant) => constant_text(&constant.value),
        ast::Expr::Subscript(subscript) => {
            let inner = match subscript.slice.as_ref() {
                ast::Expr::Tuple(tuple) => unparse_list(&tuple.elts),
                other => unparse(other),
            };
            format!("{}[{}]", unparse(&subscript.value), inner)
        }
        ast::Expr::Tuple(tuple) => format!("({})", unparse_list(&tuple.elts)),
        ast::Expr::List(list) => format!("[{}]", unparse_list(&list.elts)),
        ast::Expr::Set(set) => format!("{{{}}}", unparse_list(&set.elts)),
        ast::Expr::Dict(dict) => {
            let entries: Vec<String> = dict
                .keys
                .iter()
                .zip(&dict.values)
                .map(|(key, value)| match key {
                    Some(key) => format!("{}: {}", unparse(key), unparse(value)),
                    None => format!("**{}", unparse(value)),
                })
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        ast::Expr::BinOp(binop) => format!(
            "{} {} {}",
            unparse(&binop.left),
            operator_text(binop.op),
            unparse(&binop.right)
        ),
        ast::Expr::UnaryOp(unary) => match unary.op {
            ast::UnaryOp::USub => format!("-{}", unparse(&unary.operand)),
            ast::UnaryOp::UAdd => format!("+{}", unparse(&unary.operand)),
            ast::UnaryOp::Not => format!("not {}", unparse(&unary.operand)),
            ast::UnaryOp::Invert => format!("~{}", unparse(&unary.operand)),
        },
        ast::Expr::Call(call) => {
            let args: Vec<String> = call.args.iter().map(unparse).collect();
            format!("{}({})", unparse(&call.func), args.join(", "))
        }
        _ => "<expr>".to_string(),
    }
}

fn unparse_list(elts: &[ast::Expr]) -> String {
    elts.iter().map(unparse).collect::<Vec<_>>().join(", ")
}

fn constant_text(constant: &ast::Constant) -> String {
    match constant {
        ast::Constant::None => "None".to_string(),
        ast::Constant::Bool(true) => "True".to_string(),
        ast::Constant::Bool(false) => "False".to_string(),
        ast::Constant::Str(s) => format!("'{s}'"),
        ast::Constant::Int(i) => i.to_string(),
        ast::Constant::Float(f) => f.to_string(),
        ast::Constant::Ellipsis => "...".to_string(),
        other => format!("{other:?}"),
    }
}

fn operator_text(op: ast::Operator) -> &'static str {
    match op {
        ast::Operator::Add => "+",
        ast::Operator::Sub => "-",
        ast::Operator::Mult => "*",
        ast::Operator::Div => "/",
        ast::Operator::BitOr => "|",
        ast::Operator::BitAnd => "&",
        ast::Operator::BitXor => "^",
        ast::Operator::Mod => "%",
        ast::Operator::Pow => "**",
        ast::Operator::FloorDiv => "//",
        ast::Operator::LShift => "<<",
        ast::Operator::RShift => ">>",
        ast::Operator::MatMult => "@",
    }
}
