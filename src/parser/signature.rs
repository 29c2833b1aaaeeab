//! Signature reflection over a parsed Python module.
//!
//! Resolves a reflection target (function, `Class`, `Class.method`) to its
//! `def` node and turns the declared parameters into [`ParameterInfo`]
//! records in declaration order.

use rustpython_parser::ast;

use crate::core::errors::{Error, Result};
use crate::core::info::{ParamDefault, ParameterInfo};
use crate::parser::annotations::normalize_annotation;
use crate::parser::pyexpr::{literal_value, unparse};

/// Canonical type assigned to a `*args` parameter.
pub const TYPENAME_FOR_VARARGS: &str = "list";
/// Canonical type assigned to a `**kwargs` parameter.
pub const TYPENAME_FOR_KWARGS: &str = "dict";

/// A `def` node, sync or async; both carry identical signature data.
#[derive(Debug, Clone, Copy)]
pub enum DefRef<'a> {
    Sync(&'a ast::StmtFunctionDef),
    Async(&'a ast::StmtAsyncFunctionDef),
}

impl<'a> DefRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            DefRef::Sync(def) => def.name.as_str(),
            DefRef::Async(def) => def.name.as_str(),
        }
    }

    pub fn args(&self) -> &'a ast::Arguments {
        match self {
            DefRef::Sync(def) => &def.args,
            DefRef::Async(def) => &def.args,
        }
    }

    pub fn body(&self) -> &'a [ast::Stmt] {
        match self {
            DefRef::Sync(def) => &def.body,
            DefRef::Async(def) => &def.body,
        }
    }

    /// The docstring: a leading string-literal expression statement.
    pub fn docstring(&self) -> Option<&'a str> {
        match self.body().first()? {
            ast::Stmt::Expr(stmt) => match stmt.value.as_ref() {
                ast::Expr::Constant(constant) => match &constant.value {
                    ast::Constant::Str(text) => Some(text.as_str()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        }
    }
}

/// The resolved reflection target.
#[derive(Debug, Clone)]
pub struct ResolvedTarget<'a> {
    pub def: DefRef<'a>,
    /// Method or constructor, so a receiver parameter may need skipping
    pub is_method: bool,
    /// Display name: the function or method name, or the class name when a
    /// class was reflected via its `__init__`
    pub name: String,
}

fn def_of(stmt: &ast::Stmt) -> Option<DefRef<'_>> {
    match stmt {
        ast::Stmt::FunctionDef(def) => Some(DefRef::Sync(def)),
        ast::Stmt::AsyncFunctionDef(def) => Some(DefRef::Async(def)),
        _ => None,
    }
}

fn find_def<'a>(body: &'a [ast::Stmt], name: &str) -> Option<DefRef<'a>> {
    body.iter()
        .filter_map(def_of)
        .find(|def| def.name() == name)
}

fn find_class<'a>(body: &'a [ast::Stmt], name: &str) -> Option<&'a ast::StmtClassDef> {
    body.iter().find_map(|stmt| match stmt {
        ast::Stmt::ClassDef(class_def) if class_def.name.as_str() == name => Some(class_def),
        _ => None,
    })
}

/// Resolve `target` inside the module body.
///
/// Accepts `"func"` (module-level function), `"Class"` (reflected via its
/// `__init__`, only when `parse_class` is set) and `"Class.method"`. Anything
/// else is a usage error.
pub fn find_target<'a>(
    module: &'a ast::Mod,
    target: &str,
    parse_class: bool,
) -> Result<ResolvedTarget<'a>> {
    let body = match module {
        ast::Mod::Module(module) => &module.body,
        _ => return Err(Error::Unsupported("expected a Python module".to_string())),
    };

    if let Some((class_name, method_name)) = target.split_once('.') {
        let class_def = find_class(body, class_name)
            .ok_or_else(|| Error::TargetNotFound(class_name.to_string()))?;
        let def = find_def(&class_def.body, method_name)
            .ok_or_else(|| Error::TargetNotFound(target.to_string()))?;
        return Ok(ResolvedTarget {
            def,
            is_method: true,
            name: method_name.to_string(),
        });
    }

    if let Some(def) = find_def(body, target) {
        return Ok(ResolvedTarget {
            def,
            is_method: false,
            name: target.to_string(),
        });
    }

    if let Some(class_def) = find_class(body, target) {
        if !parse_class {
            return Err(Error::Unsupported(format!(
                "'{target}' is a class, not a function or method"
            )));
        }
        let def = find_def(&class_def.body, "__init__").ok_or_else(|| {
            Error::Unsupported(format!("class '{target}' has no __init__ method"))
        })?;
        return Ok(ResolvedTarget {
            def,
            is_method: true,
            name: target.to_string(),
        });
    }

    Err(Error::TargetNotFound(target.to_string()))
}

/// Reflect the declared parameters of a `def` into [`ParameterInfo`] records.
///
/// Positional-only parameters are unsupported: there is no way to label such
/// a parameter for UI purposes, so reflection fails fast without producing
/// any partial records. `*args` and `**kwargs` normalize to generic list and
/// mapping types. When `ignore_self` is set and the target is a method, a
/// leading `self`/`cls` receiver is skipped.
pub fn reflect_parameters(
    target: &ResolvedTarget<'_>,
    ignore_self: bool,
) -> Result<Vec<ParameterInfo>> {
    let args = target.def.args();

    if let Some(posonly) = args.posonlyargs.first() {
        return Err(Error::Unsupported(format!(
            "positional only parameter is not supported: '{}'",
            posonly.def.arg
        )));
    }

    let mut parameters = Vec::new();

    for (index, arg) in args.args.iter().enumerate() {
        let name = arg.def.arg.as_str();
        if index == 0
            && target.is_method
            && ignore_self
            && (name == "self" || name == "cls")
        {
            continue;
        }
        parameters.push(reflect_named(arg));
    }

    if let Some(vararg) = &args.vararg {
        let mut info = ParameterInfo::new(vararg.arg.as_str());
        info.typename = Some(TYPENAME_FOR_VARARGS.to_string());
        parameters.push(info);
    }

    for arg in &args.kwonlyargs {
        parameters.push(reflect_named(arg));
    }

    if let Some(kwarg) = &args.kwarg {
        let mut info = ParameterInfo::new(kwarg.arg.as_str());
        info.typename = Some(TYPENAME_FOR_KWARGS.to_string());
        parameters.push(info);
    }

    Ok(parameters)
}

fn reflect_named(arg: &ast::ArgWithDefault) -> ParameterInfo {
    let mut info = ParameterInfo::new(arg.def.arg.as_str());
    if let Some(annotation) = &arg.def.annotation {
        let (typename, extras) = normalize_annotation(annotation);
        info.typename = Some(typename);
        info.type_extras = extras;
    }
    if let Some(default) = &arg.default {
        let value = literal_value(default).unwrap_or_else(|| {
            // non-literal default, keep its source text
            serde_json::Value::String(unparse(default))
        });
        info.default = ParamDefault::Value(value);
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse_module(code: &str) -> ast::Mod {
        rustpython_parser::parse(code, rustpython_parser::Mode::Module, "<test>")
            .expect("Failed to parse Python code")
    }

    fn reflect(code: &str, target: &str) -> Vec<ParameterInfo> {
        let module = parse_module(code);
        let resolved = find_target(&module, target, true).unwrap();
        reflect_parameters(&resolved, true).unwrap()
    }

    #[test]
    fn reflects_annotated_parameters_in_order() {
        let params = reflect("def f(a: int, b: str = 'x', c: float = 1.5):\n    pass\n", "f");
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(params[0].typename.as_deref(), Some("int"));
        assert_eq!(params[0].default, ParamDefault::Missing);
        assert_eq!(params[1].default, ParamDefault::Value(json!("x")));
        assert_eq!(params[2].default, ParamDefault::Value(json!(1.5)));
    }

    #[test]
    fn unannotated_parameter_has_no_typename() {
        let params = reflect("def f(x):\n    pass\n", "f");
        assert_eq!(params[0].typename, None);
    }

    #[test]
    fn explicit_none_default_is_not_missing() {
        let params = reflect("def f(x: int = None):\n    pass\n", "f");
        assert_eq!(params[0].default, ParamDefault::Value(serde_json::Value::Null));
    }

    #[test]
    fn varargs_and_kwargs_normalize_to_list_and_dict() {
        let params = reflect("def f(a, *extra, **options):\n    pass\n", "f");
        assert_eq!(params[1].name, "extra");
        assert_eq!(params[1].typename.as_deref(), Some("list"));
        assert_eq!(params[2].name, "options");
        assert_eq!(params[2].typename.as_deref(), Some("dict"));
    }

    #[test]
    fn keyword_only_parameters_are_ordinary() {
        let params = reflect("def f(a, *, b: bool = True):\n    pass\n", "f");
        assert_eq!(params[1].name, "b");
        assert_eq!(params[1].typename.as_deref(), Some("bool"));
        assert_eq!(params[1].default, ParamDefault::Value(json!(true)));
    }

    #[test]
    fn positional_only_parameter_is_a_hard_error() {
        let module = parse_module("def f(x, /, y):\n    pass\n");
        let resolved = find_target(&module, "f", true).unwrap();
        let err = reflect_parameters(&resolved, true).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn method_receiver_is_skipped() {
        let code = "class A:\n    def m(self, x: int):\n        pass\n";
        let params = reflect(code, "A.m");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "x");
    }

    #[test]
    fn class_target_reflects_init() {
        let code = "class A:\n    def __init__(self, x: str = 'a'):\n        pass\n";
        let params = reflect(code, "A");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "x");
    }

    #[test]
    fn class_target_rejected_when_parse_class_off() {
        let module = parse_module("class A:\n    def __init__(self):\n        pass\n");
        let err = find_target(&module, "A", false).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn missing_target_is_reported() {
        let module = parse_module("def f():\n    pass\n");
        let err = find_target(&module, "g", true).unwrap_err();
        assert!(matches!(err, Error::TargetNotFound(_)));
    }

    #[test]
    fn non_literal_default_falls_back_to_source_text() {
        let params = reflect("def f(x = make_thing()):\n    pass\n", "f");
        assert_eq!(params[0].default, ParamDefault::Value(json!("make_thing()")));
    }

    #[test]
    fn async_def_is_supported() {
        let params = reflect("async def f(x: int):\n    pass\n", "f");
        assert_eq!(params[0].typename.as_deref(), Some("int"));
    }
}
