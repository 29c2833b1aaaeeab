//! The central merge algorithm: reconcile reflected signature data with
//! docstring data into fully resolved parameter records.
//!
//! Precedence rules, in short: the signature wins for types and concrete
//! defaults, the docstring wins for prose, and an explicit widget table in
//! the docstring's configs block wins over the per-type default widget.

use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::core::errors::{Error, Result};
use crate::core::info::{
    FunctionInfo, ParamDefault, ParameterInfo, ParameterWidgetInfo, PARAMETER_NAME_KEY,
};
use crate::parser::annotations::{TYPENAME_ANY, TYPENAME_LITERAL};
use crate::parser::pyexpr::literal_value_from_text;
use crate::parser::FunctionDocstringInfo;

/// Widget class used when a type has no dedicated default widget.
pub const FALLBACK_WIDGET_CLASS: &str = "JsonEditor";
/// Widget for a restricted-choice type with known members.
pub const WIDGET_FOR_CHOICES: &str = "ComboBox";
/// Widget for a restricted-choice type without known members.
pub const WIDGET_FOR_EDITABLE_CHOICES: &str = "ComboBoxEdit";

/// Fixed type-to-widget table: which control represents a canonical type when
/// the docstring does not say otherwise.
pub fn default_widget_class(typename: &str) -> Option<&'static str> {
    match typename {
        "bool" => Some("CheckBox"),
        "int" => Some("IntLineEdit"),
        "float" => Some("FloatLineEdit"),
        "str" => Some("LineEdit"),
        "list" => Some("ListEditor"),
        "tuple" => Some("TupleEditor"),
        "dict" => Some("DictEditor"),
        "datetime" => Some("DateTimeEdit"),
        "date" => Some("DateEdit"),
        "time" => Some("TimeEdit"),
        "Union" | "Optional" | "any" => Some(FALLBACK_WIDGET_CLASS),
        _ => None,
    }
}

/// Merges reflector output with docstring data, parameter by parameter.
#[derive(Debug, Clone, Default)]
pub struct DescriptionComposer {
    /// Opt-in: let a prose default hint replace an explicit `None` default.
    /// Off by default; `None` is treated as deliberate.
    pub prose_default_fallback: bool,
}

impl DescriptionComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every parameter of `func_info` in place, leaving each with a
    /// canonical type, a resolved default and description, and a widget.
    pub fn merge(
        &self,
        func_info: &mut FunctionInfo,
        doc_info: &FunctionDocstringInfo,
    ) -> Result<()> {
        for param in &mut func_info.parameters {
            self.merge_parameter(param, doc_info)?;
        }
        Ok(())
    }

    fn merge_parameter(
        &self,
        param: &mut ParameterInfo,
        doc_info: &FunctionDocstringInfo,
    ) -> Result<()> {
        // type: signature, then docstring prose, then the "any" marker
        if param.typename.is_none() {
            param.typename = doc_info.parameter_typename(&param.name).map(str::to_string);
        }
        if param.typename.is_none() {
            param.typename = Some(TYPENAME_ANY.to_string());
        }

        // default: Missing stays missing; a concrete value always wins; an
        // explicit None only yields to prose with the opt-in flag
        if self.prose_default_fallback && param.default == ParamDefault::Value(Value::Null) {
            if let Some(hint) = doc_info.parameter_default(&param.name) {
                let value =
                    literal_value_from_text(hint).unwrap_or_else(|| Value::String(hint.to_string()));
                param.default = ParamDefault::Value(value);
            }
        }

        // description: always the docstring prose, empty when absent
        param.description = Some(
            doc_info
                .parameter_description(&param.name)
                .unwrap_or_default(),
        );

        let mut widget = self.default_widget_info(param);
        if let Some(configs) = doc_info.widget_configs_for(&param.name) {
            widget.update_with_flattened(configs)?;
        }
        self.check_choice_default(param)?;
        param.widget = Some(widget);
        Ok(())
    }

    /// Build the type-based widget record before any block overrides apply.
    fn default_widget_info(&self, param: &ParameterInfo) -> ParameterWidgetInfo {
        let typename = param.typename.as_deref().unwrap_or(TYPENAME_ANY);
        let mut widget_class = default_widget_class(typename)
            .unwrap_or(FALLBACK_WIDGET_CLASS)
            .to_string();
        let mut args: IndexMap<String, Value> = IndexMap::new();

        if typename == TYPENAME_LITERAL {
            match &param.type_extras {
                Some(extras) if !extras.is_empty() => {
                    widget_class = WIDGET_FOR_CHOICES.to_string();
                    args.insert("items".to_string(), Value::Array(extras.clone()));
                }
                _ => {
                    widget_class = WIDGET_FOR_EDITABLE_CHOICES.to_string();
                    args.insert("items".to_string(), json!([]));
                }
            }
        }

        args.insert(PARAMETER_NAME_KEY.to_string(), json!(param.name));
        if let ParamDefault::Value(value) = &param.default {
            args.insert("default".to_string(), value.clone());
        }
        args.insert("label".to_string(), json!(param.name));
        args.insert(
            "description".to_string(),
            json!(param.description.clone().unwrap_or_default()),
        );

        ParameterWidgetInfo::new(widget_class, args)
    }

    /// A restricted-choice parameter's concrete default must be one of its
    /// permitted values.
    fn check_choice_default(&self, param: &ParameterInfo) -> Result<()> {
        if param.typename.as_deref() != Some(TYPENAME_LITERAL) {
            return Ok(());
        }
        let extras = match &param.type_extras {
            Some(extras) if !extras.is_empty() => extras,
            _ => return Ok(()),
        };
        if let ParamDefault::Value(value) = &param.default {
            if !extras.contains(value) {
                return Err(Error::Validation(format!(
                    "default value {value} of parameter '{}' is not one of the permitted choices",
                    param.name
                )));
            }
        }
        Ok(())
    }
}
