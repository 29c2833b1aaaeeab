//! Resolved function and parameter records.
//!
//! These are the value objects the rest of the pipeline produces and the
//! widget layer consumes: [`FunctionInfo`] with its ordered [`ParameterInfo`]
//! records, each carrying a [`ParameterWidgetInfo`] once composed.

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};
use serde_json::Value;

/// Key inside `widget_args` that names the parameter a widget belongs to.
///
/// Once set it can never be changed by a merge; see
/// [`ParameterWidgetInfo::update_with_flattened`].
pub const PARAMETER_NAME_KEY: &str = "parameter_name";

use crate::core::errors::{Error, Result};

/// A parameter default, keeping "no default declared" distinct from an
/// explicit `None` default (`Value(Value::Null)`).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParamDefault {
    /// No default was declared in the signature
    #[default]
    Missing,
    /// A concrete default; Python `None` maps to `Value::Null`
    Value(Value),
}

impl ParamDefault {
    pub fn is_missing(&self) -> bool {
        matches!(self, ParamDefault::Missing)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ParamDefault::Missing => None,
            ParamDefault::Value(v) => Some(v),
        }
    }
}

impl Serialize for ParamDefault {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            // only reachable when a caller serializes the enum directly;
            // record fields skip the Missing case entirely
            ParamDefault::Missing => serializer.serialize_unit(),
            ParamDefault::Value(v) => v.serialize(serializer),
        }
    }
}

/// One declared parameter, as reflected from the signature and progressively
/// resolved by the composer.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ParameterInfo {
    pub name: String,
    /// Canonical short type name, `None` until resolved
    pub typename: Option<String>,
    /// Literal values attached to a restricted-choice type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_extras: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "ParamDefault::is_missing")]
    pub default: ParamDefault,
    pub description: Option<String>,
    pub widget: Option<ParameterWidgetInfo>,
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typename: None,
            type_extras: None,
            default: ParamDefault::Missing,
            description: None,
            widget: None,
        }
    }
}

/// A fully parsed callable: name, resolved prose description and its
/// parameters in declaration order.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FunctionInfo {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterInfo>,
}

impl FunctionInfo {
    pub fn parameter(&self, name: &str) -> Option<&ParameterInfo> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Expected value type of a declared widget-record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
    Str,
    Bool,
}

impl FieldType {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::Str => value.is_string(),
            FieldType::Bool => value.is_boolean(),
        }
    }
}

/// Static merge schema: declared attribute name and its expected type.
/// Keys outside this list route into the generic argument bag.
const TYPED_FIELDS: &[(&str, FieldType)] = &[
    ("label", FieldType::Str),
    ("description", FieldType::Str),
    ("show_label", FieldType::Bool),
    ("show_description", FieldType::Bool),
];

/// Keys selecting the widget class, in precedence order.
const WIDGET_CLASS_KEYS: &[&str] = &["widget_class", "type"];

/// Keys holding a nested constructor-argument sub-table to flatten.
const NESTED_ARGS_KEYS: &[&str] = &["widget_args", "init_args"];

/// The widget half of a resolved parameter: which control class to build and
/// the flat, ordered constructor-argument bag to build it with.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ParameterWidgetInfo {
    pub widget_class: String,
    pub widget_args: IndexMap<String, Value>,
}

impl ParameterWidgetInfo {
    pub fn new(widget_class: impl Into<String>, widget_args: IndexMap<String, Value>) -> Self {
        Self {
            widget_class: widget_class.into(),
            widget_args,
        }
    }

    pub fn parameter_name(&self) -> Option<&str> {
        self.widget_args.get(PARAMETER_NAME_KEY).and_then(Value::as_str)
    }

    /// Merge a flattened configuration dict (one table of the widget configs
    /// block) into this record.
    ///
    /// `widget_class` (or its alias `type`) replaces the widget class; the
    /// declared attributes of the static schema overlay into the argument bag
    /// when their value type matches (a mismatch logs a warning and keeps the
    /// prior value); a nested `widget_args`/`init_args` sub-table is flattened
    /// key-wise into the bag; every other key routes into the bag verbatim.
    ///
    /// Attempting to change an already-set `parameter_name` fails with
    /// [`Error::Validation`] and leaves the record untouched.
    pub fn update_with_flattened(&mut self, configs: &IndexMap<String, Value>) -> Result<()> {
        self.guard_parameter_name(configs)?;

        for (key, value) in configs {
            if value.is_null() || key.starts_with('_') {
                continue;
            }
            if key == PARAMETER_NAME_KEY {
                // guard already proved it equal
                continue;
            }
            if WIDGET_CLASS_KEYS.contains(&key.as_str()) {
                if key == "type" && configs.contains_key("widget_class") {
                    // the canonical key wins over its alias
                    continue;
                }
                match value.as_str() {
                    Some(class) => self.widget_class = class.to_string(),
                    None => log::warn!(
                        "unexpected type for field '{key}': expected string, got {value}"
                    ),
                }
                continue;
            }
            if NESTED_ARGS_KEYS.contains(&key.as_str()) {
                match value.as_object() {
                    Some(nested) => {
                        for (nested_key, nested_value) in nested {
                            if nested_key == PARAMETER_NAME_KEY {
                                continue;
                            }
                            self.widget_args
                                .insert(nested_key.clone(), nested_value.clone());
                        }
                    }
                    None => {
                        self.widget_args.insert(key.clone(), value.clone());
                    }
                }
                continue;
            }
            if let Some(&(_, expected)) = TYPED_FIELDS.iter().find(|(name, _)| *name == key) {
                if expected.matches(value) {
                    self.widget_args.insert(key.clone(), value.clone());
                } else {
                    log::warn!(
                        "unexpected type for field '{key}': expected {expected:?}, got {value}"
                    );
                }
                continue;
            }
            self.widget_args.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    /// Reject any attempt to rename the parameter, before mutating anything.
    fn guard_parameter_name(&self, configs: &IndexMap<String, Value>) -> Result<()> {
        let current = match self.parameter_name() {
            Some(name) => name,
            None => return Ok(()),
        };
        // both the top-level key and a nested sub-table may carry the name
        let incoming = configs.get(PARAMETER_NAME_KEY).into_iter().chain(
            NESTED_ARGS_KEYS
                .iter()
                .filter_map(|key| configs.get(*key))
                .filter_map(Value::as_object)
                .filter_map(|nested| nested.get(PARAMETER_NAME_KEY)),
        );
        for value in incoming {
            match value {
                Value::String(name) if name.as_str() == current => {}
                Value::String(name) => {
                    return Err(Error::Validation(format!(
                        "parameter_name can not be changed: '{current}' -> '{name}'"
                    )))
                }
                other => {
                    return Err(Error::Validation(format!(
                        "parameter_name can not be changed: '{current}' -> {other}"
                    )))
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn widget_for(param: &str) -> ParameterWidgetInfo {
        let mut args = IndexMap::new();
        args.insert(PARAMETER_NAME_KEY.to_string(), json!(param));
        args.insert("label".to_string(), json!(param));
        ParameterWidgetInfo::new("LineEdit", args)
    }

    fn configs(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn widget_class_key_replaces_class() {
        let mut widget = widget_for("a");
        widget
            .update_with_flattened(&configs(&[("widget_class", json!("IntSpinBox"))]))
            .unwrap();
        assert_eq!(widget.widget_class, "IntSpinBox");
    }

    #[test]
    fn type_key_is_an_alias_for_widget_class() {
        let mut widget = widget_for("a");
        widget
            .update_with_flattened(&configs(&[("type", json!("FilePathEdit"))]))
            .unwrap();
        assert_eq!(widget.widget_class, "FilePathEdit");
    }

    #[test]
    fn unknown_keys_route_into_the_argument_bag() {
        let mut widget = widget_for("a");
        widget
            .update_with_flattened(&configs(&[("placeholder", json!("type here"))]))
            .unwrap();
        assert_eq!(widget.widget_args["placeholder"], json!("type here"));
        assert_eq!(widget.widget_class, "LineEdit");
    }

    #[test]
    fn typed_field_with_wrong_type_is_skipped() {
        let mut widget = widget_for("a");
        widget
            .update_with_flattened(&configs(&[("label", json!(42))]))
            .unwrap();
        assert_eq!(widget.widget_args["label"], json!("a"));
    }

    #[test]
    fn nested_args_table_merges_keywise() {
        let mut widget = widget_for("a");
        widget.widget_args.insert("items".to_string(), json!([1, 2]));
        widget
            .update_with_flattened(&configs(&[(
                "widget_args",
                json!({"placeholder": "x", "items": [3]}),
            )]))
            .unwrap();
        assert_eq!(widget.widget_args["placeholder"], json!("x"));
        assert_eq!(widget.widget_args["items"], json!([3]));
        // pre-existing keys outside the sub-table survive
        assert_eq!(widget.widget_args["label"], json!("a"));
    }

    #[test]
    fn init_args_is_accepted_as_nested_table() {
        let mut widget = widget_for("a");
        widget
            .update_with_flattened(&configs(&[("init_args", json!({"step": 5}))]))
            .unwrap();
        assert_eq!(widget.widget_args["step"], json!(5));
    }

    #[test]
    fn renaming_parameter_fails_and_leaves_record_unchanged() {
        let mut widget = widget_for("a");
        let before = widget.clone();
        let err = widget
            .update_with_flattened(&configs(&[
                ("label", json!("new label")),
                ("parameter_name", json!("b")),
            ]))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(widget, before);
    }

    #[test]
    fn renaming_via_nested_args_also_fails() {
        let mut widget = widget_for("a");
        let err = widget
            .update_with_flattened(&configs(&[(
                "widget_args",
                json!({"parameter_name": "b"}),
            )]))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn nested_rename_is_rejected_despite_matching_top_level_name() {
        let mut widget = widget_for("a");
        let err = widget
            .update_with_flattened(&configs(&[
                ("parameter_name", json!("a")),
                ("widget_args", json!({"parameter_name": "b"})),
            ]))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn same_parameter_name_is_a_no_op_not_an_error() {
        let mut widget = widget_for("a");
        widget
            .update_with_flattened(&configs(&[("parameter_name", json!("a"))]))
            .unwrap();
        assert_eq!(widget.parameter_name(), Some("a"));
    }

    #[test]
    fn null_values_and_private_keys_are_ignored() {
        let mut widget = widget_for("a");
        widget
            .update_with_flattened(&configs(&[
                ("label", Value::Null),
                ("_internal", json!(1)),
            ]))
            .unwrap();
        assert_eq!(widget.widget_args["label"], json!("a"));
        assert!(!widget.widget_args.contains_key("_internal"));
    }

    #[test]
    fn missing_default_is_distinct_from_explicit_none() {
        assert!(ParamDefault::Missing.is_missing());
        assert!(!ParamDefault::Value(Value::Null).is_missing());
        assert_ne!(ParamDefault::Missing, ParamDefault::Value(Value::Null));
    }
}
