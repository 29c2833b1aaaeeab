//! Extraction and parsing of the embedded widget configs block.
//!
//! A docstring may carry a delimited block of TOML-subset text, one table per
//! parameter name, whose key/value pairs override that parameter's widget
//! choice and constructor arguments:
//!
//! ```text
//! @widgets
//! [path]
//! widget_class = "FilePathEdit"
//! label = "File path"
//! @end
//! ```
//!
//! Each sentinel must be the sole content of its line. The block is stripped
//! from the docstring before prose parsing so it never leaks into the visible
//! description.

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::core::errors::{Error, Result};

/// Default block sentinels.
pub const WIDGET_CONFIGS_START_TAG: &str = "@widgets";
pub const WIDGET_CONFIGS_END_TAG: &str = "@end";
/// Legacy start sentinel accepted by older docstrings.
pub const LEGACY_START_TAG: &str = "@begin";

/// Raw widget configuration: parameter name to its flat override table.
pub type WidgetConfigs = IndexMap<String, IndexMap<String, Value>>;

/// Locates and parses the widget configs block of a docstring.
#[derive(Debug, Clone)]
pub struct WidgetConfigsParser {
    pattern: Regex,
}

impl Default for WidgetConfigsParser {
    fn default() -> Self {
        Self::with_tags(WIDGET_CONFIGS_START_TAG, WIDGET_CONFIGS_END_TAG)
    }
}

impl WidgetConfigsParser {
    /// Parser with custom sentinel tokens (case-sensitive).
    pub fn with_tags(start_tag: &str, end_tag: &str) -> Self {
        let pattern = format!(
            r"(?ms)^[ \t]*{}[ \t]*\r?$(.*?)^[ \t]*{}[ \t]*\r?$\r?\n?",
            regex::escape(start_tag),
            regex::escape(end_tag)
        );
        Self {
            // the pattern is built from escaped literals, it always compiles
            pattern: Regex::new(&pattern).expect("invalid sentinel pattern"),
        }
    }

    /// Parser for the legacy `@begin` ... `@end` pair.
    pub fn legacy() -> Self {
        Self::with_tags(LEGACY_START_TAG, WIDGET_CONFIGS_END_TAG)
    }

    /// The block body between the sentinels, if present.
    pub fn extract_block<'a>(&self, docstring: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(docstring)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }

    /// The docstring with every block (sentinels included) removed.
    pub fn strip_block(&self, docstring: &str) -> String {
        self.pattern.replace_all(docstring, "").into_owned()
    }

    /// Parse the block into per-parameter override tables.
    ///
    /// No block yields an empty map. Malformed TOML is a structural failure:
    /// surfaced as [`Error::WidgetConfigs`] here, downgraded to a warning by
    /// the lenient caller. Top-level entries that are not tables are skipped.
    pub fn parse(&self, docstring: &str) -> Result<WidgetConfigs> {
        let block = match self.extract_block(docstring) {
            Some(block) => block.trim(),
            None => return Ok(WidgetConfigs::new()),
        };
        if block.is_empty() {
            return Ok(WidgetConfigs::new());
        }
        let table: toml::Table =
            toml::from_str(block).map_err(|e| Error::WidgetConfigs(e.to_string()))?;

        let mut configs = WidgetConfigs::new();
        for (param_name, value) in table {
            match value {
                toml::Value::Table(entries) => {
                    let converted = entries
                        .into_iter()
                        .map(|(key, value)| (key, toml_to_json(value)))
                        .collect();
                    configs.insert(param_name, converted);
                }
                other => {
                    log::warn!(
                        "ignoring non-table entry '{param_name}' in widget configs block: {other}"
                    );
                }
            }
        }
        Ok(configs)
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const DOCSTRING: &str = indoc! {r#"
        Do something.

        :param a: first value

        @widgets
        [a]
        widget_class = "IntSpinBox"
        min = 0
        max = 10
        @end
    "#};

    #[test]
    fn extracts_and_parses_block() {
        let parser = WidgetConfigsParser::default();
        let configs = parser.parse(DOCSTRING).unwrap();
        let a = &configs["a"];
        assert_eq!(a["widget_class"], json!("IntSpinBox"));
        assert_eq!(a["min"], json!(0));
        assert_eq!(a["max"], json!(10));
    }

    #[test]
    fn strips_block_from_docstring() {
        let parser = WidgetConfigsParser::default();
        let stripped = parser.strip_block(DOCSTRING);
        assert!(!stripped.contains("@widgets"));
        assert!(!stripped.contains("IntSpinBox"));
        assert!(stripped.contains(":param a: first value"));
    }

    #[test]
    fn no_block_yields_empty_configs() {
        let parser = WidgetConfigsParser::default();
        assert!(parser.parse("just a docstring\n").unwrap().is_empty());
        assert_eq!(parser.strip_block("just a docstring\n"), "just a docstring\n");
    }

    #[test]
    fn strips_every_block_occurrence() {
        let parser = WidgetConfigsParser::default();
        let docstring = indoc! {r#"
            intro

            @widgets
            [a]
            label = "A"
            @end

            middle

            @widgets
            [b]
            label = "B"
            @end
        "#};
        let stripped = parser.strip_block(docstring);
        assert!(!stripped.contains("@widgets"));
        assert!(!stripped.contains("label"));
        assert!(stripped.contains("intro"));
        assert!(stripped.contains("middle"));
    }

    #[test]
    fn sentinel_must_be_sole_line_content() {
        let parser = WidgetConfigsParser::default();
        let inline = "see @widgets for details, then @end of story\n";
        assert_eq!(parser.extract_block(inline), None);
    }

    #[test]
    fn malformed_toml_is_a_structural_error() {
        let parser = WidgetConfigsParser::default();
        let docstring = indoc! {r#"
            @widgets
            [unterminated
            widget_class = "X"
            @end
        "#};
        let err = parser.parse(docstring).unwrap_err();
        assert!(matches!(err, Error::WidgetConfigs(_)));
    }

    #[test]
    fn non_table_entries_are_skipped() {
        let parser = WidgetConfigsParser::default();
        let docstring = indoc! {r#"
            @widgets
            stray = 1
            [a]
            label = "A"
            @end
        "#};
        let configs = parser.parse(docstring).unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs["a"]["label"], json!("A"));
    }

    #[test]
    fn legacy_begin_tag_is_supported() {
        let parser = WidgetConfigsParser::legacy();
        let docstring = indoc! {r#"
            @begin
            [a]
            type = "ComboBoxEdit"
            @end
        "#};
        let configs = parser.parse(docstring).unwrap();
        assert_eq!(configs["a"]["type"], json!("ComboBoxEdit"));
    }

    #[test]
    fn nested_sub_tables_convert_to_objects() {
        let parser = WidgetConfigsParser::default();
        let docstring = indoc! {r#"
            @widgets
            [a]
            widget_class = "LineEdit"
            widget_args = { placeholder = "here", clearable = true }
            @end
        "#};
        let configs = parser.parse(docstring).unwrap();
        assert_eq!(
            configs["a"]["widget_args"],
            json!({"placeholder": "here", "clearable": true})
        );
    }
}
