//! Parsing pipeline: signature reflection, docstring parsing and the
//! top-level [`FunctionInfoParser`] that ties them to the composer.

pub mod annotations;
pub mod docstring;
pub mod pyexpr;
pub mod signature;
pub mod widget_configs;

use indexmap::IndexMap;
use rustpython_parser::Mode;
use serde_json::Value;

use crate::compose::DescriptionComposer;
use crate::core::errors::{Error, Result};
use crate::core::info::FunctionInfo;
use docstring::ParsedDocstring;
use widget_configs::{WidgetConfigs, WidgetConfigsParser};

/// Everything mined from one raw docstring: the block-stripped text, the
/// parsed prose and the per-parameter widget configuration tables.
/// Transient; discarded once the merge is done.
#[derive(Debug, Clone, Default)]
pub struct FunctionDocstringInfo {
    docstring_text: String,
    prose: ParsedDocstring,
    widget_configs: WidgetConfigs,
}

impl FunctionDocstringInfo {
    /// Raw docstring text with the widget configs block removed.
    pub fn docstring_text(&self) -> &str {
        &self.docstring_text
    }

    pub fn function_description(&self) -> String {
        self.prose.description()
    }

    pub fn has_parameter(&self, param_name: &str) -> bool {
        self.prose.param(param_name).is_some()
    }

    pub fn parameter_description(&self, param_name: &str) -> Option<String> {
        self.prose
            .param(param_name)?
            .description
            .as_ref()
            .map(|text| text.trim().to_string())
    }

    pub fn parameter_typename(&self, param_name: &str) -> Option<&str> {
        self.prose.param(param_name)?.type_name.as_deref()
    }

    /// Default hint mined from prose, as raw text.
    pub fn parameter_default(&self, param_name: &str) -> Option<&str> {
        self.prose.param(param_name)?.default.as_deref()
    }

    pub fn widget_configs_for(&self, param_name: &str) -> Option<&IndexMap<String, Value>> {
        self.widget_configs.get(param_name)
    }
}

/// Splits a raw docstring into prose and widget configuration.
#[derive(Debug, Clone, Default)]
pub struct FunctionDocstringParser {
    configs_parser: WidgetConfigsParser,
    /// Surface structural block failures instead of downgrading them
    pub strict: bool,
}

impl FunctionDocstringParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_configs_parser(configs_parser: WidgetConfigsParser) -> Self {
        Self {
            configs_parser,
            strict: false,
        }
    }

    /// Parse a raw docstring (possibly empty).
    ///
    /// A missing block yields an empty configuration. A malformed block is
    /// downgraded to a warning and an empty configuration unless `strict` is
    /// set, in which case it surfaces as [`Error::WidgetConfigs`]. Prose
    /// parsing never fails.
    pub fn parse(&self, raw_docstring: &str) -> Result<FunctionDocstringInfo> {
        let widget_configs = match self.configs_parser.parse(raw_docstring) {
            Ok(configs) => configs,
            Err(e) if self.strict => return Err(e),
            Err(e) => {
                log::warn!("{e}");
                WidgetConfigs::new()
            }
        };
        let docstring_text = docstring::cleandoc(&self.configs_parser.strip_block(raw_docstring));
        let prose = docstring::parse(&docstring_text);
        Ok(FunctionDocstringInfo {
            docstring_text,
            prose,
            widget_configs,
        })
    }
}

/// Knobs for [`FunctionInfoParser`].
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Skip a leading `self`/`cls` receiver on methods and constructors
    pub ignore_self: bool,
    /// Allow a class target, reflected via its `__init__`
    pub parse_class: bool,
    /// Keep the (block-stripped) raw docstring as the function description
    /// instead of the parsed prose
    pub raw_docstring_as_description: bool,
    /// Let a prose default hint replace an explicit `None` default
    pub prose_default_fallback: bool,
    /// Turn structural widget-configs failures into errors
    pub strict_widget_configs: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            ignore_self: true,
            parse_class: true,
            raw_docstring_as_description: false,
            prose_default_fallback: false,
            strict_widget_configs: false,
        }
    }
}

/// Top-level entry point: Python source + target path in, resolved
/// [`FunctionInfo`] out.
#[derive(Debug, Clone, Default)]
pub struct FunctionInfoParser {
    options: ParseOptions,
}

impl FunctionInfoParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse `target` (`"func"`, `"Class"` or `"Class.method"`) out of
    /// `source` and resolve its parameter records.
    pub fn parse(&self, source: &str, target: &str) -> Result<FunctionInfo> {
        let module = rustpython_parser::parse(source, Mode::Module, "<module>")
            .map_err(|e| Error::PythonParse(e.to_string()))?;

        let resolved = signature::find_target(&module, target, self.options.parse_class)?;
        let parameters = signature::reflect_parameters(&resolved, self.options.ignore_self)?;

        let docstring_parser = FunctionDocstringParser {
            configs_parser: WidgetConfigsParser::default(),
            strict: self.options.strict_widget_configs,
        };
        let doc_info = docstring_parser.parse(resolved.def.docstring().unwrap_or(""))?;

        let mut func_info = FunctionInfo {
            name: resolved.name.clone(),
            description: String::new(),
            parameters,
        };

        let composer = DescriptionComposer {
            prose_default_fallback: self.options.prose_default_fallback,
        };
        composer.merge(&mut func_info, &doc_info)?;

        func_info.description = if self.options.raw_docstring_as_description {
            doc_info.docstring_text().to_string()
        } else {
            doc_info.function_description()
        };

        Ok(func_info)
    }
}
