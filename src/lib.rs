//! func2widgets derives GUI widget descriptions from Python function
//! signatures and docstrings.
//!
//! Given Python source and a target (function, class or `Class.method`), the
//! pipeline reflects the signature, parses the docstring's prose and its
//! embedded `@widgets` configuration block, and merges the three sources into
//! resolved parameter records, each naming a widget class and carrying a flat
//! constructor-argument bag:
//!
//! ```
//! use func2widgets::FunctionInfoParser;
//!
//! let source = r#"
//! def greet(name: str, times: int = 1):
//!     """Greet someone.
//!
//!     :param name: who to greet
//!     :param times: how often
//!     """
//! "#;
//!
//! let info = FunctionInfoParser::new().parse(source, "greet").unwrap();
//! assert_eq!(info.parameters[0].typename.as_deref(), Some("str"));
//! assert_eq!(
//!     info.parameters[1].widget.as_ref().unwrap().widget_class,
//!     "IntLineEdit"
//! );
//! ```

// Export modules for library usage
pub mod cli;
pub mod compose;
pub mod core;
pub mod factory;
pub mod parser;

// Re-export commonly used types
pub use crate::core::{
    Error, FunctionInfo, ParamDefault, ParameterInfo, ParameterWidgetInfo, Result,
    PARAMETER_NAME_KEY,
};

pub use crate::compose::{default_widget_class, DescriptionComposer, FALLBACK_WIDGET_CLASS};

pub use crate::factory::{WidgetConstructor, WidgetFactory};

pub use crate::parser::{
    annotations::{normalize_typename_str, TYPENAME_ANY, TYPENAME_LITERAL},
    widget_configs::{WidgetConfigsParser, WIDGET_CONFIGS_END_TAG, WIDGET_CONFIGS_START_TAG},
    FunctionDocstringInfo, FunctionDocstringParser, FunctionInfoParser, ParseOptions,
};
