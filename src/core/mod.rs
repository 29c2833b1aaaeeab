//! Core data records and shared error types.

pub mod errors;
pub mod info;

pub use errors::{Error, Result};
pub use info::{
    FunctionInfo, ParamDefault, ParameterInfo, ParameterWidgetInfo, PARAMETER_NAME_KEY,
};
