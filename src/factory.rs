//! Widget constructor registry.
//!
//! The pipeline ends at resolved [`ParameterWidgetInfo`] records; building an
//! actual control is the GUI layer's job. The registry maps widget-type
//! identifiers to constructor closures so that mapping stays explicit rather
//! than reflective. Registration is expected at startup, single-threaded;
//! duplicate registration and unknown lookups are reported errors, not
//! crashes.

use std::collections::HashMap;
use std::path::Path;

use crate::core::errors::{Error, Result};
use crate::core::info::{ParameterInfo, ParameterWidgetInfo};

/// Constructor closure: argument bag in, widget out.
pub type WidgetConstructor<W> = Box<dyn Fn(&ParameterWidgetInfo) -> Result<W>>;

/// Registry of widget constructors, generic over the caller's widget type.
pub struct WidgetFactory<W> {
    constructors: HashMap<String, WidgetConstructor<W>>,
}

impl<W> Default for WidgetFactory<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> WidgetFactory<W> {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        widget_type: impl Into<String>,
        constructor: WidgetConstructor<W>,
    ) -> Result<()> {
        let widget_type = widget_type.into();
        if self.constructors.contains_key(&widget_type) {
            return Err(Error::AlreadyRegistered(widget_type));
        }
        self.constructors.insert(widget_type, constructor);
        Ok(())
    }

    pub fn unregister(&mut self, widget_type: &str) -> Result<()> {
        if self.constructors.remove(widget_type).is_none() {
            return Err(Error::NotRegistered(widget_type.to_string()));
        }
        Ok(())
    }

    pub fn is_registered(&self, widget_type: &str) -> bool {
        self.constructors.contains_key(widget_type)
    }

    pub fn clear(&mut self) {
        self.constructors.clear();
    }

    /// Build a widget of an explicit type from an argument bag.
    pub fn create(&self, widget_type: &str, widget_info: &ParameterWidgetInfo) -> Result<W> {
        let constructor = self
            .constructors
            .get(widget_type)
            .ok_or_else(|| Error::NotRegistered(widget_type.to_string()))?;
        constructor(widget_info)
    }

    /// Build the widget a resolved parameter record asks for.
    ///
    /// A `stylesheet` argument naming a readable file is replaced by that
    /// file's contents before construction; any other value passes through
    /// verbatim.
    pub fn create_from_info(&self, param: &ParameterInfo) -> Result<W> {
        let widget_info = param.widget.as_ref().ok_or_else(|| {
            Error::Validation(format!("parameter '{}' has no resolved widget", param.name))
        })?;
        let widget_info = resolve_stylesheet(widget_info);
        self.create(&widget_info.widget_class, &widget_info)
    }
}

/// Substitute a `stylesheet` path argument with the file contents it points
/// to. Values that are not strings, or not existing files, stay as they are.
fn resolve_stylesheet(widget_info: &ParameterWidgetInfo) -> ParameterWidgetInfo {
    let mut widget_info = widget_info.clone();
    if let Some(value) = widget_info.widget_args.get_mut("stylesheet") {
        let text = value.as_str().map(str::to_string);
        if let Some(text) = text {
            let path = Path::new(&text);
            if path.is_file() {
                match std::fs::read_to_string(path) {
                    Ok(contents) => *value = serde_json::Value::String(contents),
                    Err(e) => log::warn!("cannot read stylesheet file '{text}': {e}"),
                }
            }
        }
    }
    widget_info
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Write;

    /// Stand-in widget for tests: remembers what it was built from.
    #[derive(Debug, PartialEq)]
    struct FakeWidget {
        class: String,
        label: String,
    }

    fn fake_constructor(class: &str) -> WidgetConstructor<FakeWidget> {
        let class = class.to_string();
        Box::new(move |info| {
            Ok(FakeWidget {
                class: class.clone(),
                label: info
                    .widget_args
                    .get("label")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
            })
        })
    }

    fn widget_info(class: &str, args: &[(&str, serde_json::Value)]) -> ParameterWidgetInfo {
        let args: IndexMap<String, serde_json::Value> = args
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        ParameterWidgetInfo::new(class, args)
    }

    #[test]
    fn create_uses_registered_constructor() {
        let mut factory = WidgetFactory::new();
        factory
            .register("LineEdit", fake_constructor("LineEdit"))
            .unwrap();
        let widget = factory
            .create("LineEdit", &widget_info("LineEdit", &[("label", json!("x"))]))
            .unwrap();
        assert_eq!(widget.class, "LineEdit");
        assert_eq!(widget.label, "x");
    }

    #[test]
    fn duplicate_registration_is_an_error() {
        let mut factory = WidgetFactory::new();
        factory
            .register("LineEdit", fake_constructor("LineEdit"))
            .unwrap();
        let err = factory
            .register("LineEdit", fake_constructor("LineEdit"))
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyRegistered(_)));
    }

    #[test]
    fn unregistering_an_absent_type_is_an_error() {
        let mut factory: WidgetFactory<FakeWidget> = WidgetFactory::new();
        let err = factory.unregister("Nope").unwrap_err();
        assert!(matches!(err, Error::NotRegistered(_)));
    }

    #[test]
    fn unregister_then_reregister_roundtrip() {
        let mut factory = WidgetFactory::new();
        factory
            .register("CheckBox", fake_constructor("CheckBox"))
            .unwrap();
        factory.unregister("CheckBox").unwrap();
        assert!(!factory.is_registered("CheckBox"));
        factory
            .register("CheckBox", fake_constructor("CheckBox"))
            .unwrap();
        assert!(factory.is_registered("CheckBox"));
    }

    #[test]
    fn unknown_widget_type_fails_lookup() {
        let factory: WidgetFactory<FakeWidget> = WidgetFactory::new();
        let err = factory
            .create("Mystery", &widget_info("Mystery", &[]))
            .unwrap_err();
        assert!(matches!(err, Error::NotRegistered(_)));
    }

    #[test]
    fn stylesheet_path_is_replaced_by_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "QWidget {{ color: red; }}").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let resolved = resolve_stylesheet(&widget_info(
            "LineEdit",
            &[("stylesheet", json!(path))],
        ));
        assert_eq!(
            resolved.widget_args["stylesheet"],
            json!("QWidget { color: red; }")
        );
    }

    #[test]
    fn stylesheet_literal_passes_through_verbatim() {
        let literal = "QWidget { color: blue; }";
        let resolved = resolve_stylesheet(&widget_info(
            "LineEdit",
            &[("stylesheet", json!(literal))],
        ));
        assert_eq!(resolved.widget_args["stylesheet"], json!(literal));
    }
}
