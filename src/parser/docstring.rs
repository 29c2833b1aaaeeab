//! Prose docstring parsing.
//!
//! A small reST field-list parser covering the conventional docstring
//! grammar: short/long description, `:param [type] name:` entries,
//! `:type name:` declarations and `defaults to ...` hints mined from
//! parameter descriptions. Parsing is infallible; malformed input degrades
//! to whatever could be recognized.

use regex::Regex;
use std::sync::OnceLock;

/// One documented parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocParam {
    pub arg_name: String,
    pub type_name: Option<String>,
    pub description: Option<String>,
    /// Default hint mined from prose ("..., defaults to 5")
    pub default: Option<String>,
}

/// A parsed prose docstring, with the widget configs block already removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocstring {
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub params: Vec<DocParam>,
    pub returns: Option<String>,
    pub return_type: Option<String>,
}

impl ParsedDocstring {
    /// Short and long description joined, trimmed.
    pub fn description(&self) -> String {
        let mut text = self.short_description.clone().unwrap_or_default();
        if let Some(long) = &self.long_description {
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str(long);
        }
        text.trim().to_string()
    }

    pub fn param(&self, name: &str) -> Option<&DocParam> {
        self.params.iter().find(|p| p.arg_name == name)
    }
}

/// Recognize `:field arg1 arg2: body`, splitting on the first colon after the
/// field header so bodies may contain colons themselves.
fn parse_field_line(line: &str) -> Option<(String, Vec<String>, String)> {
    let rest = line.strip_prefix(':')?;
    let (header, body) = rest.split_once(':')?;
    let mut tokens = header.split_whitespace();
    let name = tokens.next()?.to_string();
    if !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let args: Vec<String> = tokens.map(str::to_string).collect();
    Some((name, args, body.trim().to_string()))
}

fn defaults_to_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)(?:,\s*)?defaults\s+to\s+(.+?)\.?\s*$").unwrap())
}

/// Dedent a docstring the way `inspect.cleandoc` does: the first line loses
/// its leading whitespace, later lines lose their common indentation margin,
/// and leading/trailing blank lines are dropped. Without this, a docstring
/// written inside a function body keeps that body's indentation on every
/// line after the first.
pub(crate) fn cleandoc(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    let mut cleaned: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                line.trim_start()
            } else {
                let cut = margin.min(line.len() - line.trim_start().len());
                &line[cut..]
            }
        })
        .collect();
    while cleaned.first().is_some_and(|line| line.trim().is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|line| line.trim().is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}

/// Parse a docstring's prose. Never fails.
pub fn parse(text: &str) -> ParsedDocstring {
    let text = cleandoc(text);
    let mut parsed = ParsedDocstring::default();

    let lines: Vec<&str> = text.lines().collect();
    let first_field = lines
        .iter()
        .position(|line| parse_field_line(line.trim()).is_some())
        .unwrap_or(lines.len());

    parse_description(&lines[..first_field], &mut parsed);
    parse_fields(&lines[first_field..], &mut parsed);
    parsed
}

fn parse_description(lines: &[&str], parsed: &mut ParsedDocstring) {
    let text = lines.join("\n");
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    match text.split_once("\n\n") {
        Some((short, long)) => {
            parsed.short_description = Some(short.trim().to_string());
            let long = long.trim();
            if !long.is_empty() {
                parsed.long_description = Some(long.to_string());
            }
        }
        None => parsed.short_description = Some(text.to_string()),
    }
}

fn parse_fields(lines: &[&str], parsed: &mut ParsedDocstring) {
    let mut current: Option<(String, Vec<String>, String)> = None;

    for line in lines {
        let trimmed = line.trim();
        if let Some(field) = parse_field_line(trimmed) {
            if let Some(previous) = current.take() {
                finish_field(previous, parsed);
            }
            current = Some(field);
        } else if let Some((_, _, body)) = current.as_mut() {
            // continuation line of the current field
            if !body.is_empty() {
                body.push('\n');
            }
            body.push_str(trimmed);
        }
    }
    if let Some(field) = current.take() {
        finish_field(field, parsed);
    }
}

fn finish_field((name, args, body): (String, Vec<String>, String), parsed: &mut ParsedDocstring) {
    let body = body.trim().to_string();
    match name.as_str() {
        "param" | "parameter" | "arg" | "argument" => {
            // `:param name:` or `:param type name:`
            let (type_name, arg_name) = match args.as_slice() {
                [name] => (None, name.clone()),
                [type_name, name] => (Some(type_name.clone()), name.clone()),
                _ => return,
            };
            let param = entry_for(parsed, &arg_name);
            if type_name.is_some() {
                param.type_name = type_name;
            }
            let (description, default) = split_default_hint(&body);
            if !description.is_empty() {
                param.description = Some(description);
            }
            if default.is_some() {
                param.default = default;
            }
        }
        "type" => {
            if let [arg_name] = args.as_slice() {
                if !body.is_empty() {
                    entry_for(parsed, arg_name).type_name = Some(body);
                }
            }
        }
        "return" | "returns" => {
            if !body.is_empty() {
                parsed.returns = Some(body);
            }
        }
        "rtype" => {
            if !body.is_empty() {
                parsed.return_type = Some(body);
            }
        }
        _ => {}
    }
}

fn entry_for<'a>(parsed: &'a mut ParsedDocstring, arg_name: &str) -> &'a mut DocParam {
    let index = match parsed.params.iter().position(|p| p.arg_name == arg_name) {
        Some(index) => index,
        None => {
            parsed.params.push(DocParam {
                arg_name: arg_name.to_string(),
                ..Default::default()
            });
            parsed.params.len() - 1
        }
    };
    &mut parsed.params[index]
}

fn split_default_hint(body: &str) -> (String, Option<String>) {
    let captures = defaults_to_pattern().captures(body);
    if let Some((whole, hint)) = captures.as_ref().and_then(|c| c.get(0).zip(c.get(1))) {
        let default = hint.as_str().trim().to_string();
        let description = body[..whole.start()].trim().to_string();
        return (description, Some(default));
    }
    (body.to_string(), None)
}
