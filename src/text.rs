use serde_json::{Map, Value};

use crate::text_metrics;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

/// Strings render as their content, everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// `{name: value, ...}` in document order.
pub fn format_mapping(map: Option<&Map<String, Value>>) -> String {
    let Some(map) = map else {
        return "{}".to_string();
    };
    let entries: Vec<String> = map
        .iter()
        .map(|(key, value)| format!("{key}: {}", display_value(value)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// `name=value, name=value` in document order.
pub fn format_actions(actions: &Map<String, Value>) -> String {
    actions
        .iter()
        .map(|(key, value)| format!("{key}={}", display_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Cuts `text` to at most `limit` characters, the last three being `...`.
pub fn truncate_label(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let keep = limit.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Inline label lines for an edge: the condition, then `[actions]`.
pub fn edge_label_lines(
    condition: Option<&str>,
    actions: Option<&Map<String, Value>>,
    condition_limit: usize,
    action_limit: usize,
) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(condition) = condition.filter(|c| !c.is_empty()) {
        lines.push(truncate_label(condition, condition_limit));
    }
    if let Some(actions) = actions.filter(|a| !a.is_empty()) {
        let joined = format_actions(actions);
        lines.push(format!("[{}]", truncate_label(&joined, action_limit)));
    }
    lines
}

pub fn measure_lines(
    lines: Vec<String>,
    font_size: f32,
    line_height: f32,
    font_family: &str,
    fast_metrics: bool,
) -> TextBlock {
    let width = lines
        .iter()
        .map(|line| text_width(line, font_size, font_family, fast_metrics))
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * font_size * line_height;
    TextBlock {
        lines,
        width,
        height,
    }
}

pub fn text_width(text: &str, font_size: f32, font_family: &str, fast_metrics: bool) -> f32 {
    if fast_metrics {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

pub(crate) fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

// Approximate advance widths of a sans-serif face at 1px.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        'I' | 'i' | 'j' | 'l' => 0.24,
        'f' | 't' | 'r' => 0.34,
        'M' | 'W' | 'm' | 'w' => 0.86,
        'A'..='Z' => 0.66,
        'a'..='z' => 0.57,
        '0'..='9' => 0.6,
        '=' | '<' | '>' | '+' => 0.58,
        '@' | '#' | '%' | '&' => 0.946,
        _ => 0.568,
    }
}
