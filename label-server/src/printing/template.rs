//! Template substitution
//!
//! Widgets may carry `:name:` placeholders in their `text` (text widgets) or
//! `content` (qr / barcode widgets) fields. A batch expands the template once
//! per data row.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use shared::models::{PrintRow, WidgetDescriptor};

/// Expand a widget template against one data row
///
/// Returns a fresh copy; the template is left untouched. A placeholder whose
/// key is missing from `row` stays as written, colons included.
pub fn substitute(widgets: &[WidgetDescriptor], row: &PrintRow) -> Vec<WidgetDescriptor> {
    widgets
        .iter()
        .map(|widget| {
            let mut widget = widget.clone();
            if let Some(field) = widget.template_field_mut() {
                *field = substitute_str(field, row);
            }
            widget
        })
        .collect()
}

/// Distinct placeholder names in first-seen order
pub fn detect_variables(widgets: &[WidgetDescriptor]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for field in widgets.iter().filter_map(WidgetDescriptor::template_field) {
        for cap in PLACEHOLDER.captures_iter(field) {
            let name = &cap[1];
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// `:name:` with an identifier name; matched left to right, non-overlapping
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":([A-Za-z_][A-Za-z0-9_]*):").expect("placeholder pattern is valid")
});

fn substitute_str(input: &str, row: &PrintRow) -> String {
    PLACEHOLDER
        .replace_all(input, |cap: &Captures<'_>| match row.get(&cap[1]) {
            Some(value) => value.clone(),
            None => cap[0].to_string(),
        })
        .into_owned()
}
