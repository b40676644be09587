// Regex scanner for the static JavaScript tool datasets.
//
// The data files are loosely structured `export const x = [...]` modules.
// Rather than parse JavaScript we grep innermost `{ ... }` object literals
// and read `key: 'value'` pairs out of each one.

use crate::dataset::{CategoryDef, Dataset, ToolEntry};
use crate::error::{DatasetError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

static OBJECT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^{}]*\}").expect("object regex"));

static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"["']?([A-Za-z_][A-Za-z0-9_]*)["']?\s*:\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)"|`([^`]*)`|\[([^\]]*)\]|(-?\d+))"#,
    )
    .expect("field regex")
});

static ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)""#).expect("item regex"));

#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Text(String),
    List(Vec<String>),
}

/// Read and scan a dataset file. A file without a single tool entry is an
/// error, since it almost always means the format drifted.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let source = fs::read_to_string(path)?;
    let dataset = scan_source(&source);

    if dataset.is_empty() {
        return Err(DatasetError::EmptyDataset(path.display().to_string()));
    }

    info!(
        path = %path.display(),
        tools = dataset.tools.len(),
        categories = dataset.categories.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Extract tool entries and category declarations from dataset source text.
pub fn scan_source(source: &str) -> Dataset {
    let mut tools = Vec::new();
    let mut categories = Vec::new();

    for object in OBJECT_RE.find_iter(source) {
        let fields = parse_fields(object.as_str());
        if fields.is_empty() {
            continue;
        }

        if let Some(tool) = tool_from_fields(&fields) {
            tools.push(tool);
        } else if let Some(category) = category_from_fields(&fields) {
            categories.push(category);
        } else {
            debug!(object = object.as_str(), "skipping unrecognised object literal");
        }
    }

    Dataset::new(tools, categories)
}

fn parse_fields(object: &str) -> HashMap<String, FieldValue> {
    let mut fields = HashMap::new();

    for caps in FIELD_RE.captures_iter(object) {
        let key = caps[1].to_string();
        let value = if let Some(list) = caps.get(5) {
            FieldValue::List(parse_list(list.as_str()))
        } else {
            let text = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| unescape(m.as_str()))
                .or_else(|| caps.get(4).map(|m| m.as_str().to_string()))
                .or_else(|| caps.get(6).map(|m| m.as_str().to_string()))
                .unwrap_or_default();
            FieldValue::Text(text)
        };
        fields.entry(key).or_insert(value);
    }

    fields
}

fn parse_list(body: &str) -> Vec<String> {
    ITEM_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| unescape(m.as_str()))
        .filter(|s| !s.trim().is_empty())
        .collect()
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn text<'a>(fields: &'a HashMap<String, FieldValue>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| match fields.get(*key) {
        Some(FieldValue::Text(value)) if !value.trim().is_empty() => Some(value.trim()),
        _ => None,
    })
}

fn tool_from_fields(fields: &HashMap<String, FieldValue>) -> Option<ToolEntry> {
    let url = text(fields, &["url", "link", "href"])?;
    let name = text(fields, &["name", "title"])?;

    let tags = match fields.get("tags") {
        Some(FieldValue::List(items)) => items.clone(),
        Some(FieldValue::Text(joined)) => joined
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        None => Vec::new(),
    };

    Some(ToolEntry {
        name: name.to_string(),
        url: url.to_string(),
        description: text(fields, &["description", "desc"]).map(String::from),
        icon: text(fields, &["icon", "iconUrl", "logo"]).map(String::from),
        category: text(fields, &["category", "categoryId"]).map(String::from),
        subcategory: text(fields, &["subcategory", "subCategory", "subcategoryId"])
            .map(String::from),
        tags,
    })
}

fn category_from_fields(fields: &HashMap<String, FieldValue>) -> Option<CategoryDef> {
    let id = text(fields, &["id", "slug"])?;
    let name = text(fields, &["name", "title"])?;

    Some(CategoryDef {
        id: id.to_string(),
        name: name.to_string(),
        parent: text(fields, &["parent", "parentId"]).map(String::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_handles_quotes_and_newlines() {
        assert_eq!(unescape(r"it\'s"), "it's");
        assert_eq!(unescape(r"a\nb"), "a\nb");
    }

    #[test]
    fn quoted_keys_are_read() {
        let fields = parse_fields(r#"{ "name": "Figma", "url": "https://figma.com" }"#);
        assert_eq!(fields.get("name"), Some(&FieldValue::Text("Figma".to_string())));
    }
}
