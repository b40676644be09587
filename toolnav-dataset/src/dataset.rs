use crate::normalize::{extract_domain, normalize_url};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A tool object literal pulled out of a static dataset file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub tags: Vec<String>,
}

impl ToolEntry {
    /// The identifier used to place this tool: the subcategory when the
    /// dataset gives one, otherwise the category.
    pub fn key(&self) -> Option<&str> {
        self.subcategory
            .as_deref()
            .or(self.category.as_deref())
            .filter(|k| !k.is_empty())
    }
}

/// A `{ id, name }` category declaration found in a dataset file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub id: String,
    pub name: String,
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub tools: Vec<ToolEntry>,
    pub categories: Vec<CategoryDef>,
}

impl Dataset {
    pub fn new(tools: Vec<ToolEntry>, categories: Vec<CategoryDef>) -> Self {
        Self { tools, categories }
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Normalised URL -> placement key. The first tool listing a URL wins.
    pub fn url_index(&self) -> HashMap<String, String> {
        let mut index = HashMap::new();
        for tool in &self.tools {
            let Some(key) = tool.key() else { continue };
            let normalized = normalize_url(&tool.url);
            if normalized.is_empty() {
                continue;
            }
            index.entry(normalized).or_insert_with(|| key.to_string());
        }
        index
    }

    /// Domain -> placement key, first occurrence wins.
    pub fn domain_index(&self) -> HashMap<String, String> {
        let mut index = HashMap::new();
        for tool in &self.tools {
            let Some(key) = tool.key() else { continue };
            if let Some(domain) = extract_domain(&tool.url) {
                index.entry(domain).or_insert_with(|| key.to_string());
            }
        }
        index
    }

    /// Display name declared for a category key, if the dataset has one.
    pub fn category_name(&self, key: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == key)
            .map(|c| c.name.as_str())
    }
}
