use crate::error::{CoreError, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i64>,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub visible: bool,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default, rename = "order")]
    pub sort_order: Option<i64>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CategoryInput {
    pub fn new(name: &str, slug: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
            parent_id: None,
            sort_order: None,
            visible: true,
            icon: None,
            description: None,
        }
    }

    pub fn child_of(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// A top-level category with its subcategories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub website_count: i64,
    pub children: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub icon_url: Option<String>,
    pub category_id: i64,
    pub tags: Vec<String>,
    pub is_new: bool,
    pub is_featured: bool,
    pub is_hot: bool,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    pub category_id: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_hot: bool,
    #[serde(default, rename = "order")]
    pub sort_order: Option<i64>,
}

impl WebsiteInput {
    pub fn new(name: &str, url: &str, category_id: i64) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            url: url.to_string(),
            icon_url: None,
            category_id,
            tags: Vec::new(),
            is_new: false,
            is_featured: false,
            is_hot: false,
            sort_order: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebsiteStatus {
    New,
    Featured,
    Hot,
}

impl WebsiteStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "new" => Some(WebsiteStatus::New),
            "featured" => Some(WebsiteStatus::Featured),
            "hot" => Some(WebsiteStatus::Hot),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            WebsiteStatus::New => "is_new",
            WebsiteStatus::Featured => "is_featured",
            WebsiteStatus::Hot => "is_hot",
        }
    }
}

/// Filter for website listings and exports. `from`/`to` are inclusive
/// `YYYY-MM-DD` bounds on the creation date (UTC).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteFilter {
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub status: Option<WebsiteStatus>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl WebsiteFilter {
    /// Resolve the date bounds to unix-second timestamps.
    pub fn created_bounds(&self) -> Result<(Option<i64>, Option<i64>)> {
        let from = self
            .from
            .as_deref()
            .map(|d| parse_date(d).map(|date| date.and_time(NaiveTime::MIN).and_utc().timestamp()))
            .transpose()?;
        let to = self
            .to
            .as_deref()
            .map(|d| {
                parse_date(d).map(|date| {
                    date.and_hms_opt(23, 59, 59)
                        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
                        .and_utc()
                        .timestamp()
                })
            })
            .transpose()?;

        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(CoreError::InvalidInput(
                "date range start is after its end".to_string(),
            ));
        }
        Ok((from, to))
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidInput(format!("invalid date '{}', expected YYYY-MM-DD", raw)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub visible: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInput {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, rename = "order")]
    pub sort_order: Option<i64>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl PageInput {
    pub fn new(slug: &str, name: &str) -> Self {
        Self {
            slug: slug.to_string(),
            name: name.to_string(),
            description: None,
            icon: None,
            sort_order: None,
            visible: true,
        }
    }
}

/// Join row between a page and one of its top-level categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCategory {
    pub page_id: i64,
    pub category_id: i64,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCategoryInput {
    pub category_id: i64,
    #[serde(default, rename = "order")]
    pub sort_order: Option<i64>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedCategory {
    pub category: Category,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_bounds_cover_whole_days() {
        let filter = WebsiteFilter {
            from: Some("2026-01-01".to_string()),
            to: Some("2026-01-01".to_string()),
            ..Default::default()
        };
        let (from, to) = filter.created_bounds().unwrap();
        assert_eq!(to.unwrap() - from.unwrap(), 86_399);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let filter = WebsiteFilter {
            from: Some("2026-02-01".to_string()),
            to: Some("2026-01-01".to_string()),
            ..Default::default()
        };
        assert!(matches!(filter.created_bounds(), Err(CoreError::InvalidInput(_))));
    }
}
