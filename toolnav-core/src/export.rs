// Export generation into a server-local directory

use crate::backup::snapshot;
use crate::data::Database;
use crate::error::{CoreError, Result};
use crate::model::{Category, Website, WebsiteFilter, WebsiteStatus};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Websites,
    Categories,
    Settings,
    Backup,
}

impl ExportKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "websites" | "sites" => Some(ExportKind::Websites),
            "categories" => Some(ExportKind::Categories),
            "settings" => Some(ExportKind::Settings),
            "backup" | "full" => Some(ExportKind::Backup),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Websites => "websites",
            ExportKind::Categories => "categories",
            ExportKind::Settings => "settings",
            ExportKind::Backup => "backup",
        }
    }

    /// Settings and backups are nested documents with no flat CSV form.
    pub fn has_csv(&self) -> bool {
        matches!(self, ExportKind::Websites | ExportKind::Categories)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Zip,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            "zip" => Some(ExportFormat::Zip),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Zip => "zip",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFilter {
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub status: Option<WebsiteStatus>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl ExportFilter {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none() && self.status.is_none() && self.from.is_none() && self.to.is_none()
    }

    fn website_filter(&self) -> WebsiteFilter {
        WebsiteFilter {
            category_id: self.category_id,
            status: self.status,
            keyword: None,
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

/// A file in the export directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub name: String,
    pub size: u64,
    pub modified: i64,
}

pub struct ExportStore {
    dir: PathBuf,
}

impl ExportStore {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render `kind` in `format` and write it under a fresh timestamped name.
    pub fn create(
        &self,
        db: &Database,
        kind: ExportKind,
        format: ExportFormat,
        filter: &ExportFilter,
    ) -> Result<ExportFile> {
        if format == ExportFormat::Csv && !kind.has_csv() {
            return Err(CoreError::InvalidInput(format!(
                "{} exports support json or zip, not csv",
                kind.as_str()
            )));
        }
        if !filter.is_empty() && !kind.has_csv() {
            return Err(CoreError::InvalidInput(format!(
                "{} exports do not take filters",
                kind.as_str()
            )));
        }

        let path = self.allocate_path(kind, format);
        match format {
            ExportFormat::Json => fs::write(&path, render_json(db, kind, filter)?)?,
            ExportFormat::Csv => fs::write(&path, render_csv(db, kind, filter)?)?,
            ExportFormat::Zip => {
                let json = render_json(db, kind, filter)?;
                let csv = if kind.has_csv() {
                    Some(render_csv(db, kind, filter)?)
                } else {
                    None
                };
                if let Err(e) = write_zip(&path, kind, &json, csv.as_deref()) {
                    let _ = fs::remove_file(&path);
                    return Err(e);
                }
            }
        }

        let file = describe(&path)?;
        info!(name = %file.name, size = file.size, "export written");
        Ok(file)
    }

    fn allocate_path(&self, kind: ExportKind, format: ExportFormat) -> PathBuf {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
        let base = format!("{}-{}", kind.as_str(), stamp);
        let mut path = self.dir.join(format!("{}.{}", base, format.extension()));
        let mut n = 1;
        while path.exists() {
            path = self
                .dir
                .join(format!("{}-{}.{}", base, n, format.extension()));
            n += 1;
        }
        path
    }

    /// Stored exports, newest first.
    pub fn list(&self) -> Result<Vec<ExportFile>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(describe(&entry.path())?);
            }
        }
        files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
        Ok(files)
    }

    pub fn path_of(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(CoreError::not_found("export", name));
        }
        Ok(path)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_of(name)?;
        fs::remove_file(&path)?;
        info!(name, "export deleted");
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
    {
        return Err(CoreError::InvalidInput(format!("invalid export name '{}'", name)));
    }
    Ok(())
}

fn write_zip(path: &Path, kind: ExportKind, json: &[u8], csv: Option<&str>) -> Result<()> {
    let mut writer = ZipWriter::new(File::create(path)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file(format!("{}.json", kind.as_str()), options)?;
    writer.write_all(json)?;
    if let Some(csv) = csv {
        writer.start_file(format!("{}.csv", kind.as_str()), options)?;
        writer.write_all(csv.as_bytes())?;
    }
    writer.finish()?;
    Ok(())
}

fn describe(path: &Path) -> Result<ExportFile> {
    let metadata = fs::metadata(path)?;
    let modified = metadata
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    Ok(ExportFile {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        size: metadata.len(),
        modified,
    })
}

fn filtered_categories(db: &Database, filter: &ExportFilter) -> Result<Vec<Category>> {
    let categories = db.list_categories()?;
    Ok(match filter.category_id {
        Some(id) => categories
            .into_iter()
            .filter(|c| c.id == id || c.parent_id == Some(id))
            .collect(),
        None => categories,
    })
}

fn render_json(db: &Database, kind: ExportKind, filter: &ExportFilter) -> Result<Vec<u8>> {
    let exported_at = chrono::Utc::now().to_rfc3339();
    let value = match kind {
        ExportKind::Websites => {
            let websites = db.list_websites(&filter.website_filter())?;
            json!({
                "kind": kind.as_str(),
                "exportedAt": exported_at,
                "filter": filter,
                "count": websites.len(),
                "websites": websites,
            })
        }
        ExportKind::Categories => {
            let categories = filtered_categories(db, filter)?;
            json!({
                "kind": kind.as_str(),
                "exportedAt": exported_at,
                "count": categories.len(),
                "categories": categories,
            })
        }
        ExportKind::Settings => serde_json::to_value(snapshot(db, false)?)?,
        ExportKind::Backup => serde_json::to_value(snapshot(db, true)?)?,
    };
    Ok(serde_json::to_vec_pretty(&value)?)
}

fn render_csv(db: &Database, kind: ExportKind, filter: &ExportFilter) -> Result<String> {
    match kind {
        ExportKind::Websites => {
            let names: HashMap<i64, String> = db
                .list_categories()?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect();
            let websites = db.list_websites(&filter.website_filter())?;
            Ok(websites_csv(&websites, &names))
        }
        ExportKind::Categories => Ok(categories_csv(&filtered_categories(db, filter)?)),
        ExportKind::Settings | ExportKind::Backup => Err(CoreError::InvalidInput(format!(
            "{} has no csv form",
            kind.as_str()
        ))),
    }
}

/// Quote a CSV field when it holds a delimiter, quote or line break.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row(fields: &[String]) -> String {
    let mut row = fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",");
    row.push('\n');
    row
}

fn websites_csv(websites: &[Website], category_names: &HashMap<i64, String>) -> String {
    let mut out = String::from(
        "id,name,url,description,category_id,category,tags,is_new,is_featured,is_hot,order,created_at\n",
    );
    for w in websites {
        out.push_str(&csv_row(&[
            w.id.to_string(),
            w.name.clone(),
            w.url.clone(),
            w.description.clone().unwrap_or_default(),
            w.category_id.to_string(),
            category_names.get(&w.category_id).cloned().unwrap_or_default(),
            w.tags.join(";"),
            w.is_new.to_string(),
            w.is_featured.to_string(),
            w.is_hot.to_string(),
            w.sort_order.to_string(),
            w.created_at.to_string(),
        ]));
    }
    out
}

fn categories_csv(categories: &[Category]) -> String {
    let mut out = String::from("id,name,slug,parent_id,order,visible,description\n");
    for c in categories {
        out.push_str(&csv_row(&[
            c.id.to_string(),
            c.name.clone(),
            c.slug.clone(),
            c.parent_id.map(|p| p.to_string()).unwrap_or_default(),
            c.sort_order.to_string(),
            c.visible.to_string(),
            c.description.clone().unwrap_or_default(),
        ]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn export_names_are_checked() {
        assert!(validate_name("websites-20260101T000000.csv").is_ok());
        assert!(validate_name("../toolnav.db").is_err());
        assert!(validate_name("a/b.json").is_err());
        assert!(validate_name("").is_err());
    }

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!(ExportFormat::from_str("ZIP"), Some(ExportFormat::Zip));
        assert_eq!(ExportKind::from_str("Backup"), Some(ExportKind::Backup));
        assert_eq!(ExportKind::from_str("users"), None);
    }
}
