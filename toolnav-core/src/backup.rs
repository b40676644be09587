// Settings and full-content snapshots, and restoring them by id.

use crate::data::{Database, current_timestamp, encode_tags};
use crate::error::{CoreError, Result};
use crate::model::{Category, Page, PageCategory, Website};
use crate::settings::{
    ConfigRecord, FaviconApi, FooterGroup, FooterLink, FriendLink, HotRecommendation, NavMenu,
    SiteInfo, SocialMedia,
};
use rusqlite::{OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use toolnav_dataset::normalize_url;
use tracing::{info, warn};
use zip::ZipArchive;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    #[serde(default)]
    pub site_info: SiteInfo,
    #[serde(default)]
    pub nav_menus: Vec<NavMenu>,
    #[serde(default)]
    pub footer_groups: Vec<FooterGroup>,
    #[serde(default)]
    pub footer_links: Vec<FooterLink>,
    #[serde(default)]
    pub social_media: Vec<SocialMedia>,
    #[serde(default)]
    pub friend_links: Vec<FriendLink>,
    #[serde(default)]
    pub favicon_apis: Vec<FaviconApi>,
    #[serde(default)]
    pub hot_recommendations: Vec<HotRecommendation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSnapshot {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub websites: Vec<Website>,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub page_categories: Vec<PageCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    pub exported_at: String,
    pub settings: SettingsSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentSnapshot>,
}

impl Snapshot {
    pub fn record_count(&self) -> usize {
        let s = &self.settings;
        let settings = 1
            + s.nav_menus.len()
            + s.footer_groups.len()
            + s.footer_links.len()
            + s.social_media.len()
            + s.friend_links.len()
            + s.favicon_apis.len()
            + s.hot_recommendations.len();
        let content = self.content.as_ref().map_or(0, |c| {
            c.categories.len() + c.websites.len() + c.pages.len() + c.page_categories.len()
        });
        settings + content
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub restored: usize,
    pub errors: Vec<String>,
}

pub fn settings_snapshot(db: &Database) -> Result<SettingsSnapshot> {
    Ok(SettingsSnapshot {
        site_info: db.get_site_info()?,
        nav_menus: db.list_records()?,
        footer_groups: db.list_records()?,
        footer_links: db.list_records()?,
        social_media: db.list_records()?,
        friend_links: db.list_records()?,
        favicon_apis: db.list_records()?,
        hot_recommendations: db.list_records()?,
    })
}

pub fn content_snapshot(db: &Database) -> Result<ContentSnapshot> {
    Ok(ContentSnapshot {
        categories: db.list_categories()?,
        websites: db.list_websites(&Default::default())?,
        pages: db.list_pages()?,
        page_categories: db.all_page_categories()?,
    })
}

/// Capture the settings tables, and the content tables too when
/// `include_content` is set.
pub fn snapshot(db: &Database, include_content: bool) -> Result<Snapshot> {
    Ok(Snapshot {
        version: SNAPSHOT_VERSION,
        exported_at: chrono::Utc::now().to_rfc3339(),
        settings: settings_snapshot(db)?,
        content: if include_content {
            Some(content_snapshot(db)?)
        } else {
            None
        },
    })
}

fn restore_rows<T, F>(report: &mut RestoreReport, entity: &str, rows: &[T], mut write: F)
where
    F: FnMut(&T) -> Result<()>,
    T: RowKey,
{
    for row in rows {
        match write(row) {
            Ok(()) => report.restored += 1,
            Err(err) => {
                warn!(entity, key = %row.key(), error = %err, "failed to restore row");
                report.errors.push(format!("{} {}: {}", entity, row.key(), err));
            }
        }
    }
}

trait RowKey {
    fn key(&self) -> String;
}

impl<T: ConfigRecord> RowKey for T {
    fn key(&self) -> String {
        self.id().to_string()
    }
}

impl RowKey for Category {
    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl RowKey for Website {
    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl RowKey for Page {
    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl RowKey for PageCategory {
    fn key(&self) -> String {
        format!("{}/{}", self.page_id, self.category_id)
    }
}

/// Upsert every row of a snapshot by id. Rows that fail are reported and
/// skipped; the rest are committed together.
pub fn restore(db: &Database, snapshot: &Snapshot) -> Result<RestoreReport> {
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(CoreError::InvalidInput(format!(
            "snapshot version {} is newer than supported version {}",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }

    let mut report = RestoreReport::default();
    let tx = db.transaction()?;

    let settings = &snapshot.settings;
    let updated_at = if settings.site_info.updated_at > 0 {
        settings.site_info.updated_at
    } else {
        current_timestamp()
    };
    match db.write_site_info(&settings.site_info, updated_at) {
        Ok(()) => report.restored += 1,
        Err(err) => report.errors.push(format!("site info: {}", err)),
    }

    restore_rows(&mut report, NavMenu::ENTITY, &settings.nav_menus, |r| db.upsert_record(r));
    restore_rows(&mut report, FooterGroup::ENTITY, &settings.footer_groups, |r| {
        db.upsert_record(r)
    });
    restore_rows(&mut report, FooterLink::ENTITY, &settings.footer_links, |r| {
        db.upsert_record(r)
    });
    restore_rows(&mut report, SocialMedia::ENTITY, &settings.social_media, |r| {
        db.upsert_record(r)
    });
    restore_rows(&mut report, FriendLink::ENTITY, &settings.friend_links, |r| {
        db.upsert_record(r)
    });
    restore_rows(&mut report, FaviconApi::ENTITY, &settings.favicon_apis, |r| {
        db.upsert_record(r)
    });
    restore_rows(
        &mut report,
        HotRecommendation::ENTITY,
        &settings.hot_recommendations,
        |r| db.upsert_record(r),
    );

    if let Some(content) = &snapshot.content {
        let (roots, children): (Vec<&Category>, Vec<&Category>) =
            content.categories.iter().partition(|c| c.is_root());
        for group in [roots, children] {
            for category in group {
                match db.upsert_category(category) {
                    Ok(()) => report.restored += 1,
                    Err(err) => {
                        warn!(id = category.id, error = %err, "failed to restore category");
                        report.errors.push(format!("category {}: {}", category.id, err));
                    }
                }
            }
        }
        restore_rows(&mut report, "website", &content.websites, |w| db.upsert_website(w));
        restore_rows(&mut report, "page", &content.pages, |p| db.upsert_page(p));
        restore_rows(&mut report, "page category", &content.page_categories, |l| {
            db.upsert_page_category(l)
        });
    }

    tx.commit()?;
    info!(
        restored = report.restored,
        errors = report.errors.len(),
        "snapshot restored"
    );
    Ok(report)
}

/// Read a snapshot from a JSON file, or from the JSON entry of a zip
/// export.
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let is_zip = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

    if !is_zip {
        let raw = fs::read(path)?;
        return Ok(serde_json::from_slice(&raw)?);
    }

    let mut archive = ZipArchive::new(File::open(path)?)?;
    let entry_name = archive
        .file_names()
        .find(|name| name.ends_with(".json"))
        .map(String::from)
        .ok_or_else(|| {
            CoreError::InvalidInput(format!("{} holds no JSON snapshot", path.display()))
        })?;

    let mut raw = String::new();
    archive.by_name(&entry_name)?.read_to_string(&mut raw)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn restore_from_file(db: &Database, path: &Path) -> Result<RestoreReport> {
    let snapshot = read_snapshot(path)?;
    info!(path = %path.display(), records = snapshot.record_count(), "restoring snapshot");
    restore(db, &snapshot)
}

impl Database {
    pub(crate) fn upsert_category(&self, category: &Category) -> Result<()> {
        if let Some(parent_id) = category.parent_id {
            if parent_id == category.id {
                return Err(CoreError::InvalidInput(format!(
                    "category '{}' cannot be its own parent",
                    category.slug
                )));
            }
            let parent = self.get_category(parent_id).map_err(|err| match err {
                CoreError::NotFound { .. } => {
                    CoreError::InvalidInput(format!("parent category {} does not exist", parent_id))
                }
                other => other,
            })?;
            if !parent.is_root() {
                return Err(CoreError::InvalidInput(format!(
                    "parent '{}' is itself a subcategory",
                    parent.slug
                )));
            }
            if !self.children_of(category.id)?.is_empty() {
                return Err(CoreError::InvalidInput(format!(
                    "category '{}' has subcategories and cannot be nested",
                    category.slug
                )));
            }
        }

        self.get_connection().execute(
            "INSERT INTO categories (id, name, slug, parent_id, sort_order, visible, icon, description,
                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name, slug = excluded.slug, parent_id = excluded.parent_id,
                sort_order = excluded.sort_order, visible = excluded.visible, icon = excluded.icon,
                description = excluded.description, created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            params![
                category.id,
                &category.name,
                &category.slug,
                category.parent_id,
                category.sort_order,
                category.visible,
                &category.icon,
                &category.description,
                category.created_at,
                category.updated_at,
            ],
        )?;
        Ok(())
    }

    pub(crate) fn upsert_website(&self, website: &Website) -> Result<()> {
        let normalized = normalize_url(&website.url);
        if normalized.is_empty() {
            return Err(CoreError::InvalidInput(format!("invalid url '{}'", website.url)));
        }
        let taken: Option<i64> = self
            .get_connection()
            .query_row(
                "SELECT id FROM websites WHERE normalized_url = ?1 AND id != ?2 LIMIT 1",
                params![&normalized, website.id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(other_id) = taken {
            return Err(CoreError::Conflict(format!(
                "url '{}' is already used by website {}",
                website.url, other_id
            )));
        }

        self.get_connection().execute(
            "INSERT INTO websites (id, name, description, url, normalized_url, icon_url, category_id,
                tags, is_new, is_featured, is_hot, sort_order, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name, description = excluded.description, url = excluded.url,
                normalized_url = excluded.normalized_url, icon_url = excluded.icon_url,
                category_id = excluded.category_id, tags = excluded.tags, is_new = excluded.is_new,
                is_featured = excluded.is_featured, is_hot = excluded.is_hot,
                sort_order = excluded.sort_order, created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            params![
                website.id,
                &website.name,
                &website.description,
                &website.url,
                &normalized,
                &website.icon_url,
                website.category_id,
                encode_tags(&website.tags)?,
                website.is_new,
                website.is_featured,
                website.is_hot,
                website.sort_order,
                website.created_at,
                website.updated_at,
            ],
        )?;
        Ok(())
    }

    pub(crate) fn upsert_page(&self, page: &Page) -> Result<()> {
        self.get_connection().execute(
            "INSERT INTO pages (id, slug, name, description, icon, sort_order, visible, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                slug = excluded.slug, name = excluded.name, description = excluded.description,
                icon = excluded.icon, sort_order = excluded.sort_order, visible = excluded.visible,
                created_at = excluded.created_at, updated_at = excluded.updated_at",
            params![
                page.id,
                &page.slug,
                &page.name,
                &page.description,
                &page.icon,
                page.sort_order,
                page.visible,
                page.created_at,
                page.updated_at,
            ],
        )?;
        Ok(())
    }

    pub(crate) fn upsert_page_category(&self, link: &PageCategory) -> Result<()> {
        self.get_connection().execute(
            "INSERT INTO page_categories (page_id, category_id, sort_order, visible)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(page_id, category_id) DO UPDATE SET
                sort_order = excluded.sort_order, visible = excluded.visible",
            params![link.page_id, link.category_id, link.sort_order, link.visible],
        )?;
        Ok(())
    }
}
