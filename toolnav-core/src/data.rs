use crate::error::{CoreError, Result};
use crate::model::{
    Category, CategoryInput, CategoryNode, LinkedCategory, Page, PageCategory, PageCategoryInput,
    PageInput, Website, WebsiteFilter, WebsiteInput,
};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params, params_from_iter};
use std::fs;
use std::path::Path;
use toolnav_dataset::normalize_url;
use tracing::{debug, info};

pub struct Database {
    conn: Connection,
}

pub(crate) const CATEGORY_COLUMNS: &str =
    "id, name, slug, parent_id, sort_order, visible, icon, description, created_at, updated_at";

pub(crate) const WEBSITE_COLUMNS: &str = "id, name, description, url, icon_url, category_id, tags, \
     is_new, is_featured, is_hot, sort_order, created_at, updated_at";

pub(crate) const PAGE_COLUMNS: &str =
    "id, slug, name, description, icon, sort_order, visible, created_at, updated_at";

pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

pub(crate) fn category_from_row(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        parent_id: row.get("parent_id")?,
        sort_order: row.get("sort_order")?,
        visible: row.get("visible")?,
        icon: row.get("icon")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn website_from_row(row: &Row) -> rusqlite::Result<Website> {
    let tags: String = row.get("tags")?;
    Ok(Website {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        url: row.get("url")?,
        icon_url: row.get("icon_url")?,
        category_id: row.get("category_id")?,
        tags: parse_tags(&tags),
        is_new: row.get("is_new")?,
        is_featured: row.get("is_featured")?,
        is_hot: row.get("is_hot")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn page_from_row(row: &Row) -> rusqlite::Result<Page> {
    Ok(Page {
        id: row.get("id")?,
        slug: row.get("slug")?,
        name: row.get("name")?,
        description: row.get("description")?,
        icon: row.get("icon")?,
        sort_order: row.get("sort_order")?,
        visible: row.get("visible")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

// Older rows store tags as a comma separated string rather than JSON.
fn parse_tags(raw: &str) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_else(|_| {
        raw.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    })
}

pub(crate) fn encode_tags(tags: &[String]) -> Result<String> {
    Ok(serde_json::to_string(tags)?)
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl Database {
    /// Remove a database file along with any WAL sidecar files.
    pub fn drop(path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)?;
        for suffix in ["-wal", "-shm"] {
            let mut sidecar = path.as_os_str().to_owned();
            sidecar.push(suffix);
            match fs::remove_file(&sidecar) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    parent_id INTEGER REFERENCES categories(id) ON DELETE RESTRICT,
    sort_order INTEGER NOT NULL DEFAULT 0,
    visible BOOLEAN NOT NULL DEFAULT 1,
    icon TEXT,
    description TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id);

-- normalized_url is not UNIQUE; legacy rows may collide until deduped
CREATE TABLE IF NOT EXISTS websites (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    url TEXT NOT NULL,
    normalized_url TEXT NOT NULL,
    icon_url TEXT,
    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE RESTRICT,
    tags TEXT NOT NULL DEFAULT '[]',    -- JSON array
    is_new BOOLEAN NOT NULL DEFAULT 0,
    is_featured BOOLEAN NOT NULL DEFAULT 0,
    is_hot BOOLEAN NOT NULL DEFAULT 0,
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_websites_category ON websites(category_id);
CREATE INDEX IF NOT EXISTS idx_websites_normalized_url ON websites(normalized_url);

CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT,
    icon TEXT,
    sort_order INTEGER NOT NULL DEFAULT 0,
    visible BOOLEAN NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS page_categories (
    page_id INTEGER NOT NULL REFERENCES pages(id) ON DELETE CASCADE,
    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    sort_order INTEGER NOT NULL DEFAULT 0,
    visible BOOLEAN NOT NULL DEFAULT 1,
    PRIMARY KEY (page_id, category_id)
);

CREATE TABLE IF NOT EXISTS friend_links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    logo TEXT,
    description TEXT,
    sort_order INTEGER NOT NULL DEFAULT 0,
    visible BOOLEAN NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS social_media (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    icon TEXT,
    url TEXT,
    qrcode TEXT,
    sort_order INTEGER NOT NULL DEFAULT 0,
    visible BOOLEAN NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS nav_menus (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    icon TEXT,
    target TEXT NOT NULL DEFAULT '_self' CHECK(target IN ('_self', '_blank')),
    sort_order INTEGER NOT NULL DEFAULT 0,
    visible BOOLEAN NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS footer_groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    visible BOOLEAN NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS footer_links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    group_id INTEGER NOT NULL REFERENCES footer_groups(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    visible BOOLEAN NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_footer_links_group ON footer_links(group_id);

CREATE TABLE IF NOT EXISTS favicon_apis (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    url_template TEXT NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    enabled BOOLEAN NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS hot_recommendations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    icon_url TEXT,
    description TEXT,
    sort_order INTEGER NOT NULL DEFAULT 0,
    visible BOOLEAN NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Single row, id is always 1
CREATE TABLE IF NOT EXISTS site_info (
    id INTEGER PRIMARY KEY CHECK(id = 1),
    site_name TEXT NOT NULL DEFAULT '',
    title TEXT,
    description TEXT,
    keywords TEXT,
    logo TEXT,
    favicon TEXT,
    icp TEXT,
    copyright TEXT,
    contact_email TEXT,
    updated_at INTEGER NOT NULL
);
            ",
        )?;
        Ok(())
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }

    /// Open a transaction on the shared connection. Every `Database` method
    /// called while it is alive runs inside it.
    pub fn transaction(&self) -> Result<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Next `sort_order` for an append within `column IS value`.
    pub(crate) fn next_order(&self, table: &str, scope: Option<(&str, Option<i64>)>) -> Result<i64> {
        let next = match scope {
            Some((column, value)) => self.conn.query_row(
                &format!(
                    "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM {} WHERE {} IS ?1",
                    table, column
                ),
                params![value],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                &format!("SELECT COALESCE(MAX(sort_order), 0) + 1 FROM {}", table),
                [],
                |row| row.get(0),
            )?,
        };
        Ok(next)
    }

    // Category management

    pub fn create_category(&self, input: &CategoryInput) -> Result<Category> {
        self.validate_category(input, None)?;
        let sort_order = match input.sort_order {
            Some(order) => order,
            None => self.next_order("categories", Some(("parent_id", input.parent_id)))?,
        };
        let timestamp = current_timestamp();

        self.conn.execute(
            "INSERT INTO categories (name, slug, parent_id, sort_order, visible, icon, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                input.name.trim(),
                input.slug.trim(),
                input.parent_id,
                sort_order,
                input.visible,
                &input.icon,
                &input.description,
                timestamp,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(id, slug = %input.slug, "created category");
        self.get_category(id)
    }

    pub fn get_category(&self, id: i64) -> Result<Category> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM categories WHERE id = ?1", CATEGORY_COLUMNS),
                params![id],
                category_from_row,
            )
            .optional()?
            .ok_or_else(|| CoreError::not_found("category", id))
    }

    pub fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let category = self
            .conn
            .query_row(
                &format!("SELECT {} FROM categories WHERE slug = ?1", CATEGORY_COLUMNS),
                params![slug],
                category_from_row,
            )
            .optional()?;
        Ok(category)
    }

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM categories ORDER BY parent_id IS NOT NULL, sort_order, id",
            CATEGORY_COLUMNS
        ))?;
        let categories = stmt
            .query_map([], category_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    pub fn root_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM categories WHERE parent_id IS NULL ORDER BY sort_order, id",
            CATEGORY_COLUMNS
        ))?;
        let categories = stmt
            .query_map([], category_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    pub fn children_of(&self, parent_id: i64) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM categories WHERE parent_id = ?1 ORDER BY sort_order, id",
            CATEGORY_COLUMNS
        ))?;
        let categories = stmt
            .query_map(params![parent_id], category_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    pub fn category_tree(&self) -> Result<Vec<CategoryNode>> {
        let mut tree = Vec::new();
        for root in self.root_categories()? {
            let website_count: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM websites WHERE category_id IN
                    (SELECT id FROM categories WHERE id = ?1 OR parent_id = ?1)",
                params![root.id],
                |row| row.get(0),
            )?;
            let children = self.children_of(root.id)?;
            tree.push(CategoryNode {
                category: root,
                website_count,
                children,
            });
        }
        Ok(tree)
    }

    pub fn update_category(&self, id: i64, input: &CategoryInput) -> Result<Category> {
        let existing = self.get_category(id)?;
        self.validate_category(input, Some(id))?;

        if input.parent_id.is_some() && !self.children_of(id)?.is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "category '{}' has subcategories and cannot be nested",
                existing.slug
            )));
        }
        if input.parent_id.is_some() {
            let links: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM page_categories WHERE category_id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            if links > 0 {
                return Err(CoreError::Conflict(format!(
                    "category '{}' is linked to {} pages and must stay top-level",
                    existing.slug, links
                )));
            }
        }

        let sort_order = input.sort_order.unwrap_or(existing.sort_order);
        self.conn.execute(
            "UPDATE categories SET name = ?1, slug = ?2, parent_id = ?3, sort_order = ?4, visible = ?5,
                icon = ?6, description = ?7, updated_at = ?8
             WHERE id = ?9",
            params![
                input.name.trim(),
                input.slug.trim(),
                input.parent_id,
                sort_order,
                input.visible,
                &input.icon,
                &input.description,
                current_timestamp(),
                id,
            ],
        )?;
        self.get_category(id)
    }

    pub fn delete_category(&self, id: i64) -> Result<()> {
        let category = self.get_category(id)?;

        let children: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE parent_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if children > 0 {
            return Err(CoreError::Conflict(format!(
                "category '{}' still has {} subcategories",
                category.slug, children
            )));
        }

        let websites: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM websites WHERE category_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if websites > 0 {
            return Err(CoreError::Conflict(format!(
                "category '{}' still owns {} websites",
                category.slug, websites
            )));
        }

        self.conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        info!(id, slug = %category.slug, "deleted category");
        Ok(())
    }

    fn validate_category(&self, input: &CategoryInput, existing_id: Option<i64>) -> Result<()> {
        require_text("name", &input.name)?;
        require_text("slug", &input.slug)?;
        if input.slug.trim().contains(char::is_whitespace) {
            return Err(CoreError::InvalidInput(format!(
                "slug '{}' must not contain whitespace",
                input.slug
            )));
        }

        if let Some(parent_id) = input.parent_id {
            if Some(parent_id) == existing_id {
                return Err(CoreError::InvalidInput(
                    "a category cannot be its own parent".to_string(),
                ));
            }
            let parent = self.get_category(parent_id).map_err(|err| match err {
                CoreError::NotFound { .. } => {
                    CoreError::InvalidInput(format!("parent category {} does not exist", parent_id))
                }
                other => other,
            })?;
            if !parent.is_root() {
                return Err(CoreError::InvalidInput(format!(
                    "parent '{}' is itself a subcategory; only one level of nesting is supported",
                    parent.slug
                )));
            }
        }

        let slug_taken: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM categories WHERE slug = ?1 AND id IS NOT ?2",
                params![input.slug.trim(), existing_id],
                |row| row.get(0),
            )
            .optional()?;
        if slug_taken.is_some() {
            return Err(CoreError::Conflict(format!(
                "category slug '{}' already exists",
                input.slug.trim()
            )));
        }

        let sibling: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM categories WHERE name = ?1 AND parent_id IS ?2 AND id IS NOT ?3",
                params![input.name.trim(), input.parent_id, existing_id],
                |row| row.get(0),
            )
            .optional()?;
        if sibling.is_some() {
            return Err(CoreError::Conflict(format!(
                "a sibling category named '{}' already exists",
                input.name.trim()
            )));
        }

        Ok(())
    }

    // Website management

    pub fn create_website(&self, input: &WebsiteInput) -> Result<Website> {
        let normalized = self.validate_website(input, None)?;
        let sort_order = match input.sort_order {
            Some(order) => order,
            None => self.next_order("websites", Some(("category_id", Some(input.category_id))))?,
        };
        let timestamp = current_timestamp();

        self.conn.execute(
            "INSERT INTO websites (
                name, description, url, normalized_url, icon_url, category_id, tags,
                is_new, is_featured, is_hot, sort_order, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
            params![
                input.name.trim(),
                &input.description,
                input.url.trim(),
                normalized,
                &input.icon_url,
                input.category_id,
                encode_tags(&input.tags)?,
                input.is_new,
                input.is_featured,
                input.is_hot,
                sort_order,
                timestamp,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(id, url = %input.url, "created website");
        self.get_website(id)
    }

    pub fn get_website(&self, id: i64) -> Result<Website> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM websites WHERE id = ?1", WEBSITE_COLUMNS),
                params![id],
                website_from_row,
            )
            .optional()?
            .ok_or_else(|| CoreError::not_found("website", id))
    }

    /// Look a website up by any spelling of its URL.
    pub fn find_website_by_url(&self, url: &str) -> Result<Option<Website>> {
        let website = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM websites WHERE normalized_url = ?1 ORDER BY created_at, id LIMIT 1",
                    WEBSITE_COLUMNS
                ),
                params![normalize_url(url)],
                website_from_row,
            )
            .optional()?;
        Ok(website)
    }

    pub fn list_websites(&self, filter: &WebsiteFilter) -> Result<Vec<Website>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(category_id) = filter.category_id {
            values.push(Value::Integer(category_id));
            clauses.push(format!(
                "category_id IN (SELECT id FROM categories WHERE id = ?{n} OR parent_id = ?{n})",
                n = values.len()
            ));
        }
        if let Some(status) = filter.status {
            clauses.push(format!("{} = 1", status.column()));
        }
        if let Some(keyword) = filter.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            values.push(Value::Text(format!("%{}%", keyword.trim())));
            clauses.push(format!(
                "(name LIKE ?{n} OR url LIKE ?{n} OR description LIKE ?{n})",
                n = values.len()
            ));
        }
        let (from, to) = filter.created_bounds()?;
        if let Some(from) = from {
            values.push(Value::Integer(from));
            clauses.push(format!("created_at >= ?{}", values.len()));
        }
        if let Some(to) = to {
            values.push(Value::Integer(to));
            clauses.push(format!("created_at <= ?{}", values.len()));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM websites {} ORDER BY category_id, sort_order, id",
            WEBSITE_COLUMNS, where_clause
        ))?;
        let websites = stmt
            .query_map(params_from_iter(values), website_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(websites)
    }

    pub fn websites_in_category(&self, category_id: i64) -> Result<Vec<Website>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM websites WHERE category_id = ?1 ORDER BY sort_order, id",
            WEBSITE_COLUMNS
        ))?;
        let websites = stmt
            .query_map(params![category_id], website_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(websites)
    }

    pub fn update_website(&self, id: i64, input: &WebsiteInput) -> Result<Website> {
        let existing = self.get_website(id)?;
        let normalized = self.validate_website(input, Some(id))?;
        let sort_order = input.sort_order.unwrap_or(existing.sort_order);

        self.conn.execute(
            "UPDATE websites SET name = ?1, description = ?2, url = ?3, normalized_url = ?4,
                icon_url = ?5, category_id = ?6, tags = ?7, is_new = ?8, is_featured = ?9,
                is_hot = ?10, sort_order = ?11, updated_at = ?12
             WHERE id = ?13",
            params![
                input.name.trim(),
                &input.description,
                input.url.trim(),
                normalized,
                &input.icon_url,
                input.category_id,
                encode_tags(&input.tags)?,
                input.is_new,
                input.is_featured,
                input.is_hot,
                sort_order,
                current_timestamp(),
                id,
            ],
        )?;
        self.get_website(id)
    }

    /// Reassign a website to another category, appending it to that
    /// category's order.
    pub fn move_website(&self, id: i64, category_id: i64) -> Result<()> {
        let sort_order = self.next_order("websites", Some(("category_id", Some(category_id))))?;
        let changed = self.conn.execute(
            "UPDATE websites SET category_id = ?1, sort_order = ?2, updated_at = ?3 WHERE id = ?4",
            params![category_id, sort_order, current_timestamp(), id],
        )?;
        if changed == 0 {
            return Err(CoreError::not_found("website", id));
        }
        Ok(())
    }

    pub fn set_website_icon(&self, id: i64, icon_url: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE websites SET icon_url = ?1, updated_at = ?2 WHERE id = ?3",
            params![icon_url, current_timestamp(), id],
        )?;
        if changed == 0 {
            return Err(CoreError::not_found("website", id));
        }
        Ok(())
    }

    pub fn delete_website(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM websites WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(CoreError::not_found("website", id));
        }
        Ok(())
    }

    fn validate_website(&self, input: &WebsiteInput, existing_id: Option<i64>) -> Result<String> {
        require_text("name", &input.name)?;
        require_text("url", &input.url)?;

        let normalized = normalize_url(&input.url);
        if normalized.is_empty() {
            return Err(CoreError::InvalidInput(format!("invalid url '{}'", input.url)));
        }

        self.get_category(input.category_id).map_err(|err| match err {
            CoreError::NotFound { .. } => CoreError::InvalidInput(format!(
                "category {} does not exist",
                input.category_id
            )),
            other => other,
        })?;

        let taken: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT id, name FROM websites WHERE normalized_url = ?1 AND id IS NOT ?2 LIMIT 1",
                params![&normalized, existing_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        if let Some((other_id, other_name)) = taken {
            return Err(CoreError::Conflict(format!(
                "url '{}' is already used by website {} ({})",
                input.url.trim(),
                other_id,
                other_name
            )));
        }

        Ok(normalized)
    }

    // Page management

    pub fn create_page(&self, input: &PageInput) -> Result<Page> {
        self.validate_page(input, None)?;
        let sort_order = match input.sort_order {
            Some(order) => order,
            None => self.next_order("pages", None)?,
        };
        let timestamp = current_timestamp();

        self.conn.execute(
            "INSERT INTO pages (slug, name, description, icon, sort_order, visible, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                input.slug.trim(),
                input.name.trim(),
                &input.description,
                &input.icon,
                sort_order,
                input.visible,
                timestamp,
            ],
        )?;
        self.get_page(self.conn.last_insert_rowid())
    }

    pub fn get_page(&self, id: i64) -> Result<Page> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM pages WHERE id = ?1", PAGE_COLUMNS),
                params![id],
                page_from_row,
            )
            .optional()?
            .ok_or_else(|| CoreError::not_found("page", id))
    }

    pub fn get_page_by_slug(&self, slug: &str) -> Result<Page> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM pages WHERE slug = ?1", PAGE_COLUMNS),
                params![slug],
                page_from_row,
            )
            .optional()?
            .ok_or_else(|| CoreError::not_found("page", slug))
    }

    pub fn list_pages(&self) -> Result<Vec<Page>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pages ORDER BY sort_order, id",
            PAGE_COLUMNS
        ))?;
        let pages = stmt
            .query_map([], page_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pages)
    }

    pub fn update_page(&self, id: i64, input: &PageInput) -> Result<Page> {
        let existing = self.get_page(id)?;
        self.validate_page(input, Some(id))?;

        self.conn.execute(
            "UPDATE pages SET slug = ?1, name = ?2, description = ?3, icon = ?4, sort_order = ?5,
                visible = ?6, updated_at = ?7
             WHERE id = ?8",
            params![
                input.slug.trim(),
                input.name.trim(),
                &input.description,
                &input.icon,
                input.sort_order.unwrap_or(existing.sort_order),
                input.visible,
                current_timestamp(),
                id,
            ],
        )?;
        self.get_page(id)
    }

    pub fn delete_page(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM pages WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(CoreError::not_found("page", id));
        }
        Ok(())
    }

    fn validate_page(&self, input: &PageInput, existing_id: Option<i64>) -> Result<()> {
        require_text("slug", &input.slug)?;
        require_text("name", &input.name)?;

        let taken: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM pages WHERE slug = ?1 AND id IS NOT ?2",
                params![input.slug.trim(), existing_id],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(CoreError::Conflict(format!(
                "page slug '{}' already exists",
                input.slug.trim()
            )));
        }
        Ok(())
    }

    /// Attach a top-level category to a page, or update the existing link.
    pub fn link_category(&self, page_id: i64, input: &PageCategoryInput) -> Result<PageCategory> {
        self.get_page(page_id)?;
        let category = self.get_category(input.category_id)?;
        if !category.is_root() {
            return Err(CoreError::InvalidInput(format!(
                "only top-level categories can be linked to a page; '{}' is a subcategory",
                category.slug
            )));
        }

        let sort_order = match input.sort_order {
            Some(order) => order,
            None => self.next_order("page_categories", Some(("page_id", Some(page_id))))?,
        };

        self.conn.execute(
            "INSERT INTO page_categories (page_id, category_id, sort_order, visible)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(page_id, category_id) DO UPDATE SET
                sort_order = excluded.sort_order, visible = excluded.visible",
            params![page_id, input.category_id, sort_order, input.visible],
        )?;

        Ok(PageCategory {
            page_id,
            category_id: input.category_id,
            sort_order,
            visible: input.visible,
        })
    }

    pub fn unlink_category(&self, page_id: i64, category_id: i64) -> Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM page_categories WHERE page_id = ?1 AND category_id = ?2",
            params![page_id, category_id],
        )?;
        if changed == 0 {
            return Err(CoreError::not_found(
                "page category",
                format!("{}/{}", page_id, category_id),
            ));
        }
        Ok(())
    }

    pub fn page_categories(&self, page_id: i64) -> Result<Vec<LinkedCategory>> {
        self.get_page(page_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.name, c.slug, c.parent_id, c.sort_order, c.visible, c.icon,
                    c.description, c.created_at, c.updated_at,
                    pc.sort_order AS link_order, pc.visible AS link_visible
             FROM page_categories pc
             JOIN categories c ON c.id = pc.category_id
             WHERE pc.page_id = ?1
             ORDER BY pc.sort_order, c.id",
        )?;
        let linked = stmt
            .query_map(params![page_id], |row| {
                Ok(LinkedCategory {
                    category: category_from_row(row)?,
                    sort_order: row.get("link_order")?,
                    visible: row.get("link_visible")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(linked)
    }

    pub fn all_page_categories(&self) -> Result<Vec<PageCategory>> {
        let mut stmt = self.conn.prepare(
            "SELECT page_id, category_id, sort_order, visible FROM page_categories
             ORDER BY page_id, sort_order, category_id",
        )?;
        let links = stmt
            .query_map([], |row| {
                Ok(PageCategory {
                    page_id: row.get(0)?,
                    category_id: row.get(1)?,
                    sort_order: row.get(2)?,
                    visible: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(links)
    }
}
