// Flat configuration tables: friend links, social media, nav menus, footer
// groups/links, favicon APIs and hot recommendations share one generic CRUD
// path through `ConfigRecord`. Site info is a single-row table.

use crate::data::{Database, current_timestamp};
use crate::error::{CoreError, Result};
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

fn default_true() -> bool {
    true
}

fn default_target() -> String {
    "_self".to_string()
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// A row in one of the ordered configuration tables.
///
/// `FIELDS` lists the writable columns in the order `input_values` and
/// `record_values` produce them; `sort_order` is always one of them.
pub trait ConfigRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Input: DeserializeOwned + Send + Sync + 'static;

    const TABLE: &'static str;
    const ENTITY: &'static str;
    const FIELDS: &'static [&'static str];

    fn from_row(row: &Row) -> rusqlite::Result<Self>;
    fn id(&self) -> i64;
    fn input_order(input: &Self::Input) -> Option<i64>;
    fn input_values(input: &Self::Input, sort_order: i64) -> Vec<Value>;
    fn record_values(&self) -> Vec<Value>;
    fn timestamps(&self) -> (i64, i64);

    fn validate(_db: &Database, _input: &Self::Input) -> Result<()> {
        Ok(())
    }
}

fn select_sql<T: ConfigRecord>() -> String {
    format!(
        "SELECT id, {}, created_at, updated_at FROM {}",
        T::FIELDS.join(", "),
        T::TABLE
    )
}

impl Database {
    pub fn list_records<T: ConfigRecord>(&self) -> Result<Vec<T>> {
        let conn = self.get_connection();
        let mut stmt = conn.prepare(&format!("{} ORDER BY sort_order, id", select_sql::<T>()))?;
        let records = stmt
            .query_map([], |row| T::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn get_record<T: ConfigRecord>(&self, id: i64) -> Result<T> {
        self.get_connection()
            .query_row(
                &format!("{} WHERE id = ?1", select_sql::<T>()),
                params![id],
                |row| T::from_row(row),
            )
            .optional()?
            .ok_or_else(|| CoreError::not_found(T::ENTITY, id))
    }

    /// Insert a record; without an explicit order it is appended.
    pub fn create_record<T: ConfigRecord>(&self, input: &T::Input) -> Result<T> {
        T::validate(self, input)?;
        let sort_order = match T::input_order(input) {
            Some(order) => order,
            None => self.next_order(T::TABLE, None)?,
        };
        let timestamp = current_timestamp();

        let mut values = T::input_values(input, sort_order);
        values.push(Value::Integer(timestamp));
        values.push(Value::Integer(timestamp));

        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
        self.get_connection().execute(
            &format!(
                "INSERT INTO {} ({}, created_at, updated_at) VALUES ({})",
                T::TABLE,
                T::FIELDS.join(", "),
                placeholders.join(", ")
            ),
            params_from_iter(values),
        )?;

        let id = self.get_connection().last_insert_rowid();
        info!(entity = T::ENTITY, id, "created record");
        self.get_record(id)
    }

    pub fn update_record<T: ConfigRecord>(&self, id: i64, input: &T::Input) -> Result<T> {
        let existing: T = self.get_record(id)?;
        T::validate(self, input)?;
        let sort_order = T::input_order(input).unwrap_or_else(|| {
            let values = existing.record_values();
            T::FIELDS
                .iter()
                .position(|f| *f == "sort_order")
                .and_then(|idx| match values.get(idx) {
                    Some(Value::Integer(order)) => Some(*order),
                    _ => None,
                })
                .unwrap_or(0)
        });

        let mut values = T::input_values(input, sort_order);
        let assignments: Vec<String> = T::FIELDS
            .iter()
            .enumerate()
            .map(|(i, field)| format!("{} = ?{}", field, i + 1))
            .collect();
        values.push(Value::Integer(current_timestamp()));
        values.push(Value::Integer(id));

        self.get_connection().execute(
            &format!(
                "UPDATE {} SET {}, updated_at = ?{} WHERE id = ?{}",
                T::TABLE,
                assignments.join(", "),
                values.len() - 1,
                values.len()
            ),
            params_from_iter(values),
        )?;
        self.get_record(id)
    }

    pub fn delete_record<T: ConfigRecord>(&self, id: i64) -> Result<()> {
        let changed = self
            .get_connection()
            .execute(&format!("DELETE FROM {} WHERE id = ?1", T::TABLE), params![id])?;
        if changed == 0 {
            return Err(CoreError::not_found(T::ENTITY, id));
        }
        info!(entity = T::ENTITY, id, "deleted record");
        Ok(())
    }

    /// Write a record with its own id, replacing any row holding that id.
    pub fn upsert_record<T: ConfigRecord>(&self, record: &T) -> Result<()> {
        let (created_at, updated_at) = record.timestamps();
        let mut values = vec![Value::Integer(record.id())];
        values.extend(record.record_values());
        values.push(Value::Integer(created_at));
        values.push(Value::Integer(updated_at));

        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
        let updates: Vec<String> = T::FIELDS
            .iter()
            .chain(["created_at", "updated_at"].iter())
            .map(|f| format!("{f} = excluded.{f}"))
            .collect();

        self.get_connection().execute(
            &format!(
                "INSERT INTO {table} (id, {fields}, created_at, updated_at) VALUES ({placeholders})
                 ON CONFLICT(id) DO UPDATE SET {updates}",
                table = T::TABLE,
                fields = T::FIELDS.join(", "),
                placeholders = placeholders.join(", "),
                updates = updates.join(", ")
            ),
            params_from_iter(values),
        )?;
        Ok(())
    }

    pub fn get_site_info(&self) -> Result<SiteInfo> {
        let info = self
            .get_connection()
            .query_row(
                "SELECT site_name, title, description, keywords, logo, favicon, icp, copyright,
                        contact_email, updated_at
                 FROM site_info WHERE id = 1",
                [],
                |row| {
                    Ok(SiteInfo {
                        site_name: row.get(0)?,
                        title: row.get(1)?,
                        description: row.get(2)?,
                        keywords: row.get(3)?,
                        logo: row.get(4)?,
                        favicon: row.get(5)?,
                        icp: row.get(6)?,
                        copyright: row.get(7)?,
                        contact_email: row.get(8)?,
                        updated_at: row.get(9)?,
                    })
                },
            )
            .optional()?;
        Ok(info.unwrap_or_default())
    }

    pub fn update_site_info(&self, info: &SiteInfo) -> Result<SiteInfo> {
        require("siteName", &info.site_name)?;
        self.write_site_info(info, current_timestamp())?;
        self.get_site_info()
    }

    pub(crate) fn write_site_info(&self, info: &SiteInfo, updated_at: i64) -> Result<()> {
        self.get_connection().execute(
            "INSERT INTO site_info (id, site_name, title, description, keywords, logo, favicon, icp,
                copyright, contact_email, updated_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                site_name = excluded.site_name, title = excluded.title,
                description = excluded.description, keywords = excluded.keywords,
                logo = excluded.logo, favicon = excluded.favicon, icp = excluded.icp,
                copyright = excluded.copyright, contact_email = excluded.contact_email,
                updated_at = excluded.updated_at",
            params![
                info.site_name.trim(),
                &info.title,
                &info.description,
                &info.keywords,
                &info.logo,
                &info.favicon,
                &info.icp,
                &info.copyright,
                &info.contact_email,
                updated_at,
            ],
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub site_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub icp: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendLink {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub logo: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub visible: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendLinkInput {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "order")]
    pub sort_order: Option<i64>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl ConfigRecord for FriendLink {
    type Input = FriendLinkInput;
    const TABLE: &'static str = "friend_links";
    const ENTITY: &'static str = "friend link";
    const FIELDS: &'static [&'static str] =
        &["name", "url", "logo", "description", "sort_order", "visible"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(FriendLink {
            id: row.get("id")?,
            name: row.get("name")?,
            url: row.get("url")?,
            logo: row.get("logo")?,
            description: row.get("description")?,
            sort_order: row.get("sort_order")?,
            visible: row.get("visible")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn input_order(input: &Self::Input) -> Option<i64> {
        input.sort_order
    }

    fn input_values(input: &Self::Input, sort_order: i64) -> Vec<Value> {
        vec![
            input.name.trim().to_string().into(),
            input.url.trim().to_string().into(),
            input.logo.clone().into(),
            input.description.clone().into(),
            sort_order.into(),
            input.visible.into(),
        ]
    }

    fn record_values(&self) -> Vec<Value> {
        vec![
            self.name.clone().into(),
            self.url.clone().into(),
            self.logo.clone().into(),
            self.description.clone().into(),
            self.sort_order.into(),
            self.visible.into(),
        ]
    }

    fn timestamps(&self) -> (i64, i64) {
        (self.created_at, self.updated_at)
    }

    fn validate(_db: &Database, input: &Self::Input) -> Result<()> {
        require("name", &input.name)?;
        require("url", &input.url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMedia {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub url: Option<String>,
    pub qrcode: Option<String>,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub visible: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMediaInput {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub qrcode: Option<String>,
    #[serde(default, rename = "order")]
    pub sort_order: Option<i64>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl ConfigRecord for SocialMedia {
    type Input = SocialMediaInput;
    const TABLE: &'static str = "social_media";
    const ENTITY: &'static str = "social media";
    const FIELDS: &'static [&'static str] = &["name", "icon", "url", "qrcode", "sort_order", "visible"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(SocialMedia {
            id: row.get("id")?,
            name: row.get("name")?,
            icon: row.get("icon")?,
            url: row.get("url")?,
            qrcode: row.get("qrcode")?,
            sort_order: row.get("sort_order")?,
            visible: row.get("visible")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn input_order(input: &Self::Input) -> Option<i64> {
        input.sort_order
    }

    fn input_values(input: &Self::Input, sort_order: i64) -> Vec<Value> {
        vec![
            input.name.trim().to_string().into(),
            input.icon.clone().into(),
            input.url.clone().into(),
            input.qrcode.clone().into(),
            sort_order.into(),
            input.visible.into(),
        ]
    }

    fn record_values(&self) -> Vec<Value> {
        vec![
            self.name.clone().into(),
            self.icon.clone().into(),
            self.url.clone().into(),
            self.qrcode.clone().into(),
            self.sort_order.into(),
            self.visible.into(),
        ]
    }

    fn timestamps(&self) -> (i64, i64) {
        (self.created_at, self.updated_at)
    }

    fn validate(_db: &Database, input: &Self::Input) -> Result<()> {
        require("name", &input.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavMenu {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub icon: Option<String>,
    pub target: String,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub visible: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavMenuInput {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default, rename = "order")]
    pub sort_order: Option<i64>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl ConfigRecord for NavMenu {
    type Input = NavMenuInput;
    const TABLE: &'static str = "nav_menus";
    const ENTITY: &'static str = "nav menu";
    const FIELDS: &'static [&'static str] = &["name", "url", "icon", "target", "sort_order", "visible"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(NavMenu {
            id: row.get("id")?,
            name: row.get("name")?,
            url: row.get("url")?,
            icon: row.get("icon")?,
            target: row.get("target")?,
            sort_order: row.get("sort_order")?,
            visible: row.get("visible")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn input_order(input: &Self::Input) -> Option<i64> {
        input.sort_order
    }

    fn input_values(input: &Self::Input, sort_order: i64) -> Vec<Value> {
        vec![
            input.name.trim().to_string().into(),
            input.url.trim().to_string().into(),
            input.icon.clone().into(),
            input.target.clone().into(),
            sort_order.into(),
            input.visible.into(),
        ]
    }

    fn record_values(&self) -> Vec<Value> {
        vec![
            self.name.clone().into(),
            self.url.clone().into(),
            self.icon.clone().into(),
            self.target.clone().into(),
            self.sort_order.into(),
            self.visible.into(),
        ]
    }

    fn timestamps(&self) -> (i64, i64) {
        (self.created_at, self.updated_at)
    }

    fn validate(_db: &Database, input: &Self::Input) -> Result<()> {
        require("name", &input.name)?;
        require("url", &input.url)?;
        if input.target != "_self" && input.target != "_blank" {
            return Err(CoreError::InvalidInput(format!(
                "target must be _self or _blank, got '{}'",
                input.target
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterGroup {
    pub id: i64,
    pub title: String,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub visible: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterGroupInput {
    pub title: String,
    #[serde(default, rename = "order")]
    pub sort_order: Option<i64>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl ConfigRecord for FooterGroup {
    type Input = FooterGroupInput;
    const TABLE: &'static str = "footer_groups";
    const ENTITY: &'static str = "footer group";
    const FIELDS: &'static [&'static str] = &["title", "sort_order", "visible"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(FooterGroup {
            id: row.get("id")?,
            title: row.get("title")?,
            sort_order: row.get("sort_order")?,
            visible: row.get("visible")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn input_order(input: &Self::Input) -> Option<i64> {
        input.sort_order
    }

    fn input_values(input: &Self::Input, sort_order: i64) -> Vec<Value> {
        vec![
            input.title.trim().to_string().into(),
            sort_order.into(),
            input.visible.into(),
        ]
    }

    fn record_values(&self) -> Vec<Value> {
        vec![
            self.title.clone().into(),
            self.sort_order.into(),
            self.visible.into(),
        ]
    }

    fn timestamps(&self) -> (i64, i64) {
        (self.created_at, self.updated_at)
    }

    fn validate(_db: &Database, input: &Self::Input) -> Result<()> {
        require("title", &input.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterLink {
    pub id: i64,
    pub group_id: i64,
    pub name: String,
    pub url: String,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub visible: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterLinkInput {
    pub group_id: i64,
    pub name: String,
    pub url: String,
    #[serde(default, rename = "order")]
    pub sort_order: Option<i64>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl ConfigRecord for FooterLink {
    type Input = FooterLinkInput;
    const TABLE: &'static str = "footer_links";
    const ENTITY: &'static str = "footer link";
    const FIELDS: &'static [&'static str] = &["group_id", "name", "url", "sort_order", "visible"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(FooterLink {
            id: row.get("id")?,
            group_id: row.get("group_id")?,
            name: row.get("name")?,
            url: row.get("url")?,
            sort_order: row.get("sort_order")?,
            visible: row.get("visible")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn input_order(input: &Self::Input) -> Option<i64> {
        input.sort_order
    }

    fn input_values(input: &Self::Input, sort_order: i64) -> Vec<Value> {
        vec![
            input.group_id.into(),
            input.name.trim().to_string().into(),
            input.url.trim().to_string().into(),
            sort_order.into(),
            input.visible.into(),
        ]
    }

    fn record_values(&self) -> Vec<Value> {
        vec![
            self.group_id.into(),
            self.name.clone().into(),
            self.url.clone().into(),
            self.sort_order.into(),
            self.visible.into(),
        ]
    }

    fn timestamps(&self) -> (i64, i64) {
        (self.created_at, self.updated_at)
    }

    fn validate(db: &Database, input: &Self::Input) -> Result<()> {
        require("name", &input.name)?;
        require("url", &input.url)?;
        db.get_record::<FooterGroup>(input.group_id).map_err(|err| match err {
            CoreError::NotFound { .. } => {
                CoreError::InvalidInput(format!("footer group {} does not exist", input.group_id))
            }
            other => other,
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaviconApi {
    pub id: i64,
    pub name: String,
    pub url_template: String,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub enabled: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaviconApiInput {
    pub name: String,
    pub url_template: String,
    #[serde(default, rename = "order")]
    pub sort_order: Option<i64>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ConfigRecord for FaviconApi {
    type Input = FaviconApiInput;
    const TABLE: &'static str = "favicon_apis";
    const ENTITY: &'static str = "favicon api";
    const FIELDS: &'static [&'static str] = &["name", "url_template", "sort_order", "enabled"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(FaviconApi {
            id: row.get("id")?,
            name: row.get("name")?,
            url_template: row.get("url_template")?,
            sort_order: row.get("sort_order")?,
            enabled: row.get("enabled")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn input_order(input: &Self::Input) -> Option<i64> {
        input.sort_order
    }

    fn input_values(input: &Self::Input, sort_order: i64) -> Vec<Value> {
        vec![
            input.name.trim().to_string().into(),
            input.url_template.trim().to_string().into(),
            sort_order.into(),
            input.enabled.into(),
        ]
    }

    fn record_values(&self) -> Vec<Value> {
        vec![
            self.name.clone().into(),
            self.url_template.clone().into(),
            self.sort_order.into(),
            self.enabled.into(),
        ]
    }

    fn timestamps(&self) -> (i64, i64) {
        (self.created_at, self.updated_at)
    }

    fn validate(_db: &Database, input: &Self::Input) -> Result<()> {
        require("name", &input.name)?;
        require("urlTemplate", &input.url_template)?;
        if !input.url_template.contains("{domain}") && !input.url_template.contains("{url}") {
            return Err(CoreError::InvalidInput(
                "urlTemplate must contain {domain} or {url}".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotRecommendation {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub icon_url: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub visible: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotRecommendationInput {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "order")]
    pub sort_order: Option<i64>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl ConfigRecord for HotRecommendation {
    type Input = HotRecommendationInput;
    const TABLE: &'static str = "hot_recommendations";
    const ENTITY: &'static str = "hot recommendation";
    const FIELDS: &'static [&'static str] =
        &["name", "url", "icon_url", "description", "sort_order", "visible"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(HotRecommendation {
            id: row.get("id")?,
            name: row.get("name")?,
            url: row.get("url")?,
            icon_url: row.get("icon_url")?,
            description: row.get("description")?,
            sort_order: row.get("sort_order")?,
            visible: row.get("visible")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn input_order(input: &Self::Input) -> Option<i64> {
        input.sort_order
    }

    fn input_values(input: &Self::Input, sort_order: i64) -> Vec<Value> {
        vec![
            input.name.trim().to_string().into(),
            input.url.trim().to_string().into(),
            input.icon_url.clone().into(),
            input.description.clone().into(),
            sort_order.into(),
            input.visible.into(),
        ]
    }

    fn record_values(&self) -> Vec<Value> {
        vec![
            self.name.clone().into(),
            self.url.clone().into(),
            self.icon_url.clone().into(),
            self.description.clone().into(),
            self.sort_order.into(),
            self.visible.into(),
        ]
    }

    fn timestamps(&self) -> (i64, i64) {
        (self.created_at, self.updated_at)
    }

    fn validate(_db: &Database, input: &Self::Input) -> Result<()> {
        require("name", &input.name)?;
        require("url", &input.url)
    }
}
