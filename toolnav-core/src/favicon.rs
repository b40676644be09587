// Favicon API templates: resolving icon URLs and probing an API

use crate::data::Database;
use crate::error::Result;
use crate::settings::FaviconApi;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use toolnav_dataset::extract_domain;
use tracing::{debug, info};

/// Substitute `{domain}` and `{url}` in a favicon API template.
pub fn render_template(template: &str, domain: &str, site_url: &str) -> String {
    template.replace("{domain}", domain).replace("{url}", site_url)
}

/// Icon URL for a site from the first enabled API, in `order`.
pub fn resolve_icon_url(apis: &[FaviconApi], site_url: &str) -> Option<String> {
    let domain = extract_domain(site_url)?;
    let mut enabled: Vec<&FaviconApi> = apis.iter().filter(|api| api.enabled).collect();
    enabled.sort_by_key(|api| (api.sort_order, api.id));
    enabled
        .first()
        .map(|api| render_template(&api.url_template, &domain, site_url.trim()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub ok: bool,
    pub status: u16,
    pub content_type: Option<String>,
    pub url: String,
}

pub struct IconProber {
    client: Client,
}

impl IconProber {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent("toolnav/0.1")
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }

    /// Fetch the icon an API would serve for `domain`. A probe succeeds
    /// when the response is 2xx with an `image/*` content type.
    pub async fn probe(&self, api: &FaviconApi, domain: &str) -> Result<ProbeResult> {
        let domain = domain.trim();
        let url = render_template(&api.url_template, domain, &format!("https://{}", domain));
        debug!(api = %api.name, %url, "probing favicon api");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let is_image = content_type
            .as_deref()
            .is_some_and(|ct| ct.trim().to_lowercase().starts_with("image/"));

        Ok(ProbeResult {
            ok: status.is_success() && is_image,
            status: status.as_u16(),
            content_type,
            url,
        })
    }
}

/// Fill `icon_url` on websites from the favicon APIs. Websites that already
/// have an icon are left alone unless `overwrite` is set.
pub fn fill_missing_icons(db: &Database, overwrite: bool) -> Result<usize> {
    let apis: Vec<FaviconApi> = db.list_records()?;
    if !apis.iter().any(|api| api.enabled) {
        info!("no enabled favicon api, nothing to fill");
        return Ok(0);
    }

    let tx = db.transaction()?;
    let mut filled = 0;
    for website in db.list_websites(&Default::default())? {
        let has_icon = website
            .icon_url
            .as_deref()
            .is_some_and(|icon| !icon.trim().is_empty());
        if has_icon && !overwrite {
            continue;
        }
        if let Some(icon) = resolve_icon_url(&apis, &website.url) {
            db.set_website_icon(website.id, &icon)?;
            filled += 1;
        }
    }
    tx.commit()?;

    info!(filled, overwrite, "filled website icons");
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(id: i64, order: i64, enabled: bool, template: &str) -> FaviconApi {
        FaviconApi {
            id,
            name: format!("api-{}", id),
            url_template: template.to_string(),
            sort_order: order,
            enabled,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn first_enabled_api_by_order_wins() {
        let apis = vec![
            api(1, 3, true, "https://late.example/{domain}"),
            api(2, 1, false, "https://disabled.example/{domain}"),
            api(3, 2, true, "https://icons.example/{domain}.ico"),
        ];
        assert_eq!(
            resolve_icon_url(&apis, "https://www.figma.com/files"),
            Some("https://icons.example/figma.com.ico".to_string())
        );
    }

    #[test]
    fn url_placeholder_gets_full_url() {
        let apis = vec![api(1, 1, true, "https://s2.example/favicons?url={url}")];
        assert_eq!(
            resolve_icon_url(&apis, "https://a.com/x"),
            Some("https://s2.example/favicons?url=https://a.com/x".to_string())
        );
    }

    #[test]
    fn no_enabled_api_resolves_nothing() {
        let apis = vec![api(1, 1, false, "https://x/{domain}")];
        assert_eq!(resolve_icon_url(&apis, "https://a.com"), None);
    }
}
