// Reconciliation of stored websites against a static tool dataset.
//
// Every top-level category linked to a page owns a scope: its children and
// every website attached to the root or a child. Websites are placed into a
// child by looking their URL up in the dataset and resolving the dataset key
// through an ordered rule list. Whatever is still on the root afterwards can
// be spread evenly over the children.

use crate::data::Database;
use crate::error::{CoreError, Result};
use crate::model::{Category, CategoryInput, Website, WebsiteInput};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use toolnav_dataset::{Dataset, extract_domain, normalize_url};
use tracing::{debug, info, warn};

/// Callback for reporting reconcile and import progress
pub type ReconcileProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchRule {
    /// Child slug equals the dataset key, with or without the root slug prefix
    ExactSlug,
    /// Child name equals the key or the dataset's declared name (case-insensitive)
    ExactName,
    /// Domain lookup fallback, and substring matching between key and child
    DomainSubstring,
    /// Spread leftovers on the root over its children
    EvenSplit,
}

impl MatchRule {
    pub fn all() -> Vec<MatchRule> {
        vec![
            MatchRule::ExactSlug,
            MatchRule::ExactName,
            MatchRule::DomainSubstring,
            MatchRule::EvenSplit,
        ]
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "exactslug" | "slug" => Some(MatchRule::ExactSlug),
            "exactname" | "name" => Some(MatchRule::ExactName),
            "domainsubstring" | "domain" => Some(MatchRule::DomainSubstring),
            "evensplit" | "split" => Some(MatchRule::EvenSplit),
            _ => None,
        }
    }

    /// Parse a comma separated rule list, keeping the given order.
    pub fn parse_list(raw: &str) -> Result<Vec<MatchRule>> {
        let mut rules = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let rule = MatchRule::from_str(part)
                .ok_or_else(|| CoreError::InvalidInput(format!("unknown match rule '{}'", part)))?;
            if !rules.contains(&rule) {
                rules.push(rule);
            }
        }
        if rules.is_empty() {
            return Err(CoreError::InvalidInput("no match rules given".to_string()));
        }
        Ok(rules)
    }
}

/// Options for a reconcile run
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub page_slug: String,
    pub rules: Vec<MatchRule>,
    pub dry_run: bool,
}

impl ReconcileOptions {
    pub fn new(page_slug: &str) -> Self {
        Self {
            page_slug: page_slug.to_string(),
            rules: MatchRule::all(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveReason {
    Matched(MatchRule),
    EvenSplit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub website_id: i64,
    pub website_name: String,
    pub from_category_id: i64,
    pub to_category_id: i64,
    pub to_category_slug: String,
    pub reason: MoveReason,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub dry_run: bool,
    pub moved: usize,
    pub unchanged: usize,
    pub even_split: usize,
    pub unmatched: usize,
    pub errors: Vec<String>,
    pub moves: Vec<Move>,
}

impl ReconcileReport {
    pub fn total_changes(&self) -> usize {
        self.moved + self.even_split
    }
}

struct Lookup<'a> {
    dataset: &'a Dataset,
    by_url: HashMap<String, String>,
    by_domain: HashMap<String, String>,
    rules: &'a [MatchRule],
}

impl<'a> Lookup<'a> {
    fn new(dataset: &'a Dataset, rules: &'a [MatchRule]) -> Self {
        Self {
            dataset,
            by_url: dataset.url_index(),
            by_domain: dataset.domain_index(),
            rules,
        }
    }

    fn enabled(&self, rule: MatchRule) -> bool {
        self.rules.contains(&rule)
    }

    fn key_for(&self, url: &str) -> Option<&str> {
        if let Some(key) = self.by_url.get(&normalize_url(url)) {
            return Some(key);
        }
        if self.enabled(MatchRule::DomainSubstring) {
            let domain = extract_domain(url)?;
            return self.by_domain.get(&domain).map(String::as_str);
        }
        None
    }

    /// Resolve a dataset key to one of `children`, trying rules in order.
    fn resolve<'c>(
        &self,
        key: &str,
        root: &Category,
        children: &'c [Category],
    ) -> Option<(&'c Category, MatchRule)> {
        let key_lower = key.trim().to_lowercase();
        if key_lower.is_empty() {
            return None;
        }
        let declared = self.dataset.category_name(key).map(str::to_lowercase);

        for rule in self.rules {
            let found = match rule {
                MatchRule::ExactSlug => children.iter().find(|child| {
                    let slug = child.slug.to_lowercase();
                    slug == key_lower
                        || slug
                            .strip_prefix(&root.slug.to_lowercase())
                            .map(|rest| rest.trim_start_matches(['-', '_']))
                            == Some(key_lower.as_str())
                }),
                MatchRule::ExactName => children.iter().find(|child| {
                    let name = child.name.trim().to_lowercase();
                    name == key_lower || declared.as_deref() == Some(name.as_str())
                }),
                MatchRule::DomainSubstring => children.iter().find(|child| {
                    let slug = child.slug.to_lowercase();
                    let name = child.name.to_lowercase();
                    slug.contains(&key_lower)
                        || name.contains(&key_lower)
                        || key_lower.contains(&slug)
                        || declared
                            .as_deref()
                            .is_some_and(|d| !d.is_empty() && (name.contains(d) || d.contains(&name)))
                }),
                MatchRule::EvenSplit => None,
            };
            if let Some(child) = found {
                return Some((child, *rule));
            }
        }
        None
    }
}

fn report_progress(progress: &Option<ReconcileProgressCallback>, message: String) {
    if let Some(callback) = progress {
        callback(message);
    }
}

/// Websites attached to `root` or one of `children`, ordered by id.
fn scope_websites(db: &Database, root: &Category, children: &[Category]) -> Result<Vec<Website>> {
    let mut websites = db.websites_in_category(root.id)?;
    for child in children {
        websites.extend(db.websites_in_category(child.id)?);
    }
    websites.sort_by_key(|w| w.id);
    Ok(websites)
}

/// Reconcile the websites of every category linked to a page.
///
/// The whole run happens in one transaction; a dry run rolls it back so the
/// report describes what would change.
pub fn reconcile(
    db: &Database,
    dataset: &Dataset,
    options: &ReconcileOptions,
    progress: Option<ReconcileProgressCallback>,
) -> Result<ReconcileReport> {
    let page = db.get_page_by_slug(&options.page_slug)?;
    let lookup = Lookup::new(dataset, &options.rules);
    let mut report = ReconcileReport {
        dry_run: options.dry_run,
        ..Default::default()
    };

    let tx = db.transaction()?;

    for linked in db.page_categories(page.id)? {
        let root = linked.category;
        let children = db.children_of(root.id)?;
        let child_ids: HashSet<i64> = children.iter().map(|c| c.id).collect();
        let websites = scope_websites(db, &root, &children)?;

        report_progress(
            &progress,
            format!("Reconciling {} ({} websites)", root.slug, websites.len()),
        );

        let mut leftovers = Vec::new();
        for website in websites {
            let target = lookup
                .key_for(&website.url)
                .and_then(|key| lookup.resolve(key, &root, &children));

            match target {
                Some((child, _)) if child.id == website.category_id => report.unchanged += 1,
                Some((child, rule)) => {
                    debug!(website = website.id, to = %child.slug, ?rule, "matched website");
                    match db.move_website(website.id, child.id) {
                        Ok(()) => {
                            report.moved += 1;
                            report.moves.push(Move {
                                website_id: website.id,
                                website_name: website.name.clone(),
                                from_category_id: website.category_id,
                                to_category_id: child.id,
                                to_category_slug: child.slug.clone(),
                                reason: MoveReason::Matched(rule),
                            });
                        }
                        Err(err) => {
                            warn!(website = website.id, error = %err, "failed to move website");
                            report
                                .errors
                                .push(format!("website {} ({}): {}", website.id, website.url, err));
                        }
                    }
                }
                None if child_ids.contains(&website.category_id) => report.unchanged += 1,
                None => leftovers.push(website),
            }
        }

        if leftovers.is_empty() {
            continue;
        }

        if children.is_empty() || !lookup.enabled(MatchRule::EvenSplit) {
            for website in &leftovers {
                info!(website = website.id, url = %website.url, root = %root.slug, "unmatched website left on root");
            }
            report.unmatched += leftovers.len();
            continue;
        }

        for (i, website) in leftovers.iter().enumerate() {
            let child = &children[i % children.len()];
            match db.move_website(website.id, child.id) {
                Ok(()) => {
                    report.even_split += 1;
                    report.moves.push(Move {
                        website_id: website.id,
                        website_name: website.name.clone(),
                        from_category_id: website.category_id,
                        to_category_id: child.id,
                        to_category_slug: child.slug.clone(),
                        reason: MoveReason::EvenSplit,
                    });
                }
                Err(err) => {
                    warn!(website = website.id, error = %err, "failed to split website");
                    report
                        .errors
                        .push(format!("website {} ({}): {}", website.id, website.url, err));
                }
            }
        }
    }

    if options.dry_run {
        tx.rollback()?;
    } else {
        tx.commit()?;
    }

    info!(
        page = %options.page_slug,
        moved = report.moved,
        even_split = report.even_split,
        unchanged = report.unchanged,
        unmatched = report.unmatched,
        errors = report.errors.len(),
        dry_run = options.dry_run,
        "reconcile finished"
    );
    Ok(report)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub normalized_url: String,
    pub kept: i64,
    pub removed: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupeReport {
    pub dry_run: bool,
    pub groups: Vec<DuplicateGroup>,
}

impl DedupeReport {
    pub fn removed_count(&self) -> usize {
        self.groups.iter().map(|g| g.removed.len()).sum()
    }
}

/// Delete websites whose normalised URL repeats, keeping the earliest
/// created row of each group (lowest id on a tie).
pub fn remove_duplicate_urls(db: &Database, dry_run: bool) -> Result<DedupeReport> {
    let mut stmt = db
        .get_connection()
        .prepare("SELECT id, url, created_at FROM websites")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    drop(stmt);

    let mut by_url: HashMap<String, Vec<(i64, i64)>> = HashMap::new();
    for (id, url, created_at) in rows {
        let normalized = normalize_url(&url);
        if normalized.is_empty() {
            continue;
        }
        by_url.entry(normalized).or_default().push((created_at, id));
    }

    let mut groups: Vec<DuplicateGroup> = by_url
        .into_iter()
        .filter(|(_, rows)| rows.len() > 1)
        .map(|(normalized_url, mut rows)| {
            rows.sort();
            let kept = rows[0].1;
            let removed = rows[1..].iter().map(|(_, id)| *id).collect();
            DuplicateGroup {
                normalized_url,
                kept,
                removed,
            }
        })
        .collect();
    groups.sort_by_key(|g| g.kept);

    if !dry_run {
        let tx = db.transaction()?;
        for group in &groups {
            for id in &group.removed {
                db.delete_website(*id)?;
                info!(id, kept = group.kept, url = %group.normalized_url, "removed duplicate website");
            }
        }
        tx.commit()?;
    }

    let report = DedupeReport { dry_run, groups };
    info!(
        groups = report.groups.len(),
        removed = report.removed_count(),
        dry_run,
        "dedupe finished"
    );
    Ok(report)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Misassignment {
    pub website_id: i64,
    pub website_name: String,
    pub url: String,
    pub root_category_id: i64,
    pub root_category_slug: String,
}

/// Websites sitting directly on a linked top-level category that has
/// subcategories they should live in.
pub fn audit_page(db: &Database, page_id: i64) -> Result<Vec<Misassignment>> {
    let mut found = Vec::new();
    for linked in db.page_categories(page_id)? {
        let root = linked.category;
        if db.children_of(root.id)?.is_empty() {
            continue;
        }
        for website in db.websites_in_category(root.id)? {
            found.push(Misassignment {
                website_id: website.id,
                website_name: website.name,
                url: website.url,
                root_category_id: root.id,
                root_category_slug: root.slug.clone(),
            });
        }
    }
    Ok(found)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub created_categories: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

fn slugify(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '/')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Insert dataset tools under the top-level category `root_slug`, creating
/// the root and any missing subcategories. Tools whose URL is already
/// stored are skipped.
pub fn import_dataset(
    db: &Database,
    dataset: &Dataset,
    root_slug: &str,
    progress: Option<ReconcileProgressCallback>,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    let rules = [MatchRule::ExactSlug, MatchRule::ExactName];
    let lookup = Lookup::new(dataset, &rules);

    let tx = db.transaction()?;

    let root = match db.get_category_by_slug(root_slug)? {
        Some(category) if category.is_root() => category,
        Some(category) => {
            return Err(CoreError::InvalidInput(format!(
                "'{}' is a subcategory, imports need a top-level category",
                category.slug
            )));
        }
        None => {
            let name = dataset.category_name(root_slug).unwrap_or(root_slug);
            report.created_categories += 1;
            db.create_category(&CategoryInput::new(name, root_slug))?
        }
    };
    let mut children = db.children_of(root.id)?;

    for (i, tool) in dataset.tools.iter().enumerate() {
        if i % 25 == 0 {
            report_progress(
                &progress,
                format!("Importing {}/{} tools", i, dataset.tools.len()),
            );
        }

        if db.find_website_by_url(&tool.url)?.is_some() {
            report.skipped += 1;
            continue;
        }

        let category_id = match tool.key() {
            None => root.id,
            Some(key) => match lookup.resolve(key, &root, &children) {
                Some((child, _)) => child.id,
                None => {
                    let name = dataset.category_name(key).unwrap_or(key);
                    let slug = format!("{}-{}", root.slug, slugify(key));
                    match db.create_category(&CategoryInput::new(name, &slug).child_of(root.id)) {
                        Ok(child) => {
                            report.created_categories += 1;
                            let id = child.id;
                            children.push(child);
                            id
                        }
                        Err(err) => {
                            warn!(key, error = %err, "could not create subcategory");
                            report.errors.push(format!("category '{}': {}", key, err));
                            continue;
                        }
                    }
                }
            },
        };

        let mut input = WebsiteInput::new(&tool.name, &tool.url, category_id);
        input.description = tool.description.clone();
        input.icon_url = tool.icon.clone();
        input.tags = tool.tags.clone();

        match db.create_website(&input) {
            Ok(_) => report.inserted += 1,
            Err(err) => {
                warn!(url = %tool.url, error = %err, "failed to import tool");
                report.errors.push(format!("{}: {}", tool.url, err));
            }
        }
    }

    tx.commit()?;
    info!(
        root = %root.slug,
        inserted = report.inserted,
        skipped = report.skipped,
        categories = report.created_categories,
        "import finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_names_are_lenient() {
        assert_eq!(MatchRule::from_str("exact-slug"), Some(MatchRule::ExactSlug));
        assert_eq!(MatchRule::from_str("EvenSplit"), Some(MatchRule::EvenSplit));
        assert_eq!(MatchRule::from_str("domain_substring"), Some(MatchRule::DomainSubstring));
        assert_eq!(MatchRule::from_str("fuzzy"), None);
    }

    #[test]
    fn rule_list_keeps_order_and_drops_repeats() {
        let rules = MatchRule::parse_list("name, slug,name").unwrap();
        assert_eq!(rules, vec![MatchRule::ExactName, MatchRule::ExactSlug]);
        assert!(MatchRule::parse_list(" , ").is_err());
    }

    #[test]
    fn slugify_joins_words() {
        assert_eq!(slugify(" UI Kits "), "ui-kits");
        assert_eq!(slugify("a/b"), "a-b");
    }
}
