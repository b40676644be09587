// Tests for snapshots and restore

use tempfile::TempDir;
use toolnav_core::Database;
use toolnav_core::backup::{read_snapshot, restore, restore_from_file, snapshot};
use toolnav_core::export::{ExportFilter, ExportFormat, ExportKind, ExportStore};
use toolnav_core::model::{CategoryInput, PageCategoryInput, PageInput, WebsiteInput};
use toolnav_core::settings::{
    FooterGroup, FooterGroupInput, FooterLink, FooterLinkInput, NavMenu, NavMenuInput, SiteInfo,
};

fn create_test_db(dir: &TempDir, name: &str) -> Database {
    Database::new(&dir.path().join(name)).unwrap()
}

fn seed_settings(db: &Database) {
    db.update_site_info(&SiteInfo {
        site_name: "Tool Nav".to_string(),
        copyright: Some("© 2026".to_string()),
        ..Default::default()
    })
    .unwrap();

    for (name, target) in [("Home", "_self"), ("Blog", "_blank"), ("About", "_self")] {
        db.create_record::<NavMenu>(&NavMenuInput {
            name: name.to_string(),
            url: format!("/{}", name.to_lowercase()),
            icon: None,
            target: target.to_string(),
            sort_order: None,
            visible: true,
        })
        .unwrap();
    }

    for title in ["Company", "Resources"] {
        let group = db
            .create_record::<FooterGroup>(&FooterGroupInput {
                title: title.to_string(),
                sort_order: None,
                visible: true,
            })
            .unwrap();
        db.create_record::<FooterLink>(&FooterLinkInput {
            group_id: group.id,
            name: format!("{} link", title),
            url: "/x".to_string(),
            sort_order: None,
            visible: true,
        })
        .unwrap();
    }
}

// ============================================================================
// Snapshot Tests
// ============================================================================

#[test]
fn test_settings_snapshot_has_no_content() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir, "source.db");
    seed_settings(&db);

    let snap = snapshot(&db, false).unwrap();

    assert_eq!(snap.version, 1);
    assert!(snap.content.is_none());
    assert_eq!(snap.settings.nav_menus.len(), 3);
    assert_eq!(snap.settings.footer_groups.len(), 2);
    assert_eq!(snap.settings.footer_links.len(), 2);
}

#[test]
fn test_settings_round_trip_into_fresh_database() {
    let temp_dir = TempDir::new().unwrap();
    let source = create_test_db(&temp_dir, "source.db");
    seed_settings(&source);
    let snap = snapshot(&source, false).unwrap();

    let json = serde_json::to_string(&snap).unwrap();
    let parsed = serde_json::from_str(&json).unwrap();

    let target = create_test_db(&temp_dir, "target.db");
    let report = restore(&target, &parsed).unwrap();

    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert_eq!(report.restored, 1 + 3 + 2 + 2);
    assert_eq!(target.list_records::<NavMenu>().unwrap(), snap.settings.nav_menus);
    assert_eq!(
        target.list_records::<FooterGroup>().unwrap(),
        snap.settings.footer_groups
    );
    assert_eq!(
        target.list_records::<FooterLink>().unwrap(),
        snap.settings.footer_links
    );
    assert_eq!(target.get_site_info().unwrap(), snap.settings.site_info);
}

#[test]
fn test_restore_overwrites_matching_ids() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir, "source.db");
    seed_settings(&db);
    let snap = snapshot(&db, false).unwrap();

    let first = snap.settings.nav_menus[0].id;
    db.update_record::<NavMenu>(
        first,
        &NavMenuInput {
            name: "Changed".to_string(),
            url: "/changed".to_string(),
            icon: None,
            target: "_blank".to_string(),
            sort_order: Some(99),
            visible: false,
        },
    )
    .unwrap();

    restore(&db, &snap).unwrap();

    let restored = db.get_record::<NavMenu>(first).unwrap();
    assert_eq!(restored.name, "Home");
    assert_eq!(restored.sort_order, 1);
    assert_eq!(db.list_records::<NavMenu>().unwrap().len(), 3);
}

#[test]
fn test_orphan_footer_link_is_reported_not_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let source = create_test_db(&temp_dir, "source.db");
    seed_settings(&source);
    let mut snap = snapshot(&source, false).unwrap();
    snap.settings.footer_groups.remove(0);

    let target = create_test_db(&temp_dir, "target.db");
    let report = restore(&target, &snap).unwrap();

    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("footer link"));
    assert_eq!(target.list_records::<FooterLink>().unwrap().len(), 1);
}

#[test]
fn test_full_backup_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let source = create_test_db(&temp_dir, "source.db");
    seed_settings(&source);

    let page = source.create_page(&PageInput::new("design", "Design")).unwrap();
    let root = source
        .create_category(&CategoryInput::new("Design", "design"))
        .unwrap();
    let ui = source
        .create_category(&CategoryInput::new("UI", "design-ui").child_of(root.id))
        .unwrap();
    let mut figma = WebsiteInput::new("Figma", "https://figma.com", ui.id);
    figma.tags = vec!["ui".to_string()];
    source.create_website(&figma).unwrap();
    source
        .link_category(
            page.id,
            &PageCategoryInput {
                category_id: root.id,
                sort_order: None,
                visible: true,
            },
        )
        .unwrap();

    let snap = snapshot(&source, true).unwrap();
    let target = create_test_db(&temp_dir, "target.db");
    let report = restore(&target, &snap).unwrap();

    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert_eq!(target.list_categories().unwrap(), source.list_categories().unwrap());
    assert_eq!(
        target.list_websites(&Default::default()).unwrap(),
        source.list_websites(&Default::default()).unwrap()
    );
    assert_eq!(target.page_categories(page.id).unwrap().len(), 1);
    assert!(target.find_website_by_url("www.figma.com").unwrap().is_some());
}

#[test]
fn test_restore_reports_rows_that_break_write_rules() {
    let temp_dir = TempDir::new().unwrap();
    let source = create_test_db(&temp_dir, "source.db");
    let root = source
        .create_category(&CategoryInput::new("Design", "design"))
        .unwrap();
    let ui = source
        .create_category(&CategoryInput::new("UI", "design-ui").child_of(root.id))
        .unwrap();
    source
        .create_website(&WebsiteInput::new("Figma", "https://figma.com", ui.id))
        .unwrap();
    source
        .create_website(&WebsiteInput::new("GitHub", "https://github.com", root.id))
        .unwrap();

    let mut snap = snapshot(&source, true).unwrap();
    let content = snap.content.as_mut().unwrap();
    // Same site as Figma under another spelling
    let github = content.websites.iter_mut().find(|w| w.name == "GitHub").unwrap();
    github.url = "https://www.figma.com/".to_string();
    // A grandchild of the root
    let mut nested = content
        .categories
        .iter()
        .find(|c| c.id == ui.id)
        .unwrap()
        .clone();
    nested.id = ui.id + 100;
    nested.slug = "design-ui-nested".to_string();
    nested.name = "Nested".to_string();
    nested.parent_id = Some(ui.id);
    content.categories.push(nested);

    let target = create_test_db(&temp_dir, "target.db");
    let report = restore(&target, &snap).unwrap();

    assert_eq!(report.errors.len(), 2, "{:?}", report.errors);
    assert_eq!(target.list_categories().unwrap().len(), 2);
    assert_eq!(target.list_websites(&Default::default()).unwrap().len(), 1);
}

#[test]
fn test_newer_snapshot_version_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir, "source.db");
    let mut snap = snapshot(&db, false).unwrap();
    snap.version = 99;

    assert!(restore(&db, &snap).is_err());
}

// ============================================================================
// Stored File Tests
// ============================================================================

#[test]
fn test_restore_from_zip_export() {
    let temp_dir = TempDir::new().unwrap();
    let source = create_test_db(&temp_dir, "source.db");
    seed_settings(&source);

    let store = ExportStore::new(&temp_dir.path().join("exports")).unwrap();
    let file = store
        .create(
            &source,
            ExportKind::Settings,
            ExportFormat::Zip,
            &ExportFilter::default(),
        )
        .unwrap();
    let path = store.path_of(&file.name).unwrap();

    let snap = read_snapshot(&path).unwrap();
    assert_eq!(snap.settings.nav_menus.len(), 3);

    let target = create_test_db(&temp_dir, "target.db");
    let report = restore_from_file(&target, &path).unwrap();
    assert!(report.errors.is_empty());
    assert_eq!(target.list_records::<NavMenu>().unwrap().len(), 3);
}

#[test]
fn test_restore_from_json_export() {
    let temp_dir = TempDir::new().unwrap();
    let source = create_test_db(&temp_dir, "source.db");
    seed_settings(&source);

    let store = ExportStore::new(&temp_dir.path().join("exports")).unwrap();
    let file = store
        .create(
            &source,
            ExportKind::Backup,
            ExportFormat::Json,
            &ExportFilter::default(),
        )
        .unwrap();

    let target = create_test_db(&temp_dir, "target.db");
    let report = restore_from_file(&target, &store.path_of(&file.name).unwrap()).unwrap();
    assert!(report.errors.is_empty());
    assert_eq!(target.list_records::<FooterGroup>().unwrap().len(), 2);
}
