// Tests for export generation and the export directory

use std::fs::{self, File};
use std::io::Read;
use tempfile::TempDir;
use toolnav_core::Database;
use toolnav_core::error::CoreError;
use toolnav_core::export::{ExportFilter, ExportFormat, ExportKind, ExportStore};
use toolnav_core::model::{CategoryInput, WebsiteInput, WebsiteStatus};
use zip::ZipArchive;

fn create_test_env() -> (TempDir, Database, ExportStore) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::new(&temp_dir.path().join("test.db")).unwrap();
    let store = ExportStore::new(&temp_dir.path().join("exports")).unwrap();
    (temp_dir, db, store)
}

fn seed_websites(db: &Database) -> (i64, i64) {
    let design = db
        .create_category(&CategoryInput::new("Design", "design"))
        .unwrap();
    let ui = db
        .create_category(&CategoryInput::new("UI", "design-ui").child_of(design.id))
        .unwrap();
    let dev = db.create_category(&CategoryInput::new("Dev", "dev")).unwrap();

    let mut figma = WebsiteInput::new("Figma", "https://figma.com", ui.id);
    figma.description = Some("Design, prototype, collaborate".to_string());
    figma.is_hot = true;
    db.create_website(&figma).unwrap();

    let mut github = WebsiteInput::new("GitHub", "https://github.com", dev.id);
    github.description = Some("Where \"code\" lives".to_string());
    db.create_website(&github).unwrap();

    (design.id, dev.id)
}

// ============================================================================
// CSV / JSON Tests
// ============================================================================

#[test]
fn test_websites_csv_export() {
    let (_temp_dir, db, store) = create_test_env();
    seed_websites(&db);

    let file = store
        .create(&db, ExportKind::Websites, ExportFormat::Csv, &ExportFilter::default())
        .unwrap();

    assert!(file.name.starts_with("websites-"));
    assert!(file.name.ends_with(".csv"));
    let content = fs::read_to_string(store.path_of(&file.name).unwrap()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("id,name,url"));
    assert!(content.contains("\"Design, prototype, collaborate\""));
    assert!(content.contains("\"Where \"\"code\"\" lives\""));
}

#[test]
fn test_category_filter_includes_children() {
    let (_temp_dir, db, store) = create_test_env();
    let (design_id, _) = seed_websites(&db);

    let filter = ExportFilter {
        category_id: Some(design_id),
        ..Default::default()
    };
    let file = store
        .create(&db, ExportKind::Websites, ExportFormat::Json, &filter)
        .unwrap();

    let raw = fs::read_to_string(store.path_of(&file.name).unwrap()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["count"], 1);
    assert_eq!(value["websites"][0]["name"], "Figma");
}

#[test]
fn test_status_filter() {
    let (_temp_dir, db, store) = create_test_env();
    seed_websites(&db);

    let filter = ExportFilter {
        status: Some(WebsiteStatus::Hot),
        ..Default::default()
    };
    let file = store
        .create(&db, ExportKind::Websites, ExportFormat::Csv, &filter)
        .unwrap();

    let content = fs::read_to_string(store.path_of(&file.name).unwrap()).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(content.contains("Figma"));
}

#[test]
fn test_date_filter_excludes_everything_outside_range() {
    let (_temp_dir, db, store) = create_test_env();
    seed_websites(&db);

    let filter = ExportFilter {
        from: Some("2000-01-01".to_string()),
        to: Some("2000-12-31".to_string()),
        ..Default::default()
    };
    let file = store
        .create(&db, ExportKind::Websites, ExportFormat::Csv, &filter)
        .unwrap();

    let content = fs::read_to_string(store.path_of(&file.name).unwrap()).unwrap();
    assert_eq!(content.lines().count(), 1);
}

#[test]
fn test_failed_zip_export_leaves_no_file() {
    let (_temp_dir, db, store) = create_test_env();
    seed_websites(&db);

    let filter = ExportFilter {
        from: Some("not-a-date".to_string()),
        ..Default::default()
    };
    let result = store.create(&db, ExportKind::Websites, ExportFormat::Zip, &filter);

    assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_categories_csv_export() {
    let (_temp_dir, db, store) = create_test_env();
    seed_websites(&db);

    let file = store
        .create(&db, ExportKind::Categories, ExportFormat::Csv, &ExportFilter::default())
        .unwrap();

    let content = fs::read_to_string(store.path_of(&file.name).unwrap()).unwrap();
    assert_eq!(content.lines().count(), 4);
    assert!(content.contains("design-ui"));
}

#[test]
fn test_settings_csv_is_rejected() {
    let (_temp_dir, db, store) = create_test_env();

    let result = store.create(&db, ExportKind::Settings, ExportFormat::Csv, &ExportFilter::default());
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    assert!(store.list().unwrap().is_empty());
}

// ============================================================================
// Zip Tests
// ============================================================================

#[test]
fn test_zip_export_contains_json_and_csv() {
    let (_temp_dir, db, store) = create_test_env();
    seed_websites(&db);

    let file = store
        .create(&db, ExportKind::Websites, ExportFormat::Zip, &ExportFilter::default())
        .unwrap();

    let mut archive = ZipArchive::new(File::open(store.path_of(&file.name).unwrap()).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    assert_eq!(names, vec!["websites.csv", "websites.json"]);

    let mut csv = String::new();
    archive
        .by_name("websites.csv")
        .unwrap()
        .read_to_string(&mut csv)
        .unwrap();
    assert!(csv.contains("GitHub"));
}

#[test]
fn test_backup_zip_has_only_json() {
    let (_temp_dir, db, store) = create_test_env();
    seed_websites(&db);

    let file = store
        .create(&db, ExportKind::Backup, ExportFormat::Zip, &ExportFilter::default())
        .unwrap();

    let archive = ZipArchive::new(File::open(store.path_of(&file.name).unwrap()).unwrap()).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    assert_eq!(names, vec!["backup.json"]);
}

// ============================================================================
// Export Store Tests
// ============================================================================

#[test]
fn test_same_second_exports_get_distinct_names() {
    let (_temp_dir, db, store) = create_test_env();

    let a = store
        .create(&db, ExportKind::Settings, ExportFormat::Json, &ExportFilter::default())
        .unwrap();
    let b = store
        .create(&db, ExportKind::Settings, ExportFormat::Json, &ExportFilter::default())
        .unwrap();

    assert_ne!(a.name, b.name);
    assert_eq!(store.list().unwrap().len(), 2);
}

#[test]
fn test_list_reports_size() {
    let (_temp_dir, db, store) = create_test_env();
    seed_websites(&db);

    let file = store
        .create(&db, ExportKind::Websites, ExportFormat::Json, &ExportFilter::default())
        .unwrap();
    let listed = store.list().unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, file.name);
    assert!(listed[0].size > 0);
    assert!(listed[0].modified > 0);
}

#[test]
fn test_delete_export() {
    let (_temp_dir, db, store) = create_test_env();

    let file = store
        .create(&db, ExportKind::Settings, ExportFormat::Json, &ExportFilter::default())
        .unwrap();
    store.delete(&file.name).unwrap();

    assert!(store.list().unwrap().is_empty());
    assert!(matches!(
        store.delete(&file.name),
        Err(CoreError::NotFound { .. })
    ));
}

#[test]
fn test_path_traversal_is_rejected() {
    let (_temp_dir, _db, store) = create_test_env();

    assert!(matches!(
        store.path_of("../test.db"),
        Err(CoreError::InvalidInput(_))
    ));
    assert!(matches!(
        store.delete("nested/file.json"),
        Err(CoreError::InvalidInput(_))
    ));
}
