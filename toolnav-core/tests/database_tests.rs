// Tests for database functionality

use tempfile::TempDir;
use toolnav_core::error::CoreError;
use toolnav_core::model::{
    CategoryInput, PageCategoryInput, PageInput, WebsiteFilter, WebsiteInput, WebsiteStatus,
};
use toolnav_core::Database;

fn create_test_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path).unwrap();
    (temp_dir, db)
}

// ============================================================================
// Database Creation Tests
// ============================================================================

#[test]
fn test_database_creation() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let db = Database::new(&db_path);
    assert!(db.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_database_exists_and_drop() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    assert!(!Database::exists(&db_path));
    let db = Database::new(&db_path).unwrap();
    assert!(Database::exists(&db_path));
    drop(db);

    Database::drop(&db_path).unwrap();
    assert!(!Database::exists(&db_path));
}

#[test]
fn test_reopen_keeps_data() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    {
        let db = Database::new(&db_path).unwrap();
        db.create_category(&CategoryInput::new("Design", "design"))
            .unwrap();
    }

    let db = Database::new(&db_path).unwrap();
    assert_eq!(db.list_categories().unwrap().len(), 1);
}

// ============================================================================
// Category Tests
// ============================================================================

#[test]
fn test_create_category_appends_order() {
    let (_temp_dir, db) = create_test_db();

    let first = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let second = db.create_category(&CategoryInput::new("Dev", "dev")).unwrap();

    assert_eq!(first.sort_order, 1);
    assert_eq!(second.sort_order, 2);
    assert!(first.is_root());
}

#[test]
fn test_child_order_is_scoped_to_parent() {
    let (_temp_dir, db) = create_test_db();

    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let dev = db.create_category(&CategoryInput::new("Dev", "dev")).unwrap();
    let ui = db
        .create_category(&CategoryInput::new("UI", "design-ui").child_of(design.id))
        .unwrap();
    let ides = db
        .create_category(&CategoryInput::new("IDEs", "dev-ides").child_of(dev.id))
        .unwrap();

    assert_eq!(ui.sort_order, 1);
    assert_eq!(ides.sort_order, 1);
    assert_eq!(db.children_of(design.id).unwrap(), vec![ui]);
}

#[test]
fn test_duplicate_slug_is_conflict() {
    let (_temp_dir, db) = create_test_db();

    db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let result = db.create_category(&CategoryInput::new("Other", "design"));

    assert!(matches!(result, Err(CoreError::Conflict(_))));
}

#[test]
fn test_duplicate_sibling_name_is_conflict() {
    let (_temp_dir, db) = create_test_db();

    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let dev = db.create_category(&CategoryInput::new("Dev", "dev")).unwrap();
    db.create_category(&CategoryInput::new("Tools", "design-tools").child_of(design.id))
        .unwrap();

    let same_parent =
        db.create_category(&CategoryInput::new("Tools", "design-tools-2").child_of(design.id));
    assert!(matches!(same_parent, Err(CoreError::Conflict(_))));

    let other_parent =
        db.create_category(&CategoryInput::new("Tools", "dev-tools").child_of(dev.id));
    assert!(other_parent.is_ok());
}

#[test]
fn test_only_one_level_of_nesting() {
    let (_temp_dir, db) = create_test_db();

    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let ui = db
        .create_category(&CategoryInput::new("UI", "design-ui").child_of(design.id))
        .unwrap();

    let result = db.create_category(&CategoryInput::new("Kits", "ui-kits").child_of(ui.id));
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));
}

#[test]
fn test_slug_with_whitespace_is_rejected() {
    let (_temp_dir, db) = create_test_db();

    let result = db.create_category(&CategoryInput::new("Design", "de sign"));
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));
}

#[test]
fn test_update_category() {
    let (_temp_dir, db) = create_test_db();

    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let mut input = CategoryInput::new("Design & UX", "design");
    input.sort_order = Some(7);
    let updated = db.update_category(design.id, &input).unwrap();

    assert_eq!(updated.name, "Design & UX");
    assert_eq!(updated.sort_order, 7);
}

#[test]
fn test_delete_category_with_children_is_conflict() {
    let (_temp_dir, db) = create_test_db();

    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    db.create_category(&CategoryInput::new("UI", "design-ui").child_of(design.id))
        .unwrap();

    assert!(matches!(
        db.delete_category(design.id),
        Err(CoreError::Conflict(_))
    ));
}

#[test]
fn test_delete_category_with_websites_is_conflict() {
    let (_temp_dir, db) = create_test_db();

    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    db.create_website(&WebsiteInput::new("Figma", "https://figma.com", design.id))
        .unwrap();

    assert!(matches!(
        db.delete_category(design.id),
        Err(CoreError::Conflict(_))
    ));
}

#[test]
fn test_delete_missing_category_is_not_found() {
    let (_temp_dir, db) = create_test_db();
    assert!(matches!(
        db.delete_category(42),
        Err(CoreError::NotFound { .. })
    ));
}

#[test]
fn test_category_tree_counts_websites() {
    let (_temp_dir, db) = create_test_db();

    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let ui = db
        .create_category(&CategoryInput::new("UI", "design-ui").child_of(design.id))
        .unwrap();
    db.create_website(&WebsiteInput::new("Figma", "https://figma.com", ui.id))
        .unwrap();
    db.create_website(&WebsiteInput::new("Dribbble", "https://dribbble.com", design.id))
        .unwrap();

    let tree = db.category_tree().unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].category.slug, "design");
    assert_eq!(tree[0].website_count, 2);
    assert_eq!(tree[0].children.len(), 1);
}

// ============================================================================
// Website Tests
// ============================================================================

#[test]
fn test_create_and_get_website() {
    let (_temp_dir, db) = create_test_db();

    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let mut input = WebsiteInput::new("Figma", "https://www.figma.com/", design.id);
    input.tags = vec!["ui".to_string(), "collab".to_string()];
    input.is_hot = true;

    let created = db.create_website(&input).unwrap();
    let fetched = db.get_website(created.id).unwrap();

    assert_eq!(fetched.name, "Figma");
    assert_eq!(fetched.tags, vec!["ui", "collab"]);
    assert!(fetched.is_hot);
    assert_eq!(fetched.sort_order, 1);
}

#[test]
fn test_duplicate_url_is_conflict() {
    let (_temp_dir, db) = create_test_db();

    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    db.create_website(&WebsiteInput::new("Figma", "https://www.figma.com/", design.id))
        .unwrap();

    let result = db.create_website(&WebsiteInput::new("Figma again", "http://figma.com", design.id));
    assert!(matches!(result, Err(CoreError::Conflict(_))));
}

#[test]
fn test_website_requires_existing_category() {
    let (_temp_dir, db) = create_test_db();

    let result = db.create_website(&WebsiteInput::new("Figma", "https://figma.com", 99));
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));
}

#[test]
fn test_find_website_by_any_url_spelling() {
    let (_temp_dir, db) = create_test_db();

    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let created = db
        .create_website(&WebsiteInput::new("Figma", "https://www.figma.com/", design.id))
        .unwrap();

    let found = db.find_website_by_url("FIGMA.com/?ref=home").unwrap();
    assert_eq!(found.map(|w| w.id), Some(created.id));
    assert!(db.find_website_by_url("sketch.com").unwrap().is_none());
}

#[test]
fn test_list_websites_filters() {
    let (_temp_dir, db) = create_test_db();

    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let ui = db
        .create_category(&CategoryInput::new("UI", "design-ui").child_of(design.id))
        .unwrap();
    let dev = db.create_category(&CategoryInput::new("Dev", "dev")).unwrap();

    let mut figma = WebsiteInput::new("Figma", "https://figma.com", ui.id);
    figma.is_featured = true;
    db.create_website(&figma).unwrap();
    db.create_website(&WebsiteInput::new("Dribbble", "https://dribbble.com", design.id))
        .unwrap();
    db.create_website(&WebsiteInput::new("GitHub", "https://github.com", dev.id))
        .unwrap();

    let in_design = db
        .list_websites(&WebsiteFilter {
            category_id: Some(design.id),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(in_design.len(), 2);

    let featured = db
        .list_websites(&WebsiteFilter {
            status: Some(WebsiteStatus::Featured),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].name, "Figma");

    let keyword = db
        .list_websites(&WebsiteFilter {
            keyword: Some("git".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(keyword.len(), 1);
}

#[test]
fn test_list_websites_rejects_bad_dates() {
    let (_temp_dir, db) = create_test_db();

    let result = db.list_websites(&WebsiteFilter {
        from: Some("yesterday".to_string()),
        ..Default::default()
    });
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));
}

#[test]
fn test_move_website_appends_to_target() {
    let (_temp_dir, db) = create_test_db();

    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let dev = db.create_category(&CategoryInput::new("Dev", "dev")).unwrap();
    db.create_website(&WebsiteInput::new("GitHub", "https://github.com", dev.id))
        .unwrap();
    let figma = db
        .create_website(&WebsiteInput::new("Figma", "https://figma.com", design.id))
        .unwrap();

    db.move_website(figma.id, dev.id).unwrap();

    let moved = db.get_website(figma.id).unwrap();
    assert_eq!(moved.category_id, dev.id);
    assert_eq!(moved.sort_order, 2);
}

#[test]
fn test_delete_website() {
    let (_temp_dir, db) = create_test_db();

    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let figma = db
        .create_website(&WebsiteInput::new("Figma", "https://figma.com", design.id))
        .unwrap();

    db.delete_website(figma.id).unwrap();
    assert!(matches!(
        db.get_website(figma.id),
        Err(CoreError::NotFound { .. })
    ));
}

// ============================================================================
// Page Tests
// ============================================================================

#[test]
fn test_create_page_and_link_categories() {
    let (_temp_dir, db) = create_test_db();

    let page = db.create_page(&PageInput::new("design", "Design Tools")).unwrap();
    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let icons = db.create_category(&CategoryInput::new("Icons", "icons")).unwrap();

    db.link_category(
        page.id,
        &PageCategoryInput {
            category_id: icons.id,
            sort_order: Some(2),
            visible: true,
        },
    )
    .unwrap();
    db.link_category(
        page.id,
        &PageCategoryInput {
            category_id: design.id,
            sort_order: Some(1),
            visible: false,
        },
    )
    .unwrap();

    let linked = db.page_categories(page.id).unwrap();
    assert_eq!(linked.len(), 2);
    assert_eq!(linked[0].category.slug, "design");
    assert!(!linked[0].visible);
    assert_eq!(linked[1].category.slug, "icons");
}

#[test]
fn test_linking_subcategory_is_rejected() {
    let (_temp_dir, db) = create_test_db();

    let page = db.create_page(&PageInput::new("design", "Design Tools")).unwrap();
    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let ui = db
        .create_category(&CategoryInput::new("UI", "design-ui").child_of(design.id))
        .unwrap();

    let result = db.link_category(
        page.id,
        &PageCategoryInput {
            category_id: ui.id,
            sort_order: None,
            visible: true,
        },
    );
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));
}

#[test]
fn test_linked_category_cannot_be_nested() {
    let (_temp_dir, db) = create_test_db();

    let page = db.create_page(&PageInput::new("tools", "Tools")).unwrap();
    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    let dev = db.create_category(&CategoryInput::new("Dev", "dev")).unwrap();
    db.link_category(
        page.id,
        &PageCategoryInput {
            category_id: dev.id,
            sort_order: None,
            visible: true,
        },
    )
    .unwrap();

    let result = db.update_category(dev.id, &CategoryInput::new("Dev", "dev").child_of(design.id));
    assert!(matches!(result, Err(CoreError::Conflict(_))));
    assert_eq!(db.get_category(dev.id).unwrap().parent_id, None);

    // Once unlinked it may move under another root
    db.unlink_category(page.id, dev.id).unwrap();
    let moved = db
        .update_category(dev.id, &CategoryInput::new("Dev", "dev").child_of(design.id))
        .unwrap();
    assert_eq!(moved.parent_id, Some(design.id));
}

#[test]
fn test_unlink_category() {
    let (_temp_dir, db) = create_test_db();

    let page = db.create_page(&PageInput::new("design", "Design Tools")).unwrap();
    let design = db.create_category(&CategoryInput::new("Design", "design")).unwrap();
    db.link_category(
        page.id,
        &PageCategoryInput {
            category_id: design.id,
            sort_order: None,
            visible: true,
        },
    )
    .unwrap();

    db.unlink_category(page.id, design.id).unwrap();
    assert!(db.page_categories(page.id).unwrap().is_empty());
    assert!(matches!(
        db.unlink_category(page.id, design.id),
        Err(CoreError::NotFound { .. })
    ));
}

#[test]
fn test_page_slug_lookup() {
    let (_temp_dir, db) = create_test_db();

    let page = db.create_page(&PageInput::new("dev", "Developer Tools")).unwrap();
    assert_eq!(db.get_page_by_slug("dev").unwrap().id, page.id);
    assert!(matches!(
        db.get_page_by_slug("nope"),
        Err(CoreError::NotFound { .. })
    ));
    assert!(matches!(
        db.create_page(&PageInput::new("dev", "Again")),
        Err(CoreError::Conflict(_))
    ));
}
