// Tests for favicon resolution and probing

use tempfile::TempDir;
use toolnav_core::Database;
use toolnav_core::favicon::{IconProber, fill_missing_icons};
use toolnav_core::model::{CategoryInput, WebsiteInput};
use toolnav_core::settings::{FaviconApi, FaviconApiInput};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(template: String) -> FaviconApi {
    FaviconApi {
        id: 1,
        name: "mock".to_string(),
        url_template: template,
        sort_order: 1,
        enabled: true,
        created_at: 0,
        updated_at: 0,
    }
}

// ============================================================================
// Probe Tests
// ============================================================================

#[tokio::test]
async fn test_probe_accepts_image_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/icons/figma.com"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47]),
        )
        .mount(&mock_server)
        .await;

    let api = api_for(format!("{}/icons/{{domain}}", mock_server.uri()));
    let result = IconProber::new().unwrap().probe(&api, "figma.com").await.unwrap();

    assert!(result.ok);
    assert_eq!(result.status, 200);
    assert_eq!(result.content_type.as_deref(), Some("image/png"));
    assert!(result.url.ends_with("/icons/figma.com"));
}

#[tokio::test]
async fn test_probe_rejects_html_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/icons/figma.com"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(b"<html>not an icon</html>"),
        )
        .mount(&mock_server)
        .await;

    let api = api_for(format!("{}/icons/{{domain}}", mock_server.uri()));
    let result = IconProber::new().unwrap().probe(&api, "figma.com").await.unwrap();

    assert!(!result.ok);
    assert_eq!(result.status, 200);
}

#[tokio::test]
async fn test_probe_reports_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).insert_header("content-type", "image/png"))
        .mount(&mock_server)
        .await;

    let api = api_for(format!("{}/icons/{{domain}}", mock_server.uri()));
    let result = IconProber::new().unwrap().probe(&api, "missing.example").await.unwrap();

    assert!(!result.ok);
    assert_eq!(result.status, 404);
}

// ============================================================================
// Fill Tests
// ============================================================================

#[test]
fn test_fill_missing_icons() {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::new(&temp_dir.path().join("test.db")).unwrap();

    let design = db
        .create_category(&CategoryInput::new("Design", "design"))
        .unwrap();
    let figma = db
        .create_website(&WebsiteInput::new("Figma", "https://www.figma.com/", design.id))
        .unwrap();
    let mut sketch = WebsiteInput::new("Sketch", "https://sketch.com", design.id);
    sketch.icon_url = Some("/icons/sketch.png".to_string());
    let sketch = db.create_website(&sketch).unwrap();

    assert_eq!(fill_missing_icons(&db, false).unwrap(), 0);

    db.create_record::<FaviconApi>(&FaviconApiInput {
        name: "Icons".to_string(),
        url_template: "https://icons.example/{domain}.ico".to_string(),
        sort_order: None,
        enabled: true,
    })
    .unwrap();

    assert_eq!(fill_missing_icons(&db, false).unwrap(), 1);
    assert_eq!(
        db.get_website(figma.id).unwrap().icon_url.as_deref(),
        Some("https://icons.example/figma.com.ico")
    );
    assert_eq!(
        db.get_website(sketch.id).unwrap().icon_url.as_deref(),
        Some("/icons/sketch.png")
    );

    assert_eq!(fill_missing_icons(&db, true).unwrap(), 2);
    assert_eq!(
        db.get_website(sketch.id).unwrap().icon_url.as_deref(),
        Some("https://icons.example/sketch.com.ico")
    );
}
