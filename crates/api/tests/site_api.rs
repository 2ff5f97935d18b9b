//! HTTP-level integration tests for the public site payloads and the
//! project sheet outputs.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    body_bytes, body_json, get, png_bytes, post_json, send_multipart, MultipartBuilder,
};
use sqlx::PgPool;

async fn create_category(pool: &PgPool, root: &std::path::Path, name: &str) -> i64 {
    let app = common::build_test_app(pool.clone(), root);
    let json = body_json(
        send_multipart(
            app,
            Method::POST,
            "/api/v1/admin/categories",
            MultipartBuilder::new().text("name", name).text("color", "#a3845b"),
        )
        .await,
    )
    .await;
    json["id"].as_i64().unwrap()
}

async fn create_project(
    pool: &PgPool,
    root: &std::path::Path,
    title: &str,
    category_id: i64,
    status: &str,
) -> i64 {
    let app = common::build_test_app(pool.clone(), root);
    let json = body_json(
        send_multipart(
            app,
            Method::POST,
            "/api/v1/admin/projects",
            MultipartBuilder::new()
                .text("title", title)
                .text("category_ids", &category_id.to_string())
                .text("status", status)
                .file("image", "main.png", "image/png", &png_bytes(40, 30)),
        )
        .await,
    )
    .await;
    json["id"].as_i64().unwrap()
}

/// Rewrite a project's category ids to string-encoded JSON, as legacy
/// writers stored them.
async fn force_string_encoding(pool: &PgPool, project_id: i64, category_id: i64) {
    sqlx::query("UPDATE projects SET category_ids = $2 WHERE id = $1")
        .bind(project_id)
        .bind(serde_json::json!([category_id.to_string()]))
        .execute(pool)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Public listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_filters_by_slug_under_both_encodings(pool: PgPool) {
    let (_, root) = common::test_app(pool.clone());
    let urban = create_category(&pool, root.path(), "Urban Planning").await;
    let interior = create_category(&pool, root.path(), "Interior").await;

    create_project(&pool, root.path(), "Numeric", urban, "active").await;
    let stringly = create_project(&pool, root.path(), "Stringly", interior, "active").await;
    force_string_encoding(&pool, stringly, urban).await;
    create_project(&pool, root.path(), "Other", interior, "active").await;
    create_project(&pool, root.path(), "Hidden", urban, "inactive").await;

    let app = common::build_test_app(pool.clone(), root.path());
    let json = body_json(get(app, "/api/v1/site/projects?category=urban-planning").await).await;

    let titles: Vec<&str> = json["projects"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"Numeric"));
    assert!(titles.contains(&"Stringly"));
    assert_eq!(json["selected_category"], "urban-planning");
    assert_eq!(json["projects"]["per_page"], 9);

    // Filtering by exact name works too.
    let app = common::build_test_app(pool.clone(), root.path());
    let json = body_json(get(app, "/api/v1/site/projects?category=Urban%20Planning").await).await;
    assert_eq!(json["projects"]["total"], 2);

    // Unknown category value falls back to the unfiltered active listing.
    let app = common::build_test_app(pool, root.path());
    let json = body_json(get(app, "/api/v1/site/projects?category=nope").await).await;
    assert_eq!(json["projects"]["total"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_carries_the_category_filter_bar(pool: PgPool) {
    let (_, root) = common::test_app(pool.clone());
    create_category(&pool, root.path(), "Urban").await;

    let app = common::build_test_app(pool, root.path());
    let json = body_json(get(app, "/api/v1/site/projects").await).await;
    assert_eq!(json["categories"][0]["name"], "Urban");
    assert_eq!(json["selected_category"], serde_json::Value::Null);
}

// ---------------------------------------------------------------------------
// Detail + related
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn detail_includes_capped_related_projects(pool: PgPool) {
    let (_, root) = common::test_app(pool.clone());
    let urban = create_category(&pool, root.path(), "Urban").await;
    let interior = create_category(&pool, root.path(), "Interior").await;

    let subject = create_project(&pool, root.path(), "Subject", urban, "active").await;
    for i in 0..4 {
        create_project(&pool, root.path(), &format!("Related {i}"), urban, "active").await;
    }
    create_project(&pool, root.path(), "Unrelated", interior, "active").await;
    create_project(&pool, root.path(), "Hidden", urban, "inactive").await;

    let app = common::build_test_app(pool, root.path());
    let json = body_json(get(app, &format!("/api/v1/site/projects/{subject}")).await).await;

    assert_eq!(json["project"]["title"], "Subject");
    assert_eq!(json["project"]["categories"][0]["name"], "Urban");

    let related = json["related_projects"].as_array().unwrap();
    assert_eq!(related.len(), 3);
    for item in related {
        let title = item["title"].as_str().unwrap();
        assert!(title.starts_with("Related"), "unexpected related project: {title}");
    }
}

// ---------------------------------------------------------------------------
// Home / about
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn home_payload_counts_active_projects_per_category(pool: PgPool) {
    let (_, root) = common::test_app(pool.clone());
    let urban = create_category(&pool, root.path(), "Urban").await;

    create_project(&pool, root.path(), "One", urban, "active").await;
    create_project(&pool, root.path(), "Two", urban, "active").await;
    create_project(&pool, root.path(), "Hidden", urban, "inactive").await;

    let app = common::build_test_app(pool, root.path());
    let json = body_json(get(app, "/api/v1/site/home").await).await;

    assert_eq!(json["categories"][0]["projects_count"], 2);
    assert_eq!(json["recent_projects"].as_array().unwrap().len(), 2);
    assert!(json["sponsors"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Contact form
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn contact_form_validates_and_stores(pool: PgPool) {
    let (app, root) = common::test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/site/contact",
        serde_json::json!({"name": "Jean", "email": "not-an-email", "message": "Bonjour"}),
    )
    .await;
    common::assert_validation_error(response, "email").await;

    let app = common::build_test_app(pool.clone(), root.path());
    let response = post_json(
        app,
        "/api/v1/site/contact",
        serde_json::json!({"name": "Jean", "email": "jean@example.com", "message": "Bonjour"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["email"], "jean@example.com");

    // The admin listing sees it.
    let app = common::build_test_app(pool, root.path());
    let json = body_json(get(app, "/api/v1/admin/contact-messages").await).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["name"], "Jean");
}

// ---------------------------------------------------------------------------
// Project sheets
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn print_sheet_inlines_images_as_data_uris(pool: PgPool) {
    let (_, root) = common::test_app(pool.clone());
    let urban = create_category(&pool, root.path(), "Urban").await;
    let id = create_project(&pool, root.path(), "Villa Horizon", urban, "active").await;

    let app = common::build_test_app(pool, root.path());
    let response = get(app, &format!("/projects/{id}/print")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Villa Horizon"));
    assert!(html.contains("data:image/png;base64,"));
    assert!(html.contains("Urban"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn pdf_download_returns_a_pdf_attachment(pool: PgPool) {
    let (_, root) = common::test_app(pool.clone());
    let urban = create_category(&pool, root.path(), "Urban").await;
    let id = create_project(&pool, root.path(), "Tour A1 / Phase 2", urban, "active").await;

    let app = common::build_test_app(pool, root.path());
    let response = get(app, &format!("/projects/{id}/pdf")).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        disposition,
        "attachment; filename=\"Projet-Tour-A1-Phase-2.pdf\""
    );

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sheets_404_for_missing_projects(pool: PgPool) {
    let (app, root) = common::test_app(pool.clone());
    let response = get(app, "/projects/999999/print").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool, root.path());
    let response = get(app, "/projects/999999/pdf").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
