//! Integration tests for project listing, category membership, and the
//! loosely-typed `category_ids` encodings.
//!
//! The membership queries must treat `[3]` and `["3"]` identically: legacy
//! rows store ids as JSON strings, newer rows as JSON numbers.

use serde_json::json;
use sqlx::PgPool;

use atelier_db::models::category::CreateCategory;
use atelier_db::models::project::{CreateProject, GalleryImage, UpdateProject, STATUS_ACTIVE};
use atelier_db::repositories::{CategoryRepo, ProjectRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_category(name: &str, slug: &str) -> CreateCategory {
    CreateCategory {
        name: name.to_string(),
        slug: slug.to_string(),
        description: None,
        color: "#a3845b".to_string(),
        sort_order: 0,
        is_active: true,
        image_path: None,
    }
}

fn new_project(title: &str, category_ids: Vec<i64>) -> CreateProject {
    CreateProject {
        title: title.to_string(),
        category_ids,
        location: None,
        year: None,
        start_year: None,
        end_year: None,
        description: String::new(),
        achievement_status: None,
        surface_area: None,
        client_name: None,
        delegated_client_name: None,
        project_cost: None,
        duration_months: None,
        status: STATUS_ACTIVE.to_string(),
        sort_order: 0,
        image_path: "storage/projects/main.jpg".to_string(),
        gallery_images: Vec::new(),
        pdf_path: None,
        partners: Vec::new(),
        institutional_partners: Vec::new(),
        sponsors: Vec::new(),
    }
}

/// Force a row's `category_ids` to an arbitrary JSON value, bypassing the
/// canonical number encoding the repository writes.
async fn force_category_ids(pool: &PgPool, project_id: i64, value: serde_json::Value) {
    sqlx::query("UPDATE projects SET category_ids = $2 WHERE id = $1")
        .bind(project_id)
        .bind(value)
        .execute(pool)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn filter_matches_both_json_encodings(pool: PgPool) {
    let cat = CategoryRepo::create(&pool, &new_category("Urban", "urban"))
        .await
        .unwrap();

    let numeric = ProjectRepo::create(&pool, &new_project("Numeric", vec![cat.id]))
        .await
        .unwrap();
    let stringly = ProjectRepo::create(&pool, &new_project("Stringly", vec![]))
        .await
        .unwrap();
    force_category_ids(&pool, stringly.id, json!([cat.id.to_string()])).await;
    ProjectRepo::create(&pool, &new_project("Unrelated", vec![]))
        .await
        .unwrap();

    let page = ProjectRepo::list_active_page(&pool, Some(cat.id), 9, 0)
        .await
        .unwrap();
    let mut titles: Vec<_> = page.iter().map(|p| p.title.as_str()).collect();
    titles.sort();
    assert_eq!(titles, ["Numeric", "Stringly"]);

    assert_eq!(
        ProjectRepo::count_active(&pool, Some(cat.id)).await.unwrap(),
        2
    );
    assert_eq!(ProjectRepo::count_active(&pool, None).await.unwrap(), 3);

    // Both rows round-trip through the loose parser.
    assert_eq!(numeric.category_id_list(), vec![cat.id]);
    let reloaded = ProjectRepo::find_by_id(&pool, stringly.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.category_id_list(), vec![cat.id]);
}

#[sqlx::test]
async fn reference_count_guards_both_encodings(pool: PgPool) {
    let cat = CategoryRepo::create(&pool, &new_category("Urban", "urban"))
        .await
        .unwrap();
    assert_eq!(
        ProjectRepo::count_referencing_category(&pool, cat.id)
            .await
            .unwrap(),
        0
    );

    ProjectRepo::create(&pool, &new_project("Numeric", vec![cat.id]))
        .await
        .unwrap();
    let stringly = ProjectRepo::create(&pool, &new_project("Stringly", vec![]))
        .await
        .unwrap();
    force_category_ids(&pool, stringly.id, json!([cat.id.to_string()])).await;

    // An inactive project still counts as a reference.
    let inactive = ProjectRepo::create(&pool, &new_project("Inactive", vec![cat.id]))
        .await
        .unwrap();
    ProjectRepo::update(
        &pool,
        inactive.id,
        &UpdateProject {
            status: Some("inactive".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(
        ProjectRepo::count_referencing_category(&pool, cat.id)
            .await
            .unwrap(),
        3
    );
}

#[sqlx::test]
async fn public_listing_hides_inactive_and_orders_by_sort_order(pool: PgPool) {
    let mut late = new_project("Late", vec![]);
    late.sort_order = 5;
    ProjectRepo::create(&pool, &late).await.unwrap();

    let mut first = new_project("First", vec![]);
    first.sort_order = 1;
    ProjectRepo::create(&pool, &first).await.unwrap();

    let mut hidden = new_project("Hidden", vec![]);
    hidden.status = "inactive".to_string();
    ProjectRepo::create(&pool, &hidden).await.unwrap();

    let page = ProjectRepo::list_active_page(&pool, None, 9, 0).await.unwrap();
    let titles: Vec<_> = page.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["First", "Late"]);
}

#[sqlx::test]
async fn related_projects_share_a_category_and_exclude_self(pool: PgPool) {
    let urban = CategoryRepo::create(&pool, &new_category("Urban", "urban"))
        .await
        .unwrap();
    let interior = CategoryRepo::create(&pool, &new_category("Interior", "interior"))
        .await
        .unwrap();

    let subject = ProjectRepo::create(&pool, &new_project("Subject", vec![urban.id]))
        .await
        .unwrap();
    ProjectRepo::create(&pool, &new_project("Shared", vec![urban.id, interior.id]))
        .await
        .unwrap();
    let stringly = ProjectRepo::create(&pool, &new_project("Stringly", vec![]))
        .await
        .unwrap();
    force_category_ids(&pool, stringly.id, json!([urban.id.to_string()])).await;
    ProjectRepo::create(&pool, &new_project("Other", vec![interior.id]))
        .await
        .unwrap();

    let related = ProjectRepo::list_related(&pool, subject.id, &[urban.id], 3)
        .await
        .unwrap();
    let mut titles: Vec<_> = related.iter().map(|p| p.title.as_str()).collect();
    titles.sort();
    assert_eq!(titles, ["Shared", "Stringly"]);

    // No categories on the subject: nothing is related.
    let none = ProjectRepo::list_related(&pool, subject.id, &[], 3).await.unwrap();
    assert!(none.is_empty());
}

#[sqlx::test]
async fn partial_update_keeps_unset_fields(pool: PgPool) {
    let mut input = new_project("Original", vec![]);
    input.location = Some("Lyon".to_string());
    let created = ProjectRepo::create(&pool, &input).await.unwrap();

    let updated = ProjectRepo::update(
        &pool,
        created.id,
        &UpdateProject {
            title: Some("Renamed".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.location.as_deref(), Some("Lyon"));
    assert_eq!(updated.image_path.as_deref(), Some("storage/projects/main.jpg"));
}

#[sqlx::test]
async fn set_gallery_replaces_the_array(pool: PgPool) {
    let created = ProjectRepo::create(&pool, &new_project("Galleried", vec![]))
        .await
        .unwrap();
    assert!(created.gallery_images.0.is_empty());

    let gallery = vec![
        GalleryImage {
            full: "storage/projects/a.jpg".to_string(),
            thumb: "storage/projects/a_thumb.jpg".to_string(),
        },
        GalleryImage {
            full: "storage/projects/b.jpg".to_string(),
            thumb: "storage/projects/b_thumb.jpg".to_string(),
        },
    ];
    let updated = ProjectRepo::set_gallery(&pool, created.id, &gallery)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.gallery_images.0, gallery);

    let trimmed = ProjectRepo::set_gallery(&pool, created.id, &gallery[1..])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(trimmed.gallery_images.0.len(), 1);
    assert_eq!(trimmed.gallery_images.0[0].full, "storage/projects/b.jpg");
}

#[sqlx::test]
async fn home_category_counts_only_count_active_projects(pool: PgPool) {
    let cat = CategoryRepo::create(&pool, &new_category("Urban", "urban"))
        .await
        .unwrap();

    ProjectRepo::create(&pool, &new_project("Active", vec![cat.id]))
        .await
        .unwrap();
    let stringly = ProjectRepo::create(&pool, &new_project("Stringly", vec![]))
        .await
        .unwrap();
    force_category_ids(&pool, stringly.id, json!([cat.id.to_string()])).await;

    let mut hidden = new_project("Hidden", vec![cat.id]);
    hidden.status = "inactive".to_string();
    ProjectRepo::create(&pool, &hidden).await.unwrap();

    let counted = CategoryRepo::list_active_with_counts(&pool).await.unwrap();
    assert_eq!(counted.len(), 1);
    assert_eq!(counted[0].projects_count, 2);
}
