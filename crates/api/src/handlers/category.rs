//! Handlers for the `/admin/categories` resource.
//!
//! Categories are managed from a modal-driven admin screen: all writes
//! arrive as multipart forms (the image rides along with the scalar
//! fields), and all responses are JSON.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use atelier_core::error::CoreError;
use atelier_core::imaging::{self, CATEGORY_IMAGE, CATEGORY_IMAGE_EXTENSIONS, MAX_IMAGE_BYTES};
use atelier_core::pagination::{clamp_page, offset, CATEGORIES_PER_PAGE};
use atelier_core::slug::{slug_candidate, slugify};
use atelier_core::storage::{self, CATEGORIES_DIR};
use atelier_core::types::DbId;
use atelier_core::validation::{self, FieldErrors};
use atelier_db::models::category::{Category, CreateCategory, UpdateCategory};
use atelier_db::repositories::{CategoryRepo, ProjectRepo};

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, Page};
use crate::state::AppState;
use crate::uploads::{validate_image_upload, FormData};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
}

/// GET /api/v1/admin/categories
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Page<Category>>> {
    let page = clamp_page(params.page);
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let total = CategoryRepo::count_search(&state.pool, search).await?;
    let items = CategoryRepo::search_page(
        &state.pool,
        search,
        CATEGORIES_PER_PAGE,
        offset(page, CATEGORIES_PER_PAGE),
    )
    .await?;

    Ok(Json(Page::new(items, page, CATEGORIES_PER_PAGE, total)))
}

/// GET /api/v1/admin/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Category>> {
    let category = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;
    Ok(Json(category))
}

/// POST /api/v1/admin/categories
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Category>)> {
    let form = FormData::read(multipart).await?;
    let mut errors = FieldErrors::new();

    let fields = parse_form(&state.pool, &form, None, &mut errors).await?;
    let image_ext = form
        .file("image")
        .and_then(|f| {
            validate_image_upload(&mut errors, "image", f, CATEGORY_IMAGE_EXTENSIONS, MAX_IMAGE_BYTES)
        });

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let image_path = match (form.file("image"), image_ext) {
        (Some(file), Some(ext)) => Some(store_image(&state, file, &ext).await?),
        _ => None,
    };

    let slug = unique_slug(&state.pool, &fields.name, None).await?;
    let created = CategoryRepo::create(
        &state.pool,
        &CreateCategory {
            name: fields.name,
            slug,
            description: fields.description,
            color: fields.color,
            sort_order: fields.sort_order,
            is_active: fields.is_active,
            image_path,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/admin/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<Category>> {
    let existing = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;

    let form = FormData::read(multipart).await?;
    let mut errors = FieldErrors::new();

    let fields = parse_form(&state.pool, &form, Some(id), &mut errors).await?;
    let image_ext = form
        .file("image")
        .and_then(|f| {
            validate_image_upload(&mut errors, "image", f, CATEGORY_IMAGE_EXTENSIONS, MAX_IMAGE_BYTES)
        });

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // A replacement upload removes the old file before the new path lands.
    let image_path = match (form.file("image"), image_ext) {
        (Some(file), Some(ext)) => {
            if let Some(old) = &existing.image_path {
                state.storage.delete(old).await;
            }
            Some(store_image(&state, file, &ext).await?)
        }
        _ => None,
    };

    // The slug only moves when the name does.
    let slug = if fields.name == existing.name {
        existing.slug.clone()
    } else {
        unique_slug(&state.pool, &fields.name, Some(id)).await?
    };

    let updated = CategoryRepo::update(
        &state.pool,
        id,
        &UpdateCategory {
            name: fields.name,
            slug,
            description: fields.description,
            color: fields.color,
            sort_order: fields.sort_order,
            is_active: fields.is_active,
            image_path,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Category",
        id,
    }))?;

    Ok(Json(updated))
}

/// DELETE /api/v1/admin/categories/{id}
///
/// Refused while any project still references the category, under either
/// JSON encoding of the id.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let category = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;

    let projects_count = ProjectRepo::count_referencing_category(&state.pool, id).await?;
    if projects_count > 0 {
        return Err(AppError::Unprocessable(format!(
            "Cannot delete category '{}' because it has {} project(s). \
             Please reassign or delete the projects first.",
            category.name, projects_count
        )));
    }

    if let Some(path) = &category.image_path {
        state.storage.delete(path).await;
    }

    CategoryRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/categories/{id}/image
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Category>>> {
    let category = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;

    if let Some(path) = &category.image_path {
        state.storage.delete(path).await;
    }

    let updated = CategoryRepo::clear_image(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Form handling
// ---------------------------------------------------------------------------

/// Scalar category fields after validation. Placeholder values for failed
/// required fields never reach the database: callers bail on any errors.
struct CategoryForm {
    name: String,
    description: Option<String>,
    color: String,
    sort_order: i32,
    is_active: bool,
}

async fn parse_form(
    pool: &sqlx::PgPool,
    form: &FormData,
    exclude: Option<DbId>,
    errors: &mut FieldErrors,
) -> Result<CategoryForm, AppError> {
    let name = validation::required(errors, "name", form.opt_value("name"))
        .unwrap_or_default()
        .to_string();
    if !name.is_empty() {
        validation::max_len(errors, "name", &name, 255);
        if CategoryRepo::name_exists(pool, &name, exclude).await? {
            errors.push("name", "The name has already been taken.");
        }
    }

    let description = form.opt_value("description").map(str::to_string);
    if let Some(description) = &description {
        validation::max_len(errors, "description", description, 1000);
    }

    let color = validation::required(errors, "color", form.opt_value("color"))
        .unwrap_or_default()
        .to_string();
    if !color.is_empty() {
        validation::hex_color(errors, "color", &color);
    }

    let sort_order = form.i32_value("sort_order", errors).unwrap_or(0);
    validation::non_negative(errors, "sort_order", sort_order);

    let is_active = form.bool_value("is_active").unwrap_or(true);

    Ok(CategoryForm {
        name,
        description,
        color,
        sort_order,
        is_active,
    })
}

async fn store_image(
    state: &AppState,
    file: &crate::uploads::UploadedFile,
    ext: &str,
) -> AppResult<String> {
    let processed = imaging::process_image(&file.bytes, ext, &CATEGORY_IMAGE)?;
    let filename = storage::unique_filename(&file.filename)?;
    Ok(state
        .storage
        .save(CATEGORIES_DIR, &filename, &processed)
        .await?)
}

/// First free slug for `name`: the slugified base, then `-2`, `-3`, ...
async fn unique_slug(
    pool: &sqlx::PgPool,
    name: &str,
    exclude: Option<DbId>,
) -> Result<String, AppError> {
    let base = slugify(name);
    let base = if base.is_empty() {
        "category".to_string()
    } else {
        base
    };

    let mut round = 1;
    loop {
        let candidate = slug_candidate(&base, round);
        if !CategoryRepo::slug_exists(pool, &candidate, exclude).await? {
            return Ok(candidate);
        }
        round += 1;
    }
}
