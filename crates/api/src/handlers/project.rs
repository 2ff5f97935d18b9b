//! Handlers for the `/admin/projects` resource.
//!
//! Projects carry the heaviest form in the admin: scalar fields, three
//! JSON-array fields, a required main image, an optional gallery (each
//! entry stored as a full/thumb pair), and an optional brochure PDF.

use std::collections::HashMap;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use atelier_core::error::CoreError;
use atelier_core::imaging::{
    self, GALLERY_FULL, GALLERY_THUMB, MAX_IMAGE_BYTES, MAX_PDF_BYTES, PROJECT_IMAGE_EXTENSIONS,
    PROJECT_MAIN_IMAGE,
};
use atelier_core::pagination::{clamp_page, offset, ADMIN_PROJECTS_PER_PAGE};
use atelier_core::storage::{self, PROJECTS_DIR};
use atelier_core::types::DbId;
use atelier_core::validation::{self, FieldErrors};
use atelier_db::models::category::CategoryRef;
use atelier_db::models::project::{
    CreateProject, GalleryImage, InstitutionalPartner, Project, ProjectWithCategories,
    UpdateProject, STATUS_ACTIVE,
};
use atelier_db::repositories::{CategoryRepo, ProjectRepo};

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, Page};
use crate::state::AppState;
use crate::uploads::{validate_image_upload, FormData, UploadedFile};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
}

/// GET /api/v1/admin/projects
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Page<ProjectWithCategories>>> {
    let page = clamp_page(params.page);

    let total = ProjectRepo::count_all(&state.pool).await?;
    let projects = ProjectRepo::list_page(
        &state.pool,
        ADMIN_PROJECTS_PER_PAGE,
        offset(page, ADMIN_PROJECTS_PER_PAGE),
    )
    .await?;
    let items = attach_categories(&state.pool, projects).await?;

    Ok(Json(Page::new(items, page, ADMIN_PROJECTS_PER_PAGE, total)))
}

/// GET /api/v1/admin/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProjectWithCategories>> {
    let project = find_project(&state, id).await?;
    let with_categories = attach_categories(&state.pool, vec![project]).await?;
    let item = with_categories
        .into_iter()
        .next()
        .ok_or_else(|| AppError::InternalError("category resolution dropped a project".into()))?;
    Ok(Json(item))
}

/// POST /api/v1/admin/projects
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ProjectWithCategories>)> {
    let form = FormData::read(multipart).await?;
    let mut errors = FieldErrors::new();

    let fields = parse_form(&state.pool, &form, true, &mut errors).await?;

    let main_ext = match form.file("image") {
        Some(file) => validate_image_upload(
            &mut errors,
            "image",
            file,
            PROJECT_IMAGE_EXTENSIONS,
            MAX_IMAGE_BYTES,
        ),
        None => {
            errors.push("image", "The image field is required.");
            None
        }
    };
    let gallery_exts = validate_gallery_files(&mut errors, form.file_list("gallery_images"));
    let pdf_ok = validate_pdf(&mut errors, form.file("pdf"));

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let pdf_path = match (form.file("pdf"), pdf_ok) {
        (Some(file), true) => Some(store_pdf(&state, file).await?),
        _ => None,
    };

    let image_path = match (form.file("image"), main_ext) {
        (Some(file), Some(ext)) => store_main_image(&state, file, &ext).await?,
        // Unreachable: a missing/invalid image was already a field error.
        _ => return Err(AppError::InternalError("main image missing after validation".into())),
    };

    let mut gallery = Vec::new();
    for (file, ext) in form.file_list("gallery_images").iter().zip(&gallery_exts) {
        gallery.push(store_gallery_pair(&state, file, ext).await?);
    }

    let created = ProjectRepo::create(
        &state.pool,
        &CreateProject {
            title: fields.title.unwrap_or_default(),
            category_ids: fields.category_ids.unwrap_or_default(),
            location: fields.location.flatten(),
            year: fields.year.flatten(),
            start_year: fields.start_year.flatten(),
            end_year: fields.end_year.flatten(),
            description: fields.description.unwrap_or_default(),
            achievement_status: fields.achievement_status.flatten(),
            surface_area: fields.surface_area.flatten(),
            client_name: fields.client_name.flatten(),
            delegated_client_name: fields.delegated_client_name.flatten(),
            project_cost: fields.project_cost.flatten(),
            duration_months: fields.duration_months,
            status: fields.status.unwrap_or_else(|| STATUS_ACTIVE.to_string()),
            sort_order: fields.sort_order.unwrap_or(0),
            image_path,
            gallery_images: gallery,
            pdf_path,
            partners: fields.partners.unwrap_or_default(),
            institutional_partners: fields.institutional_partners.unwrap_or_default(),
            sponsors: fields.sponsors.unwrap_or_default(),
        },
    )
    .await?;

    let with_categories = attach_categories(&state.pool, vec![created]).await?;
    let item = with_categories
        .into_iter()
        .next()
        .ok_or_else(|| AppError::InternalError("category resolution dropped a project".into()))?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/v1/admin/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<ProjectWithCategories>> {
    let existing = find_project(&state, id).await?;

    let form = FormData::read(multipart).await?;
    let mut errors = FieldErrors::new();

    let fields = parse_form(&state.pool, &form, false, &mut errors).await?;

    let main_ext = form.file("image").and_then(|file| {
        validate_image_upload(
            &mut errors,
            "image",
            file,
            PROJECT_IMAGE_EXTENSIONS,
            MAX_IMAGE_BYTES,
        )
    });
    let gallery_exts = validate_gallery_files(&mut errors, form.file_list("gallery_images"));
    let pdf_ok = validate_pdf(&mut errors, form.file("pdf"));

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // Replacement files delete their predecessors first.
    let pdf_path = match (form.file("pdf"), pdf_ok) {
        (Some(file), true) => {
            if let Some(old) = &existing.pdf_path {
                state.storage.delete(old).await;
            }
            Some(store_pdf(&state, file).await?)
        }
        _ => None,
    };

    let image_path = match (form.file("image"), main_ext) {
        (Some(file), Some(ext)) => {
            if let Some(old) = &existing.image_path {
                state.storage.delete(old).await;
            }
            Some(store_main_image(&state, file, &ext).await?)
        }
        _ => None,
    };

    // A new gallery replaces the whole set, files included.
    let gallery_files = form.file_list("gallery_images");
    let gallery_images = if gallery_files.is_empty() {
        None
    } else {
        for entry in existing.gallery_images.0.iter() {
            state.storage.delete(&entry.full).await;
            state.storage.delete(&entry.thumb).await;
        }
        let mut gallery = Vec::new();
        for (file, ext) in gallery_files.iter().zip(&gallery_exts) {
            gallery.push(store_gallery_pair(&state, file, ext).await?);
        }
        Some(gallery)
    };

    let updated = ProjectRepo::update(
        &state.pool,
        id,
        &UpdateProject {
            title: fields.title,
            category_ids: fields.category_ids,
            location: fields.location.map(Option::unwrap_or_default),
            year: fields.year.map(Option::unwrap_or_default),
            start_year: fields.start_year.map(Option::unwrap_or_default),
            end_year: fields.end_year.map(Option::unwrap_or_default),
            description: fields.description,
            achievement_status: fields.achievement_status.map(Option::unwrap_or_default),
            surface_area: fields.surface_area.map(Option::unwrap_or_default),
            client_name: fields.client_name.map(Option::unwrap_or_default),
            delegated_client_name: fields.delegated_client_name.map(Option::unwrap_or_default),
            project_cost: fields.project_cost.map(Option::unwrap_or_default),
            duration_months: fields.duration_months,
            status: fields.status,
            sort_order: fields.sort_order,
            image_path,
            gallery_images,
            pdf_path,
            partners: fields.partners,
            institutional_partners: fields.institutional_partners,
            sponsors: fields.sponsors,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    }))?;

    let with_categories = attach_categories(&state.pool, vec![updated]).await?;
    let item = with_categories
        .into_iter()
        .next()
        .ok_or_else(|| AppError::InternalError("category resolution dropped a project".into()))?;

    Ok(Json(item))
}

/// DELETE /api/v1/admin/projects/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let project = find_project(&state, id).await?;

    if let Some(path) = &project.image_path {
        state.storage.delete(path).await;
    }
    for entry in project.gallery_images.0.iter() {
        state.storage.delete(&entry.full).await;
        state.storage.delete(&entry.thumb).await;
    }
    if let Some(path) = &project.pdf_path {
        state.storage.delete(path).await;
    }

    ProjectRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Payload for gallery mutations: the affected entry plus the whole array,
/// so the admin screen can re-render without a refetch.
#[derive(Debug, Serialize)]
pub struct GalleryUpdate {
    pub image: Option<GalleryImage>,
    pub gallery_images: Vec<GalleryImage>,
}

/// POST /api/v1/admin/projects/{id}/gallery
pub async fn add_gallery_image(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<GalleryUpdate>>)> {
    let project = find_project(&state, id).await?;

    let form = FormData::read(multipart).await?;
    let mut errors = FieldErrors::new();

    let ext = match form.file("gallery_image") {
        Some(file) => validate_image_upload(
            &mut errors,
            "gallery_image",
            file,
            PROJECT_IMAGE_EXTENSIONS,
            MAX_IMAGE_BYTES,
        ),
        None => {
            errors.push("gallery_image", "The gallery image field is required.");
            None
        }
    };

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let (file, ext) = match (form.file("gallery_image"), ext) {
        (Some(file), Some(ext)) => (file, ext),
        _ => return Err(AppError::InternalError("gallery image missing after validation".into())),
    };

    let entry = store_gallery_pair(&state, file, &ext).await?;

    let mut gallery = project.gallery_images.0.clone();
    gallery.push(entry.clone());

    let updated = ProjectRepo::set_gallery(&state.pool, id, &gallery)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: GalleryUpdate {
                image: Some(entry),
                gallery_images: updated.gallery_images.0,
            },
        }),
    ))
}

/// DELETE /api/v1/admin/projects/{id}/gallery/{index}
///
/// Removes exactly the entry at `index` and reindexes the remainder
/// contiguously. Both files of the pair are deleted.
pub async fn delete_gallery_image(
    State(state): State<AppState>,
    Path((id, index)): Path<(DbId, usize)>,
) -> AppResult<Json<DataResponse<GalleryUpdate>>> {
    let project = find_project(&state, id).await?;

    let mut gallery = project.gallery_images.0.clone();
    if index >= gallery.len() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "GalleryImage",
            id: index as DbId,
        }));
    }

    let removed = gallery.remove(index);
    state.storage.delete(&removed.full).await;
    state.storage.delete(&removed.thumb).await;

    let updated = ProjectRepo::set_gallery(&state.pool, id, &gallery)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    Ok(Json(DataResponse {
        data: GalleryUpdate {
            image: None,
            gallery_images: updated.gallery_images.0,
        },
    }))
}

// ---------------------------------------------------------------------------
// Shared helpers (also used by the public site handlers)
// ---------------------------------------------------------------------------

pub(crate) async fn find_project(state: &AppState, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

/// Resolve category references for a batch of projects with one lookup.
/// Ids missing from the categories table are silently dropped, matching
/// the tolerance the loose array demands.
pub(crate) async fn attach_categories(
    pool: &sqlx::PgPool,
    projects: Vec<Project>,
) -> AppResult<Vec<ProjectWithCategories>> {
    let mut all_ids: Vec<DbId> = projects
        .iter()
        .flat_map(Project::category_id_list)
        .collect();
    all_ids.sort_unstable();
    all_ids.dedup();

    let refs = CategoryRepo::find_refs_by_ids(pool, &all_ids).await?;
    let by_id: HashMap<DbId, CategoryRef> = refs.into_iter().map(|r| (r.id, r)).collect();

    Ok(projects
        .into_iter()
        .map(|project| {
            let mut seen = Vec::new();
            let categories = project
                .category_id_list()
                .into_iter()
                .filter(|id| {
                    if seen.contains(id) {
                        false
                    } else {
                        seen.push(*id);
                        true
                    }
                })
                .filter_map(|id| by_id.get(&id).cloned())
                .collect();
            ProjectWithCategories {
                project,
                categories,
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Form handling
// ---------------------------------------------------------------------------

/// Parsed scalar/array fields. The outer `Option` tracks whether the field
/// appeared in the submission (updates leave absent fields untouched); the
/// inner `Option` distinguishes a provided-but-blank value.
#[derive(Default)]
struct ProjectForm {
    title: Option<String>,
    category_ids: Option<Vec<DbId>>,
    location: Option<Option<String>>,
    year: Option<Option<String>>,
    start_year: Option<Option<String>>,
    end_year: Option<Option<String>>,
    description: Option<String>,
    achievement_status: Option<Option<String>>,
    surface_area: Option<Option<String>>,
    client_name: Option<Option<String>>,
    delegated_client_name: Option<Option<String>>,
    project_cost: Option<Option<String>>,
    duration_months: Option<i32>,
    status: Option<String>,
    sort_order: Option<i32>,
    partners: Option<Vec<String>>,
    institutional_partners: Option<Vec<InstitutionalPartner>>,
    sponsors: Option<Vec<String>>,
}

async fn parse_form(
    pool: &sqlx::PgPool,
    form: &FormData,
    is_create: bool,
    errors: &mut FieldErrors,
) -> Result<ProjectForm, AppError> {
    let mut fields = ProjectForm::default();

    // Title: required on create, optional on update.
    if is_create {
        fields.title = validation::required(errors, "title", form.opt_value("title"))
            .map(str::to_string);
    } else {
        fields.title = form.opt_value("title").map(str::to_string);
    }
    if let Some(title) = &fields.title {
        validation::max_len(errors, "title", title, 255);
    }

    // Category ids: required non-empty on create; when provided on update,
    // also non-empty. Every id must resolve to a real category.
    if form.has_field("category_ids") || is_create {
        let ids = form.id_array("category_ids", errors);
        if ids.is_empty() {
            errors.push("category_ids", "At least one category is required.");
        } else {
            let mut unique = ids.clone();
            unique.sort_unstable();
            unique.dedup();
            let found = CategoryRepo::find_refs_by_ids(pool, &unique).await?;
            if found.len() != unique.len() {
                errors.push("category_ids", "The selected category is invalid.");
            }
        }
        fields.category_ids = Some(ids);
    }

    fields.location = optional_text(form, errors, "location", 255);
    fields.year = optional_text(form, errors, "year", 4);
    fields.start_year = optional_text(form, errors, "start_year", 4);
    fields.end_year = optional_text(form, errors, "end_year", 4);
    fields.achievement_status = optional_text(form, errors, "achievement_status", 255);
    fields.surface_area = optional_text(form, errors, "surface_area", 255);
    fields.client_name = optional_text(form, errors, "client_name", 255);
    fields.delegated_client_name = optional_text(form, errors, "delegated_client_name", 255);
    fields.project_cost = optional_text(form, errors, "project_cost", 255);

    if form.has_field("description") {
        fields.description = Some(form.value("description").unwrap_or_default().to_string());
    }

    if let Some(months) = form.i32_value("duration_months", errors) {
        validation::non_negative(errors, "duration_months", months);
        fields.duration_months = Some(months);
    }

    if let Some(status) = form.opt_value("status") {
        validation::status(errors, "status", status);
        fields.status = Some(status.to_string());
    }

    if let Some(sort_order) = form.i32_value("sort_order", errors) {
        validation::non_negative(errors, "sort_order", sort_order);
        fields.sort_order = Some(sort_order);
    }

    if form.has_field("partners") {
        let partners = form.string_array("partners");
        for partner in &partners {
            validation::max_len(errors, "partners", partner, 255);
        }
        fields.partners = Some(partners);
    }

    if form.has_field("sponsors") {
        let sponsors = form.string_array("sponsors");
        for sponsor in &sponsors {
            validation::max_len(errors, "sponsors", sponsor, 255);
        }
        fields.sponsors = Some(sponsors);
    }

    if form.has_field("institutional_partners") {
        let partners: Vec<InstitutionalPartner> =
            form.object_array("institutional_partners", errors);
        for partner in &partners {
            if partner.name.trim().is_empty() {
                errors.push(
                    "institutional_partners",
                    "Each institutional partner needs a name.",
                );
            }
            validation::max_len(errors, "institutional_partners", &partner.name, 255);
            if let Some(url) = &partner.url {
                if !url.trim().is_empty() {
                    validation::http_url(errors, "institutional_partners", url, 2048);
                }
            }
        }
        fields.institutional_partners = Some(partners);
    }

    Ok(fields)
}

/// Presence-aware optional text field with a length cap.
fn optional_text(
    form: &FormData,
    errors: &mut FieldErrors,
    name: &str,
    max: usize,
) -> Option<Option<String>> {
    if !form.has_field(name) {
        return None;
    }
    let value = form.opt_value(name).map(str::to_string);
    if let Some(value) = &value {
        validation::max_len(errors, name, value, max);
    }
    Some(value)
}

fn validate_gallery_files(errors: &mut FieldErrors, files: &[UploadedFile]) -> Vec<String> {
    files
        .iter()
        .enumerate()
        .filter_map(|(i, file)| {
            validate_image_upload(
                errors,
                &format!("gallery_images.{i}"),
                file,
                PROJECT_IMAGE_EXTENSIONS,
                MAX_IMAGE_BYTES,
            )
        })
        .collect()
}

fn validate_pdf(errors: &mut FieldErrors, file: Option<&UploadedFile>) -> bool {
    let Some(file) = file else {
        return false;
    };
    let mut ok = true;
    if file.extension().as_deref() != Some("pdf") {
        errors.push("pdf", "The pdf must be a file of type: pdf.");
        ok = false;
    }
    if file.bytes.len() > MAX_PDF_BYTES {
        errors.push(
            "pdf",
            format!(
                "The pdf may not be greater than {} kilobytes.",
                MAX_PDF_BYTES / 1024
            ),
        );
        ok = false;
    }
    ok
}

// ---------------------------------------------------------------------------
// File storage
// ---------------------------------------------------------------------------

async fn store_main_image(state: &AppState, file: &UploadedFile, ext: &str) -> AppResult<String> {
    let processed = imaging::process_image(&file.bytes, ext, &PROJECT_MAIN_IMAGE)?;
    let filename = storage::unique_filename(&file.filename)?;
    Ok(state
        .storage
        .save(PROJECTS_DIR, &filename, &processed)
        .await?)
}

async fn store_gallery_pair(
    state: &AppState,
    file: &UploadedFile,
    ext: &str,
) -> AppResult<GalleryImage> {
    let full_bytes = imaging::process_image(&file.bytes, ext, &GALLERY_FULL)?;
    let thumb_bytes = imaging::process_image(&file.bytes, ext, &GALLERY_THUMB)?;

    let full_name = storage::unique_filename(&file.filename)?;
    let thumb_name = storage::thumb_filename(&full_name);

    let full = state
        .storage
        .save(PROJECTS_DIR, &full_name, &full_bytes)
        .await?;
    let thumb = state
        .storage
        .save(PROJECTS_DIR, &thumb_name, &thumb_bytes)
        .await?;

    Ok(GalleryImage { full, thumb })
}

async fn store_pdf(state: &AppState, file: &UploadedFile) -> AppResult<String> {
    let filename = storage::unique_filename(&file.filename)?;
    Ok(state
        .storage
        .save(PROJECTS_DIR, &filename, &file.bytes)
        .await?)
}
