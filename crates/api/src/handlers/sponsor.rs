//! Handlers for the `/admin/sponsors` resource.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;

use atelier_core::error::CoreError;
use atelier_core::imaging::{self, MAX_IMAGE_BYTES, SPONSOR_LOGO, SPONSOR_LOGO_EXTENSIONS};
use atelier_core::storage::{self, SPONSORS_DIR};
use atelier_core::types::DbId;
use atelier_core::validation::{self, FieldErrors};
use atelier_db::models::sponsor::{CreateSponsor, Sponsor, UpdateSponsor};
use atelier_db::repositories::SponsorRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::uploads::{validate_image_upload, FormData, UploadedFile};

/// GET /api/v1/admin/sponsors
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Sponsor>>>> {
    let sponsors = SponsorRepo::list_ordered(&state.pool).await?;
    Ok(Json(DataResponse { data: sponsors }))
}

/// GET /api/v1/admin/sponsors/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Sponsor>> {
    let sponsor = SponsorRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sponsor",
            id,
        }))?;
    Ok(Json(sponsor))
}

/// POST /api/v1/admin/sponsors
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Sponsor>)> {
    let form = FormData::read(multipart).await?;
    let mut errors = FieldErrors::new();

    let fields = parse_form(&form, &mut errors);

    let logo_ext = match form.file("logo") {
        Some(file) => validate_image_upload(
            &mut errors,
            "logo",
            file,
            SPONSOR_LOGO_EXTENSIONS,
            MAX_IMAGE_BYTES,
        ),
        None => {
            errors.push("logo", "The logo field is required.");
            None
        }
    };

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let logo_path = match (form.file("logo"), logo_ext) {
        (Some(file), Some(ext)) => store_logo(&state, file, &ext).await?,
        _ => return Err(AppError::InternalError("logo missing after validation".into())),
    };

    let created = SponsorRepo::create(
        &state.pool,
        &CreateSponsor {
            name: fields.name,
            url: fields.url,
            logo_path,
            is_active: fields.is_active,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/admin/sponsors/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<Sponsor>> {
    let existing = SponsorRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sponsor",
            id,
        }))?;

    let form = FormData::read(multipart).await?;
    let mut errors = FieldErrors::new();

    let fields = parse_form(&form, &mut errors);
    let logo_ext = form.file("logo").and_then(|file| {
        validate_image_upload(
            &mut errors,
            "logo",
            file,
            SPONSOR_LOGO_EXTENSIONS,
            MAX_IMAGE_BYTES,
        )
    });

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let logo_path = match (form.file("logo"), logo_ext) {
        (Some(file), Some(ext)) => {
            state.storage.delete(&existing.logo_path).await;
            Some(store_logo(&state, file, &ext).await?)
        }
        _ => None,
    };

    let updated = SponsorRepo::update(
        &state.pool,
        id,
        &UpdateSponsor {
            name: fields.name,
            url: fields.url,
            logo_path,
            is_active: fields.is_active,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Sponsor",
        id,
    }))?;

    Ok(Json(updated))
}

/// DELETE /api/v1/admin/sponsors/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let sponsor = SponsorRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sponsor",
            id,
        }))?;

    state.storage.delete(&sponsor.logo_path).await;

    SponsorRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Form handling
// ---------------------------------------------------------------------------

struct SponsorForm {
    name: String,
    url: Option<String>,
    is_active: bool,
}

fn parse_form(form: &FormData, errors: &mut FieldErrors) -> SponsorForm {
    let name = validation::required(errors, "name", form.opt_value("name"))
        .unwrap_or_default()
        .to_string();
    if !name.is_empty() {
        validation::max_len(errors, "name", &name, 255);
    }

    let url = form.opt_value("url").map(str::to_string);
    if let Some(url) = &url {
        validation::http_url(errors, "url", url, 1000);
    }

    let is_active = form.bool_value("is_active").unwrap_or(true);

    SponsorForm {
        name,
        url,
        is_active,
    }
}

/// Raster logos are scaled down and re-encoded; SVG is stored verbatim
/// (there is nothing to resample).
async fn store_logo(state: &AppState, file: &UploadedFile, ext: &str) -> AppResult<String> {
    let bytes = if ext == "svg" {
        file.bytes.clone()
    } else {
        imaging::process_image(&file.bytes, ext, &SPONSOR_LOGO)?
    };
    let filename = storage::unique_filename(&file.filename)?;
    Ok(state.storage.save(SPONSORS_DIR, &filename, &bytes).await?)
}
