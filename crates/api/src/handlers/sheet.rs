//! Project sheet outputs: printable HTML and the PDF download.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use atelier_core::storage;
use atelier_core::types::DbId;
use atelier_db::models::project::Project;
use atelier_db::repositories::CategoryRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::project::find_project;
use crate::pdf::{self, SheetImage};
use crate::print;
use crate::state::AppState;

/// GET /projects/{id}/print
///
/// Self-contained HTML sheet: raster assets are inlined as data URIs.
pub async fn print_sheet(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Html<String>> {
    let project = find_project(&state, id).await?;
    let categories =
        CategoryRepo::find_refs_by_ids(&state.pool, &project.category_id_list()).await?;

    let mut uris = Vec::new();
    for (bytes, ext) in load_images(&state, &project).await {
        uris.push(print::data_uri(&bytes, &ext));
    }

    let context = print::sheet_context(&project, &categories, &uris);
    let html = state
        .templates
        .render(print::PROJECT_SHEET, &context)
        .map_err(|e| AppError::InternalError(format!("Failed to render print sheet: {e}")))?;

    Ok(Html(html))
}

/// GET /projects/{id}/pdf
pub async fn download_pdf(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let project = find_project(&state, id).await?;
    let categories =
        CategoryRepo::find_refs_by_ids(&state.pool, &project.category_id_list()).await?;

    let images: Vec<SheetImage> = load_images(&state, &project)
        .await
        .into_iter()
        .map(|(bytes, ext)| SheetImage { bytes, ext })
        .collect();

    let pdf_bytes = pdf::render_project_sheet(&project, &categories, &images)?;
    let filename = pdf::pdf_filename(&project.title);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        pdf_bytes,
    )
        .into_response())
}

/// Stored bytes for the main image followed by the gallery full images.
/// Files missing on disk are skipped.
async fn load_images(state: &AppState, project: &Project) -> Vec<(Vec<u8>, String)> {
    let mut paths = Vec::new();
    if let Some(path) = &project.image_path {
        paths.push(path.clone());
    }
    for entry in project.gallery_images.0.iter() {
        paths.push(entry.full.clone());
    }

    let mut images = Vec::new();
    for path in paths {
        let Some(ext) = storage::extension(&path) else {
            continue;
        };
        if let Some(bytes) = state.storage.read(&path).await {
            images.push((bytes, ext));
        }
    }
    images
}
