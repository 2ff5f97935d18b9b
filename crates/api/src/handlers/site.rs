//! Handlers for the public site payloads.
//!
//! These endpoints feed the visitor-facing pages: home, about, the project
//! listing with its category filter, and the project detail page with its
//! related projects.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use atelier_core::pagination::{
    clamp_page, offset, HOME_RECENT_PROJECTS, PUBLIC_PROJECTS_PER_PAGE, RELATED_PROJECTS_LIMIT,
};
use atelier_core::types::DbId;
use atelier_db::models::category::{Category, CategoryWithCount};
use atelier_db::models::project::ProjectWithCategories;
use atelier_db::models::sponsor::Sponsor;
use atelier_db::repositories::{CategoryRepo, ProjectRepo, SponsorRepo};

use crate::error::AppResult;
use crate::handlers::project::{attach_categories, find_project};
use crate::response::{DataResponse, Page};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub page: Option<i64>,
}

/// Public project listing payload: the page of projects, the category
/// filter bar, and the echoed filter value.
#[derive(Debug, Serialize)]
pub struct ProjectListing {
    pub projects: Page<ProjectWithCategories>,
    pub categories: Vec<Category>,
    pub selected_category: Option<String>,
}

/// GET /api/v1/site/projects
///
/// Active projects in display order. `?category=` matches a category by
/// slug or name; an unknown value falls back to the unfiltered listing.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<ProjectListing>> {
    let page = clamp_page(params.page);

    let selected = params
        .category
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let category_id: Option<DbId> = match selected {
        Some(term) => CategoryRepo::find_by_slug_or_name(&state.pool, term)
            .await?
            .map(|c| c.id),
        None => None,
    };

    let total = ProjectRepo::count_active(&state.pool, category_id).await?;
    let projects = ProjectRepo::list_active_page(
        &state.pool,
        category_id,
        PUBLIC_PROJECTS_PER_PAGE,
        offset(page, PUBLIC_PROJECTS_PER_PAGE),
    )
    .await?;
    let items = attach_categories(&state.pool, projects).await?;

    let categories = CategoryRepo::list_active_ordered(&state.pool).await?;

    Ok(Json(ProjectListing {
        projects: Page::new(items, page, PUBLIC_PROJECTS_PER_PAGE, total),
        categories,
        selected_category: selected.map(str::to_string),
    }))
}

/// Project detail payload with its related projects.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    pub project: ProjectWithCategories,
    pub related_projects: Vec<ProjectWithCategories>,
}

/// GET /api/v1/site/projects/{id}
///
/// Related projects are active, share at least one category with this one
/// (either JSON encoding), exclude the project itself, and cap at three.
pub async fn show_project(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProjectDetail>> {
    let project = find_project(&state, id).await?;

    let related = ProjectRepo::list_related(
        &state.pool,
        project.id,
        &project.category_id_list(),
        RELATED_PROJECTS_LIMIT,
    )
    .await?;

    let mut resolved = attach_categories(&state.pool, vec![project]).await?;
    let project = resolved
        .pop()
        .ok_or_else(|| crate::error::AppError::InternalError("category resolution dropped a project".into()))?;
    let related_projects = attach_categories(&state.pool, related).await?;

    Ok(Json(ProjectDetail {
        project,
        related_projects,
    }))
}

/// Home page payload.
#[derive(Debug, Serialize)]
pub struct HomePayload {
    pub categories: Vec<CategoryWithCount>,
    pub recent_projects: Vec<ProjectWithCategories>,
    pub sponsors: Vec<Sponsor>,
}

/// GET /api/v1/site/home
pub async fn home(State(state): State<AppState>) -> AppResult<Json<HomePayload>> {
    let categories = CategoryRepo::list_active_with_counts(&state.pool).await?;
    let recent = ProjectRepo::list_recent_active(&state.pool, HOME_RECENT_PROJECTS).await?;
    let recent_projects = attach_categories(&state.pool, recent).await?;
    let sponsors = SponsorRepo::list_active(&state.pool).await?;

    Ok(Json(HomePayload {
        categories,
        recent_projects,
        sponsors,
    }))
}

/// GET /api/v1/site/about
pub async fn about(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Sponsor>>>> {
    let sponsors = SponsorRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: sponsors }))
}
