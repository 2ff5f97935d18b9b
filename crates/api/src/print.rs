//! Printable HTML project sheet.
//!
//! The sheet is a self-contained A4-styled page: every raster asset is
//! inlined as a base64 data URI so the rendered document survives printing
//! and offline viewing without touching `/storage`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use handlebars::Handlebars;
use serde_json::{json, Value};

use atelier_db::models::category::CategoryRef;
use atelier_db::models::project::Project;

/// Registered template name for the project sheet.
pub const PROJECT_SHEET: &str = "project_sheet";

const PROJECT_SHEET_TEMPLATE: &str = include_str!("../templates/project_sheet.hbs");

/// Build the template registry used by [`crate::state::AppState`].
pub fn build_templates() -> Result<Handlebars<'static>, Box<handlebars::TemplateError>> {
    let mut registry = Handlebars::new();
    registry.register_template_string(PROJECT_SHEET, PROJECT_SHEET_TEMPLATE)?;
    Ok(registry)
}

/// Base64 data URI for raster bytes, typed by file extension.
pub fn data_uri(bytes: &[u8], ext: &str) -> String {
    let mime = match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    };
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Display label for the project's time span: the single year when set,
/// otherwise a `start - end` range (either side optional).
pub fn years_label(
    year: Option<&str>,
    start_year: Option<&str>,
    end_year: Option<&str>,
) -> Option<String> {
    if let Some(year) = year.map(str::trim).filter(|y| !y.is_empty()) {
        return Some(year.to_string());
    }
    let start = start_year.map(str::trim).filter(|y| !y.is_empty());
    let end = end_year.map(str::trim).filter(|y| !y.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => Some(format!("{start} - {end}")),
        (Some(start), None) => Some(start.to_string()),
        (None, Some(end)) => Some(end.to_string()),
        (None, None) => None,
    }
}

/// Assemble the template context. `images` are already data URIs (or
/// absolute URLs for the browser print view); the first one is the hero.
pub fn sheet_context(project: &Project, categories: &[CategoryRef], images: &[String]) -> Value {
    let facts: Vec<Value> = [
        ("Statut", project.achievement_status.as_deref()),
        ("Surface", project.surface_area.as_deref()),
        ("Client", project.client_name.as_deref()),
        ("Client délégué", project.delegated_client_name.as_deref()),
        ("Coût du projet", project.project_cost.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        Some(json!({ "label": label, "value": value }))
    })
    .chain(
        project
            .duration_months
            .map(|months| json!({ "label": "Durée", "value": format!("{months} mois") })),
    )
    .collect();

    let paragraphs: Vec<&str> = project
        .description
        .split('\n')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    json!({
        "title": project.title,
        "categories": categories
            .iter()
            .map(|c| json!({ "name": c.name, "color": c.color }))
            .collect::<Vec<_>>(),
        "location": project.location,
        "years": years_label(
            project.year.as_deref(),
            project.start_year.as_deref(),
            project.end_year.as_deref(),
        ),
        "paragraphs": paragraphs,
        "facts": facts,
        "partners": project.partners.0,
        "institutional_partners": project.institutional_partners.0,
        "sponsors": project.sponsors.0,
        "hero": images.first(),
        "gallery": images.get(1..).unwrap_or(&[]),
    })
}
