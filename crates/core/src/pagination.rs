//! Page sizes and pagination arithmetic.
//!
//! Page sizes are fixed per listing (the frontends render fixed grids);
//! clients only pass a 1-based `page` parameter.

/// Admin category listing page size.
pub const CATEGORIES_PER_PAGE: i64 = 15;

/// Admin project listing page size.
pub const ADMIN_PROJECTS_PER_PAGE: i64 = 12;

/// Public project listing page size (3x3 grid).
pub const PUBLIC_PROJECTS_PER_PAGE: i64 = 9;

/// Admin contact message listing page size.
pub const CONTACT_MESSAGES_PER_PAGE: i64 = 20;

/// Number of recent projects on the home payload.
pub const HOME_RECENT_PROJECTS: i64 = 6;

/// Maximum related projects on a detail page.
pub const RELATED_PROJECTS_LIMIT: i64 = 3;

/// Clamp an optional 1-based page number to at least 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Row offset for a 1-based page.
pub fn offset(page: i64, per_page: i64) -> i64 {
    (page - 1) * per_page
}

/// Total page count for `total` rows; an empty result set still has 1 page.
pub fn total_pages(total: i64, per_page: i64) -> i64 {
    if total <= 0 {
        1
    } else {
        (total + per_page - 1) / per_page
    }
}
