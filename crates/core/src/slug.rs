//! URL slug and filename token generation.

/// Generate a URL slug from a display name.
///
/// Lowercases, maps every run of non-alphanumeric characters to a single
/// `-`, and trims leading/trailing dashes.
///
/// # Examples
///
/// ```
/// use atelier_core::slug::slugify;
///
/// assert_eq!(slugify("Urban Planning"), "urban-planning");
/// assert_eq!(slugify("  Résidentiel & Co.  "), "r-sidentiel-co");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Candidate slug for a given collision round: the base slug for round 1,
/// `base-2`, `base-3`, ... afterwards.
pub fn slug_candidate(base: &str, round: u32) -> String {
    if round <= 1 {
        base.to_string()
    } else {
        format!("{base}-{round}")
    }
}

/// Reduce a title to a safe download-filename token: runs of characters
/// outside `[A-Za-z0-9-]` collapse to a single `-`. Case is preserved.
pub fn filename_token(title: &str) -> String {
    let mut token = String::with_capacity(title.len());
    let mut last_dash = true;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            token.push(c);
            last_dash = false;
        } else if !last_dash {
            token.push('-');
            last_dash = true;
        }
    }

    while token.ends_with('-') {
        token.pop();
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_slugs() {
        assert_eq!(slugify("Urban Planning"), "urban-planning");
        assert_eq!(slugify("Interior"), "interior");
        assert_eq!(slugify("A  --  B"), "a-b");
    }

    #[test]
    fn slug_trims_edges() {
        assert_eq!(slugify("  Landscape  "), "landscape");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn slug_candidates() {
        assert_eq!(slug_candidate("urban", 1), "urban");
        assert_eq!(slug_candidate("urban", 2), "urban-2");
        assert_eq!(slug_candidate("urban", 3), "urban-3");
    }

    #[test]
    fn filename_tokens() {
        assert_eq!(filename_token("Villa Méditerranée"), "Villa-M-diterran-e");
        assert_eq!(filename_token("Tour A1 / Phase 2"), "Tour-A1-Phase-2");
        assert_eq!(filename_token("..."), "");
    }
}
