//! Multipart form collection for the admin CRUD screens.
//!
//! The admin frontend submits everything as `multipart/form-data`: scalar
//! fields as text parts, array fields either as repeated parts (`partners`,
//! `partners[]`) or as a single JSON-encoded part, and files as binary
//! parts. [`FormData::read`] drains the stream once; handlers then pull
//! typed values out while accumulating [`FieldErrors`].

use std::collections::HashMap;

use axum::extract::Multipart;
use serde::de::DeserializeOwned;

use atelier_core::ids::parse_loose_id_array;
use atelier_core::storage;
use atelier_core::types::DbId;
use atelier_core::validation::FieldErrors;

use crate::error::AppError;

/// One uploaded file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Lowercased extension of the client-supplied filename.
    pub fn extension(&self) -> Option<String> {
        storage::extension(&self.filename)
    }
}

/// A fully-drained multipart submission.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl FormData {
    /// Drain a multipart stream into memory.
    ///
    /// Parts with a filename become files (empty filenames are unselected
    /// file inputs and are skipped); everything else is collected as text.
    /// The total request size is already capped by the router's body limit.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let Some(name) = field.name().map(normalize_field_name) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(filename) if !filename.is_empty() => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    form.files.entry(name).or_default().push(UploadedFile {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
                _ => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    form.fields.entry(name).or_default().push(text);
                }
            }
        }

        Ok(form)
    }

    /// First raw value of a text field.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields.get(name)?.first().map(String::as_str)
    }

    /// First value of a text field, with blank submissions folded to `None`
    /// (empty form inputs mean "not provided").
    pub fn opt_value(&self, name: &str) -> Option<&str> {
        self.value(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Whether the field appeared in the submission at all.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// First uploaded file for a field.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)?.first()
    }

    /// All uploaded files for a field.
    pub fn file_list(&self, name: &str) -> &[UploadedFile] {
        self.files.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Checkbox/boolean field. Absent or blank yields `None`.
    pub fn bool_value(&self, name: &str) -> Option<bool> {
        match self.opt_value(name)?.to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Some(true),
            "0" | "false" | "off" | "no" => Some(false),
            _ => None,
        }
    }

    /// Integer field; a malformed value records a field error.
    pub fn i32_value(&self, name: &str, errors: &mut FieldErrors) -> Option<i32> {
        let raw = self.opt_value(name)?;
        match raw.parse::<i32>() {
            Ok(v) => Some(v),
            Err(_) => {
                errors.push(name, format!("The {name} must be an integer."));
                None
            }
        }
    }

    /// Id array field: either repeated numeric parts or one JSON-encoded
    /// array (numbers or numeric strings). Malformed entries record a
    /// field error.
    pub fn id_array(&self, name: &str, errors: &mut FieldErrors) -> Vec<DbId> {
        let values = match self.fields.get(name) {
            Some(v) => v,
            None => return Vec::new(),
        };

        // Single JSON-encoded array part.
        if let [single] = values.as_slice() {
            let trimmed = single.trim();
            if trimmed.starts_with('[') {
                return match serde_json::from_str::<serde_json::Value>(trimmed) {
                    Ok(value) => parse_loose_id_array(&value),
                    Err(_) => {
                        errors.push(name, format!("The {name} must be an array of ids."));
                        Vec::new()
                    }
                };
            }
        }

        values
            .iter()
            .filter(|v| !v.trim().is_empty())
            .filter_map(|v| match v.trim().parse::<DbId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.push(name, format!("The {name} must contain only ids."));
                    None
                }
            })
            .collect()
    }

    /// String array field: repeated parts or one JSON-encoded array of
    /// strings. Blank entries are dropped.
    pub fn string_array(&self, name: &str) -> Vec<String> {
        let values = match self.fields.get(name) {
            Some(v) => v,
            None => return Vec::new(),
        };

        if let [single] = values.as_slice() {
            let trimmed = single.trim();
            if trimmed.starts_with('[') {
                if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
                    return items
                        .into_iter()
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                }
            }
        }

        values
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Structured array field, submitted as one JSON-encoded part.
    pub fn object_array<T: DeserializeOwned>(
        &self,
        name: &str,
        errors: &mut FieldErrors,
    ) -> Vec<T> {
        let Some(raw) = self.opt_value(name) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<T>>(raw) {
            Ok(items) => items,
            Err(_) => {
                errors.push(name, format!("The {name} field is malformed."));
                Vec::new()
            }
        }
    }
}

/// `partners[]` and `partners` address the same field.
fn normalize_field_name(name: &str) -> String {
    name.strip_suffix("[]").unwrap_or(name).to_string()
}

/// Shared validation for an uploaded image: extension allow-list and size
/// cap. Returns the lowercased extension when acceptable.
pub fn validate_image_upload(
    errors: &mut FieldErrors,
    field: &str,
    file: &UploadedFile,
    allowed: &[&str],
    max_bytes: usize,
) -> Option<String> {
    let mut ok = true;

    let ext = match file.extension() {
        Some(ext) if atelier_core::imaging::is_allowed_extension(&ext, allowed) => Some(ext),
        _ => {
            errors.push(
                field,
                format!("The {field} must be a file of type: {}.", allowed.join(", ")),
            );
            ok = false;
            None
        }
    };

    if file.bytes.len() > max_bytes {
        errors.push(
            field,
            format!(
                "The {field} may not be greater than {} kilobytes.",
                max_bytes / 1024
            ),
        );
        ok = false;
    }

    if ok {
        ext
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with_fields(entries: &[(&str, &str)]) -> FormData {
        let mut form = FormData::default();
        for (name, value) in entries {
            form.fields
                .entry(normalize_field_name(name))
                .or_default()
                .push(value.to_string());
        }
        form
    }

    #[test]
    fn blank_values_fold_to_none() {
        let form = form_with_fields(&[("location", "   "), ("title", "Villa")]);
        assert_eq!(form.opt_value("location"), None);
        assert_eq!(form.opt_value("title"), Some("Villa"));
        assert!(form.has_field("location"));
        assert!(!form.has_field("year"));
    }

    #[test]
    fn bracket_suffix_is_normalized() {
        let form = form_with_fields(&[("partners[]", "A"), ("partners[]", "B")]);
        assert_eq!(form.string_array("partners"), ["A", "B"]);
    }

    #[test]
    fn id_array_accepts_repeated_and_json_forms() {
        let mut errors = FieldErrors::new();
        let form = form_with_fields(&[("category_ids", "3"), ("category_ids", "7")]);
        assert_eq!(form.id_array("category_ids", &mut errors), vec![3, 7]);

        let form = form_with_fields(&[("category_ids", "[3, \"7\"]")]);
        assert_eq!(form.id_array("category_ids", &mut errors), vec![3, 7]);
        assert!(errors.is_empty());

        let form = form_with_fields(&[("category_ids", "[oops")]);
        assert!(form.id_array("category_ids", &mut errors).is_empty());
        assert!(!errors.is_empty());
    }

    #[test]
    fn string_array_accepts_json_form() {
        let form = form_with_fields(&[("sponsors", r#"["Acme", " ", "Bravo"]"#)]);
        assert_eq!(form.string_array("sponsors"), ["Acme", "Bravo"]);
    }

    #[test]
    fn bool_values() {
        let form = form_with_fields(&[("is_active", "1"), ("other", "off")]);
        assert_eq!(form.bool_value("is_active"), Some(true));
        assert_eq!(form.bool_value("other"), Some(false));
        assert_eq!(form.bool_value("missing"), None);
    }

    #[test]
    fn image_validation_rejects_type_and_size() {
        use atelier_core::imaging::CATEGORY_IMAGE_EXTENSIONS;

        let mut errors = FieldErrors::new();
        let file = UploadedFile {
            filename: "logo.webp".to_string(),
            bytes: vec![0; 10],
        };
        assert_eq!(
            validate_image_upload(&mut errors, "image", &file, CATEGORY_IMAGE_EXTENSIONS, 1024),
            None
        );

        let file = UploadedFile {
            filename: "photo.jpg".to_string(),
            bytes: vec![0; 2048],
        };
        assert_eq!(
            validate_image_upload(&mut errors, "image", &file, CATEGORY_IMAGE_EXTENSIONS, 1024),
            None
        );

        let file = UploadedFile {
            filename: "photo.jpg".to_string(),
            bytes: vec![0; 10],
        };
        let mut clean = FieldErrors::new();
        assert_eq!(
            validate_image_upload(&mut clean, "image", &file, CATEGORY_IMAGE_EXTENSIONS, 1024),
            Some("jpg".to_string())
        );
        assert!(clean.is_empty());
    }
}
