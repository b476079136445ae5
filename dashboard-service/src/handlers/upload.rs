//! Buffered multipart reading with per-field size and count limits.

use crate::models::UploadedFile;
use axum::body::Bytes;
use axum::extract::Multipart;
use service_core::error::AppError;
use std::collections::HashMap;

/// Limits for one file field.
#[derive(Debug, Clone, Copy)]
pub struct FileRule {
    pub field: &'static str,
    pub max_bytes: usize,
    pub max_count: usize,
}

impl FileRule {
    pub fn single(field: &'static str, max_bytes: usize) -> Self {
        Self {
            field,
            max_bytes,
            max_count: 1,
        }
    }
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl MultipartForm {
    /// Text field value, trimmed; `None` when missing or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn take_file(&mut self, field: &str) -> Option<UploadedFile> {
        let index = self.files.iter().position(|f| f.field_name == field)?;
        Some(self.files.remove(index))
    }

    pub fn take_files(&mut self, field: &str) -> Vec<UploadedFile> {
        let (taken, rest) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| f.field_name == field);
        self.files = rest;
        taken
    }
}

pub fn megabytes(bytes: usize) -> String {
    format!("{}MB", bytes / (1024 * 1024))
}

/// Read every part of the form. Parts with a file name are matched against
/// `rules`; files for unknown fields are dropped. A browser sends an empty
/// part for an untouched file input, which is skipped.
pub async fn read_multipart(
    mut multipart: Multipart,
    rules: &[FileRule],
) -> Result<MultipartForm, AppError> {
    let mut form = MultipartForm::default();
    let mut counts: HashMap<&'static str, usize> = HashMap::new();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await?;
            form.fields.insert(name, value);
            continue;
        };

        let Some(rule) = rules.iter().find(|rule| rule.field == name) else {
            tracing::debug!(field = %name, "Ignoring unexpected file field");
            continue;
        };

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if data.len() + chunk.len() > rule.max_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "File too large. Maximum size is {}",
                    megabytes(rule.max_bytes)
                )));
            }
            data.extend_from_slice(&chunk);
        }

        if file_name.is_empty() && data.is_empty() {
            continue;
        }

        let count = counts.entry(rule.field).or_default();
        *count += 1;
        if *count > rule.max_count {
            return Err(AppError::BadRequest(format!(
                "Too many files. Maximum is {}",
                rule.max_count
            )));
        }

        form.files.push(UploadedFile {
            field_name: name,
            file_name,
            content_type,
            data: Bytes::from(data),
        });
    }

    Ok(form)
}
