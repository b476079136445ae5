use axum::body::Bytes;

/// A file received from a multipart form, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type == "application/pdf" || self.file_name.to_lowercase().ends_with(".pdf")
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    pub fn is_audio(&self) -> bool {
        self.content_type.starts_with("audio/") || self.content_type.starts_with("video/webm")
    }
}
