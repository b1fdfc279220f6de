use chrono::Utc;
use mime::Mime;

use super::domain::{AttachmentMeta, UserId};

pub const MAX_ATTACHMENTS: usize = 5;
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// MIME types the wizard accepts, mirroring the audio/image/document buckets
/// offered by the upload step.
pub const ALLOWED_CONTENT_TYPES: [&str; 12] = [
    "audio/mpeg",
    "audio/wav",
    "audio/mp3",
    "audio/m4a",
    "audio/aac",
    "image/jpeg",
    "image/png",
    "image/jpg",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Bytes plus metadata handed to the wizard by the host before any storage
/// call is made.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("maximum {max} files allowed")]
    TooMany { max: usize },
    #[error("'{name}' exceeds the {max_bytes} byte limit")]
    TooLarge { name: String, max_bytes: u64 },
    #[error("'{name}' has unsupported type '{content_type}'")]
    UnsupportedType { name: String, content_type: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Gate an upload against the attachment policy. Runs before any network
/// call so an oversized or sixth file never reaches the storage collaborator.
pub fn check_attachment(existing: usize, upload: &AttachmentUpload) -> Result<(), AttachmentError> {
    if existing >= MAX_ATTACHMENTS {
        return Err(AttachmentError::TooMany {
            max: MAX_ATTACHMENTS,
        });
    }
    if upload.bytes.len() as u64 > MAX_ATTACHMENT_BYTES {
        return Err(AttachmentError::TooLarge {
            name: upload.name.clone(),
            max_bytes: MAX_ATTACHMENT_BYTES,
        });
    }
    if !ALLOWED_CONTENT_TYPES.contains(&upload.content_type.as_str()) {
        return Err(AttachmentError::UnsupportedType {
            name: upload.name.clone(),
            content_type: upload.content_type.clone(),
        });
    }
    Ok(())
}

/// Human label shown next to an uploaded file.
pub fn category_label(content_type: &str) -> &'static str {
    match content_type.parse::<Mime>() {
        Ok(parsed) if parsed.type_() == mime::AUDIO => "Audio Demo",
        Ok(parsed) if parsed.type_() == mime::IMAGE => "Press Photo",
        _ => "Document",
    }
}

/// Storage path convention: one portfolio folder per user.
pub fn portfolio_path(user: &UserId, file_name: &str) -> String {
    format!("{}/portfolio/{}", user.0, file_name)
}

/// Entry returned when listing a user's portfolio folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub name: String,
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Backend(String),
}

/// Blob-storage facade for portfolio files. The draft only ever holds the
/// public URL this trait returns.
pub trait PortfolioStorage: Send + Sync {
    fn upload(&self, path: &str, bytes: &[u8], content_type: &str)
        -> Result<String, StorageError>;
    fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError>;
    fn remove(&self, paths: &[String]) -> Result<(), StorageError>;
}

/// Upload a checked file and produce the metadata stored in the draft.
pub fn store_attachment<S: PortfolioStorage>(
    storage: &S,
    owner: &UserId,
    existing: usize,
    upload: AttachmentUpload,
) -> Result<AttachmentMeta, AttachmentError> {
    check_attachment(existing, &upload)?;

    let path = portfolio_path(owner, &upload.name);
    let storage_url = storage.upload(&path, &upload.bytes, &upload.content_type)?;

    Ok(AttachmentMeta {
        name: upload.name,
        size_bytes: upload.bytes.len() as u64,
        content_type: upload.content_type,
        uploaded_at: Utc::now(),
        storage_url,
    })
}
