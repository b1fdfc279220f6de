use super::domain::{ApplicationId, ApplicationStatus, ArtistApplication, ArtistProfile, UserId};

/// Storage abstraction over the system of record so the service module can be
/// exercised in isolation.
pub trait ArtistRepository: Send + Sync {
    fn insert_application(
        &self,
        record: ArtistApplication,
    ) -> Result<ArtistApplication, RepositoryError>;

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ArtistApplication>, RepositoryError>;

    /// Pending applications, newest submission first.
    fn pending_applications(&self, limit: usize) -> Result<Vec<ArtistApplication>, RepositoryError>;

    /// Persist a review transition. Implementations must compare the stored
    /// status against `expected` and fail with [`RepositoryError::Conflict`]
    /// when another reviewer got there first.
    fn update_application(
        &self,
        record: ArtistApplication,
        expected: ApplicationStatus,
    ) -> Result<(), RepositoryError>;

    fn insert_profile(&self, profile: ArtistProfile) -> Result<ArtistProfile, RepositoryError>;

    fn fetch_profile(&self, artist_id: &UserId) -> Result<Option<ArtistProfile>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists or was modified concurrently")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("backend returned an unexpected shape: {0}")]
    InvalidShape(String),
}

/// Outbound transactional email payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Trait describing the transactional email hook. Delivery is fire-only; the
/// workflow never tracks bounces or opens.
pub trait Notifier: Send + Sync {
    fn send(&self, message: EmailMessage) -> Result<(), NotifyError>;
}

/// Email dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("email transport unavailable: {0}")]
    Transport(String),
    #[error("email provider rejected the message: {0}")]
    Delivery(String),
}
