//! Artist application workflow: the multi-step wizard, draft persistence,
//! step validation, and the submission/review service with its HTTP surface.

pub mod domain;
pub mod draft;
pub mod repository;
pub mod router;
pub mod service;
pub mod storage;
pub(crate) mod validate;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationDraft, ApplicationId, ApplicationStatus, ApplicationView, ArtistApplication,
    ArtistProfile, AttachmentMeta, ExperienceLevel, IdentityDetails, MusicalBackground, Narrative,
    PerformanceType, PortfolioLink, UserId, FIRST_STEP, TOTAL_STEPS,
};
pub use draft::{DraftStore, KeyValueStore, MemoryKeyValueStore, DRAFT_KEY};
pub use repository::{
    ArtistRepository, EmailMessage, Notifier, NotifyError, RepositoryError,
};
pub use router::{artist_router, DEFAULT_PENDING_LIMIT};
pub use service::{
    ApprovalOutcome, ArtistApplicationService, NotificationStatus, RejectionOutcome, ReviewError,
    SubmissionError,
};
pub use storage::{
    AttachmentError, AttachmentUpload, PortfolioStorage, StorageError, StoredObject,
    MAX_ATTACHMENTS, MAX_ATTACHMENT_BYTES,
};
pub use validate::{CompletionStats, FieldErrors};
pub use wizard::{ApplicationWizard, WizardError, WizardPhase};
