use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::backend::memory::MemoryArtistRepository;
use crate::workflows::artist::domain::{
    ApplicationDraft, ApplicationId, ApplicationStatus, ArtistApplication, ArtistProfile,
    ExperienceLevel, PerformanceType, PortfolioLink, UserId, TOTAL_STEPS,
};
use crate::workflows::artist::repository::{
    ArtistRepository, EmailMessage, Notifier, NotifyError, RepositoryError,
};
use crate::workflows::artist::{artist_router, ArtistApplicationService};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 27).expect("valid date")
}

pub(super) fn artist() -> UserId {
    UserId("artist-nova".to_string())
}

pub(super) const SAMPLE_BIO: &str = "Nova R is an electronic artist blending modular synthesis \
    with field recordings, performing across the festival circuit for nearly a decade.";

pub(super) const SAMPLE_STATEMENT: &str =
    "I build immersive sets that turn a crowd into a single instrument.";

/// Draft with every required field filled and the wizard parked on the review
/// step, ready to submit.
pub(super) fn complete_draft() -> ApplicationDraft {
    let mut draft = ApplicationDraft::new();
    draft.identity.first_name = "Nova".to_string();
    draft.identity.last_name = "Reyes".to_string();
    draft.identity.stage_name = "Nova R".to_string();
    draft.identity.email = "nova@example.com".to_string();
    draft.identity.phone = "555-0170".to_string();
    draft.identity.address = "12 Canal St".to_string();
    draft.identity.city = "Portland".to_string();
    draft.identity.state = "OR".to_string();
    draft.identity.zip_code = "97209".to_string();
    draft.identity.country = "US".to_string();
    draft.identity.date_of_birth = "1994-04-12".to_string();

    draft.background.primary_genre = "Electronic".to_string();
    draft.background.primary_instrument = "Synthesizer".to_string();
    draft.background.experience_level = Some(ExperienceLevel::Professional);
    draft.background.performance_type = Some(PerformanceType::Solo);
    draft.background.years_of_experience = Some(9);
    draft.background.performance_experience = vec!["Festivals".to_string()];

    draft.portfolio_links.push(PortfolioLink {
        platform: "SoundCloud".to_string(),
        url: "https://soundcloud.com/nova-r".to_string(),
        description: "Latest sets".to_string(),
    });

    draft.narrative.bio = SAMPLE_BIO.to_string();
    draft.narrative.artist_statement = SAMPLE_STATEMENT.to_string();

    draft.current_step = TOTAL_STEPS;
    draft
}

pub(super) fn build_service() -> (
    ArtistApplicationService<MemoryArtistRepository, RecordingNotifier>,
    Arc<MemoryArtistRepository>,
    Arc<RecordingNotifier>,
) {
    let repository = Arc::new(MemoryArtistRepository::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = ArtistApplicationService::new(repository.clone(), notifier.clone());
    (service, repository, notifier)
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    messages: Mutex<Vec<EmailMessage>>,
}

impl RecordingNotifier {
    pub(super) fn sent(&self) -> Vec<EmailMessage> {
        self.messages.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, message: EmailMessage) -> Result<(), NotifyError> {
        self.messages
            .lock()
            .expect("notifier mutex poisoned")
            .push(message);
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn send(&self, _message: EmailMessage) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("mailbox full".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl ArtistRepository for UnavailableRepository {
    fn insert_application(
        &self,
        _record: ArtistApplication,
    ) -> Result<ArtistApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_application(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<ArtistApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending_applications(
        &self,
        _limit: usize,
    ) -> Result<Vec<ArtistApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_application(
        &self,
        _record: ArtistApplication,
        _expected: ApplicationStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_profile(&self, _profile: ArtistProfile) -> Result<ArtistProfile, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_profile(
        &self,
        _artist_id: &UserId,
    ) -> Result<Option<ArtistProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn artist_router_with_service(
    service: ArtistApplicationService<MemoryArtistRepository, RecordingNotifier>,
) -> axum::Router {
    artist_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
