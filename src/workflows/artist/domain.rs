use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for authenticated users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

pub const FIRST_STEP: u8 = 1;
pub const TOTAL_STEPS: u8 = 6;

/// Personal details collected on the first wizard step.
///
/// Fields keep their raw text form until validation; camelCase names match the
/// snapshot format the review surface and emails read back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityDetails {
    pub first_name: String,
    pub last_name: String,
    pub stage_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    /// Raw `YYYY-MM-DD` input; parsed during validation.
    pub date_of_birth: String,
}

impl IdentityDetails {
    pub fn full_name(&self) -> String {
        let joined = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        joined.trim().to_string()
    }
}

/// Self-reported experience tiers offered by the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
    Professional,
}

impl ExperienceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
            ExperienceLevel::Professional => "professional",
        }
    }
}

/// How the applicant typically performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceType {
    Solo,
    Band,
    Dj,
    Ensemble,
}

impl PerformanceType {
    pub const fn label(self) -> &'static str {
        match self {
            PerformanceType::Solo => "solo",
            PerformanceType::Band => "band",
            PerformanceType::Dj => "dj",
            PerformanceType::Ensemble => "ensemble",
        }
    }
}

/// Musical background collected on the second wizard step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MusicalBackground {
    pub primary_genre: String,
    pub secondary_genre: String,
    pub primary_instrument: String,
    pub additional_instruments: Vec<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub performance_type: Option<PerformanceType>,
    pub years_of_experience: Option<u32>,
    pub performance_experience: Vec<String>,
    pub notable_venues: String,
    pub education: String,
}

/// One external portfolio reference (step three).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioLink {
    pub platform: String,
    pub url: String,
    pub description: String,
}

/// Free-form narrative sections collected on step four.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Narrative {
    pub bio: String,
    pub artist_statement: String,
    pub musical_influences: String,
    pub career_highlights: String,
}

/// Metadata for an uploaded portfolio file. Binary content lives in blob
/// storage; the draft only carries the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentMeta {
    pub name: String,
    pub size_bytes: u64,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub storage_url: String,
}

/// The in-progress artist application, owned by one wizard instance until it
/// is submitted. Serialized wholesale into the draft store and, at submission
/// time, into the persisted record's snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationDraft {
    pub identity: IdentityDetails,
    pub background: MusicalBackground,
    pub portfolio_links: Vec<PortfolioLink>,
    pub narrative: Narrative,
    pub attachments: Vec<AttachmentMeta>,
    pub current_step: u8,
    pub last_saved_at: Option<DateTime<Utc>>,
}

impl Default for ApplicationDraft {
    fn default() -> Self {
        Self {
            identity: IdentityDetails::default(),
            background: MusicalBackground::default(),
            portfolio_links: Vec::new(),
            narrative: Narrative::default(),
            attachments: Vec::new(),
            current_step: FIRST_STEP,
            last_saved_at: None,
        }
    }
}

impl ApplicationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the applicant has not entered anything yet; used to skip
    /// autosaves of a pristine draft.
    pub fn is_empty(&self) -> bool {
        self.identity == IdentityDetails::default()
            && self.background == MusicalBackground::default()
            && self.portfolio_links.is_empty()
            && self.narrative == Narrative::default()
            && self.attachments.is_empty()
    }
}

/// Review lifecycle of a persisted application. Transitions are monotonic:
/// pending moves to exactly one of approved or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Persisted application record, one per submission attempt. Immutable after
/// review except for reviewer notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistApplication {
    pub id: ApplicationId,
    pub artist_id: UserId,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<UserId>,
    pub reviewer_notes: Option<String>,
    pub snapshot: ApplicationDraft,
}

impl ArtistApplication {
    /// Sanitized row for the admin review table.
    pub fn view(&self) -> ApplicationView {
        ApplicationView {
            application_id: self.id.clone(),
            stage_name: self.snapshot.identity.stage_name.clone(),
            email: self.snapshot.identity.email.clone(),
            primary_genre: self.snapshot.background.primary_genre.clone(),
            status: self.status.label(),
            submitted_at: self.submitted_at,
            reviewed_at: self.reviewed_at,
        }
    }
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub application_id: ApplicationId,
    pub stage_name: String,
    pub email: String,
    pub primary_genre: String,
    pub status: &'static str,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Public artist profile, materialized exactly once per approved application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub artist_id: UserId,
    pub stage_name: String,
    pub bio: String,
    pub genres: Vec<String>,
    pub experience_years: u32,
    pub portfolio_links: Vec<PortfolioLink>,
    pub verified: bool,
}
