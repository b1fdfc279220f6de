use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    ApplicationDraft, ApplicationId, ApplicationStatus, ArtistApplication, ArtistProfile, UserId,
};
use super::repository::{ArtistRepository, EmailMessage, Notifier, RepositoryError};
use super::validate;

/// Service composing the repository, the completeness checklist, and the
/// notification hook for the submit and review sides of the workflow.
pub struct ArtistApplicationService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Ids must stay unique against rows persisted by earlier runs of the
/// process, so the submission clock anchors the id and the counter only
/// disambiguates submissions landing in the same microsecond.
fn next_application_id() -> ApplicationId {
    let sequence = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let micros = Utc::now().timestamp_micros();
    ApplicationId(format!("app-{micros:012x}-{sequence:04x}"))
}

/// Whether the post-review notification reached the email collaborator.
/// Failures never roll back the review itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStatus {
    Sent,
    Failed(String),
}

/// Result of an approval: the reviewed record, the profile it materialized,
/// and the notification outcome.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub application: ArtistApplication,
    pub profile: ArtistProfile,
    pub notification: NotificationStatus,
}

/// Result of a rejection.
#[derive(Debug, Clone)]
pub struct RejectionOutcome {
    pub application: ArtistApplication,
    pub notification: NotificationStatus,
}

/// Error raised on the submission side.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("application is missing required fields: {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Error raised on the review side.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("application was already reviewed (status: {})", .status.label())]
    AlreadyReviewed { status: ApplicationStatus },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl<R, N> ArtistApplicationService<R, N>
where
    R: ArtistRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Persist a draft as a pending application owned by `artist_id`.
    ///
    /// The ten-field checklist is verified before any collaborator call; on
    /// repository failure the caller keeps its draft and may retry.
    pub fn submit(
        &self,
        draft: ApplicationDraft,
        artist_id: &UserId,
    ) -> Result<ArtistApplication, SubmissionError> {
        let missing = validate::missing_required(&draft);
        if !missing.is_empty() {
            return Err(SubmissionError::Incomplete { missing });
        }

        let record = ArtistApplication {
            id: next_application_id(),
            artist_id: artist_id.clone(),
            status: ApplicationStatus::Pending,
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
            reviewer_notes: None,
            snapshot: draft,
        };

        let stored = self.repository.insert_application(record)?;
        info!(application_id = %stored.id.0, artist_id = %stored.artist_id.0, "artist application submitted");
        Ok(stored)
    }

    /// Fetch one application for status display.
    pub fn get(&self, id: &ApplicationId) -> Result<ArtistApplication, ReviewError> {
        let record = self
            .repository
            .fetch_application(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Pending applications for the admin review table.
    pub fn pending(&self, limit: usize) -> Result<Vec<ArtistApplication>, ReviewError> {
        Ok(self.repository.pending_applications(limit)?)
    }

    /// Approve a pending application: materialize the artist profile from the
    /// snapshot, mark the record approved, then notify the applicant. The
    /// notification is a soft-fail; profile creation and the status change
    /// commit regardless.
    pub fn approve(
        &self,
        id: &ApplicationId,
        reviewer: &UserId,
    ) -> Result<ApprovalOutcome, ReviewError> {
        let record = self
            .repository
            .fetch_application(id)?
            .ok_or(RepositoryError::NotFound)?;

        if record.status != ApplicationStatus::Pending {
            return Err(ReviewError::AlreadyReviewed {
                status: record.status,
            });
        }

        let profile = profile_from_snapshot(&record);
        let profile = self.repository.insert_profile(profile)?;

        let mut reviewed = record;
        reviewed.status = ApplicationStatus::Approved;
        reviewed.reviewed_at = Some(Utc::now());
        reviewed.reviewed_by = Some(reviewer.clone());
        self.repository
            .update_application(reviewed.clone(), ApplicationStatus::Pending)?;

        info!(application_id = %reviewed.id.0, reviewer = %reviewer.0, "artist application approved");
        let notification = self.dispatch(approval_email(&reviewed));

        Ok(ApprovalOutcome {
            application: reviewed,
            profile,
            notification,
        })
    }

    /// Reject a pending application, storing the reason in reviewer notes.
    /// Same soft-fail policy for the notification as [`Self::approve`].
    pub fn reject(
        &self,
        id: &ApplicationId,
        reviewer: &UserId,
        reason: &str,
    ) -> Result<RejectionOutcome, ReviewError> {
        let record = self
            .repository
            .fetch_application(id)?
            .ok_or(RepositoryError::NotFound)?;

        if record.status != ApplicationStatus::Pending {
            return Err(ReviewError::AlreadyReviewed {
                status: record.status,
            });
        }

        let mut reviewed = record;
        reviewed.status = ApplicationStatus::Rejected;
        reviewed.reviewed_at = Some(Utc::now());
        reviewed.reviewed_by = Some(reviewer.clone());
        reviewed.reviewer_notes = Some(reason.to_string());
        self.repository
            .update_application(reviewed.clone(), ApplicationStatus::Pending)?;

        info!(application_id = %reviewed.id.0, reviewer = %reviewer.0, "artist application rejected");
        let notification = self.dispatch(rejection_email(&reviewed, reason));

        Ok(RejectionOutcome {
            application: reviewed,
            notification,
        })
    }

    fn dispatch(&self, message: EmailMessage) -> NotificationStatus {
        match self.notifier.send(message) {
            Ok(()) => NotificationStatus::Sent,
            Err(err) => {
                warn!(error = %err, "review notification failed");
                NotificationStatus::Failed(err.to_string())
            }
        }
    }
}

/// Build the public profile an approval derives from the stored snapshot.
fn profile_from_snapshot(record: &ArtistApplication) -> ArtistProfile {
    let snapshot = &record.snapshot;
    let genres = if validate::is_blank(&snapshot.background.primary_genre) {
        Vec::new()
    } else {
        vec![snapshot.background.primary_genre.trim().to_lowercase()]
    };

    ArtistProfile {
        artist_id: record.artist_id.clone(),
        stage_name: snapshot.identity.stage_name.clone(),
        bio: snapshot.narrative.bio.clone(),
        genres,
        experience_years: snapshot.background.years_of_experience.unwrap_or(0),
        portfolio_links: snapshot.portfolio_links.clone(),
        verified: true,
    }
}

fn greeting_name(record: &ArtistApplication) -> String {
    let full_name = record.snapshot.identity.full_name();
    if full_name.is_empty() {
        record.snapshot.identity.stage_name.clone()
    } else {
        full_name
    }
}

fn approval_email(record: &ArtistApplication) -> EmailMessage {
    let name = escape_html(&greeting_name(record));
    let mut html = String::new();
    writeln!(html, "<h1>Congratulations!</h1>").expect("write heading");
    writeln!(html, "<p>Dear {name},</p>").expect("write greeting");
    writeln!(
        html,
        "<p>Your artist application for <strong>EventFlow</strong> has been approved. \
         Welcome to our community of performers.</p>"
    )
    .expect("write body");
    writeln!(
        html,
        "<p>Sign in to your artist dashboard to manage your profile, upload portfolio \
         materials, and apply to upcoming events.</p>"
    )
    .expect("write next steps");
    writeln!(html, "<p><strong>The EventFlow Team</strong></p>").expect("write signature");

    EmailMessage {
        to: record.snapshot.identity.email.clone(),
        subject: "Your EventFlow Artist Application has been Approved!".to_string(),
        html,
    }
}

fn rejection_email(record: &ArtistApplication, reason: &str) -> EmailMessage {
    let name = escape_html(&greeting_name(record));
    let mut html = String::new();
    writeln!(html, "<h1>Artist Application Update</h1>").expect("write heading");
    writeln!(html, "<p>Dear {name},</p>").expect("write greeting");
    writeln!(
        html,
        "<p>Thank you for your interest in joining EventFlow as a performing artist. \
         After careful review we cannot approve your application at this time.</p>"
    )
    .expect("write body");
    if !reason.trim().is_empty() {
        writeln!(
            html,
            "<h3>Feedback:</h3><p>{}</p>",
            escape_html(reason.trim())
        )
        .expect("write reason");
    }
    writeln!(
        html,
        "<p>You are welcome to reapply after 30 days with updated materials.</p>"
    )
    .expect("write reapply note");
    writeln!(html, "<p><strong>The EventFlow Team</strong></p>").expect("write signature");

    EmailMessage {
        to: record.snapshot.identity.email.clone(),
        subject: "EventFlow Artist Application Update".to_string(),
        html,
    }
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
