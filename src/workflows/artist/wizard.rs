use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::domain::{ApplicationDraft, ArtistApplication, UserId, FIRST_STEP, TOTAL_STEPS};
use super::draft::{DraftStore, KeyValueStore};
use super::repository::{ArtistRepository, Notifier};
use super::service::{ArtistApplicationService, SubmissionError};
use super::storage::{AttachmentError, AttachmentUpload, PortfolioStorage};
use super::validate::{self, CompletionStats, FieldErrors};

const AUTOSAVE_INTERVAL_SECS: i64 = 30;

/// Wizard lifecycle. `Submitting` is the in-flight guard against a double
/// submit; `Submitted` and `Abandoned` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    Editing,
    Submitting,
    Submitted,
    Abandoned,
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("{} field(s) need attention", .0.len())]
    Validation(FieldErrors),
    #[error("submission is only available from the review step (currently on step {step})")]
    NotOnReviewStep { step: u8 },
    #[error("a submission is already in flight")]
    InFlight,
    #[error("this application was already submitted")]
    AlreadySubmitted,
    #[error("this wizard was abandoned")]
    Abandoned,
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Drives the six-step application form: step sequencing, per-step validation,
/// field merging, draft persistence, and the final submission handoff.
///
/// One wizard owns one draft; there is no cross-instance coordination, and a
/// concurrent instance writing the same store wins by being last.
pub struct ApplicationWizard<S> {
    store: DraftStore<S>,
    draft: ApplicationDraft,
    errors: FieldErrors,
    phase: WizardPhase,
    last_saved_at: Option<DateTime<Utc>>,
}

impl<S: KeyValueStore> ApplicationWizard<S> {
    /// Mount the wizard, rehydrating any saved draft (fields and step
    /// position) or starting fresh at step one.
    pub fn new(storage: S) -> Self {
        let store = DraftStore::new(storage);
        let draft = store.load().unwrap_or_default();
        let last_saved_at = draft.last_saved_at;

        Self {
            store,
            draft,
            errors: FieldErrors::new(),
            phase: WizardPhase::Editing,
            last_saved_at,
        }
    }

    pub fn current_step(&self) -> u8 {
        self.draft.current_step
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    pub fn completion(&self) -> CompletionStats {
        validate::completion_stats(&self.draft)
    }

    /// Merge a single field edit into the draft and clear that field's error.
    /// Other fields are not revalidated; edits apply in call order.
    pub fn edit<F>(&mut self, field: &str, mutate: F) -> Result<(), WizardError>
    where
        F: FnOnce(&mut ApplicationDraft),
    {
        self.ensure_active()?;
        mutate(&mut self.draft);
        self.errors.remove(field);
        Ok(())
    }

    /// Advance to the next step, gated by the current step's validator. On
    /// success the draft (with its new step) is persisted.
    pub fn next(&mut self, today: NaiveDate) -> Result<u8, WizardError> {
        self.ensure_active()?;

        let errors = validate::validate_step(self.draft.current_step, &self.draft, today);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(WizardError::Validation(errors));
        }

        self.errors.clear();
        if self.draft.current_step < TOTAL_STEPS {
            self.draft.current_step += 1;
            self.persist();
        }
        Ok(self.draft.current_step)
    }

    /// Step back without validation. Entered data is never discarded.
    pub fn previous(&mut self) -> Result<u8, WizardError> {
        self.ensure_active()?;
        if self.draft.current_step > FIRST_STEP {
            self.draft.current_step -= 1;
        }
        Ok(self.draft.current_step)
    }

    /// Manual save, same effect as the autosave timer firing.
    pub fn save_draft(&mut self) -> Result<DateTime<Utc>, WizardError> {
        self.ensure_active()?;
        Ok(self.persist())
    }

    /// Timer hook: persist when something has been entered and the autosave
    /// interval has elapsed. Returns whether a save happened.
    pub fn autosave_tick(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase != WizardPhase::Editing || self.draft.is_empty() {
            return false;
        }

        let due = match self.last_saved_at {
            Some(saved) => now - saved >= Duration::seconds(AUTOSAVE_INTERVAL_SECS),
            None => true,
        };
        if due {
            self.persist();
        }
        due
    }

    /// Upload a portfolio file and record its metadata on the draft. Gated on
    /// the editing phase like every other transition; policy checks (count,
    /// size, type) run before the storage collaborator is touched.
    pub fn attach<P>(
        &mut self,
        storage: &P,
        owner: &UserId,
        upload: AttachmentUpload,
    ) -> Result<(), WizardError>
    where
        P: PortfolioStorage,
    {
        self.ensure_active()?;
        let meta =
            super::storage::store_attachment(storage, owner, self.draft.attachments.len(), upload)?;
        self.draft.attachments.push(meta);
        Ok(())
    }

    /// Drop an attachment from the draft and from storage. Same phase gate as
    /// [`Self::attach`].
    pub fn remove_attachment<P>(
        &mut self,
        storage: &P,
        owner: &UserId,
        name: &str,
    ) -> Result<(), WizardError>
    where
        P: PortfolioStorage,
    {
        self.ensure_active()?;
        let path = super::storage::portfolio_path(owner, name);
        storage.remove(&[path]).map_err(AttachmentError::from)?;
        self.draft.attachments.retain(|meta| meta.name != name);
        Ok(())
    }

    /// Final confirmation from the review step. The in-flight phase guards
    /// against a second submit; success clears the stored draft and the
    /// wizard becomes terminal. On failure the wizard stays on the review
    /// step with the draft intact so the user may retry.
    pub fn submit<R, N>(
        &mut self,
        service: &ArtistApplicationService<R, N>,
        artist_id: &UserId,
    ) -> Result<ArtistApplication, WizardError>
    where
        R: ArtistRepository + 'static,
        N: Notifier + 'static,
    {
        match self.phase {
            WizardPhase::Editing => {}
            WizardPhase::Submitting => return Err(WizardError::InFlight),
            WizardPhase::Submitted => return Err(WizardError::AlreadySubmitted),
            WizardPhase::Abandoned => return Err(WizardError::Abandoned),
        }
        if self.draft.current_step != TOTAL_STEPS {
            return Err(WizardError::NotOnReviewStep {
                step: self.draft.current_step,
            });
        }

        self.phase = WizardPhase::Submitting;
        match service.submit(self.draft.clone(), artist_id) {
            Ok(record) => {
                self.store.clear();
                self.phase = WizardPhase::Submitted;
                Ok(record)
            }
            Err(err) => {
                self.phase = WizardPhase::Editing;
                Err(WizardError::Submission(err))
            }
        }
    }

    /// Explicit lifecycle signal for navigation-away: an abandoned wizard
    /// refuses every further transition, so a stale instance cannot submit
    /// against old state.
    pub fn abandon(&mut self) {
        if self.phase == WizardPhase::Editing {
            self.phase = WizardPhase::Abandoned;
        }
    }

    fn ensure_active(&self) -> Result<(), WizardError> {
        match self.phase {
            WizardPhase::Editing => Ok(()),
            WizardPhase::Submitting => Err(WizardError::InFlight),
            WizardPhase::Submitted => Err(WizardError::AlreadySubmitted),
            WizardPhase::Abandoned => Err(WizardError::Abandoned),
        }
    }

    fn persist(&mut self) -> DateTime<Utc> {
        let saved_at = self.store.save(&self.draft);
        self.draft.last_saved_at = Some(saved_at);
        self.last_saved_at = Some(saved_at);
        saved_at
    }
}
