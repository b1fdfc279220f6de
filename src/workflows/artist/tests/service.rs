use std::sync::Arc;

use super::common::*;
use crate::workflows::artist::domain::{ApplicationId, ApplicationStatus, UserId};
use crate::workflows::artist::repository::{ArtistRepository, RepositoryError};
use crate::workflows::artist::service::{
    ArtistApplicationService, NotificationStatus, ReviewError, SubmissionError,
};

fn reviewer() -> UserId {
    UserId("admin-iris".to_string())
}

#[test]
fn submission_ids_are_anchored_to_the_clock() {
    let (service, _, _) = build_service();

    let before = chrono::Utc::now().timestamp_micros();
    let first = service
        .submit(complete_draft(), &artist())
        .expect("first submit");
    let second = service
        .submit(complete_draft(), &artist())
        .expect("second submit");
    let after = chrono::Utc::now().timestamp_micros();

    assert_ne!(first.id, second.id);

    // A restarted process starts its counter over; the clock component is
    // what keeps fresh ids from colliding with persisted rows.
    let mut parts = first.id.0.splitn(3, '-');
    assert_eq!(parts.next(), Some("app"));
    let clock = parts.next().expect("clock component");
    let micros = i64::from_str_radix(clock, 16).expect("hex timestamp");
    assert!(micros >= before && micros <= after);
    assert!(parts.next().is_some());
}

#[test]
fn submit_stores_a_pending_snapshot() {
    let (service, repository, _) = build_service();

    let record = service
        .submit(complete_draft(), &artist())
        .expect("submit succeeds");

    assert_eq!(record.status, ApplicationStatus::Pending);
    assert_eq!(record.artist_id, artist());
    assert!(record.reviewed_at.is_none());

    let stored = repository
        .fetch_application(&record.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.snapshot.identity.stage_name, "Nova R".to_string());
}

#[test]
fn incomplete_draft_is_rejected_before_any_write() {
    let (service, repository, notifier) = build_service();
    let mut draft = complete_draft();
    draft.identity.stage_name = String::new();
    draft.narrative.artist_statement = String::new();

    match service.submit(draft, &artist()) {
        Err(SubmissionError::Incomplete { missing }) => {
            assert_eq!(missing, vec!["stageName", "artistStatement"]);
        }
        other => panic!("expected incomplete submission, got {other:?}"),
    }

    assert!(repository
        .pending_applications(10)
        .expect("pending query succeeds")
        .is_empty());
    assert!(notifier.sent().is_empty());
}

#[test]
fn pending_lists_newest_submissions_first() {
    let (service, _, _) = build_service();

    let first = service
        .submit(complete_draft(), &UserId("artist-a".to_string()))
        .expect("first submit");
    let second = service
        .submit(complete_draft(), &UserId("artist-b".to_string()))
        .expect("second submit");

    let pending = service.pending(10).expect("pending query succeeds");
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].id, second.id);
    assert_eq!(pending[1].id, first.id);

    let limited = service.pending(1).expect("limited query succeeds");
    assert_eq!(limited.len(), 1);
}

#[test]
fn approve_materializes_a_verified_profile() {
    let (service, repository, notifier) = build_service();
    let record = service
        .submit(complete_draft(), &artist())
        .expect("submit succeeds");

    let outcome = service
        .approve(&record.id, &reviewer())
        .expect("approve succeeds");

    assert_eq!(outcome.application.status, ApplicationStatus::Approved);
    assert_eq!(outcome.application.reviewed_by, Some(reviewer()));
    assert!(outcome.application.reviewed_at.is_some());
    assert_eq!(outcome.notification, NotificationStatus::Sent);

    assert_eq!(outcome.profile.stage_name, "Nova R".to_string());
    assert_eq!(outcome.profile.genres, vec!["electronic".to_string()]);
    assert_eq!(outcome.profile.experience_years, 9);
    assert!(outcome.profile.verified);

    let stored_profile = repository
        .fetch_profile(&artist())
        .expect("profile fetch succeeds")
        .expect("profile present");
    assert_eq!(stored_profile, outcome.profile);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "nova@example.com".to_string());
    assert_eq!(
        sent[0].subject,
        "Your EventFlow Artist Application has been Approved!".to_string()
    );
}

#[test]
fn approval_survives_a_failed_notification() {
    let repository = Arc::new(crate::backend::memory::MemoryArtistRepository::default());
    let service = ArtistApplicationService::new(repository.clone(), Arc::new(FailingNotifier));

    let record = service
        .submit(complete_draft(), &artist())
        .expect("submit succeeds");
    let outcome = service
        .approve(&record.id, &reviewer())
        .expect("approve succeeds despite notifier");

    assert!(matches!(
        outcome.notification,
        NotificationStatus::Failed(_)
    ));
    let stored = repository
        .fetch_application(&record.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, ApplicationStatus::Approved);
}

#[test]
fn reject_records_the_reason_and_notifies() {
    let (service, repository, notifier) = build_service();
    let record = service
        .submit(complete_draft(), &artist())
        .expect("submit succeeds");

    let outcome = service
        .reject(&record.id, &reviewer(), "Portfolio does not match our lineup")
        .expect("reject succeeds");

    assert_eq!(outcome.application.status, ApplicationStatus::Rejected);
    assert_eq!(
        outcome.application.reviewer_notes,
        Some("Portfolio does not match our lineup".to_string())
    );

    let stored = repository
        .fetch_application(&record.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, ApplicationStatus::Rejected);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].subject,
        "EventFlow Artist Application Update".to_string()
    );
    assert!(sent[0].html.contains("Portfolio does not match our lineup"));
}

#[test]
fn second_review_is_rejected_as_already_reviewed() {
    let (service, _, _) = build_service();
    let record = service
        .submit(complete_draft(), &artist())
        .expect("submit succeeds");

    service
        .approve(&record.id, &reviewer())
        .expect("first review succeeds");

    match service.reject(&record.id, &reviewer(), "changed my mind") {
        Err(ReviewError::AlreadyReviewed {
            status: ApplicationStatus::Approved,
        }) => {}
        other => panic!("expected already-reviewed error, got {other:?}"),
    }
}

#[test]
fn get_propagates_not_found() {
    let (service, _, _) = build_service();

    match service.get(&ApplicationId("app-missing".to_string())) {
        Err(ReviewError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found error, got {other:?}"),
    }
}

#[test]
fn rejection_email_escapes_reviewer_markup() {
    let (service, _, notifier) = build_service();
    let record = service
        .submit(complete_draft(), &artist())
        .expect("submit succeeds");

    service
        .reject(&record.id, &reviewer(), "<script>alert('no')</script>")
        .expect("reject succeeds");

    let sent = notifier.sent();
    assert!(sent[0].html.contains("&lt;script&gt;"));
    assert!(!sent[0].html.contains("<script>"));
}
