use super::common::*;
use crate::workflows::artist::domain::PortfolioLink;
use crate::workflows::artist::validate::{
    completion_stats, missing_required, validate_step, MINIMUM_BIO_CHARS,
    MINIMUM_STATEMENT_CHARS, REQUIRED_FIELDS,
};

#[test]
fn identity_step_requires_stage_name() {
    let mut draft = complete_draft();
    draft.identity.stage_name = "  ".to_string();

    let errors = validate_step(1, &draft, today());

    assert_eq!(
        errors.get("stageName").map(String::as_str),
        Some("Stage/Artist name is required")
    );
    assert_eq!(errors.len(), 1);
}

#[test]
fn identity_step_accepts_complete_details() {
    let draft = complete_draft();
    assert!(validate_step(1, &draft, today()).is_empty());
}

#[test]
fn email_shape_is_checked_after_presence() {
    let mut draft = complete_draft();
    draft.identity.email = String::new();
    let errors = validate_step(1, &draft, today());
    assert_eq!(
        errors.get("email").map(String::as_str),
        Some("Email is required")
    );

    draft.identity.email = "nova-at-example.com".to_string();
    let errors = validate_step(1, &draft, today());
    assert_eq!(
        errors.get("email").map(String::as_str),
        Some("Invalid email format")
    );

    draft.identity.email = "nova@localhost".to_string();
    let errors = validate_step(1, &draft, today());
    assert_eq!(
        errors.get("email").map(String::as_str),
        Some("Invalid email format")
    );
}

#[test]
fn applicant_turning_eighteen_today_passes() {
    let mut draft = complete_draft();
    draft.identity.date_of_birth = "2008-08-27".to_string();

    let errors = validate_step(1, &draft, today());

    assert!(!errors.contains_key("dateOfBirth"));
}

#[test]
fn applicant_one_day_short_of_eighteen_fails() {
    let mut draft = complete_draft();
    draft.identity.date_of_birth = "2008-08-28".to_string();

    let errors = validate_step(1, &draft, today());

    assert_eq!(
        errors.get("dateOfBirth").map(String::as_str),
        Some("Must be 18 years or older")
    );
}

#[test]
fn unparseable_birth_date_is_reported() {
    let mut draft = complete_draft();
    draft.identity.date_of_birth = "12/04/1994".to_string();

    let errors = validate_step(1, &draft, today());

    assert_eq!(
        errors.get("dateOfBirth").map(String::as_str),
        Some("Enter date of birth as YYYY-MM-DD")
    );
}

#[test]
fn background_step_requires_performance_experience() {
    let mut draft = complete_draft();
    draft.background.performance_experience.clear();

    let errors = validate_step(2, &draft, today());

    assert_eq!(
        errors.get("performanceExperience").map(String::as_str),
        Some("Select at least one performance experience")
    );
}

#[test]
fn portfolio_step_requires_one_usable_link() {
    let mut draft = complete_draft();
    draft.portfolio_links.clear();

    let errors = validate_step(3, &draft, today());

    assert_eq!(
        errors.get("portfolioLinks").map(String::as_str),
        Some("At least one portfolio link is required")
    );
}

#[test]
fn portfolio_urls_are_validated_by_position() {
    let mut draft = complete_draft();
    draft.portfolio_links.push(PortfolioLink {
        platform: "Bandcamp".to_string(),
        url: "bandcamp.com/nova-r".to_string(),
        description: String::new(),
    });

    let errors = validate_step(3, &draft, today());

    assert!(!errors.contains_key("portfolioLinks"));
    assert_eq!(
        errors.get("portfolioLinks.1.url").map(String::as_str),
        Some("Please enter a valid URL")
    );
}

#[test]
fn narrative_lengths_are_inclusive_boundaries() {
    let mut draft = complete_draft();

    draft.narrative.bio = "b".repeat(MINIMUM_BIO_CHARS);
    draft.narrative.artist_statement = "s".repeat(MINIMUM_STATEMENT_CHARS);
    assert!(validate_step(4, &draft, today()).is_empty());

    draft.narrative.bio = "b".repeat(MINIMUM_BIO_CHARS - 1);
    draft.narrative.artist_statement = "s".repeat(MINIMUM_STATEMENT_CHARS - 1);
    let errors = validate_step(4, &draft, today());
    assert_eq!(
        errors.get("bio").map(String::as_str),
        Some("Bio must be at least 100 characters")
    );
    assert_eq!(
        errors.get("artistStatement").map(String::as_str),
        Some("Statement must be at least 50 characters")
    );
}

#[test]
fn upload_and_review_steps_have_no_validators() {
    let draft = crate::workflows::artist::domain::ApplicationDraft::new();
    assert!(validate_step(5, &draft, today()).is_empty());
    assert!(validate_step(6, &draft, today()).is_empty());
}

#[test]
fn completion_stats_track_required_and_optional_sections() {
    let draft = complete_draft();
    let stats = completion_stats(&draft);

    assert!(stats.is_complete());
    assert_eq!(stats.required, REQUIRED_FIELDS.len());
    // Portfolio links are present; influences, highlights, and attachments
    // are not.
    assert_eq!(stats.optional, 1);
    assert_eq!(stats.total_optional, 4);
}

#[test]
fn missing_required_lists_blank_checklist_fields() {
    let mut draft = complete_draft();
    draft.identity.stage_name = String::new();
    draft.narrative.bio = String::new();

    let missing = missing_required(&draft);

    assert_eq!(missing, vec!["stageName", "bio"]);
}
