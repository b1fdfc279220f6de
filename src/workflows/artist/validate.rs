use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::domain::ApplicationDraft;

/// Field-level validation messages keyed by the snapshot field name. An empty
/// map means the step is valid.
pub type FieldErrors = BTreeMap<String, String>;

pub const MINIMUM_AGE_YEARS: u32 = 18;
pub const MINIMUM_BIO_CHARS: usize = 100;
pub const MINIMUM_STATEMENT_CHARS: usize = 50;

/// The fixed checklist gating submission; spans wizard steps one through four.
pub const REQUIRED_FIELDS: [&str; 10] = [
    "firstName",
    "lastName",
    "stageName",
    "email",
    "phone",
    "primaryGenre",
    "primaryInstrument",
    "experienceLevel",
    "bio",
    "artistStatement",
];

const TOTAL_OPTIONAL_SECTIONS: usize = 4;

/// Validate one wizard step. Pure: no I/O, the draft is never mutated.
/// `today` anchors the age computation so callers and tests control the clock.
pub fn validate_step(step: u8, draft: &ApplicationDraft, today: NaiveDate) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match step {
        1 => validate_identity(draft, today, &mut errors),
        2 => validate_background(draft, &mut errors),
        3 => validate_portfolio(draft, &mut errors),
        4 => validate_narrative(draft, &mut errors),
        // File uploads are optional; the review step defers to the
        // submission-side completeness check.
        _ => {}
    }

    errors
}

fn validate_identity(draft: &ApplicationDraft, today: NaiveDate, errors: &mut FieldErrors) {
    let identity = &draft.identity;
    require(errors, "firstName", &identity.first_name, "First name is required");
    require(errors, "lastName", &identity.last_name, "Last name is required");
    require(
        errors,
        "stageName",
        &identity.stage_name,
        "Stage/Artist name is required",
    );

    if is_blank(&identity.email) {
        errors.insert("email".to_string(), "Email is required".to_string());
    } else if !looks_like_email(&identity.email) {
        errors.insert("email".to_string(), "Invalid email format".to_string());
    }

    require(errors, "phone", &identity.phone, "Phone number is required");
    require(errors, "address", &identity.address, "Address is required");
    require(errors, "city", &identity.city, "City is required");
    require(errors, "state", &identity.state, "State is required");
    require(errors, "zipCode", &identity.zip_code, "ZIP code is required");
    require(errors, "country", &identity.country, "Country is required");

    if is_blank(&identity.date_of_birth) {
        errors.insert(
            "dateOfBirth".to_string(),
            "Date of birth is required".to_string(),
        );
    } else {
        match NaiveDate::parse_from_str(identity.date_of_birth.trim(), "%Y-%m-%d") {
            Ok(birth_date) => {
                let age = today.years_since(birth_date).unwrap_or(0);
                if age < MINIMUM_AGE_YEARS {
                    errors.insert(
                        "dateOfBirth".to_string(),
                        "Must be 18 years or older".to_string(),
                    );
                }
            }
            Err(_) => {
                errors.insert(
                    "dateOfBirth".to_string(),
                    "Enter date of birth as YYYY-MM-DD".to_string(),
                );
            }
        }
    }
}

fn validate_background(draft: &ApplicationDraft, errors: &mut FieldErrors) {
    let background = &draft.background;
    require(
        errors,
        "primaryGenre",
        &background.primary_genre,
        "Primary genre is required",
    );
    require(
        errors,
        "primaryInstrument",
        &background.primary_instrument,
        "Primary instrument is required",
    );

    if background.experience_level.is_none() {
        errors.insert(
            "experienceLevel".to_string(),
            "Experience level is required".to_string(),
        );
    }
    if background.performance_type.is_none() {
        errors.insert(
            "performanceType".to_string(),
            "Performance type is required".to_string(),
        );
    }
    if background.years_of_experience.is_none() {
        errors.insert(
            "yearsOfExperience".to_string(),
            "Years of experience is required".to_string(),
        );
    }
    if background.performance_experience.is_empty() {
        errors.insert(
            "performanceExperience".to_string(),
            "Select at least one performance experience".to_string(),
        );
    }
}

fn validate_portfolio(draft: &ApplicationDraft, errors: &mut FieldErrors) {
    let first_is_usable = draft
        .portfolio_links
        .first()
        .map(|link| !is_blank(&link.platform) && !is_blank(&link.url))
        .unwrap_or(false);

    if !first_is_usable {
        errors.insert(
            "portfolioLinks".to_string(),
            "At least one portfolio link is required".to_string(),
        );
    }

    // Every entry with a URL must match the pattern, wherever it sits.
    for (index, link) in draft.portfolio_links.iter().enumerate() {
        if !is_blank(&link.url) && !is_valid_url(&link.url) {
            errors.insert(
                format!("portfolioLinks.{index}.url"),
                "Please enter a valid URL".to_string(),
            );
        }
    }
}

fn validate_narrative(draft: &ApplicationDraft, errors: &mut FieldErrors) {
    let narrative = &draft.narrative;

    if is_blank(&narrative.bio) {
        errors.insert("bio".to_string(), "Artist bio is required".to_string());
    } else if narrative.bio.chars().count() < MINIMUM_BIO_CHARS {
        errors.insert(
            "bio".to_string(),
            "Bio must be at least 100 characters".to_string(),
        );
    }

    if is_blank(&narrative.artist_statement) {
        errors.insert(
            "artistStatement".to_string(),
            "Artist statement is required".to_string(),
        );
    } else if narrative.artist_statement.chars().count() < MINIMUM_STATEMENT_CHARS {
        errors.insert(
            "artistStatement".to_string(),
            "Statement must be at least 50 characters".to_string(),
        );
    }
}

/// Required/optional completion counters surfaced on the review step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionStats {
    pub required: usize,
    pub total_required: usize,
    pub optional: usize,
    pub total_optional: usize,
}

impl CompletionStats {
    pub fn is_complete(&self) -> bool {
        self.required == self.total_required
    }
}

pub fn completion_stats(draft: &ApplicationDraft) -> CompletionStats {
    let missing = missing_required(draft);
    let optional = [
        !draft.portfolio_links.is_empty(),
        !draft.attachments.is_empty(),
        !is_blank(&draft.narrative.musical_influences),
        !is_blank(&draft.narrative.career_highlights),
    ]
    .iter()
    .filter(|present| **present)
    .count();

    CompletionStats {
        required: REQUIRED_FIELDS.len() - missing.len(),
        total_required: REQUIRED_FIELDS.len(),
        optional,
        total_optional: TOTAL_OPTIONAL_SECTIONS,
    }
}

/// Names from [`REQUIRED_FIELDS`] that are still blank in the draft.
pub fn missing_required(draft: &ApplicationDraft) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !required_field_present(draft, field))
        .collect()
}

fn required_field_present(draft: &ApplicationDraft, field: &str) -> bool {
    match field {
        "firstName" => !is_blank(&draft.identity.first_name),
        "lastName" => !is_blank(&draft.identity.last_name),
        "stageName" => !is_blank(&draft.identity.stage_name),
        "email" => !is_blank(&draft.identity.email),
        "phone" => !is_blank(&draft.identity.phone),
        "primaryGenre" => !is_blank(&draft.background.primary_genre),
        "primaryInstrument" => !is_blank(&draft.background.primary_instrument),
        "experienceLevel" => draft.background.experience_level.is_some(),
        "bio" => !is_blank(&draft.narrative.bio),
        "artistStatement" => !is_blank(&draft.narrative.artist_statement),
        _ => false,
    }
}

fn require(errors: &mut FieldErrors, key: &str, value: &str, message: &str) {
    if is_blank(value) {
        errors.insert(key.to_string(), message.to_string());
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Loose `local@domain.tld` shape; intentionally not a full RFC parser.
fn looks_like_email(value: &str) -> bool {
    let trimmed = value.trim();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Matches the `^https?://.+` rule applied to portfolio URLs.
fn is_valid_url(value: &str) -> bool {
    let trimmed = value.trim();
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    matches!(rest, Some(tail) if !tail.is_empty())
}
