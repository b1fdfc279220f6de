//! Supabase client covering the three collaborator traits: PostgREST for the
//! application and profile tables, GoTrue for authentication, and the storage
//! API for portfolio files.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::SupabaseConfig;
use crate::session::{
    AuthError, AuthGateway, Credentials, Identity, SignUpAttributes, UserProfile, UserRole,
};
use crate::workflows::artist::domain::{
    ApplicationDraft, ApplicationId, ApplicationStatus, ArtistApplication, ArtistProfile,
    PortfolioLink, UserId,
};
use crate::workflows::artist::repository::{ArtistRepository, RepositoryError};
use crate::workflows::artist::storage::{PortfolioStorage, StorageError, StoredObject};

const PORTFOLIO_BUCKET: &str = "artist-portfolios";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct SupabaseClient {
    http: Client,
    base_url: String,
    service_key: String,
    access_token: Mutex<Option<String>>,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self, RepositoryError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
            access_token: Mutex::new(None),
        })
    }

    fn rest(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn with_service_headers(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    fn stored_token(&self) -> Option<String> {
        self.access_token
            .lock()
            .ok()
            .and_then(|token| token.clone())
    }

    fn store_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.access_token.lock() {
            *slot = token;
        }
    }
}

/// Wire row for `artist_applications`.
#[derive(Debug, Serialize, Deserialize)]
struct ApplicationRow {
    id: String,
    artist_id: String,
    status: String,
    submitted_at: chrono::DateTime<chrono::Utc>,
    reviewed_at: Option<chrono::DateTime<chrono::Utc>>,
    reviewed_by: Option<String>,
    admin_notes: Option<String>,
    application_data: serde_json::Value,
}

impl ApplicationRow {
    fn from_record(record: &ArtistApplication) -> Result<Self, RepositoryError> {
        let application_data = serde_json::to_value(&record.snapshot)
            .map_err(|err| RepositoryError::InvalidShape(err.to_string()))?;
        Ok(Self {
            id: record.id.0.clone(),
            artist_id: record.artist_id.0.clone(),
            status: record.status.label().to_string(),
            submitted_at: record.submitted_at,
            reviewed_at: record.reviewed_at,
            reviewed_by: record.reviewed_by.as_ref().map(|id| id.0.clone()),
            admin_notes: record.reviewer_notes.clone(),
            application_data,
        })
    }

    fn into_record(self) -> Result<ArtistApplication, RepositoryError> {
        let status = ApplicationStatus::parse(&self.status).ok_or_else(|| {
            RepositoryError::InvalidShape(format!("unknown application status '{}'", self.status))
        })?;
        let snapshot: ApplicationDraft = serde_json::from_value(self.application_data)
            .map_err(|err| RepositoryError::InvalidShape(err.to_string()))?;

        Ok(ArtistApplication {
            id: ApplicationId(self.id),
            artist_id: UserId(self.artist_id),
            status,
            submitted_at: self.submitted_at,
            reviewed_at: self.reviewed_at,
            reviewed_by: self.reviewed_by.map(UserId),
            reviewer_notes: self.admin_notes,
            snapshot,
        })
    }
}

/// Wire row for `artist_profiles`.
#[derive(Debug, Serialize, Deserialize)]
struct ProfileRow {
    artist_id: String,
    stage_name: String,
    bio: String,
    genres: Vec<String>,
    experience_years: u32,
    portfolio_links: Vec<PortfolioLink>,
    is_verified: bool,
}

impl ProfileRow {
    fn from_profile(profile: &ArtistProfile) -> Self {
        Self {
            artist_id: profile.artist_id.0.clone(),
            stage_name: profile.stage_name.clone(),
            bio: profile.bio.clone(),
            genres: profile.genres.clone(),
            experience_years: profile.experience_years,
            portfolio_links: profile.portfolio_links.clone(),
            is_verified: profile.verified,
        }
    }

    fn into_profile(self) -> ArtistProfile {
        ArtistProfile {
            artist_id: UserId(self.artist_id),
            stage_name: self.stage_name,
            bio: self.bio,
            genres: self.genres,
            experience_years: self.experience_years,
            portfolio_links: self.portfolio_links,
            verified: self.is_verified,
        }
    }
}

fn repository_transport(err: reqwest::Error) -> RepositoryError {
    RepositoryError::Unavailable(err.to_string())
}

impl ArtistRepository for SupabaseClient {
    fn insert_application(
        &self,
        record: ArtistApplication,
    ) -> Result<ArtistApplication, RepositoryError> {
        let row = ApplicationRow::from_record(&record)?;
        let response = self
            .with_service_headers(self.http.post(self.rest("artist_applications")))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .map_err(repository_transport)?;

        match response.status() {
            StatusCode::CONFLICT => Err(RepositoryError::Conflict),
            status if status.is_success() => {
                let mut rows: Vec<ApplicationRow> =
                    response.json().map_err(repository_transport)?;
                match rows.pop() {
                    Some(row) => row.into_record(),
                    None => Err(RepositoryError::InvalidShape(
                        "insert returned no rows".to_string(),
                    )),
                }
            }
            status => Err(RepositoryError::Unavailable(format!(
                "insert failed with status {status}"
            ))),
        }
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ArtistApplication>, RepositoryError> {
        let response = self
            .with_service_headers(self.http.get(self.rest("artist_applications")))
            .query(&[("id", format!("eq.{}", id.0)), ("select", "*".to_string())])
            .send()
            .map_err(repository_transport)?;

        if !response.status().is_success() {
            return Err(RepositoryError::Unavailable(format!(
                "fetch failed with status {}",
                response.status()
            )));
        }

        let mut rows: Vec<ApplicationRow> = response.json().map_err(repository_transport)?;
        rows.pop().map(ApplicationRow::into_record).transpose()
    }

    fn pending_applications(&self, limit: usize) -> Result<Vec<ArtistApplication>, RepositoryError> {
        let response = self
            .with_service_headers(self.http.get(self.rest("artist_applications")))
            .query(&[
                ("status", "eq.pending".to_string()),
                ("order", "submitted_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .map_err(repository_transport)?;

        if !response.status().is_success() {
            return Err(RepositoryError::Unavailable(format!(
                "pending query failed with status {}",
                response.status()
            )));
        }

        let rows: Vec<ApplicationRow> = response.json().map_err(repository_transport)?;
        rows.into_iter()
            .map(ApplicationRow::into_record)
            .collect()
    }

    fn update_application(
        &self,
        record: ArtistApplication,
        expected: ApplicationStatus,
    ) -> Result<(), RepositoryError> {
        let row = ApplicationRow::from_record(&record)?;
        // Conditional PATCH: the status filter makes the update a no-op when
        // another reviewer already moved the record, which surfaces as an
        // empty representation below.
        let response = self
            .with_service_headers(self.http.patch(self.rest("artist_applications")))
            .query(&[
                ("id", format!("eq.{}", record.id.0)),
                ("status", format!("eq.{}", expected.label())),
            ])
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .map_err(repository_transport)?;

        if !response.status().is_success() {
            return Err(RepositoryError::Unavailable(format!(
                "update failed with status {}",
                response.status()
            )));
        }

        let rows: Vec<ApplicationRow> = response.json().map_err(repository_transport)?;
        if rows.is_empty() {
            return Err(RepositoryError::Conflict);
        }
        Ok(())
    }

    fn insert_profile(&self, profile: ArtistProfile) -> Result<ArtistProfile, RepositoryError> {
        let row = ProfileRow::from_profile(&profile);
        let response = self
            .with_service_headers(self.http.post(self.rest("artist_profiles")))
            .header("Prefer", "return=representation,resolution=merge-duplicates")
            .json(&row)
            .send()
            .map_err(repository_transport)?;

        if !response.status().is_success() {
            return Err(RepositoryError::Unavailable(format!(
                "profile insert failed with status {}",
                response.status()
            )));
        }

        let mut rows: Vec<ProfileRow> = response.json().map_err(repository_transport)?;
        match rows.pop() {
            Some(row) => Ok(row.into_profile()),
            None => Err(RepositoryError::InvalidShape(
                "profile insert returned no rows".to_string(),
            )),
        }
    }

    fn fetch_profile(&self, artist_id: &UserId) -> Result<Option<ArtistProfile>, RepositoryError> {
        let response = self
            .with_service_headers(self.http.get(self.rest("artist_profiles")))
            .query(&[
                ("artist_id", format!("eq.{}", artist_id.0)),
                ("select", "*".to_string()),
            ])
            .send()
            .map_err(repository_transport)?;

        if !response.status().is_success() {
            return Err(RepositoryError::Unavailable(format!(
                "profile fetch failed with status {}",
                response.status()
            )));
        }

        let mut rows: Vec<ProfileRow> = response.json().map_err(repository_transport)?;
        Ok(rows.pop().map(ProfileRow::into_profile))
    }
}

/// GoTrue session payload; only the fields the session layer needs.
#[derive(Debug, Deserialize)]
struct AuthSession {
    access_token: Option<String>,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: String,
}

/// Wire row for the shared `profiles` table.
#[derive(Debug, Serialize, Deserialize)]
struct UserProfileRow {
    user_id: String,
    email: String,
    full_name: String,
    role: String,
}

fn auth_transport(err: reqwest::Error) -> AuthError {
    AuthError::Unavailable(err.to_string())
}

impl AuthGateway for SupabaseClient {
    fn register(&self, attributes: &SignUpAttributes) -> Result<Identity, AuthError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.service_key)
            .json(&json!({
                "email": attributes.email,
                "password": attributes.password,
            }))
            .send()
            .map_err(auth_transport)?;

        match response.status() {
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT => {
                Err(AuthError::DuplicateAccount)
            }
            status if status.is_success() => {
                let session: AuthSession = response.json().map_err(auth_transport)?;
                self.store_token(session.access_token);
                Ok(Identity {
                    user_id: session.user.id,
                    email: session.user.email,
                })
            }
            status => Err(AuthError::Unavailable(format!(
                "signup failed with status {status}"
            ))),
        }
    }

    fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let response = self
            .http
            .post(format!(
                "{}/auth/v1/token?grant_type=password",
                self.base_url
            ))
            .header("apikey", &self.service_key)
            .json(&json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .send()
            .map_err(auth_transport)?;

        match response.status() {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(AuthError::InvalidCredentials)
            }
            status if status.is_success() => {
                let session: AuthSession = response.json().map_err(auth_transport)?;
                self.store_token(session.access_token);
                Ok(Identity {
                    user_id: session.user.id,
                    email: session.user.email,
                })
            }
            status => Err(AuthError::Unavailable(format!(
                "token request failed with status {status}"
            ))),
        }
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        let token = match self.stored_token() {
            Some(token) => token,
            None => return Ok(()),
        };

        let response = self
            .http
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .map_err(auth_transport)?;
        self.store_token(None);

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AuthError::Unavailable(format!(
                "logout failed with status {}",
                response.status()
            )))
        }
    }

    fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AuthError> {
        let response = self
            .with_service_headers(self.http.get(self.rest("profiles")))
            .query(&[
                ("user_id", format!("eq.{user_id}")),
                ("select", "*".to_string()),
            ])
            .send()
            .map_err(auth_transport)?;

        if !response.status().is_success() {
            return Err(AuthError::Unavailable(format!(
                "profile fetch failed with status {}",
                response.status()
            )));
        }

        let mut rows: Vec<UserProfileRow> = response.json().map_err(auth_transport)?;
        let row = match rows.pop() {
            Some(row) => row,
            None => return Ok(None),
        };
        let role = UserRole::parse(&row.role)
            .ok_or_else(|| AuthError::InvalidShape(format!("unknown role '{}'", row.role)))?;

        Ok(Some(UserProfile {
            user_id: row.user_id,
            email: row.email,
            full_name: row.full_name,
            role,
        }))
    }

    fn upsert_profile(&self, profile: &UserProfile) -> Result<UserProfile, AuthError> {
        let row = UserProfileRow {
            user_id: profile.user_id.clone(),
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            role: profile.role.label().to_string(),
        };
        let response = self
            .with_service_headers(self.http.post(self.rest("profiles")))
            .header("Prefer", "return=representation,resolution=merge-duplicates")
            .json(&row)
            .send()
            .map_err(auth_transport)?;

        if !response.status().is_success() {
            return Err(AuthError::Unavailable(format!(
                "profile upsert failed with status {}",
                response.status()
            )));
        }

        let mut rows: Vec<UserProfileRow> = response.json().map_err(auth_transport)?;
        let row = rows.pop().ok_or_else(|| {
            AuthError::InvalidShape("profile upsert returned no rows".to_string())
        })?;
        let role = UserRole::parse(&row.role)
            .ok_or_else(|| AuthError::InvalidShape(format!("unknown role '{}'", row.role)))?;

        Ok(UserProfile {
            user_id: row.user_id,
            email: row.email,
            full_name: row.full_name,
            role,
        })
    }
}

#[derive(Debug, Deserialize)]
struct StorageEntry {
    name: String,
}

fn storage_transport(err: reqwest::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

impl PortfolioStorage for SupabaseClient {
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        let response = self
            .with_service_headers(self.http.post(format!(
                "{}/storage/v1/object/{PORTFOLIO_BUCKET}/{path}",
                self.base_url
            )))
            .header("Content-Type", content_type)
            .body(bytes.to_vec())
            .send()
            .map_err(storage_transport)?;

        if !response.status().is_success() {
            return Err(StorageError::Backend(format!(
                "upload failed with status {}",
                response.status()
            )));
        }

        Ok(format!(
            "{}/storage/v1/object/public/{PORTFOLIO_BUCKET}/{path}",
            self.base_url
        ))
    }

    fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
        let response = self
            .with_service_headers(self.http.post(format!(
                "{}/storage/v1/object/list/{PORTFOLIO_BUCKET}",
                self.base_url
            )))
            .json(&json!({ "prefix": prefix }))
            .send()
            .map_err(storage_transport)?;

        if !response.status().is_success() {
            return Err(StorageError::Backend(format!(
                "list failed with status {}",
                response.status()
            )));
        }

        let entries: Vec<StorageEntry> = response.json().map_err(storage_transport)?;
        Ok(entries
            .into_iter()
            .map(|entry| StoredObject {
                path: format!("{}/{}", prefix.trim_end_matches('/'), entry.name),
                name: entry.name,
            })
            .collect())
    }

    fn remove(&self, paths: &[String]) -> Result<(), StorageError> {
        let response = self
            .with_service_headers(self.http.delete(format!(
                "{}/storage/v1/object/{PORTFOLIO_BUCKET}",
                self.base_url
            )))
            .json(&json!({ "prefixes": paths }))
            .send()
            .map_err(storage_transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StorageError::Backend(format!(
                "remove failed with status {}",
                response.status()
            )))
        }
    }
}
