use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

use crate::workflows::artist::domain::{
    ApplicationId, ApplicationStatus, ArtistApplication, ArtistProfile, UserId,
};
use crate::workflows::artist::repository::{
    ArtistRepository, EmailMessage, Notifier, NotifyError, RepositoryError,
};
use crate::workflows::artist::storage::{PortfolioStorage, StorageError, StoredObject};

/// Process-local repository. Backs the demo command and any deployment
/// without Supabase credentials; everything is lost on restart.
#[derive(Default)]
pub struct MemoryArtistRepository {
    applications: Mutex<HashMap<ApplicationId, ArtistApplication>>,
    profiles: Mutex<HashMap<UserId, ArtistProfile>>,
}

impl ArtistRepository for MemoryArtistRepository {
    fn insert_application(
        &self,
        record: ArtistApplication,
    ) -> Result<ArtistApplication, RepositoryError> {
        let mut applications = self
            .applications
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        if applications.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        applications.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ArtistApplication>, RepositoryError> {
        let applications = self
            .applications
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        Ok(applications.get(id).cloned())
    }

    fn pending_applications(&self, limit: usize) -> Result<Vec<ArtistApplication>, RepositoryError> {
        let applications = self
            .applications
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        let mut pending: Vec<ArtistApplication> = applications
            .values()
            .filter(|record| record.status == ApplicationStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        pending.truncate(limit);
        Ok(pending)
    }

    fn update_application(
        &self,
        record: ArtistApplication,
        expected: ApplicationStatus,
    ) -> Result<(), RepositoryError> {
        let mut applications = self
            .applications
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        let stored = applications
            .get(&record.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::Conflict);
        }
        applications.insert(record.id.clone(), record);
        Ok(())
    }

    fn insert_profile(&self, profile: ArtistProfile) -> Result<ArtistProfile, RepositoryError> {
        let mut profiles = self
            .profiles
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        profiles.insert(profile.artist_id.clone(), profile.clone());
        Ok(profile)
    }

    fn fetch_profile(&self, artist_id: &UserId) -> Result<Option<ArtistProfile>, RepositoryError> {
        let profiles = self
            .profiles
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        Ok(profiles.get(artist_id).cloned())
    }
}

/// Notifier that writes the would-be email to the log instead of sending it.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, message: EmailMessage) -> Result<(), NotifyError> {
        info!(to = %message.to, subject = %message.subject, "email suppressed (no mail provider configured)");
        Ok(())
    }
}

/// Blob storage stand-in keyed by object path.
#[derive(Default)]
pub struct MemoryPortfolioStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl PortfolioStorage for MemoryPortfolioStorage {
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| StorageError::Backend("storage mutex poisoned".to_string()))?;
        objects.insert(path.to_string(), bytes.to_vec());
        Ok(format!("memory://artist-portfolios/{path}"))
    }

    fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
        let objects = self
            .objects
            .lock()
            .map_err(|_| StorageError::Backend("storage mutex poisoned".to_string()))?;
        let mut entries: Vec<StoredObject> = objects
            .keys()
            .filter(|path| path.starts_with(prefix))
            .map(|path| StoredObject {
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                path: path.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn remove(&self, paths: &[String]) -> Result<(), StorageError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| StorageError::Backend("storage mutex poisoned".to_string()))?;
        for path in paths {
            objects.remove(path);
        }
        Ok(())
    }
}
