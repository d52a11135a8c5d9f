//! Profile persistence behind a storage trait, with an in-memory
//! implementation keyed both by profile id and by canonical URL hash.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use showreel_common::{Profile, ShowreelError};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Profile>, ShowreelError>;

    /// Lookup by canonical URL fingerprint. Backs the at-most-one
    /// profile per URL guarantee.
    async fn get_by_url_hash(&self, url_hash: &str) -> Result<Option<Profile>, ShowreelError>;

    /// Insert or replace. A profile with an already-stored url_hash
    /// replaces the previous record for that URL.
    async fn put(&self, profile: Profile) -> Result<(), ShowreelError>;

    /// All profiles, newest first.
    async fn list(&self) -> Result<Vec<Profile>, ShowreelError>;

    /// Override one project's cover image and lock it against
    /// automated replacement. Returns the updated profile.
    async fn patch_project_cover_image(
        &self,
        profile_id: &str,
        project_id: &str,
        cover_image: &str,
    ) -> Result<Profile, ShowreelError>;
}

#[derive(Default)]
struct Inner {
    profiles: HashMap<String, Profile>,
    by_hash: HashMap<String, String>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Profile>, ShowreelError> {
        Ok(self.inner.read().await.profiles.get(id).cloned())
    }

    async fn get_by_url_hash(&self, url_hash: &str) -> Result<Option<Profile>, ShowreelError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_hash
            .get(url_hash)
            .and_then(|id| inner.profiles.get(id))
            .cloned())
    }

    async fn put(&self, profile: Profile) -> Result<(), ShowreelError> {
        let mut inner = self.inner.write().await;
        if let Some(previous_id) = inner.by_hash.get(&profile.url_hash).cloned() {
            if previous_id != profile.id {
                inner.profiles.remove(&previous_id);
            }
        }
        inner
            .by_hash
            .insert(profile.url_hash.clone(), profile.id.clone());
        inner.profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Profile>, ShowreelError> {
        let inner = self.inner.read().await;
        let mut profiles: Vec<Profile> = inner.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    async fn patch_project_cover_image(
        &self,
        profile_id: &str,
        project_id: &str,
        cover_image: &str,
    ) -> Result<Profile, ShowreelError> {
        let mut inner = self.inner.write().await;
        let profile = inner
            .profiles
            .get_mut(profile_id)
            .ok_or_else(|| ShowreelError::NotFound(format!("profile {profile_id}")))?;
        let project = profile
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| ShowreelError::NotFound(format!("project {project_id}")))?;

        project.cover_image = Some(cover_image.to_string());
        project.cover_image_locked = true;
        info!(profile_id, project_id, "Cover image overridden and locked");
        Ok(profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_profile;

    #[tokio::test]
    async fn put_then_get_by_id_and_hash() {
        let store = MemoryStore::new();
        let profile = sample_profile("p1", "hash1");
        store.put(profile.clone()).await.unwrap();

        assert!(store.get("p1").await.unwrap().is_some());
        let by_hash = store.get_by_url_hash("hash1").await.unwrap().unwrap();
        assert_eq!(by_hash.id, "p1");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn regeneration_replaces_the_previous_record_for_a_url() {
        let store = MemoryStore::new();
        store.put(sample_profile("p1", "hash1")).await.unwrap();
        store.put(sample_profile("p2", "hash1")).await.unwrap();

        assert!(store.get("p1").await.unwrap().is_none());
        assert_eq!(
            store.get_by_url_hash("hash1").await.unwrap().unwrap().id,
            "p2"
        );
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn patch_sets_and_locks_the_cover_image() {
        let store = MemoryStore::new();
        store.put(sample_profile("p1", "hash1")).await.unwrap();

        let updated = store
            .patch_project_cover_image("p1", "project-0", "https://img.example/cover.jpg")
            .await
            .unwrap();
        let project = &updated.projects[0];
        assert_eq!(project.cover_image.as_deref(), Some("https://img.example/cover.jpg"));
        assert!(project.cover_image_locked);

        let reread = store.get("p1").await.unwrap().unwrap();
        assert!(reread.projects[0].cover_image_locked);
    }

    #[tokio::test]
    async fn patch_unknown_ids_is_not_found() {
        let store = MemoryStore::new();
        store.put(sample_profile("p1", "hash1")).await.unwrap();

        assert!(matches!(
            store
                .patch_project_cover_image("nope", "project-0", "x")
                .await,
            Err(ShowreelError::NotFound(_))
        ));
        assert!(matches!(
            store.patch_project_cover_image("p1", "nope", "x").await,
            Err(ShowreelError::NotFound(_))
        ));
    }
}
