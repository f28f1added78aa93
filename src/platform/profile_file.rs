//! JSON file implementation of the profile store
//!
//! The document is a flat object keyed by host:
//!
//! ```json
//! { "10.0.0.5": { "host": "10.0.0.5", "mac": "AA:BB:CC:DD:EE:FF", "user": "u", "password": "p", "port": 22 } }
//! ```
//!
//! SECURITY: passwords are stored in plain text; restrict access to the
//! state directory.

use crate::core::ProfileStore;
use crate::models::HostProfile;
use crate::utils::StoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

type ProfileMap = BTreeMap<String, HostProfile>;

pub struct JsonProfileStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<ProfileMap, StoreError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ProfileMap::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(ProfileMap::new());
        }
        serde_json::from_str(&contents)
            .map_err(|e| StoreError::Parse(format!("{}: {}", self.path.display(), e)))
    }

    async fn save(&self, profiles: &ProfileMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let contents = serde_json::to_string_pretty(profiles)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        fs::write(&self.path, contents).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for JsonProfileStore {
    async fn get(&self, host: &str) -> Result<Option<HostProfile>, StoreError> {
        let host = host.trim();
        if host.is_empty() {
            return Ok(None);
        }
        Ok(self.load().await?.remove(host))
    }

    async fn put(&self, profile: &HostProfile) -> Result<bool, StoreError> {
        if !profile.is_addressable() {
            tracing::warn!("Ignoring PC settings without a host");
            return Ok(false);
        }

        let mut stored = profile.clone();
        stored.host = profile.host.trim().to_string();

        let _guard = self.write_lock.lock().await;
        let mut profiles = self.load().await?;
        let host = stored.name().to_string();
        profiles.insert(host.clone(), stored);
        self.save(&profiles).await?;
        tracing::info!(%host, "Saved PC settings");
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<HostProfile>, StoreError> {
        Ok(self.load().await?.into_values().collect())
    }

    async fn reset_all(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.save(&ProfileMap::new()).await?;
        tracing::info!(path = %self.path.display(), "Reset all PC settings");
        Ok(())
    }
}
