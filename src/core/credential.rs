//! Platform-agnostic host profile storage trait

use crate::models::HostProfile;
use crate::utils::StoreError;
use async_trait::async_trait;

/// Persistent mapping from host name to [`HostProfile`]
///
/// The core never reads the store itself; the front-end resolves a profile
/// and hands it to the dispatcher by value.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up a profile by host name
    ///
    /// # Returns
    /// * `Ok(Some(profile))` - If the host is configured
    /// * `Ok(None)` - If no profile is stored (not an error)
    /// * `Err(StoreError)` - If the store could not be read
    async fn get(&self, host: &str) -> Result<Option<HostProfile>, StoreError>;

    /// Insert or replace the profile under its host name
    ///
    /// # Returns
    /// * `Ok(true)` - The profile was written
    /// * `Ok(false)` - The profile has an empty host and was ignored
    async fn put(&self, profile: &HostProfile) -> Result<bool, StoreError>;

    /// All stored profiles, ordered by host name
    async fn list(&self) -> Result<Vec<HostProfile>, StoreError>;

    /// Forget every profile
    async fn reset_all(&self) -> Result<(), StoreError>;
}
