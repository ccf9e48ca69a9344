use async_trait::async_trait;

use crate::error::KetraError;
use crate::n4::state::{GroupContent, StateUpdate};

pub mod discovery;
pub mod https;

/// Capability the N4 transport layer provides to the device model.
///
/// The model never talks to the network directly; it fetches snapshots and
/// pushes state writes through this trait, so tests can substitute a stub.
#[async_trait]
pub trait N4Transport: Send + Sync {
    /// Fetch the raw groups envelope body, verbatim, so it can be cached
    /// on disk as retrieved.
    async fn fetch_groups(&self) -> Result<String, KetraError>;

    /// Fetch the current state of one group by display name.
    async fn get_group(&self, name: &str) -> Result<GroupContent, KetraError>;

    /// Push a state write to one group by display name.
    async fn put_group_state(&self, name: &str, update: &StateUpdate) -> Result<(), KetraError>;
}
