//! Interfaces to the collaborators this crate consumes.
//!
//! The engine is a pure function of its arguments plus one external lookup;
//! everything that touches a database, a request context, or mutable global
//! configuration lives behind these traits. Callers must take a single
//! consistent `SiteConfig`/`AuthzProviderSet` snapshot per computation
//! rather than re-reading live configuration partway through.

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::types::{Actor, AuthzProviderSet, SiteConfig, User, UserId};

/// Lookup of user records, typically database-backed. The only suspension
/// point in a decision; dropping the returned future cancels the lookup and
/// the computation produces no partial decision. Retry policy, if any,
/// belongs to the implementation, never to the engine.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: UserId) -> Result<User, StoreError>;
}

/// Yields the actor attached to the current request.
pub trait ActorContextProvider {
    fn current_actor(&self) -> Actor;
}

/// Yields a point-in-time snapshot of the site authorization settings.
pub trait ConfigSnapshotProvider {
    fn site_config(&self) -> SiteConfig;
}

/// Yields the currently-configured authorization providers and the
/// default-allow flag, as one consistent snapshot.
pub trait AuthzProviderRegistry {
    fn providers(&self) -> AuthzProviderSet;
}
