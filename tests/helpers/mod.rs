//! Shared fixtures for the end-to-end visibility tests.

use std::collections::HashMap;

use async_trait::async_trait;

use palisade::context::{AuthzProviderRegistry, ConfigSnapshotProvider, UserStore};
use palisade::errors::StoreError;
use palisade::render::MemoryCatalog;
use palisade::types::{AuthzProviderSet, ProviderHandle, RepoId, SiteConfig, User, UserId};

/// Map-backed user store; unknown ids fail the lookup.
pub struct InMemoryUserStore {
    users: HashMap<UserId, User>,
}

impl InMemoryUserStore {
    pub fn new(users: &[User]) -> Self {
        Self {
            users: users.iter().map(|u| (u.id, *u)).collect(),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_by_id(&self, id: UserId) -> Result<User, StoreError> {
        self.users
            .get(&id)
            .copied()
            .ok_or_else(|| format!("user {id} not found").into())
    }
}

/// Fixed-snapshot providers standing in for live site state.
pub struct StaticSite {
    pub config: SiteConfig,
    pub providers: AuthzProviderSet,
}

impl ConfigSnapshotProvider for StaticSite {
    fn site_config(&self) -> SiteConfig {
        self.config
    }
}

impl AuthzProviderRegistry for StaticSite {
    fn providers(&self) -> AuthzProviderSet {
        self.providers.clone()
    }
}

pub fn code_host_provider() -> ProviderHandle {
    ProviderHandle::new("gitlab:https://gitlab.example.com/")
}

pub const ALICE: UserId = UserId(7);
pub const ADMIN: UserId = UserId(3);

pub fn fixture_users() -> InMemoryUserStore {
    InMemoryUserStore::new(&[
        User {
            id: ALICE,
            site_admin: false,
        },
        User {
            id: ADMIN,
            site_admin: true,
        },
    ])
}

/// Five-repo fleet with equivalent grants in both representations:
/// 1 private+granted to Alice, 2 public, 3 private+unrestricted,
/// 4 private+ungranted, 5 private under an unrestricted external service.
pub fn fixture_catalog() -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    catalog
        .add_repo(RepoId(1), true)
        .add_repo(RepoId(2), false)
        .add_repo(RepoId(3), true)
        .add_repo(RepoId(4), true)
        .add_repo(RepoId(5), true)
        .grant_unified(RepoId(1), ALICE)
        .grant_unified_open(RepoId(3))
        .grant_legacy(RepoId(1), ALICE)
        .mark_legacy_unrestricted(RepoId(3))
        .mark_external_unrestricted(RepoId(5));
    catalog
}
