use serde::{Deserialize, Serialize};

/// Numeric user identity. Zero is the id of a request with no signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct UserId(pub i32);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric repository identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct RepoId(pub i32);

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity on whose behalf one authorization decision is computed.
/// Supplied per request by the transport layer; immutable for the duration
/// of one decision. The kinds are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// Trusted in-process caller (background jobs, sibling services).
    Internal,
    /// Request with no signed-in user.
    Anonymous,
    /// Signed-in user.
    Authenticated { user_id: UserId },
}

impl Actor {
    pub fn is_internal(&self) -> bool {
        matches!(self, Actor::Internal)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::Authenticated { .. })
    }

    /// The authenticated user id, or the zero id for internal and anonymous
    /// actors.
    pub fn user_id(&self) -> UserId {
        match self {
            Actor::Authenticated { user_id } => *user_id,
            _ => UserId::default(),
        }
    }
}

/// Result of a [`UserStore`](crate::context::UserStore) lookup. The
/// site-admin bit lives here, not on [`Actor`]: the decision engine always
/// consults the store rather than trusting a flag minted at sign-in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub site_admin: bool,
}

/// Read-only snapshot of the site-level authorization settings. Taken once
/// per request by the caller; the engine never re-reads configuration
/// mid-computation, so a decision can never be built from a torn read.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Explicit permissions API: repository access is granted exclusively
    /// through mapped permission rows.
    #[serde(default)]
    pub permissions_user_mapping_enabled: bool,
    /// Whether the relational per-user-per-repo permission representation is
    /// active (as opposed to the legacy per-user integer sets).
    #[serde(default)]
    pub unified_permissions_enabled: bool,
    /// When set, site admins go through the same repository filtering as
    /// everyone else.
    #[serde(default)]
    pub enforce_for_site_admins: bool,
}

/// Opaque identity of one configured authorization provider (e.g. a code
/// host connection syncing permissions). The engine never looks inside;
/// it only counts them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderHandle(String);

impl ProviderHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// The externally-configured authorization sources, snapshotted per request.
#[derive(Debug, Clone, Default)]
pub struct AuthzProviderSet {
    pub providers: Vec<ProviderHandle>,
    /// Whether repositories not covered by any provider are visible to
    /// everyone. Forced off while permissions user mapping is enabled.
    pub allow_by_default: bool,
}

impl AuthzProviderSet {
    /// A set with no providers configured.
    pub fn none(allow_by_default: bool) -> Self {
        Self {
            providers: Vec::new(),
            allow_by_default,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Why filtering was bypassed. Reasons are recorded independently for
/// observability; more than one may be set on a single decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BypassReasons {
    pub internal: bool,
    pub site_admin: bool,
    pub no_authz_provider: bool,
}

impl BypassReasons {
    pub fn any(&self) -> bool {
        self.internal || self.site_admin || self.no_authz_provider
    }
}

/// Outcome of one run of the decision engine. Computed fresh per request;
/// never cache a decision across requests with different actors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BypassDecision {
    /// When true, per-repository permission filtering is skipped entirely.
    /// True iff at least one reason is recorded.
    pub bypass: bool,
    pub reasons: BypassReasons,
}
