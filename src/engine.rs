//! The per-request bypass decision.
//!
//! [`compute_bypass_decision`] resolves the independently-toggleable site
//! flags and the actor identity into a [`BypassDecision`] in a fixed order.
//! The order encodes security priority, not convenience: the configuration
//! conflict check runs before any actor-based shortcut, and the user-store
//! lookup happens only for authenticated actors, after the shortcuts that
//! make it unnecessary.

use tracing::warn;

use crate::context::UserStore;
use crate::errors::AuthzError;
use crate::types::{Actor, AuthzProviderSet, BypassDecision, SiteConfig};

/// Decide whether per-repository permission filtering may be skipped for
/// this request.
///
/// Fails with [`AuthzError::ConfigConflict`] when the permissions user
/// mapping is enabled alongside authorization providers without unified
/// permissions, and with [`AuthzError::UserLookup`] when the user record is
/// needed but cannot be loaded. Every other input combination yields a
/// decision.
pub async fn compute_bypass_decision(
    actor: &Actor,
    config: &SiteConfig,
    providers: &AuthzProviderSet,
    users: &dyn UserStore,
) -> Result<BypassDecision, AuthzError> {
    // SECURITY: permissions user mapping combined with code-host authz
    // providers would silently reinterpret default-allow and can leak
    // private repositories. Checked unconditionally, before any actor
    // shortcut: internal actors and site admins do not exempt a deployment
    // from a broken configuration.
    if config.permissions_user_mapping_enabled
        && !providers.is_empty()
        && !config.unified_permissions_enabled
    {
        return Err(AuthzError::ConfigConflict);
    }

    // Once mapping mode is active, explicit permission rows are mandatory;
    // the configured default-allow value is ignored.
    let allow_by_default =
        providers.allow_by_default && !config.permissions_user_mapping_enabled;

    let mut decision = BypassDecision::default();

    // SECURITY: internal requests skip provider permission checks entirely.
    if actor.is_internal() {
        decision.bypass = true;
        decision.reasons.internal = true;
    } else if allow_by_default && providers.is_empty() {
        decision.bypass = true;
        decision.reasons.no_authz_provider = true;
    }

    if let Actor::Authenticated { user_id } = actor {
        match users.get_by_id(*user_id).await {
            Ok(user) => {
                if user.site_admin && !config.enforce_for_site_admins {
                    decision.bypass = true;
                    decision.reasons.site_admin = true;
                }
            }
            Err(source) if decision.bypass => {
                // The decision did not need the lookup; keep it. Logged
                // rather than dropped so audit trails still see the failure.
                warn!(
                    user_id = user_id.0,
                    error = %source,
                    "user lookup failed after bypass was already established"
                );
            }
            Err(source) => {
                return Err(AuthzError::UserLookup {
                    user_id: *user_id,
                    source,
                });
            }
        }
    }

    Ok(decision)
}
