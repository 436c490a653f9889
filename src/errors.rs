use miette::Diagnostic;
use thiserror::Error;

use crate::types::UserId;

/// Error type returned by [`UserStore`](crate::context::UserStore)
/// implementations. Opaque to this crate; carried through unchanged.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error, Diagnostic)]
pub enum AuthzError {
    #[error("the permissions user mapping cannot be enabled while code-host authorization providers are in use")]
    #[diagnostic(
        code(palisade::config_conflict),
        help("Disable `permissions.userMapping`, remove the authorization providers, or migrate to unified permissions; the engine refuses to guess which filtering regime was intended")
    )]
    ConfigConflict,

    #[error("failed to load user {user_id} while computing repository permissions")]
    #[diagnostic(
        code(palisade::user_lookup),
        help("The request cannot be authorized safely without the user record; retry once the user store is reachable")
    )]
    UserLookup {
        user_id: UserId,
        #[source]
        source: StoreError,
    },
}
