//! Abstract repository-visibility predicates.
//!
//! [`compile_predicate`] turns a bypass decision, the active permission
//! representation, and a user identity into a [`FilterPredicate`] expression
//! tree. The tree carries no storage syntax; a renderer (see
//! [`crate::render`]) turns it into a query fragment or an in-memory filter.
//! Because the output is a tree rather than concatenated text, embedding it
//! as a sub-clause of a larger expression is unambiguous by construction;
//! renderers parenthesize composite nodes when emitting text.

use crate::representation::Representation;
use crate::types::{BypassDecision, UserId};

/// Boolean expression over one repository, the unit the storage layer
/// filters by. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPredicate {
    Literal(bool),
    And(Vec<FilterPredicate>),
    Or(Vec<FilterPredicate>),
    /// A permission relation row exists joining the repository and the
    /// subject.
    ExistsRelational {
        relation: PermissionRelation,
        repo: RepoRef,
        subject: SubjectScope,
    },
    /// The repository id is contained in a per-user compact integer set.
    /// Storage realizations must answer this with a sub-linear containment
    /// test (bitmap or containment index); the sets can hold ids for very
    /// large repository fleets.
    ExistsBitmapContains { set: BitmapSetRef, repo: RepoRef },
}

/// The permission relations (and visibility classes, modeled as relations
/// whose subject is the open sentinel) a leaf may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionRelation {
    /// Unified representation: per-user-per-repo permission rows.
    UserRepoPermissions,
    /// Legacy representation: the per-repo permission record carrying an
    /// explicit unrestricted flag.
    UnrestrictedRepoPermissions,
    /// The repository is not marked private.
    PublicRepos,
    /// The repository is managed by an external service flagged unrestricted
    /// and not soft-deleted.
    UnrestrictedExternalService,
}

/// The subject side of a relational existence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectScope {
    /// The null/sentinel subject: the row applies to every user.
    AnyUser,
    User(UserId),
}

/// Which per-user integer set a bitmap containment check runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapSetRef {
    /// The compact set of repository ids the user may read.
    ReadableRepoIds(UserId),
}

/// Names the repository under test for renderers. SQL backends join against
/// `<alias>.id`; in-memory evaluation binds it to the candidate repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepoRef {
    pub alias: &'static str,
}

impl Default for RepoRef {
    fn default() -> Self {
        Self { alias: "repo" }
    }
}

/// Compile the repository-visibility predicate for one request.
///
/// Pure and total. The leaf kinds are selected solely from the
/// `representation` passed into this call, so a compiled tree never mixes
/// unified and legacy leaves even while the site-level flag is being flipped
/// under concurrent traffic.
pub fn compile_predicate(
    decision: &BypassDecision,
    representation: Representation,
    user_mapping_enabled: bool,
    user_id: UserId,
) -> FilterPredicate {
    if decision.bypass {
        // Access is already cleared; skip building clauses the storage layer
        // would have to evaluate for every row.
        return FilterPredicate::Literal(true);
    }

    let repo = RepoRef::default();
    let mut clauses = vec![unrestricted_repos(representation, repo)];

    // When legacy mapping is active, every repository, public or not, must
    // be governed by explicit mapped permission rows; the public-repo
    // shortcut would reopen a default-allow path. Its omission there is a
    // security property, not an optimization.
    if representation == Representation::Unified || !user_mapping_enabled {
        clauses.push(external_service_unrestricted(repo));
    }

    clauses.push(restricted_membership(representation, repo, user_id));

    FilterPredicate::Or(clauses)
}

/// Repositories whose access control is relaxed to "visible to all users".
fn unrestricted_repos(representation: Representation, repo: RepoRef) -> FilterPredicate {
    let relation = match representation {
        Representation::Unified => PermissionRelation::UserRepoPermissions,
        Representation::Legacy => PermissionRelation::UnrestrictedRepoPermissions,
    };
    FilterPredicate::ExistsRelational {
        relation,
        repo,
        subject: SubjectScope::AnyUser,
    }
}

/// Repositories open because they are public, or because the external
/// service managing them is flagged unrestricted.
fn external_service_unrestricted(repo: RepoRef) -> FilterPredicate {
    FilterPredicate::Or(vec![
        FilterPredicate::ExistsRelational {
            relation: PermissionRelation::PublicRepos,
            repo,
            subject: SubjectScope::AnyUser,
        },
        FilterPredicate::ExistsRelational {
            relation: PermissionRelation::UnrestrictedExternalService,
            repo,
            subject: SubjectScope::AnyUser,
        },
    ])
}

/// Repositories the user holds an explicit grant for, in whichever
/// representation is active.
fn restricted_membership(
    representation: Representation,
    repo: RepoRef,
    user_id: UserId,
) -> FilterPredicate {
    match representation {
        Representation::Unified => FilterPredicate::ExistsRelational {
            relation: PermissionRelation::UserRepoPermissions,
            repo,
            subject: SubjectScope::User(user_id),
        },
        Representation::Legacy => FilterPredicate::ExistsBitmapContains {
            set: BitmapSetRef::ReadableRepoIds(user_id),
            repo,
        },
    }
}
