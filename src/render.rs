//! Rendering of abstract predicates into executable form.
//!
//! All storage dialect knowledge lives behind [`PredicateRenderer`]; the
//! policy core never emits query text. This module also ships an in-memory
//! realization of both permission representations ([`MemoryCatalog`] plus
//! [`MemoryFilter`]). It is the executable definition of each leaf's
//! semantics and doubles as a real filter for small embedded universes and
//! for tests.

use std::collections::{BTreeMap, BTreeSet};

use crate::predicate::{
    BitmapSetRef, FilterPredicate, PermissionRelation, SubjectScope,
};
use crate::types::{RepoId, UserId};

/// Turns a [`FilterPredicate`] into whatever the backing store executes: a
/// SQL fragment, a search-index filter, or (here) a concrete repo set.
/// Renderers emitting text must parenthesize composite nodes; the tree
/// carries grouping structurally, not syntactically.
pub trait PredicateRenderer {
    type Output;

    fn render(&self, predicate: &FilterPredicate) -> Self::Output;
}

/// In-memory permission data covering both representations side by side,
/// the way a live migration does.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    /// Every known repository and whether it is marked private.
    repos: BTreeMap<RepoId, bool>,
    /// Unified rows: `None` is the open sentinel subject.
    unified_rows: BTreeSet<(RepoId, Option<UserId>)>,
    /// Legacy per-repo permission records flagged unrestricted.
    legacy_unrestricted: BTreeSet<RepoId>,
    /// Legacy per-user compact sets of readable repository ids.
    legacy_readable: BTreeMap<UserId, BTreeSet<RepoId>>,
    /// Repos managed by a live external service flagged unrestricted.
    external_unrestricted: BTreeSet<RepoId>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_repo(&mut self, repo: RepoId, private: bool) -> &mut Self {
        self.repos.insert(repo, private);
        self
    }

    /// Record a unified permission row granting `user` access to `repo`.
    pub fn grant_unified(&mut self, repo: RepoId, user: UserId) -> &mut Self {
        self.unified_rows.insert((repo, Some(user)));
        self
    }

    /// Record a unified row with the open sentinel subject: visible to all.
    pub fn grant_unified_open(&mut self, repo: RepoId) -> &mut Self {
        self.unified_rows.insert((repo, None));
        self
    }

    /// Flag the repo's legacy permission record as unrestricted.
    pub fn mark_legacy_unrestricted(&mut self, repo: RepoId) -> &mut Self {
        self.legacy_unrestricted.insert(repo);
        self
    }

    /// Add `repo` to `user`'s legacy readable-id set.
    pub fn grant_legacy(&mut self, repo: RepoId, user: UserId) -> &mut Self {
        self.legacy_readable.entry(user).or_default().insert(repo);
        self
    }

    /// Mark the repo as managed by an unrestricted, non-deleted external
    /// service.
    pub fn mark_external_unrestricted(&mut self, repo: RepoId) -> &mut Self {
        self.external_unrestricted.insert(repo);
        self
    }

    pub fn repos(&self) -> impl Iterator<Item = RepoId> + '_ {
        self.repos.keys().copied()
    }

    /// Evaluate the predicate against one candidate repository.
    pub fn eval(&self, predicate: &FilterPredicate, repo: RepoId) -> bool {
        match predicate {
            FilterPredicate::Literal(value) => *value,
            FilterPredicate::And(children) => children.iter().all(|c| self.eval(c, repo)),
            FilterPredicate::Or(children) => children.iter().any(|c| self.eval(c, repo)),
            FilterPredicate::ExistsRelational {
                relation, subject, ..
            } => self.eval_relational(*relation, *subject, repo),
            FilterPredicate::ExistsBitmapContains {
                set: BitmapSetRef::ReadableRepoIds(user),
                ..
            } => self
                .legacy_readable
                .get(user)
                .is_some_and(|set| set.contains(&repo)),
        }
    }

    fn eval_relational(
        &self,
        relation: PermissionRelation,
        subject: SubjectScope,
        repo: RepoId,
    ) -> bool {
        match relation {
            PermissionRelation::UserRepoPermissions => {
                let subject = match subject {
                    SubjectScope::AnyUser => None,
                    SubjectScope::User(user) => Some(user),
                };
                self.unified_rows.contains(&(repo, subject))
            }
            PermissionRelation::UnrestrictedRepoPermissions => {
                self.legacy_unrestricted.contains(&repo)
            }
            PermissionRelation::PublicRepos => !self.repos.get(&repo).copied().unwrap_or(true),
            PermissionRelation::UnrestrictedExternalService => {
                self.external_unrestricted.contains(&repo)
            }
        }
    }
}

/// Filters a catalog's repository universe through a compiled predicate.
#[derive(Debug, Clone, Copy)]
pub struct MemoryFilter<'a> {
    catalog: &'a MemoryCatalog,
}

impl<'a> MemoryFilter<'a> {
    pub fn new(catalog: &'a MemoryCatalog) -> Self {
        Self { catalog }
    }
}

impl PredicateRenderer for MemoryFilter<'_> {
    type Output = Vec<RepoId>;

    fn render(&self, predicate: &FilterPredicate) -> Vec<RepoId> {
        self.catalog
            .repos()
            .filter(|repo| self.catalog.eval(predicate, *repo))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{compile_predicate, RepoRef};
    use crate::representation::Representation;
    use crate::types::BypassDecision;

    fn catalog() -> MemoryCatalog {
        // Repo 1: private, explicitly granted to user 7 in both
        // representations. Repo 2: public. Repo 3: private but unrestricted.
        // Repo 4: private, granted to nobody. Repo 5: private, but its
        // external service is unrestricted.
        let mut catalog = MemoryCatalog::new();
        catalog
            .add_repo(RepoId(1), true)
            .add_repo(RepoId(2), false)
            .add_repo(RepoId(3), true)
            .add_repo(RepoId(4), true)
            .add_repo(RepoId(5), true)
            .grant_unified(RepoId(1), UserId(7))
            .grant_unified_open(RepoId(3))
            .grant_legacy(RepoId(1), UserId(7))
            .mark_legacy_unrestricted(RepoId(3))
            .mark_external_unrestricted(RepoId(5));
        catalog
    }

    #[test]
    fn test_literal_leaves() {
        let catalog = catalog();
        assert!(catalog.eval(&FilterPredicate::Literal(true), RepoId(4)));
        assert!(!catalog.eval(&FilterPredicate::Literal(false), RepoId(1)));
    }

    #[test]
    fn test_relational_leaf_semantics() {
        let catalog = catalog();
        let repo = RepoRef::default();

        let member = FilterPredicate::ExistsRelational {
            relation: PermissionRelation::UserRepoPermissions,
            repo,
            subject: SubjectScope::User(UserId(7)),
        };
        assert!(catalog.eval(&member, RepoId(1)));
        assert!(!catalog.eval(&member, RepoId(3)));

        let open = FilterPredicate::ExistsRelational {
            relation: PermissionRelation::UserRepoPermissions,
            repo,
            subject: SubjectScope::AnyUser,
        };
        assert!(catalog.eval(&open, RepoId(3)));
        assert!(!catalog.eval(&open, RepoId(1)));

        let public = FilterPredicate::ExistsRelational {
            relation: PermissionRelation::PublicRepos,
            repo,
            subject: SubjectScope::AnyUser,
        };
        assert!(catalog.eval(&public, RepoId(2)));
        assert!(!catalog.eval(&public, RepoId(1)));
        // Unknown repos count as private.
        assert!(!catalog.eval(&public, RepoId(99)));
    }

    #[test]
    fn test_bitmap_leaf_semantics() {
        let catalog = catalog();
        let contains = FilterPredicate::ExistsBitmapContains {
            set: BitmapSetRef::ReadableRepoIds(UserId(7)),
            repo: RepoRef::default(),
        };
        assert!(catalog.eval(&contains, RepoId(1)));
        assert!(!catalog.eval(&contains, RepoId(4)));
        // A user with no set at all reads nothing.
        let empty = FilterPredicate::ExistsBitmapContains {
            set: BitmapSetRef::ReadableRepoIds(UserId(8)),
            repo: RepoRef::default(),
        };
        assert!(!catalog.eval(&empty, RepoId(1)));
    }

    #[test]
    fn test_representations_agree_on_visible_set() {
        // The same underlying grants expressed in each representation must
        // denote the same visible repositories; only the leaf kinds differ.
        let catalog = catalog();
        let filter = MemoryFilter::new(&catalog);
        let decision = BypassDecision::default();

        let unified = compile_predicate(&decision, Representation::Unified, false, UserId(7));
        let legacy = compile_predicate(&decision, Representation::Legacy, false, UserId(7));

        let visible_unified = filter.render(&unified);
        let visible_legacy = filter.render(&legacy);
        assert_eq!(visible_unified, visible_legacy);
        assert_eq!(
            visible_unified,
            vec![RepoId(1), RepoId(2), RepoId(3), RepoId(5)]
        );
    }

    #[test]
    fn test_legacy_mapping_hides_public_repos() {
        // With mapping enabled under legacy, repo 2 (public) and repo 5
        // (unrestricted external service) are no longer shortcuts.
        let catalog = catalog();
        let filter = MemoryFilter::new(&catalog);
        let p = compile_predicate(
            &BypassDecision::default(),
            Representation::Legacy,
            true,
            UserId(7),
        );
        assert_eq!(filter.render(&p), vec![RepoId(1), RepoId(3)]);
    }

    #[test]
    fn test_bypass_renders_everything() {
        let catalog = catalog();
        let filter = MemoryFilter::new(&catalog);
        let everything: Vec<RepoId> = catalog.repos().collect();
        assert_eq!(filter.render(&FilterPredicate::Literal(true)), everything);
    }
}
