//! Selection of the active permission representation.
//!
//! Two incompatible representations coexist during the schema migration:
//! the legacy per-user compact integer set and the unified relational
//! per-user-per-repo rows. Everything downstream selects leaf predicates
//! from a [`Representation`] value instead of reading the raw flag, so the
//! mapping has exactly one tested place and a live flag flip can never mix
//! the two within one computation.

/// Which permission representation is active for one computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// Relational per-user-per-repo permission rows.
    Unified,
    /// Compact per-user integer set of accessible repository ids.
    Legacy,
}

pub fn select_representation(unified_enabled: bool) -> Representation {
    if unified_enabled {
        Representation::Unified
    } else {
        Representation::Legacy
    }
}
