//! Palisade - repository-visibility access control
//!
//! This library is the permission-filtering core of a multi-tenant
//! code-hosting backend. Per request it decides whether per-repository
//! permission filtering can be skipped entirely ("bypass"), and when it
//! cannot, compiles an abstract boolean predicate that the storage layer
//! renders into its own query dialect (or evaluates in memory) to restrict
//! a repository universe to exactly what one user may see.
//!
//! The crate is deliberately transport- and storage-free: durable permission
//! data, query execution, and the HTTP/gRPC surface are collaborators behind
//! the traits in [`context`] and [`render`].

pub mod context;
pub mod engine;
pub mod errors;
pub mod predicate;
pub mod render;
pub mod representation;
pub mod types;
