//! Persistence layer: SQL stays behind repository contracts.
//!
//! # Responsibility
//! - `movie_repo`: movie catalog rows and their aggregate vote counters.
//! - `vote_repo`: the per-(movie, caster) ballot ledger.
//!
//! # Invariants
//! - Counter mutation goes through `apply_vote_delta` relative arithmetic;
//!   no caller reads, adjusts, and rewrites a full counter value.

pub mod movie_repo;
pub mod vote_repo;
