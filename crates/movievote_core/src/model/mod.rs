//! Domain model for the movie catalog and vote ledger.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep input validation and enum <-> text mappings in one place.
//!
//! # Invariants
//! - Every movie is identified by a stable `MovieId`.
//! - A caster's opinion on a movie is a strict tri-state: like, hate, or no
//!   ballot row at all. Like and hate can never coexist for one pair.

pub mod movie;
pub mod vote;
