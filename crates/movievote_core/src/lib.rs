//! Core domain logic for movievote.
//! This crate is the single source of truth for vote/counter invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging};
pub use model::movie::{
    InvalidSortKey, Movie, MovieDraft, MovieId, MovieValidationError, SortKey,
};
pub use model::vote::{Ballot, InvalidOpinion, Opinion};
pub use repo::movie_repo::{
    MovieListQuery, MovieRepository, RepoError, RepoResult, SqliteMovieRepository,
};
pub use repo::vote_repo::{SqliteVoteRepository, VoteRepository};
pub use service::movie_service::{CatalogError, MoviePageRequest, MovieService};
pub use service::vote_service::{VoteError, VoteOutcome, VoteService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
