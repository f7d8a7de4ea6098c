//! Movie catalog use-case service.
//!
//! # Responsibility
//! - Provide submission and listing entry points for core callers.
//! - Resolve user-facing sort input against the `SortKey` allow-list before
//!   any query is constructed.
//! - Expose a caster's ballots for presentation-layer button state.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Filter and sort parameters are request-scoped arguments, never ambient
//!   state held between calls.

use crate::model::movie::{InvalidSortKey, Movie, MovieDraft, MovieId, SortKey};
use crate::model::vote::Ballot;
use crate::repo::movie_repo::{MovieListQuery, MovieRepository, RepoError};
use crate::repo::vote_repo::VoteRepository;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors from catalog use-cases.
#[derive(Debug)]
pub enum CatalogError {
    /// Sort input is not in the enumerated allow-list.
    InvalidSortKey(InvalidSortKey),
    /// Persistence-layer failure, including duplicate-title rejection.
    Repo(RepoError),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSortKey(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidSortKey(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<InvalidSortKey> for CatalogError {
    fn from(value: InvalidSortKey) -> Self {
        Self::InvalidSortKey(value)
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Request model for one catalog listing page.
///
/// Both fields arrive with the request and die with it; nothing is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoviePageRequest {
    /// Optional exact-match filter on the submitting user.
    pub owner: Option<String>,
    /// Raw sort input; resolved against `SortKey` or rejected. `None` falls
    /// back to publication date.
    pub sort: Option<String>,
}

/// Use-case service wrapper for catalog operations.
pub struct MovieService<M: MovieRepository, V: VoteRepository> {
    movies: M,
    votes: V,
}

impl<M: MovieRepository, V: VoteRepository> MovieService<M, V> {
    /// Creates a service using the provided repository implementations.
    pub fn new(movies: M, votes: V) -> Self {
        Self { movies, votes }
    }

    /// Submits a new movie and returns the persisted record.
    ///
    /// # Contract
    /// - Counters start at zero.
    /// - A title collision is rejected with `DuplicateTitle`.
    pub fn add_movie(&self, draft: &MovieDraft) -> CatalogResult<Movie> {
        match self.movies.create_movie(draft) {
            Ok(id) => {
                info!("event=movie_add module=service status=ok movie_id={id}");
                self.read_back(id)
            }
            Err(err) => {
                error!("event=movie_add module=service status=error error={err}");
                Err(err.into())
            }
        }
    }

    /// Lists movies for one request's filter and sort parameters.
    ///
    /// Sort input is resolved before query construction; anything outside
    /// the allow-list fails with `InvalidSortKey` and touches no SQL.
    pub fn movie_page(&self, request: &MoviePageRequest) -> CatalogResult<Vec<Movie>> {
        let sort = match request.sort.as_deref() {
            Some(raw) => SortKey::parse(raw)?,
            None => SortKey::default(),
        };

        let query = MovieListQuery {
            owner: request.owner.clone(),
            sort,
        };
        Ok(self.movies.list_movies(&query)?)
    }

    /// Gets one movie by id.
    pub fn get_movie(&self, id: MovieId) -> CatalogResult<Option<Movie>> {
        Ok(self.movies.get_movie(id)?)
    }

    /// All ballots cast by one caster, for rendering like/hate button state
    /// across a listing page without one lookup per movie.
    pub fn caster_ballots(&self, caster: &str) -> CatalogResult<Vec<Ballot>> {
        Ok(self.votes.list_ballots(caster)?)
    }

    fn read_back(&self, id: MovieId) -> CatalogResult<Movie> {
        self.movies
            .get_movie(id)?
            .ok_or(CatalogError::Repo(RepoError::MovieNotFound(id)))
    }
}
