//! Movie catalog repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable catalog APIs over the `movies` table.
//! - Own the aggregate counter write path (`apply_vote_delta`).
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `MovieDraft::validate()` before SQL mutations.
//! - `apply_vote_delta` uses relative arithmetic in a single UPDATE so
//!   concurrent transitions on one row cannot lose each other's increments.
//! - Counters are mutated only from within a vote transition's transaction.

use crate::db::DbError;
use crate::model::movie::{Movie, MovieDraft, MovieId, MovieValidationError, SortKey};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MOVIE_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    owner,
    publication_date,
    likes,
    hates
FROM movies";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for catalog and ballot persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(MovieValidationError),
    Db(DbError),
    /// Target movie does not exist; the enclosing transaction is abandoned.
    MovieNotFound(MovieId),
    /// Submission title collides with an existing movie.
    DuplicateTitle(String),
    /// Busy/locked store state. The failed request may be retried verbatim;
    /// vote transitions are idempotent per opinion.
    Transient(String),
    InvalidData(String),
}

impl RepoError {
    /// Whether retrying the identical request is safe and worthwhile.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MovieNotFound(id) => write!(f, "movie not found: {id}"),
            Self::DuplicateTitle(title) => {
                write!(f, "movie with title `{title}` already exists")
            }
            Self::Transient(message) => write!(f, "transient store failure: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted movie data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::MovieNotFound(_) => None,
            Self::DuplicateTitle(_) => None,
            Self::Transient(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<MovieValidationError> for RepoError {
    fn from(value: MovieValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(err, _) = &value {
            if matches!(
                err.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ) {
                return Self::Transient(value.to_string());
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing movies.
///
/// All filter/sort state is request-scoped; nothing here is ever stored as
/// ambient process state between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieListQuery {
    /// Optional exact-match filter on the submitting user.
    pub owner: Option<String>,
    /// Resolved sort column, descending. Defaults to publication date.
    pub sort: SortKey,
}

/// Repository interface for movie catalog operations.
pub trait MovieRepository {
    /// Creates one movie with counters at zero and returns its stable id.
    fn create_movie(&self, draft: &MovieDraft) -> RepoResult<MovieId>;
    /// Gets one movie by id.
    fn get_movie(&self, id: MovieId) -> RepoResult<Option<Movie>>;
    /// Lists movies using owner filter and sort key, descending.
    fn list_movies(&self, query: &MovieListQuery) -> RepoResult<Vec<Movie>>;
    /// Atomically adds (possibly negative) deltas to the vote counters.
    ///
    /// Must be called only from within a vote transition's transaction.
    fn apply_vote_delta(
        &self,
        id: MovieId,
        like_delta: i64,
        hate_delta: i64,
    ) -> RepoResult<()>;
}

/// SQLite-backed movie catalog repository.
pub struct SqliteMovieRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMovieRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MovieRepository for SqliteMovieRepository<'_> {
    fn create_movie(&self, draft: &MovieDraft) -> RepoResult<MovieId> {
        draft.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO movies (title, description, owner, publication_date, likes, hates)
             VALUES (?1, ?2, ?3, ?4, 0, 0);",
            params![
                draft.title.as_str(),
                draft.description.as_str(),
                draft.owner.as_str(),
                draft.publication_date,
            ],
        );

        match inserted {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(err) if is_unique_title_violation(&err) => {
                Err(RepoError::DuplicateTitle(draft.title.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_movie(&self, id: MovieId) -> RepoResult<Option<Movie>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MOVIE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_movie_row(row)?));
        }

        Ok(None)
    }

    fn list_movies(&self, query: &MovieListQuery) -> RepoResult<Vec<Movie>> {
        let mut sql = format!("{MOVIE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner) = query.owner.as_ref() {
            sql.push_str(" AND owner = ?");
            bind_values.push(Value::Text(owner.clone()));
        }

        // Sort column comes from the fixed SortKey set, never raw input.
        sql.push_str(&format!(" ORDER BY {} DESC, id ASC", query.sort.column()));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut movies = Vec::new();

        while let Some(row) = rows.next()? {
            movies.push(parse_movie_row(row)?);
        }

        Ok(movies)
    }

    fn apply_vote_delta(
        &self,
        id: MovieId,
        like_delta: i64,
        hate_delta: i64,
    ) -> RepoResult<()> {
        apply_vote_delta_scoped(self.conn, id, like_delta, hate_delta)
    }
}

/// Applies counter deltas on whichever connection or transaction is passed.
///
/// Relative arithmetic on the stored value makes the increment atomic at the
/// store; a zero changed-row count is the movie-existence check for the
/// enclosing vote transition.
pub(crate) fn apply_vote_delta_scoped(
    conn: &Connection,
    id: MovieId,
    like_delta: i64,
    hate_delta: i64,
) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE movies
         SET likes = likes + ?2,
             hates = hates + ?3
         WHERE id = ?1;",
        params![id, like_delta, hate_delta],
    )?;

    if changed == 0 {
        return Err(RepoError::MovieNotFound(id));
    }

    Ok(())
}

fn is_unique_title_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, Some(message)) => {
            failure.code == ErrorCode::ConstraintViolation && message.contains("movies.title")
        }
        _ => false,
    }
}

fn parse_movie_row(row: &Row<'_>) -> RepoResult<Movie> {
    let likes: i64 = row.get("likes")?;
    let hates: i64 = row.get("hates")?;
    if likes < 0 || hates < 0 {
        return Err(RepoError::InvalidData(format!(
            "negative vote counters likes={likes} hates={hates} in movies row"
        )));
    }

    Ok(Movie {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        owner: row.get("owner")?,
        publication_date: row.get("publication_date")?,
        likes,
        hates,
    })
}
