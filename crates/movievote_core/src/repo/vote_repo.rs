//! Vote ledger repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for per-(movie, caster) ballot rows.
//! - Keep the at-most-one-ballot-per-pair rule enforced at the store.
//!
//! # Invariants
//! - The `(movie_id, caster)` primary key makes a duplicate ballot
//!   unrepresentable; a changed vote updates the row in place.
//! - `upsert_ballot` is called only from within a vote transition's
//!   transaction, in lockstep with the counter delta.

use crate::model::movie::MovieId;
use crate::model::vote::{Ballot, Opinion};
use crate::repo::movie_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for ballot ledger operations.
pub trait VoteRepository {
    /// Point lookup of one caster's ballot on one movie. No side effects.
    fn get_ballot(&self, movie_id: MovieId, caster: &str) -> RepoResult<Option<Ballot>>;
    /// All ballots cast by one caster, one query for a whole listing page.
    fn list_ballots(&self, caster: &str) -> RepoResult<Vec<Ballot>>;
    /// Inserts or overwrites the ballot for the `(movie_id, caster)` pair.
    ///
    /// Must be called only from within a vote transition's transaction.
    fn upsert_ballot(&self, movie_id: MovieId, caster: &str, opinion: Opinion) -> RepoResult<()>;
}

/// SQLite-backed ballot ledger repository.
pub struct SqliteVoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteVoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl VoteRepository for SqliteVoteRepository<'_> {
    fn get_ballot(&self, movie_id: MovieId, caster: &str) -> RepoResult<Option<Ballot>> {
        get_ballot_scoped(self.conn, movie_id, caster)
    }

    fn list_ballots(&self, caster: &str) -> RepoResult<Vec<Ballot>> {
        let mut stmt = self.conn.prepare(
            "SELECT movie_id, caster, opinion
             FROM ballots
             WHERE caster = ?1
             ORDER BY movie_id ASC;",
        )?;

        let mut rows = stmt.query([caster])?;
        let mut ballots = Vec::new();
        while let Some(row) = rows.next()? {
            ballots.push(parse_ballot_row(row)?);
        }

        Ok(ballots)
    }

    fn upsert_ballot(&self, movie_id: MovieId, caster: &str, opinion: Opinion) -> RepoResult<()> {
        upsert_ballot_scoped(self.conn, movie_id, caster, opinion)
    }
}

/// Reads one ballot on whichever connection or transaction is passed.
pub(crate) fn get_ballot_scoped(
    conn: &Connection,
    movie_id: MovieId,
    caster: &str,
) -> RepoResult<Option<Ballot>> {
    let row = conn
        .query_row(
            "SELECT movie_id, caster, opinion
             FROM ballots
             WHERE movie_id = ?1
               AND caster = ?2;",
            params![movie_id, caster],
            |row| {
                Ok((
                    row.get::<_, MovieId>("movie_id")?,
                    row.get::<_, String>("caster")?,
                    row.get::<_, String>("opinion")?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((movie_id, caster, opinion_text)) => {
            let opinion = parse_opinion_text(&opinion_text)?;
            Ok(Some(Ballot {
                movie_id,
                caster,
                opinion,
            }))
        }
        None => Ok(None),
    }
}

/// Upserts one ballot on whichever connection or transaction is passed.
///
/// The conflict target is the ledger's primary key, so a re-vote can never
/// grow the table; it flips the opinion and refreshes `cast_at` in place.
pub(crate) fn upsert_ballot_scoped(
    conn: &Connection,
    movie_id: MovieId,
    caster: &str,
    opinion: Opinion,
) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO ballots (movie_id, caster, opinion)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (movie_id, caster) DO UPDATE
         SET opinion = excluded.opinion,
             cast_at = (strftime('%s', 'now') * 1000);",
        params![movie_id, caster, opinion.as_db_str()],
    )?;

    Ok(())
}

fn parse_ballot_row(row: &Row<'_>) -> RepoResult<Ballot> {
    let opinion_text: String = row.get("opinion")?;
    Ok(Ballot {
        movie_id: row.get("movie_id")?,
        caster: row.get("caster")?,
        opinion: parse_opinion_text(&opinion_text)?,
    })
}

fn parse_opinion_text(value: &str) -> RepoResult<Opinion> {
    Opinion::from_db_str(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid opinion value `{value}` in ballots.opinion"))
    })
}
