//! Vote transition use-case service.
//!
//! # Responsibility
//! - Run the atomic ballot + counter transition for one vote request.
//! - Keep ledger state and aggregate counters from ever diverging.
//!
//! # Invariants
//! - Ballot read, counter delta, and ballot upsert execute inside one
//!   immediate transaction; every failure path rolls the whole unit back.
//! - Re-casting the caster's current opinion is a no-op, which makes a
//!   retried request after a failed commit always safe.
//! - There is no retract input. A cast ballot can only flip to the opposite
//!   opinion; this mirrors the product's voting rules on purpose.

use crate::model::movie::MovieId;
use crate::model::vote::Opinion;
use crate::repo::movie_repo::{apply_vote_delta_scoped, RepoError};
use crate::repo::vote_repo::{get_ballot_scoped, upsert_ballot_scoped};
use log::{error, info};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type VoteResult<T> = Result<T, VoteError>;

/// Errors from a vote transition request.
#[derive(Debug)]
pub enum VoteError {
    /// No authenticated caster identity was supplied. The calling layer owns
    /// authentication; this engine only refuses to run without an identity.
    CasterRequired,
    /// Persistence-layer failure, including movie-not-found and transient
    /// busy/locked states.
    Repo(RepoError),
}

impl Display for VoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CasterRequired => write!(f, "vote requires an authenticated caster identity"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for VoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CasterRequired => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for VoteError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for VoteError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Result of one committed vote transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    pub movie_id: MovieId,
    /// The opinion now recorded on the ballot.
    pub opinion: Opinion,
    /// Counter change applied by this call. Both zero for a no-op re-vote.
    pub like_delta: i64,
    pub hate_delta: i64,
    /// Counter values after commit.
    pub likes: i64,
    pub hates: i64,
}

impl VoteOutcome {
    /// Whether this call changed any persisted state.
    pub fn changed(&self) -> bool {
        self.like_delta != 0 || self.hate_delta != 0
    }
}

/// Use-case service running vote transitions over one store connection.
pub struct VoteService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> VoteService<'conn> {
    /// Creates a service over a migrated/ready connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Casts `desired` as `caster`'s opinion on `movie_id`.
    ///
    /// # Contract
    /// - First vote inserts a ballot and bumps the matching counter.
    /// - A flipped vote updates the ballot and moves one count across.
    /// - Re-casting the current opinion changes nothing and still succeeds.
    /// - `MovieNotFound` rolls back without inserting any ballot row.
    ///
    /// # Side effects
    /// - Emits `vote_transition` logging events (ids and deltas only;
    ///   caster identity is never written to logs).
    pub fn cast_vote(
        &self,
        movie_id: MovieId,
        caster: &str,
        desired: Opinion,
    ) -> VoteResult<VoteOutcome> {
        if caster.trim().is_empty() {
            return Err(VoteError::CasterRequired);
        }

        info!("event=vote_transition module=service status=start movie_id={movie_id} opinion={desired}");

        match self.run_transition(movie_id, caster, desired) {
            Ok(outcome) => {
                info!(
                    "event=vote_transition module=service status=ok movie_id={movie_id} opinion={desired} like_delta={} hate_delta={}",
                    outcome.like_delta, outcome.hate_delta
                );
                Ok(outcome)
            }
            Err(err) => {
                error!(
                    "event=vote_transition module=service status=error movie_id={movie_id} opinion={desired} error={err}"
                );
                Err(err)
            }
        }
    }

    fn run_transition(
        &self,
        movie_id: MovieId,
        caster: &str,
        desired: Opinion,
    ) -> VoteResult<VoteOutcome> {
        // Immediate mode takes the write lock up front, so the ballot read
        // and the counter write below cannot interleave with a concurrent
        // transition on the same row.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let existing = get_ballot_scoped(&tx, movie_id, caster)?.map(|ballot| ballot.opinion);
        let (like_delta, hate_delta) = vote_delta(existing, desired);

        if like_delta != 0 || hate_delta != 0 || existing.is_none() {
            // The delta UPDATE doubles as the movie existence check: zero
            // changed rows surfaces MovieNotFound before any ballot insert.
            apply_vote_delta_scoped(&tx, movie_id, like_delta, hate_delta)?;
            upsert_ballot_scoped(&tx, movie_id, caster, desired)?;
        }

        let (likes, hates) = read_counters(&tx, movie_id)?;
        tx.commit()?;

        Ok(VoteOutcome {
            movie_id,
            opinion: desired,
            like_delta,
            hate_delta,
            likes,
            hates,
        })
    }
}

/// Counter delta for one transition, by (existing opinion, desired opinion).
///
/// | existing | desired | likes | hates |
/// |----------|---------|-------|-------|
/// | absent   | like    | +1    |  0    |
/// | absent   | hate    |  0    | +1    |
/// | hate     | like    | +1    | -1    |
/// | like     | hate    | -1    | +1    |
/// | same     | same    |  0    |  0    |
fn vote_delta(existing: Option<Opinion>, desired: Opinion) -> (i64, i64) {
    match (existing, desired) {
        (None, Opinion::Like) => (1, 0),
        (None, Opinion::Hate) => (0, 1),
        (Some(Opinion::Hate), Opinion::Like) => (1, -1),
        (Some(Opinion::Like), Opinion::Hate) => (-1, 1),
        (Some(Opinion::Like), Opinion::Like) | (Some(Opinion::Hate), Opinion::Hate) => (0, 0),
    }
}

fn read_counters(tx: &Transaction<'_>, movie_id: MovieId) -> VoteResult<(i64, i64)> {
    let counters = tx
        .query_row(
            "SELECT likes, hates FROM movies WHERE id = ?1;",
            [movie_id],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()?;

    counters.ok_or_else(|| VoteError::Repo(RepoError::MovieNotFound(movie_id)))
}
