//! Movie domain model.
//!
//! # Responsibility
//! - Define the canonical movie record and its submission draft.
//! - Own the enumerated allow-list of sortable columns.
//!
//! # Invariants
//! - `id` is stable and never reused for another movie.
//! - `likes`/`hates` are non-negative and mutated only by vote transitions.
//! - Sort keys come from the fixed `SortKey` set; arbitrary column names
//!   from user input are never accepted.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a movie row (SQLite rowid).
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type MovieId = i64;

/// Canonical movie record with denormalized vote counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// Stable catalog ID.
    pub id: MovieId,
    /// Unique human-facing title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Identity of the user who submitted the movie.
    pub owner: String,
    /// Submission time in epoch milliseconds.
    pub publication_date: i64,
    /// Count of ballots with opinion=like. Owned by the vote transition path.
    pub likes: i64,
    /// Count of ballots with opinion=hate. Owned by the vote transition path.
    pub hates: i64,
}

/// Submission input for a new movie. Counters always start at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDraft {
    pub title: String,
    pub description: String,
    pub owner: String,
    /// Submission time in epoch milliseconds.
    pub publication_date: i64,
}

impl MovieDraft {
    /// Checks submission input before any SQL mutation.
    pub fn validate(&self) -> Result<(), MovieValidationError> {
        if self.title.trim().is_empty() {
            return Err(MovieValidationError::EmptyTitle);
        }
        if self.owner.trim().is_empty() {
            return Err(MovieValidationError::EmptyOwner);
        }
        Ok(())
    }
}

/// Validation failures for movie submission input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieValidationError {
    EmptyTitle,
    EmptyOwner,
}

impl Display for MovieValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "movie title must not be empty"),
            Self::EmptyOwner => write!(f, "movie owner must not be empty"),
        }
    }
}

impl Error for MovieValidationError {}

/// Enumerated allow-list of sortable movie columns.
///
/// User-provided sort input is resolved to one of these variants before any
/// query is built; anything else is rejected as `InvalidSortKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Likes,
    Hates,
    PublicationDate,
}

impl SortKey {
    /// Resolves user input against the allow-list.
    pub fn parse(value: &str) -> Result<Self, InvalidSortKey> {
        match value.trim().to_ascii_lowercase().as_str() {
            "likes" => Ok(Self::Likes),
            "hates" => Ok(Self::Hates),
            "publication_date" | "date" => Ok(Self::PublicationDate),
            _ => Err(InvalidSortKey {
                value: value.to_string(),
            }),
        }
    }

    /// Column name used in ORDER BY. Only ever one of the fixed variants.
    pub(crate) fn column(self) -> &'static str {
        match self {
            Self::Likes => "likes",
            Self::Hates => "hates",
            Self::PublicationDate => "publication_date",
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::PublicationDate
    }
}

/// Rejected sort input that is not in the `SortKey` allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSortKey {
    pub value: String,
}

impl Display for InvalidSortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid sort key `{}`; expected likes|hates|publication_date",
            self.value
        )
    }
}

impl Error for InvalidSortKey {}
