//! Vote ledger domain model.
//!
//! # Responsibility
//! - Define the directional opinion type and the ballot read model.
//! - Own the opinion <-> db text mapping.
//!
//! # Invariants
//! - An `Opinion` is strictly like or hate. "No opinion" is represented by
//!   ballot-row absence, never by an opinion variant, and there is no
//!   retract input: once cast, a ballot can only flip to the opposite side.

use crate::model::movie::MovieId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Directional opinion a caster holds on a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opinion {
    Like,
    Hate,
}

impl Opinion {
    /// Text stored in `ballots.opinion`.
    pub(crate) fn as_db_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Hate => "hate",
        }
    }

    pub(crate) fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "like" => Some(Self::Like),
            "hate" => Some(Self::Hate),
            _ => None,
        }
    }

    /// The other side of the tri-state's two active values.
    pub fn opposite(self) -> Self {
        match self {
            Self::Like => Self::Hate,
            Self::Hate => Self::Like,
        }
    }
}

impl Display for Opinion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for Opinion {
    type Err = InvalidOpinion;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(value.trim().to_ascii_lowercase().as_str()).ok_or_else(|| {
            InvalidOpinion {
                value: value.to_string(),
            }
        })
    }
}

/// Rejected vote input that is neither `like` nor `hate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOpinion {
    pub value: String,
}

impl Display for InvalidOpinion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid opinion `{}`; expected like|hate", self.value)
    }
}

impl Error for InvalidOpinion {}

/// Durable record of one caster's current opinion on one movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub movie_id: MovieId,
    pub caster: String,
    pub opinion: Opinion,
}
