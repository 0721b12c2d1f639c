//! Error types for the word wolf engine.

use std::time::Duration;

use thiserror::Error;

use crate::player::PlayerId;
use crate::session::SessionState;

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;

/// Errors that can occur while running a game session.
///
/// None of these mutate the session: the action that produced one is simply
/// rejected and may be issued again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// A session is already running in this scope.
    #[error("a game is already in progress")]
    SessionAlreadyActive,

    /// The action is not valid in the session's current state.
    #[error("cannot {action} while the session is {state}")]
    InvalidState {
        /// What was attempted.
        action: &'static str,
        /// The state the session was in.
        state: SessionState,
    },

    /// Only the organizer may perform this action.
    #[error("only the organizer can {0}")]
    NotOrganizer(&'static str),

    /// Only a configured moderator may see the role sheet.
    #[error("{0} is not a moderator")]
    NotModerator(PlayerId),

    /// Not enough players have joined.
    #[error("at least {required} players are needed, only {joined} joined")]
    InsufficientPlayers {
        /// Minimum number of players.
        required: usize,
        /// Number of players currently in the lobby.
        joined: usize,
    },

    /// The topic does not exist in the theme repository.
    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    /// The player has not joined this session.
    #[error("{0} is not playing in this game")]
    NotAParticipant(PlayerId),

    /// There is no session in this scope.
    #[error("no game is running")]
    NoActiveSession,

    /// The voter tried to accuse themselves.
    #[error("you cannot vote for yourself")]
    SelfVoteForbidden,

    /// The ballot index or player does not name a candidate.
    #[error("no such candidate: {0}")]
    UnknownCandidate(String),

    /// Voting has not been opened.
    #[error("voting has not started")]
    NoVoteInProgress,

    /// The deliberation window has not elapsed yet.
    #[error("results are available in {}s", .remaining.as_millis().div_ceil(1000))]
    TooEarly {
        /// Time left until results may be requested.
        remaining: Duration,
    },

    /// The ballot closed without a single vote.
    #[error("no votes were cast")]
    NoVotesCast,

    /// The topic's word pool cannot supply two distinct words.
    #[error("topic \"{topic}\" has {available} distinct word(s), need 2")]
    InsufficientWords {
        /// Topic name.
        topic: String,
        /// Number of distinct words available.
        available: usize,
    },

    /// The theme repository is empty.
    #[error("no topics available")]
    NoTopicsAvailable,

    /// The topic data could not be loaded.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The dealt roles name a wolf nobody on the roster holds.
    #[error("role assignment is inconsistent: wolf {0} is not seated")]
    WolfNotSeated(PlayerId),
}

/// Broad classification of a [`GameError`], used by adapters to decide who
/// should see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The actor's request was not valid right now. Report it to the actor.
    Precondition,
    /// The topic data is unusable. Report it to the organizer.
    Data,
    /// Session state broke an engine invariant. Log it; the actor did
    /// nothing wrong.
    Internal,
}

impl GameError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InsufficientWords { .. } | Self::NoTopicsAvailable | Self::Configuration(_) => {
                ErrorCategory::Data
            }
            Self::WolfNotSeated(_) => ErrorCategory::Internal,
            _ => ErrorCategory::Precondition,
        }
    }
}
