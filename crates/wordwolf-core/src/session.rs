//! The in-flight game record for one scope.
//!
//! A `Session` always exists for a scope; when no game is running it sits in
//! [`SessionState::Idle`] with every field cleared. Transitions live in
//! [`crate::lifecycle`] and [`crate::voting`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::player::{Player, PlayerId};
use crate::roles::RoleAssignment;
use crate::voting::Ballot;

/// Unique identifier of one game, from lobby to result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phase of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No game in this scope.
    #[default]
    Idle,
    /// Players are joining.
    Lobby,
    /// Words are out, discussion is running.
    InProgress,
    /// Ballot is open.
    Voting,
    /// A result has been produced; the session resets immediately after.
    Completed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Lobby => "in the lobby",
            Self::InProgress => "in progress",
            Self::Voting => "voting",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// The single live game of a scope.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub(crate) id: Option<SessionId>,
    pub(crate) state: SessionState,
    pub(crate) organizer: Option<Player>,
    pub(crate) players: Vec<Player>,
    pub(crate) topic: Option<String>,
    pub(crate) roles: Option<RoleAssignment>,
    pub(crate) ballot: Option<Ballot>,
}

impl Session {
    /// An idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// ID of the running game, if any.
    pub fn id(&self) -> Option<SessionId> {
        self.id
    }

    /// Current phase.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a game is running (any state but idle).
    pub fn is_active(&self) -> bool {
        self.state != SessionState::Idle
    }

    /// The player who opened the lobby.
    pub fn organizer(&self) -> Option<&Player> {
        self.organizer.as_ref()
    }

    /// Joined players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Whether `id` has joined.
    pub fn has_player(&self, id: &PlayerId) -> bool {
        self.position_of(id).is_some()
    }

    /// The chosen topic. `None` until the organizer picks one or the game
    /// starts with a random draw.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Secret roles, once the game has started.
    pub fn roles(&self) -> Option<&RoleAssignment> {
        self.roles.as_ref()
    }

    /// Word shared by the citizens.
    pub fn citizen_word(&self) -> Option<&str> {
        self.roles.as_ref().map(RoleAssignment::citizen_word)
    }

    /// Word given to the wolf.
    pub fn wolf_word(&self) -> Option<&str> {
        self.roles.as_ref().map(RoleAssignment::wolf_word)
    }

    /// Word assigned to a player.
    pub fn word_of(&self, id: &PlayerId) -> Option<&str> {
        self.roles.as_ref().and_then(|r| r.word_for(id))
    }

    /// The open ballot, if voting has started.
    pub fn ballot(&self) -> Option<&Ballot> {
        self.ballot.as_ref()
    }

    /// When voting opened.
    pub fn vote_started_at(&self) -> Option<DateTime<Utc>> {
        self.ballot.as_ref().map(Ballot::started_at)
    }

    /// Clear everything and return to idle.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn position_of(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    pub(crate) fn is_organizer(&self, id: &PlayerId) -> bool {
        self.organizer.as_ref().is_some_and(|o| &o.id == id)
    }
}
