//! Configuration for word wolf sessions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::player::PlayerId;

/// Fewest players a round can be played with.
pub const MIN_PLAYERS: usize = 3;

/// Default minimum discussion time before the organizer may close a ballot.
pub const DELIBERATION_WINDOW: Duration = Duration::from_secs(60);

/// Who may move a running round into voting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteOpener {
    /// Any joined player.
    #[default]
    AnyPlayer,
    /// The organizer only.
    OrganizerOnly,
}

/// Whether a voter may accuse themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelfVotePolicy {
    /// Rejected when the voter names a player directly, allowed through a
    /// numbered ballot.
    #[default]
    DirectTargetsOnly,
    /// Always rejected.
    Forbidden,
    /// Always allowed.
    Allowed,
}

/// Configuration shared by every session in a game table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// RNG seed for reproducible rounds. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Minimum players needed to start (never below [`MIN_PLAYERS`]).
    pub min_players: usize,
    /// Time that must pass after voting opens before manual results.
    pub deliberation_window: Duration,
    /// Who may open voting.
    pub vote_opener: VoteOpener,
    /// Self-vote policy.
    pub self_vote: SelfVotePolicy,
    /// Players who receive the role sheet when a round starts.
    pub moderators: Vec<PlayerId>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            min_players: MIN_PLAYERS,
            deliberation_window: DELIBERATION_WINDOW,
            vote_opener: VoteOpener::default(),
            self_vote: SelfVotePolicy::default(),
            moderators: Vec::new(),
        }
    }
}

impl GameConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the minimum player count (clamped to at least 3).
    pub fn with_min_players(mut self, min: usize) -> Self {
        self.min_players = min.max(MIN_PLAYERS);
        self
    }

    /// Set the deliberation window.
    pub fn with_deliberation_window(mut self, window: Duration) -> Self {
        self.deliberation_window = window;
        self
    }

    /// Set who may open voting.
    pub fn with_vote_opener(mut self, opener: VoteOpener) -> Self {
        self.vote_opener = opener;
        self
    }

    /// Set the self-vote policy.
    pub fn with_self_vote(mut self, policy: SelfVotePolicy) -> Self {
        self.self_vote = policy;
        self
    }

    /// Add a moderator.
    pub fn with_moderator(mut self, id: impl Into<PlayerId>) -> Self {
        self.moderators.push(id.into());
        self
    }

    /// Whether `id` is a configured moderator.
    pub fn is_moderator(&self, id: &PlayerId) -> bool {
        self.moderators.contains(id)
    }
}
