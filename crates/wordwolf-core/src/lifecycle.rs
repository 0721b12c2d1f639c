//! Creating, joining, starting and ending sessions.

use rand::rngs::StdRng;

use crate::error::{GameError, GameResult};
use crate::outcome::Reveal;
use crate::player::{Player, PlayerId};
use crate::roles::assign_roles;
use crate::session::{Session, SessionId, SessionState};
use crate::theme::ThemeRepository;

/// Result of a successful `join`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The player was added to the roster.
    Joined,
    /// The player was already on the roster; nothing changed.
    AlreadyJoined,
}

impl Session {
    /// Open a lobby owned by `organizer`.
    pub fn open(&mut self, organizer: Player) -> GameResult<SessionId> {
        if self.is_active() {
            return Err(GameError::SessionAlreadyActive);
        }
        let id = SessionId::new();
        tracing::info!(session = %id, organizer = %organizer.id, "lobby opened");
        *self = Self {
            id: Some(id),
            state: SessionState::Lobby,
            organizer: Some(organizer),
            ..Self::default()
        };
        Ok(id)
    }

    /// Add a player to the lobby.
    pub fn join(&mut self, player: Player) -> GameResult<JoinOutcome> {
        self.require(SessionState::Lobby, "join")?;
        if self.has_player(&player.id) {
            return Ok(JoinOutcome::AlreadyJoined);
        }
        tracing::debug!(session = ?self.id, player = %player.id, "player joined");
        self.players.push(player);
        Ok(JoinOutcome::Joined)
    }

    /// Choose the topic for the coming round.
    pub fn set_topic(
        &mut self,
        requester: &PlayerId,
        topic: &str,
        themes: &ThemeRepository,
    ) -> GameResult<()> {
        self.require_organizer(requester, "change the topic")?;
        self.require(SessionState::Lobby, "change the topic")?;
        let topic = themes
            .get(topic)
            .ok_or_else(|| GameError::UnknownTopic(topic.to_string()))?;
        self.topic = Some(topic.name().to_string());
        Ok(())
    }

    /// Draw the words, pick the wolf and start discussion.
    ///
    /// An unset topic is drawn at random here. Nothing changes on error.
    pub fn start_game(
        &mut self,
        requester: &PlayerId,
        min_players: usize,
        themes: &ThemeRepository,
        rng: &mut StdRng,
    ) -> GameResult<()> {
        self.require_organizer(requester, "start the game")?;
        self.require(SessionState::Lobby, "start the game")?;
        if self.players.len() < min_players {
            return Err(GameError::InsufficientPlayers {
                required: min_players,
                joined: self.players.len(),
            });
        }

        let topic = match self.topic.as_deref() {
            Some(name) => themes
                .get(name)
                .ok_or_else(|| GameError::UnknownTopic(name.to_string()))?,
            None => themes.pick_random_topic(rng)?,
        };
        let roles = assign_roles(topic, &self.players, rng)?;

        tracing::info!(
            session = ?self.id,
            topic = topic.name(),
            players = self.players.len(),
            "round started"
        );
        self.topic = Some(topic.name().to_string());
        self.roles = Some(roles);
        self.state = SessionState::InProgress;
        Ok(())
    }

    /// Stop the game without a vote and reveal the roles, if any were dealt.
    pub fn end_game(&mut self, requester: &PlayerId) -> GameResult<Option<Reveal>> {
        self.require_organizer(requester, "end the game")?;
        let reveal = self
            .roles
            .as_ref()
            .and_then(|r| Reveal::from_roles(r, &self.players));
        tracing::info!(session = ?self.id, "game ended by organizer");
        self.reset();
        Ok(reveal)
    }

    fn require(&self, state: SessionState, action: &'static str) -> GameResult<()> {
        if self.state == SessionState::Idle {
            return Err(GameError::NoActiveSession);
        }
        if self.state != state {
            return Err(GameError::InvalidState {
                action,
                state: self.state,
            });
        }
        Ok(())
    }

    fn require_organizer(&self, requester: &PlayerId, action: &'static str) -> GameResult<()> {
        if self.state == SessionState::Idle {
            return Err(GameError::NoActiveSession);
        }
        if !self.is_organizer(requester) {
            return Err(GameError::NotOrganizer(action));
        }
        Ok(())
    }
}
