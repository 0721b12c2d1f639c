//! Tallying a closed ballot and deciding who won.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::player::Player;
use crate::roles::RoleAssignment;

/// Which side won the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    /// The accused player was the wolf.
    Citizens,
    /// The group accused a citizen.
    Wolf,
}

/// The hidden facts of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    /// Topic of the round.
    pub topic: String,
    /// The player who held the wolf word.
    pub wolf: Player,
    /// Majority word.
    pub citizen_word: String,
    /// The wolf's word.
    pub wolf_word: String,
}

impl Reveal {
    /// Build a reveal from a role assignment. `None` if the wolf is not in
    /// `players`.
    pub fn from_roles(roles: &RoleAssignment, players: &[Player]) -> Option<Self> {
        let wolf = players.iter().find(|p| &p.id == roles.wolf())?;
        Some(Self::with_wolf(roles, wolf))
    }

    fn with_wolf(roles: &RoleAssignment, wolf: &Player) -> Self {
        Self {
            topic: roles.topic().to_string(),
            wolf: wolf.clone(),
            citizen_word: roles.citizen_word().to_string(),
            wolf_word: roles.wolf_word().to_string(),
        }
    }
}

/// Outcome of a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// The player with the most votes.
    pub accused: Player,
    /// Votes the accused received.
    pub accused_votes: u32,
    /// Every player's vote count in roster order.
    pub tally: Vec<(Player, u32)>,
    /// The hidden facts.
    pub reveal: Reveal,
    /// Winning side.
    pub winner: Winner,
}

/// Tally `votes` (parallel to `players`) and decide the round.
///
/// Ties go to the candidate earliest in the roster.
pub fn evaluate(players: &[Player], votes: &[u32], roles: &RoleAssignment) -> GameResult<Verdict> {
    let mut best: Option<(usize, u32)> = None;
    for (idx, &count) in votes.iter().enumerate().take(players.len()) {
        if count > best.map_or(0, |(_, c)| c) {
            best = Some((idx, count));
        }
    }
    let Some((accused_idx, accused_votes)) = best else {
        return Err(GameError::NoVotesCast);
    };

    let wolf = players
        .iter()
        .find(|p| roles.word_for(&p.id) == Some(roles.wolf_word()))
        .ok_or_else(|| GameError::WolfNotSeated(roles.wolf().clone()))?;
    let accused = players[accused_idx].clone();
    let winner = if accused.id == wolf.id {
        Winner::Citizens
    } else {
        Winner::Wolf
    };

    Ok(Verdict {
        tally: players
            .iter()
            .cloned()
            .zip(votes.iter().copied().chain(std::iter::repeat(0)))
            .collect(),
        reveal: Reveal::with_wolf(roles, wolf),
        accused,
        accused_votes,
        winner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::fixed_assignment;

    fn roster() -> Vec<Player> {
        vec![
            Player::new("a", "Ann"),
            Player::new("b", "Ben"),
            Player::new("c", "Cid"),
        ]
    }

    #[test]
    fn tie_goes_to_first_in_roster() {
        let players = roster();
        let roles = fixed_assignment("animals", "dog", "cat", &players, "c");
        let verdict = evaluate(&players, &[2, 2, 1], &roles).unwrap();
        assert_eq!(verdict.accused.id.as_str(), "a");
        assert_eq!(verdict.accused_votes, 2);
        assert_eq!(verdict.winner, Winner::Wolf);
    }

    #[test]
    fn catching_the_wolf_wins_for_citizens() {
        let players = roster();
        let roles = fixed_assignment("animals", "dog", "cat", &players, "b");
        let verdict = evaluate(&players, &[0, 2, 1], &roles).unwrap();
        assert_eq!(verdict.accused.id.as_str(), "b");
        assert_eq!(verdict.winner, Winner::Citizens);
        assert_eq!(verdict.reveal.wolf.name, "Ben");
        assert_eq!(verdict.reveal.wolf_word, "cat");
        assert_eq!(verdict.reveal.citizen_word, "dog");
    }

    #[test]
    fn all_zero_is_no_votes() {
        let players = roster();
        let roles = fixed_assignment("animals", "dog", "cat", &players, "b");
        assert_eq!(
            evaluate(&players, &[0, 0, 0], &roles).unwrap_err(),
            GameError::NoVotesCast
        );
        assert_eq!(
            evaluate(&players, &[], &roles).unwrap_err(),
            GameError::NoVotesCast
        );
    }

    #[test]
    fn missing_wolf_is_an_internal_error() {
        let players = roster();
        let roles = fixed_assignment("animals", "dog", "cat", &players, "c");
        let err = evaluate(&players[..2], &[1, 1], &roles).unwrap_err();
        assert_eq!(err, GameError::WolfNotSeated("c".into()));
        assert_eq!(err.category(), crate::error::ErrorCategory::Internal);
    }

    #[test]
    fn tally_is_in_roster_order() {
        let players = roster();
        let roles = fixed_assignment("animals", "dog", "cat", &players, "a");
        let verdict = evaluate(&players, &[1, 0, 2], &roles).unwrap();
        let counts: Vec<u32> = verdict.tally.iter().map(|(_, c)| *c).collect();
        assert_eq!(counts, vec![1, 0, 2]);
        assert_eq!(verdict.accused.id.as_str(), "c");
    }

    #[test]
    fn reveal_from_roles() {
        let players = roster();
        let roles = fixed_assignment("animals", "dog", "cat", &players, "a");
        let reveal = Reveal::from_roles(&roles, &players).unwrap();
        assert_eq!(reveal.wolf.name, "Ann");
        assert!(Reveal::from_roles(&roles, &players[1..]).is_none());
    }

    #[test]
    fn verdict_serializes() {
        let players = roster();
        let roles = fixed_assignment("animals", "dog", "cat", &players, "a");
        let verdict = evaluate(&players, &[3, 0, 0], &roles).unwrap();
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["winner"], "Citizens");
        assert_eq!(json["accused"]["name"], "Ann");
    }
}
