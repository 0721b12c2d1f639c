//! Secret word and role assignment.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::config::MIN_PLAYERS;
use crate::error::{GameError, GameResult};
use crate::player::{Player, PlayerId};
use crate::theme::Topic;

/// A player's side in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Holds the majority word.
    Citizen,
    /// Holds the odd word out.
    Wolf,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Citizen => write!(f, "Citizen"),
            Self::Wolf => write!(f, "Wolf"),
        }
    }
}

/// The words drawn for a round and who holds which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    topic: String,
    citizen_word: String,
    wolf_word: String,
    wolf: PlayerId,
    word_of: HashMap<PlayerId, String>,
}

impl RoleAssignment {
    /// Topic the words were drawn from.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The majority word.
    pub fn citizen_word(&self) -> &str {
        &self.citizen_word
    }

    /// The wolf's word.
    pub fn wolf_word(&self) -> &str {
        &self.wolf_word
    }

    /// The player holding the wolf word.
    pub fn wolf(&self) -> &PlayerId {
        &self.wolf
    }

    /// Word handed to `id`.
    pub fn word_for(&self, id: &PlayerId) -> Option<&str> {
        self.word_of.get(id).map(String::as_str)
    }

    /// Role of `id`.
    pub fn role_of(&self, id: &PlayerId) -> Option<Role> {
        self.word_for(id).map(|w| {
            if w == self.wolf_word {
                Role::Wolf
            } else {
                Role::Citizen
            }
        })
    }

    /// Players whose word is `word`.
    pub fn holders_of(&self, word: &str) -> Vec<&PlayerId> {
        self.word_of
            .iter()
            .filter(|(_, w)| w.as_str() == word)
            .map(|(id, _)| id)
            .collect()
    }

    /// Every player's role in roster order, for moderators.
    pub fn role_sheet(&self, players: &[Player]) -> RoleSheet {
        RoleSheet {
            topic: self.topic.clone(),
            entries: players
                .iter()
                .filter_map(|p| self.role_of(&p.id).map(|role| (p.clone(), role)))
                .collect(),
        }
    }
}

/// Every player's role, visible only to moderators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSheet {
    /// Topic of the round.
    pub topic: String,
    /// Players and their roles in roster order.
    pub entries: Vec<(Player, Role)>,
}

/// Draw two distinct words from `topic` and pick one player as the wolf.
///
/// The first draw becomes the citizen word and the second the wolf word.
pub fn assign_roles(
    topic: &Topic,
    players: &[Player],
    rng: &mut StdRng,
) -> GameResult<RoleAssignment> {
    let words = topic.words();
    if words.len() < 2 {
        return Err(GameError::InsufficientWords {
            topic: topic.name().to_string(),
            available: words.len(),
        });
    }
    if players.len() < MIN_PLAYERS {
        return Err(GameError::InsufficientPlayers {
            required: MIN_PLAYERS,
            joined: players.len(),
        });
    }

    let first = rng.random_range(0..words.len());
    let mut second = rng.random_range(0..words.len() - 1);
    if second >= first {
        second += 1;
    }
    let citizen_word = words[first].clone();
    let wolf_word = words[second].clone();

    let wolf = players[rng.random_range(0..players.len())].id.clone();
    let word_of = players
        .iter()
        .map(|p| {
            let word = if p.id == wolf { &wolf_word } else { &citizen_word };
            (p.id.clone(), word.clone())
        })
        .collect();

    Ok(RoleAssignment {
        topic: topic.name().to_string(),
        citizen_word,
        wolf_word,
        wolf,
        word_of,
    })
}

#[cfg(test)]
pub(crate) fn fixed_assignment(
    topic: &str,
    citizen_word: &str,
    wolf_word: &str,
    players: &[Player],
    wolf: &str,
) -> RoleAssignment {
    let wolf = PlayerId::from(wolf);
    let word_of = players
        .iter()
        .map(|p| {
            let word = if p.id == wolf { wolf_word } else { citizen_word };
            (p.id.clone(), word.to_string())
        })
        .collect();
    RoleAssignment {
        topic: topic.to_string(),
        citizen_word: citizen_word.to_string(),
        wolf_word: wolf_word.to_string(),
        wolf,
        word_of,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player::new(format!("p{i}"), format!("Player {i}")))
            .collect()
    }

    #[test]
    fn two_word_topic_uses_both_words() {
        let topic = Topic::new("animals", ["dog", "cat"]);
        let roster = players(3);
        let mut rng = StdRng::seed_from_u64(42);
        let roles = assign_roles(&topic, &roster, &mut rng).unwrap();

        let mut words = [roles.citizen_word(), roles.wolf_word()];
        words.sort_unstable();
        assert_eq!(words, ["cat", "dog"]);
        assert_eq!(roles.holders_of(roles.wolf_word()).len(), 1);
        assert_eq!(roles.holders_of(roles.citizen_word()).len(), 2);
    }

    #[test]
    fn single_word_topic_is_rejected() {
        let topic = Topic::new("lonely", ["only"]);
        let mut rng = StdRng::seed_from_u64(1);
        let err = assign_roles(&topic, &players(3), &mut rng).unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientWords {
                topic: "lonely".into(),
                available: 1,
            }
        );
    }

    #[test]
    fn too_few_players_is_rejected() {
        let topic = Topic::new("animals", ["dog", "cat"]);
        let mut rng = StdRng::seed_from_u64(1);
        let err = assign_roles(&topic, &players(2), &mut rng).unwrap_err();
        assert!(matches!(err, GameError::InsufficientPlayers { joined: 2, .. }));
    }

    #[test]
    fn role_sheet_follows_roster_order() {
        let roster = players(3);
        let roles = fixed_assignment("animals", "dog", "cat", &roster, "p1");
        let sheet = roles.role_sheet(&roster);
        let sides: Vec<Role> = sheet.entries.iter().map(|(_, r)| *r).collect();
        assert_eq!(sides, vec![Role::Citizen, Role::Wolf, Role::Citizen]);
        assert_eq!(sheet.topic, "animals");
    }

    #[test]
    fn every_player_can_be_the_wolf() {
        let topic = Topic::new("animals", ["dog", "cat", "cow"]);
        let roster = players(3);
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(assign_roles(&topic, &roster, &mut rng).unwrap().wolf().clone());
        }
        assert_eq!(seen.len(), 3);
    }

    proptest! {
        #[test]
        fn exactly_one_wolf(seed in any::<u64>(), n in 3usize..12, w in 2usize..8) {
            let topic = Topic::new("t", (0..w).map(|i| format!("w{i}")));
            let roster = players(n);
            let mut rng = StdRng::seed_from_u64(seed);
            let roles = assign_roles(&topic, &roster, &mut rng).unwrap();

            prop_assert_ne!(roles.citizen_word(), roles.wolf_word());
            let wolves = roles.holders_of(roles.wolf_word());
            prop_assert_eq!(wolves.len(), 1);
            prop_assert_eq!(wolves[0], roles.wolf());
            prop_assert_eq!(roles.holders_of(roles.citizen_word()).len(), n - 1);
            for p in &roster {
                prop_assert!(roles.word_for(&p.id).is_some());
            }
        }
    }
}
