//! Ballot collection.
//!
//! Votes are counted per roster position so the tie-break in
//! [`crate::outcome::evaluate`] can prefer the earliest joiner. Every way of
//! naming a candidate (a numbered ballot, a mention, a button) is resolved to
//! a player before it is counted.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{SelfVotePolicy, VoteOpener};
use crate::error::{GameError, GameResult};
use crate::outcome::{Verdict, evaluate};
use crate::player::PlayerId;
use crate::session::{Session, SessionState};

/// How a voter names who they accuse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Candidate {
    /// A player named directly.
    Player(PlayerId),
    /// A zero-based position on the numbered ballot.
    Position(usize),
}

/// Votes collected for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    votes: Vec<u32>,
    voted: HashSet<PlayerId>,
    started_at: DateTime<Utc>,
}

impl Ballot {
    fn open(candidates: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            votes: vec![0; candidates],
            voted: HashSet::new(),
            started_at,
        }
    }

    /// Vote counts in roster order.
    pub fn votes(&self) -> &[u32] {
        &self.votes
    }

    /// Whether `id` has voted.
    pub fn has_voted(&self, id: &PlayerId) -> bool {
        self.voted.contains(id)
    }

    /// Number of ballots cast.
    pub fn cast(&self) -> usize {
        self.voted.len()
    }

    /// When voting opened.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Time since voting opened. Zero if the clock went backwards.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Result of a successful `cast_vote`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The vote was counted and the ballot is still open.
    Recorded {
        /// Ballots cast so far.
        cast: usize,
        /// Ballots needed to close automatically.
        expected: usize,
    },
    /// The voter had already voted; nothing changed.
    AlreadyVoted,
    /// This was the last vote. The session has been reset.
    Closed(Box<Verdict>),
}

impl Session {
    /// Move a running round into voting.
    pub fn open_vote(
        &mut self,
        requester: &PlayerId,
        opener: VoteOpener,
        now: DateTime<Utc>,
    ) -> GameResult<()> {
        if self.state == SessionState::Idle {
            return Err(GameError::NoActiveSession);
        }
        match opener {
            VoteOpener::OrganizerOnly if !self.is_organizer(requester) => {
                return Err(GameError::NotOrganizer("open voting"));
            }
            VoteOpener::AnyPlayer if !self.is_organizer(requester) && !self.has_player(requester) => {
                return Err(GameError::NotAParticipant(requester.clone()));
            }
            _ => {}
        }
        if self.state != SessionState::InProgress {
            return Err(GameError::InvalidState {
                action: "open voting",
                state: self.state,
            });
        }

        self.ballot = Some(Ballot::open(self.players.len(), now));
        self.state = SessionState::Voting;
        tracing::info!(session = ?self.id, by = %requester, "voting opened");
        Ok(())
    }

    /// Record one vote. When every player has voted the round is evaluated
    /// and the session reset.
    pub fn cast_vote(
        &mut self,
        voter: &PlayerId,
        candidate: &Candidate,
        policy: SelfVotePolicy,
    ) -> GameResult<VoteOutcome> {
        if self.state == SessionState::Idle {
            return Err(GameError::NoActiveSession);
        }
        if self.state != SessionState::Voting {
            return Err(GameError::InvalidState {
                action: "vote",
                state: self.state,
            });
        }
        if !self.has_player(voter) {
            return Err(GameError::NotAParticipant(voter.clone()));
        }

        let target = self.resolve(candidate)?;
        let is_self = &self.players[target].id == voter;
        let forbidden = match policy {
            SelfVotePolicy::Allowed => false,
            SelfVotePolicy::Forbidden => true,
            SelfVotePolicy::DirectTargetsOnly => matches!(candidate, Candidate::Player(_)),
        };
        if is_self && forbidden {
            return Err(GameError::SelfVoteForbidden);
        }

        let expected = self.players.len();
        let Some(ballot) = self.ballot.as_mut() else {
            return Err(GameError::NoVoteInProgress);
        };
        if !ballot.voted.insert(voter.clone()) {
            return Ok(VoteOutcome::AlreadyVoted);
        }
        ballot.votes[target] += 1;
        let cast = ballot.voted.len();
        tracing::debug!(session = ?self.id, voter = %voter, cast, expected, "vote recorded");

        if cast < expected {
            return Ok(VoteOutcome::Recorded { cast, expected });
        }
        let verdict = self.close_ballot()?;
        Ok(VoteOutcome::Closed(Box::new(verdict)))
    }

    /// Close the ballot on the organizer's request, once the deliberation
    /// window has passed.
    pub fn request_results(
        &mut self,
        requester: &PlayerId,
        window: Duration,
        now: DateTime<Utc>,
    ) -> GameResult<Verdict> {
        if self.state == SessionState::Idle {
            return Err(GameError::NoActiveSession);
        }
        if !self.is_organizer(requester) {
            return Err(GameError::NotOrganizer("request results"));
        }
        let Some(ballot) = self.ballot.as_ref() else {
            return Err(GameError::NoVoteInProgress);
        };
        let elapsed = ballot.elapsed(now);
        if elapsed < window {
            return Err(GameError::TooEarly {
                remaining: window - elapsed,
            });
        }
        self.close_ballot()
    }

    /// Evaluate the ballot and reset. Leaves the session untouched on error.
    fn close_ballot(&mut self) -> GameResult<Verdict> {
        let (Some(ballot), Some(roles)) = (self.ballot.as_ref(), self.roles.as_ref()) else {
            return Err(GameError::NoVoteInProgress);
        };
        let verdict = evaluate(&self.players, ballot.votes(), roles)?;
        self.state = SessionState::Completed;
        tracing::info!(
            session = ?self.id,
            accused = %verdict.accused.id,
            winner = ?verdict.winner,
            "round decided"
        );
        self.reset();
        Ok(verdict)
    }

    fn resolve(&self, candidate: &Candidate) -> GameResult<usize> {
        match candidate {
            Candidate::Player(id) => self
                .position_of(id)
                .ok_or_else(|| GameError::UnknownCandidate(id.to_string())),
            Candidate::Position(idx) if *idx < self.players.len() => Ok(*idx),
            Candidate::Position(idx) => Err(GameError::UnknownCandidate(format!("#{}", idx + 1))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Winner;
    use crate::player::Player;
    use crate::roles::fixed_assignment;
    use chrono::TimeDelta;

    const WINDOW: Duration = Duration::from_secs(60);

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    /// A session in progress with players a, b, c; b is the wolf.
    fn running() -> Session {
        let mut s = Session::new();
        s.open(Player::new("a", "Ann")).unwrap();
        for (id, name) in [("a", "Ann"), ("b", "Ben"), ("c", "Cid")] {
            s.join(Player::new(id, name)).unwrap();
        }
        s.roles = Some(fixed_assignment("animals", "dog", "cat", &s.players, "b"));
        s.topic = Some("animals".into());
        s.state = SessionState::InProgress;
        s
    }

    fn voting() -> Session {
        let mut s = running();
        s.open_vote(&"a".into(), VoteOpener::AnyPlayer, t0()).unwrap();
        s
    }

    fn vote(s: &mut Session, voter: &str, target: &str) -> GameResult<VoteOutcome> {
        s.cast_vote(
            &voter.into(),
            &Candidate::Player(target.into()),
            SelfVotePolicy::DirectTargetsOnly,
        )
    }

    #[test]
    fn open_vote_initializes_ballot() {
        let s = voting();
        assert_eq!(s.state(), SessionState::Voting);
        assert_eq!(s.ballot().unwrap().votes(), &[0, 0, 0]);
        assert_eq!(s.vote_started_at(), Some(t0()));
    }

    #[test]
    fn open_vote_requires_running_round() {
        let mut s = Session::new();
        s.open(Player::new("a", "Ann")).unwrap();
        let err = s
            .open_vote(&"a".into(), VoteOpener::AnyPlayer, t0())
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidState { .. }));
    }

    #[test]
    fn organizer_only_opener() {
        let mut s = running();
        let err = s
            .open_vote(&"b".into(), VoteOpener::OrganizerOnly, t0())
            .unwrap_err();
        assert_eq!(err, GameError::NotOrganizer("open voting"));
        s.open_vote(&"a".into(), VoteOpener::OrganizerOnly, t0())
            .unwrap();
    }

    #[test]
    fn outsider_cannot_open_vote() {
        let mut s = running();
        let err = s
            .open_vote(&"z".into(), VoteOpener::AnyPlayer, t0())
            .unwrap_err();
        assert_eq!(err, GameError::NotAParticipant("z".into()));
    }

    #[test]
    fn non_participant_cannot_vote() {
        let mut s = voting();
        assert_eq!(
            vote(&mut s, "z", "a").unwrap_err(),
            GameError::NotAParticipant("z".into())
        );
    }

    #[test]
    fn direct_self_vote_is_rejected() {
        let mut s = voting();
        assert_eq!(
            vote(&mut s, "a", "a").unwrap_err(),
            GameError::SelfVoteForbidden
        );
        assert_eq!(s.ballot().unwrap().cast(), 0);
    }

    #[test]
    fn positional_self_vote_is_allowed_by_default() {
        let mut s = voting();
        let out = s
            .cast_vote(
                &"a".into(),
                &Candidate::Position(0),
                SelfVotePolicy::DirectTargetsOnly,
            )
            .unwrap();
        assert_eq!(out, VoteOutcome::Recorded { cast: 1, expected: 3 });
    }

    #[test]
    fn forbidden_policy_rejects_positional_self_vote() {
        let mut s = voting();
        let err = s
            .cast_vote(&"a".into(), &Candidate::Position(0), SelfVotePolicy::Forbidden)
            .unwrap_err();
        assert_eq!(err, GameError::SelfVoteForbidden);
    }

    #[test]
    fn unknown_candidate() {
        let mut s = voting();
        assert!(matches!(
            vote(&mut s, "a", "z").unwrap_err(),
            GameError::UnknownCandidate(_)
        ));
        let err = s
            .cast_vote(&"a".into(), &Candidate::Position(3), SelfVotePolicy::Allowed)
            .unwrap_err();
        assert_eq!(err, GameError::UnknownCandidate("#4".into()));
    }

    #[test]
    fn second_vote_is_ignored() {
        let mut s = voting();
        vote(&mut s, "a", "b").unwrap();
        assert_eq!(vote(&mut s, "a", "c").unwrap(), VoteOutcome::AlreadyVoted);
        let ballot = s.ballot().unwrap();
        assert_eq!(ballot.votes(), &[0, 1, 0]);
        assert_eq!(ballot.cast(), 1);
    }

    #[test]
    fn last_vote_closes_and_resets() {
        let mut s = voting();
        vote(&mut s, "a", "b").unwrap();
        vote(&mut s, "c", "b").unwrap();
        let out = vote(&mut s, "b", "c").unwrap();
        let VoteOutcome::Closed(verdict) = out else {
            panic!("expected closed ballot, got {out:?}");
        };
        assert_eq!(verdict.accused.id.as_str(), "b");
        assert_eq!(verdict.winner, Winner::Citizens);
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.open(Player::new("c", "Cid")).is_ok());
    }

    #[test]
    fn vote_outside_voting_is_invalid() {
        let mut s = running();
        assert!(matches!(
            vote(&mut s, "a", "b").unwrap_err(),
            GameError::InvalidState { action: "vote", .. }
        ));
    }

    #[test]
    fn manual_results_before_window_is_too_early() {
        let mut s = voting();
        vote(&mut s, "a", "b").unwrap();
        let err = s
            .request_results(&"a".into(), WINDOW, t0() + TimeDelta::seconds(59))
            .unwrap_err();
        assert_eq!(
            err,
            GameError::TooEarly {
                remaining: Duration::from_secs(1)
            }
        );
        assert_eq!(s.state(), SessionState::Voting);
    }

    #[test]
    fn manual_results_at_window_succeeds() {
        let mut s = voting();
        vote(&mut s, "a", "c").unwrap();
        let verdict = s
            .request_results(&"a".into(), WINDOW, t0() + TimeDelta::seconds(60))
            .unwrap();
        assert_eq!(verdict.accused.id.as_str(), "c");
        assert_eq!(verdict.winner, Winner::Wolf);
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn manual_results_need_organizer() {
        let mut s = voting();
        let err = s
            .request_results(&"b".into(), WINDOW, t0() + TimeDelta::seconds(90))
            .unwrap_err();
        assert_eq!(err, GameError::NotOrganizer("request results"));
    }

    #[test]
    fn manual_results_need_open_ballot() {
        let mut s = running();
        let err = s
            .request_results(&"a".into(), WINDOW, t0())
            .unwrap_err();
        assert_eq!(err, GameError::NoVoteInProgress);
    }

    #[test]
    fn manual_results_without_votes_keeps_ballot() {
        let mut s = voting();
        let err = s
            .request_results(&"a".into(), WINDOW, t0() + TimeDelta::seconds(61))
            .unwrap_err();
        assert_eq!(err, GameError::NoVotesCast);
        assert_eq!(s.state(), SessionState::Voting);
    }

    #[test]
    fn elapsed_saturates_at_zero() {
        let s = voting();
        let earlier = t0() - TimeDelta::seconds(5);
        assert_eq!(s.ballot().unwrap().elapsed(earlier), Duration::ZERO);
    }

    #[test]
    fn animals_round_end_to_end() {
        use crate::theme::ThemeRepository;
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let themes = ThemeRepository::parse("animals|dog,cat").unwrap();
        for seed in 0..10 {
            let mut s = Session::new();
            s.open(Player::new("P1", "One")).unwrap();
            for id in ["P1", "P2", "P3"] {
                s.join(Player::new(id, id)).unwrap();
            }
            s.set_topic(&"P1".into(), "animals", &themes).unwrap();
            s.start_game(&"P1".into(), 3, &themes, &mut StdRng::seed_from_u64(seed))
                .unwrap();

            let roles = s.roles().unwrap().clone();
            let mut words = [roles.citizen_word(), roles.wolf_word()];
            words.sort_unstable();
            assert_eq!(words, ["cat", "dog"]);
            assert_eq!(roles.holders_of(roles.wolf_word()).len(), 1);
            assert_eq!(roles.holders_of(roles.citizen_word()).len(), 2);

            s.open_vote(&"P3".into(), VoteOpener::AnyPlayer, t0()).unwrap();
            vote(&mut s, "P1", "P2").unwrap();
            vote(&mut s, "P2", "P3").unwrap();
            let VoteOutcome::Closed(verdict) = vote(&mut s, "P3", "P2").unwrap() else {
                panic!("ballot should close after three votes");
            };
            assert_eq!(verdict.accused.id.as_str(), "P2");
            let expected = if roles.wolf().as_str() == "P2" {
                Winner::Citizens
            } else {
                Winner::Wolf
            };
            assert_eq!(verdict.winner, expected);
            assert_eq!(s.state(), SessionState::Idle);
        }
    }
}
