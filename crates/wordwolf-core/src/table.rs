//! Scope-keyed session store and command pipeline.
//!
//! Each scope (channel, room) owns one [`Session`] behind its own mutex, so
//! commands for one scope are applied one at a time while different scopes
//! proceed in parallel. A command returns a [`Dispatch`]: the reply for the
//! actor plus the messages to send. Delivery happens after the lock is
//! released.
//!
//! A scope only holds a slot while its session is active. Once a command
//! leaves the session idle the slot is retired and dropped from the map.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::clock::{Clock, SystemClock};
use crate::config::GameConfig;
use crate::error::{ErrorCategory, GameError, GameResult};
use crate::lifecycle::JoinOutcome;
use crate::notify::{Announcement, DeliveryReport, Notifier, Outbound, Whisper, deliver_all};
use crate::outcome::{Reveal, Verdict};
use crate::player::{Player, PlayerId, ScopeId};
use crate::roles::RoleSheet;
use crate::session::{Session, SessionId, SessionState};
use crate::theme::ThemeRepository;
use crate::voting::{Candidate, VoteOutcome};

/// An action issued by a player in a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a lobby.
    Open {
        /// The organizer.
        organizer: Player,
    },
    /// Join the lobby.
    Join {
        /// The joining player.
        player: Player,
    },
    /// Pick the topic.
    SetTopic {
        /// Who asked.
        requester: PlayerId,
        /// Topic name.
        topic: String,
    },
    /// Deal the words.
    Start {
        /// Who asked.
        requester: PlayerId,
    },
    /// Open the ballot.
    OpenVote {
        /// Who asked.
        requester: PlayerId,
    },
    /// Cast a vote.
    Vote {
        /// Who is voting.
        voter: PlayerId,
        /// Who they accuse.
        candidate: Candidate,
    },
    /// Close the ballot early.
    RequestResults {
        /// Who asked.
        requester: PlayerId,
    },
    /// Stop the game and reveal.
    End {
        /// Who asked.
        requester: PlayerId,
    },
    /// Show the role sheet to a moderator.
    RevealRoles {
        /// Who asked.
        requester: PlayerId,
    },
}

/// The answer to the actor who issued a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Lobby opened.
    Opened(SessionId),
    /// Added to the roster.
    Joined,
    /// Already on the roster.
    AlreadyJoined,
    /// Topic changed.
    TopicSet(String),
    /// Words dealt.
    Started {
        /// The topic used.
        topic: String,
    },
    /// Ballot open.
    VoteOpened,
    /// Vote counted.
    VoteRecorded {
        /// Ballots cast so far.
        cast: usize,
        /// Ballots needed to close.
        expected: usize,
    },
    /// The voter had already voted.
    AlreadyVoted,
    /// The round was decided.
    Verdict(Box<Verdict>),
    /// The game was stopped.
    Ended(Option<Reveal>),
    /// The moderator's role sheet.
    RoleSheet(RoleSheet),
}

/// A reply plus the messages the command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// For the actor.
    pub reply: Reply,
    /// For the platform to deliver.
    pub outbound: Vec<Outbound>,
}

impl Dispatch {
    fn reply(reply: Reply) -> Self {
        Self {
            reply,
            outbound: Vec::new(),
        }
    }

    /// Deliver the outbound messages, best effort.
    pub fn deliver(&self, notifier: &dyn Notifier) -> DeliveryReport {
        deliver_all(notifier, &self.outbound)
    }
}

struct Slot {
    session: Session,
    rng: StdRng,
    /// Removed from the map; commands must look the scope up again.
    retired: bool,
}

/// All sessions, one per scope.
pub struct GameTable {
    config: GameConfig,
    themes: Arc<ThemeRepository>,
    clock: Arc<dyn Clock>,
    scopes: Mutex<HashMap<ScopeId, Arc<Mutex<Slot>>>>,
}

impl GameTable {
    /// Create a table using the system clock.
    pub fn new(config: GameConfig, themes: Arc<ThemeRepository>) -> Self {
        Self::with_clock(config, themes, Arc::new(SystemClock))
    }

    /// Create a table with a custom clock.
    pub fn with_clock(
        config: GameConfig,
        themes: Arc<ThemeRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            themes,
            clock,
            scopes: Mutex::new(HashMap::new()),
        }
    }

    /// The table's configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The topic repository.
    pub fn themes(&self) -> &ThemeRepository {
        &self.themes
    }

    /// A copy of a scope's session. Scopes without a live session read as
    /// idle and are not added to the table.
    pub fn snapshot(&self, scope: &ScopeId) -> Session {
        let slot = lock(&self.scopes).get(scope).cloned();
        match slot {
            Some(slot) => lock(&slot).session.clone(),
            None => Session::new(),
        }
    }

    /// Number of scopes currently holding a session slot.
    pub fn active_scopes(&self) -> usize {
        lock(&self.scopes).len()
    }

    /// Phase of a scope's session.
    pub fn state(&self, scope: &ScopeId) -> SessionState {
        self.snapshot(scope).state()
    }

    /// Apply one command to a scope.
    pub fn handle(&self, scope: &ScopeId, command: Command) -> GameResult<Dispatch> {
        loop {
            let slot = self.slot(scope);
            let mut guard = lock(&slot);
            if guard.retired {
                continue;
            }
            let result = self.apply(scope, &mut guard, command);
            let broken = result.as_ref().err();
            if let Some(e) = broken.filter(|e| e.category() == ErrorCategory::Internal) {
                tracing::error!(%scope, error = %e, "engine invariant broken");
            }
            if guard.session.state() == SessionState::Idle {
                guard.retired = true;
                let mut scopes = lock(&self.scopes);
                if scopes.get(scope).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
                    scopes.remove(scope);
                }
            }
            return result;
        }
    }

    fn apply(&self, scope: &ScopeId, slot: &mut Slot, command: Command) -> GameResult<Dispatch> {
        let Slot { session, rng, .. } = slot;
        let span = tracing::debug_span!("command", %scope, session = ?session.id());
        let _enter = span.enter();

        match command {
            Command::Open { organizer } => {
                let id = session.open(organizer)?;
                Ok(Dispatch {
                    reply: Reply::Opened(id),
                    outbound: vec![self.lobby(scope, session)],
                })
            }
            Command::Join { player } => match session.join(player)? {
                JoinOutcome::AlreadyJoined => Ok(Dispatch::reply(Reply::AlreadyJoined)),
                JoinOutcome::Joined => Ok(Dispatch {
                    reply: Reply::Joined,
                    outbound: vec![self.lobby(scope, session)],
                }),
            },
            Command::SetTopic { requester, topic } => {
                session.set_topic(&requester, &topic, &self.themes)?;
                Ok(Dispatch {
                    reply: Reply::TopicSet(topic),
                    outbound: vec![self.lobby(scope, session)],
                })
            }
            Command::Start { requester } => {
                session.start_game(&requester, self.config.min_players, &self.themes, rng)?;
                Ok(self.started(scope, session))
            }
            Command::OpenVote { requester } => {
                session.open_vote(&requester, self.config.vote_opener, self.clock.now())?;
                Ok(Dispatch {
                    reply: Reply::VoteOpened,
                    outbound: vec![Outbound::Broadcast {
                        scope: scope.clone(),
                        announcement: Announcement::VoteOpened {
                            candidates: session.players().to_vec(),
                        },
                    }],
                })
            }
            Command::Vote { voter, candidate } => {
                match session.cast_vote(&voter, &candidate, self.config.self_vote)? {
                    VoteOutcome::Recorded { cast, expected } => {
                        Ok(Dispatch::reply(Reply::VoteRecorded { cast, expected }))
                    }
                    VoteOutcome::AlreadyVoted => Ok(Dispatch::reply(Reply::AlreadyVoted)),
                    VoteOutcome::Closed(verdict) => Ok(verdict_dispatch(scope, verdict)),
                }
            }
            Command::RequestResults { requester } => {
                let verdict = session.request_results(
                    &requester,
                    self.config.deliberation_window,
                    self.clock.now(),
                )?;
                Ok(verdict_dispatch(scope, Box::new(verdict)))
            }
            Command::End { requester } => {
                let reveal = session.end_game(&requester)?;
                Ok(Dispatch {
                    reply: Reply::Ended(reveal.clone()),
                    outbound: vec![Outbound::Broadcast {
                        scope: scope.clone(),
                        announcement: Announcement::Ended(reveal),
                    }],
                })
            }
            Command::RevealRoles { requester } => {
                if !self.config.is_moderator(&requester) {
                    return Err(GameError::NotModerator(requester));
                }
                if !session.is_active() {
                    return Err(GameError::NoActiveSession);
                }
                let Some(roles) = session.roles() else {
                    return Err(GameError::InvalidState {
                        action: "reveal roles",
                        state: session.state(),
                    });
                };
                Ok(Dispatch::reply(Reply::RoleSheet(
                    roles.role_sheet(session.players()),
                )))
            }
        }
    }

    /// Apply a command and deliver its messages after the scope lock is
    /// released. Delivery failures are logged and returned, never raised.
    pub fn handle_and_deliver(
        &self,
        scope: &ScopeId,
        command: Command,
        notifier: &dyn Notifier,
    ) -> GameResult<(Reply, DeliveryReport)> {
        let dispatch = self.handle(scope, command)?;
        let report = dispatch.deliver(notifier);
        Ok((dispatch.reply, report))
    }

    fn slot(&self, scope: &ScopeId) -> Arc<Mutex<Slot>> {
        let mut scopes = lock(&self.scopes);
        Arc::clone(scopes.entry(scope.clone()).or_insert_with(|| {
            let rng = match self.config.seed {
                Some(seed) => StdRng::seed_from_u64(seed ^ scope_hash(scope)),
                None => StdRng::from_os_rng(),
            };
            Arc::new(Mutex::new(Slot {
                session: Session::new(),
                rng,
                retired: false,
            }))
        }))
    }

    fn lobby(&self, scope: &ScopeId, session: &Session) -> Outbound {
        Outbound::Broadcast {
            scope: scope.clone(),
            announcement: Announcement::Lobby {
                organizer: session.organizer().cloned(),
                topic: session.topic().map(str::to_string),
                players: session.players().to_vec(),
            },
        }
    }

    fn started(&self, scope: &ScopeId, session: &Session) -> Dispatch {
        let topic = session.topic().unwrap_or_default().to_string();
        let mut outbound = vec![Outbound::Broadcast {
            scope: scope.clone(),
            announcement: Announcement::GameStarted {
                topic: topic.clone(),
                players: session.players().to_vec(),
            },
        }];
        for player in session.players() {
            if let Some(word) = session.word_of(&player.id) {
                outbound.push(Outbound::Whisper {
                    to: player.id.clone(),
                    message: Whisper::Word {
                        topic: topic.clone(),
                        word: word.to_string(),
                    },
                });
            }
        }
        if let Some(roles) = session.roles() {
            let sheet = roles.role_sheet(session.players());
            for moderator in &self.config.moderators {
                outbound.push(Outbound::Whisper {
                    to: moderator.clone(),
                    message: Whisper::RoleSheet(sheet.clone()),
                });
            }
        }
        Dispatch {
            reply: Reply::Started { topic },
            outbound,
        }
    }
}

fn verdict_dispatch(scope: &ScopeId, verdict: Box<Verdict>) -> Dispatch {
    Dispatch {
        outbound: vec![Outbound::Broadcast {
            scope: scope.clone(),
            announcement: Announcement::Verdict(verdict.clone()),
        }],
        reply: Reply::Verdict(verdict),
    }
}

/// FNV-1a over the scope id, stable across runs and toolchains.
fn scope_hash(scope: &ScopeId) -> u64 {
    scope
        .as_str()
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
