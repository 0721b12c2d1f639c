//! Session engine for word wolf, a social deduction party game.
//!
//! Players gather in a lobby, everyone but one secretly receives the same
//! word while the wolf gets a different word from the same topic, the group
//! talks, votes, and the accused is revealed. This crate holds the game rules
//! and per-scope session state; rendering and message delivery belong to the
//! messaging platform adapter, which talks to the engine through
//! [`GameTable`], [`Command`] and [`Notifier`].

pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod notify;
pub mod outcome;
pub mod player;
pub mod roles;
pub mod session;
pub mod table;
pub mod theme;
pub mod voting;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{GameConfig, SelfVotePolicy, VoteOpener};
pub use error::{ErrorCategory, GameError, GameResult};
pub use lifecycle::JoinOutcome;
pub use notify::{Announcement, Delivery, DeliveryReport, Notifier, Outbound, Whisper};
pub use outcome::{Reveal, Verdict, Winner};
pub use player::{Player, PlayerId, ScopeId};
pub use roles::{Role, RoleAssignment, RoleSheet};
pub use session::{Session, SessionId, SessionState};
pub use table::{Command, Dispatch, GameTable, Reply};
pub use theme::{ThemeRepository, Topic};
pub use voting::{Ballot, Candidate, VoteOutcome};
