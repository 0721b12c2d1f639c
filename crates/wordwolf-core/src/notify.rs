//! Outbound messages and best-effort delivery.
//!
//! The engine never talks to the messaging platform directly. Every state
//! change yields a list of [`Outbound`] messages that the caller hands to a
//! [`Notifier`] after the scope lock is released. A failed delivery is
//! reported and logged, never turned into a game error.

use serde::{Deserialize, Serialize};

use crate::outcome::{Reveal, Verdict};
use crate::player::{Player, PlayerId, ScopeId};
use crate::roles::RoleSheet;

/// A private message to one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Whisper {
    /// The recipient's secret word.
    Word {
        /// Topic of the round.
        topic: String,
        /// The recipient's word.
        word: String,
    },
    /// Every player's role, for moderators.
    RoleSheet(RoleSheet),
}

/// A message for everyone in the scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Announcement {
    /// Current lobby roster.
    Lobby {
        /// Who is running the game.
        organizer: Option<Player>,
        /// Chosen topic, or `None` for a random draw at start.
        topic: Option<String>,
        /// Joined players in join order.
        players: Vec<Player>,
    },
    /// Words are out; discussion begins.
    GameStarted {
        /// Topic of the round.
        topic: String,
        /// Players in the round.
        players: Vec<Player>,
    },
    /// The numbered ballot is open.
    VoteOpened {
        /// Candidates in ballot order.
        candidates: Vec<Player>,
    },
    /// The round's result.
    Verdict(Box<Verdict>),
    /// The organizer stopped the game.
    Ended(Option<Reveal>),
}

/// One message to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Private delivery.
    Whisper {
        /// Recipient.
        to: PlayerId,
        /// Content.
        message: Whisper,
    },
    /// Scope-wide delivery.
    Broadcast {
        /// Target scope.
        scope: ScopeId,
        /// Content.
        announcement: Announcement,
    },
}

/// Whether a message arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The platform accepted the message.
    Delivered,
    /// The platform refused it (closed DMs, missing permissions, ...).
    Failed(String),
}

/// The messaging platform's outbound side.
pub trait Notifier {
    /// Send a private message.
    fn notify(&self, to: &PlayerId, message: &Whisper) -> Delivery;

    /// Post to a whole scope.
    fn broadcast(&self, scope: &ScopeId, announcement: &Announcement) -> Delivery;
}

/// Deliver one message, logging a failure. The result may be ignored.
pub fn best_effort_notify(notifier: &dyn Notifier, outbound: &Outbound) -> Delivery {
    let delivery = match outbound {
        Outbound::Whisper { to, message } => notifier.notify(to, message),
        Outbound::Broadcast {
            scope,
            announcement,
        } => notifier.broadcast(scope, announcement),
    };
    if let Delivery::Failed(reason) = &delivery {
        match outbound {
            Outbound::Whisper { to, .. } => {
                tracing::warn!(player = %to, %reason, "private message not delivered");
            }
            Outbound::Broadcast { scope, .. } => {
                tracing::warn!(%scope, %reason, "announcement not delivered");
            }
        }
    }
    delivery
}

/// Counts from delivering a batch of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Messages the platform accepted.
    pub delivered: usize,
    /// Players whose private message failed.
    pub undelivered: Vec<PlayerId>,
    /// Announcements that failed.
    pub failed_broadcasts: usize,
}

impl DeliveryReport {
    /// Whether every message arrived.
    pub fn is_complete(&self) -> bool {
        self.undelivered.is_empty() && self.failed_broadcasts == 0
    }
}

/// Deliver a batch, continuing past failures.
pub fn deliver_all(notifier: &dyn Notifier, outbound: &[Outbound]) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for message in outbound {
        match (best_effort_notify(notifier, message), message) {
            (Delivery::Delivered, _) => report.delivered += 1,
            (Delivery::Failed(_), Outbound::Whisper { to, .. }) => {
                report.undelivered.push(to.clone());
            }
            (Delivery::Failed(_), Outbound::Broadcast { .. }) => report.failed_broadcasts += 1,
        }
    }
    report
}
