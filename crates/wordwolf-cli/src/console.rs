//! Terminal rendering of engine messages.

use colored::Colorize;

use wordwolf_core::{
    Announcement, Delivery, Notifier, Player, PlayerId, Reply, Reveal, ScopeId, Verdict, Whisper,
    Winner,
};

/// Prints every message to stdout. Whispers to `unreachable` players fail,
/// the way closed direct messages do on a real platform.
pub struct ConsoleNotifier {
    unreachable: Vec<PlayerId>,
}

impl ConsoleNotifier {
    pub fn new(unreachable: Vec<PlayerId>) -> Self {
        Self { unreachable }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, to: &PlayerId, message: &Whisper) -> Delivery {
        if self.unreachable.contains(to) {
            return Delivery::Failed("direct messages are closed".to_string());
        }
        println!("{} {}", format!("[to {to}]").dimmed(), whisper(message));
        Delivery::Delivered
    }

    fn broadcast(&self, _scope: &ScopeId, message: &Announcement) -> Delivery {
        println!("{}", announcement(message));
        Delivery::Delivered
    }
}

pub fn whisper(message: &Whisper) -> String {
    match message {
        Whisper::Word { topic, word } => {
            format!("Topic: {topic}. Your word is \"{}\".", word.bold())
        }
        Whisper::RoleSheet(sheet) => {
            let mut out = format!("Roles for \"{}\":", sheet.topic);
            for (player, role) in &sheet.entries {
                out.push_str(&format!("\n  {}: {role}", player.name));
            }
            out
        }
    }
}

pub fn announcement(message: &Announcement) -> String {
    match message {
        Announcement::Lobby {
            organizer,
            topic,
            players,
        } => {
            let host = organizer.as_ref().map_or("?", |o| o.name.as_str());
            let topic = topic.as_deref().unwrap_or("random (can be changed)");
            format!(
                "{} hosted by {host}\n  Topic: {topic}\n  Players: {}",
                "Word wolf lobby".bold(),
                roster(players)
            )
        }
        Announcement::GameStarted { topic, players } => format!(
            "{} Category: {topic}\n  Players: {}\n  Start the discussion!",
            "Game started!".bold().red(),
            roster(players)
        ),
        Announcement::VoteOpened { candidates } => {
            let mut out = "Vote for the wolf:".bold().to_string();
            for (i, p) in candidates.iter().enumerate() {
                out.push_str(&format!("\n  {}. {}", i + 1, p.name));
            }
            out
        }
        Announcement::Verdict(v) => verdict(v),
        Announcement::Ended(reveal) => match reveal {
            Some(r) => format!("{}\n{}", "Game ended.".bold(), reveal_text(r)),
            None => "Game ended before words were dealt.".bold().to_string(),
        },
    }
}

pub fn reply(reply: &Reply) -> Option<String> {
    let text = match reply {
        Reply::Opened(_) => "Lobby opened.".to_string(),
        Reply::Joined => "Joined.".to_string(),
        Reply::AlreadyJoined => "Already joined.".to_string(),
        Reply::TopicSet(topic) => format!("Topic set to {topic}."),
        Reply::Started { .. } => "Words dealt.".to_string(),
        Reply::VoteOpened => "Voting is open.".to_string(),
        Reply::VoteRecorded { cast, expected } => format!("Vote recorded ({cast}/{expected})."),
        Reply::AlreadyVoted => "You have already voted.".to_string(),
        Reply::RoleSheet(sheet) => whisper(&Whisper::RoleSheet(sheet.clone())),
        Reply::Verdict(_) | Reply::Ended(_) => return None,
    };
    Some(text)
}

fn verdict(v: &Verdict) -> String {
    let mut out = "Voting results".bold().to_string();
    for (player, votes) in &v.tally {
        out.push_str(&format!("\n  {}: {votes}", player.name));
    }
    out.push_str(&format!(
        "\n  Accused: {} ({} votes)\n{}",
        v.accused.name,
        v.accused_votes,
        reveal_text(&v.reveal)
    ));
    let winner = match v.winner {
        Winner::Citizens => "Citizens win!".green().bold(),
        Winner::Wolf => "The wolf wins!".red().bold(),
    };
    out.push_str(&format!("\n  {winner}"));
    out
}

fn reveal_text(r: &Reveal) -> String {
    format!(
        "  The wolf was {} with \"{}\". Citizens had \"{}\".",
        r.wolf.name, r.wolf_word, r.citizen_word
    )
}

fn roster(players: &[Player]) -> String {
    if players.is_empty() {
        return "none".to_string();
    }
    players
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
