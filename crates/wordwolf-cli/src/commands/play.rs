use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;

use wordwolf_core::{
    Candidate, Command, ErrorCategory, GameConfig, GameTable, Player, PlayerId, ScopeId,
    VoteOpener,
};

use crate::console::{self, ConsoleNotifier};

const HELP: &str = "\
Commands (players are named by id):
  open <id>             open a lobby with <id> as organizer
  join <id>             join the lobby
  topic <id> <topic>    organizer picks the topic
  start <id>            organizer deals the words
  ballot <id>           open voting
  vote <id> <n|id>      vote by player id or ballot number (#n forces a number)
  results <id>          organizer closes the vote early
  end <id>              organizer stops the game and reveals
  roles <id>            moderator views the role sheet
  status                show the session state
  topics                list topics
  quit                  exit";

pub struct PlayOptions {
    pub seed: Option<u64>,
    pub window: u64,
    pub organizer_opens_vote: bool,
    pub moderators: Vec<String>,
    pub unreachable: Vec<String>,
}

pub fn run(file: &Path, options: PlayOptions) -> Result<(), String> {
    let themes = super::load_topics(file)?;
    if themes.is_empty() {
        return Err(format!("{} contains no topics", file.display()));
    }

    let mut config = GameConfig::default()
        .with_deliberation_window(Duration::from_secs(options.window));
    if let Some(seed) = options.seed {
        config = config.with_seed(seed);
    }
    if options.organizer_opens_vote {
        config = config.with_vote_opener(VoteOpener::OrganizerOnly);
    }
    for moderator in options.moderators {
        config = config.with_moderator(moderator);
    }

    let table = GameTable::new(config, Arc::new(themes));
    let notifier = ConsoleNotifier::new(
        options
            .unreachable
            .into_iter()
            .map(PlayerId::from)
            .collect(),
    );
    let scope = ScopeId::from("terminal");
    tracing::debug!(file = %file.display(), topics = table.themes().len(), "starting hot-seat table");

    println!("  {} Word Wolf", "Starting".bold());
    println!("  {} topics loaded", table.themes().len());
    println!("  Type 'help' for commands, 'quit' to exit.\n");

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let session = table.snapshot(&scope);
        let command = match parse(input, |id| session.has_player(&PlayerId::from(id))) {
            Ok(Input::Quit) => break,
            Ok(Input::Help) => {
                println!("{HELP}\n");
                continue;
            }
            Ok(Input::Status) => {
                println!(
                    "  State: {} | Topic: {} | Players: {}\n",
                    session.state(),
                    session.topic().unwrap_or("random"),
                    session.players().len()
                );
                continue;
            }
            Ok(Input::Topics) => {
                println!("  {}\n", table.themes().list_topics().join(", "));
                continue;
            }
            Ok(Input::Game(command)) => command,
            Err(usage) => {
                println!("{}\n", usage.yellow());
                continue;
            }
        };

        match table.handle_and_deliver(&scope, command, &notifier) {
            Ok((reply, report)) => {
                if let Some(text) = console::reply(&reply) {
                    println!("{text}");
                }
                for player in &report.undelivered {
                    println!(
                        "{}",
                        format!("  could not message {player}; the round continues").yellow()
                    );
                }
                println!();
            }
            Err(e) => {
                let text = match e.category() {
                    ErrorCategory::Precondition => e.to_string().yellow(),
                    ErrorCategory::Data | ErrorCategory::Internal => e.to_string().red(),
                };
                println!("{text}\n");
            }
        }
    }

    Ok(())
}

enum Input {
    Game(Command),
    Status,
    Topics,
    Help,
    Quit,
}

/// Parse one REPL line. `on_roster` tells whether a vote target is a joined
/// player's id; ids win over ballot numbers unless the number is written `#n`.
fn parse(input: &str, on_roster: impl Fn(&str) -> bool) -> Result<Input, String> {
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or_default().to_lowercase();
    let id = parts.next();
    let rest: Vec<&str> = parts.collect();

    let requester = || {
        id.map(PlayerId::from)
            .ok_or_else(|| format!("usage: {cmd} <id>"))
    };
    let player = || {
        id.map(|id| Player::new(id, id))
            .ok_or_else(|| format!("usage: {cmd} <id>"))
    };

    let command = match cmd.as_str() {
        "quit" | "q" => return Ok(Input::Quit),
        "help" => return Ok(Input::Help),
        "status" => return Ok(Input::Status),
        "topics" => return Ok(Input::Topics),
        "open" => Command::Open {
            organizer: player()?,
        },
        "join" => Command::Join { player: player()? },
        "topic" if !rest.is_empty() => Command::SetTopic {
            requester: requester()?,
            topic: rest.join(" "),
        },
        "topic" => return Err("usage: topic <id> <topic>".to_string()),
        "start" => Command::Start {
            requester: requester()?,
        },
        "ballot" => Command::OpenVote {
            requester: requester()?,
        },
        "vote" => {
            let voter = requester()?;
            let &[target] = rest.as_slice() else {
                return Err("usage: vote <id> <number|id>".to_string());
            };
            let (number, forced) = match target.strip_prefix('#') {
                Some(n) => (n, true),
                None => (target, false),
            };
            let candidate = match number.parse::<usize>() {
                _ if !forced && on_roster(target) => Candidate::Player(PlayerId::from(target)),
                Ok(0) => return Err("ballot numbers start at 1".to_string()),
                Ok(n) => Candidate::Position(n - 1),
                Err(_) if forced => return Err(format!("not a ballot number: {target}")),
                Err(_) => Candidate::Player(PlayerId::from(target)),
            };
            Command::Vote { voter, candidate }
        }
        "results" => Command::RequestResults {
            requester: requester()?,
        },
        "end" => Command::End {
            requester: requester()?,
        },
        "roles" => Command::RevealRoles {
            requester: requester()?,
        },
        other => return Err(format!("unknown command: {other} (try 'help')")),
    };
    Ok(Input::Game(command))
}
