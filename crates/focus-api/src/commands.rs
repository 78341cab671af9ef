//! Command types accepted by the focusd command surface
//!
//! Commands are line-oriented text (`start`, `queue add 25m 2`, ...) so the
//! daemon can be driven from a terminal, a shell pipe or a keybinding script.

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::Visibility;

/// Errors produced while parsing a command line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing argument for '{command}': {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Invalid {argument} '{value}'")]
    InvalidArgument {
        argument: &'static str,
        value: String,
    },

    #[error("Unexpected trailing input: {0}")]
    TrailingInput(String),
}

/// Operations on the session queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCommand {
    /// Show the queue
    List,
    /// Append a planned focus session
    Add { duration: Duration, iterations: u32 },
    /// Remove the entry at `index`
    Remove { index: usize },
    /// Swap two entries
    Swap { index: usize, target: usize },
    /// Add one iteration to an entry
    Increment { index: usize },
    /// Remove one iteration from an entry (never below one)
    Decrement { index: usize },
    /// Change the duration of an entry
    SetDuration { index: usize, duration: Duration },
    /// Drop every entry
    Clear,
}

/// All commands understood by the daemon
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start or resume the current session
    Start,

    /// Pause the current session
    Pause,

    /// Start when paused, pause when playing
    Toggle,

    /// Complete the current session immediately
    Skip,

    /// Discard progress of the current session
    Restart,

    /// Print the current state
    Status,

    /// Change host visibility (selects the tick source)
    SetVisibility(Visibility),

    /// Re-read the configuration file
    Reload,

    /// Session queue operations
    Queue(QueueCommand),

    /// Print recently recorded sessions
    History { limit: usize },

    /// Shut the daemon down
    Quit,
}

/// Default number of sessions printed by `history`
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or(ParseCommandError::Empty)?;

        let command = match head.to_lowercase().as_str() {
            "start" | "play" | "resume" => Command::Start,
            "pause" | "stop" => Command::Pause,
            "toggle" => Command::Toggle,
            "skip" | "next" => Command::Skip,
            "restart" | "reset" => Command::Restart,
            "status" => Command::Status,
            "show" => Command::SetVisibility(Visibility::Visible),
            "hide" => Command::SetVisibility(Visibility::Hidden),
            "reload" => Command::Reload,
            "quit" | "exit" => Command::Quit,
            "history" => {
                let limit = match words.next() {
                    Some(value) => parse_index("limit", value)?,
                    None => DEFAULT_HISTORY_LIMIT,
                };
                Command::History { limit }
            }
            "queue" => Command::Queue(parse_queue(&mut words)?),
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };

        let rest: Vec<&str> = words.collect();
        if !rest.is_empty() {
            return Err(ParseCommandError::TrailingInput(rest.join(" ")));
        }

        Ok(command)
    }
}

fn parse_queue<'a>(
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<QueueCommand, ParseCommandError> {
    let Some(op) = words.next() else {
        return Ok(QueueCommand::List);
    };

    let mut require = |argument: &'static str| {
        words.next().ok_or(ParseCommandError::MissingArgument {
            command: "queue",
            argument,
        })
    };

    let command = match op.to_lowercase().as_str() {
        "list" | "ls" => QueueCommand::List,
        "add" => {
            let duration = parse_duration_arg(require("duration")?)?;
            // Iteration count is optional; checked after the match for trailing input
            QueueCommand::Add {
                duration,
                iterations: 1,
            }
        }
        "rm" | "remove" => QueueCommand::Remove {
            index: parse_index("index", require("index")?)?,
        },
        "swap" => QueueCommand::Swap {
            index: parse_index("index", require("index")?)?,
            target: parse_index("target", require("target")?)?,
        },
        "inc" => QueueCommand::Increment {
            index: parse_index("index", require("index")?)?,
        },
        "dec" => QueueCommand::Decrement {
            index: parse_index("index", require("index")?)?,
        },
        "set" => QueueCommand::SetDuration {
            index: parse_index("index", require("index")?)?,
            duration: parse_duration_arg(require("duration")?)?,
        },
        "clear" => QueueCommand::Clear,
        other => return Err(ParseCommandError::Unknown(format!("queue {}", other))),
    };

    if let QueueCommand::Add { duration, .. } = command
        && let Some(value) = words.next()
    {
        let iterations: u32 = value.parse().map_err(|_| ParseCommandError::InvalidArgument {
            argument: "iterations",
            value: value.to_string(),
        })?;
        return Ok(QueueCommand::Add {
            duration,
            iterations,
        });
    }

    Ok(command)
}

fn parse_index(argument: &'static str, value: &str) -> Result<usize, ParseCommandError> {
    value.parse().map_err(|_| ParseCommandError::InvalidArgument {
        argument,
        value: value.to_string(),
    })
}

/// Parse `90`, `90s`, `25m` or `1h` into a duration.
pub fn parse_duration_arg(value: &str) -> Result<Duration, ParseCommandError> {
    let invalid = || ParseCommandError::InvalidArgument {
        argument: "duration",
        value: value.to_string(),
    };

    let (digits, multiplier) = match value.char_indices().last() {
        Some((idx, 's')) => (&value[..idx], 1),
        Some((idx, 'm')) => (&value[..idx], 60),
        Some((idx, 'h')) => (&value[..idx], 3600),
        Some(_) => (value, 1),
        None => return Err(invalid()),
    };

    let amount: u64 = digits.parse().map_err(|_| invalid())?;
    Ok(Duration::from_secs(amount * multiplier))
}
