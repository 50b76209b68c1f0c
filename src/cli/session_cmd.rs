//! Interactive session command parsing

use std::str::FromStr;

use thiserror::Error;

/// A command typed at the session prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Start or stop recording
    Record,
    /// Toggle playback of the 1-based row
    Play(usize),
    Clear,
    Retry,
    List,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionCommandError {
    #[error("Unknown command \"{0}\". Type 'h' for help")]
    Unknown(String),

    #[error("Which recording? Usage: play <number>")]
    MissingNumber,

    #[error("\"{0}\" is not a recording number")]
    InvalidNumber(String),

    #[error("\"{0}\" takes no arguments")]
    UnexpectedArgument(String),
}

impl FromStr for SessionCommand {
    type Err = SessionCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();
        let argument = words.next();

        if let Some(extra) = words.next() {
            return Err(SessionCommandError::UnexpectedArgument(extra.to_string()));
        }

        let simple = match command.as_str() {
            "p" | "play" => {
                let raw = argument.ok_or(SessionCommandError::MissingNumber)?;
                return match raw.trim_start_matches('#').parse::<usize>() {
                    Ok(n) if n > 0 => Ok(Self::Play(n)),
                    _ => Err(SessionCommandError::InvalidNumber(raw.to_string())),
                };
            }
            "r" | "record" => Self::Record,
            "c" | "clear" => Self::Clear,
            "retry" => Self::Retry,
            "l" | "ls" | "list" => Self::List,
            "" | "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            _ => return Err(SessionCommandError::Unknown(command)),
        };

        match argument {
            Some(arg) => Err(SessionCommandError::UnexpectedArgument(arg.to_string())),
            None => Ok(simple),
        }
    }
}
