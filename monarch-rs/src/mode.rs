//! Access modes and the command vocabulary.

use std::fmt;
use std::str::FromStr;

/// Direction a session was opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Existing file, records are read with `next`.
    Read,
    /// New file, records are appended with `write`.
    Write,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessMode::Read => "reading",
            AccessMode::Write => "writing",
        })
    }
}

impl FromStr for AccessMode {
    type Err = String;

    /// Accepts `"r"` and `"w"` (and the spelled-out forms).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" | "read" => Ok(AccessMode::Read),
            "w" | "write" => Ok(AccessMode::Write),
            other => Err(format!("access mode must be 'r' or 'w', got '{}'", other)),
        }
    }
}

/// One word of the dispatcher's command vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// `open <filename> <r|w>`
    Open,
    /// `close`
    Close,
    /// `hndl_stat`: is any file open?
    Status,
    /// `next_event`: read the next record.
    Next,
    /// `get_header`: the header of the file open for reading.
    Header,
    /// `write <data>`: append one record.
    Write,
}

impl Action {
    /// Every action, in vocabulary order.
    pub const ALL: [Action; 6] = [
        Action::Open,
        Action::Close,
        Action::Status,
        Action::Next,
        Action::Header,
        Action::Write,
    ];

    /// The command word for this action.
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Open => "open",
            Action::Close => "close",
            Action::Status => "hndl_stat",
            Action::Next => "next_event",
            Action::Header => "get_header",
            Action::Write => "write",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("unknown command '{}'", s))
    }
}
