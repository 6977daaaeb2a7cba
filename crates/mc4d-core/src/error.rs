//! Structured errors for hosts that need to tell the user what went wrong

use serde::{Deserialize, Serialize};
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    DegenerateFrame,
    NoMatchingOrientation,
    InvalidGrip,
    InvalidMove,
    MalformedStream,
    NoSession,
    SessionBusy,
    MacroNotFound,
    Io,
    Unknown,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestions: Vec::new(),
            context: None,
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn degenerate_frame(refs: &[[i32; 4]; 3]) -> Self {
        Self::new(
            ErrorCode::DegenerateFrame,
            "reference stickers are linearly dependent",
        )
        .with_suggestions(vec![
            "pick three stickers that do not lie on a common plane through the center".into(),
        ])
        .with_context(serde_json::json!({ "refs": refs }))
    }

    pub fn no_matching_orientation(current: &[[i32; 4]; 3]) -> Self {
        Self::new(
            ErrorCode::NoMatchingOrientation,
            "no puzzle symmetry maps these reference stickers onto the macro's",
        )
        .with_suggestions(vec![
            "select reference stickers in the same pattern used when the macro was recorded".into(),
        ])
        .with_context(serde_json::json!({ "refs": current }))
    }

    pub fn invalid_grip(coords: &[i32; 4]) -> Self {
        Self::new(
            ErrorCode::InvalidGrip,
            format!("{:?} does not name a grip on this puzzle", coords),
        )
    }

    pub fn invalid_move(reason: &str) -> Self {
        Self::new(ErrorCode::InvalidMove, format!("invalid move: {}", reason))
    }

    pub fn malformed(line: usize, reason: &str) -> Self {
        Self::new(
            ErrorCode::MalformedStream,
            format!("line {}: {}", line, reason),
        )
        .with_context(serde_json::json!({ "line": line }))
    }

    pub fn no_session(what: &str) -> Self {
        Self::new(ErrorCode::NoSession, format!("no macro is open for {}", what))
    }

    pub fn session_busy(what: &str) -> Self {
        Self::new(
            ErrorCode::SessionBusy,
            format!("a macro is already open for {}", what),
        )
        .with_suggestions(vec!["close the current session first".into()])
    }

    pub fn macro_not_found(which: impl fmt::Display) -> Self {
        Self::new(ErrorCode::MacroNotFound, format!("no macro {}", which))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Self::new(ErrorCode::Unknown, e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorCode::Io, e.to_string())
    }
}
