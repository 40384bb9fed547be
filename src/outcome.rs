//! Terminal result of one invocation: a success marker or a bounded message.

use std::fmt;

use crate::errors::RelocateError;

/// Longest result string handed back to the caller, in bytes.
pub const RESULT_MAX_LEN: usize = 255 - 1;

/// Exact result string on success.
pub const SUCCESS_MARKER: &str = "OK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationOutcome {
    Success,
    /// Data file relocated, but the old path does not lead to it.
    LinkMissing(String),
    Failed(String),
}

impl RelocationOutcome {
    pub fn from_error(e: &RelocateError) -> Self {
        let msg = truncate_message(e.to_string());
        if e.is_partial_success() {
            RelocationOutcome::LinkMissing(msg)
        } else {
            RelocationOutcome::Failed(msg)
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RelocationOutcome::Success => SUCCESS_MARKER,
            RelocationOutcome::LinkMissing(m) | RelocationOutcome::Failed(m) => m,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RelocationOutcome::Success)
    }

    /// Process exit status for the command-line front end.
    pub fn exit_code(&self) -> i32 {
        match self {
            RelocationOutcome::Success => 0,
            RelocationOutcome::Failed(_) => 1,
            RelocationOutcome::LinkMissing(_) => 3,
        }
    }
}

impl fmt::Display for RelocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Cut `msg` to at most RESULT_MAX_LEN bytes without splitting a character.
pub fn truncate_message(mut msg: String) -> String {
    if msg.len() > RESULT_MAX_LEN {
        let mut end = RESULT_MAX_LEN;
        while !msg.is_char_boundary(end) {
            end -= 1;
        }
        msg.truncate(end);
    }
    msg
}
