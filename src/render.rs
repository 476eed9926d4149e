//! Maps analysis outcomes to the text shown in the status and results regions.

use crate::outcome::{token_text, RequestOutcome};

pub const IN_PROGRESS_TEXT: &str = "Recording... Please wait.";
pub const COMPLETED_TEXT: &str = "Processing completed!";
pub const NO_NOTES_TEXT: &str = "No valid notes found.";
pub const RESULTS_LABEL: &str = "Tone intervals: ";
pub const INTERVAL_DELIMITER: &str = ", ";

/// Where a trigger cycle ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    /// Service succeeded and reported at least one interval
    SuccessWithResults,
    /// Service succeeded but heard nothing usable
    SuccessNoResults,
    /// Service reported `success: false`
    SuccessError,
    /// Request failed or the body could not be parsed
    TransportFailure,
}

impl std::fmt::Display for TerminalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuccessWithResults => write!(f, "success-with-results"),
            Self::SuccessNoResults => write!(f, "success-no-results"),
            Self::SuccessError => write!(f, "success-error"),
            Self::TransportFailure => write!(f, "transport-failure"),
        }
    }
}

/// Full text content of the UI regions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Display {
    pub status: String,
    pub results: String,
    pub matches: Vec<String>,
}

/// Display shown as soon as a trigger fires.
pub fn in_progress() -> Display {
    Display {
        status: IN_PROGRESS_TEXT.to_string(),
        ..Display::default()
    }
}

/// Renders the result of one request. Pure: the same input always yields the same text.
pub fn outcome(result: &anyhow::Result<RequestOutcome>) -> (TerminalState, Display) {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            let display = Display {
                status: format!("Error: {e}"),
                ..Display::default()
            };
            return (TerminalState::TransportFailure, display);
        }
    };

    if !outcome.success {
        let error = outcome.error.as_deref().unwrap_or("undefined");
        let display = Display {
            status: format!("Error: {error}"),
            ..Display::default()
        };
        return (TerminalState::SuccessError, display);
    }

    if outcome.tone_intervals.is_empty() {
        let status = outcome
            .message
            .as_deref()
            .filter(|message| !message.is_empty())
            .unwrap_or(NO_NOTES_TEXT)
            .to_string();
        return (
            TerminalState::SuccessNoResults,
            Display {
                status,
                ..Display::default()
            },
        );
    }

    let tokens: Vec<String> = outcome.tone_intervals.iter().map(token_text).collect();
    let display = Display {
        status: COMPLETED_TEXT.to_string(),
        results: format!("{RESULTS_LABEL}{}", tokens.join(INTERVAL_DELIMITER)),
        matches: outcome.songs.iter().map(|song| song.display_line()).collect(),
    };
    (TerminalState::SuccessWithResults, display)
}
