//! Configuration constants for the feud game system
//!
//! This module contains the limits and defaults used throughout the
//! crate to keep setup input, catalog records and the connection
//! registry within sane bounds.

/// Game flow constants
pub mod game {
    /// Number of teams in every game
    pub const TEAM_COUNT: usize = 2;
    /// Strikes that end the controlling team's turn and open the steal
    pub const MAX_STRIKES: u8 = 3;
    /// Game-over threshold used before a game is set up
    pub const DEFAULT_MAX_SCORE: u64 = 200;
    /// Smallest game-over threshold accepted at setup
    pub const MIN_MAX_SCORE: u64 = 1;
    /// Largest game-over threshold accepted at setup
    pub const MAX_MAX_SCORE: u64 = 100_000;
    /// Maximum number of questions selected for a single game
    pub const MAX_SELECTED_QUESTIONS: usize = 100;
}

/// Team name constants
pub mod team_name {
    /// Maximum length of a team name in bytes, before trimming
    pub const MAX_LENGTH: usize = 30;
}

/// Question catalog constants
pub mod catalog {
    /// Maximum length of a question prompt
    pub const MAX_PROMPT_LENGTH: usize = 300;
    /// Maximum number of answers on one board
    pub const MAX_ANSWER_COUNT: usize = 12;
    /// Maximum length of an answer's text
    pub const MAX_ANSWER_LENGTH: usize = 100;
    /// Maximum points a single answer can be worth
    pub const MAX_ANSWER_VALUE: u64 = 10_000;
}

/// Connection registry constants
pub mod watchers {
    /// Maximum number of simultaneous connections (admins, displays and unassigned)
    pub const MAX_WATCHER_COUNT: usize = 256;
}
