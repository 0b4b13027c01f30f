//! Team name validation
//!
//! Team names are typed by the admin during setup and shown on the public
//! display for the whole game, so they are trimmed, bounded in length,
//! filtered for inappropriate content and required to be distinct.

use rustrict::CensorStr;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during team name validation
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Both teams were given the same name
    #[error("team names must differ")]
    Used,
    /// The name is empty or contains only whitespace
    #[error("team name cannot be empty")]
    Empty,
    /// The name contains inappropriate content
    #[error("team name is inappropriate")]
    Sinful,
    /// The name exceeds the maximum allowed length
    #[error("team name is too long")]
    TooLong,
}

/// Cleans and validates a single team name
///
/// # Returns
///
/// The name with surrounding whitespace removed.
///
/// # Errors
///
/// * `Error::TooLong` - Name exceeds the configured maximum length
/// * `Error::Empty` - Name is empty after trimming whitespace
/// * `Error::Sinful` - Name contains inappropriate content
pub fn team_name(name: &str) -> Result<String, Error> {
    if name.len() > crate::constants::team_name::MAX_LENGTH {
        return Err(Error::TooLong);
    }
    let name = rustrict::trim_whitespace(name);
    if name.is_empty() {
        return Err(Error::Empty);
    }
    if name.is_inappropriate() {
        return Err(Error::Sinful);
    }
    Ok(name.to_owned())
}

/// Cleans and validates both team names of a game
///
/// # Errors
///
/// Any error from [`team_name`], or `Error::Used` if both names are
/// identical after trimming.
pub fn team_names(names: &[String; 2]) -> Result<[String; 2], Error> {
    let first = team_name(&names[0])?;
    let second = team_name(&names[1])?;
    if first == second {
        return Err(Error::Used);
    }
    Ok([first, second])
}
