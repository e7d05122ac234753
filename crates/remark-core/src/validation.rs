//! Input checks applied before anything is sent to the backend.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::{MIN_NOTE_CHARS, PASSWORD_PATTERN, USERNAME_PATTERN};
use crate::error::{Error, Result};
use crate::search::condense_whitespace;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(USERNAME_PATTERN).expect("username pattern compiles"));

static PASSWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(PASSWORD_PATTERN).expect("password pattern compiles"));

/// Clean a note for storage and check it is long enough.
///
/// Returns the trimmed, whitespace-condensed note.
pub fn validate_note(note: &str) -> Result<String> {
    let cleaned = condense_whitespace(note);
    if cleaned.chars().count() < MIN_NOTE_CHARS {
        return Err(Error::InvalidInput(format!(
            "note must be at least {} characters",
            MIN_NOTE_CHARS
        )));
    }
    Ok(cleaned)
}

/// Check a username against the accepted pattern.
pub fn validate_username(username: &str) -> Result<()> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(Error::InvalidInput(
            "username must start with a letter followed by 2-15 letters, digits, '-', '_' or '.'"
                .to_string(),
        ))
    }
}

/// Check a password against the accepted pattern.
pub fn validate_password(password: &str) -> Result<()> {
    if PASSWORD_RE.is_match(password) {
        Ok(())
    } else {
        Err(Error::InvalidInput(
            "password must be 3-25 letters, digits or .!#$%&'*+/=?^_~-".to_string(),
        ))
    }
}
