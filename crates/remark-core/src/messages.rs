//! User-facing titles and messages for operation outcomes.
//!
//! Frontends show a [`UserMessage`] after every operation. Failures are
//! mapped per [`Operation`] so a dropped connection reads differently from a
//! missing record or a rejected login.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryPreference;
use crate::error::Error;

const UNKNOWN_ERROR: &str = "Some unknown error occurred. Please try again.";

/// An operation a user can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
    LogIn,
    SignUp,
    LogOut,
}

impl Operation {
    fn verb(&self) -> &'static str {
        match self {
            Operation::Fetch => "load the landmarks",
            Operation::Create => "save the landmark",
            Operation::Update => "update the landmark",
            Operation::Delete => "delete the landmark",
            Operation::LogIn => "login",
            Operation::SignUp => "signup",
            Operation::LogOut => "logout",
        }
    }

    fn short_verb(&self) -> &'static str {
        match self {
            Operation::Fetch => "load",
            Operation::Create => "save",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::LogIn => "login",
            Operation::SignUp => "signup",
            Operation::LogOut => "logout",
        }
    }
}

/// A title and body ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    pub title: String,
    pub message: String,
}

impl UserMessage {
    fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Message for `err` raised while running `op`.
    pub fn for_error(op: Operation, err: &Error) -> Self {
        match err {
            Error::NetworkUnavailable(_) => Self::new(
                "No Internet Connection",
                format!(
                    "Internet connection appears to be offline. Could not {}.",
                    op.verb()
                ),
            ),
            Error::RecordNotFound(_) => Self::new(
                "Failure",
                format!(
                    "Landmark information was not found on the server. So could not {}.",
                    op.short_verb()
                ),
            ),
            Error::InvalidCredentials => Self::new(
                "Login Failed",
                "You have entered invalid credentials. Please try again.",
            ),
            Error::UsernameTaken(_) => Self::new(
                "Signup Failed",
                "The username you have chosen has already been taken up by another user. \
                 Please choose a different one.",
            ),
            Error::Unauthorized(_) if op == Operation::LogIn => Self::new(
                "Login Failed",
                "Could not succeed because access was denied.",
            ),
            Error::Unauthorized(_) => Self::new(
                "Error",
                format!(
                    "Cannot {} landmark because user login session has been expired \
                     or some unknown error occurred.",
                    op.short_verb()
                ),
            ),
            Error::InvalidInput(detail) => Self::new("Invalid Input", detail.clone()),
            Error::Backend(detail) => {
                let title = match op {
                    Operation::Create | Operation::Update => "Could not Save",
                    Operation::Delete => "Could not Delete",
                    _ => "Error Occurred",
                };
                Self::new(title, detail.clone())
            }
            _ => Self::new("Error Occurred", UNKNOWN_ERROR),
        }
    }

    /// Message for a successful `op`, if the operation announces one.
    pub fn for_success(op: Operation) -> Option<Self> {
        match op {
            Operation::Create => Some(Self::new("Success", "You have just added a landmark.")),
            Operation::Update => Some(Self::new(
                "Success",
                "The landmark was updated with new remark.",
            )),
            Operation::Delete => Some(Self::new("Success", "The landmark was deleted.")),
            Operation::SignUp => Some(Self::new(
                "Signup Successful",
                "You have been signed up. Please login now.",
            )),
            Operation::Fetch | Operation::LogIn | Operation::LogOut => None,
        }
    }

    /// Summary shown after a fetch: how many landmarks were found and where.
    pub fn fetch_summary(count: usize, boundary: BoundaryPreference) -> Self {
        let count = if count > 0 {
            count.to_string()
        } else {
            "No".to_string()
        };
        let message = match boundary.radius_km() {
            Some(km) => format!(
                "{} landmarks located after searching {} km radius from your current location.",
                count, km
            ),
            None => format!(
                "{} landmarks located after searching globally everywhere.",
                count
            ),
        };
        Self::new("Information", message)
    }
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_message_names_operation() {
        let msg = UserMessage::for_error(
            Operation::Delete,
            &Error::NetworkUnavailable("timeout".to_string()),
        );
        assert_eq!(msg.title, "No Internet Connection");
        assert_eq!(
            msg.message,
            "Internet connection appears to be offline. Could not delete the landmark."
        );
    }

    #[test]
    fn test_not_found_message() {
        let msg = UserMessage::for_error(Operation::Update, &Error::RecordNotFound("x".into()));
        assert_eq!(msg.title, "Failure");
        assert!(msg.message.ends_with("So could not update."));
    }

    #[test]
    fn test_backend_titles_per_operation() {
        let err = Error::Backend("disk full".to_string());
        assert_eq!(
            UserMessage::for_error(Operation::Create, &err).title,
            "Could not Save"
        );
        assert_eq!(
            UserMessage::for_error(Operation::Update, &err).title,
            "Could not Save"
        );
        assert_eq!(
            UserMessage::for_error(Operation::Delete, &err).title,
            "Could not Delete"
        );
        let fetch = UserMessage::for_error(Operation::Fetch, &err);
        assert_eq!(fetch.title, "Error Occurred");
        assert_eq!(fetch.message, "disk full");
    }

    #[test]
    fn test_auth_messages() {
        assert_eq!(
            UserMessage::for_error(Operation::LogIn, &Error::InvalidCredentials).title,
            "Login Failed"
        );
        assert_eq!(
            UserMessage::for_error(Operation::SignUp, &Error::UsernameTaken("bob".into())).title,
            "Signup Failed"
        );
        let denied = UserMessage::for_error(Operation::LogIn, &Error::Unauthorized("no".into()));
        assert_eq!(denied.message, "Could not succeed because access was denied.");
        let expired = UserMessage::for_error(Operation::Delete, &Error::Unauthorized("no".into()));
        assert_eq!(expired.title, "Error");
        assert!(expired.message.starts_with("Cannot delete landmark"));
    }

    #[test]
    fn test_unknown_error_falls_back() {
        let msg = UserMessage::for_error(Operation::Fetch, &Error::Config("bad".into()));
        assert_eq!(msg.message, UNKNOWN_ERROR);
    }

    #[test]
    fn test_success_messages() {
        assert_eq!(
            UserMessage::for_success(Operation::Create).unwrap().message,
            "You have just added a landmark."
        );
        assert_eq!(
            UserMessage::for_success(Operation::Delete).unwrap().message,
            "The landmark was deleted."
        );
        assert!(UserMessage::for_success(Operation::Fetch).is_none());
    }

    #[test]
    fn test_fetch_summary() {
        assert_eq!(
            UserMessage::fetch_summary(0, BoundaryPreference::Unbounded).message,
            "No landmarks located after searching globally everywhere."
        );
        assert_eq!(
            UserMessage::fetch_summary(3, BoundaryPreference::TenKm).message,
            "3 landmarks located after searching 10 km radius from your current location."
        );
    }
}
