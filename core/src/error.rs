//! Error types for the users console.
//!
//! # Design
//! Every failure of a user action lands in `ClientError`, whatever layer
//! produced it. `ValidationError` is raised client-side before anything is
//! sent. Callers display `ClientError::user_message`, which prefers the
//! server's `detail` text over a per-category fallback.

use thiserror::Error;

use crate::form::DraftField;
use crate::http::TransportError;
use crate::types::UserId;

pub const API_FALLBACK: &str = "Failed to perform action";
pub const TRANSPORT_FALLBACK: &str = "No response from server. Please try again.";
pub const UNKNOWN_FALLBACK: &str = "An unexpected error occurred.";

/// A client-side constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{} is required", .0.label())]
    MissingField(DraftField),

    #[error("Please enter a valid phone number with at least 10 digits.")]
    InvalidPhoneNumber,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    /// `last` is the highest page currently reachable.
    #[error("page {page} is out of range 1..={last}")]
    PageOutOfRange { page: u32, last: u32 },

    #[error("page size {0} must be between 1 and 100")]
    InvalidPageSize(u32),

    #[error("no form is open")]
    FormClosed,

    #[error("user {0} is not on the current page")]
    UnknownRecord(UserId),
}

/// Errors produced by a users API round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No response was received.
    #[error("no response from server: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Anything else, e.g. an undecodable body.
    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl ClientError {
    /// Human-readable message for display.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api {
                detail: Some(detail),
                ..
            } if !detail.is_empty() => detail.clone(),
            ClientError::Api { .. } => API_FALLBACK.to_string(),
            ClientError::Transport(_) => TRANSPORT_FALLBACK.to_string(),
            ClientError::Validation(err) => err.to_string(),
            ClientError::Unknown(msg) if !msg.is_empty() => msg.clone(),
            ClientError::Unknown(_) => UNKNOWN_FALLBACK.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        ClientError::Transport(err.message)
    }
}
