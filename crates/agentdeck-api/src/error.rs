// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("cannot reach {base_url} -- is the backend running? ({source})")]
    Transport {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{}", status_text(.status, .message))]
    Status { status: u16, message: Option<String> },
    #[error("malformed response from {endpoint}: {detail}")]
    Malformed { endpoint: String, detail: String },
    #[error("agent {0:?} not found")]
    NotFound(String),
    #[error("invalid agent id {0:?}")]
    InvalidId(String),
}

impl ApiError {
    /// The message the server put in its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn status_text(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => format!("server error ({status}): {message}"),
        None => format!("server returned {status}"),
    }
}

#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedErrorEnvelope {
    error: Option<MessageEnvelope>,
}

/// Extracts a human-readable message from an error body: `{message}`,
/// `{error: {message}}`, or a short plain-text body.
pub(crate) fn server_message(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<MessageEnvelope>(body)
        && let Some(message) = parsed.message
        && !message.trim().is_empty()
    {
        return Some(message);
    }

    if let Ok(parsed) = serde_json::from_str::<NestedErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && let Some(message) = error.message
        && !message.trim().is_empty()
    {
        return Some(message);
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return Some(trimmed.to_owned());
    }
    None
}
