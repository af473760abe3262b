// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use time::OffsetDateTime;

/// Key the bearer token is stored under in the local key-value store.
pub const TOKEN_KEY: &str = "auth_token";

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// What a token whose expiry cannot be read counts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryDecode {
    #[default]
    FailClosed,
    FailOpen,
}

impl ExpiryDecode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FailClosed => "fail-closed",
            Self::FailOpen => "fail-open",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fail-closed" => Some(Self::FailClosed),
            "fail-open" => Some(Self::FailOpen),
            _ => None,
        }
    }
}

/// Reads the numeric `exp` claim (unix seconds) from a three-part token.
pub fn token_expiry(token: &str) -> Option<f64> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    let bytes = URL_SAFE_LENIENT
        .decode(payload)
        .or_else(|_| STANDARD_LENIENT.decode(payload))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_f64()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    token: Option<String>,
    /// Unix seconds reported by the server at login. Used when the token
    /// carries no readable `exp`.
    expires_at: Option<i64>,
    expiry_decode: ExpiryDecode,
}

impl Session {
    pub fn new(expiry_decode: ExpiryDecode) -> Self {
        Self {
            token: None,
            expires_at: None,
            expiry_decode,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.set_token(token);
        self
    }

    /// Call after [`Session::with_token`]; a new token forgets the old expiry.
    pub fn with_expires_at(mut self, expires_at: Option<i64>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub const fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|token| !token.trim().is_empty());
        self.expires_at = None;
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.expires_at = None;
    }

    pub const fn expiry_decode(&self) -> ExpiryDecode {
        self.expiry_decode
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in_at(OffsetDateTime::now_utc())
    }

    pub fn is_logged_in_at(&self, now: OffsetDateTime) -> bool {
        let Some(token) = self.token.as_deref() else {
            return false;
        };
        match (token_expiry(token), self.expires_at) {
            (Some(exp), _) => exp > now.unix_timestamp() as f64,
            (None, Some(expires_at)) => expires_at > now.unix_timestamp(),
            (None, None) => self.expiry_decode == ExpiryDecode::FailOpen,
        }
    }
}
