// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns `None` for blank input so callers can treat it as a
            /// missing route parameter.
            pub fn parse(value: &str) -> Option<Self> {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Self(trimmed.to_owned()))
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

entity_id!(AgentId);

#[cfg(test)]
mod tests {
    use super::AgentId;

    #[test]
    fn parse_rejects_blank_ids() {
        assert_eq!(AgentId::parse("   "), None);
        assert_eq!(AgentId::parse(""), None);
        assert_eq!(AgentId::parse(" 64f1 ").map(|id| id.to_string()), Some("64f1".to_owned()));
    }

    #[test]
    fn serializes_as_plain_string() -> anyhow::Result<()> {
        let encoded = serde_json::to_string(&AgentId::new("abc"))?;
        assert_eq!(encoded, "\"abc\"");
        Ok(())
    }
}
