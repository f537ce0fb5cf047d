//! Common types used across CLI modules

use uuid::Uuid;

/// Resource identifier typed on the command line
///
/// Backend ids are UUIDs. A full UUID is used as-is; anything else is a
/// prefix that must match exactly one listed resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdOrPrefix {
    Full(String),
    Prefix(String),
}

impl IdOrPrefix {
    pub fn parse(input: &str) -> Self {
        match Uuid::parse_str(input) {
            Ok(uuid) => IdOrPrefix::Full(uuid.to_string()),
            Err(_) => IdOrPrefix::Prefix(input.to_lowercase()),
        }
    }

    /// The id, if this is a full one
    pub fn as_full(&self) -> Option<&str> {
        match self {
            IdOrPrefix::Full(id) => Some(id),
            IdOrPrefix::Prefix(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            IdOrPrefix::Full(id) | IdOrPrefix::Prefix(id) => id,
        }
    }
}

impl std::fmt::Display for IdOrPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for IdOrPrefix {
    fn from(s: &str) -> Self {
        IdOrPrefix::parse(s)
    }
}

impl std::str::FromStr for IdOrPrefix {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(IdOrPrefix::parse(s))
    }
}
