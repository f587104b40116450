use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::DomainError;

/// Catalog ids are opaque strings assigned by the data pipeline (`unid`).
macro_rules! define_string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_string_id!(CharacterId);
define_id!(SessionId);

/// Position of a narrative event in the 81-step journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct EventIndex(u8);

impl EventIndex {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 81;

    pub fn new(value: u8) -> Result<Self, DomainError> {
        if (Self::FIRST..=Self::LAST).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::validation(format!(
                "event index {value} outside {}..={}",
                Self::FIRST,
                Self::LAST
            )))
        }
    }

    /// Accepts any integer width coming from storage or a URL path.
    pub fn from_i64(value: i64) -> Result<Self, DomainError> {
        u8::try_from(value)
            .map_err(|_| DomainError::validation(format!("event index {value} out of range")))
            .and_then(Self::new)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based offset along the journey path.
    pub fn offset(self) -> usize {
        usize::from(self.0 - Self::FIRST)
    }
}

impl TryFrom<u8> for EventIndex {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EventIndex> for u8 {
    fn from(value: EventIndex) -> Self {
        value.0
    }
}

impl fmt::Display for EventIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
