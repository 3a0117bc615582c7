//! Contact storage type definitions
//!
//! Enums shared by every storage: which storage a request targets, how a
//! contact list is sorted and which e-mail a contact prefers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A contact storage, or all of them at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// The user's own address book.
    Personal,
    /// Address books shared with the user.
    Shared,
    /// The organisation-wide team directory.
    Team,
    /// Every registered storage merged together.
    All,
}

impl StorageType {
    /// Get the string representation used in requests and persisted rows.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Personal => "personal",
            StorageType::Shared => "shared",
            StorageType::Team => "team",
            StorageType::All => "all",
        }
    }

    /// Whether a request for `self` should be served by `storage`.
    #[must_use]
    pub fn includes(&self, storage: StorageType) -> bool {
        *self == StorageType::All || *self == storage
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "personal" => Ok(StorageType::Personal),
            "shared" => Ok(StorageType::Shared),
            "team" => Ok(StorageType::Team),
            "all" => Ok(StorageType::All),
            _ => Err(ParseEnumError::new("storage type", s)),
        }
    }
}

/// Field a contact list is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Name,
    Email,
    Frequency,
}

impl SortField {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::Frequency => "frequency",
        }
    }
}

impl FromStr for SortField {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "email" => Ok(SortField::Email),
            "frequency" => Ok(SortField::Frequency),
            _ => Err(ParseEnumError::new("sort field", s)),
        }
    }
}

/// Sort direction of a contact list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn is_ascending(&self) -> bool {
        matches!(self, SortOrder::Asc)
    }
}

impl FromStr for SortOrder {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(ParseEnumError::new("sort order", s)),
        }
    }
}

/// Which of a contact's e-mail addresses is its primary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimaryEmail {
    Personal,
    Business,
    Other,
}

/// Error parsing one of the enums in this module from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}
