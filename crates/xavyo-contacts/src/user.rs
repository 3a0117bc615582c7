//! The authenticated user as seen by contact storages.

use serde::{Deserialize, Serialize};

use crate::ids::{TenantId, UserId};

/// The user a contact request is served for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub tenant_id: TenantId,
    /// Login name; for mail accounts this is the primary address.
    pub public_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, tenant_id: TenantId, public_id: impl Into<String>) -> Self {
        Self {
            id,
            tenant_id,
            public_id: public_id.into(),
            email: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// The address that identifies this user when deciding whether a
    /// contact is the user themselves.
    #[must_use]
    pub fn own_address(&self, source: OwnAddress) -> &str {
        match source {
            OwnAddress::PublicId => &self.public_id,
            OwnAddress::Email => self.email.as_deref().unwrap_or(""),
        }
    }

    /// Whether `address` is this user's own address.
    ///
    /// An empty address never matches.
    #[must_use]
    pub fn is_own_address(&self, address: &str, source: OwnAddress) -> bool {
        !address.is_empty() && address == self.own_address(source)
    }
}

/// Which user attribute holds the user's own address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnAddress {
    #[default]
    PublicId,
    Email,
}

impl std::str::FromStr for OwnAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public_id" | "publicid" => Ok(OwnAddress::PublicId),
            "email" => Ok(OwnAddress::Email),
            _ => Err(format!("expected 'public_id' or 'email', got '{s}'")),
        }
    }
}
