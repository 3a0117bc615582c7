//! # Contact Storage Framework
//!
//! Core abstractions for aggregating contacts from several storages.
//!
//! Every contact source (the personal address book, shared books, the
//! read-only team directory, ...) implements [`ContactStorage`]. The host
//! composes them in a [`StorageRegistry`] and asks each one in turn, so a
//! single "all storages" search returns one merged [`ContactList`].
//!
//! ## Crate Organization
//!
//! - [`ids`] - Type-safe identifiers (`TenantId`, `UserId`)
//! - [`types`] - Storage, sorting and e-mail kind enums
//! - [`error`] - Error types with transient/permanent classification
//! - [`contact`] - The canonical contact record and its mappable fields
//! - [`user`] - The authenticated user as seen by storages
//! - [`search`] - Combined-search request and result accumulator
//! - [`query`] - Predicate fragments for persisted-contact queries
//! - [`traits`] - The storage capability trait
//! - [`registry`] - Ordered storage composition

pub mod contact;
pub mod error;
pub mod ids;
pub mod query;
pub mod registry;
pub mod search;
pub mod traits;
pub mod types;
pub mod user;

pub use contact::{Contact, ContactField};
pub use error::{ContactsError, ContactsResult};
pub use ids::{TenantId, UserId};
pub use registry::StorageRegistry;
pub use search::{ContactList, ContactsRequest};
pub use traits::ContactStorage;
pub use types::{PrimaryEmail, SortField, SortOrder, StorageType};
pub use user::{AuthenticatedUser, OwnAddress};

/// Prelude module for convenient imports.
///
/// ```
/// use xavyo_contacts::prelude::*;
/// ```
pub mod prelude {
    pub use crate::contact::{Contact, ContactField};
    pub use crate::error::{ContactsError, ContactsResult};
    pub use crate::ids::{TenantId, UserId};
    pub use crate::query::{ContactQuery, Predicate, QueryValue};
    pub use crate::registry::StorageRegistry;
    pub use crate::search::{ContactList, ContactsRequest};
    pub use crate::traits::ContactStorage;
    pub use crate::types::{PrimaryEmail, SortField, SortOrder, StorageType};
    pub use crate::user::{AuthenticatedUser, OwnAddress};
}

// Re-export async_trait for storage implementors
pub use async_trait::async_trait;
