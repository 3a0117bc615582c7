//! Contact storage capability trait.

use async_trait::async_trait;

use crate::contact::Contact;
use crate::ids::TenantId;
use crate::query::ContactQuery;
use crate::search::{ContactList, ContactsRequest};
use crate::types::StorageType;
use crate::user::AuthenticatedUser;

/// A source of contacts taking part in combined searches.
///
/// The read operations are infallible by contract: a storage whose backend
/// is unreachable answers with zero, an empty list or `None`, so one broken
/// storage never hides the contacts of the others.
#[async_trait]
pub trait ContactStorage: Send + Sync {
    /// The storage this implementation serves.
    fn storage_type(&self) -> StorageType;

    /// Position of this storage when storages are enumerated and queried.
    fn storage_order(&self) -> u32;

    /// Number of contacts matching the free-text `search`.
    async fn count(&self, search: &str) -> u64;

    /// One sorted page of contacts matching `request.search`.
    async fn list(&self, user: &AuthenticatedUser, request: &ContactsRequest) -> Vec<Contact>;

    /// A single contact by its storage identifier.
    async fn get_by_id(&self, id: &str, user: &AuthenticatedUser) -> Option<Contact>;

    /// Contribute this storage's results to a combined search.
    ///
    /// Called for every request; implementations decide from
    /// `request.storage` whether they take part.
    async fn merge_into_combined_search(
        &self,
        acc: &mut ContactList,
        request: &ContactsRequest,
        user: &AuthenticatedUser,
    );

    /// Contribute a predicate to a persisted-contact query.
    ///
    /// Returns `true` when this storage recognised `requested` as its own.
    fn contribute_filter(
        &self,
        _query: &mut Option<ContactQuery>,
        _requested: StorageType,
        _tenant_id: TenantId,
    ) -> bool {
        false
    }
}
