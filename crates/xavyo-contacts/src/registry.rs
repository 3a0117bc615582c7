//! Ordered composition of contact storages.

use std::sync::Arc;

use tracing::debug;

use crate::contact::Contact;
use crate::query::ContactQuery;
use crate::search::{ContactList, ContactsRequest};
use crate::traits::ContactStorage;
use crate::types::StorageType;
use crate::user::AuthenticatedUser;

/// Shared handle to a registered storage.
pub type BoxedStorage = Arc<dyn ContactStorage>;

/// The set of storages the host queries, kept in `storage_order`.
#[derive(Clone, Default)]
pub struct StorageRegistry {
    storages: Vec<BoxedStorage>,
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a storage. Storages with equal order keep registration order.
    pub fn register(&mut self, storage: BoxedStorage) -> &mut Self {
        debug!(
            storage = %storage.storage_type(),
            order = storage.storage_order(),
            "Registering contact storage"
        );
        self.storages.push(storage);
        self.storages.sort_by_key(|s| s.storage_order());
        self
    }

    /// Storage types in query order.
    pub fn storages(&self) -> Vec<StorageType> {
        self.storages.iter().map(|s| s.storage_type()).collect()
    }

    /// Run a contacts request against every storage.
    pub async fn get_contacts(
        &self,
        request: &ContactsRequest,
        user: &AuthenticatedUser,
    ) -> ContactList {
        let mut acc = ContactList::new();
        for storage in &self.storages {
            storage
                .merge_into_combined_search(&mut acc, request, user)
                .await;
        }
        acc
    }

    /// Fetch a contact from the first storage that knows it.
    pub async fn get_contact(&self, id: &str, user: &AuthenticatedUser) -> Option<Contact> {
        for storage in &self.storages {
            if let Some(contact) = storage.get_by_id(id, user).await {
                return Some(contact);
            }
        }
        None
    }

    /// Collect predicate contributions for a persisted-contact query.
    ///
    /// Returns the assembled query, if any storage contributed, and whether
    /// any storage recognised `requested`.
    pub fn prepare_filters(
        &self,
        requested: StorageType,
        user: &AuthenticatedUser,
    ) -> (Option<ContactQuery>, bool) {
        let mut query = None;
        let mut valid = false;
        for storage in &self.storages {
            valid |= storage.contribute_filter(&mut query, requested, user.tenant_id);
        }
        (query, valid)
    }
}

impl std::fmt::Debug for StorageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageRegistry")
            .field("storages", &self.storages())
            .finish()
    }
}
