//! The team directory contact storage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use xavyo_contacts::query::{ContactQuery, Predicate};
use xavyo_contacts::{
    AuthenticatedUser, Contact, ContactList, ContactStorage, ContactsError, ContactsRequest,
    ContactsResult, SortField, StorageType, TenantId,
};

use crate::client::{DirectoryConnector, Ldap3Connector};
use crate::config::TeamDirectoryConfig;
use crate::filter::{combined_filter, uid_filter};
use crate::mapper::{map_entry, map_list_entry};
use crate::provider::ConnectionProvider;

/// Position of the team directory among the host's storages.
pub const TEAM_STORAGE_ORDER: u32 = 20;

/// Read-only contact storage backed by an LDAP directory.
///
/// Each instance owns one lazily opened connection. Backend failures are
/// logged and answered with empty results; the `try_*` methods expose them.
pub struct TeamDirectoryStorage {
    config: Arc<TeamDirectoryConfig>,
    provider: ConnectionProvider,
}

impl TeamDirectoryStorage {
    /// Create a storage connecting through `connector`.
    pub fn new(
        config: TeamDirectoryConfig,
        connector: Arc<dyn DirectoryConnector>,
    ) -> ContactsResult<Self> {
        config.validate()?;

        let config = Arc::new(config);
        Ok(Self {
            provider: ConnectionProvider::new(Arc::clone(&config), connector),
            config,
        })
    }

    /// Create a storage talking to a real LDAP server.
    pub fn with_ldap3(config: TeamDirectoryConfig) -> ContactsResult<Self> {
        Self::new(config, Arc::new(Ldap3Connector))
    }

    pub fn config(&self) -> &TeamDirectoryConfig {
        &self.config
    }

    /// Number of directory entries matching `search`.
    pub async fn try_count(&self, search: &str) -> ContactsResult<u64> {
        let conn = self.provider.try_connection().await?;
        let filter = combined_filter(&self.config, conn.as_ref(), search);
        debug!(filter = %filter, "Counting team directory contacts");

        Ok(conn.search(&filter).await?.count())
    }

    /// Total matches and one sorted page of list rows, from a single search.
    ///
    /// Entries without an identifier are counted but never listed.
    pub async fn try_page(
        &self,
        user: &AuthenticatedUser,
        request: &ContactsRequest,
    ) -> ContactsResult<(u64, Vec<Contact>)> {
        let conn = self.provider.try_connection().await?;
        let filter = combined_filter(&self.config, conn.as_ref(), &request.search);
        debug!(filter = %filter, "Listing team directory contacts");

        let results = conn.search(&filter).await?;
        let total = results.count();

        let sort_attribute = match request.sort_field {
            SortField::Email => &self.config.email_field,
            SortField::Name | SortField::Frequency => &self.config.name_field,
        };
        let contacts = results
            .sort_paginate(
                sort_attribute,
                request.sort_order.is_ascending(),
                request.offset,
                request.limit,
            )
            .iter()
            .filter_map(|entry| map_list_entry(&self.config, entry, user))
            .collect();

        Ok((total, contacts))
    }

    /// One sorted page of list rows.
    pub async fn try_list(
        &self,
        user: &AuthenticatedUser,
        request: &ContactsRequest,
    ) -> ContactsResult<Vec<Contact>> {
        Ok(self.try_page(user, request).await?.1)
    }

    /// The full record of the contact with identifier `id`.
    pub async fn try_get_by_id(
        &self,
        id: &str,
        user: &AuthenticatedUser,
    ) -> ContactsResult<Option<Contact>> {
        if id.is_empty() {
            return Ok(None);
        }

        let conn = self.provider.try_connection().await?;
        let filter = uid_filter(&self.config, conn.as_ref(), id);
        debug!(filter = %filter, "Fetching team directory contact");

        let results = conn.search(&filter).await?;
        Ok(results
            .first()
            .and_then(|entry| map_entry(&self.config, entry, user)))
    }
}

/// Log a failed operation and fall back to the empty answer.
fn degrade<T: Default>(operation: &'static str, result: ContactsResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(ContactsError::ConnectionUnavailable) => {
            debug!(operation, "Team directory unavailable");
            T::default()
        }
        Err(e) => {
            warn!(
                operation,
                error = %e,
                error_code = e.error_code(),
                transient = e.is_transient(),
                "Team directory operation failed"
            );
            T::default()
        }
    }
}

#[async_trait]
impl ContactStorage for TeamDirectoryStorage {
    fn storage_type(&self) -> StorageType {
        StorageType::Team
    }

    fn storage_order(&self) -> u32 {
        TEAM_STORAGE_ORDER
    }

    #[instrument(skip(self))]
    async fn count(&self, search: &str) -> u64 {
        degrade("count", self.try_count(search).await)
    }

    #[instrument(skip(self, user, request), fields(search = %request.search))]
    async fn list(&self, user: &AuthenticatedUser, request: &ContactsRequest) -> Vec<Contact> {
        degrade("list", self.try_list(user, request).await)
    }

    #[instrument(skip(self, user))]
    async fn get_by_id(&self, id: &str, user: &AuthenticatedUser) -> Option<Contact> {
        degrade("get_by_id", self.try_get_by_id(id, user).await)
    }

    #[instrument(skip(self, acc, request, user), fields(storage = %request.storage))]
    async fn merge_into_combined_search(
        &self,
        acc: &mut ContactList,
        request: &ContactsRequest,
        user: &AuthenticatedUser,
    ) {
        if self.config.disabled || !request.storage.includes(StorageType::Team) {
            return;
        }

        if request.storage == StorageType::Team {
            acc.reset();
        }

        let (count, contacts) = degrade("list", self.try_page(user, request).await);
        info!(
            count,
            listed = contacts.len(),
            "Merged team directory contacts"
        );
        acc.append(count, contacts);
    }

    fn contribute_filter(
        &self,
        query: &mut Option<ContactQuery>,
        requested: StorageType,
        tenant_id: TenantId,
    ) -> bool {
        if self.config.disabled || requested != StorageType::Team {
            return false;
        }

        query
            .get_or_insert_with(ContactQuery::new)
            .or_where(Predicate::and(vec![
                Predicate::eq("tenant_id", tenant_id),
                Predicate::eq("storage", StorageType::Team.as_str()),
            ]));
        true
    }
}

impl std::fmt::Debug for TeamDirectoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamDirectoryStorage")
            .field("provider", &self.provider)
            .finish()
    }
}
