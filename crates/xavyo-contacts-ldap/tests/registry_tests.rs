//! Integration tests for the team directory inside a storage registry.

mod common;

use std::sync::Arc;

use common::*;
use xavyo_contacts::prelude::*;
use xavyo_contacts::async_trait;
use xavyo_contacts_ldap::TeamDirectoryConfig;

/// A personal address book holding a fixed set of contacts.
struct AddressBook {
    contacts: Vec<Contact>,
}

impl AddressBook {
    fn new(ids: &[&str]) -> Self {
        Self {
            contacts: ids
                .iter()
                .map(|id| Contact::new(*id, StorageType::Personal))
                .collect(),
        }
    }
}

#[async_trait]
impl ContactStorage for AddressBook {
    fn storage_type(&self) -> StorageType {
        StorageType::Personal
    }

    fn storage_order(&self) -> u32 {
        10
    }

    async fn count(&self, _search: &str) -> u64 {
        self.contacts.len() as u64
    }

    async fn list(&self, _user: &AuthenticatedUser, _request: &ContactsRequest) -> Vec<Contact> {
        self.contacts.clone()
    }

    async fn get_by_id(&self, id: &str, _user: &AuthenticatedUser) -> Option<Contact> {
        self.contacts.iter().find(|c| c.uuid == id).cloned()
    }

    async fn merge_into_combined_search(
        &self,
        acc: &mut ContactList,
        request: &ContactsRequest,
        user: &AuthenticatedUser,
    ) {
        if !request.storage.includes(StorageType::Personal) {
            return;
        }
        if request.storage == StorageType::Personal {
            acc.reset();
        }
        let contacts = self.list(user, request).await;
        acc.append(self.count(&request.search).await, contacts);
    }

    fn contribute_filter(
        &self,
        query: &mut Option<ContactQuery>,
        requested: StorageType,
        _tenant_id: TenantId,
    ) -> bool {
        if !requested.includes(StorageType::Personal) {
            return false;
        }
        query
            .get_or_insert_with(ContactQuery::new)
            .or_where(Predicate::eq("storage", "personal"));
        requested == StorageType::Personal
    }
}

fn registry(connector: &Arc<FakeConnector>) -> StorageRegistry {
    let mut registry = StorageRegistry::new();
    registry
        .register(Arc::new(storage_with(TeamDirectoryConfig::default(), connector)))
        .register(Arc::new(AddressBook::new(&["p1"])));
    registry
}

/// Tests that the directory sits after the personal book.
#[test]
fn test_storage_order() {
    let connector = FakeConnector::new(FakeDirectory::new(corp_directory()));
    assert_eq!(
        registry(&connector).storages(),
        vec![StorageType::Personal, StorageType::Team]
    );
}

/// Tests an all-storages search.
#[tokio::test]
async fn test_get_contacts_all() {
    let connector = FakeConnector::new(FakeDirectory::new(corp_directory()));
    let result = registry(&connector)
        .get_contacts(&ContactsRequest::new(StorageType::All), &user())
        .await;

    assert_eq!(result.contact_count, 5);
    let ids: Vec<&str> = result.list.iter().map(|c| c.uuid.as_str()).collect();
    assert_eq!(ids, vec!["p1", "asmith", "jdoe", "zed"]);
}

/// Tests a team-only search.
#[tokio::test]
async fn test_get_contacts_team_only() {
    let connector = FakeConnector::new(FakeDirectory::new(corp_directory()));
    let result = registry(&connector)
        .get_contacts(&ContactsRequest::new(StorageType::Team).with_search("smith"), &user())
        .await;

    assert_eq!(result.contact_count, 1);
    assert_eq!(result.list[0].uuid, "asmith");
}

/// Tests that the directory is only asked when no other storage knows the id.
#[tokio::test]
async fn test_get_contact_falls_through_to_directory() {
    let connector = FakeConnector::new(FakeDirectory::new(corp_directory()));
    let registry = registry(&connector);
    let user = user();

    let personal = registry.get_contact("p1", &user).await.unwrap();
    assert_eq!(personal.storage, Some(StorageType::Personal));
    assert_eq!(connector.attempts(), 0);

    let team = registry.get_contact("asmith", &user).await.unwrap();
    assert_eq!(team.storage, Some(StorageType::Team));
    assert_eq!(team.full_name, "Alice Smith");
}

/// Tests persisted-contact filter preparation.
#[test]
fn test_prepare_filters() {
    let connector = FakeConnector::new(FakeDirectory::new(corp_directory()));
    let registry = registry(&connector);
    let user = user();

    let (query, valid) = registry.prepare_filters(StorageType::Team, &user);
    assert!(valid);
    let (sql, binds) = query.unwrap().to_sql(1);
    assert_eq!(sql, "(tenant_id = $1 AND storage = $2)");
    assert_eq!(binds[0], QueryValue::from(user.tenant_id));

    let (query, valid) = registry.prepare_filters(StorageType::All, &user);
    assert!(!valid);
    assert_eq!(query.unwrap().to_sql(1).0, "storage = $1");

    let (query, valid) = registry.prepare_filters(StorageType::Shared, &user);
    assert!(!valid);
    assert!(query.is_none());
}
