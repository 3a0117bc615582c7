//! Combined-search request and result accumulator.
//!
//! A contacts request names one storage, or [`StorageType::All`]. The host
//! hands the same [`ContactList`] to each storage in turn; a storage serving
//! `All` appends to it, a storage serving itself exclusively replaces it.

use serde::{Deserialize, Serialize};

use crate::contact::Contact;
use crate::types::{SortField, SortOrder, StorageType};

/// Parameters of a contact listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactsRequest {
    pub storage: StorageType,
    /// Free-text query; empty lists everything.
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort_field: SortField,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ContactsRequest {
    pub fn new(storage: StorageType) -> Self {
        Self {
            storage,
            search: String::new(),
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
            offset: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    #[must_use]
    pub fn with_sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_field = field;
        self.sort_order = order;
        self
    }

    #[must_use]
    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }
}

/// Result accumulator shared by all storages during a combined search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactList {
    pub contact_count: u64,
    pub list: Vec<Contact>,
}

impl ContactList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything accumulated so far.
    pub fn reset(&mut self) {
        self.contact_count = 0;
        self.list.clear();
    }

    /// Add a storage's total and append its page of contacts after the
    /// entries already present.
    pub fn append(&mut self, count: u64, contacts: Vec<Contact>) {
        self.contact_count += count;
        self.list.extend(contacts);
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contacts(ids: &[&str]) -> Vec<Contact> {
        ids.iter()
            .map(|id| Contact::new(*id, StorageType::Personal))
            .collect()
    }

    #[test]
    fn test_append_keeps_existing_entries() {
        let mut acc = ContactList::new();
        acc.append(3, contacts(&["c1", "c2", "c3"]));
        acc.append(2, contacts(&["d1", "d2"]));

        assert_eq!(acc.contact_count, 5);
        let ids: Vec<&str> = acc.list.iter().map(|c| c.uuid.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3", "d1", "d2"]);
    }

    #[test]
    fn test_reset() {
        let mut acc = ContactList::new();
        acc.append(3, contacts(&["c1", "c2", "c3"]));
        acc.reset();
        assert_eq!(acc.contact_count, 0);
        assert!(acc.is_empty());
    }

    #[test]
    fn test_request_builder() {
        let request = ContactsRequest::new(StorageType::Team)
            .with_search("doe")
            .with_sort(SortField::Email, SortOrder::Desc)
            .with_page(20, 10);

        assert_eq!(request.search, "doe");
        assert_eq!(request.sort_field, SortField::Email);
        assert_eq!(request.offset, Some(20));
        assert_eq!(request.limit, Some(10));
    }

    #[test]
    fn test_request_deserialize_defaults() {
        let request: ContactsRequest = serde_json::from_str(r#"{"storage":"all"}"#).unwrap();
        assert_eq!(request, ContactsRequest::new(StorageType::All));
    }
}
