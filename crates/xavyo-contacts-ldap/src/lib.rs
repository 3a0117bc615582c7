//! # Team Directory Contacts
//!
//! Read-only contact storage serving an organisation's LDAP directory as
//! the "team" address book.
//!
//! ## Features
//!
//! - Free-text search over the name and e-mail attributes
//! - Server-side exclusion of entries without a usable e-mail address
//! - Configurable attribute to contact field mapping
//! - Backup server fallback, SSL/TLS and STARTTLS
//! - Participation in combined "all storages" searches
//!
//! ## Example
//!
//! ```ignore
//! use xavyo_contacts::prelude::*;
//! use xavyo_contacts_ldap::{TeamDirectoryConfig, TeamDirectoryStorage};
//!
//! let config = TeamDirectoryConfig::new("ldap.example.com", "ou=users,dc=example,dc=com")
//!     .with_bind("cn=reader,dc=example,dc=com", "secret");
//!
//! let storage = TeamDirectoryStorage::with_ldap3(config)?;
//! let page = storage
//!     .list(&user, &ContactsRequest::new(StorageType::Team).with_search("doe"))
//!     .await;
//! ```

pub mod client;
pub mod config;
pub mod entry;
pub mod filter;
pub mod mapper;
pub mod provider;
pub mod storage;

// Re-exports
pub use client::{DirectoryConnection, DirectoryConnector, Ldap3Connector, SearchResults};
pub use config::{ConfigError, TeamDirectoryConfig};
pub use entry::RawEntry;
pub use filter::SearchFilter;
pub use provider::ConnectionProvider;
pub use storage::{TeamDirectoryStorage, TEAM_STORAGE_ORDER};
