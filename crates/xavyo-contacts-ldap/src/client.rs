//! Directory client seam.
//!
//! [`DirectoryConnector`] opens and binds a connection, [`DirectoryConnection`]
//! runs subtree searches over the configured search base. The ldap3-backed
//! implementations live here too; tests substitute in-memory ones.

use std::sync::Arc;

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry, SearchResult};
use tracing::{debug, info, warn};

use xavyo_contacts::{ContactsError, ContactsResult};

use crate::config::TeamDirectoryConfig;
use crate::entry::RawEntry;
use crate::filter::SearchFilter;

/// LDAP result code for invalidCredentials.
const RC_INVALID_CREDENTIALS: u32 = 49;

/// LDAP result code for sizeLimitExceeded; the entries returned so far are
/// still usable.
const RC_SIZE_LIMIT_EXCEEDED: u32 = 4;

/// A bound connection to the directory.
#[async_trait]
pub trait DirectoryConnection: Send + Sync {
    /// Escape a value for use inside a search filter (RFC 4515).
    fn escape(&self, value: &str) -> String {
        ldap3::ldap_escape(value).into_owned()
    }

    /// Search the configured base, whole subtree, all user attributes.
    async fn search(&self, filter: &SearchFilter) -> ContactsResult<SearchResults>;
}

/// Factory for directory connections.
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    async fn connect(
        &self,
        config: &TeamDirectoryConfig,
    ) -> ContactsResult<Arc<dyn DirectoryConnection>>;
}

/// Entries matched by a search, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    entries: Vec<RawEntry>,
}

impl SearchResults {
    pub fn new(entries: Vec<RawEntry>) -> Self {
        Self { entries }
    }

    /// Number of matched entries.
    pub fn count(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn first(&self) -> Option<&RawEntry> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[RawEntry] {
        &self.entries
    }

    /// Sort by the first value of `sort_attribute` (case-insensitively,
    /// entries lacking it first) and cut out one page.
    ///
    /// Descending order reverses the whole sequence, so entries lacking the
    /// attribute come last.
    ///
    /// `None` for `offset` or `limit` leaves that side unbounded.
    pub fn sort_paginate(
        mut self,
        sort_attribute: &str,
        ascending: bool,
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> Vec<RawEntry> {
        self.entries.sort_by_cached_key(|entry| {
            entry
                .first(sort_attribute)
                .map(str::to_lowercase)
                .unwrap_or_default()
        });
        if !ascending {
            self.entries.reverse();
        }

        self.entries
            .into_iter()
            .skip(offset.unwrap_or(0))
            .take(limit.unwrap_or(usize::MAX))
            .collect()
    }
}

impl FromIterator<RawEntry> for SearchResults {
    fn from_iter<T: IntoIterator<Item = RawEntry>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Connector backed by the ldap3 client.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ldap3Connector;

impl Ldap3Connector {
    /// Open and bind a connection to one server.
    async fn connect_url(config: &TeamDirectoryConfig, url: &str) -> ContactsResult<Ldap> {
        debug!(url = %url, "Connecting to LDAP server");

        let settings = LdapConnSettings::new()
            .set_conn_timeout(config.connection.connection_timeout())
            .set_starttls(config.use_starttls);

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, url)
            .await
            .map_err(|e| {
                ContactsError::connection_failed_with_source(
                    format!("Failed to connect to LDAP server at {url}"),
                    e,
                )
            })?;

        // Spawn the connection driver
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        if config.bind_dn.is_empty() {
            debug!("No bind DN configured, using anonymous access");
            return Ok(ldap);
        }

        let bind_dn = &config.bind_dn;
        let bind_password = config.bind_password.as_deref().unwrap_or("");

        debug!(bind_dn = %bind_dn, "Performing LDAP bind");

        let result = ldap
            .with_timeout(config.connection.read_timeout())
            .simple_bind(bind_dn, bind_password)
            .await
            .map_err(|e| {
                ContactsError::connection_failed_with_source(
                    format!("LDAP bind failed for {bind_dn}"),
                    e,
                )
            })?;

        if result.rc != 0 {
            if result.rc == RC_INVALID_CREDENTIALS {
                return Err(ContactsError::AuthenticationFailed);
            }
            return Err(ContactsError::connection_failed(format!(
                "LDAP bind failed with code {}: {}",
                result.rc, result.text
            )));
        }

        Ok(ldap)
    }
}

#[async_trait]
impl DirectoryConnector for Ldap3Connector {
    async fn connect(
        &self,
        config: &TeamDirectoryConfig,
    ) -> ContactsResult<Arc<dyn DirectoryConnection>> {
        let primary = config.url();
        let ldap = match Self::connect_url(config, &primary).await {
            Ok(ldap) => ldap,
            // Bad credentials are not the primary server's fault.
            Err(ContactsError::AuthenticationFailed) => {
                return Err(ContactsError::AuthenticationFailed)
            }
            Err(e) => match config.backup_url() {
                Some(backup) => {
                    warn!(url = %primary, error = %e, "Primary LDAP server unavailable, trying backup");
                    Self::connect_url(config, &backup).await?
                }
                None => return Err(e),
            },
        };

        info!(host = %config.host, "LDAP connection established successfully");

        Ok(Arc::new(Ldap3Connection {
            ldap,
            search_dn: config.search_dn.clone(),
            read_timeout: config.connection.read_timeout(),
        }))
    }
}

/// A bound ldap3 connection.
pub struct Ldap3Connection {
    ldap: Ldap,
    search_dn: String,
    read_timeout: std::time::Duration,
}

#[async_trait]
impl DirectoryConnection for Ldap3Connection {
    async fn search(&self, filter: &SearchFilter) -> ContactsResult<SearchResults> {
        // The handle multiplexes over one connection, so each search gets
        // its own clone.
        let mut ldap = self.ldap.clone();

        debug!(filter = %filter, base_dn = %self.search_dn, "Searching LDAP");

        let SearchResult(entries, result) = ldap
            .with_timeout(self.read_timeout)
            .search(&self.search_dn, Scope::Subtree, filter.as_str(), vec!["*"])
            .await
            .map_err(|e| ContactsError::search_failed_with_source("LDAP search failed", e))?;

        if result.rc == RC_SIZE_LIMIT_EXCEEDED {
            warn!(
                filter = %filter,
                returned = entries.len(),
                "LDAP size limit exceeded, results are truncated"
            );
        } else {
            result
                .success()
                .map_err(|e| ContactsError::search_failed_with_source("LDAP search failed", e))?;
        }

        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(RawEntry::from)
            .collect())
    }
}

impl std::fmt::Debug for Ldap3Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ldap3Connection")
            .field("search_dn", &self.search_dn)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}
