//! Lazily established directory connection.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use xavyo_contacts::{ContactsError, ContactsResult};

use crate::client::{DirectoryConnection, DirectoryConnector};
use crate::config::TeamDirectoryConfig;

/// Owns the single directory connection of one storage instance.
///
/// The first caller connects; the outcome is kept for the lifetime of the
/// provider. A failed attempt is not retried, later callers get `None`.
pub struct ConnectionProvider {
    config: Arc<TeamDirectoryConfig>,
    connector: Arc<dyn DirectoryConnector>,
    connection: OnceCell<Option<Arc<dyn DirectoryConnection>>>,
}

impl ConnectionProvider {
    pub fn new(config: Arc<TeamDirectoryConfig>, connector: Arc<dyn DirectoryConnector>) -> Self {
        Self {
            config,
            connector,
            connection: OnceCell::new(),
        }
    }

    /// The shared connection, connecting on first use.
    pub async fn connection(&self) -> Option<Arc<dyn DirectoryConnection>> {
        self.connection
            .get_or_init(|| self.establish())
            .await
            .clone()
    }

    /// Like [`connection`](Self::connection), as an error when unavailable.
    pub async fn try_connection(&self) -> ContactsResult<Arc<dyn DirectoryConnection>> {
        self.connection()
            .await
            .ok_or(ContactsError::ConnectionUnavailable)
    }

    /// Whether a connection attempt has completed, successfully or not.
    pub fn is_initialized(&self) -> bool {
        self.connection.initialized()
    }

    async fn establish(&self) -> Option<Arc<dyn DirectoryConnection>> {
        if self.config.disabled {
            debug!("Team directory is disabled, not connecting");
            return None;
        }

        match self.connector.connect(&self.config).await {
            Ok(connection) => Some(connection),
            Err(e) => {
                warn!(
                    url = %self.config.url(),
                    error = %e,
                    error_code = e.error_code(),
                    "Team directory connection failed, directory unavailable for this instance"
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProvider")
            .field("config", &self.config.redacted())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
