//! Team directory configuration
//!
//! Settings for the LDAP server backing the team directory: where to connect,
//! how to bind, where contacts live and how their attributes map onto
//! contact fields. Loaded from a JSON settings document or from `TEAM_LDAP_*`
//! environment variables.

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use xavyo_contacts::{ContactField, ContactsError, ContactsResult, OwnAddress};

const REDACTED: &str = "***REDACTED***";

/// Configuration for the team directory storage.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamDirectoryConfig {
    /// Turn the storage off without unregistering it.
    pub disabled: bool,

    /// LDAP server hostname or IP address.
    pub host: String,

    /// LDAP server port.
    pub port: u16,

    /// Fallback server tried when the primary refuses the connection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_host: Option<String>,

    /// Fallback port; defaults to `port`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_port: Option<u16>,

    /// Use SSL/TLS (LDAPS).
    pub use_ssl: bool,

    /// Use STARTTLS upgrade on plain LDAP connection.
    pub use_starttls: bool,

    /// Bind DN; an empty DN skips the bind.
    pub bind_dn: String,

    /// Bind password (stored encrypted by the host).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_password: Option<String>,

    /// Subtree searched for contacts.
    pub search_dn: String,

    /// Object class every contact entry carries.
    pub contact_object_class: String,

    /// Attribute holding the contact identifier.
    pub uid_field: String,

    /// Attribute holding the contact e-mail address.
    pub email_field: String,

    /// Attribute holding the contact display name.
    pub name_field: String,

    /// Only list entries whose e-mail attribute looks like an address.
    pub skip_empty_email: bool,

    /// Directory attribute to contact field mapping, in priority order.
    pub contact_map: ContactMap,

    /// Which of the user's identities marks a contact as the user.
    pub own_address: OwnAddress,

    /// Connection settings (timeouts).
    pub connection: ConnectionSettings,
}

impl fmt::Debug for TeamDirectoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeamDirectoryConfig")
            .field("disabled", &self.disabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("backup_host", &self.backup_host)
            .field("backup_port", &self.backup_port)
            .field("use_ssl", &self.use_ssl)
            .field("use_starttls", &self.use_starttls)
            .field("bind_dn", &self.bind_dn)
            .field("bind_password", &self.bind_password.as_ref().map(|_| REDACTED))
            .field("search_dn", &self.search_dn)
            .field("contact_object_class", &self.contact_object_class)
            .field("uid_field", &self.uid_field)
            .field("email_field", &self.email_field)
            .field("name_field", &self.name_field)
            .field("skip_empty_email", &self.skip_empty_email)
            .field("contact_map", &self.contact_map)
            .field("own_address", &self.own_address)
            .field("connection", &self.connection)
            .finish()
    }
}

impl Default for TeamDirectoryConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            host: "127.0.0.1".to_string(),
            port: 389,
            backup_host: None,
            backup_port: None,
            use_ssl: false,
            use_starttls: false,
            bind_dn: "cn=admin,dc=example,dc=org".to_string(),
            bind_password: Some("adminpassword".to_string()),
            search_dn: "ou=users,dc=example,dc=org".to_string(),
            contact_object_class: "posixAccount".to_string(),
            uid_field: "uid".to_string(),
            email_field: "mail".to_string(),
            name_field: "cn".to_string(),
            skip_empty_email: true,
            contact_map: ContactMap::default(),
            own_address: OwnAddress::default(),
            connection: ConnectionSettings::default(),
        }
    }
}

impl TeamDirectoryConfig {
    /// Create a config for `host` searching under `search_dn`, all other
    /// settings at their defaults.
    pub fn new(host: impl Into<String>, search_dn: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            search_dn: search_dn.into(),
            ..Self::default()
        }
    }

    /// Set bind credentials.
    pub fn with_bind(mut self, bind_dn: impl Into<String>, password: impl Into<String>) -> Self {
        self.bind_dn = bind_dn.into();
        self.bind_password = Some(password.into());
        self
    }

    /// Enable SSL (LDAPS).
    #[must_use]
    pub fn with_ssl(mut self) -> Self {
        self.use_ssl = true;
        self.port = 636;
        self
    }

    /// Set a fallback server.
    pub fn with_backup(mut self, host: impl Into<String>, port: Option<u16>) -> Self {
        self.backup_host = Some(host.into());
        self.backup_port = port;
        self
    }

    /// Get the LDAP URL of the primary server.
    #[must_use]
    pub fn url(&self) -> String {
        self.url_for(&self.host, self.port)
    }

    /// Get the LDAP URL of the fallback server, if one is configured.
    #[must_use]
    pub fn backup_url(&self) -> Option<String> {
        self.backup_host
            .as_deref()
            .filter(|host| !host.is_empty())
            .map(|host| self.url_for(host, self.backup_port.unwrap_or(self.port)))
    }

    fn url_for(&self, host: &str, port: u16) -> String {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        format!("{scheme}://{host}:{port}")
    }

    pub fn validate(&self) -> ContactsResult<()> {
        let required = [
            ("host", &self.host),
            ("search_dn", &self.search_dn),
            ("contact_object_class", &self.contact_object_class),
            ("uid_field", &self.uid_field),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ContactsError::invalid_configuration(format!(
                    "{name} is required"
                )));
            }
        }

        if self.use_ssl && self.use_starttls {
            return Err(ContactsError::invalid_configuration(
                "cannot use both SSL and STARTTLS",
            ));
        }

        if self.backup_port.is_some() && self.backup_host.is_none() {
            return Err(ContactsError::invalid_configuration(
                "backup_port requires backup_host",
            ));
        }

        if let Some(mapping) = self.contact_map.iter().find(|m| m.attribute.is_empty()) {
            return Err(ContactsError::invalid_configuration(format!(
                "contact_map entry for {} has an empty attribute",
                mapping.field
            )));
        }

        Ok(())
    }

    /// Copy of this config safe to log or display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.bind_password.is_some() {
            config.bind_password = Some(REDACTED.to_string());
        }
        config
    }

    /// Parse a JSON settings document; absent keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// Unset variables keep their defaults. Tests use this to supply
    /// variables without mutating process-global environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let defaults = Self::default();
        let string = |key: &str, default: String| reader(key).unwrap_or(default);

        let backup_host = reader("TEAM_LDAP_BACKUP_HOST").ok();
        let backup_port = parse_optional::<u16, _>(&reader, "TEAM_LDAP_BACKUP_PORT")?;
        if backup_port.is_some() && backup_host.is_none() {
            return Err(ConfigError::MissingVar("TEAM_LDAP_BACKUP_HOST".into()));
        }

        let contact_map = match reader("TEAM_LDAP_CONTACT_MAP") {
            Ok(raw) => raw
                .parse::<ContactMap>()
                .map_err(|e| ConfigError::InvalidValue("TEAM_LDAP_CONTACT_MAP".into(), e))?,
            Err(_) => defaults.contact_map,
        };

        let connection = ConnectionSettings {
            connection_timeout_secs: parse_or(
                &reader,
                "TEAM_LDAP_CONNECT_TIMEOUT_SECS",
                defaults.connection.connection_timeout_secs,
            )?,
            read_timeout_secs: parse_or(
                &reader,
                "TEAM_LDAP_READ_TIMEOUT_SECS",
                defaults.connection.read_timeout_secs,
            )?,
        };

        Ok(Self {
            disabled: parse_or(&reader, "TEAM_LDAP_DISABLED", defaults.disabled)?,
            host: string("TEAM_LDAP_HOST", defaults.host),
            port: parse_or(&reader, "TEAM_LDAP_PORT", defaults.port)?,
            backup_host,
            backup_port,
            use_ssl: parse_or(&reader, "TEAM_LDAP_USE_SSL", defaults.use_ssl)?,
            use_starttls: parse_or(&reader, "TEAM_LDAP_USE_STARTTLS", defaults.use_starttls)?,
            bind_dn: string("TEAM_LDAP_BIND_DN", defaults.bind_dn),
            bind_password: reader("TEAM_LDAP_BIND_PASSWORD")
                .ok()
                .or(defaults.bind_password),
            search_dn: string("TEAM_LDAP_SEARCH_DN", defaults.search_dn),
            contact_object_class: string("TEAM_LDAP_OBJECT_CLASS", defaults.contact_object_class),
            uid_field: string("TEAM_LDAP_UID_FIELD", defaults.uid_field),
            email_field: string("TEAM_LDAP_EMAIL_FIELD", defaults.email_field),
            name_field: string("TEAM_LDAP_NAME_FIELD", defaults.name_field),
            skip_empty_email: parse_or(
                &reader,
                "TEAM_LDAP_SKIP_EMPTY_EMAIL",
                defaults.skip_empty_email,
            )?,
            contact_map,
            own_address: parse_or(&reader, "TEAM_LDAP_OWN_ADDRESS", defaults.own_address)?,
            connection,
        })
    }
}

fn parse_optional<T, F>(reader: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    match reader(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(key.into(), e.to_string())),
        Err(_) => Ok(None),
    }
}

fn parse_or<T, F>(reader: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    Ok(parse_optional(reader, key)?.unwrap_or(default))
}

/// Connection settings for the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Connection timeout in seconds.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Read timeout in seconds, applied to bind and each search.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_read_timeout() -> u64 {
    60
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connection_timeout_secs: default_connection_timeout(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}

impl ConnectionSettings {
    /// Get connection timeout as Duration.
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Get read timeout as Duration.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// One directory attribute mapped onto a contact field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMapping {
    pub attribute: String,
    pub field: ContactField,
}

impl AttributeMapping {
    pub fn new(attribute: impl Into<String>, field: ContactField) -> Self {
        Self {
            attribute: attribute.into(),
            field,
        }
    }
}

/// Ordered attribute mappings. Earlier mappings win when several attributes
/// target the same field.
///
/// Deserializes from either a JSON object (`{"cn": "FullName"}`, key order
/// kept) or a list of `{attribute, field}` objects. Serializes as the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContactMap(Vec<AttributeMapping>);

impl ContactMap {
    pub fn new(mappings: Vec<AttributeMapping>) -> Self {
        Self(mappings)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributeMapping> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ContactMap {
    fn default() -> Self {
        use ContactField::*;
        Self(
            [
                ("displayName", FullName),
                ("cn", FullName),
                ("mail", BusinessEmail),
                ("title", BusinessJobTitle),
                ("company", BusinessCompany),
                ("department", BusinessDepartment),
                ("telephoneNumber", BusinessPhone),
                ("physicalDeliveryOfficeName", BusinessOffice),
            ]
            .into_iter()
            .map(|(attribute, field)| AttributeMapping::new(attribute, field))
            .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a ContactMap {
    type Item = &'a AttributeMapping;
    type IntoIter = std::slice::Iter<'a, AttributeMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Parses `attr=Field,attr=Field`.
impl FromStr for ContactMap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (attribute, field) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("expected attribute=Field, got '{pair}'"))?;
                let field = field.trim().parse::<ContactField>().map_err(|e| e.to_string())?;
                Ok(AttributeMapping::new(attribute.trim(), field))
            })
            .collect::<Result<Vec<_>, String>>()
            .map(ContactMap)
    }
}

impl<'de> Deserialize<'de> for ContactMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ContactMapVisitor;

        impl<'de> Visitor<'de> for ContactMapVisitor {
            type Value = ContactMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute to contact field, or a list of mappings")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut mappings = Vec::new();
                while let Some((attribute, field)) = map.next_entry::<String, ContactField>()? {
                    mappings.push(AttributeMapping::new(attribute, field));
                }
                Ok(ContactMap(mappings))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut mappings = Vec::new();
                while let Some(mapping) = seq.next_element::<AttributeMapping>()? {
                    mappings.push(mapping);
                }
                Ok(ContactMap(mappings))
            }
        }

        deserializer.deserialize_any(ContactMapVisitor)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("invalid settings document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}
