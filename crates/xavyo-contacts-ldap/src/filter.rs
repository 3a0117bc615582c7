//! LDAP search filter construction.
//!
//! Every team directory search is scoped by the base filter (contact object
//! class, optionally requiring an address-shaped e-mail). Free text and ids
//! typed by users are escaped through the connection before they reach a
//! filter.

use std::fmt;

use crate::client::DirectoryConnection;
use crate::config::TeamDirectoryConfig;

/// A rendered LDAP filter string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchFilter(String);

impl SearchFilter {
    pub fn new(filter: impl Into<String>) -> Self {
        Self(filter.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SearchFilter {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `(objectClass=<class>)`, AND-ed with `(<email>=*@*)` when entries without
/// a usable address are skipped.
pub fn base_filter(config: &TeamDirectoryConfig) -> SearchFilter {
    let class = format!("(objectClass={})", config.contact_object_class);
    if config.skip_empty_email && !config.email_field.is_empty() {
        SearchFilter(format!("(&{class}({}=*@*))", config.email_field))
    } else {
        SearchFilter(class)
    }
}

/// Substring match of `query` on the name and e-mail attributes.
///
/// Clauses for unconfigured attributes are left out; with neither
/// configured the filter is empty.
pub fn search_filter(
    config: &TeamDirectoryConfig,
    conn: &dyn DirectoryConnection,
    query: &str,
) -> SearchFilter {
    let escaped = conn.escape(query);
    let clauses: Vec<String> = [&config.name_field, &config.email_field]
        .into_iter()
        .filter(|attribute| !attribute.is_empty())
        .map(|attribute| format!("({attribute}=*{escaped}*)"))
        .collect();

    match clauses.as_slice() {
        [] => SearchFilter::default(),
        [single] => SearchFilter(single.clone()),
        many => SearchFilter(format!("(|{})", many.concat())),
    }
}

/// The filter for a listing or count: the base filter, narrowed by the free
/// text when there is any.
pub fn combined_filter(
    config: &TeamDirectoryConfig,
    conn: &dyn DirectoryConnection,
    query: &str,
) -> SearchFilter {
    let base = base_filter(config);
    if query.is_empty() {
        return base;
    }

    let free_text = search_filter(config, conn, query);
    if free_text.is_empty() {
        return base;
    }

    SearchFilter(format!("(&{free_text}{base})"))
}

/// The filter selecting one contact by identifier.
pub fn uid_filter(
    config: &TeamDirectoryConfig,
    conn: &dyn DirectoryConnection,
    id: &str,
) -> SearchFilter {
    SearchFilter(format!(
        "(&{}({}={}))",
        base_filter(config),
        config.uid_field,
        conn.escape(id)
    ))
}
