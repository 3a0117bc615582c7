//! Raw directory entries.
//!
//! LDAP attribute names are case-insensitive, so every key is lowercased
//! when an entry is built and every lookup lowercases the requested name.

use std::collections::HashMap;

use ldap3::SearchEntry;

/// A directory entry as returned by a search: DN plus attribute values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    dn: String,
    attrs: HashMap<String, Vec<String>>,
}

impl RawEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attrs: HashMap::new(),
        }
    }

    /// Builder form of [`RawEntry::insert`].
    #[must_use]
    pub fn with<I, V>(mut self, attribute: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.insert(attribute, values.into_iter().map(Into::into).collect());
        self
    }

    /// Set an attribute's values, replacing any previous values stored under
    /// the same name in any letter case.
    pub fn insert(&mut self, attribute: &str, values: Vec<String>) {
        self.attrs.insert(attribute.to_lowercase(), values);
    }

    pub fn dn(&self) -> &str {
        &self.dn
    }

    /// All values of an attribute.
    pub fn get(&self, attribute: &str) -> Option<&[String]> {
        self.attrs
            .get(&attribute.to_lowercase())
            .map(Vec::as_slice)
    }

    /// First value of an attribute.
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.get(attribute)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.attrs.contains_key(&attribute.to_lowercase())
    }
}

impl From<SearchEntry> for RawEntry {
    fn from(entry: SearchEntry) -> Self {
        let mut raw = RawEntry::new(entry.dn);
        for (attribute, values) in entry.attrs {
            raw.insert(&attribute, values);
        }
        raw
    }
}

/// Collects `(attribute, values)` pairs into an entry with an empty DN.
impl<K, V> FromIterator<(K, Vec<V>)> for RawEntry
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, Vec<V>)>>(iter: T) -> Self {
        let mut raw = RawEntry::default();
        for (attribute, values) in iter {
            raw.insert(
                attribute.as_ref(),
                values.into_iter().map(Into::into).collect(),
            );
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let entry = RawEntry::new("uid=jdoe,ou=users,dc=example,dc=org")
            .with("displayName", ["John Doe"])
            .with("MAIL", ["jdoe@corp.example", "john@corp.example"]);

        assert_eq!(entry.first("displayname"), Some("John Doe"));
        assert_eq!(entry.first("DisplayName"), Some("John Doe"));
        assert_eq!(entry.first("mail"), Some("jdoe@corp.example"));
        assert_eq!(entry.get("Mail").map(<[String]>::len), Some(2));
        assert!(entry.contains("mAiL"));
        assert_eq!(entry.dn(), "uid=jdoe,ou=users,dc=example,dc=org");
    }

    #[test]
    fn test_missing_and_empty_attributes() {
        let entry = RawEntry::new("cn=x").with("title", Vec::<String>::new());

        assert!(entry.contains("title"));
        assert_eq!(entry.first("title"), None);
        assert_eq!(entry.get("title"), Some(&[][..]));
        assert_eq!(entry.first("uid"), None);
        assert!(!entry.contains("uid"));
    }

    #[test]
    fn test_from_search_entry() {
        let entry = SearchEntry {
            dn: "uid=jdoe,ou=users,dc=example,dc=org".to_string(),
            attrs: HashMap::from([
                ("uid".to_string(), vec!["jdoe".to_string()]),
                ("telephoneNumber".to_string(), vec!["+1 555 0100".to_string()]),
            ]),
            bin_attrs: HashMap::new(),
        };

        let raw = RawEntry::from(entry);
        assert_eq!(raw.dn(), "uid=jdoe,ou=users,dc=example,dc=org");
        assert_eq!(raw.first("telephonenumber"), Some("+1 555 0100"));
    }

    #[test]
    fn test_from_iterator() {
        let raw: RawEntry = vec![("UID", vec!["jdoe"]), ("cn", vec!["John Doe"])]
            .into_iter()
            .collect();

        assert_eq!(raw.first("uid"), Some("jdoe"));
        assert_eq!(raw.dn(), "");
    }
}
