//! Common test utilities for xavyo-contacts-ldap integration tests.
//!
//! [`FakeDirectory`] answers searches from an in-memory entry list by
//! evaluating the filter it receives (AND, OR, NOT, equality, presence and
//! substring assertions with RFC 4515 escapes), and records every filter.
//! Filters ldap3's parser rejects fail the search.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use xavyo_contacts::{AuthenticatedUser, ContactsError, ContactsResult, TenantId, UserId};
use xavyo_contacts_ldap::{
    DirectoryConnection, DirectoryConnector, RawEntry, SearchFilter, SearchResults,
    TeamDirectoryConfig, TeamDirectoryStorage,
};

/// Test data factory for a directory person.
pub fn person(uid: &str, cn: &str, mail: Option<&str>) -> RawEntry {
    let entry = RawEntry::new(format!("uid={uid},ou=users,dc=example,dc=org"))
        .with("objectClass", ["top", "posixAccount"])
        .with("uid", [uid])
        .with("cn", [cn]);
    match mail {
        Some(mail) => entry.with("mail", [mail]),
        None => entry,
    }
}

/// The standard directory used by most tests.
///
/// With the default configuration four entries pass the base filter, one of
/// which has no uid.
pub fn corp_directory() -> Vec<RawEntry> {
    vec![
        person("jdoe", "John Doe", Some("jdoe@corp.example"))
            .with("displayName", ["Johnny"])
            .with("title", ["Engineer"])
            .with("telephoneNumber", ["+1 555 0100"]),
        person("asmith", "Alice Smith", Some("alice.smith@corp.example")),
        person("bwayne", "Bruce Wayne", Some("not-an-address")),
        person("cnomail", "Carol NoMail", None),
        RawEntry::new("cn=Ghost Doe,ou=users,dc=example,dc=org")
            .with("objectClass", ["posixAccount"])
            .with("cn", ["Ghost Doe"])
            .with("mail", ["ghost@corp.example"]),
        person("zed", "zed doe", Some("zdoe@corp.example")),
        RawEntry::new("cn=printer,ou=devices,dc=example,dc=org")
            .with("objectClass", ["device"])
            .with("cn", ["Printer Doe"])
            .with("mail", ["printer@corp.example"]),
    ]
}

pub fn user() -> AuthenticatedUser {
    AuthenticatedUser::new(UserId::new(), TenantId::new(), "jdoe@corp.example")
        .with_email("john.doe@corp.example")
}

/// Storage with `config`, connecting through `connector`.
pub fn storage_with(
    config: TeamDirectoryConfig,
    connector: &Arc<FakeConnector>,
) -> TeamDirectoryStorage {
    TeamDirectoryStorage::new(config, connector.clone()).unwrap()
}

/// In-memory directory.
pub struct FakeDirectory {
    entries: Vec<RawEntry>,
    filters: Mutex<Vec<String>>,
    fail_search: AtomicBool,
}

impl FakeDirectory {
    pub fn new(entries: Vec<RawEntry>) -> Arc<Self> {
        Arc::new(Self {
            entries,
            filters: Mutex::new(Vec::new()),
            fail_search: AtomicBool::new(false),
        })
    }

    /// Every filter searched so far.
    pub fn filters(&self) -> Vec<String> {
        self.filters.lock().unwrap().clone()
    }

    pub fn set_fail_search(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DirectoryConnection for FakeDirectory {
    async fn search(&self, filter: &SearchFilter) -> ContactsResult<SearchResults> {
        self.filters.lock().unwrap().push(filter.to_string());

        if self.fail_search.load(Ordering::SeqCst) {
            return Err(ContactsError::search_failed("server went away"));
        }

        ldap3::parse_filter(filter.as_str())
            .map_err(|_| ContactsError::search_failed(format!("invalid filter: {filter}")))?;

        let node = Parser::new(filter.as_str())
            .parse()
            .ok_or_else(|| ContactsError::search_failed(format!("bad filter: {filter}")))?;

        Ok(self
            .entries
            .iter()
            .filter(|entry| node.matches(entry))
            .cloned()
            .collect())
    }
}

/// Connector handing out a [`FakeDirectory`], or failing.
pub struct FakeConnector {
    directory: Arc<FakeDirectory>,
    attempts: AtomicUsize,
    fail: bool,
}

impl FakeConnector {
    pub fn new(directory: Arc<FakeDirectory>) -> Arc<Self> {
        Arc::new(Self {
            directory,
            attempts: AtomicUsize::new(0),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            directory: FakeDirectory::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail: true,
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn directory(&self) -> &FakeDirectory {
        &self.directory
    }
}

#[async_trait]
impl DirectoryConnector for FakeConnector {
    async fn connect(
        &self,
        _config: &TeamDirectoryConfig,
    ) -> ContactsResult<Arc<dyn DirectoryConnection>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ContactsError::connection_failed("connection refused"));
        }
        let connection: Arc<dyn DirectoryConnection> = self.directory.clone();
        Ok(connection)
    }
}

enum Node {
    And(Vec<Node>),
    Or(Vec<Node>),
    Not(Box<Node>),
    Present(String),
    Equal(String, String),
    Substring(String, Vec<String>),
}

impl Node {
    fn matches(&self, entry: &RawEntry) -> bool {
        match self {
            Node::And(nodes) => nodes.iter().all(|n| n.matches(entry)),
            Node::Or(nodes) => nodes.iter().any(|n| n.matches(entry)),
            Node::Not(node) => !node.matches(entry),
            Node::Present(attr) => entry.contains(attr),
            Node::Equal(attr, value) => values(entry, attr)
                .iter()
                .any(|v| v.eq_ignore_ascii_case(value)),
            Node::Substring(attr, parts) => values(entry, attr)
                .iter()
                .any(|v| substring_match(&v.to_lowercase(), parts)),
        }
    }
}

fn values<'a>(entry: &'a RawEntry, attr: &str) -> &'a [String] {
    entry.get(attr).unwrap_or_default()
}

/// `parts` is the assertion split on `*`: initial, any..., final.
fn substring_match(value: &str, parts: &[String]) -> bool {
    let (initial, rest) = match parts.split_first() {
        Some(split) => split,
        None => return false,
    };
    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return value == initial.to_lowercase(),
    };

    let Some(mut remaining) = value.strip_prefix(initial.to_lowercase().as_str()) else {
        return false;
    };
    for part in middle {
        let part = part.to_lowercase();
        match remaining.find(&part) {
            Some(i) => remaining = &remaining[i + part.len()..],
            None => return false,
        }
    }
    remaining.ends_with(&last.to_lowercase())
}

fn unescape(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 2 < bytes.len() {
            if let Some(Ok(byte)) = raw.get(i + 1..i + 3).map(|hex| u8::from_str_radix(hex, 16)) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse(mut self) -> Option<Node> {
        let node = self.node()?;
        (self.pos == self.input.len()).then_some(node)
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Option<()> {
        (self.peek()? == byte).then(|| self.pos += 1)
    }

    fn node(&mut self) -> Option<Node> {
        self.expect(b'(')?;
        let node = match self.peek()? {
            b'&' => {
                self.pos += 1;
                Node::And(self.list()?)
            }
            b'|' => {
                self.pos += 1;
                Node::Or(self.list()?)
            }
            b'!' => {
                self.pos += 1;
                Node::Not(Box::new(self.node()?))
            }
            _ => self.item()?,
        };
        self.expect(b')')?;
        Some(node)
    }

    fn list(&mut self) -> Option<Vec<Node>> {
        let mut nodes = Vec::new();
        while self.peek()? == b'(' {
            nodes.push(self.node()?);
        }
        Some(nodes)
    }

    fn item(&mut self) -> Option<Node> {
        let rest = &self.input[self.pos..];
        let end = rest.find(')')?;
        let (attr, value) = rest[..end].split_once('=')?;
        self.pos += end;

        let node = if value == "*" {
            Node::Present(attr.to_string())
        } else if value.contains('*') {
            Node::Substring(attr.to_string(), value.split('*').map(unescape).collect())
        } else {
            Node::Equal(attr.to_string(), unescape(value))
        };
        Some(node)
    }
}
